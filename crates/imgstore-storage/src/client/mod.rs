//! Storage clients.
//!
//! [`ObjectClient`] is the capability set the facade needs from a store:
//! HEAD, GET and one page of a listing. Two families implement it:
//!
//! - [`S3Client`] talks to S3 (or any S3-compatible endpoint) through the
//!   AWS SDK, either signing requests or sending them unsigned.
//! - [`ObjectStoreClient`] adapts any [`object_store::ObjectStore`]
//!   (local filesystem, in-memory) and answers listings in a single page.

mod object_client;
mod object_store_client;
mod s3_client;

pub use object_client::ObjectClient;
pub use object_store_client::ObjectStoreClient;
pub use s3_client::S3Client;
