//! Request and response types shared by every storage client.

mod listing;
mod object_content;
mod object_info;

pub use listing::{ListRequest, ListedObject, ListingPage};
pub use object_content::ObjectContent;
pub use object_info::ObjectInfo;
