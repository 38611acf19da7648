//! S3 client built on the AWS SDK.
//!
//! Works with AWS S3, MinIO and any S3-compatible service. Requests are
//! either signed with credentials from the default AWS provider chain or
//! sent unsigned, depending on [`AuthStyle`].

use std::fmt;
use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::DateTime;
use jiff::Timestamp;

use super::ObjectClient;
use crate::types::{ListRequest, ListedObject, ListingPage, ObjectContent, ObjectInfo};
use crate::{AuthStyle, Error, Result, StorageConfig, TRACING_TARGET_CLIENT};

/// S3-backed storage client.
///
/// Cheap to clone: the SDK client is reference counted internally.
#[derive(Clone)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    bucket: Arc<String>,
    auth_style: AuthStyle,
}

impl S3Client {
    /// Builds the SDK client described by `config`.
    ///
    /// With [`AuthStyle::SigV4`] credentials are resolved lazily by the
    /// default chain (environment, profile, web identity, instance
    /// metadata). With [`AuthStyle::Unsigned`] no credentials are loaded
    /// and requests go out unsigned.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        config.validate()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region().to_owned()));
        if config.storage_auth_style == AuthStyle::Unsigned {
            loader = loader.no_credentials();
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.storage_force_path_style);
        if let Some(endpoint) = &config.storage_endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            bucket = %config.storage_bucket,
            region = %config.region(),
            endpoint = ?config.storage_endpoint,
            force_path_style = config.storage_force_path_style,
            auth_style = %config.storage_auth_style,
            "S3 client initialized"
        );

        Ok(Self::from_sdk(
            aws_sdk_s3::Client::from_conf(builder.build()),
            config.storage_bucket.clone(),
            config.storage_auth_style,
        ))
    }

    /// Wraps an already configured SDK client.
    pub fn from_sdk(
        client: aws_sdk_s3::Client,
        bucket: impl Into<String>,
        auth_style: AuthStyle,
    ) -> Self {
        Self {
            inner: client,
            bucket: Arc::new(bucket.into()),
            auth_style,
        }
    }

    /// Returns the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns how requests are authenticated.
    pub fn auth_style(&self) -> AuthStyle {
        self.auth_style
    }
}

#[async_trait::async_trait]
impl ObjectClient for S3Client {
    fn id(&self) -> &str {
        "s3"
    }

    #[tracing::instrument(name = "s3.head_object", skip(self), fields(bucket = %self.bucket))]
    async fn head_object(&self, key: &str) -> Result<ObjectInfo> {
        let output = self
            .inner
            .head_object()
            .bucket(self.bucket.as_str())
            .key(key)
            .send()
            .await
            .map_err(|e| from_sdk_error("head_object", key, e))?;

        let mut info = ObjectInfo::new(key, to_size(output.content_length()));
        info.last_modified = output.last_modified().and_then(to_timestamp);
        info.e_tag = output.e_tag().map(str::to_owned);
        info.content_type = output.content_type().map(str::to_owned);
        Ok(info)
    }

    #[tracing::instrument(name = "s3.get_object", skip(self), fields(bucket = %self.bucket))]
    async fn get_object(&self, key: &str) -> Result<ObjectContent> {
        let output = self
            .inner
            .get_object()
            .bucket(self.bucket.as_str())
            .key(key)
            .send()
            .await
            .map_err(|e| from_sdk_error("get_object", key, e))?;

        let content_length = output.content_length();
        let mut info = ObjectInfo::new(key, to_size(content_length));
        info.last_modified = output.last_modified().and_then(to_timestamp);
        info.e_tag = output.e_tag().map(str::to_owned);
        info.content_type = output.content_type().map(str::to_owned);

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| Error::backend("get_object", e))?
            .into_bytes();

        if content_length.is_none() {
            info.size = data.len() as u64;
        }

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            key,
            size = data.len(),
            "Object downloaded"
        );

        Ok(ObjectContent::new(info, data))
    }

    #[tracing::instrument(
        name = "s3.list_objects_v2",
        skip_all,
        fields(
            bucket = %self.bucket,
            prefix = %request.prefix,
            has_token = request.continuation_token.is_some()
        )
    )]
    async fn list_objects(&self, request: &ListRequest) -> Result<ListingPage> {
        let output = self
            .inner
            .list_objects_v2()
            .bucket(self.bucket.as_str())
            .prefix(&request.prefix)
            .set_delimiter(request.delimiter.clone())
            .set_continuation_token(request.continuation_token.clone())
            .set_max_keys(request.max_keys)
            .send()
            .await
            .map_err(|e| from_sdk_error("list_objects_v2", &request.prefix, e))?;

        let objects = output
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|object| {
                let key = object.key?;
                Some(ListedObject::new(key, to_size(object.size)))
            })
            .collect();

        let common_prefixes = output
            .common_prefixes
            .unwrap_or_default()
            .into_iter()
            .filter_map(|common| common.prefix)
            .collect();

        Ok(ListingPage {
            objects,
            common_prefixes,
            next_continuation_token: output.next_continuation_token,
            is_truncated: output.is_truncated.unwrap_or(false),
        })
    }
}

impl fmt::Debug for S3Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Client")
            .field("bucket", &self.bucket)
            .field("auth_style", &self.auth_style)
            .finish()
    }
}

/// Maps an SDK failure to a crate [`Error`].
///
/// Any 404 becomes [`Error::NotFound`] for `key`; everything else is
/// passed through with the full SDK error context as its message.
fn from_sdk_error<E>(operation: &'static str, key: &str, err: SdkError<E, HttpResponse>) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    if err.raw_response().map(|r| r.status().as_u16()) == Some(404) {
        return Error::not_found(key);
    }

    let message = DisplayErrorContext(&err).to_string();
    tracing::warn!(
        target: TRACING_TARGET_CLIENT,
        operation,
        key,
        error = %message,
        "S3 request failed"
    );
    Error::backend_with_message(operation, message, err)
}

/// Clamps a signed SDK length to `u64`; missing or negative lengths read as zero.
fn to_size(length: Option<i64>) -> u64 {
    length.and_then(|l| u64::try_from(l).ok()).unwrap_or(0)
}

fn to_timestamp(dt: &DateTime) -> Option<Timestamp> {
    let nanos = i32::try_from(dt.subsec_nanos()).ok()?;
    Timestamp::new(dt.secs(), nanos).ok()
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::config::Credentials;
    use aws_sdk_s3::config::http::HttpRequest;
    use aws_sdk_s3::config::retry::RetryConfig;
    use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;

    use super::*;
    use crate::Storage;

    fn event(status: u16, body: &'static str) -> ReplayEvent {
        ReplayEvent::new(
            HttpRequest::new(SdkBody::empty()),
            HttpResponse::new(StatusCode::try_from(status).unwrap(), SdkBody::from(body)),
        )
    }

    /// Client whose HTTP layer answers with `events`, in order.
    fn replay_client(events: Vec<ReplayEvent>) -> (S3Client, StaticReplayClient) {
        let http_client = StaticReplayClient::new(events);
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKID", "SECRET", None, None, "replay"))
            .retry_config(RetryConfig::disabled())
            .http_client(http_client.clone())
            .build();

        let client = S3Client::from_sdk(
            aws_sdk_s3::Client::from_conf(config),
            "images",
            AuthStyle::SigV4,
        );
        (client, http_client)
    }

    const NO_SUCH_KEY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message><Key>images/missing.zip</Key><RequestId>1</RequestId></Error>"#;

    const ACCESS_DENIED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied</Message><RequestId>2</RequestId></Error>"#;

    const INTERNAL_ERROR: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>InternalError</Code><Message>We encountered an internal error.</Message><RequestId>3</RequestId></Error>"#;

    const FIRST_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>images</Name>
  <Prefix>images/</Prefix>
  <KeyCount>4</KeyCount>
  <MaxKeys>4</MaxKeys>
  <Delimiter>/</Delimiter>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>t1</NextContinuationToken>
  <Contents><Key>images/a.bin</Key><Size>1000</Size></Contents>
  <Contents><Size>77</Size></Contents>
  <Contents><Key>images/b.bin</Key><Size>-1</Size></Contents>
  <CommonPrefixes><Prefix>images/rpi3/</Prefix></CommonPrefixes>
</ListBucketResult>"#;

    const LAST_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>images</Name>
  <Prefix>images/</Prefix>
  <KeyCount>1</KeyCount>
  <MaxKeys>4</MaxKeys>
  <Contents><Key>images/c.bin</Key><Size>24</Size></Contents>
  <CommonPrefixes><Prefix>images/nuc/</Prefix></CommonPrefixes>
</ListBucketResult>"#;

    #[test]
    fn size_conversion() {
        assert_eq!(to_size(Some(1024)), 1024);
        assert_eq!(to_size(Some(-1)), 0);
        assert_eq!(to_size(None), 0);
    }

    #[test]
    fn timestamp_conversion() {
        let dt = DateTime::from_secs_and_nanos(1_700_000_000, 500);
        let ts = to_timestamp(&dt).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
        assert_eq!(ts.subsec_nanosecond(), 500);
    }

    #[tokio::test]
    async fn head_404_is_not_found() {
        let (client, _) = replay_client(vec![event(404, "")]);
        let err = client.head_object("images/missing.zip").await.unwrap_err();
        assert!(err.is_not_found());

        let (client, _) = replay_client(vec![event(404, "")]);
        let storage = Storage::new(client);
        assert!(!storage.file_exists("images/missing.zip").await.unwrap());
    }

    #[tokio::test]
    async fn get_no_such_key_is_not_found() {
        let (client, _) = replay_client(vec![event(404, NO_SUCH_KEY)]);
        let err = client.get_object("images/missing.zip").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { ref key } if key == "images/missing.zip"));
    }

    #[tokio::test]
    async fn forbidden_is_a_backend_error() {
        let (client, _) = replay_client(vec![event(403, ""), event(403, ACCESS_DENIED)]);

        let err = client.head_object("images/secret.zip").await.unwrap_err();
        assert!(matches!(err, Error::Backend { operation: "head_object", .. }));

        let storage = Storage::new(client);
        let err = storage.get_file("images/secret.zip").await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(matches!(err, Error::Backend { operation: "get_object", .. }));
    }

    #[tokio::test]
    async fn server_error_is_a_backend_error() {
        let (client, _) = replay_client(vec![event(500, INTERNAL_ERROR), event(503, "")]);

        let err = client
            .list_objects(&ListRequest::new("images/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend { operation: "list_objects_v2", .. }));

        let err = Storage::new(client)
            .file_exists("images/logo.svg")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Backend { operation: "head_object", .. }));
    }

    #[tokio::test]
    async fn get_object_without_length_uses_body_size() {
        let (client, _) = replay_client(vec![event(200, "hello")]);
        let content = client.get_object("images/readme.txt").await.unwrap();
        assert_eq!(content.as_bytes(), b"hello");
        assert_eq!(content.info.size, 5);
        assert_eq!(content.info.key, "images/readme.txt");
    }

    #[tokio::test]
    async fn list_response_becomes_page() {
        let (client, _) = replay_client(vec![event(200, FIRST_PAGE), event(200, LAST_PAGE)]);
        let request = ListRequest::new("images/").with_delimiter("/");

        let page = client.list_objects(&request).await.unwrap();
        assert!(page.is_truncated);
        assert_eq!(page.next_continuation_token.as_deref(), Some("t1"));
        assert_eq!(
            page.objects,
            vec![
                ListedObject::new("images/a.bin", 1000),
                ListedObject::new("images/b.bin", 0),
            ]
        );
        assert_eq!(page.common_prefixes, vec!["images/rpi3/"]);

        let page = client.list_objects(&request).await.unwrap();
        assert!(!page.is_truncated);
        assert_eq!(page.next_continuation_token, None);
        assert_eq!(page.total_size(), 24);
    }

    #[tokio::test]
    async fn folder_walk_follows_continuation_tokens() {
        let (client, http_client) = replay_client(vec![
            event(200, FIRST_PAGE),
            event(200, LAST_PAGE),
            event(200, FIRST_PAGE),
            event(200, LAST_PAGE),
        ]);
        let storage = Storage::new(client).with_page_size(Some(4));

        assert_eq!(storage.get_folder_size("images").await.unwrap(), 1024);
        assert_eq!(storage.list_folders("images").await.unwrap(), vec!["rpi3", "nuc"]);

        let uris: Vec<String> = http_client
            .actual_requests()
            .map(|request| request.uri().to_owned())
            .collect();
        assert_eq!(uris.len(), 4);
        assert!(uris.iter().all(|uri| uri.contains("list-type=2")));
        assert!(uris.iter().all(|uri| uri.contains("max-keys=4")));
        assert!(!uris[0].contains("continuation-token"));
        assert!(uris[1].contains("continuation-token=t1"));
        assert!(uris[3].contains("delimiter="));
        assert!(!uris[1].contains("delimiter="));
    }

    #[tokio::test]
    async fn connect_unsigned_with_custom_endpoint() {
        let config = StorageConfig::new("images")
            .with_endpoint("http://localhost:9000")
            .with_force_path_style(true);

        let client = S3Client::connect(&config).await.unwrap();
        assert_eq!(client.id(), "s3");
        assert_eq!(client.bucket(), "images");
        assert_eq!(client.auth_style(), AuthStyle::Unsigned);
    }

    #[tokio::test]
    async fn connect_rejects_empty_bucket() {
        let err = S3Client::connect(&StorageConfig::new(" ")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }
}
