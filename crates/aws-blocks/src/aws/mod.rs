//! Blocks for AWS.

pub use aws_config::SdkConfig;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::{provider::SharedCredentialsProvider, Credentials};
use aws_smithy_types::{date_time::Format, DateTime};
use snafu::ResultExt;

use crate::{BlockInfo, ConnectionParseSnafu, Schema};

pub mod rds;
pub mod s3;

/// Region and static credentials used to build every client.
#[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Connection {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
    /// Overrides the service endpoint, ie for a local S3 stand-in.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl core::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl Connection {
    pub fn from_toml_str(s: &str) -> crate::Result<Self> {
        toml::from_str(s).context(ConnectionParseSnafu)
    }

    /// Builds the SDK config shared by all clients of a single invocation.
    ///
    /// Only the connection's own values are used. Environment variables and
    /// shared profile files are never consulted.
    pub fn sdk_config(&self) -> SdkConfig {
        log::debug!("building sdk config for region {}", self.region);
        let credentials = Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            self.session_token.clone(),
            None,
            "aws-blocks",
        );
        let mut builder = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .credentials_provider(SharedCredentialsProvider::new(credentials));
        if let Some(url) = self.endpoint_url.as_deref() {
            log::debug!("  using endpoint {url}");
            builder = builder.endpoint_url(url);
        }
        builder.build()
    }
}

/// Output of blocks that emit nothing but the request metadata.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
pub struct Empty {}

/// Formats an SDK timestamp as RFC 3339.
pub(crate) fn timestamp(value: Option<&DateTime>) -> Option<String> {
    let value = value?;
    match value.fmt(Format::DateTime) {
        Ok(s) => Some(s),
        Err(e) => {
            log::warn!("dropping unrepresentable timestamp {value:?}: {e}");
            None
        }
    }
}

/// Every block, S3 first.
pub fn catalog() -> Vec<BlockInfo> {
    vec![
        BlockInfo::of::<s3::ListBuckets>(),
        BlockInfo::of::<s3::CreateBucket>(),
        BlockInfo::of::<s3::DeleteBucket>(),
        BlockInfo::of::<s3::HeadBucket>(),
        BlockInfo::of::<s3::GetBucketLocation>(),
        BlockInfo::of::<s3::ListObjectsV2>(),
        BlockInfo::of::<s3::GetObject>(),
        BlockInfo::of::<s3::GetObjectTorrent>(),
        BlockInfo::of::<s3::HeadObject>(),
        BlockInfo::of::<s3::PutObject>(),
        BlockInfo::of::<s3::CopyObject>(),
        BlockInfo::of::<s3::DeleteObject>(),
        BlockInfo::of::<s3::DeleteObjects>(),
        BlockInfo::of::<rds::DescribeDbInstances>(),
        BlockInfo::of::<rds::CreateDbInstance>(),
        BlockInfo::of::<rds::StartDbInstance>(),
        BlockInfo::of::<rds::StopDbInstance>(),
        BlockInfo::of::<rds::RebootDbInstance>(),
        BlockInfo::of::<rds::DeleteDbInstance>(),
        BlockInfo::of::<rds::DescribeDbClusters>(),
        BlockInfo::of::<rds::DescribeDbSnapshots>(),
        BlockInfo::of::<rds::CreateDbSnapshot>(),
        BlockInfo::of::<rds::DeleteDbSnapshot>(),
        BlockInfo::of::<rds::ListTagsForResource>(),
        BlockInfo::of::<rds::AddTagsToResource>(),
        BlockInfo::of::<rds::RemoveTagsFromResource>(),
    ]
}

/// Looks up a block by its catalog name.
pub fn find_block(name: &str) -> Option<BlockInfo> {
    catalog().into_iter().find(|info| info.name == name)
}
