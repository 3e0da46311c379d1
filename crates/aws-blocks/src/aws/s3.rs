//! AWS S3 blocks.
use std::collections::HashMap;

use anyhow::Context;
use aws_sdk_s3::{
    operation::{
        copy_object::CopyObjectOutput, delete_object::DeleteObjectOutput,
        delete_objects::DeleteObjectsOutput, get_object::GetObjectOutput,
        head_object::HeadObjectOutput, list_buckets::ListBucketsOutput,
        list_objects_v2::ListObjectsV2Output, put_object::PutObjectOutput, RequestId,
    },
    primitives::ByteStream,
    types as aws,
};

use super::{timestamp, Empty, SdkConfig};
use crate::{
    response::{Body, Collected, Envelope},
    Block, FieldSpec, Schema,
};

/// Builds an S3 client. Endpoint overrides are addressed path-style.
fn client(cfg: &SdkConfig) -> aws_sdk_s3::Client {
    let mut config = aws_sdk_s3::config::Builder::from(cfg);
    if cfg.endpoint_url().is_some() {
        config = config.force_path_style(true);
    }
    aws_sdk_s3::Client::from_conf(config.build())
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct ListBuckets {
    /// Limits the response to bucket names that begin with this prefix.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Maximum number of buckets to return.
    #[serde(default)]
    pub max_buckets: Option<i32>,
    /// Token from a previous truncated listing.
    #[serde(default)]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct Bucket {
    pub name: Option<String>,
    /// When the bucket was created.
    pub creation_date: Option<String>,
}

impl From<&aws::Bucket> for Bucket {
    fn from(value: &aws::Bucket) -> Self {
        Bucket {
            name: value.name.clone(),
            creation_date: timestamp(value.creation_date.as_ref()),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct Owner {
    pub display_name: Option<String>,
    #[serde(rename = "ID")]
    pub id: Option<String>,
}

impl From<&aws::Owner> for Owner {
    fn from(value: &aws::Owner) -> Self {
        Owner {
            display_name: value.display_name.clone(),
            id: value.id.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct ListBucketsResponse {
    pub buckets: Vec<Bucket>,
    /// Owner of the listed buckets.
    pub owner: Option<Owner>,
    /// Present when the listing was truncated.
    pub continuation_token: Option<String>,
    pub prefix: Option<String>,
}

impl From<&ListBucketsOutput> for ListBucketsResponse {
    fn from(value: &ListBucketsOutput) -> Self {
        ListBucketsResponse {
            buckets: value
                .buckets
                .iter()
                .flatten()
                .map(Bucket::from)
                .collect(),
            owner: value.owner.as_ref().map(Owner::from),
            continuation_token: value.continuation_token.clone(),
            prefix: value.prefix.clone(),
        }
    }
}

impl Block for ListBuckets {
    const NAME: &'static str = "s3.list_buckets";
    const DESCRIPTION: &'static str = "Lists the buckets owned by the authenticated sender.";
    type Output = ListBucketsResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let out = client
            .list_buckets()
            .set_prefix(self.prefix)
            .set_max_buckets(self.max_buckets)
            .set_continuation_token(self.continuation_token)
            .send()
            .await?;
        log::info!("...listed {} buckets", out.buckets().len());
        Ok(Envelope::from_output(&ListBucketsResponse::from(&out))?
            .with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBucket {
    /// Name of the bucket to create.
    pub bucket: String,
    /// Canned ACL to apply, ie `private`.
    #[serde(default, rename = "ACL")]
    pub acl: Option<String>,
    /// Region to create the bucket in, if not the client's region.
    #[serde(default)]
    pub location_constraint: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBucketResponse {
    /// Where the bucket was created.
    pub location: Option<String>,
}

impl Block for CreateBucket {
    const NAME: &'static str = "s3.create_bucket";
    const DESCRIPTION: &'static str = "Creates a new bucket.";
    type Output = CreateBucketResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let configuration = self.location_constraint.as_deref().map(|constraint| {
            aws::CreateBucketConfiguration::builder()
                .location_constraint(aws::BucketLocationConstraint::from(constraint))
                .build()
        });
        let out = client
            .create_bucket()
            .bucket(&self.bucket)
            .set_acl(self.acl.as_deref().map(aws::BucketCannedAcl::from))
            .set_create_bucket_configuration(configuration)
            .send()
            .await?;
        log::info!("...created bucket {}", self.bucket);
        Ok(Envelope::from_output(&CreateBucketResponse {
            location: out.location.clone(),
        })?
        .with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteBucket {
    /// Name of the bucket to delete. It must be empty.
    pub bucket: String,
    /// Fails the request if the bucket is owned by a different account.
    #[serde(default)]
    pub expected_bucket_owner: Option<String>,
}

impl Block for DeleteBucket {
    const NAME: &'static str = "s3.delete_bucket";
    const DESCRIPTION: &'static str = "Deletes an empty bucket.";
    type Output = Empty;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let out = client
            .delete_bucket()
            .bucket(&self.bucket)
            .set_expected_bucket_owner(self.expected_bucket_owner)
            .send()
            .await?;
        log::info!("...deleted bucket {}", self.bucket);
        Ok(Envelope::new().with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct HeadBucket {
    pub bucket: String,
    #[serde(default)]
    pub expected_bucket_owner: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct HeadBucketResponse {
    pub bucket_region: Option<String>,
    /// Whether the bucket name is an access point alias.
    pub access_point_alias: Option<bool>,
}

impl Block for HeadBucket {
    const NAME: &'static str = "s3.head_bucket";
    const DESCRIPTION: &'static str =
        "Determines if a bucket exists and the caller has permission to access it.";
    type Output = HeadBucketResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let out = client
            .head_bucket()
            .bucket(self.bucket)
            .set_expected_bucket_owner(self.expected_bucket_owner)
            .send()
            .await?;
        Ok(Envelope::from_output(&HeadBucketResponse {
            bucket_region: out.bucket_region.clone(),
            access_point_alias: out.access_point_alias,
        })?
        .with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct GetBucketLocation {
    pub bucket: String,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct GetBucketLocationResponse {
    /// Region the bucket resides in. Empty for `us-east-1`.
    pub location_constraint: Option<String>,
}

impl Block for GetBucketLocation {
    const NAME: &'static str = "s3.get_bucket_location";
    const DESCRIPTION: &'static str = "Returns the region the bucket resides in.";
    type Output = GetBucketLocationResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let out = client
            .get_bucket_location()
            .bucket(self.bucket)
            .send()
            .await?;
        Ok(Envelope::from_output(&GetBucketLocationResponse {
            location_constraint: out
                .location_constraint
                .as_ref()
                .map(|c| c.as_str().to_owned()),
        })?
        .with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct ListObjectsV2 {
    pub bucket: String,
    /// Limits the response to keys that begin with this prefix.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Character used to group keys into common prefixes.
    #[serde(default)]
    pub delimiter: Option<String>,
    /// Maximum number of keys to return, at most 1000.
    #[serde(default)]
    pub max_keys: Option<i32>,
    #[serde(default)]
    pub continuation_token: Option<String>,
    /// Key to start listing after.
    #[serde(default)]
    pub start_after: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct Object {
    pub key: Option<String>,
    pub last_modified: Option<String>,
    #[serde(rename = "ETag")]
    pub e_tag: Option<String>,
    /// Size in bytes.
    pub size: Option<i64>,
    pub storage_class: Option<String>,
}

impl From<&aws::Object> for Object {
    fn from(value: &aws::Object) -> Self {
        Object {
            key: value.key.clone(),
            last_modified: timestamp(value.last_modified.as_ref()),
            e_tag: value.e_tag.clone(),
            size: value.size,
            storage_class: value.storage_class.as_ref().map(|c| c.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct CommonPrefix {
    pub prefix: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct ListObjectsV2Response {
    /// Bucket name.
    pub name: Option<String>,
    pub prefix: Option<String>,
    pub key_count: Option<i32>,
    /// Whether more keys remain after this page.
    pub is_truncated: Option<bool>,
    /// Pass as `ContinuationToken` to fetch the next page.
    pub next_continuation_token: Option<String>,
    pub contents: Vec<Object>,
    pub common_prefixes: Vec<CommonPrefix>,
}

impl From<&ListObjectsV2Output> for ListObjectsV2Response {
    fn from(value: &ListObjectsV2Output) -> Self {
        ListObjectsV2Response {
            name: value.name.clone(),
            prefix: value.prefix.clone(),
            key_count: value.key_count,
            is_truncated: value.is_truncated,
            next_continuation_token: value.next_continuation_token.clone(),
            contents: value.contents.iter().flatten().map(Object::from).collect(),
            common_prefixes: value
                .common_prefixes
                .iter()
                .flatten()
                .map(|p| CommonPrefix {
                    prefix: p.prefix.clone(),
                })
                .collect(),
        }
    }
}

impl Block for ListObjectsV2 {
    const NAME: &'static str = "s3.list_objects_v2";
    const DESCRIPTION: &'static str = "Lists some or all (up to 1,000) of the objects in a bucket.";
    type Output = ListObjectsV2Response;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let out = client
            .list_objects_v2()
            .bucket(self.bucket)
            .set_prefix(self.prefix)
            .set_delimiter(self.delimiter)
            .set_max_keys(self.max_keys)
            .set_continuation_token(self.continuation_token)
            .set_start_after(self.start_after)
            .send()
            .await?;
        Ok(Envelope::from_output(&ListObjectsV2Response::from(&out))?
            .with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct GetObject {
    pub bucket: String,
    pub key: String,
    #[serde(default)]
    pub version_id: Option<String>,
    /// Byte range to download, ie `bytes=0-9`.
    #[serde(default)]
    pub range: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct GetObjectResponse {
    pub content_type: Option<String>,
    pub content_length: Option<i64>,
    #[serde(rename = "ETag")]
    pub e_tag: Option<String>,
    pub last_modified: Option<String>,
    pub version_id: Option<String>,
    /// User-defined object metadata.
    pub metadata: Option<HashMap<String, String>>,
}

impl From<&GetObjectOutput> for GetObjectResponse {
    fn from(value: &GetObjectOutput) -> Self {
        GetObjectResponse {
            content_type: value.content_type.clone(),
            content_length: value.content_length,
            e_tag: value.e_tag.clone(),
            last_modified: timestamp(value.last_modified.as_ref()),
            version_id: value.version_id.clone(),
            metadata: value.metadata.clone(),
        }
    }
}

impl GetObject {
    /// Converts a `GetObject` response, handing the body stream to the envelope.
    fn envelope(out: GetObjectOutput) -> anyhow::Result<Envelope> {
        let response = GetObjectResponse::from(&out);
        let request_id = out.request_id().map(str::to_owned);
        Ok(Envelope::from_output(&response)?
            .with_request_id(request_id.as_deref())
            .with_body(Body::stream(out.body)))
    }
}

impl Block for GetObject {
    const NAME: &'static str = "s3.get_object";
    const DESCRIPTION: &'static str = "Retrieves an object and its body from a bucket.";
    type Output = GetObjectResponse;

    fn output_fields() -> Vec<FieldSpec> {
        let mut fields = GetObjectResponse::fields();
        fields.push(FieldSpec::body("Object data, read to completion and decoded as UTF-8."));
        fields
    }

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let out = client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .set_version_id(self.version_id)
            .set_range(self.range)
            .send()
            .await?;
        log::info!("...got object {}/{}", self.bucket, self.key);
        Self::envelope(out)
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct GetObjectTorrent {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct GetObjectTorrentResponse {
    /// Set when the requester was charged for the request.
    pub request_charged: Option<String>,
}

impl Block for GetObjectTorrent {
    const NAME: &'static str = "s3.get_object_torrent";
    const DESCRIPTION: &'static str = "Returns torrent files from a bucket.";
    type Output = GetObjectTorrentResponse;

    fn output_fields() -> Vec<FieldSpec> {
        let mut fields = GetObjectTorrentResponse::fields();
        fields.push(FieldSpec::body("The torrent file, decoded as UTF-8."));
        fields
    }

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let out = client
            .get_object_torrent()
            .bucket(self.bucket)
            .key(self.key)
            .send()
            .await?;
        let response = GetObjectTorrentResponse {
            request_charged: out.request_charged.as_ref().map(|c| c.as_str().to_owned()),
        };
        let request_id = out.request_id().map(str::to_owned);
        Ok(Envelope::from_output(&response)?
            .with_request_id(request_id.as_deref())
            .with_body(Body::transform(Collected::new(out.body))))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct HeadObject {
    pub bucket: String,
    pub key: String,
    #[serde(default)]
    pub version_id: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct HeadObjectResponse {
    pub content_type: Option<String>,
    pub content_length: Option<i64>,
    #[serde(rename = "ETag")]
    pub e_tag: Option<String>,
    pub last_modified: Option<String>,
    pub version_id: Option<String>,
    pub storage_class: Option<String>,
    /// User-defined object metadata.
    pub metadata: Option<HashMap<String, String>>,
}

impl From<&HeadObjectOutput> for HeadObjectResponse {
    fn from(value: &HeadObjectOutput) -> Self {
        HeadObjectResponse {
            content_type: value.content_type.clone(),
            content_length: value.content_length,
            e_tag: value.e_tag.clone(),
            last_modified: timestamp(value.last_modified.as_ref()),
            version_id: value.version_id.clone(),
            storage_class: value.storage_class.as_ref().map(|c| c.as_str().to_owned()),
            metadata: value.metadata.clone(),
        }
    }
}

impl Block for HeadObject {
    const NAME: &'static str = "s3.head_object";
    const DESCRIPTION: &'static str = "Retrieves an object's metadata without its body.";
    type Output = HeadObjectResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let out = client
            .head_object()
            .bucket(self.bucket)
            .key(self.key)
            .set_version_id(self.version_id)
            .send()
            .await?;
        Ok(Envelope::from_output(&HeadObjectResponse::from(&out))?
            .with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    /// Object data.
    pub body: String,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Canned ACL to apply to the object.
    #[serde(default, rename = "ACL")]
    pub acl: Option<String>,
    /// User-defined metadata to store with the object.
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct PutObjectResponse {
    #[serde(rename = "ETag")]
    pub e_tag: Option<String>,
    pub version_id: Option<String>,
    /// Base64 encoded SHA-256 of the uploaded object.
    #[serde(rename = "ChecksumSHA256")]
    pub checksum_sha256: Option<String>,
}

impl From<&PutObjectOutput> for PutObjectResponse {
    fn from(value: &PutObjectOutput) -> Self {
        PutObjectResponse {
            e_tag: value.e_tag.clone(),
            version_id: value.version_id.clone(),
            checksum_sha256: value.checksum_sha256.clone(),
        }
    }
}

impl Block for PutObject {
    const NAME: &'static str = "s3.put_object";
    const DESCRIPTION: &'static str = "Adds an object to a bucket.";
    type Output = PutObjectResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let checksum = crate::utils::sha256_base64(self.body.as_bytes());
        log::debug!("sending {} bytes with checksum {checksum}", self.body.len());
        let out = client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .set_content_type(self.content_type)
            .set_acl(self.acl.as_deref().map(aws::ObjectCannedAcl::from))
            .set_metadata(self.metadata)
            .checksum_algorithm(aws::ChecksumAlgorithm::Sha256)
            .checksum_sha256(checksum)
            .body(ByteStream::from(self.body.into_bytes()))
            .send()
            .await?;
        log::info!("...put object {}/{}", self.bucket, self.key);
        Ok(Envelope::from_output(&PutObjectResponse::from(&out))?
            .with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct CopyObject {
    /// Destination bucket.
    pub bucket: String,
    /// Destination key.
    pub key: String,
    /// Source object as `bucket/key`, optionally with `?versionId=`.
    pub copy_source: String,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct CopyObjectResult {
    #[serde(rename = "ETag")]
    pub e_tag: Option<String>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct CopyObjectResponse {
    pub copy_object_result: Option<CopyObjectResult>,
    /// Version of the new object.
    pub version_id: Option<String>,
    pub copy_source_version_id: Option<String>,
}

impl From<&CopyObjectOutput> for CopyObjectResponse {
    fn from(value: &CopyObjectOutput) -> Self {
        CopyObjectResponse {
            copy_object_result: value.copy_object_result.as_ref().map(|r| CopyObjectResult {
                e_tag: r.e_tag.clone(),
                last_modified: timestamp(r.last_modified.as_ref()),
            }),
            version_id: value.version_id.clone(),
            copy_source_version_id: value.copy_source_version_id.clone(),
        }
    }
}

impl Block for CopyObject {
    const NAME: &'static str = "s3.copy_object";
    const DESCRIPTION: &'static str = "Creates a copy of an object that is already stored in S3.";
    type Output = CopyObjectResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let out = client
            .copy_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .copy_source(&self.copy_source)
            .send()
            .await?;
        log::info!(
            "...copied {} to {}/{}",
            self.copy_source,
            self.bucket,
            self.key
        );
        Ok(Envelope::from_output(&CopyObjectResponse::from(&out))?
            .with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteObject {
    pub bucket: String,
    pub key: String,
    /// Deletes this version instead of adding a delete marker.
    #[serde(default)]
    pub version_id: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteObjectResponse {
    /// Whether the deleted version was, or created, a delete marker.
    pub delete_marker: Option<bool>,
    pub version_id: Option<String>,
}

impl From<&DeleteObjectOutput> for DeleteObjectResponse {
    fn from(value: &DeleteObjectOutput) -> Self {
        DeleteObjectResponse {
            delete_marker: value.delete_marker,
            version_id: value.version_id.clone(),
        }
    }
}

impl Block for DeleteObject {
    const NAME: &'static str = "s3.delete_object";
    const DESCRIPTION: &'static str = "Removes an object from a bucket.";
    type Output = DeleteObjectResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let out = client
            .delete_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .set_version_id(self.version_id)
            .send()
            .await?;
        log::info!("...deleted object {}/{}", self.bucket, self.key);
        Ok(Envelope::from_output(&DeleteObjectResponse::from(&out))?
            .with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectIdentifier {
    pub key: String,
    #[serde(default)]
    pub version_id: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteObjects {
    pub bucket: String,
    /// Objects to delete, at most 1000.
    pub objects: Vec<ObjectIdentifier>,
    /// Only report failed deletions.
    #[serde(default)]
    pub quiet: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DeletedObject {
    pub key: Option<String>,
    pub version_id: Option<String>,
    pub delete_marker: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteError {
    pub key: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteObjectsResponse {
    pub deleted: Vec<DeletedObject>,
    /// Objects that could not be deleted.
    pub errors: Vec<DeleteError>,
}

impl From<&DeleteObjectsOutput> for DeleteObjectsResponse {
    fn from(value: &DeleteObjectsOutput) -> Self {
        DeleteObjectsResponse {
            deleted: value
                .deleted
                .iter()
                .flatten()
                .map(|d| DeletedObject {
                    key: d.key.clone(),
                    version_id: d.version_id.clone(),
                    delete_marker: d.delete_marker,
                })
                .collect(),
            errors: value
                .errors
                .iter()
                .flatten()
                .map(|e| DeleteError {
                    key: e.key.clone(),
                    code: e.code.clone(),
                    message: e.message.clone(),
                })
                .collect(),
        }
    }
}

impl Block for DeleteObjects {
    const NAME: &'static str = "s3.delete_objects";
    const DESCRIPTION: &'static str = "Deletes multiple objects from a bucket in a single request.";
    type Output = DeleteObjectsResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = client(cfg);
        let objects = self
            .objects
            .into_iter()
            .map(|o| {
                aws::ObjectIdentifier::builder()
                    .key(o.key)
                    .set_version_id(o.version_id)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .context("invalid object identifier")?;
        log::debug!("deleting {} objects from {}", objects.len(), self.bucket);
        let delete = aws::Delete::builder()
            .set_objects(Some(objects))
            .set_quiet(self.quiet)
            .build()
            .context("invalid delete request")?;
        let out = client
            .delete_objects()
            .bucket(&self.bucket)
            .delete(delete)
            .send()
            .await?;
        let response = DeleteObjectsResponse::from(&out);
        if !response.errors.is_empty() {
            log::warn!(
                "{} objects could not be deleted from {}",
                response.errors.len(),
                self.bucket
            );
        }
        Ok(Envelope::from_output(&response)?.with_request_id(out.request_id()))
    }
}
