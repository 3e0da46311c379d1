//! AWS RDS blocks.
//!
//! RDS spells its acronyms in capitals (`DBInstanceIdentifier`, `MultiAZ`)
//! so most fields carry an explicit serde rename.
use aws_sdk_rds::{operation::RequestId, types as aws};

use super::{timestamp, Empty, SdkConfig};
use crate::{response::Envelope, Block, Schema};

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl From<&aws::Tag> for Tag {
    fn from(value: &aws::Tag) -> Self {
        Tag {
            key: value.key.clone(),
            value: value.value.clone(),
        }
    }
}

impl From<Tag> for aws::Tag {
    fn from(value: Tag) -> Self {
        aws::Tag::builder()
            .set_key(value.key)
            .set_value(value.value)
            .build()
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct Endpoint {
    /// DNS address of the instance.
    pub address: Option<String>,
    pub port: Option<i32>,
    pub hosted_zone_id: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: Option<String>,
    #[serde(rename = "DBInstanceClass")]
    pub db_instance_class: Option<String>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    /// Current state, ie `available` or `stopped`.
    #[serde(rename = "DBInstanceStatus")]
    pub db_instance_status: Option<String>,
    /// Not set until the instance is first available.
    pub endpoint: Option<Endpoint>,
    /// Allocated storage in GiB.
    pub allocated_storage: Option<i32>,
    #[serde(rename = "MultiAZ")]
    pub multi_az: Option<bool>,
    pub availability_zone: Option<String>,
    #[serde(rename = "DBName")]
    pub db_name: Option<String>,
    pub master_username: Option<String>,
    pub instance_create_time: Option<String>,
    #[serde(rename = "DBInstanceArn")]
    pub db_instance_arn: Option<String>,
}

impl From<&aws::DbInstance> for DbInstance {
    fn from(value: &aws::DbInstance) -> Self {
        DbInstance {
            db_instance_identifier: value.db_instance_identifier.clone(),
            db_instance_class: value.db_instance_class.clone(),
            engine: value.engine.clone(),
            engine_version: value.engine_version.clone(),
            db_instance_status: value.db_instance_status.clone(),
            endpoint: value.endpoint.as_ref().map(|e| Endpoint {
                address: e.address.clone(),
                port: e.port,
                hosted_zone_id: e.hosted_zone_id.clone(),
            }),
            allocated_storage: value.allocated_storage,
            multi_az: value.multi_az,
            availability_zone: value.availability_zone.clone(),
            db_name: value.db_name.clone(),
            master_username: value.master_username.clone(),
            instance_create_time: timestamp(value.instance_create_time.as_ref()),
            db_instance_arn: value.db_instance_arn.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DbCluster {
    #[serde(rename = "DBClusterIdentifier")]
    pub db_cluster_identifier: Option<String>,
    pub status: Option<String>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    /// Writer endpoint.
    pub endpoint: Option<String>,
    pub reader_endpoint: Option<String>,
    pub port: Option<i32>,
    #[serde(rename = "MultiAZ")]
    pub multi_az: Option<bool>,
    pub cluster_create_time: Option<String>,
    #[serde(rename = "DBClusterArn")]
    pub db_cluster_arn: Option<String>,
}

impl From<&aws::DbCluster> for DbCluster {
    fn from(value: &aws::DbCluster) -> Self {
        DbCluster {
            db_cluster_identifier: value.db_cluster_identifier.clone(),
            status: value.status.clone(),
            engine: value.engine.clone(),
            engine_version: value.engine_version.clone(),
            endpoint: value.endpoint.clone(),
            reader_endpoint: value.reader_endpoint.clone(),
            port: value.port,
            multi_az: value.multi_az,
            cluster_create_time: timestamp(value.cluster_create_time.as_ref()),
            db_cluster_arn: value.db_cluster_arn.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DbSnapshot {
    #[serde(rename = "DBSnapshotIdentifier")]
    pub db_snapshot_identifier: Option<String>,
    #[serde(rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: Option<String>,
    pub snapshot_create_time: Option<String>,
    pub engine: Option<String>,
    pub allocated_storage: Option<i32>,
    pub status: Option<String>,
    /// `manual` or `automated`.
    pub snapshot_type: Option<String>,
    #[serde(rename = "DBSnapshotArn")]
    pub db_snapshot_arn: Option<String>,
}

impl From<&aws::DbSnapshot> for DbSnapshot {
    fn from(value: &aws::DbSnapshot) -> Self {
        DbSnapshot {
            db_snapshot_identifier: value.db_snapshot_identifier.clone(),
            db_instance_identifier: value.db_instance_identifier.clone(),
            snapshot_create_time: timestamp(value.snapshot_create_time.as_ref()),
            engine: value.engine.clone(),
            allocated_storage: value.allocated_storage,
            status: value.status.clone(),
            snapshot_type: value.snapshot_type.clone(),
            db_snapshot_arn: value.db_snapshot_arn.clone(),
        }
    }
}

/// Output of blocks that act on a single instance.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
pub struct DbInstanceResponse {
    #[serde(rename = "DBInstance")]
    pub db_instance: Option<DbInstance>,
}

impl DbInstanceResponse {
    fn envelope(
        instance: Option<&aws::DbInstance>,
        request_id: Option<&str>,
    ) -> anyhow::Result<Envelope> {
        let response = DbInstanceResponse {
            db_instance: instance.map(DbInstance::from),
        };
        if let Some(status) = response
            .db_instance
            .as_ref()
            .and_then(|i| i.db_instance_status.as_deref())
        {
            log::info!("...instance is {status}");
        }
        Ok(Envelope::from_output(&response)?.with_request_id(request_id))
    }
}

/// Output of blocks that act on a single snapshot.
#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
pub struct DbSnapshotResponse {
    #[serde(rename = "DBSnapshot")]
    pub db_snapshot: Option<DbSnapshot>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDbInstances {
    /// Describes only this instance. All instances when omitted.
    #[serde(default, rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: Option<String>,
    /// Page size, between 20 and 100.
    #[serde(default)]
    pub max_records: Option<i32>,
    /// Token from a previous page.
    #[serde(default)]
    pub marker: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDbInstancesResponse {
    #[serde(rename = "DBInstances")]
    pub db_instances: Vec<DbInstance>,
    /// Set when more records remain.
    pub marker: Option<String>,
}

impl Block for DescribeDbInstances {
    const NAME: &'static str = "rds.describe_db_instances";
    const DESCRIPTION: &'static str = "Describes provisioned RDS instances.";
    type Output = DescribeDbInstancesResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let out = client
            .describe_db_instances()
            .set_db_instance_identifier(self.db_instance_identifier)
            .set_max_records(self.max_records)
            .set_marker(self.marker)
            .send()
            .await?;
        let response = DescribeDbInstancesResponse {
            db_instances: out.db_instances().iter().map(DbInstance::from).collect(),
            marker: out.marker.clone(),
        };
        log::info!("...found {} instances", response.db_instances.len());
        Ok(Envelope::from_output(&response)?.with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: String,
    /// Compute and memory capacity, ie `db.t3.micro`.
    #[serde(rename = "DBInstanceClass")]
    pub db_instance_class: String,
    /// Database engine, ie `postgres` or `mysql`.
    pub engine: String,
    /// Storage in GiB.
    #[serde(default)]
    pub allocated_storage: Option<i32>,
    #[serde(default)]
    pub master_username: Option<String>,
    #[serde(default)]
    pub master_user_password: Option<String>,
    /// Name of the database created with the instance.
    #[serde(default, rename = "DBName")]
    pub db_name: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Block for CreateDbInstance {
    const NAME: &'static str = "rds.create_db_instance";
    const DESCRIPTION: &'static str = "Creates a new RDS instance.";
    type Output = DbInstanceResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let tags = if self.tags.is_empty() {
            None
        } else {
            Some(self.tags.into_iter().map(aws::Tag::from).collect())
        };
        log::debug!(
            "creating {} instance {} of class {}",
            self.engine,
            self.db_instance_identifier,
            self.db_instance_class
        );
        let out = client
            .create_db_instance()
            .db_instance_identifier(self.db_instance_identifier)
            .db_instance_class(self.db_instance_class)
            .engine(self.engine)
            .set_allocated_storage(self.allocated_storage)
            .set_master_username(self.master_username)
            .set_master_user_password(self.master_user_password)
            .set_db_name(self.db_name)
            .set_tags(tags)
            .send()
            .await?;
        DbInstanceResponse::envelope(out.db_instance.as_ref(), out.request_id())
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct StartDbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: String,
}

impl Block for StartDbInstance {
    const NAME: &'static str = "rds.start_db_instance";
    const DESCRIPTION: &'static str = "Starts a stopped RDS instance.";
    type Output = DbInstanceResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let out = client
            .start_db_instance()
            .db_instance_identifier(self.db_instance_identifier)
            .send()
            .await?;
        DbInstanceResponse::envelope(out.db_instance.as_ref(), out.request_id())
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct StopDbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: String,
    /// Takes a snapshot with this name before stopping.
    #[serde(default, rename = "DBSnapshotIdentifier")]
    pub db_snapshot_identifier: Option<String>,
}

impl Block for StopDbInstance {
    const NAME: &'static str = "rds.stop_db_instance";
    const DESCRIPTION: &'static str = "Stops a running RDS instance.";
    type Output = DbInstanceResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let out = client
            .stop_db_instance()
            .db_instance_identifier(self.db_instance_identifier)
            .set_db_snapshot_identifier(self.db_snapshot_identifier)
            .send()
            .await?;
        DbInstanceResponse::envelope(out.db_instance.as_ref(), out.request_id())
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct RebootDbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: String,
    /// Reboot through a Multi-AZ failover.
    #[serde(default)]
    pub force_failover: Option<bool>,
}

impl Block for RebootDbInstance {
    const NAME: &'static str = "rds.reboot_db_instance";
    const DESCRIPTION: &'static str = "Restarts the database engine service of an RDS instance.";
    type Output = DbInstanceResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let out = client
            .reboot_db_instance()
            .db_instance_identifier(self.db_instance_identifier)
            .set_force_failover(self.force_failover)
            .send()
            .await?;
        DbInstanceResponse::envelope(out.db_instance.as_ref(), out.request_id())
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteDbInstance {
    #[serde(rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: String,
    /// Required to be `true` when no final snapshot is named.
    #[serde(default)]
    pub skip_final_snapshot: Option<bool>,
    #[serde(default, rename = "FinalDBSnapshotIdentifier")]
    pub final_db_snapshot_identifier: Option<String>,
    #[serde(default)]
    pub delete_automated_backups: Option<bool>,
}

impl Block for DeleteDbInstance {
    const NAME: &'static str = "rds.delete_db_instance";
    const DESCRIPTION: &'static str = "Deletes an RDS instance.";
    type Output = DbInstanceResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        if self.skip_final_snapshot != Some(true) && self.final_db_snapshot_identifier.is_none() {
            log::warn!(
                "deleting {} without SkipFinalSnapshot or FinalDBSnapshotIdentifier, \
                 RDS will likely reject this",
                self.db_instance_identifier
            );
        }
        let out = client
            .delete_db_instance()
            .db_instance_identifier(self.db_instance_identifier)
            .set_skip_final_snapshot(self.skip_final_snapshot)
            .set_final_db_snapshot_identifier(self.final_db_snapshot_identifier)
            .set_delete_automated_backups(self.delete_automated_backups)
            .send()
            .await?;
        DbInstanceResponse::envelope(out.db_instance.as_ref(), out.request_id())
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDbClusters {
    #[serde(default, rename = "DBClusterIdentifier")]
    pub db_cluster_identifier: Option<String>,
    #[serde(default)]
    pub max_records: Option<i32>,
    #[serde(default)]
    pub marker: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDbClustersResponse {
    #[serde(rename = "DBClusters")]
    pub db_clusters: Vec<DbCluster>,
    pub marker: Option<String>,
}

impl Block for DescribeDbClusters {
    const NAME: &'static str = "rds.describe_db_clusters";
    const DESCRIPTION: &'static str = "Describes Aurora and Multi-AZ DB clusters.";
    type Output = DescribeDbClustersResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let out = client
            .describe_db_clusters()
            .set_db_cluster_identifier(self.db_cluster_identifier)
            .set_max_records(self.max_records)
            .set_marker(self.marker)
            .send()
            .await?;
        let response = DescribeDbClustersResponse {
            db_clusters: out.db_clusters().iter().map(DbCluster::from).collect(),
            marker: out.marker.clone(),
        };
        Ok(Envelope::from_output(&response)?.with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDbSnapshots {
    #[serde(default, rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: Option<String>,
    #[serde(default, rename = "DBSnapshotIdentifier")]
    pub db_snapshot_identifier: Option<String>,
    /// ie `manual`, `automated` or `shared`.
    #[serde(default)]
    pub snapshot_type: Option<String>,
    #[serde(default)]
    pub max_records: Option<i32>,
    #[serde(default)]
    pub marker: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDbSnapshotsResponse {
    #[serde(rename = "DBSnapshots")]
    pub db_snapshots: Vec<DbSnapshot>,
    pub marker: Option<String>,
}

impl Block for DescribeDbSnapshots {
    const NAME: &'static str = "rds.describe_db_snapshots";
    const DESCRIPTION: &'static str = "Describes RDS instance snapshots.";
    type Output = DescribeDbSnapshotsResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let out = client
            .describe_db_snapshots()
            .set_db_instance_identifier(self.db_instance_identifier)
            .set_db_snapshot_identifier(self.db_snapshot_identifier)
            .set_snapshot_type(self.snapshot_type)
            .set_max_records(self.max_records)
            .set_marker(self.marker)
            .send()
            .await?;
        let response = DescribeDbSnapshotsResponse {
            db_snapshots: out.db_snapshots().iter().map(DbSnapshot::from).collect(),
            marker: out.marker.clone(),
        };
        Ok(Envelope::from_output(&response)?.with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDbSnapshot {
    #[serde(rename = "DBSnapshotIdentifier")]
    pub db_snapshot_identifier: String,
    #[serde(rename = "DBInstanceIdentifier")]
    pub db_instance_identifier: String,
}

impl Block for CreateDbSnapshot {
    const NAME: &'static str = "rds.create_db_snapshot";
    const DESCRIPTION: &'static str = "Creates a snapshot of an RDS instance.";
    type Output = DbSnapshotResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let out = client
            .create_db_snapshot()
            .db_snapshot_identifier(&self.db_snapshot_identifier)
            .db_instance_identifier(&self.db_instance_identifier)
            .send()
            .await?;
        log::info!(
            "...snapshotting {} as {}",
            self.db_instance_identifier,
            self.db_snapshot_identifier
        );
        let response = DbSnapshotResponse {
            db_snapshot: out.db_snapshot.as_ref().map(DbSnapshot::from),
        };
        Ok(Envelope::from_output(&response)?.with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteDbSnapshot {
    #[serde(rename = "DBSnapshotIdentifier")]
    pub db_snapshot_identifier: String,
}

impl Block for DeleteDbSnapshot {
    const NAME: &'static str = "rds.delete_db_snapshot";
    const DESCRIPTION: &'static str = "Deletes a manual RDS instance snapshot.";
    type Output = DbSnapshotResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let out = client
            .delete_db_snapshot()
            .db_snapshot_identifier(self.db_snapshot_identifier)
            .send()
            .await?;
        let response = DbSnapshotResponse {
            db_snapshot: out.db_snapshot.as_ref().map(DbSnapshot::from),
        };
        Ok(Envelope::from_output(&response)?.with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct ListTagsForResource {
    /// ARN of the resource.
    pub resource_name: String,
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct ListTagsForResourceResponse {
    pub tag_list: Vec<Tag>,
}

impl Block for ListTagsForResource {
    const NAME: &'static str = "rds.list_tags_for_resource";
    const DESCRIPTION: &'static str = "Lists all tags on an RDS resource.";
    type Output = ListTagsForResourceResponse;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let out = client
            .list_tags_for_resource()
            .resource_name(self.resource_name)
            .send()
            .await?;
        let response = ListTagsForResourceResponse {
            tag_list: out.tag_list().iter().map(Tag::from).collect(),
        };
        Ok(Envelope::from_output(&response)?.with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct AddTagsToResource {
    /// ARN of the resource.
    pub resource_name: String,
    pub tags: Vec<Tag>,
}

impl Block for AddTagsToResource {
    const NAME: &'static str = "rds.add_tags_to_resource";
    const DESCRIPTION: &'static str = "Adds metadata tags to an RDS resource.";
    type Output = Empty;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        log::debug!("tagging {} with {} tags", self.resource_name, self.tags.len());
        let out = client
            .add_tags_to_resource()
            .resource_name(self.resource_name)
            .set_tags(Some(self.tags.into_iter().map(aws::Tag::from).collect()))
            .send()
            .await?;
        Ok(Envelope::new().with_request_id(out.request_id()))
    }
}

#[derive(Debug, Default, Clone, PartialEq, serde::Serialize, serde::Deserialize, Schema)]
#[serde(rename_all = "PascalCase")]
pub struct RemoveTagsFromResource {
    pub resource_name: String,
    /// Keys of the tags to remove.
    pub tag_keys: Vec<String>,
}

impl Block for RemoveTagsFromResource {
    const NAME: &'static str = "rds.remove_tags_from_resource";
    const DESCRIPTION: &'static str = "Removes metadata tags from an RDS resource.";
    type Output = Empty;

    async fn call(self, cfg: &SdkConfig) -> anyhow::Result<Envelope> {
        let client = aws_sdk_rds::Client::new(cfg);
        let out = client
            .remove_tags_from_resource()
            .resource_name(self.resource_name)
            .set_tag_keys(Some(self.tag_keys))
            .send()
            .await?;
        Ok(Envelope::new().with_request_id(out.request_id()))
    }
}

#[cfg(test)]
mod test {
    use aws_sdk_rds::primitives::DateTime;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{FieldKind, FieldSpec};

    fn instance() -> aws::DbInstance {
        aws::DbInstance::builder()
            .db_instance_identifier("orders")
            .db_instance_class("db.t3.micro")
            .engine("postgres")
            .db_instance_status("available")
            .endpoint(
                aws::Endpoint::builder()
                    .address("orders.abc.us-east-1.rds.amazonaws.com")
                    .port(5432)
                    .build(),
            )
            .allocated_storage(20)
            .multi_az(false)
            .instance_create_time(DateTime::from_secs(1_700_000_000))
            .build()
    }

    #[test]
    fn instance_input_uses_rds_casing() {
        let fields = DeleteDbInstance::fields();
        assert_eq!(
            vec![
                "DBInstanceIdentifier",
                "SkipFinalSnapshot",
                "FinalDBSnapshotIdentifier",
                "DeleteAutomatedBackups",
            ],
            fields.iter().map(|f| f.name).collect::<Vec<_>>()
        );
        assert!(fields[0].required);
        assert!(fields[1..].iter().all(|f| !f.required));
    }

    #[test]
    fn create_input_schema() {
        let fields = CreateDbInstance::fields();
        let tags = fields.iter().find(|f| f.name == "Tags").unwrap();
        assert_eq!(FieldKind::Array, tags.kind);
        // defaulted collections aren't required
        assert!(!tags.required);
        assert_eq!(
            &FieldSpec {
                name: "DBInstanceClass",
                kind: FieldKind::String,
                required: true,
                description: "Compute and memory capacity, ie `db.t3.micro`.",
            },
            fields.iter().find(|f| f.name == "DBInstanceClass").unwrap()
        );
    }

    #[test]
    fn input_deserializes() {
        let block: AddTagsToResource = serde_json::from_value(json!({
            "ResourceName": "arn:aws:rds:us-east-1:123456789012:db:orders",
            "Tags": [{"Key": "team", "Value": "payments"}],
        }))
        .unwrap();
        assert_eq!(
            vec![Tag {
                key: Some("team".to_owned()),
                value: Some("payments".to_owned()),
            }],
            block.tags
        );

        let missing = serde_json::from_value::<CreateDbSnapshot>(json!({
            "DBSnapshotIdentifier": "orders-final",
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn instance_response() {
        let envelope = DbInstanceResponse::envelope(Some(&instance()), Some("req-7")).unwrap();
        assert_eq!(
            &json!({
                "DBInstance": {
                    "DBInstanceIdentifier": "orders",
                    "DBInstanceClass": "db.t3.micro",
                    "Engine": "postgres",
                    "EngineVersion": null,
                    "DBInstanceStatus": "available",
                    "Endpoint": {
                        "Address": "orders.abc.us-east-1.rds.amazonaws.com",
                        "Port": 5432,
                        "HostedZoneId": null,
                    },
                    "AllocatedStorage": 20,
                    "MultiAZ": false,
                    "AvailabilityZone": null,
                    "DBName": null,
                    "MasterUsername": null,
                    "InstanceCreateTime": "2023-11-14T22:13:20Z",
                    "DBInstanceArn": null,
                },
                "$metadata": {"requestId": "req-7"},
            }),
            &serde_json::Value::Object(envelope.fields().clone())
        );
        assert!(envelope.body().is_none());
    }

    #[test]
    fn missing_instance_is_null() {
        let envelope = DbInstanceResponse::envelope(None, None).unwrap();
        assert_eq!(&json!(null), &envelope.fields()["DBInstance"]);
    }

    #[test]
    fn cluster_and_snapshot_conversion() {
        let cluster = DbCluster::from(
            &aws::DbCluster::builder()
                .db_cluster_identifier("analytics")
                .status("available")
                .endpoint("analytics.cluster-abc.us-east-1.rds.amazonaws.com")
                .port(3306)
                .build(),
        );
        assert_eq!(Some("analytics".to_owned()), cluster.db_cluster_identifier);
        assert_eq!(Some(3306), cluster.port);
        assert_eq!(None, cluster.cluster_create_time);

        let snapshot = DbSnapshot::from(
            &aws::DbSnapshot::builder()
                .db_snapshot_identifier("orders-2024")
                .db_instance_identifier("orders")
                .snapshot_type("manual")
                .snapshot_create_time(DateTime::from_secs(0))
                .build(),
        );
        assert_eq!(
            Some("1970-01-01T00:00:00Z".to_owned()),
            snapshot.snapshot_create_time
        );
        assert_eq!(Some("manual".to_owned()), snapshot.snapshot_type);
    }

    #[test]
    fn tags_convert_both_ways() {
        let tag = aws::Tag::from(Tag {
            key: Some("env".to_owned()),
            value: Some("prod".to_owned()),
        });
        assert_eq!(Some("env"), tag.key());
        assert_eq!(
            Tag {
                key: Some("env".to_owned()),
                value: Some("prod".to_owned()),
            },
            Tag::from(&tag)
        );
    }
}
