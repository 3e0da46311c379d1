use std::collections::HashSet;

use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{self as blocks, *};


use endpoint::{Canned, Endpoint};

#[derive(Debug, serde::Deserialize, serde::Serialize, Schema)]
#[serde(rename_all = "camelCase")]
struct Echo {
    /// The text to echo back.
    message_text: String,
    #[serde(default)]
    repeat: Option<u32>,
    #[serde(default, rename = "Upper")]
    shout: bool,
}

#[derive(Debug, serde::Serialize, Schema)]
struct Echoed {
    echoed: String,
}

impl Block for Echo {
    const NAME: &'static str = "test.echo";
    const DESCRIPTION: &'static str = "Echoes its input.";
    type Output = Echoed;

    async fn call(self, _cfg: &aws::SdkConfig) -> anyhow::Result<Envelope> {
        let mut text = self.message_text.repeat(self.repeat.unwrap_or(1) as usize);
        if self.shout {
            text = text.to_uppercase();
        }
        let envelope = Envelope::from_output(&Echoed { echoed: text.clone() })?;
        Ok(envelope.with_body(Body::value(text)))
    }
}

struct Fails;

impl Schema for Fails {
    fn fields() -> Vec<FieldSpec> {
        vec![]
    }
}

impl<'de> serde::Deserialize<'de> for Fails {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(Fails)
    }
}

impl Block for Fails {
    const NAME: &'static str = "test.fails";
    const DESCRIPTION: &'static str = "Always fails.";
    type Output = Echoed;

    async fn call(self, _cfg: &aws::SdkConfig) -> anyhow::Result<Envelope> {
        Err(anyhow::anyhow!("access denied").context("sending request"))
    }
}

fn connection() -> Connection {
    Connection {
        region: "us-east-1".to_owned(),
        access_key_id: "AKIDEXAMPLE".to_owned(),
        secret_access_key: "wJalrXUtnFEMI".to_owned(),
        session_token: None,
        endpoint_url: Some("http://127.0.0.1:1".to_owned()),
    }
}

fn connection_to(endpoint: &Endpoint) -> Connection {
    Connection {
        endpoint_url: Some(endpoint.url.clone()),
        ..connection()
    }
}

async fn run(endpoint: &Endpoint, block: &str, input: serde_json::Value) -> serde_json::Value {
    let event = Event {
        block: block.to_owned(),
        input,
    };
    let emitted = handle_event(&connection_to(endpoint), event).await.unwrap();
    serde_json::Value::Object(emitted)
}

#[test]
fn catalog_names_are_unique_and_namespaced() {
    let _ = env_logger::builder().is_test(true).try_init();
    let catalog = catalog();
    assert_eq!(26, catalog.len());
    let names = catalog.iter().map(|info| info.name).collect::<HashSet<_>>();
    assert_eq!(catalog.len(), names.len());
    for info in catalog.iter() {
        assert!(
            info.name.starts_with("s3.") || info.name.starts_with("rds."),
            "{} is not namespaced",
            info.name
        );
        assert!(!info.description.is_empty(), "{} has no description", info.name);
    }
}

#[test]
fn find_block_by_name() {
    let info = find_block("s3.get_object").unwrap();
    assert_eq!("s3.get_object", info.name);
    assert!(info.output.iter().any(|f| f.name == "Body"));
    assert!(find_block("s3.nope").is_none());
}

#[test]
fn derived_schema() {
    assert_eq!(
        vec![
            FieldSpec {
                name: "messageText",
                kind: FieldKind::String,
                required: true,
                description: "The text to echo back.",
            },
            FieldSpec {
                name: "repeat",
                kind: FieldKind::Number,
                required: false,
                description: "",
            },
            FieldSpec {
                name: "Upper",
                kind: FieldKind::Boolean,
                required: false,
                description: "",
            },
        ],
        Echo::fields()
    );
}

#[test]
fn schema_json() {
    let info = BlockInfo::of::<Echo>();
    assert_eq!(
        json!({
            "name": "test.echo",
            "description": "Echoes its input.",
            "input": [
                {"name": "messageText", "kind": "string", "required": true, "description": "The text to echo back."},
                {"name": "repeat", "kind": "number", "required": false, "description": ""},
                {"name": "Upper", "kind": "boolean", "required": false, "description": ""},
            ],
            "output": [
                {"name": "echoed", "kind": "string", "required": true, "description": ""},
            ],
        }),
        info.schema()
    );
}

#[tokio::test]
async fn run_deserializes_and_calls() {
    let cfg = connection().sdk_config();
    let info = BlockInfo::of::<Echo>();
    let mut envelope = info
        .run(cfg, json!({"messageText": "ab", "repeat": 2, "Upper": true}))
        .await
        .unwrap();
    let emitted = serialize_response(Some(&mut envelope)).await;
    assert_eq!(
        json!({"echoed": "ABAB", "Body": "ABAB"}),
        serde_json::Value::Object(emitted)
    );
}

#[tokio::test]
async fn run_rejects_invalid_input() {
    let cfg = connection().sdk_config();
    let result = BlockInfo::of::<Echo>().run(cfg, json!({"repeat": 2})).await;
    match result {
        Err(Error::InvalidInput { block, .. }) => assert_eq!("test.echo", block),
        other => panic!("expected invalid input, saw {other:?}"),
    }
}

#[tokio::test]
async fn call_errors_keep_their_chain() {
    let cfg = connection().sdk_config();
    let err = BlockInfo::of::<Fails>()
        .run(cfg, json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Call { block: "test.fails", .. }));
    let msg = err.to_string();
    assert!(msg.contains("sending request"), "{msg}");
    assert!(msg.contains("access denied"), "{msg}");
}

#[tokio::test]
async fn handle_event_unknown_block() {
    let event = Event {
        block: "ec2.run_instances".to_owned(),
        input: json!({}),
    };
    let err = handle_event(&connection(), event).await.unwrap_err();
    assert!(matches!(err, Error::UnknownBlock { ref name } if name == "ec2.run_instances"));
}

#[tokio::test]
async fn handle_event_invalid_input() {
    let event = Event {
        block: "s3.get_object".to_owned(),
        input: json!({"Bucket": "only-a-bucket"}),
    };
    let err = handle_event(&connection(), event).await.unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput {
            block: "s3.get_object",
            ..
        }
    ));
}

#[test]
fn event_input_defaults_to_null() {
    let event: Event = serde_json::from_value(json!({"block": "s3.list_buckets"})).unwrap();
    assert_eq!(serde_json::Value::Null, event.input);
}

#[test]
fn anyhow_errors_convert() {
    let err: blocks::Error = anyhow::anyhow!("outer").into();
    assert!(matches!(err, Error::Block { .. }));
}

#[tokio::test]
async fn get_object_emits_drained_body() {
    let _ = env_logger::builder().is_test(true).try_init();
    let endpoint = Endpoint::serve([Canned::ok("hello from s3")
        .header("Content-Type", "text/plain")
        .header("ETag", "\"5d41402a\"")
        .header("Last-Modified", "Wed, 21 Oct 2015 07:28:00 GMT")
        .header("x-amz-request-id", "req-get")])
    .await;
    let emitted = run(
        &endpoint,
        "s3.get_object",
        json!({"Bucket": "docs", "Key": "hello.txt"}),
    )
    .await;

    assert_eq!(json!("hello from s3"), emitted["Body"]);
    assert_eq!(json!("text/plain"), emitted["ContentType"]);
    assert_eq!(json!(13), emitted["ContentLength"]);
    assert_eq!(json!("\"5d41402a\""), emitted["ETag"]);
    assert_eq!(json!("2015-10-21T07:28:00Z"), emitted["LastModified"]);
    assert_eq!(json!({"requestId": "req-get"}), emitted["$metadata"]);
    assert!(emitted.get("BodyMetadata").is_none());

    let requests = endpoint.requests();
    assert_eq!(1, requests.len());
    assert_eq!("GET", requests[0].method);
    assert!(
        requests[0].path.starts_with("/docs/hello.txt"),
        "{}",
        requests[0].path
    );
}

#[tokio::test]
async fn put_object_sends_checksum_and_acl() {
    let endpoint = Endpoint::serve([Canned::ok("")
        .header("ETag", "\"abc\"")
        .header("x-amz-request-id", "req-put")])
    .await;
    let emitted = run(
        &endpoint,
        "s3.put_object",
        json!({
            "Bucket": "docs",
            "Key": "greeting.txt",
            "Body": "hello",
            "ACL": "public-read",
            "ContentType": "text/plain",
        }),
    )
    .await;

    assert_eq!(json!("\"abc\""), emitted["ETag"]);
    assert_eq!(json!({"requestId": "req-put"}), emitted["$metadata"]);
    assert!(emitted.get("Body").is_none());

    let requests = endpoint.requests();
    assert_eq!(1, requests.len());
    let request = &requests[0];
    assert_eq!("PUT", request.method);
    assert!(request.path.starts_with("/docs/greeting.txt"), "{}", request.path);
    assert_eq!(Some("public-read"), request.header("x-amz-acl"));
    assert_eq!(Some("text/plain"), request.header("content-type"));
    let raw = request.raw();
    assert!(raw.contains(&utils::sha256_base64(b"hello")), "{raw}");
    assert!(raw.contains("hello"), "{raw}");
}

#[tokio::test]
async fn create_bucket_sends_location_constraint() {
    let endpoint = Endpoint::serve([Canned::ok("").header("Location", "/logs")]).await;
    let emitted = run(
        &endpoint,
        "s3.create_bucket",
        json!({"Bucket": "logs", "ACL": "private", "LocationConstraint": "eu-west-1"}),
    )
    .await;

    assert_eq!(json!("/logs"), emitted["Location"]);
    let requests = endpoint.requests();
    assert_eq!("PUT", requests[0].method);
    assert!(requests[0].path.starts_with("/logs"), "{}", requests[0].path);
    assert_eq!(Some("private"), requests[0].header("x-amz-acl"));
    assert!(
        requests[0]
            .body
            .contains("<LocationConstraint>eu-west-1</LocationConstraint>"),
        "{}",
        requests[0].body
    );
}

#[tokio::test]
async fn delete_objects_reports_deleted_and_failed() {
    let endpoint = Endpoint::serve([Canned::xml(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<DeleteResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Deleted><Key>a.txt</Key></Deleted>
  <Error><Key>b.txt</Key><Code>AccessDenied</Code><Message>Access Denied</Message></Error>
</DeleteResult>"#,
    )
    .header("x-amz-request-id", "req-delete")])
    .await;
    let emitted = run(
        &endpoint,
        "s3.delete_objects",
        json!({
            "Bucket": "docs",
            "Objects": [{"Key": "a.txt"}, {"Key": "b.txt", "VersionId": "v2"}],
        }),
    )
    .await;

    assert_eq!(json!("a.txt"), emitted["Deleted"][0]["Key"]);
    assert_eq!(json!("b.txt"), emitted["Errors"][0]["Key"]);
    assert_eq!(json!("AccessDenied"), emitted["Errors"][0]["Code"]);
    assert_eq!(json!({"requestId": "req-delete"}), emitted["$metadata"]);

    let requests = endpoint.requests();
    assert_eq!("POST", requests[0].method);
    assert!(requests[0].path.contains("delete"), "{}", requests[0].path);
    let body = &requests[0].body;
    assert!(body.contains("<Key>a.txt</Key>"), "{body}");
    assert!(body.contains("<VersionId>v2</VersionId>"), "{body}");
}

#[tokio::test]
async fn delete_objects_without_objects_sends_nothing() {
    let endpoint = Endpoint::serve([]).await;
    let event = Event {
        block: "s3.delete_objects".to_owned(),
        input: json!({"Bucket": "docs"}),
    };
    let err = handle_event(&connection_to(&endpoint), event)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidInput {
            block: "s3.delete_objects",
            ..
        }
    ));
    assert!(endpoint.requests().is_empty());
}

const DESCRIBE_DB_INSTANCES: &str = r#"<DescribeDBInstancesResponse xmlns="http://rds.amazonaws.com/doc/2014-10-31/">
  <DescribeDBInstancesResult>
    <DBInstances>
      <DBInstance>
        <DBInstanceIdentifier>orders</DBInstanceIdentifier>
        <DBInstanceClass>db.t3.micro</DBInstanceClass>
        <Engine>postgres</Engine>
        <DBInstanceStatus>available</DBInstanceStatus>
        <Endpoint>
          <Address>orders.abc.us-east-1.rds.amazonaws.com</Address>
          <Port>5432</Port>
        </Endpoint>
        <AllocatedStorage>20</AllocatedStorage>
        <MultiAZ>false</MultiAZ>
        <InstanceCreateTime>2023-11-14T22:13:20Z</InstanceCreateTime>
      </DBInstance>
    </DBInstances>
  </DescribeDBInstancesResult>
  <ResponseMetadata>
    <RequestId>req-rds</RequestId>
  </ResponseMetadata>
</DescribeDBInstancesResponse>"#;

#[tokio::test]
async fn describe_db_instances_through_handler() {
    let endpoint = Endpoint::serve([
        Canned::xml(DESCRIBE_DB_INSTANCES).header("x-amzn-RequestId", "req-rds")
    ])
    .await;
    let emitted = run(
        &endpoint,
        "rds.describe_db_instances",
        json!({"DBInstanceIdentifier": "orders"}),
    )
    .await;

    let instance = &emitted["DBInstances"][0];
    assert_eq!(json!("orders"), instance["DBInstanceIdentifier"]);
    assert_eq!(json!("available"), instance["DBInstanceStatus"]);
    assert_eq!(json!(5432), instance["Endpoint"]["Port"]);
    assert_eq!(json!(false), instance["MultiAZ"]);
    assert_eq!(json!("2023-11-14T22:13:20Z"), instance["InstanceCreateTime"]);
    assert_eq!(json!({"requestId": "req-rds"}), emitted["$metadata"]);

    let requests = endpoint.requests();
    assert_eq!("POST", requests[0].method);
    let body = &requests[0].body;
    assert!(body.contains("Action=DescribeDBInstances"), "{body}");
    assert!(body.contains("DBInstanceIdentifier=orders"), "{body}");
}

const CREATE_DB_INSTANCE: &str = r#"<CreateDBInstanceResponse xmlns="http://rds.amazonaws.com/doc/2014-10-31/">
  <CreateDBInstanceResult>
    <DBInstance>
      <DBInstanceIdentifier>orders</DBInstanceIdentifier>
      <DBInstanceStatus>creating</DBInstanceStatus>
    </DBInstance>
  </CreateDBInstanceResult>
  <ResponseMetadata>
    <RequestId>req-create</RequestId>
  </ResponseMetadata>
</CreateDBInstanceResponse>"#;

#[tokio::test]
async fn create_db_instance_only_sends_given_tags() {
    let endpoint = Endpoint::serve([
        Canned::xml(CREATE_DB_INSTANCE),
        Canned::xml(CREATE_DB_INSTANCE),
    ])
    .await;
    let input = json!({
        "DBInstanceIdentifier": "orders",
        "DBInstanceClass": "db.t3.micro",
        "Engine": "postgres",
        "AllocatedStorage": 20,
    });
    let emitted = run(&endpoint, "rds.create_db_instance", input.clone()).await;
    assert_eq!(json!("creating"), emitted["DBInstance"]["DBInstanceStatus"]);

    let mut tagged = input;
    tagged["Tags"] = json!([{"Key": "team", "Value": "payments"}]);
    run(&endpoint, "rds.create_db_instance", tagged).await;

    let requests = endpoint.requests();
    assert_eq!(2, requests.len());
    let untagged = &requests[0].body;
    assert!(untagged.contains("Action=CreateDBInstance"), "{untagged}");
    assert!(untagged.contains("AllocatedStorage=20"), "{untagged}");
    assert!(!untagged.contains("Tags"), "{untagged}");
    let tagged = &requests[1].body;
    assert!(tagged.contains("Tags"), "{tagged}");
    assert!(tagged.contains("payments"), "{tagged}");
}
