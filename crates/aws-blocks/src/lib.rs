//! # AWS Blocks
//!
//! A catalog of connector "blocks". Each block wraps exactly one AWS SDK
//! call behind a uniform declarative schema:
//!
//! - **Input fields**: a serde struct that describes the fields the block
//!   accepts, their types and whether they are required.
//! - **Handler**: builds a client from static credentials, sends a single
//!   command and awaits its response.
//! - **Output fields**: a typed description of what the block emits.
//!
//! Every block is the same template. The only part with real logic is
//! the response sanitizer in [`response`], which turns a possibly
//! streaming SDK response into a plain JSON object that can be emitted
//! across a process or event boundary.
//!
//! ## Usage
//!
//! Blocks are usually run by name through [`handle_event`], with a
//! [`Connection`] describing the region and credentials:
//!
//! ```no_run
//! # async fn run() -> Result<(), blocks::Error> {
//! let connection = blocks::Connection::from_toml_str(
//!     r#"
//!     region = "us-east-1"
//!     access_key_id = "AKIA..."
//!     secret_access_key = "..."
//!     "#,
//! )?;
//! let event = blocks::Event {
//!     block: "s3.get_object".to_owned(),
//!     input: serde_json::json!({"Bucket": "my-bucket", "Key": "hello.txt"}),
//! };
//! let emitted = blocks::handle_event(&connection, event).await?;
//! println!("{}", emitted["Body"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Functions that can fail return a `Result` with the top-level [`Error`].
//! Errors from inside a block (SDK failures, invalid builder input) are
//! carried as [`anyhow::Error`] chains. Body serialization problems are
//! never surfaced as errors; see [`response::serialize_response`].
extern crate self as blocks;

use std::{future::Future, pin::Pin};

use snafu::prelude::*;

pub use aws_blocks_derive::Schema;

pub mod aws;
pub mod response;
#[cfg(test)]
mod test;
pub mod utils;

pub use aws::{catalog, find_block, Connection};
pub use response::{serialize_response, Body, Envelope};

/// Top-level error enum that encompasses all errors.
#[derive(snafu::Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{source}:\n{}",
                source.chain()
                    .map(|e| format!("{e}"))
                    .collect::<Vec<_>>()
                    .join("\n -> ")))]
    Block { source: anyhow::Error },

    #[snafu(display("No block named '{name}' in the catalog"))]
    UnknownBlock { name: String },

    #[snafu(display("Invalid input for '{block}': {source}"))]
    InvalidInput {
        block: &'static str,
        source: serde_json::Error,
    },

    #[snafu(display("Error during '{block}' call: {}",
                source.chain()
                    .map(|e| format!("{e}"))
                    .collect::<Vec<_>>()
                    .join("\n -> ")))]
    Call {
        block: &'static str,
        source: anyhow::Error,
    },

    #[snafu(display("Could not parse connection: {source}"))]
    ConnectionParse { source: toml::de::Error },
}

impl From<anyhow::Error> for Error {
    fn from(source: anyhow::Error) -> Self {
        Error::Block { source }
    }
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The JSON type of a schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl core::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        })
    }
}

/// One field of a block's input or output.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSpec {
    /// The `Body` field emitted by blocks whose response carries an object body.
    pub fn body(description: &'static str) -> Self {
        FieldSpec {
            name: response::BODY,
            kind: FieldKind::String,
            required: false,
            description,
        }
    }
}

/// Declarative field schema.
///
/// This is usually derived with `#[derive(Schema)]`, which reads serde
/// renames, `Option` and `#[serde(default)]` for requiredness, and doc
/// comments for descriptions.
pub trait Schema {
    fn fields() -> Vec<FieldSpec>;
}

/// A connector block.
///
/// Represents a single AWS API operation exposed as a configurable step.
/// The implementing type is the block's input: it is deserialized from
/// the event's JSON input and consumed by [`Block::call`].
pub trait Block: Schema + serde::de::DeserializeOwned + 'static {
    /// Catalog name of the block, `<service>.<operation>`.
    const NAME: &'static str;

    /// Human readable summary of what the block does.
    const DESCRIPTION: &'static str;

    /// Typed shape of the emitted object.
    type Output: Schema;

    /// Output fields, including any `Body` the output carries out of band.
    fn output_fields() -> Vec<FieldSpec> {
        Self::Output::fields()
    }

    /// Builds a client from `cfg`, sends exactly one command and converts
    /// the response into an [`Envelope`].
    fn call(self, cfg: &aws::SdkConfig) -> impl Future<Output = anyhow::Result<Envelope>>;
}

type BlockFuture = Pin<Box<dyn Future<Output = Result<Envelope>>>>;

type BlockRunFn = fn(
    // Config built from the caller's connection
    aws::SdkConfig,
    // Raw block input
    serde_json::Value,
) -> BlockFuture;

fn run_block<B: Block>(cfg: aws::SdkConfig, input: serde_json::Value) -> BlockFuture {
    Box::pin(async move {
        let block: B = serde_json::from_value(input).context(InvalidInputSnafu { block: B::NAME })?;
        log::info!("calling '{}'", B::NAME);
        let envelope = block
            .call(&cfg)
            .await
            .context(CallSnafu { block: B::NAME })?;
        log::debug!("  '{}' returned {} fields", B::NAME, envelope.fields().len());
        Ok(envelope)
    })
}

/// A type-erased catalog entry.
#[derive(Clone)]
pub struct BlockInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub input: Vec<FieldSpec>,
    pub output: Vec<FieldSpec>,
    run: BlockRunFn,
}

impl core::fmt::Debug for BlockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockInfo")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}

impl BlockInfo {
    pub fn of<B: Block>() -> Self {
        BlockInfo {
            name: B::NAME,
            description: B::DESCRIPTION,
            input: B::fields(),
            output: B::output_fields(),
            run: run_block::<B>,
        }
    }

    /// Deserializes `input` into the block and calls it, returning the
    /// unsanitized response.
    pub async fn run(&self, cfg: aws::SdkConfig, input: serde_json::Value) -> Result<Envelope> {
        (self.run)(cfg, input).await
    }

    /// The block's declared schema as JSON.
    pub fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "input": self.input,
            "output": self.output,
        })
    }
}

/// An inbound request to run one block.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    /// Catalog name of the block to run.
    pub block: String,
    /// The block's input fields.
    #[serde(default)]
    pub input: serde_json::Value,
}

/// Runs the block named by `event` and returns the object to emit.
///
/// The response is sanitized exactly once, so any `Body` in the returned
/// object is a string.
pub async fn handle_event(
    connection: &Connection,
    event: Event,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let Event { block, input } = event;
    let info = find_block(&block).context(UnknownBlockSnafu { name: block })?;
    let cfg = connection.sdk_config();
    let input = if input.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        input
    };
    let mut envelope = info.run(cfg, input).await?;
    Ok(serialize_response(Some(&mut envelope)).await)
}
