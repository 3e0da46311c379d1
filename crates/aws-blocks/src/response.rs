//! Block responses and the body sanitizer.
//!
//! An SDK response is carried as an [`Envelope`]: a JSON object of plain
//! fields, plus an optional [`Body`] that may still be an open stream.
//! [`serialize_response`] is the terminal consumer of that body. It reads
//! the stream to completion and replaces it with a string so the envelope
//! can be emitted as ordinary JSON.
use std::{future::Future, pin::Pin};

use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use serde_json::{Map, Value};
use snafu::prelude::*;

/// Key of the body field in an emitted response.
pub const BODY: &str = "Body";

/// Key of the diagnostic object attached when the body can't be serialized.
pub const BODY_METADATA: &str = "BodyMetadata";

/// Key of the response metadata object.
pub const METADATA: &str = "$metadata";

/// Emitted in place of a body that could not be drained or decoded.
pub const UNSERIALIZABLE_BODY: &str = "[Body could not be serialized]";

/// Reasons a body could not be turned into a string.
#[derive(Debug, Snafu)]
pub enum BodyError {
    #[snafu(display("body was already consumed"))]
    Consumed,

    #[snafu(display("could not read body: {source}"))]
    Read {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[snafu(display("body is not valid UTF-8: {source}"))]
    Decode { source: std::string::FromUtf8Error },
}

impl BodyError {
    fn read(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        BodyError::Read {
            source: Box::new(source),
        }
    }
}

pub type BodyFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A body delivered in chunks.
///
/// `next_chunk` yields `None` once the stream is exhausted.
pub trait ChunkStream: Send {
    fn next_chunk(&mut self) -> BodyFuture<'_, Option<Result<Bytes, BodyError>>>;
}

impl ChunkStream for ByteStream {
    fn next_chunk(&mut self) -> BodyFuture<'_, Option<Result<Bytes, BodyError>>> {
        Box::pin(async move {
            self.next()
                .await
                .map(|chunk| chunk.map_err(BodyError::read))
        })
    }
}

/// A body that can only be read whole, as a string.
pub trait StringTransform: Send {
    fn transform_to_string(&mut self) -> BodyFuture<'_, Result<String, BodyError>>;
}

/// Buffers an entire [`ByteStream`] and decodes it as UTF-8.
pub struct Collected(Option<ByteStream>);

impl Collected {
    pub fn new(stream: ByteStream) -> Self {
        Collected(Some(stream))
    }
}

impl StringTransform for Collected {
    fn transform_to_string(&mut self) -> BodyFuture<'_, Result<String, BodyError>> {
        Box::pin(async move {
            let stream = self.0.take().context(ConsumedSnafu)?;
            let bytes = stream.collect().await.map_err(BodyError::read)?.into_bytes();
            String::from_utf8(bytes.to_vec()).context(DecodeSnafu)
        })
    }
}

enum BodyKind {
    Stream(Box<dyn ChunkStream>),
    Transform(Box<dyn StringTransform>),
    Value(Value),
}

/// The payload of a response.
pub struct Body {
    kind: BodyKind,
    consumed: bool,
}

impl core::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Body");
        s.field("type", &self.type_name());
        if let BodyKind::Value(value) = &self.kind {
            s.field("value", value);
        }
        s.field("consumed", &self.consumed).finish()
    }
}

impl Body {
    /// A body read chunk by chunk.
    pub fn stream(stream: impl ChunkStream + 'static) -> Self {
        Body {
            kind: BodyKind::Stream(Box::new(stream)),
            consumed: false,
        }
    }

    /// A body read whole through a string transform.
    pub fn transform(transform: impl StringTransform + 'static) -> Self {
        Body {
            kind: BodyKind::Transform(Box::new(transform)),
            consumed: false,
        }
    }

    /// An already materialized body.
    pub fn value(value: impl Into<Value>) -> Self {
        Body {
            kind: BodyKind::Value(value.into()),
            consumed: false,
        }
    }

    fn into_value(self) -> Option<Value> {
        match self.kind {
            BodyKind::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a stream or transform body has been read.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn type_name(&self) -> &'static str {
        match &self.kind {
            BodyKind::Stream(_) => "stream",
            BodyKind::Transform(_) => "transform",
            BodyKind::Value(Value::Null) => "null",
            BodyKind::Value(Value::Bool(_)) => "boolean",
            BodyKind::Value(Value::Number(_)) => "number",
            BodyKind::Value(Value::String(_)) => "string",
            BodyKind::Value(Value::Array(_)) => "array",
            BodyKind::Value(Value::Object(_)) => "object",
        }
    }

    /// Describes the runtime shape of the body, for debugging a failed read.
    pub fn metadata(&self) -> Value {
        serde_json::json!({
            "type": self.type_name(),
            "hasChunkStream": matches!(self.kind, BodyKind::Stream(_)),
            "hasTransformToString": matches!(self.kind, BodyKind::Transform(_)),
            "consumed": self.consumed,
        })
    }

    /// Reads the body into a JSON value.
    ///
    /// Streams and transforms are drained, so this succeeds at most once
    /// for them. Plain values are cloned and never consumed.
    pub async fn materialize(&mut self) -> Result<Value, BodyError> {
        match &mut self.kind {
            BodyKind::Value(value) => Ok(value.clone()),
            BodyKind::Stream(stream) => {
                ensure!(!self.consumed, ConsumedSnafu);
                self.consumed = true;
                let mut buffer = Vec::new();
                while let Some(chunk) = stream.next_chunk().await {
                    let chunk = chunk?;
                    log::trace!("read {} body bytes", chunk.len());
                    buffer.extend_from_slice(&chunk);
                }
                let text = String::from_utf8(buffer).context(DecodeSnafu)?;
                Ok(Value::String(text))
            }
            BodyKind::Transform(transform) => {
                ensure!(!self.consumed, ConsumedSnafu);
                self.consumed = true;
                Ok(Value::String(transform.transform_to_string().await?))
            }
        }
    }
}

/// An AWS response as a JSON object, with its body held aside.
#[derive(Debug, Default)]
pub struct Envelope {
    fields: Map<String, Value>,
    body: Option<Body>,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an envelope from a typed block output.
    ///
    /// The output must serialize to a JSON object.
    pub fn from_output<T: serde::Serialize>(output: &T) -> anyhow::Result<Self> {
        match serde_json::to_value(output)? {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => anyhow::bail!("block output must be a JSON object, saw {other}"),
        }
    }

    /// Builds an envelope from a raw object. A `Body` key becomes a plain
    /// value body.
    pub fn from_map(mut fields: Map<String, Value>) -> Self {
        let body = fields.remove(BODY).map(Body::value);
        Envelope { fields, body }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Records the AWS request id under `$metadata`, if there is one.
    pub fn with_request_id(mut self, request_id: Option<&str>) -> Self {
        if let Some(id) = request_id {
            self.fields.insert(
                METADATA.to_owned(),
                serde_json::json!({ "requestId": id }),
            );
        }
        self
    }

    /// Inserts a field. A `Body` key replaces the held body with a plain
    /// value, returning the previous body only if it was a plain value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        if key == BODY {
            return self
                .body
                .replace(Body::value(value))
                .and_then(Body::into_value);
        }
        self.fields.insert(key, value.into())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }
}

/// Makes a response safe to serialize and emit.
///
/// Returns a copy of the response's fields with `Body` normalized:
///
/// - no response gives an empty object,
/// - a chunked stream is read to exhaustion and decoded as UTF-8,
/// - a string transform is called and its result used,
/// - a plain value passes through untouched.
///
/// This never fails. If the body can't be read or decoded, `Body` is set to
/// [`UNSERIALIZABLE_BODY`] and a `BodyMetadata` object describing the body
/// is attached instead.
///
/// ## Note
/// Streams are drained in place. Calling this twice on the same envelope
/// yields the placeholder the second time.
pub async fn serialize_response(response: Option<&mut Envelope>) -> Map<String, Value> {
    let Some(response) = response else {
        return Map::new();
    };
    let mut output = response.fields.clone();
    if let Some(body) = response.body.as_mut() {
        match body.materialize().await {
            Ok(value) => {
                output.insert(BODY.to_owned(), value);
            }
            Err(e) => {
                log::warn!("could not serialize response body: {e}");
                output.insert(BODY.to_owned(), Value::String(UNSERIALIZABLE_BODY.to_owned()));
                output.insert(BODY_METADATA.to_owned(), body.metadata());
            }
        }
    }
    output
}
