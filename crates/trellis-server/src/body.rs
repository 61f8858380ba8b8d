//! Response bodies.

use std::fmt::Display;

use futures::{future, stream, Sink, StreamExt};
use trellis_core::TimingContext;
use trellis_streaming::{byte_stream, ByteStream, ResponseSink, StreamError};

/// Body of a response produced by the pipeline.
pub enum Body {
    Empty,
    Full(Vec<u8>),
    /// Streamed HTML. An `Err` item means the connection should be dropped.
    Stream(ByteStream),
}

impl Body {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Full(text.into().into_bytes())
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Collect the whole body.
    pub async fn into_bytes(self) -> Result<Vec<u8>, StreamError> {
        match self {
            Self::Empty => Ok(Vec::new()),
            Self::Full(bytes) => Ok(bytes),
            Self::Stream(mut stream) => {
                let mut out = Vec::new();
                while let Some(chunk) = stream.next().await {
                    out.extend_from_slice(&chunk?);
                }
                Ok(out)
            }
        }
    }

    /// Write the body into a transport sink, one chunk at a time.
    ///
    /// Each chunk waits for the sink to accept it. A stream error leaves the
    /// sink unclosed.
    pub async fn write_to<S, E>(self, sink: ResponseSink<S, E>) -> Result<TimingContext, StreamError>
    where
        S: Sink<Vec<u8>, Error = E> + Unpin,
        E: Display,
    {
        let chunks = match self {
            Self::Empty => byte_stream(stream::empty()),
            Self::Full(bytes) => byte_stream(stream::once(future::ready(Ok(bytes)))),
            Self::Stream(stream) => stream,
        };
        sink.pipe(chunks).await
    }

    /// Collect the whole body as UTF-8, replacing invalid sequences.
    pub async fn into_string(self) -> Result<String, StreamError> {
        let bytes = self.into_bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Body::Empty"),
            Self::Full(bytes) => write!(f, "Body::Full({} bytes)", bytes.len()),
            Self::Stream(_) => write!(f, "Body::Stream"),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Full(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::text(text)
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::text(text)
    }
}
