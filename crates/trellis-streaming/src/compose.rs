//! Splices a lazily rendered body into the template.
//!
//! ```text
//! body:    ........ c1 ..... c2 .. c3 .. (end)
//! output:  ........ prefix c1 c2 c3 suffix
//! ```
//!
//! Nothing is written before the first body chunk exists, and at most one
//! chunk is held at a time.

use std::collections::VecDeque;
use std::pin::Pin;

use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::StreamError;
use crate::template::SplitTemplate;

/// Owned stream of HTML bytes.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, StreamError>> + Send>>;

/// Box any chunk stream as a [`ByteStream`].
pub fn byte_stream<S>(stream: S) -> ByteStream
where
    S: Stream<Item = Result<Vec<u8>, StreamError>> + Send + 'static,
{
    Box::pin(stream)
}

/// What to emit when the body ends without producing a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyBodyPolicy {
    /// Still emit prefix and suffix, yielding a complete document.
    #[default]
    Flush,
    /// Emit nothing at all.
    Withhold,
}

struct Composer {
    prefix: Option<Vec<u8>>,
    suffix: Option<Vec<u8>>,
    body: ByteStream,
    queue: VecDeque<Vec<u8>>,
    done: bool,
    empty: EmptyBodyPolicy,
}

impl Composer {
    async fn next(mut self) -> Option<(Result<Vec<u8>, StreamError>, Self)> {
        loop {
            if let Some(chunk) = self.queue.pop_front() {
                return Some((Ok(chunk), self));
            }
            if self.done {
                return None;
            }

            match self.body.next().await {
                Some(Ok(chunk)) => {
                    if let Some(prefix) = self.prefix.take() {
                        self.queue.push_back(prefix);
                    }
                    self.queue.push_back(chunk);
                }
                Some(Err(error)) => {
                    self.done = true;
                    return Some((Err(error), self));
                }
                None => {
                    self.done = true;
                    let started = self.prefix.is_none();
                    if !started && self.empty == EmptyBodyPolicy::Withhold {
                        tracing::debug!("body produced no chunks, withholding document");
                        continue;
                    }
                    self.queue.extend(self.prefix.take());
                    self.queue.extend(self.suffix.take());
                }
            }
        }
    }
}

/// Wrap `body` with the filled template.
pub fn compose(template: SplitTemplate, body: ByteStream, empty: EmptyBodyPolicy) -> ByteStream {
    let composer = Composer {
        prefix: Some(template.prefix.into_bytes()),
        suffix: Some(template.suffix.into_bytes()),
        body,
        queue: VecDeque::with_capacity(2),
        done: false,
        empty,
    };
    Box::pin(stream::unfold(composer, Composer::next))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use trellis_data::WireError;

    use super::*;

    fn split() -> SplitTemplate {
        SplitTemplate {
            prefix: "prefix".to_string(),
            suffix: "suffix".to_string(),
        }
    }

    fn chunks(parts: &[&str]) -> ByteStream {
        let items: Vec<Result<Vec<u8>, StreamError>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        byte_stream(stream::iter(items))
    }

    async fn collect(stream: ByteStream) -> Vec<Result<String, String>> {
        stream
            .map(|r| {
                r.map(|b| String::from_utf8(b).unwrap())
                    .map_err(|e| e.to_string())
            })
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_chunks_are_wrapped_in_order() {
        let out = collect(compose(split(), chunks(&["<div>", "A", "</div>"]), EmptyBodyPolicy::Flush)).await;
        let expected: Vec<Result<String, String>> = ["prefix", "<div>", "A", "</div>", "suffix"]
            .iter()
            .map(|s| Ok(s.to_string()))
            .collect();
        assert_eq!(out, expected);
    }

    #[tokio::test]
    async fn test_prefix_waits_for_first_chunk() {
        let released = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&released);
        let body = byte_stream(stream::once(async move {
            tokio::task::yield_now().await;
            gate.store(true, Ordering::SeqCst);
            Ok(b"body".to_vec())
        }));

        let mut composed = compose(split(), body, EmptyBodyPolicy::Flush);
        let first = composed.next().await.unwrap().unwrap();

        assert_eq!(first, b"prefix");
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_empty_body_policies() {
        let flushed = collect(compose(split(), chunks(&[]), EmptyBodyPolicy::Flush)).await;
        assert_eq!(flushed, vec![Ok("prefix".to_string()), Ok("suffix".to_string())]);

        let withheld = collect(compose(split(), chunks(&[]), EmptyBodyPolicy::Withhold)).await;
        assert!(withheld.is_empty());
    }

    #[tokio::test]
    async fn test_error_ends_stream_without_suffix() {
        let body = byte_stream(stream::iter(vec![
            Ok(b"A".to_vec()),
            Err(StreamError::render(WireError::new("RenderError", "boom"))),
            Ok(b"B".to_vec()),
        ]));

        let out = collect(compose(split(), body, EmptyBodyPolicy::Flush)).await;
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], Ok("prefix".to_string()));
        assert_eq!(out[1], Ok("A".to_string()));
        assert!(out[2].as_ref().unwrap_err().contains("boom"));
    }
}
