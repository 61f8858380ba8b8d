//! Backpressure-aware response sink.

use std::fmt::Display;

use futures::{Sink, SinkExt, StreamExt};
use trellis_core::{LifecyclePhase, TimingContext};

use crate::compose::ByteStream;
use crate::error::StreamError;
use crate::flush::FlushPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Initial,
    Streaming,
    Completed,
    Failed,
}

/// Writes a composed body into any transport sink.
///
/// Every write waits for the transport to accept it, so a slow client
/// throttles rendering instead of growing a buffer.
pub struct ResponseSink<S, E>
where
    S: Sink<Vec<u8>, Error = E> + Unpin,
    E: Display,
{
    inner: S,
    state: SinkState,
    flush: FlushPolicy,
    timing: TimingContext,
    chunks_written: usize,
    bytes_written: usize,
}

impl<S, E> ResponseSink<S, E>
where
    S: Sink<Vec<u8>, Error = E> + Unpin,
    E: Display,
{
    pub fn new(sink: S, timing: TimingContext) -> Self {
        Self {
            inner: sink,
            state: SinkState::Initial,
            flush: FlushPolicy::default(),
            timing,
            chunks_written: 0,
            bytes_written: 0,
        }
    }

    pub fn with_flush_policy(mut self, policy: FlushPolicy) -> Self {
        self.flush = policy;
        self
    }

    /// Write one chunk.
    pub async fn write(&mut self, chunk: Vec<u8>) -> Result<(), StreamError> {
        if matches!(self.state, SinkState::Completed | SinkState::Failed) {
            return Err(StreamError::Finished);
        }

        let len = chunk.len();
        let sent = if self.flush.flush_each_chunk() {
            self.inner.send(chunk).await
        } else {
            self.inner.feed(chunk).await
        };
        if let Err(e) = sent {
            return Err(self.fail(StreamError::Sink(e.to_string())));
        }

        if self.state == SinkState::Initial {
            self.timing.mark(TimingContext::PREFIX_SENT);
            self.state = SinkState::Streaming;
        }
        self.chunks_written += 1;
        self.bytes_written += len;
        Ok(())
    }

    /// Flush and close the transport.
    pub async fn complete(&mut self) -> Result<(), StreamError> {
        if matches!(self.state, SinkState::Completed | SinkState::Failed) {
            return Err(StreamError::Finished);
        }
        if let Err(e) = self.inner.close().await {
            return Err(self.fail(StreamError::Sink(e.to_string())));
        }
        self.state = SinkState::Completed;
        self.timing.mark(TimingContext::COMPLETE);
        Ok(())
    }

    /// Drain `body` into the transport, then close it.
    ///
    /// A body error stops writing and leaves the transport unclosed so the
    /// client sees a truncated response rather than a complete document.
    pub async fn pipe(mut self, mut body: ByteStream) -> Result<TimingContext, StreamError> {
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(error) => return Err(self.fail(error)),
            };
            self.write(chunk).await?;
        }
        self.complete().await?;

        tracing::debug!(
            chunks = self.chunks_written,
            bytes = self.bytes_written,
            elapsed_ms = self.timing.elapsed().as_millis() as u64,
            "response streamed"
        );
        Ok(self.timing)
    }

    pub fn phase(&self) -> LifecyclePhase {
        match self.state {
            SinkState::Initial => LifecyclePhase::Start,
            SinkState::Streaming if self.chunks_written == 1 => LifecyclePhase::PrefixSent,
            SinkState::Streaming => LifecyclePhase::Streaming(self.chunks_written),
            SinkState::Completed => LifecyclePhase::Completion,
            SinkState::Failed => LifecyclePhase::Error("stream aborted".to_string()),
        }
    }

    pub fn chunks_written(&self) -> usize {
        self.chunks_written
    }

    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn fail(&mut self, error: StreamError) -> StreamError {
        tracing::warn!(error = %error, chunks = self.chunks_written, "response stream aborted");
        self.state = SinkState::Failed;
        error
    }
}
