//! Request spans and timing summaries.

use tracing::Span;
use trellis_core::{Request, TimingContext};

/// Span wrapping all work for one request.
pub fn request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request.id(),
        method = %request.method(),
        path = request.pathname(),
    )
}

/// Log how long the request took to reach each milestone.
pub fn record_timing(timing: &TimingContext, status: u16) {
    let ms = |d: Option<std::time::Duration>| d.map(|d| d.as_millis() as u64);
    tracing::info!(
        status,
        time_to_data_ms = ms(timing.time_to_data()),
        time_to_first_byte_ms = ms(timing.time_to_first_byte()),
        total_ms = timing.elapsed().as_millis() as u64,
        "request finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_span_builds_without_subscriber() {
        let request = Request::get("http://localhost/users/42").unwrap();
        let span = request_span(&request);
        let _guard = span.enter();
        record_timing(&TimingContext::new(), 200);
    }
}
