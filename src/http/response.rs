//! Response sink handed to every handler and middleware layer.
//!
//! # Responsibilities
//! - Collect status, headers and body bytes while the handler chain runs
//! - Convert the collected state into an axum response for the host server
//!
//! # Design Decisions
//! - Writes only append; layers wrapping a handler see their own writes
//!   interleaved with inner writes in call order
//! - Status defaults to 200 OK, matching what a host server sends when a
//!   handler writes a body without choosing a status

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// Buffered response produced by a handler chain.
#[derive(Debug, Default)]
pub struct ResponseSink {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Insert a header, replacing any previous value under the same name.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Append raw bytes to the body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    pub fn write_str(&mut self, text: &str) {
        self.write(text.as_bytes());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8 text, lossy. Mostly useful in tests and logs.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl IntoResponse for ResponseSink {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;

    #[test]
    fn test_defaults_to_ok_and_empty() {
        let sink = ResponseSink::new();
        assert_eq!(sink.status(), StatusCode::OK);
        assert!(sink.body().is_empty());
        assert!(sink.headers().is_empty());
    }

    #[test]
    fn test_writes_append() {
        let mut sink = ResponseSink::new();
        sink.write_str("0");
        sink.write(b"Handler");
        sink.write_str("5");
        assert_eq!(sink.body_text(), "0Handler5");
    }

    #[test]
    fn test_into_response_keeps_parts() {
        let mut sink = ResponseSink::new();
        sink.set_status(StatusCode::CREATED);
        sink.set_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        sink.write_str("{}");

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }
}
