//! Outgoing HTTP response type, the JSON envelope templates, and the
//! [`IntoResponse`] conversion trait.
//!
//! Every body quill writes is `application/json`. Payloads are either the
//! serialized value itself (`ok`, `created`) or a message envelope:
//!
//! ```json
//! {"message": "post deleted"}
//! ```
//!
//! | Template | Status | Body |
//! |---|---|---|
//! | [`Response::ok`] | 200 | payload |
//! | [`Response::ok_message`] | 200 | envelope |
//! | [`Response::empty_ok`] | 200 | none |
//! | [`Response::created`] | 201 | payload |
//! | [`Response::bad_request`] | 400 | envelope |
//! | [`Response::not_found_for`] | 404 | envelope naming method and path |
//! | [`Response::conflict`] | 409 | envelope |
//! | [`Response::internal_error`] | 500 | envelope |

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

const APPLICATION_JSON: &str = "application/json";

/// Message sent when a payload cannot be serialized.
pub const SERIALIZE_FAILURE: &str = "failed to serialize response";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use quill::Response;
///
/// Response::ok(&vec![1, 2, 3]);
/// Response::ok_message("post deleted");
/// Response::bad_request("title has to be a non-empty string of 255 characters or less");
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `200 OK` with `payload` serialized as the whole body.
    pub fn ok<T: Serialize + ?Sized>(payload: &T) -> Self {
        Self::json(StatusCode::OK, payload)
    }

    /// `200 OK` with a message envelope.
    pub fn ok_message(message: impl AsRef<str>) -> Self {
        Self::message(StatusCode::OK, message.as_ref())
    }

    /// `200 OK` with no body.
    pub fn empty_ok() -> Self {
        Self::status(StatusCode::OK)
    }

    /// `201 Created` with `payload` serialized as the whole body.
    pub fn created<T: Serialize + ?Sized>(payload: &T) -> Self {
        Self::json(StatusCode::CREATED, payload)
    }

    /// `400 Bad Request` with a message envelope.
    pub fn bad_request(message: impl AsRef<str>) -> Self {
        Self::message(StatusCode::BAD_REQUEST, message.as_ref())
    }

    /// `404 Not Found` for a known route that has no handler for `method`.
    pub fn not_found_for(method: &Method, path: &str) -> Self {
        Self::message(
            StatusCode::NOT_FOUND,
            &format!("no handler registered at route {path} for method {method}"),
        )
    }

    /// `409 Conflict` with a message envelope.
    pub fn conflict(message: impl AsRef<str>) -> Self {
        Self::message(StatusCode::CONFLICT, message.as_ref())
    }

    /// `500 Internal Server Error` with a message envelope.
    pub fn internal_error(message: impl AsRef<str>) -> Self {
        Self::message(StatusCode::INTERNAL_SERVER_ERROR, message.as_ref())
    }

    /// Response with no body.
    pub fn status(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// Response with `payload` serialized as JSON.
    ///
    /// A payload that fails to serialize is logged and answered with a 500
    /// envelope; the connection stays usable.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_vec(payload) {
            Ok(body) => Self::json_bytes(status, body.into()),
            Err(e) => {
                error!(error = %e, status = status.as_u16(), "failed to serialize response");
                Self::message(StatusCode::INTERNAL_SERVER_ERROR, SERIALIZE_FAILURE)
            }
        }
    }

    fn message(status: StatusCode, message: &str) -> Self {
        // Serializing a `Value` cannot fail.
        let body = serde_json::json!({ "message": message }).to_string();
        Self::json_bytes(status, body.into())
    }

    fn json_bytes(status: StatusCode, body: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        Self { status, headers, body }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Converts into the `http` response hyper writes to the wire.
    pub fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

/// Return a bare status from a handler: `return StatusCode::NO_CONTENT`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}
