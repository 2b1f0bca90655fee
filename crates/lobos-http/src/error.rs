//! The gateway's error taxonomy (`spec.md` §7) and its conversion into an
//! HTTP response.

use bytes::Bytes;
use http::{Response, StatusCode};

use crate::body::ResponseBody;

/// A recoverable, per-request error. Converted into an HTTP response inside
/// the dispatcher; never crosses a session boundary.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("no such key: {0}")]
    NoSuchKey(String),

    #[error("no such bucket: {0}")]
    NoSuchBucket(String),
}

impl GatewayError {
    /// Build the HTTP response for this error, per `spec.md` §7's taxonomy:
    /// client errors get a plain-text 400, not-found errors get the
    /// bit-exact `Error` XML body at 404.
    #[must_use]
    pub fn into_response(self) -> Response<ResponseBody> {
        let (status, content_type, body) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, "text/html", Bytes::from(message)),
            Self::NoSuchKey(resource) => {
                (StatusCode::NOT_FOUND, "application/xml", Bytes::from(lobos_xml::error::no_such_key_xml(&resource)))
            }
            Self::NoSuchBucket(resource) => {
                (StatusCode::NOT_FOUND, "application/xml", Bytes::from(lobos_xml::error::no_such_bucket_xml(&resource)))
            }
        };

        Response::builder()
            .status(status)
            .header(http::header::SERVER, "LOBOS BB")
            .header(http::header::CONTENT_TYPE, content_type)
            .body(ResponseBody::from_bytes(body))
            .expect("a response built from static parts is always valid")
    }
}

/// A fatal I/O failure partway through a session: a body read/write error,
/// or failure to open a PUT's destination file. Per `spec.md` §7, "I/O
/// during session" terminates the session with no partial response, so this
/// is propagated out through the `Service`'s `Error` associated type and
/// tears the connection down, rather than being converted into an HTTP
/// response the way `GatewayError` is.
#[derive(Debug, thiserror::Error)]
#[error("session aborted: {0}")]
pub struct SessionAbort(#[from] std::io::Error);

/// What a handler can fail with: a client-facing error that becomes a
/// response, or a fatal one that aborts the connection.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Client(#[from] GatewayError),
    #[error(transparent)]
    Fatal(#[from] SessionAbort),
}

impl From<std::io::Error> for HandlerError {
    fn from(e: std::io::Error) -> Self {
        Self::Fatal(SessionAbort::from(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400_with_plain_text() {
        let resp = GatewayError::BadRequest("unsupported req".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn no_such_key_maps_to_404_with_xml() {
        let resp = GatewayError::NoSuchKey("a/b.txt".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers().get(http::header::CONTENT_TYPE).unwrap(), "application/xml");
    }
}
