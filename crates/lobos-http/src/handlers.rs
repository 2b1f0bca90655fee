//! Per-operation handlers (`spec.md` §4.6–§4.9 and the bucket-level
//! operations of §4.5), wired to the `KeyIndex` and the local filesystem.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderValue, Response, StatusCode};
use http_body_util::BodyExt;
use lobos_index::{KeyIndex, Kind, Object, now_secs};
use tokio::io::AsyncWriteExt;

use crate::body::ResponseBody;
use crate::error::{GatewayError, HandlerError};
use crate::listing;

/// Gateway-wide state shared read-only across every session.
pub struct GatewayState {
    pub bucket_name: String,
    pub index: Option<Arc<KeyIndex>>,
}

/// `HEAD /{b}`: 200 with `x-amz-bucket-region: lobos`, no body.
#[must_use]
pub fn head_bucket() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(http::header::SERVER, "LOBOS BB")
        .header("x-amz-bucket-region", "lobos")
        .body(ResponseBody::empty())
        .expect("a response built from static parts is always valid")
}

/// Look up `{size, mtime}` for `key`: from the index when enabled, else via
/// `stat`. A miss (or `stat` failure) is reported as `(0, 0)`, matching the
/// source's sentinel rather than a `Result`.
fn metadata_for(state: &GatewayState, key: &str) -> (u64, u64) {
    if let Some(index) = &state.index {
        return index.lookup(key).map_or((0, 0), |o| (o.size, o.mtime));
    }
    std::fs::metadata(key).map_or((0, 0), |m| (m.len(), lobos_index::mtime_secs(&m)))
}

/// `HEAD /{b}/{k}` (`spec.md` §4.6).
pub fn head_object(state: &GatewayState, key: &str) -> Result<Response<ResponseBody>, GatewayError> {
    let (size, mtime) = metadata_for(state, key);
    if size == 0 && mtime == 0 {
        return Err(GatewayError::NoSuchKey(key.to_owned()));
    }

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(http::header::SERVER, "LOBOS BB")
        .header(http::header::CONTENT_TYPE, lobos_xml::mime_type(key))
        .header(http::header::LAST_MODIFIED, mtime.to_string())
        .header(http::header::CONTENT_LENGTH, size.to_string())
        .body(ResponseBody::empty())
        .expect("a response built from static parts is always valid"))
}

/// `GET /{b}/{k}` (`spec.md` §4.7).
pub async fn get_object(state: &GatewayState, key: &str) -> Result<Response<ResponseBody>, GatewayError> {
    let (_, mtime) = metadata_for(state, key);
    if mtime == 0 {
        return Err(GatewayError::NoSuchKey(key.to_owned()));
    }

    let file = tokio::fs::File::open(key).await.map_err(|_| GatewayError::NoSuchKey(key.to_owned()))?;
    let len = file.metadata().await.map_err(|_| GatewayError::NoSuchKey(key.to_owned()))?.len();

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(http::header::SERVER, "LOBOS BB")
        .header(http::header::CONTENT_TYPE, lobos_xml::mime_type(key))
        .header(http::header::LAST_MODIFIED, rfc1123(mtime))
        .header(http::header::CONTENT_LENGTH, len.to_string())
        .body(ResponseBody::from_file(file))
        .expect("a response built from static parts is always valid"))
}

/// `PUT /{b}/{k}` (`spec.md` §4.8). Creates missing parent directories
/// (without updating the index for them — a known limitation carried from
/// the source), opens the destination truncated, and streams the request
/// body into it frame by frame rather than buffering it.
///
/// Per `spec.md` §4.8/§7: failure to open the destination, and any I/O
/// failure while reading the body or writing it to disk, is a fatal session
/// error — it aborts the connection rather than producing a clean HTTP
/// error response.
pub async fn put_object<B>(state: &GatewayState, key: &str, body: B) -> Result<Response<ResponseBody>, HandlerError>
where
    B: http_body::Body<Data = Bytes> + Unpin,
{
    if let Some(parent) = Path::new(key).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = tokio::fs::create_dir_all(parent).await;
        }
    }

    let mut file = tokio::fs::File::create(key).await?;

    let mut body = std::pin::pin!(body);
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|_| std::io::Error::other("error reading request body"))?;
        if let Ok(data) = frame.into_data() {
            file.write_all(&data).await?;
        }
    }
    file.flush().await?;

    let size = tokio::fs::metadata(key).await.map(|m| m.len()).unwrap_or(0);

    if let Some(index) = &state.index {
        index.add_entry(key.to_owned(), Object { size, mtime: now_secs(), kind: Kind::File });
    }

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(http::header::SERVER, "LOBOS BB")
        .header("x-amz-object-size", size.to_string())
        .header(http::header::CONTENT_LENGTH, "0")
        .body(ResponseBody::empty())
        .expect("a response built from static parts is always valid"))
}

/// `DELETE /{b}/{k}` (`spec.md` §4.9). Only a missing-file removal failure
/// is reported as 404 `NoSuchKey`; any other removal failure (permission
/// denied, `EISDIR`, a backend I/O error) is a fatal session error per
/// `spec.md` §7, not a success-shaped 404.
pub async fn delete_object(state: &GatewayState, key: &str) -> Result<Response<ResponseBody>, HandlerError> {
    if let Err(e) = tokio::fs::remove_file(key).await {
        return Err(if e.kind() == std::io::ErrorKind::NotFound {
            HandlerError::Client(GatewayError::NoSuchKey(key.to_owned()))
        } else {
            HandlerError::from(e)
        });
    }
    if let Some(index) = &state.index {
        index.remove(key);
    }
    Ok(Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(http::header::SERVER, "LOBOS BB")
        .body(ResponseBody::empty())
        .expect("a response built from static parts is always valid"))
}

/// `GET /{b}?list-type=2&prefix={p}&delimiter=/` (`spec.md` §4.4).
pub fn list_objects(state: &GatewayState, prefix: &str) -> Response<ResponseBody> {
    let result = listing::list(state.index.as_deref(), Path::new("."), prefix, &state.bucket_name);
    xml_response(result.to_xml())
}

/// `GET /{b}?versioning`.
#[must_use]
pub fn bucket_versioning() -> Response<ResponseBody> {
    xml_response(lobos_xml::versioning_configuration_xml())
}

/// `GET /{b}?object-lock`.
#[must_use]
pub fn bucket_object_lock() -> Response<ResponseBody> {
    xml_response(lobos_xml::object_lock_configuration_xml())
}

/// `GET /` with `max-buckets` or no params.
#[must_use]
pub fn list_all_my_buckets(state: &GatewayState) -> Response<ResponseBody> {
    xml_response(lobos_xml::list_all_my_buckets_result_xml(&state.bucket_name))
}

fn xml_response(body: Vec<u8>) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::OK)
        .header(http::header::SERVER, "LOBOS BB")
        .header(http::header::CONTENT_TYPE, HeaderValue::from_static("application/xml"))
        .body(ResponseBody::from_bytes(body))
        .expect("a response built from static parts is always valid")
}

/// RFC 1123 formatting used only by `GetObject`; everywhere else uses the
/// decimal Unix timestamp (`spec.md` §9's preserved inconsistency).
fn rfc1123(epoch_secs: u64) -> String {
    let secs = i64::try_from(epoch_secs).unwrap_or(0);
    let dt = chrono::DateTime::from_timestamp(secs, 0).unwrap_or_default();
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc1123_matches_known_reference_timestamp() {
        // 784111777 == Sun, 06 Nov 1994 08:49:37 GMT
        assert_eq!(rfc1123(784_111_777), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn head_bucket_has_region_header_and_no_body() {
        let resp = head_bucket();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get("x-amz-bucket-region").unwrap(), "lobos");
    }
}
