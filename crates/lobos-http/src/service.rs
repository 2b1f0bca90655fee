//! The `hyper::service::Service` implementation tying normalization,
//! dispatch, and the per-operation handlers together for one connection.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response, StatusCode};
use hyper::body::Incoming;
use hyper::service::Service;

use crate::body::ResponseBody;
use crate::dispatch::{Operation, classify};
use crate::error::{GatewayError, HandlerError, SessionAbort};
use crate::handlers::{self, GatewayState};
use crate::normalize::normalize;

/// Per-reactor HTTP service. Cheap to clone: it only holds an `Arc` to the
/// state shared across every connection on every reactor.
#[derive(Clone)]
pub struct GatewayService {
    state: Arc<GatewayState>,
}

impl GatewayService {
    #[must_use]
    pub fn new(state: Arc<GatewayState>) -> Self {
        Self { state }
    }
}

impl Service<Request<Incoming>> for GatewayService {
    type Response = Response<ResponseBody>;
    type Error = SessionAbort;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    /// A fatal error returned here aborts the connection without completing
    /// a response (`spec.md` §7: "I/O during session → session terminates;
    /// no partial response is emitted").
    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let state = self.state.clone();
        Box::pin(async move { handle(&state, req).await })
    }
}

async fn handle(state: &GatewayState, req: Request<Incoming>) -> Result<Response<ResponseBody>, SessionAbort> {
    let target = req.uri().path_and_query().map_or_else(|| req.uri().path().to_owned(), ToString::to_string);

    let normalized = match normalize(&target, &state.bucket_name) {
        Ok(n) => n,
        Err(e) => return Ok(e.into_response()),
    };

    let Some(op) = classify(req.method(), &normalized.key, &normalized.params) else {
        return Ok(GatewayError::BadRequest("unsupported req".into()).into_response());
    };

    let result: Result<Response<ResponseBody>, HandlerError> = match op {
        Operation::HeadBucket => Ok(handlers::head_bucket()),
        Operation::HeadObject => handlers::head_object(state, &normalized.key).map_err(HandlerError::from),
        Operation::ListObjects => {
            let prefix = normalized.params.get("prefix").unwrap_or("");
            Ok(handlers::list_objects(state, prefix))
        }
        Operation::BucketVersioning => Ok(handlers::bucket_versioning()),
        Operation::BucketObjectLock => Ok(handlers::bucket_object_lock()),
        Operation::ListAllMyBuckets => Ok(handlers::list_all_my_buckets(state)),
        Operation::GetObject => handlers::get_object(state, &normalized.key).await.map_err(HandlerError::from),
        Operation::PutObject => handlers::put_object(state, &normalized.key, req.into_body()).await,
        Operation::DeleteObject => handlers::delete_object(state, &normalized.key).await,
    };

    match result {
        Ok(response) => Ok(response),
        Err(HandlerError::Client(e)) => Ok(e.into_response()),
        Err(HandlerError::Fatal(e)) => Err(e),
    }
}

/// Build a plain 400 response without going through `GatewayError`, used by
/// the I/O engine for transport-level failures (malformed request lines)
/// that never reach this service.
#[must_use]
pub fn transport_error_response(message: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header(http::header::SERVER, "LOBOS BB")
        .body(ResponseBody::from_bytes(Bytes::copy_from_slice(message.as_bytes())))
        .expect("a response built from static parts is always valid")
}
