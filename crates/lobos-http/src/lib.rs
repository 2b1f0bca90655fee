//! HTTP-facing layer of the lobos gateway: path/query normalization,
//! request dispatch, the listing engine, per-operation handlers, and the
//! `hyper` service that ties them together.
//!
//! ```text
//! Request
//!   -> normalize (path & query normalizer)
//!   -> classify (request dispatcher)
//!   -> handlers::* (index- or filesystem-backed)
//!   -> ResponseBody
//! ```

pub mod body;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod normalize;
pub mod service;

pub use body::ResponseBody;
pub use error::GatewayError;
pub use handlers::GatewayState;
pub use service::GatewayService;
