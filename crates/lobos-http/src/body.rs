//! The HTTP response body type used throughout the gateway: buffered XML/
//! text bodies, an empty body, and a file-streaming body for `GetObject`.
//!
//! Generalizes a buffered-or-empty body enum with a third, streaming
//! variant so `GetObject` never has to read an entire object into memory
//! before responding.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::Full;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

#[derive(Debug, Default)]
pub enum ResponseBody {
    Buffered(Full<Bytes>),
    #[default]
    Empty,
    File(ReaderStream<File>),
}

impl ResponseBody {
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    #[must_use]
    pub fn from_file(file: File) -> Self {
        Self::File(ReaderStream::new(file))
    }
}

impl http_body::Body for ResponseBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Buffered(full) => Pin::new(full).poll_frame(cx).map_err(|never| match never {}),
            Self::Empty => Poll::Ready(None),
            Self::File(stream) => {
                match futures_core_next(Pin::new(stream), cx) {
                    Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(http_body::Frame::data(chunk)))),
                    Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(e))),
                    Poll::Ready(None) => Poll::Ready(None),
                    Poll::Pending => Poll::Pending,
                }
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Buffered(full) => full.is_end_stream(),
            Self::Empty => true,
            Self::File(_) => false,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Buffered(full) => full.size_hint(),
            Self::Empty => http_body::SizeHint::with_exact(0),
            Self::File(_) => http_body::SizeHint::default(),
        }
    }
}

/// `ReaderStream` implements `futures_core::Stream`, not a `poll_frame`
/// directly; this is a thin adapter so `poll_frame` above can stay a plain
/// `match` instead of pulling in the `Stream` trait name at every call site.
fn futures_core_next(
    stream: Pin<&mut ReaderStream<File>>,
    cx: &mut Context<'_>,
) -> Poll<Option<std::io::Result<Bytes>>> {
    use futures_core::Stream;
    stream.poll_next(cx)
}

#[cfg(test)]
mod tests {
    use http_body::Body;

    use super::*;

    #[test]
    fn empty_body_is_end_of_stream_with_zero_size() {
        let body = ResponseBody::empty();
        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));
    }

    #[test]
    fn buffered_body_reports_exact_size() {
        let body = ResponseBody::from_bytes(Bytes::from("hello"));
        assert_eq!(body.size_hint().exact(), Some(5));
    }
}
