// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! Response body helpers and the size-limited request body reader

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use std::error::Error as StdError;
use std::io;

/// Boxed error carried by request bodies
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Body type of every response produced by the servers
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Body made of a single chunk
pub fn full<T: Into<Bytes>>(chunk: T) -> ResponseBody {
    Full::new(chunk.into()).map_err(|never| match never {}).boxed_unsync()
}

/// Body with no content
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync()
}

/// `text/plain` response with the given status
pub fn text_response(status: StatusCode, text: impl Into<Bytes>) -> Response<ResponseBody> {
    let mut response = Response::new(full(text));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Response whose body is the canonical reason phrase of `status`
pub fn status_response(status: StatusCode) -> Response<ResponseBody> {
    let reason = status.canonical_reason().unwrap_or("Unknown Status");
    text_response(status, format!("{}\n", reason))
}

/// Why a limited body could not be read
#[derive(Debug, thiserror::Error)]
pub enum BodyReadError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("failed to read request body: {0}")]
    Read(BoxError),
}

/// Returns true when `err` (or anything it wraps) is the length limit error
/// raised by [`Limited`]
pub fn is_length_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Read a whole request body, refusing anything longer than `limit` bytes
pub async fn read_limited<B>(body: B, limit: u64) -> Result<Bytes, BodyReadError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limited = Limited::new(body, usize::try_from(limit).unwrap_or(usize::MAX));

    match limited.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if is_length_limit(&*e) => Err(BodyReadError::TooLarge { limit }),
        Err(e) => Err(BodyReadError::Read(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_limited_accepts_body_at_limit() {
        let body = Full::new(Bytes::from_static(b"0123456789"));
        let bytes = read_limited(body, 10).await.unwrap();
        assert_eq!(&bytes[..], b"0123456789");
    }

    #[tokio::test]
    async fn test_read_limited_rejects_body_over_limit() {
        let body = Full::new(Bytes::from_static(b"0123456789A"));
        match read_limited(body, 10).await {
            Err(BodyReadError::TooLarge { limit }) => assert_eq!(limit, 10),
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_response_uses_reason_phrase() {
        let response = status_response(StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Not Found\n");
    }
}
