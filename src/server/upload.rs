// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! Size-limited upload responder for `POST /foo/bar`

use super::body::{read_limited, status_response, text_response, BodyReadError, BoxError, ResponseBody};
use bytes::Bytes;
use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};

pub const UPLOAD_PATH: &str = "/foo/bar";

/// Accept a body of at most `limit` bytes
pub async fn upload<B>(req: Request<B>, limit: u64) -> Response<ResponseBody>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if req.uri().path() != UPLOAD_PATH {
        return status_response(StatusCode::NOT_FOUND);
    }
    if req.method() != Method::POST {
        return status_response(StatusCode::METHOD_NOT_ALLOWED);
    }

    match read_limited(req.into_body(), limit).await {
        Ok(body) => {
            tracing::info!("Accepted upload of {} bytes", body.len());
            text_response(StatusCode::OK, "Upload success!")
        }
        Err(BodyReadError::TooLarge { limit }) => {
            tracing::warn!("Upload rejected: body larger than {} bytes", limit);
            text_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Request body too large. Limit is {} bytes", limit),
            )
        }
        Err(e) => {
            tracing::error!("{}", e);
            status_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::UPLOAD_LIMIT;
    use http_body_util::{BodyExt, Full};

    fn post(path: &str, body: &'static [u8]) -> Request<Full<Bytes>> {
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(Full::new(Bytes::from_static(body)))
            .unwrap()
    }

    async fn body_text(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_body_at_limit_succeeds() {
        let response = upload(post(UPLOAD_PATH, b"0123456789"), UPLOAD_LIMIT).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Upload success!");
    }

    #[tokio::test]
    async fn test_empty_body_succeeds() {
        let response = upload(post(UPLOAD_PATH, b""), UPLOAD_LIMIT).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_one_byte_over_limit_is_413() {
        let response = upload(post(UPLOAD_PATH, b"0123456789A"), UPLOAD_LIMIT).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body_text(response).await.contains("10"));
    }

    #[tokio::test]
    async fn test_wrong_route_or_method() {
        let response = upload(post("/foo", b"x"), UPLOAD_LIMIT).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let get = Request::builder()
            .uri(UPLOAD_PATH)
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = upload(get, UPLOAD_LIMIT).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
