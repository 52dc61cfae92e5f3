// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! Echo the raw request back for `GET|POST /foo`

use super::body::{read_limited, status_response, text_response, BodyReadError, BoxError, ResponseBody};
use crate::constants::ECHO_LIMIT;
use bytes::{Bytes, BytesMut};
use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};

pub const ECHO_PATH: &str = "/foo";

/// Render the request line, headers and body as they came in
pub fn dump_request(parts: &hyper::http::request::Parts, body: &[u8]) -> Bytes {
    let mut out = BytesMut::new();
    out.extend_from_slice(format!("{} {} {:?}\r\n", parts.method, parts.uri, parts.version).as_bytes());
    for (name, value) in parts.headers.iter() {
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(body);
    out.freeze()
}

pub async fn echo<B>(req: Request<B>) -> Response<ResponseBody>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if req.uri().path() != ECHO_PATH {
        return status_response(StatusCode::NOT_FOUND);
    }
    if req.method() != Method::GET && req.method() != Method::POST {
        return status_response(StatusCode::METHOD_NOT_ALLOWED);
    }

    let (parts, body) = req.into_parts();
    let body = match read_limited(body, ECHO_LIMIT).await {
        Ok(body) => body,
        Err(BodyReadError::TooLarge { limit }) => {
            return text_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!("Request body too large. Limit is {} bytes", limit),
            );
        }
        Err(e) => {
            tracing::error!("{}", e);
            return status_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    tracing::info!("Echoing {} {} ({} body bytes)", parts.method, parts.uri, body.len());
    text_response(StatusCode::OK, dump_request(&parts, &body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Full};

    #[tokio::test]
    async fn test_echo_post() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/foo?x=1")
            .header("host", "localhost:5000")
            .header("content-type", "text/plain")
            .body(Full::new(Bytes::from_static(b"ping")))
            .unwrap();

        let response = echo(req).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(
            &body[..],
            b"POST /foo?x=1 HTTP/1.1\r\nhost: localhost:5000\r\ncontent-type: text/plain\r\n\r\nping"
        );
    }

    #[tokio::test]
    async fn test_echo_get_without_body() {
        let req = Request::builder()
            .uri("/foo")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let body = echo(req).await.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"GET /foo HTTP/1.1\r\n\r\n");
    }

    #[tokio::test]
    async fn test_echo_rejects_other_routes_and_methods() {
        let req = Request::builder()
            .uri("/bar")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert_eq!(echo(req).await.status(), StatusCode::NOT_FOUND);

        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/foo")
            .body(Full::new(Bytes::new()))
            .unwrap();
        assert_eq!(echo(req).await.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
