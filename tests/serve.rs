// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! End-to-end checks through the accept loop over real TCP connections

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{CONTENT_TYPE, LOCATION, TRANSFER_ENCODING};
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use netstudy::server::stream::{StreamConfig, StreamMode};
use netstudy::server::multipart::{self, MultipartConfig};
use netstudy::server::{redirect, stream, upload, ResponseBody};
use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

async fn spawn_server<H, Fut>(handler: H) -> SocketAddr
where
    H: Fn(Request<Incoming>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<ResponseBody>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(netstudy::serve_listener(listener, handler));
    addr
}

fn client() -> Client<hyper_util::client::legacy::connect::HttpConnector, Full<Bytes>> {
    Client::builder(TokioExecutor::new()).build_http()
}

fn request(method: Method, uri: String, body: &'static [u8]) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::from_static(body)))
        .unwrap()
}

const BOUNDARY: &str = "X-NETSTUDY-BOUNDARY";

fn form_request(uri: String, files: &[(&str, &str)]) -> Request<Full<Bytes>> {
    let mut body = Vec::new();
    for (filename, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"pic\"; filename=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, filename, data
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

#[tokio::test]
async fn test_redirect_relay_over_tcp() {
    let target = Arc::new(netstudy::REDIRECT_TARGET.to_string());
    let addr = spawn_server(move |req| {
        let target = target.clone();
        async move { redirect::redirect(&req, &target) }
    })
    .await;

    for path in ["/", "/some/where", "/redir"] {
        let response = client()
            .request(request(Method::GET, format!("http://{}{}", addr, path), b""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            format!("http://localhost:5001{}", path)
        );
    }
}

#[tokio::test]
async fn test_upload_limit_over_tcp() {
    let addr = spawn_server(|req| upload::upload(req, netstudy::UPLOAD_LIMIT)).await;
    let uri = format!("http://{}{}", addr, upload::UPLOAD_PATH);

    let response = client()
        .request(request(Method::POST, uri.clone(), b"0123456789"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Upload success!");

    let response = client()
        .request(request(Method::POST, uri, b"0123456789A"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("Limit is 10 bytes"));
}

#[tokio::test]
async fn test_stream_arrives_in_several_chunks() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"first line\nsecond line\nthird line\n").unwrap();

    let config = Arc::new(StreamConfig {
        file: Some(file.path().to_path_buf()),
        mode: StreamMode::Lines,
        delay: Duration::from_millis(50),
    });
    let addr = spawn_server(move |_req| {
        let config = config.clone();
        async move { stream::stream_file(&config).await }
    })
    .await;

    let response = client()
        .request(request(Method::GET, format!("http://{}/", addr), b""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[TRANSFER_ENCODING], "chunked");

    let mut body = response.into_body();
    let mut chunks = Vec::new();
    while let Some(frame) = body.frame().await {
        if let Ok(data) = frame.unwrap().into_data() {
            chunks.push(data);
        }
    }

    assert!(chunks.len() > 1, "expected several writes, got {}", chunks.len());
    assert_eq!(chunks.concat(), b"first line\nsecond line\nthird line\n");
}

#[tokio::test]
async fn test_multipart_form_over_tcp() {
    let config = Arc::new(MultipartConfig {
        limit: 1024,
        max_memory: 16,
        ..MultipartConfig::default()
    });
    let addr = spawn_server(move |req| {
        let config = config.clone();
        async move { multipart::postform(req, &config).await }
    })
    .await;
    let uri = format!("http://{}{}", addr, multipart::POSTFORM_PATH);

    let small = "s".repeat(10);
    let spilled = "d".repeat(100);
    let response = client()
        .request(form_request(
            uri.clone(),
            &[("small.txt", small.as_str()), ("spilled.bin", spilled.as_str())],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"small.txt\nspilled.bin\n");

    let too_big = "x".repeat(2048);
    let response = client()
        .request(form_request(uri, &[("big.bin", too_big.as_str())]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(String::from_utf8_lossy(&body).contains("less than 1024 bytes"));
}
