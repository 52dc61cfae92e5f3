// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! Single-purpose HTTP servers and the accept loop they share

pub mod body;
pub mod echo;
pub mod files;
pub mod multipart;
pub mod redirect;
pub mod stream;
pub mod upload;

pub use body::{empty, full, status_response, text_response, ResponseBody};

use crate::error::{NetError, Result};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Bind `addr` and serve every connection with `handler` until the process exits
pub async fn serve<H, Fut>(addr: &str, handler: H) -> Result<()>
where
    H: Fn(Request<Incoming>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<ResponseBody>> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await.map_err(|source| NetError::Bind {
        addr: addr.to_string(),
        source,
    })?;

    println!("✓ Listening on http://{}\n", listener.local_addr()?);

    serve_listener(listener, handler).await
}

/// Accept loop over an already bound listener
///
/// Every connection gets its own task. Accept and connection errors are
/// logged and never end the loop.
pub async fn serve_listener<H, Fut>(listener: TcpListener, handler: H) -> Result<()>
where
    H: Fn(Request<Incoming>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<ResponseBody>> + Send + 'static,
{
    let handler = Arc::new(handler);

    loop {
        let (stream, remote_addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to accept connection: {}", e);
                continue;
            }
        };

        let handler = handler.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let handler = handler.clone();
                async move {
                    tracing::info!("{} {} from {}", req.method(), req.uri(), remote_addr);
                    Ok::<_, Infallible>((*handler)(req).await)
                }
            });

            let io = TokioIo::new(stream);

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                tracing::error!("Connection error from {}: {}", remote_addr, e);
            }
        });
    }
}
