// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! File streaming responder
//!
//! Sends a local file one chunk at a time, pausing between chunks. Every
//! chunk is its own body frame, so hyper writes and flushes it right away
//! using chunked transfer encoding.

use super::body::{status_response, ResponseBody};
use crate::constants::{STREAM_DELAY_MS, STREAM_FILE};
use crate::error::{NetError, Result};
use bytes::Bytes;
use futures::channel::mpsc;
use futures::SinkExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};

/// How the file is cut into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StreamMode {
    /// One line (with its newline) per chunk
    Lines,
    /// One byte per chunk
    Bytes,
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// File to stream; `~/.bashrc` when unset
    pub file: Option<PathBuf>,
    pub mode: StreamMode,
    pub delay: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            file: None,
            mode: StreamMode::Lines,
            delay: Duration::from_millis(STREAM_DELAY_MS),
        }
    }
}

impl StreamConfig {
    /// Path of the file to stream
    pub fn resolve_path(&self) -> Result<PathBuf> {
        match &self.file {
            Some(path) => Ok(path.clone()),
            None => {
                let home = directories::BaseDirs::new().ok_or(NetError::HomeDirUnavailable)?;
                Ok(home.home_dir().join(STREAM_FILE))
            }
        }
    }
}

type ChunkSender = mpsc::Sender<std::result::Result<Frame<Bytes>, io::Error>>;

/// Stream the configured file as the response body
///
/// Failures before the headers go out become `500`. Later failures are
/// logged and cut the body short.
pub async fn stream_file(config: &StreamConfig) -> Response<ResponseBody> {
    let path = match config.resolve_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("{}", e);
            return status_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::error!("Failed to open {}: {}", path.display(), e);
            return status_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(produce(file, path, config.mode, config.delay, tx));

    let mut response = Response::new(StreamBody::new(rx).boxed_unsync());
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

async fn produce(file: File, path: PathBuf, mode: StreamMode, delay: Duration, mut tx: ChunkSender) {
    let mut reader = BufReader::new(file);
    let mut sent = 0usize;

    loop {
        let chunk = match next_chunk(&mut reader, mode).await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", path.display(), e);
                let _ = tx.send(Err(e)).await;
                return;
            }
        };

        if sent > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if tx.send(Ok(Frame::data(chunk))).await.is_err() {
            tracing::debug!("Client went away after {} chunks of {}", sent, path.display());
            return;
        }
        sent += 1;
    }

    tracing::info!("Streamed {} in {} chunks", display_name(&path), sent);
}

async fn next_chunk(reader: &mut BufReader<File>, mode: StreamMode) -> io::Result<Option<Bytes>> {
    match mode {
        StreamMode::Lines => {
            let mut line = Vec::new();
            let n = reader.read_until(b'\n', &mut line).await?;
            Ok((n > 0).then(|| Bytes::from(line)))
        }
        StreamMode::Bytes => {
            let mut byte = [0u8; 1];
            let n = reader.read(&mut byte).await?;
            Ok((n > 0).then(|| Bytes::copy_from_slice(&byte)))
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
