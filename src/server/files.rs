// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! Conditional file serving for `/myfiles/notes.md` and `/myvideo`
//!
//! Supports `If-Modified-Since`, a single byte `Range`, and `HEAD`.

use super::body::{empty, status_response, ResponseBody};
use crate::constants::{NOTES_FILE, VIDEO_FILE};
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::header::{
    HeaderMap, HeaderValue, ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
    IF_MODIFIED_SINCE, LAST_MODIFIED, RANGE,
};
use hyper::{Method, Request, Response, StatusCode};
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

pub const NOTES_PATH: &str = "/myfiles/notes.md";
pub const VIDEO_PATH: &str = "/myvideo";

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct FilesConfig {
    pub notes: PathBuf,
    pub video: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            notes: PathBuf::from(NOTES_FILE),
            video: PathBuf::from(VIDEO_FILE),
        }
    }
}

/// What a `Range` header asks for, given the file length
#[derive(Debug, PartialEq, Eq)]
pub enum RangeRequest {
    /// No usable range: send everything
    Full,
    /// Inclusive byte range
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

/// Interpret a `Range` header value
///
/// Only a single `bytes=` range is honored. Malformed and multi-range
/// values fall back to the full file.
pub fn parse_range(value: &str, len: u64) -> RangeRequest {
    let Some(spec) = value.trim().strip_prefix("bytes=") else {
        return RangeRequest::Full;
    };
    if spec.contains(',') {
        return RangeRequest::Full;
    }
    let Some((start, end)) = spec.trim().split_once('-') else {
        return RangeRequest::Full;
    };

    if start.is_empty() {
        // Suffix range: the last `n` bytes
        let Ok(n) = end.parse::<u64>() else {
            return RangeRequest::Full;
        };
        if n == 0 || len == 0 {
            return RangeRequest::Unsatisfiable;
        }
        return RangeRequest::Partial {
            start: len.saturating_sub(n),
            end: len - 1,
        };
    }

    let Ok(start) = start.parse::<u64>() else {
        return RangeRequest::Full;
    };
    let end = if end.is_empty() {
        None
    } else {
        match end.parse::<u64>() {
            Ok(end) if end >= start => Some(end),
            _ => return RangeRequest::Full,
        }
    };

    if start >= len {
        return RangeRequest::Unsatisfiable;
    }

    RangeRequest::Partial {
        start,
        end: end.map_or(len - 1, |end| end.min(len - 1)),
    }
}

/// IMF-fixdate, as used by `Last-Modified`
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date in any of the three forms clients may send:
/// IMF-fixdate, RFC 850 and asctime
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(time) = DateTime::parse_from_rfc2822(value) {
        return Some(time.with_timezone(&Utc));
    }

    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|time| time.and_utc())
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("md") => "text/markdown; charset=utf-8",
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Route a request to the notes file or the video
pub async fn files<B>(req: Request<B>, config: &FilesConfig) -> Response<ResponseBody> {
    let (parts, _) = req.into_parts();

    let path = match parts.uri.path() {
        NOTES_PATH => &config.notes,
        VIDEO_PATH => &config.video,
        _ => return status_response(StatusCode::NOT_FOUND),
    };

    serve_file(path, &parts.method, &parts.headers).await
}

/// Serve `path` honoring conditional and range headers
pub async fn serve_file(path: &Path, method: &Method, headers: &HeaderMap) -> Response<ResponseBody> {
    if method != Method::GET && method != Method::HEAD {
        let mut response = status_response(StatusCode::METHOD_NOT_ALLOWED);
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
        return response;
    }

    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return status_response(StatusCode::NOT_FOUND),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("{} not found", path.display());
            return status_response(StatusCode::NOT_FOUND);
        }
        Err(e) => {
            tracing::error!("Failed to stat {}: {}", path.display(), e);
            return status_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let len = metadata.len();
    let modified = metadata.modified().ok().map(DateTime::<Utc>::from);
    let last_modified = modified.map(http_date);

    if let (Some(modified), Some(since)) = (
        modified,
        headers
            .get(IF_MODIFIED_SINCE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date),
    ) {
        if modified.timestamp() <= since.timestamp() {
            let mut response = Response::new(empty());
            *response.status_mut() = StatusCode::NOT_MODIFIED;
            if let Some(value) = last_modified.as_deref().and_then(|v| HeaderValue::from_str(v).ok()) {
                response.headers_mut().insert(LAST_MODIFIED, value);
            }
            return response;
        }
    }

    let range = headers
        .get(RANGE)
        .and_then(|v| v.to_str().ok())
        .map_or(RangeRequest::Full, |v| parse_range(v, len));

    let (status, start, count) = match range {
        RangeRequest::Full => (StatusCode::OK, 0, len),
        RangeRequest::Partial { start, end } => (StatusCode::PARTIAL_CONTENT, start, end - start + 1),
        RangeRequest::Unsatisfiable => {
            let mut response = status_response(StatusCode::RANGE_NOT_SATISFIABLE);
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", len)) {
                response.headers_mut().insert(CONTENT_RANGE, value);
            }
            return response;
        }
    };

    let body = if method == Method::HEAD {
        empty()
    } else {
        match open_at(path, start).await {
            Ok(file) => file_body(file, count),
            Err(e) => {
                tracing::error!("Failed to open {}: {}", path.display(), e);
                return status_response(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    };

    tracing::info!("Serving {} ({} of {} bytes)", path.display(), count, len);

    let mut response = Response::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type_for(path)));
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(count));
    if let Some(value) = last_modified.as_deref().and_then(|v| HeaderValue::from_str(v).ok()) {
        headers.insert(LAST_MODIFIED, value);
    }
    if status == StatusCode::PARTIAL_CONTENT {
        let content_range = format!("bytes {}-{}/{}", start, start + count - 1, len);
        if let Ok(value) = HeaderValue::from_str(&content_range) {
            headers.insert(CONTENT_RANGE, value);
        }
    }

    response
}

async fn open_at(path: &Path, start: u64) -> io::Result<File> {
    let mut file = File::open(path).await?;
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }
    Ok(file)
}

/// Body reading `len` bytes from `file` in fixed-size chunks
fn file_body(file: File, len: u64) -> ResponseBody {
    let chunks = stream::try_unfold((file, len), |(mut file, remaining)| async move {
        if remaining == 0 {
            return Ok::<_, io::Error>(None);
        }

        let mut buf = vec![0u8; remaining.min(CHUNK_SIZE as u64) as usize];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file shrank while being served",
            ));
        }
        buf.truncate(n);

        Ok(Some((Frame::data(Bytes::from(buf)), (file, remaining - n as u64))))
    });

    StreamBody::new(chunks).boxed_unsync()
}
