// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! Multipart form responder for `POST /postform`
//!
//! The body goes through the same size-limited reader as the plain upload
//! endpoint before `multer` sees it. Uploaded files stay in memory until the
//! form's memory budget runs out; later files are written to temporary files
//! that disappear when the form is dropped.

use super::body::{is_length_limit, status_response, text_response, BoxError, ResponseBody};
use crate::constants::{MULTIPART_FIELD, MULTIPART_LIMIT, MULTIPART_MAX_MEMORY};
use crate::error::{NetError, Result};
use bytes::{Bytes, BytesMut};
use futures::{future, TryStreamExt};
use http_body_util::{BodyStream, Limited};
use hyper::body::Body;
use hyper::header::CONTENT_TYPE;
use hyper::{Method, Request, Response, StatusCode};
use multer::Multipart;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

pub const POSTFORM_PATH: &str = "/postform";

#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Cap on the whole request body
    pub limit: u64,
    /// Bytes of file content kept in memory per form
    pub max_memory: u64,
    /// Field whose files are listed
    pub field: String,
    /// Read every uploaded file back into memory after parsing
    pub read_contents: bool,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            limit: MULTIPART_LIMIT,
            max_memory: MULTIPART_MAX_MEMORY,
            field: MULTIPART_FIELD.to_string(),
            read_contents: false,
        }
    }
}

#[derive(Debug)]
pub enum FileContent {
    Memory(Bytes),
    Disk(NamedTempFile),
}

/// One uploaded file
#[derive(Debug)]
pub struct FileHeader {
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
    pub content: FileContent,
}

impl FileHeader {
    pub fn is_on_disk(&self) -> bool {
        matches!(self.content, FileContent::Disk(_))
    }

    /// Load the whole file into memory
    pub async fn read_all(&self) -> io::Result<Bytes> {
        match &self.content {
            FileContent::Memory(bytes) => Ok(bytes.clone()),
            FileContent::Disk(file) => tokio::fs::read(file.path()).await.map(Bytes::from),
        }
    }
}

/// Parsed form: text values and uploaded files, keyed by field name
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub values: HashMap<String, Vec<String>>,
    pub files: HashMap<String, Vec<FileHeader>>,
}

impl MultipartForm {
    /// Files uploaded under `field`, empty when there are none
    pub fn files(&self, field: &str) -> &[FileHeader] {
        self.files.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Parse a `multipart/form-data` request body of at most `limit` bytes
pub async fn read_form<B>(req: Request<B>, limit: u64, max_memory: u64) -> Result<MultipartForm>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let boundary = multer::parse_boundary(content_type)?;

    let limited = Limited::new(req.into_body(), usize::try_from(limit).unwrap_or(usize::MAX));
    let stream = BodyStream::new(limited)
        .try_filter_map(|frame| future::ready(Ok::<_, BoxError>(frame.into_data().ok())));
    let mut multipart = Multipart::new(stream, boundary);

    let mut form = MultipartForm::default();
    let mut remaining = max_memory;

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        // An empty file input arrives as `filename=""` and counts as a plain value
        let Some(filename) = field.file_name().and_then(base_name) else {
            let value = field.text().await?;
            remaining = remaining.saturating_sub(value.len() as u64);
            form.values.entry(name).or_default().push(value);
            continue;
        };
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut buffered = BytesMut::new();
        let mut spilled: Option<(NamedTempFile, tokio::fs::File)> = None;
        let mut size = 0u64;

        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
            match spilled.as_mut() {
                Some((_, file)) => file.write_all(&chunk).await?,
                None if size > remaining => {
                    let tmp = NamedTempFile::new()?;
                    let mut file = tokio::fs::File::from_std(tmp.as_file().try_clone()?);
                    file.write_all(&buffered).await?;
                    file.write_all(&chunk).await?;
                    buffered.clear();
                    spilled = Some((tmp, file));
                }
                None => buffered.extend_from_slice(&chunk),
            }
        }

        let content = match spilled {
            Some((tmp, mut file)) => {
                file.flush().await?;
                tracing::debug!("{} ({} bytes) spilled to {}", filename, size, tmp.path().display());
                FileContent::Disk(tmp)
            }
            None => {
                remaining -= size;
                FileContent::Memory(buffered.freeze())
            }
        };

        form.files.entry(name).or_default().push(FileHeader {
            filename,
            content_type,
            size,
            content,
        });
    }

    Ok(form)
}

/// Last path component of a client supplied filename, `None` when empty
fn base_name(raw: &str) -> Option<String> {
    Path::new(raw)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn exceeded_limit(err: &NetError) -> bool {
    match err {
        NetError::Multipart(multer::Error::StreamReadFailed(inner)) => is_length_limit(&**inner),
        _ => false,
    }
}

/// List the files uploaded under the configured field
pub async fn postform<B>(req: Request<B>, config: &MultipartConfig) -> Response<ResponseBody>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    if req.uri().path() != POSTFORM_PATH {
        return status_response(StatusCode::NOT_FOUND);
    }
    if req.method() != Method::POST {
        return status_response(StatusCode::METHOD_NOT_ALLOWED);
    }

    let form = match read_form(req, config.limit, config.max_memory).await {
        Ok(form) => form,
        Err(e) => {
            if exceeded_limit(&e) {
                tracing::warn!("Form rejected: body larger than {} bytes", config.limit);
            } else {
                tracing::warn!("Failed to parse form: {}", e);
            }
            return text_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "The uploaded file is too big. Please choose a file that's less than {} bytes in size",
                    config.limit
                ),
            );
        }
    };

    let files = form.files(&config.field);
    if files.is_empty() {
        tracing::warn!("No files under field {:?}", config.field);
        return text_response(
            StatusCode::BAD_REQUEST,
            format!("No files uploaded under field {:?}", config.field),
        );
    }

    let mut listing = String::new();
    for file in files {
        tracing::info!("Uploaded file: {} ({} bytes)", file.filename, file.size);
        listing.push_str(&file.filename);
        listing.push('\n');
    }

    if config.read_contents {
        for file in files {
            match file.read_all().await {
                Ok(contents) => tracing::debug!("Read {} bytes of {}", contents.len(), file.filename),
                Err(e) => {
                    tracing::error!("Failed to read back {}: {}", file.filename, e);
                    return status_response(StatusCode::INTERNAL_SERVER_ERROR);
                }
            }
        }
    }

    text_response(StatusCode::OK, listing)
}
