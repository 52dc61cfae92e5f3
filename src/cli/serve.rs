// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! Commands starting one of the single-purpose HTTP servers

use anyhow::{Context, Result};
use clap::Subcommand;
use netstudy::constants::*;
use netstudy::server::files::{self, FilesConfig};
use netstudy::server::multipart::{self, MultipartConfig};
use netstudy::server::stream::{self, StreamConfig, StreamMode};
use netstudy::server::{echo, redirect, upload};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Subcommand)]
pub enum ServeCommands {
    /// Redirect every request to the same path on another origin
    Redirect {
        /// Port to listen on
        #[arg(long, default_value_t = PRIMARY_PORT)]
        port: u16,
        /// Origin that receives the redirected requests
        #[arg(long, default_value = REDIRECT_TARGET)]
        target: String,
    },
    /// Secondary server answering /redir and /dosmth
    Target {
        /// Port to listen on
        #[arg(long, default_value_t = SECONDARY_PORT)]
        port: u16,
    },
    /// Stream a local file a chunk at a time
    Stream {
        /// Port to listen on
        #[arg(long, default_value_t = PRIMARY_PORT)]
        port: u16,
        /// File to stream (defaults to ~/.bashrc)
        #[arg(long)]
        file: Option<PathBuf>,
        /// How the file is cut into chunks
        #[arg(long, value_enum, default_value_t = StreamMode::Lines)]
        mode: StreamMode,
        /// Pause between chunks in milliseconds
        #[arg(long, default_value_t = STREAM_DELAY_MS)]
        delay_ms: u64,
    },
    /// Accept small uploads on POST /foo/bar
    Upload {
        /// Port to listen on
        #[arg(long, default_value_t = PRIMARY_PORT)]
        port: u16,
        /// Largest accepted body in bytes
        #[arg(long, default_value_t = UPLOAD_LIMIT)]
        limit: u64,
    },
    /// Accept multipart uploads on POST /postform
    Multipart {
        /// Port to listen on
        #[arg(long, default_value_t = PRIMARY_PORT)]
        port: u16,
        /// Largest accepted body in bytes
        #[arg(long, default_value_t = MULTIPART_LIMIT)]
        limit: u64,
        /// File bytes kept in memory before spilling to disk
        #[arg(long, default_value_t = MULTIPART_MAX_MEMORY)]
        max_memory: u64,
        /// Form field holding the files
        #[arg(long, default_value = MULTIPART_FIELD)]
        field: String,
        /// Read every uploaded file back into memory
        #[arg(long)]
        read_contents: bool,
    },
    /// Serve notes.md and myvideo.mp4
    Files {
        /// Port to listen on
        #[arg(long, default_value_t = PRIMARY_PORT)]
        port: u16,
        /// File served at /myfiles/notes.md
        #[arg(long, default_value = NOTES_FILE)]
        notes: PathBuf,
        /// File served at /myvideo
        #[arg(long, default_value = VIDEO_FILE)]
        video: PathBuf,
    },
    /// Echo requests to /foo back to the caller
    Echo {
        /// Port to listen on
        #[arg(long, default_value_t = PRIMARY_PORT)]
        port: u16,
    },
}

pub async fn execute(host: String, command: ServeCommands) -> Result<()> {
    tokio::select! {
        result = run(&host, command) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down server...");
        }
    }

    println!("Server stopped.");

    Ok(())
}

async fn run(host: &str, command: ServeCommands) -> Result<()> {
    let served = match command {
        ServeCommands::Redirect { port, target } => {
            println!("Redirect relay: every request goes to {}", target);
            let target = Arc::new(target);
            netstudy::serve(&addr(host, port), move |req| {
                let target = target.clone();
                async move { redirect::redirect(&req, &target) }
            })
            .await
        }
        ServeCommands::Target { port } => {
            println!("Redirect target: /redir and /dosmth");
            netstudy::serve(&addr(host, port), |req| async move { redirect::target(&req) }).await
        }
        ServeCommands::Stream {
            port,
            file,
            mode,
            delay_ms,
        } => {
            let config = Arc::new(StreamConfig {
                file,
                mode,
                delay: Duration::from_millis(delay_ms),
            });
            let path = config.resolve_path()?;
            println!("Streaming {} ({:?}, {} ms between chunks)", path.display(), mode, delay_ms);
            netstudy::serve(&addr(host, port), move |_req| {
                let config = config.clone();
                async move { stream::stream_file(&config).await }
            })
            .await
        }
        ServeCommands::Upload { port, limit } => {
            println!("Upload endpoint: POST {} (limit {} bytes)", upload::UPLOAD_PATH, limit);
            netstudy::serve(&addr(host, port), move |req| upload::upload(req, limit)).await
        }
        ServeCommands::Multipart {
            port,
            limit,
            max_memory,
            field,
            read_contents,
        } => {
            println!(
                "Multipart endpoint: POST {} (field {:?}, limit {} bytes)",
                multipart::POSTFORM_PATH,
                field,
                limit
            );
            let config = Arc::new(MultipartConfig {
                limit,
                max_memory,
                field,
                read_contents,
            });
            netstudy::serve(&addr(host, port), move |req| {
                let config = config.clone();
                async move { multipart::postform(req, &config).await }
            })
            .await
        }
        ServeCommands::Files { port, notes, video } => {
            println!(
                "Serving {} at {} and {} at {}",
                notes.display(),
                files::NOTES_PATH,
                video.display(),
                files::VIDEO_PATH
            );
            let config = Arc::new(FilesConfig { notes, video });
            netstudy::serve(&addr(host, port), move |req| {
                let config = config.clone();
                async move { files::files(req, &config).await }
            })
            .await
        }
        ServeCommands::Echo { port } => {
            println!("Echo endpoint: GET|POST {}", echo::ECHO_PATH);
            netstudy::serve(&addr(host, port), |req| echo::echo(req)).await
        }
    };

    served.context("Server failed")
}

fn addr(host: &str, port: u16) -> String {
    format!("{}:{}", host, port)
}
