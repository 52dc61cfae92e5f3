// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! Error type shared by the library modules

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Multipart error: {0}")]
    Multipart(#[from] multer::Error),

    #[error("Failed to determine home directory")]
    HomeDirUnavailable,
}

pub type Result<T> = std::result::Result<T, NetError>;
