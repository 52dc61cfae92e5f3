// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! netstudy - small networking exercises
//!
//! DNS host and TXT lookups, plus a handful of independent single-purpose
//! HTTP servers: a redirect relay, a file streamer, a size-limited upload
//! endpoint, a multipart form endpoint, a conditional file server and a
//! request echo. Each server runs on its own; nothing is shared between them
//! except the accept loop in [`server`].

pub mod constants;
pub mod error;
pub mod lookup;
pub mod server;

pub use constants::*;
pub use error::{NetError, Result};

// Re-export commonly used types
pub use lookup::{lookup_host, lookup_txt, system_resolver, LookupKind, LookupReport};
pub use server::{serve, serve_listener};
