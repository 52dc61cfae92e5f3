// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

/// Default port for every primary server
pub const PRIMARY_PORT: u16 = 5000;

/// Default port of the secondary server that redirects land on
pub const SECONDARY_PORT: u16 = 5001;

/// Where the redirect relay sends clients
pub const REDIRECT_TARGET: &str = "http://localhost:5001";

/// Body cap for `POST /foo/bar`
pub const UPLOAD_LIMIT: u64 = 10;

/// Body cap for `POST /postform`
pub const MULTIPART_LIMIT: u64 = 5 << 20;

/// Bytes of uploaded file content a multipart form keeps in memory
/// before spilling further files to disk
pub const MULTIPART_MAX_MEMORY: u64 = 10 << 10;

/// Form field holding uploaded pictures
pub const MULTIPART_FIELD: &str = "pic";

/// File streamed from the home directory when no path is given
pub const STREAM_FILE: &str = ".bashrc";

/// Pause between streamed chunks, in milliseconds
pub const STREAM_DELAY_MS: u64 = 500;

/// File served at `/myfiles/notes.md`
pub const NOTES_FILE: &str = "notes.md";

/// File served at `/myvideo`
pub const VIDEO_FILE: &str = "myvideo.mp4";

/// Default name for host lookups
pub const HOST_LOOKUP_NAME: &str = "localhost";

/// Default name for TXT lookups
pub const TXT_LOOKUP_NAME: &str = "github.com";

/// Largest request body the echo server reflects
pub const ECHO_LIMIT: u64 = 1 << 20;
