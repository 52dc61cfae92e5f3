// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! DNS host and TXT lookups
//!
//! Each lookup is a single resolver call. Failures are captured in the
//! returned [`LookupReport`] instead of being raised, so callers always get
//! something to print.

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupKind {
    Host,
    Txt,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Host => write!(f, "host"),
            LookupKind::Txt => write!(f, "TXT"),
        }
    }
}

/// Outcome of one lookup
#[derive(Debug, Clone, Serialize)]
pub struct LookupReport {
    pub kind: LookupKind,
    pub name: String,
    pub records: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LookupReport {
    fn new(kind: LookupKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            records: Vec::new(),
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The error line (if any), then the records as `[a b c]`
impl fmt::Display for LookupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            writeln!(f, "{}", error)?;
        }
        write!(f, "[{}]", self.records.join(" "))
    }
}

/// Resolver configured from the operating system
///
/// Falls back to the library defaults when the system configuration
/// cannot be read.
pub fn system_resolver() -> TokioAsyncResolver {
    match TokioAsyncResolver::tokio_from_system_conf() {
        Ok(resolver) => resolver,
        Err(e) => {
            tracing::warn!("Failed to read system resolver configuration, using defaults: {}", e);
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        }
    }
}

/// Resolve `name` to its addresses (A and AAAA, hosts file honored)
pub async fn lookup_host(resolver: &TokioAsyncResolver, name: &str) -> LookupReport {
    let mut report = LookupReport::new(LookupKind::Host, name);

    match resolver.lookup_ip(name).await {
        Ok(lookup) => {
            report.records = lookup.iter().map(|ip| ip.to_string()).collect();
            tracing::debug!("{} resolved to {} addresses", name, report.records.len());
        }
        Err(e) => {
            tracing::debug!("Host lookup for {} failed: {}", name, e);
            report.error = Some(format!("lookup {}: {}", name, e));
        }
    }

    report
}

/// Fetch the TXT records of `name`, one string per record
pub async fn lookup_txt(resolver: &TokioAsyncResolver, name: &str) -> LookupReport {
    let mut report = LookupReport::new(LookupKind::Txt, name);

    match resolver.txt_lookup(name).await {
        Ok(lookup) => {
            // A record may hold several character strings; they form one value
            report.records = lookup
                .iter()
                .map(|txt| {
                    txt.iter()
                        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                        .collect::<String>()
                })
                .collect();
            tracing::debug!("{} has {} TXT records", name, report.records.len());
        }
        Err(e) => {
            tracing::debug!("TXT lookup for {} failed: {}", name, e);
            report.error = Some(format!("lookup {}: {}", name, e));
        }
    }

    report
}

/// Run the lookup of the given kind
pub async fn lookup(resolver: &TokioAsyncResolver, kind: LookupKind, name: &str) -> LookupReport {
    match kind {
        LookupKind::Host => lookup_host(resolver, name).await,
        LookupKind::Txt => lookup_txt(resolver, name).await,
    }
}
