// Copyright 2025 netstudy Contributors
// Licensed under GPL-3.0

//! CLI command implementations

pub mod lookup;
pub mod serve;
