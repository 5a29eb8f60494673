// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logtrail SDK.
//!
//! Enriches log events with normalized exceptions (template source-mapping,
//! relative paths, library flags, code snippets, SQL diagnostics), signs them
//! and ships them to the Logtrail ingest endpoint as gzipped JSON.
//!
//! # Example
//!
//! ```no_run
//! use logtrail::{Level, Reporter};
//! use serde_json::Map;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reporter = Reporter::builder().build()?;
//! reporter.info("user signed in", Map::new());
//!
//! if let Err(err) = std::fs::read("missing.toml") {
//!     reporter.error_with(Level::Error, &err);
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod envelope;
pub mod error;
pub mod normalizer;
pub mod reporter;
pub mod request;
pub mod signer;
pub mod sql;
pub mod transport;
pub mod version;

pub use builder::PayloadBuilder;
pub use envelope::{authorization_token, Envelope};
pub use error::{LogtrailSdkError, Result};
pub use normalizer::{Normalizer, TEMPLATE_FRAME_CLASS, TEMPLATE_FRAME_FUNCTION};
pub use reporter::{Reporter, ReporterBuilder};
pub use request::{NoRequestContext, RequestContextProvider, StaticRequestContext};
pub use signer::{compute_signature, verify_signature, Signer};
pub use transport::{encode_body, HttpTransport, Transport, GZIP_LEVEL};
pub use version::git_short_sha;

pub use logtrail_config::{LogtrailConfig, SecretString};
pub use logtrail_core::{
	DatabaseError, ExceptionRecord, Level, LogEvent, Payload, RawException, RequestContext,
	StackFrame,
};
