// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Logtrail log enrichment pipeline.
//!
//! This crate holds the data model shared by the source-mapping engine
//! (`logtrail-sourcemap`), the SDK (`logtrail`) and the CLI:
//!
//! - [`LogEvent`] and [`RawException`]: what the application hands over
//! - [`ExceptionRecord`] and [`CompressedFrame`]: the enriched, compressed form
//! - [`UnsignedPayload`] and [`Payload`]: the wire record before and after signing
//! - [`RequestContext`]: HTTP request details merged into the event context

pub mod backtrace;
pub mod context;
pub mod error;
pub mod event;
pub mod level;
pub mod payload;
pub mod record;

pub use context::RequestContext;
pub use error::{LogtrailError, Result};
pub use event::{DatabaseError, LogEvent, RawException, StackFrame};
pub use level::Level;
pub use payload::{Payload, UnsignedPayload};
pub use record::{CodeSnippetLine, CompressedFrame, ExceptionRecord, PrimaryFrame, Snippet};
