// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Template source-mapping engine for Logtrail.
//!
//! This crate provides functionality for:
//! - Injecting per-line `LT_LINE` markers into template source before compilation
//! - Detecting compiled template artifacts and locating their original template
//! - Mapping a compiled line back to its template line via the nearest marker
//! - Extracting clamped code snippets around a line
//! - Relativizing paths and classifying frames against the application root
//!
//! Every lookup is best-effort: unreadable files or missing markers yield `None`.
//!
//! # Example
//!
//! ```
//! use logtrail_sourcemap::{parse_marker, MarkerInjector};
//!
//! let injector = MarkerInjector::default();
//! let compiled = injector.inject("<h1>{{ $title }}</h1>\r\n<p>{{ $body }}</p>");
//!
//! let lines: Vec<&str> = compiled.lines().collect();
//! assert_eq!(lines.len(), 2);
//! assert_eq!(parse_marker(lines[1]), Some(2));
//! ```

pub mod artifact;
pub mod marker;
pub mod paths;
pub mod snippet;

pub use artifact::{ArtifactResolver, CompiledLayout, ResolvedLocation};
pub use marker::{normalize_line_endings, parse_marker, MarkerInjector, Precompiler, MARKER_TAG};
pub use paths::{normalize_separators, AppRoot, DEFAULT_DEPENDENCY_DIR};
pub use snippet::{extract_snippet, extract_snippet_from_str, DEFAULT_PADDING};
