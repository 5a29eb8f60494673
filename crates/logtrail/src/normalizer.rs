// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Exception normalization: template source-mapping, path compression,
//! library classification, code snippets and SQL diagnostics.

use std::fs::File;

use logtrail_config::LogtrailConfig;
use logtrail_core::{CompressedFrame, ExceptionRecord, PrimaryFrame, RawException, Snippet, StackFrame};
use logtrail_sourcemap::{extract_snippet, AppRoot, ArtifactResolver, DEFAULT_PADDING};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::sql::attach_sql_diagnostics;

/// Function name of the frame marking entry into template rendering.
pub const TEMPLATE_FRAME_FUNCTION: &str = "view";
/// Class name of the frame marking entry into template rendering.
pub const TEMPLATE_FRAME_CLASS: &str = "blade";

/// A raw location after optional mapping to template source.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Location {
	file: String,
	line: Option<u32>,
	/// The file was re-pointed at a template
	mapped: bool,
}

/// Turns a [`RawException`] into an [`ExceptionRecord`].
///
/// Every step is best-effort: unreadable files and unresolvable artifacts
/// leave the raw location in place and omit the enrichment.
#[derive(Debug, Clone)]
pub struct Normalizer {
	root: AppRoot,
	resolver: ArtifactResolver,
	padding: usize,
	source_mapping: bool,
}

impl Normalizer {
	pub fn new(root: AppRoot) -> Self {
		Self {
			root,
			resolver: ArtifactResolver::default(),
			padding: DEFAULT_PADDING,
			source_mapping: true,
		}
	}

	pub fn from_config(config: &LogtrailConfig) -> Self {
		Self::new(config.root())
			.with_resolver(ArtifactResolver::new(config.compiled_layout()))
			.with_padding(config.snippet_padding)
			.with_source_mapping(config.template_sourcemap)
	}

	pub fn with_resolver(mut self, resolver: ArtifactResolver) -> Self {
		self.resolver = resolver;
		self
	}

	pub fn with_padding(mut self, padding: usize) -> Self {
		self.padding = padding;
		self
	}

	/// Disable to report compiled artifacts as-is.
	pub fn with_source_mapping(mut self, enabled: bool) -> Self {
		self.source_mapping = enabled;
		self
	}

	pub fn root(&self) -> &AppRoot {
		&self.root
	}

	/// Normalize an exception. Never fails.
	#[instrument(skip(self, raw), fields(class = %raw.class, frames = raw.frames.len()))]
	pub fn normalize(&self, raw: &RawException) -> ExceptionRecord {
		let mut trace: Vec<CompressedFrame> = raw.frames.iter().map(|f| self.compress(f)).collect();

		let mut record = ExceptionRecord {
			class: raw.class.clone(),
			message: raw.message.clone(),
			file: String::new(),
			line: raw.line,
			..Default::default()
		};

		if let Some(file) = raw.file.as_deref() {
			let site = self.locate(file, raw.line);
			let relative = self.root.relativize(&site.file);
			let on_disk = self.on_disk(&site.file);

			let snippet = site.line.and_then(|line| extract_snippet(&on_disk, line, self.padding));

			if is_readable(&on_disk) {
				record.primary = Some(PrimaryFrame {
					file: relative.clone(),
					line: site.line,
					library: false,
					snippet: snippet.clone(),
				});
			}

			if site.mapped {
				debug!(template = %relative, line = ?site.line, "throw site mapped to template source");
				trace.insert(
					0,
					CompressedFrame {
						file: Some(relative.clone()),
						line: site.line,
						function: Some(TEMPLATE_FRAME_FUNCTION.to_string()),
						class: Some(TEMPLATE_FRAME_CLASS.to_string()),
						library: false,
						snippet,
					},
				);
			}

			record.file = relative;
			record.line = site.line;
		}

		record.trace = trace;
		attach_sql_diagnostics(raw, &mut record);
		record
	}

	/// Replace `context["exception"]` with the normalized form of `raw`.
	pub fn normalize_context(
		&self,
		mut context: Map<String, Value>,
		raw: Option<&RawException>,
	) -> Map<String, Value> {
		let Some(raw) = raw else {
			return context;
		};
		match serde_json::to_value(self.normalize(raw)) {
			Ok(record) => {
				context.insert("exception".to_string(), record);
			}
			Err(e) => warn!(error = %e, "failed to serialize exception record"),
		}
		context
	}

	fn compress(&self, frame: &StackFrame) -> CompressedFrame {
		let mut compressed = CompressedFrame {
			line: frame.line,
			function: frame.function.clone(),
			class: frame.class.clone(),
			..Default::default()
		};

		let Some(file) = frame.file.as_deref() else {
			return compressed;
		};

		let location = self.locate(file, frame.line);
		compressed.library = self.root.is_library_frame(&location.file);
		compressed.line = location.line;
		compressed.snippet = self.snippet(&location.file, location.line);
		compressed.file = Some(self.root.relativize(&location.file));
		compressed
	}

	fn locate(&self, file: &str, line: Option<u32>) -> Location {
		let unmapped = Location {
			file: file.to_string(),
			line,
			mapped: false,
		};
		if !self.source_mapping {
			return unmapped;
		}
		let Some(raw_line) = line else {
			return unmapped;
		};

		match self.resolver.resolve(&self.on_disk(file), raw_line) {
			Some(resolved) => Location {
				file: resolved.file,
				line: resolved.line,
				mapped: true,
			},
			None => unmapped,
		}
	}

	fn snippet(&self, file: &str, line: Option<u32>) -> Option<Snippet> {
		let line = line?;
		extract_snippet(self.on_disk(file), line, self.padding)
	}

	/// Filesystem path for a reported path; relative paths are taken from the root.
	fn on_disk(&self, file: &str) -> String {
		self.root.resolve(file).unwrap_or_else(|| file.to_string())
	}
}

fn is_readable(path: &str) -> bool {
	File::open(path).map(|f| f.metadata().is_ok_and(|m| m.is_file())).unwrap_or(false)
}

#[cfg(test)]
mod tests {
	use super::*;
	use logtrail_core::DatabaseError;
	use serde_json::json;
	use std::fs;
	use std::path::Path;
	use tempfile::TempDir;

	struct App {
		dir: TempDir,
	}

	impl App {
		fn new() -> Self {
			Self {
				dir: TempDir::new().unwrap(),
			}
		}

		fn root(&self) -> String {
			self.dir.path().to_string_lossy().replace('\\', "/")
		}

		fn write(&self, relative: &str, content: &str) -> String {
			let path = self.dir.path().join(relative);
			fs::create_dir_all(path.parent().unwrap()).unwrap();
			fs::write(&path, content).unwrap();
			format!("{}/{}", self.root(), relative)
		}

		fn normalizer(&self) -> Normalizer {
			Normalizer::new(AppRoot::new(self.dir.path()))
		}

		/// Template at `resources/views/home.blade.php` with 20 lines and its
		/// compiled artifact: marker `LT_LINE:10` at line 40, footer at line 50.
		fn blade_fixture(&self) -> (String, String) {
			let template: String = (1..=20).map(|n| format!("template line {n}\n")).collect();
			let template_path = self.write("resources/views/home.blade.php", &template);

			let mut compiled = Vec::new();
			for n in 1..=49 {
				if n == 40 {
					compiled.push("<?php /*LT_LINE:10*/ ?><h1>{{ $title }}</h1>".to_string());
				} else {
					compiled.push(format!("compiled {n}"));
				}
			}
			compiled.push(format!("<?php /**PATH {template_path} ENDPATH**/ ?>"));
			let compiled_path = self.write("storage/framework/views/abc123.php", &compiled.join("\n"));
			(template_path, compiled_path)
		}
	}

	#[test]
	fn throw_site_in_compiled_view_maps_to_template() {
		let app = App::new();
		let (_, compiled) = app.blade_fixture();
		let controller = app.write(
			"app/Http/Controllers/HomeController.php",
			&"<?php\n".repeat(30),
		);

		let raw = RawException::new("ErrorException", "Undefined variable $title")
			.at(&compiled, 42)
			.with_frames(vec![
				StackFrame::new(&compiled, 42).function("require"),
				StackFrame::new(&controller, 12)
					.function("index")
					.class("App\\Http\\Controllers\\HomeController"),
			]);

		let record = app.normalizer().normalize(&raw);

		assert_eq!(record.file, "resources/views/home.blade.php");
		assert_eq!(record.line, Some(10));
		assert_eq!(record.trace.len(), 3);

		let head = &record.trace[0];
		assert_eq!(head.function.as_deref(), Some(TEMPLATE_FRAME_FUNCTION));
		assert_eq!(head.class.as_deref(), Some(TEMPLATE_FRAME_CLASS));
		assert_eq!(head.file.as_deref(), Some("resources/views/home.blade.php"));
		assert_eq!(head.line, Some(10));
		assert!(!head.library);

		let mapped = &record.trace[1];
		assert_eq!(mapped.function.as_deref(), Some("require"));
		assert_eq!(mapped.file.as_deref(), Some("resources/views/home.blade.php"));
		assert_eq!(mapped.line, Some(10));

		let controller_frame = &record.trace[2];
		assert_eq!(
			controller_frame.file.as_deref(),
			Some("app/Http/Controllers/HomeController.php")
		);
		assert_eq!(controller_frame.line, Some(12));
		assert!(controller_frame.snippet.is_some());

		let primary = record.primary.expect("template is readable");
		assert_eq!(primary.file, "resources/views/home.blade.php");
		assert_eq!(primary.line, Some(10));
		let snippet = primary.snippet.unwrap();
		assert_eq!(snippet.first().unwrap().line, 2);
		assert_eq!(snippet.last().unwrap().line, 18);
		assert_eq!(snippet.iter().filter(|l| l.highlight).count(), 1);
		assert_eq!(head.snippet.as_ref(), Some(&snippet));
	}

	#[test]
	fn filesystem_root_reports_template_relative_to_root() {
		let app = App::new();
		let mut compiled: Vec<String> = (1..=49).map(|n| format!("compiled {n}")).collect();
		compiled[39] = "<?php /*LT_LINE:10*/ ?>".to_string();
		compiled.push("<?php /**PATH /resources/views/home.blade.php ENDPATH**/ ?>".to_string());
		let compiled = app.write("storage/framework/views/abc123.php", &compiled.join("\n"));

		let raw = RawException::new("ErrorException", "Undefined variable $title").at(&compiled, 42);
		let record = Normalizer::new(AppRoot::new("/")).normalize(&raw);

		assert_eq!(record.file, "resources/views/home.blade.php");
		assert_eq!(record.line, Some(10));
		let head = &record.trace[0];
		assert_eq!(head.function.as_deref(), Some(TEMPLATE_FRAME_FUNCTION));
		assert_eq!(head.file.as_deref(), Some("resources/views/home.blade.php"));
		assert_eq!(head.line, Some(10));
		assert!(record.primary.is_none());
	}

	#[test]
	fn plain_throw_site_gets_primary_without_synthetic_frame() {
		let app = App::new();
		let file = app.write("app/Service.php", "a\nb\nc\n");
		let raw = RawException::new("LogicException", "nope")
			.at(&file, 2)
			.with_frames(vec![StackFrame::new(&file, 2)]);

		let record = app.normalizer().normalize(&raw);
		assert_eq!(record.file, "app/Service.php");
		assert_eq!(record.trace.len(), 1);
		assert!(record.trace[0].function.is_none());
		let primary = record.primary.unwrap();
		assert_eq!(primary.snippet.unwrap().len(), 3);
	}

	#[test]
	fn unreadable_throw_site_has_no_primary() {
		let app = App::new();
		let missing = format!("{}/app/Gone.php", app.root());
		let raw = RawException::new("Error", "gone").at(&missing, 5);
		let record = app.normalizer().normalize(&raw);
		assert_eq!(record.file, "app/Gone.php");
		assert_eq!(record.line, Some(5));
		assert!(record.primary.is_none());
		assert!(record.trace.is_empty());
	}

	#[test]
	fn source_mapping_disabled_keeps_compiled_location() {
		let app = App::new();
		let (_, compiled) = app.blade_fixture();
		let raw = RawException::new("ErrorException", "x").at(&compiled, 42);

		let record = app.normalizer().with_source_mapping(false).normalize(&raw);
		assert_eq!(record.file, "storage/framework/views/abc123.php");
		assert_eq!(record.line, Some(42));
		assert!(record.trace.is_empty());
	}

	#[test]
	fn artifact_without_marker_keeps_raw_line_but_maps_file() {
		let app = App::new();
		let template = app.write("resources/views/plain.blade.php", "one\ntwo\n");
		let compiled = app.write(
			"storage/framework/views/def456.php",
			&format!("line one\nline two\n<?php /**PATH {template} ENDPATH**/ ?>"),
		);
		let raw = RawException::new("ErrorException", "x").at(&compiled, 2);
		let record = app.normalizer().normalize(&raw);
		assert_eq!(record.file, "resources/views/plain.blade.php");
		assert_eq!(record.line, Some(2));
		assert_eq!(record.trace.len(), 1);
	}

	#[test]
	fn dependency_frames_are_flagged() {
		let app = App::new();
		let vendor = app.write("vendor/laravel/framework/src/Router.php", "<?php\n");
		let raw = RawException::new("Error", "x").with_frames(vec![
			StackFrame::new(&vendor, 1),
			StackFrame::new("/usr/share/php/Other.php", 3),
			StackFrame::default().function("{closure}"),
		]);
		let record = app.normalizer().normalize(&raw);
		assert!(record.trace[0].library);
		assert_eq!(
			record.trace[0].file.as_deref(),
			Some("vendor/laravel/framework/src/Router.php")
		);
		assert!(!record.trace[1].library);
		assert_eq!(record.trace[1].file.as_deref(), Some("/usr/share/php/Other.php"));
		assert!(record.trace[1].snippet.is_none());
		assert!(record.trace[2].file.is_none());
		assert_eq!(record.trace[2].function.as_deref(), Some("{closure}"));
	}

	#[test]
	fn relative_frame_paths_are_read_from_the_root() {
		let app = App::new();
		app.write("app/Jobs/Sync.php", "one\ntwo\nthree\n");
		let raw = RawException::new("Error", "x").with_frames(vec![StackFrame::new("app/Jobs/Sync.php", 3)]);
		let record = app.normalizer().normalize(&raw);
		assert_eq!(record.trace[0].file.as_deref(), Some("app/Jobs/Sync.php"));
		assert!(record.trace[0].snippet.is_some());
	}

	#[test]
	fn sql_heuristic_runs_during_normalization() {
		let app = App::new();
		let raw = RawException::new(
			"PDOException",
			"SQLSTATE[42S02]: Base table or view not found: select * from users where id = ?",
		);
		let record = app.normalizer().normalize(&raw);
		assert_eq!(
			record.sql_error.as_deref(),
			Some("SQLSTATE[42S02]: Base table or view not found: select * from users where id = ?")
		);
	}

	#[test]
	fn structured_database_error_is_copied() {
		let app = App::new();
		let raw = RawException::new("QueryException", "SQLSTATE[23000]: dup").with_database(DatabaseError {
			sql: "insert into users (email) values (?)".into(),
			bindings: vec![json!("a@b.c")],
		});
		let record = app.normalizer().normalize(&raw);
		assert_eq!(record.sql_error.as_deref(), Some("insert into users (email) values (?)"));
		assert_eq!(record.bindings, Some(vec![json!("a@b.c")]));
	}

	#[test]
	fn normalize_context_inserts_exception() {
		let app = App::new();
		let mut context = Map::new();
		context.insert("user_id".into(), json!(7));
		let raw = RawException::new("Error", "boom").at(format!("{}/app/X.php", app.root()), 3);

		let context = app.normalizer().normalize_context(context, Some(&raw));
		assert_eq!(context["user_id"], json!(7));
		assert_eq!(context["exception"]["class"], json!("Error"));
		assert_eq!(context["exception"]["file"], json!("app/X.php"));
		assert_eq!(context["exception"]["line"], json!(3));

		let untouched = app.normalizer().normalize_context(Map::new(), None);
		assert!(untouched.is_empty());
	}

	#[test]
	fn root_path_is_exposed() {
		let app = App::new();
		let normalizer = app.normalizer();
		assert!(Path::new(normalizer.root().as_str()).is_absolute());
	}
}
