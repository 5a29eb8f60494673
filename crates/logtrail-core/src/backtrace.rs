// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Raw exceptions from Rust errors, with frames parsed from `std::backtrace`.

use std::backtrace::Backtrace;
use std::error::Error;
use std::panic::Location;

use rustc_demangle::demangle;

use crate::event::{RawException, StackFrame};

/// Frames belonging to backtrace capture itself.
const CAPTURE_FRAMES: &[&str] = &[
	"std::backtrace",
	"std::backtrace_rs",
	"backtrace::",
	"logtrail_core::backtrace",
	"RawException::from_error",
	"RawException::capture",
];

impl RawException {
	/// Capture a Rust error with the caller as the throw site.
	///
	/// The class is the error's type name and the message is its `Display`
	/// output followed by each `source()` in turn.
	#[track_caller]
	pub fn from_error<E>(err: &E) -> Self
	where
		E: Error + ?Sized,
	{
		let mut message = err.to_string();
		let mut source = err.source();
		while let Some(cause) = source {
			message.push_str(": ");
			message.push_str(&cause.to_string());
			source = cause.source();
		}
		Self::capture(std::any::type_name::<E>(), message)
	}

	/// Capture an exception of the given class at the caller's location.
	#[track_caller]
	pub fn capture(class: impl Into<String>, message: impl Into<String>) -> Self {
		let location = Location::caller();
		let backtrace = Backtrace::force_capture();
		Self::new(class, message)
			.at(location.file(), location.line())
			.with_frames(parse_backtrace(&backtrace.to_string()))
	}
}

/// Parse the `Display` output of a [`Backtrace`] into frames, innermost first.
///
/// Each `N: path::to::function` line opens a frame and a following
/// `at file:line:col` line supplies its location.
pub fn parse_backtrace(text: &str) -> Vec<StackFrame> {
	let mut frames: Vec<StackFrame> = Vec::new();

	for line in text.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		if let Some(location) = line.strip_prefix("at ") {
			if let Some(frame) = frames.last_mut() {
				if frame.file.is_none() {
					if let Some((file, lineno)) = parse_location(location) {
						frame.file = Some(file);
						frame.line = Some(lineno);
					}
				}
			}
			continue;
		}

		let Some((index, symbol)) = line.split_once(':') else {
			continue;
		};
		if index.trim().parse::<u32>().is_err() {
			continue;
		}
		frames.push(frame_for_symbol(symbol.trim()));
	}

	frames
		.into_iter()
		.filter(|frame| !is_capture_frame(frame))
		.collect()
}

fn frame_for_symbol(symbol: &str) -> StackFrame {
	let symbol = format!("{:#}", demangle(symbol));
	let symbol = symbol.as_str();
	let mut frame = StackFrame::default();
	match split_path(symbol) {
		Some((class, function)) => {
			frame.class = Some(class.to_string());
			frame.function = Some(function.to_string());
		}
		None => frame.function = Some(symbol.to_string()),
	}
	frame
}

/// `file:line:col`, where the file itself may contain colons.
fn parse_location(location: &str) -> Option<(String, u32)> {
	let mut parts = location.rsplitn(3, ':');
	let last = parts.next()?;
	let middle = parts.next()?;
	match parts.next() {
		Some(file) => Some((file.to_string(), middle.parse().ok()?)),
		None => Some((middle.to_string(), last.parse().ok()?)),
	}
}

/// Split at the last `::` outside generic brackets.
fn split_path(symbol: &str) -> Option<(&str, &str)> {
	let mut depth = 0i32;
	let bytes = symbol.as_bytes();
	let mut split = None;
	let mut i = 0;
	while i + 1 < bytes.len() {
		match bytes[i] {
			b'<' => depth += 1,
			b'>' => depth -= 1,
			b':' if depth == 0 && bytes[i + 1] == b':' => {
				split = Some(i);
				i += 1;
			}
			_ => {}
		}
		i += 1;
	}
	split.map(|at| (&symbol[..at], &symbol[at + 2..]))
}

fn is_capture_frame(frame: &StackFrame) -> bool {
	let name = match (&frame.class, &frame.function) {
		(Some(class), Some(function)) => format!("{class}::{function}"),
		(None, Some(function)) => function.clone(),
		_ => return false,
	};
	CAPTURE_FRAMES.iter().any(|prefix| name.contains(prefix))
}
