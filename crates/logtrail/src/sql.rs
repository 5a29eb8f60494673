// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQL diagnostics for database exceptions.

use std::sync::LazyLock;

use logtrail_core::{ExceptionRecord, RawException};
use regex::Regex;

static SQLSTATE_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)SQLSTATE\[[^\]]+\]: .*?: (select|insert|update|delete).*$").unwrap()
});

static SQL_CLAUSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)SQL: (.+?)\)$").unwrap());

/// Fill `sql_error`, `sql` and `bindings` on `record`.
///
/// Structured database details are copied as-is. Otherwise an SQLSTATE
/// message is matched heuristically, and a match that still carries the
/// driver noise has its trailing `SQL: ...)` clause split out into `sql`.
pub fn attach_sql_diagnostics(raw: &RawException, record: &mut ExceptionRecord) {
	if let Some(db) = &raw.database {
		record.sql_error = Some(db.sql.clone());
		record.bindings = Some(db.bindings.clone());
	} else if raw.message.contains("SQLSTATE") {
		record.sql_error = SQLSTATE_STATEMENT
			.find(raw.message.trim_end_matches('\n'))
			.map(|m| m.as_str().to_string());
	}

	record.sql = record
		.sql_error
		.as_deref()
		.filter(|err| err.contains("SQLSTATE"))
		.and_then(extract_statement);
}

fn extract_statement(sql_error: &str) -> Option<String> {
	SQL_CLAUSE
		.captures(sql_error)
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str().to_string())
}
