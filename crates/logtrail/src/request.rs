// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request-context collaborators.

use logtrail_core::RequestContext;

/// Supplies details of the HTTP request being served, if any.
pub trait RequestContextProvider: Send + Sync {
	fn current(&self) -> Option<RequestContext>;
}

/// Used outside request handling, e.g. workers and CLIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRequestContext;

impl RequestContextProvider for NoRequestContext {
	fn current(&self) -> Option<RequestContext> {
		None
	}
}

/// Always reports the same request.
#[derive(Debug, Clone, Default)]
pub struct StaticRequestContext(pub RequestContext);

impl RequestContextProvider for StaticRequestContext {
	fn current(&self) -> Option<RequestContext> {
		Some(self.0.clone())
	}
}

impl<F> RequestContextProvider for F
where
	F: Fn() -> Option<RequestContext> + Send + Sync,
{
	fn current(&self) -> Option<RequestContext> {
		self()
	}
}
