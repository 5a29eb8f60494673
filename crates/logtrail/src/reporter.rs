// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The application-facing logger.

use std::error::Error;
use std::sync::Arc;

use logtrail_config::LogtrailConfig;
use logtrail_core::{Level, LogEvent, RawException};
use serde_json::{Map, Value};
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, trace, warn};

use crate::builder::PayloadBuilder;
use crate::envelope::{authorization_token, Envelope};
use crate::error::Result;
use crate::normalizer::Normalizer;
use crate::request::{NoRequestContext, RequestContextProvider};
use crate::signer::Signer;
use crate::transport::{HttpTransport, Transport};
use crate::version::git_short_sha;

/// Builder for [`Reporter`].
#[derive(Default)]
pub struct ReporterBuilder {
	config: Option<LogtrailConfig>,
	transport: Option<Arc<dyn Transport>>,
	requests: Option<Arc<dyn RequestContextProvider>>,
	version: Option<Option<String>>,
}

impl ReporterBuilder {
	/// Use this configuration instead of loading it from files and the environment.
	pub fn config(mut self, config: LogtrailConfig) -> Self {
		self.config = Some(config);
		self
	}

	/// Replace the HTTP transport.
	pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
		self.transport = Some(Arc::new(transport));
		self
	}

	pub fn request_context(mut self, provider: impl RequestContextProvider + 'static) -> Self {
		self.requests = Some(Arc::new(provider));
		self
	}

	/// Fix the version tag instead of asking git.
	pub fn version(mut self, version: Option<String>) -> Self {
		self.version = Some(version);
		self
	}

	pub fn build(self) -> Result<Reporter> {
		let config = match self.config {
			Some(config) => config,
			None => logtrail_config::load_config()?,
		};

		let transport: Arc<dyn Transport> = match self.transport {
			Some(transport) => transport,
			None => Arc::new(HttpTransport::from_config(&config)?),
		};

		let version = self
			.version
			.unwrap_or_else(|| git_short_sha(&config.app_root));

		if !config.has_credentials() {
			warn!("logtrail API credentials are not configured");
		}

		let builder = PayloadBuilder::new(
			Normalizer::from_config(&config),
			Signer::new(config.api_secret.clone()),
		);

		debug!(
			environment = %config.environment,
			min_level = %config.level,
			async_delivery = config.async_delivery,
			version = ?version,
			"logtrail reporter ready"
		);

		Ok(Reporter {
			inner: Arc::new(ReporterInner {
				token: authorization_token(
					config.api_key.expose(),
					config.api_secret.expose(),
					&config.environment,
				),
				builder,
				transport,
				requests: self.requests.unwrap_or_else(|| Arc::new(NoRequestContext)),
				version,
				min_level: config.level,
				async_delivery: config.async_delivery,
			}),
		})
	}
}

struct ReporterInner {
	builder: PayloadBuilder,
	transport: Arc<dyn Transport>,
	requests: Arc<dyn RequestContextProvider>,
	token: String,
	version: Option<String>,
	min_level: Level,
	async_delivery: bool,
}

/// Enriches, signs and delivers log events.
///
/// Cheap to clone. `log` never fails: delivery problems are logged and
/// dropped. Use `try_log` or [`send`](Reporter::send) to observe them.
#[derive(Clone)]
pub struct Reporter {
	inner: Arc<ReporterInner>,
}

impl Reporter {
	pub fn builder() -> ReporterBuilder {
		ReporterBuilder::default()
	}

	pub fn version(&self) -> Option<&str> {
		self.inner.version.as_deref()
	}

	pub fn min_level(&self) -> Level {
		self.inner.min_level
	}

	pub fn payload_builder(&self) -> &PayloadBuilder {
		&self.inner.builder
	}

	/// Build the envelope that would be sent for `event`.
	pub fn envelope(&self, event: &LogEvent) -> Envelope {
		let request = self.inner.requests.current();
		let payload = self.inner.builder.build(event, request.as_ref());
		Envelope::new(payload)
			.with_request(request.map(|r| r.route_summary()).unwrap_or_default())
			.with_version(self.inner.version.clone())
	}

	pub fn log(
		&self,
		level: Level,
		message: impl Into<String>,
		context: Map<String, Value>,
		exception: Option<RawException>,
	) {
		if let Err(e) = self.try_log(level, message, context, exception) {
			warn!(error = %e, "failed to deliver log event");
		}
	}

	pub fn try_log(
		&self,
		level: Level,
		message: impl Into<String>,
		context: Map<String, Value>,
		exception: Option<RawException>,
	) -> Result<()> {
		let mut event = LogEvent::new(level, message).with_context(context);
		event.exception = exception;
		self.try_capture(event)
	}

	/// Log a Rust error at `level`, with the caller as the throw site.
	#[track_caller]
	pub fn error_with<E>(&self, level: Level, err: &E)
	where
		E: Error + ?Sized,
	{
		let exception = RawException::from_error(err);
		let message = exception.message.clone();
		self.log(level, message, Map::new(), Some(exception));
	}

	pub fn capture(&self, event: LogEvent) {
		if let Err(e) = self.try_capture(event) {
			warn!(error = %e, "failed to deliver log event");
		}
	}

	/// Deliver according to the configured mode.
	///
	/// Asynchronous delivery spawns onto the current tokio runtime and reports
	/// only local failures. Synchronous delivery blocks until the endpoint
	/// answers; without a runtime it uses a blocking client, and on a
	/// current-thread runtime it has to spawn instead.
	pub fn try_capture(&self, event: LogEvent) -> Result<()> {
		if !self.accepts(event.level) {
			return Ok(());
		}
		let envelope = self.envelope(&event);
		let transport = Arc::clone(&self.inner.transport);
		let token = self.inner.token.clone();

		match Handle::try_current() {
			Ok(handle)
				if self.inner.async_delivery
					|| handle.runtime_flavor() == RuntimeFlavor::CurrentThread =>
			{
				handle.spawn(async move {
					if let Err(e) = transport.send(&envelope, &token).await {
						warn!(error = %e, "failed to deliver log event");
					}
				});
				Ok(())
			}
			Ok(handle) => tokio::task::block_in_place(|| {
				handle.block_on(async { transport.send(&envelope, &token).await })
			}),
			Err(_) => transport.send_blocking(&envelope, &token),
		}
	}

	/// Deliver `event` and wait for the endpoint, regardless of the async setting.
	pub async fn send(&self, event: LogEvent) -> Result<()> {
		if !self.accepts(event.level) {
			return Ok(());
		}
		let envelope = self.envelope(&event);
		self.inner.transport.send(&envelope, &self.inner.token).await
	}

	fn accepts(&self, level: Level) -> bool {
		if level < self.inner.min_level {
			trace!(%level, min_level = %self.inner.min_level, "event below minimum level, dropped");
			return false;
		}
		true
	}

	pub fn debug(&self, message: impl Into<String>, context: Map<String, Value>) {
		self.log(Level::Debug, message, context, None);
	}

	pub fn info(&self, message: impl Into<String>, context: Map<String, Value>) {
		self.log(Level::Info, message, context, None);
	}

	pub fn notice(&self, message: impl Into<String>, context: Map<String, Value>) {
		self.log(Level::Notice, message, context, None);
	}

	pub fn warning(&self, message: impl Into<String>, context: Map<String, Value>) {
		self.log(Level::Warning, message, context, None);
	}

	pub fn error(&self, message: impl Into<String>, context: Map<String, Value>) {
		self.log(Level::Error, message, context, None);
	}

	pub fn critical(&self, message: impl Into<String>, context: Map<String, Value>) {
		self.log(Level::Critical, message, context, None);
	}

	pub fn alert(&self, message: impl Into<String>, context: Map<String, Value>) {
		self.log(Level::Alert, message, context, None);
	}

	pub fn emergency(&self, message: impl Into<String>, context: Map<String, Value>) {
		self.log(Level::Emergency, message, context, None);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use logtrail_config::ConfigLayer;
	use logtrail_core::RequestContext;
	use serde_json::json;
	use std::sync::Mutex;
	use std::time::Duration;

	use crate::error::LogtrailSdkError;
	use crate::request::StaticRequestContext;

	#[derive(Clone, Default)]
	struct Recording {
		sent: Arc<Mutex<Vec<(Envelope, String)>>>,
		fail: bool,
	}

	impl Recording {
		fn sent(&self) -> Vec<(Envelope, String)> {
			self.sent.lock().unwrap().clone()
		}

		fn record(&self, envelope: &Envelope, token: &str) -> Result<()> {
			if self.fail {
				return Err(LogtrailSdkError::ServerError {
					status: 500,
					message: "down".into(),
				});
			}
			self.sent.lock().unwrap().push((envelope.clone(), token.to_string()));
			Ok(())
		}
	}

	#[async_trait]
	impl Transport for Recording {
		async fn send(&self, envelope: &Envelope, token: &str) -> Result<()> {
			self.record(envelope, token)
		}

		fn send_blocking(&self, envelope: &Envelope, token: &str) -> Result<()> {
			self.record(envelope, token)
		}
	}

	fn config(async_delivery: bool, level: &str) -> LogtrailConfig {
		LogtrailConfig::from_layer(ConfigLayer {
			api_key: Some("key".into()),
			api_secret: Some("secret".into()),
			environment: Some("production".into()),
			async_delivery: Some(async_delivery),
			level: Some(level.into()),
			app_root: Some("/srv/app".into()),
			..Default::default()
		})
		.unwrap()
	}

	fn reporter(config: LogtrailConfig, transport: Recording) -> Reporter {
		Reporter::builder()
			.config(config)
			.transport(transport)
			.version(Some("abc1234".into()))
			.build()
			.unwrap()
	}

	#[test]
	fn sync_delivery_without_runtime_blocks() {
		let transport = Recording::default();
		let reporter = reporter(config(false, "debug"), transport.clone());

		let mut context = Map::new();
		context.insert("test".into(), json!(true));
		reporter.info("Logtrail test message", context);

		let sent = transport.sent();
		assert_eq!(sent.len(), 1);
		let (envelope, token) = &sent[0];
		assert_eq!(token, "a2V5OnNlY3JldDpwcm9kdWN0aW9u");
		assert_eq!(envelope.payload.message(), "Logtrail test message");
		assert_eq!(envelope.payload.context()["test"], json!(true));
		assert_eq!(envelope.version.as_deref(), Some("abc1234"));
		assert!(envelope.request.is_empty());
	}

	#[test]
	fn async_mode_without_runtime_falls_back_to_blocking() {
		let transport = Recording::default();
		let reporter = reporter(config(true, "debug"), transport.clone());
		reporter.error("boom", Map::new());
		assert_eq!(transport.sent().len(), 1);
	}

	#[test]
	fn events_below_minimum_level_are_dropped() {
		let transport = Recording::default();
		let reporter = reporter(config(false, "warning"), transport.clone());
		reporter.debug("noise", Map::new());
		reporter.info("noise", Map::new());
		reporter.warning("kept", Map::new());
		reporter.emergency("kept", Map::new());
		let levels: Vec<Level> = transport.sent().iter().map(|(e, _)| e.payload.level()).collect();
		assert_eq!(levels, vec![Level::Warning, Level::Emergency]);
	}

	#[test]
	fn try_log_surfaces_delivery_errors_and_log_swallows_them() {
		let transport = Recording {
			fail: true,
			..Default::default()
		};
		let reporter = reporter(config(false, "debug"), transport);
		let err = reporter
			.try_log(Level::Error, "boom", Map::new(), None)
			.unwrap_err();
		assert!(matches!(err, LogtrailSdkError::ServerError { status: 500, .. }));
		reporter.log(Level::Error, "boom", Map::new(), None);
	}

	#[test]
	fn request_summary_and_details_are_attached() {
		let transport = Recording::default();
		let mut headers = Map::new();
		headers.insert("accept".into(), json!(["text/html"]));
		let request = RequestContext {
			method: Some("POST".into()),
			action: Some("OrderController@store".into()),
			url: Some("orders".into()),
			ip: Some("10.0.0.1".into()),
			headers,
			..Default::default()
		};
		let reporter = Reporter::builder()
			.config(config(false, "debug"))
			.transport(transport.clone())
			.request_context(StaticRequestContext(request))
			.version(None)
			.build()
			.unwrap();

		let mut context = Map::new();
		context.insert("order".into(), json!(9));
		reporter.error("failed", context);

		let (envelope, _) = transport.sent().remove(0);
		assert_eq!(envelope.request["method"], json!("POST"));
		assert_eq!(envelope.request["agent"], Value::Null);
		assert_eq!(envelope.payload.context()["request_header"]["accept"], json!(["text/html"]));
		assert!(envelope.version.is_none());
	}

	#[test]
	fn error_with_records_rust_errors() {
		let transport = Recording::default();
		let reporter = reporter(config(false, "debug"), transport.clone());
		let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
		reporter.error_with(Level::Critical, &err);

		let (envelope, _) = transport.sent().remove(0);
		assert_eq!(envelope.payload.level(), Level::Critical);
		assert_eq!(envelope.payload.message(), "disk full");
		let exception = &envelope.payload.context()["exception"];
		assert_eq!(exception["message"], json!("disk full"));
		assert!(exception["file"].as_str().unwrap().ends_with("reporter.rs"));
	}

	#[tokio::test]
	async fn async_mode_spawns_onto_the_runtime() {
		let transport = Recording::default();
		let reporter = reporter(config(true, "debug"), transport.clone());
		reporter.info("queued", Map::new());

		for _ in 0..50 {
			if !transport.sent().is_empty() {
				break;
			}
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
		assert_eq!(transport.sent().len(), 1);
	}

	#[tokio::test(flavor = "multi_thread")]
	async fn sync_mode_on_multi_thread_runtime_blocks_in_place() {
		let transport = Recording::default();
		let reporter = reporter(config(false, "debug"), transport.clone());
		reporter.try_log(Level::Info, "now", Map::new(), None).unwrap();
		assert_eq!(transport.sent().len(), 1);
	}

	#[tokio::test]
	async fn send_awaits_delivery() {
		let transport = Recording::default();
		let reporter = reporter(config(true, "debug"), transport.clone());
		reporter
			.send(LogEvent::new(Level::Alert, "direct"))
			.await
			.unwrap();
		assert_eq!(transport.sent().len(), 1);
	}
}
