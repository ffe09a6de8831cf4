//! Upload gate: screens a submission, posts it for detection, and applies the
//! configured failure policy.

use std::future::Future;

use log::{info, warn};
use serde_json::Value;

use crate::config::{AppConfig, FailurePolicy};
use crate::error::UploadError;
use crate::fallback;
use crate::model::DetectionResult;

/// Anything that can run detection over an uploaded file.
pub trait DetectionBackend {
	fn detect(&self, file_name: &str, bytes: Vec<u8>) -> impl Future<Output = Result<Value, UploadError>>;
}

/// What the user handed us, minus the file contents.
#[derive(Clone, Debug, Default)]
pub struct Submission {
	pub file_name: String,
	/// Time between the form mounting and this submission.
	pub elapsed_ms: f64,
	/// Value of the hidden decoy input; humans never fill it in.
	pub decoy: String,
}

/// A detection payload as received, plus its typed reading.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionPayload {
	/// Exactly what the backend returned; this is what gets exported.
	pub raw: Value,
	pub result: DetectionResult,
}

impl DetectionPayload {
	pub fn from_raw(raw: Value) -> Result<Self, UploadError> {
		let result = serde_json::from_value(raw.clone()).map_err(|e| UploadError::Decode(e.to_string()))?;
		Ok(Self { raw, result })
	}

	pub fn from_result(result: DetectionResult) -> Self {
		let raw = serde_json::to_value(&result).unwrap_or(Value::Null);
		Self { raw, result }
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Provenance {
	Backend,
	/// Synthesized demo data, substituted because of `reason`.
	Fallback { reason: UploadError },
}

#[derive(Clone, Debug, PartialEq)]
pub struct UploadOutcome {
	pub payload: DetectionPayload,
	pub provenance: Provenance,
}

impl UploadOutcome {
	pub fn is_fallback(&self) -> bool {
		matches!(self.provenance, Provenance::Fallback { .. })
	}
}

pub struct UploadGate<B> {
	backend: B,
	policy: FailurePolicy,
	min_elapsed_ms: f64,
	extension: String,
}

impl<B: DetectionBackend> UploadGate<B> {
	pub fn new(backend: B, config: &AppConfig) -> Self {
		Self {
			backend,
			policy: config.failure_policy,
			min_elapsed_ms: config.min_form_elapsed_ms,
			extension: config.upload_extension.to_ascii_lowercase(),
		}
	}

	pub fn backend(&self) -> &B {
		&self.backend
	}

	/// Client-side checks, in order: submission speed, decoy field, extension.
	pub fn screen(&self, submission: &Submission) -> Result<(), UploadError> {
		if submission.elapsed_ms < self.min_elapsed_ms {
			return Err(UploadError::SpeedAnomaly);
		}
		if !submission.decoy.is_empty() {
			return Err(UploadError::DecoyTripped);
		}
		if !submission.file_name.to_ascii_lowercase().ends_with(&self.extension) {
			return Err(UploadError::UnsupportedFormat(submission.file_name.clone()));
		}
		Ok(())
	}

	/// Screen, read, and detect. `contents` is only awaited once screening
	/// passed, so a rejected submission never touches the file or the network.
	pub async fn submit<F>(&self, submission: &Submission, contents: F) -> Result<UploadOutcome, UploadError>
	where
		F: Future<Output = Result<Vec<u8>, UploadError>>,
	{
		self.screen(submission)?;
		let bytes = contents.await?;
		info!("Submitting {} ({} bytes) for detection", submission.file_name, bytes.len());

		let attempt = match self.backend.detect(&submission.file_name, bytes).await {
			Ok(raw) => DetectionPayload::from_raw(raw),
			Err(e) => Err(e),
		};

		match (attempt, self.policy) {
			(Ok(payload), _) => {
				info!(
					"Detection returned {} nodes, {} flagged",
					payload.result.graph.nodes.len(),
					payload.result.mules.len()
				);
				Ok(UploadOutcome { payload, provenance: Provenance::Backend })
			}
			(Err(reason), FailurePolicy::FailOpen) => {
				warn!("{reason}; substituting demo data");
				let result = fallback::synthesize(&mut rand::thread_rng());
				Ok(UploadOutcome {
					payload: DetectionPayload::from_result(result),
					provenance: Provenance::Fallback { reason },
				})
			}
			(Err(reason), FailurePolicy::FailClosed) => Err(reason),
		}
	}
}
