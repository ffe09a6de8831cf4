use thiserror::Error;

/// Why an upload did not produce a result. The display text is shown inline.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UploadError {
	#[error("Submission rejected: Speed anomaly detected.")]
	SpeedAnomaly,

	#[error("Session terminated: Unauthorized access pattern.")]
	DecoyTripped,

	#[error("Please upload a CSV file.")]
	UnsupportedFormat(String),

	#[error("Could not read {file}: {reason}")]
	Unreadable { file: String, reason: String },

	#[error("Server responded with {status}: {body}")]
	Server { status: u16, body: String },

	#[error("Backend connection failed: {0}")]
	Transport(String),

	#[error("Malformed detection response: {0}")]
	Decode(String),
}

impl UploadError {
	/// Validation failures are reported before any request is made and are
	/// never subject to the failure policy.
	pub fn is_validation(&self) -> bool {
		matches!(
			self,
			Self::SpeedAnomaly | Self::DecoyTripped | Self::UnsupportedFormat(_) | Self::Unreadable { .. }
		)
	}
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
	#[error("Invalid PAN format. Expected: ABCDE1234F")]
	InvalidFormat,

	#[error("Verification service responded with {0}")]
	Server(u16),

	#[error("Verification service unreachable: {0}")]
	Transport(String),

	#[error("Malformed verification response: {0}")]
	Decode(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("unknown failure policy `{0}`, expected `fail-open` or `fail-closed`")]
	UnknownPolicy(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
	#[error("nothing to export yet")]
	Empty,

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("browser refused the download: {0}")]
	Browser(String),
}
