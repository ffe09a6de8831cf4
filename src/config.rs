//! Build-time configuration.
//!
//! Values are baked in by the bundler from the environment at compile time,
//! e.g. `MULE_RADAR_API_URL=https://aml.example.org trunk build --release`.

use std::fmt;
use std::str::FromStr;

use log::warn;

use crate::error::ConfigError;

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// What the upload gate does when the detection backend cannot be used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
	/// Substitute locally synthesized demo data and continue to the dashboard.
	FailOpen,
	/// Surface the failure and stay where we are.
	#[default]
	FailClosed,
}

impl FromStr for FailurePolicy {
	type Err = ConfigError;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"fail-open" | "open" | "mock" => Ok(Self::FailOpen),
			"fail-closed" | "closed" | "error" => Ok(Self::FailClosed),
			other => Err(ConfigError::UnknownPolicy(other.to_string())),
		}
	}
}

impl fmt::Display for FailurePolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::FailOpen => "fail-open",
			Self::FailClosed => "fail-closed",
		})
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
	/// Backend origin without trailing slash.
	pub api_base_url: String,
	pub failure_policy: FailurePolicy,
	/// Submissions faster than this after the form mounted are treated as automated.
	pub min_form_elapsed_ms: f64,
	/// File name suffix accepted by the upload gate.
	pub upload_extension: String,
	/// Artificial delay per identity-check stage.
	pub stage_delay_ms: u32,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			api_base_url: DEFAULT_API_URL.to_string(),
			failure_policy: FailurePolicy::default(),
			min_form_elapsed_ms: 400.0,
			upload_extension: ".csv".to_string(),
			stage_delay_ms: 800,
		}
	}
}

impl AppConfig {
	/// Resolve the configuration compiled into this build.
	pub fn from_build_env() -> Self {
		Self::from_values(
			option_env!("MULE_RADAR_API_URL"),
			option_env!("MULE_RADAR_FAILURE_POLICY"),
		)
	}

	fn from_values(api_url: Option<&str>, policy: Option<&str>) -> Self {
		let mut config = Self::default();
		if let Some(url) = api_url.map(str::trim).filter(|u| !u.is_empty()) {
			config.api_base_url = url.trim_end_matches('/').to_string();
		}
		if let Some(raw) = policy {
			match raw.parse() {
				Ok(p) => config.failure_policy = p,
				Err(e) => warn!("{e}; falling back to {}", config.failure_policy),
			}
		}
		config
	}

	pub fn endpoint(&self, path: &str) -> String {
		format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
	}
}
