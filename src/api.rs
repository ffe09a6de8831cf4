//! HTTP client for the detection backend.

use log::{error, info};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::config::AppConfig;
use crate::error::{IdentityError, UploadError};
use crate::identity::IdentityBackend;
use crate::model::VerificationResult;
use crate::upload::DetectionBackend;

#[derive(Clone)]
pub struct HttpBackend {
	client: Client,
	config: AppConfig,
}

impl HttpBackend {
	pub fn new(config: AppConfig) -> Self {
		Self { client: Client::new(), config }
	}
}

impl DetectionBackend for HttpBackend {
	async fn detect(&self, file_name: &str, bytes: Vec<u8>) -> Result<Value, UploadError> {
		let url = self.config.endpoint("detect");
		info!("Uploading to backend: {url}");

		let part = Part::bytes(bytes)
			.file_name(file_name.to_string())
			.mime_str("text/csv")
			.map_err(|e| UploadError::Transport(e.to_string()))?;
		let form = Form::new().part("file", part);

		let resp = self
			.client
			.post(&url)
			.multipart(form)
			.send()
			.await
			.map_err(|e| UploadError::Transport(e.to_string()))?;

		let status = resp.status();
		info!("Backend response status: {status}");
		if !status.is_success() {
			let body = resp.text().await.unwrap_or_default();
			error!("Backend error response: {body}");
			return Err(UploadError::Server { status: status.as_u16(), body });
		}

		resp.json().await.map_err(|e| UploadError::Decode(e.to_string()))
	}
}

impl IdentityBackend for HttpBackend {
	async fn verify_pan(&self, pan: &str) -> Result<VerificationResult, IdentityError> {
		#[derive(Serialize)]
		struct VerifyRequest<'a> {
			pan: &'a str,
		}

		let resp = self
			.client
			.post(self.config.endpoint("verify-pan"))
			.json(&VerifyRequest { pan })
			.send()
			.await
			.map_err(|e| IdentityError::Transport(e.to_string()))?;

		if !resp.status().is_success() {
			return Err(IdentityError::Server(resp.status().as_u16()));
		}
		resp.json().await.map_err(|e| IdentityError::Decode(e.to_string()))
	}
}
