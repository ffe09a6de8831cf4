use serde_json::Value;

use crate::error::ExportError;

pub const EXPORT_FILE_NAME: &str = "aml_detection_output.json";

/// Pretty-printed copy of the last received payload.
pub fn export_json(raw: Option<&Value>) -> Result<String, ExportError> {
	let raw = raw.ok_or(ExportError::Empty)?;
	Ok(serde_json::to_string_pretty(raw)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::upload::tests::sample_payload;

	#[test]
	fn export_round_trips_the_received_payload() {
		let payload = sample_payload();
		let text = export_json(Some(&payload)).unwrap();
		let parsed: Value = serde_json::from_str(&text).unwrap();
		assert_eq!(parsed, payload);
	}

	#[test]
	fn nothing_to_export_before_the_first_upload() {
		assert!(matches!(export_json(None), Err(ExportError::Empty)));
	}
}
