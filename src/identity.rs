//! PAN identity check.
//!
//! Validation, four paced feedback stages, then `/verify-pan`. When the
//! service cannot answer, a local result is produced instead. That local
//! result (salted digest chain plus a character-code verdict) is a demo
//! artifact: it proves nothing about the identity and is never a security
//! guarantee.

use std::future::Future;
use std::sync::LazyLock;

use chrono::{SecondsFormat, Utc};
use log::{debug, info, warn};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::IdentityError;
use crate::model::VerificationResult;

static PAN_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("PAN pattern is valid"));

pub const SALT_ROUNDS: u32 = 10;
const FLAGGED_RISK: u8 = 87;
const CLEAN_RISK: u8 = 12;

pub trait IdentityBackend {
	fn verify_pan(&self, pan: &str) -> impl Future<Output = Result<VerificationResult, IdentityError>>;
}

/// Pacing between stages; the browser build waits on a timer, tests don't.
pub trait StageTimer {
	fn pause(&self, ms: u32) -> impl Future<Output = ()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
	Hashing,
	QueryingIpfs,
	SoulBoundCheck,
	RiskAssessment,
}

impl Stage {
	pub const ALL: [Stage; 4] = [
		Stage::Hashing,
		Stage::QueryingIpfs,
		Stage::SoulBoundCheck,
		Stage::RiskAssessment,
	];

	pub fn label(self) -> &'static str {
		match self {
			Self::Hashing => "Hashing PAN",
			Self::QueryingIpfs => "Querying IPFS",
			Self::SoulBoundCheck => "Soul-Bound Check",
			Self::RiskAssessment => "Risk Assessment",
		}
	}

	pub fn description(self) -> &'static str {
		match self {
			Self::Hashing => "Applying SHA-256 with 10-round salt",
			Self::QueryingIpfs => "Checking decentralized storage",
			Self::SoulBoundCheck => "Verifying identity token binding",
			Self::RiskAssessment => "Computing eligibility score",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Verdict {
	pub result: VerificationResult,
	/// True when the service was unavailable and the result was computed here.
	pub local: bool,
}

/// Trim and upper-case, then check the `AAAAA9999A` shape.
pub fn normalize_pan(raw: &str) -> Result<String, IdentityError> {
	let pan = raw.trim().to_uppercase();
	if PAN_PATTERN.is_match(&pan) {
		Ok(pan)
	} else {
		Err(IdentityError::InvalidFormat)
	}
}

/// Ten chained SHA-256 rounds; round `i` hashes the previous hex digest with a
/// salt derived from `i` and the input length. Demo only.
pub fn salted_digest(input: &str) -> String {
	let mut data = input.to_string();
	for round in 0..SALT_ROUNDS {
		let salt = format!("mule_radar_salt_round_{round}_{}", input.len());
		let mut hasher = Sha256::new();
		hasher.update(data.as_bytes());
		hasher.update(salt.as_bytes());
		data = hex::encode(hasher.finalize());
	}
	data
}

/// Offline stand-in for the verification service.
pub fn local_verdict(pan: &str, timestamp: String) -> VerificationResult {
	let flagged = pan.chars().next().is_some_and(|c| c as u32 % 3 == 0);
	VerificationResult {
		pan_hash: salted_digest(pan),
		salt_rounds: SALT_ROUNDS,
		ipfs_found: true,
		soul_bound: !flagged,
		can_create_account: !flagged,
		risk_score: if flagged { FLAGGED_RISK } else { CLEAN_RISK },
		timestamp,
	}
}

/// Run the whole check. Only a malformed PAN is an error; service failures
/// are absorbed into a local verdict.
pub async fn verify<B, T, F>(backend: &B, timer: &T, delay_ms: u32, raw: &str, mut on_stage: F) -> Result<Verdict, IdentityError>
where
	B: IdentityBackend,
	T: StageTimer,
	F: FnMut(Stage),
{
	let pan = normalize_pan(raw)?;

	for stage in Stage::ALL {
		on_stage(stage);
		timer.pause(delay_ms).await;
	}

	match backend.verify_pan(&pan).await {
		Ok(result) => {
			info!("Verification service answered");
			Ok(Verdict { result, local: false })
		}
		Err(e) => {
			warn!("{e}; computing local verdict");
			let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
			debug!("local verdict at {now}");
			Ok(Verdict { result: local_verdict(&pan, now), local: true })
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};
	use std::future::ready;

	use futures::executor::block_on;

	use super::*;

	struct NoDelay;

	impl StageTimer for NoDelay {
		fn pause(&self, _ms: u32) -> impl Future<Output = ()> {
			ready(())
		}
	}

	struct Service {
		calls: Cell<usize>,
		reply: Result<VerificationResult, IdentityError>,
		seen: RefCell<Vec<String>>,
	}

	impl Service {
		fn new(reply: Result<VerificationResult, IdentityError>) -> Self {
			Self { calls: Cell::new(0), reply, seen: RefCell::new(vec![]) }
		}
	}

	impl IdentityBackend for Service {
		async fn verify_pan(&self, pan: &str) -> Result<VerificationResult, IdentityError> {
			self.calls.set(self.calls.get() + 1);
			self.seen.borrow_mut().push(pan.to_string());
			self.reply.clone()
		}
	}

	#[test]
	fn pan_validation() {
		assert_eq!(normalize_pan("ABCDE1234F"), Ok("ABCDE1234F".to_string()));
		assert_eq!(normalize_pan("  abcde1234f "), Ok("ABCDE1234F".to_string()));
		assert_eq!(normalize_pan("ABC1234XYZ"), Err(IdentityError::InvalidFormat));
		assert_eq!(normalize_pan("ABCDE1234"), Err(IdentityError::InvalidFormat));
		assert_eq!(normalize_pan("ABCDE1234FG"), Err(IdentityError::InvalidFormat));
	}

	#[test]
	fn malformed_pan_never_reaches_the_service() {
		let service = Service::new(Ok(VerificationResult::default()));
		let mut stages = vec![];
		let err = block_on(verify(&service, &NoDelay, 0, "ABC1234XYZ", |s| stages.push(s))).unwrap_err();
		assert_eq!(err, IdentityError::InvalidFormat);
		assert_eq!(service.calls.get(), 0);
		assert!(stages.is_empty());
	}

	#[test]
	fn service_answer_is_used_as_is() {
		let answer = VerificationResult {
			pan_hash: "cafe".into(),
			salt_rounds: 10,
			ipfs_found: false,
			soul_bound: true,
			can_create_account: true,
			risk_score: 3,
			timestamp: "2026-01-01T00:00:00Z".into(),
		};
		let service = Service::new(Ok(answer.clone()));
		let mut stages = vec![];
		let verdict = block_on(verify(&service, &NoDelay, 0, "abcde1234f", |s| stages.push(s))).unwrap();
		assert_eq!(verdict, Verdict { result: answer, local: false });
		assert_eq!(stages, Stage::ALL);
		assert_eq!(service.seen.borrow().as_slice(), ["ABCDE1234F"]);
	}

	#[test]
	fn service_failure_is_absorbed() {
		let service = Service::new(Err(IdentityError::Transport("offline".into())));
		let verdict = block_on(verify(&service, &NoDelay, 0, "ABCDE1234F", |_| {})).unwrap();
		assert!(verdict.local);
		assert_eq!(verdict.result.pan_hash, salted_digest("ABCDE1234F"));
		assert_eq!(verdict.result.salt_rounds, SALT_ROUNDS);
		assert!(!verdict.result.timestamp.is_empty());
	}

	#[test]
	fn digest_chain_is_deterministic_and_input_sensitive() {
		let digest = salted_digest("ABCDE1234F");
		assert_eq!(digest, salted_digest("ABCDE1234F"));
		assert_eq!(digest.len(), 64);
		assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));

		let pan: Vec<char> = "ABCDE1234F".chars().collect();
		for i in 0..pan.len() {
			let mut changed = pan.clone();
			changed[i] = if pan[i] == 'Z' { 'Y' } else if pan[i] == '9' { '8' } else { 'Z' };
			let changed: String = changed.into_iter().collect();
			assert_ne!(salted_digest(&changed), digest, "changing position {i}");
		}
	}

	#[test]
	fn local_verdict_flags_on_first_character() {
		// 'A' = 65, 65 % 3 = 2
		let clean = local_verdict("ABCDE1234F", String::new());
		assert!(clean.can_create_account && clean.soul_bound);
		assert_eq!(clean.risk_score, CLEAN_RISK);

		// 'B' = 66, 66 % 3 = 0
		let flagged = local_verdict("BBCDE1234F", String::new());
		assert!(!flagged.can_create_account && !flagged.soul_bound);
		assert_eq!(flagged.risk_score, FLAGGED_RISK);
		assert!(flagged.ipfs_found);
	}
}
