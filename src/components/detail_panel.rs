//! Right-hand panel describing the selected entity.

use std::f64::consts::PI;

use leptos::prelude::*;

use crate::model::{Entity, format_amount};
use crate::state::use_store;

const HEX: &[u8; 16] = b"0123456789abcdef";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RiskTier {
	Critical,
	Elevated,
	Low,
}

impl RiskTier {
	pub fn from_score(score: u8) -> Self {
		match score {
			80.. => Self::Critical,
			50.. => Self::Elevated,
			_ => Self::Low,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Critical => "CRITICAL",
			Self::Elevated => "ELEVATED",
			Self::Low => "LOW",
		}
	}

	pub fn class(self) -> &'static str {
		match self {
			Self::Critical => "tier-critical",
			Self::Elevated => "tier-elevated",
			Self::Low => "tier-low",
		}
	}

	pub fn stroke(self) -> &'static str {
		match self {
			Self::Critical => "#ef4444",
			Self::Elevated => "#f59e0b",
			Self::Low => "#22c55e",
		}
	}
}

/// Decorative 64-character hex string derived from the entity id.
///
/// Not a hash of anything and not a verification result; it only gives each
/// entity a stable-looking fingerprint in the UI.
pub fn demo_fingerprint(id: &str) -> String {
	let units: Vec<u16> = id.encode_utf16().collect();
	if units.is_empty() {
		return String::new();
	}
	(0..64)
		.map(|i| HEX[(units[i % units.len()] as usize + i * 7) % 16] as char)
		.collect()
}

#[component]
fn MetaCard(label: &'static str, value: String) -> impl IntoView {
	view! {
		<div class="meta-card">
			<span class="meta-label">{label}</span>
			<p class="meta-value">{value}</p>
		</div>
	}
}

#[component]
fn EntityDetails(entity: Entity) -> impl IntoView {
	let tier = RiskTier::from_score(entity.risk_score);
	let circumference = 2.0 * PI * 45.0;
	let dash_offset = circumference - (entity.risk_score as f64 / 100.0) * circumference;

	let not_available = || "N/A".to_string();
	let account_age = entity.account_age.clone().unwrap_or_else(not_available);
	let volume = entity
		.total_volume
		.map(|v| format!("${}", format_amount(v)))
		.unwrap_or_else(not_available);
	let linked = entity
		.linked_accounts
		.map(|n| n.to_string())
		.unwrap_or_else(not_available);
	let category = entity.category.as_str().to_uppercase();
	let fingerprint = demo_fingerprint(&entity.id);
	let name = entity.label().to_string();

	let findings = (!entity.flagged_patterns.is_empty()).then(|| {
		let items = entity
			.flagged_patterns
			.iter()
			.map(|p| view! { <li>{p.clone()}</li> })
			.collect_view();
		view! {
			<h4 class="section-title">"Key Findings"</h4>
			<ul class="findings">{items}</ul>
		}
	});

	view! {
		<div class="panel-body">
			<div class=format!("risk-card {}", tier.class())>
				<svg class="risk-gauge" viewBox="0 0 100 100">
					<circle cx="50" cy="50" r="45" fill="none" stroke="#1E293B" stroke-width="6" />
					<circle
						cx="50"
						cy="50"
						r="45"
						fill="none"
						stroke=tier.stroke()
						stroke-width="6"
						stroke-linecap="round"
						stroke-dasharray=circumference.to_string()
						stroke-dashoffset=dash_offset.to_string()
					/>
				</svg>
				<div>
					<span class="risk-score">{entity.risk_score}</span>
					<span class="risk-level">{tier.label()}</span>
					<h3>{name}</h3>
					<p class="mono muted">{entity.id}</p>
				</div>
			</div>

			{findings}

			<h4 class="section-title">"Account Metadata"</h4>
			<div class="meta-grid">
				<MetaCard label="Account Age" value=account_age />
				<MetaCard label="Total Volume" value=volume />
				<MetaCard label="Linked Accts" value=linked />
				<MetaCard label="Entity Type" value=category />
			</div>

			<div class="fingerprint">
				<span class="section-title">"Demo fingerprint (not verified)"</span>
				<p class="mono muted">{fingerprint}</p>
			</div>
		</div>
	}
}

#[component]
pub fn DetailPanel() -> impl IntoView {
	let store = use_store();
	let selection = move || store.with(|s| s.selection.clone());

	view! {
		<aside class="detail-panel">
			<header class="panel-header">
				<h2>"Registry Query Result"</h2>
			</header>
			{move || match selection() {
				Some(entity) => view! { <EntityDetails entity=entity /> }.into_any(),
				None => {
					view! {
						<div class="placeholder">
							<p>"No Entity Selected"</p>
							<p class="muted">"Click a node in the network or a ledger row to inspect it"</p>
						</div>
					}
						.into_any()
				}
			}}
		</aside>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tiers_use_two_thresholds() {
		assert_eq!(RiskTier::from_score(100), RiskTier::Critical);
		assert_eq!(RiskTier::from_score(80), RiskTier::Critical);
		assert_eq!(RiskTier::from_score(79), RiskTier::Elevated);
		assert_eq!(RiskTier::from_score(50), RiskTier::Elevated);
		assert_eq!(RiskTier::from_score(49), RiskTier::Low);
		assert_eq!(RiskTier::from_score(0), RiskTier::Low);
	}

	#[test]
	fn fingerprint_is_stable_hex() {
		let fp = demo_fingerprint("ACC-1000");
		assert_eq!(fp.len(), 64);
		assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
		assert_eq!(fp, demo_fingerprint("ACC-1000"));
		assert_ne!(fp, demo_fingerprint("ACC-1001"));
		// 'A' = 65 -> 65 % 16 = 1; then 'C' + 7 = 74 -> 10
		assert!(fp.starts_with("1a"));
	}

	#[test]
	fn empty_id_has_no_fingerprint() {
		assert_eq!(demo_fingerprint(""), "");
	}
}
