//! Wire types shared with the detection backend.
//!
//! Every field is optional on the wire; missing values fall back to their
//! defaults so partial payloads still render.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
	Mule,
	Shell,
	#[default]
	Normal,
	Ring,
	#[serde(other)]
	Unknown,
}

impl EntityCategory {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Mule => "mule",
			Self::Shell => "shell",
			Self::Normal => "normal",
			Self::Ring => "ring",
			Self::Unknown => "unknown",
		}
	}

	/// Mules and ring members get the emphasized node style and a risk badge.
	pub fn is_flagged(self) -> bool {
		matches!(self, Self::Mule | Self::Ring)
	}
}

impl fmt::Display for EntityCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A scored account in the transaction graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entity {
	#[serde(deserialize_with = "null_as_default")]
	pub id: String,
	#[serde(deserialize_with = "null_as_default")]
	pub name: String,
	#[serde(deserialize_with = "risk_score")]
	pub risk_score: u8,
	#[serde(rename = "type", deserialize_with = "null_as_default")]
	pub category: EntityCategory,
	#[serde(deserialize_with = "null_as_default")]
	pub flagged_patterns: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub account_age: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub total_volume: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none", deserialize_with = "optional_count")]
	pub linked_accounts: Option<u32>,
}

impl Entity {
	/// Name if the backend sent one, id otherwise.
	pub fn label(&self) -> &str {
		if self.name.is_empty() { &self.id } else { &self.name }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Edge {
	#[serde(deserialize_with = "null_as_default")]
	pub source: String,
	#[serde(deserialize_with = "null_as_default")]
	pub target: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub is_ring_connection: Option<bool>,
}

impl Edge {
	pub fn is_ring_connection(&self) -> bool {
		self.is_ring_connection.unwrap_or(false)
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphData {
	#[serde(deserialize_with = "null_as_default")]
	pub nodes: Vec<Entity>,
	#[serde(deserialize_with = "null_as_default")]
	pub links: Vec<Edge>,
}

impl GraphData {
	/// Order-independent identity of the node set: sorted `id:category` pairs.
	pub fn signature(&self) -> String {
		let mut parts: Vec<String> = self
			.nodes
			.iter()
			.map(|n| format!("{}:{}", n.id, n.category))
			.collect();
		parts.sort_unstable();
		parts.join("|")
	}

	/// Links whose source or target is not a known node id.
	pub fn dangling_links(&self) -> usize {
		let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
		self.links
			.iter()
			.filter(|l| !ids.contains(l.source.as_str()) || !ids.contains(l.target.as_str()))
			.count()
	}

	pub fn find(&self, id: &str) -> Option<&Entity> {
		self.nodes.iter().find(|n| n.id == id)
	}
}

/// Backend-owned counters; never recomputed for backend data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summary {
	#[serde(deserialize_with = "count")]
	pub total_transactions: u64,
	#[serde(deserialize_with = "count")]
	pub flagged_accounts: u64,
	#[serde(deserialize_with = "null_as_default")]
	pub average_risk_score: f64,
	#[serde(deserialize_with = "count")]
	pub detected_cycles: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionResult {
	#[serde(deserialize_with = "null_as_default")]
	pub mules: Vec<Entity>,
	#[serde(deserialize_with = "null_as_default")]
	pub graph: GraphData,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub summary: Option<Summary>,
}

/// Returned by `/verify-pan`, or computed locally when that call fails.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationResult {
	#[serde(deserialize_with = "null_as_default")]
	pub pan_hash: String,
	#[serde(deserialize_with = "count")]
	pub salt_rounds: u32,
	#[serde(deserialize_with = "null_as_default")]
	pub ipfs_found: bool,
	#[serde(deserialize_with = "null_as_default")]
	pub soul_bound: bool,
	#[serde(deserialize_with = "null_as_default")]
	pub can_create_account: bool,
	#[serde(deserialize_with = "risk_score")]
	pub risk_score: u8,
	#[serde(deserialize_with = "null_as_default")]
	pub timestamp: String,
}

/// Round and clamp a backend score into `0..=100`.
pub fn clamp_score(raw: f64) -> u8 {
	if raw.is_nan() {
		0
	} else {
		raw.round().clamp(0.0, 100.0) as u8
	}
}

fn risk_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
	Ok(Option::<f64>::deserialize(deserializer)?
		.map(clamp_score)
		.unwrap_or_default())
}

/// `null` reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Non-negative whole number from any JSON number; `5120.0` is `5120`.
fn whole<T: TryFrom<u64> + Bounded>(raw: f64) -> T {
	if raw.is_nan() || raw <= 0.0 {
		return T::ZERO;
	}
	T::try_from(raw.round() as u64).unwrap_or(T::MAX)
}

trait Bounded {
	const ZERO: Self;
	const MAX: Self;
}

impl Bounded for u32 {
	const ZERO: Self = 0;
	const MAX: Self = u32::MAX;
}

impl Bounded for u64 {
	const ZERO: Self = 0;
	const MAX: Self = u64::MAX;
}

fn count<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: TryFrom<u64> + Bounded,
{
	Ok(Option::<f64>::deserialize(deserializer)?
		.map(whole)
		.unwrap_or(T::ZERO))
}

fn optional_count<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
	D: Deserializer<'de>,
	T: TryFrom<u64> + Bounded,
{
	Ok(Option::<f64>::deserialize(deserializer)?.map(whole))
}

/// `1234567` → `1,234,567`.
pub fn group_thousands(value: u64) -> String {
	let digits = value.to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, ch) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			out.push(',');
		}
		out.push(ch);
	}
	out
}

/// Currency-style amount: grouped integer part, two decimals only when needed.
pub fn format_amount(value: f64) -> String {
	let whole = value.trunc().abs() as u64;
	let sign = if value < 0.0 { "-" } else { "" };
	let cents = ((value.abs() - whole as f64) * 100.0).round() as u64;
	match cents {
		0 => format!("{sign}{}", group_thousands(whole)),
		100 => format!("{sign}{}", group_thousands(whole + 1)),
		c => format!("{sign}{}.{c:02}", group_thousands(whole)),
	}
}
