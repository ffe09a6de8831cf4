//! Offline demo data.
//!
//! Only reachable through [`FailurePolicy::FailOpen`](crate::config::FailurePolicy).
//! Nothing here is derived from the uploaded file; values are random and only
//! the shape of the payload is fixed.

use rand::Rng;

use crate::model::{DetectionResult, Edge, Entity, EntityCategory, GraphData, Summary};

const ROSTER: [&str; 12] = [
	"Viktor Petrov",
	"Elena Sorokina",
	"Dmitri Volkov",
	"Natasha Federova",
	"Sergei Kozlov",
	"Olga Ivanova",
	"Alexei Kuznetsov",
	"Marina Popova",
	"Andrei Smirnov",
	"Irina Morozova",
	"Boris Lebedev",
	"Tatiana Novak",
];

const PATTERNS: [&str; 8] = [
	"Rapid fund cycling",
	"Structuring under $10K",
	"Shell company transfers",
	"Cross-border smurfing",
	"Layered transactions",
	"Round-trip wash",
	"Velocity spike",
	"Dormant account activation",
];

/// Forced (risk, category) for the first four accounts so the demo always
/// has a visible high-risk cluster.
const HOT_ACCOUNTS: [(u8, EntityCategory); 4] = [
	(95, EntityCategory::Mule),
	(88, EntityCategory::Mule),
	(92, EntityCategory::Shell),
	(85, EntityCategory::Mule),
];

const CYCLE_VALUES: [f64; 4] = [45_000.0, 43_000.0, 41_000.0, 39_000.0];

pub const DEMO_TOTAL_TRANSACTIONS: u64 = 10_247;
pub const DEMO_DETECTED_CYCLES: u64 = 3;

/// Accounts above this score are listed as flagged.
const FLAG_THRESHOLD: u8 = 80;

pub fn synthesize<R: Rng + ?Sized>(rng: &mut R) -> DetectionResult {
	let mut nodes: Vec<Entity> = ROSTER
		.iter()
		.enumerate()
		.map(|(i, name)| Entity {
			id: format!("ACC-{}", 1000 + i),
			name: (*name).to_string(),
			risk_score: rng.gen_range(40..100),
			category: random_category(rng),
			flagged_patterns: PATTERNS
				.iter()
				.filter(|_| rng.gen_bool(0.4))
				.map(|p| (*p).to_string())
				.collect(),
			account_age: Some(format!("{} months", rng.gen_range(1..=48))),
			total_volume: Some(rng.gen_range(10_000..510_000) as f64),
			linked_accounts: Some(rng.gen_range(1..=8)),
		})
		.collect();

	for (node, (score, category)) in nodes.iter_mut().zip(HOT_ACCOUNTS) {
		node.risk_score = score;
		node.category = category;
	}
	nodes[0].flagged_patterns = ["Rapid fund cycling", "Cross-border smurfing", "Velocity spike"]
		.map(String::from)
		.to_vec();

	let mut links = Vec::new();
	for (i, node) in nodes.iter().enumerate() {
		for _ in 0..rng.gen_range(1..=3) {
			let target = rng.gen_range(0..nodes.len());
			if target != i {
				links.push(Edge {
					source: node.id.clone(),
					target: nodes[target].id.clone(),
					value: Some(rng.gen_range(5_000..105_000) as f64),
					is_ring_connection: None,
				});
			}
		}
	}
	for (step, value) in CYCLE_VALUES.iter().enumerate() {
		links.push(Edge {
			source: nodes[step].id.clone(),
			target: nodes[(step + 1) % CYCLE_VALUES.len()].id.clone(),
			value: Some(*value),
			is_ring_connection: None,
		});
	}

	let mules: Vec<Entity> = nodes
		.iter()
		.filter(|n| n.risk_score > FLAG_THRESHOLD)
		.cloned()
		.collect();
	let mean = nodes.iter().map(|n| n.risk_score as f64).sum::<f64>() / nodes.len() as f64;

	DetectionResult {
		summary: Some(Summary {
			total_transactions: DEMO_TOTAL_TRANSACTIONS,
			flagged_accounts: mules.len() as u64,
			average_risk_score: mean.round(),
			detected_cycles: DEMO_DETECTED_CYCLES,
		}),
		mules,
		graph: GraphData { nodes, links },
	}
}

fn random_category<R: Rng + ?Sized>(rng: &mut R) -> EntityCategory {
	if rng.gen_bool(0.4) {
		EntityCategory::Mule
	} else if rng.gen_bool(0.5) {
		EntityCategory::Shell
	} else {
		EntityCategory::Normal
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	#[test]
	fn shape_is_fixed_across_seeds() {
		for seed in 0..16 {
			let result = synthesize(&mut StdRng::seed_from_u64(seed));
			let nodes = &result.graph.nodes;
			assert_eq!(nodes.len(), ROSTER.len());
			assert_eq!(nodes[0].id, "ACC-1000");
			assert_eq!(nodes[11].id, "ACC-1011");
			assert_eq!(nodes[0].flagged_patterns.len(), 3);
			for (node, (score, category)) in nodes.iter().zip(HOT_ACCOUNTS) {
				assert_eq!((node.risk_score, node.category), (score, category));
			}
			assert!(nodes.iter().all(|n| (40..=99).contains(&n.risk_score)));
			assert_eq!(result.graph.dangling_links(), 0);
			assert!(result.graph.links.iter().all(|l| l.source != l.target));
		}
	}

	#[test]
	fn cycle_closes_the_first_four_accounts() {
		let result = synthesize(&mut StdRng::seed_from_u64(7));
		let tail: Vec<(&str, &str)> = result.graph.links[result.graph.links.len() - 4..]
			.iter()
			.map(|l| (l.source.as_str(), l.target.as_str()))
			.collect();
		assert_eq!(
			tail,
			[
				("ACC-1000", "ACC-1001"),
				("ACC-1001", "ACC-1002"),
				("ACC-1002", "ACC-1003"),
				("ACC-1003", "ACC-1000"),
			]
		);
	}

	#[test]
	fn summary_is_aggregated_from_the_roster() {
		let result = synthesize(&mut StdRng::seed_from_u64(42));
		let summary = result.summary.clone().unwrap();
		let nodes = &result.graph.nodes;

		let flagged = nodes.iter().filter(|n| n.risk_score > 80).count();
		assert!(flagged >= 4);
		assert_eq!(summary.flagged_accounts, flagged as u64);
		assert_eq!(result.mules.len(), flagged);
		assert_eq!(result.mules[0].id, "ACC-1000");

		let mean = nodes.iter().map(|n| n.risk_score as f64).sum::<f64>() / nodes.len() as f64;
		assert_eq!(summary.average_risk_score, mean.round());
		assert_eq!(summary.total_transactions, DEMO_TOTAL_TRANSACTIONS);
		assert_eq!(summary.detected_cycles, DEMO_DETECTED_CYCLES);
	}
}
