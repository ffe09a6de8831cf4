use leptos::prelude::*;

use crate::model::{Summary, group_thousands};
use crate::state::use_store;

const PLACEHOLDER: &str = "—";

/// Average risk as shown in the counter, e.g. `72.5%`.
pub fn format_percent(value: f64) -> String {
	let rounded = (value * 10.0).round() / 10.0;
	if rounded.fract() == 0.0 {
		format!("{rounded:.0}%")
	} else {
		format!("{rounded:.1}%")
	}
}

fn counters(summary: Option<&Summary>) -> [(&'static str, String, &'static str); 4] {
	let value = |f: fn(&Summary) -> String| summary.map(f).unwrap_or_else(|| PLACEHOLDER.to_string());
	[
		("Total Transactions", value(|s| group_thousands(s.total_transactions)), "stat-blue"),
		("Flagged Accounts", value(|s| group_thousands(s.flagged_accounts)), "stat-red"),
		("Avg Risk Score", value(|s| format_percent(s.average_risk_score)), "stat-amber"),
		("Detected Cycles", value(|s| group_thousands(s.detected_cycles)), "stat-pink"),
	]
}

#[component]
pub fn StatsRow() -> impl IntoView {
	let store = use_store();

	view! {
		<div class="stats-row">
			{move || {
				let summary = store.with(|s| s.results.summary());
				counters(summary.as_ref())
					.into_iter()
					.map(|(label, value, accent)| {
						view! {
							<div class=format!("stat-card {accent}")>
								<span class="stat-label">{label}</span>
								<span class="stat-value">{value}</span>
							</div>
						}
					})
					.collect_view()
			}}
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn percent_drops_trailing_zero() {
		assert_eq!(format_percent(72.0), "72%");
		assert_eq!(format_percent(72.46), "72.5%");
		assert_eq!(format_percent(0.0), "0%");
	}

	#[test]
	fn counters_without_summary_show_placeholder() {
		for (_, value, _) in counters(None) {
			assert_eq!(value, PLACEHOLDER);
		}
	}

	#[test]
	fn counters_group_thousands() {
		let summary = Summary {
			total_transactions: 10_247,
			flagged_accounts: 4,
			average_risk_score: 61.0,
			detected_cycles: 3,
		};
		let values: Vec<String> = counters(Some(&summary)).into_iter().map(|(_, v, _)| v).collect();
		assert_eq!(values, ["10,247", "4", "61%", "3"]);
	}
}
