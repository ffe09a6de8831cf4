//! Tabular list of the flagged entities.

use leptos::prelude::*;

use super::detail_panel::RiskTier;
use crate::model::{Entity, EntityCategory};
use crate::state::{AppEvent, use_store};

const MAX_PATTERN_CHIPS: usize = 2;

/// Patterns shown as chips, plus how many were left out.
pub fn pattern_chips(patterns: &[String]) -> (&[String], usize) {
	let shown = patterns.len().min(MAX_PATTERN_CHIPS);
	(&patterns[..shown], patterns.len() - shown)
}

fn chip_class(category: EntityCategory) -> &'static str {
	match category {
		EntityCategory::Mule => "chip chip-mule",
		EntityCategory::Ring => "chip chip-ring",
		EntityCategory::Shell => "chip chip-shell",
		EntityCategory::Normal | EntityCategory::Unknown => "chip chip-normal",
	}
}

#[component]
fn LedgerRow(entity: Entity) -> impl IntoView {
	let store = use_store();
	let tier = RiskTier::from_score(entity.risk_score);
	let (shown, hidden) = pattern_chips(&entity.flagged_patterns);
	let chips = shown
		.iter()
		.map(|p| view! { <span class="pattern-chip">{p.clone()}</span> })
		.collect_view();
	let overflow = (hidden > 0).then(|| view! { <span class="pattern-more">{format!("+{hidden}")}</span> });
	let (id, name, category, score) = (
		entity.id.clone(),
		entity.label().to_string(),
		entity.category,
		entity.risk_score,
	);

	view! {
		<tr class="ledger-row" on:click=move |_| store.dispatch(AppEvent::EntitySelected(entity.clone()))>
			<td class="mono">{id}</td>
			<td>{name}</td>
			<td>
				<span class=chip_class(category)>{category.as_str().to_uppercase()}</span>
			</td>
			<td>
				<span class=format!("risk-badge {}", tier.class())>{score}</span>
			</td>
			<td class="patterns">{chips} {overflow}</td>
		</tr>
	}
}

#[component]
pub fn LedgerTable() -> impl IntoView {
	let store = use_store();
	let mules = move || store.with(|s| s.results.mules());

	view! {
		<div class="card ledger">
			<header class="card-header">
				<h3>"Flagged Entities"</h3>
				<span class="muted">{move || format!("{} accounts", mules().len())}</span>
			</header>
			{move || {
				let rows = mules();
				if rows.is_empty() {
					return view! { <p class="placeholder">"No flagged entities yet"</p> }.into_any();
				}
				view! {
					<table class="ledger-table">
						<thead>
							<tr>
								<th>"Account"</th>
								<th>"Name"</th>
								<th>"Type"</th>
								<th>"Risk"</th>
								<th>"Patterns"</th>
							</tr>
						</thead>
						<tbody>
							{rows.into_iter().map(|entity| view! { <LedgerRow entity=entity /> }).collect_view()}
						</tbody>
					</table>
				}
					.into_any()
			}}
		</div>
	}
}
