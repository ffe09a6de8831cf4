use leptos::prelude::*;

use crate::components::detail_panel::DetailPanel;
use crate::components::identity_check::IdentityCheck;
use crate::components::ledger_table::LedgerTable;
use crate::components::network_graph::{AMBER, BLUE, NetworkGraphCanvas, PINK, RED};
use crate::components::sidebar::Sidebar;
use crate::components::stats_row::StatsRow;
use crate::model::Entity;
use crate::state::{AppEvent, Panel, use_store};

#[component]
fn Legend() -> impl IntoView {
	let items = [("Mule", RED), ("Fraud Ring", AMBER), ("Normal", BLUE), ("Ring Link", PINK)];
	view! {
		<ul class="legend">
			{items
				.into_iter()
				.map(|(label, color)| {
					view! {
						<li>
							<span class="swatch" style=format!("background: {color}")></span>
							{label}
						</li>
					}
				})
				.collect_view()}
		</ul>
	}
}

#[component]
fn GraphCard() -> impl IntoView {
	let store = use_store();
	let graph = Memo::new(move |_| store.with(|s| s.results.graph()));
	let has_nodes = move || graph.with(|g| !g.nodes.is_empty());
	let on_select = Callback::new(move |entity: Entity| store.dispatch(AppEvent::EntitySelected(entity)));

	view! {
		<div class="card graph-card">
			<header class="card-header">
				<h3>"Transaction Network"</h3>
				<Show when=move || store.with(|s| s.results.demo)>
					<span class="demo-badge">"Demo data"</span>
				</Show>
				<Show when=has_nodes>
					<Legend />
				</Show>
			</header>
			<div class="graph-body">
				<Show
					when=has_nodes
					fallback=|| view! { <p class="placeholder">"Awaiting transaction data"</p> }
				>
					<NetworkGraphCanvas data=graph on_select=on_select />
				</Show>
			</div>
		</div>
	}
}

#[component]
fn Overview() -> impl IntoView {
	view! {
		<StatsRow />
		<GraphCard />
		<LedgerTable />
	}
}

#[component]
pub fn Dashboard() -> impl IntoView {
	let store = use_store();
	let panel = Memo::new(move |_| store.with(|s| s.section.panel()));

	view! {
		<div class="dashboard">
			<Sidebar />
			<main class="dashboard-main">
				{move || match panel.get() {
					Panel::Overview => view! { <Overview /> }.into_any(),
					Panel::IdentityCheck => view! { <IdentityCheck /> }.into_any(),
				}}
			</main>
			<DetailPanel />
		</div>
	}
}
