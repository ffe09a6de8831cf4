use leptos::prelude::*;

use crate::components::upload_panel::UploadPanel;
use crate::state::{AppEvent, use_store};

#[component]
pub fn Landing() -> impl IntoView {
	let store = use_store();

	view! {
		<main class="landing">
			<section class="hero">
				<h1>"Mule Radar"</h1>
				<p class="subtitle">
					"Upload a transaction ledger to surface money mules, shell entities and laundering rings."
				</p>
				<UploadPanel hero=true />
			</section>
			<div class="landing-actions">
				<button class="secondary" on:click=move |_| store.dispatch(AppEvent::OpenIdentityCheck)>
					"Verify an identity instead"
				</button>
				<Show when=move || store.with(|s| s.results.has_result())>
					<button class="secondary" on:click=move |_| store.dispatch(AppEvent::ResumeDashboard)>
						"Back to last analysis"
					</button>
				</Show>
			</div>
		</main>
	}
}
