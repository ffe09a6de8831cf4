use leptos::prelude::*;
use log::{error, info};

use super::upload_panel::UploadPanel;
use crate::browser;
use crate::export::{EXPORT_FILE_NAME, export_json};
use crate::state::{AppEvent, Section, use_store};

#[component]
pub fn Sidebar() -> impl IntoView {
	let store = use_store();

	let export = move |_: leptos::ev::MouseEvent| {
		let raw = store.with(|s| s.results.payload.as_ref().map(|p| p.raw.clone()));
		let written = export_json(raw.as_ref()).and_then(|json| browser::download_json(EXPORT_FILE_NAME, &json));
		match written {
			Ok(()) => info!("exported detection payload to {EXPORT_FILE_NAME}"),
			Err(e) => error!("export failed: {e}"),
		}
	};

	let nav = Section::ALL
		.into_iter()
		.map(|section| {
			let active = move || store.with(|s| s.section == section);
			view! {
				<li>
					<button
						class="nav-item"
						class:active=active
						on:click=move |_| store.dispatch(AppEvent::SectionChanged(section))
					>
						{section.label()}
					</button>
				</li>
			}
		})
		.collect_view();

	view! {
		<nav class="sidebar">
			<button class="brand" on:click=move |_| store.dispatch(AppEvent::ReturnHome)>
				<span class="brand-mark"></span>
				<span class="brand-name">"Mule Radar"</span>
			</button>
			<ul class="nav">{nav}</ul>
			<UploadPanel />
			<Show when=move || store.with(|s| s.results.has_result())>
				<button class="export" on:click=export>
					"Export JSON"
				</button>
			</Show>
		</nav>
	}
}
