//! Drop zone for transaction CSVs.
//!
//! The form records when it was mounted and carries a hidden decoy input; both
//! feed the screening in [`UploadGate`] before anything is read or sent.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};
use web_sys::{DragEvent, File, HtmlInputElement};

use crate::api::HttpBackend;
use crate::browser;
use crate::config::AppConfig;
use crate::state::{AppEvent, AppStore, use_store};
use crate::upload::{Submission, UploadGate};

/// Screen `submission` and, if it passes, upload `file` in the background.
///
/// Completion is reported to the store tagged with the generation handed out
/// when the upload started, so a slower earlier upload cannot overwrite a
/// newer result.
pub fn submit_file(store: AppStore, config: &AppConfig, file: File, submission: Submission) {
	let gate = UploadGate::new(HttpBackend::new(config.clone()), config);
	if let Err(e) = gate.screen(&submission) {
		warn!("upload of {} refused: {e}", submission.file_name);
		store.dispatch(AppEvent::UploadRejected(e));
		return;
	}

	let generation = store.begin_upload(submission.file_name.clone());
	info!("upload {generation} started: {}", submission.file_name);
	spawn_local(async move {
		let outcome = gate.submit(&submission, browser::read_file(file)).await;
		store.dispatch(AppEvent::UploadFinished { generation, outcome });
	});
}

#[component]
pub fn UploadPanel(
	/// Large landing-page variant.
	#[prop(optional)]
	hero: bool,
) -> impl IntoView {
	let store = use_store();
	let config = StoredValue::new(expect_context::<AppConfig>());
	let mounted_at = browser::now_ms();
	let decoy = RwSignal::new(String::new());
	let dragging = RwSignal::new(false);
	let input_ref = NodeRef::<leptos::html::Input>::new();

	let busy = move || store.with(|s| s.is_busy());

	let take = move |file: File| {
		if busy() {
			return;
		}
		let submission = Submission {
			file_name: file.name(),
			elapsed_ms: browser::now_ms() - mounted_at,
			decoy: decoy.get_untracked(),
		};
		submit_file(store, &config.get_value(), file, submission);
	};

	let on_change = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		if let Some(file) = input.files().and_then(|files| files.get(0)) {
			take(file);
		}
		// allow picking the same file again
		input.set_value("");
	};

	let on_drop = move |ev: DragEvent| {
		ev.prevent_default();
		dragging.set(false);
		if let Some(file) = ev.data_transfer().and_then(|dt| dt.files()).and_then(|files| files.get(0)) {
			take(file);
		}
	};

	let browse = move |_: leptos::ev::MouseEvent| {
		if let Some(input) = input_ref.get() {
			if !busy() {
				input.click();
			}
		}
	};

	let zone_class = move || {
		let mut class = String::from("drop-zone");
		if hero {
			class.push_str(" drop-zone-hero");
		}
		if dragging.get() {
			class.push_str(" dragging");
		}
		if busy() {
			class.push_str(" busy");
		}
		class
	};

	let status = move || {
		store.with(|s| {
			if s.upload.in_flight {
				let name = s.upload.file_name.clone().unwrap_or_default();
				return Some(view! { <p class="upload-status">{format!("Analyzing {name}…")}</p> }.into_any());
			}
			if let Some(error) = &s.upload.error {
				return Some(view! { <p class="upload-error">{error.to_string()}</p> }.into_any());
			}
			s.upload
				.notice
				.clone()
				.map(|notice| view! { <p class="upload-notice">{notice}</p> }.into_any())
		})
	};

	view! {
		<div class="upload-panel">
			<div
				class=zone_class
				on:click=browse
				on:dragover=move |ev: DragEvent| {
					ev.prevent_default();
					dragging.set(true);
				}
				on:dragleave=move |_| dragging.set(false)
				on:drop=on_drop
			>
				<p class="drop-title">
					{move || if busy() { "Processing…" } else { "Drop transaction CSV" }}
				</p>
				<p class="muted">"or click to browse"</p>
			</div>
			<input
				node_ref=input_ref
				type="file"
				accept=".csv,text/csv"
				class="hidden"
				disabled=busy
				on:change=on_change
			/>
			<input
				type="text"
				name="website"
				class="decoy"
				tabindex="-1"
				autocomplete="off"
				aria-hidden="true"
				prop:value=move || decoy.get()
				on:input=move |ev| decoy.set(event_target_value(&ev))
			/>
			{status}
		</div>
	}
}
