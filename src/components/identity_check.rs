//! PAN verification flow.

use chrono::DateTime;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::debug;

use crate::api::HttpBackend;
use crate::browser::BrowserTimer;
use crate::config::AppConfig;
use crate::error::IdentityError;
use crate::identity::{self, Stage, Verdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageStatus {
	Pending,
	Active,
	Done,
}

/// Where `stage` stands given the stage currently running.
pub fn stage_status(current: Option<Stage>, finished: bool, stage: Stage) -> StageStatus {
	if finished {
		return StageStatus::Done;
	}
	let position = |s: Stage| Stage::ALL.iter().position(|&x| x == s);
	match current.and_then(position) {
		Some(at) if position(stage) < Some(at) => StageStatus::Done,
		Some(_) if current == Some(stage) => StageStatus::Active,
		_ => StageStatus::Pending,
	}
}

pub fn risk_color(score: u8) -> &'static str {
	match score {
		71.. => "#ef4444",
		41.. => "#f59e0b",
		_ => "#22c55e",
	}
}

/// Render an RFC 3339 timestamp for humans; anything else is shown as is.
pub fn format_timestamp(raw: &str) -> String {
	DateTime::parse_from_rfc3339(raw)
		.map(|t| t.to_utc().format("%d %b %Y, %H:%M:%S UTC").to_string())
		.unwrap_or_else(|_| raw.to_string())
}

#[component]
fn DetailCard(label: &'static str, value: String) -> impl IntoView {
	view! {
		<div class="meta-card">
			<span class="meta-label">{label}</span>
			<p class="meta-value">{value}</p>
		</div>
	}
}

#[component]
fn VerdictView(verdict: Verdict) -> impl IntoView {
	let result = verdict.result;
	let (class, heading) = if result.can_create_account {
		("verdict approved", "Account Creation Approved")
	} else {
		("verdict denied", "Account Creation Denied")
	};
	let color = risk_color(result.risk_score);
	let ipfs = if result.ipfs_found { "Found" } else { "Not found" };
	let token = if result.soul_bound { "Valid" } else { "Revoked" };
	let checked_at = format_timestamp(&result.timestamp);

	view! {
		<div class=class>
			<h3>{heading}</h3>
			{verdict.local.then(|| view! { <span class="demo-badge">"Demo result (service unavailable)"</span> })}
			<p class="risk-percent" style=format!("color: {color}")>
				{format!("{}%", result.risk_score)}
			</p>
			<span class="muted">"Risk score"</span>
		</div>
		<div class="meta-grid">
			<DetailCard label="PAN Hash" value=result.pan_hash />
			<DetailCard label="Salt Rounds" value=result.salt_rounds.to_string() />
			<DetailCard label="IPFS Record" value=ipfs.to_string() />
			<DetailCard label="Soul-Bound Token" value=token.to_string() />
			<DetailCard label="Checked At" value=checked_at />
		</div>
	}
}

#[component]
pub fn IdentityCheck() -> impl IntoView {
	let config = StoredValue::new(expect_context::<AppConfig>());
	let pan = RwSignal::new(String::new());
	let running = RwSignal::new(false);
	let stage = RwSignal::new(None::<Stage>);
	let verdict = RwSignal::new(None::<Verdict>);
	let failure = RwSignal::new(None::<IdentityError>);
	let generation = RwSignal::new(0_u64);

	let run = move || {
		if running.get_untracked() {
			return;
		}
		let raw = pan.get_untracked();
		let id = generation.get_untracked() + 1;
		generation.set(id);
		running.set(true);
		stage.set(None);
		verdict.set(None);
		failure.set(None);

		let config = config.get_value();
		spawn_local(async move {
			let backend = HttpBackend::new(config.clone());
			let current = move || generation.try_get_untracked() == Some(id);
			let outcome = identity::verify(&backend, &BrowserTimer, config.stage_delay_ms, &raw, |s| {
				if current() {
					stage.set(Some(s));
				}
			})
			.await;

			if !current() {
				debug!("discarding identity check {id}");
				return;
			}
			running.set(false);
			match outcome {
				Ok(v) => verdict.set(Some(v)),
				Err(e) => {
					stage.set(None);
					failure.set(Some(e));
				}
			}
		});
	};

	let stages = move || {
		let (current, finished) = (stage.get(), verdict.with(Option::is_some));
		Stage::ALL
			.into_iter()
			.map(|s| {
				let class = match stage_status(current, finished, s) {
					StageStatus::Pending => "stage pending",
					StageStatus::Active => "stage active",
					StageStatus::Done => "stage done",
				};
				view! {
					<li class=class>
						<span class="stage-label">{s.label()}</span>
						<span class="stage-desc muted">{s.description()}</span>
					</li>
				}
			})
			.collect_view()
	};

	view! {
		<section class="identity-check card">
			<header class="card-header">
				<h2>"Identity Verification"</h2>
				<p class="muted">"Check a PAN against the soul-bound identity registry"</p>
			</header>
			<form on:submit=move |ev| {
				ev.prevent_default();
				run();
			}>
				<input
					type="text"
					class="pan-input mono"
					placeholder="ABCDE1234F"
					maxlength="10"
					disabled=move || running.get()
					prop:value=move || pan.get()
					on:input=move |ev| pan.set(event_target_value(&ev))
				/>
				<button type="submit" disabled=move || running.get() || pan.with(|p| p.trim().is_empty())>
					{move || if running.get() { "Verifying…" } else { "Verify" }}
				</button>
			</form>
			{move || failure.get().map(|e| view! { <p class="upload-error">{e.to_string()}</p> })}
			<Show when=move || running.get() || verdict.with(Option::is_some)>
				<ol class="stages">{stages}</ol>
			</Show>
			{move || verdict.get().map(|v| view! { <VerdictView verdict=v /> })}
		</section>
	}
}
