//! Leptos client-side app wiring and routes.
//!
//! Mule Radar is an anti-money-laundering dashboard: a transaction ledger is
//! uploaded to the detection backend, and the flagged entities come back as a
//! force-directed network, summary counters and a ledger. A separate flow
//! checks a PAN against the identity registry.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};
// Only linked for its `js` feature, which lets `rand` seed in the browser.
#[cfg(target_arch = "wasm32")]
use getrandom as _;

// Modules
mod api;
mod browser;
mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod fallback;
pub mod identity;
pub mod model;
mod pages;
pub mod state;
pub mod upload;

// Top-Level pages
use crate::config::AppConfig;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;
use crate::state::AppStore;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the dashboard and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	let config = AppConfig::from_build_env();
	info!("backend {} ({})", config.api_base_url, config.failure_policy);
	provide_context(config);
	provide_context(AppStore::new());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Mule Radar" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
