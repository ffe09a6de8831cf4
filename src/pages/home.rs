use leptos::prelude::*;

use crate::pages::dashboard::Dashboard;
use crate::pages::landing::Landing;
use crate::state::{Screen, use_store};

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let store = use_store();
	let screen = Memo::new(move |_| store.with(|s| s.screen));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{move || match screen.get() {
				Screen::Landing => view! { <Landing /> }.into_any(),
				Screen::Dashboard => view! { <Dashboard /> }.into_any(),
			}}
		</ErrorBoundary>
	}
}
