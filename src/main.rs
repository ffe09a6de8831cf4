use mule_radar::{App, init_logging};

fn main() {
	init_logging();
	leptos::mount::mount_to_body(App)
}
