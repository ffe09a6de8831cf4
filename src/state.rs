//! Application state and its reducer.
//!
//! All mutation goes through [`AppState::reduce`]; components dispatch
//! [`AppEvent`]s through the [`AppStore`] found in context.

use leptos::prelude::*;
use log::debug;

use crate::error::UploadError;
use crate::model::{DetectionResult, Entity, GraphData, Summary};
use crate::upload::{DetectionPayload, Provenance, UploadOutcome};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Screen {
	#[default]
	Landing,
	Dashboard,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Section {
	#[default]
	Dashboard,
	Disruption,
	Kyc,
	Transactions,
}

/// What a section actually renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
	Overview,
	IdentityCheck,
}

impl Section {
	pub const ALL: [Section; 4] = [
		Section::Dashboard,
		Section::Disruption,
		Section::Kyc,
		Section::Transactions,
	];

	pub fn label(self) -> &'static str {
		match self {
			Self::Dashboard => "Dashboard",
			Self::Disruption => "Active Disruption",
			Self::Kyc => "KYC Verify",
			Self::Transactions => "Blockchain Audit",
		}
	}

	/// Disruption and transactions have no panel of their own yet and show
	/// the overview.
	pub fn panel(self) -> Panel {
		match self {
			Self::Kyc => Panel::IdentityCheck,
			_ => Panel::Overview,
		}
	}
}

/// Last successfully received detection result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultStore {
	pub payload: Option<DetectionPayload>,
	/// Set when the payload is synthesized demo data.
	pub demo: bool,
}

impl ResultStore {
	fn result(&self) -> Option<&DetectionResult> {
		self.payload.as_ref().map(|p| &p.result)
	}

	pub fn has_result(&self) -> bool {
		self.payload.is_some()
	}

	pub fn graph(&self) -> GraphData {
		self.result().map(|r| r.graph.clone()).unwrap_or_default()
	}

	pub fn mules(&self) -> Vec<Entity> {
		self.result().map(|r| r.mules.clone()).unwrap_or_default()
	}

	pub fn summary(&self) -> Option<Summary> {
		self.result().and_then(|r| r.summary.clone())
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadStatus {
	/// Increases with every started upload; completions for older values are dropped.
	pub generation: u64,
	pub in_flight: bool,
	pub file_name: Option<String>,
	pub error: Option<UploadError>,
	/// Non-blocking message, e.g. that demo data was substituted.
	pub notice: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
	pub screen: Screen,
	pub section: Section,
	pub results: ResultStore,
	pub selection: Option<Entity>,
	pub upload: UploadStatus,
}

#[derive(Clone, Debug)]
pub enum AppEvent {
	UploadStarted { file_name: String },
	/// Screening refused the file; nothing was sent.
	UploadRejected(UploadError),
	UploadFinished {
		generation: u64,
		outcome: Result<UploadOutcome, UploadError>,
	},
	EntitySelected(Entity),
	SectionChanged(Section),
	ReturnHome,
	/// Back to the dashboard with whatever result is already stored.
	ResumeDashboard,
	OpenIdentityCheck,
}

impl AppState {
	pub fn reduce(mut self, event: AppEvent) -> Self {
		match event {
			AppEvent::UploadStarted { file_name } => {
				self.upload.generation += 1;
				self.upload.in_flight = true;
				self.upload.file_name = Some(file_name);
				self.upload.error = None;
				self.upload.notice = None;
			}
			AppEvent::UploadRejected(error) => {
				self.upload.error = Some(error);
			}
			AppEvent::UploadFinished { generation, .. } if generation != self.upload.generation => {
				debug!("dropping stale upload result {generation} (current {})", self.upload.generation);
			}
			AppEvent::UploadFinished { outcome: Err(error), .. } => {
				self.upload.in_flight = false;
				self.upload.error = Some(error);
			}
			AppEvent::UploadFinished { outcome: Ok(outcome), .. } => {
				self.upload.in_flight = false;
				self.upload.error = None;
				self.upload.notice = match &outcome.provenance {
					Provenance::Backend => None,
					Provenance::Fallback { reason } => Some(format!("{reason}. Showing demo data.")),
				};
				self.selection = outcome.payload.result.mules.first().cloned();
				self.results = ResultStore {
					demo: outcome.is_fallback(),
					payload: Some(outcome.payload),
				};
				self.screen = Screen::Dashboard;
			}
			AppEvent::EntitySelected(entity) => {
				self.selection = Some(entity);
			}
			AppEvent::SectionChanged(section) => {
				self.section = section;
			}
			AppEvent::ReturnHome => {
				self.screen = Screen::Landing;
				self.selection = None;
			}
			AppEvent::ResumeDashboard => {
				if self.results.has_result() {
					self.screen = Screen::Dashboard;
				}
			}
			AppEvent::OpenIdentityCheck => {
				self.screen = Screen::Dashboard;
				self.section = Section::Kyc;
			}
		}
		self
	}

	pub fn is_busy(&self) -> bool {
		self.upload.in_flight
	}
}

/// Reactive handle on the [`AppState`], provided at the app root.
#[derive(Clone, Copy)]
pub struct AppStore(RwSignal<AppState>);

impl Default for AppStore {
	fn default() -> Self {
		Self::new()
	}
}

impl AppStore {
	pub fn new() -> Self {
		Self(RwSignal::new(AppState::default()))
	}

	pub fn dispatch(&self, event: AppEvent) {
		self.0.update(|state| *state = std::mem::take(state).reduce(event));
	}

	/// Start an upload and return the generation its completion must carry.
	pub fn begin_upload(&self, file_name: String) -> u64 {
		self.dispatch(AppEvent::UploadStarted { file_name });
		self.0.with_untracked(|s| s.upload.generation)
	}

	pub fn with<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
		self.0.with(f)
	}
}

pub fn use_store() -> AppStore {
	expect_context::<AppStore>()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::EntityCategory;
	use crate::upload::tests::sample_payload;

	fn backend_outcome() -> UploadOutcome {
		UploadOutcome {
			payload: DetectionPayload::from_raw(sample_payload()).unwrap(),
			provenance: Provenance::Backend,
		}
	}

	fn uploaded() -> AppState {
		let state = AppState::default().reduce(AppEvent::UploadStarted { file_name: "tx.csv".into() });
		let generation = state.upload.generation;
		state.reduce(AppEvent::UploadFinished { generation, outcome: Ok(backend_outcome()) })
	}

	#[test]
	fn successful_upload_enters_dashboard_and_selects_first_flagged() {
		let state = uploaded();
		assert_eq!(state.screen, Screen::Dashboard);
		assert!(!state.is_busy());
		assert_eq!(state.results.graph().nodes.len(), 3);
		assert_eq!(state.selection.as_ref().map(|e| e.id.as_str()), Some("ACC-7"));
		assert!(!state.results.demo);
		assert_eq!(state.upload.notice, None);
	}

	#[test]
	fn empty_flagged_list_leaves_nothing_selected() {
		let mut outcome = backend_outcome();
		outcome.payload.result.mules.clear();
		let state = AppState::default()
			.reduce(AppEvent::EntitySelected(Entity::default()))
			.reduce(AppEvent::UploadStarted { file_name: "tx.csv".into() })
			.reduce(AppEvent::UploadFinished { generation: 1, outcome: Ok(outcome) });
		assert_eq!(state.selection, None);
	}

	#[test]
	fn rejection_keeps_previous_results() {
		let before = uploaded();
		let after = before.clone().reduce(AppEvent::UploadRejected(UploadError::SpeedAnomaly));
		assert_eq!(after.results, before.results);
		assert_eq!(after.selection, before.selection);
		assert_eq!(after.upload.error, Some(UploadError::SpeedAnomaly));
	}

	#[test]
	fn failed_upload_keeps_previous_results() {
		let before = uploaded();
		let started = before.clone().reduce(AppEvent::UploadStarted { file_name: "b.csv".into() });
		let generation = started.upload.generation;
		let failed = started.reduce(AppEvent::UploadFinished {
			generation,
			outcome: Err(UploadError::Transport("refused".into())),
		});
		assert_eq!(failed.results, before.results);
		assert_eq!(failed.selection, before.selection);
		assert!(!failed.is_busy());
		assert!(failed.upload.error.is_some());
	}

	#[test]
	fn stale_completion_is_discarded() {
		let first = AppState::default().reduce(AppEvent::UploadStarted { file_name: "a.csv".into() });
		let stale_generation = first.upload.generation;
		let second = first.reduce(AppEvent::UploadStarted { file_name: "b.csv".into() });

		let after_stale = second.clone().reduce(AppEvent::UploadFinished {
			generation: stale_generation,
			outcome: Ok(backend_outcome()),
		});
		assert_eq!(after_stale, second);
		assert!(after_stale.is_busy());
		assert_eq!(after_stale.screen, Screen::Landing);
	}

	#[test]
	fn fallback_outcome_is_marked_as_demo() {
		let state = AppState::default().reduce(AppEvent::UploadStarted { file_name: "a.csv".into() });
		let state = state.reduce(AppEvent::UploadFinished {
			generation: 1,
			outcome: Ok(UploadOutcome {
				payload: DetectionPayload::from_raw(sample_payload()).unwrap(),
				provenance: Provenance::Fallback { reason: UploadError::Transport("refused".into()) },
			}),
		});
		assert!(state.results.demo);
		assert_eq!(
			state.upload.notice.as_deref(),
			Some("Backend connection failed: refused. Showing demo data.")
		);
	}

	#[test]
	fn return_home_clears_selection_but_keeps_results() {
		let dashboard = uploaded();
		let home = dashboard.clone().reduce(AppEvent::ReturnHome);
		assert_eq!(home.screen, Screen::Landing);
		assert_eq!(home.selection, None);
		assert_eq!(home.results, dashboard.results);

		let back = home.reduce(AppEvent::ResumeDashboard);
		assert_eq!(back.screen, Screen::Dashboard);
		assert_eq!(back.results.summary(), dashboard.results.summary());
		assert_eq!(back.results.graph(), dashboard.results.graph());
	}

	#[test]
	fn resume_without_results_stays_on_landing() {
		let state = AppState::default().reduce(AppEvent::ResumeDashboard);
		assert_eq!(state.screen, Screen::Landing);
	}

	#[test]
	fn sections_switch_without_leaving_the_dashboard() {
		let state = uploaded().reduce(AppEvent::SectionChanged(Section::Transactions));
		assert_eq!(state.screen, Screen::Dashboard);
		assert_eq!(state.section.panel(), Panel::Overview);
		let state = state.reduce(AppEvent::SectionChanged(Section::Kyc));
		assert_eq!(state.section.panel(), Panel::IdentityCheck);
		assert_eq!(state.screen, Screen::Dashboard);
	}

	#[test]
	fn identity_shortcut_opens_kyc_section() {
		let state = AppState::default().reduce(AppEvent::OpenIdentityCheck);
		assert_eq!((state.screen, state.section), (Screen::Dashboard, Section::Kyc));
		assert!(!state.results.has_result());
	}

	#[test]
	fn picking_an_entity_replaces_the_selection() {
		let state = uploaded();
		let pick = state.results.graph().nodes[2].clone();
		let state = state.reduce(AppEvent::EntitySelected(pick));
		let selected = state.selection.unwrap();
		assert_eq!(selected.id, "ACC-1");
		assert_eq!(selected.category, EntityCategory::Normal);
	}
}
