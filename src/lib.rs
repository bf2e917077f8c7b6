//! # overlay-translate
//!
//! Selection-to-overlay translation for live HTML documents: scan the
//! selected subtree for text leaves, group them by nearest structural
//! ancestor, translate each group concurrently against the configured
//! provider, splice the results back in as interactive overlay hosts, and
//! drive the floating detail panel's hover/pin lifecycle.
//!
//! ## Module organization
//!
//! - `dom` - rcdom helpers and selection ranges
//! - `pipeline` - scanner, grouper, dispatcher, splicer
//! - `overlay` - overlay state machine, placement, detail panel
//! - `providers` - provider catalog, model pricing, cost math
//! - `backend` - translation backend trait and HTTP implementation
//! - `settings` - read-only settings collaborator
//! - `session` - "translate the current selection" entry points

pub mod backend;
pub mod dom;
pub mod error;
pub mod overlay;
pub mod pipeline;
pub mod providers;
pub mod session;
pub mod settings;

// Re-export commonly used items for convenience
pub use backend::{HttpBackend, Translation, TranslationBackend, Usage};
pub use dom::range::SelectionRange;
pub use error::{TranslateError, TranslateResult};
pub use overlay::{OverlayController, OverlayPhase, OverlayRegistry};
pub use pipeline::{AggregateResult, Dispatcher, TranslationOutcome, TranslationUnit};
pub use providers::Provider;
pub use session::{selected_text, translate_selection, SelectionTranslation};
pub use settings::{Settings, SettingsStore};
