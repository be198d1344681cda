//! Services
//!
//! Client-side controllers for the create page and the community feed.
//! They talk to the backend and the generation API only through the
//! collaborator traits in `imagegen-core`.

pub mod create_session;
pub mod download;
pub mod events;
pub mod generation;
pub mod prompt;
pub mod recent;
pub mod search;
pub mod voice;

#[cfg(test)]
pub(crate) mod testing;

pub use create_session::CreateSession;
pub use download::{filename_from_url, DeviceSaver, FileSaver};
pub use events::{UiEvent, UiEventSender, UiNotifier};
pub use generation::{GenerationController, GenerationSettings, SubmitReport};
pub use prompt::{EditorMode, PromptEditor};
pub use recent::RecentCreations;
pub use search::{filter_posts, ListingView, ListingViewer, SearchController, SearchResults};
pub use voice::{LineRecognizer, UnavailableRecognizer, VoiceCapture, VoiceState};
