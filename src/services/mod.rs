pub mod controller;
pub mod providers;

pub use controller::{RequestController, SubmitOutcome};
pub use providers::{LetterboxdRecsProvider, RecommendationProvider};
