/// Recommendation data provider abstraction
///
/// The controller only talks to the recommendation service through this trait,
/// so tests can swap the HTTP provider for a mock.
use crate::{
    error::AppResult,
    models::{Recommendation, RecommendationQuery},
};

pub mod letterboxd_recs;

pub use letterboxd_recs::LetterboxdRecsProvider;

/// Trait for recommendation providers
///
/// One call is one outbound request. Implementations must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Fetch recommendations for the given query, preserving the service's order
    async fn fetch(&self, query: &RecommendationQuery) -> AppResult<Vec<Recommendation>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
