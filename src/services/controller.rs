use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    error::{AppError, AppResult},
    models::{FilterState, Mode, Recommendation, RequestStatus},
    services::providers::RecommendationProvider,
};

/// What a call to [`RequestController::submit`] ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another request was already loading; nothing was sent
    Ignored,
    Success(Vec<Recommendation>),
    /// Validation or request failure, carrying the user-facing message
    Failed(String),
}

/// Owns the request status slot and drives one recommendation request at a time
///
/// Admission is decided by a check-and-set on the status slot: a submit that
/// finds the status Loading is dropped, so at most one request is in flight and
/// a stale response can never overwrite a newer one.
pub struct RequestController {
    provider: Arc<dyn RecommendationProvider>,
    status: Arc<watch::Sender<RequestStatus>>,
}

impl RequestController {
    pub fn new(provider: Arc<dyn RecommendationProvider>) -> Self {
        let (status, _) = watch::channel(RequestStatus::Idle);
        Self {
            provider,
            status: Arc::new(status),
        }
    }

    /// Current status
    pub fn status(&self) -> RequestStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status transition
    pub fn subscribe(&self) -> watch::Receiver<RequestStatus> {
        self.status.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.status.borrow().is_loading()
    }

    /// Requires a username per slot the mode uses
    fn validate(state: &FilterState) -> AppResult<()> {
        let missing = state
            .active_usernames()
            .iter()
            .any(|username| username.trim().is_empty());

        if missing {
            let wanted = match state.mode {
                Mode::Solo => "a username",
                Mode::Blend => "two usernames",
            };
            return Err(AppError::Validation(format!("{:?} mode needs {}", state.mode, wanted)));
        }

        Ok(())
    }

    /// Validates `state`, issues one request for it and publishes the result
    ///
    /// Failures of any kind end in `RequestStatus::Error` with a generic message;
    /// the detail is only logged.
    pub async fn submit(&self, state: &FilterState) -> SubmitOutcome {
        let mode = state.mode;
        let query = state.snapshot();
        let validation = Self::validate(state);

        let mut admitted = false;
        self.status.send_if_modified(|status| {
            if status.is_loading() {
                return false;
            }
            admitted = true;
            *status = match &validation {
                Ok(()) => RequestStatus::Loading {
                    usernames_in_flight: query.users.clone(),
                },
                Err(_) => RequestStatus::failed(mode),
            };
            true
        });

        if !admitted {
            tracing::debug!(users = %query.users.join(","), "Submit ignored, request already in flight");
            return SubmitOutcome::Ignored;
        }

        if let Err(e) = validation {
            tracing::warn!(error = %e, "Submit rejected");
            return Self::failure(mode);
        }

        tracing::info!(
            users = %query.users.join(","),
            provider = self.provider.name(),
            "Submitting recommendation request"
        );

        // The request and the publish of its result run detached, so dropping
        // this future (e.g. a client disconnect) never strands the slot in Loading
        let provider = Arc::clone(&self.provider);
        let status = Arc::clone(&self.status);
        let request = tokio::spawn(async move {
            match provider.fetch(&query).await {
                Ok(results) => {
                    status.send_replace(RequestStatus::Success {
                        results: results.clone(),
                    });
                    SubmitOutcome::Success(results)
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        users = %query.users.join(","),
                        "Recommendation request failed"
                    );
                    status.send_replace(RequestStatus::failed(mode));
                    Self::failure(mode)
                }
            }
        });

        match request.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Recommendation task failed");
                self.status.send_replace(RequestStatus::failed(mode));
                Self::failure(mode)
            }
        }
    }

    fn failure(mode: Mode) -> SubmitOutcome {
        SubmitOutcome::Failed(crate::models::request_status::error_message(mode).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Genre, PopularityTier};
    use crate::services::providers::MockRecommendationProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio_test::{assert_pending, assert_ready, assert_ready_eq, task};

    fn parasite() -> Recommendation {
        Recommendation {
            title: "Parasite".to_string(),
            link: "https://x/parasite".to_string(),
        }
    }

    fn solo_state(username: &str) -> FilterState {
        let mut state = FilterState::new();
        state.set_username(0, username);
        state
    }

    fn controller_with(mock: MockRecommendationProvider) -> RequestController {
        RequestController::new(Arc::new(mock))
    }

    fn mock_without_calls() -> MockRecommendationProvider {
        let mut mock = MockRecommendationProvider::new();
        mock.expect_fetch().never();
        mock.expect_name().return_const("mock");
        mock
    }

    /// Provider that blocks until released, counting calls
    struct GatedProvider {
        calls: AtomicUsize,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl RecommendationProvider for GatedProvider {
        async fn fetch(
            &self,
            _query: &crate::models::RecommendationQuery,
        ) -> AppResult<Vec<Recommendation>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(vec![parasite()])
        }

        fn name(&self) -> &'static str {
            "gated"
        }
    }

    #[tokio::test]
    async fn test_solo_empty_username_sends_nothing() {
        let controller = controller_with(mock_without_calls());

        let outcome = controller.submit(&solo_state("   ")).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(ref msg) if msg.contains("the username")));
        assert_eq!(controller.status(), RequestStatus::failed(Mode::Solo));
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_blend_missing_second_username_sends_nothing() {
        let controller = controller_with(mock_without_calls());
        let mut state = solo_state("alice");
        state.set_mode(Mode::Blend);

        let outcome = controller.submit(&state).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(ref msg) if msg.contains("both usernames")));
        assert!(controller.status().results().is_empty());
    }

    #[tokio::test]
    async fn test_blend_missing_first_username_sends_nothing() {
        let controller = controller_with(mock_without_calls());
        let mut state = FilterState::new();
        state.set_mode(Mode::Blend);
        state.set_username(1, "bob");

        let outcome = controller.submit(&state).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_solo_ignores_stale_second_username() {
        let mut mock = MockRecommendationProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch()
            .withf(|query| query.users == vec!["alice".to_string()])
            .times(1)
            .returning(|_| Ok(vec![]));
        let controller = controller_with(mock);

        let mut state = FilterState::new();
        state.set_mode(Mode::Blend);
        state.set_username(0, "alice");
        state.set_username(1, "bob");
        state.set_mode(Mode::Solo);

        let outcome = controller.submit(&state).await;
        assert_eq!(outcome, SubmitOutcome::Success(vec![]));
    }

    #[tokio::test]
    async fn test_success_publishes_results() {
        let mut mock = MockRecommendationProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch()
            .withf(|query| {
                query.to_query_string()
                    == "users=alice,bob&excludeWatchlist=true&popFilter=2&genreFilters=Drama,Horror"
            })
            .times(1)
            .returning(|_| Ok(vec![parasite()]));
        let controller = controller_with(mock);
        let mut updates = controller.subscribe();

        let mut state = FilterState::new();
        state.set_mode(Mode::Blend);
        state.set_username(0, "Alice");
        state.set_username(1, "bob");
        state.toggle_popularity_tier(Some(PopularityTier::Tier2));
        state.toggle_genre(Genre::Horror);
        state.toggle_genre(Genre::Drama);

        let outcome = controller.submit(&state).await;

        assert_eq!(outcome, SubmitOutcome::Success(vec![parasite()]));
        assert!(!controller.is_loading());
        assert!(updates.has_changed().unwrap());
        assert_eq!(
            *updates.borrow_and_update(),
            RequestStatus::Success {
                results: vec![parasite()]
            }
        );
    }

    #[tokio::test]
    async fn test_request_failure_maps_to_error() {
        let mut mock = MockRecommendationProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch()
            .times(1)
            .returning(|_| Err(AppError::ExternalApi("connection refused".to_string())));
        let controller = controller_with(mock);

        let outcome = controller.submit(&solo_state("alice")).await;

        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert_eq!(controller.status(), RequestStatus::failed(Mode::Solo));
        assert!(controller.status().results().is_empty());
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_new_submit_replaces_previous_error() {
        let mut mock = MockRecommendationProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch().times(1).returning(|_| Ok(vec![parasite()]));
        let controller = controller_with(mock);

        controller.submit(&solo_state("")).await;
        assert!(matches!(controller.status(), RequestStatus::Error { .. }));

        controller.submit(&solo_state("alice")).await;
        assert_eq!(controller.status().results(), [parasite()]);
    }

    fn gated_provider() -> Arc<GatedProvider> {
        Arc::new(GatedProvider {
            calls: AtomicUsize::new(0),
            release: Notify::new(),
        })
    }

    #[tokio::test]
    async fn test_submit_while_loading_is_ignored() {
        let provider = gated_provider();
        let controller = RequestController::new(provider.clone());
        let state = solo_state("alice");

        let mut first = task::spawn(controller.submit(&state));
        assert_pending!(first.poll());
        assert_eq!(
            controller.status(),
            RequestStatus::Loading {
                usernames_in_flight: vec!["alice".to_string()]
            }
        );

        // Invalid input is ignored too, without touching the in-flight status
        let empty = solo_state("");
        let mut second = task::spawn(controller.submit(&empty));
        assert_ready_eq!(second.poll(), SubmitOutcome::Ignored);
        let mut third = task::spawn(controller.submit(&state));
        assert_ready_eq!(third.poll(), SubmitOutcome::Ignored);
        assert!(controller.is_loading());

        provider.release.notify_one();
        controller
            .subscribe()
            .wait_for(|status| !status.is_loading())
            .await
            .unwrap();
        let outcome = assert_ready!(first.poll());

        assert_eq!(outcome, SubmitOutcome::Success(vec![parasite()]));
        assert_eq!(controller.status().results(), [parasite()]);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_submit_still_publishes_result() {
        let provider = gated_provider();
        let controller = RequestController::new(provider.clone());
        let state = solo_state("alice");

        let mut abandoned = task::spawn(controller.submit(&state));
        assert_pending!(abandoned.poll());
        drop(abandoned);
        assert!(controller.is_loading());

        provider.release.notify_one();
        controller
            .subscribe()
            .wait_for(|status| !status.is_loading())
            .await
            .unwrap();
        assert_eq!(controller.status().results(), [parasite()]);

        // The slot is free again for the next submission
        provider.release.notify_one();
        let outcome = controller.submit(&state).await;
        assert_eq!(outcome, SubmitOutcome::Success(vec![parasite()]));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
