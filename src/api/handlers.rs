use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::models::{
    filter_state::USERNAME_SLOTS, FilterState, Genre, GenreSelection, Mode, PopularityTier,
    RequestStatus,
};
use crate::services::SubmitOutcome;

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SetModeRequest {
    pub mode: Mode,
}

#[derive(Debug, Deserialize)]
pub struct SetUsernameRequest {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SetExcludeWatchlistRequest {
    pub exclude_watchlist: bool,
}

/// `null` clears the popularity filter
#[derive(Debug, Deserialize)]
pub struct TogglePopularityRequest {
    pub tier: Option<String>,
}

/// `null` selects "All", clearing the genre filter
#[derive(Debug, Deserialize)]
pub struct ToggleGenreRequest {
    pub genre: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenreResponse {
    pub name: &'static str,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct PopularityResponse {
    pub id: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Request status plus the progress line to show while loading
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loading_message: Option<String>,
}

impl From<RequestStatus> for StatusResponse {
    fn from(status: RequestStatus) -> Self {
        Self {
            loading_message: status.loading_message(),
            status,
        }
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Get the current filter selections
pub async fn get_filters(State(state): State<AppState>) -> Json<FilterState> {
    let inner = state.inner.read().await;
    Json(inner.filters.clone())
}

/// Switch between Solo and Blend
pub async fn set_mode(
    State(state): State<AppState>,
    Json(request): Json<SetModeRequest>,
) -> Json<FilterState> {
    let mut inner = state.inner.write().await;
    inner.filters.set_mode(request.mode);
    Json(inner.filters.clone())
}

/// Set the username in slot 0 or 1
pub async fn set_username(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<SetUsernameRequest>,
) -> AppResult<Json<FilterState>> {
    let mut inner = state.inner.write().await;
    if !inner.filters.set_username(index, &request.username) {
        return Err(AppError::InvalidInput(format!(
            "Username index {} out of range, expected 0..{}",
            index, USERNAME_SLOTS
        )));
    }
    Ok(Json(inner.filters.clone()))
}

pub async fn set_exclude_watchlist(
    State(state): State<AppState>,
    Json(request): Json<SetExcludeWatchlistRequest>,
) -> Json<FilterState> {
    let mut inner = state.inner.write().await;
    inner.filters.set_exclude_watchlist(request.exclude_watchlist);
    Json(inner.filters.clone())
}

/// Toggle a popularity tier
pub async fn toggle_popularity(
    State(state): State<AppState>,
    Json(request): Json<TogglePopularityRequest>,
) -> AppResult<Json<FilterState>> {
    let tier = request
        .tier
        .as_deref()
        .map(str::parse::<PopularityTier>)
        .transpose()?;

    let mut inner = state.inner.write().await;
    inner.filters.toggle_popularity_tier(tier);
    Ok(Json(inner.filters.clone()))
}

/// Toggle a genre, or clear all genres
pub async fn toggle_genre(
    State(state): State<AppState>,
    Json(request): Json<ToggleGenreRequest>,
) -> AppResult<Json<FilterState>> {
    let selection = match request.genre.as_deref() {
        None => GenreSelection::All,
        Some(name) => GenreSelection::Genre(name.parse::<Genre>()?),
    };

    let mut inner = state.inner.write().await;
    inner.filters.toggle_genre(selection);
    Ok(Json(inner.filters.clone()))
}

/// Genre vocabulary in display order, with the session's selections
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<GenreResponse>> {
    let inner = state.inner.read().await;
    let genres = Genre::ALL
        .iter()
        .map(|genre| GenreResponse {
            name: genre.name(),
            selected: inner.filters.genre_filters.contains(genre),
        })
        .collect();
    Json(genres)
}

/// Popularity tiers with their labels and the session's selection
pub async fn list_popularity(State(state): State<AppState>) -> Json<Vec<PopularityResponse>> {
    let inner = state.inner.read().await;
    let tiers = PopularityTier::ALL
        .iter()
        .map(|tier| PopularityResponse {
            id: tier.as_str(),
            label: tier.label(),
            selected: inner.filters.popularity_tier == Some(*tier),
        })
        .collect();
    Json(tiers)
}

/// Get the status of the latest recommendation request
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(state.controller.status().into())
}

/// Submit the current filters
///
/// Failures are reported in the returned status, not as HTTP errors.
/// Returns 409 with the in-flight status when a request is already loading.
pub async fn submit(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> (StatusCode, Json<StatusResponse>) {
    // Snapshot so the lock is not held across the outbound request
    let filters = state.inner.read().await.filters.clone();
    tracing::info!(request_id = %request_id, mode = ?filters.mode, "Submit received");

    match state.controller.submit(&filters).await {
        SubmitOutcome::Ignored => (StatusCode::CONFLICT, Json(state.controller.status().into())),
        SubmitOutcome::Success(results) => {
            (StatusCode::OK, Json(RequestStatus::Success { results }.into()))
        }
        SubmitOutcome::Failed(message) => {
            (StatusCode::OK, Json(RequestStatus::Error { message }.into()))
        }
    }
}
