/// HTTP provider for the Letterboxd recommendation service
///
/// API Flow:
/// GET {base}/api/?users=a,b&excludeWatchlist=true&popFilter=2&genreFilters=Drama,Horror
/// → JSON array of `{ "Film": ..., "Link": ... }`
use crate::{
    error::{AppError, AppResult},
    models::{Recommendation, RecommendationQuery},
    services::providers::RecommendationProvider,
};
use reqwest::{Client as HttpClient, Url};

const API_PATH: &str = "api/";

#[derive(Clone)]
pub struct LetterboxdRecsProvider {
    http_client: HttpClient,
    api_url: Url,
}

impl LetterboxdRecsProvider {
    /// Creates a provider for the service rooted at `base_url`
    pub fn new(base_url: &str) -> AppResult<Self> {
        let api_url = Self::endpoint(base_url)?;
        tracing::info!(endpoint = %api_url, "Configured recommendation service");

        Ok(Self {
            http_client: HttpClient::new(),
            api_url,
        })
    }

    fn endpoint(base_url: &str) -> AppResult<Url> {
        let mut base = Url::parse(base_url).map_err(|e| {
            AppError::InvalidInput(format!("Invalid recommendation service URL {}: {}", base_url, e))
        })?;

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        base.join(API_PATH)
            .map_err(|e| AppError::Internal(format!("Failed to build endpoint URL: {}", e)))
    }

    /// Full request URL. The query arrives already encoded per value, so it is
    /// set as-is to keep the list-separating commas literal.
    fn request_url(&self, query: &RecommendationQuery) -> Url {
        let mut url = self.api_url.clone();
        url.set_query(Some(&query.to_query_string()));
        url
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for LetterboxdRecsProvider {
    async fn fetch(&self, query: &RecommendationQuery) -> AppResult<Vec<Recommendation>> {
        let url = self.request_url(query);
        tracing::debug!(url = %url, "Requesting recommendations");

        let response = self.http_client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Recommendation service returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        let recommendations: Vec<Recommendation> = serde_json::from_str(&response_text)
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    response = %response_text,
                    "Failed to deserialize recommendation response"
                );
                AppError::ExternalApi(format!("Failed to parse recommendation response: {}", e))
            })?;

        tracing::info!(
            users = %query.users.join(","),
            results = recommendations.len(),
            provider = self.name(),
            "Recommendations fetched"
        );

        Ok(recommendations)
    }

    fn name(&self) -> &'static str {
        "letterboxd_recs"
    }
}
