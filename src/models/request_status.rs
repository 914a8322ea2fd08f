use serde::Serialize;

use super::{Mode, Recommendation};

/// Lifecycle of the most recent recommendation request
///
/// A Success or Error value is kept for display until the next submission
/// moves the status back to Loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading {
        usernames_in_flight: Vec<String>,
    },
    Success {
        results: Vec<Recommendation>,
    },
    Error {
        message: String,
    },
}

impl RequestStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading { .. })
    }

    /// Results to render; empty for every phase but Success
    pub fn results(&self) -> &[Recommendation] {
        match self {
            RequestStatus::Success { results } => results,
            _ => &[],
        }
    }

    /// Progress line shown while a request is in flight
    pub fn loading_message(&self) -> Option<String> {
        match self {
            RequestStatus::Loading {
                usernames_in_flight,
            } => Some(format!(
                "Scraping data for {}. . .",
                usernames_in_flight.join(" and ")
            )),
            _ => None,
        }
    }

    /// Builds the Error status shown for any failed submission
    pub fn failed(mode: Mode) -> Self {
        RequestStatus::Error {
            message: error_message(mode).to_string(),
        }
    }
}

/// Generic failure text; only distinguishes one username from two
pub fn error_message(mode: Mode) -> &'static str {
    match mode {
        Mode::Solo => {
            "Error getting recommendations. Make sure the username is spelled correctly."
        }
        Mode::Blend => {
            "Error getting recommendations. Make sure both usernames are spelled correctly."
        }
    }
}
