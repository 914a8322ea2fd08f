use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

pub mod filter_state;
pub mod request_status;

pub use filter_state::{FilterState, GenreSelection, RecommendationQuery};
pub use request_status::RequestStatus;

/// Whether recommendations are requested for one user or blended for two
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Solo,
    Blend,
}

impl Mode {
    /// Number of usernames a submission needs in this mode
    pub fn required_usernames(&self) -> usize {
        match self {
            Mode::Solo => 1,
            Mode::Blend => 2,
        }
    }
}

/// Popularity filter, each tier narrowing to less mainstream films
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopularityTier {
    #[serde(rename = "1")]
    Tier1,
    #[serde(rename = "2")]
    Tier2,
    #[serde(rename = "3")]
    Tier3,
}

impl PopularityTier {
    pub const ALL: [PopularityTier; 3] = [
        PopularityTier::Tier1,
        PopularityTier::Tier2,
        PopularityTier::Tier3,
    ];

    /// Identifier sent as `popFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            PopularityTier::Tier1 => "1",
            PopularityTier::Tier2 => "2",
            PopularityTier::Tier3 => "3",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PopularityTier::Tier1 => "Lesser Known Films",
            PopularityTier::Tier2 => "Even Lesser Known Films",
            PopularityTier::Tier3 => "Unknown Films",
        }
    }
}

impl Display for PopularityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PopularityTier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(PopularityTier::Tier1),
            "2" => Ok(PopularityTier::Tier2),
            "3" => Ok(PopularityTier::Tier3),
            other => Err(AppError::InvalidInput(format!(
                "Unknown popularity tier: {}",
                other
            ))),
        }
    }
}

/// Closed genre vocabulary. Variant order is display order, so `Ord` sorts
/// genres the way the filter list shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Family,
    Fantasy,
    History,
    Horror,
    Music,
    Mystery,
    Romance,
    #[serde(rename = "Science Fiction")]
    ScienceFiction,
    Thriller,
    #[serde(rename = "TV Movie")]
    TvMovie,
    War,
    Western,
}

impl Genre {
    pub const ALL: [Genre; 19] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Family,
        Genre::Fantasy,
        Genre::History,
        Genre::Horror,
        Genre::Music,
        Genre::Mystery,
        Genre::Romance,
        Genre::ScienceFiction,
        Genre::Thriller,
        Genre::TvMovie,
        Genre::War,
        Genre::Western,
    ];

    /// Name as the recommendation service expects it
    pub fn name(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Family => "Family",
            Genre::Fantasy => "Fantasy",
            Genre::History => "History",
            Genre::Horror => "Horror",
            Genre::Music => "Music",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::ScienceFiction => "Science Fiction",
            Genre::Thriller => "Thriller",
            Genre::TvMovie => "TV Movie",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Genre {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Genre::ALL
            .iter()
            .find(|g| g.name().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown genre: {}", wanted)))
    }
}

/// A single recommended film as returned by the recommendation service
///
/// `link` points at the film's Letterboxd page and uniquely identifies the entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    #[serde(rename = "Film")]
    pub title: String,
    #[serde(rename = "Link")]
    pub link: String,
}
