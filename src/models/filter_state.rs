use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Genre, Mode, PopularityTier};

/// Marker serialized for `popFilter` when no tier is selected.
/// The recommendation service treats it as "no popularity filter".
pub const UNSET_POP_FILTER: &str = "undefined";

/// Username slots; Blend uses both
pub const USERNAME_SLOTS: usize = 2;

/// A genre filter choice: a single genre, or "All" which clears the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreSelection {
    All,
    Genre(Genre),
}

impl From<Option<Genre>> for GenreSelection {
    fn from(genre: Option<Genre>) -> Self {
        match genre {
            Some(genre) => GenreSelection::Genre(genre),
            None => GenreSelection::All,
        }
    }
}

/// Filter selections for a recommendation request
///
/// Lives for the whole session and is mutated in place by the setters below.
/// None of the setters fail; inputs are already constrained to valid values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterState {
    pub mode: Mode,
    /// Slot 1 is only read in Blend mode but keeps its value across mode switches
    pub usernames: [String; USERNAME_SLOTS],
    pub exclude_watchlist: bool,
    pub popularity_tier: Option<PopularityTier>,
    pub genre_filters: BTreeSet<Genre>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    /// Session defaults: Solo, watchlist excluded, no filters
    pub fn new() -> Self {
        Self {
            mode: Mode::Solo,
            usernames: [String::new(), String::new()],
            exclude_watchlist: true,
            popularity_tier: None,
            genre_filters: BTreeSet::new(),
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Stores a trimmed, lower-cased username in slot 0 or 1.
    /// Returns false, changing nothing, when there is no such slot.
    pub fn set_username(&mut self, index: usize, value: &str) -> bool {
        match self.usernames.get_mut(index) {
            Some(slot) => {
                *slot = value.trim().to_lowercase();
                true
            }
            None => false,
        }
    }

    pub fn set_exclude_watchlist(&mut self, exclude: bool) {
        self.exclude_watchlist = exclude;
    }

    /// Selects `tier`, or clears the filter if it is already active.
    /// `None` always clears.
    pub fn toggle_popularity_tier(&mut self, tier: Option<PopularityTier>) {
        self.popularity_tier = match tier {
            Some(tier) if self.popularity_tier != Some(tier) => Some(tier),
            _ => None,
        };
    }

    /// Adds or removes a genre; `GenreSelection::All` empties the filter
    pub fn toggle_genre(&mut self, selection: impl Into<GenreSelection>) {
        match selection.into() {
            GenreSelection::All => self.genre_filters.clear(),
            GenreSelection::Genre(genre) => {
                if !self.genre_filters.remove(&genre) {
                    self.genre_filters.insert(genre);
                }
            }
        }
    }

    /// Usernames the current mode submits, in slot order
    pub fn active_usernames(&self) -> &[String] {
        &self.usernames[..self.mode.required_usernames()]
    }

    /// Builds the outbound query from the current selections
    pub fn snapshot(&self) -> RecommendationQuery {
        RecommendationQuery {
            users: self.active_usernames().to_vec(),
            exclude_watchlist: self.exclude_watchlist,
            popularity_tier: self.popularity_tier,
            genres: self.genre_filters.iter().copied().collect(),
        }
    }
}

impl From<Genre> for GenreSelection {
    fn from(genre: Genre) -> Self {
        GenreSelection::Genre(genre)
    }
}

/// Snapshot of a FilterState in the shape the recommendation service expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub users: Vec<String>,
    pub exclude_watchlist: bool,
    pub popularity_tier: Option<PopularityTier>,
    /// Vocabulary order
    pub genres: Vec<Genre>,
}

impl RecommendationQuery {
    /// Renders the query string, e.g.
    /// `users=alice,bob&excludeWatchlist=true&popFilter=2&genreFilters=Drama,Horror`
    ///
    /// Each username and genre is percent-encoded; the separating commas stay literal.
    pub fn to_query_string(&self) -> String {
        let pop_filter = self
            .popularity_tier
            .map(|tier| tier.as_str())
            .unwrap_or(UNSET_POP_FILTER);
        let genres = self
            .genres
            .iter()
            .map(|genre| urlencoding::encode(genre.name()))
            .collect::<Vec<_>>()
            .join(",");
        let users = self
            .users
            .iter()
            .map(|user| urlencoding::encode(user))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "users={}&excludeWatchlist={}&popFilter={}&genreFilters={}",
            users,
            self.exclude_watchlist,
            pop_filter,
            genres
        )
    }
}
