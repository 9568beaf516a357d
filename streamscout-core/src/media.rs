//! Media query model shared by the validator, the resolver and providers.

use serde::{Deserialize, Serialize};

/// A validated request for streams of one movie or one episode.
///
/// Serializes to the flat JSON shape scrapers expect:
/// `{"type":"show","title":..,"releaseYear":..,"tmdbId":..,"season":{..},"episode":{..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaQuery {
    #[serde(flatten)]
    pub kind: MediaKind,
    pub title: String,
    #[serde(rename = "releaseYear")]
    pub release_year: u16,
    #[serde(rename = "tmdbId")]
    pub tmdb_id: String,
    #[serde(rename = "imdbId", default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
}

/// Movie or episode. Season and episode exist only for shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show {
        season: SeasonRef,
        episode: EpisodeRef,
    },
}

/// Season of a show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRef {
    pub number: u32,
    #[serde(rename = "tmdbId")]
    pub tmdb_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Episode within a season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub number: u32,
    #[serde(rename = "tmdbId")]
    pub tmdb_id: String,
}

impl MediaQuery {
    /// Creates a movie query.
    pub fn movie(title: impl Into<String>, release_year: u16, tmdb_id: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Movie,
            title: title.into(),
            release_year,
            tmdb_id: tmdb_id.into(),
            imdb_id: None,
        }
    }

    /// Creates an episode query.
    pub fn episode(
        title: impl Into<String>,
        release_year: u16,
        tmdb_id: impl Into<String>,
        season: SeasonRef,
        episode: EpisodeRef,
    ) -> Self {
        Self {
            kind: MediaKind::Show { season, episode },
            title: title.into(),
            release_year,
            tmdb_id: tmdb_id.into(),
            imdb_id: None,
        }
    }

    /// Check if this query targets a show episode.
    pub fn is_show(&self) -> bool {
        matches!(self.kind, MediaKind::Show { .. })
    }

    /// Wire name of the media type, `movie` or `show`.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            MediaKind::Movie => "movie",
            MediaKind::Show { .. } => "show",
        }
    }
}

impl std::fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            MediaKind::Movie => write!(f, "{} ({})", self.title, self.release_year),
            MediaKind::Show { season, episode } => write!(
                f,
                "{} ({}) S{:02}E{:02}",
                self.title, self.release_year, season.number, episode.number
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_movie_serializes_flat() {
        let query = MediaQuery::movie("Heat", 1995, "949");
        let value = serde_json::to_value(&query).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "movie",
                "title": "Heat",
                "releaseYear": 1995,
                "tmdbId": "949"
            })
        );
    }

    #[test]
    fn test_show_serializes_season_and_episode() {
        let query = MediaQuery::episode(
            "Dark",
            2017,
            "70523",
            SeasonRef {
                number: 1,
                tmdb_id: "88101".to_string(),
                title: None,
            },
            EpisodeRef {
                number: 3,
                tmdb_id: "1339483".to_string(),
            },
        );
        let value = serde_json::to_value(&query).unwrap();

        assert_eq!(value["type"], "show");
        assert_eq!(value["season"]["number"], 1);
        assert_eq!(value["episode"]["tmdbId"], "1339483");
        assert_eq!(query.to_string(), "Dark (2017) S01E03");

        let parsed: MediaQuery = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, query);
    }
}
