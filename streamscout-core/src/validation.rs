//! Request validation for inbound media queries.
//!
//! Top-level fields are checked first; season and episode are only looked at
//! once those pass and the query is for a show. The first failing field wins.

use serde_json::{Map, Value};

use crate::errors::ValidationError;
use crate::media::{EpisodeRef, MediaKind, MediaQuery, SeasonRef};

/// Earliest accepted release year.
pub const MIN_RELEASE_YEAR: i64 = 1900;
/// Latest accepted release year.
pub const MAX_RELEASE_YEAR: i64 = 2100;

/// Parses a raw request body into a validated [`MediaQuery`].
///
/// # Errors
/// - `ValidationError` - Body is not JSON or a field is missing or malformed
pub fn parse_media_query(body: &[u8]) -> Result<MediaQuery, ValidationError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| ValidationError::new("body", "body must be valid JSON"))?;
    validate_media_query(&value)
}

/// Validates a JSON payload and converts it to a [`MediaQuery`].
///
/// # Errors
/// - `ValidationError` - Names the first field that failed validation
pub fn validate_media_query(payload: &Value) -> Result<MediaQuery, ValidationError> {
    let object = payload
        .as_object()
        .ok_or_else(|| ValidationError::new("body", "body must be a JSON object"))?;

    let is_show = media_type(object)?;
    let title = required_string(object, "title", "title", "title is required")?;
    let release_year = release_year(object)?;
    let tmdb_id = required_string(
        object,
        "tmdbId",
        "tmdbId",
        "tmdbId must be a non-empty string",
    )?;
    let imdb_id = object
        .get("imdbId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    let kind = if is_show {
        let season = nested(object, "season")?;
        let season = SeasonRef {
            number: positive_integer(season, "season.number")?,
            tmdb_id: required_string(
                season,
                "tmdbId",
                "season.tmdbId",
                "season.tmdbId must be a non-empty string",
            )?,
            title: season
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
        };

        let episode = nested(object, "episode")?;
        let episode = EpisodeRef {
            number: positive_integer(episode, "episode.number")?,
            tmdb_id: required_string(
                episode,
                "tmdbId",
                "episode.tmdbId",
                "episode.tmdbId must be a non-empty string",
            )?,
        };

        MediaKind::Show { season, episode }
    } else {
        MediaKind::Movie
    };

    Ok(MediaQuery {
        kind,
        title,
        release_year,
        tmdb_id,
        imdb_id,
    })
}

fn media_type(object: &Map<String, Value>) -> Result<bool, ValidationError> {
    match object.get("type").and_then(Value::as_str) {
        Some("movie") => Ok(false),
        Some("show") => Ok(true),
        _ => Err(ValidationError::new(
            "type",
            r#"type must be one of "movie", "show""#,
        )),
    }
}

fn required_string(
    object: &Map<String, Value>,
    key: &str,
    field: &str,
    message: &str,
) -> Result<String, ValidationError> {
    match object.get(key).and_then(Value::as_str) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ValidationError::new(field, message)),
    }
}

fn release_year(object: &Map<String, Value>) -> Result<u16, ValidationError> {
    let value = object
        .get("releaseYear")
        .ok_or_else(|| ValidationError::new("releaseYear", "releaseYear is required"))?;
    let year = integer(value).ok_or_else(|| {
        ValidationError::new("releaseYear", "releaseYear must be an integer")
    })?;

    if year < MIN_RELEASE_YEAR {
        return Err(ValidationError::new(
            "releaseYear",
            format!("releaseYear must be at least {MIN_RELEASE_YEAR}"),
        ));
    }
    if year > MAX_RELEASE_YEAR {
        return Err(ValidationError::new(
            "releaseYear",
            format!("releaseYear must be at most {MAX_RELEASE_YEAR}"),
        ));
    }

    // Bounded by the checks above.
    Ok(year as u16)
}

fn nested<'a>(
    object: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    match object.get(key) {
        Some(Value::Object(inner)) => Ok(inner),
        Some(_) => Err(ValidationError::new(key, format!("{key} must be an object"))),
        None => Err(ValidationError::new(key, format!("{key} is required"))),
    }
}

fn positive_integer(object: &Map<String, Value>, field: &str) -> Result<u32, ValidationError> {
    let value = object.get("number");
    let too_large = || ValidationError::new(field, format!("{field} must be at most {}", u32::MAX));

    match value.and_then(integer) {
        Some(number) if number > 0 => u32::try_from(number).map_err(|_| too_large()),
        // Whole numbers beyond i64 are still positive integers, just out of range.
        None if value
            .and_then(Value::as_f64)
            .is_some_and(|float| float.fract() == 0.0 && float > 0.0) =>
        {
            Err(too_large())
        }
        _ => Err(ValidationError::new(
            field,
            format!("{field} must be a positive integer"),
        )),
    }
}

/// JSON numbers with no fractional part count as integers (`2001.0` included).
fn integer(value: &Value) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    let float = value.as_f64()?;
    if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        Some(float as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn valid_movie() -> Value {
        json!({
            "type": "movie",
            "title": "Arrival",
            "releaseYear": 2016,
            "tmdbId": "329865"
        })
    }

    fn valid_show() -> Value {
        json!({
            "type": "show",
            "title": "Severance",
            "releaseYear": 2022,
            "tmdbId": "95396",
            "season": { "number": 1, "tmdbId": "134085" },
            "episode": { "number": 2, "tmdbId": "3430543" }
        })
    }

    fn field_of(payload: Value) -> String {
        validate_media_query(&payload).unwrap_err().field
    }

    #[test]
    fn test_accepts_valid_movie() {
        let query = validate_media_query(&valid_movie()).unwrap();
        assert_eq!(query.kind, MediaKind::Movie);
        assert_eq!(query.title, "Arrival");
        assert_eq!(query.release_year, 2016);
        assert_eq!(query.tmdb_id, "329865");
    }

    #[test]
    fn test_accepts_valid_show() {
        let query = validate_media_query(&valid_show()).unwrap();
        match query.kind {
            MediaKind::Show { season, episode } => {
                assert_eq!(season.number, 1);
                assert_eq!(episode.tmdb_id, "3430543");
            }
            MediaKind::Movie => panic!("expected show"),
        }
    }

    #[test]
    fn test_rejects_missing_title() {
        let mut payload = valid_movie();
        payload.as_object_mut().unwrap().remove("title");

        let error = validate_media_query(&payload).unwrap_err();
        assert_eq!(error.field, "title");
        assert!(error.message.contains("title"));
    }

    #[test]
    fn test_rejects_empty_title() {
        let mut payload = valid_movie();
        payload["title"] = json!("");
        assert_eq!(field_of(payload), "title");
    }

    #[test]
    fn test_rejects_years_outside_range() {
        let mut early = valid_movie();
        early["releaseYear"] = json!(1899);
        let error = validate_media_query(&early).unwrap_err();
        assert_eq!(error.message, "releaseYear must be at least 1900");

        let mut late = valid_movie();
        late["releaseYear"] = json!(2101);
        let error = validate_media_query(&late).unwrap_err();
        assert_eq!(error.message, "releaseYear must be at most 2100");
    }

    #[test]
    fn test_year_bounds_are_inclusive() {
        for year in [1900, 2100] {
            let mut payload = valid_movie();
            payload["releaseYear"] = json!(year);
            assert!(validate_media_query(&payload).is_ok());
        }
    }

    #[test]
    fn test_rejects_fractional_year_but_accepts_whole_float() {
        let mut payload = valid_movie();
        payload["releaseYear"] = json!(2001.5);
        assert_eq!(
            validate_media_query(&payload).unwrap_err().message,
            "releaseYear must be an integer"
        );

        payload["releaseYear"] = json!(2001.0);
        assert_eq!(validate_media_query(&payload).unwrap().release_year, 2001);
    }

    #[test]
    fn test_rejects_unknown_type() {
        let mut payload = valid_movie();
        payload["type"] = json!("anime");
        assert_eq!(field_of(payload), "type");
    }

    #[test]
    fn test_rejects_numeric_tmdb_id() {
        let mut payload = valid_movie();
        payload["tmdbId"] = json!(329865);
        assert_eq!(field_of(payload), "tmdbId");
    }

    #[test]
    fn test_top_level_error_reported_before_show_fields() {
        let mut payload = valid_show();
        payload["title"] = json!("");
        payload.as_object_mut().unwrap().remove("season");
        assert_eq!(field_of(payload), "title");
    }

    #[test]
    fn test_show_without_season_or_episode_is_rejected() {
        let mut payload = valid_show();
        payload.as_object_mut().unwrap().remove("season");
        payload.as_object_mut().unwrap().remove("episode");

        let error = validate_media_query(&payload).unwrap_err();
        assert_eq!(error.field, "season");
        assert_eq!(error.message, "season is required");
    }

    #[test]
    fn test_show_without_episode_is_rejected() {
        let mut payload = valid_show();
        payload.as_object_mut().unwrap().remove("episode");
        assert_eq!(field_of(payload), "episode");
    }

    #[test]
    fn test_first_nested_failure_wins() {
        let mut payload = valid_show();
        payload["season"]["number"] = json!(0);
        payload["episode"]["tmdbId"] = json!("");
        assert_eq!(field_of(payload), "season.number");

        let mut payload = valid_show();
        payload["episode"]["tmdbId"] = json!("");
        assert_eq!(field_of(payload), "episode.tmdbId");
    }

    #[test]
    fn test_oversized_episode_numbers_get_range_message() {
        let mut payload = valid_show();
        payload["season"]["number"] = json!(4_294_967_296_u64);
        let error = validate_media_query(&payload).unwrap_err();
        assert_eq!(error.field, "season.number");
        assert_eq!(error.message, "season.number must be at most 4294967295");

        let mut payload = valid_show();
        payload["episode"]["number"] = json!(1e30);
        let error = validate_media_query(&payload).unwrap_err();
        assert_eq!(error.message, "episode.number must be at most 4294967295");

        let mut payload = valid_show();
        payload["episode"]["number"] = json!(-3);
        let error = validate_media_query(&payload).unwrap_err();
        assert_eq!(error.message, "episode.number must be a positive integer");
    }

    #[test]
    fn test_movie_ignores_season_fields() {
        let mut payload = valid_movie();
        payload["season"] = json!({ "number": -4 });
        let query = validate_media_query(&payload).unwrap();
        assert!(!query.is_show());
    }

    #[test]
    fn test_imdb_id_is_carried_when_present() {
        let mut payload = valid_movie();
        payload["imdbId"] = json!("tt2543164");
        assert_eq!(
            validate_media_query(&payload).unwrap().imdb_id.as_deref(),
            Some("tt2543164")
        );
    }

    #[test]
    fn test_parse_rejects_non_json_and_non_object() {
        assert_eq!(
            parse_media_query(b"not json").unwrap_err().message,
            "body must be valid JSON"
        );
        assert_eq!(
            parse_media_query(b"[1,2]").unwrap_err().message,
            "body must be a JSON object"
        );
    }

    proptest! {
        #[test]
        fn prop_valid_movies_accepted(
            title in "[A-Za-z0-9 ]{1,40}",
            year in MIN_RELEASE_YEAR..=MAX_RELEASE_YEAR,
            tmdb in "[0-9]{1,8}",
        ) {
            let payload = json!({
                "type": "movie",
                "title": title,
                "releaseYear": year,
                "tmdbId": tmdb,
            });
            let query = validate_media_query(&payload).unwrap();
            prop_assert_eq!(i64::from(query.release_year), year);
        }

        #[test]
        fn prop_years_out_of_range_rejected(
            year in prop_oneof![-5000i64..MIN_RELEASE_YEAR, (MAX_RELEASE_YEAR + 1)..9000i64],
        ) {
            let mut payload = valid_movie();
            payload["releaseYear"] = json!(year);
            let error = validate_media_query(&payload).unwrap_err();
            prop_assert_eq!(error.field.as_str(), "releaseYear");
            prop_assert!(error.message.contains("releaseYear"));
        }
    }
}
