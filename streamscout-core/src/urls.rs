//! URL helpers.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static VIDEO_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(m3u8|mp4)\b").expect("video extension pattern is valid")
});

/// Checks if `candidate` parses as an absolute http or https URL.
pub fn is_valid_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Checks if `url` points at an HLS playlist or an MP4 file.
pub fn is_video_url(url: &str) -> bool {
    VIDEO_EXTENSION.is_match(url)
}

/// Checks if `url` points at an HLS playlist.
pub fn is_playlist_url(url: &str) -> bool {
    is_video_url(url) && url.contains(".m3u8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_http_urls() {
        assert!(is_valid_http_url("http://127.0.0.1:5100"));
        assert!(is_valid_http_url("https://providers.example.com/api"));
        assert!(!is_valid_http_url("ftp://example.com"));
        assert!(!is_valid_http_url("not a url"));
        assert!(!is_valid_http_url(""));
    }

    #[test]
    fn test_video_urls() {
        assert!(is_video_url("https://cdn.example.com/master.m3u8"));
        assert!(is_video_url("https://cdn.example.com/movie.mp4?token=abc"));
        assert!(!is_video_url("https://cdn.example.com/movie.mp4a"));
        assert!(!is_video_url("https://embed.example.com/e/123"));
    }

    #[test]
    fn test_playlist_urls() {
        assert!(is_playlist_url("https://cdn.example.com/master.m3u8"));
        assert!(!is_playlist_url("https://cdn.example.com/movie.mp4"));
    }
}
