//! YouTube watch URL validation
//!
//! Only canonical `https://www.youtube.com/watch?v=<id>` links are accepted.
//! The identifier found in the `v` parameter is what the catalog keys
//! uniqueness on, so anything that cannot yield a well-formed identifier is
//! rejected outright.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch";
const WATCH_HOST: &str = "www.youtube.com";
const WATCH_PATH: &str = "/watch";
const VIDEO_PARAM: &str = "v";

/// Length of every YouTube video identifier.
pub const VIDEO_ID_LEN: usize = 11;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidUrl {
    #[error("URL must start with https://www.youtube.com/watch")]
    NotAWatchUrl,

    #[error("URL contains whitespace or control characters")]
    UnexpectedCharacters,

    #[error("URL could not be parsed: {0}")]
    Unparseable(#[from] url::ParseError),

    #[error("URL host must be www.youtube.com, got {0:?}")]
    WrongHost(Option<String>),

    #[error("URL path must be /watch, got {0}")]
    WrongPath(String),

    #[error("URL has no query string")]
    MissingQuery,

    #[error("URL query has no `v` parameter")]
    MissingVideoParam,

    #[error("`v` parameter is empty")]
    EmptyVideoId,

    #[error("video id must be 11 characters, got {0}")]
    WrongLength(usize),

    #[error("video id contains characters outside [A-Za-z0-9_-]")]
    BadCharacters,
}

/// The 11 character identifier YouTube uses to address a single video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for VideoId {
    type Error = InvalidUrl;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(InvalidUrl::EmptyVideoId);
        }

        let len = value.chars().count();
        if len != VIDEO_ID_LEN {
            return Err(InvalidUrl::WrongLength(len));
        }

        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(InvalidUrl::BadCharacters);
        }

        Ok(VideoId(value.to_string()))
    }
}

/// Extracts the video identifier from a YouTube watch URL.
///
/// The candidate has to start with `https://www.youtube.com/watch` exactly
/// (no leading noise, no `http://`), point at the `/watch` path, and carry a
/// `v` query parameter holding an 11 character identifier. Other query
/// parameters are ignored; if `v` repeats, the first one wins.
pub fn extract_video_id(candidate: &str) -> Result<VideoId, InvalidUrl> {
    let rest = candidate
        .strip_prefix(WATCH_URL_PREFIX)
        .ok_or(InvalidUrl::NotAWatchUrl)?;

    // The URL parser drops tabs and newlines and trims spaces, so they are
    // refused here to keep the stored string identical to what was checked.
    if candidate
        .chars()
        .any(|c| c.is_ascii_whitespace() || c.is_control())
    {
        return Err(InvalidUrl::UnexpectedCharacters);
    }

    if rest.is_empty() {
        return Err(InvalidUrl::MissingQuery);
    }
    if !rest.starts_with('?') {
        let extra = rest.split(['?', '#']).next().unwrap_or_default();
        return Err(InvalidUrl::WrongPath(format!("{}{}", WATCH_PATH, extra)));
    }

    let url = Url::parse(candidate)?;

    if url.host_str() != Some(WATCH_HOST) || url.port().is_some() {
        return Err(InvalidUrl::WrongHost(url.host_str().map(String::from)));
    }

    if url.path() != WATCH_PATH {
        return Err(InvalidUrl::WrongPath(url.path().to_string()));
    }

    let query = url.query().ok_or(InvalidUrl::MissingQuery)?;

    // Keys are matched as written; only the value is percent-decoded.
    let value = query
        .split('&')
        .find(|pair| pair.split('=').next() == Some(VIDEO_PARAM))
        .and_then(|pair| form_urlencoded::parse(pair.as_bytes()).next())
        .map(|(_, value)| value.into_owned())
        .ok_or(InvalidUrl::MissingVideoParam)?;

    VideoId::try_from(value.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_watch_url() {
        let id = extract_video_id("https://www.youtube.com/watch?v=SBmSRK3feww").unwrap();
        assert_eq!(id.as_str(), "SBmSRK3feww");
        assert_eq!(id.as_str().len(), VIDEO_ID_LEN);
    }

    #[test]
    fn ignores_other_query_parameters() {
        let id =
            extract_video_id("https://www.youtube.com/watch?list=PL123&v=SBmSRK3feww&t=42s")
                .unwrap();
        assert_eq!(id.to_string(), "SBmSRK3feww");
    }

    #[test]
    fn first_v_parameter_wins() {
        let id = extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&v=SBmSRK3feww")
            .unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");
    }

    #[test]
    fn rejects_malformed_urls() {
        let invalid = [
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch/somethingelse",
            "https://www.youtube.com/watch/somethingelse?v=1234567",
            "https://www.youtube.com/watch?",
            "https://www.youtube.com/watch?abc=123",
            "https://www.youtube.com/watch?v=",
            "https://www.github.com",
            "123456564567543",
            "hhhhhhttps://www.youtube.com/watch",
            "http://www.youtube.com/watch",
            "http://www.youtube.com/watch?v=SBmSRK3feww",
            "https://www.minneapolis.edu",
            "https://www.minneapolis.edu?v=123456",
            " https://www.youtube.com/watch?v=SBmSRK3feww",
            "HTTPS://WWW.YOUTUBE.COM/watch?v=SBmSRK3feww",
            "https://www.youtube.community/watch?v=SBmSRK3feww",
            "https://www.youtube.com/watchlater?v=SBmSRK3feww",
            "https://www.youtube.com/watch?v=SBmSR\tK3feww",
            "https://www.youtube.com/watch?v=SBmSRK3feww\n",
            "https://www.youtube.com/watch?v=SBmSRK3feww ",
            "https://www.youtube.com/watch/../watch?v=SBmSRK3feww",
            "https://www.youtube.com/watch?%76=SBmSRK3feww",
        ];

        for candidate in invalid {
            assert!(
                extract_video_id(candidate).is_err(),
                "{candidate} should have been rejected"
            );
        }
    }

    #[test]
    fn reports_which_rule_failed() {
        assert_eq!(
            extract_video_id("http://www.youtube.com/watch?v=SBmSRK3feww"),
            Err(InvalidUrl::NotAWatchUrl)
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch"),
            Err(InvalidUrl::MissingQuery)
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?abc=123"),
            Err(InvalidUrl::MissingVideoParam)
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v="),
            Err(InvalidUrl::EmptyVideoId)
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch/somethingelse?v=SBmSRK3feww"),
            Err(InvalidUrl::WrongPath("/watch/somethingelse".to_string()))
        );
    }

    #[test]
    fn rejects_text_the_url_parser_would_clean_up() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=SBmSR\tK3feww"),
            Err(InvalidUrl::UnexpectedCharacters)
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=SBmSRK3feww\r\n"),
            Err(InvalidUrl::UnexpectedCharacters)
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch/../watch?v=SBmSRK3feww"),
            Err(InvalidUrl::WrongPath("/watch/../watch".to_string()))
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?%76=SBmSRK3feww"),
            Err(InvalidUrl::MissingVideoParam)
        );
    }

    #[test]
    fn rejects_identifiers_of_the_wrong_length() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=123"),
            Err(InvalidUrl::WrongLength(3))
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=SBmSRK3fewwX"),
            Err(InvalidUrl::WrongLength(12))
        );
    }

    #[test]
    fn rejects_identifiers_with_foreign_characters() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=SBmSRK3few%21"),
            Err(InvalidUrl::BadCharacters)
        );
    }
}
