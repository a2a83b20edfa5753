//! Request parameters for the three read-only endpoints and their validation.
//!
//! A parameter set is checked against the endpoint's allowed names and the
//! value domain of each name before anything is sent. Video-only search filters
//! are accepted only for `type=video` searches.

use std::collections::BTreeMap;
use std::fmt;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};

/// Largest `maxResults` and the largest id list a single call accepts.
pub const MAX_RESULTS_LIMIT: u32 = 50;
pub const MAX_IDS_PER_CALL: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Search,
    Videos,
    Channels,
}

const SEARCH_PARAMS: &[&str] = &[
    "part",
    "q",
    "channelId",
    "channelType",
    "maxResults",
    "order",
    "pageToken",
    "publishedAfter",
    "publishedBefore",
    "type",
    "relevanceLanguage",
    "regionCode",
    "safeSearch",
    "videoCategoryId",
];

/// Search filters the API only honours when `type` is `video`.
pub const VIDEO_ONLY_PARAMS: &[&str] = &[
    "eventType",
    "videoCaption",
    "videoDuration",
    "videoEmbeddable",
    "videoDefinition",
    "relatedToVideoId",
];

const LOOKUP_PARAMS: &[&str] = &["part", "id", "maxResults", "pageToken"];

const SEARCH_PARTS: &[&str] = &["id", "snippet"];
const VIDEO_PARTS: &[&str] = &[
    "contentDetails",
    "id",
    "liveStreamingDetails",
    "localizations",
    "player",
    "recordingDetails",
    "snippet",
    "statistics",
    "status",
    "topicDetails",
];
const CHANNEL_PARTS: &[&str] = &[
    "brandingSettings",
    "contentDetails",
    "contentOwnerDetails",
    "id",
    "localizations",
    "snippet",
    "statistics",
    "status",
    "topicDetails",
];

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Search => "search",
            Endpoint::Videos => "videos",
            Endpoint::Channels => "channels",
        }
    }

    pub fn default_part(self) -> &'static str {
        match self {
            Endpoint::Search => "snippet",
            Endpoint::Videos => "snippet,contentDetails",
            Endpoint::Channels => "snippet",
        }
    }

    fn parts(self) -> &'static [&'static str] {
        match self {
            Endpoint::Search => SEARCH_PARTS,
            Endpoint::Videos => VIDEO_PARTS,
            Endpoint::Channels => CHANNEL_PARTS,
        }
    }

    fn allows(self, name: &str) -> bool {
        match self {
            Endpoint::Search => is_one_of(name, SEARCH_PARAMS) || is_one_of(name, VIDEO_ONLY_PARAMS),
            Endpoint::Videos | Endpoint::Channels => is_one_of(name, LOOKUP_PARAMS),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

macro_rules! api_enum {
    ($(#[$meta:meta])* $name:ident($param:literal) { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const PARAM: &'static str = $param;
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(not_one_of($param, other, Self::VALUES)),
                }
            }
        }
    };
}

api_enum! {
    /// Result ordering for `search.list`.
    Order("order") {
        Date => "date",
        Rating => "rating",
        Relevance => "relevance",
        Title => "title",
        VideoCount => "videoCount",
        ViewCount => "viewCount",
    }
}

api_enum! {
    /// Resource kinds a search may return.
    ResourceType("type") {
        Channel => "channel",
        Playlist => "playlist",
        Video => "video",
    }
}

api_enum! {
    ChannelType("channelType") {
        Any => "any",
        Show => "show",
    }
}

api_enum! {
    /// Broadcast state filter; video searches only.
    EventType("eventType") {
        Completed => "completed",
        Live => "live",
        Upcoming => "upcoming",
    }
}

api_enum! {
    VideoCaption("videoCaption") {
        Any => "any",
        ClosedCaption => "closedCaption",
        None => "none",
    }
}

api_enum! {
    /// `short` is under 4 minutes, `medium` 4 to 20, `long` over 20.
    VideoDuration("videoDuration") {
        Any => "any",
        Long => "long",
        Medium => "medium",
        Short => "short",
    }
}

api_enum! {
    VideoEmbeddable("videoEmbeddable") {
        Any => "any",
        True => "true",
    }
}

api_enum! {
    VideoDefinition("videoDefinition") {
        Any => "any",
        High => "high",
        Standard => "standard",
    }
}

api_enum! {
    SafeSearch("safeSearch") {
        Moderate => "moderate",
        None => "none",
        Strict => "strict",
    }
}

fn is_one_of(value: &str, allowed: &[&str]) -> bool {
    allowed.iter().any(|a| *a == value)
}

fn not_one_of(name: &str, value: &str, allowed: &[&str]) -> Error {
    Error::invalid(
        name,
        format!("`{value}` is not one of {}", allowed.join(", ")),
    )
}

/// Checks that every parameter is legal for `endpoint` and that each value is
/// inside its domain. The first offending parameter is reported by name.
pub fn validate(endpoint: Endpoint, params: &BTreeMap<String, String>) -> Result<()> {
    if !params.contains_key("part") {
        return Err(Error::invalid("part", "is required"));
    }

    for (name, value) in params {
        if !endpoint.allows(name) {
            return Err(Error::invalid(
                name.as_str(),
                format!("not accepted by {endpoint}.list"),
            ));
        }
        check_value(endpoint, name, value)?;
    }

    if endpoint == Endpoint::Search {
        let video_search = params.get("type").map(String::as_str) == Some("video");
        if !video_search {
            if let Some(name) = VIDEO_ONLY_PARAMS.iter().find(|n| params.contains_key(**n)) {
                return Err(Error::invalid(*name, "only allowed when type is `video`"));
            }
        }
    }
    Ok(())
}

fn check_value(endpoint: Endpoint, name: &str, value: &str) -> Result<()> {
    match name {
        "part" => check_list(name, value, endpoint.parts()),
        "type" => check_list(name, value, ResourceType::VALUES),
        "order" => check_one(name, value, Order::VALUES),
        "channelType" => check_one(name, value, ChannelType::VALUES),
        "eventType" => check_one(name, value, EventType::VALUES),
        "videoCaption" => check_one(name, value, VideoCaption::VALUES),
        "videoDuration" => check_one(name, value, VideoDuration::VALUES),
        "videoEmbeddable" => check_one(name, value, VideoEmbeddable::VALUES),
        "videoDefinition" => check_one(name, value, VideoDefinition::VALUES),
        "safeSearch" => check_one(name, value, SafeSearch::VALUES),
        "maxResults" => match value.parse::<u32>() {
            Ok(n) if n <= MAX_RESULTS_LIMIT => Ok(()),
            _ => Err(Error::invalid(
                name,
                format!("`{value}` is not an integer in 0..={MAX_RESULTS_LIMIT}"),
            )),
        },
        "publishedAfter" | "publishedBefore" => OffsetDateTime::parse(value, &Rfc3339)
            .map(|_| ())
            .map_err(|_| Error::invalid(name, format!("`{value}` is not an RFC 3339 timestamp"))),
        "id" => {
            let ids: Vec<&str> = value.split(',').collect();
            if ids.iter().any(|id| id.trim().is_empty()) {
                Err(Error::invalid(name, "contains an empty id"))
            } else if ids.len() > MAX_IDS_PER_CALL {
                Err(Error::invalid(
                    name,
                    format!("{} ids given, at most {MAX_IDS_PER_CALL} per call", ids.len()),
                ))
            } else {
                Ok(())
            }
        }
        _ if value.trim().is_empty() => Err(Error::invalid(name, "must not be empty")),
        _ => Ok(()),
    }
}

fn check_one(name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if is_one_of(value, allowed) {
        Ok(())
    } else {
        Err(not_one_of(name, value, allowed))
    }
}

fn check_list(name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid(name, "must not be empty"));
    }
    for item in value.split(',') {
        let item = item.trim();
        if !is_one_of(item, allowed) {
            return Err(not_one_of(name, item, allowed));
        }
    }
    Ok(())
}

/// An immutable, validated parameter set for `search.list`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    params: BTreeMap<String, String>,
}

impl SearchRequest {
    /// Builds a request from raw `(name, value)` pairs. `part` defaults to
    /// `snippet` when absent.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        params
            .entry("part".to_owned())
            .or_insert_with(|| Endpoint::Search.default_part().to_owned());
        validate(Endpoint::Search, &params)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn page_token(&self) -> Option<&str> {
        self.get("pageToken")
    }

    /// The same request pointed at another page.
    pub fn with_page_token(&self, token: &str) -> Self {
        let mut params = self.params.clone();
        params.insert("pageToken".to_owned(), token.to_owned());
        Self { params }
    }
}

/// A `videos.list` or `channels.list` call for one batch of ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupRequest {
    endpoint: Endpoint,
    params: BTreeMap<String, String>,
}

impl LookupRequest {
    /// `None` when `ids` is empty, since there is nothing to ask for.
    pub fn new(endpoint: Endpoint, ids: &[String], part: Option<&str>) -> Result<Option<Self>> {
        if endpoint == Endpoint::Search {
            return Err(Error::invalid("id", "search.list does not take ids"));
        }
        if ids.is_empty() {
            return Ok(None);
        }
        let mut params = BTreeMap::new();
        params.insert(
            "part".to_owned(),
            part.unwrap_or(endpoint.default_part()).to_owned(),
        );
        params.insert("id".to_owned(), ids.join(","));
        params.insert("maxResults".to_owned(), MAX_RESULTS_LIMIT.to_string());
        validate(endpoint, &params)?;
        Ok(Some(Self { endpoint, params }))
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}
