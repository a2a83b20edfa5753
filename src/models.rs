use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::duration::parse_iso8601_duration;
use crate::error::{Error, Result};
use crate::yt::types::{
    ChannelItem, ChannelStatisticsItem, ContentDetails, SearchItem, Snippet, VideoItem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Definition {
    Hd,
    Sd,
}

impl Definition {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "hd" => Ok(Definition::Hd),
            "sd" => Ok(Definition::Sd),
            other => Err(Error::Mapping(format!("unknown video definition `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
    pub thumbnail_url: Option<String>,
    /// `none`, `live` or `upcoming`.
    pub live_broadcast_content: Option<String>,
    /// Only set when content details were requested.
    pub duration_secs: Option<u64>,
    pub definition: Option<Definition>,
}

impl Video {
    pub fn url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.id)
    }

    /// A copy carrying the duration and definition from `details`.
    pub(crate) fn with_content_details(self, details: &ContentDetails) -> Result<Self> {
        let duration_secs = details
            .duration
            .as_deref()
            .map(|raw| {
                parse_iso8601_duration(raw).ok_or_else(|| {
                    Error::Mapping(format!("video {}: unrecognised duration `{raw}`", self.id))
                })
            })
            .transpose()?;
        let definition = details.definition.as_deref().map(Definition::parse).transpose()?;
        Ok(Video {
            duration_secs,
            definition,
            ..self
        })
    }

    fn from_snippet(id: String, snippet: Snippet) -> Result<Self> {
        let published_at = parse_timestamp(&snippet.published_at)
            .map_err(|err| Error::Mapping(format!("video {id}: {err}")))?;
        Ok(Video {
            thumbnail_url: snippet.thumbnails.as_ref().and_then(|t| t.preferred_url()),
            title: snippet.title,
            description: snippet.description,
            channel_id: snippet.channel_id,
            channel_title: snippet.channel_title,
            published_at,
            live_broadcast_content: snippet.live_broadcast_content,
            duration_secs: None,
            definition: None,
            id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelStatistics {
    pub view_count: Option<u64>,
    /// Unset when the owner hides it.
    pub subscriber_count: Option<u64>,
    pub video_count: Option<u64>,
    pub hidden_subscriber_count: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub custom_url: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub thumbnail_url: Option<String>,
    /// Only `channels.list` with the `statistics` part fills this in.
    pub statistics: Option<ChannelStatistics>,
}

impl Channel {
    pub fn url(&self) -> String {
        match &self.custom_url {
            Some(handle) if handle.starts_with('@') => format!("https://www.youtube.com/{handle}"),
            _ => format!("https://www.youtube.com/channel/{}", self.id),
        }
    }
}

fn parse_timestamp(raw: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|err| Error::Mapping(format!("bad timestamp `{raw}`: {err}")))
}

fn parse_count(field: &str, raw: Option<String>) -> Result<Option<u64>> {
    raw.map(|s| {
        s.parse::<u64>()
            .map_err(|_| Error::Mapping(format!("{field} `{s}` is not a count")))
    })
    .transpose()
}

fn decode<D: serde::de::DeserializeOwned>(what: &str, value: serde_json::Value) -> Result<D> {
    serde_json::from_value(value).map_err(|err| Error::Mapping(format!("{what}: {err}")))
}

/// Maps one `search.list` item of kind `youtube#video`.
pub(crate) fn video_from_search(value: serde_json::Value) -> Result<Video> {
    let item: SearchItem = decode("search result", value)?;
    let id = item.id.video_id.ok_or_else(|| {
        Error::Mapping(format!(
            "search result of kind {} has no videoId",
            item.id.kind.as_deref().unwrap_or("unknown")
        ))
    })?;
    let snippet = item
        .snippet
        .ok_or_else(|| Error::Mapping(format!("video {id} has no snippet")))?;
    Video::from_snippet(id, snippet)
}

/// Maps one `videos.list` item, including content details when present.
pub(crate) fn video_from_lookup(value: serde_json::Value) -> Result<Video> {
    let item: VideoItem = decode("video", value)?;
    let snippet = item
        .snippet
        .ok_or_else(|| Error::Mapping(format!("video {} has no snippet", item.id)))?;
    let video = Video::from_snippet(item.id, snippet)?;
    match &item.content_details {
        Some(details) => video.with_content_details(details),
        None => Ok(video),
    }
}

/// Just the id and content details of a `videos.list` item.
pub(crate) fn content_details_from_lookup(
    value: serde_json::Value,
) -> Result<(String, Option<ContentDetails>)> {
    let item: VideoItem = decode("video", value)?;
    Ok((item.id, item.content_details))
}

/// Maps one `search.list` item of kind `youtube#channel`.
pub(crate) fn channel_from_search(value: serde_json::Value) -> Result<Channel> {
    let item: SearchItem = decode("search result", value)?;
    let id = item.id.channel_id.ok_or_else(|| {
        Error::Mapping(format!(
            "search result of kind {} has no channelId",
            item.id.kind.as_deref().unwrap_or("unknown")
        ))
    })?;
    let snippet = item
        .snippet
        .ok_or_else(|| Error::Mapping(format!("channel {id} has no snippet")))?;
    Ok(Channel {
        published_at: Some(parse_timestamp(&snippet.published_at)?),
        thumbnail_url: snippet.thumbnails.as_ref().and_then(|t| t.preferred_url()),
        title: snippet.title,
        description: snippet.description,
        custom_url: None,
        statistics: None,
        id,
    })
}

/// Maps one `channels.list` item.
pub(crate) fn channel_from_lookup(value: serde_json::Value) -> Result<Channel> {
    let item: ChannelItem = decode("channel", value)?;
    let snippet = item
        .snippet
        .ok_or_else(|| Error::Mapping(format!("channel {} has no snippet", item.id)))?;
    let published_at = snippet
        .published_at
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;
    let statistics = item.statistics.map(map_statistics).transpose()?;
    Ok(Channel {
        thumbnail_url: snippet.thumbnails.as_ref().and_then(|t| t.preferred_url()),
        title: snippet.title,
        description: snippet.description,
        custom_url: snippet
            .custom_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty()),
        published_at,
        statistics,
        id: item.id,
    })
}

fn map_statistics(stats: ChannelStatisticsItem) -> Result<ChannelStatistics> {
    Ok(ChannelStatistics {
        view_count: parse_count("viewCount", stats.view_count)?,
        subscriber_count: parse_count("subscriberCount", stats.subscriber_count)?,
        video_count: parse_count("videoCount", stats.video_count)?,
        hidden_subscriber_count: stats.hidden_subscriber_count,
    })
}
