use serde::{Deserialize, Serialize};

/// A decoded list response as the API returned it. Items stay untyped until
/// the finder maps them, so the same value can be cached for any endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,
}

impl RawResponse {
    /// The API's estimate of matching results; not an exact count.
    pub fn total_results(&self) -> Option<u64> {
        self.page_info.as_ref().map(|info| info.total_results)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_results: u64,
    #[serde(default)]
    pub results_per_page: u64,
}

#[derive(Deserialize)]
pub struct SearchItem {
    pub id: SearchId,
    pub snippet: Option<Snippet>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchId {
    pub kind: Option<String>,
    pub video_id: Option<String>,
    pub channel_id: Option<String>,
}

/// Snippet shared by search results and `videos.list` items.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    pub published_at: String,
    pub channel_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub thumbnails: Option<Thumbs>,
    pub channel_title: Option<String>,
    pub live_broadcast_content: Option<String>,
}

#[derive(Deserialize)]
pub struct Thumbs {
    pub default: Option<Thumb>,
    pub medium: Option<Thumb>,
    pub high: Option<Thumb>,
}

impl Thumbs {
    pub fn preferred_url(&self) -> Option<String> {
        self.medium
            .as_ref()
            .or(self.high.as_ref())
            .or(self.default.as_ref())
            .map(|thumb| thumb.url.clone())
    }
}

#[derive(Deserialize)]
pub struct Thumb {
    pub url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub snippet: Option<Snippet>,
    pub content_details: Option<ContentDetails>,
}

#[derive(Deserialize)]
pub struct ContentDetails {
    pub duration: Option<String>,
    pub definition: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelItem {
    pub id: String,
    pub snippet: Option<ChannelSnippet>,
    pub statistics: Option<ChannelStatisticsItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSnippet {
    pub title: String,
    pub description: Option<String>,
    pub custom_url: Option<String>,
    pub published_at: Option<String>,
    pub thumbnails: Option<Thumbs>,
}

/// Counts arrive as decimal strings.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatisticsItem {
    pub view_count: Option<String>,
    pub subscriber_count: Option<String>,
    #[serde(default)]
    pub hidden_subscriber_count: bool,
    pub video_count: Option<String>,
}
