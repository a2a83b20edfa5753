use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};
use crate::yt::params::{
    ChannelType, EventType, MAX_RESULTS_LIMIT, Order, ResourceType, SearchRequest, VideoCaption,
    VideoDefinition, VideoDuration, VideoEmbeddable,
};

/// Finder-level search options. Unset fields are left out of the request,
/// except `order` (defaults to `date`) and `max_results` (defaults to 50).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub search_query: Option<String>,
    pub channel_id: Option<String>,
    pub channel_type: Option<ChannelType>,
    pub max_results: Option<u32>,
    pub order: Option<Order>,
    pub page_token: Option<String>,
    pub published_after: Option<OffsetDateTime>,
    pub published_before: Option<OffsetDateTime>,
    pub resource_type: Option<ResourceType>,
    pub relevance_language: Option<String>,
    pub region_code: Option<String>,
    pub event_type: Option<EventType>,
    pub video_caption: Option<VideoCaption>,
    pub video_duration: Option<VideoDuration>,
    pub video_embeddable: Option<VideoEmbeddable>,
    pub video_definition: Option<VideoDefinition>,
    pub related_to_video_id: Option<String>,
    /// Look up duration and definition for every video found.
    pub content_details: bool,
    /// Follow page tokens until the result set is exhausted.
    pub fetch_all: bool,
    /// Upper bound on pages when `fetch_all` is set. `None` means no bound;
    /// zero is rejected.
    pub max_pages: Option<usize>,
}

impl SearchOptions {
    pub fn query(search_query: impl Into<String>) -> Self {
        Self {
            search_query: Some(search_query.into()),
            ..Self::default()
        }
    }

    /// Builds and validates the `search.list` request. `required_type` pins
    /// the resource type; a conflicting `resource_type` is rejected.
    pub fn to_request(&self, required_type: Option<ResourceType>) -> Result<SearchRequest> {
        if self.max_pages == Some(0) {
            return Err(Error::invalid("max_pages", "must be at least 1"));
        }
        let resource_type = match (required_type, self.resource_type) {
            (Some(required), Some(given)) if required != given => {
                return Err(Error::invalid(
                    ResourceType::PARAM,
                    format!("`{given}` cannot be used here, only `{required}`"),
                ));
            }
            (Some(required), _) => Some(required),
            (None, given) => given,
        };

        let mut pairs: Vec<(&'static str, String)> = vec![
            ("order", self.order.unwrap_or(Order::Date).to_string()),
            (
                "maxResults",
                self.max_results.unwrap_or(MAX_RESULTS_LIMIT).to_string(),
            ),
        ];
        let mut push = |name: &'static str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((name, value));
            }
        };
        push("q", non_empty(&self.search_query));
        push("channelId", non_empty(&self.channel_id));
        push("channelType", self.channel_type.map(|v| v.to_string()));
        push("pageToken", non_empty(&self.page_token));
        push(
            "publishedAfter",
            self.published_after.map(|t| format_time("publishedAfter", t)).transpose()?,
        );
        push(
            "publishedBefore",
            self.published_before.map(|t| format_time("publishedBefore", t)).transpose()?,
        );
        push("type", resource_type.map(|v| v.to_string()));
        push("relevanceLanguage", non_empty(&self.relevance_language));
        push("regionCode", non_empty(&self.region_code));
        push("eventType", self.event_type.map(|v| v.to_string()));
        push("videoCaption", self.video_caption.map(|v| v.to_string()));
        push("videoDuration", self.video_duration.map(|v| v.to_string()));
        push("videoEmbeddable", self.video_embeddable.map(|v| v.to_string()));
        push("videoDefinition", self.video_definition.map(|v| v.to_string()));
        push("relatedToVideoId", non_empty(&self.related_to_video_id));

        SearchRequest::from_pairs(pairs)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn format_time(name: &str, t: OffsetDateTime) -> Result<String> {
    t.format(&Rfc3339)
        .map_err(|err| Error::invalid(name, err.to_string()))
}
