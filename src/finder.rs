//! Search orchestration: paging through `search.list`, enriching with
//! `videos.list` lookups and mapping raw items into [`Video`] and [`Channel`]
//! records.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::models::{
    self, Channel, Video, channel_from_lookup, channel_from_search, video_from_lookup,
    video_from_search,
};
use crate::options::SearchOptions;
use crate::yt::client::YoutubeApi;
use crate::yt::params::{ResourceType, SearchRequest};
use crate::yt::transport::{ReqwestTransport, Transport};

const CHANNEL_LOOKUP_PART: &str = "snippet,statistics";
const VIDEO_LOOKUP_PART: &str = "snippet,contentDetails";
const CONTENT_DETAILS_PART: &str = "contentDetails";

pub struct Finder<T = ReqwestTransport> {
    api: YoutubeApi<T>,
}

impl Finder<ReqwestTransport> {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_api(YoutubeApi::new(api_key)?))
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::with_api(YoutubeApi::from_settings(settings)?))
    }
}

impl<T: Transport> Finder<T> {
    pub fn with_api(api: YoutubeApi<T>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &YoutubeApi<T> {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut YoutubeApi<T> {
        &mut self.api
    }

    /// Searches for videos.
    ///
    /// Only the first page is returned unless `fetch_all` is set, in which
    /// case every page is fetched; that is unbounded unless `max_pages` is
    /// given. With `content_details`, durations and definitions are looked up
    /// and merged in without changing the order.
    pub async fn search_videos(&mut self, options: &SearchOptions) -> Result<Vec<Video>> {
        let request = options.to_request(Some(ResourceType::Video))?;
        let items = self.collect_items(request, options).await?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut videos: Vec<Video> = Vec::with_capacity(items.len());
        let mut duplicates = 0usize;
        for item in items {
            let video = video_from_search(item)?;
            if seen.insert(video.id.clone()) {
                videos.push(video);
            } else {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            info!(duplicates, "dropped videos repeated across pages");
        }

        if options.content_details && !videos.is_empty() {
            videos = self.enrich(videos).await?;
        }
        Ok(videos)
    }

    /// Searches for channels. Search results carry no statistics; use
    /// [`Finder::get_channels`] for those.
    pub async fn search_channels(&mut self, options: &SearchOptions) -> Result<Vec<Channel>> {
        let request = options.to_request(Some(ResourceType::Channel))?;
        let items = self.collect_items(request, options).await?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut channels = Vec::with_capacity(items.len());
        for item in items {
            let channel = channel_from_search(item)?;
            if seen.insert(channel.id.clone()) {
                channels.push(channel);
            }
        }
        Ok(channels)
    }

    /// Full records for the given video ids, in the order the API returns
    /// them. Unknown ids are silently absent from the result.
    pub async fn get_videos(&mut self, ids: &[String]) -> Result<Vec<Video>> {
        self.api
            .videos_all(ids, Some(VIDEO_LOOKUP_PART))
            .await?
            .into_iter()
            .map(video_from_lookup)
            .collect()
    }

    /// Channel records with statistics.
    pub async fn get_channels(&mut self, ids: &[String]) -> Result<Vec<Channel>> {
        self.api
            .channels_all(ids, Some(CHANNEL_LOOKUP_PART))
            .await?
            .into_iter()
            .map(channel_from_lookup)
            .collect()
    }

    pub async fn get_channel(&mut self, id: &str) -> Result<Option<Channel>> {
        let mut channels = self.get_channels(&[id.to_owned()]).await?;
        Ok(channels.pop())
    }

    async fn collect_items(
        &mut self,
        request: SearchRequest,
        options: &SearchOptions,
    ) -> Result<Vec<serde_json::Value>> {
        if !options.fetch_all {
            return Ok(self.api.search(&request).await?.items);
        }

        if options.max_pages.is_none() {
            info!("fetching every page; each one costs quota");
        }
        let mut pages = self.api.search_pages(request).limit(options.max_pages);
        let mut items = Vec::new();
        let mut total_results = None;
        while let Some(page) = pages.next_page().await? {
            total_results = total_results.or(page.total_results());
            items.extend(page.items);
        }
        info!(
            pages = pages.pages_fetched(),
            items = items.len(),
            total_results,
            "fetched all search pages"
        );
        Ok(items)
    }

    async fn enrich(&mut self, videos: Vec<Video>) -> Result<Vec<Video>> {
        let ids: Vec<String> = videos.iter().map(|v| v.id.clone()).collect();
        let mut details = HashMap::new();
        for item in self.api.videos_all(&ids, Some(CONTENT_DETAILS_PART)).await? {
            let (id, content) = models::content_details_from_lookup(item)?;
            if let Some(content) = content {
                details.insert(id, content);
            }
        }

        videos
            .into_iter()
            .map(|video| match details.get(&video.id) {
                Some(content) => video.with_content_details(content),
                None => {
                    warn!(id = %video.id, "no content details returned for video");
                    Ok(video)
                }
            })
            .collect()
    }
}
