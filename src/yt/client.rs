use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use super::params::{Endpoint, LookupRequest, MAX_IDS_PER_CALL, SearchRequest, validate};
use super::transport::{DEFAULT_TIMEOUT, HttpRequest, HttpResponse, ReqwestTransport, Transport};
use super::types::RawResponse;
use crate::cache::{ResponseCache, cache_key};
use crate::config::Settings;
use crate::error::{Error, Result, remote_error};

pub const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Client for the read-only `search`, `videos` and `channels` endpoints.
///
/// Every call takes `&mut self` and is awaited to completion before the next
/// one can start, so the response cache needs no synchronisation.
#[derive(Debug)]
pub struct YoutubeApi<T = ReqwestTransport> {
    api_key: String,
    base_url: String,
    transport: T,
    cache: ResponseCache,
}

impl YoutubeApi<ReqwestTransport> {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_transport(api_key, ReqwestTransport::new(DEFAULT_TIMEOUT)?)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let transport = ReqwestTransport::new(settings.timeout())?;
        Ok(Self::with_transport(settings.api_key()?, transport)?
            .with_base_url(settings.base_url.clone())
            .with_cache(settings.response_cache()))
    }
}

impl<T: Transport> YoutubeApi<T> {
    pub fn with_transport(api_key: impl Into<String>, transport: T) -> Result<Self> {
        let api_key = api_key.into().trim().to_owned();
        if api_key.is_empty() {
            return Err(Error::Config("API key is empty".into()));
        }
        Ok(Self {
            api_key,
            base_url: BASE_URL.to_owned(),
            transport,
            cache: ResponseCache::Disabled,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResponseCache {
        &mut self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One page of `search.list`.
    pub async fn search(&mut self, request: &SearchRequest) -> Result<RawResponse> {
        self.call(Endpoint::Search, request.params()).await
    }

    /// `videos.list` for at most 50 ids. `part` defaults to
    /// `snippet,contentDetails`.
    pub async fn list_videos(&mut self, ids: &[String], part: Option<&str>) -> Result<RawResponse> {
        self.lookup(Endpoint::Videos, ids, part).await
    }

    /// `channels.list` for at most 50 ids. `part` defaults to `snippet`.
    pub async fn list_channels(&mut self, ids: &[String], part: Option<&str>) -> Result<RawResponse> {
        self.lookup(Endpoint::Channels, ids, part).await
    }

    /// `videos.list` over any number of ids, one call per 50. Items come back
    /// in batch order.
    pub async fn videos_all(
        &mut self,
        ids: &[String],
        part: Option<&str>,
    ) -> Result<Vec<serde_json::Value>> {
        self.lookup_all(Endpoint::Videos, ids, part).await
    }

    pub async fn channels_all(
        &mut self,
        ids: &[String],
        part: Option<&str>,
    ) -> Result<Vec<serde_json::Value>> {
        self.lookup_all(Endpoint::Channels, ids, part).await
    }

    async fn lookup(
        &mut self,
        endpoint: Endpoint,
        ids: &[String],
        part: Option<&str>,
    ) -> Result<RawResponse> {
        match LookupRequest::new(endpoint, ids, part)? {
            Some(request) => self.call(request.endpoint(), request.params()).await,
            None => Ok(RawResponse::default()),
        }
    }

    async fn lookup_all(
        &mut self,
        endpoint: Endpoint,
        ids: &[String],
        part: Option<&str>,
    ) -> Result<Vec<serde_json::Value>> {
        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_CALL) {
            let resp = self.lookup(endpoint, chunk, part).await?;
            items.extend(resp.items);
        }
        Ok(items)
    }

    #[instrument(skip_all, fields(endpoint = %endpoint))]
    async fn call(
        &mut self,
        endpoint: Endpoint,
        params: &BTreeMap<String, String>,
    ) -> Result<RawResponse> {
        validate(endpoint, params)?;

        let key = cache_key(endpoint, params);
        if let Some(hit) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(hit);
        }

        let mut request = HttpRequest::new(format!("{}/{}", self.base_url, endpoint.path()));
        for (name, value) in params {
            request = request.param(name.as_str(), value.as_str());
        }
        request = request.param("key", self.api_key.as_str());
        debug!(url = %request.redacted_url(), "sending request");

        let response = self.transport.send(request).await?;
        let raw = decode_response(endpoint, response)?;
        debug!(
            items = raw.items.len(),
            next_page = raw.next_page_token.is_some(),
            "response decoded"
        );

        if let Err(err) = self.cache.put(&key, &raw) {
            warn!(%err, "could not store response in cache");
        }
        Ok(raw)
    }
}

fn decode_response(endpoint: Endpoint, response: HttpResponse) -> Result<RawResponse> {
    if !response.is_success() {
        return Err(remote_error(endpoint.path(), response.status, &response.body));
    }
    let value: serde_json::Value = serde_json::from_str(&response.body).map_err(|err| {
        Error::Mapping(format!("{endpoint} response is not JSON: {err}"))
    })?;
    if value.get("error").is_some() {
        return Err(remote_error(endpoint.path(), response.status, &response.body));
    }
    if !value.get("items").is_some_and(|items| items.is_array()) {
        return Err(Error::Mapping(format!(
            "{endpoint} response has no `items` list"
        )));
    }
    serde_json::from_value(value)
        .map_err(|err| Error::Mapping(format!("{endpoint} response: {err}")))
}
