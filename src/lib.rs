//! # video-finder
//!
//! A small client for the read-only parts of the YouTube Data API v3: search
//! for videos and channels and look up their metadata with nothing but an API
//! key.
//!
//! ```no_run
//! use video_finder::{Finder, SearchOptions};
//!
//! # async fn run() -> video_finder::Result<()> {
//! let mut finder = Finder::new("my-api-key")?;
//! let options = SearchOptions {
//!     content_details: true,
//!     ..SearchOptions::query("summon python")
//! };
//! for video in finder.search_videos(&options).await? {
//!     println!("{} {:?}s {}", video.id, video.duration_secs, video.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Every call costs quota. During development a [`ResponseCache`] can replay
//! earlier responses instead of asking again.

pub mod cache;
pub mod config;
pub mod duration;
pub mod error;
pub mod finder;
pub mod models;
pub mod options;
pub mod yt;

pub use {
    cache::ResponseCache,
    config::{CacheMode, Settings},
    error::{Error, Result},
    finder::Finder,
    models::{Channel, ChannelStatistics, Definition, Video},
    options::SearchOptions,
    yt::client::YoutubeApi,
    yt::params::{
        ChannelType, Endpoint, EventType, Order, ResourceType, SafeSearch, SearchRequest,
        VideoCaption, VideoDefinition, VideoDuration, VideoEmbeddable,
    },
    yt::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport},
    yt::types::RawResponse,
};
