use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::EnvFilter;

use video_finder::{
    CacheMode, Channel, ChannelType, EventType, Finder, Order, SearchOptions, Settings, Video,
    VideoCaption, VideoDefinition, VideoDuration, VideoEmbeddable,
};

#[derive(Parser, Debug)]
#[command(name = "video-finder", about = "Search YouTube videos and channels from the terminal")]
struct Cli {
    /// API key (overrides settings, YOUTUBE_API_KEY and YT_API_private)
    #[arg(long, global = true, value_name = "KEY")]
    api_key: Option<String>,

    /// Replay earlier responses instead of spending quota
    #[arg(long, global = true, value_enum)]
    cache: Option<CacheArg>,

    /// Directory for the response cache
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Limit printed results
    #[arg(long, global = true, default_value_t = 50)]
    limit: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum CacheArg {
    Disabled,
    Memory,
    Directory,
}

impl From<CacheArg> for CacheMode {
    fn from(arg: CacheArg) -> Self {
        match arg {
            CacheArg::Disabled => CacheMode::Disabled,
            CacheArg::Memory => CacheMode::Memory,
            CacheArg::Directory => CacheMode::Directory,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for videos
    Search {
        query: String,
        #[command(flatten)]
        filters: SearchArgs,
        /// Follow page tokens until the result set is exhausted
        #[arg(long)]
        all: bool,
        /// Stop after this many pages when --all is given
        #[arg(long, value_name = "N")]
        max_pages: Option<NonZeroUsize>,
        /// Look up duration and definition for each video
        #[arg(long)]
        details: bool,
        #[arg(long)]
        event_type: Option<EventType>,
        #[arg(long)]
        caption: Option<VideoCaption>,
        #[arg(long)]
        duration: Option<VideoDuration>,
        #[arg(long)]
        embeddable: Option<VideoEmbeddable>,
        #[arg(long)]
        definition: Option<VideoDefinition>,
        #[arg(long, value_name = "VIDEO_ID")]
        related_to: Option<String>,
    },
    /// Search for channels
    ChannelsSearch {
        query: String,
        #[command(flatten)]
        filters: SearchArgs,
        #[arg(long)]
        all: bool,
        #[arg(long, value_name = "N")]
        max_pages: Option<NonZeroUsize>,
    },
    /// Look up videos by id
    Videos {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Look up channels by id
    Channels {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Store an API key in the settings file
    SetKey { key: String },
    /// Remove every cached response
    ClearCache,
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[arg(long)]
    channel_id: Option<String>,
    #[arg(long)]
    channel_type: Option<ChannelType>,
    #[arg(long)]
    order: Option<Order>,
    #[arg(long, value_name = "N")]
    max_results: Option<u32>,
    #[arg(long, value_name = "TOKEN")]
    page_token: Option<String>,
    /// Only results published after this RFC 3339 timestamp
    #[arg(long, value_name = "TIME", value_parser = parse_time)]
    after: Option<OffsetDateTime>,
    /// Only results published before this RFC 3339 timestamp
    #[arg(long, value_name = "TIME", value_parser = parse_time)]
    before: Option<OffsetDateTime>,
    /// Only results from the last HOURS hours (overrides --after)
    #[arg(long, value_name = "HOURS")]
    hours: Option<i64>,
    #[arg(long, value_name = "LANG")]
    language: Option<String>,
    #[arg(long, value_name = "CODE")]
    region: Option<String>,
}

impl SearchArgs {
    fn into_options(self, query: String) -> SearchOptions {
        let published_after = match self.hours {
            Some(hours) => Some(OffsetDateTime::now_utc() - Duration::hours(hours)),
            None => self.after,
        };
        SearchOptions {
            search_query: Some(query),
            channel_id: self.channel_id,
            channel_type: self.channel_type,
            max_results: self.max_results,
            order: self.order,
            page_token: self.page_token,
            published_after,
            published_before: self.before,
            relevance_language: self.language,
            region_code: self.region,
            ..SearchOptions::default()
        }
    }
}

fn parse_time(s: &str) -> Result<OffsetDateTime, String> {
    OffsetDateTime::parse(s, &Rfc3339).map_err(|err| format!("expected RFC 3339 time: {err}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,video_finder=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load_or_default();
    if let Some(key) = cli.api_key.as_ref() {
        settings.api_key = key.trim().to_owned();
    }
    if let Some(mode) = cli.cache {
        settings.cache = mode.into();
    }
    if let Some(dir) = cli.cache_dir.clone() {
        settings.cache_dir = Some(dir);
    }

    match &cli.command {
        Command::SetKey { key } => {
            let mut stored = Settings::load_or_default();
            stored.api_key = key.trim().to_owned();
            stored.api_key().context("refusing to store an empty key")?;
            stored.save().context("saving settings")?;
            println!("API key saved");
            return Ok(());
        }
        Command::ClearCache => {
            let mut cache = video_finder::ResponseCache::directory(settings.cache_dir());
            cache.clear().context("clearing response cache")?;
            println!("cleared {}", settings.cache_dir().display());
            return Ok(());
        }
        _ => {}
    }

    let mut finder = Finder::from_settings(&settings).context("creating API client")?;

    match cli.command {
        Command::Search {
            query,
            filters,
            all,
            max_pages,
            details,
            event_type,
            caption,
            duration,
            embeddable,
            definition,
            related_to,
        } => {
            let options = SearchOptions {
                fetch_all: all,
                max_pages: max_pages.map(NonZeroUsize::get),
                content_details: details,
                event_type,
                video_caption: caption,
                video_duration: duration,
                video_embeddable: embeddable,
                video_definition: definition,
                related_to_video_id: related_to,
                ..filters.into_options(query)
            };
            let videos = finder
                .search_videos(&options)
                .await
                .context("search.list failed; check API key, quota, or filters")?;
            print_videos(&videos, cli.json, cli.limit)?;
        }
        Command::ChannelsSearch {
            query,
            filters,
            all,
            max_pages,
        } => {
            let options = SearchOptions {
                fetch_all: all,
                max_pages: max_pages.map(NonZeroUsize::get),
                ..filters.into_options(query)
            };
            let channels = finder
                .search_channels(&options)
                .await
                .context("search.list failed; check API key, quota, or filters")?;
            print_channels(&channels, cli.json, cli.limit)?;
        }
        Command::Videos { ids } => {
            let videos = finder.get_videos(&ids).await.context("videos.list failed")?;
            print_videos(&videos, cli.json, cli.limit)?;
        }
        Command::Channels { ids } => {
            let channels = finder
                .get_channels(&ids)
                .await
                .context("channels.list failed")?;
            print_channels(&channels, cli.json, cli.limit)?;
        }
        Command::SetKey { .. } | Command::ClearCache => unreachable!("handled above"),
    }

    Ok(())
}

fn print_videos(videos: &[Video], json: bool, limit: usize) -> anyhow::Result<()> {
    let shown = &videos[..videos.len().min(limit)];
    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }
    println!("videos: {} (showing {})", videos.len(), shown.len());
    for video in shown {
        let published = video
            .published_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| video.published_at.to_string());
        let duration = video
            .duration_secs
            .map(|secs| format!("{secs:>6}s"))
            .unwrap_or_else(|| "      -".to_owned());
        println!("{published} | {duration} | {} | {}", video.url(), video.title);
    }
    Ok(())
}

fn print_channels(channels: &[Channel], json: bool, limit: usize) -> anyhow::Result<()> {
    let shown = &channels[..channels.len().min(limit)];
    if json {
        println!("{}", serde_json::to_string_pretty(shown)?);
        return Ok(());
    }
    println!("channels: {} (showing {})", channels.len(), shown.len());
    for channel in shown {
        let subscribers = channel
            .statistics
            .as_ref()
            .and_then(|s| s.subscriber_count)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_owned());
        println!("{} | {:>10} subs | {}", channel.url(), subscribers, channel.title);
    }
    Ok(())
}
