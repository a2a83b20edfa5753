mod common;

use std::collections::HashSet;

use common::{
    FixtureTransport, details, finder, finder_over, ok, page, search_channel, search_video,
};
use serde_json::json;
use video_finder::{Error, HttpResponse, ResourceType, ResponseCache, SearchOptions, Video};

fn video_ids(videos: &[Video]) -> Vec<String> {
    videos.iter().map(|v| v.id.clone()).collect()
}

#[tokio::test]
async fn summon_python_yields_two_videos_in_order() {
    let mut finder = finder([page(
        vec![
            search_video("abc", "Summon Python I"),
            search_video("def", "Summon Python II"),
        ],
        Some("B"),
    )]);
    let options = SearchOptions {
        resource_type: Some(ResourceType::Video),
        ..SearchOptions::query("summon python")
    };

    let videos = finder.search_videos(&options).await.unwrap();

    assert_eq!(video_ids(&videos), vec!["abc", "def"]);
    assert_eq!(videos[0].title, "Summon Python I");
    assert_eq!(videos[1].title, "Summon Python II");
    assert_eq!(videos[0].channel_id.as_deref(), Some("UCsummon"));
    assert_eq!(videos[0].duration_secs, None);

    let sent = finder.api().transport().requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].get("q"), Some("summon python"));
    assert_eq!(sent[0].get("type"), Some("video"));
    assert_eq!(sent[0].get("order"), Some("date"));
    assert_eq!(sent[0].get("maxResults"), Some("50"));
    assert_eq!(sent[0].get("key"), Some("fake-dev-key"));
}

#[tokio::test]
async fn single_page_ignores_next_token() {
    let mut finder = finder([page(
        vec![search_video("c", "c"), search_video("a", "a"), search_video("b", "b")],
        Some("B"),
    )]);
    let videos = finder
        .search_videos(&SearchOptions::query("rust"))
        .await
        .unwrap();

    assert_eq!(video_ids(&videos), vec!["c", "a", "b"]);
    assert_eq!(finder.api().transport().requests().len(), 1);
}

#[tokio::test]
async fn fetch_all_concatenates_pages_in_order() {
    let mut finder = finder([
        page(vec![search_video("a1", "a1"), search_video("a2", "a2")], Some("B")),
        page(vec![search_video("b1", "b1"), search_video("b2", "b2")], Some("C")),
        page(vec![search_video("c1", "c1")], None),
    ]);
    let options = SearchOptions {
        fetch_all: true,
        ..SearchOptions::query("rust")
    };

    let videos = finder.search_videos(&options).await.unwrap();

    let got = video_ids(&videos);
    assert_eq!(got, vec!["a1", "a2", "b1", "b2", "c1"]);
    let unique: HashSet<&String> = got.iter().collect();
    assert_eq!(unique.len(), got.len());

    let tokens: Vec<Option<String>> = finder
        .api()
        .transport()
        .requests()
        .iter()
        .map(|r| r.get("pageToken").map(str::to_owned))
        .collect();
    assert_eq!(tokens, vec![None, Some("B".into()), Some("C".into())]);
}

#[tokio::test]
async fn fetch_all_drops_ids_repeated_across_pages() {
    let mut finder = finder([
        page(vec![search_video("a", "a"), search_video("b", "b")], Some("B")),
        page(vec![search_video("b", "b"), search_video("c", "c")], None),
    ]);
    let options = SearchOptions {
        fetch_all: true,
        ..SearchOptions::query("rust")
    };
    let videos = finder.search_videos(&options).await.unwrap();
    assert_eq!(video_ids(&videos), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn fetch_all_stops_on_empty_page() {
    let mut finder = finder([
        page(vec![search_video("a", "a")], Some("B")),
        page(vec![], Some("C")),
    ]);
    let options = SearchOptions {
        fetch_all: true,
        ..SearchOptions::query("rust")
    };
    let videos = finder.search_videos(&options).await.unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(finder.api().transport().requests().len(), 2);
}

#[tokio::test]
async fn max_pages_caps_fetch_all() {
    let mut finder = finder([
        page(vec![search_video("a", "a")], Some("B")),
        page(vec![search_video("b", "b")], Some("C")),
        page(vec![search_video("c", "c")], None),
    ]);
    let options = SearchOptions {
        fetch_all: true,
        max_pages: Some(2),
        ..SearchOptions::query("rust")
    };
    let videos = finder.search_videos(&options).await.unwrap();
    assert_eq!(video_ids(&videos), vec!["a", "b"]);
    assert_eq!(finder.api().transport().remaining(), 1);
}

#[tokio::test]
async fn content_details_enrich_without_reordering() {
    let mut finder = finder([
        page(
            vec![search_video("zz", "zz"), search_video("aa", "aa"), search_video("mm", "mm")],
            None,
        ),
        // the lookup answers in a different order than it was asked
        details(&[("mm", "PT1M"), ("zz", "PT1H2M3S"), ("aa", "PT45S")]),
    ]);
    let options = SearchOptions {
        content_details: true,
        ..SearchOptions::query("rust")
    };

    let videos = finder.search_videos(&options).await.unwrap();

    assert_eq!(video_ids(&videos), vec!["zz", "aa", "mm"]);
    let durations: Vec<Option<u64>> = videos.iter().map(|v| v.duration_secs).collect();
    assert_eq!(durations, vec![Some(3723), Some(45), Some(60)]);
    assert!(videos.iter().all(|v| v.definition.is_some()));

    let sent = finder.api().transport().requests();
    assert_eq!(finder.api().transport().paths(), vec!["search", "videos"]);
    assert_eq!(sent[1].get("id"), Some("zz,aa,mm"));
    assert_eq!(sent[1].get("part"), Some("contentDetails"));
}

#[tokio::test]
async fn content_details_batch_large_result_sets() {
    let first: Vec<_> = (0..50).map(|i| search_video(&format!("a{i:02}"), "a")).collect();
    let second: Vec<_> = (0..20).map(|i| search_video(&format!("b{i:02}"), "b")).collect();
    let lookup_a: Vec<(String, &str)> = (0..50).map(|i| (format!("a{i:02}"), "PT10S")).collect();
    let lookup_b: Vec<(String, &str)> = (0..20).map(|i| (format!("b{i:02}"), "PT20S")).collect();
    let as_refs = |v: &Vec<(String, &'static str)>| -> HttpResponse {
        let entries: Vec<(&str, &str)> = v.iter().map(|(id, d)| (id.as_str(), *d)).collect();
        details(&entries)
    };

    let mut finder = finder([
        page(first, Some("B")),
        page(second, None),
        as_refs(&lookup_a),
        as_refs(&lookup_b),
    ]);
    let options = SearchOptions {
        fetch_all: true,
        content_details: true,
        ..SearchOptions::query("rust")
    };

    let videos = finder.search_videos(&options).await.unwrap();

    assert_eq!(videos.len(), 70);
    assert!(videos[..50].iter().all(|v| v.duration_secs == Some(10)));
    assert!(videos[50..].iter().all(|v| v.duration_secs == Some(20)));
    assert_eq!(
        finder.api().transport().paths(),
        vec!["search", "search", "videos", "videos"]
    );
}

#[tokio::test]
async fn quota_error_propagates_without_partial_result() {
    let quota = HttpResponse::new(
        403,
        json!({
            "error": {
                "code": 403,
                "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [{"domain": "youtube.quota", "reason": "quotaExceeded"}]
            }
        })
        .to_string(),
    );
    let mut finder = finder([page(vec![search_video("a", "a")], Some("B")), quota]);
    let options = SearchOptions {
        fetch_all: true,
        ..SearchOptions::query("rust")
    };

    let err = finder.search_videos(&options).await.unwrap_err();

    match &err {
        Error::Remote {
            endpoint,
            status,
            message,
            reason,
        } => {
            assert_eq!(*endpoint, "search");
            assert_eq!(*status, 403);
            assert!(message.contains("exceeded your quota"));
            assert_eq!(reason.as_deref(), Some("quotaExceeded"));
        }
        other => panic!("expected remote error, got {other:?}"),
    }
    assert!(err.is_quota_exceeded());
}

#[tokio::test]
async fn invalid_filters_fail_before_any_request() {
    let mut finder = finder(Vec::<HttpResponse>::new());
    let options = SearchOptions {
        resource_type: Some(ResourceType::Channel),
        ..SearchOptions::query("rust")
    };
    let err = finder.search_videos(&options).await.unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "type"));

    let options = SearchOptions {
        video_definition: Some(video_finder::VideoDefinition::High),
        ..SearchOptions::query("rust")
    };
    let err = finder.search_channels(&options).await.unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "videoDefinition"));

    assert!(finder.api().transport().requests().is_empty());
}

#[tokio::test]
async fn malformed_item_is_a_mapping_error() {
    let mut finder = finder([page(
        vec![search_video("a", "a"), json!({"id": {"kind": "youtube#video"}})],
        None,
    )]);
    let err = finder
        .search_videos(&SearchOptions::query("rust"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Mapping(_)));
}

#[tokio::test]
async fn search_channels_maps_channel_ids() {
    let mut finder = finder([page(
        vec![search_channel("UC1", "One"), search_channel("UC2", "Two")],
        None,
    )]);
    let channels = finder
        .search_channels(&SearchOptions::query("snakes"))
        .await
        .unwrap();

    let ids: Vec<&str> = channels.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["UC1", "UC2"]);
    assert!(channels.iter().all(|c| c.statistics.is_none()));
    let sent = finder.api().transport().requests();
    assert_eq!(sent[0].get("type"), Some("channel"));
}

#[tokio::test]
async fn get_channels_reads_statistics() {
    let mut finder = finder([ok(json!({
        "kind": "youtube#channelListResponse",
        "items": [{
            "id": "UCcIvNGMBSQWwo1v3n-ZRBCw",
            "snippet": {"title": "One", "description": "first", "publishedAt": "2010-01-01T00:00:00Z"},
            "statistics": {"viewCount": "10", "subscriberCount": "2", "hiddenSubscriberCount": false, "videoCount": "1"}
        }]
    }))]);

    let channel = finder
        .get_channel("UCcIvNGMBSQWwo1v3n-ZRBCw")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(channel.title, "One");
    assert_eq!(channel.statistics.unwrap().subscriber_count, Some(2));
    let sent = finder.api().transport().requests();
    assert_eq!(sent[0].get("part"), Some("snippet,statistics"));
    assert_eq!(sent[0].get("id"), Some("UCcIvNGMBSQWwo1v3n-ZRBCw"));
}

#[tokio::test]
async fn get_channel_of_unknown_id_is_none() {
    let mut finder = finder([ok(json!({"kind": "youtube#channelListResponse", "items": []}))]);
    assert!(finder.get_channel("UCnobody").await.unwrap().is_none());
}

#[tokio::test]
async fn get_videos_maps_full_records() {
    let mut finder = finder([ok(json!({
        "items": [{
            "id": "zhkFscdoMbs",
            "snippet": {"publishedAt": "2019-07-08T09:10:11Z", "title": "A talk", "channelId": "UC1"},
            "contentDetails": {"duration": "PT25M", "definition": "sd"}
        }]
    }))]);
    let videos = finder
        .get_videos(&["zhkFscdoMbs".to_owned()])
        .await
        .unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].duration_secs, Some(1500));
    assert_eq!(
        finder.api().transport().requests()[0].get("part"),
        Some("snippet,contentDetails")
    );
}

#[tokio::test]
async fn cached_search_is_replayed_without_transport() {
    let mut finder = finder([page(vec![search_video("abc", "abc")], None)]);
    *finder.api_mut().cache_mut() = ResponseCache::memory();

    let first = finder
        .search_videos(&SearchOptions::query("rust"))
        .await
        .unwrap();
    let second = finder
        .search_videos(&SearchOptions::query("rust"))
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(finder.api().transport().requests().len(), 1);
}

#[tokio::test]
async fn query_text_with_separators_gets_its_own_cache_entry() {
    let mut finder = finder([
        page(vec![search_video("us1", "us1")], None),
        page(vec![search_video("amp1", "amp1")], None),
    ]);
    *finder.api_mut().cache_mut() = ResponseCache::memory();

    let regional = SearchOptions {
        region_code: Some("US".into()),
        ..SearchOptions::query("x")
    };
    let first = finder.search_videos(&regional).await.unwrap();
    let second = finder
        .search_videos(&SearchOptions::query("x&regionCode=US"))
        .await
        .unwrap();

    assert_eq!(video_ids(&first), vec!["us1"]);
    assert_eq!(video_ids(&second), vec!["amp1"]);
    assert_eq!(finder.api().transport().requests().len(), 2);
}

#[tokio::test]
async fn zero_page_cap_fails_before_any_request() {
    let mut finder = finder(Vec::<HttpResponse>::new());
    let options = SearchOptions {
        fetch_all: true,
        max_pages: Some(0),
        ..SearchOptions::query("rust")
    };
    let err = finder.search_videos(&options).await.unwrap_err();
    assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "max_pages"));
    assert!(finder.api().transport().requests().is_empty());
}

#[tokio::test]
async fn network_failure_is_a_transport_error_and_not_cached() {
    let transport = FixtureTransport::default()
        .fail_next("connection reset by peer")
        .then(page(vec![search_video("a", "a")], None));
    let mut finder = finder_over(transport);
    *finder.api_mut().cache_mut() = ResponseCache::memory();

    let err = finder
        .search_videos(&SearchOptions::query("rust"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    assert!(err.status().is_none());
    assert_eq!(finder.api().transport().requests().len(), 1);
    match finder.api().cache() {
        ResponseCache::Memory(entries) => assert!(entries.is_empty()),
        other => panic!("expected memory cache, got {other:?}"),
    }

    // no retry happened, so the next search reaches the transport again
    let videos = finder
        .search_videos(&SearchOptions::query("rust"))
        .await
        .unwrap();
    assert_eq!(video_ids(&videos), vec!["a"]);
    assert_eq!(finder.api().transport().requests().len(), 2);
}
