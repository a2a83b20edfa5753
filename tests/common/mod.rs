#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{Value, json};
use video_finder::{Error, Finder, HttpRequest, HttpResponse, Result, Transport, YoutubeApi};

/// Replies with scripted responses in order and records every request.
#[derive(Default)]
pub struct FixtureTransport {
    replies: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FixtureTransport {
    pub fn new(replies: impl IntoIterator<Item = HttpResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::default(),
        }
    }

    /// Queues a network-level failure after the replies already scripted.
    pub fn fail_next(self, message: &str) -> Self {
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, message.to_owned());
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(Error::Transport(Box::new(err))));
        self
    }

    /// Queues one more successful reply.
    pub fn then(self, reply: HttpResponse) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url.rsplit('/').next().unwrap_or_default().to_owned())
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

impl Transport for FixtureTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        reply.expect("fixture ran out of scripted responses")
    }
}

pub fn finder(replies: impl IntoIterator<Item = HttpResponse>) -> Finder<FixtureTransport> {
    finder_over(FixtureTransport::new(replies))
}

pub fn finder_over(transport: FixtureTransport) -> Finder<FixtureTransport> {
    let api = YoutubeApi::with_transport("fake-dev-key", transport).unwrap();
    Finder::with_api(api)
}

pub fn ok(body: Value) -> HttpResponse {
    HttpResponse::new(200, body.to_string())
}

pub fn search_video(id: &str, title: &str) -> Value {
    json!({
        "kind": "youtube#searchResult",
        "id": {"kind": "youtube#video", "videoId": id},
        "snippet": {
            "publishedAt": "2021-03-04T05:06:07Z",
            "channelId": "UCsummon",
            "title": title,
            "description": format!("about {title}"),
            "thumbnails": {"medium": {"url": format!("https://i.ytimg.com/vi/{id}/mqdefault.jpg")}},
            "channelTitle": "Summoners",
            "liveBroadcastContent": "none"
        }
    })
}

pub fn search_channel(id: &str, title: &str) -> Value {
    json!({
        "kind": "youtube#searchResult",
        "id": {"kind": "youtube#channel", "channelId": id},
        "snippet": {
            "publishedAt": "2015-01-01T00:00:00Z",
            "channelId": id,
            "title": title,
            "description": ""
        }
    })
}

pub fn page(items: Vec<Value>, next: Option<&str>) -> HttpResponse {
    let mut body = json!({
        "kind": "youtube#searchListResponse",
        "pageInfo": {"totalResults": 1000, "resultsPerPage": 50},
        "items": items
    });
    if let Some(token) = next {
        body["nextPageToken"] = json!(token);
    }
    ok(body)
}

pub fn details(entries: &[(&str, &str)]) -> HttpResponse {
    let items: Vec<Value> = entries
        .iter()
        .map(|(id, duration)| {
            json!({
                "kind": "youtube#video",
                "id": id,
                "contentDetails": {"duration": duration, "definition": "hd"}
            })
        })
        .collect();
    ok(json!({"kind": "youtube#videoListResponse", "items": items}))
}
