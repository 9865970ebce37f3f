// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Mock engine helpers shared by the integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use haukka::{EngineClient, EngineConfig, NoopReplacer, Orchestrator, PollPolicy, RateLimitConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Engine config pointing at `server` with millisecond polling
pub fn fast_config(server: &MockServer) -> EngineConfig {
    let fast = PollPolicy::new(Duration::from_millis(1), Some(Duration::from_secs(5)));
    EngineConfig::new()
        .api_url(server.uri())
        .api_key("test-key")
        .spider_poll(fast)
        .scanner_poll(fast)
}

/// Orchestrator over `server` without the startup rate-limit capture
pub fn orchestrator(server: &MockServer) -> Orchestrator {
    let config = fast_config(server);
    let engine = EngineClient::new(&config).unwrap();
    Orchestrator::from_parts(
        engine,
        config,
        Arc::new(NoopReplacer),
        RateLimitConfig::new(0, 2),
    )
}

/// Answer `GET /JSON/{component}/{kind}/{name}/` with `body`
pub async fn mount_json(server: &MockServer, component: &str, kind: &str, name: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/JSON/{}/{}/{}/", component, kind, name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Answer every other action with `{"Result": "OK"}`. Mount last.
pub async fn mount_action_fallback(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/JSON/[^/]+/action/[^/]+/$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Result": "OK"})))
        .mount(server)
        .await;
}

/// Engine error response
pub fn engine_error(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({"code": code, "message": message}))
}

/// Replies with each template in turn, repeating the last one
pub struct Sequence {
    calls: AtomicUsize,
    replies: Vec<ResponseTemplate>,
}

impl Sequence {
    pub fn new(replies: Vec<ResponseTemplate>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            replies,
        }
    }

    /// Progress documents `{"status": "<n>"}` for each value
    pub fn progress(values: &[u8]) -> Self {
        Self::new(
            values
                .iter()
                .map(|v| ResponseTemplate::new(200).set_body_json(json!({"status": v.to_string()})))
                .collect(),
        )
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.replies.len() - 1);
        self.replies[index].clone()
    }
}

/// Replacer `addRule`/`removeRule` that, like the engine, rejects a rule
/// whose description is already present
#[derive(Default)]
pub struct ReplacerRules {
    present: parking_lot::Mutex<HashSet<String>>,
}

impl Respond for ReplacerRules {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let description = query(request, "description").unwrap_or_default();
        let mut present = self.present.lock();
        if request.url.path().ends_with("/addRule/") {
            if !present.insert(description) {
                return engine_error(400, "already_exists", "Already exists");
            }
        } else if !present.remove(&description) {
            return engine_error(400, "does_not_exist", "Does not exist");
        }
        ResponseTemplate::new(200).set_body_json(json!({"Result": "OK"}))
    }
}

/// Requests received for the endpoint named `name` under `component`
pub async fn calls_to(server: &MockServer, component: &str, name: &str) -> Vec<Request> {
    let suffix = format!("/{}/", name);
    let marker = format!("/{}/", component);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path().ends_with(&suffix) && r.url.path().contains(&marker))
        .collect()
}

/// Endpoint names of every received request, in order
pub async fn call_log(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| {
            let segments: Vec<&str> = r.url.path().trim_matches('/').split('/').collect();
            match segments.as_slice() {
                [_, component, _, name] => format!("{}/{}", component, name),
                _ => r.url.path().to_string(),
            }
        })
        .collect()
}

/// Value of query parameter `key`
pub fn query(request: &Request, key: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Decoded form parameter `key` from a POST body
pub fn form_value(request: &Request, key: &str) -> Option<String> {
    url::form_urlencoded::parse(&request.body)
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// HAR transaction document for `url`
pub fn message_har(method: &str, url: &str) -> Value {
    json!({
        "log": {
            "version": "1.2",
            "creator": {"name": "engine", "version": "2.14.0"},
            "entries": [{
                "startedDateTime": "2026-01-01T10:00:00.000+00:00",
                "time": 5,
                "request": {
                    "method": method,
                    "url": url,
                    "httpVersion": "HTTP/1.1",
                    "cookies": [],
                    "headers": [{"name": "Host", "value": "app.local"}],
                    "queryString": [],
                    "headersSize": -1,
                    "bodySize": 0
                },
                "response": {"status": 200}
            }]
        }
    })
}
