// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Replay, crawl and active-scan phases against a mock engine

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use haukka::model::attributes;
use haukka::{
    CancelToken, Context, EngineClient, HarRequest, NoopReplacer, Orchestrator, PollPolicy,
    RateLimitConfig, RateLimitOverride, ScanIdentity, ScanPlan, Severity, SitemapEntry,
    SpiderSettings, Target,
};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context() -> Context {
    Context {
        id: "1".to_string(),
        name: "ctx".to_string(),
    }
}

fn alerts_document() -> serde_json::Value {
    json!({
        "alerts": [{
            "id": "11",
            "pluginId": "40012",
            "alert": "Cross Site Scripting (Reflected)",
            "name": "Cross Site Scripting (Reflected)",
            "risk": "High",
            "confidence": "Firm",
            "url": "http://app.local/search?q=x",
            "method": "GET",
            "param": "q",
            "attack": "<script>alert(1);</script>",
            "evidence": "<script>alert(1);</script>",
            "other": "",
            "description": "Reflected XSS",
            "solution": "Encode output",
            "reference": "https://owasp.org/xss\nhttps://cwe.mitre.org/data/definitions/79.html",
            "cweid": "79",
            "wascid": "8",
            "messageId": "42"
        }]
    })
}

#[tokio::test]
async fn test_spider_polls_until_complete() {
    let server = MockServer::start().await;
    mount_json(&server, "spider", "action", "scan", json!({"scan": "4"})).await;
    Mock::given(method("GET"))
        .and(path("/JSON/spider/view/status/"))
        .and(query_param("scanId", "4"))
        .respond_with(Sequence::progress(&[0, 30, 100]))
        .expect(3)
        .mount(&server)
        .await;
    mount_json(&server, "spider", "view", "fullResults", json!({"fullResults": []})).await;
    mount_action_fallback(&server).await;

    let orchestrator = orchestrator(&server);
    let scan_id = orchestrator
        .start_spider(
            &context(),
            &SpiderSettings::new("http://app.local").max_depth(3),
            &ScanIdentity::Anonymous,
            &[],
        )
        .await
        .unwrap();
    assert_eq!(scan_id, "4");

    let findings = orchestrator.retrieve_spider_result(&scan_id, None).await.unwrap();
    assert!(findings.is_empty());

    let depth = calls_to(&server, "spider", "setOptionMaxDepth").await;
    assert_eq!(query(&depth[0], "Integer").as_deref(), Some("3"));

    let scan = calls_to(&server, "spider", "scan").await;
    assert_eq!(query(&scan[0], "contextName").as_deref(), Some("ctx"));
    assert_eq!(query(&scan[0], "maxChildren").as_deref(), Some("-1"));
    assert!(calls_to(&server, "openapi", "importUrl").await.is_empty());
}

#[tokio::test]
async fn test_spider_as_user_imports_api_spec() {
    let server = MockServer::start().await;
    mount_json(&server, "spider", "action", "scanAsUser", json!({"scanAsUser": "5"})).await;
    mount_action_fallback(&server).await;

    let settings = SpiderSettings::new("http://app.local")
        .api_spec_url("http://app.local/openapi.json");
    let scan_id = orchestrator(&server)
        .start_spider(&context(), &settings, &ScanIdentity::User("7".to_string()), &[])
        .await
        .unwrap();
    assert_eq!(scan_id, "5");

    let import = calls_to(&server, "openapi", "importUrl").await;
    assert_eq!(query(&import[0], "url").as_deref(), Some("http://app.local/openapi.json"));

    let scan = calls_to(&server, "spider", "scanAsUser").await;
    assert_eq!(query(&scan[0], "contextId").as_deref(), Some("1"));
    assert_eq!(query(&scan[0], "userId").as_deref(), Some("7"));
    assert!(calls_to(&server, "spider", "scan").await.is_empty());
}

#[tokio::test]
async fn test_spider_results_carry_requests() {
    let server = MockServer::start().await;
    mount_json(&server, "spider", "view", "status", json!({"status": "100"})).await;
    mount_json(
        &server,
        "spider",
        "view",
        "fullResults",
        json!({"fullResults": [
            {"urlsInScope": [
                {"messageId": "1", "method": "GET", "url": "http://app.local/", "statusCode": "200", "processed": "true"},
                {"messageId": "2", "method": "GET", "url": "http://app.local/about", "statusCode": "200", "processed": "true"}
            ]},
            {"urlsOutOfScope": ["http://elsewhere.local/"]},
            {"urlsIoError": []}
        ]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/OTHER/core/other/messageHar/"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_har("GET", "http://app.local/")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/OTHER/core/other/messageHar/"))
        .and(query_param("id", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not a har"))
        .mount(&server)
        .await;

    let findings = orchestrator(&server)
        .retrieve_spider_result("0", None)
        .await
        .unwrap();

    assert_eq!(findings.len(), 2);
    assert_eq!(findings[0].location, "http://app.local/");
    assert_eq!(
        findings[0].get_attribute(attributes::REQUEST).unwrap()["method"],
        "GET"
    );
    // enrichment failed, the record URL stands in
    assert_eq!(findings[1].location, "http://app.local/about");
    assert!(findings[1].get_attribute(attributes::REQUEST).is_none());
}

#[tokio::test]
async fn test_spider_timeout_is_an_error() {
    let server = MockServer::start().await;
    mount_json(&server, "spider", "view", "status", json!({"status": "10"})).await;

    let config = fast_config(&server)
        .spider_poll(PollPolicy::new(Duration::from_millis(2), Some(Duration::from_millis(20))));
    let orchestrator = Orchestrator::from_parts(
        EngineClient::new(&config).unwrap(),
        config,
        Arc::new(NoopReplacer),
        RateLimitConfig::new(0, 2),
    );

    let err = orchestrator.retrieve_spider_result("0", None).await.unwrap_err();
    assert!(err.is_timeout());
    assert!(calls_to(&server, "spider", "fullResults").await.is_empty());
}

#[tokio::test]
async fn test_cancelled_scan_stops_polling() {
    let server = MockServer::start().await;
    mount_json(&server, "ascan", "view", "status", json!({"status": "50"})).await;

    let token = CancelToken::new();
    token.cancel();

    let err = orchestrator(&server)
        .retrieve_scanner_result("0", "http://app.local", Some(&token))
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(calls_to(&server, "core", "alerts").await.is_empty());
}

#[tokio::test]
async fn test_scanner_alerts_become_findings() {
    let server = MockServer::start().await;
    mount_json(&server, "ascan", "view", "status", json!({"status": "100"})).await;
    Mock::given(method("GET"))
        .and(path("/JSON/core/view/alerts/"))
        .and(query_param("baseurl", "http://app.local"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alerts_document()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/OTHER/core/other/messageHar/"))
        .and(query_param("id", "42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(message_har("GET", "http://app.local/search?q=x")),
        )
        .mount(&server)
        .await;

    let findings = orchestrator(&server)
        .retrieve_scanner_result("0", "http://app.local", None)
        .await
        .unwrap();

    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.severity, Some(Severity::High));
    assert_eq!(finding.name, "Cross Site Scripting (Reflected)");
    assert_eq!(finding.location, "http://app.local/search?q=x");
    assert_eq!(finding.get_attribute(attributes::CONFIDENCE).unwrap(), "Firm");

    let reference = finding.reference.as_ref().unwrap();
    assert_eq!(reference.id, "CVE-79");
    assert_eq!(reference.source, "https://cwe.mitre.org/data/definitions/79.html");

    let har = finding.get_attribute(attributes::HAR).unwrap();
    assert_eq!(har["log"]["entries"][0]["request"]["url"], "http://app.local/search?q=x");
}

#[tokio::test]
async fn test_missing_transaction_keeps_finding() {
    let server = MockServer::start().await;
    mount_json(&server, "ascan", "view", "status", json!({"status": "100"})).await;
    mount_json(&server, "core", "view", "alerts", alerts_document()).await;
    Mock::given(method("GET"))
        .and(path("/OTHER/core/other/messageHar/"))
        .respond_with(engine_error(400, "does_not_exist", "No such message"))
        .mount(&server)
        .await;

    let findings = orchestrator(&server)
        .retrieve_scanner_result("0", "http://app.local", None)
        .await
        .unwrap();

    assert_eq!(findings.len(), 1);
    assert!(findings[0].get_attribute(attributes::HAR).is_none());
    assert_eq!(findings[0].severity, Some(Severity::High));
}

#[tokio::test]
async fn test_active_scan_configuration() {
    let server = MockServer::start().await;
    mount_json(&server, "ascan", "action", "scanAsUser", json!({"scanAsUser": "9"})).await;
    mount_action_fallback(&server).await;

    let scan_id = orchestrator(&server)
        .start_active_scan(
            &context(),
            "http://app.local",
            &ScanIdentity::User("7".to_string()),
            &RateLimitOverride::none().threads_per_host(6),
            &[],
        )
        .await
        .unwrap();
    assert_eq!(scan_id, "9");

    let log = call_log(&server).await;
    assert_eq!(log[0], "ascan/enableAllScanners");
    assert_eq!(log.last().map(String::as_str), Some("ascan/scanAsUser"));

    let csrf = calls_to(&server, "ascan", "setOptionHandleAntiCSRFTokens").await;
    assert_eq!(query(&csrf[0], "Boolean").as_deref(), Some("true"));

    // unset override fields fall back to the captured defaults
    let delay = calls_to(&server, "ascan", "setOptionDelayInMs").await;
    assert_eq!(query(&delay[0], "Integer").as_deref(), Some("0"));
    let threads = calls_to(&server, "ascan", "setOptionThreadPerHost").await;
    assert_eq!(query(&threads[0], "Integer").as_deref(), Some("6"));

    let scan = calls_to(&server, "ascan", "scanAsUser").await;
    assert_eq!(query(&scan[0], "userId").as_deref(), Some("7"));
    assert_eq!(query(&scan[0], "recurse").as_deref(), Some("true"));
}

#[tokio::test]
async fn test_rate_limits_captured_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/JSON/ascan/view/optionDelayInMs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"DelayInMs": "100"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/JSON/ascan/view/optionThreadPerHost/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ThreadPerHost": 2})))
        .expect(1)
        .mount(&server)
        .await;
    mount_json(&server, "ascan", "action", "scan", json!({"scan": "0"})).await;
    mount_action_fallback(&server).await;

    let orchestrator = Orchestrator::connect(fast_config(&server)).await.unwrap();
    assert_eq!(orchestrator.rate_limit_defaults(), RateLimitConfig::new(100, 2));

    for limits in [RateLimitOverride::none().delay_in_ms(0), RateLimitOverride::none()] {
        orchestrator
            .start_active_scan(&context(), "http://app.local", &ScanIdentity::Anonymous, &limits, &[])
            .await
            .unwrap();
    }

    let delays: Vec<String> = calls_to(&server, "ascan", "setOptionDelayInMs")
        .await
        .iter()
        .filter_map(|r| query(r, "Integer"))
        .collect();
    assert_eq!(delays, vec!["0", "100"]);
}

#[tokio::test]
async fn test_replay_continues_past_failed_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/OTHER/core/other/sendHarRequest/"))
        .respond_with(Sequence::new(vec![
            ResponseTemplate::new(200).set_body_string("[]"),
            ResponseTemplate::new(500).set_body_json(json!({"code": "internal_error", "message": "boom"})),
            ResponseTemplate::new(200).set_body_string("[]"),
        ]))
        .expect(3)
        .mount(&server)
        .await;

    let target = Target::new("http://app.local").with_sitemap(vec![
        SitemapEntry::from(HarRequest::new("GET", "http://app.local/")),
        SitemapEntry::from(HarRequest::new("GET", "http://app.local/broken")),
        SitemapEntry::from(
            HarRequest::new("POST", "http://app.local/login").body("application/x-www-form-urlencoded", "a=b"),
        ),
    ]);

    let report = orchestrator(&server).recall_target(&target, &[]).await.unwrap();

    assert!(!report.sitemap_missing);
    assert_eq!(report.submitted(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.outcomes[1].url, "http://app.local/broken");
    assert!(matches!(report.outcomes[1].status, haukka::scan::ReplayStatus::Skipped { .. }));

    let sent = calls_to(&server, "core", "sendHarRequest").await;
    assert_eq!(form_value(&sent[0], "followRedirects").as_deref(), Some("false"));
    let request: serde_json::Value =
        serde_json::from_str(&form_value(&sent[2], "request").unwrap()).unwrap();
    assert_eq!(request["method"], "POST");
    assert_eq!(request["postData"]["text"], "a=b");
}

#[tokio::test]
async fn test_replay_without_sitemap() {
    let server = MockServer::start().await;

    let report = orchestrator(&server)
        .recall_target(&Target::new("http://app.local"), &[])
        .await
        .unwrap();

    assert!(report.sitemap_missing);
    assert!(report.outcomes.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_scan_end_to_end() {
    let server = MockServer::start().await;
    mount_json(&server, "context", "action", "newContext", json!({"contextId": "2"})).await;
    mount_json(&server, "spider", "action", "scan", json!({"scan": "0"})).await;
    mount_json(&server, "spider", "view", "status", json!({"status": "100"})).await;
    mount_json(&server, "spider", "view", "fullResults", json!({"fullResults": [{"urlsInScope": []}]})).await;
    mount_json(&server, "ascan", "action", "scan", json!({"scan": "1"})).await;
    mount_json(&server, "ascan", "view", "status", json!({"status": "100"})).await;
    mount_json(&server, "core", "view", "alerts", alerts_document()).await;
    Mock::given(method("GET"))
        .and(path("/OTHER/core/other/messageHar/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_har("GET", "http://app.local/search?q=x")))
        .mount(&server)
        .await;
    mount_action_fallback(&server).await;

    let plan = ScanPlan::new(Target::new("http://app.local")).exclude(".*logout.*");
    let report = orchestrator(&server).run_scan(&plan, None).await.unwrap();

    assert_eq!(report.context.id, "2");
    assert!(report.context.name.starts_with("haukka-context-"));
    assert_eq!(report.identity, ScanIdentity::Anonymous);
    assert!(report.replay.sitemap_missing);
    assert!(report.spider_findings.is_empty());
    assert_eq!(report.scanner_findings.len(), 1);
    assert_eq!(report.findings().count(), 1);

    let log = call_log(&server).await;
    let position = |name: &str| log.iter().position(|c| c == name).unwrap();
    assert!(position("spider/removeAllScans") < position("context/newContext"));
    assert!(position("context/newContext") < position("spider/scan"));
    assert!(position("spider/fullResults") < position("ascan/scan"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["scannerFindings"][0]["severity"], "High");
}

#[tokio::test]
async fn test_run_scan_cancelled_before_crawl() {
    let server = MockServer::start().await;
    mount_json(&server, "context", "action", "newContext", json!({"contextId": "2"})).await;
    mount_action_fallback(&server).await;

    let token = CancelToken::new();
    token.cancel();

    let plan = ScanPlan::new(Target::new("http://app.local"));
    let err = orchestrator(&server).run_scan(&plan, Some(&token)).await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(calls_to(&server, "spider", "scan").await.is_empty());
}

#[tokio::test]
async fn test_supplied_defaults_skip_capture() {
    let server = MockServer::start().await;
    mount_json(&server, "ascan", "action", "scan", json!({"scan": "0"})).await;
    mount_action_fallback(&server).await;

    let orchestrator =
        Orchestrator::with_defaults(fast_config(&server), RateLimitConfig::new(250, 4)).unwrap();
    orchestrator
        .start_active_scan(
            &context(),
            "http://app.local",
            &ScanIdentity::Anonymous,
            &RateLimitOverride::none(),
            &[],
        )
        .await
        .unwrap();

    assert!(calls_to(&server, "ascan", "optionDelayInMs").await.is_empty());
    let threads = calls_to(&server, "ascan", "setOptionThreadPerHost").await;
    assert_eq!(query(&threads[0], "Integer").as_deref(), Some("4"));

    let scan = calls_to(&server, "ascan", "scan").await;
    assert_eq!(query(&scan[0], "inScopeOnly").as_deref(), Some("false"));
}

async fn mount_replacer(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/JSON/replacer/action/(addRule|removeRule)/$"))
        .respond_with(ReplacerRules::default())
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_run_scan_installs_replacer_rules_once() {
    use haukka::{ApiReplacer, ReplacerRule};

    let server = MockServer::start().await;
    mount_replacer(&server).await;
    mount_json(&server, "context", "action", "newContext", json!({"contextId": "2"})).await;
    mount_json(&server, "spider", "action", "scan", json!({"scan": "0"})).await;
    mount_json(&server, "spider", "view", "status", json!({"status": "100"})).await;
    mount_json(&server, "spider", "view", "fullResults", json!({"fullResults": []})).await;
    mount_json(&server, "ascan", "action", "scan", json!({"scan": "1"})).await;
    mount_json(&server, "ascan", "view", "status", json!({"status": "100"})).await;
    mount_json(&server, "core", "view", "alerts", json!({"alerts": []})).await;
    Mock::given(method("POST"))
        .and(path("/OTHER/core/other/sendHarRequest/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;
    mount_action_fallback(&server).await;

    let config = fast_config(&server);
    let engine = EngineClient::new(&config).unwrap();
    let replacer = Arc::new(ApiReplacer::new(engine.clone()));
    let orchestrator = Orchestrator::from_parts(
        engine,
        config,
        replacer.clone(),
        RateLimitConfig::new(0, 2),
    );

    let target = Target::new("http://app.local")
        .with_sitemap(vec![SitemapEntry::from(HarRequest::new("GET", "http://app.local/"))]);
    let plan = ScanPlan::new(target)
        .replacer_rule(ReplacerRule::request_header("X-Scan", "haukka").description("marker"));

    let report = orchestrator.run_scan(&plan, None).await.unwrap();

    assert_eq!(report.replay.submitted(), 1);
    assert_eq!(calls_to(&server, "replacer", "addRule").await.len(), 1);
    assert_eq!(replacer.installed(), vec!["marker"]);

    // the next scan clears the previous rules before installing again
    orchestrator.run_scan(&plan, None).await.unwrap();

    assert_eq!(calls_to(&server, "replacer", "removeRule").await.len(), 1);
    assert_eq!(calls_to(&server, "replacer", "addRule").await.len(), 2);
    assert_eq!(replacer.installed(), vec!["marker"]);
}

#[tokio::test]
async fn test_alert_without_url_falls_back_or_is_dropped() {
    let server = MockServer::start().await;
    mount_json(&server, "ascan", "view", "status", json!({"status": "100"})).await;
    mount_json(
        &server,
        "core",
        "view",
        "alerts",
        json!({"alerts": [
            {"id": "1", "name": "Missing Header", "risk": "Low", "url": "", "messageId": "42"},
            {"id": "2", "name": "Missing Header", "risk": "Low", "url": "", "messageId": ""}
        ]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/OTHER/core/other/messageHar/"))
        .and(query_param("id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_har("GET", "http://app.local/page")))
        .mount(&server)
        .await;

    let findings = orchestrator(&server)
        .retrieve_scanner_result("0", "http://app.local", None)
        .await
        .unwrap();

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].location, "http://app.local/page");
    assert!(findings.iter().all(|f| !f.location.is_empty()));
}
