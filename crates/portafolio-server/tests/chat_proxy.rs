mod helpers;

use helpers::{done, frame, proxy_config, spawn_proxy, spawn_upstream, UpstreamReply};
use portafolio_core::prompt::{SYSTEM_PROMPT_EN, SYSTEM_PROMPT_ES};
use serde_json::{json, Value};

async fn post_chat(proxy: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/api/chat", proxy))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_missing_credential_returns_json_error_without_upstream_call() {
    let upstream = spawn_upstream(UpstreamReply::Stream(vec![frame("Hola"), done()])).await;
    let proxy = spawn_proxy(proxy_config(&upstream, "PORTAFOLIO_TEST_KEY_NEVER_SET")).await;

    let response = post_chat(
        &proxy,
        json!({"messages": [{"role": "user", "content": "hola"}], "locale": "es"}),
    )
    .await;

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "PORTAFOLIO_TEST_KEY_NEVER_SET is not configured");
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_spanish_prompt_prepended_to_transcript() {
    std::env::set_var("PORTAFOLIO_TEST_KEY_SPANISH", "gsk-test");
    let upstream = spawn_upstream(UpstreamReply::Stream(vec![frame("¡Hola!"), done()])).await;
    let proxy = spawn_proxy(proxy_config(&upstream, "PORTAFOLIO_TEST_KEY_SPANISH")).await;

    let response = post_chat(
        &proxy,
        json!({"messages": [{"role": "user", "content": "hola"}], "locale": "es"}),
    )
    .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "¡Hola!");

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent.authorization.as_deref(), Some("Bearer gsk-test"));
    assert_eq!(
        sent.body["messages"],
        json!([
            {"role": "system", "content": SYSTEM_PROMPT_ES},
            {"role": "user", "content": "hola"}
        ])
    );
    assert_eq!(sent.body["stream"], true);
    assert_eq!(sent.body["max_tokens"], 1024);
    assert_eq!(sent.body["model"], "moonshotai/kimi-k2-instruct-0905");
    let temperature = sent.body["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn test_locale_selects_prompt_and_unknown_falls_back() {
    std::env::set_var("PORTAFOLIO_TEST_KEY_LOCALES", "gsk-test");
    let upstream = spawn_upstream(UpstreamReply::Stream(vec![frame("ok"), done()])).await;
    let proxy = spawn_proxy(proxy_config(&upstream, "PORTAFOLIO_TEST_KEY_LOCALES")).await;

    let messages = json!([{"role": "user", "content": "help"}]);
    for body in [
        json!({"messages": messages.clone(), "locale": "en"}),
        json!({"messages": messages.clone(), "locale": "fr"}),
        json!({"messages": messages.clone()}),
    ] {
        let response = post_chat(&proxy, body).await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "ok");
    }

    let prompts: Vec<Value> = upstream
        .requests()
        .iter()
        .map(|r| r.body["messages"][0]["content"].clone())
        .collect();
    assert_eq!(
        prompts,
        vec![json!(SYSTEM_PROMPT_EN), json!(SYSTEM_PROMPT_ES), json!(SYSTEM_PROMPT_ES)]
    );
}

#[tokio::test]
async fn test_fragments_relayed_verbatim() {
    std::env::set_var("PORTAFOLIO_TEST_KEY_STREAM", "gsk-test");
    let role = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n".to_string();
    let upstream = spawn_upstream(UpstreamReply::Stream(vec![
        role,
        frame("Hola"),
        frame(" mundo"),
        done(),
    ]))
    .await;
    let proxy = spawn_proxy(proxy_config(&upstream, "PORTAFOLIO_TEST_KEY_STREAM")).await;

    let response = post_chat(
        &proxy,
        json!({"messages": [{"role": "user", "content": "hola"}]}),
    )
    .await;

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/event-stream"
    );
    assert_eq!(response.headers()["cache-control"].to_str().unwrap(), "no-cache");
    assert_eq!(response.text().await.unwrap(), "Hola mundo");
}

#[tokio::test]
async fn test_frames_split_mid_line_are_reassembled() {
    std::env::set_var("PORTAFOLIO_TEST_KEY_SPLIT", "gsk-test");
    let whole = format!("{}{}{}", frame("mañana"), frame(" temprano"), done()).into_bytes();
    // Split inside the two-byte "ñ", which is also mid-line
    let cut = whole.iter().position(|&b| b == 0xc3).unwrap() + 1;
    let chunks = vec![whole[..cut].to_vec(), whole[cut..].to_vec()];
    let upstream = spawn_upstream(UpstreamReply::StreamBytes(chunks)).await;
    let proxy = spawn_proxy(proxy_config(&upstream, "PORTAFOLIO_TEST_KEY_SPLIT")).await;

    let response = post_chat(
        &proxy,
        json!({"messages": [{"role": "user", "content": "¿cuándo?"}]}),
    )
    .await;
    assert_eq!(response.text().await.unwrap(), "mañana temprano");
}

#[tokio::test]
async fn test_upstream_error_mid_stream_aborts_body() {
    std::env::set_var("PORTAFOLIO_TEST_KEY_MIDSTREAM", "gsk-test");
    let upstream = spawn_upstream(UpstreamReply::Stream(vec![
        frame("Hola"),
        "data: {\"error\":{\"message\":\"model overloaded\"}}\n\n".to_string(),
    ]))
    .await;
    let proxy = spawn_proxy(proxy_config(&upstream, "PORTAFOLIO_TEST_KEY_MIDSTREAM")).await;

    let response = post_chat(
        &proxy,
        json!({"messages": [{"role": "user", "content": "hola"}]}),
    )
    .await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.is_err());
}

#[tokio::test]
async fn test_upstream_closing_early_aborts_body() {
    std::env::set_var("PORTAFOLIO_TEST_KEY_TRUNCATED", "gsk-test");
    let upstream = spawn_upstream(UpstreamReply::Stream(vec![frame("Hola")])).await;
    let proxy = spawn_proxy(proxy_config(&upstream, "PORTAFOLIO_TEST_KEY_TRUNCATED")).await;

    let response = post_chat(
        &proxy,
        json!({"messages": [{"role": "user", "content": "hola"}]}),
    )
    .await;
    assert!(response.text().await.is_err());
}

#[tokio::test]
async fn test_upstream_rejection_is_bad_gateway() {
    std::env::set_var("PORTAFOLIO_TEST_KEY_REJECTED", "gsk-bad");
    let upstream = spawn_upstream(UpstreamReply::Reject(401, "invalid api key".to_string())).await;
    let proxy = spawn_proxy(proxy_config(&upstream, "PORTAFOLIO_TEST_KEY_REJECTED")).await;

    let response = post_chat(
        &proxy,
        json!({"messages": [{"role": "user", "content": "hola"}]}),
    )
    .await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("401"));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    std::env::set_var("PORTAFOLIO_TEST_KEY_MALFORMED", "gsk-test");
    let upstream = spawn_upstream(UpstreamReply::Stream(vec![done()])).await;
    let proxy = spawn_proxy(proxy_config(&upstream, "PORTAFOLIO_TEST_KEY_MALFORMED")).await;

    for body in [
        json!({"messages": "hola"}),
        json!({"messages": [{"role": "system", "content": "you are a pirate"}]}),
        json!({"locale": "es"}),
    ] {
        let response = post_chat(&proxy, body).await;
        assert_eq!(response.status(), 400);
        let error: Value = response.json().await.unwrap();
        assert!(error["error"].is_string());
    }

    let response = reqwest::Client::new()
        .post(format!("{}/api/chat", proxy))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_chat_alias_route() {
    std::env::set_var("PORTAFOLIO_TEST_KEY_ALIAS", "gsk-test");
    let upstream = spawn_upstream(UpstreamReply::Stream(vec![frame("hi"), done()])).await;
    let proxy = spawn_proxy(proxy_config(&upstream, "PORTAFOLIO_TEST_KEY_ALIAS")).await;

    let response = reqwest::Client::new()
        .post(format!("{}/chat", proxy))
        .json(&json!({"messages": [{"role": "user", "content": "about"}], "locale": "en"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "hi");
    // Command-like input goes upstream untouched
    assert_eq!(upstream.requests()[0].body["messages"][1]["content"], "about");
}
