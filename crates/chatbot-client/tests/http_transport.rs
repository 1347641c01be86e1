//! HTTP transport and session bootstrap against a mock chat node.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chatbot_client::config::{self, BotConfig};
use chatbot_client::session::bootstrap::io_cookie;
use chatbot_client::session::{Bootstrapper, HttpBootstrapper};
use chatbot_client::transport::{HttpTransport, Transport};

use common::test_session;

fn config_for(server: &MockServer) -> BotConfig {
    config::load_from_str(&format!(
        r#"
version: 1
user: "Bot"
dev: true
wiki_url: "{}"
cookie: "session=abc;"
transport:
  poll_timeout_ms: 1000
"#,
        server.uri()
    ))
    .unwrap()
}

#[tokio::test]
async fn poll_sends_session_query_and_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/socket.io/"))
        .and(query_param("EIO", "2"))
        .and(query_param("transport", "polling"))
        .and(query_param("key", "k3y"))
        .and(query_param("roomId", "42"))
        .and(query_param("serverId", "7"))
        .and(query_param("sid", "sid1"))
        .and(query_param("t", "1700000000000-0"))
        .and(header("pragma", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1::"))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let transport = HttpTransport::new(&cfg.transport, &server.uri(), cfg.cookie.as_deref()).unwrap();
    let q = test_session().query("Bot", "1700000000000-0".into());

    let body = transport.poll(&q).await.unwrap();
    assert_eq!(&body[..], b"1::");
}

#[tokio::test]
async fn slow_poll_is_a_transport_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/socket.io/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(2500)))
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let transport = HttpTransport::new(&cfg.transport, &server.uri(), None).unwrap();
    let q = test_session().query("Bot", "1-0".into());

    let err = transport.poll(&q).await.unwrap_err();
    assert_eq!(err.code().as_str(), "TRANSPORT_TIMEOUT");
    assert!(err.is_fatal_to_loop());
}

#[tokio::test]
async fn error_status_is_a_plain_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/socket.io/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let transport = HttpTransport::new(&cfg.transport, &server.uri(), None).unwrap();
    let q = test_session().query("Bot", "1-0".into());

    let err = transport.poll(&q).await.unwrap_err();
    assert_eq!(err.code().as_str(), "TRANSPORT");
    assert!(!err.is_fatal_to_loop());
}

#[tokio::test]
async fn post_carries_the_command_frame() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/socket.io/"))
        .and(header("content-type", "text/plain;charset=UTF-8"))
        .and(body_string("8::"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let transport = HttpTransport::new(&cfg.transport, &server.uri(), None).unwrap();
    let q = test_session().query("Bot", "1-1".into());

    transport.post(&q, "8::".into()).await.unwrap();
}

#[tokio::test]
async fn bootstrap_negotiates_session() {
    let server = MockServer::start().await;
    let port = server.address().port();

    Mock::given(method("GET"))
        .and(path("/wikia.php"))
        .and(query_param("controller", "Chat"))
        .and(query_param("format", "json"))
        .and(header("cookie", "session=abc;"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chatkey": "k3y",
            "nodeInstance": 7,
            "roomId": 42,
            "isChatMod": true,
            "nodeHostname": "127.0.0.1",
            "nodePort": port
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/socket.io/"))
        .and(query_param("key", "k3y"))
        .and(query_param("roomId", "42"))
        .and(query_param("serverId", "7"))
        .and(query_param("user", "Bot"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "io=s1d-xyz; Path=/; HttpOnly")
                .set_body_string("1::"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let cfg = config_for(&server);
    let params = HttpBootstrapper::new().bootstrap(&cfg).await.unwrap();

    assert_eq!(params.poll_base, format!("http://127.0.0.1:{port}/"));
    assert_eq!(params.key, "k3y");
    assert_eq!(params.room_id, "42");
    assert_eq!(params.server_id, "7");
    assert!(params.is_chat_mod);
    assert_eq!(params.sid.as_deref(), Some("s1d-xyz"));
    assert_eq!(params.cookie.as_deref(), Some("session=abc; io=s1d-xyz;"));
}

#[tokio::test]
async fn bootstrap_without_io_cookie_fails() {
    let server = MockServer::start().await;
    let port = server.address().port();

    Mock::given(method("GET"))
        .and(path("/wikia.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chatkey": "k3y",
            "nodeInstance": "7",
            "roomId": "42",
            "nodeHostname": "127.0.0.1",
            "nodePort": port.to_string()
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/socket.io/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = HttpBootstrapper::new().bootstrap(&config_for(&server)).await.unwrap_err();
    assert_eq!(err.code().as_str(), "BOOTSTRAP");
}

#[tokio::test]
async fn bootstrap_rejects_bad_chat_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wikia.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login required</html>"))
        .mount(&server)
        .await;

    let err = HttpBootstrapper::new().bootstrap(&config_for(&server)).await.unwrap_err();
    assert_eq!(err.code().as_str(), "BOOTSTRAP");
}

#[test]
fn io_cookie_parsing() {
    assert_eq!(io_cookie("io=abc; Path=/").as_deref(), Some("abc"));
    assert_eq!(io_cookie("io=abc").as_deref(), Some("abc"));
    assert_eq!(io_cookie("other=1; io=abc"), None);
    assert_eq!(io_cookie("io=; Path=/"), None);
}
