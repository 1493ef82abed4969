// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use bitstream::{
    mock, BitStreamApi, ClientConfig, Dashboard, IdleOptions, InternetIdentityConnector,
    MemorySessionStore, NewStream, SecretKey, SessionStore, StreamStats, UserBalance,
};
use eyre::Result;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use wiremock::{
    matchers::{body_partial_json, method, path},
    Mock, MockBuilder, MockServer, ResponseTemplate,
};

async fn replica() -> MockServer {
    let server = MockServer::start().await;
    mount_status(&server).await;
    server
}

async fn mount_status(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

fn dashboard_for(server: &MockServer) -> Dashboard {
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::default());
    let api = BitStreamApi::new(ClientConfig::default().with_host(server.uri()), store);
    Dashboard::new(Arc::new(api))
}

fn calling(method_name: &str) -> MockBuilder {
    Mock::given(method("POST")).and(body_partial_json(
        json!({ "content": { "method_name": method_name } }),
    ))
}

fn replied(reply: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": "replied", "reply": reply }))
}

/// Serves the offline dataset as if it were the user's data.
async fn mount_user_views(server: &MockServer, stream_fetches: u64) -> Result<()> {
    calling("getUserStreams")
        .respond_with(replied(serde_json::to_value(mock::streams())?))
        .expect(stream_fetches)
        .mount(server)
        .await;
    calling("getUserBalance")
        .respond_with(replied(serde_json::to_value(mock::balance())?))
        .mount(server)
        .await;
    calling("getStreamStats")
        .respond_with(replied(serde_json::to_value(mock::stats())?))
        .mount(server)
        .await;
    Ok(())
}

#[tokio::test]
async fn logged_out_check_loads_nothing() -> Result<()> {
    let server = replica().await;
    mount_user_views(&server, 0).await?;
    let dashboard = dashboard_for(&server);
    assert!(dashboard.auth_state().await.loading);

    dashboard.check_auth().await;
    dashboard.refresh_streams().await;
    dashboard.refresh_analytics().await;

    let state = dashboard.snapshot().await;
    assert!(!state.auth.loading);
    assert!(!state.auth.is_authenticated);
    assert!(state.streams.is_empty());
    assert_eq!(state.user_balance, UserBalance::default());
    assert_eq!(state.stream_stats, StreamStats::default());
    Ok(())
}

#[tokio::test]
async fn login_loads_streams_and_analytics() -> Result<()> {
    let server = replica().await;
    mount_user_views(&server, 1).await?;
    let dashboard = dashboard_for(&server);
    dashboard.check_auth().await;

    let device_key = SecretKey::random();
    assert!(
        dashboard
            .login(&InternetIdentityConnector::new(device_key.clone()))
            .await?
    );

    let state = dashboard.snapshot().await;
    assert!(state.auth.is_authenticated);
    assert_eq!(
        state.auth.principal,
        Some(bitstream::Principal::self_authenticating(
            &device_key.public_key()
        ))
    );
    assert_eq!(state.streams.len(), 2);
    assert_eq!(state.user_balance, mock::balance());
    assert_eq!(state.stream_stats.total_streams, 2);
    assert!(!state.streams_loading);
    assert!(!state.analytics_loading);
    Ok(())
}

#[tokio::test]
async fn idle_session_clears_the_dashboard_on_refresh() -> Result<()> {
    let server = replica().await;
    mount_user_views(&server, 1).await?;
    let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::default());
    let config = ClientConfig::default()
        .with_host(server.uri())
        .with_idle(IdleOptions {
            disable_idle: false,
            idle_timeout: Duration::from_millis(200),
        });
    let dashboard = Dashboard::new(Arc::new(BitStreamApi::new(config, store)));

    assert!(
        dashboard
            .login(&InternetIdentityConnector::new(SecretKey::random()))
            .await?
    );
    assert_eq!(dashboard.snapshot().await.streams.len(), 2);

    tokio::time::sleep(Duration::from_millis(300)).await;
    dashboard.refresh_streams().await;

    let state = dashboard.snapshot().await;
    assert!(!state.auth.is_authenticated);
    assert_eq!(state.auth.principal, None);
    assert!(state.streams.is_empty());
    assert_eq!(state.user_balance, UserBalance::default());
    Ok(())
}

#[tokio::test]
async fn toggle_pauses_an_active_stream_and_refetches() -> Result<()> {
    let server = replica().await;
    mount_user_views(&server, 2).await?;
    calling("updateStreamStatus")
        .and(body_partial_json(
            json!({ "content": { "arg": ["stream-1", "paused"] } }),
        ))
        .respond_with(replied(json!({ "ok": null })))
        .expect(1)
        .mount(&server)
        .await;
    let dashboard = dashboard_for(&server);
    assert!(
        dashboard
            .login(&InternetIdentityConnector::new(SecretKey::random()))
            .await?
    );

    let status = dashboard.toggle_stream("stream-1").await?;

    assert_eq!(status, "paused");
    Ok(())
}

#[tokio::test]
async fn created_stream_id_is_returned() -> Result<()> {
    let server = replica().await;
    mount_user_views(&server, 2).await?;
    calling("createStream")
        .and(body_partial_json(json!({
            "content": { "arg": [{ "id": "", "status": "pending", "createdAt": 0 }] }
        })))
        .respond_with(replied(json!({ "ok": "stream-3" })))
        .expect(1)
        .mount(&server)
        .await;
    let dashboard = dashboard_for(&server);
    assert!(
        dashboard
            .login(&InternetIdentityConnector::new(SecretKey::random()))
            .await?
    );

    let stream_id = dashboard
        .create_stream(NewStream {
            name: "Groceries".to_string(),
            ..Default::default()
        })
        .await?;

    assert_eq!(stream_id, "stream-3");
    Ok(())
}

#[tokio::test]
async fn failed_refresh_keeps_previous_values() -> Result<()> {
    let server = replica().await;
    mount_user_views(&server, 1).await?;
    let dashboard = dashboard_for(&server);
    assert!(
        dashboard
            .login(&InternetIdentityConnector::new(SecretKey::random()))
            .await?
    );

    server.reset().await;
    mount_status(&server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("replica overloaded"))
        .mount(&server)
        .await;

    dashboard.refresh_streams().await;
    dashboard.refresh_analytics().await;

    let state = dashboard.snapshot().await;
    assert_eq!(state.streams.len(), 2);
    assert_eq!(state.user_balance, mock::balance());
    assert!(!state.streams_loading);
    assert!(!state.analytics_loading);
    Ok(())
}

#[tokio::test]
async fn logout_clears_the_views() -> Result<()> {
    let server = replica().await;
    mount_user_views(&server, 1).await?;
    let dashboard = dashboard_for(&server);
    assert!(
        dashboard
            .login(&InternetIdentityConnector::new(SecretKey::random()))
            .await?
    );

    dashboard.logout().await?;

    let state = dashboard.snapshot().await;
    assert!(!state.auth.is_authenticated);
    assert!(!state.auth.loading);
    assert_eq!(state.auth.principal, None);
    assert!(state.streams.is_empty());
    assert_eq!(state.user_balance, UserBalance::default());
    Ok(())
}
