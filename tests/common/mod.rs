//! In-process mock of the upstream match-history provider.
//!
//! Served over a real socket so the client's reqwest transport, 429
//! backoff and header handling are exercised end to end.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

use rift_recap::config::Config;
use rift_recap::pipeline::StatsEngine;

#[derive(Debug, Clone)]
pub struct FakeMatch {
    pub id: String,
    pub champion: String,
    pub win: bool,
    pub lane: String,
    pub game_version: String,
    pub ts_ms: i64,
}

impl FakeMatch {
    pub fn new(id: &str, champion: &str, win: bool, lane: &str) -> Self {
        FakeMatch {
            id: id.to_string(),
            champion: champion.to_string(),
            win,
            lane: lane.to_string(),
            game_version: "14.20.634.2432".to_string(),
            // Mid-2024 in every zone.
            ts_ms: 1_719_800_000_000,
        }
    }

    pub fn on_patch(mut self, version: &str) -> Self {
        self.game_version = version.to_string();
        self
    }

    pub fn at(mut self, ts_ms: i64) -> Self {
        self.ts_ms = ts_ms;
        self
    }
}

pub struct UpstreamState {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    /// Cluster whose endpoints know this player.
    pub home_cluster: String,
    pub matches: Vec<FakeMatch>,
    /// 429 responses the account endpoint serves before succeeding.
    pub account_429s: AtomicUsize,
    pub retry_after_secs: u64,
    pub account_calls: AtomicUsize,
    pub match_calls: AtomicUsize,
}

impl UpstreamState {
    pub fn new(matches: Vec<FakeMatch>) -> Self {
        UpstreamState {
            puuid: "mock-puuid-0123456789abcdef".to_string(),
            game_name: "Hide on bush".to_string(),
            // Unknown to the static tag table, forcing the live probe.
            tag_line: "0000".to_string(),
            home_cluster: "europe".to_string(),
            matches,
            account_429s: AtomicUsize::new(0),
            retry_after_secs: 0,
            account_calls: AtomicUsize::new(0),
            match_calls: AtomicUsize::new(0),
        }
    }
}

pub struct Upstream {
    pub base_url: String,
    pub state: Arc<UpstreamState>,
}

impl Upstream {
    pub async fn start(state: UpstreamState) -> Upstream {
        let state = Arc::new(state);
        let router = Router::new()
            .route(
                "/:cluster/riot/account/v1/accounts/by-riot-id/:name/:tag",
                get(account),
            )
            .route(
                "/:cluster/lol/match/v5/matches/by-puuid/:puuid/ids",
                get(match_ids),
            )
            .route("/:cluster/lol/match/v5/matches/:match_id", get(match_detail))
            .route("/api/versions.json", get(versions))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Upstream {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// An engine wired to this mock, with a valid credential.
    pub fn engine(&self) -> StatsEngine {
        let config = Config {
            api_key: Some("test-key".to_string()),
            default_queues: Vec::new(),
            bind_addr: "127.0.0.1:0".to_string(),
        };
        StatsEngine::new(config)
            .unwrap()
            .with_base_url(&self.base_url)
    }

    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.state.game_name, self.state.tag_line)
    }
}

async fn account(
    State(state): State<Arc<UpstreamState>>,
    Path((cluster, name, _tag)): Path<(String, String, String)>,
) -> Response {
    state.account_calls.fetch_add(1, Ordering::SeqCst);

    if cluster != state.home_cluster {
        return StatusCode::NOT_FOUND.into_response();
    }
    if state
        .account_429s
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", state.retry_after_secs.to_string())],
        )
            .into_response();
    }
    if name != state.game_name.replace(' ', "%20") && name != state.game_name {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "puuid": state.puuid,
        "gameName": state.game_name,
        "tagLine": state.tag_line,
    }))
    .into_response()
}

async fn match_ids(
    State(state): State<Arc<UpstreamState>>,
    Path((cluster, _puuid)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if cluster != state.home_cluster {
        return Json(json!([])).into_response();
    }
    let start: usize = params
        .get("start")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let count: usize = params
        .get("count")
        .and_then(|s| s.parse().ok())
        .unwrap_or(100);
    let ids: Vec<&str> = state
        .matches
        .iter()
        .skip(start)
        .take(count)
        .map(|m| m.id.as_str())
        .collect();
    Json(json!(ids)).into_response()
}

async fn match_detail(
    State(state): State<Arc<UpstreamState>>,
    Path((cluster, match_id)): Path<(String, String)>,
) -> Response {
    state.match_calls.fetch_add(1, Ordering::SeqCst);

    if cluster != state.home_cluster {
        return StatusCode::NOT_FOUND.into_response();
    }
    let Some(m) = state.matches.iter().find(|m| m.id == match_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    Json(json!({
        "info": {
            "gameVersion": m.game_version,
            "gameStartTimestamp": m.ts_ms,
            "participants": [
                {
                    "puuid": state.puuid,
                    "championName": m.champion,
                    "win": m.win,
                    "teamPosition": m.lane,
                    "individualPosition": m.lane,
                },
                {
                    "puuid": "someone-else",
                    "championName": "Teemo",
                    "win": !m.win,
                    "teamPosition": "TOP",
                    "individualPosition": "TOP",
                }
            ]
        }
    }))
    .into_response()
}

async fn versions() -> Json<serde_json::Value> {
    Json(json!(["14.20.1", "14.19.1", "14.18.1"]))
}
