mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;

use common::{FakeMatch, Upstream, UpstreamState};
use rift_recap::config::Config;
use rift_recap::pipeline::StatsEngine;
use rift_recap::server::router;

async fn server_over(upstream: &Upstream) -> TestServer {
    TestServer::new(router(Arc::new(upstream.engine()))).unwrap()
}

/// Twelve mid-2024 MIDDLE games: Ahri 5W/3L, Lux 3W/1L.
fn mid_lane_season() -> Vec<FakeMatch> {
    let mut matches = Vec::new();
    for i in 0..8 {
        matches.push(FakeMatch::new(
            &format!("EUW1_A{i}"),
            "Ahri",
            i < 5,
            "MIDDLE",
        ));
    }
    for i in 0..4 {
        matches.push(FakeMatch::new(
            &format!("EUW1_L{i}"),
            "Lux",
            i < 3,
            "MIDDLE",
        ));
    }
    matches
}

#[tokio::test]
async fn missing_riot_id_is_rejected_with_issues() {
    let upstream = Upstream::start(UpstreamState::new(Vec::new())).await;
    let server = server_over(&upstream).await;

    let response = server.get("/api/stats").await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_query");
    let issues = body["issues"].as_array().unwrap();
    assert!(issues.iter().any(|i| i["field"] == "riotId"));
}

#[tokio::test]
async fn validation_reports_every_bad_field_at_once() {
    let upstream = Upstream::start(UpstreamState::new(Vec::new())).await;
    let server = server_over(&upstream).await;

    let response = server
        .get("/api/stats")
        .add_query_param("year", "203X")
        .add_query_param("limit", "7")
        .add_query_param("cluster", "moon")
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    let fields: Vec<&str> = body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"riotId"));
    assert!(fields.contains(&"year"));
    assert!(fields.contains(&"limit"));
    assert!(fields.contains(&"cluster"));
}

#[tokio::test]
async fn missing_credential_is_a_server_error() {
    let config = Config {
        api_key: None,
        default_queues: Vec::new(),
        bind_addr: "127.0.0.1:0".to_string(),
    };
    let engine = StatsEngine::new(config).unwrap();
    let server = TestServer::new(router(Arc::new(engine))).unwrap();

    let response = server
        .get("/api/stats")
        .add_query_param("riotId", "Name#TAG")
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "server_misconfigured");
}

#[tokio::test]
async fn unknown_player_maps_to_not_found() {
    let upstream = Upstream::start(UpstreamState::new(Vec::new())).await;
    let server = server_over(&upstream).await;

    let response = server
        .get("/api/stats")
        .add_query_param("riotId", "Ghost#0000")
        .await;
    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn malformed_riot_id_maps_to_bad_request() {
    let upstream = Upstream::start(UpstreamState::new(Vec::new())).await;
    let server = server_over(&upstream).await;

    let response = server
        .get("/api/stats")
        .add_query_param("riotId", "NoTagHere")
        .await;
    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "invalid_riot_id");
}

#[tokio::test]
async fn season_report_has_the_documented_shape() {
    let upstream = Upstream::start(UpstreamState::new(mid_lane_season())).await;
    let server = server_over(&upstream).await;

    let response = server
        .get("/api/stats")
        .add_query_param("riotId", upstream.riot_id())
        .add_query_param("year", "2024")
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("cache-control"), "no-store");

    let body: Value = response.json();
    let meta = &body["meta"];
    assert_eq!(meta["riotId"], "Hide on bush#0000");
    assert_eq!(meta["puuid"], "mock-puu…");
    assert_eq!(meta["cluster"], "europe");
    assert_eq!(meta["year"], 2024);
    assert_eq!(meta["totalGames"], 12);
    assert!(meta["generatedAt"].as_str().unwrap().starts_with("20"));

    // Champions come out in first-seen order with rounded rates.
    let champions = body["champions"].as_array().unwrap();
    assert_eq!(champions.len(), 2);
    assert_eq!(champions[0]["name"], "Ahri");
    assert_eq!(champions[0]["games"], 8);
    assert_eq!(champions[0]["wins"], 5);
    assert_eq!(champions[0]["winRate"], 62.5);
    assert_eq!(champions[0]["lane"], "MIDDLE");
    assert_eq!(champions[0]["primaryPatch"], "14.20");
    assert!(champions[0]["icon"]
        .as_str()
        .unwrap()
        .contains("Ahri.png"));

    // Lux sits under the 5-game floor for the win-rate board.
    let top_win_rate = body["topWinRate"].as_array().unwrap();
    assert_eq!(top_win_rate.len(), 1);
    assert_eq!(top_win_rate[0]["name"], "Ahri");

    assert_eq!(body["topUsed"][0]["name"], "Ahri");
    assert_eq!(body["bestLane"], "MIDDLE");
    assert_eq!(body["lanes"][0]["lane"], "MIDDLE");
    assert_eq!(body["lanes"][0]["games"], 12);

    // No bucketing was requested.
    assert!(body.get("byPatch").is_none());
    assert!(body.get("bySplit").is_none());

    assert!(!body["insights"]["summary"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn repeat_requests_are_served_from_cache_and_identical() {
    let upstream = Upstream::start(UpstreamState::new(mid_lane_season())).await;
    let server = server_over(&upstream).await;

    let first: Value = server
        .get("/api/stats")
        .add_query_param("riotId", upstream.riot_id())
        .add_query_param("year", "2024")
        .await
        .json();
    let calls_after_first = upstream.state.match_calls.load(Ordering::SeqCst);
    assert_eq!(calls_after_first, 12);

    let second: Value = server
        .get("/api/stats")
        .add_query_param("riotId", upstream.riot_id())
        .add_query_param("year", "2024")
        .await
        .json();
    assert_eq!(
        upstream.state.match_calls.load(Ordering::SeqCst),
        calls_after_first
    );

    assert_eq!(first["champions"], second["champions"]);
    assert_eq!(first["lanes"], second["lanes"]);
    assert_eq!(first["topUsed"], second["topUsed"]);
    assert_eq!(first["topWinRate"], second["topWinRate"]);
    assert_eq!(first["bestLane"], second["bestLane"]);
}

#[tokio::test]
async fn patches_mode_attaches_ordered_truncated_buckets() {
    let matches = vec![
        FakeMatch::new("EUW1_1", "Ahri", true, "MIDDLE").on_patch("14.17.600.1"),
        FakeMatch::new("EUW1_2", "Ahri", true, "MIDDLE").on_patch("14.18.610.1"),
        FakeMatch::new("EUW1_3", "Ahri", false, "MIDDLE").on_patch("14.19.620.1"),
        FakeMatch::new("EUW1_4", "Ahri", true, "MIDDLE").on_patch("14.20.630.1"),
        FakeMatch::new("EUW1_5", "Lux", true, "MIDDLE").on_patch("14.20.630.1"),
    ];
    let upstream = Upstream::start(UpstreamState::new(matches)).await;
    let server = server_over(&upstream).await;

    let body: Value = server
        .get("/api/stats")
        .add_query_param("riotId", upstream.riot_id())
        .add_query_param("year", "2024")
        .add_query_param("mode", "patches")
        .add_query_param("patchCount", "3")
        .await
        .json();

    let buckets = body["byPatch"].as_array().unwrap();
    let keys: Vec<&str> = buckets
        .iter()
        .map(|b| b["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["14.20", "14.19", "14.18"]);
    assert_eq!(buckets[0]["totalGames"], 2);

    // The whole-window tables are unaffected by the bucketing.
    assert_eq!(body["meta"]["totalGames"], 5);
}

#[tokio::test]
async fn splits_mode_buckets_by_calendar_thirds() {
    let matches = vec![
        // 2024-02-15, 2024-07-01 x2, 2024-10-15 UTC.
        FakeMatch::new("EUW1_1", "Ahri", true, "MIDDLE").at(1_707_955_200_000),
        FakeMatch::new("EUW1_2", "Ahri", true, "MIDDLE").at(1_719_800_000_000),
        FakeMatch::new("EUW1_3", "Lux", false, "MIDDLE").at(1_719_800_000_000),
        FakeMatch::new("EUW1_4", "Jinx", true, "BOTTOM").at(1_728_950_400_000),
    ];
    let upstream = Upstream::start(UpstreamState::new(matches)).await;
    let server = server_over(&upstream).await;

    let body: Value = server
        .get("/api/stats")
        .add_query_param("riotId", upstream.riot_id())
        .add_query_param("year", "2024")
        .add_query_param("mode", "splits")
        .await
        .json();

    let buckets = body["bySplit"].as_array().unwrap();
    assert_eq!(buckets.len(), 3);
    assert_eq!(buckets[0]["key"], "Split 1");
    assert_eq!(buckets[0]["totalGames"], 1);
    assert_eq!(buckets[1]["key"], "Split 2");
    assert_eq!(buckets[1]["totalGames"], 2);
    assert_eq!(buckets[2]["key"], "Split 3");
    assert_eq!(buckets[2]["totalGames"], 1);
}

#[tokio::test]
async fn patch_mode_restricts_the_tables_to_one_patch() {
    let matches = vec![
        FakeMatch::new("EUW1_1", "Ahri", true, "MIDDLE").on_patch("14.20.630.1"),
        FakeMatch::new("EUW1_2", "Ahri", true, "MIDDLE").on_patch("14.20.630.1"),
        FakeMatch::new("EUW1_3", "Lux", false, "MIDDLE").on_patch("14.19.620.1"),
    ];
    let upstream = Upstream::start(UpstreamState::new(matches)).await;
    let server = server_over(&upstream).await;

    let body: Value = server
        .get("/api/stats")
        .add_query_param("riotId", upstream.riot_id())
        .add_query_param("year", "2024")
        .add_query_param("mode", "patch")
        .add_query_param("patch", "14.20")
        .await
        .json();

    assert_eq!(body["meta"]["totalGames"], 2);
    let champions = body["champions"].as_array().unwrap();
    assert_eq!(champions.len(), 1);
    assert_eq!(champions[0]["name"], "Ahri");
    assert_eq!(champions[0]["games"], 2);
}

#[tokio::test]
async fn forced_cluster_appears_in_the_meta() {
    let upstream = Upstream::start(UpstreamState::new(mid_lane_season())).await;
    let server = server_over(&upstream).await;

    let body: Value = server
        .get("/api/stats")
        .add_query_param("riotId", upstream.riot_id())
        .add_query_param("year", "2024")
        .add_query_param("cluster", "europe")
        .await
        .json();

    assert_eq!(body["meta"]["cluster"], "europe");
    assert_eq!(body["meta"]["totalGames"], 12);
}
