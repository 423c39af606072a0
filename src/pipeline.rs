use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::analysis::aggregate::{ChampionRow, LaneRow, SeasonAggregator};
use crate::analysis::buckets::{
    bucket_by_patches, bucket_by_splits, custom_range, filter_by_patch, year_range, BucketReport,
};
use crate::analysis::insights::{analyze_season, InsightResult};
use crate::api::client::RiotClient;
use crate::api::cluster::Cluster;
use crate::api::matches::{fetch_slice_chunk, list_match_ids, CHUNK_SIZE};
use crate::api::models::PlayerSlice;
use crate::api::resolver::{resolve_account, resolve_cluster};
use crate::api::{endpoints, latest_ddragon_version, RiotCaches};
use crate::config::Config;
use crate::error::AppError;

/// Entries in the whole-result top lists.
pub const TOP_N: usize = 10;
/// Lanes included in a lightweight progress snapshot.
pub const SNAPSHOT_LANES: usize = 5;

/// Time bucketing for a stats request. Modes are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsMode {
    /// Whole calendar year (default).
    Year,
    /// Only slices played on this `MAJOR.MINOR` patch.
    Patch(String),
    /// Independent buckets for the N most recent patches.
    Patches(usize),
    /// Independent buckets for the fixed year thirds.
    Splits,
    /// An arbitrary date range replaces the year window.
    Custom { from: NaiveDate, to: NaiveDate },
}

#[derive(Debug, Clone)]
pub struct StatsRequest {
    pub riot_id: String,
    pub year: i32,
    pub queues: Vec<u32>,
    pub cluster: Option<Cluster>,
    pub limit: usize,
    pub mode: StatsMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub riot_id: String,
    /// Masked: first eight characters only.
    pub puuid: String,
    pub cluster: Cluster,
    pub year: i32,
    pub queues: Vec<u32>,
    pub total_games: u32,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonReport {
    pub meta: ReportMeta,
    pub champions: Vec<ChampionRow>,
    pub lanes: Vec<LaneRow>,
    pub top_used: Vec<ChampionRow>,
    pub top_win_rate: Vec<ChampionRow>,
    pub best_lane: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_patch: Option<Vec<BucketReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_split: Option<Vec<BucketReport>>,
    pub insights: InsightResult,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    AccountLookup,
    ListingIds,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreamMeta {
    pub riot_id: String,
    pub cluster: Cluster,
    pub year: i32,
    pub queues: Vec<u32>,
}

/// Lightweight partial view sent after each chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub champions: Vec<ChampionRow>,
    pub lanes: Vec<LaneRow>,
    pub top_win_rate: Vec<ChampionRow>,
    pub elapsed_ms: u64,
}

/// Ordered progress protocol. Exactly one of `done`/`error`
/// terminates every stream; `processed` never decreases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Phase { phase: PipelinePhase },
    Meta { meta: StreamMeta },
    Ids { total: usize },
    Progress {
        processed: usize,
        total: usize,
        snapshot: Snapshot,
    },
    Done { result: Box<SeasonReport> },
    Error { error: String },
}

/// Single-producer side of the progress channel. A disabled sink
/// drops events, which is how the whole-result path runs the same
/// pipeline without a consumer.
#[derive(Clone)]
pub struct EventSink(Option<mpsc::UnboundedSender<ProgressEvent>>);

impl EventSink {
    pub fn channel() -> (EventSink, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EventSink(Some(tx)), rx)
    }

    pub fn disabled() -> EventSink {
        EventSink(None)
    }

    pub fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }

    /// True when a consumer existed and has gone away.
    pub fn is_closed(&self) -> bool {
        self.0.as_ref().is_some_and(|tx| tx.is_closed())
    }
}

/// The stats aggregation engine: resolver, match index, slice
/// fetcher, aggregator and insight engine behind one entry point.
pub struct StatsEngine {
    config: Config,
    client: RiotClient,
    caches: RiotCaches,
}

impl StatsEngine {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let client = RiotClient::new(config.api_key.clone().unwrap_or_default())?;
        Ok(StatsEngine {
            config,
            client,
            caches: RiotCaches::new(),
        })
    }

    /// Test hook: route upstream calls to a local mock.
    pub fn with_base_url(mut self, base: &str) -> Self {
        self.client = self.client.with_base_url(base);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the full pipeline, emitting intermediate events into
    /// `sink`. Terminal events are the caller's responsibility so the
    /// typed result can also drive an HTTP status.
    pub async fn run(
        &self,
        req: &StatsRequest,
        sink: &EventSink,
    ) -> Result<SeasonReport, AppError> {
        self.config.require_api_key()?;

        sink.emit(ProgressEvent::Phase {
            phase: PipelinePhase::AccountLookup,
        });
        let account = resolve_account(&self.client, &self.caches, &req.riot_id).await?;
        let cluster = match req.cluster {
            Some(c) => c,
            None => {
                resolve_cluster(&self.client, &self.caches, &account.puuid, &account.tag_line)
                    .await
            }
        };
        sink.emit(ProgressEvent::Meta {
            meta: StreamMeta {
                riot_id: account.riot_id(),
                cluster,
                year: req.year,
                queues: req.queues.clone(),
            },
        });

        let (start_time, end_time) = match &req.mode {
            StatsMode::Custom { from, to } => custom_range(*from, *to),
            _ => year_range(req.year),
        };

        sink.emit(ProgressEvent::Phase {
            phase: PipelinePhase::ListingIds,
        });
        let ids = list_match_ids(
            &self.client,
            &self.caches,
            cluster,
            &account.puuid,
            start_time,
            end_time,
            &req.queues,
            req.limit,
        )
        .await?;
        sink.emit(ProgressEvent::Ids { total: ids.len() });
        info!(total = ids.len(), cluster = %cluster, "retrieving match slices");

        let ddragon_ver = latest_ddragon_version(&self.client, &self.caches).await?;
        let icon_base = self.client.ddragon_base().to_string();
        let decorate = |rows: &mut Vec<ChampionRow>| {
            for row in rows.iter_mut() {
                row.icon = Some(endpoints::champion_icon(&icon_base, &ddragon_ver, &row.name));
            }
        };

        let started = Instant::now();
        let mut agg = SeasonAggregator::new();
        let mut slices: Vec<PlayerSlice> = Vec::new();
        let mut processed = 0usize;

        for chunk in ids.chunks(CHUNK_SIZE) {
            let results =
                fetch_slice_chunk(&self.client, &self.caches, cluster, chunk, &account.puuid)
                    .await;
            processed += chunk.len();
            for slice in results.into_iter().flatten() {
                agg.fold(&slice);
                slices.push(slice);
            }

            let mut snapshot_champions = agg.top_by_usage(TOP_N);
            decorate(&mut snapshot_champions);
            let mut snapshot_lanes = agg.lane_rows();
            snapshot_lanes.truncate(SNAPSHOT_LANES);
            sink.emit(ProgressEvent::Progress {
                processed,
                total: ids.len(),
                snapshot: Snapshot {
                    champions: snapshot_champions,
                    lanes: snapshot_lanes,
                    top_win_rate: agg.top_by_win_rate(TOP_N),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                },
            });

            // Consumer gone: stop scheduling further chunks. Current
            // chunk results stay in the caches for the next request.
            if sink.is_closed() {
                break;
            }
        }

        // In patch mode the output tables are computed over the
        // filtered slices; the other modes attach bucket arrays on
        // top of the whole-window tables.
        let table_agg = match &req.mode {
            StatsMode::Patch(patch) => {
                let mut filtered = SeasonAggregator::new();
                filtered.fold_all(filter_by_patch(&slices, patch));
                filtered
            }
            _ => agg,
        };

        let mut champions = table_agg.champion_rows();
        decorate(&mut champions);
        let lanes = table_agg.lane_rows();
        let mut top_used = table_agg.top_by_usage(TOP_N);
        decorate(&mut top_used);
        let mut top_win_rate = table_agg.top_by_win_rate(TOP_N);
        decorate(&mut top_win_rate);

        let by_patch = match &req.mode {
            StatsMode::Patches(n) => Some(bucket_by_patches(&slices, *n)),
            _ => None,
        };
        let by_split = match &req.mode {
            StatsMode::Splits => Some(bucket_by_splits(&slices, req.year)),
            _ => None,
        };

        let insights = analyze_season(table_agg.total_games(), &champions, &lanes);

        Ok(SeasonReport {
            meta: ReportMeta {
                riot_id: account.riot_id(),
                puuid: account.masked_puuid(),
                cluster,
                year: req.year,
                queues: req.queues.clone(),
                total_games: table_agg.total_games(),
                generated_at: Utc::now().to_rfc3339(),
            },
            champions,
            lanes,
            top_used,
            top_win_rate,
            best_lane: table_agg.best_lane(),
            by_patch,
            by_split,
            insights,
        })
    }

    /// Whole-result entry point: same pipeline, no consumer.
    pub async fn collect(&self, req: &StatsRequest) -> Result<SeasonReport, AppError> {
        self.run(req, &EventSink::disabled()).await
    }

    /// Streaming entry point. Spawns the pipeline and returns the
    /// consumer side of the event channel; exactly one terminal event
    /// is appended.
    pub fn stream(self: &Arc<Self>, req: StatsRequest) -> mpsc::UnboundedReceiver<ProgressEvent> {
        let (sink, rx) = EventSink::channel();
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            match engine.run(&req, &sink).await {
                Ok(report) => sink.emit(ProgressEvent::Done {
                    result: Box::new(report),
                }),
                Err(e) => {
                    error!(code = e.code(), "stats pipeline failed: {e}");
                    sink.emit(ProgressEvent::Error {
                        error: e.code().to_string(),
                    });
                }
            }
        });
        rx
    }
}
