pub mod client;
pub mod cluster;
pub mod endpoints;
pub mod matches;
pub mod models;
pub mod resolver;

use std::time::Duration;

use crate::cache::TtlCache;
use crate::error::AppError;
use client::RiotClient;
use cluster::Cluster;
use models::{AccountDto, PlayerSlice};

pub const ACCOUNT_TTL: Duration = Duration::from_secs(15 * 60);
pub const CLUSTER_TTL: Duration = Duration::from_secs(30 * 60);
pub const IDS_TTL: Duration = Duration::from_secs(10 * 60);
pub const SLICE_TTL: Duration = Duration::from_secs(30 * 60);
pub const VERSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Cache key for a match-id listing: cluster, puuid, window start and
/// end, sorted queue set, limit.
pub type IdsKey = (String, String, i64, i64, Vec<u32>, usize);

/// The process-wide caches the API layer consults before going to the
/// network. Explicitly constructed and injected so tests can swap in
/// bounded instances with a deterministic clock.
pub struct RiotCaches {
    pub account: TtlCache<(String, String), AccountDto>,
    pub cluster: TtlCache<(&'static str, String), Cluster>,
    pub ids: TtlCache<IdsKey, Vec<String>>,
    pub slices: TtlCache<(String, String), PlayerSlice>,
    pub version: TtlCache<&'static str, String>,
}

impl RiotCaches {
    pub fn new() -> Self {
        RiotCaches {
            account: TtlCache::new(200),
            cluster: TtlCache::new(500),
            ids: TtlCache::new(500),
            slices: TtlCache::new(2000),
            version: TtlCache::new(8),
        }
    }
}

impl Default for RiotCaches {
    fn default() -> Self {
        Self::new()
    }
}

/// Latest Data Dragon version, used only to compose champion icon
/// URLs. Cached for an hour.
pub async fn latest_ddragon_version(
    client: &RiotClient,
    caches: &RiotCaches,
) -> Result<String, AppError> {
    if let Some(ver) = caches.version.get(&"ddragon") {
        return Ok(ver);
    }
    let url = endpoints::ddragon_versions(client.ddragon_base());
    let versions: Vec<String> = client.get_public_json(&url).await?;
    let ver = versions
        .into_iter()
        .next()
        .ok_or_else(|| AppError::JsonError("empty version list".to_string()))?;
    caches.version.set(&"ddragon", ver.clone(), VERSION_TTL);
    Ok(ver)
}
