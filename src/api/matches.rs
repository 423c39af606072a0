use futures::future::join_all;
use tracing::debug;

use super::client::RiotClient;
use super::cluster::Cluster;
use super::models::{MatchDto, PlayerSlice};
use super::{endpoints, RiotCaches, IDS_TTL, SLICE_TTL};
use crate::error::AppError;

/// Server-side page size of the match-listing endpoint.
pub const PAGE_SIZE: usize = 100;
/// Hard safety cap on accumulated ids, bounding worst-case cost for
/// pathological accounts.
pub const HARD_ID_CAP: usize = 3000;
/// Detail fetches issued concurrently within one chunk.
pub const CHUNK_SIZE: usize = 8;

/// Pages through the match-listing endpoint, accumulating ids within
/// the time window (epoch seconds) and optional queue filter.
/// Pagination stops at `limit`, at a short page, or at the hard cap.
pub async fn list_match_ids(
    client: &RiotClient,
    caches: &RiotCaches,
    cluster: Cluster,
    puuid: &str,
    start_time: i64,
    end_time: i64,
    queues: &[u32],
    limit: usize,
) -> Result<Vec<String>, AppError> {
    let mut sorted_queues = queues.to_vec();
    sorted_queues.sort_unstable();
    let cache_key = (
        cluster.to_string(),
        puuid.to_string(),
        start_time,
        end_time,
        sorted_queues,
        limit,
    );
    if let Some(hit) = caches.ids.get(&cache_key) {
        return Ok(hit);
    }

    let mut ids: Vec<String> = Vec::new();
    let mut start = 0usize;
    loop {
        let mut query = format!(
            "start={start}&count={PAGE_SIZE}&startTime={start_time}&endTime={end_time}"
        );
        for queue in queues {
            query.push_str(&format!("&queue={queue}"));
        }
        let url = endpoints::match_ids_by_puuid(&client.host(cluster), puuid, &query);
        let response = client.call(&url).await?;
        if !response.status().is_success() {
            break;
        }
        let batch: Vec<String> = response.json().await?;
        let batch_len = batch.len();
        ids.extend(batch);
        if ids.len() >= limit || batch_len < PAGE_SIZE || ids.len() > HARD_ID_CAP {
            break;
        }
        start += PAGE_SIZE;
    }

    ids.truncate(limit);
    debug!(count = ids.len(), cluster = %cluster, "listed match ids");
    caches.ids.set(&cache_key, ids.clone(), IDS_TTL);
    Ok(ids)
}

/// Retrieves the target player's slice of one match. A failed fetch or
/// a match without the player yields `None`; a single bad match never
/// aborts the batch.
pub async fn fetch_slice(
    client: &RiotClient,
    caches: &RiotCaches,
    cluster: Cluster,
    match_id: &str,
    puuid: &str,
) -> Option<PlayerSlice> {
    let cache_key = (match_id.to_string(), puuid.to_string());
    if let Some(hit) = caches.slices.get(&cache_key) {
        return Some(hit);
    }

    let url = endpoints::match_by_id(&client.host(cluster), match_id);
    let response = client.call(&url).await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    let data: MatchDto = response.json().await.ok()?;
    let slice = PlayerSlice::from_match(&data, puuid)?;
    caches.slices.set(&cache_key, slice.clone(), SLICE_TTL);
    Some(slice)
}

/// Fetches one chunk of match ids with full parallelism inside the
/// chunk. Results come back in chunk order; chunks themselves are the
/// caller's responsibility to process sequentially.
pub async fn fetch_slice_chunk(
    client: &RiotClient,
    caches: &RiotCaches,
    cluster: Cluster,
    chunk: &[String],
    puuid: &str,
) -> Vec<Option<PlayerSlice>> {
    join_all(
        chunk
            .iter()
            .map(|id| fetch_slice(client, caches, cluster, id, puuid)),
    )
    .await
}
