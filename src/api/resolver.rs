use reqwest::StatusCode;
use tracing::{debug, info};

use super::client::RiotClient;
use super::cluster::Cluster;
use super::models::AccountDto;
use super::{endpoints, RiotCaches, ACCOUNT_TTL, CLUSTER_TTL};
use crate::error::AppError;

/// Resolves a human-entered `"Name#Tag"` identifier to a stable
/// account.
///
/// Clusters are tried in fixed order. An unauthorized response is a
/// credential problem, not a cluster miss, and fails immediately. A
/// not-found is remembered while the remaining clusters are tried.
pub async fn resolve_account(
    client: &RiotClient,
    caches: &RiotCaches,
    riot_id: &str,
) -> Result<AccountDto, AppError> {
    let (name, tag) = riot_id.split_once('#').ok_or(AppError::InvalidRiotId)?;
    if name.is_empty() || tag.is_empty() {
        return Err(AppError::InvalidRiotId);
    }

    let cache_key = (name.to_string(), tag.to_string());
    if let Some(hit) = caches.account.get(&cache_key) {
        return Ok(hit);
    }

    let mut saw_not_found = false;
    for cluster in Cluster::ALL {
        let url = endpoints::account_by_riot_id(&client.host(cluster), name, tag);
        let response = match client.call(&url).await {
            Ok(r) => r,
            Err(_) => continue,
        };
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AppError::Unauthorized);
            }
            StatusCode::NOT_FOUND => {
                saw_not_found = true;
                continue;
            }
            status if status.is_success() => {
                let account: AccountDto = match response.json().await {
                    Ok(a) => a,
                    Err(_) => continue,
                };
                info!(cluster = %cluster, "resolved account");
                caches.account.set(&cache_key, account.clone(), ACCOUNT_TTL);
                return Ok(account);
            }
            _ => continue,
        }
    }

    if saw_not_found {
        Err(AppError::PlayerNotFound(riot_id.to_string()))
    } else {
        Err(AppError::AccountLookupFailed)
    }
}

/// Determines which cluster owns a player's match data.
///
/// The static tag table wins; the live probe (a one-record match
/// listing against each cluster) is only a fallback, and when even
/// that fails the default cluster is used rather than failing the
/// request. Detection is best-effort.
pub async fn resolve_cluster(
    client: &RiotClient,
    caches: &RiotCaches,
    puuid: &str,
    tag_line: &str,
) -> Cluster {
    if let Some(cluster) = Cluster::from_tag_line(tag_line) {
        return cluster;
    }

    let cache_key = ("cluster", puuid.to_string());
    if let Some(hit) = caches.cluster.get(&cache_key) {
        return hit;
    }

    for cluster in Cluster::ALL {
        let url = endpoints::match_ids_by_puuid(&client.host(cluster), puuid, "start=0&count=1");
        let response = match client.call(&url).await {
            Ok(r) => r,
            Err(_) => continue,
        };
        if !response.status().is_success() {
            continue;
        }
        match response.json::<Vec<String>>().await {
            Ok(ids) if !ids.is_empty() => {
                debug!(cluster = %cluster, "cluster detected by live probe");
                caches.cluster.set(&cache_key, cluster, CLUSTER_TTL);
                return cluster;
            }
            _ => continue,
        }
    }

    debug!("cluster detection failed, using default");
    Cluster::Asia
}
