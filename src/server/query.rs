use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;

use crate::api::cluster::Cluster;
use crate::config::parse_queues;
use crate::error::QueryIssue;
use crate::pipeline::{StatsMode, StatsRequest};

pub const MIN_YEAR: i32 = 2010;
pub const MAX_YEAR: i32 = 2100;
pub const MIN_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 2000;
pub const DEFAULT_LIMIT: usize = 300;
pub const MIN_PATCH_COUNT: usize = 1;
pub const MAX_PATCH_COUNT: usize = 20;

/// Raw query-string shape. Everything arrives as an optional string
/// so validation can report field-level issues instead of a framework
/// rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStatsQuery {
    pub riot_id: Option<String>,
    pub year: Option<String>,
    pub queues: Option<String>,
    pub cluster: Option<String>,
    pub limit: Option<String>,
    pub mode: Option<String>,
    pub patch: Option<String>,
    pub patch_count: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Validates a raw query into a [`StatsRequest`], accumulating every
/// field problem rather than stopping at the first.
pub fn validate(raw: &RawStatsQuery, default_queues: &[u32]) -> Result<StatsRequest, Vec<QueryIssue>> {
    let mut issues = Vec::new();

    let riot_id = match &raw.riot_id {
        Some(id) if id.len() >= 3 => id.clone(),
        Some(_) => {
            issues.push(QueryIssue::new("riotId", "must be at least 3 characters"));
            String::new()
        }
        None => {
            issues.push(QueryIssue::new("riotId", "required"));
            String::new()
        }
    };

    let year = match &raw.year {
        Some(y) => match y.parse::<i32>() {
            Ok(y) if (MIN_YEAR..=MAX_YEAR).contains(&y) => y,
            Ok(_) => {
                issues.push(QueryIssue::new(
                    "year",
                    format!("must be between {MIN_YEAR} and {MAX_YEAR}"),
                ));
                0
            }
            Err(_) => {
                issues.push(QueryIssue::new("year", "must be an integer"));
                0
            }
        },
        None => Utc::now().year(),
    };

    let queues = match &raw.queues {
        Some(raw_queues) => match parse_queues(raw_queues) {
            Ok(q) => q,
            Err(bad) => {
                issues.push(QueryIssue::new("queues", format!("bad queue id '{bad}'")));
                Vec::new()
            }
        },
        None => default_queues.to_vec(),
    };

    let cluster = match &raw.cluster {
        Some(c) => match c.parse::<Cluster>() {
            Ok(c) => Some(c),
            Err(()) => {
                issues.push(QueryIssue::new(
                    "cluster",
                    "must be one of americas, asia, europe",
                ));
                None
            }
        },
        None => None,
    };

    let limit = match &raw.limit {
        Some(l) => match l.parse::<usize>() {
            Ok(l) if (MIN_LIMIT..=MAX_LIMIT).contains(&l) => l,
            _ => {
                issues.push(QueryIssue::new(
                    "limit",
                    format!("must be an integer between {MIN_LIMIT} and {MAX_LIMIT}"),
                ));
                DEFAULT_LIMIT
            }
        },
        None => DEFAULT_LIMIT,
    };

    let mode = validate_mode(raw, &mut issues);

    if issues.is_empty() {
        Ok(StatsRequest {
            riot_id,
            year,
            queues,
            cluster,
            limit,
            mode,
        })
    } else {
        Err(issues)
    }
}

fn validate_mode(raw: &RawStatsQuery, issues: &mut Vec<QueryIssue>) -> StatsMode {
    match raw.mode.as_deref() {
        None | Some("year") => StatsMode::Year,
        Some("patch") => match &raw.patch {
            Some(patch) if is_patch_format(patch) => StatsMode::Patch(patch.clone()),
            Some(_) => {
                issues.push(QueryIssue::new("patch", "must look like MAJOR.MINOR"));
                StatsMode::Year
            }
            None => {
                issues.push(QueryIssue::new("patch", "required when mode=patch"));
                StatsMode::Year
            }
        },
        Some("patches") => match &raw.patch_count {
            Some(count) => match count.parse::<usize>() {
                Ok(n) if (MIN_PATCH_COUNT..=MAX_PATCH_COUNT).contains(&n) => StatsMode::Patches(n),
                _ => {
                    issues.push(QueryIssue::new(
                        "patchCount",
                        format!("must be an integer between {MIN_PATCH_COUNT} and {MAX_PATCH_COUNT}"),
                    ));
                    StatsMode::Year
                }
            },
            None => StatsMode::Patches(crate::analysis::buckets::DEFAULT_PATCH_COUNT),
        },
        Some("splits") => StatsMode::Splits,
        Some("custom") => {
            let from = parse_date("from", &raw.from, issues);
            let to = parse_date("to", &raw.to, issues);
            match (from, to) {
                (Some(from), Some(to)) if from <= to => StatsMode::Custom { from, to },
                (Some(_), Some(_)) => {
                    issues.push(QueryIssue::new("from", "must not be after 'to'"));
                    StatsMode::Year
                }
                _ => StatsMode::Year,
            }
        }
        Some(_) => {
            issues.push(QueryIssue::new(
                "mode",
                "must be one of year, patch, patches, splits, custom",
            ));
            StatsMode::Year
        }
    }
}

fn parse_date(field: &str, raw: &Option<String>, issues: &mut Vec<QueryIssue>) -> Option<NaiveDate> {
    match raw {
        Some(s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                issues.push(QueryIssue::new(field, "must be YYYY-MM-DD"));
                None
            }
        },
        None => {
            issues.push(QueryIssue::new(field, "required when mode=custom"));
            None
        }
    }
}

fn is_patch_format(patch: &str) -> bool {
    matches!(
        patch.split_once('.'),
        Some((major, minor))
            if major.parse::<u32>().is_ok() && minor.parse::<u32>().is_ok()
    )
}
