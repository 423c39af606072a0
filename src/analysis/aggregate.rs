use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::api::models::{PlayerSlice, UNKNOWN_LANE};

/// Champions need this many games to rank by win rate.
pub const WIN_RATE_MIN_GAMES: u32 = 5;
/// Lanes need this many games before one is called "best".
pub const BEST_LANE_MIN_GAMES: u32 = 10;

/// `round(wins / max(games, 1) * 1000) / 10`, one decimal place.
/// Zero games is zero percent, never a division error.
pub fn win_rate(wins: u32, games: u32) -> f64 {
    (wins as f64 / games.max(1) as f64 * 1000.0).round() / 10.0
}

/// Occurrence counter keeping keys in first-insertion order, so the
/// argmax tie-break is explicit rather than an accident of hash
/// iteration: ties go to the key inserted first.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    counts: Vec<(String, u32)>,
}

impl Histogram {
    pub fn bump(&mut self, key: &str) {
        match self.counts.iter_mut().find(|(k, _)| k == key) {
            Some((_, n)) => *n += 1,
            None => self.counts.push((key.to_string(), 1)),
        }
    }

    pub fn argmax(&self) -> Option<&str> {
        let mut best: Option<(&str, u32)> = None;
        for (key, n) in &self.counts {
            match best {
                Some((_, max)) if *n <= max => {}
                _ => best = Some((key, *n)),
            }
        }
        best.map(|(key, _)| key)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone)]
struct ChampEntry {
    games: u32,
    wins: u32,
    lanes: Histogram,
    patches: Histogram,
    order: usize,
}

#[derive(Debug, Clone)]
struct LaneEntry {
    games: u32,
    wins: u32,
    order: usize,
}

/// Per-champion output row. `win_rate` is always derived from
/// `(wins, games)`, never stored independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChampionRow {
    pub name: String,
    pub games: u32,
    pub wins: u32,
    pub win_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_patch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaneRow {
    pub lane: String,
    pub games: u32,
    pub wins: u32,
    pub win_rate: f64,
}

/// Incrementally folds player slices into champion and lane tables.
///
/// The fold is commutative and associative (`games += 1`,
/// `wins += win`), so slices within a chunk may land in any order
/// while snapshots stay consistent. Only observed keys materialize;
/// output rows come back in first-seen order, which makes repeat runs
/// over the same slices byte-identical.
#[derive(Debug, Default)]
pub struct SeasonAggregator {
    champions: HashMap<String, ChampEntry>,
    lanes: HashMap<String, LaneEntry>,
    next_order: usize,
    total_games: u32,
    total_wins: u32,
}

impl SeasonAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, slice: &PlayerSlice) {
        let win = slice.win;
        let order = self.next_order;
        self.next_order += 1;

        let champ = self
            .champions
            .entry(slice.champion_name.clone())
            .or_insert_with(|| ChampEntry {
                games: 0,
                wins: 0,
                lanes: Histogram::default(),
                patches: Histogram::default(),
                order,
            });
        champ.games += 1;
        if win {
            champ.wins += 1;
        }
        champ.lanes.bump(&slice.lane);
        if let Some(patch) = &slice.patch {
            champ.patches.bump(patch);
        }

        let lane = self
            .lanes
            .entry(slice.lane.clone())
            .or_insert_with(|| LaneEntry {
                games: 0,
                wins: 0,
                order,
            });
        lane.games += 1;
        if win {
            lane.wins += 1;
        }

        self.total_games += 1;
        if win {
            self.total_wins += 1;
        }
    }

    pub fn fold_all<'a>(&mut self, slices: impl IntoIterator<Item = &'a PlayerSlice>) {
        for slice in slices {
            self.fold(slice);
        }
    }

    pub fn total_games(&self) -> u32 {
        self.total_games
    }

    pub fn total_wins(&self) -> u32 {
        self.total_wins
    }

    pub fn overall_win_rate(&self) -> f64 {
        win_rate(self.total_wins, self.total_games)
    }

    /// All observed champions in first-seen order.
    pub fn champion_rows(&self) -> Vec<ChampionRow> {
        let mut entries: Vec<(&String, &ChampEntry)> = self.champions.iter().collect();
        entries.sort_by_key(|(_, e)| e.order);
        entries
            .into_iter()
            .map(|(name, e)| ChampionRow {
                name: name.clone(),
                games: e.games,
                wins: e.wins,
                win_rate: win_rate(e.wins, e.games),
                lane: e.lanes.argmax().map(|l| l.to_string()),
                primary_patch: e.patches.argmax().map(|p| p.to_string()),
                icon: None,
            })
            .collect()
    }

    /// All observed lanes in first-seen order.
    pub fn lane_rows(&self) -> Vec<LaneRow> {
        let mut entries: Vec<(&String, &LaneEntry)> = self.lanes.iter().collect();
        entries.sort_by_key(|(_, e)| e.order);
        entries
            .into_iter()
            .map(|(lane, e)| LaneRow {
                lane: lane.clone(),
                games: e.games,
                wins: e.wins,
                win_rate: win_rate(e.wins, e.games),
            })
            .collect()
    }

    /// Champions sorted descending by games, truncated to `n`. Ties
    /// keep first-seen order (stable sort over first-seen rows).
    pub fn top_by_usage(&self, n: usize) -> Vec<ChampionRow> {
        let mut rows = self.champion_rows();
        rows.sort_by(|a, b| b.games.cmp(&a.games));
        rows.truncate(n);
        rows
    }

    /// Champions with at least [`WIN_RATE_MIN_GAMES`] games, sorted
    /// descending by win rate, truncated to `n`.
    pub fn top_by_win_rate(&self, n: usize) -> Vec<ChampionRow> {
        let mut rows = self.champion_rows();
        rows.retain(|c| c.games >= WIN_RATE_MIN_GAMES);
        rows.sort_by(|a, b| {
            b.win_rate
                .partial_cmp(&a.win_rate)
                .unwrap_or(Ordering::Equal)
        });
        rows.truncate(n);
        rows
    }

    /// Best-performing lane among those with at least
    /// [`BEST_LANE_MIN_GAMES`] games, or the `UNKNOWN` sentinel when
    /// no lane qualifies.
    pub fn best_lane(&self) -> String {
        let mut rows = self.lane_rows();
        rows.retain(|l| l.games >= BEST_LANE_MIN_GAMES);
        rows.sort_by(|a, b| {
            b.win_rate
                .partial_cmp(&a.win_rate)
                .unwrap_or(Ordering::Equal)
        });
        rows.into_iter()
            .next()
            .map(|l| l.lane)
            .unwrap_or_else(|| UNKNOWN_LANE.to_string())
    }
}
