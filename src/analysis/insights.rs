use serde::{Deserialize, Serialize};

use super::aggregate::{win_rate, ChampionRow, LaneRow, BEST_LANE_MIN_GAMES, WIN_RATE_MIN_GAMES};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightResult {
    pub summary: String,
    pub bullets: Vec<String>,
}

/// Rule-based reading of the aggregate tables. No randomness, no
/// external calls: the same input always yields the same output.
pub fn analyze_season(
    total_games: u32,
    champions: &[ChampionRow],
    lanes: &[LaneRow],
) -> InsightResult {
    let top_by_use = champions.iter().fold(None::<&ChampionRow>, |best, c| match best {
        Some(b) if b.games >= c.games => Some(b),
        _ => Some(c),
    });
    let top_by_win = champions
        .iter()
        .filter(|c| c.games >= WIN_RATE_MIN_GAMES)
        .fold(None::<&ChampionRow>, |best, c| match best {
            Some(b) if b.win_rate >= c.win_rate => Some(b),
            _ => Some(c),
        });
    let best_lane = lanes
        .iter()
        .filter(|l| l.games >= BEST_LANE_MIN_GAMES)
        .fold(None::<&LaneRow>, |best, l| match best {
            Some(b) if b.win_rate >= l.win_rate => Some(b),
            _ => Some(l),
        });

    let total_wins: u32 = champions.iter().map(|c| c.wins).sum();
    let overall = win_rate(total_wins, total_games);

    let mut summary_parts = vec![format!(
        "Played {total_games} games with an estimated overall win rate of {overall}%."
    )];
    if let Some(c) = top_by_use {
        summary_parts.push(format!(
            "Most-played champion: {} ({} games).",
            c.name, c.games
        ));
    }
    if let Some(c) = top_by_win {
        summary_parts.push(format!(
            "Highest win rate with {WIN_RATE_MIN_GAMES}+ games: {} ({}%).",
            c.name, c.win_rate
        ));
    }
    if let Some(l) = best_lane {
        summary_parts.push(format!(
            "Strongest lane: {} ({} games at {}% win rate).",
            l.lane, l.games, l.win_rate
        ));
    }

    let mut bullets = Vec::new();
    if let Some(c) = top_by_use {
        if c.win_rate < 50.0 {
            bullets.push(format!(
                "{} is your most-played champion but wins under half its games. Consider rotating in an alternative main.",
                c.name
            ));
        }
    }
    if let Some(l) = best_lane {
        if l.win_rate >= 55.0 {
            bullets.push(format!(
                "{} is performing well. Prioritizing that role in queue could raise your overall win rate.",
                l.lane
            ));
        }
    }
    if total_games < 30 {
        bullets.push(
            "Small sample size. Expect ratings to stabilize around 30-50 games.".to_string(),
        );
    }

    InsightResult {
        summary: summary_parts.join(" "),
        bullets,
    }
}
