use colored::*;
use tabled::{settings::Style, Table, Tabled};

use crate::analysis::buckets::BucketReport;
use crate::pipeline::SeasonReport;

#[derive(Tabled)]
struct ChampionTableRow {
    champion: String,
    games: String,
    wins: String,
    #[tabled(rename = "win rate")]
    win_rate: String,
    lane: String,
}

#[derive(Tabled)]
struct LaneTableRow {
    lane: String,
    games: String,
    wins: String,
    #[tabled(rename = "win rate")]
    win_rate: String,
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn display_report(report: &SeasonReport) {
    let meta = &report.meta;
    println!(
        "\n{}",
        format!("📊 SEASON RECAP — {} ({})", meta.riot_id, meta.year)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(70).cyan());
    println!(
        "{} {} games on {} ({}), overall best lane: {}\n",
        "📈".bold(),
        meta.total_games.to_string().green(),
        meta.cluster,
        meta.puuid,
        report.best_lane.bold()
    );

    if report.champions.is_empty() {
        println!("{}", "No games found in this window".yellow());
        return;
    }

    println!("{}", "Most played".bold().yellow());
    print_champion_table(&report.top_used);

    if !report.top_win_rate.is_empty() {
        println!("{}", "Best win rate (5+ games)".bold().yellow());
        print_champion_table(&report.top_win_rate);
    }

    println!("{}", "Lanes".bold().yellow());
    let lane_rows: Vec<LaneTableRow> = report
        .lanes
        .iter()
        .map(|l| LaneTableRow {
            lane: l.lane.clone(),
            games: l.games.to_string(),
            wins: l.wins.to_string(),
            win_rate: format!("{:.1}%", l.win_rate),
        })
        .collect();
    let mut table = Table::new(lane_rows);
    table.with(Style::rounded());
    println!("{}\n", table);

    if let Some(buckets) = &report.by_patch {
        display_buckets("By patch", buckets);
    }
    if let Some(buckets) = &report.by_split {
        display_buckets("By split", buckets);
    }

    println!("{}", "Insights".bold().yellow());
    println!("{}\n", report.insights.summary);
    for bullet in &report.insights.bullets {
        println!("• {bullet}");
    }
    println!();
}

fn display_buckets(title: &str, buckets: &[BucketReport]) {
    println!("{}", title.bold().yellow());
    for bucket in buckets {
        println!(
            "  {} — {} games, best lane {}",
            bucket.key.bold(),
            bucket.total_games,
            bucket.best_lane
        );
        if let Some(top) = bucket.top_used.first() {
            println!(
                "    most played: {} ({} games, {:.1}%)",
                top.name, top.games, top.win_rate
            );
        }
    }
    println!();
}

fn print_champion_table(rows: &[crate::analysis::aggregate::ChampionRow]) {
    let table_rows: Vec<ChampionTableRow> = rows
        .iter()
        .map(|c| ChampionTableRow {
            champion: c.name.clone(),
            games: c.games.to_string(),
            wins: c.wins.to_string(),
            win_rate: format!("{:.1}%", c.win_rate),
            lane: c.lane.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}
