use crate::ladder::LadderRow;
use crate::region::RegionHosts;
use crate::summary::{MatchDigest, PlayerSummary};
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct LadderTableRow {
    #[tabled(rename = "#")]
    number: String,
    tier: String,
    #[tabled(rename = "Riot ID")]
    riot_name: String,
    #[tabled(rename = "LP")]
    league_points: String,
    wins: String,
    losses: String,
    #[tabled(rename = "win rate")]
    win_rate: String,
}

#[derive(Tabled)]
struct BoardRow {
    unit: String,
    stars: String,
}

pub fn display_ladder(rows: &[LadderRow]) {
    if rows.is_empty() {
        println!("{}", "No ladder entries".yellow());
        return;
    }

    println!("\n{}", "TFT ladder".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    let table_rows: Vec<LadderTableRow> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| LadderTableRow {
            number: format!("{}", idx + 1),
            tier: format!("{} {}", row.tier, row.division).trim().to_string(),
            riot_name: row.riot_name.clone(),
            league_points: row.league_points.to_string(),
            wins: row.wins.to_string(),
            losses: row.losses.to_string(),
            win_rate: row
                .win_rate()
                .map(|w| format!("{:.1}%", w))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_match_digests(riot_id: &str, digests: &[MatchDigest]) {
    println!("\n{}", format!("Recent matches for {}", riot_id).bold().cyan());

    if digests.is_empty() {
        println!("{}", "No recent matches".yellow());
        return;
    }

    for (idx, d) in digests.iter().enumerate() {
        println!("\n{}", format!("[{}] {}", idx + 1, d.match_id).bold());
        println!(
            "placement: {} | level: {} | damage: {} | gold left: {}",
            placement(d.placement),
            d.level,
            d.total_damage_to_players,
            d.gold_left
        );
        if let Some(at) = d.played_at {
            println!("played: {}", at.format("%Y-%m-%d %H:%M:%S"));
        }

        if !d.traits.is_empty() {
            let traits: Vec<String> = d
                .traits
                .iter()
                .map(|t| format!("{} ({})", t.name, t.num_units))
                .collect();
            println!("traits: {}", traits.join(", "));
        }

        if !d.units.is_empty() {
            let rows: Vec<BoardRow> = d
                .units
                .iter()
                .map(|u| BoardRow {
                    unit: u.character_id.clone(),
                    stars: "★".repeat(u.tier as usize),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }

        if !d.augments.is_empty() {
            println!("augments: {}", d.augments.join(", "));
        }
    }
    println!();
}

pub fn display_player_summary(summary: &PlayerSummary) {
    let name = summary.summoner.name.as_deref().unwrap_or("?");
    println!("\n{}", format!("Summary for {}", name).bold().cyan());
    println!("level: {}", summary.summoner.summoner_level);

    match &summary.rank {
        Some(rank) => println!(
            "rank: {} {} ({} LP)",
            rank.get("tier").and_then(|v| v.as_str()).unwrap_or("UNRANKED"),
            rank.get("rank").and_then(|v| v.as_str()).unwrap_or(""),
            rank.get("leaguePoints").and_then(|v| v.as_i64()).unwrap_or(0)
        ),
        None => println!("rank: UNRANKED"),
    }
    println!("recent matches: {}", summary.recent_match_ids.len());
}

pub fn display_region(code: &str, hosts: &RegionHosts) {
    println!("{} {}", "Region".bold(), code.to_uppercase());
    println!("  platform:    {}", hosts.platform);
    println!("  continental: {}", hosts.continental);
}

fn placement(p: u32) -> ColoredString {
    let text = p.to_string();
    match p {
        1 => text.yellow().bold(),
        2..=4 => text.green(),
        _ => text.normal(),
    }
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}
