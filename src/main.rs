use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use tft_scout::api::endpoints::{Division, Tier};
use tft_scout::api::TftApiClient;
use tft_scout::config::{load_domain, Config};
use tft_scout::display::output::{
    display_error, display_info, display_ladder, display_match_digests, display_player_summary,
    display_region, display_success,
};
use tft_scout::ladder::{self, LadderRow};
use tft_scout::region::resolve_region;
use tft_scout::{dump, logging, summary, ApiError};

#[derive(Parser, Debug)]
#[command(name = "tft_scout")]
#[command(about = "Fetch TFT ladder and match data from the Riot API", long_about = None)]
struct Args {
    /// Platform code, e.g. KR, NA1, EUW1 (default: TFT_REGION or KR)
    #[arg(short, long, global = true)]
    region: Option<String>,

    /// Debug logging for this crate
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the hosts serving a platform code
    Region { code: String },

    /// One ladder page of a tier, with names resolved
    Ladder {
        /// IRON .. DIAMOND, MASTER, GRANDMASTER, CHALLENGER
        tier: String,

        /// Ignored for apex tiers
        #[arg(short, long, default_value = "I")]
        division: String,

        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Number of entries to enrich
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Directory for a date-stamped JSON dump
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Page 1 of every tier
    AllTiers {
        #[arg(short, long, default_value = "3")]
        limit: usize,

        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Recent matches of a Riot ID (Name#TAG)
    Matches {
        riot_id: String,

        #[arg(short, long, default_value = "3")]
        count: u32,
    },

    /// Full detail of one match as JSON
    Match {
        match_id: String,

        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Riot ID (gameName#tagLine) for a puuid
    RiotName { puuid: String },

    /// Rank and recent activity for a summoner name
    Summary { name: String },
}

impl Command {
    fn feature(&self) -> &'static str {
        match self {
            Command::Region { .. } => "지역 확인",
            Command::Ladder { .. } | Command::AllTiers { .. } => "티어 순위 조회",
            Command::Matches { .. } | Command::Match { .. } => "전적 조회",
            Command::RiotName { .. } => "Riot ID 조회",
            Command::Summary { .. } => "소환사 요약",
        }
    }
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);
    let feature = args.command.feature();

    if let Err(e) = run(args) {
        match e.downcast_ref::<ApiError>() {
            Some(api) => display_error(&api.apology(feature)),
            None => display_error(&e.to_string()),
        }
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if let Command::Region { code } = &args.command {
        let hosts = resolve_region(code, &load_domain())?;
        display_region(code, &hosts);
        return Ok(());
    }

    let mut config = Config::from_env()?;
    if let Some(code) = &args.region {
        config.region = code.parse()?;
    }
    let platform = config.region;
    let client = TftApiClient::new(config);

    match args.command {
        Command::Region { .. } => {}

        Command::Ladder {
            tier,
            division,
            page,
            limit,
            save,
        } => {
            let tier: Tier = tier.parse()?;
            let division: Division = division.parse()?;

            display_info(&format!("Fetching {} {} page {} in {}", tier, division, page, platform));
            let entries = ladder::fetch_tier_page(&client, platform, tier, division, page)
                .with_context(|| format!("fetching {} ladder", tier))?;

            let rows = with_progress(limit.min(entries.len()), |on_row| {
                ladder::enrich(&client, platform, tier, division, &entries, limit, on_row)
            })?;

            display_ladder(&rows);
            save_rows(save, &format!("tft_{}_{}", tier.as_str().to_lowercase(), division), &rows)?;
        }

        Command::AllTiers { limit, save } => {
            display_info(&format!("Collecting page 1 of every tier in {}", platform));
            let rows = with_progress(limit * Tier::ALL.len(), |on_row| {
                ladder::collect_all_tiers(&client, platform, limit, on_row)
            })?;

            display_ladder(&rows);
            save_rows(save, "tft_alltiers_page1", &rows)?;
        }

        Command::Matches { riot_id, count } => {
            let (game_name, tag_line) = summary::parse_riot_id(&riot_id)
                .context("Riot ID must look like Name#TAG, e.g. Hide on bush#KR1")?;

            let digests =
                summary::recent_match_digests(&client, platform, game_name, tag_line, count)
                    .with_context(|| format!("fetching matches of {}", riot_id))?;
            display_match_digests(&riot_id, &digests);
        }

        Command::Match { match_id, save } => {
            let detail = client
                .get_match_detail(platform, &match_id)
                .with_context(|| format!("fetching match {}", match_id))?;

            match save {
                Some(dir) => {
                    let path = dump::save_json(&dir, &format!("match_{}", match_id), &detail)?;
                    display_success(&format!("Saved {}", path.display()));
                }
                None => println!("{}", serde_json::to_string_pretty(&detail)?),
            }
        }

        Command::RiotName { puuid } => {
            match client.resolve_riot_name(platform, &puuid)? {
                Some(name) => display_success(&name),
                None => display_info("No Riot ID for this puuid"),
            }
        }

        Command::Summary { name } => {
            let summary = summary::get_player_summary(&client, platform, &name)
                .with_context(|| format!("summarising {}", name))?;
            display_player_summary(&summary);
        }
    }

    tracing::debug!(
        admitted = client.gate().admitted(),
        throttled = client.gate().throttled(),
        "request budget"
    );
    Ok(())
}

fn with_progress<F>(len: usize, f: F) -> Result<Vec<LadderRow>>
where
    F: FnOnce(&mut dyn FnMut(&LadderRow)) -> Result<Vec<LadderRow>, ApiError>,
{
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("resolving names");

    let result = f(&mut |row: &LadderRow| {
        pb.set_message(row.riot_name.clone());
        pb.inc(1);
    });

    pb.finish_and_clear();
    Ok(result?)
}

fn save_rows(dir: Option<PathBuf>, stem: &str, rows: &[LadderRow]) -> Result<()> {
    if let Some(dir) = dir {
        let path = dump::save_json(&dir, stem, rows)
            .with_context(|| format!("writing dump to {}", dir.display()))?;
        display_success(&format!("Saved {} rows to {}", rows.len(), path.display()));
    }
    Ok(())
}
