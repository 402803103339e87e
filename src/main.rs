use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use std::path::Path;
use tastematch::algorithms::{similarity, Seeker};
use tastematch::services::poll::CommunityPoll;
use tastematch::utils::validation::{validate_category, validate_poll_item_id, validate_subject_tag};
use tastematch::utils::{cache_key, iso_week_id};
use tastematch::{init_tracing, AppState, CandidateProfile, Config, PreferenceSet};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the week id for now, or for an RFC 3339 timestamp
    WeekId {
        #[arg(long)]
        at: Option<String>,
    },
    /// Print the cache document id for a subject tag and category
    CacheKey {
        #[arg(long)]
        tag: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        week: Option<String>,
    },
    /// Score two JSON preference files against each other
    Similarity { first: String, second: String },
    /// Rank candidates from a JSON file against one of them
    Match {
        #[arg(long)]
        me: String,
        #[arg(long)]
        profiles: String,
        /// Rank other archetypes above the threshold instead of twins
        #[arg(long)]
        connections: bool,
    },
    /// Fetch this week's recommendations through the cache
    Recommend {
        #[arg(long)]
        tag: String,
        #[arg(long)]
        category: String,
    },
    /// Show this week's poll with like counts
    Poll {
        #[arg(long)]
        tag: String,
        #[arg(long)]
        category: String,
    },
    /// Like (or with --unlike, remove a like from) a poll item
    Like {
        #[arg(long)]
        tag: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        item: String,
        #[arg(long)]
        unlike: bool,
    },
}

fn load_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Config::from_file(path)
    } else {
        info!("Config file not found, using default configuration");
        Ok(Config::default())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing();

    match args.command {
        Command::WeekId { at } => {
            let now = match at {
                Some(raw) => DateTime::parse_from_rfc3339(&raw)
                    .with_context(|| format!("invalid timestamp '{}'", raw))?
                    .with_timezone(&Local),
                None => Local::now(),
            };
            println!("{}", iso_week_id(&now));
        }
        Command::CacheKey { tag, category, week } => {
            validate_subject_tag(&tag)?;
            validate_category(&category)?;
            let week = week.unwrap_or_else(|| iso_week_id(&Local::now()));
            println!("{}", cache_key(&tag, &category, &week));
        }
        Command::Similarity { first, second } => {
            let a: PreferenceSet = read_json(&first)?;
            let b: PreferenceSet = read_json(&second)?;
            println!("{}", similarity(&a, &b));
        }
        Command::Match { me, profiles, connections } => {
            let config = load_config(&args.config)?;
            let candidates: Vec<CandidateProfile> = read_json(&profiles)?;
            let seeker_profile = candidates
                .iter()
                .find(|candidate| candidate.id == me)
                .with_context(|| format!("no profile with id '{}' in {}", me, profiles))?;

            let preferences = seeker_profile.preferences.clone().unwrap_or_default();
            let seeker = Seeker {
                id: &seeker_profile.id,
                archetype: seeker_profile.archetype.as_deref(),
                preferences: &preferences,
            };

            let matcher = tastematch::algorithms::TasteMatcher::new(
                tastematch::algorithms::OverlapScorer,
                &config.matching,
            );
            let ranked = if connections {
                matcher.unexpected_connections(&seeker, &candidates)
            } else {
                matcher.taste_twins(&seeker, &candidates)
            };
            print_json(&ranked)?;
        }
        Command::Recommend { tag, category } => {
            validate_subject_tag(&tag)?;
            validate_category(&category)?;

            let state = AppState::new(load_config(&args.config)?)?;
            let outcome = state.recommendations.get_recommendations(&tag, &category).await;
            info!("Served {} ({:?})", outcome.key, outcome.source);
            print_json(&outcome.payload)?;

            state.shutdown().await;
            info!("Cache stats: {:?}", state.recommendations.metrics());
        }
        Command::Poll { tag, category } => {
            validate_subject_tag(&tag)?;
            validate_category(&category)?;

            let state = AppState::new(load_config(&args.config)?)?;
            let outcome = state.recommendations.get_recommendations(&tag, &category).await;
            let items = CommunityPoll::poll_items(&outcome.payload);
            let tally = state.poll.like_tally(&tag, &category).await?;

            for item in &items {
                println!("{}  {:>4}  {}", item.id, tally.count(&item.id).unwrap_or(0), item.title);
            }
            if let Some(featured) = CommunityPoll::featured_item(&tally, &items) {
                println!("featured: {}", featured.title);
            }

            state.shutdown().await;
        }
        Command::Like { tag, category, item, unlike } => {
            validate_subject_tag(&tag)?;
            validate_category(&category)?;
            validate_poll_item_id(&item)?;

            let state = AppState::new(load_config(&args.config)?)?;
            let tally = state.poll.toggle_like(&tag, &category, &item, unlike).await?;
            print_json(&tally)?;
        }
    }

    Ok(())
}
