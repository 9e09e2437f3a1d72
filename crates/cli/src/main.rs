use chihiro_core::{GachaError, Reaction, RngState, RollOutcome, Roller};
use chihiro_data::{load_bot_config, BotConfig, PoolRepository};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "chihiro.json";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Roll { pool: u32, count: u32 },
    Pool { pool: u32 },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    command: Command,
    seed: Option<u64>,
    config: PathBuf,
    json: bool,
}

fn default_config_path() -> PathBuf {
    std::env::var_os("CHIHIRO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// `roll` is one draw, `10roll` ten, `300roll` a full spark.
fn parse_roll_keyword(token: &str) -> Option<u32> {
    let prefix = token.strip_suffix("roll")?;
    if prefix.is_empty() {
        return Some(1);
    }
    prefix.parse::<u32>().ok()
}

fn parse_cli_options(args: &[String]) -> Result<CliOptions, String> {
    let mut seed = std::env::var("CHIHIRO_SEED")
        .ok()
        .and_then(|value| value.parse::<u64>().ok());
    let mut config = default_config_path();
    let mut json = false;
    let mut positional: Vec<&str> = Vec::new();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--json" => json = true,
            "--seed" => {
                let value = args.get(idx + 1).ok_or("--seed needs a value")?;
                seed = Some(value.parse::<u64>().map_err(|err| format!("bad seed: {err}"))?);
                idx += 1;
            }
            "--config" | "-c" => {
                let value = args.get(idx + 1).ok_or("--config needs a path")?;
                config = PathBuf::from(value);
                idx += 1;
            }
            "--help" | "-h" => positional.insert(0, "help"),
            other => positional.push(other),
        }
        idx += 1;
    }

    let parse_pool = |value: Option<&&str>| -> Result<u32, String> {
        let value = value.ok_or("missing pool id")?;
        value
            .parse::<u32>()
            .map_err(|err| format!("bad pool id {value}: {err}"))
    };

    let command = match positional.first().copied() {
        None | Some("help") => Command::Help,
        Some("pool") => Command::Pool {
            pool: parse_pool(positional.get(1))?,
        },
        Some(keyword) => {
            let Some(keyword_count) = parse_roll_keyword(keyword) else {
                return Err(format!("unknown command {keyword}"));
            };
            let pool = parse_pool(positional.get(1))?;
            let count = match positional.get(2) {
                Some(value) => value
                    .parse::<u32>()
                    .map_err(|err| format!("bad count {value}: {err}"))?,
                None => keyword_count,
            };
            Command::Roll { pool, count }
        }
    };
    Ok(CliOptions {
        command,
        seed,
        config,
        json,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CHIHIRO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_help() {
    println!("usage: chihiro <command> [--config PATH] [--seed N] [--json]");
    println!("  roll <pool-id> [count]   draw once, or `count` times (1..=300)");
    println!("  10roll <pool-id>         ten draws");
    println!("  300roll <pool-id>        three hundred draws");
    println!("  pool <pool-id>           list cards with base and guaranteed rates");
}

fn sticker_for<'a>(config: &'a BotConfig, outcome: &RollOutcome) -> Option<&'a str> {
    let card = outcome.card.as_ref()?;
    let sticker = match Reaction::for_card(card) {
        Reaction::Rare => config.canned.sticker_rare.as_str(),
        Reaction::Regular => config.canned.sticker_regular.as_str(),
    };
    (!sticker.is_empty()).then_some(sticker)
}

fn run(options: &CliOptions) -> Result<(), String> {
    let config = load_bot_config(&options.config).map_err(|err| format!("{err:#}"))?;
    let repo = PoolRepository::from_config(&config).map_err(|err| format!("{err:#}"))?;
    let mut roller = Roller::new(repo, config.roll);
    match options.command {
        Command::Help => print_help(),
        Command::Pool { pool } => match roller.pool(pool) {
            Ok(pool) => {
                if options.json {
                    let body = serde_json::to_string_pretty(&pool.rate_table())
                        .map_err(|err| err.to_string())?;
                    println!("{body}");
                } else {
                    println!("{}", pool.name);
                    for row in pool.rate_table() {
                        println!(
                            "{}{} {} {:.4}% / {:.4}%{}",
                            if row.card.limited { "限" } else { "" },
                            row.card.rarity,
                            row.card.tagged_name(),
                            row.base_percent,
                            row.special_percent,
                            if row.pickup { " (pickup)" } else { "" }
                        );
                    }
                }
            }
            Err(err) => report_failure(&config, &err),
        },
        Command::Roll { pool, count } => {
            let count = config.roll.normalize_count(count);
            let mut rng = match options.seed {
                Some(seed) => RngState::from_seed(seed),
                None => RngState::from_entropy(),
            };
            info!(pool, count, seed = rng.seed(), "roll requested");
            match roller.roll(pool, count, &mut rng) {
                Ok(outcome) => {
                    if options.json {
                        let body = serde_json::to_string_pretty(&outcome)
                            .map_err(|err| err.to_string())?;
                        println!("{body}");
                    } else {
                        println!("{}", outcome.results);
                        if let Some(sticker) = sticker_for(&config, &outcome) {
                            println!("[sticker {sticker}]");
                        }
                    }
                }
                Err(err) => report_failure(&config, &err),
            }
        }
    }
    Ok(())
}

fn report_failure(config: &BotConfig, err: &GachaError) {
    error!(error = %err, "roll failed");
    println!("{}", config.canned.no_data);
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_cli_options(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            print_help();
            std::process::exit(2);
        }
    };
    if let Err(err) = run(&options) {
        eprintln!("chihiro error: {err}");
        std::process::exit(1);
    }
}
