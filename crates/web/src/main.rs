use chihiro_core::{Card, RateRow, Reaction, RngState, Roller};
use chihiro_data::{load_bot_config, BotConfig, PoolRepository};
use serde::Serialize;
use std::path::PathBuf;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND: &str = "0.0.0.0:7878";

fn main() {
    init_tracing();
    let config_path = std::env::var_os("CHIHIRO_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("chihiro.json"));
    let mut state = match AppState::load(config_path) {
        Ok(state) => state,
        Err(err) => {
            error!(error = %format!("{err:#}"), "failed to load configuration");
            std::process::exit(1);
        }
    };
    let bind = std::env::var("CHIHIRO_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let server = match Server::http(&bind) {
        Ok(server) => server,
        Err(err) => {
            error!(error = %err, bind = %bind, "failed to start server");
            std::process::exit(1);
        }
    };
    info!(bind = %bind, "chihiro web server listening");
    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, &mut state) {
            warn!(error = %err, "request error");
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("CHIHIRO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

struct AppState {
    config: BotConfig,
    roller: Roller<PoolRepository>,
    rng: RngState,
}

impl AppState {
    fn load(config_path: PathBuf) -> anyhow::Result<Self> {
        let config = load_bot_config(&config_path)?;
        let repo = PoolRepository::from_config(&config)?;
        let rng = match std::env::var("CHIHIRO_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
        {
            Some(seed) => RngState::from_seed(seed),
            None => RngState::from_entropy(),
        };
        Ok(Self {
            roller: Roller::new(repo, config.roll),
            config,
            rng,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Roll { pool: u32, count: Option<u32> },
    Pool { pool: u32 },
}

fn parse_route(method: &Method, url: &str) -> Option<Route> {
    if method != &Method::Get {
        return None;
    }
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["roll", pool] => Some(Route::Roll {
            pool: pool.parse().ok()?,
            count: query_value(query, "count").and_then(|value| value.parse().ok()),
        }),
        ["pool", pool] => Some(Route::Pool {
            pool: pool.parse().ok()?,
        }),
        _ => None,
    }
}

fn query_value<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value)
}

#[derive(Debug, Serialize, Default)]
struct RollResponse {
    ok: bool,
    error: Option<String>,
    pool: Option<String>,
    results: Option<String>,
    card: Option<Card>,
    reaction: Option<Reaction>,
    sticker: Option<String>,
}

#[derive(Debug, Serialize, Default)]
struct PoolResponse {
    ok: bool,
    error: Option<String>,
    pool: Option<String>,
    rates: Vec<RateRow>,
}

fn handle_request(
    request: tiny_http::Request,
    state: &mut AppState,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = request.url().to_string();
    match parse_route(request.method(), &url) {
        Some(Route::Roll { pool, count }) => {
            let response = roll_response(state, pool, count.unwrap_or(1));
            respond_json(request, &response)?;
        }
        Some(Route::Pool { pool }) => {
            let response = pool_response(state, pool);
            respond_json(request, &response)?;
        }
        None => {
            request.respond(Response::empty(StatusCode(404)))?;
        }
    }
    Ok(())
}

fn roll_response(state: &mut AppState, pool: u32, count: u32) -> RollResponse {
    let count = state.config.roll.normalize_count(count);
    match state.roller.roll(pool, count, &mut state.rng) {
        Ok(outcome) => {
            let reaction = outcome.card.as_ref().map(Reaction::for_card);
            let sticker = reaction
                .map(|reaction| match reaction {
                    Reaction::Rare => state.config.canned.sticker_rare.clone(),
                    Reaction::Regular => state.config.canned.sticker_regular.clone(),
                })
                .filter(|sticker| !sticker.is_empty());
            RollResponse {
                ok: true,
                error: None,
                pool: Some(outcome.pool),
                results: Some(outcome.results),
                card: outcome.card,
                reaction,
                sticker,
            }
        }
        Err(err) => {
            warn!(pool, count, error = %err, "roll failed");
            RollResponse {
                error: Some(state.config.canned.no_data.clone()),
                ..RollResponse::default()
            }
        }
    }
}

fn pool_response(state: &mut AppState, pool: u32) -> PoolResponse {
    match state.roller.pool(pool) {
        Ok(pool) => PoolResponse {
            ok: true,
            error: None,
            pool: Some(pool.name.clone()),
            rates: pool.rate_table(),
        },
        Err(err) => {
            warn!(pool, error = %err, "pool lookup failed");
            PoolResponse {
                error: Some(state.config.canned.no_data.clone()),
                ..PoolResponse::default()
            }
        }
    }
}

fn respond_json<T: Serialize>(
    request: tiny_http::Request,
    response: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = serde_json::to_vec_pretty(response)?;
    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| "invalid content-type header")?;
    request.respond(Response::from_data(body).with_header(header))?;
    Ok(())
}
