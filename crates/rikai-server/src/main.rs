use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use edict_db::{Lexicon, LoadMode};
use edict_deinflect::RuleTable;

use rikai_server::rate_limit::ThrottleLayer;
use rikai_server::{AppState, LookupService, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_DICT_DIR: &str = "data";
const WORDS_FILE: &str = "edict2";
const NAMES_FILE: &str = "enamdict";
const RULES_FILE: &str = "deinflect.dat";
const DEFAULT_RATE_LIMIT_RPS: u32 = 10;
const DEFAULT_RATE_LIMIT_BURST: u32 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using dictionaries in {} (mode: {:?})",
        config.dict_dir.display(),
        config.load_mode
    );
    if config.disable_cache {
        info!("cache headers disabled");
    }
    info!(
        "rate limit: {} req/s (burst {})",
        config.rate_limit_rps, config.rate_limit_burst
    );

    // The three sources load independently; a missing one degrades the
    // service to empty results for the lookups that would need it.
    let start = Instant::now();
    let (words, names, rules) = tokio::join!(
        load_lexicon(config.dict_dir.join(WORDS_FILE), config.load_mode, "words"),
        load_lexicon(config.dict_dir.join(NAMES_FILE), config.load_mode, "names"),
        load_rules(config.dict_dir.join(RULES_FILE)),
    );
    info!("dictionaries loaded in {} ms", start.elapsed().as_millis());

    let lookup = LookupService::new(words, names, rules);
    if !lookup.ready() {
        warn!("lookup service started without its word data; serving empty results");
    }

    let state = AppState {
        lookup: Arc::new(lookup),
        disable_cache: config.disable_cache,
    };

    let throttle = ThrottleLayer::new(config.rate_limit_rps, config.rate_limit_burst);
    let app = router(state)
        .layer(throttle)
        .layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("invalid listen address");
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

async fn load_lexicon(path: PathBuf, mode: LoadMode, label: &'static str) -> Option<Arc<Lexicon>> {
    let path_display = path.display().to_string();
    match tokio::task::spawn_blocking(move || Lexicon::load(&path, mode)).await {
        Ok(Ok(lexicon)) => {
            info!(
                "{label}: {} entries under {} surface forms ({path_display})",
                lexicon.entry_count(),
                lexicon.surface_count()
            );
            Some(Arc::new(lexicon))
        }
        Ok(Err(err)) => {
            warn!("failed to load {label} lexicon: {err:#}");
            None
        }
        Err(err) => {
            warn!("{label} loader task failed: {err}");
            None
        }
    }
}

async fn load_rules(path: PathBuf) -> Option<Arc<RuleTable>> {
    let path_display = path.display().to_string();
    match tokio::task::spawn_blocking(move || RuleTable::load(&path)).await {
        Ok(Ok(rules)) => {
            info!(
                "rules: {} rules, {} reasons ({path_display})",
                rules.rule_count(),
                rules.reason_count()
            );
            Some(Arc::new(rules))
        }
        Ok(Err(err)) => {
            warn!("failed to load deinflection rules: {err:#}");
            None
        }
        Err(err) => {
            warn!("rule loader task failed: {err}");
            None
        }
    }
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    dict_dir: PathBuf,
    load_mode: LoadMode,
    disable_cache: bool,
    rate_limit_rps: u32,
    rate_limit_burst: u32,
}

fn load_config() -> Config {
    let mut disable_cache = false;
    let mut cli_dict_dir: Option<PathBuf> = None;
    let mut cli_load_mode: Option<LoadMode> = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--no-cache" => disable_cache = true,
            "--dict-dir" => {
                if let Some(path) = args.next() {
                    cli_dict_dir = Some(PathBuf::from(path));
                }
            }
            _ => {
                if let Some(path) = arg.strip_prefix("--dict-dir=") {
                    cli_dict_dir = Some(PathBuf::from(path));
                } else if let Some(mode) = arg.strip_prefix("--load-mode=") {
                    cli_load_mode = parse_load_mode(mode);
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let dict_dir = cli_dict_dir
        .or_else(|| env::var("DICT_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DICT_DIR));
    let load_mode = cli_load_mode
        .or_else(|| env::var("LOAD_MODE").ok().as_deref().and_then(parse_load_mode))
        .unwrap_or(LoadMode::Mmap);
    let rate_limit_rps = env::var("RATE_LIMIT_RPS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_RPS);
    let rate_limit_burst = env::var("RATE_LIMIT_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_RATE_LIMIT_BURST);

    Config {
        host,
        port,
        dict_dir,
        load_mode,
        disable_cache,
        rate_limit_rps,
        rate_limit_burst,
    }
}

fn parse_load_mode(raw: &str) -> Option<LoadMode> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Some(LoadMode::Mmap),
        "owned" => Some(LoadMode::Owned),
        _ => None,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
