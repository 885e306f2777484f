use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use aml_quicklook::api::{router, ApiState};
use aml_quicklook::config::{spotlight_thresholds, Config, HISTORY_LOOKBACK_DAYS};
use aml_quicklook::error::Result;
use aml_quicklook::narrative::NarrativeMode;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    info!(
        "Engine ready: home={} lookback={}d burst>{:.1}x imbalance>{:.1}x partitions={}",
        cfg.home_country,
        HISTORY_LOOKBACK_DAYS,
        spotlight_thresholds::BURST_RATIO,
        spotlight_thresholds::IMBALANCE_RATIO,
        cfg.metric_partitions,
    );
    match cfg.narrative_mode {
        NarrativeMode::Disabled => {
            info!("Narrative prompts disabled. Set NARRATIVE_MODE=prompt to attach analyst prompts.")
        }
        NarrativeMode::PromptOnly => {
            warn!("NARRATIVE_MODE=prompt: responses embed report JSON in a prompt for a downstream writer.")
        }
    }

    let api_state = ApiState::new(cfg.analysis_settings(), cfg.narrative_mode);
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
