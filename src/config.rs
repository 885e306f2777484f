use crate::error::{AppError, Result};
use crate::narrative::NarrativeMode;

/// Counterparty jurisdiction treated as domestic when none is configured.
pub const DEFAULT_HOME_COUNTRY: &str = "ZA";

/// Trailing history used as the spotlight baseline, ending at the window's latest timestamp.
pub const HISTORY_LOOKBACK_DAYS: i64 = 90;

pub const HOURS_PER_DAY: usize = 24;

/// Spotlight ratio thresholds. A spotlight fires when its score is strictly above these.
pub mod spotlight_thresholds {
    /// Busiest window hour vs. median historical hour.
    pub const BURST_RATIO: f64 = 3.0;
    /// Withdrawals vs. deposits within the window.
    pub const IMBALANCE_RATIO: f64 = 1.2;
}

/// Upper bound on METRIC_PARTITIONS.
pub const MAX_METRIC_PARTITIONS: usize = 64;

/// Largest accepted /analyze body.
pub const MAX_REQUEST_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub api_port: u16,
    /// Country code compared against `counterparty_country_code` (HOME_COUNTRY)
    pub home_country: String,
    /// Whether /analyze responses carry a ready-made narrative prompt (NARRATIVE_MODE)
    pub narrative_mode: NarrativeMode,
    /// Number of chunks metrics are folded over in parallel; 1 = single pass (METRIC_PARTITIONS)
    pub metric_partitions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            home_country: std::env::var("HOME_COUNTRY")
                .map(|s| s.trim().to_uppercase())
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_HOME_COUNTRY.to_string()),
            narrative_mode: std::env::var("NARRATIVE_MODE")
                .unwrap_or_else(|_| "disabled".to_string())
                .parse::<NarrativeMode>()?,
            metric_partitions: std::env::var("METRIC_PARTITIONS")
                .unwrap_or_else(|_| "1".to_string())
                .parse::<usize>()
                .map_err(|_| {
                    AppError::Config("METRIC_PARTITIONS must be a positive integer".to_string())
                })?
                .clamp(1, MAX_METRIC_PARTITIONS),
        })
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            home_country: self.home_country.clone(),
            metric_partitions: self.metric_partitions,
        }
    }
}

/// Engine-facing subset of the configuration, passed explicitly into every analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub home_country: String,
    pub metric_partitions: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            home_country: DEFAULT_HOME_COUNTRY.to_string(),
            metric_partitions: 1,
        }
    }
}
