//! Hand-off to an external narrative writer.
//!
//! This crate never calls a language model. When enabled, it prepares the
//! analyst prompt so whatever sits downstream can send it on; when disabled the
//! report is complete on its own.

use std::str::FromStr;

use serde::Serialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::metrics::MetricsResult;
use crate::payload::{to_payload, to_pretty_json};
use crate::spotlight::Spotlights;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeMode {
    #[default]
    Disabled,
    /// Attach a ready-to-send prompt to every analysis.
    PromptOnly,
}

impl FromStr for NarrativeMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "disabled" | "off" | "none" => Ok(NarrativeMode::Disabled),
            "prompt" | "prompt_only" => Ok(NarrativeMode::PromptOnly),
            other => Err(AppError::Config(format!(
                "NARRATIVE_MODE must be 'disabled' or 'prompt', got {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for NarrativeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NarrativeMode::Disabled => write!(f, "disabled"),
            NarrativeMode::PromptOnly => write!(f, "prompt"),
        }
    }
}

const ANALYST_INSTRUCTION: &str = "You are an AML analyst. Using the JSON below, write \
a 4-bullet executive summary (<=120 words) highlighting anomalies.";

/// Analyst prompt over the headline figures (totals and domestic split) plus spotlights.
pub fn build_prompt(metrics: &MetricsResult, spotlights: &Spotlights) -> Result<String> {
    let body = json!({
        "metrics": {
            "totals": to_payload(&metrics.totals)?,
            "domestic_split": to_payload(&metrics.domestic_split)?,
        },
        "spotlights": to_payload(spotlights)?,
    });
    Ok(format!("{ANALYST_INSTRUCTION}\nJSON:\n{}", to_pretty_json(&body)?))
}
