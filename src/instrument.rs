//! Instrument records and catalog snapshots
//!
//! This module handles:
//! - The read-only `InstrumentRecord` supplied by a catalog
//! - Lenient numeric parsing (numbers, numeric strings, null)
//! - Loading and sanitizing snapshot documents from disk or a string

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use tracing::{info, warn};

use crate::error::{Error, Result};

static TICKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9.\-]{0,14}$").expect("ticker pattern is valid"));

/// One tradable fund as known to the catalog.
///
/// Numeric fields stay `Option` so "absent" and "zero" remain distinct. The
/// accessors give the view the scoring formulas use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    #[serde(default, deserialize_with = "deserialize_symbol")]
    pub symbol: String,
    #[serde(default, alias = "name")]
    pub display_name: Option<String>,
    #[serde(default, alias = "return_12m", deserialize_with = "deserialize_lenient_f64")]
    pub trailing_return_12m: Option<f64>,
    #[serde(default, alias = "volatility", deserialize_with = "deserialize_lenient_f64")]
    pub volatility_12m: Option<f64>,
    #[serde(default, alias = "sharpe", deserialize_with = "deserialize_lenient_f64")]
    pub sharpe_ratio: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub dividend_yield: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub expense_ratio: Option<f64>,
    #[serde(default, alias = "aum", deserialize_with = "deserialize_lenient_f64")]
    pub assets_under_management: Option<f64>,
}

// Accepts a number, a numeric string ("3.5" or "3.5%") or null. Anything
// else, including non-finite values, is treated as absent.
fn deserialize_lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|x| x.is_finite()))
}

// Null or non-string symbols become empty and are dropped by `into_records`.
fn deserialize_symbol<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s.trim().to_uppercase()),
        _ => Ok(String::new()),
    }
}

impl InstrumentRecord {
    pub fn new(symbol: &str) -> Self {
        InstrumentRecord {
            symbol: symbol.trim().to_uppercase(),
            display_name: None,
            trailing_return_12m: None,
            volatility_12m: None,
            sharpe_ratio: None,
            dividend_yield: None,
            expense_ratio: None,
            assets_under_management: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    pub fn with_return(mut self, pct: f64) -> Self {
        self.trailing_return_12m = Some(pct);
        self
    }

    pub fn with_volatility(mut self, pct: f64) -> Self {
        self.volatility_12m = Some(pct);
        self
    }

    pub fn with_sharpe(mut self, ratio: f64) -> Self {
        self.sharpe_ratio = Some(ratio);
        self
    }

    pub fn with_yield(mut self, pct: f64) -> Self {
        self.dividend_yield = Some(pct);
        self
    }

    pub fn with_expense_ratio(mut self, pct: f64) -> Self {
        self.expense_ratio = Some(pct);
        self
    }

    pub fn with_aum(mut self, amount: f64) -> Self {
        self.assets_under_management = Some(amount);
        self
    }

    /// Sharpe ratio as reported, or `return / volatility` when the catalog
    /// omits it. `None` when volatility is absent or not positive, even if
    /// the catalog reports a ratio.
    pub fn sharpe(&self) -> Option<f64> {
        let vol = self.volatility_12m.filter(|v| *v > 0.0)?;
        self.sharpe_ratio
            .or_else(|| self.trailing_return_12m.map(|ret| ret / vol))
    }

    /// Dividend yield in percent, 0 when absent.
    pub fn dividend_yield(&self) -> f64 {
        self.dividend_yield.unwrap_or(0.0)
    }

    /// Expense ratio in percent, 0 when absent.
    pub fn expense_ratio(&self) -> f64 {
        self.expense_ratio.unwrap_or(0.0)
    }

    /// Assets under management, 0 when absent.
    pub fn aum(&self) -> f64 {
        self.assets_under_management.unwrap_or(0.0)
    }

    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("")
    }

    pub fn has_valid_symbol(&self) -> bool {
        TICKER_RE.is_match(&self.symbol)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<String>,
}

/// A point-in-time catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub metadata: Option<SnapshotMetadata>,
    pub instruments: Vec<InstrumentRecord>,
}

impl CatalogSnapshot {
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Consume the snapshot, dropping records whose symbol is blank or not a ticker.
    pub fn into_records(self) -> Vec<InstrumentRecord> {
        if let Some(meta) = &self.metadata {
            let age = Utc::now().signed_duration_since(meta.generated_at);
            info!(
                generated_at = %meta.generated_at,
                age_hours = age.num_hours(),
                source = meta.source.as_deref().unwrap_or("unknown"),
                instruments = self.instruments.len(),
                "Loaded catalog snapshot"
            );
        }

        self.instruments
            .into_iter()
            .filter(|r| {
                if r.has_valid_symbol() {
                    true
                } else {
                    warn!(symbol = %r.symbol, "Dropping record with invalid symbol");
                    false
                }
            })
            .collect()
    }
}
