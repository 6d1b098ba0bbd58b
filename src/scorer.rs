//! Multi-criteria desirability score for a single instrument.
//!
//! Each term is gated on its metric being positive, so zero, absent or
//! negative inputs simply score lower instead of failing.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::category::{classify, Category};
use crate::instrument::InstrumentRecord;

const SHARPE_MULTIPLIER: f64 = 10.0;
const SHARPE_CAP: f64 = 30.0;
const RETURN_CAP: f64 = 25.0;
const VOLATILITY_PENALTY_CAP: f64 = 20.0;
const AUM_MULTIPLIER: f64 = 3.0;
const AUM_CAP: f64 = 15.0;
const DIVIDEND_MULTIPLIER: f64 = 2.0;
const DIVIDEND_CAP: f64 = 10.0;
const EXPENSE_MULTIPLIER: f64 = 10.0;

const HIGH_SHARPE: f64 = 1.0;
const GOOD_RETURN: f64 = 10.0;
const LOW_VOLATILITY: f64 = 15.0;
const LARGE_AUM: f64 = 1_000_000_000.0;
const GOOD_DIVIDEND: f64 = 3.0;
const LOW_COST: f64 = 0.2;

pub const DEFAULT_RATIONALE: &str = "ETF selecionado";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredInstrument {
    #[serde(flatten)]
    pub record: InstrumentRecord,
    pub category: Category,
    pub score: f64,
    pub rationale: String,
}

impl ScoredInstrument {
    pub fn symbol(&self) -> &str {
        &self.record.symbol
    }
}

/// Score one record. The result is never negative.
pub fn score(record: &InstrumentRecord) -> ScoredInstrument {
    let mut total = 0.0;
    let mut tags: Vec<&str> = Vec::new();

    if let Some(sharpe) = record.sharpe().filter(|s| *s > 0.0) {
        total += (sharpe * SHARPE_MULTIPLIER).min(SHARPE_CAP);
        if sharpe > HIGH_SHARPE {
            tags.push("Alto Sharpe");
        }
    }

    if let Some(ret) = record.trailing_return_12m.filter(|r| *r > 0.0) {
        total += ret.min(RETURN_CAP);
        if ret > GOOD_RETURN {
            tags.push("Bom retorno");
        }
    }

    // Penalty always applies; the tag only describes low-volatility funds.
    if let Some(vol) = record.volatility_12m.filter(|v| *v > 0.0) {
        total -= vol.min(VOLATILITY_PENALTY_CAP);
        if vol < LOW_VOLATILITY {
            tags.push("Baixa volatilidade");
        }
    }

    let aum = record.aum();
    if aum > 0.0 {
        total += ((aum / 1_000_000.0).log10() * AUM_MULTIPLIER).min(AUM_CAP);
        if aum > LARGE_AUM {
            tags.push("Grande AUM");
        }
    }

    let dividend = record.dividend_yield();
    if dividend > 0.0 {
        total += (dividend * DIVIDEND_MULTIPLIER).min(DIVIDEND_CAP);
        if dividend > GOOD_DIVIDEND {
            tags.push("Bons dividendos");
        }
    }

    let expense = record.expense_ratio();
    if expense > 0.0 {
        total -= expense * EXPENSE_MULTIPLIER;
        if expense < LOW_COST {
            tags.push("Baixo custo");
        }
    }

    let score = if total.is_finite() { total.max(0.0) } else { 0.0 };

    ScoredInstrument {
        record: record.clone(),
        category: classify(record),
        score,
        rationale: render_rationale(&tags),
    }
}

fn render_rationale(tags: &[&str]) -> String {
    if tags.is_empty() {
        return DEFAULT_RATIONALE.to_string();
    }
    tags.iter()
        .map(|t| format!("{};", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Score every record, drop non-positive scores and sort best first.
///
/// Equal scores are ordered by larger AUM, then by input order.
pub fn rank(records: &[InstrumentRecord]) -> Vec<ScoredInstrument> {
    let mut scored: Vec<ScoredInstrument> = records
        .iter()
        .map(score)
        .filter(|s| s.score > 0.0)
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.record
                    .aum()
                    .partial_cmp(&a.record.aum())
                    .unwrap_or(Ordering::Equal)
            })
    });
    scored
}
