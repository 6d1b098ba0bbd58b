//! Selection bounds applied at the catalog boundary before scoring.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::category::{classify, Category};
use crate::instrument::InstrumentRecord;

/// Safety bound on how many records a single query may return.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Inclusive bounds and set filters. Every field is optional and an absent
/// bound imposes no constraint.
///
/// Return, volatility and Sharpe bounds fail for records where the value is
/// absent. Yield, fee and AUM bounds read absent values as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    #[serde(default)]
    pub min_return: Option<f64>,
    #[serde(default)]
    pub max_volatility: Option<f64>,
    #[serde(default)]
    pub min_sharpe: Option<f64>,
    #[serde(default)]
    pub min_aum: Option<f64>,
    #[serde(default)]
    pub min_dividend_yield: Option<f64>,
    #[serde(default)]
    pub max_expense_ratio: Option<f64>,
    #[serde(default)]
    pub categories: BTreeSet<Category>,
    #[serde(default)]
    pub exclude_symbols: BTreeSet<String>,
}

impl SelectionCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_return(mut self, pct: f64) -> Self {
        self.min_return = Some(pct);
        self
    }

    pub fn max_volatility(mut self, pct: f64) -> Self {
        self.max_volatility = Some(pct);
        self
    }

    pub fn min_sharpe(mut self, ratio: f64) -> Self {
        self.min_sharpe = Some(ratio);
        self
    }

    pub fn min_aum(mut self, amount: f64) -> Self {
        self.min_aum = Some(amount);
        self
    }

    pub fn min_dividend_yield(mut self, pct: f64) -> Self {
        self.min_dividend_yield = Some(pct);
        self
    }

    pub fn max_expense_ratio(mut self, pct: f64) -> Self {
        self.max_expense_ratio = Some(pct);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.categories.insert(category);
        self
    }

    pub fn exclude(mut self, symbol: &str) -> Self {
        self.exclude_symbols.insert(symbol.trim().to_uppercase());
        self
    }

    /// True when `record` satisfies every bound and filter.
    pub fn matches(&self, record: &InstrumentRecord) -> bool {
        if self
            .exclude_symbols
            .iter()
            .any(|s| s.eq_ignore_ascii_case(&record.symbol))
        {
            return false;
        }

        if !at_least(record.trailing_return_12m, self.min_return)
            || !at_most(record.volatility_12m, self.max_volatility)
            || !at_least(record.sharpe(), self.min_sharpe)
        {
            return false;
        }

        if let Some(min) = self.min_aum {
            if record.aum() < min {
                return false;
            }
        }
        if let Some(min) = self.min_dividend_yield {
            if record.dividend_yield() < min {
                return false;
            }
        }
        if let Some(max) = self.max_expense_ratio {
            if record.expense_ratio() > max {
                return false;
            }
        }

        self.categories.is_empty() || self.categories.contains(&classify(record))
    }

    /// Filter `records` in catalog order, keeping at most `cap` matches.
    pub fn apply<'a, I>(&self, records: I, cap: usize) -> Vec<InstrumentRecord>
    where
        I: IntoIterator<Item = &'a InstrumentRecord>,
    {
        records
            .into_iter()
            .filter(|r| self.matches(r))
            .take(cap)
            .cloned()
            .collect()
    }
}

fn at_least(value: Option<f64>, bound: Option<f64>) -> bool {
    match bound {
        None => true,
        Some(min) => value.is_some_and(|v| v >= min),
    }
}

fn at_most(value: Option<f64>, bound: Option<f64>) -> bool {
    match bound {
        None => true,
        Some(max) => value.is_some_and(|v| v <= max),
    }
}
