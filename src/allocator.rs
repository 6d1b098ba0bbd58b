use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::criteria::SelectionCriteria;
use crate::profile::{PlanStep, RiskProfile};
use crate::scorer::{self, ScoredInstrument};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// One line of a constructed portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioAllocation {
    pub instrument: ScoredInstrument,
    pub allocation: f64,
    pub rationale: String,
}

/// Allocation-weighted averages over a portfolio. Lines missing return or
/// volatility are left out of that metric's average; absent yield and fee
/// count as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub lines: usize,
    pub total_allocation: f64,
    pub expected_return: Option<f64>,
    pub volatility: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub expense_ratio: Option<f64>,
}

/// Builds risk-profile portfolios from a catalog.
///
/// Every step runs one bounded query, ranks the results and keeps a single
/// pick. Steps that prefer a category fall back to the top-ranked result when
/// no candidate of that category survives the query, so a sleeve can end up
/// holding a fund of another category. Steps with no candidates are dropped
/// and the remaining weights are rescaled to 100.
pub struct Allocator {
    catalog: Arc<dyn Catalog>,
    query_timeout: Duration,
}

impl Allocator {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Allocator {
            catalog,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Scored candidates for `criteria`, best first. Catalog failures and
    /// timeouts are logged and produce an empty list.
    pub async fn rank(&self, criteria: &SelectionCriteria) -> Vec<ScoredInstrument> {
        match tokio::time::timeout(self.query_timeout, self.catalog.query(criteria)).await {
            Ok(Ok(records)) => {
                let ranked = scorer::rank(&records);
                debug!(fetched = records.len(), ranked = ranked.len(), "Ranked candidates");
                ranked
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Catalog query failed, treating as no candidates");
                Vec::new()
            }
            Err(_) => {
                warn!(timeout_ms = self.query_timeout.as_millis() as u64, "Catalog query timed out, treating as no candidates");
                Vec::new()
            }
        }
    }

    /// Portfolio for a named profile. Unrecognized names yield an empty list.
    pub async fn allocate(&self, profile: &str) -> Vec<PortfolioAllocation> {
        match RiskProfile::parse(profile) {
            Some(p) => self.allocate_profile(p).await,
            None => {
                info!(profile, "Unrecognized risk profile");
                Vec::new()
            }
        }
    }

    pub async fn allocate_profile(&self, profile: RiskProfile) -> Vec<PortfolioAllocation> {
        let mut allocations = Vec::new();

        for step in profile.plan() {
            let ranked = self.rank(&step.criteria).await;
            match pick(&step, &ranked) {
                Some(chosen) => {
                    debug!(%profile, step = step.label, symbol = chosen.symbol(), score = chosen.score, "Selected instrument");
                    allocations.push(PortfolioAllocation {
                        instrument: chosen.clone(),
                        allocation: step.weight,
                        rationale: step.rationale.to_string(),
                    });
                }
                None => {
                    info!(%profile, step = step.label, weight = step.weight, "No candidates, omitting sleeve");
                }
            }
        }

        let allocations = normalize(allocations);
        info!(%profile, lines = allocations.len(), "Built allocation");
        allocations
    }

    pub fn summarize(allocations: &[PortfolioAllocation]) -> PortfolioSummary {
        PortfolioSummary {
            lines: allocations.len(),
            total_allocation: allocations.iter().map(|a| a.allocation).sum(),
            expected_return: weighted_average(allocations, |a| a.instrument.record.trailing_return_12m),
            volatility: weighted_average(allocations, |a| a.instrument.record.volatility_12m),
            dividend_yield: weighted_average(allocations, |a| Some(a.instrument.record.dividend_yield())),
            expense_ratio: weighted_average(allocations, |a| Some(a.instrument.record.expense_ratio())),
        }
    }
}

fn pick<'a>(step: &PlanStep, ranked: &'a [ScoredInstrument]) -> Option<&'a ScoredInstrument> {
    step.prefer
        .and_then(|category| ranked.iter().find(|s| s.category == category))
        .or_else(|| ranked.first())
}

/// Rescale weights to sum to 100, rounded to two decimals. A zero total is
/// returned unchanged.
pub fn normalize(mut allocations: Vec<PortfolioAllocation>) -> Vec<PortfolioAllocation> {
    let total: f64 = allocations.iter().map(|a| a.allocation).sum();
    if total == 0.0 {
        return allocations;
    }
    for a in allocations.iter_mut() {
        a.allocation = round2(a.allocation / total * 100.0);
    }
    allocations
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn weighted_average<F>(allocations: &[PortfolioAllocation], metric: F) -> Option<f64>
where
    F: Fn(&PortfolioAllocation) -> Option<f64>,
{
    let (sum, weight) = allocations
        .iter()
        .filter_map(|a| metric(a).map(|m| (m * a.allocation, a.allocation)))
        .fold((0.0, 0.0), |(s, w), (ms, aw)| (s + ms, w + aw));
    if weight > 0.0 {
        Some(sum / weight)
    } else {
        None
    }
}
