use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::Category;
use crate::criteria::SelectionCriteria;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskProfile {
    Conservador, // Bonds-heavy, large caps and dividends
    Moderado,    // Core equity with bonds and international sleeves
    Arrojado,    // Growth, tech, emerging and small caps
}

impl RiskProfile {
    /// Parse a profile name. Accepts the canonical names and their English
    /// counterparts, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "conservador" | "conservative" => Some(RiskProfile::Conservador),
            "moderado" | "moderate" => Some(RiskProfile::Moderado),
            "arrojado" | "aggressive" => Some(RiskProfile::Arrojado),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Conservador => "CONSERVADOR",
            RiskProfile::Moderado => "MODERADO",
            RiskProfile::Arrojado => "ARROJADO",
        }
    }

    /// The ordered allocation plan for this profile.
    pub fn plan(&self) -> Vec<PlanStep> {
        match self {
            RiskProfile::Conservador => conservador_plan(),
            RiskProfile::Moderado => moderado_plan(),
            RiskProfile::Arrojado => arrojado_plan(),
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One category sleeve of a profile: which query to run, what weight the
/// pick receives and which category to prefer among the ranked results.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    pub label: &'static str,
    pub criteria: SelectionCriteria,
    pub weight: f64,
    pub prefer: Option<Category>,
    pub rationale: &'static str,
}

impl PlanStep {
    fn new(label: &'static str, criteria: SelectionCriteria, weight: f64) -> Self {
        PlanStep {
            label,
            criteria,
            weight,
            prefer: None,
            rationale: "",
        }
    }

    fn prefer(mut self, category: Category) -> Self {
        self.prefer = Some(category);
        self
    }

    fn because(mut self, rationale: &'static str) -> Self {
        self.rationale = rationale;
        self
    }
}

fn conservador_plan() -> Vec<PlanStep> {
    vec![
        PlanStep::new(
            "bonds",
            SelectionCriteria::new()
                .max_volatility(8.0)
                .min_aum(1e9)
                .category(Category::Bonds),
            50.0,
        )
        .because("Base de renda fixa para estabilidade"),
        PlanStep::new(
            "large_cap",
            SelectionCriteria::new()
                .max_volatility(25.0)
                .min_aum(1e10)
                .min_return(5.0)
                .category(Category::LargeCap),
            30.0,
        )
        .because("Exposição a grandes empresas com liquidez"),
        PlanStep::new(
            "dividends",
            SelectionCriteria::new()
                .min_dividend_yield(2.0)
                .max_volatility(20.0)
                .min_aum(1e9),
            20.0,
        )
        .prefer(Category::Dividend)
        .because("Renda recorrente via dividendos"),
    ]
}

fn moderado_plan() -> Vec<PlanStep> {
    vec![
        PlanStep::new(
            "core_equity",
            SelectionCriteria::new()
                .max_volatility(22.0)
                .min_aum(1e10)
                .min_return(8.0),
            40.0,
        )
        .because("Núcleo de ações com bom retorno ajustado ao risco"),
        PlanStep::new(
            "bonds",
            SelectionCriteria::new().max_volatility(8.0).min_aum(1e9),
            25.0,
        )
        .because("Renda fixa para amortecer a volatilidade"),
        PlanStep::new(
            "international",
            SelectionCriteria::new().max_volatility(25.0).min_aum(5e9),
            20.0,
        )
        .prefer(Category::InternationalDeveloped)
        .because("Diversificação em mercados desenvolvidos"),
        PlanStep::new(
            "emerging",
            SelectionCriteria::new()
                .min_return(5.0)
                .max_volatility(35.0)
                .min_aum(1e9),
            10.0,
        )
        .prefer(Category::EmergingMarkets)
        .because("Potencial de crescimento em mercados emergentes"),
        PlanStep::new(
            "dividends",
            SelectionCriteria::new()
                .min_dividend_yield(2.0)
                .max_volatility(20.0),
            5.0,
        )
        .because("Complemento de renda via dividendos"),
    ]
}

fn arrojado_plan() -> Vec<PlanStep> {
    vec![
        PlanStep::new(
            "large_cap",
            SelectionCriteria::new()
                .min_return(10.0)
                .max_volatility(25.0)
                .min_aum(1e10),
            35.0,
        )
        .because("Fundação em grandes empresas"),
        PlanStep::new(
            "technology",
            SelectionCriteria::new()
                .min_return(15.0)
                .max_volatility(30.0)
                .min_aum(5e9),
            25.0,
        )
        .prefer(Category::Technology)
        .because("Exposição a tecnologia e crescimento acelerado"),
        PlanStep::new(
            "emerging",
            SelectionCriteria::new()
                .min_return(8.0)
                .max_volatility(40.0)
                .min_aum(1e9),
            15.0,
        )
        .prefer(Category::EmergingMarkets)
        .because("Mercados emergentes para maior potencial de retorno"),
        PlanStep::new(
            "growth",
            SelectionCriteria::new()
                .min_return(12.0)
                .max_volatility(28.0)
                .min_aum(2e9),
            15.0,
        )
        .prefer(Category::Growth)
        .because("Empresas de crescimento"),
        PlanStep::new(
            "small_cap",
            SelectionCriteria::new()
                .min_return(8.0)
                .max_volatility(35.0)
                .min_aum(1e9),
            10.0,
        )
        .prefer(Category::SmallCap)
        .because("Small caps para diversificação e prêmio de tamanho"),
    ]
}
