use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::instrument::InstrumentRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Bonds,
    Technology,
    InternationalDeveloped,
    EmergingMarkets,
    SmallCap,
    Growth,
    Dividend,
    LargeCap,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Bonds,
        Category::Technology,
        Category::InternationalDeveloped,
        Category::EmergingMarkets,
        Category::SmallCap,
        Category::Growth,
        Category::Dividend,
        Category::LargeCap,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bonds => "BONDS",
            Category::Technology => "TECHNOLOGY",
            Category::InternationalDeveloped => "INTERNATIONAL_DEVELOPED",
            Category::EmergingMarkets => "EMERGING_MARKETS",
            Category::SmallCap => "SMALL_CAP",
            Category::Growth => "GROWTH",
            Category::Dividend => "DIVIDEND",
            Category::LargeCap => "LARGE_CAP",
            Category::Other => "OTHER",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', ' '], "_").to_uppercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// Ordered classification table: (category, symbol tokens, name tokens).
/// Evaluated top to bottom, first match wins, so a large-cap tech fund lands
/// in TECHNOLOGY and an S&P 500 dividend fund lands in DIVIDEND.
///
/// Symbol tokens are substring matches, so no token may be contained in a
/// ticker listed under a later row (IEF would capture IEFA).
const CATEGORY_TOKENS: &[(Category, &[&str], &[&str])] = &[
    (
        Category::Bonds,
        &["AGG", "BND", "TLT", "SHY", "LQD", "HYG", "VCIT", "VCSH", "MUB", "TIP", "GOVT", "SCHZ"],
        &["bond", "treasury", "fixed income", "renda fixa", "aggregate"],
    ),
    (
        Category::Technology,
        &["QQQ", "XLK", "VGT", "SMH", "SOXX", "IYW", "FTEC", "ARKK"],
        &["technology", "tecnologia", "semiconductor", "nasdaq", "tech"],
    ),
    (
        Category::InternationalDeveloped,
        &["EFA", "VEA", "IEFA", "SCHF", "VXUS", "IXUS", "VEU"],
        &["developed", "international", "eafe", "ex-us", "internacional"],
    ),
    (
        Category::EmergingMarkets,
        &["EEM", "VWO", "IEMG", "SCHE", "EWZ", "FXI"],
        &["emerging", "emergentes"],
    ),
    (
        Category::SmallCap,
        &["IWM", "IJR", "SCHA", "VBR", "IWN", "VB"],
        &["small cap", "small-cap", "russell 2000"],
    ),
    (
        Category::Growth,
        &["VUG", "IWF", "SCHG", "VOOG", "MGK", "SPYG"],
        &["growth", "crescimento"],
    ),
    (
        Category::Dividend,
        &["SCHD", "VIG", "VYM", "DVY", "SDY", "HDV", "NOBL", "DGRO", "SPYD"],
        &["dividend", "dividendo"],
    ),
    (
        Category::LargeCap,
        &["SPY", "VOO", "IVV", "VTI", "DIA", "SCHX", "ITOT"],
        &["s&p 500", "large cap", "large-cap", "total market", "total stock market"],
    ),
];

/// Classify an instrument into the closed taxonomy, falling back to `Other`.
pub fn classify(record: &InstrumentRecord) -> Category {
    classify_parts(&record.symbol, record.name())
}

pub fn classify_parts(symbol: &str, name: &str) -> Category {
    let symbol_up = symbol.to_uppercase();
    let name_low = name.to_lowercase();

    CATEGORY_TOKENS
        .iter()
        .find(|(_, symbol_tokens, name_tokens)| {
            symbol_tokens.iter().any(|t| symbol_up.contains(t))
                || (!name_low.is_empty() && name_tokens.iter().any(|t| name_low.contains(t)))
        })
        .map(|(category, _, _)| *category)
        .unwrap_or(Category::Other)
}
