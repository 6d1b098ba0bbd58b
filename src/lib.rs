//! ETF scoring and risk-profile portfolio allocation.
//!
//! The [`scorer`] turns catalog records into scored, categorized candidates.
//! The [`allocator`] runs a fixed plan of category queries per
//! [`profile::RiskProfile`] and returns normalized weights.

pub mod allocator;
pub mod catalog;
pub mod category;
pub mod config;
pub mod criteria;
pub mod error;
pub mod instrument;
pub mod profile;
pub mod scorer;

pub use allocator::{Allocator, PortfolioAllocation, PortfolioSummary};
pub use catalog::{Catalog, HttpCatalog, SnapshotCatalog};
pub use category::Category;
pub use config::EngineConfig;
pub use criteria::SelectionCriteria;
pub use error::{Error, Result};
pub use instrument::InstrumentRecord;
pub use profile::RiskProfile;
pub use scorer::ScoredInstrument;
