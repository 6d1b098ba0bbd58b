use std::sync::Arc;

use etf_allocator::{Allocator, Category, InstrumentRecord, SelectionCriteria, SnapshotCatalog};

fn catalog() -> Vec<InstrumentRecord> {
    vec![
        InstrumentRecord::new("AGG")
            .with_name("iShares Core U.S. Aggregate Bond")
            .with_return(3.0)
            .with_volatility(4.0)
            .with_yield(3.2)
            .with_expense_ratio(0.03)
            .with_aum(1.1e11),
        InstrumentRecord::new("BND")
            .with_return(2.8)
            .with_volatility(4.5)
            .with_aum(9e10),
        InstrumentRecord::new("SPY")
            .with_return(14.0)
            .with_volatility(17.0)
            .with_yield(1.3)
            .with_expense_ratio(0.09)
            .with_aum(5e11),
        InstrumentRecord::new("QQQ")
            .with_return(22.0)
            .with_volatility(22.0)
            .with_yield(0.6)
            .with_expense_ratio(0.2)
            .with_aum(2.5e11),
        InstrumentRecord::new("VEA")
            .with_return(9.0)
            .with_volatility(15.0)
            .with_yield(3.1)
            .with_expense_ratio(0.05)
            .with_aum(1.3e11),
        InstrumentRecord::new("VWO")
            .with_return(10.0)
            .with_volatility(19.0)
            .with_yield(3.0)
            .with_expense_ratio(0.08)
            .with_aum(8e10),
        InstrumentRecord::new("VUG")
            .with_return(18.0)
            .with_volatility(21.0)
            .with_yield(0.5)
            .with_expense_ratio(0.04)
            .with_aum(1.2e11),
        InstrumentRecord::new("IWM")
            .with_return(11.0)
            .with_volatility(24.0)
            .with_yield(1.2)
            .with_expense_ratio(0.19)
            .with_aum(6e10),
        InstrumentRecord::new("SCHD")
            .with_return(9.0)
            .with_volatility(14.0)
            .with_yield(3.5)
            .with_expense_ratio(0.06)
            .with_aum(5e10),
    ]
}

fn allocator(records: Vec<InstrumentRecord>) -> Allocator {
    Allocator::new(Arc::new(SnapshotCatalog::new(records)))
}

fn total(allocations: &[etf_allocator::PortfolioAllocation]) -> f64 {
    allocations.iter().map(|a| a.allocation).sum()
}

#[tokio::test]
async fn conservador_three_fund_example() {
    let records = vec![
        InstrumentRecord::new("AGG")
            .with_return(3.0)
            .with_volatility(4.0)
            .with_aum(2e10),
        InstrumentRecord::new("SPY")
            .with_return(12.0)
            .with_volatility(18.0)
            .with_aum(4e11),
        InstrumentRecord::new("SCHD")
            .with_return(9.0)
            .with_volatility(14.0)
            .with_yield(3.5)
            .with_aum(5e10),
    ];

    let out = allocator(records).allocate("CONSERVADOR").await;
    let lines: Vec<(&str, f64)> = out
        .iter()
        .map(|a| (a.instrument.symbol(), a.allocation))
        .collect();
    assert_eq!(lines, vec![("AGG", 50.0), ("SPY", 30.0), ("SCHD", 20.0)]);
    assert_eq!(out[0].instrument.category, Category::Bonds);
    assert_eq!(out[2].instrument.category, Category::Dividend);
    assert_eq!(out[0].rationale, "Base de renda fixa para estabilidade");
}

#[tokio::test]
async fn every_profile_sums_to_one_hundred() {
    let alloc = allocator(catalog());
    for profile in ["CONSERVADOR", "MODERADO", "ARROJADO"] {
        let out = alloc.allocate(profile).await;
        assert!(!out.is_empty(), "{} produced no lines", profile);
        assert!((total(&out) - 100.0).abs() <= 0.01 + 1e-9, "{} sums to {}", profile, total(&out));
        assert!(out.iter().all(|a| a.allocation >= 0.0));
        assert!(out.iter().all(|a| a.instrument.score > 0.0));
    }
}

#[tokio::test]
async fn moderado_prefers_sleeve_categories() {
    let out = allocator(catalog()).allocate("MODERADO").await;
    let picks: Vec<(&str, Category, f64)> = out
        .iter()
        .map(|a| (a.instrument.symbol(), a.instrument.category, a.allocation))
        .collect();

    assert_eq!(picks.len(), 5);
    assert_eq!(picks[2].1, Category::InternationalDeveloped);
    assert_eq!(picks[2].2, 20.0);
    assert_eq!(picks[3].1, Category::EmergingMarkets);
    assert_eq!(picks[3].2, 10.0);
}

#[tokio::test]
async fn arrojado_prefers_sleeve_categories() {
    let out = allocator(catalog()).allocate("arrojado").await;
    let categories: Vec<Category> = out.iter().map(|a| a.instrument.category).collect();

    assert_eq!(out.len(), 5);
    assert_eq!(categories[1], Category::Technology);
    assert_eq!(categories[2], Category::EmergingMarkets);
    assert_eq!(categories[3], Category::Growth);
    assert_eq!(categories[4], Category::SmallCap);
}

#[tokio::test]
async fn partial_catalog_degrades_gracefully() {
    // Only a small bond fund: the moderado bond sleeve fills, everything else is empty.
    let out = allocator(vec![InstrumentRecord::new("AGG")
        .with_return(3.0)
        .with_volatility(4.0)
        .with_aum(2e9)])
    .allocate("MODERADO")
    .await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].instrument.symbol(), "AGG");
    assert_eq!(out[0].allocation, 100.0);
}

#[tokio::test]
async fn same_fund_can_fill_two_sleeves() {
    // With AUM above 5e9 the bond fund also wins the international fallback.
    let out = allocator(vec![InstrumentRecord::new("AGG")
        .with_return(3.0)
        .with_volatility(4.0)
        .with_aum(2e10)])
    .allocate("MODERADO")
    .await;

    let lines: Vec<(&str, f64)> = out
        .iter()
        .map(|a| (a.instrument.symbol(), a.allocation))
        .collect();
    assert_eq!(lines, vec![("AGG", 55.56), ("AGG", 44.44)]);
}

#[tokio::test]
async fn unknown_profile_and_empty_catalog() {
    assert!(allocator(catalog()).allocate("AUDACIOSO").await.is_empty());
    assert!(allocator(Vec::new()).allocate("CONSERVADOR").await.is_empty());
}

#[tokio::test]
async fn rank_honours_criteria() {
    let alloc = allocator(catalog());
    let ranked = alloc
        .rank(
            &SelectionCriteria::new()
                .min_aum(1e11)
                .exclude("SPY")
                .max_expense_ratio(0.1),
        )
        .await;

    let symbols: Vec<&str> = ranked.iter().map(|s| s.symbol()).collect();
    assert!(!symbols.contains(&"SPY"));
    assert!(!symbols.contains(&"QQQ"));
    assert!(symbols.contains(&"AGG"));
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn summary_reflects_normalized_weights() {
    let out = allocator(catalog()).allocate("CONSERVADOR").await;
    let summary = Allocator::summarize(&out);
    assert_eq!(summary.lines, out.len());
    assert!((summary.total_allocation - 100.0).abs() <= 0.01 + 1e-9);
    assert!(summary.expected_return.is_some());
    assert!(summary.volatility.is_some());
}
