use chrono::{Datelike, NaiveDate};

use crate::fmt::{month_label, percent};
use crate::metrics::{self, change, monthly_series, previous_month, runway_months, Metrics};
use crate::models::{Transaction, TxnType};
use crate::store::totals;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    CashBalance,
    BurnRate,
    RevenueGrowth,
    Runway,
    Insights,
    Client,
}

impl ReportKind {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::CashBalance => "cash-balance",
            Self::BurnRate => "burn-rate",
            Self::RevenueGrowth => "revenue-growth",
            Self::Runway => "runway",
            Self::Insights => "insights",
            Self::Client => "client",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::CashBalance => "Cash Balance Report",
            Self::BurnRate => "Monthly Burn Rate Analysis",
            Self::RevenueGrowth => "Revenue Growth Report",
            Self::Runway => "Runway Analysis Report",
            Self::Insights => "Financial Insights Report",
            Self::Client => "Client Report",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}-report.pdf", self.slug())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

/// Sum amounts of one transaction type by category, largest first.
fn by_category<'a>(
    txns: impl Iterator<Item = &'a Transaction>,
    kind: TxnType,
) -> Vec<CategoryAmount> {
    let mut lines: Vec<CategoryAmount> = Vec::new();
    for t in txns.filter(|t| t.txn_type == kind) {
        match lines.iter_mut().find(|l| l.category == t.category) {
            Some(line) => line.amount += t.amount,
            None => lines.push(CategoryAmount {
                category: t.category.clone(),
                amount: t.amount,
            }),
        }
    }
    lines.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    lines
}

// ---------------------------------------------------------------------------
// Cash balance ledger
// ---------------------------------------------------------------------------

pub struct LedgerRow {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub balance: f64,
}

pub struct CashBalanceLedger {
    pub rows: Vec<LedgerRow>,
    pub closing_balance: f64,
}

pub fn cash_balance_ledger(txns: &[Transaction]) -> CashBalanceLedger {
    let mut ordered: Vec<&Transaction> = txns.iter().collect();
    ordered.sort_by_key(|t| (t.date, t.id));

    let mut running = 0.0f64;
    let rows = ordered
        .into_iter()
        .map(|t| {
            running += t.signed_amount();
            LedgerRow {
                date: t.date,
                description: t.description.clone(),
                amount: t.signed_amount(),
                balance: running,
            }
        })
        .collect();
    CashBalanceLedger {
        rows,
        closing_balance: running,
    }
}

// ---------------------------------------------------------------------------
// Burn rate
// ---------------------------------------------------------------------------

pub struct BurnMonth {
    pub label: String,
    pub breakdown: Vec<CategoryAmount>,
    pub total: f64,
}

pub struct BurnRateBreakdown {
    pub months: Vec<BurnMonth>,
}

pub fn burn_rate_breakdown(
    txns: &[Transaction],
    months: u32,
    today: NaiveDate,
) -> BurnRateBreakdown {
    let months = monthly_series(txns, months, today)
        .into_iter()
        .map(|flow| BurnMonth {
            label: month_label(flow.year, flow.month),
            breakdown: by_category(
                txns.iter().filter(|t| metrics::in_month(t, flow.year, flow.month)),
                TxnType::Expense,
            ),
            total: flow.expenses,
        })
        .collect();
    BurnRateBreakdown { months }
}

// ---------------------------------------------------------------------------
// Revenue
// ---------------------------------------------------------------------------

pub struct RevenueMonth {
    pub label: String,
    pub growth: f64,
    pub sources: Vec<CategoryAmount>,
    pub total: f64,
}

pub struct RevenueBreakdown {
    pub months: Vec<RevenueMonth>,
}

pub fn revenue_breakdown(txns: &[Transaction], months: u32, today: NaiveDate) -> RevenueBreakdown {
    let months = monthly_series(txns, months, today)
        .into_iter()
        .map(|flow| {
            let first = NaiveDate::from_ymd_opt(flow.year, flow.month, 1).unwrap_or(today);
            let (py, pm) = previous_month(first);
            let prior = metrics::month_flow(txns, py, pm);
            RevenueMonth {
                label: month_label(flow.year, flow.month),
                growth: change(flow.income, prior.income),
                sources: by_category(
                    txns.iter().filter(|t| metrics::in_month(t, flow.year, flow.month)),
                    TxnType::Income,
                ),
                total: flow.income,
            }
        })
        .collect();
    RevenueBreakdown { months }
}

// ---------------------------------------------------------------------------
// Runway
// ---------------------------------------------------------------------------

// (name, burn multiplier)
const SCENARIOS: &[(&str, f64)] = &[
    ("Current pace", 1.0),
    ("Trim 20%", 0.8),
    ("Lean mode 35%", 0.65),
    ("Hiring push +25%", 1.25),
];

pub struct RunwayStatus {
    pub cash_balance: f64,
    pub monthly_burn: f64,
    pub months: f64,
}

pub struct Scenario {
    pub name: String,
    pub burn_rate: f64,
    pub runway: f64,
}

pub struct RunwayScenarios {
    pub current: RunwayStatus,
    pub scenarios: Vec<Scenario>,
}

pub fn runway_scenarios(metrics: &Metrics) -> RunwayScenarios {
    let balance = metrics.cash_balance.current;
    let burn = metrics.burn_rate.current;
    let scenarios = SCENARIOS
        .iter()
        .map(|(name, factor)| {
            let burn_rate = burn * factor;
            Scenario {
                name: name.to_string(),
                burn_rate,
                runway: runway_months(balance, burn_rate),
            }
        })
        .collect();
    RunwayScenarios {
        current: RunwayStatus {
            cash_balance: balance,
            monthly_burn: burn,
            months: metrics.runway.current,
        },
        scenarios,
    }
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
        }
    }
}

pub struct Insight {
    pub title: &'static str,
    pub description: &'static str,
    pub impact: &'static str,
    pub priority: Priority,
}

pub struct Benchmark {
    pub metric: String,
    pub value: String,
    pub benchmark: String,
    pub above: bool,
}

pub struct InsightSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
    pub date: NaiveDate,
}

pub struct InsightsBundle {
    pub cost_optimization: &'static [Insight],
    pub growth: &'static [Insight],
    pub benchmarks: Vec<Benchmark>,
    pub summary: InsightSummary,
}

const COST_OPTIMIZATION: &[Insight] = &[
    Insight {
        title: "Commit to reserved cloud capacity",
        description: "Move steady workloads to reserved instances or savings plans",
        impact: "Up to 25% off cloud spend",
        priority: Priority::High,
    },
    Insight {
        title: "Rebalance marketing channels",
        description: "Shift budget toward the channels with the best return last quarter",
        impact: "~15% better ROI",
        priority: Priority::Medium,
    },
];

const GROWTH: &[Insight] = &[
    Insight {
        title: "Raise customer lifetime value",
        description: "Introduce premium tiers that reward heavy users",
        impact: "+30% revenue potential",
        priority: Priority::High,
    },
    Insight {
        title: "Open an enterprise segment",
        description: "Package current usage patterns for larger buyers",
        impact: "2x addressable market",
        priority: Priority::Medium,
    },
];

/// Month-over-month revenue growth the benchmark table compares against.
pub const REVENUE_GROWTH_BENCHMARK: f64 = 20.0;

// (metric, value, benchmark, above)
const STATIC_BENCHMARKS: &[(&str, &str, &str, bool)] = &[
    ("Gross Margin", "72%", "65%", true),
    ("CAC Payback", "8 months", "12 months", true),
];

pub fn insights_bundle(
    txns: &[Transaction],
    metrics: &Metrics,
    today: NaiveDate,
) -> InsightsBundle {
    let mut benchmarks: Vec<Benchmark> = STATIC_BENCHMARKS
        .iter()
        .map(|(metric, value, benchmark, above)| Benchmark {
            metric: metric.to_string(),
            value: value.to_string(),
            benchmark: benchmark.to_string(),
            above: *above,
        })
        .collect();
    let growth = metrics.revenue_growth.change;
    benchmarks.push(Benchmark {
        metric: "Revenue Growth".to_string(),
        value: percent(growth),
        benchmark: format!("{REVENUE_GROWTH_BENCHMARK:.0}%"),
        above: growth >= REVENUE_GROWTH_BENCHMARK,
    });

    let t = totals(txns);
    InsightsBundle {
        cost_optimization: COST_OPTIMIZATION,
        growth: GROWTH,
        benchmarks,
        summary: InsightSummary {
            total_income: t.income,
            total_expenses: t.expenses,
            net: t.cash_balance,
            date: today,
        },
    }
}

/// Label for a month span ending at `today`: "Dec 2023 - May 2024".
pub fn period_label(months: u32, today: NaiveDate) -> String {
    let end = month_label(today.year(), today.month());
    if months <= 1 {
        return end;
    }
    let first = today
        .with_day(1)
        .and_then(|d| d.checked_sub_months(chrono::Months::new(months - 1)))
        .unwrap_or(today);
    format!("{} - {end}", month_label(first.year(), first.month()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::derive;
    use crate::models::TxnStatus;

    fn txn(id: i64, date: &str, amount: f64, txn_type: TxnType, category: &str) -> Transaction {
        Transaction {
            id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: format!("{category} #{id}"),
            amount,
            txn_type,
            status: TxnStatus::Completed,
            category: category.to_string(),
            client_id: None,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn(1, "2024-04-01", 8000.0, TxnType::Income, "Revenue"),
            txn(2, "2024-04-05", 3000.0, TxnType::Expense, "Payroll"),
            txn(3, "2024-04-09", 500.0, TxnType::Expense, "Marketing"),
            txn(4, "2024-05-01", 10000.0, TxnType::Income, "Revenue"),
            txn(5, "2024-05-02", 2000.0, TxnType::Income, "Investment"),
            txn(6, "2024-05-03", 3000.0, TxnType::Expense, "Payroll"),
            txn(7, "2024-05-04", 1000.0, TxnType::Expense, "Infrastructure"),
            txn(8, "2024-05-06", 200.0, TxnType::Expense, "Payroll"),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    #[test]
    fn test_report_kind_file_names() {
        assert_eq!(ReportKind::BurnRate.file_name(), "burn-rate-report.pdf");
        assert_eq!(ReportKind::CashBalance.file_name(), "cash-balance-report.pdf");
        assert_eq!(ReportKind::Client.title(), "Client Report");
    }

    #[test]
    fn test_ledger_running_balance() {
        let mut txns = sample();
        txns.reverse();
        let ledger = cash_balance_ledger(&txns);
        assert_eq!(ledger.rows.len(), 8);
        assert_eq!(ledger.rows[0].balance, 8000.0);
        assert_eq!(ledger.rows[1].amount, -3000.0);
        assert_eq!(ledger.rows[1].balance, 5000.0);
        assert_eq!(ledger.closing_balance, 12300.0);
        assert_eq!(ledger.closing_balance, totals(&txns).cash_balance);
    }

    #[test]
    fn test_burn_breakdown_groups_categories() {
        let txns = sample();
        let report = burn_rate_breakdown(&txns, 2, today());
        assert_eq!(report.months.len(), 2);
        assert_eq!(report.months[0].label, "Apr 2024");
        let may = &report.months[1];
        assert_eq!(may.total, 4200.0);
        assert_eq!(
            may.breakdown[0],
            CategoryAmount {
                category: "Payroll".to_string(),
                amount: 3200.0
            }
        );
        assert_eq!(may.breakdown[1].category, "Infrastructure");
    }

    #[test]
    fn test_revenue_breakdown_growth() {
        let txns = sample();
        let report = revenue_breakdown(&txns, 2, today());
        assert_eq!(report.months[0].growth, 100.0, "March had no income");
        assert_eq!(report.months[1].total, 12000.0);
        assert_eq!(report.months[1].growth, 50.0);
        assert_eq!(report.months[1].sources.len(), 2);
    }

    #[test]
    fn test_runway_scenarios() {
        let txns = sample();
        let m = derive(&txns, today());
        let r = runway_scenarios(&m);
        assert_eq!(r.current.cash_balance, 12300.0);
        assert_eq!(r.current.monthly_burn, 4200.0);
        assert_eq!(r.current.months, 2.0);
        assert_eq!(r.scenarios.len(), 4);
        assert_eq!(r.scenarios[0].runway, r.current.months);
        // cheaper burn never shortens runway
        assert!(r.scenarios[2].runway >= r.scenarios[1].runway);
        assert!(r.scenarios[3].runway <= r.scenarios[0].runway);
    }

    #[test]
    fn test_insights_bundle() {
        let txns = sample();
        let m = derive(&txns, today());
        let bundle = insights_bundle(&txns, &m, today());
        assert_eq!(bundle.summary.total_income, 20000.0);
        assert_eq!(bundle.summary.total_expenses, 7700.0);
        assert_eq!(bundle.summary.net, 12300.0);
        let growth = bundle.benchmarks.iter().find(|b| b.metric == "Revenue Growth").unwrap();
        assert_eq!(growth.value, "+50.0%");
        assert!(growth.above);
        assert_eq!(bundle.cost_optimization.len(), 2);
    }

    #[test]
    fn test_period_label() {
        assert_eq!(period_label(1, today()), "May 2024");
        assert_eq!(period_label(6, today()), "Dec 2023 - May 2024");
    }
}
