//! Derived financial metrics over an in-memory transaction list.
//!
//! Every metric compares the calendar month containing `today` against the
//! calendar month before it.

use chrono::{Datelike, Months, NaiveDate};

use crate::models::{Transaction, TxnType};
use crate::store::totals;

/// Percentage change from `previous` to `current`.
///
/// A zero baseline has no meaningful ratio: growth from nothing counts as
/// +100%, a fall from nothing as -100%, and no movement as 0.
pub fn change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else if current < 0.0 {
            -100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Months of runway: whole months the balance covers at the given monthly
/// spend. Spend below 1 is treated as 1; a negative balance has no runway.
pub fn runway_months(balance: f64, monthly_expenses: f64) -> f64 {
    let months = (balance / monthly_expenses.max(1.0)).floor();
    months.max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    CashBalance,
    BurnRate,
    RevenueGrowth,
    Runway,
}

impl MetricKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CashBalance => "Cash Balance",
            Self::BurnRate => "Monthly Burn Rate",
            Self::RevenueGrowth => "Revenue Growth",
            Self::Runway => "Runway",
        }
    }

    /// Burn rate trends favourably when it falls; everything else when it rises.
    pub fn is_favorable(&self, change: f64) -> bool {
        match self {
            Self::BurnRate => change <= 0.0,
            _ => change >= 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub kind: MetricKind,
    pub current: f64,
    pub previous: f64,
    pub change: f64,
    pub favorable: bool,
}

impl Metric {
    fn new(kind: MetricKind, current: f64, previous: f64) -> Self {
        let change = change(current, previous);
        Self {
            kind,
            current,
            previous,
            change,
            favorable: kind.is_favorable(change),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub cash_balance: Metric,
    pub burn_rate: Metric,
    pub revenue_growth: Metric,
    pub runway: Metric,
}

impl Metrics {
    pub fn all(&self) -> [Metric; 4] {
        [self.cash_balance, self.burn_rate, self.revenue_growth, self.runway]
    }
}

/// Income and expense totals for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthFlow {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expenses: f64,
}

impl MonthFlow {
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

pub fn previous_month(date: NaiveDate) -> (i32, u32) {
    if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    }
}

pub fn in_month(txn: &Transaction, year: i32, month: u32) -> bool {
    txn.date.year() == year && txn.date.month() == month
}

pub fn month_flow(txns: &[Transaction], year: i32, month: u32) -> MonthFlow {
    let mut flow = MonthFlow {
        year,
        month,
        income: 0.0,
        expenses: 0.0,
    };
    for t in txns.iter().filter(|t| in_month(t, year, month)) {
        match t.txn_type {
            TxnType::Income => flow.income += t.amount,
            TxnType::Expense => flow.expenses += t.amount,
        }
    }
    flow
}

pub fn derive(txns: &[Transaction], today: NaiveDate) -> Metrics {
    let balance = totals(txns).cash_balance;
    let current = month_flow(txns, today.year(), today.month());
    let (py, pm) = previous_month(today);
    let previous = month_flow(txns, py, pm);

    let previous_balance = balance - current.net();

    Metrics {
        cash_balance: Metric::new(MetricKind::CashBalance, balance, previous_balance),
        burn_rate: Metric::new(MetricKind::BurnRate, current.expenses, previous.expenses),
        revenue_growth: Metric::new(MetricKind::RevenueGrowth, current.income, previous.income),
        runway: Metric::new(
            MetricKind::Runway,
            runway_months(balance, current.expenses),
            runway_months(previous_balance, current.expenses),
        ),
    }
}

/// Per-month flows for the last `months` calendar months ending with the
/// month of `today`, oldest first.
pub fn monthly_series(txns: &[Transaction], months: u32, today: NaiveDate) -> Vec<MonthFlow> {
    let first_of_month = today.with_day(1).unwrap_or(today);
    (0..months)
        .rev()
        .filter_map(|back| first_of_month.checked_sub_months(Months::new(back)))
        .map(|d| month_flow(txns, d.year(), d.month()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxnStatus;

    fn txn(date: &str, amount: f64, txn_type: TxnType) -> Transaction {
        Transaction {
            id: 0,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: "x".to_string(),
            amount,
            txn_type,
            status: TxnStatus::Completed,
            category: "Other".to_string(),
            client_id: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_change_zero_baseline() {
        assert_eq!(change(0.0, 0.0), 0.0);
        assert_eq!(change(5.0, 0.0), 100.0);
        assert_eq!(change(1e9, 0.0), 100.0);
        assert_eq!(change(-5.0, 0.0), -100.0);
    }

    #[test]
    fn test_change_ratio() {
        assert_eq!(change(150.0, 100.0), 50.0);
        assert_eq!(change(50.0, 100.0), -50.0);
        assert_eq!(change(0.0, 100.0), -100.0);
    }

    #[test]
    fn test_cash_balance_is_income_minus_expenses() {
        let txns = vec![
            txn("2024-05-01", 1000.0, TxnType::Income),
            txn("2024-05-02", 400.0, TxnType::Expense),
        ];
        let m = derive(&txns, day("2024-05-20"));
        assert_eq!(m.cash_balance.current, 600.0);
    }

    #[test]
    fn test_previous_balance_excludes_current_month_flow() {
        let txns = vec![
            txn("2024-04-01", 2000.0, TxnType::Income),
            txn("2024-04-10", 500.0, TxnType::Expense),
            txn("2024-05-01", 1000.0, TxnType::Income),
            txn("2024-05-02", 400.0, TxnType::Expense),
        ];
        let m = derive(&txns, day("2024-05-20"));
        assert_eq!(m.cash_balance.current, 2100.0);
        assert_eq!(m.cash_balance.previous, 1500.0);
        assert_eq!(m.cash_balance.change, 40.0);
        assert!(m.cash_balance.favorable);
    }

    #[test]
    fn test_burn_rate_and_revenue_month_over_month() {
        let txns = vec![
            txn("2024-04-01", 2000.0, TxnType::Income),
            txn("2024-04-10", 500.0, TxnType::Expense),
            txn("2024-05-01", 1000.0, TxnType::Income),
            txn("2024-05-02", 400.0, TxnType::Expense),
        ];
        let m = derive(&txns, day("2024-05-20"));
        assert_eq!(m.burn_rate.current, 400.0);
        assert_eq!(m.burn_rate.previous, 500.0);
        assert_eq!(m.burn_rate.change, -20.0);
        assert!(m.burn_rate.favorable, "falling burn is favourable");
        assert_eq!(m.revenue_growth.current, 1000.0);
        assert_eq!(m.revenue_growth.change, -50.0);
        assert!(!m.revenue_growth.favorable);
    }

    #[test]
    fn test_rising_burn_is_unfavorable() {
        let txns = vec![
            txn("2024-04-10", 100.0, TxnType::Expense),
            txn("2024-05-02", 300.0, TxnType::Expense),
        ];
        let m = derive(&txns, day("2024-05-20"));
        assert!(m.burn_rate.change > 0.0);
        assert!(!m.burn_rate.favorable);
    }

    #[test]
    fn test_flat_burn_is_favorable() {
        assert!(MetricKind::BurnRate.is_favorable(0.0));
        assert!(MetricKind::Runway.is_favorable(0.0));
        assert!(!MetricKind::CashBalance.is_favorable(-0.1));
    }

    #[test]
    fn test_runway_with_no_expenses_equals_balance() {
        let txns = vec![txn("2024-05-01", 600.0, TxnType::Income)];
        let m = derive(&txns, day("2024-05-20"));
        assert_eq!(m.runway.current, 600.0);
        assert!(m.runway.current.is_finite());
    }

    #[test]
    fn test_runway_floors() {
        assert_eq!(runway_months(1000.0, 300.0), 3.0);
        assert_eq!(runway_months(0.5, 0.0), 0.0);
        assert_eq!(runway_months(-500.0, 100.0), 0.0);
    }

    #[test]
    fn test_previous_runway_uses_previous_balance() {
        let txns = vec![
            txn("2024-04-01", 3000.0, TxnType::Income),
            txn("2024-04-10", 1000.0, TxnType::Expense),
            txn("2024-05-02", 500.0, TxnType::Expense),
        ];
        let m = derive(&txns, day("2024-05-20"));
        // balance 1500 at 500/month; before May's flow the balance was 2000
        assert_eq!(m.runway.current, 3.0);
        assert_eq!(m.runway.previous, 4.0);
        assert_eq!(m.runway.change, -25.0);
        assert!(!m.runway.favorable);
    }

    #[test]
    fn test_january_compares_with_december() {
        let txns = vec![
            txn("2023-12-15", 100.0, TxnType::Income),
            txn("2024-01-15", 150.0, TxnType::Income),
        ];
        let m = derive(&txns, day("2024-01-31"));
        assert_eq!(m.revenue_growth.previous, 100.0);
        assert_eq!(m.revenue_growth.change, 50.0);
    }

    #[test]
    fn test_same_month_other_year_ignored() {
        let txns = vec![txn("2023-05-15", 100.0, TxnType::Expense)];
        let m = derive(&txns, day("2024-05-20"));
        assert_eq!(m.burn_rate.current, 0.0);
        assert_eq!(m.cash_balance.current, -100.0);
    }

    #[test]
    fn test_monthly_series_oldest_first() {
        let txns = vec![
            txn("2023-11-15", 10.0, TxnType::Income),
            txn("2024-01-15", 20.0, TxnType::Expense),
        ];
        let series = monthly_series(&txns, 3, day("2024-01-31"));
        let labels: Vec<(i32, u32)> = series.iter().map(|m| (m.year, m.month)).collect();
        assert_eq!(labels, vec![(2023, 11), (2023, 12), (2024, 1)]);
        assert_eq!(series[0].income, 10.0);
        assert_eq!(series[2].expenses, 20.0);
        assert_eq!(series[2].net(), -20.0);
    }
}
