use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::RunwayError;
use crate::models::{Transaction, TxnType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TxnType),
}

impl FromStr for TypeFilter {
    type Err = RunwayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Ok(Self::Only(s.parse()?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    All,
    Today,
    /// Dated within the last seven days (inclusive of the boundary day).
    Week,
    Month,
    Year,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Today => date == today,
            Self::Week => date >= today - Duration::days(7),
            Self::Month => date.year() == today.year() && date.month() == today.month(),
            Self::Year => date.year() == today.year(),
        }
    }
}

impl FromStr for DateRange {
    type Err = RunwayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "today" => Ok(Self::Today),
            "week" | "last-7-days" => Ok(Self::Week),
            "month" | "this-month" => Ok(Self::Month),
            "year" | "this-year" => Ok(Self::Year),
            other => Err(RunwayError::validation(
                "date range",
                format!("'{other}' (expected all, today, week, month or year)"),
            )),
        }
    }
}

/// Display filters for the transaction list. Every active predicate must hold.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub query: String,
    pub kind: TypeFilter,
    /// `None` means all categories; otherwise an exact match.
    pub category: Option<String>,
    pub range: DateRange,
}

impl TransactionFilter {
    pub fn matches(&self, txn: &Transaction, today: NaiveDate) -> bool {
        self.matches_query(txn)
            && self.matches_kind(txn)
            && self.matches_category(txn)
            && self.range.contains(txn.date, today)
    }

    fn matches_query(&self, txn: &Transaction) -> bool {
        let needle = self.query.trim().to_lowercase();
        needle.is_empty()
            || txn.description.to_lowercase().contains(&needle)
            || txn.category.to_lowercase().contains(&needle)
    }

    fn matches_kind(&self, txn: &Transaction) -> bool {
        match self.kind {
            TypeFilter::All => true,
            TypeFilter::Only(kind) => txn.txn_type == kind,
        }
    }

    fn matches_category(&self, txn: &Transaction) -> bool {
        match &self.category {
            None => true,
            Some(c) => &txn.category == c,
        }
    }

    pub fn apply<'a>(&self, txns: &'a [Transaction], today: NaiveDate) -> Vec<&'a Transaction> {
        txns.iter().filter(|t| self.matches(t, today)).collect()
    }
}

/// Parse a category filter argument, where "all" clears the filter.
pub fn parse_category(arg: Option<String>) -> Option<String> {
    arg.filter(|c| !c.eq_ignore_ascii_case("all"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TxnStatus;

    fn txn(
        id: i64,
        date: &str,
        description: &str,
        txn_type: TxnType,
        category: &str,
    ) -> Transaction {
        Transaction {
            id,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: description.to_string(),
            amount: 100.0,
            txn_type,
            status: TxnStatus::Completed,
            category: category.to_string(),
            client_id: None,
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn(1, "2024-05-20", "Stripe payout", TxnType::Income, "Revenue"),
            txn(2, "2024-05-18", "AWS invoice", TxnType::Expense, "Infrastructure"),
            txn(3, "2024-05-02", "Google Ads", TxnType::Expense, "Marketing"),
            txn(4, "2024-01-10", "Angel cheque", TxnType::Income, "Investment"),
            txn(5, "2023-12-30", "Office rent", TxnType::Expense, "Office"),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn ids(found: &[&Transaction]) -> Vec<i64> {
        found.iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_default_filter_keeps_everything_in_order() {
        let txns = sample();
        let found = TransactionFilter::default().apply(&txns, today());
        assert_eq!(ids(&found), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_query_matches_description_or_category_case_insensitively() {
        let txns = sample();
        let f = TransactionFilter { query: "aws".to_string(), ..Default::default() };
        assert_eq!(ids(&f.apply(&txns, today())), vec![2]);
        let f = TransactionFilter { query: "MARKET".to_string(), ..Default::default() };
        assert_eq!(ids(&f.apply(&txns, today())), vec![3]);
    }

    #[test]
    fn test_type_filter() {
        let txns = sample();
        let f = TransactionFilter { kind: TypeFilter::Only(TxnType::Income), ..Default::default() };
        assert_eq!(ids(&f.apply(&txns, today())), vec![1, 4]);
    }

    #[test]
    fn test_category_is_exact_match() {
        let txns = sample();
        let f = TransactionFilter { category: Some("Office".to_string()), ..Default::default() };
        assert_eq!(ids(&f.apply(&txns, today())), vec![5]);
        let f = TransactionFilter { category: Some("office".to_string()), ..Default::default() };
        assert!(f.apply(&txns, today()).is_empty());
    }

    #[test]
    fn test_today_only_matches_current_date() {
        let txns = sample();
        let f = TransactionFilter { range: DateRange::Today, ..Default::default() };
        let found = f.apply(&txns, today());
        assert_eq!(ids(&found), vec![1]);
        assert!(found.iter().all(|t| t.date == today()));
    }

    #[test]
    fn test_date_ranges() {
        let txns = sample();
        let week = TransactionFilter { range: DateRange::Week, ..Default::default() };
        assert_eq!(ids(&week.apply(&txns, today())), vec![1, 2]);
        let month = TransactionFilter { range: DateRange::Month, ..Default::default() };
        assert_eq!(ids(&month.apply(&txns, today())), vec![1, 2, 3]);
        let year = TransactionFilter { range: DateRange::Year, ..Default::default() };
        assert_eq!(ids(&year.apply(&txns, today())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let txns = sample();
        let f = TransactionFilter {
            query: "a".to_string(),
            kind: TypeFilter::Only(TxnType::Expense),
            category: None,
            range: DateRange::Month,
        };
        // "Stripe payout" matches the query and the month but is income
        assert_eq!(ids(&f.apply(&txns, today())), vec![2, 3]);
        let f = TransactionFilter {
            query: "ads".to_string(),
            kind: TypeFilter::Only(TxnType::Expense),
            category: Some("Infrastructure".to_string()),
            range: DateRange::Month,
        };
        assert!(f.apply(&txns, today()).is_empty());
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("all".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!("Expense".parse::<TypeFilter>().unwrap(), TypeFilter::Only(TxnType::Expense));
        assert_eq!("last-7-days".parse::<DateRange>().unwrap(), DateRange::Week);
        assert!("fortnight".parse::<DateRange>().is_err());
        assert_eq!(parse_category(Some("ALL".to_string())), None);
        assert_eq!(parse_category(Some("Payroll".to_string())), Some("Payroll".to_string()));
    }
}
