use chrono::NaiveDateTime;

use crate::fmt::percent;
use crate::metrics::Metrics;

/// Runway below this many months raises a danger alert.
pub const RUNWAY_DANGER_MONTHS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Warning,
    Danger,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: u64,
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub is_read: bool,
}

/// Ephemeral, in-memory alert list. Nothing here is persisted.
#[derive(Debug, Default)]
pub struct AlertCenter {
    alerts: Vec<Alert>,
    next_id: u64,
}

impl AlertCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: AlertKind,
        title: impl Into<String>,
        message: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        // newest first
        self.alerts.insert(
            0,
            Alert {
                id,
                kind,
                title: title.into(),
                message: message.into(),
                timestamp,
                is_read: false,
            },
        );
        id
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn unread_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.is_read).count()
    }

    /// Returns false when no alert has this id.
    #[allow(dead_code)]
    pub fn mark_read(&mut self, id: u64) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(a) => {
                a.is_read = true;
                true
            }
            None => false,
        }
    }

    #[allow(dead_code)]
    pub fn mark_all_read(&mut self) {
        for a in &mut self.alerts {
            a.is_read = true;
        }
    }

    #[allow(dead_code)]
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }
}

/// Build the dashboard's alert list from the current metrics. `pending` is the
/// number of pending rows; `pending_included` says whether `metrics` counted them.
pub fn derive_alerts(
    metrics: &Metrics,
    pending: i64,
    pending_included: bool,
    now: NaiveDateTime,
) -> AlertCenter {
    let mut center = AlertCenter::new();

    if pending > 0 {
        let treatment = if pending_included {
            "included in"
        } else {
            "excluded from"
        };
        center.push(
            AlertKind::Info,
            "Pending transactions",
            format!("{pending} transaction(s) are still pending and {treatment} metrics."),
            now,
        );
    }
    if metrics.revenue_growth.change > 0.0 {
        center.push(
            AlertKind::Info,
            "Revenue up",
            format!(
                "Revenue is {} versus last month.",
                percent(metrics.revenue_growth.change)
            ),
            now,
        );
    }
    if metrics.burn_rate.change > 0.0 {
        center.push(
            AlertKind::Warning,
            "Burn rate increased",
            format!(
                "Monthly spend is {} versus last month.",
                percent(metrics.burn_rate.change)
            ),
            now,
        );
    }
    if metrics.runway.current < RUNWAY_DANGER_MONTHS {
        center.push(
            AlertKind::Danger,
            "Runway below 6 months",
            format!(
                "At the current burn rate cash lasts {} month(s).",
                metrics.runway.current
            ),
            now,
        );
    }
    center
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::derive;
    use crate::models::{Transaction, TxnStatus, TxnType};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap().and_hms_opt(9, 0, 0).unwrap()
    }

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

    #[test]
    fn test_read_and_dismiss() {
        let mut center = AlertCenter::new();
        let a = center.push(AlertKind::Info, "A", "first", now());
        let b = center.push(AlertKind::Warning, "B", "second", now());
        assert_eq!(center.unread_count(), 2);
        assert_eq!(center.alerts()[0].id, b, "newest first");

        assert!(center.mark_read(a));
        assert_eq!(center.unread_count(), 1);
        assert!(!center.mark_read(42));

        assert!(center.dismiss(b));
        assert!(!center.dismiss(b));
        assert_eq!(center.alerts().len(), 1);
        assert_eq!(center.unread_count(), 0);
    }

    #[test]
    fn test_mark_all_read() {
        let mut center = AlertCenter::new();
        center.push(AlertKind::Info, "A", "", now());
        center.push(AlertKind::Danger, "B", "", now());
        center.mark_all_read();
        assert_eq!(center.unread_count(), 0);
        assert!(center.alerts().iter().all(|a| a.is_read));
    }

    #[test]
    fn test_derive_alerts_low_runway_and_rising_burn() {
        let txns = vec![
            txn("2024-04-01", 1000.0, TxnType::Income),
            txn("2024-04-10", 100.0, TxnType::Expense),
            txn("2024-05-10", 400.0, TxnType::Expense),
        ];
        let m = derive(&txns, now().date());
        let center = derive_alerts(&m, 0, false, now());
        let kinds: Vec<AlertKind> = center.alerts().iter().map(|a| a.kind).collect();
        assert!(kinds.contains(&AlertKind::Danger));
        assert!(kinds.contains(&AlertKind::Warning));
        assert_eq!(center.alerts()[0].kind, AlertKind::Danger);
    }

    #[test]
    fn test_derive_alerts_healthy() {
        let txns = vec![
            txn("2024-04-01", 100000.0, TxnType::Income),
            txn("2024-04-10", 1000.0, TxnType::Expense),
            txn("2024-05-01", 150000.0, TxnType::Income),
            txn("2024-05-10", 900.0, TxnType::Expense),
        ];
        let m = derive(&txns, now().date());
        let center = derive_alerts(&m, 2, false, now());
        let titles: Vec<&str> = center.alerts().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Revenue up", "Pending transactions"]);
        assert!(center.alerts()[1].message.contains("excluded from metrics"));
    }

    #[test]
    fn test_pending_alert_kept_when_pending_counted() {
        let txns = vec![
            txn("2024-04-01", 100000.0, TxnType::Income),
            txn("2024-05-10", 900.0, TxnType::Expense),
        ];
        let m = derive(&txns, now().date());
        let center = derive_alerts(&m, 3, true, now());
        let pending = center
            .alerts()
            .iter()
            .find(|a| a.title == "Pending transactions")
            .unwrap();
        assert_eq!(pending.kind, AlertKind::Info);
        assert_eq!(
            pending.message,
            "3 transaction(s) are still pending and included in metrics."
        );

        let none_pending = derive_alerts(&m, 0, true, now());
        assert!(none_pending
            .alerts()
            .iter()
            .all(|a| a.title != "Pending transactions"));
    }
}
