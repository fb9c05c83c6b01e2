//! Aggregate statistics derivation for the dashboard cards and charts.

use serde::{Deserialize, Serialize};

/// Tenant-scoped raw counters as reported by the result store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSummary {
    pub evaluations_total: u64,
    pub alerts: u64,
    pub no_alerts: u64,
    pub event_history_transactions: u64,
}

/// Derived metrics. Total function of the summary — no error conditions.
#[derive(Debug, Clone, Serialize)]
pub struct StatsView {
    /// Fraction of evaluations flagged, in [0, 1].
    pub alert_rate: f64,
    pub clean_rate: f64,
    /// Percent rendering with one decimal place, e.g. "12.0%".
    pub alert_rate_pct: String,
    /// Unclassified or errored evaluations (total minus both outcomes,
    /// clamped at zero).
    pub residual: u64,
    /// [alerts, clean, residual] for the outcome chart.
    pub chart_series: [u64; 3],
}

/// Combine raw counts into derived dashboard metrics.
pub fn aggregate(summary: &StatsSummary) -> StatsView {
    let total = summary.evaluations_total;
    let alert_rate = rate(summary.alerts, total);
    let clean_rate = rate(summary.no_alerts, total);
    let residual = total.saturating_sub(summary.alerts + summary.no_alerts);

    StatsView {
        alert_rate,
        clean_rate,
        alert_rate_pct: format!("{:.1}%", alert_rate * 100.0),
        residual,
        chart_series: [summary.alerts, summary.no_alerts, residual],
    }
}

fn rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_residual_and_percent() {
        let view = aggregate(&StatsSummary {
            evaluations_total: 100,
            alerts: 12,
            no_alerts: 85,
            event_history_transactions: 100,
        });
        assert_eq!(view.residual, 3);
        assert_eq!(view.alert_rate_pct, "12.0%");
        assert_eq!(view.chart_series, [12, 85, 3]);
    }

    #[test]
    fn zero_total_degrades_gracefully() {
        let view = aggregate(&StatsSummary::default());
        assert_eq!(view.alert_rate, 0.0);
        assert_eq!(view.clean_rate, 0.0);
        assert_eq!(view.residual, 0);
        assert_eq!(view.alert_rate_pct, "0.0%");
    }

    #[test]
    fn residual_never_goes_negative() {
        // Counts can momentarily disagree while the pipeline is writing.
        let view = aggregate(&StatsSummary {
            evaluations_total: 10,
            alerts: 8,
            no_alerts: 8,
            event_history_transactions: 0,
        });
        assert_eq!(view.residual, 0);
    }

    #[test]
    fn rates_stay_in_unit_interval() {
        for (total, alerts, clean) in [(1u64, 1u64, 0u64), (1000, 999, 1), (7, 0, 7)] {
            let view = aggregate(&StatsSummary {
                evaluations_total: total,
                alerts,
                no_alerts: clean,
                event_history_transactions: 0,
            });
            assert!((0.0..=1.0).contains(&view.alert_rate));
            assert!((0.0..=1.0).contains(&view.clean_rate));
        }
    }
}
