//! Opioid demand forecasting.
//!
//! Daily dispensed totals over a trailing window feed a small forecaster:
//! too little history predicts nothing, a short history follows its
//! least-squares trend, and a longer one uses the recent weekly mean.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{Database, DbError, DbResult};
use crate::models::{timestamp, MedicineType, DEFAULT_LOW_STOCK_THRESHOLD};

/// Days of fill history considered.
pub const DEMAND_WINDOW_DAYS: i64 = 30;

/// Points averaged once history is long enough.
pub const MEAN_WINDOW: usize = 7;

/// Forecast for one medicine at one pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandForecast {
    pub medicine_id: String,
    pub medicine_name: String,
    /// Daily totals used for the forecast, oldest first
    pub history: Vec<i64>,
    pub predicted_demand: f64,
    pub current_stock: i64,
    pub threshold: i64,
    /// Set when predicted demand outruns stock plus threshold
    pub alert: Option<String>,
}

/// Predict the next point of a daily series.
pub fn forecast_next(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return 0.0;
    }
    if n >= MEAN_WINDOW {
        let recent = &series[n - MEAN_WINDOW..];
        return recent.iter().sum::<f64>() / MEAN_WINDOW as f64;
    }

    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = series.iter().sum::<f64>() / nf;
    let (mut cov, mut var) = (0.0, 0.0);
    for (i, y) in series.iter().enumerate() {
        let dx = i as f64 - mean_x;
        cov += dx * (y - mean_y);
        var += dx * dx;
    }
    let slope = cov / var;
    let predicted = mean_y + slope * (nf - mean_x);
    predicted.max(0.0)
}

fn alert_text(predicted: f64, stock: i64, threshold: i64) -> Option<String> {
    (predicted > (stock + threshold) as f64).then(|| {
        format!(
            "Restock from distributor: predicted {:.1} > stock {}",
            predicted, stock
        )
    })
}

impl Database {
    /// Forecasts for every opioid a pharmacy stocks or has dispensed.
    pub fn demand_alerts(&self, pharmacy_id: &str) -> DbResult<Vec<DemandForecast>> {
        self.demand_alerts_at(pharmacy_id, Utc::now())
    }

    /// Forecasts as of `now`, sorted by medicine name.
    pub fn demand_alerts_at(
        &self,
        pharmacy_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Vec<DemandForecast>> {
        if self.get_pharmacy(pharmacy_id)?.is_none() {
            return Err(DbError::not_found("Pharmacy"));
        }
        let since = timestamp(now - Duration::days(DEMAND_WINDOW_DAYS));

        // medicine_id -> (name, day -> total)
        let mut history: BTreeMap<String, (String, BTreeMap<String, i64>)> = BTreeMap::new();

        let mut stmt = self.conn().prepare(
            r#"
            SELECT m.id, m.name, substr(f.dispensed_at, 1, 10) AS day, SUM(f.quantity_dispensed)
            FROM prescription_fills f
            JOIN prescription_medicines pm ON pm.id = f.prescription_medicine_id
            JOIN medicines m ON m.id = pm.medicine_id
            WHERE f.pharmacy_id = ?1 AND m.type = ?2 AND f.dispensed_at >= ?3
            GROUP BY m.id, day
            ORDER BY day
            "#,
        )?;
        let rows = stmt.query_map(
            rusqlite::params![pharmacy_id, MedicineType::Opioid, since],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )?;
        for row in rows {
            let (medicine_id, name, day, total) = row?;
            history
                .entry(medicine_id)
                .or_insert_with(|| (name, BTreeMap::new()))
                .1
                .insert(day, total);
        }

        let mut stmt = self.conn().prepare(
            r#"
            SELECT m.id, m.name, SUM(i.quantity), MIN(i.low_stock_threshold)
            FROM inventory i
            JOIN medicines m ON m.id = i.medicine_id
            WHERE i.pharmacy_id = ?1 AND m.type = ?2
            GROUP BY m.id
            "#,
        )?;
        let stock_rows = stmt.query_map(rusqlite::params![pharmacy_id, MedicineType::Opioid], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })?;
        let mut stock: BTreeMap<String, (String, i64, i64)> = BTreeMap::new();
        for row in stock_rows {
            let (medicine_id, name, quantity, threshold) = row?;
            stock.insert(medicine_id, (name, quantity, threshold));
        }

        let mut medicine_ids: Vec<String> = history.keys().chain(stock.keys()).cloned().collect();
        medicine_ids.sort();
        medicine_ids.dedup();

        let mut forecasts: Vec<DemandForecast> = medicine_ids
            .into_iter()
            .map(|medicine_id| {
                let (name, days) = history
                    .remove(&medicine_id)
                    .unwrap_or_else(|| (String::new(), BTreeMap::new()));
                let (stock_name, current_stock, threshold) = stock
                    .remove(&medicine_id)
                    .unwrap_or((String::new(), 0, DEFAULT_LOW_STOCK_THRESHOLD));
                let series: Vec<i64> = days.into_values().collect();
                let predicted = forecast_next(
                    &series.iter().map(|&v| v as f64).collect::<Vec<_>>(),
                );
                DemandForecast {
                    medicine_name: if name.is_empty() { stock_name } else { name },
                    medicine_id,
                    history: series,
                    predicted_demand: predicted,
                    current_stock,
                    threshold,
                    alert: alert_text(predicted, current_stock, threshold),
                }
            })
            .collect();

        forecasts.sort_by(|a, b| a.medicine_name.cmp(&b.medicine_name));
        Ok(forecasts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_history_predicts_zero() {
        assert_eq!(forecast_next(&[]), 0.0);
        assert_eq!(forecast_next(&[12.0]), 0.0);
    }

    #[test]
    fn test_trend_extrapolates() {
        let predicted = forecast_next(&[2.0, 4.0, 6.0]);
        assert!((predicted - 8.0).abs() < 1e-9);

        let flat = forecast_next(&[5.0, 5.0]);
        assert!((flat - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_falling_trend_clamps_at_zero() {
        assert_eq!(forecast_next(&[30.0, 10.0]), 0.0);
    }

    #[test]
    fn test_long_history_uses_recent_mean() {
        let series = [100.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert!((forecast_next(&series) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_alert_text() {
        assert_eq!(
            alert_text(25.0, 10, 10).as_deref(),
            Some("Restock from distributor: predicted 25.0 > stock 10")
        );
        assert!(alert_text(20.0, 10, 10).is_none());
    }

    proptest! {
        #[test]
        fn forecast_never_negative(series in prop::collection::vec(0.0f64..1000.0, 0..40)) {
            prop_assert!(forecast_next(&series) >= 0.0);
        }

        #[test]
        fn mean_stays_within_recent_range(series in prop::collection::vec(0.0f64..1000.0, 7..40)) {
            let recent = &series[series.len() - MEAN_WINDOW..];
            let lo = recent.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = recent.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let predicted = forecast_next(&series);
            prop_assert!(predicted >= lo - 1e-6 && predicted <= hi + 1e-6);
        }
    }
}
