// Integration tests for end-to-end workflows and critical user scenarios

#[cfg(test)]
mod integration_tests {
    use crate::csv_provider::CsvSeriesProvider;
    use crate::daily_series::{densify, split_metrics, DateRange, SeriesProvider};
    use crate::forecast::{apply_nudges, forecast30, NudgeInputs, HORIZON};
    use crate::mock_series::MockSeriesProvider;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::trailing(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(), 90)
    }

    /// Mock history -> forecast -> CTR nudge, as the dashboard endpoint does it
    #[test]
    fn test_mock_series_forecast_workflow() {
        let points = MockSeriesProvider::new()
            .daily_series("https://shop.example/", &range())
            .unwrap();
        let (clicks, ctr) = split_metrics(&points);

        let base = forecast30(&clicks);
        assert_eq!(base.forecast.len(), HORIZON);
        assert!(base.forecast.iter().any(|v| *v > 0.0));
        assert!(base.growth_pct.is_finite());

        let nudged = apply_nudges(
            &base.forecast,
            &NudgeInputs {
                ctr_series: Some(ctr),
                ..Default::default()
            },
        );
        assert!(nudged.details.ctr.is_some());
        assert!(nudged.total_nudge.abs() <= 0.10 + 1e-12);
        for (adjusted, original) in nudged.adjusted.iter().zip(&base.forecast) {
            assert!((adjusted - original * (1.0 + nudged.total_nudge)).abs() < 1e-9);
        }
    }

    /// Sparse CSV export -> densified series -> forecast still runs on full history
    #[test]
    fn test_sparse_csv_is_densified_before_forecasting() {
        let mut csv = String::from("site,date,clicks,ctr\n");
        for date in range().dates().step_by(3) {
            csv.push_str(&format!("https://blog.example/,{},120,0.04\n", date));
        }

        let provider = CsvSeriesProvider::from_reader(csv.as_bytes()).unwrap();
        let sparse = provider.daily_series("https://blog.example/", &range()).unwrap();
        assert_eq!(sparse.len(), 30);

        let dense = densify(&sparse, &range());
        assert_eq!(dense.len(), 90);
        let (clicks, _) = split_metrics(&dense);

        let result = forecast30(&clicks);
        // Every third day has traffic, so the smoothed level is about 40.
        assert!(result.baseline.iter().all(|v| *v > 30.0 && *v < 55.0));
        assert!(result.forecast.iter().all(|v| *v >= 0.0));
    }

    /// Short history never produces a forecast, whatever the source
    #[test]
    fn test_short_history_is_zeroed() {
        let short = DateRange::trailing(NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(), 30);
        let points = MockSeriesProvider::new()
            .daily_series("https://new.example/", &short)
            .unwrap();
        let (clicks, _) = split_metrics(&points);
        let result = forecast30(&clicks);
        assert!(result.forecast.iter().all(|v| *v == 0.0));
        assert_eq!(result.growth_pct, 0.0);
    }
}
