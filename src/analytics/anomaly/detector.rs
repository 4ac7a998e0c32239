//! Anomaly Detector Implementation
//!
//! Zスコア法による異常検知器の実装

use super::types::{Anomaly, AnomalyType, SeverityThresholds, TimeSeriesPoint};

/// デフォルトの検知閾値（|z|）
pub const DEFAULT_THRESHOLD: f64 = 1.5;

/// 統計的に意味を持つ最小データ点数
pub const MIN_SERIES_LEN: usize = 3;

/// 系列全体の統計量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStatistics {
    pub count: usize,
    pub mean: f64,
    /// 母標準偏差（N で割る）
    pub std_dev: f64,
}

impl SeriesStatistics {
    /// 値の集合から統計量を計算
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
        })
    }

    /// Zスコアを計算（分散ゼロなら 0）
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std_dev == 0.0 {
            return 0.0;
        }
        (value - self.mean) / self.std_dev
    }

    /// 平均からの乖離率（平均ゼロなら 0）
    pub fn deviation_percent(&self, value: f64) -> f64 {
        if self.mean == 0.0 {
            return 0.0;
        }
        ((value - self.mean) / self.mean) * 100.0
    }
}

/// 異常検知器
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    /// 最小 |z|
    threshold: f64,
    /// 重大度の境界値
    thresholds: SeverityThresholds,
}

impl AnomalyDetector {
    /// 新しい異常検知器を作成
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            thresholds: SeverityThresholds::default(),
        }
    }

    /// 重大度の境界値を設定
    pub fn with_thresholds(mut self, thresholds: SeverityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn severity_thresholds(&self) -> &SeverityThresholds {
        &self.thresholds
    }

    /// 異常を検知
    ///
    /// Returns anomalies ranked most severe first, then by descending |z|.
    /// Series shorter than [`MIN_SERIES_LEN`] yield nothing.
    pub fn detect(&self, series: &[TimeSeriesPoint]) -> Vec<Anomaly> {
        if series.len() < MIN_SERIES_LEN {
            return Vec::new();
        }

        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let Some(stats) = SeriesStatistics::from_values(&values) else {
            return Vec::new();
        };

        let mut anomalies: Vec<Anomaly> = series
            .iter()
            .filter_map(|point| {
                let z_score = stats.z_score(point.value);
                let abs_z = z_score.abs();

                // NaN threshold or NaN statistics never qualify
                if !(abs_z >= self.threshold) {
                    return None;
                }

                Some(Anomaly {
                    date: point.date.clone(),
                    value: point.value,
                    mean: stats.mean,
                    std_dev: stats.std_dev,
                    z_score,
                    anomaly_type: AnomalyType::from_z_score(z_score),
                    severity: self.thresholds.classify(abs_z),
                    deviation_percent: stats.deviation_percent(point.value),
                })
            })
            .collect();

        // stable: equal keys keep input order
        anomalies.sort_by(|a, b| {
            a.severity
                .rank()
                .cmp(&b.severity.rank())
                .then_with(|| b.z_score.abs().total_cmp(&a.z_score.abs()))
        });

        tracing::debug!(
            points = series.len(),
            mean = stats.mean,
            std_dev = stats.std_dev,
            anomalies = anomalies.len(),
            "z-score detection finished"
        );

        anomalies
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

/// 既定の境界値で異常を検知
pub fn detect_anomalies(series: &[TimeSeriesPoint], threshold: f64) -> Vec<Anomaly> {
    AnomalyDetector::new(threshold).detect(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::anomaly::AnomalySeverity;

    fn series(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(format!("2024-01-{:02}", i + 1), *v))
            .collect()
    }

    #[test]
    fn test_statistics_population_std_dev() {
        let stats = SeriesStatistics::from_values(&[10.0, 10.0, 10.0, 10.0, 100.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert!((stats.mean - 28.0).abs() < 1e-9);
        // sqrt(6480 / 5)
        assert!((stats.std_dev - 1296.0_f64.sqrt()).abs() < 1e-9);
        assert!((stats.std_dev - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_empty() {
        assert!(SeriesStatistics::from_values(&[]).is_none());
    }

    #[test]
    fn test_too_short_series_is_empty() {
        let short = series(&[1.0, 1000.0]);
        for threshold in [0.0, 0.5, 1.5, 10.0] {
            assert!(detect_anomalies(&short, threshold).is_empty());
        }
        assert!(detect_anomalies(&[], 1.5).is_empty());
    }

    #[test]
    fn test_zero_variance_has_no_anomalies() {
        let flat = series(&[10.0, 10.0, 10.0]);
        let stats = SeriesStatistics::from_values(&[10.0, 10.0, 10.0]).unwrap();
        assert_eq!(stats.mean, 10.0);
        assert_eq!(stats.std_dev, 0.0);

        for threshold in [0.01, 1.5, 3.0] {
            assert!(detect_anomalies(&flat, threshold).is_empty());
        }
    }

    #[test]
    fn test_single_spike_warning() {
        let anomalies = AnomalyDetector::default().detect(&series(&[10.0, 10.0, 10.0, 10.0, 100.0]));
        assert_eq!(anomalies.len(), 1);

        let anomaly = &anomalies[0];
        assert_eq!(anomaly.date, "2024-01-05");
        assert_eq!(anomaly.anomaly_type, AnomalyType::Spike);
        assert_eq!(anomaly.severity, AnomalySeverity::Warning);
        assert!((anomaly.z_score - 2.0).abs() < 0.05);
        assert!((anomaly.mean - 28.0).abs() < 1e-9);
        assert!((anomaly.deviation_percent - 257.142857).abs() < 1e-3);
    }

    #[test]
    fn test_dip_below_mean() {
        let anomalies = detect_anomalies(&series(&[100.0, 100.0, 100.0, 100.0, 10.0]), 1.5);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].anomaly_type, AnomalyType::Dip);
        assert!(anomalies[0].z_score < 0.0);
        assert!(anomalies[0].deviation_percent < 0.0);
    }

    #[test]
    fn test_critical_sorted_first() {
        // 前半に WARNING 相当、後半に CRITICAL 相当の外れ値
        let mut values = vec![10.0; 30];
        values[2] = 50.0;
        values[27] = 100.0;
        let anomalies = detect_anomalies(&series(&values), 1.5);

        assert_eq!(anomalies.len(), 2);
        assert_eq!(anomalies[0].severity, AnomalySeverity::Critical);
        assert_eq!(anomalies[0].date, "2024-01-28");
        assert_eq!(anomalies[1].severity, AnomalySeverity::Warning);
        assert_eq!(anomalies[1].date, "2024-01-03");
    }

    #[test]
    fn test_ties_ordered_by_abs_z_score() {
        let values = [10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 35.0, -10.0];
        let anomalies = detect_anomalies(&series(&values), 1.0);

        for pair in anomalies.windows(2) {
            if pair[0].severity == pair[1].severity {
                assert!(pair[0].z_score.abs() >= pair[1].z_score.abs());
            }
        }
    }

    #[test]
    fn test_shared_baseline() {
        let values = [1.0, 50.0, 2.0, 3.0, 2.0, 1.0, 3.0, 2.0, -40.0, 2.0];
        let anomalies = detect_anomalies(&series(&values), 1.0);
        assert!(anomalies.len() >= 2);

        let first = &anomalies[0];
        assert!(anomalies
            .iter()
            .all(|a| a.mean == first.mean && a.std_dev == first.std_dev));
    }

    #[test]
    fn test_low_threshold_surfaces_normal() {
        let values = [10.0, 12.0, 8.0, 11.0, 9.0];
        let anomalies = detect_anomalies(&series(&values), 0.0);
        assert_eq!(anomalies.len(), values.len());
        assert!(anomalies
            .iter()
            .any(|a| a.severity == AnomalySeverity::Normal));
    }

    #[test]
    fn test_threshold_monotonicity() {
        let values = [
            12.0, 15.0, 11.0, 80.0, 13.0, 14.0, 2.0, 16.0, 12.5, 40.0, 13.0, 11.0,
        ];
        let data = series(&values);

        let mut previous = usize::MAX;
        for step in 0..40 {
            let threshold = step as f64 * 0.1;
            let count = detect_anomalies(&data, threshold).len();
            assert!(count <= previous, "count grew at threshold {}", threshold);
            previous = count;
        }
    }

    #[test]
    fn test_zero_mean_deviation_percent() {
        let anomalies = detect_anomalies(&series(&[-10.0, 0.0, 0.0, 0.0, 10.0]), 1.0);
        assert!(!anomalies.is_empty());
        assert!(anomalies.iter().all(|a| a.deviation_percent == 0.0));
    }

    #[test]
    fn test_custom_severity_thresholds() {
        let detector = AnomalyDetector::new(1.5).with_thresholds(SeverityThresholds {
            critical: 2.0,
            warning: 1.8,
            info: 1.5,
        });
        let anomalies = detector.detect(&series(&[10.0, 10.0, 10.0, 10.0, 100.0]));
        assert_eq!(anomalies[0].severity, AnomalySeverity::Critical);
    }

    #[test]
    fn test_nan_threshold_reports_nothing() {
        let points = series(&[10.0, 11.0, 9.0, 10.0]);
        assert!(detect_anomalies(&points, f64::NAN).is_empty());
        assert!(AnomalyDetector::new(f64::NAN).detect(&points).is_empty());
    }

    #[test]
    fn test_nan_value_reports_nothing() {
        let points = series(&[10.0, 10.0, f64::NAN, 10.0, 100.0]);
        assert!(detect_anomalies(&points, 0.0).is_empty());
        assert!(detect_anomalies(&points, 1.5).is_empty());
    }
}
