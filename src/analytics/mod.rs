//! Analytics Module
//!
//! コスト時系列の異常検知

pub mod anomaly;

pub use anomaly::{
    detect_anomalies, Anomaly, AnomalyDetector, AnomalySeverity, AnomalyType, SeriesStatistics,
    SeverityThresholds, TimeSeriesPoint, DEFAULT_THRESHOLD, MIN_SERIES_LEN,
};
