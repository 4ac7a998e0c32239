//! Anomaly Detection Module
//!
//! 異常検知システム

mod detector;
mod types;

pub use detector::{
    detect_anomalies, AnomalyDetector, SeriesStatistics, DEFAULT_THRESHOLD, MIN_SERIES_LEN,
};
pub use types::{Anomaly, AnomalySeverity, AnomalyType, SeverityThresholds, TimeSeriesPoint};
