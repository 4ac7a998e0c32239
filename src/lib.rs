//! # finops-anomaly
//!
//! Z-score anomaly detection for daily cloud cost series.
//!
//! The detector computes a single mean / population standard deviation
//! baseline over the whole series and ranks every point whose |z-score|
//! reaches the threshold. Each anomaly can then be explained by external
//! text-generation providers tried in priority order, with a deterministic
//! rule-based explanation when none of them answers.

pub mod analytics;
pub mod config;
pub mod error;
pub mod explain;
pub mod llm;
pub mod logging;
pub mod service;
pub mod source;

pub use analytics::{
    detect_anomalies, Anomaly, AnomalyDetector, AnomalySeverity, AnomalyType, TimeSeriesPoint,
};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use explain::{Explainer, ExplainerConfig, Explanation, ExplanationSource};
pub use service::{AnnotatedAnomaly, AnomalyReport, AnomalyService};
pub use source::{JsonFileSource, StaticSeriesSource, TimeSeriesSource};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::InvalidInput("test".to_string());
        assert!(err.to_string().contains("test"));
    }

    #[test]
    fn test_default_threshold_entry_point() {
        let series: Vec<TimeSeriesPoint> = [10.0, 10.0, 10.0, 10.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(format!("2024-01-0{}", i + 1), *v))
            .collect();

        let anomalies = detect_anomalies(&series, analytics::anomaly::DEFAULT_THRESHOLD);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].severity, AnomalySeverity::Warning);
    }

    #[test]
    fn test_offline_explanation_blocking() {
        let series: Vec<TimeSeriesPoint> = [100.0, 100.0, 100.0, 100.0, 10.0]
            .iter()
            .enumerate()
            .map(|(i, v)| TimeSeriesPoint::new(format!("2024-02-0{}", i + 1), *v))
            .collect();
        let anomalies = detect_anomalies(&series, 1.5);
        assert_eq!(anomalies[0].anomaly_type, AnomalyType::Dip);

        let explanation = tokio_test::block_on(Explainer::default().explain(&anomalies[0]));
        assert_eq!(explanation.source, ExplanationSource::Fallback);
        assert!(explanation.text.contains("2024-02-05"));
        assert!(explanation.text.contains("reduced usage"));
    }
}
