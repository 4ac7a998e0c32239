//! Anomaly Detection Types
//!
//! 異常検知用の型定義

use serde::{Deserialize, Serialize};
use std::fmt;

/// 時系列データポイント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// 日付（ISO-8601 "YYYY-MM-DD"）
    pub date: String,
    /// 値（日次コスト）
    #[serde(alias = "total_cost")]
    pub value: f64,
}

impl TimeSeriesPoint {
    /// 新しいデータポイントを作成
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

/// 異常の方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnomalyType {
    /// 平均より大きく上振れ
    Spike,
    /// 平均より大きく下振れ
    Dip,
}

impl AnomalyType {
    /// Direction from the sign of a z-score. Zero is a dip.
    pub fn from_z_score(z_score: f64) -> Self {
        if z_score > 0.0 {
            AnomalyType::Spike
        } else {
            AnomalyType::Dip
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::Spike => "spike",
            AnomalyType::Dip => "dip",
        }
    }

    /// "higher" / "lower" relative to the mean
    pub fn comparison(&self) -> &'static str {
        match self {
            AnomalyType::Spike => "higher",
            AnomalyType::Dip => "lower",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyType::Spike => f.pad("SPIKE"),
            AnomalyType::Dip => f.pad("DIP"),
        }
    }
}

/// 重大度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnomalySeverity {
    Critical,
    Warning,
    Info,
    Normal,
}

impl AnomalySeverity {
    /// ソート順位（小さいほど重大）
    pub fn rank(&self) -> u8 {
        match self {
            AnomalySeverity::Critical => 0,
            AnomalySeverity::Warning => 1,
            AnomalySeverity::Info => 2,
            AnomalySeverity::Normal => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalySeverity::Critical => "CRITICAL",
            AnomalySeverity::Warning => "WARNING",
            AnomalySeverity::Info => "INFO",
            AnomalySeverity::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 重大度の境界値（|z| に対して上から順に評価）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    pub critical: f64,
    pub warning: f64,
    pub info: f64,
}

impl SeverityThresholds {
    /// |z| から重大度を分類
    pub fn classify(&self, abs_z_score: f64) -> AnomalySeverity {
        if abs_z_score >= self.critical {
            AnomalySeverity::Critical
        } else if abs_z_score >= self.warning {
            AnomalySeverity::Warning
        } else if abs_z_score >= self.info {
            AnomalySeverity::Info
        } else {
            AnomalySeverity::Normal
        }
    }

    /// 境界値が critical >= warning >= info > 0 を満たすか
    pub fn is_ordered(&self) -> bool {
        self.info > 0.0 && self.warning >= self.info && self.critical >= self.warning
    }
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            critical: 3.0,
            warning: 2.0,
            info: 1.5,
        }
    }
}

/// 検出された異常
///
/// `mean` and `std_dev` are the statistics of the whole series and are
/// identical for every anomaly produced by one detection call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub date: String,
    pub value: f64,
    pub mean: f64,
    pub std_dev: f64,
    /// 符号付きZスコア
    pub z_score: f64,
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub severity: AnomalySeverity,
    /// 平均からの乖離率（%、符号付き）
    pub deviation_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_z_score_is_dip() {
        assert_eq!(AnomalyType::from_z_score(0.0), AnomalyType::Dip);
        assert_eq!(AnomalyType::from_z_score(0.1), AnomalyType::Spike);
        assert_eq!(AnomalyType::from_z_score(-2.0), AnomalyType::Dip);
    }

    #[test]
    fn test_classify_breakpoints() {
        let thresholds = SeverityThresholds::default();
        assert_eq!(thresholds.classify(3.0), AnomalySeverity::Critical);
        assert_eq!(thresholds.classify(2.999), AnomalySeverity::Warning);
        assert_eq!(thresholds.classify(2.0), AnomalySeverity::Warning);
        assert_eq!(thresholds.classify(1.5), AnomalySeverity::Info);
        assert_eq!(thresholds.classify(1.49), AnomalySeverity::Normal);
    }

    #[test]
    fn test_thresholds_ordering() {
        assert!(SeverityThresholds::default().is_ordered());

        let inverted = SeverityThresholds {
            critical: 1.0,
            warning: 2.0,
            info: 1.5,
        };
        assert!(!inverted.is_ordered());
    }

    #[test]
    fn test_point_accepts_total_cost_alias() {
        let point: TimeSeriesPoint =
            serde_json::from_str(r#"{"date": "2024-03-01", "total_cost": 42.5}"#).unwrap();
        assert_eq!(point, TimeSeriesPoint::new("2024-03-01", 42.5));
    }

    #[test]
    fn test_anomaly_wire_shape() {
        let anomaly = Anomaly {
            date: "2024-03-01".to_string(),
            value: 100.0,
            mean: 28.0,
            std_dev: 36.0,
            z_score: 2.0,
            anomaly_type: AnomalyType::Spike,
            severity: AnomalySeverity::Warning,
            deviation_percent: 257.1,
        };

        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["type"], "SPIKE");
        assert_eq!(json["severity"], "WARNING");
        assert!(json.get("stdDev").is_some());
        assert!(json.get("zScore").is_some());
        assert!(json.get("deviationPercent").is_some());
    }
}
