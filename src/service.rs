//! Anomaly workflow.
//!
//! 時系列の取得 → 異常検知 → 上位N件の説明生成 を一括で行う。

use crate::analytics::{Anomaly, AnomalyDetector};
use crate::error::{Error, Result};
use crate::explain::{Explainer, Explanation};
use crate::source::TimeSeriesSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// 1回の実行で説明を生成する最大件数
pub const DEFAULT_EXPLAIN_LIMIT: usize = 5;

/// 説明付きの異常
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedAnomaly {
    #[serde(flatten)]
    pub anomaly: Anomaly,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
}

impl From<Anomaly> for AnnotatedAnomaly {
    fn from(anomaly: Anomaly) -> Self {
        Self {
            anomaly,
            explanation: None,
        }
    }
}

/// 検知結果レポート
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub generated_at: DateTime<Utc>,
    pub threshold: f64,
    pub point_count: usize,
    pub anomalies: Vec<AnnotatedAnomaly>,
}

impl AnomalyReport {
    /// 説明が付いた件数
    pub fn explained_count(&self) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.explanation.is_some())
            .count()
    }
}

/// 異常検知サービス
pub struct AnomalyService {
    source: Arc<dyn TimeSeriesSource>,
    detector: AnomalyDetector,
    explainer: Arc<Explainer>,
    explain_limit: usize,
}

impl AnomalyService {
    pub fn new(
        source: Arc<dyn TimeSeriesSource>,
        detector: AnomalyDetector,
        explainer: Arc<Explainer>,
    ) -> Self {
        Self {
            source,
            detector,
            explainer,
            explain_limit: DEFAULT_EXPLAIN_LIMIT,
        }
    }

    /// 説明を生成する件数の上限を設定
    pub fn with_explain_limit(mut self, explain_limit: usize) -> Self {
        self.explain_limit = explain_limit;
        self
    }

    pub fn detector(&self) -> &AnomalyDetector {
        &self.detector
    }

    /// 系列を取得して異常を検知（説明なし）
    pub async fn detect(&self) -> Result<AnomalyReport> {
        let (point_count, anomalies) = self.fetch_and_detect().await?;
        Ok(self.report(point_count, anomalies.into_iter().map(Into::into).collect()))
    }

    /// 系列を取得して異常を検知し、重大な上位N件に説明を付与
    ///
    /// The top anomalies are explained concurrently; the rest are returned
    /// unexplained, in ranked order.
    pub async fn detect_with_explanations(&self) -> Result<AnomalyReport> {
        let (point_count, mut anomalies) = self.fetch_and_detect().await?;

        let split = self.explain_limit.min(anomalies.len());
        let remaining = anomalies.split_off(split);
        let explanations = self.explainer.explain_all(&anomalies).await;

        let mut annotated: Vec<AnnotatedAnomaly> = anomalies
            .into_iter()
            .zip(explanations)
            .map(|(anomaly, explanation)| AnnotatedAnomaly {
                anomaly,
                explanation: Some(explanation),
            })
            .collect();
        annotated.extend(remaining.into_iter().map(AnnotatedAnomaly::from));

        let report = self.report(point_count, annotated);
        info!(
            anomalies = report.anomalies.len(),
            explained = report.explained_count(),
            "anomaly report ready"
        );
        Ok(report)
    }

    async fn fetch_and_detect(&self) -> Result<(usize, Vec<Anomaly>)> {
        let threshold = self.detector.threshold();
        if !threshold.is_finite() {
            return Err(Error::InvalidInput(format!(
                "threshold must be finite, got {}",
                threshold
            )));
        }

        let series = self.source.fetch_daily_costs().await?;
        let anomalies = self.detector.detect(&series);

        info!(
            source = self.source.name(),
            points = series.len(),
            anomalies = anomalies.len(),
            threshold,
            "detection run finished"
        );
        Ok((series.len(), anomalies))
    }

    fn report(&self, point_count: usize, anomalies: Vec<AnnotatedAnomaly>) -> AnomalyReport {
        AnomalyReport {
            generated_at: Utc::now(),
            threshold: self.detector.threshold(),
            point_count,
            anomalies,
        }
    }
}
