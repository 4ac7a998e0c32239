//! Time series sources.
//!
//! 日次コスト時系列の取得元。ストレージへの問い合わせは呼び出し側の責務で、
//! 検知器はここから受け取った系列だけを扱う。

use crate::analytics::TimeSeriesPoint;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 日次コスト時系列の取得
#[async_trait]
pub trait TimeSeriesSource: Send + Sync {
    /// Fetch the cost-by-day series, oldest first.
    async fn fetch_daily_costs(&self) -> Result<Vec<TimeSeriesPoint>>;

    /// ソース名（ログ用）
    fn name(&self) -> &str;
}

/// メモリ上の固定系列
#[derive(Debug, Clone, Default)]
pub struct StaticSeriesSource {
    points: Vec<TimeSeriesPoint>,
}

impl StaticSeriesSource {
    pub fn new(points: Vec<TimeSeriesPoint>) -> Self {
        Self { points }
    }
}

#[async_trait]
impl TimeSeriesSource for StaticSeriesSource {
    async fn fetch_daily_costs(&self) -> Result<Vec<TimeSeriesPoint>> {
        Ok(self.points.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// JSONファイルからの系列
///
/// The file holds an array of `{"date": ..., "value": ...}` rows
/// (`total_cost` is accepted in place of `value`).
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TimeSeriesSource for JsonFileSource {
    async fn fetch_daily_costs(&self) -> Result<Vec<TimeSeriesPoint>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::Source(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let mut points = parse_series(&content)?;
        points.sort_by(|a, b| a.date.cmp(&b.date));

        debug!(path = %self.path.display(), points = points.len(), "loaded cost series");
        Ok(points)
    }

    fn name(&self) -> &str {
        "json-file"
    }
}

/// JSON配列を系列として解析
pub fn parse_series(content: &str) -> Result<Vec<TimeSeriesPoint>> {
    Ok(serde_json::from_str(content)?)
}
