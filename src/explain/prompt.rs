//! Prompt construction for anomaly explanations.

use crate::analytics::Anomaly;
use crate::llm::LlmRequest;

/// System instruction sent to every backend.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful financial analyst specializing in cloud cost optimization.";

/// Build the user prompt for one anomaly. Deterministic in its input.
pub fn build_prompt(anomaly: &Anomaly, subject: &str) -> String {
    format!(
        "You are a financial analyst explaining {subject} anomalies. Be concise and actionable.

Anomaly Details:
- Date: {date}
- Actual Cost: ${value:.2}
- Average Cost: ${mean:.2}
- Deviation: {deviation:.1}% {direction}
- Severity: {severity}
- Z-Score: {z:.2}

Provide a 2-3 sentence explanation covering:
1. What this anomaly means
2. Most likely causes
3. Recommended action",
        subject = subject,
        date = anomaly.date,
        value = anomaly.value,
        mean = anomaly.mean,
        deviation = anomaly.deviation_percent,
        direction = anomaly.anomaly_type.comparison(),
        severity = anomaly.severity,
        z = anomaly.z_score,
    )
}

/// Full request (system + user) for one anomaly.
pub fn build_request(anomaly: &Anomaly, subject: &str) -> LlmRequest {
    LlmRequest::with_system(SYSTEM_PROMPT, build_prompt(anomaly, subject))
}
