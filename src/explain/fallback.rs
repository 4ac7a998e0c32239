//! Rule-based explanation used when no backend produced text.

use crate::analytics::{Anomaly, AnomalySeverity, AnomalyType};

const SPIKE_CAUSES: &str =
    "Common causes: increased usage, new services, misconfiguration, or unusual traffic patterns.";
const DIP_CAUSES: &str =
    "Common causes: reduced usage, service shutdowns, cost optimizations, or billing adjustments.";

/// Offline explainer. Never fails and performs no I/O.
#[derive(Debug, Clone)]
pub struct RuleBasedExplainer {
    subject: String,
}

impl RuleBasedExplainer {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    pub fn explain(&self, anomaly: &Anomaly) -> String {
        let remark = match anomaly.severity {
            AnomalySeverity::Critical => {
                "This is a highly unusual deviation that warrants immediate investigation."
            }
            AnomalySeverity::Warning => "This is a significant deviation that should be reviewed.",
            AnomalySeverity::Info | AnomalySeverity::Normal => {
                "This is a notable deviation worth monitoring."
            }
        };

        let causes = match anomaly.anomaly_type {
            AnomalyType::Spike => SPIKE_CAUSES,
            AnomalyType::Dip => DIP_CAUSES,
        };

        format!(
            "Detected a {severity} {direction} in {subject} on {date}. \
             The cost was ${value:.2}, which is {percent:.1}% {comparison} than the average of ${mean:.2}. \
             {remark} {causes}",
            severity = anomaly.severity.as_str().to_lowercase(),
            direction = anomaly.anomaly_type.as_str(),
            subject = self.subject,
            date = anomaly.date,
            value = anomaly.value,
            percent = anomaly.deviation_percent.abs(),
            comparison = anomaly.anomaly_type.comparison(),
            mean = anomaly.mean,
            remark = remark,
            causes = causes,
        )
    }
}
