//! Alert payloads and their human-readable rendering.

use chrono::{DateTime, Utc};

use crate::alerting::gate::AlertKind;

/// An alert that passed its gate and is ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Failover {
        previous: String,
        current: String,
        /// Triggering log line, already truncated.
        sample: String,
        detected_at: DateTime<Utc>,
    },
    ErrorRate {
        rate: f64,
        threshold: f64,
        window_len: usize,
        error_count: usize,
        /// Most recent raw lines, oldest first, each truncated.
        evidence: Vec<String>,
        detected_at: DateTime<Utc>,
    },
}

impl Alert {
    pub fn kind(&self) -> AlertKind {
        match self {
            Alert::Failover { .. } => AlertKind::Failover,
            Alert::ErrorRate { .. } => AlertKind::ErrorRate,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Alert::Failover { .. } => "🚨 Failover Detected",
            Alert::ErrorRate { .. } => "🚨 High Upstream Error Rate",
        }
    }

    /// Message body in Slack mrkdwn.
    pub fn body(&self) -> String {
        match self {
            Alert::Failover {
                previous,
                current,
                sample,
                detected_at,
            } => format!(
                "🔄 Pool changed from *{previous}* to *{current}*\n\
                 Time: {} UTC\n\
                 ```{sample}```",
                format_time(detected_at)
            ),
            Alert::ErrorRate {
                rate,
                threshold,
                window_len,
                error_count,
                evidence,
                detected_at,
            } => {
                let mut body = format!(
                    "⚠️ High upstream error rate detected\n\
                     Error Rate: *{rate:.2}%* ({error_count}/{window_len} requests)\n\
                     Threshold: {threshold}%\n\
                     Window: {window_len} requests\n\
                     Time: {} UTC",
                    format_time(detected_at)
                );
                if !evidence.is_empty() {
                    body.push_str("\nRecent requests:\n```");
                    body.push_str(&evidence.join("\n"));
                    body.push_str("```");
                }
                body
            }
        }
    }

    /// One-line form for logs.
    pub fn summary(&self) -> String {
        match self {
            Alert::Failover {
                previous, current, ..
            } => format!("failover {previous} -> {current}"),
            Alert::ErrorRate {
                rate,
                window_len,
                error_count,
                ..
            } => format!("error rate {rate:.2}% ({error_count}/{window_len})"),
        }
    }
}

fn format_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Cut `text` to at most `max_chars` characters without splitting a char.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()
    }

    #[test]
    fn test_failover_body() {
        let alert = Alert::Failover {
            previous: "blue".into(),
            current: "green".into(),
            sample: r#"{"status":200,"pool":"green"}"#.into(),
            detected_at: at(),
        };

        assert_eq!(alert.kind(), AlertKind::Failover);
        assert_eq!(alert.title(), "🚨 Failover Detected");
        let body = alert.body();
        assert!(body.contains("*blue* to *green*"));
        assert!(body.contains("Time: 2024-03-09 14:05:00 UTC"));
        assert!(body.ends_with("```{\"status\":200,\"pool\":\"green\"}```"));
    }

    #[test]
    fn test_error_rate_body() {
        let alert = Alert::ErrorRate {
            rate: 12.5,
            threshold: 2.0,
            window_len: 200,
            error_count: 25,
            evidence: vec!["a".into(), "b".into()],
            detected_at: at(),
        };

        let body = alert.body();
        assert!(body.contains("Error Rate: *12.50%* (25/200 requests)"));
        assert!(body.contains("Threshold: 2%"));
        assert!(body.ends_with("```a\nb```"));
        assert_eq!(alert.summary(), "error rate 12.50% (25/200)");
    }

    #[test]
    fn test_error_rate_body_without_evidence() {
        let alert = Alert::ErrorRate {
            rate: 100.0,
            threshold: 2.5,
            window_len: 50,
            error_count: 50,
            evidence: Vec::new(),
            detected_at: at(),
        };
        assert!(!alert.body().contains("```"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("ab", 10), "ab");
        // Multi-byte characters are kept whole.
        assert_eq!(truncate_chars("ééé", 2), "éé");
        assert_eq!(truncate_chars("🔄x", 1), "🔄");
    }
}
