//! Typed executor statuses, classification and per-job results

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value as JsonValue};
use std::fmt;
use std::time::Duration;

/// Position of a job within a run (`index` is 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct JobSpec {
    pub index: usize,
    pub total: usize,
}

impl JobSpec {
    pub fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }
}

impl fmt::Display for JobSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.total)
    }
}

/// Why a job got no HTTP status back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The executor's deadline expired
    Timeout,
    /// Connection refused, DNS failure, unparsable output and similar
    Connection(String),
    /// The execution context lacks the tooling to issue the request
    ExecutorUnavailable(String),
    /// The job task itself died
    Aborted(String),
}

impl FailureReason {
    pub fn kind(&self) -> &'static str {
        match self {
            FailureReason::Timeout => "timeout",
            FailureReason::Connection(_) => "connection",
            FailureReason::ExecutorUnavailable(_) => "executor_unavailable",
            FailureReason::Aborted(_) => "aborted",
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            FailureReason::Timeout => None,
            FailureReason::Connection(msg)
            | FailureReason::ExecutorUnavailable(msg)
            | FailureReason::Aborted(msg) => Some(msg),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {}", self.kind(), detail),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// What a remote executor reports for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecStatus {
    Responded(u16),
    Failed(FailureReason),
}

impl ExecStatus {
    /// Three-digit status for reports; failures render as `000`
    pub fn code_label(&self) -> String {
        match self {
            ExecStatus::Responded(code) => format!("{:03}", code),
            ExecStatus::Failed(_) => "000".to_string(),
        }
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            ExecStatus::Responded(code) => Some(*code),
            ExecStatus::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            ExecStatus::Responded(_) => None,
            ExecStatus::Failed(reason) => Some(reason),
        }
    }
}

/// Per-job verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Ok,
    Fail,
    Skip,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::Fail => "FAIL",
            Outcome::Skip => "SKIP",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Map a status to a verdict: only 200 and 201 pass.
pub fn classify(status: &ExecStatus) -> Outcome {
    match status {
        ExecStatus::Responded(200) | ExecStatus::Responded(201) => Outcome::Ok,
        ExecStatus::Responded(_) => Outcome::Fail,
        ExecStatus::Failed(FailureReason::ExecutorUnavailable(_)) => Outcome::Skip,
        ExecStatus::Failed(_) => Outcome::Fail,
    }
}

/// The immutable record of one completed job
#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub spec: JobSpec,
    pub labels: Vec<(String, String)>,
    pub status: ExecStatus,
    pub outcome: Outcome,
    pub latency: Duration,
}

impl JobResult {
    /// Classify `status` and freeze the result
    pub fn new(
        spec: JobSpec,
        labels: Vec<(String, String)>,
        status: ExecStatus,
        latency: Duration,
    ) -> Self {
        let outcome = classify(&status);
        Self {
            spec,
            labels,
            status,
            outcome,
            latency,
        }
    }

    /// `[index/total] OUTCOME key=value ...`
    pub fn report_line(&self) -> String {
        let mut line = format!("[{}] {}", self.spec, self.outcome);
        for (key, value) in &self.labels {
            line.push_str(&format!(" {}={}", key, value));
        }
        line.push_str(&format!(" status={}", self.status.code_label()));
        if let Some(reason) = self.status.failure() {
            line.push_str(&format!(" reason={}", reason.kind()));
        }
        line.push_str(&format!(" latency_ms={}", self.latency.as_millis()));
        line
    }

    /// Same fields as [`report_line`](Self::report_line), as one JSON object
    pub fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        object.insert("index".into(), json!(self.spec.index));
        object.insert("total".into(), json!(self.spec.total));
        object.insert("outcome".into(), json!(self.outcome));
        for (key, value) in &self.labels {
            object.insert(key.clone(), json!(value));
        }
        object.insert("status".into(), json!(self.status.code()));
        if let Some(reason) = self.status.failure() {
            object.insert("reason".into(), json!(reason.kind()));
            if let Some(detail) = reason.detail() {
                object.insert("detail".into(), json!(detail));
            }
        }
        object.insert("latency_ms".into(), json!(self.latency.as_millis() as u64));
        JsonValue::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_200_and_201_pass() {
        assert_eq!(classify(&ExecStatus::Responded(200)), Outcome::Ok);
        assert_eq!(classify(&ExecStatus::Responded(201)), Outcome::Ok);

        for code in [0u16, 100, 202, 204, 301, 400, 401, 404, 409, 500, 503] {
            assert_eq!(
                classify(&ExecStatus::Responded(code)),
                Outcome::Fail,
                "status {} should fail",
                code
            );
        }
    }

    #[test]
    fn test_failures_classify() {
        assert_eq!(
            classify(&ExecStatus::Failed(FailureReason::Timeout)),
            Outcome::Fail
        );
        assert_eq!(
            classify(&ExecStatus::Failed(FailureReason::Connection(
                "refused".into()
            ))),
            Outcome::Fail
        );
        assert_eq!(
            classify(&ExecStatus::Failed(FailureReason::Aborted("panic".into()))),
            Outcome::Fail
        );
        assert_eq!(
            classify(&ExecStatus::Failed(FailureReason::ExecutorUnavailable(
                "no curl".into()
            ))),
            Outcome::Skip
        );
    }

    #[test]
    fn test_report_line_format() {
        let result = JobResult::new(
            JobSpec::new(3, 20),
            vec![
                ("supi".into(), "208950000000045".into()),
                ("sender".into(), "oai-ausf".into()),
                ("target".into(), "UDM".into()),
            ],
            ExecStatus::Responded(201),
            Duration::from_millis(12),
        );

        assert_eq!(
            result.report_line(),
            "[3/20] OK supi=208950000000045 sender=oai-ausf target=UDM status=201 latency_ms=12"
        );
    }

    #[test]
    fn test_failure_renders_sentinel() {
        let result = JobResult::new(
            JobSpec::new(1, 1),
            vec![("sender".into(), "oai-amf".into())],
            ExecStatus::Failed(FailureReason::Timeout),
            Duration::from_secs(5),
        );

        assert_eq!(result.outcome, Outcome::Fail);
        assert!(result.report_line().contains("status=000 reason=timeout"));

        let json = result.to_json();
        assert_eq!(json["outcome"], "FAIL");
        assert_eq!(json["status"], JsonValue::Null);
        assert_eq!(json["reason"], "timeout");
        assert_eq!(json["sender"], "oai-amf");
    }
}
