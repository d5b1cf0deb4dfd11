//! Result sinks and the end-of-run summary

use chrono::{DateTime, Utc};
use nfstress_config::ReportFormat;
use nfstress_core::{JobResult, Outcome};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, warn};

use crate::dispatcher::DispatchOutcome;

/// Receives each result as soon as it is classified
pub trait ResultSink: Send {
    fn record(&mut self, result: &JobResult);

    /// Called once after the last result
    fn finish(&mut self, _summary: &RunSummary) {}
}

impl ResultSink for Vec<JobResult> {
    fn record(&mut self, result: &JobResult) {
        self.push(result.clone());
    }
}

/// Writes one line per job and a summary line
pub struct ConsoleReporter<W: Write + Send> {
    out: W,
    format: ReportFormat,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout(format: ReportFormat) -> Self {
        Self::new(std::io::stdout(), format)
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W, format: ReportFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        // A closed stdout must not stop the run
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!("Failed to write report line: {}", e);
        }
    }
}

impl<W: Write + Send> ResultSink for ConsoleReporter<W> {
    fn record(&mut self, result: &JobResult) {
        let line = match self.format {
            ReportFormat::Text => result.report_line(),
            ReportFormat::Json => {
                let mut value = result.to_json();
                value["ts"] = json!(Utc::now().to_rfc3339());
                value.to_string()
            }
        };
        self.write_line(&line);
    }

    fn finish(&mut self, summary: &RunSummary) {
        let line = match self.format {
            ReportFormat::Text => summary.summary_line(),
            ReportFormat::Json => json!({ "summary": summary }).to_string(),
        };
        self.write_line(&line);
        debug!("Status histogram: {:?}", summary.status_histogram);
    }
}

/// Latency distribution over completed jobs, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct LatencyStats {
    pub min_ms: u64,
    pub avg_ms: u64,
    pub p95_ms: u64,
    pub max_ms: u64,
}

impl LatencyStats {
    pub fn from_latencies(latencies: &[Duration]) -> Option<Self> {
        if latencies.is_empty() {
            return None;
        }
        let mut millis: Vec<u64> = latencies.iter().map(|d| d.as_millis() as u64).collect();
        millis.sort_unstable();

        let n = millis.len();
        // Nearest-rank percentile
        let rank = ((n as f64) * 0.95).ceil() as usize;
        let p95 = millis[rank.clamp(1, n) - 1];
        let sum: u64 = millis.iter().sum();

        Some(Self {
            min_ms: millis[0],
            avg_ms: sum / n as u64,
            p95_ms: p95,
            max_ms: millis[n - 1],
        })
    }
}

/// Aggregate view of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub planned: usize,
    pub total: usize,
    pub ok: usize,
    pub fail: usize,
    pub skip: usize,
    pub cancelled: bool,
    pub elapsed_ms: u64,
    pub throughput_rps: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyStats>,
    /// Count per rendered status code (`000` for failures)
    pub status_histogram: BTreeMap<String, usize>,
}

impl RunSummary {
    pub fn from_outcome(outcome: &DispatchOutcome, started_at: DateTime<Utc>) -> Self {
        let results = &outcome.results;
        let count = |wanted: Outcome| results.iter().filter(|r| r.outcome == wanted).count();

        let mut status_histogram = BTreeMap::new();
        for result in results {
            *status_histogram
                .entry(result.status.code_label())
                .or_insert(0) += 1;
        }

        let latencies: Vec<Duration> = results.iter().map(|r| r.latency).collect();
        let secs = outcome.elapsed.as_secs_f64();
        let throughput_rps = if secs > 0.0 {
            results.len() as f64 / secs
        } else {
            0.0
        };

        Self {
            started_at,
            planned: outcome.planned,
            total: results.len(),
            ok: count(Outcome::Ok),
            fail: count(Outcome::Fail),
            skip: count(Outcome::Skip),
            cancelled: outcome.cancelled,
            elapsed_ms: outcome.elapsed.as_millis() as u64,
            throughput_rps,
            latency: LatencyStats::from_latencies(&latencies),
            status_histogram,
        }
    }

    /// `SUMMARY total=N ok=.. fail=.. skip=.. ...`
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "SUMMARY total={} ok={} fail={} skip={}",
            self.total, self.ok, self.fail, self.skip
        );
        if self.cancelled {
            line.push_str(&format!(" planned={} cancelled=true", self.planned));
        }
        line.push_str(&format!(
            " elapsed_ms={} throughput_rps={:.2}",
            self.elapsed_ms, self.throughput_rps
        ));
        if let Some(latency) = &self.latency {
            line.push_str(&format!(
                " latency_ms_min={} latency_ms_avg={} latency_ms_p95={} latency_ms_max={}",
                latency.min_ms, latency.avg_ms, latency.p95_ms, latency.max_ms
            ));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfstress_core::{ExecStatus, FailureReason, JobSpec};

    fn result(index: usize, status: ExecStatus, latency_ms: u64) -> JobResult {
        JobResult::new(
            JobSpec::new(index, 4),
            vec![("sender".to_string(), "oai-amf".to_string())],
            status,
            Duration::from_millis(latency_ms),
        )
    }

    fn outcome() -> DispatchOutcome {
        DispatchOutcome {
            results: vec![
                result(1, ExecStatus::Responded(200), 10),
                result(2, ExecStatus::Responded(201), 20),
                result(3, ExecStatus::Responded(503), 30),
                result(
                    4,
                    ExecStatus::Failed(FailureReason::ExecutorUnavailable("no curl".into())),
                    40,
                ),
            ],
            planned: 4,
            cancelled: false,
            elapsed: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary::from_outcome(&outcome(), Utc::now());
        assert_eq!(summary.total, 4);
        assert_eq!(summary.ok, 2);
        assert_eq!(summary.fail, 1);
        assert_eq!(summary.skip, 1);
        assert_eq!(summary.ok + summary.fail + summary.skip, summary.total);
        assert!((summary.throughput_rps - 2.0).abs() < f64::EPSILON);
        assert_eq!(summary.status_histogram["000"], 1);
        assert_eq!(summary.status_histogram["503"], 1);

        let line = summary.summary_line();
        assert!(line.starts_with("SUMMARY total=4 ok=2 fail=1 skip=1"));
        assert!(!line.contains("cancelled"));
    }

    #[test]
    fn test_latency_stats() {
        let latencies: Vec<Duration> = (1..=20).map(Duration::from_millis).collect();
        let stats = LatencyStats::from_latencies(&latencies).unwrap();
        assert_eq!(stats.min_ms, 1);
        assert_eq!(stats.max_ms, 20);
        assert_eq!(stats.p95_ms, 19);
        assert_eq!(stats.avg_ms, 10);

        assert!(LatencyStats::from_latencies(&[]).is_none());
    }

    #[test]
    fn test_console_reporter_text() {
        let mut reporter = ConsoleReporter::new(Vec::new(), ReportFormat::Text);
        let outcome = outcome();
        for result in &outcome.results {
            reporter.record(result);
        }
        reporter.finish(&RunSummary::from_outcome(&outcome, Utc::now()));

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("[1/4] OK sender=oai-amf status=200"));
        assert!(lines[3].starts_with("[4/4] SKIP"));
        assert!(lines[4].starts_with("SUMMARY"));
    }

    #[test]
    fn test_console_reporter_json() {
        let mut reporter = ConsoleReporter::new(Vec::new(), ReportFormat::Json);
        let outcome = outcome();
        reporter.record(&outcome.results[2]);
        reporter.finish(&RunSummary::from_outcome(&outcome, Utc::now()));

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["outcome"], "FAIL");
        assert_eq!(lines[0]["status"], 503);
        assert!(lines[0]["ts"].is_string());
        assert_eq!(lines[1]["summary"]["ok"], 2);
    }
}
