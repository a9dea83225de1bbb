use super::{CostData, CostSource, ModelCost, SourceError};
use crate::lifecycle::Lifecycle;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use itertools::Itertools;
use serde::Deserialize;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const DEFAULT_COMMAND: &str = "ccusage";
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Reads the daily report produced by the `ccusage` command line tool.
///
/// The default command runs through `npx`. Results are cached for
/// `cache_time` so that frequent refreshes don't spawn a process every time.
#[derive(Debug)]
pub struct CcusageSource {
    lifecycle: Lifecycle,
    program: String,
    args: Vec<String>,
    timeout: Duration,
    cache_time: Duration,
    cached: Option<(Instant, Option<CostData>)>,
}

impl CcusageSource {
    pub const NAME: &'static str = "ccusage";

    pub fn new(command: &str, timeout: Duration, cache_time: Duration) -> Self {
        let (program, mut args) = match command {
            DEFAULT_COMMAND => ("npx".to_string(), vec![DEFAULT_COMMAND.to_string()]),
            other => (other.to_string(), Vec::new()),
        };
        args.extend(["daily".to_string(), "--json".to_string()]);
        Self::with_invocation(program, args, timeout, cache_time)
    }

    fn with_invocation(program: String, args: Vec<String>, timeout: Duration, cache_time: Duration) -> Self {
        Self { lifecycle: Lifecycle::new(Self::NAME), program, args, timeout, cache_time, cached: None }
    }

    /// The full command line that gets executed.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program).chain(&self.args).join(" ")
    }

    /// When the cached value was fetched, if there is one.
    pub fn last_updated(&self) -> Option<Instant> {
        self.cached.as_ref().map(|(fetched_at, _)| *fetched_at)
    }

    fn run(&self) -> Result<Vec<u8>, SourceError> {
        let command = self.command_line();
        debug!(command, "running ccusage");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SourceError::Spawn { command: command.clone(), source })?;

        // drain both pipes so a large report can't block the child
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout = thread::spawn(move || drain(stdout));
        let stderr = thread::spawn(move || drain(stderr));

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SourceError::Timeout { command, timeout: self.timeout });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SourceError::Wait { command, source });
                }
            }
        };
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            return Err(SourceError::Failed { command, status, stderr });
        }
        Ok(stdout)
    }
}

impl CostSource for CcusageSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn initialize(&mut self) {
        info!(command = self.command_line(), "using ccusage source");
        self.lifecycle.initialize();
    }

    fn shutdown(&mut self) {
        self.cached = None;
        self.lifecycle.shutdown();
    }

    fn is_ready(&self) -> bool {
        self.lifecycle.is_ready()
    }

    fn fetch(&mut self) -> Result<Option<CostData>, SourceError> {
        self.lifecycle.ensure_ready()?;
        if let Some((fetched_at, data)) = &self.cached {
            if fetched_at.elapsed() < self.cache_time {
                debug!("using cached ccusage data");
                return Ok(data.clone());
            }
        }
        let output = self.run()?;
        let data = parse_report(&output)?;
        self.cached = Some((Instant::now(), data.clone()));
        Ok(data)
    }
}

fn drain<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buffer);
    }
    buffer
}

#[derive(Deserialize)]
struct Report {
    #[serde(default)]
    daily: Vec<DailyEntry>,
    totals: Totals,
}

#[derive(Deserialize)]
struct DailyEntry {
    date: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Totals {
    total_cost: f64,
    #[serde(default)]
    model_breakdowns: Vec<ModelBreakdown>,
}

#[derive(Deserialize)]
struct ModelBreakdown {
    model: String,
    cost: f64,
}

/// Parse a daily report. The cost is dated by the last day in the report, or
/// now when there is no usable day.
fn parse_report(output: &[u8]) -> Result<Option<CostData>, SourceError> {
    let report: Report = serde_json::from_slice(output)?;
    let observed_at = report.daily.last().and_then(|day| parse_day(&day.date)).unwrap_or_else(Local::now);
    let breakdown = report
        .totals
        .model_breakdowns
        .into_iter()
        .map(|breakdown| ModelCost { model: breakdown.model, cost: breakdown.cost })
        .collect();
    Ok(Some(CostData { total_value: report.totals.total_cost, currency: "USD".into(), observed_at, breakdown }))
}

fn parse_day(date: &str) -> Option<DateTime<Local>> {
    let midnight = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0)?;
    Local.from_local_datetime(&midnight).earliest()
}
