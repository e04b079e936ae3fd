//! Test execution engine.

use std::time::Instant;

use clistener_core::config::{ConversionMode, LineEnding, StdioConfig};
use clistener_core::stdio::{self, Arg, ScanEnd, ScanOutcome, ScanValue};

use crate::diff;
use crate::fixtures::{FixtureCase, FixtureSet, PrintInputs, ScanInputs};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome, StreamKind};
use crate::verify::VerificationResult;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Conversion mode being tested.
    pub mode: ConversionMode,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>, mode: ConversionMode) -> Self {
        Self {
            campaign: campaign.into(),
            mode,
        }
    }

    /// Run all cases of `fixture_set` that apply to this runner's mode.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        self.cases(fixture_set)
            .map(|case| self.verify_case(case))
            .collect()
    }

    /// [`TestRunner::run`], emitting one log entry per case.
    pub fn run_logged(
        &self,
        fixture_set: &FixtureSet,
        log: &mut LogEmitter,
    ) -> std::io::Result<Vec<VerificationResult>> {
        let mut results = Vec::new();
        for case in self.cases(fixture_set) {
            let started = Instant::now();
            let result = self.verify_case(case);
            let latency_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
            let (level, outcome) = if result.passed {
                (LogLevel::Info, Outcome::Pass)
            } else {
                (LogLevel::Error, Outcome::Fail)
            };
            let mut details = serde_json::json!({
                "campaign": self.campaign,
                "family": fixture_set.family,
                "case": case.name,
            });
            if let Some(diff) = &result.diff {
                details["diff"] = serde_json::Value::from(diff.as_str());
            }
            let entry = LogEntry::new("", level, "fixture_case")
                .with_stream(StreamKind::Conformance)
                .with_mode(self.mode.as_str())
                .with_symbol(&case.function)
                .with_outcome(outcome)
                .with_latency_ns(latency_ns)
                .with_details(details);
            log.emit_entry(entry)?;
            results.push(result);
        }
        Ok(results)
    }

    fn cases<'s>(&self, fixture_set: &'s FixtureSet) -> impl Iterator<Item = &'s FixtureCase> {
        let mode = self.mode;
        fixture_set
            .cases
            .iter()
            .filter(move |case| mode_matches(mode, &case.mode))
    }

    fn verify_case(&self, case: &FixtureCase) -> VerificationResult {
        let config = StdioConfig::new(self.mode, LineEnding::Lf);
        let actual = execute_case(case, &config);
        let passed = actual == case.expected_output;
        VerificationResult {
            case_name: case.name.clone(),
            reference: case.reference.clone(),
            mode: self.mode.as_str().to_string(),
            passed,
            expected: case.expected_output.clone(),
            diff: (!passed).then(|| diff::render_diff(&case.expected_output, &actual)),
            actual,
        }
    }
}

fn mode_matches(active: ConversionMode, case_mode: &str) -> bool {
    let case = case_mode.to_ascii_lowercase();
    case == active.as_str() || case == "both"
}

/// Run one case and render what it produced. Failures render as
/// `error:<message>` so they compare like any other output.
fn execute_case(case: &FixtureCase, config: &StdioConfig) -> String {
    match case.function.as_str() {
        "printf" | "sprintf" => {
            let inputs: PrintInputs = match serde_json::from_value(case.inputs.clone()) {
                Ok(inputs) => inputs,
                Err(err) => return format!("bad-inputs:{err}"),
            };
            let args: Vec<Arg> = inputs.args.into_iter().map(Arg::from).collect();
            if case.function == "printf" {
                let mut out = Vec::new();
                match stdio::fprintf_with(&mut out, &inputs.template, &args, config) {
                    Ok(()) => String::from_utf8_lossy(&out).into_owned(),
                    Err(err) => format!("error:{err}"),
                }
            } else {
                stdio::sprintf_with(&inputs.template, &args, config)
                    .unwrap_or_else(|err| format!("error:{err}"))
            }
        }
        "sscanf" => {
            let inputs: ScanInputs = match serde_json::from_value(case.inputs.clone()) {
                Ok(inputs) => inputs,
                Err(err) => return format!("bad-inputs:{err}"),
            };
            match stdio::sscanf_values(&inputs.input, &inputs.format) {
                Ok(outcome) => render_outcome(&outcome),
                Err(err) => format!("error:{err}"),
            }
        }
        other => format!("unsupported:{other}"),
    }
}

/// Canonical text form of a scan: the C return value, then the values.
///
/// `2 [int:12, string:abc]`
#[must_use]
pub fn render_outcome(outcome: &ScanOutcome) -> String {
    let values: Vec<String> = outcome
        .values
        .iter()
        .map(|value| {
            let text = match value {
                ScanValue::Int(v) => v.to_string(),
                ScanValue::UInt(v) => v.to_string(),
                ScanValue::Float(v) => format!("{v:?}"),
                ScanValue::Str(s) => s.clone(),
                ScanValue::Chars(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                ScanValue::Count(n) => n.to_string(),
            };
            format!("{}:{text}", value.kind())
        })
        .collect();
    format!("{} [{}]", outcome.c_return(), values.join(", "))
}

/// JSON form of a scan, for tooling.
#[must_use]
pub fn outcome_json(outcome: &ScanOutcome) -> serde_json::Value {
    let values: Vec<serde_json::Value> = outcome
        .values
        .iter()
        .map(|value| {
            let v = match value {
                ScanValue::Int(v) => serde_json::Value::from(*v),
                ScanValue::UInt(v) => serde_json::Value::from(*v),
                // Non-finite floats have no JSON number form.
                ScanValue::Float(v) if v.is_finite() => serde_json::Value::from(*v),
                ScanValue::Float(v) => serde_json::Value::from(format!("{v:?}")),
                ScanValue::Str(s) => serde_json::Value::from(s.as_str()),
                ScanValue::Chars(bytes) => {
                    serde_json::Value::from(String::from_utf8_lossy(bytes).into_owned())
                }
                ScanValue::Count(n) => serde_json::Value::from(*n),
            };
            serde_json::json!({ "kind": value.kind(), "value": v })
        })
        .collect();
    let end = match outcome.end {
        ScanEnd::Completed => serde_json::json!("completed"),
        ScanEnd::InputFailure => serde_json::json!("input_failure"),
        ScanEnd::MatchingFailure { offset } => {
            serde_json::json!({ "matching_failure": { "offset": offset } })
        }
    };
    serde_json::json!({
        "return": outcome.c_return(),
        "assigned": outcome.assigned,
        "consumed": outcome.consumed,
        "end": end,
        "values": values,
    })
}
