//! Fixture loading and management.

use std::path::{Path, PathBuf};

use clistener_core::Arg;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Function being tested (`printf`, `sprintf`, `sscanf`).
    pub function: String,
    /// C standard clause the case exercises.
    pub reference: String,
    /// Input parameters (serialized).
    pub inputs: serde_json::Value,
    /// Expected output, or `error:<message>` for a call that must fail.
    pub expected_output: String,
    /// Conversion mode the case applies to: `strict`, `coerce`, or `both`.
    pub mode: String,
}

/// A collection of fixture cases for a function family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Function family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|source| HarnessError::Fixture {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a single file, or every `*.json` file in a directory in name order.
    pub fn load_all(path: &Path) -> Result<Vec<Self>, HarnessError> {
        if path.is_file() {
            return Ok(vec![Self::from_file(path)?]);
        }
        let mut paths: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();
        if paths.is_empty() {
            return Err(HarnessError::NoFixtures(path.to_path_buf()));
        }
        paths.iter().map(|p| Self::from_file(p)).collect()
    }
}

/// A typed printf argument as written in fixtures: `{"int": 42}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureArg {
    Int(i64),
    Uint(u64),
    Float(f64),
    Char(char),
    Str(String),
    Pointer(usize),
}

impl From<FixtureArg> for Arg {
    fn from(arg: FixtureArg) -> Self {
        match arg {
            FixtureArg::Int(v) => Self::Int(v),
            FixtureArg::Uint(v) => Self::UInt(v),
            FixtureArg::Float(v) => Self::Float(v),
            FixtureArg::Char(c) => Self::Char(c),
            FixtureArg::Str(s) => Self::Str(s),
            FixtureArg::Pointer(p) => Self::Pointer(p),
        }
    }
}

/// Inputs of a `printf`/`sprintf` case.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintInputs {
    pub template: String,
    #[serde(default)]
    pub args: Vec<FixtureArg>,
}

/// Inputs of an `sscanf` case.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanInputs {
    pub input: String,
    pub format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_args_deserialize_tagged() {
        let args: Vec<FixtureArg> =
            serde_json::from_str(r#"[{"int":-1},{"str":"a"},{"float":2.5},{"char":"x"}]"#).unwrap();
        assert_eq!(
            args,
            vec![
                FixtureArg::Int(-1),
                FixtureArg::Str("a".into()),
                FixtureArg::Float(2.5),
                FixtureArg::Char('x'),
            ]
        );
        assert_eq!(Arg::from(args[0].clone()), Arg::Int(-1));
    }

    #[test]
    fn print_inputs_default_to_no_args() {
        let inputs: PrintInputs = serde_json::from_str(r#"{"template":"100% done"}"#).unwrap();
        assert!(inputs.args.is_empty());
    }

    #[test]
    fn set_roundtrips_through_json() {
        let set = FixtureSet {
            version: "v1".into(),
            family: "stdio/printf".into(),
            captured_at: "2026-10-19T00:00:00Z".into(),
            cases: vec![FixtureCase {
                name: "plain".into(),
                function: "sprintf".into(),
                reference: "C11 7.21.6.1".into(),
                inputs: serde_json::json!({"template": "hi"}),
                expected_output: "hi".into(),
                mode: "both".into(),
            }],
        };
        let restored = FixtureSet::from_json(&set.to_json().unwrap()).unwrap();
        assert_eq!(restored.cases.len(), 1);
        assert_eq!(restored.cases[0].reference, "C11 7.21.6.1");
    }

    #[test]
    fn missing_directory_fixtures_is_error() {
        let dir = std::env::temp_dir().join(format!("clistener-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let err = FixtureSet::load_all(&dir).unwrap_err();
        assert!(matches!(err, HarnessError::NoFixtures(_)));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
