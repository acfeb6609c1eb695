//! Core configuration types
//!
//! This module defines the data structures that represent a tasks.json file.
//! Fields that the file format allows in several shapes (`dependsOn`, `group`)
//! are normalised here, while deserializing, so nothing downstream has to look
//! at the raw JSON shape again.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Top-level tasks file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TasksFile {
    /// Schema version (e.g. "2.0.0")
    #[serde(default)]
    pub version: Option<String>,

    /// Tasks in declaration order
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

/// A task definition as written in the file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    /// Unique task label
    #[serde(default)]
    pub label: String,

    /// Task type ("shell", "process", "npm", "typescript")
    #[serde(rename = "type", default)]
    pub task_type: String,

    /// Command to run (shell/process)
    #[serde(default)]
    pub command: String,

    /// Arguments appended to the command
    #[serde(default)]
    pub args: Vec<String>,

    /// Group membership, normalised from either `"build"` or `{ "kind": "build", "isDefault": true }`
    #[serde(default, deserialize_with = "deserialize_group")]
    pub group: Option<GroupConfig>,

    /// Problem matcher (not interpreted)
    #[serde(default)]
    pub problem_matcher: Option<Value>,

    /// Execution options
    #[serde(default)]
    pub options: Option<OptionsConfig>,

    /// Dependencies, normalised from a single label or a list of labels
    #[serde(default, deserialize_with = "deserialize_depends_on")]
    pub depends_on: Vec<String>,

    /// "sequence" or "parallel"
    #[serde(default)]
    pub depends_order: Option<String>,

    /// Presentation settings (not interpreted)
    #[serde(default)]
    pub presentation: Option<Value>,

    /// Run options (not interpreted)
    #[serde(default)]
    pub run_options: Option<Value>,

    /// Human readable description
    #[serde(default)]
    pub detail: Option<String>,

    /// npm script name
    #[serde(default)]
    pub script: Option<String>,

    /// Directory containing package.json (npm)
    #[serde(default)]
    pub path: Option<String>,

    /// tsconfig file (typescript)
    #[serde(default)]
    pub tsconfig: Option<String>,

    /// Compiler option, "watch" or a raw flag (typescript)
    #[serde(default)]
    pub option: Option<String>,
}

/// Normalised group declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConfig {
    /// Group kind ("build", "test", ...); empty when the object form omits it
    #[serde(default)]
    pub kind: String,

    /// Whether this is the default task of its group
    #[serde(default)]
    pub is_default: bool,
}

/// Task options block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsConfig {
    /// Working directory
    #[serde(default)]
    pub cwd: Option<String>,

    /// Extra environment variables
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Shell override
    #[serde(default)]
    pub shell: Option<ShellConfig>,
}

/// Shell override for shell tasks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShellConfig {
    /// Shell executable
    #[serde(default)]
    pub executable: Option<String>,

    /// Arguments placed before the command line
    #[serde(default)]
    pub args: Vec<String>,
}

/// Custom deserializer for dependsOn that handles a single label or an array
///
/// Array entries may be labels or `{ "task": "label" }` objects; anything else
/// in the array is ignored.
fn deserialize_depends_on<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(label) => Ok(vec![label]),
        Value::Array(items) => Ok(items.into_iter().filter_map(depends_on_entry).collect()),
        Value::Object(_) => Ok(depends_on_entry(value).into_iter().collect()),
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("dependsOn must be a string or array")),
    }
}

fn depends_on_entry(value: Value) -> Option<String> {
    match value {
        Value::String(label) => Some(label),
        Value::Object(mut map) => match map.remove("task") {
            Some(Value::String(label)) => Some(label),
            _ => None,
        },
        _ => None,
    }
}

/// Custom deserializer for group that handles both the string and object forms
fn deserialize_group<'de, D>(deserializer: D) -> Result<Option<GroupConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(kind) => Ok(Some(GroupConfig {
            kind,
            is_default: false,
        })),
        Value::Object(map) => {
            let kind = map
                .get("kind")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let is_default = map
                .get("isDefault")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            Ok(Some(GroupConfig { kind, is_default }))
        }
        Value::Null => Ok(None),
        _ => Err(D::Error::custom("group must be a string or object")),
    }
}
