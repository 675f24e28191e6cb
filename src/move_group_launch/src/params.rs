//! Parameter sets and parameter document loading

use crate::{
    error::{AssemblyError, Result},
    file_cache::read_optional,
};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Ordered mapping of parameter name to value, handed to one process.
///
/// Nested mappings are parameter namespaces: `{"move_group": {"planning_plugin": ..}}`
/// is the parameter `move_group.planning_plugin`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet(Mapping);

impl ParameterSet {
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    /// Builder-style insert. A later insert of the same key replaces the value.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(Value::String(key.to_string()), value.into());
        self
    }

    /// Insert an optional value; `None` is stored as an explicit null.
    pub fn with_optional(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self.with(key, Value::Null),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().filter_map(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Flatten to `(dotted.name, value)` pairs. Null values are kept as `"null"`.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut output = Vec::new();
        flatten_params("", &self.0, true, &mut output);
        output
    }

    /// Flatten to pairs usable as `-p name:=value` overrides.
    ///
    /// A null is not a valid parameter value on the command line, so
    /// null-valued parameters are left out.
    pub fn flatten_overrides(&self) -> Vec<(String, String)> {
        let mut output = Vec::new();
        flatten_params("", &self.0, false, &mut output);
        output
    }
}

impl From<Mapping> for ParameterSet {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

/// Read a text document. `Ok(None)` when the file does not exist.
pub fn load_text(path: &Path) -> Result<Option<String>> {
    let content = read_optional(path).map_err(|source| AssemblyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.is_none() {
        log::debug!("Optional file not found: {}", path.display());
    }
    Ok(content)
}

/// Read and parse a YAML document. `Ok(None)` when the file does not exist
/// or holds no document; a parse failure is an error.
pub fn load_yaml(path: &Path) -> Result<Option<Value>> {
    let Some(content) = load_text(path)? else {
        return Ok(None);
    };

    let value: Value = serde_yaml::from_str(&content).map_err(|source| AssemblyError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Null => Ok(None),
        value => Ok(Some(value)),
    }
}

/// Merge an override document over defaults, key by key.
///
/// Keys in the override replace defaults; defaults the override does not
/// mention are kept. An absent override leaves the defaults untouched.
pub fn merge_override(defaults: &mut Mapping, overrides: Option<&Value>, source: &Path) -> Result<()> {
    match overrides {
        None | Some(Value::Null) => Ok(()),
        Some(Value::Mapping(map)) => {
            for (key, value) in map {
                defaults.insert(key.clone(), value.clone());
            }
            Ok(())
        }
        Some(other) => Err(AssemblyError::InvalidDocument {
            path: PathBuf::from(source),
            found: value_kind(other),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Recursively flatten nested parameter maps
fn flatten_params(prefix: &str, map: &Mapping, keep_null: bool, output: &mut Vec<(String, String)>) {
    for (key, value) in map.iter() {
        let key_str = match key {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        let full_key = if prefix.is_empty() {
            key_str
        } else {
            format!("{}.{}", prefix, key_str)
        };

        match value {
            Value::Mapping(nested_map) => {
                flatten_params(&full_key, nested_map, keep_null, output);
            }
            Value::String(s) => {
                output.push((full_key, s.clone()));
            }
            Value::Number(n) => {
                output.push((full_key, n.to_string()));
            }
            Value::Bool(b) => {
                output.push((full_key, b.to_string()));
            }
            Value::Sequence(seq) => {
                // Arrays get serialized as JSON
                let json_str = serde_json::to_string(seq).unwrap_or_else(|_| format!("{:?}", seq));
                output.push((full_key, json_str));
            }
            Value::Null => {
                if keep_null {
                    output.push((full_key, "null".to_string()));
                }
            }
            Value::Tagged(tagged) => {
                output.push((full_key, format!("{:?}", tagged.value)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_yaml_document() {
        let file = yaml_file(
            r#"
ur_manipulator:
  kinematics_solver: kdl_kinematics_plugin/KDLKinematicsPlugin
  kinematics_solver_timeout: 0.005
"#,
        );

        let value = load_yaml(file.path()).unwrap().unwrap();
        let group = value.get("ur_manipulator").unwrap();
        assert_eq!(
            group.get("kinematics_solver").and_then(Value::as_str),
            Some("kdl_kinematics_plugin/KDLKinematicsPlugin")
        );
    }

    #[test]
    fn test_load_yaml_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_yaml(&dir.path().join("kinematics.yaml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_yaml_empty_is_none() {
        let file = yaml_file("");
        assert!(load_yaml(file.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_yaml_malformed_is_error() {
        let file = yaml_file("planner_configs: [unclosed\n  - : :");
        let err = load_yaml(file.path()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("YAML parsing error"), "unexpected error: {}", msg);
        assert!(msg.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_load_text_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_text(&dir.path().join("ur5e.srdf")).unwrap().is_none());
    }

    #[test]
    fn test_merge_keeps_defaults() {
        let mut defaults = Mapping::new();
        defaults.insert("planning_plugin".into(), "ompl_interface/OMPLPlanner".into());
        defaults.insert("start_state_max_bounds_error".into(), 0.1_f64.into());

        let overrides: Value =
            serde_yaml::from_str("start_state_max_bounds_error: 0.2\nplanner_configs: {}\n").unwrap();
        merge_override(&mut defaults, Some(&overrides), Path::new("ompl_planning.yaml")).unwrap();

        assert_eq!(
            defaults.get("planning_plugin").and_then(Value::as_str),
            Some("ompl_interface/OMPLPlanner")
        );
        assert_eq!(
            defaults.get("start_state_max_bounds_error").and_then(Value::as_f64),
            Some(0.2)
        );
        assert!(defaults.contains_key("planner_configs"));
    }

    #[test]
    fn test_merge_absent_override() {
        let mut defaults = Mapping::new();
        defaults.insert("planning_plugin".into(), "ompl_interface/OMPLPlanner".into());
        merge_override(&mut defaults, None, Path::new("ompl_planning.yaml")).unwrap();
        assert_eq!(defaults.len(), 1);
    }

    #[test]
    fn test_merge_rejects_non_mapping() {
        let mut defaults = Mapping::new();
        let overrides = Value::Sequence(vec![Value::from(1)]);
        let err = merge_override(&mut defaults, Some(&overrides), Path::new("ompl_planning.yaml"))
            .unwrap_err();
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn test_flatten_nested() {
        let mut nested = Mapping::new();
        nested.insert("planning_plugin".into(), "ompl_interface/OMPLPlanner".into());
        nested.insert("start_state_max_bounds_error".into(), 0.1_f64.into());
        let params = ParameterSet::new()
            .with("move_group", nested)
            .with("publish_planning_scene", true)
            .with("joints", vec!["shoulder_pan_joint", "elbow_joint"]);

        let flat = params.flatten();
        assert_eq!(flat.len(), 4);
        assert!(flat.contains(&(
            "move_group.planning_plugin".to_string(),
            "ompl_interface/OMPLPlanner".to_string()
        )));
        assert!(flat.contains(&("publish_planning_scene".to_string(), "true".to_string())));
        assert!(flat.contains(&(
            "joints".to_string(),
            "[\"shoulder_pan_joint\",\"elbow_joint\"]".to_string()
        )));
    }

    #[test]
    fn test_flatten_overrides_skips_null() {
        let mut nested = Mapping::new();
        nested.insert("kinematics_solver".into(), Value::Null);
        nested.insert("kinematics_solver_timeout".into(), 0.005_f64.into());
        let params = ParameterSet::new()
            .with_optional("robot_description_semantic", None::<String>)
            .with("ur_manipulator", nested)
            .with("publish_planning_scene", true);

        assert_eq!(params.flatten().len(), 4);
        assert_eq!(
            params.flatten_overrides(),
            vec![
                ("ur_manipulator.kinematics_solver_timeout".to_string(), "0.005".to_string()),
                ("publish_planning_scene".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_optional_value_is_null() {
        let params = ParameterSet::new().with_optional("robot_description_semantic", None::<String>);
        assert_eq!(params.get("robot_description_semantic"), Some(&Value::Null));
    }
}
