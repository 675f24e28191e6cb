//! record.json data structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root structure for record.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordJson {
    pub node: Vec<NodeRecord>,
    /// Contents of the parameter files referenced by `params_files`
    pub file_data: BTreeMap<String, String>,
}

impl RecordJson {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Node record structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub executable: String,
    pub package: String,
    pub name: Option<String>,
    pub namespace: String,
    pub params: Vec<(String, String)>,
    pub params_files: Vec<String>,
    pub args: Option<Vec<String>>,
    pub cmd: Vec<String>,
    pub stdout: String,
    pub stderr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record() {
        let record = RecordJson::new();
        assert_eq!(record.node.len(), 0);
        assert_eq!(record.file_data.len(), 0);
    }

    #[test]
    fn test_serialize_empty() {
        let record = RecordJson::new();
        let json = record.to_json().unwrap();
        assert!(json.contains("\"node\""));
        assert!(json.contains("\"file_data\""));
    }

    #[test]
    fn test_tuple_serialization() {
        let node = NodeRecord {
            executable: "mongo_wrapper_ros.py".to_string(),
            package: "warehouse_ros_mongo".to_string(),
            name: None,
            namespace: "/".to_string(),
            params: vec![
                ("warehouse_port".to_string(), "33829".to_string()),
                ("warehouse_host".to_string(), "localhost".to_string()),
            ],
            params_files: vec![],
            args: None,
            cmd: vec![],
            stdout: "screen".to_string(),
            stderr: "screen".to_string(),
        };

        let json = serde_json::to_string(&node).unwrap();
        // Tuples should serialize as arrays
        assert!(json.contains("[\"warehouse_port\",\"33829\"]"));
        assert!(json.contains("[\"warehouse_host\",\"localhost\"]"));
    }
}
