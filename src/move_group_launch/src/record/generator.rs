//! Command-line and record generation

use crate::{
    error::{AssemblyError, Result},
    file_cache::read_optional,
    plan::{LaunchPlan, ParameterEntry, ProcessDescriptor},
    record::types::{NodeRecord, RecordJson},
};

pub struct CommandGenerator;

impl CommandGenerator {
    pub fn generate_record(plan: &LaunchPlan) -> Result<RecordJson> {
        let mut record = RecordJson::new();

        for process in plan {
            record.node.push(Self::generate_node_record(process));

            for entry in &process.parameters {
                let ParameterEntry::File(path) = entry else {
                    continue;
                };
                let key = path.display().to_string();
                if record.file_data.contains_key(&key) {
                    continue;
                }
                let content = read_optional(path).map_err(|source| AssemblyError::Io {
                    path: path.clone(),
                    source,
                })?;
                match content {
                    Some(content) => {
                        record.file_data.insert(key, content);
                    }
                    None => log::warn!("Parameter file {} does not exist", key),
                }
            }
        }

        Ok(record)
    }

    pub fn generate_node_record(process: &ProcessDescriptor) -> NodeRecord {
        let params: Vec<(String, String)> = process
            .inline_parameters()
            .flat_map(|set| set.flatten())
            .collect();

        NodeRecord {
            executable: process.executable.clone(),
            package: process.package.clone(),
            name: process.name.clone(),
            namespace: "/".to_string(),
            params,
            params_files: Self::params_files(process),
            args: if process.arguments.is_empty() {
                None
            } else {
                Some(process.arguments.clone())
            },
            cmd: Self::generate_node_command(process),
            stdout: process.output.stdout().as_str().to_string(),
            stderr: process.output.stderr().as_str().to_string(),
        }
    }

    /// `ros2 run` invocation equivalent to the descriptor.
    pub fn generate_node_command(process: &ProcessDescriptor) -> Vec<String> {
        let mut cmd = vec![
            "ros2".to_string(),
            "run".to_string(),
            process.package.clone(),
            process.executable.clone(),
        ];

        // 1. Plain arguments
        cmd.extend(process.arguments.iter().cloned());

        let mut ros_args = Vec::new();

        // 2. Node name
        if let Some(name) = &process.name {
            ros_args.push("-r".to_string());
            ros_args.push(format!("__node:={}", name));
        }

        // 3. Parameters, in declaration order
        for entry in &process.parameters {
            match entry {
                ParameterEntry::Inline(set) => {
                    let overrides = set.flatten_overrides();
                    if overrides.len() < set.flatten().len() {
                        log::warn!(
                            "{}: null parameters left off the command line",
                            process.node_name()
                        );
                    }
                    for (name, value) in overrides {
                        ros_args.push("-p".to_string());
                        ros_args.push(format!("{}:={}", name, value));
                    }
                }
                ParameterEntry::File(path) => {
                    ros_args.push("--params-file".to_string());
                    ros_args.push(path.display().to_string());
                }
            }
        }

        if !ros_args.is_empty() {
            cmd.push("--ros-args".to_string());
            cmd.extend(ros_args);
        }

        cmd
    }

    fn params_files(process: &ProcessDescriptor) -> Vec<String> {
        process
            .parameters
            .iter()
            .filter_map(|entry| match entry {
                ParameterEntry::File(path) => Some(path.display().to_string()),
                ParameterEntry::Inline(_) => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterSet;
    use crate::plan::{OutputPolicy, OutputTarget, ProcessRole};
    use std::path::PathBuf;

    #[test]
    fn test_generate_simple_command() {
        let process = ProcessDescriptor::new(
            ProcessRole::StaticTransform,
            "tf2_ros",
            "static_transform_publisher",
        )
        .named("static_transform_publisher")
        .arguments(["0.0", "0.0", "0.0", "0.0", "0.0", "0.0", "world", "base_link"]);

        let cmd = CommandGenerator::generate_node_command(&process);
        assert_eq!(&cmd[..4], &["ros2", "run", "tf2_ros", "static_transform_publisher"]);
        assert_eq!(cmd[10], "world");
        assert_eq!(cmd[11], "base_link");
        assert_eq!(cmd[12], "--ros-args");
        assert!(cmd.contains(&"__node:=static_transform_publisher".to_string()));
    }

    #[test]
    fn test_generate_command_with_params() {
        let process = ProcessDescriptor::new(
            ProcessRole::Warehouse,
            "warehouse_ros_mongo",
            "mongo_wrapper_ros.py",
        )
        .parameters([
            ParameterSet::new().with("warehouse_port", 33829),
            ParameterSet::new().with("warehouse_host", "localhost"),
        ]);

        let cmd = CommandGenerator::generate_node_command(&process);
        assert!(cmd.contains(&"-p".to_string()));
        assert!(cmd.contains(&"warehouse_port:=33829".to_string()));
        assert!(cmd.contains(&"warehouse_host:=localhost".to_string()));
        assert!(!cmd.iter().any(|c| c.starts_with("__node:=")));
    }

    #[test]
    fn test_generate_command_skips_null_params() {
        let process = ProcessDescriptor::new(
            ProcessRole::MoveGroup,
            "moveit_ros_move_group",
            "move_group",
        )
        .parameters([
            ParameterSet::new().with_optional("robot_description_semantic", None::<String>),
            ParameterSet::new().with("publish_planning_scene", true),
        ]);

        let cmd = CommandGenerator::generate_node_command(&process);
        assert!(!cmd.iter().any(|c| c.starts_with("robot_description_semantic")));
        assert!(cmd.contains(&"publish_planning_scene:=true".to_string()));
        assert_eq!(cmd.iter().filter(|c| *c == "-p").count(), 1);

        // The record keeps the parameter so its absence stays visible
        let record = CommandGenerator::generate_node_record(&process);
        assert!(record
            .params
            .iter()
            .any(|(k, v)| k == "robot_description_semantic" && v == "null"));
    }

    #[test]
    fn test_generate_command_without_ros_args() {
        let process = ProcessDescriptor::new(ProcessRole::Visualizer, "rviz2", "rviz2");
        let cmd = CommandGenerator::generate_node_command(&process);
        assert_eq!(cmd, vec!["ros2", "run", "rviz2", "rviz2"]);
    }

    #[test]
    fn test_record_reads_param_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("ur_ros2_control.yaml");
        std::fs::write(&present, "controller_manager:\n  ros__parameters:\n    update_rate: 500\n")
            .unwrap();
        let absent = dir.path().join("missing.yaml");

        let process = ProcessDescriptor::new(
            ProcessRole::ControllerManager,
            "controller_manager",
            "ros2_control_node",
        )
        .output(OutputPolicy::Split {
            stdout: OutputTarget::Screen,
            stderr: OutputTarget::Log,
        })
        .parameter_file(present.clone())
        .parameter_file(PathBuf::from(&absent));

        let record = CommandGenerator::generate_record(&LaunchPlan::new(vec![process])).unwrap();
        assert_eq!(record.node.len(), 1);
        assert_eq!(record.node[0].params_files.len(), 2);
        assert_eq!(record.node[0].stdout, "screen");
        assert_eq!(record.node[0].stderr, "log");
        assert_eq!(record.file_data.len(), 1);
        assert!(record.file_data[&present.display().to_string()].contains("update_rate"));
    }
}
