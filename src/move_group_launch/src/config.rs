//! Site configuration for the launch plan
//!
//! Every value the plan would otherwise hard-code (robot address, safety
//! controller limits, warehouse endpoint, frame names, planner plugins) lives
//! here. All fields are optional in the YAML file; omitted ones keep the
//! defaults of the stock UR5e demo.

use crate::error::{AssemblyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub robot_ip: String,
    /// Passed to the robot description as `use_ros2_control`. Independent of
    /// whether the controller manager process is part of the plan.
    pub use_ros2_control: bool,
    pub safety: SafetyConfig,
    pub warehouse: WarehouseConfig,
    pub frames: FrameConfig,
    pub planning: PlanningConfig,
    pub trajectory_execution: TrajectoryExecutionConfig,
    pub planning_scene_monitor: PlanningSceneMonitorConfig,
    pub controller_manager_plugin: String,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            robot_ip: "10.0.1.186".to_string(),
            use_ros2_control: true,
            safety: SafetyConfig::default(),
            warehouse: WarehouseConfig::default(),
            frames: FrameConfig::default(),
            planning: PlanningConfig::default(),
            trajectory_execution: TrajectoryExecutionConfig::default(),
            planning_scene_monitor: PlanningSceneMonitorConfig::default(),
            controller_manager_plugin:
                "moveit_simple_controller_manager/MoveItSimpleControllerManager".to_string(),
        }
    }
}

impl AssemblyConfig {
    /// Load a configuration file. Missing fields fall back to defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AssemblyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content).map_err(|e| AssemblyError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

/// Safety limits controller settings passed into the robot description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub limits: bool,
    pub pos_margin: f64,
    pub k_position: i64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            limits: false,
            pos_margin: 0.15,
            k_position: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    pub host: String,
    pub port: u16,
    pub plugin: String,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 33829,
            plugin: "warehouse_ros_mongo::MongoDatabaseConnection".to_string(),
        }
    }
}

/// Static transform between the world frame and the robot base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub world: String,
    pub base: String,
    /// x y z yaw pitch roll
    pub offset: [f64; 6],
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            world: "world".to_string(),
            base: "base_link".to_string(),
            offset: [0.0; 6],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    pub plugin: String,
    pub request_adapters: Vec<String>,
    pub start_state_max_bounds_error: f64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            plugin: "ompl_interface/OMPLPlanner".to_string(),
            request_adapters: [
                "AddTimeOptimalParameterization",
                "FixWorkspaceBounds",
                "FixStartStateBounds",
                "FixStartStateCollision",
                "FixStartStatePathConstraints",
            ]
            .iter()
            .map(|a| format!("default_planner_request_adapters/{}", a))
            .collect(),
            start_state_max_bounds_error: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrajectoryExecutionConfig {
    pub manage_controllers: bool,
    pub allowed_execution_duration_scaling: f64,
    pub allowed_goal_duration_margin: f64,
    pub allowed_start_tolerance: f64,
}

impl Default for TrajectoryExecutionConfig {
    fn default() -> Self {
        Self {
            manage_controllers: true,
            allowed_execution_duration_scaling: 1.2,
            allowed_goal_duration_margin: 0.5,
            allowed_start_tolerance: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningSceneMonitorConfig {
    pub publish_planning_scene: bool,
    pub publish_geometry_updates: bool,
    pub publish_state_updates: bool,
    pub publish_transforms_updates: bool,
}

impl Default for PlanningSceneMonitorConfig {
    fn default() -> Self {
        Self {
            publish_planning_scene: true,
            publish_geometry_updates: true,
            publish_state_updates: true,
            publish_transforms_updates: true,
        }
    }
}
