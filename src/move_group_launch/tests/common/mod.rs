//! Fake install tree with the packages the UR move_group plan reads

#![allow(dead_code)]

use move_group_launch::StaticResolver;
use std::path::PathBuf;
use tempfile::TempDir;

pub const URDF_TEMPLATE: &str = r#"<?xml version="1.0"?>
<robot xmlns:xacro="http://www.ros.org/wiki/xacro" name="$(arg name)">
  <xacro:arg name="name" default="ur"/>
  <xacro:arg name="robot_ip" default="0.0.0.0"/>
  <xacro:arg name="use_ros2_control" default="true"/>
  <link name="base_link"/>
  <ros2_control name="$(arg name)" type="system" enabled="$(arg use_ros2_control)">
    <hardware>
      <param name="robot_ip">$(arg robot_ip)</param>
      <param name="script_filename">$(arg script_filename)</param>
      <param name="joint_limits">$(arg joint_limit_params)</param>
      <param name="safety_limits">$(arg safety_limits)</param>
      <param name="safety_pos_margin">$(arg safety_pos_margin)</param>
      <param name="safety_k_position">$(arg safety_k_position)</param>
    </hardware>
  </ros2_control>
</robot>
"#;

pub const SRDF: &str = r#"<?xml version="1.0"?>
<robot name="ur5e">
  <group name="ur_manipulator">
    <chain base_link="base_link" tip_link="tool0"/>
  </group>
</robot>
"#;

pub const KINEMATICS: &str = r#"ur_manipulator:
  kinematics_solver: kdl_kinematics_plugin/KDLKinematicsPlugin
  kinematics_solver_search_resolution: 0.005
  kinematics_solver_timeout: 0.005
"#;

pub const OMPL_PLANNING: &str = r#"start_state_max_bounds_error: 0.3
planner_configs:
  RRTConnectkConfigDefault:
    type: geometric::RRTConnect
ur_manipulator:
  planner_configs:
    - RRTConnectkConfigDefault
"#;

pub const CONTROLLERS: &str = r#"controller_names:
  - joint_trajectory_controller
joint_trajectory_controller:
  action_ns: follow_joint_trajectory
  type: FollowJointTrajectory
  default: true
"#;

pub const ROS2_CONTROL: &str = r#"controller_manager:
  ros__parameters:
    update_rate: 500
"#;

pub struct Workspace {
    pub dir: TempDir,
    share_name: &'static str,
}

impl Workspace {
    /// Every file of the `ur5_e` plan present
    pub fn complete() -> Self {
        Self::complete_under("share")
    }

    /// Complete tree under a share directory with the given name
    pub fn complete_under(share_name: &'static str) -> Self {
        let ws = Self::empty(share_name);
        ws.write("ur_description/urdf/ur.xacro", URDF_TEMPLATE);
        ws.write("ur_description/config/ur5e/joint_limits.yaml", "joint_limits: {}\n");
        ws.write("ur_description/config/ur5e/default_kinematics.yaml", "kinematics: {}\n");
        ws.write("ur_description/config/ur5e/physical_parameters.yaml", "dh_parameters: {}\n");
        ws.write("ur_description/config/ur5e/visual_parameters.yaml", "mesh_files: {}\n");
        ws.write("ur_robot_driver/resources/ros_control.urscript", "# urscript\n");
        ws.write("ur_robot_driver/resources/rtde_input_recipe.txt", "speed_slider_mask\n");
        ws.write("ur_robot_driver/resources/rtde_output_recipe.txt", "timestamp\n");
        ws.write("ur5_e_moveit_config/config/ur5e.srdf", SRDF);
        ws.write("ur5_e_moveit_config/config/kinematics.yaml", KINEMATICS);
        ws.write("ur5_e_moveit_config/config/ompl_planning.yaml", OMPL_PLANNING);
        ws.write("ur_ros2_control_demos/config/move_group/controllers.yaml", CONTROLLERS);
        ws.write("ur_ros2_control_demos/config/rviz/run_move_group.rviz", "Panels: []\n");
        ws.write("ur_ros2_control_demos/config/ur_ros2_control.yaml", ROS2_CONTROL);
        ws
    }

    /// Package directories exist but hold only the robot description template
    pub fn minimal() -> Self {
        let ws = Self::empty("share");
        ws.write("ur_description/urdf/ur.xacro", URDF_TEMPLATE);
        for package in ["ur_robot_driver", "ur5_e_moveit_config", "ur_ros2_control_demos"] {
            std::fs::create_dir_all(ws.share().join(package)).unwrap();
        }
        ws
    }

    fn empty(share_name: &'static str) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            share_name,
        }
    }

    pub fn share(&self) -> PathBuf {
        self.dir.path().join(self.share_name)
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.share().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn remove(&self, relative: &str) {
        std::fs::remove_file(self.path(relative)).unwrap();
    }

    pub fn resolver(&self) -> StaticResolver {
        StaticResolver::with_share_root(self.share())
    }
}
