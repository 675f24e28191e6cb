//! Launch plan assembly for the UR move_group stack

use crate::{
    config::AssemblyConfig,
    error::Result,
    params::{load_text, load_yaml, merge_override, ParameterSet},
    plan::{LaunchPlan, OutputPolicy, OutputTarget, ProcessDescriptor, ProcessRole},
    resolver::PackageResolver,
    xacro::{MacroProcessor, XacroMappings},
};
use serde_yaml::Mapping;
use std::path::{Path, PathBuf};

pub const UR_DESCRIPTION: &str = "ur_description";
pub const UR_ROBOT_DRIVER: &str = "ur_robot_driver";
pub const UR_CONTROL_DEMOS: &str = "ur_ros2_control_demos";

/// Robot model directory name: `ur5_e` is stored under `config/ur5e`.
pub fn config_name(robot_name: &str) -> String {
    robot_name.replace('_', "")
}

/// MoveIt configuration package generated for a robot model.
pub fn moveit_config_package(robot_name: &str) -> String {
    format!("{}_moveit_config", robot_name)
}

/// Every file the plan refers to, resolved against the package share roots.
#[derive(Debug, Clone, PartialEq)]
pub struct RobotPaths {
    pub config_name: String,
    pub moveit_config_package: String,

    pub joint_limits: PathBuf,
    pub kinematics_params: PathBuf,
    pub physical_params: PathBuf,
    pub visual_params: PathBuf,
    pub description_template: PathBuf,

    pub script: PathBuf,
    pub input_recipe: PathBuf,
    pub output_recipe: PathBuf,

    pub semantic_description: PathBuf,
    pub moveit_kinematics: PathBuf,
    pub ompl_planning: PathBuf,

    pub moveit_controllers: PathBuf,
    pub rviz_config: PathBuf,
    pub ros2_control_controllers: PathBuf,
}

impl RobotPaths {
    /// Resolve all paths for `robot_name`. Only package lookup can fail;
    /// the files themselves are not checked.
    pub fn resolve<R: PackageResolver>(resolver: &R, robot_name: &str) -> Result<Self> {
        let config_name = config_name(robot_name);
        let moveit_config_package = moveit_config_package(robot_name);

        let description = resolver.require_share(UR_DESCRIPTION)?;
        let robot_config = description.join("config").join(&config_name);
        let driver = resolver.require_share(UR_ROBOT_DRIVER)?;
        let moveit_config = resolver.require_share(&moveit_config_package)?;
        let demos = resolver.require_share(UR_CONTROL_DEMOS)?;

        Ok(Self {
            joint_limits: robot_config.join("joint_limits.yaml"),
            kinematics_params: robot_config.join("default_kinematics.yaml"),
            physical_params: robot_config.join("physical_parameters.yaml"),
            visual_params: robot_config.join("visual_parameters.yaml"),
            description_template: description.join("urdf").join("ur.xacro"),

            script: driver.join("resources").join("ros_control.urscript"),
            input_recipe: driver.join("resources").join("rtde_input_recipe.txt"),
            output_recipe: driver.join("resources").join("rtde_output_recipe.txt"),

            semantic_description: moveit_config
                .join("config")
                .join(format!("{}.srdf", config_name)),
            moveit_kinematics: moveit_config.join("config").join("kinematics.yaml"),
            ompl_planning: moveit_config.join("config").join("ompl_planning.yaml"),

            moveit_controllers: demos.join("config/move_group/controllers.yaml"),
            rviz_config: demos.join("config/rviz/run_move_group.rviz"),
            ros2_control_controllers: demos.join("config").join("ur_ros2_control.yaml"),

            config_name,
            moveit_config_package,
        })
    }

    /// Named paths in a fixed order, for listing and diagnostics.
    pub fn entries(&self) -> Vec<(&'static str, &Path)> {
        vec![
            ("joint_limits", self.joint_limits.as_path()),
            ("kinematics_params", self.kinematics_params.as_path()),
            ("physical_params", self.physical_params.as_path()),
            ("visual_params", self.visual_params.as_path()),
            ("description_template", self.description_template.as_path()),
            ("script", self.script.as_path()),
            ("input_recipe", self.input_recipe.as_path()),
            ("output_recipe", self.output_recipe.as_path()),
            ("semantic_description", self.semantic_description.as_path()),
            ("moveit_kinematics", self.moveit_kinematics.as_path()),
            ("ompl_planning", self.ompl_planning.as_path()),
            ("moveit_controllers", self.moveit_controllers.as_path()),
            ("rviz_config", self.rviz_config.as_path()),
            ("ros2_control_controllers", self.ros2_control_controllers.as_path()),
        ]
    }
}

/// Builds the launch plan from a package resolver and a macro processor.
pub struct LaunchAssembler<R, M> {
    resolver: R,
    macro_processor: M,
    config: AssemblyConfig,
}

impl<R: PackageResolver, M: MacroProcessor> LaunchAssembler<R, M> {
    pub fn new(resolver: R, macro_processor: M) -> Self {
        Self {
            resolver,
            macro_processor,
            config: AssemblyConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AssemblyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn resolve_paths(&self, robot_name: &str) -> Result<RobotPaths> {
        RobotPaths::resolve(&self.resolver, robot_name)
    }

    /// Assemble the plan. The controller manager is included only when
    /// `use_integrated_control` is set.
    pub fn assemble(&self, robot_name: &str, use_integrated_control: bool) -> Result<LaunchPlan> {
        log::info!(
            "Assembling launch plan for {} (ros2_control: {})",
            robot_name,
            use_integrated_control
        );
        let paths = self.resolve_paths(robot_name)?;

        let robot_description = self.robot_description(&paths)?;

        let semantic = load_text(&paths.semantic_description)?;
        let robot_description_semantic =
            ParameterSet::new().with_optional("robot_description_semantic", semantic);

        let kinematics = load_yaml(&paths.moveit_kinematics)?;
        let robot_description_kinematics =
            ParameterSet::new().with_optional("robot_description_kinematics", kinematics);

        let planning_pipeline = self.planning_pipeline(&paths)?;
        let moveit_controllers = self.moveit_controllers(&paths)?;
        let trajectory_execution = self.trajectory_execution();
        let planning_scene_monitor = self.planning_scene_monitor();

        let move_group = ProcessDescriptor::new(
            ProcessRole::MoveGroup,
            "moveit_ros_move_group",
            "move_group",
        )
        .output(OutputPolicy::All(OutputTarget::Screen))
        .parameters([
            robot_description.clone(),
            robot_description_semantic.clone(),
            robot_description_kinematics.clone(),
            planning_pipeline.clone(),
            trajectory_execution,
            moveit_controllers,
            planning_scene_monitor,
        ])
        .after(ProcessRole::RobotStatePublisher);

        let rviz = ProcessDescriptor::new(ProcessRole::Visualizer, "rviz2", "rviz2")
            .named("rviz2")
            .output(OutputPolicy::All(OutputTarget::Log))
            .arguments(["-d".to_string(), paths.rviz_config.display().to_string()])
            .parameters([
                robot_description.clone(),
                robot_description_semantic,
                planning_pipeline,
                robot_description_kinematics,
            ])
            .after(ProcessRole::MoveGroup);

        let frames = &self.config.frames;
        let static_tf = ProcessDescriptor::new(
            ProcessRole::StaticTransform,
            "tf2_ros",
            "static_transform_publisher",
        )
        .named("static_transform_publisher")
        .output(OutputPolicy::All(OutputTarget::Log))
        .arguments(frames.offset.iter().map(|v| format_float(*v)))
        .arguments([frames.world.clone(), frames.base.clone()]);

        let robot_state_publisher = ProcessDescriptor::new(
            ProcessRole::RobotStatePublisher,
            "robot_state_publisher",
            "robot_state_publisher",
        )
        .named("robot_state_publisher")
        .output(OutputPolicy::All(OutputTarget::Both))
        .parameters([robot_description.clone()]);

        let warehouse = &self.config.warehouse;
        let mongodb_server = ProcessDescriptor::new(
            ProcessRole::Warehouse,
            "warehouse_ros_mongo",
            "mongo_wrapper_ros.py",
        )
        .output(OutputPolicy::All(OutputTarget::Screen))
        .parameters([
            ParameterSet::new().with("warehouse_port", warehouse.port),
            ParameterSet::new().with("warehouse_host", warehouse.host.as_str()),
            ParameterSet::new().with("warehouse_plugin", warehouse.plugin.as_str()),
        ]);

        let mut processes = vec![
            rviz,
            static_tf,
            robot_state_publisher,
            move_group,
            mongodb_server,
        ];

        if use_integrated_control {
            let ros2_control = ProcessDescriptor::new(
                ProcessRole::ControllerManager,
                "controller_manager",
                "ros2_control_node",
            )
            .output(OutputPolicy::Split {
                stdout: OutputTarget::Screen,
                stderr: OutputTarget::Screen,
            })
            .parameters([robot_description])
            .parameter_file(paths.ros2_control_controllers.clone());
            processes.push(ros2_control);
        }

        let plan = LaunchPlan::new(processes);
        log::info!("Launch plan for {}: {} processes", robot_name, plan.len());
        Ok(plan)
    }

    /// Substitution arguments for the robot description template.
    pub fn xacro_mappings(&self, paths: &RobotPaths) -> XacroMappings {
        let safety = &self.config.safety;
        XacroMappings::new()
            .with_path("joint_limit_params", &paths.joint_limits)
            .with_path("kinematics_params", &paths.kinematics_params)
            .with_path("physical_params", &paths.physical_params)
            .with_path("visual_params", &paths.visual_params)
            .with_bool("safety_limits", safety.limits)
            .with("safety_pos_margin", format_float(safety.pos_margin))
            .with("safety_k_position", safety.k_position.to_string())
            .with("name", paths.config_name.as_str())
            .with_bool("use_ros2_control", self.config.use_ros2_control)
            .with_path("script_filename", &paths.script)
            .with_path("input_recipe_filename", &paths.input_recipe)
            .with_path("output_recipe_filename", &paths.output_recipe)
            .with("robot_ip", self.config.robot_ip.as_str())
    }

    fn robot_description(&self, paths: &RobotPaths) -> Result<ParameterSet> {
        let mappings = self.xacro_mappings(paths);
        log::debug!(
            "Expanding {} with {} arguments",
            paths.description_template.display(),
            mappings.len()
        );
        let urdf = self
            .macro_processor
            .process_file(&paths.description_template, &mappings)?;
        Ok(ParameterSet::new().with("robot_description", urdf))
    }

    /// OMPL pipeline defaults with the MoveIt config's `ompl_planning.yaml` on top.
    fn planning_pipeline(&self, paths: &RobotPaths) -> Result<ParameterSet> {
        let planning = &self.config.planning;
        let mut move_group = Mapping::new();
        move_group.insert("planning_plugin".into(), planning.plugin.as_str().into());
        move_group.insert(
            "request_adapters".into(),
            planning.request_adapters.join(" ").into(),
        );
        move_group.insert(
            "start_state_max_bounds_error".into(),
            planning.start_state_max_bounds_error.into(),
        );

        let overrides = load_yaml(&paths.ompl_planning)?;
        merge_override(&mut move_group, overrides.as_ref(), &paths.ompl_planning)?;

        Ok(ParameterSet::new().with("move_group", move_group))
    }

    fn moveit_controllers(&self, paths: &RobotPaths) -> Result<ParameterSet> {
        let controllers = load_yaml(&paths.moveit_controllers)?;
        Ok(ParameterSet::new()
            .with_optional("moveit_simple_controller_manager", controllers)
            .with(
                "moveit_controller_manager",
                self.config.controller_manager_plugin.as_str(),
            ))
    }

    fn trajectory_execution(&self) -> ParameterSet {
        let te = &self.config.trajectory_execution;
        ParameterSet::new()
            .with("moveit_manage_controllers", te.manage_controllers)
            .with(
                "trajectory_execution.allowed_execution_duration_scaling",
                te.allowed_execution_duration_scaling,
            )
            .with(
                "trajectory_execution.allowed_goal_duration_margin",
                te.allowed_goal_duration_margin,
            )
            .with(
                "trajectory_execution.allowed_start_tolerance",
                te.allowed_start_tolerance,
            )
    }

    fn planning_scene_monitor(&self) -> ParameterSet {
        let psm = &self.config.planning_scene_monitor;
        ParameterSet::new()
            .with("publish_planning_scene", psm.publish_planning_scene)
            .with("publish_geometry_updates", psm.publish_geometry_updates)
            .with("publish_state_updates", psm.publish_state_updates)
            .with("publish_transforms_updates", psm.publish_transforms_updates)
    }
}

/// Floats on a command line keep their decimal point (`0.0`, not `0`).
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}
