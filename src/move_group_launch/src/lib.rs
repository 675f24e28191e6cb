//! move_group_launch library
//!
//! Assembles the process list for a MoveIt `move_group` stack on a Universal
//! Robots arm: robot description expansion, parameter sets for planning and
//! trajectory execution, and the processes around them (RViz, transforms,
//! warehouse database, controller manager). The plan is handed to a host
//! orchestrator; nothing here starts processes.

pub mod assembler;
pub mod config;
pub mod error;
mod file_cache;
pub mod params;
pub mod plan;
pub mod record;
pub mod resolver;
pub mod xacro;

pub use assembler::{LaunchAssembler, RobotPaths};
pub use config::AssemblyConfig;
pub use error::{AssemblyError, MacroError, Result};
pub use params::ParameterSet;
pub use plan::{LaunchPlan, OutputPolicy, OutputTarget, ParameterEntry, ProcessDescriptor, ProcessRole};
pub use record::{CommandGenerator, RecordJson};
pub use resolver::{AmentResolver, PackageResolver, StaticResolver};
pub use xacro::{ArgExpander, MacroProcessor, XacroCommand, XacroMappings};

/// Robot model the stock demo launches
pub const DEFAULT_ROBOT: &str = "ur5_e";

