//! Launch plan data structures

use crate::{
    error::{AssemblyError, Result},
    params::ParameterSet,
    record::{CommandGenerator, RecordJson},
};
use serde::Serialize;
use std::{collections::HashSet, fmt, path::PathBuf};

/// Which of the fixed processes a descriptor starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessRole {
    Visualizer,
    StaticTransform,
    RobotStatePublisher,
    MoveGroup,
    Warehouse,
    ControllerManager,
}

impl fmt::Display for ProcessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessRole::Visualizer => "visualizer",
            ProcessRole::StaticTransform => "static_transform",
            ProcessRole::RobotStatePublisher => "robot_state_publisher",
            ProcessRole::MoveGroup => "move_group",
            ProcessRole::Warehouse => "warehouse",
            ProcessRole::ControllerManager => "controller_manager",
        };
        f.write_str(name)
    }
}

/// Where a process's output streams go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTarget {
    Screen,
    Log,
    Both,
}

impl OutputTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputTarget::Screen => "screen",
            OutputTarget::Log => "log",
            OutputTarget::Both => "both",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutputPolicy {
    /// Both streams to the same destination
    All(OutputTarget),
    /// Per-stream destinations
    Split {
        stdout: OutputTarget,
        stderr: OutputTarget,
    },
}

impl OutputPolicy {
    pub fn stdout(&self) -> OutputTarget {
        match self {
            OutputPolicy::All(target) => *target,
            OutputPolicy::Split { stdout, .. } => *stdout,
        }
    }

    pub fn stderr(&self) -> OutputTarget {
        match self {
            OutputPolicy::All(target) => *target,
            OutputPolicy::Split { stderr, .. } => *stderr,
        }
    }
}

/// One entry of a process's parameter list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterEntry {
    Inline(ParameterSet),
    /// A ROS 2 parameter file passed by path
    File(PathBuf),
}

/// Declarative description of one external process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessDescriptor {
    pub role: ProcessRole,
    pub package: String,
    pub executable: String,
    pub name: Option<String>,
    pub parameters: Vec<ParameterEntry>,
    pub arguments: Vec<String>,
    pub output: OutputPolicy,
    /// Processes that should be up before this one starts
    pub depends_on: Vec<ProcessRole>,
}

impl ProcessDescriptor {
    pub fn new(role: ProcessRole, package: &str, executable: &str) -> Self {
        Self {
            role,
            package: package.to_string(),
            executable: executable.to_string(),
            name: None,
            parameters: Vec::new(),
            arguments: Vec::new(),
            output: OutputPolicy::All(OutputTarget::Log),
            depends_on: Vec::new(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn output(mut self, output: OutputPolicy) -> Self {
        self.output = output;
        self
    }

    pub fn parameters(mut self, sets: impl IntoIterator<Item = ParameterSet>) -> Self {
        self.parameters
            .extend(sets.into_iter().map(ParameterEntry::Inline));
        self
    }

    pub fn parameter_file(mut self, path: PathBuf) -> Self {
        self.parameters.push(ParameterEntry::File(path));
        self
    }

    pub fn arguments<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn after(mut self, role: ProcessRole) -> Self {
        self.depends_on.push(role);
        self
    }

    /// Node name, defaulting to the executable like `ros2 run` does
    pub fn node_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.executable)
    }

    /// Inline parameter sets, in order
    pub fn inline_parameters(&self) -> impl Iterator<Item = &ParameterSet> {
        self.parameters.iter().filter_map(|p| match p {
            ParameterEntry::Inline(set) => Some(set),
            ParameterEntry::File(_) => None,
        })
    }

    /// Look up a top-level parameter across the inline sets; later sets win.
    pub fn parameter(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.inline_parameters().filter_map(|set| set.get(key)).last()
    }
}

/// Ordered processes produced by one assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaunchPlan {
    pub processes: Vec<ProcessDescriptor>,
}

impl LaunchPlan {
    pub fn new(processes: Vec<ProcessDescriptor>) -> Self {
        Self { processes }
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProcessDescriptor> {
        self.processes.iter()
    }

    pub fn get(&self, role: ProcessRole) -> Option<&ProcessDescriptor> {
        self.processes.iter().find(|p| p.role == role)
    }

    pub fn contains(&self, role: ProcessRole) -> bool {
        self.get(role).is_some()
    }

    pub fn roles(&self) -> Vec<ProcessRole> {
        self.processes.iter().map(|p| p.role).collect()
    }

    /// Startup order honouring `depends_on`, stable with respect to plan order.
    ///
    /// Dependencies on processes that are not part of the plan are ignored.
    pub fn startup_order(&self) -> Result<Vec<&ProcessDescriptor>> {
        let present: HashSet<ProcessRole> = self.processes.iter().map(|p| p.role).collect();
        let mut started: HashSet<ProcessRole> = HashSet::new();
        let mut order = Vec::with_capacity(self.processes.len());

        while order.len() < self.processes.len() {
            let next = self.processes.iter().find(|p| {
                !started.contains(&p.role)
                    && p
                        .depends_on
                        .iter()
                        .filter(|dep| present.contains(*dep))
                        .all(|dep| started.contains(dep))
            });

            match next {
                Some(process) => {
                    started.insert(process.role);
                    order.push(process);
                }
                None => {
                    let blocked: Vec<String> = self
                        .processes
                        .iter()
                        .filter(|p| !started.contains(&p.role))
                        .map(|p| p.role.to_string())
                        .collect();
                    return Err(AssemblyError::DependencyCycle(blocked.join(", ")));
                }
            }
        }

        Ok(order)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Node records for the plan, with referenced parameter files embedded.
    pub fn to_record(&self) -> Result<RecordJson> {
        CommandGenerator::generate_record(self)
    }
}

impl<'a> IntoIterator for &'a LaunchPlan {
    type Item = &'a ProcessDescriptor;
    type IntoIter = std::slice::Iter<'a, ProcessDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.processes.iter()
    }
}
