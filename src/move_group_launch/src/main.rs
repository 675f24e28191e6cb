//! move_group_launch CLI

use clap::{Args, Parser, Subcommand, ValueEnum};
use move_group_launch::{
    AmentResolver, ArgExpander, AssemblyConfig, LaunchAssembler, LaunchPlan,
    MacroProcessor, PackageResolver, RobotPaths, StaticResolver, XacroCommand, DEFAULT_ROBOT,
};
use std::{
    path::{Path, PathBuf},
    process,
};

#[derive(Parser)]
#[command(name = "move_group_launch")]
#[command(about = "Launch plan assembler for the UR MoveIt move_group stack", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the launch plan and write it as JSON
    Assemble {
        #[command(flatten)]
        robot: RobotArgs,

        /// Leave out the ros2_control controller manager
        #[arg(long)]
        no_ros2_control: bool,

        /// Site configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// xacro executable used to expand the robot description
        #[arg(long, default_value = "xacro", conflicts_with = "builtin_xacro")]
        xacro_binary: PathBuf,

        /// Expand `$(arg ..)` placeholders in-process instead of running xacro
        #[arg(long)]
        builtin_xacro: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Plan)]
        format: Format,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the configuration files the plan refers to
    Paths {
        #[command(flatten)]
        robot: RobotArgs,
    },
}

#[derive(Args)]
struct RobotArgs {
    /// Robot model, e.g. ur5_e
    #[arg(short, long, default_value = DEFAULT_ROBOT)]
    robot_name: String,

    /// Package share directory override (name=dir), repeatable
    #[arg(short, long = "package", value_parser = parse_package_override)]
    packages: Vec<(String, PathBuf)>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Process descriptors with their parameter sets
    Plan,
    /// Node records with ros2 run command lines
    Record,
}

fn parse_package_override(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, dir)) if !name.is_empty() && !dir.is_empty() => {
            Ok((name.to_string(), PathBuf::from(dir)))
        }
        _ => Err(format!("Invalid package override (expected name=dir): {}", s)),
    }
}

fn build_resolver(packages: Vec<(String, PathBuf)>) -> StaticResolver {
    let mut resolver = StaticResolver::new().with_fallback(AmentResolver::new());
    for (name, dir) in packages {
        log::debug!("Package override: {} -> {}", name, dir.display());
        resolver.insert(name, dir);
    }
    resolver
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Assemble {
            robot,
            no_ros2_control,
            config,
            xacro_binary,
            builtin_xacro,
            format,
            output,
        } => {
            let resolver = build_resolver(robot.packages);
            let plan = if builtin_xacro {
                assemble(resolver, ArgExpander, config.as_deref(), &robot.robot_name, !no_ros2_control)
            } else {
                let xacro = XacroCommand::new(xacro_binary);
                assemble(resolver, xacro, config.as_deref(), &robot.robot_name, !no_ros2_control)
            };
            plan.and_then(|plan| write_plan(&plan, format, output.as_deref()))
        }
        Commands::Paths { robot } => {
            let resolver = build_resolver(robot.packages);
            print_paths(&resolver, &robot.robot_name)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn assemble<R: PackageResolver, M: MacroProcessor>(
    resolver: R,
    macro_processor: M,
    config_path: Option<&Path>,
    robot_name: &str,
    use_ros2_control: bool,
) -> Result<LaunchPlan, Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => {
            log::info!("Loading configuration: {}", path.display());
            AssemblyConfig::from_yaml_file(path)?
        }
        None => AssemblyConfig::default(),
    };

    let assembler = LaunchAssembler::new(resolver, macro_processor).with_config(config);
    let plan = assembler.assemble(robot_name, use_ros2_control)?;

    // Report the startup order a supervisor should follow
    let order = plan.startup_order()?;
    log::debug!(
        "Startup order: {}",
        order
            .iter()
            .map(|p| p.role.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    Ok(plan)
}

fn write_plan(
    plan: &LaunchPlan,
    format: Format,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = match format {
        Format::Plan => plan.to_json()?,
        Format::Record => plan.to_record()?.to_json()?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            log::info!("Wrote launch plan: {}", path.display());
        }
        None => println!("{}", json),
    }

    log::info!(
        "  {} processes: {}",
        plan.len(),
        plan.iter()
            .map(|p| p.role.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}

fn print_paths<R: PackageResolver>(
    resolver: &R,
    robot_name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = RobotPaths::resolve(resolver, robot_name)?;
    for (name, path) in paths.entries() {
        let marker = if path.exists() { "" } else { " (missing)" };
        println!("{}: {}{}", name, path.display(), marker);
    }
    Ok(())
}
