//! LightIK command line.
//!
//! Provides three modes of operation:
//! - `bones`: List valid root or tip bones of a rig file
//! - `simulate`: Drive a chain toward a target headlessly and print the result
//! - `info`: Print workspace crate versions and default configuration

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::{Parser, Subcommand};
use nalgebra::Point3;

use lightik_chain::{BoneChain, enum_hint, root_candidates, tip_candidates};
use lightik_core::config::LightIkConfig;
use lightik_core::error::{ConfigError, LightIkError};
use lightik_core::traits::SkeletonProvider;
use lightik_core::types::{BoneId, JointLimits, RigId};
use lightik_core::LightIkCorePlugin;
use lightik_ik::{IkRigEntry, IkRigs, LightIkPlugin};
use lightik_rig::{Rig, RigError};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// LightIK bone chain tools.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log solver rebuilds and constraint refreshes.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List bones that can be picked as root (given --tip) or tip (given --root).
    Bones {
        /// Rig TOML file.
        rig: PathBuf,

        /// Current root selection; lists its descendants.
        #[arg(short, long)]
        root: Option<String>,

        /// Current tip selection; lists its ancestors.
        #[arg(short, long)]
        tip: Option<String>,
    },

    /// Solve a chain toward a target for a number of frames.
    Simulate {
        /// Rig TOML file.
        rig: PathBuf,

        /// Root bone of the chain.
        #[arg(short, long)]
        root: String,

        /// Tip bone of the chain.
        #[arg(short, long)]
        tip: String,

        /// Target position in world space.
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        target: Vec<f32>,

        /// Frames to run.
        #[arg(short, long, default_value_t = 30)]
        frames: u32,

        /// Symmetric per-axis joint limit in degrees, applied to every joint.
        #[arg(long)]
        limit: Option<f32>,

        /// Joint stiffness used with --limit.
        #[arg(long, default_value_t = 0.0)]
        stiffness: f32,

        /// LightIK configuration TOML.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print crate information.
    Info,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Rig(#[from] RigError),

    #[error(transparent)]
    LightIk(#[from] LightIkError),

    #[error("unknown bone: {0}")]
    UnknownBone(String),

    #[error("target needs three coordinates, got {0}")]
    Target(usize),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        Self::LightIk(err.into())
    }
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn lookup(rig: &Rig, name: Option<&str>) -> Result<Option<BoneId>, AppError> {
    name.map(|n| rig.find_bone(n).ok_or_else(|| AppError::UnknownBone(n.into())))
        .transpose()
}

fn world_position(rig: &Rig, bone: BoneId) -> Point3<f32> {
    rig.global_transform() * Point3::from(rig.bone_global_pose(bone).translation.vector)
}

fn run_bones(path: &Path, root: Option<&str>, tip: Option<&str>) -> Result<(), AppError> {
    let rig = Rig::from_file(path)?;
    let root = lookup(&rig, root)?;
    let tip = lookup(&rig, tip)?;

    let names = match (root, tip) {
        (Some(_), None) => tip_candidates(&rig, root),
        _ => root_candidates(&rig, tip),
    };
    if let (Some(root), Some(tip)) = (root, tip) {
        match BoneChain::resolve(&rig, Some(root), Some(tip)) {
            Ok(chain) => println!("chain: {} bones, {} joints", chain.len(), chain.joint_count()),
            Err(err) => println!("chain: {err}"),
        }
    }
    println!("{}", enum_hint(&names));
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_simulate(
    path: &Path,
    root: &str,
    tip: &str,
    target: &[f32],
    frames: u32,
    limit: Option<f32>,
    stiffness: f32,
    config: Option<&Path>,
    verbose: bool,
) -> Result<(), AppError> {
    let &[x, y, z] = target else {
        return Err(AppError::Target(target.len()));
    };
    let config = match config {
        Some(path) => LightIkConfig::from_file(path)?,
        None => LightIkConfig::default(),
    };
    let rig = Rig::from_file(path)?;

    // Report why a selection fails before building anything.
    let chain = BoneChain::resolve(
        &rig,
        lookup(&rig, Some(root))?,
        lookup(&rig, Some(tip))?,
    )
    .map_err(LightIkError::from)?;

    let mut entry = IkRigEntry::new(rig, &config);
    entry.select(root, tip);
    if let Some(degrees) = limit {
        let slots = vec![Some(JointLimits::symmetric(degrees, stiffness)); chain.joint_count()];
        entry.modifier.set_constraints(&entry.rig, slots);
    }

    let mut app = App::new();
    app.add_plugins((
        LogPlugin {
            level: if verbose { Level::DEBUG } else { Level::INFO },
            ..default()
        },
        LightIkCorePlugin,
        LightIkPlugin,
    ));
    app.insert_resource(config);
    app.finish();
    app.cleanup();

    let target_entity = app
        .world_mut()
        .spawn(GlobalTransform::from_translation(Vec3::new(x, y, z)))
        .id();
    let id = RigId(0);
    app.world_mut()
        .resource_mut::<IkRigs>()
        .insert(id, entry.with_target(target_entity));

    info!("solving {root} -> {tip} for {frames} frames");
    for _ in 0..frames {
        app.update();
    }

    let rigs = app.world().resource::<IkRigs>();
    let Some(entry) = rigs.get(id) else {
        return Ok(());
    };
    for &bone in chain.bones() {
        let p = world_position(&entry.rig, bone);
        println!(
            "{:<16} ({:.4}, {:.4}, {:.4})",
            entry.rig.bone_name(bone).unwrap_or("?"),
            p.x,
            p.y,
            p.z
        );
    }
    if let Some(tip) = chain.tip() {
        let distance = (world_position(&entry.rig, tip) - Point3::new(x, y, z)).norm();
        println!("\nframes={frames}, distance to target={distance:.5}");
    }
    Ok(())
}

fn run_info() {
    let config = LightIkConfig::default();
    println!("lightik v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  lightik-core   {}", env!("CARGO_PKG_VERSION"));
    println!("  lightik-rig    {}", env!("CARGO_PKG_VERSION"));
    println!("  lightik-chain  {}", env!("CARGO_PKG_VERSION"));
    println!("  lightik-ik     {}", env!("CARGO_PKG_VERSION"));
    println!("  lightik-viz    {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!(
        "solver: max_iterations={}, tolerance={}, min_angle_step={}",
        config.solver.max_iterations, config.solver.tolerance, config.solver.min_angle_step
    );
    println!("edition: 2024");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Bones { rig, root, tip }) => {
            run_bones(&rig, root.as_deref(), tip.as_deref())
        }
        Some(Commands::Simulate {
            rig,
            root,
            tip,
            target,
            frames,
            limit,
            stiffness,
            config,
        }) => run_simulate(
            &rig,
            &root,
            &tip,
            &target,
            frames,
            limit,
            stiffness,
            config.as_deref(),
            cli.verbose,
        ),
        Some(Commands::Info) | None => {
            run_info();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
