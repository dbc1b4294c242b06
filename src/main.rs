//! rwclump CLI - inspect clump scene binaries from the command line.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use rwclump::{Clump, DanglingPolicy};

/// rwclump - clump scene binary inspection tool
#[derive(Parser)]
#[command(name = "rwclump")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a clump file
    Info {
        /// Path to the clump file
        #[arg(short, long, env = "INPUT_CLUMP")]
        input: PathBuf,

        /// Drop atomics with out-of-range indices instead of failing
        #[arg(long)]
        skip_dangling: bool,
    },

    /// Print the frame hierarchy of a clump file
    Tree {
        /// Path to the clump file
        #[arg(short, long, env = "INPUT_CLUMP")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input, skip_dangling } => cmd_info(&input, skip_dangling),
        Commands::Tree { input } => cmd_tree(&input),
    }
}

fn load(path: &PathBuf, policy: DanglingPolicy) -> Result<Clump> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    rwclump::ClumpLoader::new()
        .dangling_policy(policy)
        .load(&data, |_, _| None)
        .with_context(|| format!("loading {}", path.display()))
}

fn cmd_info(path: &PathBuf, skip_dangling: bool) -> Result<()> {
    let policy = if skip_dangling {
        DanglingPolicy::Skip
    } else {
        DanglingPolicy::Fail
    };
    let clump = load(path, policy)?;

    println!("{}", path.display());
    println!(
        "  {} frames, {} geometries, {} atomics",
        clump.frames().len(),
        clump.geometries().len(),
        clump.atomics().len(),
    );

    for (i, geometry) in clump.geometries().iter().enumerate() {
        println!(
            "  geometry {i}: {} vertices, {} triangles, {} materials{}",
            geometry.vertices.len(),
            geometry.triangles.len(),
            geometry.materials.len(),
            if geometry.bin_mesh.is_some() { ", bin mesh" } else { "" },
        );
        for material in &geometry.materials {
            if let Some(texture) = &material.texture {
                let mask = if texture.mask.is_empty() {
                    String::new()
                } else {
                    format!(" (mask {})", texture.mask)
                };
                println!("    texture {}{mask}", texture.name);
            }
        }
    }

    for part in clump.parts() {
        let name = part.frame.name.as_deref().unwrap_or("<unnamed>");
        println!(
            "  atomic: frame {} ({name}), {} vertices",
            part.frame_index,
            part.geometry.vertices.len(),
        );
    }

    Ok(())
}

fn cmd_tree(path: &PathBuf) -> Result<()> {
    let clump = load(path, DanglingPolicy::Fail)?;
    let frames = clump.frames();

    // Depth per frame; parents always precede children.
    let mut depths = vec![0usize; frames.len()];
    for (i, frame) in frames.iter().enumerate() {
        if let Some(parent) = frame.parent {
            depths[i] = depths[parent] + 1;
        }
    }

    for (i, frame) in frames.iter().enumerate() {
        let name = frame.name.as_deref().unwrap_or("<unnamed>");
        let t = frame.translation;
        println!(
            "{:indent$}[{i}] {name} ({:.3}, {:.3}, {:.3})",
            "",
            t.x,
            t.y,
            t.z,
            indent = depths[i] * 2,
        );
    }

    Ok(())
}
