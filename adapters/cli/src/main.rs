#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads a scene, fires every discharger and prints
//! the resulting arcs.

mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use discharge_core::{Command, DischargeArc, DischargerId, DischargerRange, Event};
use discharge_system_discharger::{Config, Discharger, DEFAULT_RNG_SEED};
use discharge_world::{self as world, query, World};
use serde::Serialize;

use crate::scene::Scene;

/// Traces lightning arcs across the walls described by a scene file.
#[derive(Debug, Parser)]
#[command(name = "discharge", version)]
struct Args {
    /// Scene file describing vessels, walls and dischargers.
    #[arg(long, value_name = "PATH")]
    scene: PathBuf,

    /// Seed for the edge length jitter.
    #[arg(long, default_value_t = DEFAULT_RNG_SEED)]
    seed: u64,

    /// Overrides the range of every discharger in the scene.
    #[arg(long, value_name = "RANGE", value_parser = parse_range)]
    range: Option<DischargerRange>,

    /// Prints the arcs as JSON instead of plain text.
    #[arg(long)]
    json: bool,
}

fn parse_range(value: &str) -> Result<DischargerRange, String> {
    let raw: f32 = value
        .trim()
        .parse()
        .map_err(|error| format!("invalid range '{value}': {error}"))?;
    DischargerRange::new(raw).map_err(|error| error.to_string())
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    discharger: DischargerId,
    arc: &'a DischargeArc,
}

/// Entry point for the discharge command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let scene = Scene::from_path(&args.scene)?;
    let mut world = World::new();
    let dischargers = scene.populate(&mut world, args.range)?;
    let mut system = Discharger::new(Config::new(args.seed));

    for &discharger in &dischargers {
        fire(&mut world, &mut system, discharger);
    }

    let reports: Vec<Report<'_>> = dischargers
        .iter()
        .filter_map(|&discharger| {
            query::discharge(&world, discharger).map(|arc| Report { discharger, arc })
        })
        .collect();

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&reports).context("failed to serialise arcs")?;
        println!("{rendered}");
    } else {
        for report in &reports {
            print_arc(report);
        }
    }
    Ok(())
}

fn fire(world: &mut World, system: &mut Discharger, discharger: DischargerId) {
    let mut events = Vec::new();
    world::apply(world, Command::ActivateDischarger { discharger }, &mut events);
    if !events
        .iter()
        .any(|event| matches!(event, Event::DischargerActivated { .. }))
    {
        log::warn!("discharger {} did not activate", discharger.get());
        return;
    }

    let walls = query::wall_view(world);
    let vessels = query::vessel_view(world);
    let mut commands = Vec::new();
    system.handle(&events, &walls, &vessels, &mut commands);

    for command in commands {
        let mut stored = Vec::new();
        world::apply(world, command, &mut stored);
        for event in &stored {
            if let Event::DischargeStored { node_count, .. } = event {
                log::info!("discharger {} stored {node_count} nodes", discharger.get());
            }
        }
    }
}

fn print_arc(report: &Report<'_>) {
    println!(
        "discharger {} ({} nodes)",
        report.discharger.get(),
        report.arc.len()
    );
    for (index, node) in report.arc.iter().enumerate() {
        println!(
            "  {index:>3} parent {:>3} at ({:.2}, {:.2}) length {:.2} angle {:.4}",
            node.parent_index(),
            node.position.x,
            node.position.y,
            node.length,
            node.angle
        );
    }
}
