//! TOML scene description loaded by the command-line adapter.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use discharge_core::{
    Command, DischargerId, DischargerRange, Event, Orientation, Vec2, VesselId, WorldRect,
};
use discharge_world::{self as world, World};
use serde::Deserialize;

/// World layout and discharge sources described by a scene file.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scene {
    #[serde(default)]
    vessels: Vec<SceneVessel>,
    #[serde(default)]
    walls: Vec<SceneWall>,
    #[serde(default)]
    dischargers: Vec<SceneDischarger>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneVessel {
    min: [f32; 2],
    max: [f32; 2],
    #[serde(default)]
    position: [f32; 2],
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneWall {
    min: [f32; 2],
    max: [f32; 2],
    orientation: Orientation,
    #[serde(default = "default_solid")]
    solid: bool,
    #[serde(default)]
    platform: bool,
    vessel: Option<usize>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneDischarger {
    position: [f32; 2],
    vessel: Option<usize>,
    #[serde(default)]
    range: DischargerRange,
}

const fn default_solid() -> bool {
    true
}

impl Scene {
    /// Reads and parses the scene stored at `path`.
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scene file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to load scene file {}", path.display()))
    }

    /// Parses a scene from TOML text.
    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scene toml contents")
    }

    /// Submits the scene to `world`, returning the registered discharge sources
    /// in file order.
    ///
    /// `range_override` replaces the range of every discharger when provided.
    pub(crate) fn populate(
        &self,
        world: &mut World,
        range_override: Option<DischargerRange>,
    ) -> Result<Vec<DischargerId>> {
        let mut vessels = Vec::with_capacity(self.vessels.len());
        for vessel in &self.vessels {
            let events = submit(
                world,
                Command::SpawnVessel {
                    borders: rect(vessel.min, vessel.max),
                    position: point(vessel.position),
                },
            );
            match events.as_slice() {
                [Event::VesselSpawned { vessel }] => vessels.push(*vessel),
                other => bail!("world rejected vessel: {other:?}"),
            }
        }

        for (index, wall) in self.walls.iter().enumerate() {
            let vessel = resolve_vessel(&vessels, wall.vessel)
                .with_context(|| format!("wall #{index} refers to a missing vessel"))?;
            let events = submit(
                world,
                Command::PlaceWall {
                    rect: rect(wall.min, wall.max),
                    orientation: wall.orientation,
                    solid: wall.solid,
                    platform: wall.platform,
                    vessel,
                },
            );
            if !matches!(events.as_slice(), [Event::WallPlaced { .. }]) {
                bail!("world rejected wall #{index}: {events:?}");
            }
        }

        let mut dischargers = Vec::with_capacity(self.dischargers.len());
        for (index, discharger) in self.dischargers.iter().enumerate() {
            let vessel = resolve_vessel(&vessels, discharger.vessel)
                .with_context(|| format!("discharger #{index} refers to a missing vessel"))?;
            let events = submit(
                world,
                Command::RegisterDischarger {
                    position: point(discharger.position),
                    vessel,
                    range: range_override.unwrap_or(discharger.range),
                },
            );
            match events.as_slice() {
                [Event::DischargerRegistered { discharger }] => dischargers.push(*discharger),
                other => bail!("world rejected discharger #{index}: {other:?}"),
            }
        }

        log::debug!(
            "loaded scene with {} vessels, {} walls and {} dischargers",
            vessels.len(),
            self.walls.len(),
            dischargers.len()
        );
        Ok(dischargers)
    }
}

fn submit(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn resolve_vessel(vessels: &[VesselId], index: Option<usize>) -> Result<Option<VesselId>> {
    match index {
        None => Ok(None),
        Some(index) => match vessels.get(index) {
            Some(vessel) => Ok(Some(*vessel)),
            None => bail!("vessel index {index} is out of bounds ({} vessels)", vessels.len()),
        },
    }
}

fn point(value: [f32; 2]) -> Vec2 {
    Vec2::from_array(value)
}

fn rect(min: [f32; 2], max: [f32; 2]) -> WorldRect {
    WorldRect::from_min_max(point(min), point(max))
}
