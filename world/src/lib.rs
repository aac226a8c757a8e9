#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the discharge engine.
//!
//! The world owns every vessel, wall segment and registered discharge source.
//! It is mutated exclusively through [`apply`] and observed through the
//! [`query`] module, which hands out immutable views in world space.

mod dischargers;

use std::collections::BTreeMap;

use discharge_core::{
    Command, Event, Orientation, RejectionReason, Vec2, VesselId, WallId, WorldRect,
};

use crate::dischargers::DischargerRegistry;

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    vessels: BTreeMap<VesselId, VesselState>,
    next_vessel_id: VesselId,
    walls: Vec<WallState>,
    next_wall_id: WallId,
    dischargers: DischargerRegistry,
}

impl World {
    /// Creates an empty world without vessels, walls or discharge sources.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vessels: BTreeMap::new(),
            next_vessel_id: VesselId::new(0),
            walls: Vec::new(),
            next_wall_id: WallId::new(0),
            dischargers: DischargerRegistry::new(),
        }
    }

    fn vessel_offset(&self, vessel: Option<VesselId>) -> Vec2 {
        vessel
            .and_then(|id| self.vessels.get(&id))
            .map_or(Vec2::ZERO, |state| state.position)
    }

    fn knows_vessel(&self, vessel: Option<VesselId>) -> bool {
        vessel.map_or(true, |id| self.vessels.contains_key(&id))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug)]
struct VesselState {
    borders: WorldRect,
    position: Vec2,
}

#[derive(Clone, Copy, Debug)]
struct WallState {
    id: WallId,
    rect: WorldRect,
    orientation: Orientation,
    solid: bool,
    platform: bool,
    vessel: Option<VesselId>,
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnVessel { borders, position } => {
            let vessel = world.next_vessel_id;
            world.next_vessel_id = VesselId::new(vessel.get().wrapping_add(1));
            let _ = world
                .vessels
                .insert(vessel, VesselState { borders, position });
            out_events.push(Event::VesselSpawned { vessel });
        }
        Command::MoveVessel { vessel, position } => match world.vessels.get_mut(&vessel) {
            Some(state) => {
                let from = state.position;
                state.position = position;
                out_events.push(Event::VesselMoved {
                    vessel,
                    from,
                    to: position,
                });
            }
            None => {
                log::debug!("rejected move of unknown vessel {}", vessel.get());
                out_events.push(Event::VesselMoveRejected {
                    vessel,
                    reason: RejectionReason::MissingVessel,
                });
            }
        },
        Command::PlaceWall {
            rect,
            orientation,
            solid,
            platform,
            vessel,
        } => {
            if !world.knows_vessel(vessel) {
                log::debug!("rejected wall placement on unknown vessel {vessel:?}");
                out_events.push(Event::WallPlacementRejected {
                    reason: RejectionReason::MissingVessel,
                });
                return;
            }

            let wall = world.next_wall_id;
            world.next_wall_id = WallId::new(wall.get().wrapping_add(1));
            world.walls.push(WallState {
                id: wall,
                rect,
                orientation,
                solid,
                platform,
                vessel,
            });
            out_events.push(Event::WallPlaced { wall });
        }
        Command::RegisterDischarger {
            position,
            vessel,
            range,
        } => {
            if !world.knows_vessel(vessel) {
                log::debug!("rejected discharger registration on unknown vessel {vessel:?}");
                out_events.push(Event::DischargerRegistrationRejected {
                    reason: RejectionReason::MissingVessel,
                });
                return;
            }

            let discharger = world.dischargers.register(position, vessel, range);
            out_events.push(Event::DischargerRegistered { discharger });
        }
        Command::RemoveDischarger { discharger } => {
            if world.dischargers.remove(discharger).is_some() {
                out_events.push(Event::DischargerRemoved { discharger });
            } else {
                log::debug!("rejected removal of unknown discharger {}", discharger.get());
                out_events.push(Event::DischargerRemovalRejected {
                    discharger,
                    reason: RejectionReason::MissingDischarger,
                });
            }
        }
        Command::ConfigureDischargerRange { discharger, range } => {
            match world.dischargers.get_mut(discharger) {
                Some(state) => {
                    state.range = range;
                    out_events.push(Event::DischargerRangeConfigured { discharger, range });
                }
                None => {
                    log::debug!(
                        "rejected range change for unknown discharger {}",
                        discharger.get()
                    );
                    out_events.push(Event::DischargerConfigurationRejected {
                        discharger,
                        reason: RejectionReason::MissingDischarger,
                    });
                }
            }
        }
        Command::ActivateDischarger { discharger } => {
            let Some(state) = world.dischargers.get(discharger) else {
                log::debug!("rejected activation of unknown discharger {}", discharger.get());
                out_events.push(Event::DischargerActivationRejected {
                    discharger,
                    reason: RejectionReason::MissingDischarger,
                });
                return;
            };

            out_events.push(Event::DischargerActivated {
                discharger,
                source: state.position + world.vessel_offset(state.vessel),
                vessel: state.vessel,
                range: state.range,
            });
        }
        Command::StoreDischarge { discharger, arc } => {
            let Some(state) = world.dischargers.get_mut(discharger) else {
                log::warn!(
                    "discarding arc for unregistered discharger {}",
                    discharger.get()
                );
                return;
            };

            let node_count = arc.len();
            state.arc = Some(arc);
            out_events.push(Event::DischargeStored {
                discharger,
                node_count,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use discharge_core::{
        DischargeArc, DischargerId, DischargerSnapshot, DischargerView, VesselSnapshot,
        VesselView, WallSnapshot, WallView,
    };

    use super::World;

    /// Captures every wall segment with its rectangle expressed in world space.
    #[must_use]
    pub fn wall_view(world: &World) -> WallView {
        let snapshots = world
            .walls
            .iter()
            .map(|wall| WallSnapshot {
                id: wall.id,
                rect: wall.rect.translated(world.vessel_offset(wall.vessel)),
                orientation: wall.orientation,
                solid: wall.solid,
                platform: wall.platform,
                vessel: wall.vessel,
            })
            .collect();
        WallView::from_snapshots(snapshots)
    }

    /// Captures every vessel currently present in the world.
    #[must_use]
    pub fn vessel_view(world: &World) -> VesselView {
        let snapshots = world
            .vessels
            .iter()
            .map(|(id, state)| VesselSnapshot {
                id: *id,
                borders: state.borders,
                position: state.position,
            })
            .collect();
        VesselView::from_snapshots(snapshots)
    }

    /// Captures every registered discharge source with world-space positions.
    #[must_use]
    pub fn discharger_view(world: &World) -> DischargerView {
        let snapshots = world
            .dischargers
            .iter()
            .map(|state| DischargerSnapshot {
                id: state.id,
                position: state.position + world.vessel_offset(state.vessel),
                vessel: state.vessel,
                range: state.range,
            })
            .collect();
        DischargerView::from_snapshots(snapshots)
    }

    /// Arc stored by the most recent activation of `discharger`.
    #[must_use]
    pub fn discharge(world: &World, discharger: DischargerId) -> Option<&DischargeArc> {
        world
            .dischargers
            .get(discharger)
            .and_then(|state| state.arc.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discharge_core::{DischargeArc, DischargerId, DischargerRange};

    fn spawn_vessel(world: &mut World, position: Vec2) -> VesselId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnVessel {
                borders: WorldRect::from_min_max(Vec2::new(-100.0, -50.0), Vec2::new(100.0, 50.0)),
                position,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::VesselSpawned { vessel }] => *vessel,
            other => panic!("unexpected events {other:?}"),
        }
    }

    fn register(world: &mut World, position: Vec2, vessel: Option<VesselId>) -> DischargerId {
        let mut events = Vec::new();
        apply(
            world,
            Command::RegisterDischarger {
                position,
                vessel,
                range: DischargerRange::DEFAULT,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::DischargerRegistered { discharger }] => *discharger,
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn walls_on_vessels_follow_the_vessel_body() {
        let mut world = World::new();
        let vessel = spawn_vessel(&mut world, Vec2::new(1_000.0, 0.0));
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceWall {
                rect: WorldRect::from_min_max(Vec2::new(-10.0, 0.0), Vec2::new(10.0, 4.0)),
                orientation: Orientation::Horizontal,
                solid: true,
                platform: false,
                vessel: Some(vessel),
            },
            &mut events,
        );
        assert_eq!(events, vec![Event::WallPlaced { wall: WallId::new(0) }]);

        let walls = query::wall_view(&world).into_vec();
        assert_eq!(walls[0].rect.left(), 990.0);

        events.clear();
        apply(
            &mut world,
            Command::MoveVessel {
                vessel,
                position: Vec2::new(0.0, 500.0),
            },
            &mut events,
        );
        let walls = query::wall_view(&world).into_vec();
        assert_eq!(walls[0].rect.left(), -10.0);
        assert_eq!(walls[0].rect.bottom(), 500.0);
    }

    #[test]
    fn wall_on_unknown_vessel_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::PlaceWall {
                rect: WorldRect::from_min_max(Vec2::ZERO, Vec2::ONE),
                orientation: Orientation::Vertical,
                solid: true,
                platform: false,
                vessel: Some(VesselId::new(7)),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::WallPlacementRejected {
                reason: RejectionReason::MissingVessel,
            }]
        );
        assert_eq!(query::wall_view(&world).iter().count(), 0);
    }

    #[test]
    fn activation_reports_world_space_source() {
        let mut world = World::new();
        let vessel = spawn_vessel(&mut world, Vec2::new(200.0, -40.0));
        let discharger = register(&mut world, Vec2::new(5.0, 5.0), Some(vessel));
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ActivateDischarger { discharger },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::DischargerActivated {
                discharger,
                source: Vec2::new(205.0, -35.0),
                vessel: Some(vessel),
                range: DischargerRange::DEFAULT,
            }]
        );
    }

    #[test]
    fn activating_unknown_discharger_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ActivateDischarger {
                discharger: DischargerId::new(3),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::DischargerActivationRejected {
                discharger: DischargerId::new(3),
                reason: RejectionReason::MissingDischarger,
            }]
        );
    }

    #[test]
    fn stored_arc_replaces_previous_activation() {
        let mut world = World::new();
        let discharger = register(&mut world, Vec2::ZERO, None);
        let mut events = Vec::new();

        let mut first = DischargeArc::rooted_at(Vec2::ZERO);
        let _ = first.push(Vec2::new(1.0, 0.0), DischargeArc::ROOT);
        apply(
            &mut world,
            Command::StoreDischarge {
                discharger,
                arc: first,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::StoreDischarge {
                discharger,
                arc: DischargeArc::rooted_at(Vec2::ZERO),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::DischargeStored {
                    discharger,
                    node_count: 2,
                },
                Event::DischargeStored {
                    discharger,
                    node_count: 1,
                },
            ]
        );
        assert_eq!(query::discharge(&world, discharger).map(DischargeArc::len), Some(1));
    }

    #[test]
    fn removal_discards_registry_entry_and_arc() {
        let mut world = World::new();
        let discharger = register(&mut world, Vec2::ZERO, None);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StoreDischarge {
                discharger,
                arc: DischargeArc::rooted_at(Vec2::ZERO),
            },
            &mut events,
        );
        events.clear();

        apply(&mut world, Command::RemoveDischarger { discharger }, &mut events);
        apply(&mut world, Command::RemoveDischarger { discharger }, &mut events);

        assert_eq!(
            events,
            vec![
                Event::DischargerRemoved { discharger },
                Event::DischargerRemovalRejected {
                    discharger,
                    reason: RejectionReason::MissingDischarger,
                },
            ]
        );
        assert!(query::discharge(&world, discharger).is_none());
        assert_eq!(query::discharger_view(&world).iter().count(), 0);
    }

    #[test]
    fn range_reconfiguration_applies_to_next_activation() {
        let mut world = World::new();
        let discharger = register(&mut world, Vec2::ZERO, None);
        let range = DischargerRange::new(1_500.0).expect("valid range");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ConfigureDischargerRange { discharger, range },
            &mut events,
        );
        apply(
            &mut world,
            Command::ActivateDischarger { discharger },
            &mut events,
        );

        assert_eq!(
            events.last(),
            Some(&Event::DischargerActivated {
                discharger,
                source: Vec2::ZERO,
                vessel: None,
                range,
            })
        );
    }

    #[test]
    fn reconfiguring_unknown_discharger_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ConfigureDischargerRange {
                discharger: DischargerId::new(5),
                range: DischargerRange::DEFAULT,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::DischargerConfigurationRejected {
                discharger: DischargerId::new(5),
                reason: RejectionReason::MissingDischarger,
            }]
        );
        assert_eq!(query::discharger_view(&world).iter().count(), 0);
    }

    #[test]
    fn storing_for_unknown_discharger_is_silent() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::StoreDischarge {
                discharger: DischargerId::new(9),
                arc: DischargeArc::rooted_at(Vec2::ZERO),
            },
            &mut events,
        );

        assert!(events.is_empty());
    }
}
