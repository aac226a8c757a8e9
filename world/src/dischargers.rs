//! Registry of discharge sources owned by the world.

use std::collections::BTreeMap;

use discharge_core::{DischargeArc, DischargerId, DischargerRange, Vec2, VesselId};

/// State of a discharge source stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct DischargerState {
    /// Identifier allocated by the world for the source.
    pub(crate) id: DischargerId,
    /// Position of the source, local to its vessel when it has one.
    pub(crate) position: Vec2,
    /// Vessel carrying the source.
    pub(crate) vessel: Option<VesselId>,
    /// Range budget granted to each activation.
    pub(crate) range: DischargerRange,
    /// Arc produced by the most recent activation.
    pub(crate) arc: Option<DischargeArc>,
}

/// Registry that stores discharge sources and manages identifier allocation.
///
/// Registration and removal are explicit so the lifetime of an entry follows
/// the object that owns the source.
#[derive(Debug)]
pub(crate) struct DischargerRegistry {
    entries: BTreeMap<DischargerId, DischargerState>,
    next_discharger_id: DischargerId,
}

impl DischargerRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_discharger_id: DischargerId::new(0),
        }
    }

    /// Stores a new source and returns the identifier allocated to it.
    pub(crate) fn register(
        &mut self,
        position: Vec2,
        vessel: Option<VesselId>,
        range: DischargerRange,
    ) -> DischargerId {
        let id = self.next_discharger_id;
        self.next_discharger_id = DischargerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            DischargerState {
                id,
                position,
                vessel,
                range,
                arc: None,
            },
        );
        id
    }

    /// Removes the source, returning its final state.
    pub(crate) fn remove(&mut self, id: DischargerId) -> Option<DischargerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: DischargerId) -> Option<&DischargerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: DischargerId) -> Option<&mut DischargerState> {
        self.entries.get_mut(&id)
    }

    /// Iterates registered sources in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &DischargerState> {
        self.entries.values()
    }
}
