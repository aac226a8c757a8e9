#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that traces branching discharge arcs through wall segments.
//!
//! Each activation narrows the world down to reachable walls, then repeatedly
//! jumps to the nearest wall, splits into one branch per wall end and recurses
//! with whatever range budget is left. The finished tree is finalized with
//! per-edge lengths and angles so presentation never recomputes geometry.

mod builder;
mod candidates;
mod finalize;
mod interpolate;
mod nearest;

use discharge_core::{
    Command, DischargeArc, DischargerRange, Event, Vec2, VesselId, VesselView, WallView,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{builder::BuildContext, candidates::Obstacle};

/// Hard cap on the number of nodes in one arc, shared by every branch.
pub const MAX_NODES: usize = 100;
/// Longest edge allowed before intermediate nodes are inserted.
pub const MAX_NODE_DISTANCE: f32 = 256.0;
/// Divisor applied to wall thickness when charging the range budget for
/// passing through a wall.
pub const PENETRATION_DISCOUNT: f32 = 10.0;

/// Jitter seed used by [`Config::default`].
pub const DEFAULT_RNG_SEED: u64 = 0x6c1f_92d4_0be3_a587;

/// Tuning knobs controlling the shape of generated arcs.
#[derive(Clone, Debug, PartialEq)]
pub struct DischargeTuning {
    /// Node ceiling for a whole arc, root included.
    pub max_nodes: usize,
    /// Step used when subdividing long edges.
    pub max_node_distance: f32,
    /// Larger values make walls cheaper to pass through.
    pub penetration_discount: f32,
    /// Lower bound of the multiplicative jitter applied to edge lengths.
    pub length_jitter_min: f32,
    /// Upper bound of the multiplicative jitter applied to edge lengths.
    pub length_jitter_max: f32,
}

impl Default for DischargeTuning {
    fn default() -> Self {
        Self {
            max_nodes: MAX_NODES,
            max_node_distance: MAX_NODE_DISTANCE,
            penetration_discount: PENETRATION_DISCOUNT,
            length_jitter_min: 1.0,
            length_jitter_max: 1.25,
        }
    }
}

/// Inputs describing a single activation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DischargeRequest {
    /// World-space position the arc starts from.
    pub source: Vec2,
    /// Vessel carrying the source, if any.
    pub vessel: Option<VesselId>,
    /// Range budget available to the arc.
    pub range: DischargerRange,
}

/// Configuration parameters required to construct the discharger system.
#[derive(Clone, Debug)]
pub struct Config {
    tuning: DischargeTuning,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration with default tuning and the provided jitter seed.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            tuning: DischargeTuning::default(),
            rng_seed,
        }
    }

    /// Replaces the tuning used for every arc.
    #[must_use]
    pub fn with_tuning(mut self, tuning: DischargeTuning) -> Self {
        self.tuning = tuning;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_RNG_SEED)
    }
}

/// Discharger system that answers activations with freshly traced arcs.
///
/// Scratch buffers are reused between activations; no state other than the
/// jitter source carries over from one arc to the next.
#[derive(Debug)]
pub struct Discharger {
    tuning: DischargeTuning,
    rng: ChaCha8Rng,
    vessels_in_range: Vec<VesselId>,
    obstacles: Vec<Obstacle>,
}

impl Default for Discharger {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Discharger {
    /// Creates a new discharger system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tuning: config.tuning,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            vessels_in_range: Vec::new(),
            obstacles: Vec::new(),
        }
    }

    /// Returns a mutable reference to the tuning knobs.
    pub fn tuning_mut(&mut self) -> &mut DischargeTuning {
        &mut self.tuning
    }

    /// Emits a `Command::StoreDischarge` for every activation in `events`.
    pub fn handle(
        &mut self,
        events: &[Event],
        walls: &WallView,
        vessels: &VesselView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let Event::DischargerActivated {
                discharger,
                source,
                vessel,
                range,
            } = *event
            else {
                continue;
            };

            let request = DischargeRequest {
                source,
                vessel,
                range,
            };
            let arc = self.discharge(&request, walls, vessels);
            log::debug!(
                "discharger {} produced {} nodes",
                discharger.get(),
                arc.len()
            );
            out.push(Command::StoreDischarge { discharger, arc });
        }
    }

    /// Traces a single arc using the system's own jitter source and buffers.
    pub fn discharge(
        &mut self,
        request: &DischargeRequest,
        walls: &WallView,
        vessels: &VesselView,
    ) -> DischargeArc {
        trace_arc(
            request,
            walls,
            vessels,
            &self.tuning,
            &mut self.vessels_in_range,
            &mut self.obstacles,
            &mut self.rng,
        )
    }
}

/// Traces a single arc for `request` using `rng` for length jitter.
///
/// The result always holds at least the root node at the source and never more
/// than `tuning.max_nodes` nodes.
pub fn discharge<R>(
    request: &DischargeRequest,
    walls: &WallView,
    vessels: &VesselView,
    tuning: &DischargeTuning,
    rng: &mut R,
) -> DischargeArc
where
    R: Rng + ?Sized,
{
    let mut vessels_in_range = Vec::new();
    let mut obstacles = Vec::new();
    trace_arc(
        request,
        walls,
        vessels,
        tuning,
        &mut vessels_in_range,
        &mut obstacles,
        rng,
    )
}

fn trace_arc<R>(
    request: &DischargeRequest,
    walls: &WallView,
    vessels: &VesselView,
    tuning: &DischargeTuning,
    vessels_in_range: &mut Vec<VesselId>,
    obstacles: &mut Vec<Obstacle>,
    rng: &mut R,
) -> DischargeArc
where
    R: Rng + ?Sized,
{
    candidates::vessels_in_range(request, vessels, vessels_in_range);
    candidates::walls_in_range(request, walls, vessels_in_range, obstacles);
    let candidate_count = obstacles.len();

    let mut context = BuildContext::new(request.source, obstacles, tuning);
    context.extend(request.source, DischargeArc::ROOT, request.range.get());
    let mut arc = context.into_arc();
    finalize::finalize(&mut arc, tuning, rng);

    log::trace!(
        "arc from {} struck {} of {} candidate walls",
        request.source,
        candidate_count - obstacles.len(),
        candidate_count
    );
    arc
}
