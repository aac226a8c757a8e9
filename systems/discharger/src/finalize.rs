//! Converts raw node positions into render-ready edge data.

use discharge_core::{DischargeArc, NodeIndex};
use rand::Rng;

use crate::DischargeTuning;

/// Stores the jittered length and direction of every non-root edge.
///
/// One jitter factor is drawn per node in storage order, so a seeded source
/// reproduces identical arcs.
pub(crate) fn finalize<R>(arc: &mut DischargeArc, tuning: &DischargeTuning, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for raw in 1..arc.len() {
        let index = NodeIndex::new(raw as u32);
        let (Some(node), Some(parent)) = (arc.get(index), arc.parent_of(index)) else {
            continue;
        };

        let towards_parent = parent.position - node.position;
        let jitter = if tuning.length_jitter_max > tuning.length_jitter_min {
            rng.gen_range(tuning.length_jitter_min..=tuning.length_jitter_max)
        } else {
            tuning.length_jitter_min
        };
        let length = towards_parent.length() * jitter;
        let angle = towards_parent.y.atan2(towards_parent.x);

        arc.set_edge(index, length, angle);
    }
}
