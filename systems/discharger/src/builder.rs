//! Recursive construction of the branching discharge tree.

use discharge_core::{DischargeArc, NodeIndex, Vec2};

use crate::{
    candidates::Obstacle, interpolate::intermediate_points, nearest::nearest_within,
    DischargeTuning,
};

/// Mutable state shared by every branch of one discharge.
///
/// Branches compete for the same obstacle pool and node allowance; the first
/// branch is explored fully before its sibling starts.
pub(crate) struct BuildContext<'a> {
    arc: DischargeArc,
    obstacles: &'a mut Vec<Obstacle>,
    tuning: &'a DischargeTuning,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(
        source: Vec2,
        obstacles: &'a mut Vec<Obstacle>,
        tuning: &'a DischargeTuning,
    ) -> Self {
        Self {
            arc: DischargeArc::rooted_at(source),
            obstacles,
            tuning,
        }
    }

    pub(crate) fn into_arc(self) -> DischargeArc {
        self.arc
    }

    fn is_full(&self) -> bool {
        self.arc.len() >= self.tuning.max_nodes
    }

    /// Grows the tree from `position` while budget and node allowance last.
    pub(crate) fn extend(&mut self, position: Vec2, parent: NodeIndex, budget: f32) {
        if budget <= 0.0 || self.is_full() {
            return;
        }

        let Some(nearest) = nearest_within(position, self.obstacles.as_slice(), budget) else {
            log::trace!("branch at {position} found no obstacle within {budget}");
            return;
        };

        let budget = budget - nearest.distance;
        let obstacle = self.obstacles.remove(nearest.index);
        let target = obstacle.attach_point(position);
        log::trace!(
            "branch at {position} struck wall {} at {target}",
            obstacle.wall.get()
        );

        let Some(attach) = self.chain(position, target, parent) else {
            return;
        };

        let budget = budget - obstacle.thickness * 0.5 / self.tuning.penetration_discount;

        for end in obstacle.ends() {
            let Some(end_node) = self.chain(target, end, attach) else {
                return;
            };
            self.extend(end, end_node, budget);
        }
    }

    /// Appends interpolated nodes from `from` to `to` followed by a node at `to`.
    ///
    /// Returns the index of the node at `to`, or `None` once the node
    /// allowance runs out.
    fn chain(&mut self, from: Vec2, to: Vec2, parent: NodeIndex) -> Option<NodeIndex> {
        let mut parent = parent;
        for point in intermediate_points(from, to, self.tuning.max_node_distance) {
            parent = self.push(point, parent)?;
        }
        self.push(to, parent)
    }

    fn push(&mut self, position: Vec2, parent: NodeIndex) -> Option<NodeIndex> {
        if self.is_full() {
            return None;
        }
        self.arc.push(position, parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discharge_core::{Orientation, WallId};

    fn vertical(id: u32, x: f32, bottom: f32, top: f32, thickness: f32) -> Obstacle {
        Obstacle {
            wall: WallId::new(id),
            orientation: Orientation::Vertical,
            face: x,
            span: (bottom, top),
            thickness,
        }
    }

    fn build(
        source: Vec2,
        obstacles: &mut Vec<Obstacle>,
        tuning: &DischargeTuning,
        budget: f32,
    ) -> DischargeArc {
        let mut context = BuildContext::new(source, obstacles, tuning);
        context.extend(source, DischargeArc::ROOT, budget);
        context.into_arc()
    }

    fn positions(arc: &DischargeArc) -> Vec<Vec2> {
        arc.iter().map(|node| node.position).collect()
    }

    #[test]
    fn single_wall_branches_to_both_ends() {
        let tuning = DischargeTuning::default();
        let mut obstacles = vec![vertical(0, 100.0, -50.0, 50.0, 20.0)];

        let arc = build(Vec2::new(0.0, 10.0), &mut obstacles, &tuning, 500.0);

        assert_eq!(
            positions(&arc),
            vec![
                Vec2::new(0.0, 10.0),
                Vec2::new(100.0, 10.0),
                Vec2::new(100.0, 50.0),
                Vec2::new(100.0, -50.0),
            ]
        );
        let parents: Vec<i64> = arc.iter().map(|node| node.parent_index()).collect();
        assert_eq!(parents, vec![-1, 0, 1, 1]);
        assert!(obstacles.is_empty());
    }

    #[test]
    fn unreachable_wall_is_left_untouched() {
        let tuning = DischargeTuning::default();
        let mut obstacles = vec![vertical(0, 100.0, -50.0, 50.0, 20.0)];

        let arc = build(Vec2::ZERO, &mut obstacles, &tuning, 99.0);

        assert_eq!(arc.len(), 1);
        assert_eq!(obstacles.len(), 1);
    }

    #[test]
    fn zero_budget_stops_immediately() {
        let tuning = DischargeTuning::default();
        let mut obstacles = vec![vertical(0, 0.0, -50.0, 50.0, 20.0)];

        let arc = build(Vec2::ZERO, &mut obstacles, &tuning, 0.0);

        assert_eq!(arc.len(), 1);
        assert_eq!(obstacles.len(), 1);
    }

    #[test]
    fn penetration_cost_reduces_budget_of_both_branches() {
        let tuning = DischargeTuning::default();
        // Reaching the first wall costs 100 and crossing it 10, leaving 10 for
        // each branch. The top end is 10 from the second wall, the bottom end
        // 30 from the third.
        let mut obstacles = vec![
            vertical(0, 100.0, -50.0, 50.0, 200.0),
            vertical(1, 105.0, 55.0, 80.0, 2.0),
            vertical(2, 115.0, -90.0, -65.0, 2.0),
        ];

        let arc = build(Vec2::ZERO, &mut obstacles, &tuning, 120.0);

        let reached: Vec<Vec2> = positions(&arc);
        assert!(reached.contains(&Vec2::new(105.0, 55.0)));
        assert!(!reached.contains(&Vec2::new(115.0, -65.0)));
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].wall, WallId::new(2));
    }

    #[test]
    fn long_approach_is_interpolated() {
        let tuning = DischargeTuning::default();
        let mut obstacles = vec![vertical(0, 1_000.0, -10.0, 10.0, 4.0)];

        let arc = build(Vec2::ZERO, &mut obstacles, &tuning, 2_000.0);

        // The final partial step is skipped, so only 256 and 512 are inserted.
        assert_eq!(
            &positions(&arc)[..4],
            &[
                Vec2::ZERO,
                Vec2::new(256.0, 0.0),
                Vec2::new(512.0, 0.0),
                Vec2::new(1_000.0, 0.0),
            ]
        );
        assert_eq!(arc.get(NodeIndex::new(3)).map(|node| node.parent_index()), Some(2));
    }

    #[test]
    fn node_allowance_is_never_exceeded() {
        let tuning = DischargeTuning {
            max_nodes: 6,
            ..DischargeTuning::default()
        };
        let mut obstacles: Vec<Obstacle> = (0..20)
            .map(|i| vertical(i, 20.0 * (i as f32 + 1.0), -30.0, 30.0, 2.0))
            .collect();

        let arc = build(Vec2::ZERO, &mut obstacles, &tuning, 5_000.0);

        assert_eq!(arc.len(), 6);
        for (index, node) in arc.iter().enumerate().skip(1) {
            let parent = node.parent.expect("non-root node has a parent");
            assert!(parent.as_usize() < index);
        }
    }
}
