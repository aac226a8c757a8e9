//! Greedy nearest-obstacle search.

use discharge_core::Vec2;

use crate::candidates::Obstacle;

/// Obstacle chosen by [`nearest_within`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Nearest {
    /// Position of the obstacle inside the candidate list.
    pub(crate) index: usize,
    pub(crate) distance: f32,
}

impl Obstacle {
    /// Distance to reach any point on the wall's face from `position`.
    ///
    /// Offset across the wall plus the overshoot past the nearer end when
    /// `position` lies outside the wall's span.
    pub(crate) fn distance_from(&self, position: Vec2) -> f32 {
        let long = self.orientation.long_axis();
        let across = (self.orientation.short_axis().of(position) - self.face).abs();
        let along = long.of(position);
        let (low, high) = self.span;
        let overshoot = if along < low {
            low - along
        } else if along > high {
            along - high
        } else {
            0.0
        };
        across + overshoot
    }
}

/// Finds the closest obstacle reachable with `budget`.
///
/// Ties go to the obstacle listed first. Returns `None` when the list is empty
/// or the closest obstacle lies beyond the budget.
pub(crate) fn nearest_within(
    position: Vec2,
    obstacles: &[Obstacle],
    budget: f32,
) -> Option<Nearest> {
    let mut best: Option<Nearest> = None;

    for (index, obstacle) in obstacles.iter().enumerate() {
        let distance = obstacle.distance_from(position);
        match &best {
            Some(existing) if distance >= existing.distance => {}
            _ => best = Some(Nearest { index, distance }),
        }
    }

    best.filter(|nearest| nearest.distance <= budget)
}
