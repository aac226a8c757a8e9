//! Narrows the world down to the vessels and walls a discharge could reach.

use discharge_core::{Orientation, Vec2, VesselId, VesselView, WallId, WallSnapshot, WallView};

use crate::DischargeRequest;

/// Wall segment that survived filtering, reduced to the data the search needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Obstacle {
    pub(crate) wall: WallId,
    pub(crate) orientation: Orientation,
    /// Short-axis coordinate of the wall's centre line.
    pub(crate) face: f32,
    /// Lowest and highest long-axis coordinate covered by the wall.
    pub(crate) span: (f32, f32),
    pub(crate) thickness: f32,
}

impl Obstacle {
    pub(crate) fn from_snapshot(wall: &WallSnapshot) -> Self {
        Self {
            wall: wall.id,
            orientation: wall.orientation,
            face: wall.face_coordinate(),
            span: wall.rect.span(wall.orientation.long_axis()),
            thickness: wall.thickness(),
        }
    }

    /// Point on the wall's centre line closest to `position`.
    pub(crate) fn attach_point(&self, position: Vec2) -> Vec2 {
        let long = self.orientation.long_axis();
        let (low, high) = self.span;
        long.compose(long.of(position).clamp(low, high), self.face)
    }

    /// Both ends of the wall in the order branches explore them.
    ///
    /// Horizontal walls yield left then right, vertical walls top then bottom.
    pub(crate) fn ends(&self) -> [Vec2; 2] {
        let long = self.orientation.long_axis();
        let (low, high) = self.span;
        let low_end = long.compose(low, self.face);
        let high_end = long.compose(high, self.face);
        match self.orientation {
            Orientation::Horizontal => [low_end, high_end],
            Orientation::Vertical => [high_end, low_end],
        }
    }
}

/// Collects the vessels whose range-expanded borders contain the source.
///
/// The vessel carrying the source is always included.
pub(crate) fn vessels_in_range(
    request: &DischargeRequest,
    vessels: &VesselView,
    out: &mut Vec<VesselId>,
) {
    out.clear();
    let range = request.range.get();

    for vessel in vessels.iter() {
        if request.vessel == Some(vessel.id)
            || vessel.world_borders().expanded(range).contains(request.source)
        {
            out.push(vessel.id);
        }
    }
}

/// Collects the solid walls that could be struck from the source.
///
/// Walls owned by a vessel outside `vessels_in_range` are skipped, as are walls
/// whose range-expanded rectangle does not contain the source.
pub(crate) fn walls_in_range(
    request: &DischargeRequest,
    walls: &WallView,
    vessels_in_range: &[VesselId],
    out: &mut Vec<Obstacle>,
) {
    out.clear();
    let range = request.range.get();

    for wall in walls.iter() {
        if !wall.is_obstacle() {
            continue;
        }

        if let Some(vessel) = wall.vessel {
            if !vessels_in_range.contains(&vessel) {
                continue;
            }
        }

        if !wall.rect.expanded(range).contains(request.source) {
            continue;
        }

        out.push(Obstacle::from_snapshot(wall));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discharge_core::{DischargerRange, VesselSnapshot, WorldRect};

    fn request(source: Vec2, vessel: Option<VesselId>, range: f32) -> DischargeRequest {
        DischargeRequest {
            source,
            vessel,
            range: DischargerRange::new(range).expect("valid range"),
        }
    }

    fn wall(id: u32, min: (f32, f32), max: (f32, f32), vessel: Option<VesselId>) -> WallSnapshot {
        WallSnapshot {
            id: WallId::new(id),
            rect: WorldRect::from_min_max(Vec2::new(min.0, min.1), Vec2::new(max.0, max.1)),
            orientation: Orientation::Horizontal,
            solid: true,
            platform: false,
            vessel,
        }
    }

    fn vessel(id: u32, position: Vec2) -> VesselSnapshot {
        VesselSnapshot {
            id: VesselId::new(id),
            borders: WorldRect::from_min_max(Vec2::new(-50.0, -50.0), Vec2::new(50.0, 50.0)),
            position,
        }
    }

    #[test]
    fn own_vessel_is_always_in_range() {
        let vessels = VesselView::from_snapshots(vec![vessel(0, Vec2::new(10_000.0, 0.0))]);
        let mut out = Vec::new();

        vessels_in_range(&request(Vec2::ZERO, Some(VesselId::new(0)), 10.0), &vessels, &mut out);

        assert_eq!(out, vec![VesselId::new(0)]);
    }

    #[test]
    fn vessel_borders_are_offset_by_body_position_and_expanded_by_range() {
        let vessels = VesselView::from_snapshots(vec![
            vessel(0, Vec2::new(200.0, 0.0)),
            vessel(1, Vec2::new(400.0, 0.0)),
        ]);
        let mut out = Vec::new();

        // Vessel 0 spans x 150..250, vessel 1 spans x 350..450.
        vessels_in_range(&request(Vec2::ZERO, None, 150.0), &vessels, &mut out);

        assert_eq!(out, vec![VesselId::new(0)]);
    }

    #[test]
    fn platforms_hollow_walls_and_distant_walls_are_discarded() {
        let near = wall(0, (20.0, -5.0), (60.0, 5.0), None);
        let platform = WallSnapshot {
            id: WallId::new(1),
            platform: true,
            ..near
        };
        let hollow = WallSnapshot {
            id: WallId::new(2),
            solid: false,
            ..near
        };
        let far = wall(3, (500.0, -5.0), (600.0, 5.0), None);
        let walls = WallView::from_snapshots(vec![near, platform, hollow, far]);
        let mut out = Vec::new();

        walls_in_range(&request(Vec2::ZERO, None, 100.0), &walls, &[], &mut out);

        let kept: Vec<WallId> = out.iter().map(|obstacle| obstacle.wall).collect();
        assert_eq!(kept, vec![WallId::new(0)]);
    }

    #[test]
    fn walls_on_vessels_out_of_range_are_discarded() {
        let on_near = wall(0, (10.0, -5.0), (30.0, 5.0), Some(VesselId::new(0)));
        let on_far = wall(1, (10.0, 10.0), (30.0, 20.0), Some(VesselId::new(1)));
        let walls = WallView::from_snapshots(vec![on_near, on_far]);
        let mut out = Vec::new();

        walls_in_range(
            &request(Vec2::ZERO, None, 100.0),
            &walls,
            &[VesselId::new(0)],
            &mut out,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].wall, WallId::new(0));
    }

    #[test]
    fn attach_point_clamps_onto_the_centre_line() {
        let obstacle = Obstacle::from_snapshot(&WallSnapshot {
            orientation: Orientation::Vertical,
            ..wall(0, (90.0, -100.0), (110.0, 100.0), None)
        });

        assert_eq!(obstacle.attach_point(Vec2::new(0.0, 40.0)), Vec2::new(100.0, 40.0));
        assert_eq!(obstacle.attach_point(Vec2::new(0.0, 300.0)), Vec2::new(100.0, 100.0));
        assert_eq!(
            obstacle.ends(),
            [Vec2::new(100.0, 100.0), Vec2::new(100.0, -100.0)]
        );
    }

    #[test]
    fn horizontal_ends_run_left_to_right() {
        let obstacle = Obstacle::from_snapshot(&wall(0, (-40.0, 10.0), (60.0, 30.0), None));

        assert_eq!(obstacle.face, 20.0);
        assert_eq!(obstacle.thickness, 20.0);
        assert_eq!(
            obstacle.ends(),
            [Vec2::new(-40.0, 20.0), Vec2::new(60.0, 20.0)]
        );
    }
}
