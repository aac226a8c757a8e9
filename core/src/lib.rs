#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared contracts for the discharge engine.
//!
//! Adapters describe what they want changed as [`Command`] values, the world
//! carries them out and reports back through [`Event`] values, and systems read
//! snapshots such as [`WallView`] before answering with further commands. The
//! geometry used by every layer ([`WorldRect`], [`Axis`], [`Orientation`]) and
//! the finished [`DischargeArc`] live here as well.

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

pub use glam::Vec2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Spawns a new vessel whose body sits at the provided world position.
    SpawnVessel {
        /// Bounding rectangle of the vessel expressed relative to its body.
        borders: WorldRect,
        /// World-space offset of the vessel body.
        position: Vec2,
    },
    /// Moves an existing vessel body, carrying its walls and dischargers along.
    MoveVessel {
        /// Identifier of the vessel to relocate.
        vessel: VesselId,
        /// New world-space offset of the vessel body.
        position: Vec2,
    },
    /// Places a wall segment into the world.
    PlaceWall {
        /// Rectangle covered by the wall, local to the vessel when one is provided.
        rect: WorldRect,
        /// Whether the wall runs horizontally or vertically.
        orientation: Orientation,
        /// Whether the wall has a physical body.
        solid: bool,
        /// Whether the wall is a walk-through platform.
        platform: bool,
        /// Vessel that owns the wall, if any.
        vessel: Option<VesselId>,
    },
    /// Registers a new discharge source with the world.
    RegisterDischarger {
        /// Position of the source, local to the vessel when one is provided.
        position: Vec2,
        /// Vessel carrying the source, if any.
        vessel: Option<VesselId>,
        /// Range budget granted to every activation of the source.
        range: DischargerRange,
    },
    /// Deregisters a discharge source and discards its stored arc.
    RemoveDischarger {
        /// Identifier of the source to remove.
        discharger: DischargerId,
    },
    /// Updates the range budget of a registered discharge source.
    ConfigureDischargerRange {
        /// Identifier of the source to reconfigure.
        discharger: DischargerId,
        /// Replacement range budget.
        range: DischargerRange,
    },
    /// Requests that a discharge source fires.
    ActivateDischarger {
        /// Identifier of the source being activated.
        discharger: DischargerId,
    },
    /// Stores a freshly computed arc for a discharge source, replacing the previous one.
    StoreDischarge {
        /// Identifier of the source that produced the arc.
        discharger: DischargerId,
        /// Finalized arc ready for presentation.
        arc: DischargeArc,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a vessel was spawned.
    VesselSpawned {
        /// Identifier allocated to the vessel.
        vessel: VesselId,
    },
    /// Confirms that a vessel body moved.
    VesselMoved {
        /// Identifier of the vessel that moved.
        vessel: VesselId,
        /// World-space offset the vessel occupied before moving.
        from: Vec2,
        /// World-space offset the vessel occupies after moving.
        to: Vec2,
    },
    /// Reports that a vessel move request was rejected.
    VesselMoveRejected {
        /// Identifier provided in the request.
        vessel: VesselId,
        /// Specific reason the move failed.
        reason: RejectionReason,
    },
    /// Confirms that a wall segment was placed.
    WallPlaced {
        /// Identifier allocated to the wall.
        wall: WallId,
    },
    /// Reports that a wall placement request was rejected.
    WallPlacementRejected {
        /// Specific reason the placement failed.
        reason: RejectionReason,
    },
    /// Confirms that a discharge source was registered.
    DischargerRegistered {
        /// Identifier allocated to the source.
        discharger: DischargerId,
    },
    /// Reports that a discharger registration request was rejected.
    DischargerRegistrationRejected {
        /// Specific reason the registration failed.
        reason: RejectionReason,
    },
    /// Confirms that a discharge source was deregistered.
    DischargerRemoved {
        /// Identifier of the removed source.
        discharger: DischargerId,
    },
    /// Reports that a discharger removal request was rejected.
    DischargerRemovalRejected {
        /// Identifier provided in the request.
        discharger: DischargerId,
        /// Specific reason the removal failed.
        reason: RejectionReason,
    },
    /// Confirms that a discharge source received a new range budget.
    DischargerRangeConfigured {
        /// Identifier of the reconfigured source.
        discharger: DischargerId,
        /// Range budget now in effect.
        range: DischargerRange,
    },
    /// Reports that a discharger reconfiguration request was rejected.
    DischargerConfigurationRejected {
        /// Identifier provided in the request.
        discharger: DischargerId,
        /// Specific reason the reconfiguration failed.
        reason: RejectionReason,
    },
    /// Announces that a discharge source fired and needs a fresh arc.
    DischargerActivated {
        /// Identifier of the source that fired.
        discharger: DischargerId,
        /// World-space position the arc starts from.
        source: Vec2,
        /// Vessel carrying the source, if any.
        vessel: Option<VesselId>,
        /// Range budget available to the arc.
        range: DischargerRange,
    },
    /// Reports that an activation request was rejected.
    DischargerActivationRejected {
        /// Identifier provided in the request.
        discharger: DischargerId,
        /// Specific reason the activation failed.
        reason: RejectionReason,
    },
    /// Confirms that an arc was stored for a discharge source.
    DischargeStored {
        /// Identifier of the source owning the arc.
        discharger: DischargerId,
        /// Number of nodes contained in the stored arc.
        node_count: usize,
    },
}

/// Reasons the world may reject a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The referenced vessel does not exist.
    MissingVessel,
    /// The referenced discharge source is not registered.
    MissingDischarger,
}

/// Unique identifier assigned to a vessel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VesselId(u32);

impl VesselId {
    /// Creates a new vessel identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a wall segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WallId(u32);

impl WallId {
    /// Creates a new wall identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a discharge source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DischargerId(u32);

impl DischargerId {
    /// Creates a new discharger identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// World axis selector used to write orientation-aware geometry once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal world axis.
    X,
    /// Vertical world axis, growing upward.
    Y,
}

impl Axis {
    /// Returns the perpendicular axis.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    /// Extracts the coordinate of `point` along this axis.
    #[must_use]
    pub fn of(self, point: Vec2) -> f32 {
        match self {
            Self::X => point.x,
            Self::Y => point.y,
        }
    }

    /// Builds a point whose coordinate along this axis is `along` and whose
    /// coordinate along the perpendicular axis is `across`.
    #[must_use]
    pub fn compose(self, along: f32, across: f32) -> Vec2 {
        match self {
            Self::X => Vec2::new(along, across),
            Self::Y => Vec2::new(across, along),
        }
    }
}

/// Direction in which a wall segment runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Wall runs along the X axis; its thickness is measured along Y.
    Horizontal,
    /// Wall runs along the Y axis; its thickness is measured along X.
    Vertical,
}

impl Orientation {
    /// Axis the wall extends along.
    #[must_use]
    pub const fn long_axis(self) -> Axis {
        match self {
            Self::Horizontal => Axis::X,
            Self::Vertical => Axis::Y,
        }
    }

    /// Axis the wall's thickness is measured along.
    #[must_use]
    pub const fn short_axis(self) -> Axis {
        self.long_axis().other()
    }
}

/// Axis-aligned rectangle expressed in world units.
///
/// The Y axis grows upward, so `top` is always the larger Y coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    min: Vec2,
    max: Vec2,
}

impl WorldRect {
    /// Creates a rectangle from two opposite corners in any order.
    #[must_use]
    pub fn from_min_max(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a rectangle centred on `center` with the provided dimensions.
    #[must_use]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Lower-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Upper-right corner.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Smallest X coordinate covered by the rectangle.
    #[must_use]
    pub const fn left(&self) -> f32 {
        self.min.x
    }

    /// Largest X coordinate covered by the rectangle.
    #[must_use]
    pub const fn right(&self) -> f32 {
        self.max.x
    }

    /// Smallest Y coordinate covered by the rectangle.
    #[must_use]
    pub const fn bottom(&self) -> f32 {
        self.min.y
    }

    /// Largest Y coordinate covered by the rectangle.
    #[must_use]
    pub const fn top(&self) -> f32 {
        self.max.y
    }

    /// Horizontal size of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Vertical size of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Midpoint of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Lowest and highest coordinate covered along `axis`.
    #[must_use]
    pub fn span(&self, axis: Axis) -> (f32, f32) {
        (axis.of(self.min), axis.of(self.max))
    }

    /// Size of the rectangle along `axis`.
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f32 {
        let (low, high) = self.span(axis);
        high - low
    }

    /// Grows the rectangle by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self::from_min_max(self.min - Vec2::splat(margin), self.max + Vec2::splat(margin))
    }

    /// Shifts the rectangle by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Reports whether `point` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Immutable representation of a wall segment used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSnapshot {
    /// Identifier allocated to the wall by the world.
    pub id: WallId,
    /// World-space rectangle covered by the wall.
    pub rect: WorldRect,
    /// Direction the wall runs in.
    pub orientation: Orientation,
    /// Whether the wall has a physical body.
    pub solid: bool,
    /// Whether the wall is a walk-through platform.
    pub platform: bool,
    /// Vessel that owns the wall, if any.
    pub vessel: Option<VesselId>,
}

impl WallSnapshot {
    /// Reports whether the wall can be struck by a discharge.
    #[must_use]
    pub const fn is_obstacle(&self) -> bool {
        self.solid && !self.platform
    }

    /// Size of the wall along its short axis.
    #[must_use]
    pub fn thickness(&self) -> f32 {
        self.rect.extent(self.orientation.short_axis())
    }

    /// Short-axis coordinate of the wall's centre line, where arcs attach.
    #[must_use]
    pub fn face_coordinate(&self) -> f32 {
        self.orientation.short_axis().of(self.rect.center())
    }
}

/// Read-only snapshot describing all wall segments in the world.
#[derive(Clone, Debug, Default)]
pub struct WallView {
    snapshots: Vec<WallSnapshot>,
}

impl WallView {
    /// Creates a new wall view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<WallSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured wall snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &WallSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<WallSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a vessel used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VesselSnapshot {
    /// Identifier allocated to the vessel by the world.
    pub id: VesselId,
    /// Bounding rectangle of the vessel relative to its body.
    pub borders: WorldRect,
    /// World-space offset of the vessel body.
    pub position: Vec2,
}

impl VesselSnapshot {
    /// Bounding rectangle of the vessel in world space.
    #[must_use]
    pub fn world_borders(&self) -> WorldRect {
        self.borders.translated(self.position)
    }
}

/// Read-only snapshot describing all vessels in the world.
#[derive(Clone, Debug, Default)]
pub struct VesselView {
    snapshots: Vec<VesselSnapshot>,
}

impl VesselView {
    /// Creates a new vessel view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<VesselSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured vessel snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &VesselSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<VesselSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a registered discharge source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DischargerSnapshot {
    /// Identifier allocated to the source by the world.
    pub id: DischargerId,
    /// World-space position of the source.
    pub position: Vec2,
    /// Vessel carrying the source, if any.
    pub vessel: Option<VesselId>,
    /// Range budget granted to each activation.
    pub range: DischargerRange,
}

/// Read-only snapshot describing every registered discharge source.
#[derive(Clone, Debug, Default)]
pub struct DischargerView {
    snapshots: Vec<DischargerSnapshot>,
}

impl DischargerView {
    /// Creates a new discharger view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DischargerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured discharger snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &DischargerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DischargerSnapshot> {
        self.snapshots
    }
}

/// Errors produced when validating a discharge range budget.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum RangeError {
    /// The provided value was NaN or infinite.
    #[error("discharge range {0} is not a finite number")]
    NotFinite(f32),
    /// The provided value fell outside the supported domain.
    #[error("discharge range {value} lies outside {min}..={max}")]
    OutOfBounds {
        /// Rejected value.
        value: f32,
        /// Smallest accepted value.
        min: f32,
        /// Largest accepted value.
        max: f32,
    },
}

/// Range budget granted to a discharge source on each activation.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct DischargerRange(f32);

impl DischargerRange {
    /// Smallest range a source may be configured with.
    pub const MIN: f32 = 0.0;
    /// Largest range a source may be configured with.
    pub const MAX: f32 = 5_000.0;
    /// Range assigned to sources that do not override it.
    pub const DEFAULT: Self = Self(100.0);

    /// Validates and wraps the provided range value.
    pub fn new(value: f32) -> Result<Self, RangeError> {
        if !value.is_finite() {
            return Err(RangeError::NotFinite(value));
        }

        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(RangeError::OutOfBounds {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }

        Ok(Self(value))
    }

    /// Retrieves the range expressed in world units.
    #[must_use]
    pub const fn get(&self) -> f32 {
        self.0
    }
}

impl Default for DischargerRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f32> for DischargerRange {
    type Error = RangeError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DischargerRange> for f32 {
    fn from(range: DischargerRange) -> Self {
        range.0
    }
}

/// Position of a node inside a [`DischargeArc`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// Creates a new node index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index usable for slice access.
    #[must_use]
    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Single point on a discharge arc.
///
/// `length` and `angle` describe the edge towards the parent node and stay at
/// zero until the arc is finalized. The root never receives edge data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DischargeNode {
    /// World-space position of the node.
    pub position: Vec2,
    /// Node this one branched from, `None` for the root.
    ///
    /// Serialised as the signed index from [`DischargeNode::parent_index`].
    #[serde(serialize_with = "serialize_parent")]
    pub parent: Option<NodeIndex>,
    /// Rendered length of the edge to the parent.
    pub length: f32,
    /// Direction from this node towards its parent, in radians.
    pub angle: f32,
}

impl DischargeNode {
    /// Signed parent index where the root reports `-1`.
    #[must_use]
    pub fn parent_index(&self) -> i64 {
        self.parent.map_or(-1, |parent| i64::from(parent.get()))
    }
}

fn serialize_parent<S>(parent: &Option<NodeIndex>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(parent.map_or(-1, |parent| i64::from(parent.get())))
}

/// Tree of nodes describing one discharge.
///
/// Nodes are stored in insertion order: the root always sits at index zero and
/// every other node refers to a parent with a strictly smaller index.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DischargeArc {
    nodes: Vec<DischargeNode>,
}

impl DischargeArc {
    /// Index of the root node.
    pub const ROOT: NodeIndex = NodeIndex::new(0);

    /// Creates an arc containing only a root node at `position`.
    #[must_use]
    pub fn rooted_at(position: Vec2) -> Self {
        Self {
            nodes: vec![DischargeNode {
                position,
                parent: None,
                length: 0.0,
                angle: 0.0,
            }],
        }
    }

    /// Appends a node chained to `parent` and returns its index.
    ///
    /// Returns `None` without modifying the arc when `parent` does not refer to
    /// a node already stored, so every parent precedes its children.
    pub fn push(&mut self, position: Vec2, parent: NodeIndex) -> Option<NodeIndex> {
        if parent.as_usize() >= self.nodes.len() {
            return None;
        }

        let index = NodeIndex::new(u32::try_from(self.nodes.len()).ok()?);
        self.nodes.push(DischargeNode {
            position,
            parent: Some(parent),
            length: 0.0,
            angle: 0.0,
        });
        Some(index)
    }

    /// Records the rendered edge data of a non-root node.
    pub fn set_edge(&mut self, index: NodeIndex, length: f32, angle: f32) {
        if index == Self::ROOT {
            return;
        }

        if let Some(node) = self.nodes.get_mut(index.as_usize()) {
            node.length = length;
            node.angle = angle;
        }
    }

    /// Root node the discharge started from.
    #[must_use]
    pub fn root(&self) -> &DischargeNode {
        &self.nodes[0]
    }

    /// Returns the node stored at `index`, if any.
    #[must_use]
    pub fn get(&self, index: NodeIndex) -> Option<&DischargeNode> {
        self.nodes.get(index.as_usize())
    }

    /// Returns the parent of the node stored at `index`.
    #[must_use]
    pub fn parent_of(&self, index: NodeIndex) -> Option<&DischargeNode> {
        self.get(index)
            .and_then(|node| node.parent)
            .and_then(|parent| self.get(parent))
    }

    /// All nodes in storage order.
    #[must_use]
    pub fn nodes(&self) -> &[DischargeNode] {
        &self.nodes
    }

    /// Iterator over the nodes in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &DischargeNode> {
        self.nodes.iter()
    }

    /// Number of nodes, the root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`; an arc owns at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
