//! Evenly spaced intermediate points between two arc nodes.

use discharge_core::Vec2;

/// Points spaced `step` apart walking from `from` towards `to`.
///
/// A point is only produced while more than one full `step` remains before
/// `to`, so endpoints at most twice `step` apart yield nothing. A non-positive
/// `step` yields nothing.
pub(crate) fn intermediate_points(
    from: Vec2,
    to: Vec2,
    step: f32,
) -> impl Iterator<Item = Vec2> {
    let offset = to - from;
    let distance = offset.length();
    let direction = offset.normalize_or_zero();
    let usable = step > 0.0 && step.is_finite();

    (1_u32..)
        .map(move |k| k as f32 * step)
        .take_while(move |travelled| usable && *travelled < distance - step)
        .map(move |travelled| from + direction * travelled)
}
