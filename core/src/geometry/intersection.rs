use super::{contains, GeoPoint};

/// Decides whether two polygon outlines intersect by vertex sampling:
/// `true` iff any vertex of `ring_a` lies inside `ring_b`, or any vertex of
/// `ring_b` lies inside `ring_a`.
///
/// This is a deliberate approximation. Two polygons whose boundaries cross
/// without either contributing a vertex to the other's interior (a narrow
/// strip slicing through a larger shape, for example) are *not* detected.
/// Downstream selection behavior is defined against this rule, so it must
/// not be upgraded to true segment-intersection clipping without an
/// explicit behavior-change decision.
///
/// Worst case O(|A|·|B|) per pair, which is fine at the reference-dataset
/// ring sizes this crate works with.
pub fn intersects(ring_a: &[GeoPoint], ring_b: &[GeoPoint]) -> bool {
    ring_a.iter().any(|&p| contains(p, ring_b)) || ring_b.iter().any(|&p| contains(p, ring_a))
}
