use super::GeoPoint;

/// Tests whether `point` lies inside the polygon outlined by `ring` using
/// the even-odd ray-casting rule: a horizontal ray extends from the point
/// toward +∞ in lng, and the point is inside iff it crosses an odd number
/// of edges.
///
/// The ring may be open or closed; the edge between the last and first
/// vertex is always considered. A point exactly on an edge gets a
/// deterministic but unspecified classification, which is the accepted
/// ray-casting boundary ambiguity. Rings with fewer than 3 vertices
/// contain nothing.
pub fn contains(point: GeoPoint, ring: &[GeoPoint]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let (x, y) = point.as_tuple();
    let mut inside = false;

    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i].as_tuple();
        let (xj, yj) = ring[j].as_tuple();

        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}
