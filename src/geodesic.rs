use itertools::Itertools;

use crate::location::Location;

pub const EARTH_RADIUS: f64 = 6371000.0; // unit: meter

// Great-circle distance in meters on a spherical earth.
// https://en.wikipedia.org/wiki/Haversine_formula
pub fn haversine_distance(a: &Location, b: &Location) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // rounding can push `h` slightly outside [0, 1] for (near) identical or
    // antipodal points, which turns `sqrt(1 - h)` into NaN.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS * c
}

/// Sum of the distances between consecutive points.
pub fn route_distance(route: &[Location]) -> f64 {
    route
        .iter()
        .tuple_windows()
        .map(|(a, b)| haversine_distance(a, b))
        .sum()
}
