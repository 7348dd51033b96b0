pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two coordinates given in degrees.
pub fn get_distance(from_lat: &f64, from_lon: &f64, to_lat: &f64, to_lon: &f64) -> f64 {
    // https://rust-lang-nursery.github.io/rust-cookbook/science/mathematics/trigonometry.html#distance-between-two-points-on-the-earth
    let from_lat_rad = from_lat.to_radians();
    let to_lat_rad = to_lat.to_radians();

    let delta_latitude = (from_lat - to_lat).to_radians();
    let delta_longitude = (from_lon - to_lon).to_radians();

    let central_angle_inner = (delta_latitude / 2.0).sin().powi(2)
        + from_lat_rad.cos() * to_lat_rad.cos() * (delta_longitude / 2.0).sin().powi(2);
    let central_angle = 2.0 * central_angle_inner.sqrt().asin();

    EARTH_RADIUS_METERS * central_angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_for_same_point() {
        assert_eq!(get_distance(&32.08, &34.78, &32.08, &34.78), 0.0);
    }

    #[test]
    fn one_hundredth_degree_on_equator() {
        let distance = get_distance(&0.0, &0.0, &0.0, &0.01);
        assert!((distance - 1111.95).abs() < 0.01, "got {distance}");

        let distance = get_distance(&0.0, &0.0, &0.02, &0.0);
        assert!((distance - 2223.90).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn symmetric() {
        let there = get_distance(&31.7683, &35.2137, &32.0853, &34.7818);
        let back = get_distance(&32.0853, &34.7818, &31.7683, &35.2137);
        assert!((there - back).abs() < 1e-6);
        // Jerusalem - Tel Aviv, roughly 54km
        assert!(there > 50_000.0 && there < 60_000.0, "got {there}");
    }
}
