//! Great-circle distance helpers.

/// Mean Earth radius used for haversine distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Reference point for `dist_to_Tokyo`.
pub const TOKYO: GeoPoint = GeoPoint {
    latitude: 35.6895,
    longitude: 139.6917,
};

/// Haversine distance in kilometers.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = (to.latitude - from.latitude).to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance to Tokyo rounded to two decimals.
pub fn dist_to_tokyo(latitude: f64, longitude: f64) -> f64 {
    let km = haversine_km(
        GeoPoint {
            latitude,
            longitude,
        },
        TOKYO,
    );
    (km * 100.0).round() / 100.0
}
