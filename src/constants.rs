/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = 299_792_458.0;

/// Minimal number of satellites to resolve position and clock bias
pub const MIN_SATELLITES: usize = 4;

/// Catalog timestamps are indexed with this resolution, in seconds
pub const TIMESTAMP_RESOLUTION_S: f64 = 1.0E-3;
