//! Humidity compensation input for the air quality algorithm.

/// Largest absolute humidity the 8.8 fixed-point format can carry, exclusive.
pub const MAX_ABSOLUTE_HUMIDITY: f32 = 256.0;

/// Absolute humidity in g/m³ from temperature in °C and relative humidity in
/// percent, using the Magnus approximation of saturation vapor pressure.
pub fn absolute_humidity(temp_celsius: f32, relative_humidity_percent: f32) -> f32 {
    let vapor_pressure = (relative_humidity_percent / 100.0)
        * 6.112
        * libm::expf((17.62 * temp_celsius) / (243.12 + temp_celsius));

    216.7 * (vapor_pressure / (273.15 + temp_celsius))
}

/// Converts g/m³ to the sensor's 8.8 fixed-point format, truncating.
/// Returns `None` for values the format cannot hold.
pub fn to_fixed_point(grams_per_cubic_meter: f32) -> Option<u16> {
    if !grams_per_cubic_meter.is_finite()
        || !(0.0..MAX_ABSOLUTE_HUMIDITY).contains(&grams_per_cubic_meter)
    {
        return None;
    }

    Some((grams_per_cubic_meter * 256.0) as u16)
}
