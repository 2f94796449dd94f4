// Brightness scaling between the device (0..=100 percent) and the
// presentation range used by lighting hosts (0..=255).
//
// Both directions round half up. Only device -> presentation can hit an exact
// half (every 20th percent starting at 10, e.g. 30% is 76.5), so 30% maps to 77.

/// Device percent to presentation brightness: `round(percent * 255 / 100)`.
///
/// Percent values above 100 are treated as 100.
pub fn to_presentation(percent: u8) -> u8 {
    let percent = u32::from(percent.min(100));
    u8::try_from((percent * 255 + 50) / 100).unwrap_or(u8::MAX)
}

/// Presentation brightness to device percent: `round(brightness * 100 / 255)`.
pub fn to_device(brightness: u8) -> u8 {
    let brightness = u32::from(brightness);
    u8::try_from((brightness * 200 + 255) / 510).unwrap_or(100)
}
