//! Power estimate for WS2812-style strips.
//!
//! Per pixel at full channel intensity: red 80 mW, green 55 mW, blue 75 mW,
//! plus 5 mW for the controller chip even when dark.

use crate::pixels::Pixel;

const RED_MW: u64 = 16 * 5;
const GREEN_MW: u64 = 11 * 5;
const BLUE_MW: u64 = 15 * 5;
const DARK_MW: u64 = 5;

/// Power the strip draws showing `pixels` at full brightness.
pub fn unscaled_power_mw(pixels: &[Pixel]) -> u32 {
    let (red, green, blue) = pixels.iter().fold((0u64, 0u64, 0u64), |(r, g, b), p| {
        (r + p.red as u64, g + p.green as u64, b + p.blue as u64)
    });
    let total = ((red * RED_MW + green * GREEN_MW + blue * BLUE_MW) >> 8) + pixels.len() as u64 * DARK_MW;
    u32::try_from(total).unwrap_or(u32::MAX)
}

/// Highest brightness up to `brightness` that keeps the strip within
/// `max_power_mw`.
pub fn max_brightness_for_power(pixels: &[Pixel], brightness: u8, max_power_mw: u32) -> u8 {
    let requested = unscaled_power_mw(pixels) as u64 * brightness as u64 / 256;
    if requested <= max_power_mw as u64 {
        return brightness;
    }

    (brightness as u64 * max_power_mw as u64 / requested) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::{BLACK, WHITE};
    use palette::Srgb;

    #[test]
    fn dark_strip_draws_idle_power() {
        assert_eq!(unscaled_power_mw(&[BLACK; 150]), 750);
    }

    #[test]
    fn full_white_pixel() {
        // (255 * (80 + 55 + 75)) >> 8 = 209, plus 5 idle
        assert_eq!(unscaled_power_mw(&[WHITE]), 214);
        assert_eq!(unscaled_power_mw(&[Srgb::new(255, 0, 0)]), 84);
    }

    #[test]
    fn brightness_is_limited_to_budget() {
        let strip = [WHITE; 150];
        // About 32 W at full, 16 W at half brightness.
        assert_eq!(max_brightness_for_power(&strip, 128, 20_000), 128);

        let limited = max_brightness_for_power(&strip, 128, 2_500);
        assert!(limited < 128);
        let drawn = unscaled_power_mw(&strip) as u64 * limited as u64 / 256;
        assert!(drawn <= 2_500, "drawn {drawn}");
    }
}
