use std::time::Duration;

use crate::effects::{EffectParams, LightingEffect};
use crate::pixels::{Pixel, DARK_RED, WHITE};

/// Red stripes on white, rotating one pixel per step.
///
/// Rotation is only seamless when the strip length is a multiple of twice the
/// stripe width.
pub struct CandyCane {
    offset: usize,
}

impl CandyCane {
    pub fn new() -> CandyCane {
        CandyCane { offset: 0 }
    }
}

impl LightingEffect for CandyCane {
    fn name(&self) -> &'static str {
        "candy cane"
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(500)
    }

    fn render(&mut self, strip: &mut [Pixel], params: &EffectParams) {
        let len = strip.len();
        if len == 0 {
            return;
        }
        let width = params.stripe_width.max(1);
        self.offset %= len;

        strip.fill(WHITE);
        for start in (0..len).step_by(2 * width) {
            for i in start..(start + width).min(len) {
                strip[(i + self.offset) % len] = DARK_RED;
            }
        }

        self.offset = (self.offset + 1) % len;
    }
}
