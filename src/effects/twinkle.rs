use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::effects::{EffectParams, LightingEffect, PALETTE};
use crate::pixels::{Pixel, BLACK};

/// Lights one random pixel per step and wipes the strip every
/// quarter-strip-length passes so it never fills up.
pub struct Twinkle {
    rng: StdRng,
    pass_count: usize,
}

impl Twinkle {
    pub fn new(rng: StdRng) -> Twinkle {
        Twinkle { rng, pass_count: 0 }
    }
}

impl LightingEffect for Twinkle {
    fn name(&self) -> &'static str {
        "twinkle"
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(200)
    }

    fn render(&mut self, strip: &mut [Pixel], _: &EffectParams) {
        let len = strip.len();
        if len == 0 {
            return;
        }

        self.pass_count += 1;
        if self.pass_count >= (len / 4).max(1) {
            self.pass_count = 0;
            strip.fill(BLACK);
        }

        let index = self.rng.gen_range(0..len);
        strip[index] = PALETTE[self.rng.gen_range(0..PALETTE.len())];
    }
}
