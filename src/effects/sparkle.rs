use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::effects::{EffectParams, LightingEffect, PALETTE};
use crate::pixels::Pixel;

pub struct Sparkle {
    rng: StdRng,
}

impl Sparkle {
    pub fn new(rng: StdRng) -> Sparkle {
        Sparkle { rng }
    }
}

impl LightingEffect for Sparkle {
    fn name(&self) -> &'static str {
        "sparkle"
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(150)
    }

    fn render(&mut self, strip: &mut [Pixel], _: &EffectParams) {
        for pixel in strip.iter_mut() {
            *pixel = PALETTE[self.rng.gen_range(0..PALETTE.len())];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::BLACK;
    use rand::SeedableRng;

    #[test]
    fn every_pixel_gets_a_palette_colour() {
        let mut sparkle = Sparkle::new(StdRng::seed_from_u64(11));
        let mut strip = vec![BLACK; 64];
        sparkle.render(
            &mut strip,
            &EffectParams {
                stripe_width: 5,
                train_length: 5,
            },
        );

        assert!(strip.iter().all(|p| PALETTE.contains(p)));
        let distinct = PALETTE.iter().filter(|c| strip.contains(c)).count();
        assert!(distinct > 1);
    }
}
