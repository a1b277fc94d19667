use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::effects::{EffectParams, LightingEffect};
use crate::pixels::{Pixel, DARK_GREEN, DARK_RED};

/// Every pixel flips a coin between red and green.
pub struct RandomGreenRed {
    rng: StdRng,
}

impl RandomGreenRed {
    pub fn new(rng: StdRng) -> RandomGreenRed {
        RandomGreenRed { rng }
    }
}

impl LightingEffect for RandomGreenRed {
    fn name(&self) -> &'static str {
        "random green and red"
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(750)
    }

    fn render(&mut self, strip: &mut [Pixel], _: &EffectParams) {
        for pixel in strip.iter_mut() {
            *pixel = if self.rng.gen_bool(0.5) {
                DARK_RED
            } else {
                DARK_GREEN
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::BLACK;
    use rand::SeedableRng;

    #[test]
    fn roughly_even_split() {
        let mut effect = RandomGreenRed::new(StdRng::seed_from_u64(42));
        let mut strip = vec![BLACK; 300];
        let params = EffectParams {
            stripe_width: 5,
            train_length: 5,
        };

        let mut red = 0;
        for _ in 0..10 {
            effect.render(&mut strip, &params);
            assert!(strip.iter().all(|p| *p == DARK_RED || *p == DARK_GREEN));
            red += strip.iter().filter(|p| **p == DARK_RED).count();
        }

        // 3000 draws; 1300..1700 is far outside any plausible deviation.
        assert!((1300..1700).contains(&red), "red = {red}");
    }
}
