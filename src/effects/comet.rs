use std::time::Duration;

use palette::{FromColor, Hsv, Srgb};
use rand::rngs::StdRng;
use rand::Rng;

use crate::effects::{EffectParams, LightingEffect};
use crate::pixels::{fade_to_black_by, Pixel};

pub const COMET_SIZE: usize = 10;
const FADE_AMOUNT: u8 = 64;
const HUE_DEGREES: f32 = 0.0;

/// A bright head bouncing between the strip ends, leaving a fading tail.
pub struct Comet {
    rng: StdRng,
    random_decay: bool,
    position: usize,
    forward: bool,
    color: Pixel,
}

impl Comet {
    pub fn new(rng: StdRng) -> Comet {
        let color: Srgb = Srgb::from_color(Hsv::new(HUE_DEGREES, 1.0, 1.0));
        Comet {
            rng,
            random_decay: false,
            position: 0,
            forward: true,
            color: color.into_format(),
        }
    }

    /// Let every pixel skip a fade step with even odds.
    pub fn with_random_decay(mut self, random_decay: bool) -> Comet {
        self.random_decay = random_decay;
        self
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn forward(&self) -> bool {
        self.forward
    }

    fn advance(&mut self, last: usize) {
        if self.position >= last {
            // The strip may have shrunk under us.
            self.position = last;
            self.forward = false;
        }

        if self.forward {
            self.position += 1;
        } else if self.position > 0 {
            self.position -= 1;
        }

        if self.position == last || self.position == 0 {
            self.forward = !self.forward;
        }
    }
}

impl LightingEffect for Comet {
    fn name(&self) -> &'static str {
        "comet"
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(100)
    }

    fn render(&mut self, strip: &mut [Pixel], _: &EffectParams) {
        let len = strip.len();
        if len == 0 {
            return;
        }

        for pixel in strip.iter_mut() {
            if self.random_decay && self.rng.gen_bool(0.5) {
                continue;
            }
            *pixel = fade_to_black_by(*pixel, FADE_AMOUNT);
        }

        if len > COMET_SIZE {
            self.advance(len - COMET_SIZE);
        } else {
            self.position = 0;
        }

        let end = (self.position + COMET_SIZE).min(len);
        strip[self.position..end].fill(self.color);
    }
}
