use std::time::Duration;

use crate::effects::{EffectParams, LightingEffect};
use crate::pixels::{Pixel, DARK_BLUE, DARK_RED, WHITE};

/// Rotating blue, white and red bands.
pub struct RedWhiteBlue {
    offset: usize,
}

impl RedWhiteBlue {
    pub fn new() -> RedWhiteBlue {
        RedWhiteBlue { offset: 0 }
    }
}

impl LightingEffect for RedWhiteBlue {
    fn name(&self) -> &'static str {
        "red white blue"
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

        for i in 0..len {
            let color = match (i % (3 * width)) / width {
                0 => DARK_BLUE,
                1 => WHITE,
                _ => DARK_RED,
            };
            strip[(i + self.offset) % len] = color;
        }

        self.offset = (self.offset + 1) % len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::BLACK;

    #[test]
    fn bands_follow_stripe_width() {
        let mut flag = RedWhiteBlue::new();
        let mut strip = vec![BLACK; 12];
        let params = EffectParams {
            stripe_width: 2,
            train_length: 5,
        };

        flag.render(&mut strip, &params);
        assert_eq!(
            strip,
            vec![
                DARK_BLUE, DARK_BLUE, WHITE, WHITE, DARK_RED, DARK_RED, DARK_BLUE, DARK_BLUE,
                WHITE, WHITE, DARK_RED, DARK_RED,
            ]
        );

        flag.render(&mut strip, &params);
        assert_eq!(strip[0], DARK_RED);
        assert_eq!(&strip[1..3], &[DARK_BLUE; 2]);
    }
}
