use std::time::Duration;

use crate::effects::{EffectParams, LightingEffect};
use crate::pixels::{Pixel, BLACK, DARK_GREEN, DARK_RED};

/// A red and a green car running down the strip.
///
/// Cars running off the far end are clipped; they do not wrap to the start.
pub struct Train {
    offset: usize,
}

impl Train {
    pub fn new() -> Train {
        Train { offset: 0 }
    }
}

impl LightingEffect for Train {
    fn name(&self) -> &'static str {
        "train"
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(250)
    }

    fn render(&mut self, strip: &mut [Pixel], params: &EffectParams) {
        let len = strip.len();
        if len == 0 {
            return;
        }
        let car = params.train_length.max(1);
        self.offset %= len;

        strip.fill(BLACK);
        for j in 0..car {
            if let Some(pixel) = strip.get_mut(self.offset + j) {
                *pixel = DARK_RED;
            }
            if let Some(pixel) = strip.get_mut(self.offset + car + j) {
                *pixel = DARK_GREEN;
            }
        }

        self.offset = (self.offset + 1) % len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_both_cars_at_offset() {
        let mut train = Train::new();
        let mut strip = vec![BLACK; 20];
        let params = EffectParams {
            stripe_width: 5,
            train_length: 3,
        };

        train.render(&mut strip, &params);
        assert_eq!(&strip[0..3], &[DARK_RED; 3]);
        assert_eq!(&strip[3..6], &[DARK_GREEN; 3]);
        assert!(strip[6..].iter().all(|p| *p == BLACK));

        train.render(&mut strip, &params);
        assert_eq!(strip[0], BLACK);
        assert_eq!(&strip[1..4], &[DARK_RED; 3]);
        assert_eq!(&strip[4..7], &[DARK_GREEN; 3]);
    }

    #[test]
    fn cars_are_clipped_at_the_end() {
        let len = 30;
        let car = 4;
        let mut train = Train::new();
        let params = EffectParams {
            stripe_width: 5,
            train_length: car,
        };

        for offset in 0..len {
            let mut strip = vec![BLACK; len];
            train.render(&mut strip, &params);

            let lit = strip.iter().filter(|p| **p != BLACK).count();
            let expected = (len - offset).min(2 * car);
            assert_eq!(lit, expected, "offset {offset}");
            assert!(strip[..offset].iter().all(|p| *p == BLACK));
        }

        // Wrapped back to the start.
        let mut strip = vec![BLACK; len];
        train.render(&mut strip, &params);
        assert_eq!(strip[0], DARK_RED);
    }
}
