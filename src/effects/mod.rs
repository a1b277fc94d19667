pub(crate) mod candycane;
pub(crate) mod comet;
pub(crate) mod greenred;
pub(crate) mod redwhiteblue;
pub(crate) mod sparkle;
pub(crate) mod train;
pub(crate) mod twinkle;

use std::time::Duration;

use palette::Srgb;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::pixels::Pixel;

pub use candycane::CandyCane;
pub use comet::Comet;
pub use greenred::RandomGreenRed;
pub use redwhiteblue::RedWhiteBlue;
pub use sparkle::Sparkle;
pub use train::Train;
pub use twinkle::Twinkle;

/// Colours the twinkle and sparkle effects pick from.
pub const PALETTE: [Pixel; 5] = [
    Srgb::new(255, 0, 0),
    Srgb::new(0, 0, 255),
    Srgb::new(128, 0, 128),
    Srgb::new(0, 128, 0),
    Srgb::new(255, 165, 0),
];

/// Run parameters the effects draw with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectParams {
    pub stripe_width: usize,
    pub train_length: usize,
}

pub trait LightingEffect {
    fn name(&self) -> &'static str;

    /// Minimum time between two visible changes.
    fn interval(&self) -> Duration;

    /// Draws the next frame into `strip`, whose length is the active pixel count.
    fn render(&mut self, strip: &mut [Pixel], params: &EffectParams);
}

/// The fixed effect rotation, in display order.
///
/// `random_comet_decay` makes the comet tail fade unevenly, which is how the
/// strip looks when the attribute link is in use.
pub fn standard_rotation(random_comet_decay: bool) -> Vec<Box<dyn LightingEffect>> {
    vec![
        Box::new(CandyCane::new()),
        Box::new(RandomGreenRed::new(StdRng::from_entropy())),
        Box::new(Train::new()),
        Box::new(RedWhiteBlue::new()),
        Box::new(Twinkle::new(StdRng::from_entropy())),
        Box::new(Comet::new(StdRng::from_entropy()).with_random_decay(random_comet_decay)),
        Box::new(Sparkle::new(StdRng::from_entropy())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_intervals_stay_within_frame_budget() {
        for effect in standard_rotation(false) {
            let interval = effect.interval();
            assert!(
                interval >= Duration::from_millis(100) && interval <= Duration::from_millis(750),
                "{} changes every {:?}",
                effect.name(),
                interval
            );
        }
    }

    #[test]
    fn every_effect_survives_an_empty_strip() {
        let params = EffectParams {
            stripe_width: 0,
            train_length: 0,
        };
        for mut effect in standard_rotation(true) {
            effect.render(&mut [], &params);
        }
    }
}
