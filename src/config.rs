use crate::settings::{
    CANDY_STRIPE_WIDTH, NUMBER_OF_LIGHTS, SECONDS_BETWEEN_EFFECTS, TRAIN_CAR_LENGTH,
};

/// Parameters the effects run with; remotely adjustable and persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunConfiguration {
    pub run: bool,
    pub pixel_count: u32,
    pub stripe_width: u32,
    pub train_length: u32,
    pub seconds_between_effects: u32,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        RunConfiguration {
            run: true,
            pixel_count: NUMBER_OF_LIGHTS,
            stripe_width: CANDY_STRIPE_WIDTH,
            train_length: TRAIN_CAR_LENGTH,
            seconds_between_effects: SECONDS_BETWEEN_EFFECTS,
        }
    }
}
