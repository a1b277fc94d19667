//! Round-robin effect rotation.

use std::time::Duration;

use crate::clock::Clock;
use crate::config::RunConfiguration;
use crate::effects::{EffectParams, LightingEffect};
use crate::intervaltimer::Cadence;
use crate::pixels::PixelBuffer;

/// An effect together with the bookkeeping of when it last drew.
struct EffectSlot {
    effect: Box<dyn LightingEffect>,
    cadence: Cadence,
}

impl EffectSlot {
    fn new(effect: Box<dyn LightingEffect>) -> EffectSlot {
        let cadence = Cadence::new(effect.interval());
        EffectSlot { effect, cadence }
    }
}

pub struct EffectScheduler<C: Clock> {
    clock: C,
    slots: Vec<EffectSlot>,
    current: usize,
    selected_at: Duration,
    clear_on_transition: bool,
}

impl<C: Clock> EffectScheduler<C> {
    pub fn new(
        clock: C,
        effects: Vec<Box<dyn LightingEffect>>,
        clear_on_transition: bool,
    ) -> EffectScheduler<C> {
        assert!(!effects.is_empty(), "effect rotation must not be empty");

        let selected_at = clock.now();
        EffectScheduler {
            clock,
            slots: effects.into_iter().map(EffectSlot::new).collect(),
            current: 0,
            selected_at,
            clear_on_transition,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_name(&self) -> &'static str {
        self.slots[self.current].effect.name()
    }

    /// Runs one scheduler step against `pixels`.
    ///
    /// Returns true if the buffer may have changed.
    pub fn tick(&mut self, pixels: &mut PixelBuffer, config: &RunConfiguration) -> bool {
        if !config.run {
            pixels.clear();
            return true;
        }

        let now = self.clock.now();
        let params = EffectParams {
            stripe_width: config.stripe_width as usize,
            train_length: config.train_length as usize,
        };

        let slot = &mut self.slots[self.current];
        let mut changed = false;
        if slot.cadence.ready(now) {
            let active = config.pixel_count as usize;
            slot.effect.render(pixels.active_mut(active), &params);
            pixels.clear_from(active);
            changed = true;
        }

        let period = Duration::from_secs(config.seconds_between_effects as u64);
        if now.saturating_sub(self.selected_at) >= period {
            self.current = (self.current + 1) % self.slots.len();
            self.selected_at = now;
            log::info!(
                "Switching to effect {} ({})",
                self.current,
                self.current_name()
            );

            if self.clear_on_transition {
                pixels.clear();
                changed = true;
            }
        }

        changed
    }
}
