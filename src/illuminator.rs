//! The single-threaded main loop.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::clock::Clock;
use crate::intervaltimer::{FpsMeter, IntervalTimer};
use crate::output::{LedOutput, OutputStage};
use crate::pixels::PixelBuffer;
use crate::remote::{ConfigurationChannel, Telemetry};
use crate::scheduler::EffectScheduler;

pub struct Illuminator<C: Clock, O: LedOutput> {
    pixels: PixelBuffer,
    scheduler: EffectScheduler<C>,
    output: OutputStage<O>,
    channel: Box<dyn ConfigurationChannel>,
    pause_while_linked: bool,
    fps: FpsMeter,
    telemetry: Telemetry,
}

impl<C: Clock, O: LedOutput> Illuminator<C, O> {
    pub fn new(
        pixels: PixelBuffer,
        scheduler: EffectScheduler<C>,
        output: OutputStage<O>,
        channel: Box<dyn ConfigurationChannel>,
        hostname: String,
        pause_while_linked: bool,
    ) -> Illuminator<C, O> {
        Illuminator {
            pixels,
            scheduler,
            output,
            channel,
            pause_while_linked,
            fps: FpsMeter::new(),
            telemetry: Telemetry {
                hostname,
                ..Telemetry::default()
            },
        }
    }

    /// Loops until `stop` is raised, then blanks the strip.
    pub fn run(&mut self, freq_hz: f32, stop: &AtomicBool) {
        let mut timer = IntervalTimer::new(freq_hz);
        while !stop.load(Ordering::Relaxed) {
            self.tick();
            timer.sleep_until_next_tick();
        }

        log::info!("Shutting down, blanking strip");
        self.pixels.clear();
        if let Err(err) = self.output.show(self.pixels.as_slice()) {
            log::warn!("Cannot blank strip: {err}");
        }
    }

    /// One pass: service the side channel, step the effects, show the frame.
    pub fn tick(&mut self) {
        let now = self.scheduler.clock().now();
        self.channel.poll(now, &self.telemetry);

        let paused = self.pause_while_linked && self.channel.link_active();
        if !paused {
            let config = *self.channel.configuration();
            self.scheduler.tick(&mut self.pixels, &config);
        }

        if let Err(err) = self.output.show(self.pixels.as_slice()) {
            log::warn!("Cannot show frame: {err}");
        }

        self.fps.frame(now);
        self.telemetry.power_mw = self.output.power_mw();
        self.telemetry.fps = self.fps.fps();
        self.telemetry.effect_index = self.scheduler.current_index();
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn output(&self) -> &OutputStage<O> {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::RunConfiguration;
    use crate::effects::standard_rotation;
    use crate::output::RecordingOutput;
    use crate::pixels::BLACK;
    use crate::remote::LocalChannel;

    /// Channel whose link can be toggled from the test.
    struct Toggle {
        config: RunConfiguration,
        linked: std::rc::Rc<std::cell::Cell<bool>>,
    }

    impl ConfigurationChannel for Toggle {
        fn poll(&mut self, _: Duration, _: &Telemetry) {}

        fn configuration(&self) -> &RunConfiguration {
            &self.config
        }

        fn link_active(&self) -> bool {
            self.linked.get()
        }
    }

    fn illuminator(
        clock: &ManualClock,
        channel: Box<dyn ConfigurationChannel>,
    ) -> Illuminator<ManualClock, RecordingOutput> {
        let scheduler = EffectScheduler::new(clock.clone(), standard_rotation(false), true);
        Illuminator::new(
            PixelBuffer::new(150, 300),
            scheduler,
            OutputStage::new(RecordingOutput::default(), 255, u32::MAX),
            channel,
            "tree".to_string(),
            true,
        )
    }

    #[test]
    fn every_tick_shows_a_frame_and_reports_telemetry() {
        let clock = ManualClock::new();
        let mut lights = illuminator(&clock, Box::new(LocalChannel::new(RunConfiguration::default())));

        for _ in 0..350 {
            lights.tick();
            clock.advance(Duration::from_millis(20));
        }

        assert_eq!(lights.output().output().frames.len(), 350);
        // 7 seconds at 5 seconds per effect.
        assert_eq!(lights.telemetry().effect_index, 1);
        assert!((lights.telemetry().fps - 50.0).abs() < 1.0);
        assert!(lights.telemetry().power_mw > 0);
        assert_eq!(lights.telemetry().hostname, "tree");
    }

    #[test]
    fn stopped_strip_stays_dark() {
        let clock = ManualClock::new();
        let config = RunConfiguration {
            run: false,
            ..RunConfiguration::default()
        };
        let mut lights = illuminator(&clock, Box::new(LocalChannel::new(config)));

        for _ in 0..10 {
            lights.tick();
            clock.advance(Duration::from_millis(100));
        }

        let frames = &lights.output().output().frames;
        assert!(frames.iter().all(|f| f.iter().all(|p| *p == BLACK)));
    }

    #[test]
    fn effects_freeze_while_linked() {
        let clock = ManualClock::new();
        let linked = std::rc::Rc::new(std::cell::Cell::new(false));
        let channel = Toggle {
            config: RunConfiguration::default(),
            linked: linked.clone(),
        };
        let mut lights = illuminator(&clock, Box::new(channel));

        lights.tick();
        linked.set(true);
        for _ in 0..10 {
            clock.advance(Duration::from_millis(600));
            lights.tick();
        }

        let frames = &lights.output().output().frames;
        assert!(frames.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(lights.telemetry().effect_index, 0);

        linked.set(false);
        clock.advance(Duration::from_millis(600));
        lights.tick();
        let frames = &lights.output().output().frames;
        assert_ne!(frames[frames.len() - 1], frames[frames.len() - 2]);
    }
}
