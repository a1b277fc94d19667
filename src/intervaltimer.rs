use std::time::{Duration, Instant};

/// Rate limiter driven by an external clock reading.
///
/// Fires on the first check and then whenever at least `interval` has passed
/// since the last time it fired.
pub struct Cadence {
    interval: Duration,
    last_fired: Option<Duration>,
}

impl Cadence {
    pub fn new(interval: Duration) -> Cadence {
        Cadence {
            interval,
            last_fired: None,
        }
    }

    pub fn ready(&mut self, now: Duration) -> bool {
        let due = match self.last_fired {
            Some(last) => now.saturating_sub(last) >= self.interval,
            None => true,
        };

        if due {
            self.last_fired = Some(now);
        }
        due
    }
}

/// Paces the main loop to a fixed frame rate.
pub struct IntervalTimer {
    interval: Duration,
    last_tick: Instant,
}

impl IntervalTimer {
    pub fn new(freq_hz: f32) -> IntervalTimer {
        let frame_duration_microsec = 1000.0 / freq_hz.max(1.0) * 1000.0;

        IntervalTimer {
            interval: Duration::from_micros(frame_duration_microsec as u64),
            last_tick: Instant::now(),
        }
    }

    pub fn sleep_until_next_tick(&mut self) {
        let now = Instant::now();
        let next_tick = if self.last_tick + self.interval > now {
            self.last_tick + self.interval
        } else {
            log::debug!("Frame took longer than {:?}, skipping", self.interval);
            now + self.interval
        };

        std::thread::sleep(next_tick - now);
        self.last_tick = next_tick
    }
}

/// Exponential moving average of the frame rate.
#[derive(Default)]
pub struct FpsMeter {
    fps: f32,
    last_frame: Option<Duration>,
}

impl FpsMeter {
    pub fn new() -> FpsMeter {
        FpsMeter::default()
    }

    pub fn frame(&mut self, now: Duration) {
        if let Some(last) = self.last_frame {
            let elapsed = now.saturating_sub(last).as_secs_f32();
            if elapsed > 0.0 {
                self.fps = 0.9 * self.fps + 0.1 * (1.0 / elapsed);
            }
        }
        self.last_frame = Some(now);
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_fires_once_per_interval() {
        let mut cadence = Cadence::new(Duration::from_millis(500));

        assert!(cadence.ready(Duration::ZERO));
        assert!(!cadence.ready(Duration::from_millis(100)));
        assert!(!cadence.ready(Duration::from_millis(499)));
        assert!(cadence.ready(Duration::from_millis(500)));
        assert!(!cadence.ready(Duration::from_millis(999)));
        assert!(cadence.ready(Duration::from_millis(1200)));
    }

    #[test]
    fn fps_converges_on_steady_rate() {
        let mut meter = FpsMeter::new();
        for frame in 0..200 {
            meter.frame(Duration::from_millis(20 * frame));
        }
        assert!((meter.fps() - 50.0).abs() < 0.5, "fps = {}", meter.fps());
    }
}
