use crate::error::Result;
use crate::pixels::{scale, Pixel};
use crate::power::{max_brightness_for_power, unscaled_power_mw};

/// Hardware-facing driver that puts a frame on the strip.
pub trait LedOutput {
    /// Transmits `pixels`; blocks at most for one frame's transmission time.
    fn show(&mut self, pixels: &[Pixel]) -> Result<()>;
}

/// Applies global brightness and the power budget before handing frames to
/// the driver.
pub struct OutputStage<O: LedOutput> {
    output: O,
    brightness: u8,
    max_power_mw: u32,
    frame: Vec<Pixel>,
    last_power_mw: u32,
}

impl<O: LedOutput> OutputStage<O> {
    pub fn new(output: O, brightness: u8, max_power_mw: u32) -> OutputStage<O> {
        OutputStage {
            output,
            brightness,
            max_power_mw,
            frame: Vec::new(),
            last_power_mw: 0,
        }
    }

    pub fn show(&mut self, pixels: &[Pixel]) -> Result<()> {
        let brightness = max_brightness_for_power(pixels, self.brightness, self.max_power_mw);

        self.frame.clear();
        self.frame.extend(pixels.iter().map(|p| scale(*p, brightness)));
        self.last_power_mw = unscaled_power_mw(&self.frame);

        self.output.show(&self.frame)
    }

    /// Estimated draw of the last frame sent.
    pub fn power_mw(&self) -> u32 {
        self.last_power_mw
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

/// Keeps every frame it is shown.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingOutput {
    pub frames: Vec<Vec<Pixel>>,
}

#[cfg(test)]
impl LedOutput for RecordingOutput {
    fn show(&mut self, pixels: &[Pixel]) -> Result<()> {
        self.frames.push(pixels.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::WHITE;
    use palette::Srgb;

    #[test]
    fn brightness_is_applied() {
        let mut stage = OutputStage::new(RecordingOutput::default(), 127, u32::MAX);
        stage.show(&[WHITE, Srgb::new(200, 100, 0)]).unwrap();

        assert_eq!(
            stage.output().frames,
            vec![vec![Srgb::new(127, 127, 127), Srgb::new(100, 50, 0)]]
        );
        assert!(stage.power_mw() > 10);
    }

    #[test]
    fn power_budget_dims_the_frame() {
        let mut stage = OutputStage::new(RecordingOutput::default(), 255, 2_500);
        stage.show(&[WHITE; 150]).unwrap();

        let frame = &stage.output().frames[0];
        assert!(frame[0].red < 255);
        assert!(stage.power_mw() <= 2_500 + 150 * 5);
    }
}
