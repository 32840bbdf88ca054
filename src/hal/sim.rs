//! In-memory fakes of every [`super`] trait, for tests and benches.

use super::{ImuDriver, ImuSample, OrientationMatrix, PauseButton, PwmDriver, ReceiverDriver, StatusLeds};

/// A scriptable IMU: yields samples from a queue, then repeats the last one
/// (or `None` if the queue started empty).
#[derive(Debug, Default)]
pub struct SimImu {
    samples: Vec<ImuSample>,
    next: usize,
    pub orientation: OrientationMatrix,
}

impl SimImu {
    pub fn with_samples(samples: Vec<ImuSample>) -> Self {
        Self {
            samples,
            next: 0,
            orientation: [[0.0; 3]; 3],
        }
    }
}

impl ImuDriver for SimImu {
    fn init(&mut self, _sample_rate_hz: u32, orientation: OrientationMatrix) -> Result<(), String> {
        self.orientation = orientation;
        Ok(())
    }

    fn poll(&mut self) -> Option<ImuSample> {
        if self.samples.is_empty() {
            return None;
        }
        let index = self.next.min(self.samples.len() - 1);
        self.next = (self.next + 1).min(self.samples.len());
        Some(self.samples[index])
    }
}

/// Records every pulse it was sent, per channel.
#[derive(Debug, Default)]
pub struct SimPwm {
    pub last_pulse: [f32; 4],
    pub pulse_count: [u32; 4],
}

impl PwmDriver for SimPwm {
    fn init(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn send_pulse(&mut self, channel: u8, normalized: f32) {
        let index = (channel - 1) as usize;
        self.last_pulse[index] = normalized;
        self.pulse_count[index] += 1;
    }
}

/// A scriptable receiver: the test sets `frame_pending` and `channels`
/// directly between calls.
#[derive(Debug, Default)]
pub struct SimReceiver {
    pub frame_pending: bool,
    pub channels: [f32; 6],
}

impl ReceiverDriver for SimReceiver {
    fn init(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn is_new_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_pending)
    }

    fn channel_normalized(&self, channel: u8) -> f32 {
        self.channels[(channel - 1) as usize]
    }
}

/// Records the last commanded state of each LED.
#[derive(Debug, Default)]
pub struct SimLeds {
    pub red: bool,
    pub green: bool,
}

impl StatusLeds for SimLeds {
    fn set_red(&mut self, on: bool) {
        self.red = on;
    }

    fn set_green(&mut self, on: bool) {
        self.green = on;
    }
}

/// A pause button the test can hold down by setting `pressed`.
#[derive(Debug, Default)]
pub struct SimPauseButton {
    pub pressed: bool,
}

impl PauseButton for SimPauseButton {
    fn is_pressed(&mut self) -> bool {
        self.pressed
    }
}
