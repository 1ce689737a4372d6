use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44_100;

/// Fade length in seconds applied to each end of a tone. Clamped to at
/// most 15% of the buffer so very short tones still ramp cleanly.
const FADE_SECS: f32 = 0.005;

/// A finite mono sine tone with a linear fade-in/fade-out envelope.
///
/// The fade removes the click a hard-edged sine would produce on consumer
/// speakers. Samples are generated lazily as the sink pulls them.
pub struct Tone {
    freq_hz: f32,
    total_samples: usize,
    fade_samples: usize,
    pos: usize,
}

impl Tone {
    pub fn new(freq_hz: f32, duration_secs: f32) -> Self {
        let total_samples = (duration_secs.max(0.0) * SAMPLE_RATE as f32).ceil() as usize;
        let fade_samples = ((FADE_SECS * SAMPLE_RATE as f32)
            .min(total_samples as f32 * 0.15) as usize)
            .max(1);
        Self {
            freq_hz,
            total_samples,
            fade_samples,
            pos: 0,
        }
    }

    fn envelope(&self, i: usize) -> f32 {
        if i < self.fade_samples {
            i as f32 / self.fade_samples as f32
        } else if i > self.total_samples.saturating_sub(self.fade_samples) {
            (self.total_samples - i) as f32 / self.fade_samples as f32
        } else {
            1.0
        }
    }
}

impl Iterator for Tone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.total_samples {
            return None;
        }
        let t = self.pos as f32 / SAMPLE_RATE as f32;
        let sample = (2.0 * PI * self.freq_hz * t).sin() * self.envelope(self.pos);
        self.pos += 1;
        Some(sample)
    }
}

impl Source for Tone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples - self.pos)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(
            self.total_samples as f32 / SAMPLE_RATE as f32,
        ))
    }
}
