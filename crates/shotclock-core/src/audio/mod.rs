//! Tone cue playback.
//!
//! rodio's output stream and sink are not `Send`, so a dedicated audio
//! thread owns them and the rest of the crate talks to it over a command
//! channel. Playback is fire-and-forget: a tone already queued plays to
//! completion even if the phase advances right after.

mod tone;

pub use tone::Tone;

use rodio::{OutputStream, Sink};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread;

use crate::error::AudioError;

/// A discrete audio trigger emitted by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueKind {
    /// Countdown beep in the last three seconds of a phase.
    ShortBeep,
    /// A phase ended and another follows.
    FinishBeep,
    /// The whole session ended.
    CompletionBeeps,
}

impl CueKind {
    /// The frequency/duration pairs making up this cue. Multi-tone cues
    /// queue back-to-back on the sink with no caller-side delay.
    fn tones(self) -> &'static [(f32, f32)] {
        match self {
            CueKind::ShortBeep => &[(1200.0, 0.125)],
            CueKind::FinishBeep => &[(1500.0, 0.25)],
            CueKind::CompletionBeeps => &[(1000.0, 0.125), (1600.0, 0.125)],
        }
    }
}

enum AudioCommand {
    StartEngine,
    StopEngine,
    SetVolume(f32),
    Play(CueKind),
}

/// Handle to the audio thread. Cheap to share by reference; all methods
/// are non-blocking. Dropping the handle stops the engine, so the output
/// device is released on every exit path.
pub struct TonePlayer {
    tx: Mutex<Option<Sender<AudioCommand>>>,
}

impl TonePlayer {
    pub fn new() -> Self {
        Self {
            tx: Mutex::new(None),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, AudioError> {
        let mut guard = self.tx.lock().map_err(|_| AudioError::ChannelClosed)?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("tone-player".to_string())
            .spawn(move || {
                // The stream must stay alive as long as the sink plays.
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), AudioError> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| AudioError::StreamUnavailable(e.to_string()))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| AudioError::StreamUnavailable(e.to_string()))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::StartEngine => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                            if let Err(e) = ensure_sink(&mut _stream, &mut sink) {
                                log::error!("could not start audio engine: {e}");
                            }
                        }
                        AudioCommand::StopEngine => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                        }
                        AudioCommand::SetVolume(v) => {
                            if let Some(ref s) = sink {
                                s.set_volume(v.clamp(0.0, 1.0));
                            }
                        }
                        AudioCommand::Play(cue) => {
                            if let Err(e) = ensure_sink(&mut _stream, &mut sink) {
                                log::warn!("dropping cue {cue:?}: {e}");
                                continue;
                            }
                            if let Some(ref s) = sink {
                                for &(freq_hz, duration_secs) in cue.tones() {
                                    s.append(Tone::new(freq_hz, duration_secs));
                                }
                            }
                        }
                    }
                }
            })
            .map_err(|e| AudioError::ThreadSpawn(e.to_string()))?;

        let tx_clone = tx.clone();
        *guard = Some(tx);
        Ok(tx_clone)
    }

    fn send(&self, cmd: AudioCommand) -> Result<(), AudioError> {
        self.ensure_thread()?
            .send(cmd)
            .map_err(|_| AudioError::ChannelClosed)
    }

    /// Acquire the output device. Call once when the timer session starts.
    pub fn start_engine(&self) -> Result<(), AudioError> {
        self.send(AudioCommand::StartEngine)
    }

    /// Release the output device. In-flight tones are cut off.
    pub fn stop_engine(&self) -> Result<(), AudioError> {
        if let Ok(guard) = self.tx.lock() {
            if let Some(tx) = guard.as_ref() {
                return tx
                    .send(AudioCommand::StopEngine)
                    .map_err(|_| AudioError::ChannelClosed);
            }
        }
        Ok(())
    }

    /// Set playback volume, 0.0 ..= 1.0.
    pub fn set_volume(&self, volume: f32) -> Result<(), AudioError> {
        self.send(AudioCommand::SetVolume(volume))
    }

    /// Queue a cue for playback and return immediately.
    pub fn play(&self, cue: CueKind) -> Result<(), AudioError> {
        self.send(AudioCommand::Play(cue))
    }
}

impl Default for TonePlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TonePlayer {
    fn drop(&mut self) {
        let _ = self.stop_engine();
    }
}
