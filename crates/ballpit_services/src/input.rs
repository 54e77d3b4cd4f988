//! Input abstraction and recording for replays
//!
//! A host translates platform events into [`InputFrame`]s: one pointer
//! sample, the frame's `dt`, and any discrete commands triggered by keys.
//! Frames can be captured with [`InputRecorder`] and stored as JSON so a run
//! can be replayed headlessly.

use ballpit_core::glam::Vec2;
use ballpit_core::{PointerInput, SimCommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bodies added or removed per key press.
pub const KEY_BATCH: usize = 20;

#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("failed to access recording {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed recording: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("frame {index} has invalid dt {dt}")]
    InvalidFrame { index: usize, dt: f32 },
}

/// Host-level command: either forwarded to the simulation or handled by the
/// window layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputCommand {
    Sim(SimCommand),
    ToggleFullscreen,
    Quit,
}

/// Keys the host reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Digit1,
    Digit2,
    F11,
    Escape,
    Q,
}

impl Key {
    pub fn command(self) -> InputCommand {
        match self {
            Key::Space => InputCommand::Sim(SimCommand::Scatter),
            Key::Digit1 => InputCommand::Sim(SimCommand::AddBodies { count: KEY_BATCH }),
            Key::Digit2 => InputCommand::Sim(SimCommand::RemoveBodies { count: KEY_BATCH }),
            Key::F11 => InputCommand::ToggleFullscreen,
            Key::Escape | Key::Q => InputCommand::Quit,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    pub dt: f32,
    pub pointer: PointerInput,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<InputCommand>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputRecording {
    pub frames: Vec<InputFrame>,
}

impl InputRecording {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordingError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RecordingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let recording = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), frames = recording.len(), "loaded recording");
        Ok(recording)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordingError> {
        let path = path.as_ref();
        let text = serde_json::to_string(self)?;
        std::fs::write(path, text).map_err(|source| RecordingError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse and reject frames with a negative or non-finite `dt`.
    pub fn from_json(text: &str) -> Result<Self, RecordingError> {
        let recording: Self = serde_json::from_str(text)?;
        if let Some((index, frame)) = recording
            .frames
            .iter()
            .enumerate()
            .find(|(_, f)| !f.dt.is_finite() || f.dt < 0.0)
        {
            return Err(RecordingError::InvalidFrame { index, dt: frame.dt });
        }
        Ok(recording)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Total simulated time in seconds.
    pub fn duration(&self) -> f32 {
        self.frames.iter().map(|f| f.dt).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputFrame> {
        self.frames.iter()
    }

    /// Scripted session at 60 Hz in an 800x800 window: let the pile
    /// settle, drag and fling a body, slosh a container around, then
    /// scatter, add and remove bodies, and toggle fullscreen twice.
    pub fn demo() -> Self {
        let mut rec = InputRecorder::new();
        let dt = 1.0 / 60.0;

        for _ in 0..120 {
            rec.record(dt, PointerInput::default());
        }

        // Grab near the floor and drag upward, speeding up before release
        let start = Vec2::new(400.0, 770.0);
        for i in 0..60 {
            let t = i as f32 / 60.0;
            let p = start + Vec2::new(200.0 * t, -450.0 * t * t);
            rec.record(dt, PointerInput::at(p).with_primary(true));
        }
        rec.record(dt, PointerInput::at(Vec2::new(600.0, 320.0)));

        for _ in 0..60 {
            rec.record(dt, PointerInput::default());
        }

        // Scoop with the container and swirl it around
        let center = Vec2::new(400.0, 680.0);
        for i in 0..180 {
            let angle = i as f32 / 180.0 * std::f32::consts::TAU;
            let p = center + Vec2::from_angle(angle) * 120.0 - Vec2::new(120.0, 0.0);
            rec.record(dt, PointerInput::at(p).with_secondary(true));
        }
        rec.record(dt, PointerInput::at(center));

        let keys = [Key::Space, Key::Digit1, Key::Digit2, Key::F11];
        for key in keys {
            rec.press(dt, PointerInput::default(), key);
            for _ in 0..60 {
                rec.record(dt, PointerInput::default());
            }
        }
        rec.press(dt, PointerInput::default(), Key::F11);
        for _ in 0..60 {
            rec.record(dt, PointerInput::default());
        }
        rec.press(dt, PointerInput::default(), Key::Escape);
        rec.finish()
    }
}

/// Accumulates frames into an [`InputRecording`].
#[derive(Debug, Default)]
pub struct InputRecorder {
    frames: Vec<InputFrame>,
}

impl InputRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, dt: f32, pointer: PointerInput) {
        self.frames.push(InputFrame {
            dt,
            pointer,
            commands: Vec::new(),
        });
    }

    /// Record a frame that also carries the command bound to `key`.
    pub fn press(&mut self, dt: f32, pointer: PointerInput, key: Key) {
        self.frames.push(InputFrame {
            dt,
            pointer,
            commands: vec![key.command()],
        });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn finish(self) -> InputRecording {
        InputRecording { frames: self.frames }
    }
}
