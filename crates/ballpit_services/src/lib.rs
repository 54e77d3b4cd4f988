//! Ballpit Services Layer
//!
//! Host-side concerns around the simulation: persisted settings, the key
//! map, and input recordings for headless replay.

pub mod input;
pub mod settings;

pub use input::{InputCommand, InputFrame, InputRecorder, InputRecording, Key, RecordingError};
pub use settings::{Settings, SettingsError, WindowSettings};
