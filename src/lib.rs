//! Touch gesture arbitration for an interactive map.
//!
//! Raw pointer, key, trackball and wheel input goes into a
//! [`GestureArbiter`], which runs the pan/tap, pinch, rotate and shove
//! recognizers over the same stream, decides which one owns it, and drives a
//! host-provided camera through the traits in [`host`].

pub mod arbiter;
pub mod config;
mod discrete;
pub mod event;
pub mod host;
pub mod recognizer;
pub mod recording;
pub mod rotate;
pub mod scale;
pub mod scheduler;
pub mod session;
pub mod shove;
pub mod tap;

#[cfg(test)]
mod testing;

pub use arbiter::GestureArbiter;
pub use config::{GestureSettings, Profile, ProfileError, ProfileStore, Thresholds};
pub use event::{
    ButtonState, GenericMotionEvent, KeyCode, KeyEvent, MotionAction, Phase, Point, Pointer,
    PointerEvent, Source, TrackballEvent,
};
pub use host::MapHost;
pub use recording::{Command, RecordingHost};
