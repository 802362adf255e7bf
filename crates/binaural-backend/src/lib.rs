//! Playback runtime entry point and public API surface.
//!
//! This crate owns the session lifecycle: it decodes the source, opens the
//! output stream with the spatializer as its pull callback, and runs the
//! foreground loop that turns listener geometry read from the user into
//! freshly published acoustic parameters.

mod input;
mod runtime;
mod session;

pub use crate::input::ParameterReader;
pub use crate::runtime::{SessionError, list_output_devices, run, run_parameter_loop};
pub use crate::session::PlaybackSession;
