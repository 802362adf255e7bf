//! Binaural rendering of a stereo PCM source for a point sound source.
//!
//! This crate holds the real-time side of the renderer:
//! - Solving listener geometry into an inter-aural delay and level ratio.
//! - Folding interleaved 16-bit stereo frames to mono.
//! - Re-spatializing those mono samples into delayed, balanced stereo on a
//!   pull-based output callback.
//! - Decoding the WAV source and opening `cpal` output streams.
//!
//! # Real-time constraints
//! [`spatializer::fill`] runs on the audio thread. It never allocates, locks
//! or blocks; the only shared state it touches is the parameter snapshot
//! loaded once per invocation. The output stream reserves its render buffer
//! up front and only reallocates if the backend delivers a larger buffer
//! than the one it reserved.

pub mod device;
pub mod mixer;
pub mod solver;
pub mod source;
pub mod spatializer;

/// Number of interleaved channels in both the source and the output.
pub const CHANNELS: usize = 2;

/// Size of one signed 16-bit sample, in bytes.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Size of one stereo frame, in bytes.
pub const BYTES_PER_FRAME: usize = CHANNELS * BYTES_PER_SAMPLE;
