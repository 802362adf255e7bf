//! Decoded PCM source consumed by the spatializer.

use std::path::{Path, PathBuf};

use crate::{BYTES_PER_SAMPLE, CHANNELS, mixer::merge_frame};

/// Errors that can occur while loading the audio source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The file is missing, unreadable or not a valid WAV stream.
    #[error("invalid or missing file {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    /// The file decoded fine but is not signed 16-bit little endian stereo.
    #[error(
        "expected signed 16 bit 2 channel little endian audio, got: {channels} ch, \
         {bits_per_sample} bit {sample_kind}, {endianness} endian"
    )]
    UnsupportedFormat {
        channels: u16,
        bits_per_sample: u16,
        sample_kind: &'static str,
        endianness: &'static str,
    },
}

/// Interleaved signed 16-bit stereo samples with a read cursor.
///
/// The cursor only moves forward; once every sample is consumed the buffer
/// stays exhausted for good.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    samples: Vec<i16>,
    cursor: usize,
    sample_rate: u32,
}

impl SourceBuffer {
    /// Wraps already-decoded interleaved stereo samples.
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            cursor: 0,
            sample_rate,
        }
    }

    /// Decodes the WAV file at `path`.
    ///
    /// Only 2-channel, 16-bit integer PCM is accepted. RIFF WAV data is
    /// always little endian, so that part of the format check always holds.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let decode_error = |source| SourceError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let reader = hound::WavReader::open(path).map_err(decode_error)?;
        let spec = reader.spec();
        if spec.channels as usize != CHANNELS
            || spec.bits_per_sample as usize != BYTES_PER_SAMPLE * 8
            || spec.sample_format != hound::SampleFormat::Int
        {
            return Err(SourceError::UnsupportedFormat {
                channels: spec.channels,
                bits_per_sample: spec.bits_per_sample,
                sample_kind: match spec.sample_format {
                    hound::SampleFormat::Int => "integer",
                    hound::SampleFormat::Float => "float",
                },
                endianness: "little",
            });
        }

        let samples = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_error)?;
        log::info!(
            "Decoded {} ({} frames at {} Hz)",
            path.display(),
            samples.len() / CHANNELS,
            spec.sample_rate
        );

        Ok(Self::from_samples(samples, spec.sample_rate))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of bytes that have not been consumed yet.
    #[inline]
    pub fn remaining_bytes(&self) -> usize {
        (self.samples.len() - self.cursor) * BYTES_PER_SAMPLE
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.samples.len()
    }

    /// Returns the mono fold of the frame `offset` frames past the cursor,
    /// or `None` when that frame is not fully available.
    #[inline]
    pub fn merged_frame(&self, offset: usize) -> Option<i16> {
        let start = self.cursor.checked_add(offset.checked_mul(CHANNELS)?)?;
        match self.samples.get(start..start.checked_add(CHANNELS)?)? {
            [left, right] => Some(merge_frame(*left, *right)),
            _ => None,
        }
    }

    /// Moves the cursor forward by `bytes`, stopping at the end of the data.
    #[inline]
    pub fn advance(&mut self, bytes: usize) {
        let samples = bytes.div_ceil(BYTES_PER_SAMPLE);
        self.cursor = self.cursor.saturating_add(samples).min(self.samples.len());
    }
}
