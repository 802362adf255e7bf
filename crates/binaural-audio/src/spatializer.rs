//! Streaming spatializer: the pull callback that renders binaural stereo.
//!
//! Every output frame is built from the mono fold of the matching source
//! frame. One channel plays it at its own index while the other channel is
//! shifted back by the inter-aural delay, and the farther ear is attenuated
//! by the balance ratio. The shift reads up to `|delay|` frames past the
//! requested window, so the lagging channel always has real samples to play
//! while those frames are still in the source.

use binaural_bridge::AcousticParameters;

use crate::{BYTES_PER_FRAME, BYTES_PER_SAMPLE, CHANNELS, source::SourceBuffer};

const LEFT: usize = 0;
const RIGHT: usize = 1;

/// Splits a mono sample into `(left, right)` according to `balance`.
///
/// The nearer ear keeps the full amplitude. Conversion back to `i16`
/// truncates toward zero; attenuation can only shrink the magnitude, so the
/// result always fits.
#[inline]
fn apply_balance(merged: i16, balance: f32) -> (i16, i16) {
    let merged = f32::from(merged);
    if balance <= 1.0 {
        ((merged * balance) as i16, merged as i16)
    } else {
        (merged as i16, (merged / balance) as i16)
    }
}

/// Fills `output` with interleaved stereo rendered from `source`.
///
/// The requested length is the byte size of `output`. At most
/// `min(requested, remaining)` bytes are consumed from the source, and the
/// cursor is advanced by exactly the returned amount. Output frames that no
/// source frame reaches are silent, so an exhausted source yields a buffer
/// of zeros and consumes nothing.
///
/// A positive `delay_frames` lets the right channel lead: output frame `i`
/// of the right channel carries source frame `i + delay`. A negative delay
/// mirrors this for the left channel. Source frames that are not fully
/// available are treated as silence.
pub fn fill(
    output: &mut [i16],
    source: &mut SourceBuffer,
    parameters: AcousticParameters,
) -> usize {
    output.fill(0);

    let remaining = source.remaining_bytes();
    if remaining == 0 {
        return 0;
    }

    let requested = output.len() * BYTES_PER_SAMPLE;
    let frames = requested.min(remaining) / BYTES_PER_FRAME;
    let lag = parameters.delay_frames.unsigned_abs() as usize;
    // the shifted channel plays each source frame `lag` frames early, which
    // leaves the direct channel trailing behind it
    let (direct, shifted) = if parameters.delay_frames >= 0 {
        (LEFT, RIGHT)
    } else {
        (RIGHT, LEFT)
    };

    for i in 0..frames + lag {
        let merged = source.merged_frame(i).unwrap_or(0);
        let (left, right) = apply_balance(merged, parameters.balance);
        let (direct_sample, shifted_sample) = if direct == LEFT {
            (left, right)
        } else {
            (right, left)
        };

        if i < frames {
            output[i * CHANNELS + direct] = direct_sample;
        }
        if let Some(index) = i.checked_sub(lag) {
            output[index * CHANNELS + shifted] = shifted_sample;
        }
    }

    // a drained source gives up its trailing partial frame too
    let consumed = if remaining <= requested {
        remaining
    } else {
        frames * BYTES_PER_FRAME
    };
    source.advance(consumed);
    consumed
}
