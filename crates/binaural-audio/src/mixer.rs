/// Folds one interleaved stereo frame down to a mono sample.
///
/// Each channel is halved before the sum, `mono = left / 2 + right / 2`,
/// using truncating integer division. Because both halves fit in half the
/// range of `T`, the sum can never overflow, so no saturation is needed.
#[inline]
pub fn merge_frame<T>(left: T, right: T) -> T
where
    T: num_traits::PrimInt,
{
    let two = T::one() + T::one();
    left / two + right / two
}
