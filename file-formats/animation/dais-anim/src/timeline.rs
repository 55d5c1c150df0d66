//! Keyframe timelines and the percentage sampler
//!
//! A timeline is a sparse track of keyframes for one channel of one bone.
//! Keys sit on an irregular, non-decreasing percentage axis and are
//! interpolated linearly (vectors) or with a short-path blend (quaternions).

use std::marker::PhantomData;

use byteorder::{ByteOrder, LittleEndian};
use glam::{Quat, Vec3};

use crate::error::{AnimError, Result};
use crate::types::KeyValue;

/// How rotation keys are blended between two keyframes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum RotationBlend {
    /// Weighted sum on the short path, result left unnormalized
    ///
    /// Fast and close enough for densely sampled tracks. The magnitude of the
    /// result dips below one between keys.
    #[default]
    Approximate,
    /// Same blend followed by a renormalization
    Normalized,
}

/// Sampler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SamplerConfig {
    pub rotation_blend: RotationBlend,
}

impl SamplerConfig {
    /// Settings that renormalize blended rotations
    pub const fn normalized() -> Self {
        Self {
            rotation_blend: RotationBlend::Normalized,
        }
    }
}

/// Values that can be blended between two keyframes
pub trait Interpolate: KeyValue {
    /// Blend from `self` towards `to` by `t` in `[0, 1]`
    fn interpolate(&self, to: &Self, t: f32, config: &SamplerConfig) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(&self, to: &Self, t: f32, _config: &SamplerConfig) -> Self {
        // Exact at both ends, unlike `a + (b - a) * t`.
        *self * (1.0 - t) + *to * t
    }
}

impl Interpolate for Quat {
    fn interpolate(&self, to: &Self, t: f32, config: &SamplerConfig) -> Self {
        let cosom = self.dot(*to);
        let scale0 = 1.0 - t;
        let scale1 = t.copysign(cosom);
        let blended = *self * scale0 + *to * scale1;
        match config.rotation_blend {
            RotationBlend::Approximate => blended,
            RotationBlend::Normalized => blended.normalize(),
        }
    }
}

/// Read access to the keys of a timeline
///
/// Implemented by the zero-copy [`Timeline`] view and the owned
/// [`TimelineData`], so both can be sampled the same way.
pub trait Track<T: KeyValue> {
    /// Number of keyframes
    fn key_count(&self) -> usize;

    /// Percentage of keyframe `index`
    fn percentage(&self, index: usize) -> f32;

    /// Value of keyframe `index`
    fn value(&self, index: usize) -> T;

    /// Whether the percentages never decrease
    fn is_sorted(&self) -> bool {
        (1..self.key_count()).all(|i| self.percentage(i - 1) <= self.percentage(i))
    }

    /// Interpolated value at `percent`, `None` for an empty track
    fn sample(&self, percent: f32, config: &SamplerConfig) -> Option<T>
    where
        T: Interpolate,
    {
        sample(self, percent, config)
    }
}

/// Zero-copy timeline over a loaded animation buffer
///
/// Percentages and values stay encoded in the source buffer and are decoded
/// on access.
#[derive(Clone, Copy)]
pub struct Timeline<'a, T: KeyValue> {
    percentages: &'a [u8],
    values: &'a [u8],
    count: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: KeyValue> Timeline<'a, T> {
    /// Wrap already bounds-checked percentage and value byte ranges
    pub(crate) fn new(percentages: &'a [u8], values: &'a [u8], count: usize) -> Self {
        debug_assert_eq!(percentages.len(), count * 4);
        debug_assert_eq!(values.len(), count * T::SIZE);
        Self {
            percentages,
            values,
            count,
            _marker: PhantomData,
        }
    }

    /// An empty timeline (channel not animated)
    pub fn empty() -> Self {
        Self::new(&[], &[], 0)
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the timeline has no keyframes
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate over the keyframe percentages
    pub fn percentages(&self) -> impl Iterator<Item = f32> + use<'a, T> {
        self.percentages.chunks_exact(4).map(LittleEndian::read_f32)
    }

    /// Iterate over the keyframe values
    pub fn values(&self) -> impl Iterator<Item = T> + use<'a, T> {
        self.values.chunks_exact(T::SIZE).map(T::decode)
    }

    /// Iterate over `(percentage, value)` pairs
    pub fn keys(&self) -> impl Iterator<Item = (f32, T)> + use<'a, T> {
        self.percentages().zip(self.values())
    }

    /// Decode into an owned timeline
    pub fn to_owned_data(&self) -> TimelineData<T> {
        TimelineData {
            percentages: self.percentages().collect(),
            values: self.values().collect(),
        }
    }
}

impl<T: KeyValue> Track<T> for Timeline<'_, T> {
    fn key_count(&self) -> usize {
        self.count
    }

    fn percentage(&self, index: usize) -> f32 {
        LittleEndian::read_f32(&self.percentages[index * 4..index * 4 + 4])
    }

    fn value(&self, index: usize) -> T {
        T::decode(&self.values[index * T::SIZE..(index + 1) * T::SIZE])
    }
}

impl<T: KeyValue> std::fmt::Debug for Timeline<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// Owned timeline with parallel percentage and value arrays
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TimelineData<T> {
    pub percentages: Vec<f32>,
    pub values: Vec<T>,
}

impl<T: KeyValue> TimelineData<T> {
    /// Create a timeline from parallel arrays
    pub fn new(percentages: Vec<f32>, values: Vec<T>) -> Result<Self> {
        if percentages.len() != values.len() {
            return Err(AnimError::LengthMismatch {
                what: "timeline values",
                expected: percentages.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            percentages,
            values,
        })
    }

    /// Create a timeline from `(percentage, value)` pairs
    pub fn from_keys(keys: impl IntoIterator<Item = (f32, T)>) -> Self {
        let (percentages, values) = keys.into_iter().unzip();
        Self {
            percentages,
            values,
        }
    }

    /// Timeline holding a single constant key
    pub fn constant(value: T) -> Self {
        Self {
            percentages: vec![0.0],
            values: vec![value],
        }
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.percentages.len()
    }

    /// Whether the timeline has no keyframes
    pub fn is_empty(&self) -> bool {
        self.percentages.is_empty()
    }
}

impl<T: KeyValue> Default for TimelineData<T> {
    fn default() -> Self {
        Self {
            percentages: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T: KeyValue> Track<T> for TimelineData<T> {
    fn key_count(&self) -> usize {
        self.percentages.len().min(self.values.len())
    }

    fn percentage(&self, index: usize) -> f32 {
        self.percentages[index]
    }

    fn value(&self, index: usize) -> T {
        self.values[index]
    }
}

/// Index of the keyframe segment containing `target`
///
/// Requires at least two percentages. Returns `0` when `target` is at or
/// before the first key and `len - 2` when it is at or after the last key.
/// Otherwise the result `i` satisfies `percentages[i] <= target < percentages[i + 1]`.
pub fn binary_search_lower(percentages: &[f32], target: f32) -> usize {
    search_lower(percentages.len(), target, |i| percentages[i])
}

fn search_lower(count: usize, target: f32, percentage: impl Fn(usize) -> f32) -> usize {
    debug_assert!(count >= 2);

    if percentage(0) >= target {
        return 0;
    }
    if percentage(count - 1) <= target {
        return count - 2;
    }

    let mut low = 0;
    let mut high = count - 1;
    while low + 1 < high {
        let mid = (low + high) / 2;
        if percentage(mid) <= target {
            low = mid;
        } else {
            high = mid;
        }
    }
    low
}

/// Sample a track at `percent`
///
/// A single key is returned as-is for any percentage. Outside the key range
/// the first or last value is returned exactly. An empty track yields `None`.
pub fn sample<T, K>(track: &K, percent: f32, config: &SamplerConfig) -> Option<T>
where
    T: Interpolate,
    K: Track<T> + ?Sized,
{
    match track.key_count() {
        0 => None,
        1 => Some(track.value(0)),
        count => {
            // Quaternion blends at t = 1 may flip the last key's sign.
            if percent <= track.percentage(0) {
                return Some(track.value(0));
            }
            if percent >= track.percentage(count - 1) {
                return Some(track.value(count - 1));
            }

            let index = search_lower(count, percent, |i| track.percentage(i));
            let start = track.percentage(index);
            let end = track.percentage(index + 1);

            // Zero-width segments divide 0 by 0; stay on the earlier key.
            let raw = (percent - start) / (end - start);
            let t = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };

            let from = track.value(index);
            let to = track.value(index + 1);
            Some(from.interpolate(&to, t, config))
        }
    }
}
