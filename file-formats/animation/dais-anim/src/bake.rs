//! Offline clip building
//!
//! Source animation tools key each axis of a channel independently and in
//! absolute time. Baking merges the per-axis key times, evaluates the full
//! channel at each merged time and maps the times onto the clip's
//! percentage axis.

use glam::{Quat, Vec3};
use log::{debug, info};

use crate::clip::{AnimationClipData, BoneAnimationData};
use crate::error::{AnimError, Result};
use crate::timeline::TimelineData;
use crate::types::KeyValue;

/// Sorted union of two ascending time arrays, equal times collapsed
pub fn merge_sample_times(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if b[j] < a[i] {
            merged.push(b[j]);
            j += 1;
        } else if b[j] > a[i] {
            merged.push(a[i]);
            i += 1;
        } else {
            merged.push(b[j]);
            i += 1;
            j += 1;
        }
    }
    merged.extend_from_slice(&a[i..]);
    merged.extend_from_slice(&b[j..]);
    merged
}

/// Merge the key times of several curves, e.g. the x, y and z curves of
/// one channel
pub fn merge_all<'a>(curves: impl IntoIterator<Item = &'a [f64]>) -> Vec<f64> {
    curves
        .into_iter()
        .fold(Vec::new(), |merged, times| merge_sample_times(&merged, times))
}

/// Absolute time range of a clip in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    start: f64,
    end: f64,
}

impl TimeSpan {
    /// Create a span; `end` must not precede `start`
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if end < start || start.is_nan() || end.is_nan() {
            return Err(AnimError::InvalidTimespan { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Position of `seconds` on the clip's percentage axis
    ///
    /// Times outside the span map outside `0..1`. A zero-length span maps
    /// everything to 0.
    pub fn percent_of(&self, seconds: f64) -> f32 {
        let duration = self.duration();
        if duration == 0.0 {
            return 0.0;
        }
        ((seconds - self.start) / duration) as f32
    }
}

/// Evaluate a channel at each sample time
pub fn sample_timeline<T: KeyValue>(
    times: &[f64],
    span: &TimeSpan,
    mut evaluate: impl FnMut(f64) -> T,
) -> TimelineData<T> {
    TimelineData::from_keys(
        times
            .iter()
            .map(|&seconds| (span.percent_of(seconds), evaluate(seconds))),
    )
}

/// Keys of one bone in absolute time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoneTrackBuilder {
    bone_id: u16,
    translations: Vec<(f64, Vec3)>,
    rotations: Vec<(f64, Quat)>,
    scales: Vec<(f64, Vec3)>,
}

impl BoneTrackBuilder {
    pub fn new(bone_id: u16) -> Self {
        Self {
            bone_id,
            ..Self::default()
        }
    }

    pub fn bone_id(&self) -> u16 {
        self.bone_id
    }

    pub fn translation(mut self, seconds: f64, value: Vec3) -> Self {
        self.push_translation(seconds, value);
        self
    }

    pub fn rotation(mut self, seconds: f64, value: Quat) -> Self {
        self.push_rotation(seconds, value);
        self
    }

    pub fn scale(mut self, seconds: f64, value: Vec3) -> Self {
        self.push_scale(seconds, value);
        self
    }

    pub fn push_translation(&mut self, seconds: f64, value: Vec3) {
        self.translations.push((seconds, value));
    }

    pub fn push_rotation(&mut self, seconds: f64, value: Quat) {
        self.rotations.push((seconds, value));
    }

    pub fn push_scale(&mut self, seconds: f64, value: Vec3) {
        self.scales.push((seconds, value));
    }

    /// Whether no channel has keys
    pub fn is_empty(&self) -> bool {
        self.translations.is_empty() && self.rotations.is_empty() && self.scales.is_empty()
    }

    fn build(self, span: &TimeSpan) -> BoneAnimationData {
        BoneAnimationData {
            bone_id: self.bone_id,
            translations: to_timeline(self.translations, span),
            rotations: to_timeline(self.rotations, span),
            scales: to_timeline(self.scales, span),
        }
    }
}

fn to_timeline<T: KeyValue>(mut keys: Vec<(f64, T)>, span: &TimeSpan) -> TimelineData<T> {
    keys.sort_by(|a, b| a.0.total_cmp(&b.0));
    TimelineData::from_keys(
        keys.into_iter()
            .map(|(seconds, value)| (span.percent_of(seconds), value)),
    )
}

/// Assembles a clip from bones keyed in absolute time
#[derive(Debug, Clone)]
pub struct ClipBuilder {
    span: TimeSpan,
    bones: Vec<BoneTrackBuilder>,
}

impl ClipBuilder {
    pub fn new(span: TimeSpan) -> Self {
        Self {
            span,
            bones: Vec::new(),
        }
    }

    pub fn span(&self) -> &TimeSpan {
        &self.span
    }

    /// Add a bone's keys
    pub fn add_bone(&mut self, bone: BoneTrackBuilder) -> &mut Self {
        self.bones.push(bone);
        self
    }

    /// Keys of `bone_id`, added on first use
    pub fn bone(&mut self, bone_id: u16) -> &mut BoneTrackBuilder {
        let index = match self.bones.iter().position(|bone| bone.bone_id == bone_id) {
            Some(index) => index,
            None => {
                self.bones.push(BoneTrackBuilder::new(bone_id));
                self.bones.len() - 1
            }
        };
        &mut self.bones[index]
    }

    /// Produce the clip
    ///
    /// Keys are sorted by time and bones by ID. Bones without keys are
    /// dropped; a bone added twice is an error.
    pub fn build(self) -> Result<AnimationClipData> {
        let total = self.bones.len();
        let span = self.span;

        let mut bones: Vec<_> = self
            .bones
            .into_iter()
            .filter(|bone| !bone.is_empty())
            .collect();
        bones.sort_by_key(BoneTrackBuilder::bone_id);
        if let Some(pair) = bones.windows(2).find(|pair| pair[0].bone_id == pair[1].bone_id) {
            return Err(AnimError::DuplicateBone(pair[0].bone_id));
        }

        let clip = AnimationClipData {
            duration: span.duration() as f32,
            bones: bones.into_iter().map(|bone| bone.build(&span)).collect(),
        };

        info!("Animated {}/{} bones", clip.bones.len(), total);
        debug!(
            "Clip span {}..{} ({:.3}s)",
            span.start(),
            span.end(),
            clip.duration
        );
        Ok(clip)
    }
}
