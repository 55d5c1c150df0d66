//! Per-frame scratch storage
//!
//! A [`FrameArena`] hands out ranges of a growing buffer with a moving
//! cursor. Capture a marker before the frame's allocations and restore it
//! afterwards; the storage itself is kept, so steady-state frames do not
//! allocate.

use log::debug;

use crate::math::Mat4x3;
use crate::types::Transform;

/// Saved cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaMarker(usize);

/// Handle to elements allocated from an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaRange {
    start: usize,
    len: usize,
}

impl ArenaRange {
    /// First element index
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the range is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Stack-discipline scratch allocator
#[derive(Debug, Clone)]
pub struct FrameArena<T> {
    name: &'static str,
    storage: Vec<T>,
    cursor: usize,
    high_water: usize,
}

impl<T: Copy + Default> FrameArena<T> {
    /// Create an empty arena; `name` is used in log output
    pub fn new(name: &'static str) -> Self {
        Self::with_capacity(name, 0)
    }

    /// Create an arena with room for `capacity` elements
    pub fn with_capacity(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            storage: vec![T::default(); capacity],
            cursor: 0,
            high_water: 0,
        }
    }

    /// Allocate `len` elements
    ///
    /// Reused elements keep whatever the previous frame left in them.
    pub fn alloc(&mut self, len: usize) -> ArenaRange {
        let range = ArenaRange {
            start: self.cursor,
            len,
        };
        self.cursor = range.end();

        if self.cursor > self.storage.len() {
            self.storage.resize(self.cursor, T::default());
        }
        if self.cursor > self.high_water {
            self.high_water = self.cursor;
            debug!(
                "New {} arena high-water mark: {} elements",
                self.name, self.high_water
            );
        }
        range
    }

    /// Allocate `len` elements set to `value`
    pub fn alloc_filled(&mut self, len: usize, value: T) -> ArenaRange {
        let range = self.alloc(len);
        self.get_mut(range).fill(value);
        range
    }

    /// Borrow an allocation
    pub fn get(&self, range: ArenaRange) -> &[T] {
        debug_assert!(range.end() <= self.cursor, "arena range used after restore");
        &self.storage[range.start..range.end()]
    }

    /// Mutably borrow an allocation
    pub fn get_mut(&mut self, range: ArenaRange) -> &mut [T] {
        debug_assert!(range.end() <= self.cursor, "arena range used after restore");
        &mut self.storage[range.start..range.end()]
    }

    /// Capture the current cursor
    pub fn marker(&self) -> ArenaMarker {
        ArenaMarker(self.cursor)
    }

    /// Release everything allocated since `marker`
    pub fn restore(&mut self, marker: ArenaMarker) {
        debug_assert!(marker.0 <= self.cursor, "markers must be restored in reverse order");
        self.cursor = marker.0.min(self.cursor);
    }

    /// Release everything
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Elements currently allocated
    pub fn used(&self) -> usize {
        self.cursor
    }

    /// Elements of storage kept by the arena
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Largest number of elements ever allocated at once
    pub fn high_water(&self) -> usize {
        self.high_water
    }
}

/// Markers of both arenas in a [`FrameContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMarker {
    transforms: ArenaMarker,
    matrices: ArenaMarker,
}

/// Scratch arenas for evaluating and composing poses
///
/// One context per thread; pass it to
/// [`Skeleton::pose_frame`](crate::Skeleton::pose_frame).
#[derive(Debug, Clone)]
pub struct FrameContext {
    pub transforms: FrameArena<Transform>,
    pub matrices: FrameArena<Mat4x3>,
}

impl FrameContext {
    /// Create a context with empty arenas
    pub fn new() -> Self {
        Self {
            transforms: FrameArena::new("transform"),
            matrices: FrameArena::new("matrix"),
        }
    }

    /// Create a context sized for one pose of `bone_count` bones
    pub fn with_bone_capacity(bone_count: usize) -> Self {
        Self {
            transforms: FrameArena::with_capacity("transform", bone_count),
            matrices: FrameArena::with_capacity("matrix", bone_count * 3),
        }
    }

    /// Mark the start of a frame's allocations
    pub fn begin_frame(&self) -> FrameMarker {
        FrameMarker {
            transforms: self.transforms.marker(),
            matrices: self.matrices.marker(),
        }
    }

    /// Release the allocations made since `marker`
    pub fn end_frame(&mut self, marker: FrameMarker) {
        self.transforms.restore(marker.transforms);
        self.matrices.restore(marker.matrices);
    }
}

impl Default for FrameContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_is_contiguous() {
        let mut arena = FrameArena::<u32>::new("test");
        let a = arena.alloc(3);
        let b = arena.alloc(2);
        assert_eq!(a.start(), 0);
        assert_eq!(b.start(), 3);
        assert_eq!(arena.used(), 5);

        arena.get_mut(a).copy_from_slice(&[1, 2, 3]);
        arena.get_mut(b).copy_from_slice(&[4, 5]);
        assert_eq!(arena.get(a), &[1, 2, 3]);
        assert_eq!(arena.get(b), &[4, 5]);
    }

    #[test]
    fn test_marker_restore() {
        let mut arena = FrameArena::<f32>::new("test");
        let _persistent = arena.alloc(4);
        let marker = arena.marker();

        let scratch = arena.alloc(10);
        assert_eq!(scratch.start(), 4);
        arena.restore(marker);
        assert_eq!(arena.used(), 4);

        // The next frame reuses the same storage.
        let again = arena.alloc(10);
        assert_eq!(again, scratch);
        assert_eq!(arena.capacity(), 14);
    }

    #[test]
    fn test_high_water_mark() {
        let mut arena = FrameArena::<u8>::with_capacity("test", 8);
        let marker = arena.marker();
        arena.alloc(6);
        arena.restore(marker);
        arena.alloc(3);
        assert_eq!(arena.high_water(), 6);
        assert_eq!(arena.capacity(), 8);

        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.high_water(), 6);
    }

    #[test]
    fn test_alloc_filled() {
        let mut arena = FrameArena::<i32>::new("test");
        let range = arena.alloc_filled(3, 7);
        assert_eq!(arena.get(range), &[7, 7, 7]);
        assert!(!range.is_empty());
        assert!(arena.alloc(0).is_empty());
    }

    #[test]
    fn test_frame_context_markers() {
        let mut frame = FrameContext::with_bone_capacity(4);
        let marker = frame.begin_frame();
        frame.transforms.alloc(4);
        frame.matrices.alloc(12);
        frame.end_frame(marker);

        assert_eq!(frame.transforms.used(), 0);
        assert_eq!(frame.matrices.used(), 0);
        assert_eq!(frame.matrices.capacity(), 12);
    }
}
