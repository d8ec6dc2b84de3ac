use std::sync::atomic::{AtomicU32, Ordering};

/// Bitmask over the GPU-mirrored resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Changes(u32);

impl Changes {
    pub const NONE: Changes = Changes(0);
    /// Whole voxel grid must be re-staged (occupancy topology changed).
    pub const GRID: Changes = Changes(1 << 0);
    pub const POSITION: Changes = Changes(1 << 1);
    pub const ROTATION: Changes = Changes(1 << 2);
    pub const HALF_SIZE: Changes = Changes(1 << 3);
    pub const MATERIAL: Changes = Changes(1 << 4);

    /// Every per-object mirror.
    pub const OBJECTS: Changes =
        Changes(Self::POSITION.0 | Self::ROTATION.0 | Self::HALF_SIZE.0 | Self::MATERIAL.0);
    pub const ALL: Changes = Changes(Self::GRID.0 | Self::OBJECTS.0);

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Unknown bits are discarded.
    pub fn from_bits_truncate(bits: u32) -> Self {
        Changes(bits & Self::ALL.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: Changes) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: Changes) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for Changes {
    type Output = Changes;
    fn bitor(self, rhs: Changes) -> Changes {
        Changes(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Changes {
    fn bitor_assign(&mut self, rhs: Changes) {
        self.0 |= rhs.0;
    }
}

/// Dirty-bit handoff between the world (producer) and the uploader
/// (consumer). Bits only ever clear through [`get_changed_and_clear`],
/// so each dirty condition is observed exactly once.
///
/// The tracker starts with every bit set: nothing has been uploaded yet.
///
/// [`get_changed_and_clear`]: UploadTracker::get_changed_and_clear
#[derive(Debug)]
pub struct UploadTracker {
    bits: AtomicU32,
}

impl Default for UploadTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadTracker {
    pub fn new() -> Self {
        Self {
            bits: AtomicU32::new(Changes::ALL.bits()),
        }
    }

    /// Set `changes` dirty. Release pairs with the consumer's drain so the
    /// mutation that preceded this call is visible once the bit is seen.
    pub fn mark(&self, changes: Changes) {
        if !changes.is_empty() {
            self.bits.fetch_or(changes.bits(), Ordering::Release);
        }
    }

    /// Request a re-stage of the whole grid mirror.
    pub fn force_upload(&self) {
        self.mark(Changes::GRID);
    }

    /// Current bits without consuming them.
    pub fn peek(&self) -> Changes {
        Changes::from_bits_truncate(self.bits.load(Ordering::Acquire))
    }

    /// Atomically take every pending bit, leaving the tracker clean.
    pub fn get_changed_and_clear(&self) -> Changes {
        Changes::from_bits_truncate(self.bits.swap(0, Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_fully_dirty() {
        let tracker = UploadTracker::new();
        assert_eq!(tracker.get_changed_and_clear(), Changes::ALL);
    }

    #[test]
    fn test_drain_is_idempotent() {
        let tracker = UploadTracker::new();
        tracker.get_changed_and_clear();
        tracker.mark(Changes::POSITION);
        assert_eq!(tracker.get_changed_and_clear(), Changes::POSITION);
        assert!(tracker.get_changed_and_clear().is_empty());
    }

    #[test]
    fn test_marks_coalesce_per_batch() {
        let tracker = UploadTracker::new();
        tracker.get_changed_and_clear();
        tracker.mark(Changes::ROTATION);
        tracker.mark(Changes::ROTATION);
        tracker.force_upload();
        let drained = tracker.get_changed_and_clear();
        assert!(drained.contains(Changes::ROTATION | Changes::GRID));
        assert!(!drained.intersects(Changes::POSITION));
    }

    #[test]
    fn test_peek_does_not_clear() {
        let tracker = UploadTracker::new();
        assert_eq!(tracker.peek(), Changes::ALL);
        assert_eq!(tracker.peek(), Changes::ALL);
    }

    #[test]
    fn test_cross_thread_marks_are_drained() {
        let tracker = Arc::new(UploadTracker::new());
        tracker.get_changed_and_clear();

        let producers: Vec<_> = [Changes::POSITION, Changes::HALF_SIZE, Changes::GRID]
            .into_iter()
            .map(|c| {
                let t = Arc::clone(&tracker);
                std::thread::spawn(move || t.mark(c))
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }

        assert_eq!(
            tracker.get_changed_and_clear(),
            Changes::POSITION | Changes::HALF_SIZE | Changes::GRID
        );
    }
}
