//! Atomic visited set for traversals over a fixed vertex count.

use core::sync::atomic::{AtomicU64, Ordering};

const WORD_BITS: usize = u64::BITS as usize;

#[inline]
fn word_mask(bit: usize) -> (usize, u64) {
    (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
}

/// A word-packed set of visited vertices that many threads may mark at once.
#[derive(Debug)]
pub struct VisitedSet {
    words: Box<[AtomicU64]>,
    bits: usize,
}

impl VisitedSet {
    /// Creates an empty set over `bits` vertices.
    pub fn new(bits: usize) -> Self {
        let words = (0..bits.div_ceil(WORD_BITS)).map(|_| AtomicU64::new(0)).collect();
        Self { words, bits }
    }

    /// Number of vertices covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits
    }

    /// Returns `true` if the set covers no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Unmarks every vertex.
    pub fn clear(&self) {
        for w in self.words.iter() {
            w.store(0, Ordering::Relaxed);
        }
    }

    /// Marks `node` and returns `true` iff this call was the one to mark it.
    /// Out-of-range nodes are never visited.
    #[inline]
    pub fn try_visit(&self, node: usize) -> bool {
        if node >= self.bits {
            return false;
        }
        let (word, mask) = word_mask(node);
        self.words[word].fetch_or(mask, Ordering::AcqRel) & mask == 0
    }

    /// Whether `node` has been marked.
    #[inline]
    pub fn is_visited(&self, node: usize) -> bool {
        if node >= self.bits {
            return false;
        }
        let (word, mask) = word_mask(node);
        self.words[word].load(Ordering::Acquire) & mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_once() {
        let set = VisitedSet::new(130);
        assert!(set.try_visit(0));
        assert!(!set.try_visit(0));
        assert!(set.try_visit(129));
        assert!(set.is_visited(129));
        assert!(!set.is_visited(64));
        assert!(!set.try_visit(130));
        set.clear();
        assert!(!set.is_visited(0));
    }

    #[test]
    fn test_concurrent_marks_win_once() {
        let set = VisitedSet::new(1000);
        let wins: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| (0..1000).filter(|&i| set.try_visit(i)).count()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(wins, 1000);
    }
}
