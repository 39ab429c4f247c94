//! `ScratchBuf` — small-vector staging for per-block work.
//!
//! Stores up to `N` elements inline and spills to a heap `Vec` once `N` is
//! exceeded. Block tasks use it to stage decoded edges, so the inline size is a
//! tuning knob only: any block capacity works, larger blocks just spill.

/// A vector that keeps up to `N` `Copy` elements inline.
#[derive(Clone, Debug)]
pub struct ScratchBuf<T: Copy + Default, const N: usize> {
    inner: ScratchInner<T, N>,
}

#[derive(Clone, Debug)]
enum ScratchInner<T: Copy + Default, const N: usize> {
    Inline { len: usize, data: [T; N] },
    Heap(Vec<T>),
}

impl<T: Copy + Default, const N: usize> ScratchBuf<T, N> {
    /// Creates an empty buffer.
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: ScratchInner::Inline {
                len: 0,
                data: [T::default(); N],
            },
        }
    }

    /// Creates an empty buffer that will hold `capacity` elements without
    /// reallocating; allocates up front when `capacity > N`.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity > N {
            Self {
                inner: ScratchInner::Heap(Vec::with_capacity(capacity)),
            }
        } else {
            Self::new()
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.inner {
            ScratchInner::Inline { len, .. } => *len,
            ScratchInner::Heap(v) => v.len(),
        }
    }

    /// Returns `true` if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once the buffer has moved to the heap.
    #[inline]
    pub fn is_spilled(&self) -> bool {
        matches!(self.inner, ScratchInner::Heap(_))
    }

    /// Appends an element, spilling to the heap when the inline space is full.
    #[inline]
    pub fn push(&mut self, value: T) {
        match &mut self.inner {
            ScratchInner::Inline { len, data } => {
                if *len < N {
                    data[*len] = value;
                    *len += 1;
                } else {
                    let mut vec = Vec::with_capacity(N.max(1) * 2);
                    vec.extend_from_slice(&data[..*len]);
                    vec.push(value);
                    self.inner = ScratchInner::Heap(vec);
                }
            }
            ScratchInner::Heap(v) => v.push(value),
        }
    }

    /// Removes every element, keeping any heap allocation.
    #[inline]
    pub fn clear(&mut self) {
        match &mut self.inner {
            ScratchInner::Inline { len, .. } => *len = 0,
            ScratchInner::Heap(v) => v.clear(),
        }
    }

    /// The elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        match &self.inner {
            ScratchInner::Inline { len, data } => &data[..*len],
            ScratchInner::Heap(v) => v,
        }
    }

    /// The elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.inner {
            ScratchInner::Inline { len, data } => &mut data[..*len],
            ScratchInner::Heap(v) => v,
        }
    }
}

impl<T: Copy + Default, const N: usize> Default for ScratchBuf<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> core::ops::Deref for ScratchBuf<T, N> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy + Default, const N: usize> Extend<T> for ScratchBuf<T, N> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for v in iter {
            self.push(v);
        }
    }
}
