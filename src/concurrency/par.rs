//! Fork-join helpers.
//!
//! Every parallel phase of the codec goes through these functions so that the
//! `parallel` feature (rayon) is the only switch between forked and sequential
//! execution. Callers pass `fork = false` to stay on the current thread.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Maps `f` over `0..n` and collects results in index order.
pub fn map_indexed<R, F>(n: usize, fork: bool, f: F) -> Vec<R>
where
    R: Send,
    F: Fn(usize) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    if fork {
        return (0..n).into_par_iter().map(f).collect();
    }
    let _ = fork;
    (0..n).map(f).collect()
}

/// Runs `f` over `range`, stopping at the first error.
///
/// When forked, sibling tasks already running are not cancelled; the error
/// reported is one of the errors produced.
pub fn try_for_each_index<E, F>(range: core::ops::Range<usize>, fork: bool, f: F) -> Result<(), E>
where
    E: Send,
    F: Fn(usize) -> Result<(), E> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    if fork {
        return range.into_par_iter().try_for_each(f);
    }
    let _ = fork;
    range.into_iter().try_for_each(f)
}

/// Maps `f` over owned, disjoint work items (typically `&mut [u8]` regions)
/// and collects results in item order.
pub fn map_owned<T, R, F>(items: Vec<T>, fork: bool, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(usize, T) -> R + Sync + Send,
{
    #[cfg(feature = "parallel")]
    if fork {
        return items
            .into_par_iter()
            .enumerate()
            .map(|(i, item)| f(i, item))
            .collect();
    }
    let _ = fork;
    items.into_iter().enumerate().map(|(i, item)| f(i, item)).collect()
}

/// Splits `bytes` into consecutive regions starting at each offset in `starts`.
///
/// The first region begins at `starts[0]`; the last one runs to the end of
/// `bytes`. `starts` must be non-decreasing and within bounds; equal offsets
/// give empty regions.
pub fn split_regions<'a>(bytes: &'a mut [u8], starts: &[usize]) -> Vec<&'a mut [u8]> {
    let mut regions = Vec::with_capacity(starts.len());
    let Some(&first) = starts.first() else {
        return regions;
    };
    let (_, mut rest) = bytes.split_at_mut(first);
    let mut consumed = first;
    for &next in &starts[1..] {
        let (head, tail) = rest.split_at_mut(next - consumed);
        regions.push(head);
        rest = tail;
        consumed = next;
    }
    regions.push(rest);
    regions
}

/// Splits `items` into consecutive sub-slices of the given lengths.
pub fn split_lengths<'a, T>(items: &'a mut [T], lengths: &[usize]) -> Vec<&'a mut [T]> {
    let mut parts = Vec::with_capacity(lengths.len());
    let mut rest = items;
    for &len in lengths {
        let (head, tail) = rest.split_at_mut(len);
        parts.push(head);
        rest = tail;
    }
    parts
}
