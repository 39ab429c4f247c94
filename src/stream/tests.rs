//! Tests for the stream engines.

use std::sync::Mutex;

use super::*;
use crate::error::CodecError;

fn weighted_sample() -> CompressedStream {
    let config = CodecConfig::with_block_capacity(2);
    encode(&[5, 10, 10000, 10005], Some(&[1, -2, 3, -4]), 7, &config).unwrap()
}

fn edges(pairs: &[(VertexId, Weight)]) -> Vec<Edge> {
    pairs.iter().copied().map(Edge::from).collect()
}

fn neighbor_ids(stream: &CompressedNeighbors<'_>) -> Vec<VertexId> {
    stream.to_vec().unwrap().into_iter().map(|e| e.neighbor).collect()
}

#[test]
fn test_weighted_sample_bytes() {
    let stream = weighted_sample();
    #[rustfmt::skip]
    let expected: &[u8] = &[
        4, 0, 0, 0, 0x01,          // virtual degree, weighted flag
        17, 0, 0, 0,               // offset of block 1
        0, 0, 0, 0,                // block 0 start index
        0x42, 0x01, 0x05, 0x42,    // 5 (-2 from source), w 1, +5, w -2
        2, 0, 0, 0,                // block 1 start index
        0x89, 0x9c, 0x01, 0x03,    // 10000 (+9993 from source), w 3
        0x05, 0x44,                // +5, w -4
    ];
    assert_eq!(stream.bytes(), expected);
    let config = CodecConfig::with_block_capacity(2);
    let size = encoded_size(&[5, 10, 10000, 10005], Some(&[1, -2, 3, -4]), 7, &config).unwrap();
    assert_eq!(size, expected.len());
}

#[test]
fn test_weighted_sample_decode() {
    let stream = weighted_sample();
    let view = stream.as_neighbors();
    assert_eq!(view.num_blocks().unwrap(), 2);
    assert_eq!(view.weighting().unwrap(), Weighting::Weighted);
    assert_eq!(
        view.to_vec().unwrap(),
        edges(&[(5, 1), (10, -2), (10000, 3), (10005, -4)])
    );

    let mut seen = Vec::new();
    view.decode_seq(|n, w, i| {
        seen.push((i, n, w));
        true
    })
    .unwrap();
    assert_eq!(seen, vec![(0, 5, 1), (1, 10, -2), (2, 10000, 3), (3, 10005, -4)]);
}

#[test]
fn test_weighted_sample_pack_even() {
    let mut stream = weighted_sample();
    let degree = stream.pack(|_, n, _| n % 2 == 0).unwrap();
    assert_eq!(degree, 2);
    assert_eq!(stream.degree(), 2);
    let view = stream.as_neighbors();
    assert_eq!(view.to_vec().unwrap(), edges(&[(10, -2), (10000, 3)]));
    // Too few blocks to trip the compaction threshold.
    assert_eq!(view.virtual_degree().unwrap(), 4);
    let summary = view.verify().unwrap();
    assert_eq!(summary.degree, 2);
    assert_eq!(summary.empty_blocks, 0);
}

#[test]
fn test_weighted_sample_random_access() {
    let stream = weighted_sample();
    let view = stream.as_neighbors();
    assert_eq!(view.get_ith_neighbor(2).unwrap(), Edge::new(10000, 3));
    assert_eq!(view.get_ith_neighbor(0).unwrap(), Edge::new(5, 1));
    assert_eq!(view.get_ith_neighbor(3).unwrap(), Edge::new(10005, -4));
    assert!(matches!(
        view.get_ith_neighbor(4),
        Err(CodecError::IndexOutOfRange { index: 4, degree: 4 })
    ));
}

#[test]
fn test_intersect_small_sets() {
    let config = CodecConfig::with_block_capacity(2);
    let a = encode(&[1, 3, 5, 7], None, 0, &config).unwrap();
    let b = encode(&[3, 4, 5, 9], None, 100, &config).unwrap();
    assert_eq!(intersect(&a.as_neighbors(), &b.as_neighbors()).unwrap(), 2);

    let mut shared = Vec::new();
    let n = intersect_with(&a.as_neighbors(), &b.as_neighbors(), |sa, sb, x| {
        shared.push((sa, sb, x));
    })
    .unwrap();
    assert_eq!(n, 2);
    assert_eq!(shared, vec![(0, 100, 3), (0, 100, 5)]);
}

#[test]
fn test_intersect_after_pack_uses_block_table() {
    let config = CodecConfig::with_block_capacity(2);
    let mut a = encode(&[1, 3, 5, 7], None, 0, &config).unwrap();
    a.pack(|_, n, _| n != 1).unwrap();
    assert_eq!(a.degree(), 3);
    assert_ne!(a.as_neighbors().virtual_degree().unwrap(), a.degree());
    let b = encode(&[3, 4, 5, 9], None, 100, &config).unwrap();
    assert_eq!(a.as_neighbors().intersect(&b.as_neighbors()).unwrap(), 2);
}

#[test]
fn test_empty_stream() {
    let config = CodecConfig::default();
    let mut stream = encode(&[], None, 3, &config).unwrap();
    assert!(stream.bytes().is_empty());
    let view = stream.as_neighbors();
    assert!(view.is_empty());
    assert_eq!(view.num_blocks().unwrap(), 0);
    view.decode(|_, _, _| panic!("no edges to visit")).unwrap();
    assert_eq!(view.iter().unwrap().count(), 0);
    assert_eq!(view.map_reduce(|_, n, _| u64::from(n), &SumMonoid::new()).unwrap(), 0);
    assert_eq!(view.map_reduce(|_, n, _| n, &MaxMonoid::new()).unwrap(), 0);
    assert_eq!(view.filter(|_, _, _| true, |_, _| panic!("nothing to emit")).unwrap(), 0);
    assert_eq!(view.verify().unwrap().bytes_used, 0);
    assert!(view.get_ith_neighbor(0).is_err());
    assert_eq!(stream.pack(|_, _, _| true).unwrap(), 0);
    stream.repack().unwrap();
}

#[test]
fn test_parallel_decode_visits_each_edge_once() {
    let config = CodecConfig::with_block_capacity(4);
    let ids: Vec<VertexId> = (0..100).map(|i| i * 7).collect();
    let stream = encode(&ids, None, 350, &config).unwrap();
    let seen = Mutex::new(Vec::new());
    stream
        .as_neighbors()
        .decode(|n, _, i| {
            seen.lock().unwrap().push((i, n));
            true
        })
        .unwrap();
    let mut seen = seen.into_inner().unwrap();
    seen.sort_unstable();
    let expected: Vec<_> = ids.iter().copied().enumerate().collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_decode_stop_is_block_local() {
    let config = CodecConfig::with_block_capacity(2);
    let stream = encode(&[1, 2, 3, 4, 5, 6], None, 0, &config).unwrap();
    let mut firsts = Vec::new();
    stream
        .as_neighbors()
        .decode_seq(|n, _, i| {
            firsts.push((i, n));
            false
        })
        .unwrap();
    assert_eq!(firsts, vec![(0, 1), (2, 3), (4, 5)]);

    let parallel = Mutex::new(Vec::new());
    stream
        .as_neighbors()
        .decode(|_, _, i| {
            parallel.lock().unwrap().push(i);
            false
        })
        .unwrap();
    let mut parallel = parallel.into_inner().unwrap();
    parallel.sort_unstable();
    assert_eq!(parallel, vec![0, 2, 4]);
}

#[test]
fn test_decode_blocks_range() {
    let config = CodecConfig::with_block_capacity(2);
    let stream = encode(&[1, 2, 3, 4, 5, 6], None, 0, &config).unwrap();
    let mut got = Vec::new();
    stream
        .as_neighbors()
        .decode_blocks(1..10, |i, e| {
            got.push((i, e.neighbor));
            true
        })
        .unwrap();
    assert_eq!(got, vec![(2, 3), (3, 4), (4, 5), (5, 6)]);
}

#[test]
fn test_decode_into_checks_length() {
    let stream = weighted_sample();
    let mut short = [Edge::default(); 3];
    assert!(matches!(
        stream.as_neighbors().decode_into(&mut short),
        Err(CodecError::CapacityExceeded { needed: 4, available: 3 })
    ));
    let mut long = [Edge::default(); 6];
    stream.as_neighbors().decode_into(&mut long).unwrap();
    assert_eq!(long[3], Edge::new(10005, -4));
    assert_eq!(long[4], Edge::default());
}

#[test]
fn test_map_reduce_matches_fold() {
    let ids: Vec<VertexId> = (0..200).map(|i| i * 3).collect();
    let weights: Vec<Weight> = (0..200).map(|i| i - 100).collect();
    for capacity in [1, 7, 64, 1000] {
        let config = CodecConfig::with_block_capacity(capacity);
        let stream = encode(&ids, Some(&weights), 11, &config).unwrap();
        let view = stream.as_neighbors();

        let sum = view.map_reduce(|_, _, w| i64::from(w), &SumMonoid::new()).unwrap();
        assert_eq!(sum, weights.iter().map(|&w| i64::from(w)).sum::<i64>());

        let concat = make_monoid(Vec::new(), |mut a: Vec<VertexId>, b: Vec<VertexId>| {
            a.extend(b);
            a
        });
        let ordered = view.map_reduce(|_, n, _| vec![n], &concat).unwrap();
        assert_eq!(ordered, ids);

        let max = view.map_reduce(|_, n, _| n, &MaxMonoid::new()).unwrap();
        assert_eq!(max, 597);
        let min = view.map_reduce(|_, _, w| w, &MinMonoid::new()).unwrap();
        assert_eq!(min, -100);
    }
}

#[test]
fn test_pack_triggers_repack() {
    let config = CodecConfig::with_block_capacity(8);
    let ids: Vec<VertexId> = (0..100).collect();
    let mut stream = encode(&ids, None, 50, &config).unwrap();
    let len = stream.bytes().len();

    let degree = stream.pack(|_, n, _| n % 20 == 0).unwrap();
    assert_eq!(degree, 5);
    assert_eq!(stream.bytes().len(), len);

    let view = stream.as_neighbors();
    let summary = view.verify().unwrap();
    assert_eq!(summary.virtual_degree, 5);
    assert_eq!(summary.num_blocks, 1);
    assert_eq!(neighbor_ids(&view), vec![0, 20, 40, 60, 80]);

    let fresh = encode(&[0, 20, 40, 60, 80], None, 50, &config).unwrap();
    assert_eq!(&stream.bytes()[..fresh.bytes().len()], fresh.bytes());
}

#[test]
fn test_pack_above_threshold_keeps_layout() {
    let config = CodecConfig::with_block_capacity(8);
    let ids: Vec<VertexId> = (0..100).collect();
    let mut stream = encode(&ids, None, 50, &config).unwrap();
    assert_eq!(stream.pack(|_, n, _| n % 2 == 0).unwrap(), 50);
    let view = stream.as_neighbors();
    assert_eq!(view.virtual_degree().unwrap(), 100);
    assert_eq!(view.num_blocks().unwrap(), 13);
    assert_eq!(neighbor_ids(&view), (0..100).step_by(2).collect::<Vec<_>>());
}

#[test]
fn test_repack_disabled() {
    let config = CodecConfig {
        repack_divisor: 0,
        ..CodecConfig::with_block_capacity(8)
    };
    let ids: Vec<VertexId> = (0..100).collect();
    let mut stream = encode(&ids, None, 50, &config).unwrap();
    assert_eq!(stream.pack(|_, n, _| n == 42).unwrap(), 1);
    assert_eq!(stream.as_neighbors().virtual_degree().unwrap(), 100);
    assert_eq!(stream.as_neighbors().get_ith_neighbor(0).unwrap().neighbor, 42);

    stream.repack().unwrap();
    assert_eq!(stream.as_neighbors().virtual_degree().unwrap(), 1);
    assert_eq!(neighbor_ids(&stream.as_neighbors()), vec![42]);
}

#[test]
fn test_emptied_blocks_are_skipped() {
    let config = CodecConfig::with_block_capacity(2);
    let mut stream = encode(&[1, 2, 3, 4, 5, 6], None, 0, &config).unwrap();
    assert_eq!(stream.pack(|_, n, _| n >= 5).unwrap(), 2);
    let view = stream.as_neighbors();
    assert_eq!(view.verify().unwrap().empty_blocks, 2);
    let via_iter: Vec<_> = view.iter().unwrap().map(|e| e.unwrap().neighbor).collect();
    assert_eq!(via_iter, vec![5, 6]);
    assert_eq!(view.get_ith_neighbor(0).unwrap().neighbor, 5);
    assert_eq!(view.get_ith_neighbor(1).unwrap().neighbor, 6);
}

#[test]
fn test_pack_to_nothing() {
    let config = CodecConfig::with_block_capacity(4);
    let ids: Vec<VertexId> = (10..60).collect();
    let mut stream = encode(&ids, None, 0, &config).unwrap();
    assert_eq!(stream.pack(|_, _, _| false).unwrap(), 0);
    let view = stream.as_neighbors();
    assert_eq!(view.iter().unwrap().count(), 0);
    assert_eq!(&stream.bytes()[..4], &[0, 0, 0, 0]);
}

#[test]
fn test_filter_sequential_and_chunked_agree() {
    let ids: Vec<VertexId> = (0..50).map(|i| i * 5).collect();
    let weights: Vec<Weight> = (0..50).collect();
    let pred = |_: VertexId, n: VertexId, w: Weight| n % 3 == 0 || w > 40;

    let run = |config: CodecConfig| {
        let stream = encode(&ids, Some(&weights), 9, &config).unwrap();
        let mut out = Vec::new();
        let n = stream
            .as_neighbors()
            .filter(pred, |pos, e| {
                assert_eq!(pos, out.len());
                out.push(e);
            })
            .unwrap();
        assert_eq!(n, out.len());
        out
    };

    let sequential = run(CodecConfig::with_block_capacity(3));
    let chunked = run(CodecConfig {
        filter_sequential_threshold: 0,
        filter_chunk_divisor: 4,
        ..CodecConfig::with_block_capacity(3)
    });
    let expected: Vec<Edge> = ids
        .iter()
        .zip(&weights)
        .filter(|&(&n, &w)| pred(9, n, w))
        .map(|(&n, &w)| Edge::new(n, w))
        .collect();
    assert_eq!(sequential, expected);
    assert_eq!(chunked, expected);
}

#[test]
fn test_encode_rejects_bad_input() {
    let config = CodecConfig::default();
    assert!(matches!(
        encode(&[1, 5, 3], None, 0, &config),
        Err(CodecError::Unsorted { index: 2 })
    ));
    assert!(matches!(
        encode(&[1, 5], Some(&[1]), 0, &config),
        Err(CodecError::WeightCountMismatch { neighbors: 2, weights: 1 })
    ));
    let bad = CodecConfig::with_block_capacity(0);
    assert!(matches!(
        encode(&[1], None, 0, &bad),
        Err(CodecError::InvalidConfig(_))
    ));
}

#[test]
fn test_duplicates_round_trip() {
    let config = CodecConfig::with_block_capacity(2);
    let stream = encode(&[4, 4, 4, 9], None, 4, &config).unwrap();
    assert_eq!(neighbor_ids(&stream.as_neighbors()), vec![4, 4, 4, 9]);
}

#[test]
fn test_encode_into_writes_nothing_when_short() {
    let config = CodecConfig::with_block_capacity(2);
    let ids = [5, 10, 10000, 10005];
    let mut buf = [0u8; 20];
    assert!(matches!(
        encode_into(&mut buf, &ids, None, 7, &config),
        Err(CodecError::CapacityExceeded { available: 20, .. })
    ));
    assert!(buf.iter().all(|&b| b == 0));

    let mut buf = [0u8; 64];
    let used = encode_into(&mut buf, &ids, None, 7, &config).unwrap();
    let view = CompressedNeighbors::new(&buf[..used], 7, 4, &config);
    assert_eq!(neighbor_ids(&view), ids.to_vec());
}

#[test]
fn test_caller_buffer_mut_view() {
    let config = CodecConfig::with_block_capacity(3);
    let ids: Vec<VertexId> = (1..=12).collect();
    let mut buf = vec![0u8; 128];
    encode_into(&mut buf, &ids, None, 0, &config).unwrap();

    let mut view = CompressedNeighborsMut::new(&mut buf, 0, 12, &config);
    assert_eq!(view.pack(|_, n, _| n > 6).unwrap(), 6);
    assert_eq!(view.degree(), 6);
    assert_eq!(neighbor_ids(&view.as_neighbors()), (7..=12).collect::<Vec<_>>());
}

#[test]
fn test_verify_reports_corruption() {
    let config = CodecConfig::with_block_capacity(2);
    let stream = encode(&[1, 2, 3, 4, 5, 6], None, 0, &config).unwrap();

    let mut bad_offset = stream.bytes().to_vec();
    bad_offset[5..9].copy_from_slice(&1u32.to_le_bytes());
    let view = CompressedNeighbors::new(&bad_offset, 0, 6, &config);
    assert!(matches!(view.verify(), Err(CodecError::CorruptHeader { .. })));

    let bytes = stream.bytes();
    let truncated = CompressedNeighbors::new(&bytes[..bytes.len() - 1], 0, 6, &config);
    assert!(matches!(truncated.verify(), Err(CodecError::Truncated { .. })));

    let oversized = CompressedNeighbors::new(bytes, 0, 7, &config);
    assert!(matches!(oversized.verify(), Err(CodecError::CorruptHeader { .. })));
}

#[test]
fn test_repack_rejects_out_of_order_blocks() {
    let config = CodecConfig::with_block_capacity(2);
    let stream = encode(&[100, 200, 300, 400], None, 0, &config).unwrap();
    let mut bytes = stream.bytes().to_vec();

    // Rewrite block 1's first edge from 300 to 150, below block 0's last edge.
    let at = CompressedNeighbors::new(&bytes, 0, 4, &config)
        .layout()
        .unwrap()
        .block(1)
        .unwrap()
        .edges_start();
    bytes[at..at + 2].copy_from_slice(&[0x96, 0x02]);

    let mut view = CompressedNeighborsMut::new(&mut bytes, 0, 4, &config);
    assert_eq!(view.pack(|_, n, _| n != 100).unwrap(), 3);
    assert!(matches!(
        view.as_neighbors().verify(),
        Err(CodecError::InvariantViolation { .. })
    ));
    assert!(matches!(view.repack(), Err(CodecError::InvariantViolation { .. })));
    assert_eq!(neighbor_ids(&view.as_neighbors()), vec![200, 150, 250]);
}

#[test]
fn test_repack_that_does_not_fit_leaves_stream_intact() {
    let config = CodecConfig::with_block_capacity(2);
    let ids = [1, 2, 1 << 30, (1 << 30) + 1, (1 << 30) + 2, (1 << 30) + 3];
    let mut stream = encode(&ids, None, 0, &config).unwrap();
    assert_eq!(stream.bytes().len(), 39);
    assert_eq!(stream.pack(|_, n, _| n != 2).unwrap(), 5);

    // Block 0's survivor is now a large gap from 1 instead of a small one.
    assert!(matches!(
        stream.repack(),
        Err(CodecError::CapacityExceeded { needed: 42, available: 39 })
    ));
    let expected: Vec<VertexId> = ids.iter().copied().filter(|&n| n != 2).collect();
    assert_eq!(neighbor_ids(&stream.as_neighbors()), expected);
    stream.as_neighbors().verify().unwrap();
}

#[test]
fn test_iter_fuses_after_error() {
    let config = CodecConfig::with_block_capacity(2);
    let stream = encode(&[1, 2, 3, 4, 5, 6], None, 0, &config).unwrap();
    let bytes = stream.bytes();
    let truncated = CompressedNeighbors::new(&bytes[..bytes.len() - 1], 0, 6, &config);
    let items: Vec<_> = truncated.iter().unwrap().collect();
    assert_eq!(items.len(), 6);
    assert!(items[..5].iter().all(Result::is_ok));
    assert!(items[5].is_err());
}
