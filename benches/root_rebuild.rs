//! Benchmarks for insertion and root computation.
//!
//! Measures the two costs that dominate block processing: pushing a batch of
//! keyed values into the tree, and merkleizing the result. Stem locality is
//! the interesting axis, so the workload is parameterized by values per stem.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ubtree::{Blake3Hasher, StateTree, Stem, TreeKey, B256};

fn synthetic_entries(num_stems: usize, values_per_stem: usize) -> Vec<(TreeKey, B256)> {
    let mut entries = Vec::with_capacity(num_stems * values_per_stem);
    for i in 0..num_stems {
        let mut stem_bytes = [0u8; 31];
        stem_bytes[0] = (i >> 16) as u8;
        stem_bytes[1] = (i >> 8) as u8;
        stem_bytes[2] = i as u8;
        stem_bytes[17] = (i.wrapping_mul(31) % 256) as u8;
        let stem = Stem::new(stem_bytes);
        for j in 0..values_per_stem {
            let subindex = (j * 7 % 256) as u8;
            let value = B256::repeat_byte((i + j) as u8 | 0x01);
            entries.push((TreeKey::new(stem, subindex), value));
        }
    }
    entries
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for (num_stems, per_stem) in [(1000, 1), (100, 10), (10, 100)] {
        let entries = synthetic_entries(num_stems, per_stem);
        group.throughput(Throughput::Elements(entries.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_stems}x{per_stem}")),
            &entries,
            |b, entries| {
                b.iter(|| {
                    let mut tree: StateTree<Blake3Hasher> = StateTree::new();
                    tree.insert_batch(entries.iter().copied()).unwrap();
                    black_box(tree.len())
                });
            },
        );
    }
    group.finish();
}

fn bench_root(c: &mut Criterion) {
    let mut group = c.benchmark_group("root");
    group.sample_size(20);
    for (num_stems, per_stem) in [(1000, 1), (100, 10), (10, 100)] {
        let entries = synthetic_entries(num_stems, per_stem);
        let mut tree: StateTree<Blake3Hasher> = StateTree::new();
        tree.insert_batch(entries).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{num_stems}x{per_stem}")),
            &tree,
            |b, tree| {
                b.iter(|| black_box(tree.compute_root()));
            },
        );
    }
    group.finish();
}

fn bench_root_after_point_update(c: &mut Criterion) {
    let entries = synthetic_entries(500, 2);
    let mut tree: StateTree<Blake3Hasher> = StateTree::new();
    tree.insert_batch(entries).unwrap();
    tree.root();

    let key = TreeKey::new(Stem::new([0x42; 31]), 0);
    c.bench_function("root_after_point_update", |b| {
        let mut counter = 0u8;
        b.iter(|| {
            counter = counter.wrapping_add(1);
            tree.insert(key, B256::repeat_byte(counter | 0x01)).unwrap();
            black_box(tree.root())
        });
    });
}

criterion_group!(benches, bench_insert, bench_root, bench_root_after_point_update);
criterion_main!(benches);
