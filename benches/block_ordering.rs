//! 块排序性能基准测试

use chrono::Utc;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use linkfolio::services::{next_position, sort_for_editor, sort_for_public};
use linkfolio::storage::models::{Block, BlockConfig, BlockKind};

fn make_blocks(count: usize) -> Vec<Block> {
    let now = Utc::now();
    (0..count)
        .map(|i| Block {
            id: i as i64,
            page_id: 1,
            // 质数步进打散 position
            position: ((i * 31) % count) as i32,
            config: BlockConfig::default_for(&BlockKind::Link),
            is_visible: i % 3 != 0,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

// ============== 排序基准测试 ==============

fn bench_ordering(c: &mut Criterion) {
    let mut group = c.benchmark_group("services/ordering");

    for size in [16usize, 64, 256] {
        let blocks = make_blocks(size);

        group.bench_with_input(
            BenchmarkId::new("sort_for_editor", size),
            &blocks,
            |b, blocks| {
                b.iter(|| {
                    let sorted = sort_for_editor(blocks);
                    assert_eq!(sorted.len(), blocks.len());
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("sort_for_public", size),
            &blocks,
            |b, blocks| {
                b.iter(|| {
                    let sorted = sort_for_public(blocks);
                    assert!(sorted.len() <= blocks.len());
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("next_position", size),
            &blocks,
            |b, blocks| {
                b.iter(|| {
                    assert!(next_position(blocks) > 0);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_ordering);
criterion_main!(benches);
