//! Benchmarks for dungeon generation, pathfinding and rendering.
//!
//! ```bash
//! cargo bench --bench dungeon
//! ```

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use delve::{
    render, DungeonGenerator, DungeonMap, DungeonTemplate, FogOfWarEngine, GenerationConfig,
    MovementEngine, Position, RenderFormat, RenderOptions,
};

fn generated(template: &str) -> DungeonMap {
    DungeonGenerator::new().generate_map(&GenerationConfig::for_template(template, 1234))
}

/// Two walkable tiles far apart on the map, for worst-case BFS.
fn far_apart(map: &DungeonMap) -> (Position, Position) {
    let mut walkable = map.tiles.iter().filter(|tile| !tile.is_blocking());
    let first = walkable.next().map(|tile| tile.position()).unwrap_or(Position::new(0, 0));
    let last = walkable.last().map(|tile| tile.position()).unwrap_or(first);
    (first, last)
}

pub fn generation_bench(c: &mut Criterion) {
    let generator = DungeonGenerator::new();
    for template in DungeonTemplate::names() {
        c.bench_function(&format!("generate: {template}"), |b| {
            let mut seed = 0u64;
            b.iter(|| {
                seed += 1;
                generator.generate_map(black_box(&GenerationConfig::for_template(template, seed)))
            })
        });
    }

    c.bench_function("generate: large_dungeon, 40 rooms", |b| {
        let config = GenerationConfig::for_template("large_dungeon", 99).with_room_count(40);
        b.iter(|| generator.generate_map(black_box(&config)))
    });
}

pub fn pathfinding_bench(c: &mut Criterion) {
    let engine = MovementEngine::new();
    let map = generated("large_dungeon");
    let (from, to) = far_apart(&map);

    c.bench_function("bfs: across large_dungeon", |b| {
        b.iter(|| engine.calculate_path(&map, black_box(from), black_box(to)))
    });

    let fog = FogOfWarEngine::new();
    c.bench_function("line of sight: radius 8", |b| {
        b.iter(|| fog.line_of_sight(&map.tiles, black_box(from), 8))
    });

    c.bench_function("fog: refresh", |b| {
        b.iter_batched(
            || map.clone(),
            |mut map| fog.refresh(&mut map),
            BatchSize::SmallInput,
        )
    });
}

pub fn rendering_bench(c: &mut Criterion) {
    let map = generated("large_dungeon");
    let options = RenderOptions::default();

    c.bench_function("render: text", |b| {
        b.iter(|| render(black_box(&map), RenderFormat::Text, &options))
    });
    c.bench_function("render: vector", |b| {
        b.iter(|| render(black_box(&map), RenderFormat::Vector, &options))
    });
    c.bench_function("render: vector to svg", |b| {
        b.iter(|| delve::render_vector(black_box(&map), &options).to_svg())
    });
    c.bench_function("render: sprite data", |b| {
        b.iter(|| render(black_box(&map), RenderFormat::SpriteData, &options))
    });
}

criterion_group!(benches, generation_bench, pathfinding_bench, rendering_bench);
criterion_main!(benches);
