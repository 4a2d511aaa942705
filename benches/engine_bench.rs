use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rusty_pixels::canvas::chunk_cache::ChunkCache;
use rusty_pixels::canvas::project::Project;
use rusty_pixels::fill::{FillOptions, FloodFill};
use rusty_pixels::selection::ContiguousSelect;
use rusty_pixels::utils::color::Color;
use rusty_pixels::utils::geometry::IRect;

/// 256x256 checker of 8px squares with a ring of walls every 32px.
fn busy_project() -> Project {
    let mut project = Project::new("bench");
    let layer = project.active_layer;
    for y in 0..256 {
        for x in 0..256 {
            let color = if x % 32 == 0 || y % 32 == 0 {
                Color::BLACK
            } else if (x / 8 + y / 8) % 2 == 0 {
                Color::WHITE
            } else {
                continue;
            };
            project.set_pixel(layer, x, y, Some(color));
        }
    }
    project
}

fn bench_compose(c: &mut Criterion) {
    let project = busy_project();
    let viewport = IRect::new(-16, -16, 320, 240);

    c.bench_function("compose_cold_320x240", |b| {
        b.iter(|| {
            let mut cache = ChunkCache::new(64);
            black_box(cache.compose(project.frame(), viewport).pixels.len());
        })
    });

    let mut cache = ChunkCache::new(64);
    cache.compose(project.frame(), viewport);
    let mut shift = 0;
    c.bench_function("compose_warm_pan", |b| {
        b.iter(|| {
            shift = (shift + 1) % 64;
            let view = IRect::new(viewport.x + shift, viewport.y, viewport.w, viewport.h);
            black_box(cache.compose(project.frame(), view).pixels.len());
        })
    });
}

fn bench_fill(c: &mut Criterion) {
    let project = busy_project();
    let layer = project.active_layer;
    let red = Color::rgb(255, 0, 0);

    c.bench_function("fill_open_plane", |b| {
        let fill = FloodFill::default();
        b.iter(|| black_box(fill.fill(project.frame(), layer, (-10, -10), red).len()))
    });

    c.bench_function("fill_smart_cell", |b| {
        let fill = FloodFill::new(FillOptions {
            smart: true,
            ..Default::default()
        });
        b.iter(|| black_box(fill.fill(project.frame(), layer, (44, 44), red).len()))
    });
}

fn bench_select(c: &mut Criterion) {
    let project = busy_project();
    let layer = project.layer(project.active_layer).expect("bench layer");

    c.bench_function("select_walls", |b| {
        let select = ContiguousSelect::default();
        b.iter(|| black_box(select.run(layer, (0, 0)).map(|s| s.outline.len())))
    });
}

criterion_group!(benches, bench_compose, bench_fill, bench_select);
criterion_main!(benches);
