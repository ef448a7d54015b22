use std::hint::black_box;
use std::time::Instant;

use blockfield_common::SessionRng;
use blockfield_heightmap::{GeneratorParams, HeightRaster, HeightfieldGenerator, RadialGradient};

fn bench_regenerate(stamps: u32, iterations: usize) {
    let mut generator = HeightfieldGenerator::new(GeneratorParams {
        stamps,
        ..GeneratorParams::default()
    });
    generator.attach_surface();
    let mut rng = SessionRng::from_seed_u64(42);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(generator.regenerate(black_box(&mut rng)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  regenerate ({stamps} stamps, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_single_stamp(outer_radius: f32, iterations: usize) {
    let mut raster = HeightRaster::new();
    let stamp = RadialGradient {
        center: glam::Vec2::new(128.0, 128.0),
        inner_radius: 1.0,
        outer_radius,
        intensity: 200,
    };

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(&stamp).composite_onto(black_box(&mut raster));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  single stamp (r={outer_radius}, {iterations} iters): \
         {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Heightfield Benchmarks ===\n");

    println!("Regeneration pass:");
    bench_regenerate(10, 200);
    bench_regenerate(100, 100);
    bench_regenerate(1000, 10);

    println!("\nSingle gradient composite:");
    bench_single_stamp(10.0, 10_000);
    bench_single_stamp(50.0, 2_000);
    bench_single_stamp(128.0, 500);

    println!("\nDone.");
}
