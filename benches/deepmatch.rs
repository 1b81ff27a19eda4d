use criterion::{criterion_group, criterion_main, Criterion};
use deepmatch::{preprocess, warp_into_reference};
use image::{Rgb, RgbImage};
use nalgebra::Matrix3;
use std::hint::black_box;

fn make_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let value = (((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF) as u8;
        Rgb([value, value ^ 0x55, 255 - value])
    })
}

fn bench_preprocess(c: &mut Criterion) {
    let image = make_image(1280, 960);
    c.bench_function("preprocess_1280x960", |b| {
        b.iter(|| preprocess(black_box(&image), 640, 640).unwrap())
    });
}

fn bench_warp(c: &mut Criterion) {
    let image = make_image(640, 480);
    let homography = Matrix3::new(1.02, 0.01, -4.0, -0.008, 0.99, 3.0, 1e-5, -2e-5, 1.0);
    c.bench_function("warp_640x480", |b| {
        b.iter(|| warp_into_reference(black_box(&image), &homography, 640, 480))
    });
}

criterion_group!(benches, bench_preprocess, bench_warp);
criterion_main!(benches);
