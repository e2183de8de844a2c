use criterion::{criterion_group, criterion_main, Criterion};
use imgdesc::lowlevel::convolve;
use imgdesc::{
    color_histogram, distance, extract, Color4f, ExtractConfig, GaussianBlur, Kernel, Metric,
    ParallelReducer, PixelBuffer,
};
use std::hint::black_box;

fn make_image(width: usize, height: usize) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        let r = ((x * 13) ^ (y * 7) ^ (x * y)) & 0xFF;
        let g = (x * 5 + y * 3) & 0xFF;
        let b = ((x ^ y) * 11) & 0xFF;
        Color4f::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    })
    .unwrap()
}

fn bench_filters(c: &mut Criterion) {
    let image = make_image(512, 512);
    let kernel = Kernel::new(3, 3, vec![1.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 1.0]).unwrap();
    let blur = GaussianBlur::from_sigma(2.0).unwrap();

    for (label, reducer) in [
        ("seq", ParallelReducer::sequential()),
        ("par", ParallelReducer::default()),
    ] {
        c.bench_function(&format!("convolve_3x3_{label}"), |b| {
            b.iter(|| convolve(black_box(&image), &kernel, &reducer).unwrap())
        });
        c.bench_function(&format!("gaussian_sigma2_{label}"), |b| {
            b.iter(|| blur.apply(black_box(&image), &reducer).unwrap())
        });
    }
}

fn bench_descriptors(c: &mut Criterion) {
    let image = make_image(512, 512);
    let other = make_image(480, 512);

    c.bench_function("extract_512", |b| {
        b.iter(|| extract(black_box(&image), &ExtractConfig::default()).unwrap())
    });

    let reducer = ParallelReducer::default();
    let a = color_histogram(&image, &reducer).unwrap();
    let b_hist = color_histogram(&other, &reducer).unwrap();
    for metric in Metric::ALL {
        c.bench_function(&format!("distance_{metric}"), |b| {
            b.iter(|| distance(black_box(&a), black_box(&b_hist), metric).unwrap())
        });
    }
}

criterion_group!(benches, bench_filters, bench_descriptors);
criterion_main!(benches);
