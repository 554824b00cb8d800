use criterion::{black_box, criterion_group, criterion_main, Criterion};
use elites::{Archive, FeatureDimension, Objective, Relation, Selector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bench_discretize(c: &mut Criterion) {
    let bins: Vec<f64> = (0..=100).map(|i| i as f64 / 10.0).collect();
    let dimension = FeatureDimension::new(
        "x0",
        |_: &[f64]| 0.0,
        |x: &[f64]| x[0],
        Relation::LessOrEqual,
        bins,
    )
    .unwrap();

    c.bench_function("descriptor_error_and_discretize", |b| {
        b.iter(|| dimension.cell_index(black_box(&[4.2, 1.0])))
    });
}

fn bench_place(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut archive = Archive::new(vec![50, 50], Objective::Minimize).unwrap();

    c.bench_function("archive_place_50x50", |b| {
        b.iter(|| {
            let cell: [usize; 2] = [rng.gen_range(0..50), rng.gen_range(0..50)];
            let performance: f64 = rng.gen();
            black_box(archive.place(&cell, vec![performance], performance))
        })
    });
}

fn bench_select(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let mut archive = Archive::new(vec![50, 50], Objective::Minimize).unwrap();
    for _ in 0..250 {
        let cell: [usize; 2] = [rng.gen_range(0..50), rng.gen_range(0..50)];
        archive.place(&cell, vec![0.0], 1.0).unwrap();
    }
    let selector = Selector::new(10_000);

    c.bench_function("select_one_sparse_50x50", |b| {
        b.iter(|| black_box(selector.sample(&archive, 1, &mut rng)))
    });
    c.bench_function("select_two_sparse_50x50", |b| {
        b.iter(|| black_box(selector.sample(&archive, 2, &mut rng)))
    });
}

criterion_group!(benches, bench_discretize, bench_place, bench_select);
criterion_main!(benches);
