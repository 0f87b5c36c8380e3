use criterion::{black_box, criterion_group, criterion_main, Criterion};
use row_hydrator::{DynamicModel, HydrateOptions, Hydrator, RowInput};
use serde_json::json;

fn rows(count: usize) -> serde_json::Value {
    json!((0..count)
        .map(|integer| json!({"integer": integer, "name": format!("row-{integer}")}))
        .collect::<Vec<_>>())
}

fn benchmark_classify(c: &mut Criterion) {
    let input = rows(1_000);
    c.bench_function("classify_1000_rows", |b| {
        b.iter(|| RowInput::<DynamicModel>::classify(black_box(input.clone())))
    });
}

fn benchmark_hydrate_sequence(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let hydrator = &Hydrator::<DynamicModel>::new();
    let input = &rows(1_000);

    c.bench_function("hydrate_1000_rows", |b| {
        b.to_async(&runtime).iter(move || async move {
            hydrator
                .hydrate_value(black_box(input.clone()), HydrateOptions::default())
                .await
                .unwrap()
        })
    });
}

criterion_group!(benches, benchmark_classify, benchmark_hydrate_sequence);
criterion_main!(benches);
