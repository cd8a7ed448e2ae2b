use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use simpledb::{MemoryBackend, QueryProcessor, Storage, Value};
use std::hint::black_box;

fn setup_populated_storage(n: usize) -> Storage {
    let mut storage = Storage::with_backend("bench", Box::new(MemoryBackend::new())).unwrap();
    QueryProcessor::new(&mut storage)
        .execute("CREATE TABLE users id INT, name STRING, age INT, active BOOL")
        .unwrap();

    let table = storage.get_table("users").unwrap();
    for i in 0..n {
        let row = vec![
            Value::Int(i as i64),
            Value::from(format!("user{i}")),
            Value::Int((i % 100) as i64),
            Value::Bool(i % 2 == 0),
        ];
        table.insert_row(row).unwrap();
    }
    storage
}

fn bench_insert_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("Insert_Pipeline");
    group.bench_function("insert_single_row", |b| {
        let mut storage = Storage::with_backend("bench", Box::new(MemoryBackend::new())).unwrap();
        QueryProcessor::new(&mut storage)
            .execute("CREATE TABLE tests id")
            .unwrap();
        b.iter(|| {
            QueryProcessor::new(&mut storage)
                .execute(black_box("INSERT INTO tests VALUES 42"))
                .unwrap();
        });
    });
    group.finish();
}

fn bench_select_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Select_Where_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let mut storage = setup_populated_storage(n);
            b.iter(|| {
                let res = QueryProcessor::new(&mut storage)
                    .query("SELECT * FROM users WHERE age = 42")
                    .unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Projection_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let mut storage = setup_populated_storage(n);
            b.iter(|| {
                let res = QueryProcessor::new(&mut storage)
                    .query("SELECT name, age FROM users")
                    .unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_insert_pipeline,
    bench_select_scaling,
    bench_projection
);
criterion_main!(benches);
