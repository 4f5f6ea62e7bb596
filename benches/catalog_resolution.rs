use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use knx_bridge::{AddressCatalog, CanonicalDatatype, ChangeDispatcher, ChangeEvent, DatatypeMap, RawAddress};

const DATATYPES: [&str; 6] = [
    "DPST-9-1",
    "DPST-9-7",
    "DPST-5-1",
    "DPST-1-1",
    "DPST-13-13",
    "DPST-232-600",
];

fn project(size: usize) -> Vec<RawAddress> {
    (0..size)
        .map(|i| {
            RawAddress::new(
                format!("{}/{}/{}", i / 2048, (i / 256) % 8, i % 256),
                Some(DATATYPES[i % DATATYPES.len()]),
                format!("Point {}", i),
            )
        })
        .collect()
}

/// Benchmark building the datatype map from the built-in table
fn bench_build_map(c: &mut Criterion) {
    c.bench_function("datatype_map_builtin", |b| {
        b.iter(|| DatatypeMap::builtin().unwrap());
    });
}

/// Benchmark datatype normalization
fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_datatype", |b| {
        b.iter(|| CanonicalDatatype::normalize(black_box("DPST-9-1")));
    });
}

/// Benchmark resolving catalogs of varying size
fn bench_resolve_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_catalog");
    let map = DatatypeMap::builtin().unwrap();

    for size in [10usize, 100, 1000, 5000].iter() {
        let rows = project(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, rows| {
            b.iter(|| AddressCatalog::resolve(black_box(rows.clone()), &map));
        });
    }
    group.finish();
}

/// Benchmark building a metric record from a change event
fn bench_record_for(c: &mut Criterion) {
    let event = ChangeEvent::new("Temp1", 21.5, Some("°C"));

    c.bench_function("record_for", |b| {
        b.iter(|| ChangeDispatcher::record_for(black_box(&event)));
    });
}

criterion_group!(
    benches,
    bench_build_map,
    bench_normalize,
    bench_resolve_catalog,
    bench_record_for,
);
criterion_main!(benches);
