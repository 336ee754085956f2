use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use fmt_layer::{LineSet, elements_for_mismatches, whitespace_mismatches};

fn generate_document(blocks: usize) -> (String, String) {
    let mut original = String::new();
    let mut formatted = String::new();
    for i in 0..blocks {
        original.push_str(&format!("fn f{i}( a:u32 ,b:u32 )  {{\n\tlet x=a;\n  \n\n   x\n}}\n"));
        formatted.push_str(&format!("fn f{i}(a:u32, b:u32) {{\n    let x=a;\n\n    x\n}}\n"));
    }
    (original, formatted)
}

fn bench_walker(c: &mut Criterion) {
    let mut group = c.benchmark_group("walker");

    for blocks in [100usize, 1_000, 10_000] {
        let (original, formatted) = generate_document(blocks);
        let mismatches = whitespace_mismatches(&original, &formatted).unwrap();
        let lines = LineSet::from_text(&original);

        group.bench_with_input(BenchmarkId::new("elements", blocks), &blocks, |b, _| {
            b.iter(|| {
                let elements =
                    elements_for_mismatches(black_box(&lines), &formatted, &mismatches, 4);
                black_box(elements.len())
            });
        });
    }

    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let (original, formatted) = generate_document(1_000);
    c.bench_function("whitespace_mismatches_1000_blocks", |b| {
        b.iter(|| whitespace_mismatches(black_box(&original), black_box(&formatted)).unwrap())
    });
}

criterion_group!(benches, bench_walker, bench_diff);
criterion_main!(benches);
