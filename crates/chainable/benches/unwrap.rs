use chainable::{args, Chain, Fault, Function};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn numeric_chain(links: usize) -> Chain {
    let step = Function::multi(|x: i64| (x + 1, None::<Fault>));
    Chain::new()
        .from(args![0i64])
        .chain(std::iter::repeat(step).take(links))
}

fn bench_unwrap(c: &mut Criterion) {
    let chain = numeric_chain(16);
    c.bench_function("unwrap_16_links", |b| {
        b.iter(|| black_box(chain.unwrap()))
    });

    let chain = numeric_chain(16);
    c.bench_function("unwrap_traced_16_links", |b| {
        b.iter(|| black_box(chain.unwrap_traced()))
    });
}

criterion_group!(benches, bench_unwrap);
criterion_main!(benches);
