//! Lexer throughput benchmarks.
//!
//! Run with `cargo bench --package minoc-lex`.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use minoc_lex::Lexer;
use minoc_util::Handler;

fn token_count(source: &str) -> usize {
    let handler = Handler::new();
    Lexer::new(source, &handler).count()
}

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let simple = "int main(int x) { return x * x; }";
    group.throughput(Throughput::Bytes(simple.len() as u64));
    group.bench_function("simple_function", |b| {
        b.iter(|| token_count(black_box(simple)))
    });

    let loops = r#"
        int sum(int n) {
            int s = 0;
            int i = 1;
            while (i <= n) { s = s + i; i = i + 1; }
            return s;
        }
        bool even(int n) { return n % 2 == 0; }
        int main(int x) { return even(x) ? sum(x) : -sum(x); }
    "#;
    group.throughput(Throughput::Bytes(loops.len() as u64));
    group.bench_function("loops_and_operators", |b| {
        b.iter(|| token_count(black_box(loops)))
    });

    group.finish();
}

criterion_group!(benches, bench_lexer);
criterion_main!(benches);
