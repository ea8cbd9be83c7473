use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use robot::{parser::parse_source, program::Program, search::SearchAlgorithm, vm::VMOptions};

fn run(program: &Program, input: &[String], options: &VMOptions) {
    let mut output: Vec<String> = Vec::new();
    black_box(robot::vm::run(program, input.iter().cloned(), &mut output, options).unwrap());
    black_box(output);
}

fn criterion_benchmark(c: &mut Criterion) {
    let tests: Vec<(String, Program, Vec<String>)> = vec![
        (
            format!("unary-add"),
            parse_source(include_str!("programs/unary_add.robot")).unwrap(),
            vec!["|".repeat(2000), "|".repeat(1000)],
        ),
        (
            format!("replace-all"),
            parse_source(include_str!("programs/replace_all.robot")).unwrap(),
            vec!["the cat sat on the mat with another cat ".repeat(200)],
        ),
    ];

    let mut group = c.benchmark_group("full_program");
    for search in SearchAlgorithm::ALL {
        let options = VMOptions::default().with_search(search);
        for (name, prog, input) in tests.iter() {
            group.bench_function(BenchmarkId::from_parameter(format!("{name}/{search}")), |bencher: &mut criterion::Bencher<'_>| {
                bencher.iter(|| run(black_box(prog), black_box(input), &options));
            });
        }
    }
    group.finish();
}

criterion_group!(name = benches; config = Criterion::default(); targets = criterion_benchmark);
criterion_main!(benches);
