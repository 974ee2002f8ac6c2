use std::str::FromStr;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ebnfgram::ebnf::GrammarAST;
use sentgen::CompiledGrammar;

fn bench_enumeration(c: &mut Criterion) {
    let src = "Language \"bench\":
        start = \"a\" bOrCStar;
        bOrC = \"b\" | \"c\";
        bOrCStar = \u{2107} | bOrC bOrCStar;";
    let ast = GrammarAST::from_str(src).unwrap();
    let grm = CompiledGrammar::new(&ast).unwrap();

    c.bench_function("first_1000_sentences", |b| {
        b.iter(|| black_box(grm.sentences().take(1000).last()))
    });

    let labelled = "Language \"bench\":
        start = \u{2107} | identifier start;
        identifier! = \"a\" | \"b\" | \"c\";";
    let ast = GrammarAST::from_str(labelled).unwrap();
    let grm = CompiledGrammar::new(&ast).unwrap();

    c.bench_function("first_1000_labelled_sentences", |b| {
        b.iter(|| black_box(grm.sentences().take(1000).last()))
    });
}

criterion_group!(benches, bench_enumeration);
criterion_main!(benches);
