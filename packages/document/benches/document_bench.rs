use criterion::{black_box, criterion_group, criterion_main, Criterion};
use xmlens_document::{parse, serialize};

fn sample_source(entries: usize) -> String {
    let mut source = String::from("<?xml version=\"1.0\"?>\n<config>\n");
    for i in 0..entries {
        source.push_str(&format!(
            "  <entry key=\"k{i}\" enabled=\"true\"><value>{i}</value></entry>\n"
        ));
    }
    source.push_str("</config>\n");
    source
}

fn parse_document(c: &mut Criterion) {
    let source = sample_source(200);

    c.bench_function("parse_document", |b| b.iter(|| parse(black_box(&source))));
}

fn serialize_document(c: &mut Criterion) {
    let doc = parse(&sample_source(200)).unwrap();

    c.bench_function("serialize_document", |b| b.iter(|| serialize(black_box(&doc))));
}

criterion_group!(benches, parse_document, serialize_document);
criterion_main!(benches);
