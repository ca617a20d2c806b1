use criterion::{Criterion, criterion_group, criterion_main};
use textpattern_engine::editing::{
    Cmd, Document, MovementPolicy, TextRange, TextRangeProvider, TextUnit,
};

fn generate_text_content(paragraphs: usize) -> String {
    let mut out = String::new();
    for i in 0..paragraphs {
        out.push_str(&format!(
            "Paragraph {i}: the quick brown fox jumps over the lazy dog, again and again.\n"
        ));
    }
    out
}

fn bench_anchor_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("anchors");
    group.sample_size(10);

    let content = generate_text_content(100);

    group.bench_function("transform_1000_anchors_through_edit", |b| {
        let mut doc = Document::new(&content);
        let step = doc.len() / 1000;
        for i in 0..1000 {
            doc.create_anchor(i * step, MovementPolicy::StaysBeforeInsertion)
                .unwrap();
        }
        b.iter(|| {
            let patch = doc.apply(Cmd::InsertText {
                at: doc.len() / 2,
                text: "x".to_string(),
            });
            std::hint::black_box(patch);
        });
    });

    group.bench_function("word_navigation_full_document", |b| {
        let doc = Document::shared(&content);
        b.iter(|| {
            let mut range = TextRange::new(&doc, 0, 0).unwrap();
            range.expand_to_enclosing_unit(TextUnit::Word).unwrap();
            while range.move_by(TextUnit::Word, 1).unwrap() == 1 {}
            std::hint::black_box(range.offsets().unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_anchor_operations);
criterion_main!(benches);
