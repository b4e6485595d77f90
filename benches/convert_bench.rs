use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fragmenta::convert::convert;
use fragmenta::BaseType;

fn sample_markdown() -> Vec<u8> {
    let mut doc = String::from("# Benchmark document\n\n");
    for section in 0..50 {
        doc.push_str(&format!("## Section {section}\n\n"));
        doc.push_str(
            "Some paragraph text with **bold**, *italic* and `code` spans, \
             long enough that the plain-text rendering has to wrap it across \
             several output lines.\n\n",
        );
        doc.push_str("- first item\n- second item\n- third item\n\n");
    }
    doc.into_bytes()
}

fn bench_markdown(c: &mut Criterion) {
    let doc = sample_markdown();

    c.bench_function("markdown_to_html", |b| {
        b.iter(|| convert(black_box(&doc), BaseType::TextMarkdown, "html").unwrap())
    });
    c.bench_function("markdown_to_text", |b| {
        b.iter(|| convert(black_box(&doc), BaseType::TextMarkdown, "txt").unwrap())
    });
}

fn bench_html_strip(c: &mut Criterion) {
    let html = convert(&sample_markdown(), BaseType::TextMarkdown, "html").unwrap();

    c.bench_function("html_to_text", |b| {
        b.iter(|| convert(black_box(&html), BaseType::TextHtml, "txt").unwrap())
    });
}

fn bench_json(c: &mut Criterion) {
    let json = serde_json::to_vec(&serde_json::json!({
        "items": (0..1000).map(|i| serde_json::json!({"id": i, "name": format!("item-{i}")})).collect::<Vec<_>>()
    }))
    .unwrap();

    c.bench_function("json_to_text_1k_items", |b| {
        b.iter(|| convert(black_box(&json), BaseType::ApplicationJson, "txt").unwrap())
    });
}

criterion_group!(benches, bench_markdown, bench_html_strip, bench_json);
criterion_main!(benches);
