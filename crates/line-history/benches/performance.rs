use std::time::{Duration, Instant};

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use line_history::{History, LineDocument, NoProcessing};

fn line_texts(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{i:06} the quick brown fox jumps over the lazy dog (line-history benchmark)"))
        .collect()
}

fn load(lines: &[&str]) -> (LineDocument, History) {
    let mut doc = LineDocument::new();
    let mut history = History::new(100, Duration::from_millis(300));
    history.push(&mut doc, &mut NoProcessing, None, None, lines);
    history.reset();
    (doc, history)
}

fn bench_load_document(c: &mut Criterion) {
    let lines = line_texts(10_000);
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    c.bench_function("load_document/10k_lines", |b| {
        b.iter(|| {
            let (doc, _history) = load(black_box(&refs));
            black_box(doc.line_count());
        })
    });
}

fn bench_commit_touched_slice(c: &mut Criterion) {
    let lines = line_texts(10_000);
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();

    // An undo level's cost should track the 100 edited lines, not the 10k-line document.
    c.bench_function("commit/100_touched_of_10k", |b| {
        b.iter_batched(
            || {
                let (mut doc, mut history) = load(&refs);
                let now = Instant::now();
                for i in 5_000..5_100 {
                    let anchor = doc.line_start(i).expect("line exists");
                    doc.set_line_content(anchor, "edited").unwrap();
                    history.touch(anchor, now);
                }
                (doc, history)
            },
            |(mut doc, mut history)| {
                history.commit(&mut doc, &mut NoProcessing);
                black_box(history.undo_depth());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_undo_redo_cycle(c: &mut Criterion) {
    let lines = line_texts(10_000);
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let (mut doc, mut history) = load(&refs);
    let now = Instant::now();
    let anchor = doc.line_start(5_000).expect("line exists");
    doc.set_line_content(anchor, "edited").unwrap();
    history.touch(anchor, now);
    history.commit(&mut doc, &mut NoProcessing);

    c.bench_function("undo_redo_cycle/10k_lines", |b| {
        b.iter(|| {
            history.undo(&mut doc, &mut NoProcessing);
            history.redo(&mut doc, &mut NoProcessing);
            black_box(history.undo_depth());
        })
    });
}

criterion_group!(
    benches,
    bench_load_document,
    bench_commit_touched_slice,
    bench_undo_redo_cycle
);
criterion_main!(benches);
