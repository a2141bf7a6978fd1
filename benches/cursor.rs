//! Benchmarks for the per-keystroke paths
//!
//! Every input change runs token analysis, line partitioning and trigger
//! resolution; every measure runs placement. All of these scale with buffer
//! length.
//!
//! Run with: cargo bench cursor

use mention_editor::cursor::{analyze, focused_lines};
use mention_editor::model::TextBuffer;
use mention_editor::overlay::{compute_placement, AnchorRect, Offset, OverlayPositioner, Size};
use mention_editor::trigger::{TriggerResolver, TriggerTable};

fn main() {
    divan::main();
}

fn prose(lines: usize) -> String {
    "The quick brown fox jumps over the lazy dog.\n".repeat(lines) + "cc @\"Nice Pla"
}

#[divan::bench(args = [100, 1_000, 10_000])]
fn analyze_at_end(bencher: divan::Bencher, lines: usize) {
    let text = prose(lines);
    let buffer = TextBuffer::with_caret(text.clone(), text.chars().count());
    bencher.bench(|| analyze(divan::black_box(&buffer)));
}

#[divan::bench(args = [100, 1_000, 10_000])]
fn focused_lines_range(bencher: divan::Bencher, lines: usize) {
    let text = prose(lines);
    let len = text.chars().count();
    let buffer = TextBuffer::new(text, len / 3, len / 2);
    bencher.bench(|| focused_lines(divan::black_box(&buffer)));
}

#[divan::bench(args = [100, 1_000, 10_000])]
fn resolve_quoted_mention(bencher: divan::Bencher, lines: usize) {
    let text = prose(lines);
    let buffer = TextBuffer::with_caret(text.clone(), text.chars().count());
    let resolver = TriggerResolver::new(TriggerTable::default(), true);
    bencher.bench(|| resolver.resolve_buffer(divan::black_box(&buffer)));
}

#[divan::bench]
fn compute_placement_grid() {
    let viewport = Size::new(1280.0, 800.0);
    let panel = Size::new(320.0, 240.0);
    for left in (0..1280).step_by(16) {
        for top in (0..800).step_by(16) {
            let anchor = AnchorRect::new(top as f64, left as f64, 1.0, 18.0);
            divan::black_box(compute_placement(
                anchor,
                panel,
                viewport,
                Offset::new(0.0, 3.0),
            ));
        }
    }
}

#[divan::bench]
fn reposition_gate_hits() {
    let mut positioner = OverlayPositioner::new();
    let viewport = Size::new(1280.0, 800.0);
    let panel = Size::new(320.0, 240.0);
    for i in 0..10_000 {
        // Sub-pixel jitter on a fixed anchor
        let jitter = (i % 7) as f64 * 0.01;
        let anchor = AnchorRect::new(100.0 + jitter, 40.0, 1.0, 18.0);
        divan::black_box(positioner.reposition(anchor, 1, panel, viewport, Offset::new(0.0, 3.0)));
    }
}
