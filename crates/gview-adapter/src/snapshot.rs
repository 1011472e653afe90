//! Snapshot helpers for frame-based render tests.

use crate::render::RenderFrame;

/// Assert a stable text snapshot for a render frame.
///
/// Trailing spaces on each row and a trailing newline on `expected` are
/// ignored, so expectations can be written as plain indented text blocks.
pub fn assert_render_frame_snapshot(label: &str, frame: &RenderFrame, expected: &str) {
    let expected = normalize(expected);
    let got = normalize(&frame.snapshot());
    assert_eq!(
        got, expected,
        "render frame snapshot mismatch ({label})\n--- expected\n{expected}\n--- got\n{got}",
    );
}

fn normalize(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end_matches('\n')
        .to_owned()
}
