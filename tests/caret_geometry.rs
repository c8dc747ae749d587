use pretty_assertions::assert_eq;
use textbox_intellisense::{
    CaretCoordinate, ComputedStyle, Engine, HeadlessDocument, StyleProperty, TextField,
    measure_caret,
};

fn style(width: &str) -> ComputedStyle {
    ComputedStyle::new()
        .with(StyleProperty::FontSize, "10px")
        .with(StyleProperty::LineHeight, "12px")
        .with(StyleProperty::Width, width)
        .with(StyleProperty::PaddingLeft, "2px")
        .with(StyleProperty::PaddingTop, "1px")
        .with(StyleProperty::BorderLeftWidth, "1px")
        .with(StyleProperty::BorderTopWidth, "1px")
}

#[test]
fn single_line_caret_moves_right_without_wrapping() {
    let mut doc = HeadlessDocument::new();
    // Narrow enough that a textarea would wrap "hello world".
    let input = TextField::single_line(style("40px")).with_value("hello world");

    let mut previous: Option<CaretCoordinate> = None;
    for offset in 0..="hello world".len() {
        let caret = measure_caret(&mut doc, &input, offset).expect("caret");
        if let Some(previous) = previous {
            assert!(
                caret.left > previous.left,
                "offset {offset}: {} <= {}",
                caret.left,
                previous.left
            );
            assert_eq!(caret.top, previous.top);
        }
        previous = Some(caret);
    }
}

#[test]
fn single_line_caret_at_five_sits_after_hello() {
    let mut doc = HeadlessDocument::new();
    let input = TextField::single_line(style("400px")).with_value("hello world");

    let caret = measure_caret(&mut doc, &input, 5).expect("caret");
    // padding + border + five 6px glyphs
    assert_eq!(caret, CaretCoordinate::new(2.0, 33.0));
}

#[test]
fn multi_line_caret_wraps_with_the_word() {
    let mut doc = HeadlessDocument::new();
    // Ten glyphs per line.
    let textarea = TextField::multi_line(style("60px")).with_value("hello wonderful world");

    let before_wrap = measure_caret(&mut doc, &textarea, 5).expect("caret");
    let after_wrap = measure_caret(&mut doc, &textarea, 6).expect("caret");

    assert!(after_wrap.left < before_wrap.left);
    assert!(after_wrap.top > before_wrap.top);
    assert_eq!(after_wrap, CaretCoordinate::new(14.0, 3.0));
}

#[test]
fn caret_inside_a_wrapped_word_lands_on_the_next_line() {
    let mut doc = HeadlessDocument::new();
    let textarea = TextField::multi_line(style("60px")).with_value("hello wonderful world");

    // "hello won|derful": measuring only "hello won" would keep it on line one.
    let caret = measure_caret(&mut doc, &textarea, 9).expect("caret");
    assert_eq!(caret, CaretCoordinate::new(14.0, 21.0));
}

#[test]
fn measuring_twice_is_idempotent_and_leaves_nothing_behind() {
    let mut doc = HeadlessDocument::new();
    let textarea = TextField::multi_line(style("60px")).with_value("hello wonderful world");

    let first = measure_caret(&mut doc, &textarea, 12).expect("caret");
    let second = measure_caret(&mut doc, &textarea, 12).expect("caret");

    assert_eq!(first, second);
    assert_eq!(doc.live_elements(), 0);
}

#[test]
fn failed_measurement_still_cleans_up() {
    let mut doc = HeadlessDocument::new();
    doc.fail_measurement(true);
    let textarea = TextField::multi_line(style("60px")).with_value("abc");

    assert!(measure_caret(&mut doc, &textarea, 1).is_err());
    assert_eq!(doc.live_elements(), 0);
}

#[test]
fn gecko_width_correction_changes_wrapping() {
    // Exactly ten glyphs fit at 60px; Gecko's 2px correction leaves room for nine.
    let textarea = TextField::multi_line(style("60px")).with_value("abcdefghij");

    let mut other = HeadlessDocument::new();
    let caret = measure_caret(&mut other, &textarea, 9).expect("caret");
    assert_eq!(caret.top, 2.0);

    let mut gecko = HeadlessDocument::new().with_engine(Engine::Gecko);
    let caret = measure_caret(&mut gecko, &textarea, 9).expect("caret");
    assert_eq!(caret, CaretCoordinate::new(14.0, 3.0));
}

#[test]
fn legacy_style_reader_is_used_when_computed_style_is_missing() {
    let mut doc = HeadlessDocument::new();
    let legacy = TextField::single_line(style("400px"))
        .with_value("hello")
        .legacy_style_only();
    let modern = TextField::single_line(style("400px")).with_value("hello");

    assert_eq!(
        measure_caret(&mut doc, &legacy, 3).expect("caret"),
        measure_caret(&mut doc, &modern, 3).expect("caret"),
    );
}
