//! End-to-end: what a user sees with the layer applied matches the reformatted text.

use fmt_layer::{FormattingStyle, LayerConfig, ReformatDetector, expand_tabs};
use fmt_layer_editor::{
    ApplyOutcome, EditorId, HeadlessEditor, LayerEvent, VisualFormattingLayer,
};
use pretty_assertions::assert_eq;

/// Re-indents every line by brace depth.
fn reindent(text: &str, style: &FormattingStyle) -> Option<String> {
    let mut depth = 0usize;
    let mut out = Vec::new();
    for line in text.split('\n') {
        let trimmed = line.trim_start_matches([' ', '\t']);
        if trimmed.starts_with('}') {
            depth = depth.saturating_sub(1);
        }
        if trimmed.is_empty() {
            out.push(String::new());
        } else {
            out.push(format!("{}{}", style.indent(depth), trimmed));
        }
        if trimmed.ends_with('{') {
            depth += 1;
        }
    }
    Some(out.join("\n"))
}

fn assert_renders_formatted(original: &str, formatter: fn(&str, &FormattingStyle) -> Option<String>) {
    let formatted = formatter(original, &FormattingStyle::default()).unwrap();
    let mut layer =
        VisualFormattingLayer::new(ReformatDetector::new(formatter), LayerConfig::default());
    let mut editor = HeadlessEditor::new(EditorId(1), original);

    let outcome = layer.handle_event(&mut editor, LayerEvent::EditorCreated);
    assert!(matches!(outcome, ApplyOutcome::Applied(_)));
    assert_eq!(editor.render(), expand_tabs(&formatted, 4));
    assert_eq!(editor.text(), Some(original));
}

#[test]
fn test_reindent_with_wider_and_tabbed_lines() {
    assert_renders_formatted(
        "fn main() {\n\tlet x = 1;\n  if x {\n        y();\n  }\n}",
        reindent,
    );
}

#[test]
fn test_reindent_folds_surplus_indentation() {
    assert_renders_formatted(
        "fn main() {\n            a();\n      b();\n}",
        reindent,
    );
}

#[test]
fn test_tab_wider_than_replacement() {
    fn two_space_indent(text: &str, _: &FormattingStyle) -> Option<String> {
        Some(text.replace('\t', "  "))
    }
    assert_renders_formatted("\tx\n\ty", two_space_indent);
}

#[test]
fn test_inserted_blank_line_becomes_block_inlay() {
    fn separate_items(text: &str, _: &FormattingStyle) -> Option<String> {
        Some(text.replace("}\nfn", "}\n\nfn"))
    }
    assert_renders_formatted("fn a() {}\nfn b() {}", separate_items);
}

#[test]
fn test_removed_blank_lines_are_folded() {
    fn squash_blank_lines(text: &str, _: &FormattingStyle) -> Option<String> {
        Some(text.replace("\n\n\n", "\n\n"))
    }
    assert_renders_formatted("a\n\n\nb", squash_blank_lines);
}

#[test]
fn test_spacing_inside_a_line() {
    fn collapse_spaces(text: &str, _: &FormattingStyle) -> Option<String> {
        Some(
            text.replace("(  ", "(")
                .replace(",b", ", b")
                .replace(",  c", ", c"),
        )
    }
    assert_renders_formatted("call(  a,b,  c)", collapse_spaces);
}
