//! Formatting preview example
//!
//! Shows a badly indented buffer as if it were reformatted, without changing its text.

use fmt_layer::{FormattingStyle, LayerConfig, ReformatDetector};
use fmt_layer_editor::{EditorId, HeadlessEditor, LayerEvent, LayerTag, VisualFormattingLayer};

fn reindent(text: &str, style: &FormattingStyle) -> Option<String> {
    let mut depth = 0usize;
    let mut lines = Vec::new();
    for line in text.split('\n') {
        let trimmed = line.trim_start_matches([' ', '\t']);
        if trimmed.starts_with('}') {
            depth = depth.saturating_sub(1);
        }
        lines.push(if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}{}", style.indent(depth), trimmed)
        });
        if trimmed.ends_with('{') {
            depth += 1;
        }
    }
    Some(lines.join("\n"))
}

fn main() {
    let source = "fn main() {\n\tlet x = 1;\n  if x > 0 {\n              println!(\"{x}\");\n  }\n}";

    let mut layer = VisualFormattingLayer::new(ReformatDetector::new(reindent), LayerConfig::default());
    let mut editor = HeadlessEditor::new(EditorId(1), source);

    println!("=== stored text ===");
    println!("{}\n", editor.render());

    layer.handle_event(&mut editor, LayerEvent::EditorCreated);

    println!("=== displayed with the formatting layer ===");
    println!("{}\n", editor.render());

    println!("=== elements ===");
    for element in editor.elements_owned_by(LayerTag::VISUAL_FORMATTING) {
        println!("  {element:?}");
    }

    layer.handle_event(&mut editor, LayerEvent::Toggled(false));
    println!("\n=== layer switched off ===");
    println!("{}", editor.render());
}
