use fmt_layer::{
    LineSet, Mismatch, VisualElement, count_columns_within_line, elements_for_mismatches,
    formatting_elements, whitespace_mismatches,
};
use pretty_assertions::assert_eq;

const TAB: usize = 4;

fn elements(original: &str, formatted: &str) -> Vec<VisualElement> {
    let mismatches = whitespace_mismatches(original, formatted).unwrap();
    elements_for_mismatches(&LineSet::from_text(original), formatted, &mismatches, TAB)
}

fn preamble(lines: usize) -> String {
    "xx\n".repeat(lines)
}

#[test]
fn test_scenario_a_tab_as_wide_as_replacement_is_a_no_op() {
    // The tab at column 0 already covers four columns.
    assert_eq!(elements("\tfoo", "    foo"), vec![]);
}

#[test]
fn test_scenario_a_tab_wider_than_replacement_is_replaced() {
    assert_eq!(
        elements("\tfoo", "  foo"),
        vec![
            VisualElement::Folding {
                offset: 0,
                length: 1
            },
            VisualElement::InlineInlay {
                offset: 1,
                columns: 2
            },
        ]
    );
}

#[test]
fn test_scenario_b_wider_spaces_add_inlay() {
    assert_eq!(
        elements("  x", "    x"),
        vec![VisualElement::InlineInlay {
            offset: 2,
            columns: 2
        }]
    );
}

#[test]
fn test_scenario_c_narrower_spaces_fold_surplus() {
    assert_eq!(
        elements("    x", "  x"),
        vec![VisualElement::Folding {
            offset: 0,
            length: 2
        }]
    );
}

#[test]
fn test_scenario_d_single_line_split_yields_nothing() {
    let original = format!("{}a b", preamble(10));
    let formatted = format!("{}a\n\nb", preamble(10));

    let mismatches = whitespace_mismatches(&original, &formatted).unwrap();
    assert_eq!(mismatches, vec![Mismatch::new(31..32, 31..33)]);

    let original_lines = LineSet::from_text(&original);
    let formatted_lines = LineSet::from_text(&formatted);
    assert_eq!(original_lines.line_of_offset(31), 10);
    assert_eq!(formatted_lines.line_of_offset(33), 12);

    assert_eq!(
        formatting_elements(&original_lines, &formatted_lines, &mismatches[0], TAB),
        vec![]
    );
}

#[test]
fn test_scenario_d_does_not_stop_other_mismatches() {
    let original = "a b\n  c";
    let formatted = "a\n\nb\n    c";
    assert_eq!(
        elements(original, formatted),
        vec![VisualElement::InlineInlay {
            offset: 6,
            columns: 2
        }]
    );
}

#[test]
fn test_scenario_e_three_lines_merge_into_one() {
    let original = format!("{}x =  \n   \n    y", preamble(5));
    let formatted = format!("{}x = y", preamble(5));

    let mismatches = whitespace_mismatches(&original, &formatted).unwrap();
    assert_eq!(mismatches, vec![Mismatch::new(18..29, 18..19)]);

    let lines = LineSet::from_text(&original);
    assert_eq!(lines.line_of_offset(18), 5);
    assert_eq!(lines.line_of_offset(29), 7);

    assert_eq!(
        elements(&original, &formatted),
        vec![
            VisualElement::Folding {
                offset: 18,
                length: 11
            },
            VisualElement::InlineInlay {
                offset: 29,
                columns: 1
            },
        ]
    );
}

#[test]
fn test_column_conservation_on_single_line_pairs() {
    let cases = [
        ("", " "),
        (" ", ""),
        ("  ", "    "),
        ("    ", "  "),
        ("\t", "  "),
        ("\t", "        "),
        (" \t", " "),
        ("\t\t", "\t"),
        ("  \t", "    "),
    ];

    for (original_ws, replacement_ws) in cases {
        let original = format!("a{original_ws}b");
        let formatted = format!("a{replacement_ws}b");
        let original_lines = LineSet::from_text(&original);
        let formatted_lines = LineSet::from_text(&formatted);

        let span_end = 1 + original_ws.chars().count();
        let original_columns =
            count_columns_within_line(&original_lines, 0, 1, span_end, TAB).columns;
        let replacement_columns = count_columns_within_line(
            &formatted_lines,
            0,
            1,
            1 + replacement_ws.chars().count(),
            TAB,
        )
        .columns;

        let produced = elements(&original, &formatted);

        let mut retained = original_columns;
        let mut added = 0;
        for element in &produced {
            match *element {
                VisualElement::Folding { offset, length } => {
                    let whole_span = offset == 1 && length == span_end - 1;
                    retained -= if whole_span { original_columns } else { length };
                }
                VisualElement::InlineInlay { columns, .. } => added += columns,
                VisualElement::BlockInlay { .. } => panic!("unexpected block inlay"),
            }
        }

        assert_eq!(
            retained + added,
            replacement_columns,
            "{original_ws:?} -> {replacement_ws:?}: {produced:?}"
        );
        if original_columns == replacement_columns {
            assert_eq!(produced, vec![]);
        }
    }
}

#[test]
fn test_tab_safety_folds_entire_span() {
    let produced = elements("a \t b", "a b");
    assert_eq!(
        produced,
        vec![
            VisualElement::Folding {
                offset: 1,
                length: 3
            },
            VisualElement::InlineInlay {
                offset: 4,
                columns: 1
            },
        ]
    );
}

#[test]
fn test_offsets_are_monotonic_across_a_document() {
    let original = "fn main()  {\nlet x=1;\n\n\n\tif x {\n  call( a,\n b );\n}\n}\n";
    let formatted = "fn main() {\n    let x=1;\n\n    if x {\n        call(a,\n            b);\n    }\n}\n";

    let produced = elements(original, formatted);
    assert!(!produced.is_empty());
    assert!(
        produced.windows(2).all(|w| w[0].offset() <= w[1].offset()),
        "{produced:?}"
    );
    assert!(produced.iter().all(|e| !e.is_empty()));
}
