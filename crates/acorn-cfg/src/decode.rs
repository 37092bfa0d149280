use crate::diagnostics::Diagnostic;
use crate::scalar;
use crate::syntax::{LineKind, ValidLine};
use crate::value::{Document, Fields, Section};

/// One field line flattened for recursive parsing.
struct FieldLine<'a> {
    number: usize,
    span: std::ops::Range<usize>,
    depth: usize,
    content: &'a str,
}

/// Assemble a [`Document`] from validated lines.
///
/// Structural problems the line validator cannot see (over-indented
/// fields) are reported here; the offending lines are dropped.
pub(crate) fn parse(lines: &[ValidLine]) -> (Document, Vec<Diagnostic>) {
    let mut doc = Document::new();
    let mut diagnostics = Vec::new();

    let mut section_name: Option<String> = None;
    let mut section = Section::new();
    let mut item_name: Option<String> = None;
    let mut item_lines: Vec<FieldLine<'_>> = Vec::new();

    let flush_item =
        |section: &mut Section,
         name: &mut Option<String>,
         lines: &mut Vec<FieldLine<'_>>,
         diagnostics: &mut Vec<Diagnostic>| {
            if let Some(name) = name.take() {
                let (fields, consumed) = parse_fields(lines, 1, diagnostics);
                debug_assert_eq!(consumed, lines.len());
                section.insert(name, fields);
            }
            lines.clear();
        };

    for line in lines {
        match &line.kind {
            LineKind::SectionMarker(name) => {
                flush_item(
                    &mut section,
                    &mut item_name,
                    &mut item_lines,
                    &mut diagnostics,
                );
                if let Some(prev) = section_name.take() {
                    doc.insert(prev, std::mem::take(&mut section));
                }
                section_name = Some(name.clone());
            }
            LineKind::ItemHeader(name) => {
                flush_item(
                    &mut section,
                    &mut item_name,
                    &mut item_lines,
                    &mut diagnostics,
                );
                item_name = Some(name.clone());
            }
            LineKind::Field { depth, content } => {
                item_lines.push(FieldLine {
                    number: line.number,
                    span: line.span.clone(),
                    depth: *depth,
                    content,
                });
            }
        }
    }
    flush_item(
        &mut section,
        &mut item_name,
        &mut item_lines,
        &mut diagnostics,
    );
    if let Some(prev) = section_name.take() {
        doc.insert(prev, section);
    }

    (doc, diagnostics)
}

/// Parse a run of field lines at the given depth, recursing into
/// nested maps. Returns the fields and the number of lines consumed.
fn parse_fields(
    lines: &[FieldLine<'_>],
    depth: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> (Fields, usize) {
    let mut fields = Fields::new();
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        if line.depth < depth {
            break;
        }
        if line.depth > depth {
            diagnostics.push(Diagnostic::error(
                line.number,
                line.span.clone(),
                "over-indented field",
            ));
            i += 1;
            continue;
        }

        match line.content.split_once(':') {
            Some((key, value)) => {
                // the validator guarantees one space after the separator
                let value = value.strip_prefix(' ').unwrap_or(value);
                fields.insert(key.trim(), scalar::to_value(value));
                i += 1;
            }
            None => {
                let key = line.content.trim();
                let deeper = lines.get(i + 1).is_some_and(|next| next.depth > depth);
                if deeper {
                    let (nested, consumed) =
                        parse_fields(&lines[i + 1..], depth + 1, diagnostics);
                    fields.insert(key, crate::Value::Map(nested));
                    i += 1 + consumed;
                } else {
                    // bare key: implicit boolean true
                    fields.insert(key, true);
                    i += 1;
                }
            }
        }
    }

    (fields, i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::validate;
    use crate::Value;

    fn parse_text(text: &str) -> (Document, Vec<Diagnostic>) {
        let (lines, diags) = validate(text);
        assert!(diags.is_empty(), "unexpected syntax diagnostics: {diags:?}");
        parse(&lines)
    }

    #[test]
    fn parses_sections_items_and_fields() {
        let text = "# layers\n\nhud\n\tclass: Layer\n\tsize: 100, 40\n\n# groups\n\nsquad\n";
        let (doc, diags) = parse_text(text);
        assert!(diags.is_empty());

        let hud = doc.get("layers").unwrap().get("hud").unwrap();
        assert_eq!(hud.get("class"), Some(&Value::Str("Layer".to_string())));
        assert_eq!(
            hud.get("size"),
            Some(&Value::List(vec![Value::Int(100), Value::Int(40)]))
        );
        assert!(doc.get("groups").unwrap().get("squad").unwrap().is_empty());
    }

    #[test]
    fn bare_key_is_boolean_true() {
        let (doc, _) = parse_text("# layers\n\nhud\n\tvisible\n");
        let hud = doc.get("layers").unwrap().get("hud").unwrap();
        assert_eq!(hud.get("visible"), Some(&Value::Bool(true)));
    }

    #[test]
    fn nested_maps_parse_recursively() {
        let text = "# data\n\nstyle\n\tborder\n\t\twidth: 2\n\t\tcolor: red\n\tpadding: 4\n";
        let (doc, diags) = parse_text(text);
        assert!(diags.is_empty());

        let style = doc.get("data").unwrap().get("style").unwrap();
        let Some(Value::Map(border)) = style.get("border") else {
            panic!("border should be a nested map");
        };
        assert_eq!(border.get("width"), Some(&Value::Int(2)));
        assert_eq!(border.get("color"), Some(&Value::Str("red".to_string())));
        assert_eq!(style.get("padding"), Some(&Value::Int(4)));
    }

    #[test]
    fn doubly_nested_maps() {
        let text = "# data\n\ntheme\n\thud\n\t\tborder\n\t\t\twidth: 1\n\t\tcolor: blue\n";
        let (doc, diags) = parse_text(text);
        assert!(diags.is_empty());

        let theme = doc.get("data").unwrap().get("theme").unwrap();
        let Some(Value::Map(hud)) = theme.get("hud") else {
            panic!("hud should be a map");
        };
        let Some(Value::Map(border)) = hud.get("border") else {
            panic!("border should be a map");
        };
        assert_eq!(border.get("width"), Some(&Value::Int(1)));
        assert_eq!(hud.get("color"), Some(&Value::Str("blue".to_string())));
    }

    #[test]
    fn over_indented_field_reported_and_dropped() {
        let text = "# layers\n\nhud\n\t\tvisible: true\n\tsize: 4, 4\n";
        let (lines, diags) = validate(text);
        assert!(diags.is_empty());
        let (doc, diags) = parse(&lines);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "over-indented field");
        let hud = doc.get("layers").unwrap().get("hud").unwrap();
        assert!(hud.get("visible").is_none());
        assert!(hud.get("size").is_some());
    }

    #[test]
    fn quoted_value_keeps_commas() {
        let (doc, _) = parse_text("# data\n\npalette\n\tcolors: \"red, green, blue\"\n");
        let palette = doc.get("data").unwrap().get("palette").unwrap();
        assert_eq!(
            palette.get("colors"),
            Some(&Value::Str("red, green, blue".to_string()))
        );
    }
}
