use crate::scalar;
use crate::value::{Document, Fields, Value};

/// Render a [`Document`] to the text configuration format.
///
/// The layout is canonical: a `# name` marker and a blank line per
/// section, each item preceded by a blank line, fields one tab deep,
/// nested maps one extra tab per level.
pub fn encode(doc: &Document) -> String {
    let mut out = String::new();
    for (name, section) in doc.iter() {
        out.push_str("# ");
        out.push_str(name);
        out.push_str("\n\n");
        for (item, fields) in section.iter() {
            out.push('\n');
            out.push_str(item);
            out.push('\n');
            encode_fields(&mut out, fields, 1);
            out.push('\n');
        }
    }
    out
}

fn encode_fields(out: &mut String, fields: &Fields, depth: usize) {
    let tab = "\t".repeat(depth);
    for (key, value) in fields.iter() {
        match value {
            Value::Map(children) => {
                out.push('\n');
                out.push_str(&tab);
                out.push_str(key);
                out.push('\n');
                encode_fields(out, children, depth + 1);
                out.push('\n');
            }
            scalar => {
                out.push_str(&tab);
                out.push_str(key);
                out.push_str(": ");
                out.push_str(&scalar::to_text(scalar));
                out.push('\n');
            }
        }
    }
}
