//! The acorn text configuration format.
//!
//! A document is an ordered section → item → field mapping rendered in
//! a human-editable indented text form. This crate is the codec only:
//! it accepts raw text and produces a [`Document`], and the reverse.
//! File paths and search order are the loader's responsibility.
//!
//! Decoding runs line-by-line syntax validation first. In tolerant
//! mode malformed lines are reported and dropped; in strict mode the
//! first violation fails the parse.

/// Structural assembly of validated lines into a document.
mod decode;
/// Syntax diagnostics and their terminal rendering.
pub mod diagnostics;
/// Rendering documents back to text.
mod encode;
/// Error types for strict decoding.
pub mod error;
/// The scalar value grammar.
pub mod scalar;
/// Line-level syntax validation.
mod syntax;
/// Values, fields, sections, and documents.
pub mod value;

/// Re-export of [`diagnostics::Diagnostic`] and [`diagnostics::Severity`].
pub use diagnostics::{Diagnostic, Severity};
/// Re-exports of [`error::CfgError`] and [`error::CfgResult`].
pub use error::{CfgError, CfgResult};
/// Re-export of [`encode::encode`].
pub use encode::encode;
/// Re-exports of the document data model.
pub use value::{Document, Fields, Section, Value};

use diagnostics::Severity as S;

/// Decode text strictly: the first syntax violation fails the parse.
pub fn decode(text: &str) -> CfgResult<Document> {
    let (lines, diags) = syntax::validate(text);
    if let Some(d) = diags.iter().find(|d| d.severity == S::Error) {
        return Err(CfgError::Syntax {
            line: d.line,
            message: d.message.clone(),
        });
    }
    let (doc, diags) = decode::parse(&lines);
    if let Some(d) = diags.iter().find(|d| d.severity == S::Error) {
        return Err(CfgError::Syntax {
            line: d.line,
            message: d.message.clone(),
        });
    }
    Ok(doc)
}

/// Decode text tolerantly: malformed lines are reported and dropped,
/// and parsing continues with whatever remains.
pub fn decode_tolerant(text: &str) -> (Document, Vec<Diagnostic>) {
    let (lines, mut diagnostics) = syntax::validate(text);
    let (doc, parse_diags) = decode::parse(&lines);
    diagnostics.extend(parse_diags);
    diagnostics.sort_by_key(|d| d.line);
    (doc, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = "\
# groups

soldiers

# layers

hud
\tclass: Layer
\tsize: 100, 40

# populate

grunt
\tclass: Sprite
\tgroup: soldiers
\tposition: 10, 20
";

    #[test]
    fn decode_full_scene() {
        let doc = decode(SCENE).unwrap();
        assert_eq!(doc.len(), 3);
        let grunt = doc.get("populate").unwrap().get("grunt").unwrap();
        assert_eq!(
            grunt.get("position"),
            Some(&Value::List(vec![Value::Int(10), Value::Int(20)]))
        );
    }

    #[test]
    fn strict_mode_fails_on_first_violation() {
        let text = "# layers\nhud\n\tsize: \n";
        let err = decode(text).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn tolerant_mode_drops_and_reports() {
        let text = "# layers\nhud\n\tsize: \n\tvisible: true\n";
        let (doc, diags) = decode_tolerant(text);
        assert_eq!(diags.len(), 1);
        let hud = doc.get("layers").unwrap().get("hud").unwrap();
        assert!(hud.get("size").is_none());
        assert_eq!(hud.get("visible"), Some(&Value::Bool(true)));
    }

    #[test]
    fn comma_without_separator_space_stays_a_string() {
        let (doc, diags) = decode_tolerant("# data\n\nitem\n\tkey: a,b\n");
        assert!(diags.is_empty());
        let item = doc.get("data").unwrap().get("item").unwrap();
        assert_eq!(item.get("key"), Some(&Value::Str("a,b".to_string())));

        let strict = decode("# data\n\nitem\n\tkey: a,b\n").unwrap();
        assert_eq!(strict, doc);
    }

    #[test]
    fn round_trip_representative_document() {
        // one of each: integer, float, comma-bearing quoted string,
        // multi-element list, singleton list
        let mut fields = Fields::new();
        fields.insert("count", Value::Int(12));
        fields.insert("speed", Value::Float(1.5));
        fields.insert("label", Value::Str("ready, set, go".to_string()));
        fields.insert(
            "keys",
            Value::List(vec![
                Value::Str("up".to_string()),
                Value::Str("down".to_string()),
                Value::Int(3),
            ]),
        );
        fields.insert("tags", Value::List(vec![Value::Str("solo".to_string())]));

        let mut section = Section::new();
        section.insert("widget", fields);
        let mut doc = Document::new();
        doc.insert("data", section);

        assert_eq!(decode(&encode(&doc)).unwrap(), doc);
    }

    #[test]
    fn numeric_looking_bare_string_is_lossy() {
        // documented lossy edge: a numeric-looking bare string encoded
        // and re-decoded comes back as a number
        let mut fields = Fields::new();
        fields.insert("version", Value::Str("3".to_string()));
        let mut section = Section::new();
        section.insert("meta", fields);
        let mut doc = Document::new();
        doc.insert("data", section);

        let back = decode(&encode(&doc)).unwrap();
        let meta = back.get("data").unwrap().get("meta").unwrap();
        assert_eq!(meta.get("version"), Some(&Value::Int(3)));
    }
}
