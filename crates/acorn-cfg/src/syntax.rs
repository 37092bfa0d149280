use crate::diagnostics::Diagnostic;

/// What a validated line contributes to the document structure.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LineKind {
    /// A `# name` line introducing a section.
    SectionMarker(String),
    /// An unindented line introducing an item.
    ItemHeader(String),
    /// A tab-indented line: a field of the current item.
    Field {
        /// Number of leading tabs (1 = item level).
        depth: usize,
        /// Line content with the leading tabs stripped.
        content: String,
    },
}

/// A line that survived syntax validation.
#[derive(Debug, Clone)]
pub(crate) struct ValidLine {
    /// One-based line number in the source text.
    pub number: usize,
    /// Byte range of the line in the source text.
    pub span: std::ops::Range<usize>,
    /// Structural classification of the line.
    pub kind: LineKind,
}

/// Validate the text line by line, prior to structural parsing.
///
/// Blank lines are ignored. Malformed lines are reported and dropped;
/// the caller decides whether the first error is fatal (strict mode) or
/// merely collected (tolerant mode).
pub(crate) fn validate(text: &str) -> (Vec<ValidLine>, Vec<Diagnostic>) {
    let mut lines = Vec::new();
    let mut diagnostics = Vec::new();

    let mut in_section = false;
    let mut in_item = false;
    let mut offset = 0;

    for (idx, raw) in text.split('\n').enumerate() {
        let number = idx + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let span = offset..offset + line.len();
        offset += raw.len() + 1;

        if line.trim().is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            match rest.strip_prefix(' ') {
                Some(name) if !name.trim().is_empty() => {
                    in_section = true;
                    in_item = false;
                    lines.push(ValidLine {
                        number,
                        span,
                        kind: LineKind::SectionMarker(name.trim().to_string()),
                    });
                }
                _ => diagnostics.push(Diagnostic::error(number, span, "bad section header")),
            }
            continue;
        }

        if let Some(content) = strip_tabs(line) {
            let (depth, content) = content;
            if !in_section {
                diagnostics.push(Diagnostic::error(
                    number,
                    span,
                    "field before the first section marker",
                ));
                continue;
            }
            if !in_item {
                diagnostics.push(Diagnostic::error(number, span, "field outside of an item"));
                continue;
            }
            match check_field(&content) {
                Ok(()) => lines.push(ValidLine {
                    number,
                    span,
                    kind: LineKind::Field { depth, content },
                }),
                Err(message) => diagnostics.push(Diagnostic::error(number, span, message)),
            }
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            diagnostics.push(Diagnostic::error(number, span, "bad item header"));
            continue;
        }

        if !in_section {
            diagnostics.push(Diagnostic::error(
                number,
                span,
                "item before the first section marker",
            ));
            continue;
        }
        in_item = true;
        lines.push(ValidLine {
            number,
            span,
            kind: LineKind::ItemHeader(line.trim_end().to_string()),
        });
    }

    (lines, diagnostics)
}

/// Split off leading tabs; `None` if the line is not tab-indented.
fn strip_tabs(line: &str) -> Option<(usize, String)> {
    let trimmed = line.trim_start_matches('\t');
    let depth = line.len() - trimmed.len();
    if depth == 0 {
        return None;
    }
    Some((depth, trimmed.to_string()))
}

/// Check one field line: either a bare key, or `key: value` with a
/// non-blank key and a non-blank value around the separator.
fn check_field(content: &str) -> Result<(), &'static str> {
    if content.trim().is_empty() {
        return Err("blank field expression");
    }
    let Some((key, value)) = content.split_once(':') else {
        return Ok(());
    };
    if key.trim().is_empty() {
        return Err("blank field key");
    }
    let Some(value) = value.strip_prefix(' ') else {
        if value.is_empty() {
            return Err("blank field value");
        }
        return Err("field separator must be followed by a space");
    };
    if value.trim().is_empty() {
        return Err("blank field value");
    }
    Ok(())
}
