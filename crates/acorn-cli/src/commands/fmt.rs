use std::path::Path;

pub fn run(file: &Path, json: bool, output: Option<&Path>) -> Result<(), String> {
    let doc = super::load_document(file)?;

    let text = if json {
        let mut text = serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?;
        text.push('\n');
        text
    } else {
        acorn_cfg::encode(&doc)
    };

    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .map_err(|e| format!("cannot write {}: {e}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
