use std::path::Path;

use acorn_core::ModelEntry;

pub fn run(file: &Path, strict: bool) -> Result<(), String> {
    if strict {
        let source = super::read_source(file)?;
        acorn_cfg::decode(&source).map_err(|e| e.to_string())?;
    }

    let env = super::build_environment(file)?;

    let root = env.root();
    let entities = env
        .model()
        .filter(|(_, entry)| matches!(entry, ModelEntry::Entity(id) if *id != root))
        .count();
    let groups = env
        .model()
        .filter(|(_, entry)| matches!(entry, ModelEntry::Group(_)))
        .count();

    println!("  All checks passed for '{}'.", env.name());
    println!("  {entities} entities, {groups} groups");
    Ok(())
}
