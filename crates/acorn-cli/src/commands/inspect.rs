use std::path::Path;

use colored::Colorize;

use acorn_core::{Environment, ModelEntry, NodeKind};

pub fn run(file: &Path, name: Option<&str>) -> Result<(), String> {
    let env = super::build_environment(file)?;
    match name {
        Some(name) => detail(&env, name),
        None => overview(&env),
    }
}

fn overview(env: &Environment) -> Result<(), String> {
    for (name, entry) in env.model() {
        match entry {
            ModelEntry::Entity(id) => {
                let Ok(entity) = env.entity(*id) else {
                    continue;
                };
                let kind = match entity.kind() {
                    NodeKind::Layer { .. } => "layer",
                    NodeKind::Sprite { .. } => "sprite",
                };
                println!(
                    "  {} [{}] {}",
                    name.bold(),
                    kind.dimmed(),
                    entity.class_name()
                );
            }
            ModelEntry::Group(id) => {
                let members = env.group(*id).map(|g| g.members().len()).unwrap_or(0);
                println!(
                    "  {} [{}] {} member{}",
                    name.bold(),
                    "group".dimmed(),
                    members,
                    if members == 1 { "" } else { "s" }
                );
            }
            ModelEntry::Data(_) => {
                println!("  {} [{}]", name.bold(), "data".dimmed());
            }
        }
    }
    Ok(())
}

fn detail(env: &Environment, name: &str) -> Result<(), String> {
    let entry = env
        .find(name)
        .ok_or_else(|| format!("name not found: \"{name}\""))?;

    match entry {
        ModelEntry::Entity(id) => {
            let entity = env.entity(*id).map_err(|e| e.to_string())?;
            println!("  {} [{}]", entity.name().bold(), entity.class_name().dimmed());
            println!();
            let (x, y) = entity.position();
            println!("  position: {x}, {y}");
            let (w, h) = entity.size();
            println!("  size:     {w}, {h}");
            println!("  visible:  {}", entity.visible());
            if !entity.changes().is_empty() {
                println!();
                for (key, value) in entity.changes().iter() {
                    println!("  {key}: {value}");
                }
            }
        }
        ModelEntry::Group(id) => {
            let group = env.group(*id).map_err(|e| e.to_string())?;
            println!("  {} [{}]", group.name().bold(), "group".dimmed());
            for member in group.members() {
                if let Ok(entity) = env.entity(*member) {
                    println!("    {}", entity.name());
                }
            }
        }
        ModelEntry::Data(value) => {
            println!("  {} [{}]", name.bold(), "data".dimmed());
            println!("  {}", value.to_value(env));
        }
    }
    Ok(())
}
