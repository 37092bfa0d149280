use std::path::Path;

pub fn run(file: &Path, frames: u64) -> Result<(), String> {
    let mut env = super::build_environment(file)?;
    for _ in 0..frames {
        env.update().map_err(|e| e.to_string())?;
    }
    print!("{}", acorn_cfg::encode(&env.to_document()));
    Ok(())
}
