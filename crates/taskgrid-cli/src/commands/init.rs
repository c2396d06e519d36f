use std::path::Path;

use taskgrid_core::TaskgridConfig;

pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let config = TaskgridConfig::scaffold();
    std::fs::write(path, config.to_toml_string()?)?;
    println!("✓ Generated {}", path.display());
    println!("  set VM1_IP..VM4_IP or edit [[vms]] addresses before `taskgrid run`");

    Ok(())
}
