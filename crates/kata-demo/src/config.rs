use anyhow::Result;
use kata_sdk::{load_config, EngineConfig};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = r#"# kata engine configuration

# Added to a deferred hook's timeout before it is abandoned
deferred_grace_ms = 5000

# Events whose success path writes additional context to stdout
context_events = ["UserPromptSubmit", "SessionStart"]
"#;

/// Expand `~` in the given path before reading it
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Load engine config from file or use defaults
pub fn load(path: Option<&Path>) -> Result<EngineConfig> {
    let expanded = path.map(expand_path);
    load_config(expanded.as_deref())
}

/// Write [`DEFAULT_CONFIG`] to `path`, refusing to overwrite
pub fn run_init(path: &Path) -> Result<()> {
    let path = expand_path(path);
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}
