use crate::core::config::{validate_config_key, Config};
use crate::core::Repository;

/// `config <key>` prints the effective value; `config <key> <value>` stores
/// it in the repository config.
pub fn run(repo: &Repository, key: &str, value: Option<&str>) -> anyhow::Result<()> {
    validate_config_key(key)?;

    match value {
        Some(value) => {
            let path = repo.config_path();
            let mut config = Config::load_from_file(&path);
            config.set(key, value)?;
            config.save_to_file(&path)?;
            repo.audit("config", &format!("{}={}", key, value))?;
        }
        None => {
            if let Some(value) = repo.config.get(key) {
                println!("{}", value);
            }
        }
    }
    Ok(())
}
