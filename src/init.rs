//! Project initialization for ascension
//!
//! `ascension init` creates the `.ascension/` directory with a commented
//! config file and an empty state file.

use crate::config::ASCENSION_DIR;
use crate::persist;
use crate::store::GoalStore;
use colored::Colorize;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG_TOML: &str = r#"# ascension configuration

[timeline]
# Visible hours of the day view
hours_start = 6
hours_end = 24

[agenda]
days = 14
hide_daily = false

[goals]
default_priority = "P2"
"#;

/// Initialize ascension in `dir`
pub fn init_project(dir: &Path) -> Result<(), String> {
    println!("\n{}", "Initializing ascension...".cyan().bold());
    println!("   Directory: {}\n", dir.display());

    let ascension_dir = dir.join(ASCENSION_DIR);
    create_dir_if_missing(&ascension_dir)?;

    let config_path = ascension_dir.join("config.toml");
    write_file_if_missing(&config_path, DEFAULT_CONFIG_TOML, ".ascension/config.toml")?;

    let state_path = ascension_dir.join("state.json");
    if state_path.exists() {
        println!("   {} .ascension/state.json (already exists)", "Skipping".yellow());
    } else {
        persist::save(&state_path, &GoalStore::new())
            .map_err(|e| format!("Could not write state.json: {}", e))?;
        println!("   {} .ascension/state.json", "Creating".green());
    }

    println!("\n{}", "ascension initialized!".green().bold());
    println!("\nNext steps:");
    println!("  1. Run {} to add your first goal", "ascension add \"...\"".cyan());
    println!("  2. Run {} to see what to work on", "ascension queue".cyan());
    println!();

    Ok(())
}

fn create_dir_if_missing(path: &Path) -> Result<(), String> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Could not create {}: {}", path.display(), e))?;
        println!("   {} {}", "Creating".green(), path.display());
    }
    Ok(())
}

fn write_file_if_missing(path: &Path, content: &str, display_name: &str) -> Result<(), String> {
    if path.exists() {
        println!("   {} {} (already exists)", "Skipping".yellow(), display_name);
    } else {
        fs::write(path, content)
            .map_err(|e| format!("Could not write {}: {}", display_name, e))?;
        println!("   {} {}", "Creating".green(), display_name);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_files_once() {
        let dir = TempDir::new().unwrap();
        init_project(dir.path()).unwrap();

        let config_path = dir.path().join(".ascension/config.toml");
        assert_eq!(Config::load_from(&config_path), Config::default());

        let state_path = dir.path().join(".ascension/state.json");
        let mut store = persist::load(&state_path).unwrap();
        assert!(store.goals.is_empty());

        // A second run leaves existing data alone
        store.add_goal("Keep me", None).unwrap();
        persist::save(&state_path, &store).unwrap();
        init_project(dir.path()).unwrap();
        assert_eq!(persist::load(&state_path).unwrap().goals.len(), 1);
    }
}
