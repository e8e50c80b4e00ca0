//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level file names, checked in this order.
const PROJECT_FILES: [&str; 2] = ["council.toml", ".council.toml"];

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "COUNCIL_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `COUNCIL_*` environment variables (`__` separates sections,
    ///    e.g. `COUNCIL_COUNCIL__MAX_RETRIES=5`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./council.toml` or `./.council.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/council/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    /// The merged provider chain, exposed for inspection.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(&global_path));
            }
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("council").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Describe the config file locations (for `--show-config`)
    pub fn describe_sources(config_path: Option<&Path>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [ENV  ] {}*", ENV_PREFIX));

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            lines.push(format!("  [{}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push("  [     ] Project: ./council.toml or ./.council.toml".to_string()),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", mark, path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.agents.is_empty());
        assert_eq!(config.council.max_retries, 3);
    }

    #[test]
    fn test_global_config_path() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.ends_with("council/config.toml"));
        }
    }

    #[test]
    fn test_project_file_is_loaded() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "council.toml",
                r#"
[council]
name = "from-project"

[[agents]]
name = "a"
command = "cat"
"#,
            )?;

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.council.name, "from-project");
            assert_eq!(config.agents[0].command, "cat");
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file("council.toml", "[council]\nname = \"project\"\nmax_retries = 7")?;
            jail.create_file("custom.toml", "[council]\nname = \"explicit\"")?;

            let config = ConfigLoader::load(Some(Path::new("custom.toml"))).map_err(|e| *e)?;
            assert_eq!(config.council.name, "explicit");
            assert_eq!(config.council.max_retries, 7);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file(".council.toml", "[council]\nmax_retries = 1")?;
            jail.set_env("COUNCIL_COUNCIL__MAX_RETRIES", "5");
            jail.set_env("COUNCIL_OUTPUT__COLOR", "false");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert_eq!(config.council.max_retries, 5);
            assert!(!config.output.color);
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("council.toml", "[council\nname = ")?;
            assert!(ConfigLoader::load(None).is_err());
            Ok(())
        });
    }
}
