//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["parley.toml", ".parley.toml"];
const ENV_PREFIX: &str = "PARLEY_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `PARLEY_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./parley.toml` or `./.parley.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/parley/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path, true).extract().map_err(Box::new)
    }

    /// Defaults plus environment, skipping every file (for --no-config)
    pub fn load_env_only() -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(None, false).extract().map_err(Box::new)
    }

    fn figment(config_path: Option<&Path>, with_files: bool) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if with_files {
            if let Some(global_path) = Self::global_config_path()
                && global_path.exists()
            {
                figment = figment.merge(Toml::file(&global_path));
            }

            if let Some(path) = Self::project_config_path() {
                figment = figment.merge(Toml::file(&path));
            }

            if let Some(path) = config_path {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("parley").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(config_path: Option<&Path>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] Environment: {}*", ENV_PREFIX);

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./parley.toml or ./.parley.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn load(path: Option<&Path>) -> figment::Result<FileConfig> {
        ConfigLoader::load(path).map_err(|e| *e)
    }

    #[test]
    fn test_global_config_path_names_app() {
        if let Some(path) = ConfigLoader::global_config_path() {
            assert!(path.ends_with("parley/config.toml"));
        }
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "parley.toml",
                r#"
                [api]
                model = "from-project"
                max_tokens = 100
                "#,
            )?;
            let config = load(None)?;
            assert_eq!(config.api.model, "from-project");
            assert_eq!(config.api.max_tokens, 100);
            assert_eq!(config.api.temperature, 0.7);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file(".parley.toml", "[api]\nmodel = \"project\"\n")?;
            jail.create_file("custom.toml", "[api]\nmodel = \"explicit\"\n")?;
            let config = load(Some(Path::new("custom.toml")))?;
            assert_eq!(config.api.model, "explicit");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file("parley.toml", "[api]\nmodel = \"project\"\n")?;
            jail.set_env("PARLEY_API__MODEL", "from-env");
            jail.set_env("PARLEY_API__API_KEY", "sk-env");
            jail.set_env("PARLEY_STORAGE__DEBOUNCE_MS", "100");
            let config = load(None)?;
            assert_eq!(config.api.model, "from-env");
            assert_eq!(config.api.api_key.as_deref(), Some("sk-env"));
            assert_eq!(config.storage.debounce_ms, 100);
            Ok(())
        });
    }

    #[test]
    fn test_env_only_skips_files() {
        Jail::expect_with(|jail| {
            jail.create_file("parley.toml", "[api]\nmodel = \"project\"\n")?;
            jail.set_env("PARLEY_OFFLINE__SEED", "9");
            let config = ConfigLoader::load_env_only().map_err(|e| *e)?;
            assert_eq!(config.api.model, "deepseek-chat");
            assert_eq!(config.offline.seed, Some(9));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("parley.toml", "[api\nmodel = ")?;
            assert!(load(None).is_err());
            Ok(())
        });
    }
}
