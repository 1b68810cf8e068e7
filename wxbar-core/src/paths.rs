use anyhow::{Result, anyhow};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = ".weather_config.json";
pub const CACHE_FILE_NAME: &str = "weather_cache.json";

/// Where the config and cache files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config: PathBuf,
    pub cache: PathBuf,
}

impl Paths {
    /// Both files sit in `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join(CONFIG_FILE_NAME),
            cache: dir.join(CACHE_FILE_NAME),
        }
    }

    /// `$HOME/.config/.weather_config.json` and `$HOME/.config/weather_cache.json`.
    pub fn default_locations() -> Result<Self> {
        let dirs = BaseDirs::new().ok_or_else(|| anyhow!("Could not determine home directory"))?;

        Ok(Self::in_dir(&dirs.home_dir().join(".config")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_share_the_directory() {
        let paths = Paths::in_dir(Path::new("/home/me/.config"));

        assert_eq!(paths.config, Path::new("/home/me/.config/.weather_config.json"));
        assert_eq!(paths.cache, Path::new("/home/me/.config/weather_cache.json"));
    }

    #[test]
    fn default_locations_live_under_dot_config() {
        if let Ok(paths) = Paths::default_locations() {
            assert!(paths.config.ends_with(".config/.weather_config.json"));
        }
    }
}
