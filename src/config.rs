use std::path::{Path, PathBuf};

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use serde::{Deserialize, Serialize};

/// Images shipped with the frontend deployment, served from `{public_base_url}/images/`.
pub const BUNDLED_IMAGES: &[&str] = &[
    "image_341x192_1.webp",
    "image_341x192_2.jpg",
    "image_341x192_3.webp",
    "image_341x192_4.webp",
    "image_341x192_5.webp",
    "image_341x192_6.webp",
    "image_341x192_7.webp",
    "image_341x192_8.jpg",
    "image_341x192_9.webp",
    "image_341x192_10.jpg",
    "image_341x192_11.jpg",
    "image_341x192_12.jpg",
    "image_341x192_13.jpg",
    "image_341x192_14.jpg",
    "image_341x192_15.webp",
    "image_341x192_16.jpg",
    "image_341x192_17.jpg",
    "image_341x192_18.jpg",
    "image_341x192_19.jpg",
    "image_341x192_20.jpg",
    "image_341x192_21.jpg",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    database: String,
    images_path: String,
    /// URL prefix the images directory is mounted at, e.g. `/images`
    pub images_url_prefix: String,
    /// Public origin of this deployment, used for the seeded thumbnail URLs
    pub public_base_url: String,
    pub default_video_url: String,
    /// Origins allowed to load images cross-origin
    pub cors_dev_origins: Vec<String>,
    pub seed: SeedConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Placeholder titles are only upserted while the catalog is smaller than this
    pub min_catalog_size: u64,
    pub placeholder_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// File extensions (without the dot) picked up from the images directory
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: "~/.local/share/flixhub/flixhub.db".to_string(),
            images_path: "./images".to_string(),
            images_url_prefix: "/images".to_string(),
            public_base_url: "https://netflix-clone-efk6.onrender.com".to_string(),
            default_video_url: "https://oepxzxnnofhcuvofhzeg.supabase.co/storage/v1/object/public/sample/FD79CB80-0D4D-40A5-852F-CEBEACCE6F6F.MP4".to_string(),
            cors_dev_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            seed: SeedConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        SeedConfig {
            min_catalog_size: 15,
            placeholder_count: 20,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            extensions: vec!["webp".to_string()],
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("flixhub").join("config.toml"))
    }

    /// Load the default config file, falling back to built-in defaults when it doesn't exist
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Write the default config to the default location, if it doesn't exist yet
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_else(|| eyre!("No config directory available"))?;
        if path.exists() {
            log::info!("Config already exists at: {}", path.display());
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).wrap_err(format!(
                "Failed to create config directory: {}",
                parent.display()
            ))?;
        }
        let contents =
            toml::to_string_pretty(&Config::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .wrap_err(format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        PathBuf::from(path)
    }

    pub fn database_path(&self) -> PathBuf {
        self.expand_path(&self.database)
    }

    pub fn images_path(&self) -> PathBuf {
        self.expand_path(&self.images_path)
    }

    /// Mount point for static images, normalized to `/prefix` without a trailing slash.
    /// Empty when images are served from the root.
    pub fn images_mount(&self) -> String {
        let trimmed = self.images_url_prefix.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }

    /// Absolute URLs of the bundled images, in seeding order
    pub fn bundled_image_urls(&self) -> Vec<String> {
        let base = self.public_base_url.trim_end_matches('/');
        BUNDLED_IMAGES
            .iter()
            .map(|file| format!("{}/images/{}", base, file))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            images_path = "/srv/media"
            images_url_prefix = "/static/images/"

            [seed]
            min_catalog_size = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.images_path(), PathBuf::from("/srv/media"));
        assert_eq!(config.images_mount(), "/static/images");
        assert_eq!(config.seed.min_catalog_size, 3);
        assert_eq!(config.seed.placeholder_count, 20);
        assert_eq!(config.sync.extensions, vec!["webp".to_string()]);
        assert_eq!(config.cors_dev_origins.len(), 2);
    }

    #[test]
    fn test_root_mount_is_empty() {
        let config = Config {
            images_url_prefix: "/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.images_mount(), "");
    }

    #[test]
    fn test_bundled_image_urls() {
        let config = Config {
            public_base_url: "https://cdn.example.com/".to_string(),
            ..Config::default()
        };
        let urls = config.bundled_image_urls();

        assert_eq!(urls.len(), 21);
        assert_eq!(urls[0], "https://cdn.example.com/images/image_341x192_1.webp");
        assert_eq!(urls[20], "https://cdn.example.com/images/image_341x192_21.jpg");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml("seed = 12").is_err());
    }
}
