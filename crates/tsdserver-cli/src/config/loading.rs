use crate::config::TsdConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml, Yaml},
};
use std::path::{Path, PathBuf};

/// Options files looked for when none is given, in order.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["tsdserver.json", "tsdserver.toml", "tsdserver.yaml"];

const ENV_PREFIX: &str = "TSDSERVER_";

/// A merged configuration and where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TsdConfig,
    /// Options file that was read, if any
    pub path: Option<PathBuf>,
    /// Directory relative paths in the configuration are resolved against
    pub base_dir: PathBuf,
}

/// First options file in `dir`, by [`CONFIG_FILE_NAMES`] order.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// `MODULE_RESOLVER__TSCONFIG` -> `moduleResolver.tsconfig`
pub fn env_key_to_field(key: &str) -> String {
    key.split("__")
        .map(|segment| {
            let mut field = String::with_capacity(segment.len());
            let mut upper = false;
            for c in segment.chars() {
                if c == '_' {
                    upper = !field.is_empty();
                } else if upper {
                    field.push(c.to_ascii_uppercase());
                    upper = false;
                } else {
                    field.push(c.to_ascii_lowercase());
                }
            }
            field
        })
        .collect::<Vec<_>>()
        .join(".")
}

impl TsdConfig {
    /// Load configuration from defaults, the options file and the environment.
    ///
    /// `config_path` is resolved against `cwd`. When it is `None` the file is
    /// discovered in `cwd`; finding none is not an error.
    pub fn load(config_path: Option<&Path>, cwd: &Path) -> Result<LoadedConfig> {
        let path = match config_path {
            Some(path) => {
                let path = cwd.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => discover(cwd),
        };

        let mut figment = Figment::new().merge(Serialized::defaults(TsdConfig::default()));

        if let Some(path) = &path {
            tracing::debug!("Loading options from {}", path.display());
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(path)),
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                _ => return Err(ConfigError::UnsupportedFormat(path.clone()).into()),
            };
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .lowercase(false)
                .map(|key| env_key_to_field(key.as_str()).into()),
        );

        let config: TsdConfig = figment.extract().map_err(|e| ConfigError::Invalid {
            source_name: path.as_ref().map(|p| p.display().to_string()),
            reason: e.to_string(),
        })?;

        let base_dir = path
            .as_ref()
            .and_then(|p| p.parent())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.to_path_buf());

        Ok(LoadedConfig {
            config,
            path,
            base_dir,
        })
    }
}
