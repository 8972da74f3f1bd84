//! 注册表配置来源
//!
//! 加载顺序：配置文件（可选）→ 环境变量，后加载的来源覆盖先加载的来源

use di_abstractions::RegistryOptions;
use infrastructure_common::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 默认环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "SERVICE_REGISTRY";

/// 默认环境变量层级分隔符
pub const DEFAULT_ENV_SEPARATOR: &str = "__";

/// 注册表配置加载器
#[derive(Debug, Clone)]
pub struct OptionsLoader {
    file: Option<PathBuf>,
    env_prefix: Option<String>,
    separator: String,
}

impl Default for OptionsLoader {
    fn default() -> Self {
        Self {
            file: None,
            env_prefix: Some(DEFAULT_ENV_PREFIX.to_string()),
            separator: DEFAULT_ENV_SEPARATOR.to_string(),
        }
    }
}

impl OptionsLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定配置文件，格式按扩展名识别（toml / json / yaml）
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// 指定环境变量前缀
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// 不读取环境变量
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// 指定环境变量层级分隔符
    pub fn with_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.separator = separator.into();
        self
    }

    /// 加载配置
    pub fn load(&self) -> ConfigResult<RegistryOptions> {
        let mut builder = config::Config::builder();

        if let Some(path) = &self.file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                });
            }
            info!("加载注册表配置文件: {}", path.display());
            builder = builder.add_source(config::File::from(path.as_path()));
        }

        if let Some(prefix) = &self.env_prefix {
            debug!("读取环境变量，前缀: {}", prefix);
            builder = builder.add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator(&self.separator)
                    .separator(&self.separator)
                    .try_parsing(true),
            );
        }

        let settings = builder.build().map_err(|e| ConfigError::ParseError {
            source: Box::new(e),
        })?;

        settings
            .try_deserialize::<RegistryOptions>()
            .map_err(|e| ConfigError::ParseError {
                source: Box::new(e),
            })
    }
}
