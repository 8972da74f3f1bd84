//! # 基础设施组合层
//!
//! 负责按配置组装服务注册表：加载配置、初始化日志、挂接宿主环境提供的
//! 后备查找与默认构造，并可选地安装为全局注册表。
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{LoggingConfig, RegistryBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = RegistryBuilder::new()
//!         .with_config_file("config/registry.toml")
//!         .with_logging(LoggingConfig::development())
//!         .build()?;
//!
//!     println!("已注册服务数量: {}", registry.len());
//!     registry.unregister_all();
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config_sources;


// 重新导出主要类型
pub use builder::{LoggingConfig, RegistryBuilder};
pub use config_sources::{OptionsLoader, DEFAULT_ENV_PREFIX, DEFAULT_ENV_SEPARATOR};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
