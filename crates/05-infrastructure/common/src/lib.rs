//! # Infrastructure Common
//!
//! 服务注册表各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`ServiceKey`] - 以类型标识服务契约的键
//! - [`RegistryError`] - 注册表错误
//! - [`ConfigError`] - 配置错误
//! - [`InfrastructureError`] - 组合层错误

pub mod errors;
pub mod metadata;

pub use errors::*;
pub use metadata::*;
