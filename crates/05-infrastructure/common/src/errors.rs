//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 服务注册表错误类型
///
/// 注册表内部的解析逻辑倾向于在下一轮扫描中重试，只有少数场景会向调用方返回错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("服务未注册: {key}")]
    ServiceNotFound { key: String },

    #[error("服务类型不匹配: {key}, 期望类型 {expected}")]
    TypeMismatch { key: String, expected: String },

    #[error("依赖未满足: {target}, 缺失: {}", .missing.join(", "))]
    UnresolvedDependencies { target: String, missing: Vec<String> },

    #[error("等待服务被取消: {key}")]
    WaitCancelled { key: String },

    #[error("注册表已关闭，无法继续等待服务: {key}")]
    RegistryClosed { key: String },
}

impl RegistryError {
    /// 创建服务未注册错误
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::ServiceNotFound { key: key.into() }
    }

    /// 创建类型不匹配错误
    pub fn type_mismatch(key: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected: expected.into(),
        }
    }

    /// 是否为取消导致的错误
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::WaitCancelled { .. })
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("服务注册表错误: {source}")]
    RegistryError {
        #[from]
        source: RegistryError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
