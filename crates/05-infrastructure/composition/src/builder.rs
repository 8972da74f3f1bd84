//! 服务注册表构建器

use crate::config_sources::OptionsLoader;
use di_abstractions::{DefaultConstructor, ExecutionContext, FallbackLocator, RegistryOptions};
use di_impl::ServiceRegistry;
use infrastructure_common::{ConfigResult, InfrastructureError};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// 服务注册表构建器
///
/// 配置优先级从低到高：配置文件、环境变量、构建器上的显式设置
pub struct RegistryBuilder {
    /// 配置加载器
    loader: OptionsLoader,
    /// 显式指定的执行上下文
    context: Option<ExecutionContext>,
    /// 显式指定的清空策略
    discard_completions_on_reset: Option<bool>,
    /// 显式指定的等待关闭策略
    close_waiters_on_reset: Option<bool>,
    /// 后备实例查找器
    fallback: Option<Arc<dyn FallbackLocator>>,
    /// 默认构造器
    constructor: Option<Arc<dyn DefaultConstructor>>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
    /// 是否安装为全局注册表
    install_globally: bool,
}

impl RegistryBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            loader: OptionsLoader::new(),
            context: None,
            discard_completions_on_reset: None,
            close_waiters_on_reset: None,
            fallback: None,
            constructor: None,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
            install_globally: false,
        }
    }

    /// 添加配置文件
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        info!("添加配置文件: {}", path.as_ref().display());
        self.loader = self.loader.with_file(path);
        self
    }

    /// 指定环境变量前缀
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.loader = self.loader.with_env_prefix(prefix);
        self
    }

    /// 不读取环境变量
    pub fn without_env_vars(mut self) -> Self {
        self.loader = self.loader.without_env();
        self
    }

    /// 使用给定配置，覆盖文件和环境变量中的同名设置
    pub fn with_options(mut self, options: RegistryOptions) -> Self {
        self.context = Some(options.context);
        self.discard_completions_on_reset = Some(options.discard_completions_on_reset);
        self.close_waiters_on_reset = Some(options.close_waiters_on_reset);
        self
    }

    /// 指定执行上下文
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = Some(context);
        self
    }

    /// 指定清空注册表时是否丢弃集合完成回调
    pub fn with_discard_completions_on_reset(mut self, discard: bool) -> Self {
        self.discard_completions_on_reset = Some(discard);
        self
    }

    /// 指定清空注册表时是否关闭尚未完成的异步等待
    pub fn with_close_waiters_on_reset(mut self, close: bool) -> Self {
        self.close_waiters_on_reset = Some(close);
        self
    }

    /// 设置后备实例查找器
    pub fn with_fallback_locator<T: FallbackLocator + 'static>(mut self, locator: T) -> Self {
        debug!("设置后备实例查找器");
        self.fallback = Some(Arc::new(locator));
        self
    }

    /// 设置默认构造器
    pub fn with_default_constructor<T: DefaultConstructor + 'static>(
        mut self,
        constructor: T,
    ) -> Self {
        debug!("设置默认构造器");
        self.constructor = Some(Arc::new(constructor));
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 构建完成后安装为全局注册表
    pub fn install_globally(mut self, enabled: bool) -> Self {
        self.install_globally = enabled;
        self
    }

    /// 解析最终配置
    pub fn resolve_options(&self) -> ConfigResult<RegistryOptions> {
        let mut options = self.loader.load()?;
        if let Some(context) = self.context {
            options.context = context;
        }
        if let Some(discard) = self.discard_completions_on_reset {
            options.discard_completions_on_reset = discard;
        }
        if let Some(close) = self.close_waiters_on_reset {
            options.close_waiters_on_reset = close;
        }
        Ok(options)
    }

    /// 构建注册表
    pub fn build(self) -> Result<ServiceRegistry, InfrastructureError> {
        // 只有在明确配置了日志时才初始化日志
        if self.logging_enabled {
            self.initialize_logging()?;
        }

        info!("开始构建服务注册表");
        let options = self.resolve_options()?;
        debug!("注册表配置: {:?}", options);

        let registry = ServiceRegistry::with_options(options);
        if let Some(locator) = self.fallback {
            registry.set_fallback_locator(locator);
        }
        if let Some(constructor) = self.constructor {
            registry.set_default_constructor(constructor);
        }

        if self.install_globally {
            if let Some(previous) = di_impl::install_global(registry.clone()) {
                let report = previous.unregister_all();
                debug!("旧的全局注册表已清空: 注销 {} 个服务", report.unregistered.len());
            }
        }

        info!("服务注册表构建完成");
        Ok(registry)
    }

    /// 初始化日志系统
    fn initialize_logging(&self) -> Result<(), InfrastructureError> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(self.logging_config.level)
            .with_target(self.logging_config.show_target)
            .with_thread_ids(self.logging_config.show_thread_ids)
            .with_file(self.logging_config.show_file)
            .with_line_number(self.logging_config.show_line_number);

        if self.logging_config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        }
        .map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境：DEBUG 级别，显示线程和源码位置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 生产环境：INFO 级别，JSON 输出
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 指定日志级别
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }
}
