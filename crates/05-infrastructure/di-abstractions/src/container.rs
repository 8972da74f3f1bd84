//! 注册表配置

use serde::{Deserialize, Serialize};

/// 执行上下文
///
/// 决定查找失败时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionContext {
    /// 运行期：查找失败记录为错误
    #[default]
    Live,
    /// 编辑/检查期：依次尝试后备查找与默认构造
    Authoring,
}

/// 注册表配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    /// 执行上下文
    pub context: ExecutionContext,
    /// 清空注册表时是否同时丢弃尚未触发的集合完成回调
    pub discard_completions_on_reset: bool,
    /// 清空注册表时是否关闭尚未完成的异步等待
    ///
    /// 默认保留，等待会在服务重新注册后继续完成
    pub close_waiters_on_reset: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            context: ExecutionContext::Live,
            discard_completions_on_reset: false,
            close_waiters_on_reset: false,
        }
    }
}

impl RegistryOptions {
    /// 编辑期配置
    pub fn authoring() -> Self {
        Self {
            context: ExecutionContext::Authoring,
            ..Self::default()
        }
    }

    /// 设置执行上下文
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    /// 设置清空时是否丢弃集合完成回调
    pub fn with_discard_completions_on_reset(mut self, discard: bool) -> Self {
        self.discard_completions_on_reset = discard;
        self
    }

    /// 设置清空时是否关闭异步等待
    pub fn with_close_waiters_on_reset(mut self, close: bool) -> Self {
        self.close_waiters_on_reset = close;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_retain_completions_in_live_context() {
        let options = RegistryOptions::default();
        assert_eq!(options.context, ExecutionContext::Live);
        assert!(!options.discard_completions_on_reset);
        assert!(!options.close_waiters_on_reset);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let options: RegistryOptions =
            serde_json::from_str(r#"{ "context": "authoring" }"#).expect("配置应可解析");
        assert_eq!(options, RegistryOptions::authoring());
    }
}
