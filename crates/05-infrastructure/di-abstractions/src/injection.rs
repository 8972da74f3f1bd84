//! 依赖注入目标抽象
//!
//! 注入目标通过 [`Injectable`] 暴露自己的依赖槽位，注册表逐个解析并赋值。
//! 槽位采用内部可变性，注入只需要 `&self`，因此延迟注入可以作用于共享的 `Arc` 目标。

use crate::registry::ServiceInstance;
use infrastructure_common::{RegistryError, ServiceKey};
use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 依赖槽位 trait
pub trait InjectionSlot: Send + Sync {
    /// 槽位需要的服务键
    fn service_key(&self) -> ServiceKey;

    /// 是否已赋值
    fn is_filled(&self) -> bool;

    /// 使用实例赋值，类型不匹配时返回错误
    fn fill(&self, instance: ServiceInstance) -> Result<(), RegistryError>;

    /// 清除已赋值的实例
    fn clear(&self);
}

/// 依赖注入目标 trait
pub trait Injectable: Send + Sync + 'static {
    /// 目标的全部依赖槽位
    fn injection_slots(&self) -> Vec<&dyn InjectionSlot>;

    /// 全部槽位赋值完成后的回调
    fn on_injected(&self) {}

    /// 目标名称，用于日志和错误信息
    fn target_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// 集合完成回调的句柄
///
/// 延迟注入重新延迟时沿用同一个句柄，取消句柄即放弃整个延迟注入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompletionHandle(Uuid);

impl CompletionHandle {
    /// 生成新句柄
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CompletionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompletionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// 注入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionStatus {
    /// 已完成注入
    Completed,
    /// 依赖未满足，将在缺失服务全部注册后完成
    Deferred {
        /// 缺失的服务键
        missing: Vec<ServiceKey>,
        /// 延迟注入对应的集合完成句柄，可用于取消
        handle: CompletionHandle,
    },
}

impl InjectionStatus {
    /// 是否已完成
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// 延迟注入的句柄
    pub fn handle(&self) -> Option<CompletionHandle> {
        match self {
            Self::Completed => None,
            Self::Deferred { handle, .. } => Some(*handle),
        }
    }
}

/// 类型化依赖槽位
pub struct Slot<T> {
    value: RwLock<Option<Arc<T>>>,
}

impl<T> Slot<T>
where
    T: Any + Send + Sync,
{
    /// 创建空槽位
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
        }
    }

    /// 获取已注入的实例
    pub fn get(&self) -> Option<Arc<T>> {
        self.value.read().clone()
    }

    /// 手动赋值，主要用于测试替身
    pub fn set(&self, instance: Arc<T>) {
        *self.value.write() = Some(instance);
    }
}

impl<T> Default for Slot<T>
where
    T: Any + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InjectionSlot for Slot<T>
where
    T: Any + Send + Sync,
{
    fn service_key(&self) -> ServiceKey {
        ServiceKey::of::<T>()
    }

    fn is_filled(&self) -> bool {
        self.value.read().is_some()
    }

    fn fill(&self, instance: ServiceInstance) -> Result<(), RegistryError> {
        let typed = instance.downcast::<T>().map_err(|_| {
            RegistryError::type_mismatch(
                ServiceKey::of::<T>().short_name(),
                std::any::type_name::<T>(),
            )
        })?;
        *self.value.write() = Some(typed);
        Ok(())
    }

    fn clear(&self) {
        *self.value.write() = None;
    }
}

impl<T> fmt::Debug for Slot<T>
where
    T: Any + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("key", &ServiceKey::of::<T>())
            .field("filled", &self.is_filled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Database {
        url: &'static str,
    }

    #[test]
    fn test_slot_fill_and_clear() {
        let slot = Slot::<Database>::new();
        assert!(!slot.is_filled());
        assert_eq!(slot.service_key(), ServiceKey::of::<Database>());

        slot.fill(Arc::new(Database { url: "mem://" }))
            .expect("类型匹配时应赋值成功");
        assert!(slot.is_filled());
        assert_eq!(slot.get().map(|db| db.url), Some("mem://"));

        slot.clear();
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_slot_rejects_wrong_type() {
        let slot = Slot::<Database>::new();
        let result = slot.fill(Arc::new(42u32));
        assert!(matches!(result, Err(RegistryError::TypeMismatch { .. })));
        assert!(!slot.is_filled());
    }

    #[test]
    fn test_deferred_status_exposes_handle() {
        let handle = CompletionHandle::new();
        let status = InjectionStatus::Deferred {
            missing: vec![ServiceKey::of::<Database>()],
            handle,
        };
        assert!(!status.is_completed());
        assert_eq!(status.handle(), Some(handle));
        assert_eq!(InjectionStatus::Completed.handle(), None);
        assert_ne!(CompletionHandle::new(), handle);
    }
}
