//! 服务注册表抽象接口

use infrastructure_common::ServiceKey;
use std::any::Any;
use std::sync::Arc;

/// 已注册的服务实例
///
/// 内部保存具体服务类型，按需向下转型
pub type ServiceInstance = Arc<dyn Any + Send + Sync>;

/// 可注册服务 trait
///
/// 所有方法都有默认实现，服务只需覆盖自己关心的能力
pub trait Service: Any + Send + Sync {
    /// 依赖声明：注册前必须已经存在的服务键
    ///
    /// 声明属于类型而不是实例
    fn dependencies() -> Vec<ServiceKey>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// 是否允许注册，返回 false 时注册被否决
    fn can_be_registered(&self, _registry: &dyn ServiceLocator) -> bool {
        true
    }

    /// 注册完成后的回调
    fn on_registered(&self, _registry: &dyn ServiceLocator) {}

    /// 注销前的回调，此时实例仍在注册表中
    fn on_unregistered(&self, _registry: &dyn ServiceLocator) {}
}

/// 注册表只读视图
///
/// 传递给服务生命周期回调，避免回调直接依赖具体注册表类型
pub trait ServiceLocator: Send + Sync {
    /// 检查服务键是否已注册
    fn contains_key(&self, key: &ServiceKey) -> bool;

    /// 按服务键获取实例
    fn get_by_key(&self, key: &ServiceKey) -> Option<ServiceInstance>;

    /// 获取所有已注册的服务键（按注册顺序）
    fn registered_keys(&self) -> Vec<ServiceKey>;
}

/// [`ServiceLocator`] 的类型化扩展
pub trait ServiceLocatorExt: ServiceLocator {
    /// 检查类型 `T` 是否已注册
    fn contains<T: Any>(&self) -> bool {
        self.contains_key(&ServiceKey::of::<T>())
    }

    /// 解析类型 `T` 的实例
    fn resolve<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get_by_key(&ServiceKey::of::<T>())
            .and_then(|instance| instance.downcast::<T>().ok())
    }
}

impl<L: ServiceLocator + ?Sized> ServiceLocatorExt for L {}

/// 注册结果
///
/// 注册失败不会作为错误抛出，只记录日志并通过该枚举告知调用方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// 已写入注册表
    Registered,
    /// 依赖未满足，已进入等待队列
    Deferred,
    /// 服务键已有实例，注册被拒绝
    Duplicate,
    /// 实例否决了本次注册
    Vetoed,
}

impl Registration {
    /// 是否已完成注册
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered)
    }
}

/// 清空注册表的报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    /// 按注销顺序排列的服务键
    pub unregistered: Vec<ServiceKey>,
    /// 被丢弃的等待中实例
    pub dropped_pending: Vec<ServiceKey>,
    /// 被清除的订阅数量
    pub dropped_subscriptions: usize,
    /// 被丢弃的集合完成回调数量
    pub discarded_completions: usize,
    /// 被关闭的异步等待数量，仅在配置要求关闭时非零
    pub closed_waiters: usize,
}

impl ResetReport {
    /// 是否有等待中的实例被丢弃
    pub fn has_stale_pending(&self) -> bool {
        !self.dropped_pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, PartialEq)]
    struct Clock(u64);

    struct MapLocator(HashMap<ServiceKey, ServiceInstance>);

    impl ServiceLocator for MapLocator {
        fn contains_key(&self, key: &ServiceKey) -> bool {
            self.0.contains_key(key)
        }

        fn get_by_key(&self, key: &ServiceKey) -> Option<ServiceInstance> {
            self.0.get(key).cloned()
        }

        fn registered_keys(&self) -> Vec<ServiceKey> {
            self.0.keys().copied().collect()
        }
    }

    #[test]
    fn test_locator_ext_downcasts() {
        let mut map = HashMap::new();
        map.insert(ServiceKey::of::<Clock>(), Arc::new(Clock(7)) as ServiceInstance);
        let locator = MapLocator(map);

        assert!(locator.contains::<Clock>());
        assert_eq!(locator.resolve::<Clock>().as_deref(), Some(&Clock(7)));
        assert!(locator.resolve::<String>().is_none());
    }

    #[test]
    fn test_locator_ext_through_trait_object() {
        let locator = MapLocator(HashMap::new());
        let view: &dyn ServiceLocator = &locator;
        assert!(!view.contains::<Clock>());
    }
}
