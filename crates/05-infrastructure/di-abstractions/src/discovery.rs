//! 后备实例查找接口
//!
//! 宿主环境在注册表缺少实例时提供已存在的实例（例如场景或资源目录中的对象）

use crate::registry::ServiceInstance;
use infrastructure_common::ServiceKey;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// 后备实例查找器 trait
pub trait FallbackLocator: Send + Sync {
    /// 查找指定服务键的后备实例
    fn find_fallback(&self, key: &ServiceKey) -> Option<ServiceInstance>;
}

/// 基于预置实例的后备查找器
#[derive(Clone, Default)]
pub struct FallbackInstances {
    instances: HashMap<ServiceKey, ServiceInstance>,
}

impl FallbackInstances {
    /// 创建空的后备实例集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加类型 `T` 的后备实例
    pub fn with_instance<T: Any + Send + Sync>(mut self, instance: Arc<T>) -> Self {
        self.instances.insert(ServiceKey::of::<T>(), instance);
        self
    }

    /// 以指定服务键添加后备实例
    pub fn with_keyed(mut self, key: ServiceKey, instance: ServiceInstance) -> Self {
        self.instances.insert(key, instance);
        self
    }

    /// 后备实例数量
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl FallbackLocator for FallbackInstances {
    fn find_fallback(&self, key: &ServiceKey) -> Option<ServiceInstance> {
        self.instances.get(key).cloned()
    }
}

impl std::fmt::Debug for FallbackInstances {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackInstances")
            .field("keys", &self.instances.keys().collect::<Vec<_>>())
            .finish()
    }
}
