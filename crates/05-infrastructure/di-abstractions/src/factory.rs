//! 默认构造接口
//!
//! 当注册表中没有实例、后备查找也失败时，由宿主环境构造默认实例

use crate::registry::ServiceInstance;
use infrastructure_common::ServiceKey;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 默认构造器 trait
pub trait DefaultConstructor: Send + Sync {
    /// 构造指定服务键的默认实例，无法构造时返回 `None`
    fn construct_default(&self, key: &ServiceKey) -> Option<ServiceInstance>;
}

/// 构造函数类型
pub type ConstructorFn = Arc<dyn Fn() -> ServiceInstance + Send + Sync>;

/// 基于构造函数表的默认构造器
#[derive(Clone, Default)]
pub struct DefaultConstructors {
    constructors: HashMap<ServiceKey, ConstructorFn>,
}

impl DefaultConstructors {
    /// 创建空的构造函数表
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用 `T::default()` 构造类型 `T`
    pub fn with_default<T>(self) -> Self
    where
        T: Default + Any + Send + Sync,
    {
        self.with_factory(T::default)
    }

    /// 使用自定义工厂函数构造类型 `T`
    pub fn with_factory<T, F>(mut self, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let constructor: ConstructorFn = Arc::new(move || Arc::new(factory()) as ServiceInstance);
        self.constructors.insert(ServiceKey::of::<T>(), constructor);
        self
    }

    /// 已登记的构造函数数量
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// 是否没有登记任何构造函数
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl DefaultConstructor for DefaultConstructors {
    fn construct_default(&self, key: &ServiceKey) -> Option<ServiceInstance> {
        self.constructors.get(key).map(|constructor| constructor())
    }
}

impl fmt::Debug for DefaultConstructors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultConstructors")
            .field("keys", &self.constructors.keys().collect::<Vec<_>>())
            .field("constructors", &"<function>")
            .finish()
    }
}
