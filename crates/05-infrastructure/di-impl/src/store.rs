//! 服务存储
//!
//! 服务键到已注册实例的一对一映射，并记录注册顺序以便逆序拆除

use di_abstractions::{Service, ServiceInstance};
use infrastructure_common::ServiceKey;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 已注册（或等待注册）的服务
#[derive(Clone)]
pub(crate) struct RegisteredService {
    /// 注册使用的服务键
    pub key: ServiceKey,
    /// 实例的具体类型，用于读取依赖声明
    pub type_key: ServiceKey,
    /// 实例
    pub instance: ServiceInstance,
    /// 生命周期能力
    pub hooks: Arc<dyn Service>,
}

impl RegisteredService {
    pub fn new<T: Service>(key: ServiceKey, instance: Arc<T>) -> Self {
        Self {
            key,
            type_key: ServiceKey::of::<T>(),
            instance: instance.clone(),
            hooks: instance,
        }
    }

    /// 是否为同一个实例
    pub fn is_same_instance(&self, other: &ServiceInstance) -> bool {
        same_instance(&self.instance, other)
    }
}

impl fmt::Debug for RegisteredService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredService")
            .field("key", &self.key)
            .field("type_key", &self.type_key)
            .finish()
    }
}

/// 比较两个实例是否指向同一对象
pub(crate) fn same_instance(a: &ServiceInstance, b: &ServiceInstance) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// 服务存储
#[derive(Debug, Default)]
pub(crate) struct ServiceStore {
    entries: HashMap<ServiceKey, RegisteredService>,
    order: Vec<ServiceKey>,
}

impl ServiceStore {
    pub fn contains(&self, key: &ServiceKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &ServiceKey) -> Option<&RegisteredService> {
        self.entries.get(key)
    }

    /// 写入服务，键已存在时返回 false 且不做修改
    pub fn insert(&mut self, service: RegisteredService) -> bool {
        if self.entries.contains_key(&service.key) {
            return false;
        }
        self.order.push(service.key);
        self.entries.insert(service.key, service);
        true
    }

    /// 仅当键仍对应给定实例时移除
    pub fn remove_instance(&mut self, key: &ServiceKey, instance: &ServiceInstance) -> bool {
        let matches = self
            .entries
            .get(key)
            .is_some_and(|service| service.is_same_instance(instance));
        if matches {
            self.entries.remove(key);
            self.order.retain(|existing| existing != key);
        }
        matches
    }

    /// 按注册顺序返回服务键
    pub fn keys(&self) -> Vec<ServiceKey> {
        self.order.clone()
    }

    /// 按注册逆序返回服务键
    pub fn keys_newest_first(&self) -> Vec<ServiceKey> {
        self.order.iter().rev().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 清空并按注册顺序返回被移除的服务
    pub fn clear(&mut self) -> Vec<RegisteredService> {
        let mut entries = std::mem::take(&mut self.entries);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|key| entries.remove(&key))
            .collect()
    }
}
