//! 订阅者表
//!
//! 服务键到订阅者列表的映射，同一订阅者对同一服务键只记录一次

use di_abstractions::ServiceObserver;
use infrastructure_common::ServiceKey;
use std::collections::HashMap;
use std::sync::Arc;

/// 订阅者身份比较
fn same_observer(a: &Arc<dyn ServiceObserver>, b: &Arc<dyn ServiceObserver>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

#[derive(Default)]
pub(crate) struct ObserverTable {
    observers: HashMap<ServiceKey, Vec<Arc<dyn ServiceObserver>>>,
}

impl ObserverTable {
    /// 添加订阅，已存在时返回 false
    pub fn subscribe(&mut self, key: ServiceKey, observer: Arc<dyn ServiceObserver>) -> bool {
        let list = self.observers.entry(key).or_default();
        if list.iter().any(|existing| same_observer(existing, &observer)) {
            return false;
        }
        list.push(observer);
        true
    }

    /// 取消订阅，订阅不存在时返回 false
    pub fn unsubscribe(&mut self, key: &ServiceKey, observer: &Arc<dyn ServiceObserver>) -> bool {
        let Some(list) = self.observers.get_mut(key) else {
            return false;
        };
        let before = list.len();
        list.retain(|existing| !same_observer(existing, observer));
        let removed = list.len() < before;
        if list.is_empty() {
            self.observers.remove(key);
        }
        removed
    }

    /// 订阅者快照，通知期间订阅表可被重入修改
    pub fn snapshot(&self, key: &ServiceKey) -> Vec<Arc<dyn ServiceObserver>> {
        self.observers.get(key).cloned().unwrap_or_default()
    }

    pub fn count(&self, key: &ServiceKey) -> usize {
        self.observers.get(key).map_or(0, Vec::len)
    }

    /// 清空全部订阅，返回被清除的订阅者
    pub fn clear(&mut self) -> Vec<Arc<dyn ServiceObserver>> {
        self.observers.drain().flat_map(|(_, list)| list).collect()
    }
}
