//! 异步等待者表
//!
//! 每个等待者持有一个一次性通道，对应服务注册时被唤醒。
//! 接收端被丢弃（例如等待被取消）后，发送端在下次整理时被清除。

use di_abstractions::ServiceInstance;
use infrastructure_common::ServiceKey;
use std::collections::HashMap;
use tokio::sync::oneshot;

#[derive(Debug, Default)]
pub(crate) struct WaiterTable {
    waiters: HashMap<ServiceKey, Vec<oneshot::Sender<ServiceInstance>>>,
}

impl WaiterTable {
    /// 登记等待者
    pub fn add(&mut self, key: ServiceKey) -> oneshot::Receiver<ServiceInstance> {
        let (sender, receiver) = oneshot::channel();
        let list = self.waiters.entry(key).or_default();
        list.retain(|existing| !existing.is_closed());
        list.push(sender);
        receiver
    }

    /// 取出某个服务键的全部等待者
    pub fn take(&mut self, key: &ServiceKey) -> Vec<oneshot::Sender<ServiceInstance>> {
        self.waiters.remove(key).unwrap_or_default()
    }

    /// 仍在等待的数量
    pub fn active_count(&self, key: &ServiceKey) -> usize {
        self.waiters
            .get(key)
            .map_or(0, |list| list.iter().filter(|sender| !sender.is_closed()).count())
    }

    /// 丢弃全部等待者，返回仍在等待的数量
    pub fn clear(&mut self) -> usize {
        let active = self
            .waiters
            .values()
            .flatten()
            .filter(|sender| !sender.is_closed())
            .count();
        self.waiters.clear();
        active
    }
}
