//! 等待队列
//!
//! 依赖尚未满足的实例按到达顺序排队，每次存储变更后由解析扫描重新检查

use crate::store::RegisteredService;
use infrastructure_common::ServiceKey;

#[derive(Debug)]
struct PendingService {
    id: u64,
    service: RegisteredService,
}

#[derive(Debug, Default)]
pub(crate) struct PendingQueue {
    entries: Vec<PendingService>,
    next_id: u64,
}

impl PendingQueue {
    /// 入队，同一实例已在队列中时返回 false
    pub fn push(&mut self, service: RegisteredService) -> bool {
        if self
            .entries
            .iter()
            .any(|entry| entry.service.is_same_instance(&service.instance))
        {
            return false;
        }
        self.next_id += 1;
        self.entries.push(PendingService {
            id: self.next_id,
            service,
        });
        true
    }

    /// 按从新到旧的顺序返回条目ID
    pub fn ids_newest_first(&self) -> Vec<u64> {
        self.entries.iter().rev().map(|entry| entry.id).collect()
    }

    /// 条目仍在队列中且满足条件时将其取出
    pub fn take_if<P>(&mut self, id: u64, ready: P) -> Option<RegisteredService>
    where
        P: FnOnce(&RegisteredService) -> bool,
    {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        if !ready(&self.entries[index].service) {
            return None;
        }
        Some(self.entries.remove(index).service)
    }

    /// 排队中实例的服务键（按到达顺序）
    pub fn keys(&self) -> Vec<ServiceKey> {
        self.entries.iter().map(|entry| entry.service.key).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 清空队列，返回被丢弃的服务
    pub fn drain(&mut self) -> Vec<RegisteredService> {
        self.entries.drain(..).map(|entry| entry.service).collect()
    }
}
