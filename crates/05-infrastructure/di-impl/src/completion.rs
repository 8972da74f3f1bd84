//! 集合完成调度器
//!
//! 服务键集合到一次性回调的映射，集合中的服务全部就绪时回调被取出并触发。
//! 被移除的回调一律交还调用方，须在释放注册表锁之后再丢弃。

use crate::registry::ServiceRegistry;
use di_abstractions::CompletionHandle;
use infrastructure_common::ServiceKey;

/// 集合完成回调
pub(crate) type CompletionCallback = Box<dyn FnOnce(&ServiceRegistry) + Send>;

struct SetCompletion {
    handle: CompletionHandle,
    required: Vec<ServiceKey>,
    callback: CompletionCallback,
}

#[derive(Default)]
pub(crate) struct CompletionScheduler {
    entries: Vec<SetCompletion>,
}

impl CompletionScheduler {
    pub fn push(
        &mut self,
        handle: CompletionHandle,
        required: Vec<ServiceKey>,
        callback: CompletionCallback,
    ) {
        self.entries.push(SetCompletion {
            handle,
            required,
            callback,
        });
    }

    /// 当前全部条目的句柄快照（按登记顺序）
    pub fn handles(&self) -> Vec<CompletionHandle> {
        self.entries.iter().map(|entry| entry.handle).collect()
    }

    /// 条目所需服务全部就绪时将其移除并返回回调
    pub fn take_if_satisfied<P>(
        &mut self,
        handle: CompletionHandle,
        is_present: P,
    ) -> Option<(Vec<ServiceKey>, CompletionCallback)>
    where
        P: Fn(&ServiceKey) -> bool,
    {
        let index = self.entries.iter().position(|entry| entry.handle == handle)?;
        if !self.entries[index].required.iter().all(|key| is_present(key)) {
            return None;
        }
        let entry = self.entries.remove(index);
        Some((entry.required, entry.callback))
    }

    /// 取消条目，返回被移除的回调
    pub fn cancel(&mut self, handle: CompletionHandle) -> Option<CompletionCallback> {
        let index = self.entries.iter().position(|entry| entry.handle == handle)?;
        Some(self.entries.remove(index).callback)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 移除全部条目，返回被移除的回调
    pub fn clear(&mut self) -> Vec<CompletionCallback> {
        self.entries.drain(..).map(|entry| entry.callback).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Left;
    struct Right;

    fn noop() -> CompletionCallback {
        Box::new(|_| {})
    }

    #[test]
    fn test_take_requires_every_key() {
        let mut scheduler = CompletionScheduler::default();
        let handle = CompletionHandle::new();
        let left = ServiceKey::of::<Left>();
        scheduler.push(handle, vec![left, ServiceKey::of::<Right>()], noop());

        assert!(scheduler.take_if_satisfied(handle, |key| *key == left).is_none());
        assert_eq!(scheduler.len(), 1);

        let taken = scheduler.take_if_satisfied(handle, |_| true);
        assert!(taken.is_some());
        assert_eq!(scheduler.len(), 0);
        assert!(scheduler.take_if_satisfied(handle, |_| true).is_none());
    }

    #[test]
    fn test_cancel_and_clear() {
        let mut scheduler = CompletionScheduler::default();
        let first = CompletionHandle::new();
        scheduler.push(first, vec![ServiceKey::of::<Left>()], noop());
        scheduler.push(CompletionHandle::new(), vec![ServiceKey::of::<Right>()], noop());

        assert!(scheduler.cancel(first).is_some());
        assert!(scheduler.cancel(first).is_none());
        assert_eq!(scheduler.handles().len(), 1);
        assert_eq!(scheduler.clear().len(), 1);
        assert_eq!(scheduler.len(), 0);
    }
}
