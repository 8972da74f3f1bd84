//! 服务事件与订阅者定义

use infrastructure_common::ServiceKey;

/// 服务事件
///
/// 只携带服务键，订阅者需要实例时应重新查询注册表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceEvent {
    /// 服务已注册
    Registered(ServiceKey),
    /// 服务已注销
    Unregistered(ServiceKey),
}

impl ServiceEvent {
    /// 事件对应的服务键
    pub fn key(&self) -> ServiceKey {
        match self {
            Self::Registered(key) | Self::Unregistered(key) => *key,
        }
    }

    /// 是否为注册事件
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }
}

/// 服务订阅者 trait
pub trait ServiceObserver: Send + Sync {
    /// 处理服务事件
    fn on_service_event(&self, event: &ServiceEvent);
}

impl<F> ServiceObserver for F
where
    F: Fn(&ServiceEvent) + Send + Sync,
{
    fn on_service_event(&self, event: &ServiceEvent) {
        self(event)
    }
}
