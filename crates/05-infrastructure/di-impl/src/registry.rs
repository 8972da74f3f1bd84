//! 服务注册表门面
//!
//! 所有注册与注销都经过这里，每次成功的存储变更后执行一次解析扫描：
//! 先从新到旧重试等待队列中的实例，再检查全部集合完成条目。
//!
//! 内部状态由一把互斥锁保护，但锁只在簿记步骤中持有，执行用户代码
//! （生命周期回调、订阅者、集合完成回调、依赖声明）前一定会释放，
//! 因此这些回调可以重入注册表。从状态中移除的用户值同样要带出锁外再丢弃。

use crate::catalog::DependencyCatalog;
use crate::completion::{CompletionCallback, CompletionScheduler};
use crate::observers::ObserverTable;
use crate::pending::PendingQueue;
use crate::store::{RegisteredService, ServiceStore};
use crate::waiters::WaiterTable;
use di_abstractions::{
    CompletionHandle, DefaultConstructor, DependencyReader, ExecutionContext, FallbackLocator,
    Registration, RegistryOptions, ResetReport, Service, ServiceEvent, ServiceInstance,
    ServiceLocator, ServiceObserver,
};
use infrastructure_common::{describe_keys, RegistryError, RegistryResult, ServiceKey};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Default)]
pub(crate) struct RegistryState {
    pub store: ServiceStore,
    pub pending: PendingQueue,
    pub catalog: DependencyCatalog,
    pub observers: ObserverTable,
    pub completions: CompletionScheduler,
    pub waiters: WaiterTable,
    /// 正在执行注销回调的服务键
    pub unregistering: HashSet<ServiceKey>,
}

struct RegistryInner {
    state: Mutex<RegistryState>,
    options: RegistryOptions,
    fallback: RwLock<Option<Arc<dyn FallbackLocator>>>,
    constructor: RwLock<Option<Arc<dyn DefaultConstructor>>>,
}

/// 服务注册表
///
/// 克隆得到的是同一个注册表的句柄
#[derive(Clone)]
pub struct ServiceRegistry {
    inner: Arc<RegistryInner>,
}

impl ServiceRegistry {
    /// 使用默认配置创建注册表
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    /// 使用指定配置创建注册表
    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                state: Mutex::new(RegistryState::default()),
                options,
                fallback: RwLock::new(None),
                constructor: RwLock::new(None),
            }),
        }
    }

    /// 设置后备实例查找器
    pub fn with_fallback_locator(self, locator: Arc<dyn FallbackLocator>) -> Self {
        self.set_fallback_locator(locator);
        self
    }

    /// 设置默认构造器
    pub fn with_default_constructor(self, constructor: Arc<dyn DefaultConstructor>) -> Self {
        self.set_default_constructor(constructor);
        self
    }

    pub fn set_fallback_locator(&self, locator: Arc<dyn FallbackLocator>) {
        let previous = self.inner.fallback.write().replace(locator);
        drop(previous);
    }

    pub fn set_default_constructor(&self, constructor: Arc<dyn DefaultConstructor>) {
        let previous = self.inner.constructor.write().replace(constructor);
        drop(previous);
    }

    /// 当前配置
    pub fn options(&self) -> &RegistryOptions {
        &self.inner.options
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.inner.state.lock()
    }

    /// 以实例的具体类型为服务键注册
    pub fn register<T: Service>(&self, instance: Arc<T>) -> Registration {
        self.register_as(ServiceKey::of::<T>(), instance)
    }

    /// 以指定服务键注册，依赖声明仍取自实例的具体类型
    pub fn register_as<T: Service>(&self, key: ServiceKey, instance: Arc<T>) -> Registration {
        let declared = T::dependencies();
        self.state()
            .catalog
            .record_if_absent(ServiceKey::of::<T>(), declared);
        self.register_service(RegisteredService::new(key, instance))
    }

    fn register_service(&self, service: RegisteredService) -> Registration {
        let key = service.key;

        if self.has_key(&key) {
            warn!("服务已注册，拒绝重复注册: {}", key);
            return Registration::Duplicate;
        }

        if !service.hooks.can_be_registered(self) {
            warn!("服务否决了本次注册: {}", key);
            return Registration::Vetoed;
        }

        let waiters = {
            let mut guard = self.state();
            let state = &mut *guard;

            // 否决回调期间可能已经重入注册了同一个键
            if state.store.contains(&key) {
                warn!("服务已注册，拒绝重复注册: {}", key);
                return Registration::Duplicate;
            }

            let store = &state.store;
            let missing = state.catalog.missing_dependencies(
                &service.type_key,
                &|dependency: &ServiceKey| store.contains(dependency),
            );
            if !missing.is_empty() {
                if state.pending.push(service) {
                    info!(
                        "依赖未满足，服务进入等待队列: {}, 缺失: {}",
                        key,
                        describe_keys(&missing)
                    );
                } else {
                    debug!("实例已在等待队列中: {}", key);
                }
                return Registration::Deferred;
            }

            state.store.insert(service.clone());
            state.waiters.take(&key)
        };

        info!("服务已注册: {}", key);
        // 先于任何用户回调唤醒，保证等待者拿到的实例此刻仍在存储中
        for waiter in waiters {
            // 接收端已丢弃说明等待已被取消
            let _ = waiter.send(service.instance.clone());
        }

        self.run_sweep();

        service.hooks.on_registered(self);

        let event = ServiceEvent::Registered(key);
        let observers = self.state().observers.snapshot(&key);
        for observer in observers {
            observer.on_service_event(&event);
        }

        Registration::Registered
    }

    /// 注销类型 `T` 对应的服务
    pub fn unregister<T: ?Sized + 'static>(&self) -> bool {
        self.unregister_key(&ServiceKey::of::<T>())
    }

    /// 按实例的具体类型注销
    pub fn unregister_instance<T: Service>(&self, _instance: &Arc<T>) -> bool {
        self.unregister_key(&ServiceKey::of::<T>())
    }

    /// 注销服务键，未注册时返回 false
    pub fn unregister_key(&self, key: &ServiceKey) -> bool {
        let service = {
            let mut state = self.state();
            if state.unregistering.contains(key) {
                debug!("服务正在注销中: {}", key);
                return false;
            }
            match state.store.get(key).cloned() {
                Some(service) => {
                    state.unregistering.insert(*key);
                    service
                }
                None => {
                    debug!("服务未注册，跳过注销: {}", key);
                    return false;
                }
            }
        };

        service.hooks.on_unregistered(self);

        let event = ServiceEvent::Unregistered(*key);
        let observers = self.state().observers.snapshot(key);
        for observer in observers {
            observer.on_service_event(&event);
        }

        let removed = {
            let mut state = self.state();
            state.unregistering.remove(key);
            state.store.remove_instance(key, &service.instance)
        };
        if removed {
            info!("服务已注销: {}", key);
        }

        self.run_sweep();
        true
    }

    /// 按注册逆序注销全部服务，并清空等待队列与订阅
    ///
    /// 集合完成回调与异步等待默认保留，分别由
    /// [`RegistryOptions::discard_completions_on_reset`] 与
    /// [`RegistryOptions::close_waiters_on_reset`] 控制
    pub fn unregister_all(&self) -> ResetReport {
        let mut report = ResetReport::default();

        let keys = self.state().store.keys_newest_first();
        for key in keys {
            if self.unregister_key(&key) {
                report.unregistered.push(key);
            }
        }

        let options = &self.inner.options;
        let (leftover, observers, completions, dropped) = {
            let mut state = self.state();
            let leftover = state.store.clear();
            let observers = state.observers.clear();
            let completions = if options.discard_completions_on_reset {
                state.completions.clear()
            } else {
                Vec::new()
            };
            if options.close_waiters_on_reset {
                report.closed_waiters = state.waiters.clear();
            }
            (leftover, observers, completions, state.pending.drain())
        };

        if !leftover.is_empty() {
            let keys: Vec<ServiceKey> = leftover.iter().map(|service| service.key).collect();
            debug!("清空期间新注册的服务被直接移除: {}", describe_keys(&keys));
        }
        report.dropped_subscriptions = observers.len();
        report.discarded_completions = completions.len();
        report.dropped_pending = dropped.iter().map(|service| service.key).collect();
        if report.has_stale_pending() {
            warn!(
                "清空注册表时仍有 {} 个服务在等待依赖，已丢弃: {}",
                report.dropped_pending.len(),
                describe_keys(&report.dropped_pending)
            );
        }
        drop((leftover, observers, completions, dropped));

        info!(
            "注册表已清空: 注销 {} 个服务, 清除 {} 个订阅",
            report.unregistered.len(),
            report.dropped_subscriptions
        );
        report
    }

    /// 解析扫描
    pub(crate) fn run_sweep(&self) {
        let pending_ids = self.state().pending.ids_newest_first();
        for id in pending_ids {
            let promoted = {
                let mut guard = self.state();
                let state = &mut *guard;
                let store = &state.store;
                let catalog = &state.catalog;
                state.pending.take_if(id, |service| {
                    catalog
                        .missing_dependencies(&service.type_key, &|dependency: &ServiceKey| {
                            store.contains(dependency)
                        })
                        .is_empty()
                })
            };
            if let Some(service) = promoted {
                debug!("依赖已满足，重新注册等待中的服务: {}", service.key);
                let outcome = self.register_service(service);
                if !outcome.is_registered() {
                    debug!("等待中的服务未能完成注册: {:?}", outcome);
                }
            }
        }

        let handles = self.state().completions.handles();
        for handle in handles {
            let ready = {
                let mut guard = self.state();
                let state = &mut *guard;
                let store = &state.store;
                state
                    .completions
                    .take_if_satisfied(handle, |key| store.contains(key))
            };
            if let Some((required, callback)) = ready {
                debug!("服务集合已就绪，触发回调: {}", describe_keys(&required));
                callback(self);
            }
        }
    }

    /// 检查类型 `T` 是否已注册
    pub fn has<T: ?Sized + 'static>(&self) -> bool {
        self.has_key(&ServiceKey::of::<T>())
    }

    /// 检查服务键是否已注册
    pub fn has_key(&self, key: &ServiceKey) -> bool {
        self.state().store.contains(key)
    }

    /// 只在存储中查找，不触发后备逻辑
    pub(crate) fn lookup(&self, key: &ServiceKey) -> Option<ServiceInstance> {
        self.state()
            .store
            .get(key)
            .map(|service| service.instance.clone())
    }

    /// 获取类型 `T` 的实例
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get_as(&ServiceKey::of::<T>())
    }

    /// 获取服务键对应的实例并转换为 `T`
    pub fn get_as<T: Any + Send + Sync>(&self, key: &ServiceKey) -> Option<Arc<T>> {
        let instance = self.get_by_key(key)?;
        match instance.downcast::<T>() {
            Ok(typed) => Some(typed),
            Err(_) => {
                warn!(
                    "服务类型不匹配: {}, 期望类型 {}",
                    key,
                    std::any::type_name::<T>()
                );
                None
            }
        }
    }

    /// 获取服务键对应的实例
    ///
    /// 未注册时按执行上下文处理：运行期记录错误，编辑期依次尝试后备查找与默认构造
    pub fn get_by_key(&self, key: &ServiceKey) -> Option<ServiceInstance> {
        let found = self.lookup(key);
        found.or_else(|| self.resolve_missing(key))
    }

    /// 获取类型 `T` 的实例，失败时返回错误
    pub fn try_get<T: Any + Send + Sync>(&self) -> RegistryResult<Arc<T>> {
        let key = ServiceKey::of::<T>();
        let instance = self
            .get_by_key(&key)
            .ok_or_else(|| RegistryError::not_found(key.short_name()))?;
        instance
            .downcast::<T>()
            .map_err(|_| RegistryError::type_mismatch(key.short_name(), std::any::type_name::<T>()))
    }

    pub(crate) fn resolve_missing(&self, key: &ServiceKey) -> Option<ServiceInstance> {
        match self.inner.options.context {
            ExecutionContext::Live => {
                error!("服务未注册: {}", key);
                None
            }
            ExecutionContext::Authoring => {
                let fallback = self.inner.fallback.read().clone();
                if let Some(instance) = fallback.and_then(|locator| locator.find_fallback(key)) {
                    warn!("服务未注册，使用后备实例: {}", key);
                    return Some(instance);
                }

                let constructor = self.inner.constructor.read().clone();
                if let Some(instance) =
                    constructor.and_then(|constructor| constructor.construct_default(key))
                {
                    warn!("服务未注册，已构造默认实例: {}", key);
                    return Some(instance);
                }

                warn!("服务未注册且没有可用的后备实例: {}", key);
                None
            }
        }
    }

    /// 订阅服务键的注册/注销事件，重复订阅无效果
    pub fn subscribe(&self, key: ServiceKey, observer: Arc<dyn ServiceObserver>) -> bool {
        let added = self.state().observers.subscribe(key, observer);
        if added {
            debug!("添加订阅: {}", key);
        }
        added
    }

    /// 订阅类型 `T` 的注册/注销事件
    pub fn subscribe_to<T: ?Sized + 'static>(&self, observer: Arc<dyn ServiceObserver>) -> bool {
        self.subscribe(ServiceKey::of::<T>(), observer)
    }

    /// 取消订阅
    pub fn unsubscribe(&self, key: &ServiceKey, observer: &Arc<dyn ServiceObserver>) -> bool {
        let removed = self.state().observers.unsubscribe(key, observer);
        if removed {
            debug!("取消订阅: {}", key);
        }
        removed
    }

    /// 登记集合完成回调
    ///
    /// 集合中的服务首次全部就绪时回调触发一次；调用时已全部就绪则立即触发
    pub fn when_all<I, F>(&self, keys: I, callback: F) -> CompletionHandle
    where
        I: IntoIterator<Item = ServiceKey>,
        F: FnOnce(&ServiceRegistry) + Send + 'static,
    {
        let handle = CompletionHandle::new();
        self.schedule_completion(handle, keys.into_iter().collect(), Box::new(callback));
        handle
    }

    /// 以指定句柄登记集合完成回调
    pub(crate) fn schedule_completion(
        &self,
        handle: CompletionHandle,
        mut required: Vec<ServiceKey>,
        callback: CompletionCallback,
    ) {
        required.sort();
        required.dedup();

        let immediate = {
            let mut state = self.state();
            if required.iter().all(|key| state.store.contains(key)) {
                Some(callback)
            } else {
                debug!("登记集合完成回调: {} ({})", handle, describe_keys(&required));
                state.completions.push(handle, required, callback);
                None
            }
        };

        if let Some(callback) = immediate {
            callback(self);
        }
    }

    /// 取消尚未触发的集合完成回调
    ///
    /// 对延迟注入返回的句柄同样有效，被捕获的注入目标随之释放
    pub fn cancel_completion(&self, handle: CompletionHandle) -> bool {
        let removed = self.state().completions.cancel(handle);
        match removed {
            Some(callback) => {
                debug!("已取消集合完成回调: {}", handle);
                drop(callback);
                true
            }
            None => false,
        }
    }

    /// 显式声明类型的依赖，覆盖类型自带的声明
    pub fn declare_dependencies(&self, type_key: ServiceKey, dependencies: Vec<ServiceKey>) {
        debug!(
            "声明依赖: {} -> [{}]",
            type_key,
            describe_keys(&dependencies)
        );
        self.state().catalog.declare(type_key, dependencies);
        self.run_sweep();
    }

    /// 读取类型的依赖声明
    pub fn dependencies_of(&self, type_key: &ServiceKey) -> Option<Vec<ServiceKey>> {
        self.state().catalog.dependencies_of(type_key)
    }

    /// 已注册的服务键（按注册顺序）
    pub fn registered_keys(&self) -> Vec<ServiceKey> {
        self.state().store.keys()
    }

    /// 等待队列中的服务键（按到达顺序）
    pub fn pending_keys(&self) -> Vec<ServiceKey> {
        self.state().pending.keys()
    }

    /// 服务键的订阅者数量
    pub fn subscriber_count(&self, key: &ServiceKey) -> usize {
        self.state().observers.count(key)
    }

    /// 尚未触发的集合完成回调数量
    pub fn pending_completion_count(&self) -> usize {
        self.state().completions.len()
    }

    /// 仍在等待服务键的异步等待者数量
    pub fn waiter_count(&self, key: &ServiceKey) -> usize {
        self.state().waiters.active_count(key)
    }

    /// 已注册服务数量
    pub fn len(&self) -> usize {
        self.state().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceLocator for ServiceRegistry {
    fn contains_key(&self, key: &ServiceKey) -> bool {
        self.has_key(key)
    }

    fn get_by_key(&self, key: &ServiceKey) -> Option<ServiceInstance> {
        ServiceRegistry::get_by_key(self, key)
    }

    fn registered_keys(&self) -> Vec<ServiceKey> {
        ServiceRegistry::registered_keys(self)
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("ServiceRegistry")
            .field("options", &self.inner.options)
            .field("registered", &state.store.len())
            .field("pending", &state.pending.len())
            .field("completions", &state.completions.len())
            .finish()
    }
}
