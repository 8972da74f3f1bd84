//! 依赖注入引擎
//!
//! 三种形式：
//! - [`ServiceRegistry::inject`] 同步注入，依赖缺失即返回错误
//! - [`ServiceRegistry::inject_or_defer`] 依赖缺失时登记集合完成回调，稍后自动完成
//! - [`ServiceRegistry::inject_async`] 挂起当前任务直到依赖全部注册或被取消

use crate::registry::ServiceRegistry;
use di_abstractions::{
    CompletionHandle, ExecutionContext, Injectable, InjectionStatus, ServiceInstance,
};
use futures::future::try_join_all;
use infrastructure_common::{describe_keys, RegistryError, RegistryResult, ServiceKey};
use std::any::Any;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

impl ServiceRegistry {
    /// 目标当前无法解析的依赖
    pub fn missing_for<T: Injectable>(&self, target: &T) -> Vec<ServiceKey> {
        let mut missing = Vec::new();
        for slot in target.injection_slots() {
            let key = slot.service_key();
            if self.resolve_for_injection(&key).is_none() && !missing.contains(&key) {
                missing.push(key);
            }
        }
        missing
    }

    /// 同步注入
    ///
    /// 任一依赖缺失时不赋值任何槽位，返回 [`RegistryError::UnresolvedDependencies`]
    pub fn inject<T: Injectable>(&self, target: &T) -> RegistryResult<()> {
        let missing = self.try_assign(target)?;
        if !missing.is_empty() {
            let err = RegistryError::UnresolvedDependencies {
                target: target.target_name().to_string(),
                missing: missing
                    .iter()
                    .map(|key| key.short_name().to_string())
                    .collect(),
            };
            error!("{}", err);
            return Err(err);
        }

        debug!("注入完成: {}", target.target_name());
        target.on_injected();
        Ok(())
    }

    /// 注入，依赖缺失时延迟到缺失服务全部注册之后
    ///
    /// 注入完成后依次调用目标的 `on_injected` 与 `on_complete`。
    /// 延迟期间若有服务再次被注销，会按新的缺失集合重新延迟，句柄保持不变；
    /// 把 [`InjectionStatus::Deferred`] 中的句柄交给
    /// [`ServiceRegistry::cancel_completion`] 即可放弃这次注入。
    pub fn inject_or_defer<T, F>(
        &self,
        target: Arc<T>,
        on_complete: F,
    ) -> RegistryResult<InjectionStatus>
    where
        T: Injectable,
        F: FnOnce(&ServiceRegistry, &Arc<T>) + Send + 'static,
    {
        self.inject_with_handle(target, on_complete, CompletionHandle::new())
    }

    fn inject_with_handle<T, F>(
        &self,
        target: Arc<T>,
        on_complete: F,
        handle: CompletionHandle,
    ) -> RegistryResult<InjectionStatus>
    where
        T: Injectable,
        F: FnOnce(&ServiceRegistry, &Arc<T>) + Send + 'static,
    {
        let missing = self.try_assign(target.as_ref())?;
        if missing.is_empty() {
            debug!("注入完成: {}", target.target_name());
            target.on_injected();
            on_complete(self, &target);
            return Ok(InjectionStatus::Completed);
        }

        info!(
            "依赖未满足，延迟注入: {}, 缺失: {}",
            target.target_name(),
            describe_keys(&missing)
        );
        let name = target.target_name();
        self.schedule_completion(
            handle,
            missing.clone(),
            Box::new(move |registry: &ServiceRegistry| {
                match registry.inject_with_handle(target, on_complete, handle) {
                    Ok(InjectionStatus::Completed) => {}
                    Ok(InjectionStatus::Deferred { missing, .. }) => {
                        debug!("依赖再次缺失，重新延迟注入: {} ({})", name, describe_keys(&missing));
                    }
                    Err(err) => error!("延迟注入失败: {}", err),
                }
            }),
        );

        Ok(InjectionStatus::Deferred { missing, handle })
    }

    /// 异步注入
    ///
    /// 依赖已全部注册时立即完成，否则挂起直到全部注册。
    /// `cancel` 被触发时所有未完成的等待一并释放，返回 [`RegistryError::WaitCancelled`]。
    pub async fn inject_async<T: Injectable>(
        &self,
        target: &T,
        cancel: Option<&CancellationToken>,
    ) -> RegistryResult<()> {
        let token = cancel.cloned().unwrap_or_default();

        loop {
            let missing = self.try_assign(target)?;
            if missing.is_empty() {
                debug!("异步注入完成: {}", target.target_name());
                target.on_injected();
                return Ok(());
            }

            debug!(
                "异步注入等待依赖: {}, 缺失: {}",
                target.target_name(),
                describe_keys(&missing)
            );
            let waits = token.child_token();
            let outcome =
                try_join_all(missing.iter().map(|key| self.wait_for_key(*key, &waits))).await;
            waits.cancel();
            outcome?;
        }
    }

    /// 等待类型 `T` 注册
    pub async fn wait_for<T: Any + Send + Sync>(
        &self,
        cancel: &CancellationToken,
    ) -> RegistryResult<Arc<T>> {
        let key = ServiceKey::of::<T>();
        let instance = self.wait_for_key(key, cancel).await?;
        instance
            .downcast::<T>()
            .map_err(|_| RegistryError::type_mismatch(key.short_name(), std::any::type_name::<T>()))
    }

    /// 等待服务键注册，已注册时立即返回
    ///
    /// 返回的总是唤醒后仍在存储中的实例；唤醒与恢复之间服务又被注销时继续等待
    pub async fn wait_for_key(
        &self,
        key: ServiceKey,
        cancel: &CancellationToken,
    ) -> RegistryResult<ServiceInstance> {
        loop {
            let receiver = {
                let mut state = self.state();
                if let Some(service) = state.store.get(&key) {
                    return Ok(service.instance.clone());
                }
                state.waiters.add(key)
            };

            debug!("等待服务注册: {}", key);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("等待服务被取消: {}", key);
                    return Err(RegistryError::WaitCancelled {
                        key: key.short_name().to_string(),
                    });
                }
                received = receiver => {
                    if received.is_err() {
                        return Err(RegistryError::RegistryClosed {
                            key: key.short_name().to_string(),
                        });
                    }
                }
            }
        }
    }

    /// 解析全部槽位，没有缺失时才赋值
    fn try_assign<T: Injectable>(&self, target: &T) -> RegistryResult<Vec<ServiceKey>> {
        let slots = target.injection_slots();
        let mut resolved = Vec::with_capacity(slots.len());
        let mut missing = Vec::new();

        for slot in &slots {
            let key = slot.service_key();
            match self.resolve_for_injection(&key) {
                Some(instance) => resolved.push(instance),
                None => {
                    if !missing.contains(&key) {
                        missing.push(key);
                    }
                }
            }
        }

        if !missing.is_empty() {
            return Ok(missing);
        }

        for (slot, instance) in slots.iter().zip(resolved) {
            slot.fill(instance)?;
        }
        Ok(missing)
    }

    /// 运行期只查存储，编辑期允许后备查找与默认构造
    fn resolve_for_injection(&self, key: &ServiceKey) -> Option<ServiceInstance> {
        let found = self.lookup(key);
        match (found, self.options().context) {
            (Some(instance), _) => Some(instance),
            (None, ExecutionContext::Authoring) => self.resolve_missing(key),
            (None, ExecutionContext::Live) => None,
        }
    }
}
