//! 派生宏与注册表的端到端测试

use di_abstractions::{ServiceLocator, Slot};
use di_impl::{InjectionStatus, Registration, ServiceRegistry};
use service_macros::{Injectable, Service};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Service)]
pub struct Database;

#[derive(Debug, Service)]
#[service(depends_on(Database), on_registered = "announce")]
pub struct Repository {
    announcements: AtomicUsize,
}

impl Repository {
    fn new() -> Self {
        Self {
            announcements: AtomicUsize::new(0),
        }
    }

    fn announce(&self, _registry: &dyn ServiceLocator) {
        self.announcements.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Service)]
#[service(can_be_registered = "only_without_database")]
pub struct OfflineMode;

impl OfflineMode {
    fn only_without_database(&self, registry: &dyn ServiceLocator) -> bool {
        registry.registered_keys().is_empty()
    }
}

#[derive(Default, Injectable)]
#[injectable(on_injected = "mark_ready")]
pub struct ReportJob {
    repository: Slot<Repository>,
    ready: AtomicUsize,
}

impl ReportJob {
    fn mark_ready(&self) {
        self.ready.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_derived_dependencies_drive_deferred_registration() {
    let registry = ServiceRegistry::new();
    let repository = Arc::new(Repository::new());

    assert_eq!(registry.register(repository.clone()), Registration::Deferred);
    assert_eq!(repository.announcements.load(Ordering::SeqCst), 0);

    registry.register(Arc::new(Database));
    assert!(registry.has::<Repository>());
    assert_eq!(repository.announcements.load(Ordering::SeqCst), 1);
}

#[test]
fn test_derived_veto_is_consulted() {
    let registry = ServiceRegistry::new();
    registry.register(Arc::new(Database));

    assert_eq!(registry.register(Arc::new(OfflineMode)), Registration::Vetoed);
}

#[test]
fn test_derived_injectable_defers_until_dependency_registers() {
    let registry = ServiceRegistry::new();
    let job = Arc::new(ReportJob::default());

    let status = registry.inject_or_defer(job.clone(), |_, _| {}).unwrap();
    assert!(!status.is_completed());

    registry.register(Arc::new(Database));
    registry.register(Arc::new(Repository::new()));

    assert!(job.repository.get().is_some());
    assert_eq!(job.ready.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_derived_injectable_async() {
    let registry = ServiceRegistry::new();
    registry.register(Arc::new(Database));
    registry.register(Arc::new(Repository::new()));

    let job = ReportJob::default();
    registry.inject_async(&job, None).await.unwrap();
    assert_eq!(job.ready.load(Ordering::SeqCst), 1);
    assert!(matches!(
        registry.inject_or_defer(Arc::new(ReportJob::default()), |_, _| {}),
        Ok(InjectionStatus::Completed)
    ));
}
