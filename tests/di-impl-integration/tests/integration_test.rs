//! 服务注册表端到端场景测试

use di_abstractions::{InjectionSlot, ServiceLocator, ServiceLocatorExt};
use di_impl::{
    CancellationToken, Injectable, Service, ServiceEvent, ServiceKey, ServiceObserver,
    ServiceRegistry, Slot,
};
use infrastructure_composition::RegistryBuilder;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 无依赖的基础服务
#[derive(Debug)]
struct AudioMixer;
impl Service for AudioMixer {}

/// 依赖 AudioMixer 的服务
#[derive(Debug, Default)]
struct MusicPlayer {
    registered_with_mixer: AtomicUsize,
}

impl Service for MusicPlayer {
    fn dependencies() -> Vec<ServiceKey> {
        vec![ServiceKey::of::<AudioMixer>()]
    }

    fn on_registered(&self, registry: &dyn ServiceLocator) {
        if registry.contains::<AudioMixer>() {
            self.registered_with_mixer.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Debug)]
struct Playlist;
impl Service for Playlist {
    fn dependencies() -> Vec<ServiceKey> {
        vec![ServiceKey::of::<MusicPlayer>()]
    }
}

#[derive(Default)]
struct HudWidget {
    player: Slot<MusicPlayer>,
    playlist: Slot<Playlist>,
    refreshed: AtomicUsize,
}

impl Injectable for HudWidget {
    fn injection_slots(&self) -> Vec<&dyn InjectionSlot> {
        vec![&self.player, &self.playlist]
    }

    fn on_injected(&self) {
        self.refreshed.fetch_add(1, Ordering::SeqCst);
    }
}

fn build_registry() -> anyhow::Result<ServiceRegistry> {
    Ok(RegistryBuilder::new().without_env_vars().build()?)
}

#[test]
fn test_dependent_waits_for_re_registered_dependency() -> anyhow::Result<()> {
    let registry = build_registry()?;

    registry.register(Arc::new(AudioMixer));
    assert!(registry.has::<AudioMixer>());

    registry.unregister::<AudioMixer>();
    let player = Arc::new(MusicPlayer::default());
    registry.register(player.clone());
    assert!(!registry.has::<MusicPlayer>());

    registry.register(Arc::new(AudioMixer));
    assert!(registry.has::<MusicPlayer>());
    assert_eq!(player.registered_with_mixer.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_observers_see_cascading_promotions() -> anyhow::Result<()> {
    let registry = build_registry()?;
    let seen = Arc::new(Mutex::new(Vec::new()));

    for key in [
        ServiceKey::of::<AudioMixer>(),
        ServiceKey::of::<MusicPlayer>(),
        ServiceKey::of::<Playlist>(),
    ] {
        let seen = seen.clone();
        let observer: Arc<dyn ServiceObserver> = Arc::new(move |event: &ServiceEvent| {
            seen.lock().unwrap().push(*event);
        });
        registry.subscribe(key, observer);
    }

    registry.register(Arc::new(Playlist));
    registry.register(Arc::new(MusicPlayer::default()));
    registry.register(Arc::new(AudioMixer));

    let events = seen.lock().unwrap().clone();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(ServiceEvent::is_registered));
    assert_eq!(
        registry.registered_keys(),
        vec![
            ServiceKey::of::<AudioMixer>(),
            ServiceKey::of::<MusicPlayer>(),
            ServiceKey::of::<Playlist>(),
        ]
    );
    Ok(())
}

#[test]
fn test_teardown_then_rebuild() -> anyhow::Result<()> {
    let registry = build_registry()?;
    registry.register(Arc::new(AudioMixer));
    registry.register(Arc::new(MusicPlayer::default()));
    registry.register(Arc::new(Playlist));

    let report = registry.unregister_all();
    assert_eq!(
        report.unregistered,
        vec![
            ServiceKey::of::<Playlist>(),
            ServiceKey::of::<MusicPlayer>(),
            ServiceKey::of::<AudioMixer>(),
        ]
    );
    assert!(!report.has_stale_pending());

    registry.register(Arc::new(MusicPlayer::default()));
    let report = registry.unregister_all();
    assert_eq!(report.dropped_pending, vec![ServiceKey::of::<MusicPlayer>()]);

    registry.register(Arc::new(AudioMixer));
    assert!(!registry.has::<MusicPlayer>());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_widget_injection_across_tasks() -> anyhow::Result<()> {
    let registry = build_registry()?;
    let widget = Arc::new(HudWidget::default());

    let waiting = {
        let registry = registry.clone();
        let widget = widget.clone();
        tokio::spawn(async move { registry.inject_async(widget.as_ref(), None).await })
    };

    let producer = {
        let registry = registry.clone();
        tokio::spawn(async move {
            registry.register(Arc::new(Playlist));
            tokio::time::sleep(Duration::from_millis(10)).await;
            registry.register(Arc::new(MusicPlayer::default()));
            tokio::time::sleep(Duration::from_millis(10)).await;
            registry.register(Arc::new(AudioMixer));
        })
    };

    producer.await?;
    waiting.await??;

    assert_eq!(widget.refreshed.load(Ordering::SeqCst), 1);
    assert!(widget.player.get().is_some());
    assert!(widget.playlist.get().is_some());
    Ok(())
}

#[tokio::test]
async fn test_bounded_wait_composed_from_cancellation() -> anyhow::Result<()> {
    let registry = build_registry()?;
    let token = CancellationToken::new();
    let widget = HudWidget::default();

    let deadline = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        })
    };

    let result = registry.inject_async(&widget, Some(&token)).await;
    deadline.await?;

    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(registry.waiter_count(&ServiceKey::of::<MusicPlayer>()), 0);
    assert_eq!(widget.refreshed.load(Ordering::SeqCst), 0);
    Ok(())
}
