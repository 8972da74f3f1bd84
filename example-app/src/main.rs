//! # 示例应用程序
//!
//! 演示服务注册表的延迟注册、订阅、集合完成回调与异步注入

use clap::Parser;
use di_abstractions::{ExecutionContext, ServiceEvent, ServiceLocator, Slot};
use di_impl::{CancellationToken, ServiceKey, ServiceObserver, ServiceRegistry};
use infrastructure_composition::{LoggingConfig, RegistryBuilder};
use service_macros::{Injectable, Service};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "服务注册表示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 使用编辑期上下文
    #[arg(long)]
    authoring: bool,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 使用 JSON 日志
    #[arg(long)]
    json_logs: bool,

    /// 异步注入的最长等待时间（毫秒）
    #[arg(long, default_value_t = 500)]
    wait_timeout_ms: u64,
}

#[derive(Debug, Service)]
struct AudioMixer;

#[derive(Debug, Service)]
#[service(depends_on(AudioMixer), on_registered = "announce")]
struct MusicPlayer;

impl MusicPlayer {
    fn announce(&self, registry: &dyn ServiceLocator) {
        info!("播放器已就绪，当前服务数量: {}", registry.registered_keys().len());
    }
}

#[derive(Debug, Service)]
#[service(depends_on(MusicPlayer))]
struct Playlist;

#[derive(Default, Injectable)]
#[injectable(on_injected = "refresh")]
struct Hud {
    player: Slot<MusicPlayer>,
    playlist: Slot<Playlist>,
}

impl Hud {
    fn refresh(&self) {
        info!(
            "HUD 已完成注入: player={}, playlist={}",
            self.player.get().is_some(),
            self.playlist.get().is_some()
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let registry = build_registry(&args)?;
    info!("启动服务注册表示例应用");

    subscribe_to_events(&registry);
    registry.when_all(
        [ServiceKey::of::<MusicPlayer>(), ServiceKey::of::<Playlist>()],
        |registry| info!("播放服务全部就绪，共 {} 个服务", registry.len()),
    );

    let hud = Arc::new(Hud::default());
    let token = CancellationToken::new();
    let waiting = {
        let registry = registry.clone();
        let hud = hud.clone();
        let token = token.clone();
        tokio::spawn(async move { registry.inject_async(hud.as_ref(), Some(&token)).await })
    };

    let deadline = {
        let token = token.clone();
        let timeout = Duration::from_millis(args.wait_timeout_ms);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            token.cancel();
        })
    };

    // 故意按依赖的逆序注册
    registry.register(Arc::new(Playlist));
    registry.register(Arc::new(MusicPlayer));
    info!("等待队列: {:?}", registry.pending_keys());
    registry.register(Arc::new(AudioMixer));

    match waiting.await? {
        Ok(()) => info!("异步注入完成"),
        Err(e) => warn!("异步注入未完成: {}", e),
    }
    deadline.abort();

    let report = registry.unregister_all();
    info!(
        "注册表已清空: 注销 {} 个服务, 丢弃 {} 个等待中的服务",
        report.unregistered.len(),
        report.dropped_pending.len()
    );
    Ok(())
}

/// 按命令行参数构建注册表
fn build_registry(args: &Args) -> anyhow::Result<ServiceRegistry> {
    let level = parse_log_level(&args.log_level);
    let mut logging = if args.json_logs {
        LoggingConfig::production()
    } else {
        LoggingConfig::development()
    };
    logging.level = level;

    let mut builder = RegistryBuilder::new().with_logging(logging);
    if let Some(path) = &args.config {
        builder = builder.with_config_file(path);
    }
    if args.authoring {
        builder = builder.with_context(ExecutionContext::Authoring);
    }

    Ok(builder.install_globally(true).build()?)
}

fn subscribe_to_events(registry: &ServiceRegistry) {
    let observer: Arc<dyn ServiceObserver> = Arc::new(|event: &ServiceEvent| match event {
        ServiceEvent::Registered(key) => info!("事件: 已注册 {}", key),
        ServiceEvent::Unregistered(key) => info!("事件: 已注销 {}", key),
    });

    for key in [
        ServiceKey::of::<AudioMixer>(),
        ServiceKey::of::<MusicPlayer>(),
        ServiceKey::of::<Playlist>(),
    ] {
        registry.subscribe(key, observer.clone());
    }
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
