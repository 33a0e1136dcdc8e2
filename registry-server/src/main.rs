//! 治疗登记服务主程序
//!
//! 加载配置、装配协作者，然后逐行执行 JSON 命令脚本（文件或标准输入）

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::CommandExecutor;
use registry_admin::{bootstrap_logging, init_logging, ConfigManager};
use registry_core::{EventSink, NoopEventSink};
use registry_engine::{Registry, SharedRegistry};
use registry_integration::{event_channel, InMemoryLedger, TracingSubscriber};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

/// 登记服务命令行参数
#[derive(Parser, Debug)]
#[command(name = "registry-server")]
#[command(about = "患者、从业者与治疗前后影像登记服务")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 命令脚本路径，缺省时读取标准输入
    #[arg(short, long)]
    script: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 全局日志依赖配置，加载配置期间先用临时订阅器
    let config = {
        let _bootstrap = bootstrap_logging(args.log_level.as_deref());
        let config_manager = ConfigManager::new(args.config.as_deref())?;
        if let Some(level) = &args.log_level {
            let mut config = config_manager.get_config().await;
            config.logging.level = level.clone();
            config_manager.update_config(config).await?;
        }
        config_manager.get_config().await
    };

    // 初始化日志
    init_logging(&config.logging)?;
    info!("启动登记服务: {}", config.registry.name);

    let ledger = Arc::new(InMemoryLedger::with_balances(
        config
            .ledger
            .opening_balances
            .iter()
            .map(|balance| (balance.identity.as_str(), balance.amount)),
    ));
    info!(
        "账本已载入 {} 个初始余额",
        config.ledger.opening_balances.len()
    );

    let mut dispatcher_handle = None;
    let events: Arc<dyn EventSink> = if config.events.enabled {
        let (sink, mut dispatcher) = event_channel(config.events.source.clone());
        if config.events.log_events {
            dispatcher.subscribe(Arc::new(TracingSubscriber));
        }
        dispatcher_handle = Some(dispatcher.spawn());
        Arc::new(sink)
    } else {
        Arc::new(NoopEventSink)
    };

    let registry = SharedRegistry::new(Registry::new(ledger.clone(), events));
    let executor = CommandExecutor::new(registry.clone(), ledger);

    let processed = match &args.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open script {}", path))?;
            run_script(&executor, BufReader::new(file)).await?
        }
        None => run_script(&executor, BufReader::new(tokio::io::stdin())).await?,
    };

    let stats = registry.stats().await;
    info!("已处理 {} 条命令, 统计: {:?}", processed, stats);

    // 丢弃登记表以关闭事件通道，等待剩余事件投递完成
    drop(executor);
    drop(registry);
    if let Some(handle) = dispatcher_handle {
        let dispatched = handle.await.context("Event dispatcher task failed")?;
        info!("已分发 {} 个事件", dispatched);
    }

    Ok(())
}

/// 逐行执行命令，返回处理的命令数
async fn run_script<R>(executor: &CommandExecutor, reader: R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stdout = tokio::io::stdout();
    let mut processed = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let response = executor.execute_line(line).await;
        let mut output = serde_json::to_string(&response)?;
        output.push('\n');
        stdout.write_all(output.as_bytes()).await?;
        processed += 1;
    }

    stdout.flush().await?;
    Ok(processed)
}
