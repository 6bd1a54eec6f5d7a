//! notiscript CLI
//!
//! 把通知请求路由到脚本动作

use anyhow::Result;
use clap::{Parser, Subcommand};
use notiscript::cli::{handle_notifiers, handle_preview, handle_send, SendArgs};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "notiscript")]
#[command(about = "notiscript - 将通知路由到脚本并重塑字段")]
#[command(version)]
struct Cli {
    /// 配置文件路径 (默认: <config_dir>/notiscript/notifiers.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 发送通知到对应脚本
    Send {
        #[command(flatten)]
        args: SendArgs,
        /// Dry-run 模式（只打印不发送）
        #[arg(long)]
        dry_run: bool,
    },
    /// 打印将要发出的脚本调用，不发送
    Preview(SendArgs),
    /// 列出已配置的通知器
    Notifiers {
        /// 输出 JSON 格式
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=notiscript=debug notiscript send -n doorbell -m hi
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notiscript=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Send { args, dry_run } => {
            handle_send(config, args, dry_run).await?;
        }
        Commands::Preview(args) => {
            println!("{}", handle_preview(config, args)?);
        }
        Commands::Notifiers { json } => {
            println!("{}", handle_notifiers(config, json)?);
        }
    }

    Ok(())
}
