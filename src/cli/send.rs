//! send / preview 命令处理

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::notification::{
    build_dispatcher, prepare_call, AppConfig, NotificationRequest, NotificationSink,
    NotifierRegistry,
};

use super::output::format_json;

/// send / preview 共用参数
#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// 通知器名称
    #[arg(long, short)]
    pub notifier: String,
    /// 消息内容
    #[arg(long, short, default_value = "")]
    pub message: String,
    /// 标题
    #[arg(long)]
    pub title: Option<String>,
    /// 目标
    #[arg(long)]
    pub target: Option<String>,
    /// data（JSON 对象）
    #[arg(long)]
    pub data: Option<String>,
    /// 额外字段 KEY=VALUE，VALUE 优先按 JSON 解析
    #[arg(long = "extra", value_name = "KEY=VALUE")]
    pub extra: Vec<String>,
}

impl SendArgs {
    /// 转换为通知请求
    pub fn to_request(&self) -> Result<NotificationRequest> {
        let mut request = NotificationRequest::new(self.message.clone());
        request.title = self.title.clone();
        request.target = self.target.clone();

        if let Some(raw) = &self.data {
            request.data = Some(parse_data(raw)?);
        }

        for entry in &self.extra {
            let (key, value) = parse_extra(entry)?;
            request.extra.insert(key, value);
        }

        Ok(request)
    }
}

/// 解析 --data
fn parse_data(raw: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(raw).context("--data must be valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => anyhow::bail!("--data must be a JSON object, got {}", other),
    }
}

/// 解析 --extra KEY=VALUE
fn parse_extra(entry: &str) -> Result<(String, Value)> {
    let (key, raw) = entry
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("--extra expects KEY=VALUE, got '{}'", entry))?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("--extra key must not be empty");
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// 加载配置（未指定路径时使用默认路径）
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => AppConfig::default_path()?,
    };
    AppConfig::load(&path)
}

/// 处理 send 命令
pub async fn handle_send(config_path: Option<&Path>, args: SendArgs, dry_run: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let request = args.to_request()?;

    let dispatch = build_dispatcher(&config.dispatch)?;
    let registry = NotifierRegistry::with_tracing(&config, dispatch.dispatcher())?.with_dry_run(dry_run);

    let notifier = registry.get(&args.notifier).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown notifier '{}' (configured: {})",
            args.notifier,
            registry.names().join(", ")
        )
    })?;

    info!(notifier = %args.notifier, "Sending notification");
    notifier.send(request);

    dispatch.settle().await;
    Ok(())
}

/// 处理 preview 命令：打印解析后的调用，不提交
pub fn handle_preview(config_path: Option<&Path>, args: SendArgs) -> Result<String> {
    let config = load_config(config_path)?;
    let notifier_config = config
        .notifier(&args.notifier)
        .ok_or_else(|| anyhow::anyhow!("Unknown notifier '{}'", args.notifier))?;

    let call = prepare_call(notifier_config, args.to_request()?);
    Ok(format_json(&call))
}
