//! 通知器构建 - 根据配置创建后端和通知器注册表

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use super::backends::{CommandDispatcher, LogDispatcher, WebhookConfig, WebhookDispatcher};
use super::channel::{NotificationSink, ScriptDispatcher};
use super::config::{AppConfig, DispatchConfig};
use super::notifier::ScriptNotifier;
use super::reporter::{DispatchReporter, TracingReporter};

/// 已构建的后端
///
/// 保留 webhook 的具体类型，以便进程退出前等待未完成的请求。
#[derive(Clone)]
pub struct DispatchHandle {
    dispatcher: Arc<dyn ScriptDispatcher>,
    webhook: Option<Arc<WebhookDispatcher>>,
}

impl DispatchHandle {
    pub fn dispatcher(&self) -> Arc<dyn ScriptDispatcher> {
        self.dispatcher.clone()
    }

    /// 等待后台请求结束
    pub async fn settle(&self) {
        if let Some(webhook) = &self.webhook {
            webhook.wait_pending().await;
        }
    }
}

/// 根据配置创建后端
pub fn build_dispatcher(config: &DispatchConfig) -> Result<DispatchHandle> {
    let handle = match config {
        DispatchConfig::Log => DispatchHandle {
            dispatcher: Arc::new(LogDispatcher::new()),
            webhook: None,
        },
        DispatchConfig::Command { command } => {
            let dispatcher = CommandDispatcher::locate(command);
            info!(command = %dispatcher.command().display(), "Using command dispatch");
            DispatchHandle {
                dispatcher: Arc::new(dispatcher),
                webhook: None,
            }
        }
        DispatchConfig::Webhook {
            base_url,
            token,
            timeout_secs,
        } => {
            info!(base_url = %base_url, "Using webhook dispatch");
            let webhook = Arc::new(WebhookDispatcher::new(WebhookConfig {
                base_url: base_url.clone(),
                token: token.clone(),
                timeout_secs: *timeout_secs,
            })?);
            DispatchHandle {
                dispatcher: webhook.clone(),
                webhook: Some(webhook),
            }
        }
    };

    Ok(handle)
}

/// 通知器注册表（按名称索引）
#[derive(Clone, Default)]
pub struct NotifierRegistry {
    notifiers: BTreeMap<String, ScriptNotifier>,
}

impl NotifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为配置中的每个通知器创建实例，共享同一个后端和上报器
    pub fn from_config(
        config: &AppConfig,
        dispatcher: Arc<dyn ScriptDispatcher>,
        reporter: Arc<dyn DispatchReporter>,
    ) -> Result<Self> {
        config.validate()?;

        let mut registry = Self::new();
        for notifier_config in &config.notifiers {
            info!(
                notifier = %notifier_config.name,
                script_suffix = ?notifier_config.script_suffix,
                script_fields = notifier_config.script_fields.len(),
                "Setting up notifier"
            );
            registry.register(ScriptNotifier::new(
                notifier_config.clone(),
                dispatcher.clone(),
                reporter.clone(),
            ))?;
        }
        Ok(registry)
    }

    /// 使用默认上报器
    pub fn with_tracing(config: &AppConfig, dispatcher: Arc<dyn ScriptDispatcher>) -> Result<Self> {
        Self::from_config(config, dispatcher, Arc::new(TracingReporter))
    }

    /// 注册通知器，名称重复时报错
    pub fn register(&mut self, notifier: ScriptNotifier) -> Result<()> {
        let name = notifier.name().to_string();
        if self.notifiers.contains_key(&name) {
            anyhow::bail!("notifier '{}' already registered", name);
        }
        self.notifiers.insert(name, notifier);
        Ok(())
    }

    /// 对所有通知器设置 dry-run
    pub fn with_dry_run(self, dry_run: bool) -> Self {
        Self {
            notifiers: self
                .notifiers
                .into_iter()
                .map(|(name, notifier)| (name, notifier.with_dry_run(dry_run)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ScriptNotifier> {
        self.notifiers.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.notifiers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}
