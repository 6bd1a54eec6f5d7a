//! HTTP 服务调用后端
//!
//! POST `{base_url}/api/services/{domain}/{action}`，body 为 payload JSON。
//! domain 和 action 各自按单个路径段编码，不能改变请求的目标路径。
//! 请求在 tokio 任务中执行，`invoke` 只负责提交。

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::notification::channel::{ScriptCall, ScriptDispatcher};

/// Webhook 后端配置
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// 服务地址 (如 http://localhost:8123)
    pub base_url: String,
    /// Bearer token（可选）
    pub token: Option<String>,
    /// 超时时间 (秒)
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8123".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// HTTP 服务调用后端
#[derive(Debug)]
pub struct WebhookDispatcher {
    client: Client,
    config: WebhookConfig,
    base_url: Url,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl WebhookDispatcher {
    pub fn new(config: WebhookConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            anyhow::bail!("base_url is required");
        }

        let base_url = Url::parse(config.base_url.trim())
            .with_context(|| format!("Invalid base_url '{}'", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("base_url '{}' cannot carry a path", config.base_url);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            config,
            base_url,
            pending: Mutex::new(Vec::new()),
        })
    }

    /// 调用对应的服务 URL
    ///
    /// `/`、`?`、`#` 会被百分号编码；`.`、`..` 和空段直接拒绝。
    pub fn service_url(&self, call: &ScriptCall) -> Result<Url> {
        for segment in [&call.domain, &call.action] {
            if segment.is_empty() || segment == "." || segment == ".." {
                anyhow::bail!("Invalid service path segment '{}'", segment);
            }
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("base_url cannot carry a path"))?
            .pop_if_empty()
            .extend(["api", "services", call.domain.as_str(), call.action.as_str()]);
        Ok(url)
    }

    /// 等待所有已提交的请求结束（短生命周期进程退出前调用）
    pub async fn wait_pending(&self) {
        let handles = match self.pending.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Script call task aborted");
            }
        }
    }
}

impl ScriptDispatcher for WebhookDispatcher {
    fn name(&self) -> &str {
        "webhook"
    }

    fn invoke(&self, call: &ScriptCall) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .context("Webhook dispatch requires a running tokio runtime")?;

        let url = self.service_url(call)?;
        let mut request = self.client.post(url.clone()).json(&call.payload);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let service = call.service_name();
        let task = runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(service = %service, status = %response.status(), "Script call accepted");
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    error!(service = %service, status = %status, body = %body, "Script call rejected");
                }
                Err(e) => {
                    error!(service = %service, url = %url, error = %e, "Script call failed");
                }
            }
        });

        let mut pending = self
            .pending
            .lock()
            .map_err(|_| anyhow::anyhow!("pending task list poisoned"))?;
        pending.retain(|handle| !handle.is_finished());
        pending.push(task);
        Ok(())
    }
}
