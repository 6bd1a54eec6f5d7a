//! 通知器配置 - 从 JSON 文件加载并校验

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 字段映射：key 为脚本字段名，value 原样作为 payload 顶层值
pub type FieldMapping = Map<String, Value>;

/// 默认 webhook 超时（秒）
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// 单个通知器的静态配置，初始化后只读
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// 通知器名称，同时是最后一级回退脚本名
    pub name: String,
    /// 配置的脚本名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_suffix: Option<String>,
    /// 配置的字段映射
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub script_fields: FieldMapping,
}

impl NotifierConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 设置脚本名
    pub fn with_script_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.script_suffix = Some(suffix.into());
        self
    }

    /// 添加一个字段映射
    pub fn with_script_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.script_fields
            .insert(key.into(), Value::String(value.into()));
        self
    }

    /// 校验配置：name 非空，script_fields 的值必须是字符串
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("notifier name must not be empty");
        }

        for (key, value) in &self.script_fields {
            if !value.is_string() {
                anyhow::bail!(
                    "notifier '{}': script_fields.{} must be a string, got {}",
                    self.name,
                    key,
                    value
                );
            }
        }

        Ok(())
    }
}

/// 脚本调用后端配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchConfig {
    /// 只记录日志
    #[default]
    Log,
    /// 调用外部命令
    Command { command: String },
    /// HTTP 服务调用
    Webhook {
        base_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// 配置文件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub notifiers: Vec<NotifierConfig>,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl AppConfig {
    /// 默认配置文件路径: <config_dir>/notiscript/notifiers.json
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Cannot find config directory"))?;
        Ok(dir.join("notiscript").join("notifiers.json"))
    }

    /// 从文件加载并校验
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// 解析 JSON 字符串并校验
    pub fn from_json(content: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for notifier in &self.notifiers {
            notifier.validate()?;
            if !seen.insert(notifier.name.as_str()) {
                anyhow::bail!("duplicate notifier name '{}'", notifier.name);
            }
        }

        if let DispatchConfig::Webhook { base_url, .. } = &self.dispatch {
            if base_url.trim().is_empty() {
                anyhow::bail!("dispatch.base_url is required for webhook dispatch");
            }
        }
        if let DispatchConfig::Command { command } = &self.dispatch {
            if command.trim().is_empty() {
                anyhow::bail!("dispatch.command is required for command dispatch");
            }
        }

        Ok(())
    }

    /// 按名称查找通知器
    pub fn notifier(&self, name: &str) -> Option<&NotifierConfig> {
        self.notifiers.iter().find(|n| n.name == name)
    }
}
