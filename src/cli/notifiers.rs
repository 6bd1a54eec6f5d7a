//! notifiers 命令处理

use anyhow::Result;
use std::path::Path;

use super::output::format_notifiers;
use super::send::load_config;

/// 列出已配置的通知器
pub fn handle_notifiers(config_path: Option<&Path>, json: bool) -> Result<String> {
    let config = load_config(config_path)?;
    if config.notifiers.is_empty() && !json {
        return Ok("No notifiers configured".to_string());
    }
    Ok(format_notifiers(&config.notifiers, json))
}
