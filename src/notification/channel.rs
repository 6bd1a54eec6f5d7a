//! 通知入口与脚本调用的 trait 定义

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::request::NotificationRequest;
use super::transformer::OutboundPayload;

/// 脚本调用所在的服务域
pub const SCRIPT_DOMAIN: &str = "script";

/// 一次脚本调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptCall {
    /// 服务域，固定为 "script"
    pub domain: String,
    /// 脚本名
    pub action: String,
    /// 传给脚本的数据
    pub payload: OutboundPayload,
    /// 是否等待执行完成（总是 false）
    pub blocking: bool,
}

impl ScriptCall {
    /// 创建非阻塞的脚本调用
    pub fn script(action: impl Into<String>, payload: OutboundPayload) -> Self {
        Self {
            domain: SCRIPT_DOMAIN.to_string(),
            action: action.into(),
            payload,
            blocking: false,
        }
    }

    /// 完整服务名，如 `script.doorbell`
    pub fn service_name(&self) -> String {
        format!("{}.{}", self.domain, self.action)
    }

    /// payload 的紧凑 JSON 文本（用于日志）
    pub fn payload_json(&self) -> String {
        serde_json::to_string(&self.payload).unwrap_or_default()
    }
}

/// 通知入口 trait
///
/// 实现者必须吸收所有投递错误，调用方永远看不到失败。
pub trait NotificationSink: Send + Sync {
    /// 通知器名称
    fn name(&self) -> &str;

    /// 发送通知（尽力而为）
    fn send(&self, request: NotificationRequest);
}

/// 脚本执行设施 trait
pub trait ScriptDispatcher: Send + Sync {
    /// 后端名称（用于日志）
    fn name(&self) -> &str;

    /// 提交调用后立即返回，不等待脚本执行完成
    fn invoke(&self, call: &ScriptCall) -> Result<()>;
}
