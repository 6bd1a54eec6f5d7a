//! 日志后端 - 只记录调用，不执行

use anyhow::Result;
use tracing::info;

use crate::notification::channel::{ScriptCall, ScriptDispatcher};

/// 只把调用写入日志的后端（未配置后端时的默认值）
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDispatcher;

impl LogDispatcher {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptDispatcher for LogDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    fn invoke(&self, call: &ScriptCall) -> Result<()> {
        info!(
            service = %call.service_name(),
            payload = %call.payload_json(),
            "Script call recorded (log backend)"
        );
        Ok(())
    }
}
