//! 调用诊断上报

use tracing::{debug, error};

use super::channel::ScriptCall;

/// 诊断上报能力，由构造方注入通知器
pub trait DispatchReporter: Send + Sync {
    /// 即将提交调用
    fn dispatching(&self, call: &ScriptCall);

    /// 提交失败（错误已被吸收）
    fn dispatch_failed(&self, call: &ScriptCall, error: &anyhow::Error);
}

/// 默认实现：写入 tracing 日志
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl DispatchReporter for TracingReporter {
    fn dispatching(&self, call: &ScriptCall) {
        debug!(
            service = %call.service_name(),
            payload = %call.payload_json(),
            "Calling script"
        );
    }

    fn dispatch_failed(&self, call: &ScriptCall, error: &anyhow::Error) {
        error!(
            service = %call.service_name(),
            payload = %call.payload_json(),
            error = %format!("{:#}", error),
            "Failed to call script"
        );
    }
}
