//! 通知适配层 - 把通用通知请求路由到脚本动作
//!
//! # 流程
//! 1. `resolver` 决定脚本名和字段映射，并剥离控制参数
//! 2. `transformer` 构建发给脚本的 payload
//! 3. `ScriptNotifier` 通过 `ScriptDispatcher` 提交调用（不等待完成），失败只记录不抛出
//!
//! # 使用示例
//! ```ignore
//! use notiscript::notification::{LogDispatcher, NotificationRequest, NotificationSink, NotifierConfig, ScriptNotifier, TracingReporter};
//! use std::sync::Arc;
//!
//! let notifier = ScriptNotifier::new(
//!     NotifierConfig::new("doorbell").with_script_field("message", "msg"),
//!     Arc::new(LogDispatcher::new()),
//!     Arc::new(TracingReporter),
//! );
//! notifier.send(NotificationRequest::new("Someone is at the door"));
//! ```

pub mod backends;
pub mod builder;
pub mod channel;
pub mod config;
pub mod notifier;
pub mod reporter;
pub mod request;
pub mod resolver;
pub mod transformer;

pub use backends::{CommandDispatcher, LogDispatcher, WebhookConfig, WebhookDispatcher};
pub use builder::{build_dispatcher, DispatchHandle, NotifierRegistry};
pub use channel::{NotificationSink, ScriptCall, ScriptDispatcher, SCRIPT_DOMAIN};
pub use config::{AppConfig, DispatchConfig, FieldMapping, NotifierConfig};
pub use notifier::{prepare_call, ScriptNotifier};
pub use reporter::{DispatchReporter, TracingReporter};
pub use request::{
    is_control_parameter, strip_control_parameters, NotificationRequest, CONTROL_PARAMETERS,
    CONTROL_SCRIPT_FIELDS, CONTROL_SCRIPT_SUFFIX,
};
pub use resolver::{resolve, ResolvedRouting};
pub use transformer::{transform, OutboundPayload, NOTIFIER_FIELDS_KEY};
