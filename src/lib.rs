//! notiscript - 把通知调用路由到脚本，并按配置重塑字段

pub mod cli;
pub mod notification;

pub use notification::{
    AppConfig, DispatchConfig, DispatchReporter, NotificationRequest, NotificationSink,
    NotifierConfig, NotifierRegistry, ResolvedRouting, ScriptCall, ScriptDispatcher,
    ScriptNotifier, TracingReporter,
};
