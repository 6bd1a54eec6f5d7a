//! 脚本通知器 - 组合路由解析与 payload 构建，并提交脚本调用

use std::sync::Arc;

use super::channel::{NotificationSink, ScriptCall, ScriptDispatcher};
use super::config::NotifierConfig;
use super::reporter::DispatchReporter;
use super::request::NotificationRequest;
use super::{resolver, transformer};

/// 根据配置把一个请求转换为脚本调用（纯函数）
pub fn prepare_call(config: &NotifierConfig, mut request: NotificationRequest) -> ScriptCall {
    let routing = resolver::resolve(config, &mut request);
    let payload = transformer::transform(&request, &routing.field_mapping);
    ScriptCall::script(routing.script_id, payload)
}

/// 脚本通知器
///
/// 配置在构造后只读，可在多个线程间共享（`Clone` 只复制 `Arc`）。
#[derive(Clone)]
pub struct ScriptNotifier {
    config: Arc<NotifierConfig>,
    dispatcher: Arc<dyn ScriptDispatcher>,
    reporter: Arc<dyn DispatchReporter>,
    dry_run: bool,
}

impl ScriptNotifier {
    pub fn new(
        config: NotifierConfig,
        dispatcher: Arc<dyn ScriptDispatcher>,
        reporter: Arc<dyn DispatchReporter>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
            reporter,
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// 解析并构建调用，不提交
    pub fn prepare(&self, request: NotificationRequest) -> ScriptCall {
        prepare_call(&self.config, request)
    }
}

impl NotificationSink for ScriptNotifier {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn send(&self, request: NotificationRequest) {
        let call = self.prepare(request);
        self.reporter.dispatching(&call);

        if self.dry_run {
            eprintln!("[DRY-RUN] Would call {} via {}", call.service_name(), self.dispatcher.name());
            eprintln!(
                "[DRY-RUN] Payload: {}",
                serde_json::to_string_pretty(&call.payload).unwrap_or_default()
            );
            return;
        }

        if let Err(e) = self.dispatcher.invoke(&call) {
            self.reporter.dispatch_failed(&call, &e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 记录调用的 mock 后端
    struct MockDispatcher {
        calls: Mutex<Vec<ScriptCall>>,
        fail: bool,
    }

    impl MockDispatcher {
        fn new(fail: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail,
            }
        }

        fn calls(&self) -> Vec<ScriptCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ScriptDispatcher for MockDispatcher {
        fn name(&self) -> &str {
            "mock"
        }

        fn invoke(&self, call: &ScriptCall) -> Result<()> {
            self.calls.lock().unwrap().push(call.clone());
            if self.fail {
                anyhow::bail!("script engine unavailable");
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingReporter {
        dispatching: AtomicUsize,
        failed: AtomicUsize,
    }

    impl DispatchReporter for CountingReporter {
        fn dispatching(&self, _call: &ScriptCall) {
            self.dispatching.fetch_add(1, Ordering::SeqCst);
        }

        fn dispatch_failed(&self, _call: &ScriptCall, _error: &anyhow::Error) {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_send_dispatches_resolved_call() {
        let dispatcher = Arc::new(MockDispatcher::new(false));
        let reporter = Arc::new(CountingReporter::default());
        let notifier = ScriptNotifier::new(
            NotifierConfig::new("doorbell"),
            dispatcher.clone(),
            reporter.clone(),
        );

        notifier.send(NotificationRequest::new("ding"));

        let calls = dispatcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].action, "doorbell");
        assert_eq!(Value::Object(calls[0].payload.clone()), json!({"message": "ding", "data": {}}));
        assert_eq!(reporter.dispatching.load(Ordering::SeqCst), 1);
        assert_eq!(reporter.failed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispatch_failure_is_reported_not_propagated() {
        let dispatcher = Arc::new(MockDispatcher::new(true));
        let reporter = Arc::new(CountingReporter::default());
        let notifier =
            ScriptNotifier::new(NotifierConfig::new("n"), dispatcher.clone(), reporter.clone());

        notifier.send(NotificationRequest::new("x"));

        assert_eq!(dispatcher.calls().len(), 1);
        assert_eq!(reporter.failed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dry_run_does_not_dispatch() {
        let dispatcher = Arc::new(MockDispatcher::new(false));
        let reporter = Arc::new(CountingReporter::default());
        let notifier = ScriptNotifier::new(NotifierConfig::new("n"), dispatcher.clone(), reporter)
            .with_dry_run(true);

        notifier.send(NotificationRequest::new("x"));

        assert!(dispatcher.calls().is_empty());
    }

    #[test]
    fn test_prepare_call_uses_request_override() {
        let config = NotifierConfig::new("n").with_script_suffix("configured");
        let request = NotificationRequest::new("m").with_data_entry("script_suffix", json!("override"));

        let call = prepare_call(&config, request);
        assert_eq!(call.action, "override");
        assert_eq!(call.payload["data"], json!({}));
    }
}
