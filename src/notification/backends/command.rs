//! 外部命令后端
//!
//! 以 `<cmd> --data <payload-json> -- <domain> <action>` 的形式启动子进程，
//! spawn 后立即返回，不等待脚本执行完成。子进程由后台线程回收。

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, warn};

use crate::notification::channel::{ScriptCall, ScriptDispatcher};

/// 外部命令后端
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    command: PathBuf,
    /// 尚未回收的子进程数
    running: Arc<AtomicUsize>,
}

impl CommandDispatcher {
    /// 使用给定命令（名称或路径）
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            running: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 在 PATH 中查找命令，找不到时原样使用
    pub fn locate(command: &str) -> Self {
        match which::which(command) {
            Ok(path) => Self::new(path),
            Err(_) => Self::new(command),
        }
    }

    pub fn command(&self) -> &PathBuf {
        &self.command
    }

    /// 尚未退出（或尚未回收）的子进程数
    pub fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// 构建命令行参数
    ///
    /// `--` 之后是位置参数，以 `-` 开头的脚本名不会被当作选项。
    fn args(call: &ScriptCall) -> Result<Vec<String>> {
        let payload = serde_json::to_string(&call.payload).context("Failed to serialize payload")?;
        Ok(vec![
            "--data".to_string(),
            payload,
            "--".to_string(),
            call.domain.clone(),
            call.action.clone(),
        ])
    }

    /// 在后台线程等待子进程退出，非零退出码记为 warn
    fn reap(&self, mut child: Child, service: String) {
        let running = self.running.clone();
        let command = self.command.display().to_string();
        let pid = child.id();

        let reaper = thread::Builder::new()
            .name(format!("notiscript-reap-{}", pid))
            .spawn(move || {
                match child.wait() {
                    Ok(status) if status.success() => {
                        debug!(command = %command, service = %service, pid, "Script command finished");
                    }
                    Ok(status) => {
                        warn!(command = %command, service = %service, pid, status = %status, "Script command exited with failure");
                    }
                    Err(e) => {
                        warn!(command = %command, service = %service, pid, error = %e, "Failed to wait for script command");
                    }
                }
                running.fetch_sub(1, Ordering::SeqCst);
            });

        if let Err(e) = reaper {
            self.running.fetch_sub(1, Ordering::SeqCst);
            warn!(pid, error = %e, "Failed to start reaper thread for script command");
        }
    }
}

impl ScriptDispatcher for CommandDispatcher {
    fn name(&self) -> &str {
        "command"
    }

    fn invoke(&self, call: &ScriptCall) -> Result<()> {
        let args = Self::args(call)?;

        // spawn() 不阻塞调用方
        let child = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.command.display()))?;

        debug!(
            command = %self.command.display(),
            service = %call.service_name(),
            pid = child.id(),
            "Script command spawned"
        );

        self.running.fetch_add(1, Ordering::SeqCst);
        self.reap(child, call.service_name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_args_layout() {
        let payload = json!({"message": "hi"}).as_object().cloned().unwrap();
        let call = ScriptCall::script("doorbell", payload);

        let args = CommandDispatcher::args(&call).unwrap();
        assert_eq!(
            args,
            vec!["--data", r#"{"message":"hi"}"#, "--", "script", "doorbell"]
        );
    }

    #[test]
    fn test_dash_prefixed_action_stays_positional() {
        for action in ["--help", "--data"] {
            let call = ScriptCall::script(action, Default::default());
            let args = CommandDispatcher::args(&call).unwrap();

            let separator = args.iter().position(|a| a == "--").unwrap();
            assert_eq!(args[separator + 1..], ["script", action]);
            assert_eq!(args.iter().filter(|a| a.as_str() == "--data").count(), 1);
        }
    }

    #[test]
    fn test_missing_command_is_submission_error() {
        let dispatcher = CommandDispatcher::new("/nonexistent/notiscript-test-command");
        let call = ScriptCall::script("s", Default::default());

        let err = dispatcher.invoke(&call).unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_command_spawns() {
        let dispatcher = CommandDispatcher::locate("true");
        let call = ScriptCall::script("s", Default::default());
        assert!(dispatcher.invoke(&call).is_ok());
        wait_until_reaped(&dispatcher);
    }

    #[cfg(unix)]
    fn wait_until_reaped(dispatcher: &CommandDispatcher) {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while dispatcher.running() > 0 {
            assert!(
                std::time::Instant::now() < deadline,
                "{} child processes never reaped",
                dispatcher.running()
            );
            thread::sleep(std::time::Duration::from_millis(20));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_finished_children_are_reaped() {
        let dispatcher = CommandDispatcher::locate("true");
        let call = ScriptCall::script("s", Default::default());

        for _ in 0..20 {
            dispatcher.invoke(&call).unwrap();
        }
        wait_until_reaped(&dispatcher);
        assert_eq!(dispatcher.running(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_child_is_reaped() {
        let dispatcher = CommandDispatcher::locate("false");
        dispatcher
            .invoke(&ScriptCall::script("s", Default::default()))
            .unwrap();
        wait_until_reaped(&dispatcher);
    }

    #[test]
    fn test_spawn_failure_leaves_nothing_running() {
        let dispatcher = CommandDispatcher::new("/nonexistent/notiscript-test-command");
        assert!(dispatcher.invoke(&ScriptCall::script("s", Default::default())).is_err());
        assert_eq!(dispatcher.running(), 0);
    }

    #[test]
    fn test_locate_falls_back_to_name() {
        let dispatcher = CommandDispatcher::locate("notiscript-definitely-missing");
        assert_eq!(dispatcher.command(), &PathBuf::from("notiscript-definitely-missing"));
    }
}
