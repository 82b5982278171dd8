//! 后台任务管理
//!
//! 楼面节点有三个常驻任务，全部挂在消息总线的 shutdown token 上：
//!
//! | 任务 | 类型 | 说明 |
//! |------|------|------|
//! | change_forwarder | [`TaskKind::Worker`] | 引擎变更 → 总线 |
//! | feed_listener | [`TaskKind::Listener`] | 远端变更 → 引擎 |
//! | timer_tick | [`TaskKind::Periodic`] | 占用计时器刷新 |

use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Worker,
    Listener,
    Periodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskKind::Worker => "worker",
            TaskKind::Listener => "listener",
            TaskKind::Periodic => "periodic",
        })
    }
}

struct Running {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// Per-kind counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskSummary {
    pub workers: usize,
    pub listeners: usize,
    pub periodic: usize,
}

/// 后台任务集合
///
/// 任务共享一个取消令牌；[`BackgroundTasks::shutdown`] 取消后逐个等待退出。
pub struct BackgroundTasks {
    running: Vec<Running>,
    token: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::with_token(CancellationToken::new())
    }

    /// 使用外部令牌 (消息总线的 shutdown token)
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            running: Vec::new(),
            token,
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// 启动任务，panic 被捕获并记录，不会拖垮进程
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.token.clone();
        let handle = tokio::spawn(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(()) if token.is_cancelled() => {}
                Ok(()) => {
                    tracing::warn!(task = name, %kind, "Background task exited before shutdown");
                }
                Err(panic) => {
                    tracing::error!(
                        task = name,
                        %kind,
                        panic = %panic_message(panic.as_ref()),
                        "Background task panicked"
                    );
                }
            }
        });

        tracing::debug!(task = name, %kind, "Background task started");
        self.running.push(Running { name, kind, handle });
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    pub fn summary(&self) -> TaskSummary {
        self.running
            .iter()
            .fold(TaskSummary::default(), |mut acc, task| {
                match task.kind {
                    TaskKind::Worker => acc.workers += 1,
                    TaskKind::Listener => acc.listeners += 1,
                    TaskKind::Periodic => acc.periodic += 1,
                }
                acc
            })
    }

    pub fn log_summary(&self) {
        let s = self.summary();
        tracing::info!(
            total = self.running.len(),
            workers = s.workers,
            listeners = s.listeners,
            periodic = s.periodic,
            "Background tasks running"
        );
    }

    /// Tasks that already exited while the token is still live
    pub fn finished(&self) -> Vec<&'static str> {
        self.running
            .iter()
            .filter(|t| t.handle.is_finished())
            .map(|t| t.name)
            .collect()
    }

    /// 取消所有任务并等待退出
    pub async fn shutdown(self) {
        tracing::info!(count = self.running.len(), "Stopping background tasks");
        self.token.cancel();

        for task in self.running {
            if let Err(e) = task.handle.await {
                tracing::error!(task = task.name, error = ?e, "Background task join failed");
            }
        }
        tracing::info!("Background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
