//! Concurrent process runner with graceful shutdown.
//!
//! Orchestrates the long-running consumer loops of the service: named
//! processes run concurrently until one fails or a shutdown signal arrives
//! (SIGINT/SIGTERM), then closers execute under a timeout regardless of how
//! the processes ended.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// A named long-running process: takes a cancellation token and runs until
/// cancelled or failed.
pub type AppProcess = Box<
    dyn FnOnce(CancellationToken) -> Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>>
        + Send,
>;

/// A cleanup function executed after all processes have stopped.
pub type Closer = Box<dyn FnOnce() -> Pin<Box<dyn Future<Output = Result<(), anyhow::Error>> + Send>> + Send>;

pub struct Runner {
    processes: Vec<(String, AppProcess)>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Adds a named process. If any process returns an error, all processes
    /// are cancelled and closers run.
    pub fn with_named_process(mut self, name: impl Into<String>, process: AppProcess) -> Self {
        self.processes.push((name.into(), process));
        self
    }

    /// Convenience wrapper over `with_named_process` for closures.
    pub fn with_process<F, Fut>(self, name: impl Into<String>, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.with_named_process(name, Box::new(|token| Box::pin(process(token))))
    }

    /// Adds a closer, executed after all processes have stopped regardless
    /// of outcome. All closers attempt to run even if some fail.
    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), anyhow::Error>> + Send + 'static,
    {
        self.closers.push(Box::new(|| Box::pin(closer())));
        self
    }

    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// External handle for cancelling the runner, mainly for tests.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Runs all processes to completion or shutdown, then the closers.
    /// Returns the first process error, if any.
    pub async fn run(self) -> Result<(), anyhow::Error> {
        let token = Arc::new(self.cancellation_token);
        let mut join_set = JoinSet::new();

        for (name, process) in self.processes {
            let process_token = token.clone();
            join_set.spawn(async move {
                let result = process((*process_token).clone()).await;
                (name, result)
            });
        }

        spawn_signal_handlers(token.clone());

        let mut first_error = None;
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((name, Ok(()))) => {
                    tracing::debug!(process = %name, "Process completed");
                }
                Ok((name, Err(err))) => {
                    if !token.is_cancelled() {
                        tracing::error!(process = %name, error = format!("{:#}", err), "Process failed");
                        first_error = Some(err);
                        token.cancel();
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "Process panicked");
                    if !token.is_cancelled() {
                        token.cancel();
                    }
                }
            }

            if token.is_cancelled() {
                break;
            }
        }

        // Wait for remaining tasks after cancellation
        join_set.shutdown().await;

        if !self.closers.is_empty() {
            tracing::info!(timeout = ?self.closer_timeout, "Running closers");
            let result = tokio::time::timeout(self.closer_timeout, run_closers(self.closers)).await;
            match result {
                Ok(()) => tracing::info!("All closers completed"),
                Err(_) => tracing::error!(timeout = ?self.closer_timeout, "Closers timed out"),
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn spawn_signal_handlers(token: Arc<CancellationToken>) {
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received shutdown signal");
                ctrl_c_token.cancel();
            }
            Err(err) => {
                tracing::error!(error = %err, "Error setting up signal handler");
            }
        }
    });

    #[cfg(unix)]
    {
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    tracing::info!("Received SIGTERM signal");
                    token.cancel();
                }
                Err(err) => {
                    tracing::error!(error = %err, "Error setting up SIGTERM handler");
                }
            }
        });
    }
}

async fn run_closers(closers: Vec<Closer>) {
    let mut closer_set = JoinSet::new();

    for closer in closers {
        closer_set.spawn(async move { closer().await });
    }

    while let Some(result) = closer_set.join_next().await {
        match result {
            Ok(Ok(())) => tracing::debug!("Closer completed"),
            Ok(Err(err)) => tracing::error!(error = format!("{:#}", err), "Closer failed"),
            Err(err) => tracing::error!(error = %err, "Closer panicked"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_cancellation_stops_processes_and_runs_closers() {
        let closer_called = Arc::new(AtomicBool::new(false));
        let closer_flag = closer_called.clone();

        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let result = Runner::new()
            .with_cancellation_token(token)
            .with_process("loop", |ctx| async move {
                ctx.cancelled().await;
                Ok(())
            })
            .with_closer(move || async move {
                closer_flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .run()
            .await;

        assert!(result.is_ok());
        assert!(closer_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failing_process_cancels_the_rest() {
        let result = Runner::new()
            .with_process("failing", |_ctx| async move {
                anyhow::bail!("consumer exploded")
            })
            .with_process("healthy", |ctx| async move {
                ctx.cancelled().await;
                Ok(())
            })
            .run()
            .await;

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("consumer exploded"));
    }

    #[tokio::test]
    async fn test_all_closers_run_even_when_one_fails() {
        let run_count = Arc::new(AtomicUsize::new(0));
        let first = run_count.clone();
        let second = run_count.clone();

        let result = Runner::new()
            .with_closer(move || async move {
                first.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("cleanup failed")
            })
            .with_closer(move || async move {
                second.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .run()
            .await;

        assert!(result.is_ok());
        assert_eq!(run_count.load(Ordering::SeqCst), 2);
    }
}
