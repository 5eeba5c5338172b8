// Process lifecycle - the ordered list of shutdown hooks owned by main.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type Hook = Box<dyn FnOnce() -> HookFuture + Send>;

/// Runs registered shutdown hooks exactly once, in registration order.
pub struct Lifecycle {
    hooks: Mutex<Vec<(String, Hook)>>,
    shutting_down: AtomicBool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            hooks: Mutex::new(Vec::new()),
            shutting_down: AtomicBool::new(false),
        }
    }

    pub async fn on_shutdown<F, Fut>(&self, name: impl Into<String>, hook: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let hook: Hook = Box::new(move || Box::pin(hook()));
        self.hooks.lock().await.push((name.into(), hook));
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Run every hook. Returns `false` if shutdown already ran.
    pub async fn shutdown(&self) -> bool {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return false;
        }

        let hooks = std::mem::take(&mut *self.hooks.lock().await);
        for (name, hook) in hooks {
            tracing::info!(hook = %name, "Running shutdown hook");
            hook().await;
        }
        true
    }
}
