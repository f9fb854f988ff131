//! Supervised background tasks
//!
//! Detached work (message ingestion, button clicks) runs here so that an
//! error or panic is logged at the task boundary instead of vanishing.

use anyhow::Result;
use log::{debug, error, warn};
use std::any::Any;
use std::future::Future;
use tokio::task::JoinHandle;

/// Spawn `work` onto the runtime and log how it ended
///
/// The returned handle resolves once the outcome has been logged; it never
/// carries the inner error or panic.
pub fn spawn_supervised<F>(label: impl Into<String>, work: F) -> JoinHandle<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    let label = label.into();
    let inner = tokio::spawn(work);

    tokio::spawn(async move {
        match inner.await {
            Ok(Ok(())) => debug!("[{label}] task finished"),
            Ok(Err(e)) => error!("[{label}] task failed: {e:#}"),
            Err(join_err) if join_err.is_panic() => {
                let payload = join_err.into_panic();
                error!("[{label}] task panicked: {}", panic_message(payload.as_ref()));
            }
            Err(join_err) => warn!("[{label}] task cancelled: {join_err}"),
        }
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_successful_task_runs() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();

        spawn_supervised("ok", async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();

        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_error_is_contained() {
        let handle = spawn_supervised("failing", async { Err::<(), _>(anyhow::anyhow!("boom")) });
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let handle = spawn_supervised("panicking", async {
            if true {
                panic!("handler exploded");
            }
            Ok::<(), anyhow::Error>(())
        });
        assert!(handle.await.is_ok());
    }

    #[test]
    fn test_panic_message_variants() {
        let static_payload: Box<dyn Any + Send> = Box::new("static");
        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other_payload: Box<dyn Any + Send> = Box::new(7u32);

        assert_eq!(panic_message(static_payload.as_ref()), "static");
        assert_eq!(panic_message(owned_payload.as_ref()), "owned");
        assert_eq!(panic_message(other_payload.as_ref()), "non-string panic payload");
    }
}
