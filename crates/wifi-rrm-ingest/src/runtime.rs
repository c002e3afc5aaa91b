//! Worker runtime with named threads.
//!
//! Thread names show up in logs, debuggers and `top -H`, which makes it easy
//! to tell ingestion workers apart from the rest of the process.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::runtime::{Builder, Runtime};

use crate::ingest::{IngestConfig, IngestError};

/// Build a multi-threaded runtime whose worker threads are named
/// `<worker_name>-worker-<n>`, numbered from 1.
pub fn worker_runtime(config: &IngestConfig) -> Result<Runtime, IngestError> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(config.worker_threads.max(1))
        .thread_name_fn(thread_namer(&config.worker_name))
        .enable_all()
        .build()?;
    Ok(runtime)
}

fn thread_namer(prefix: &str) -> impl Fn() -> String + Send + Sync + 'static {
    let prefix = format!("{prefix}-worker-");
    let next = AtomicUsize::new(1);
    move || format!("{prefix}{}", next.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_names_are_numbered() {
        let namer = thread_namer("rrm");
        assert_eq!(namer(), "rrm-worker-1");
        assert_eq!(namer(), "rrm-worker-2");
    }

    #[test]
    fn test_runtime_uses_named_workers() {
        let config = IngestConfig {
            worker_name: "test-ingest".to_string(),
            worker_threads: 1,
            ..IngestConfig::default()
        };
        let runtime = worker_runtime(&config).unwrap();

        let name = runtime
            .block_on(runtime.spawn(async {
                std::thread::current().name().map(String::from)
            }))
            .unwrap()
            .unwrap();
        assert!(name.starts_with("test-ingest-worker-"), "{name}");
    }
}
