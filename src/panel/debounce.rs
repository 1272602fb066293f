//! Trailing-edge debounce on a dedicated worker thread.
//!
//! The worker holds at most one pending value. Every [`Debouncer::trigger`]
//! replaces it and restarts the quiet period; the callback runs once the
//! quiet period elapses with no new trigger.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub struct Debouncer<T> {
    tx: Option<Sender<T>>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the worker. `on_quiet` receives the last value triggered.
    pub fn new<F>(delay: Duration, mut on_quiet: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<T>();

        let worker = thread::spawn(move || {
            while let Ok(first) = rx.recv() {
                let mut pending = first;
                loop {
                    match rx.recv_timeout(delay) {
                        Ok(next) => pending = next,
                        Err(RecvTimeoutError::Timeout) => {
                            on_quiet(pending);
                            break;
                        }
                        // Pending value is dropped with the debouncer.
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
            }
        });

        Self {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Schedule `value`, cancelling whatever was pending.
    pub fn trigger(&self, value: T) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(value);
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        // Closing the channel stops the worker.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl FnMut(String) + Send + 'static) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        (calls, move |v: String| sink.lock().unwrap().push(v))
    }

    #[test]
    fn burst_fires_once_with_last_value() {
        let (calls, f) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(80), f);

        debouncer.trigger("a".to_string());
        debouncer.trigger("ab".to_string());
        debouncer.trigger("abc".to_string());
        thread::sleep(Duration::from_millis(400));

        assert_eq!(*calls.lock().unwrap(), vec!["abc".to_string()]);
    }

    #[test]
    fn separated_triggers_fire_separately() {
        let (calls, f) = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(30), f);

        debouncer.trigger("first".to_string());
        thread::sleep(Duration::from_millis(300));
        debouncer.trigger("second".to_string());
        thread::sleep(Duration::from_millis(300));

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[test]
    fn drop_discards_pending_value() {
        let (calls, f) = recorder();
        let debouncer = Debouncer::new(Duration::from_secs(5), f);
        debouncer.trigger("never".to_string());
        drop(debouncer);
        assert!(calls.lock().unwrap().is_empty());
    }
}
