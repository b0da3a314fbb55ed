use log2::warn;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, watch};

use super::task::DownloadTask;

/// Bounded queue of pending tasks, plus the bookkeeping needed to know when
/// the crawl is over.
///
/// Every submitted task counts as in flight until [`Frontier::complete`] is
/// called for it. When that count returns to zero nothing is queued and no
/// worker holds a task, so the completion signal is raised and waiting
/// workers stop.
pub struct Frontier {
    sender: mpsc::Sender<DownloadTask>,
    receiver: Mutex<mpsc::Receiver<DownloadTask>>,
    in_flight: AtomicUsize,
    done: watch::Sender<bool>,
}

impl Frontier {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (done, _) = watch::channel(false);
        Self {
            sender,
            receiver: Mutex::new(receiver),
            in_flight: AtomicUsize::new(0),
            done,
        }
    }

    /// Queues `tasks`. Whatever does not fit right now is handed to a
    /// background feeder that waits for room, so a worker never blocks on
    /// the queue it also drains.
    pub fn submit(&self, tasks: Vec<DownloadTask>) {
        if tasks.is_empty() {
            return;
        }
        self.in_flight.fetch_add(tasks.len(), Ordering::SeqCst);

        let mut overflow = Vec::new();
        for task in tasks {
            if !overflow.is_empty() {
                overflow.push(task);
                continue;
            }
            match self.sender.try_send(task) {
                Ok(()) => {}
                Err(TrySendError::Full(task)) => overflow.push(task),
                Err(TrySendError::Closed(task)) => {
                    warn!("Queue closed, dropping {}", task.url);
                    self.complete();
                }
            }
        }

        if !overflow.is_empty() {
            let sender = self.sender.clone();
            tokio::spawn(async move {
                for task in overflow {
                    if let Err(e) = sender.send(task).await {
                        warn!("Queue closed, dropping {}", e.0.url);
                    }
                }
            });
        }
    }

    /// Next task to work on, or `None` once the crawl is complete. The queue
    /// is closed by the first worker that sees completion.
    pub async fn next(&self, done: &mut watch::Receiver<bool>) -> Option<DownloadTask> {
        let mut receiver = self.receiver.lock().await;
        tokio::select! {
            biased;
            _ = async {
                let _ = done.wait_for(|finished| *finished).await;
            } => {
                receiver.close();
                None
            }
            task = receiver.recv() => task,
        }
    }

    /// Marks one task as terminal (done, failed or skipped).
    pub fn complete(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.done.send_replace(true);
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.done.subscribe()
    }

    #[cfg(test)]
    fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    fn is_done(&self) -> bool {
        *self.done.borrow()
    }
}
