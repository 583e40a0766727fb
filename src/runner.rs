//! Threading strategies for serving connections.
use std::fmt;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use log::error;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Error queueing a task: the pool's workers are gone.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolClosed;

impl fmt::Display for PoolClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("thread pool is closed")
    }
}

/// A fixed-size pool of worker threads feeding off one task channel.
///
/// Dropping the pool closes the channel and joins every worker, so tasks
/// already queued still run to completion before the drop returns.
pub struct ThreadPool {
    sender: Option<mpsc::Sender<Task>>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl ThreadPool {
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "pool needs at least one worker");
        let (sender, receiver) = mpsc::channel::<Task>();
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = (0..size)
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                thread::spawn(move || loop {
                    // Holding the lock only while receiving; recv fails
                    // once the sender is dropped, which is the shutdown
                    // signal.
                    let task = receiver.lock().unwrap().recv();
                    match task {
                        Ok(task) => task(),
                        Err(_) => break,
                    }
                })
            })
            .collect();
        Self {
            sender: Some(sender),
            workers,
        }
    }

    pub fn submit<F>(&self, f: F) -> Result<(), PoolClosed>
    where
        F: FnOnce() + Send + 'static,
    {
        match &self.sender {
            Some(sender) => sender.send(Box::new(f)).map_err(|_| PoolClosed),
            None => Err(PoolClosed),
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("worker thread panicked");
            }
        }
    }
}

/// How a server executes per-connection work: inline on the accepting
/// thread, or handed to a [`ThreadPool`].
pub enum Runner {
    Inline,
    Pool(ThreadPool),
}

impl Runner {
    /// 0 or 1 threads runs connections on the accepting thread, any other
    /// count creates a pool of that size.
    pub fn new(n_threads: usize) -> Self {
        if n_threads < 2 {
            Self::Inline
        } else {
            Self::Pool(ThreadPool::new(n_threads))
        }
    }
    pub fn run<F>(&mut self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            Self::Inline => f(),
            Self::Pool(pool) => {
                if let Err(e) = pool.submit(f) {
                    error!("connection dropped: {}", e);
                }
            }
        }
    }
}
