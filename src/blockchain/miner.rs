use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{Block, MiningReport};
use crate::error::ChainError;

/// Thread-safe flag used to stop a nonce search.
///
/// Clones share one flag. A token made with `child` also observes every
/// ancestor's flag, while cancelling the child leaves the ancestors alone.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    parents: Vec<Arc<AtomicBool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh token that is cancelled when `self` (or any of its ancestors) is.
    pub fn child(&self) -> Self {
        let mut parents = self.parents.clone();
        parents.push(Arc::clone(&self.flag));
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parents,
        }
    }

    /// Once set the flag stays set.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self.parents.iter().any(|p| p.load(Ordering::SeqCst))
    }
}

pub type MiningResult = Result<(Block, MiningReport), ChainError>;

/// A nonce search running on its own thread.
///
/// The caller blocks on `wait`/`wait_timeout`; the result comes back over a
/// channel together with the sealed block.
pub struct MiningJob {
    rx: Receiver<MiningResult>,
    token: CancelToken,
    handle: JoinHandle<()>,
}

impl MiningJob {
    pub fn spawn(mut block: Block, difficulty: u32, token: CancelToken) -> Self {
        let (tx, rx) = mpsc::channel();
        let worker_token = token.clone();
        let handle = thread::spawn(move || {
            let result = block
                .mine_with_cancel(difficulty, &worker_token)
                .map(|report| (block, report));
            // The receiver only goes away if the job handle was dropped.
            let _ = tx.send(result);
        });
        debug!("Spawned mining worker (difficulty {difficulty})");
        Self { rx, token, handle }
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Block until the worker finishes.
    pub fn wait(self) -> MiningResult {
        let result = self.rx.recv().unwrap_or(Err(ChainError::MiningWorkerLost));
        let _ = self.handle.join();
        result
    }

    /// Wait at most `timeout`; past the deadline the job's token is cancelled
    /// and the worker's final answer is collected. Only this job's token is
    /// set, so spawn with `CancelToken::child` to keep a shared token usable.
    pub fn wait_timeout(self, timeout: Duration) -> MiningResult {
        let result = match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                warn!("Mining exceeded {:?}, cancelling", timeout);
                self.token.cancel();
                self.rx.recv().unwrap_or(Err(ChainError::MiningWorkerLost))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ChainError::MiningWorkerLost),
        };
        let _ = self.handle.join();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_clones_share_state() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }

    #[test]
    fn job_returns_mined_block() {
        let block = Block::new(1, "Donald Duck", "prev".into());
        let job = MiningJob::spawn(block, 2, CancelToken::new());
        let (mined, report) = job.wait().unwrap();
        assert!(mined.hash.starts_with("00"));
        assert!(mined.has_valid_hash());
        assert_eq!(report.hash, mined.hash);
    }

    #[test]
    fn timeout_cancels_unreachable_target() {
        let block = Block::new(1, "Donald Duck", "prev".into());
        let job = MiningJob::spawn(block, 64, CancelToken::new());
        let token = job.token().clone();
        let err = job.wait_timeout(Duration::from_millis(50)).unwrap_err();
        assert!(matches!(err, ChainError::MiningCancelled { index: 1, .. }));
        assert!(token.is_cancelled());
    }

    #[test]
    fn child_sees_parent_but_not_the_reverse() {
        let parent = CancelToken::new();
        let child = parent.child();
        let grandchild = child.child();

        child.cancel();
        assert!(grandchild.is_cancelled());
        assert!(!parent.is_cancelled());

        let other = parent.child();
        assert!(!other.is_cancelled());
        parent.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn timeout_on_child_token_spares_the_parent() {
        let parent = CancelToken::new();
        let block = Block::new(1, "Donald Duck", "prev".into());
        let job = MiningJob::spawn(block, 64, parent.child());
        assert!(job.wait_timeout(Duration::from_millis(20)).is_err());
        assert!(!parent.is_cancelled());
    }
}
