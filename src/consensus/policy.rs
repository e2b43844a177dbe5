use log::debug;
use serde::Serialize;
use std::time::Duration;

use crate::blockchain::{Block, Blockchain, CancelToken, MiningJob, MiningReport};
use crate::error::ChainError;

/// Verdict of an admission policy on one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

/// What `Blockchain::append` did with a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Admission {
    Accepted { index: u64, hash: String },
    Rejected,
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted { .. })
    }
}

/// Decides whether a candidate may join a ledger.
///
/// `candidate` is already linked to the ledger tip. Policies may mutate it
/// (mining does) but must leave its hash consistent with its fields.
pub trait AdmissionPolicy {
    fn name(&self) -> &'static str;

    fn admit(
        &mut self,
        candidate: &mut Block,
        ledger: &Blockchain,
    ) -> Result<Decision, ChainError>;
}

/// Always accepts; no work required.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconditional;

impl AdmissionPolicy for Unconditional {
    fn name(&self) -> &'static str {
        "unconditional"
    }

    fn admit(
        &mut self,
        _candidate: &mut Block,
        _ledger: &Blockchain,
    ) -> Result<Decision, ChainError> {
        Ok(Decision::Accept)
    }
}

/// Mines the candidate against the ledger's current difficulty.
///
/// The search runs on a `MiningJob` worker; `admit` blocks until it ends.
/// Once mining terminates the candidate is accepted; a timeout or an
/// external cancel yields `MiningCancelled` instead.
///
/// Each job mines under a child of `token`. A timeout cancels only that
/// child, so the policy stays usable for later appends; cancelling `token`
/// itself stops the current job and every later one.
#[derive(Debug, Clone, Default)]
pub struct ProofOfWork {
    pub timeout: Option<Duration>,
    pub token: CancelToken,
    pub last_report: Option<MiningReport>,
}

impl ProofOfWork {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    /// Share a cancel token with another thread.
    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }
}

impl AdmissionPolicy for ProofOfWork {
    fn name(&self) -> &'static str {
        "proof-of-work"
    }

    fn admit(
        &mut self,
        candidate: &mut Block,
        ledger: &Blockchain,
    ) -> Result<Decision, ChainError> {
        let job = MiningJob::spawn(candidate.clone(), ledger.difficulty(), self.token.child());
        let (mined, report) = match self.timeout {
            Some(timeout) => job.wait_timeout(timeout)?,
            None => job.wait()?,
        };
        debug!(
            "PoW admitted block #{} after {} attempts",
            report.index, report.attempts
        );
        *candidate = mined;
        self.last_report = Some(report);
        Ok(Decision::Accept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconditional_accepts_anything() {
        let ledger = Blockchain::new();
        let mut block = Block::new(1, "anything", "whatever".into());
        assert_eq!(
            Unconditional.admit(&mut block, &ledger).unwrap(),
            Decision::Accept
        );
    }

    #[test]
    fn proof_of_work_seals_candidate() {
        let mut ledger = Blockchain::new();
        ledger.set_difficulty(2);
        let mut block = ledger.next_block("Daffy Duck").unwrap();
        let mut pow = ProofOfWork::default();

        assert_eq!(pow.admit(&mut block, &ledger).unwrap(), Decision::Accept);
        assert!(block.meets_difficulty(2));
        assert!(block.has_valid_hash());
        assert_eq!(pow.last_report.as_ref().unwrap().hash, block.hash);
    }

    #[test]
    fn cancelled_proof_of_work_leaves_ledger_unchanged() {
        let mut ledger = Blockchain::new();
        ledger.set_difficulty(64);
        let token = CancelToken::new();
        token.cancel();
        let mut pow = ProofOfWork::default().with_token(token);

        let candidate = ledger.next_block("Daffy Duck").unwrap();
        let err = ledger.append(candidate, &mut pow).unwrap_err();

        assert!(matches!(err, ChainError::MiningCancelled { .. }));
        assert_eq!(ledger.len(), 1);
        assert!(pow.last_report.is_none());
    }

    #[test]
    fn proof_of_work_timeout() {
        let mut ledger = Blockchain::new();
        ledger.set_difficulty(64);
        let mut pow = ProofOfWork::new(Some(Duration::from_millis(20)));
        let candidate = ledger.next_block("Daffy Duck").unwrap();
        assert!(matches!(
            ledger.append(candidate, &mut pow),
            Err(ChainError::MiningCancelled { .. })
        ));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn policy_recovers_after_timeout() {
        let shared = CancelToken::new();
        let mut pow =
            ProofOfWork::new(Some(Duration::from_millis(30))).with_token(shared.clone());
        let mut ledger = Blockchain::new();

        ledger.set_difficulty(64);
        let candidate = ledger.next_block("Daffy Duck").unwrap();
        assert!(matches!(
            ledger.append(candidate, &mut pow),
            Err(ChainError::MiningCancelled { index: 1, .. })
        ));
        assert!(!shared.is_cancelled());

        ledger.set_difficulty(2);
        let candidate = ledger.next_block("Daffy Duck").unwrap();
        let admission = ledger.append(candidate, &mut pow).unwrap();

        assert!(admission.is_accepted());
        assert_eq!(ledger.len(), 2);
        assert!(ledger.latest_block().unwrap().meets_difficulty(2));
        assert_eq!(pow.last_report.as_ref().unwrap().index, 1);
    }
}
