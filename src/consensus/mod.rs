pub mod network;
pub mod participant;
pub mod policy;
pub mod vote;

pub use network::{Network, RoundOutcome};
pub use participant::Participant;
pub use policy::{Admission, AdmissionPolicy, Decision, ProofOfWork, Unconditional};
pub use vote::{LocalValidityVote, VoteTally};
