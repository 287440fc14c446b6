use serde::{Deserialize, Serialize};

use super::Stage;
use crate::cbor::Hash;

/// Transaction output holding the channel funds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputRef {
    #[serde(with = "hex::serde")]
    pub tx_hash: Hash,
    pub output_index: u32,
}

/// Whether the observed state is final on the ledger.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Pending,
    Confirmed,
}

/// Snapshot of a channel output as observed on the ledger.
///
/// Snapshots are replaced, never mutated, when a newer one is observed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct L1Channel {
    /// Missing while the opening transaction has not been submitted.
    pub reference: Option<OutputRef>,
    pub stage: Stage,
    pub amount: u64,
    pub phase: Phase,
}

impl L1Channel {
    pub fn new(reference: Option<OutputRef>, stage: Stage, amount: u64, phase: Phase) -> Self {
        Self {
            reference,
            stage,
            amount,
            phase,
        }
    }

    /// The record right after submitting the opening transaction.
    pub fn open(reference: OutputRef, amount: u64) -> Self {
        Self::new(
            Some(reference),
            Stage::Opened { subbed: 0 },
            amount,
            Phase::Pending,
        )
    }

    pub fn is_opened(&self) -> bool {
        self.stage.is_opened()
    }
}
