use serde::{Deserialize, Serialize};

/// Stage of an L1 channel as recorded on-chain.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// `subbed` is the amount the adaptor has already claimed (subtracted)
    /// from the channel.
    Opened { subbed: u64 },
    /// The consumer started closing. The adaptor can respond until
    /// `elapse_at` (posix milliseconds).
    Closed { subbed: u64, elapse_at: u64 },
    Responded,
}

impl Stage {
    pub fn is_opened(&self) -> bool {
        matches!(self, Stage::Opened { .. })
    }

    /// The claimed amount while opened.
    pub fn opened_subbed(&self) -> Option<u64> {
        match *self {
            Stage::Opened { subbed } => Some(subbed),
            Stage::Closed { .. } | Stage::Responded => None,
        }
    }
}
