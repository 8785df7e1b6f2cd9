//! Call context
//!
//! Every state-changing ledger call receives an immutable `CallContext`.
//! The caller is derived from the context, never from user parameters.

use lib_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};

/// Who is calling, on whose signature, and when
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Effective caller: the signer for direct calls, or the last identity
    /// of an act-as relay chain
    pub caller: Address,
    /// Key that signed the outer call
    pub origin: Address,
    /// Block timestamp
    pub now: Timestamp,
    /// Number of identities the call was relayed through (0 = direct)
    pub hops: u8,
}

impl CallContext {
    /// Context for a call made directly by `signer`
    pub fn direct(signer: Address, now: Timestamp) -> Self {
        Self {
            caller: signer,
            origin: signer,
            now,
            hops: 0,
        }
    }

    pub fn is_relayed(&self) -> bool {
        self.hops > 0
    }

    /// Same caller at a different time
    pub fn at(&self, now: Timestamp) -> Self {
        Self { now, ..*self }
    }
}
