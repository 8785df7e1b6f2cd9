//! In-memory Claim Registry
//!
//! Reference collaborator for the ledger. Holds:
//! - the identity ownership graph (identity -> owner), kept acyclic
//! - claims keyed by (subject, topic)
//! - the bounded act-as relay that turns a signer plus a path of owned
//!   identities into a [`CallContext`]

use std::collections::HashMap;

use lib_types::config::DEFAULT_MAX_RELAY_HOPS;
use lib_types::{Address, LedgerConfig, Timestamp};
use tracing::{debug, info};

use crate::context::CallContext;
use crate::errors::{ClaimsError, ClaimsResult};
use crate::oracle::{AuthorizationOracle, Claim};
use crate::topics::ClaimTopic;

/// Identities, their owners and the claims held about them
#[derive(Debug, Clone)]
pub struct ClaimRegistry {
    /// identity -> owner (a key or another identity)
    owners: HashMap<Address, Address>,
    /// (subject, topic) -> claim
    claims: HashMap<(Address, ClaimTopic), Claim>,
    max_relay_hops: u8,
}

impl Default for ClaimRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RELAY_HOPS)
    }
}

impl ClaimRegistry {
    pub fn new(max_relay_hops: u8) -> Self {
        Self {
            owners: HashMap::new(),
            claims: HashMap::new(),
            max_relay_hops,
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        Self::new(config.max_relay_hops)
    }

    pub fn max_relay_hops(&self) -> u8 {
        self.max_relay_hops
    }

    // ========================================================================
    // Ownership graph
    // ========================================================================

    /// Register a new identity owned by `owner`
    pub fn register_identity(&mut self, identity: Address, owner: Address) -> ClaimsResult<()> {
        if identity.is_zero() {
            return Err(ClaimsError::ZeroIdentity);
        }
        if self.owners.contains_key(&identity) {
            return Err(ClaimsError::IdentityExists(identity));
        }
        self.check_acyclic(identity, owner)?;

        self.owners.insert(identity, owner);
        info!("Registered identity {:?} owned by {:?}", identity, owner);
        Ok(())
    }

    pub fn owner_of(&self, identity: &Address) -> Option<Address> {
        self.owners.get(identity).copied()
    }

    pub fn is_registered(&self, identity: &Address) -> bool {
        self.owners.contains_key(identity)
    }

    /// Hand an identity over to a new owner. Only the current owner may do so.
    pub fn change_owner(
        &mut self,
        ctx: &CallContext,
        identity: Address,
        new_owner: Address,
    ) -> ClaimsResult<()> {
        let current = self
            .owner_of(&identity)
            .ok_or(ClaimsError::UnknownIdentity(identity))?;
        if ctx.caller != current {
            return Err(ClaimsError::NotOwner {
                caller: ctx.caller,
                identity,
            });
        }
        self.check_acyclic(identity, new_owner)?;

        self.owners.insert(identity, new_owner);
        info!("Identity {:?} now owned by {:?}", identity, new_owner);
        Ok(())
    }

    /// Reject the edge identity -> owner if owner is (transitively) owned by identity
    fn check_acyclic(&self, identity: Address, owner: Address) -> ClaimsResult<()> {
        let cycle = ClaimsError::OwnershipCycle { identity, owner };
        let mut cursor = owner;
        // The graph is acyclic, so a walk never visits more nodes than exist
        for _ in 0..=self.owners.len() {
            if cursor == identity {
                return Err(cycle);
            }
            match self.owners.get(&cursor) {
                Some(next) => cursor = *next,
                None => return Ok(()),
            }
        }
        Err(cycle)
    }

    // ========================================================================
    // Claims
    // ========================================================================

    /// Store a claim about a registered subject, replacing any claim on the same topic
    pub fn add_claim(&mut self, subject: Address, claim: Claim) -> ClaimsResult<()> {
        if !self.is_registered(&subject) {
            return Err(ClaimsError::UnknownIdentity(subject));
        }
        debug!("Claim {} added to {:?} by {:?}", claim.topic, subject, claim.issuer);
        self.claims.insert((subject, claim.topic), claim);
        Ok(())
    }

    /// Remove a claim; allowed for the subject's owner and the claim's issuer
    pub fn remove_claim(
        &mut self,
        ctx: &CallContext,
        subject: Address,
        topic: ClaimTopic,
    ) -> ClaimsResult<Option<Claim>> {
        let Some(claim) = self.claims.get(&(subject, topic)) else {
            return Ok(None);
        };
        let is_owner = self.owner_of(&subject) == Some(ctx.caller);
        if !is_owner && claim.issuer != ctx.caller {
            return Err(ClaimsError::NotClaimController { caller: ctx.caller });
        }
        debug!("Claim {} removed from {:?}", topic, subject);
        Ok(self.claims.remove(&(subject, topic)))
    }

    pub fn claim(&self, subject: &Address, topic: ClaimTopic) -> Option<&Claim> {
        self.claims.get(&(*subject, topic))
    }

    // ========================================================================
    // Act-as relay
    // ========================================================================

    /// Resolve the context of a call signed by `signer` and relayed through `path`.
    ///
    /// `path[0]` must be owned by `signer` and every later hop by the hop
    /// before it. The resulting caller is the last identity of the path; an
    /// empty path is a direct call.
    pub fn act_as(
        &self,
        signer: Address,
        path: &[Address],
        now: Timestamp,
    ) -> ClaimsResult<CallContext> {
        if path.len() > self.max_relay_hops as usize {
            return Err(ClaimsError::RelayTooDeep {
                hops: path.len(),
                max: self.max_relay_hops,
            });
        }

        let mut expected_owner = signer;
        for (hop, identity) in path.iter().enumerate() {
            let owner = self
                .owner_of(identity)
                .ok_or(ClaimsError::UnknownIdentity(*identity))?;
            if owner != expected_owner {
                return Err(ClaimsError::BrokenRelayChain {
                    hop,
                    identity: *identity,
                    expected_owner,
                });
            }
            expected_owner = *identity;
        }

        Ok(CallContext {
            caller: expected_owner,
            origin: signer,
            now,
            // path.len() <= max_relay_hops, which is a u8
            hops: path.len() as u8,
        })
    }
}

impl AuthorizationOracle for ClaimRegistry {
    fn lookup_claim(&self, subject: &Address, topic: ClaimTopic) -> ClaimsResult<Option<Claim>> {
        Ok(self.claim(subject, topic).cloned())
    }
}
