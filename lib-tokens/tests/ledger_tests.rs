//! Energy Token Ledger Tests
//!
//! Transfers, reception approvals, documentation and lifecycle rules
//! exercised against an in-memory claim registry.

use anyhow::Result;
use lib_claims::{CallContext, Claim, ClaimRegistry, ClaimTopic};
use lib_tokens::{
    get_certificate_token_id, get_forward_token_id, Criterion, CriterionOperator, EnergyDirection,
    EnergyToken, LedgerEvent, LedgerView, Receipt, TokenError, TokenKind, TokenReceiver,
    TokenResult,
};
use lib_types::{Address, LedgerConfig, TokenId};
use serde_json::json;

const PERIOD: u64 = 1579860001;
const NEXT_PERIOD: u64 = PERIOD + 900;
/// 1 kW over 15 minutes in mWh
const CAP: u128 = 250_000;

fn addr(n: u8) -> Address {
    Address::new([n; 32])
}

/// Identities used throughout
struct World {
    registry: ClaimRegistry,
    ledger: EnergyToken,
}

const PLANT_KEY: u8 = 1;
const PLANT: u8 = 10;
const METER_KEY: u8 = 2;
const METER: u8 = 11;
const CONSUMER: u8 = 12;
const OTHER: u8 = 13;
const UNCLAIMED: u8 = 14;
const ROGUE_METER: u8 = 15;
const DISTRIBUTOR: u8 = 20;
const ISSUER: u8 = 99;

impl World {
    fn new() -> Self {
        let mut registry = ClaimRegistry::default();
        let issuer = addr(ISSUER);
        let claim = |topic, value: serde_json::Value| Claim::json(topic, issuer, &value);

        registry.register_identity(addr(PLANT), addr(PLANT_KEY)).unwrap();
        registry.register_identity(addr(METER), addr(METER_KEY)).unwrap();
        registry.register_identity(addr(ROGUE_METER), addr(METER_KEY)).unwrap();
        registry.register_identity(addr(CONSUMER), addr(3)).unwrap();
        registry.register_identity(addr(OTHER), addr(4)).unwrap();
        registry.register_identity(addr(UNCLAIMED), addr(6)).unwrap();
        registry.register_identity(addr(DISTRIBUTOR), addr(5)).unwrap();

        let metering = json!({ "meteringAuthority": addr(METER).to_string() });
        for (subject, claims) in [
            (
                PLANT,
                vec![
                    claim(ClaimTopic::METERING, metering.clone()),
                    claim(ClaimTopic::MAX_POWER_GENERATION, json!({ "maxGen": 1000 })),
                    claim(ClaimTopic::BALANCE, json!({})),
                    claim(ClaimTopic::EXISTENCE, json!({})),
                ],
            ),
            (
                CONSUMER,
                vec![
                    claim(ClaimTopic::METERING, metering.clone()),
                    claim(ClaimTopic::MAX_POWER_CONSUMPTION, json!({ "maxCon": 1000 })),
                    claim(ClaimTopic::CONSUMPTION_TYPE, json!({ "type": "household" })),
                    claim(ClaimTopic::BALANCE, json!({})),
                    claim(ClaimTopic::EXISTENCE, json!({})),
                ],
            ),
            (
                OTHER,
                vec![
                    claim(ClaimTopic::BALANCE, json!({})),
                    claim(ClaimTopic::EXISTENCE, json!({})),
                ],
            ),
            (METER, vec![claim(ClaimTopic::IS_METERING_AUTHORITY, json!({}))]),
            (ROGUE_METER, vec![claim(ClaimTopic::IS_METERING_AUTHORITY, json!({}))]),
            (DISTRIBUTOR, vec![claim(ClaimTopic::ACCEPTED_DISTRIBUTOR, json!({}))]),
        ] {
            for c in claims {
                registry.add_claim(addr(subject), c).unwrap();
            }
        }

        Self {
            registry,
            ledger: EnergyToken::new(LedgerConfig::default()),
        }
    }

    fn plant(&self, now: u64) -> CallContext {
        self.registry.act_as(addr(PLANT_KEY), &[addr(PLANT)], now).unwrap()
    }

    fn meter(&self, now: u64) -> CallContext {
        self.registry.act_as(addr(METER_KEY), &[addr(METER)], now).unwrap()
    }

    fn direct(&self, who: u8, now: u64) -> CallContext {
        CallContext::direct(addr(who), now)
    }

    fn create(&mut self, kind: TokenKind, period: u64) -> TokenId {
        let ctx = self.plant(PERIOD);
        self.ledger
            .create_forwards(&self.registry, &ctx, period, kind, addr(DISTRIBUTOR))
            .unwrap()
    }

    /// Receiver approves the plant and the plant mints to it
    fn mint_to(&mut self, id: TokenId, to: u8, amount: u128) {
        let receiver = self.direct(to, PERIOD);
        self.ledger
            .approve_sender(&receiver, addr(PLANT), PERIOD + 600, amount, id);
        let ctx = self.plant(PERIOD);
        self.ledger
            .mint(&self.registry, &ctx, id, &[addr(to)], &[amount])
            .unwrap();
    }

    fn transfer(&mut self, from: u8, to: u8, id: TokenId, amount: u128) -> Result<(), TokenError> {
        let ctx = self.direct(from, PERIOD);
        self.ledger
            .safe_transfer_from(&self.registry, &ctx, addr(from), addr(to), id, amount)
    }

    fn approve(&mut self, receiver: u8, sender: u8, id: TokenId, amount: u128) {
        let ctx = self.direct(receiver, PERIOD);
        self.ledger
            .approve_sender(&ctx, addr(sender), PERIOD + 600, amount, id);
    }
}

// ============================================================================
// Reception approvals
// ============================================================================

#[test]
fn test_transfer_consumes_exact_approval() -> Result<()> {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 20);

    world.approve(OTHER, CONSUMER, id, 5);
    world.transfer(CONSUMER, OTHER, id, 5)?;
    assert_eq!(
        world.transfer(CONSUMER, OTHER, id, 5),
        Err(TokenError::InsufficientReceptionApproval { remaining: 0, need: 5 })
    );

    world.approve(OTHER, CONSUMER, id, 5);
    assert_eq!(
        world.transfer(CONSUMER, OTHER, id, 6),
        Err(TokenError::InsufficientReceptionApproval { remaining: 5, need: 6 })
    );
    world.transfer(CONSUMER, OTHER, id, 4)?;
    let approval = world
        .ledger
        .reception_approval(&addr(OTHER), &addr(CONSUMER), &id)
        .unwrap();
    assert_eq!(approval.remaining, 1);

    assert_eq!(world.ledger.balance_of(&addr(OTHER), &id), 9);
    assert_eq!(world.ledger.balance_of(&addr(CONSUMER), &id), 11);
    assert_eq!(world.ledger.total_supply(&id), 20);
    Ok(())
}

#[test]
fn test_expired_approval() {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 10);

    let ctx = world.direct(OTHER, PERIOD);
    world.ledger.approve_sender(&ctx, addr(CONSUMER), PERIOD + 10, 5, id);

    let late = world.direct(CONSUMER, PERIOD + 11);
    assert_eq!(
        world
            .ledger
            .safe_transfer_from(&world.registry, &late, addr(CONSUMER), addr(OTHER), id, 1),
        Err(TokenError::ReceptionApprovalExpired {
            expiry: PERIOD + 10,
            now: PERIOD + 11
        })
    );
}

#[test]
fn test_missing_approval() {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 10);

    assert!(matches!(
        world.transfer(CONSUMER, OTHER, id, 1),
        Err(TokenError::ReceptionNotApproved { .. })
    ));
}

#[test]
fn test_batch_approval() -> Result<()> {
    let mut world = World::new();
    let first = world.create(TokenKind::AbsoluteForward, PERIOD);
    let second = world.create(TokenKind::AbsoluteForward, NEXT_PERIOD);

    let ctx = world.direct(CONSUMER, PERIOD);
    world
        .ledger
        .approve_batch_sender(&ctx, addr(PLANT), PERIOD + 600, &[3, 4], &[first, second])?;
    assert_eq!(
        world
            .ledger
            .approve_batch_sender(&ctx, addr(PLANT), PERIOD + 600, &[3], &[first, second]),
        Err(TokenError::LengthMismatch { left: 1, right: 2 })
    );

    let plant = world.plant(PERIOD);
    world.ledger.mint(&world.registry, &plant, first, &[addr(CONSUMER)], &[3])?;
    world.ledger.mint(&world.registry, &plant, second, &[addr(CONSUMER)], &[4])?;
    assert_eq!(
        world
            .ledger
            .balance_of_batch(&[addr(CONSUMER), addr(CONSUMER)], &[first, second])?,
        vec![3, 4]
    );
    Ok(())
}

// ============================================================================
// Transfer rules
// ============================================================================

#[test]
fn test_self_transfer_needs_self_approval() -> Result<()> {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 10);

    assert_eq!(
        world.transfer(CONSUMER, CONSUMER, id, 1),
        Err(TokenError::SelfTransferNotApproved(addr(CONSUMER)))
    );

    world.approve(CONSUMER, CONSUMER, id, 1);
    world.transfer(CONSUMER, CONSUMER, id, 1)?;
    assert_eq!(world.ledger.balance_of(&addr(CONSUMER), &id), 10);
    Ok(())
}

#[test]
fn test_transfer_to_zero_address() {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 10);

    let ctx = world.direct(CONSUMER, PERIOD);
    assert_eq!(
        world
            .ledger
            .safe_transfer_from(&world.registry, &ctx, addr(CONSUMER), Address::zero(), id, 1),
        Err(TokenError::TransferToZeroAddress)
    );
}

#[test]
fn test_recipient_missing_claim_with_valid_approval() {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 10);

    world.approve(UNCLAIMED, CONSUMER, id, 5);
    assert_eq!(
        world.transfer(CONSUMER, UNCLAIMED, id, 1),
        Err(TokenError::MissingClaim {
            subject: addr(UNCLAIMED),
            topic: ClaimTopic::BALANCE
        })
    );
}

#[test]
fn test_consumption_forwards_need_consumption_claims() {
    let mut world = World::new();
    let id = world.create(TokenKind::ConsumptionBasedForward, PERIOD);

    // OTHER holds BALANCE and EXISTENCE only
    world.approve(OTHER, PLANT, id, 5);
    let ctx = world.plant(PERIOD);
    assert_eq!(
        world.ledger.mint(&world.registry, &ctx, id, &[addr(OTHER)], &[5]),
        Err(TokenError::MissingClaim {
            subject: addr(OTHER),
            topic: ClaimTopic::CONSUMPTION_TYPE
        })
    );
    world.mint_to(id, CONSUMER, 5);
}

#[test]
fn test_caller_must_own_tokens_or_operate() -> Result<()> {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 10);
    world.approve(OTHER, CONSUMER, id, 10);

    let thief = world.direct(OTHER, PERIOD);
    assert!(matches!(
        world
            .ledger
            .safe_transfer_from(&world.registry, &thief, addr(CONSUMER), addr(OTHER), id, 1),
        Err(TokenError::Unauthorized(_))
    ));

    let owner = world.direct(CONSUMER, PERIOD);
    world.ledger.set_approval_for_all(&owner, addr(OTHER), true)?;
    assert!(world.ledger.is_approved_for_all(&addr(CONSUMER), &addr(OTHER)));
    world
        .ledger
        .safe_transfer_from(&world.registry, &thief, addr(CONSUMER), addr(OTHER), id, 1)?;

    world.ledger.set_approval_for_all(&owner, addr(OTHER), false)?;
    assert!(world
        .ledger
        .safe_transfer_from(&world.registry, &thief, addr(CONSUMER), addr(OTHER), id, 1)
        .is_err());
    Ok(())
}

#[test]
fn test_insufficient_balance() {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 3);
    world.approve(OTHER, CONSUMER, id, 10);

    assert_eq!(
        world.transfer(CONSUMER, OTHER, id, 4),
        Err(TokenError::InsufficientBalance { have: 3, need: 4 })
    );
    // Failed leg did not consume the approval
    assert_eq!(
        world
            .ledger
            .reception_approval(&addr(OTHER), &addr(CONSUMER), &id)
            .unwrap()
            .remaining,
        10
    );
}

#[test]
fn test_plain_transfer_to_distributor_needs_hook() {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 3);

    assert_eq!(
        world.transfer(CONSUMER, DISTRIBUTOR, id, 1),
        Err(TokenError::ReceiverHookRequired(addr(DISTRIBUTOR)))
    );
}

/// Accepted distributor that records what the ledger hands it
struct Recorder {
    address: Address,
    seen: Vec<(Address, Address, TokenId, u128, Vec<u8>, u64, u128)>,
}

impl TokenReceiver for Recorder {
    fn receiver_address(&self) -> Address {
        self.address
    }

    fn on_token_received(&mut self, ledger: &dyn LedgerView, receipt: &Receipt<'_>) -> TokenResult<()> {
        self.seen.push((
            receipt.operator(),
            receipt.sender(),
            receipt.token(),
            receipt.amount(),
            receipt.data().to_vec(),
            receipt.now(),
            ledger.balance_of(&self.address, &receipt.token()),
        ));
        Ok(())
    }
}

#[test]
fn test_receiver_sees_applied_transfer() -> Result<()> {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 3);

    let mut recorder = Recorder {
        address: addr(DISTRIBUTOR),
        seen: Vec::new(),
    };
    let ctx = world.direct(CONSUMER, PERIOD + 5);
    world.ledger.safe_transfer_to_receiver(
        &world.registry,
        &ctx,
        addr(CONSUMER),
        &mut recorder,
        id,
        2,
        b"note",
    )?;

    assert_eq!(
        recorder.seen,
        vec![(addr(CONSUMER), addr(CONSUMER), id, 2, b"note".to_vec(), PERIOD + 5, 2)]
    );
    assert_eq!(world.ledger.balance_of(&addr(DISTRIBUTOR), &id), 2);

    // Hooks are reserved for accepted distributors
    let mut outsider = Recorder {
        address: addr(OTHER),
        seen: Vec::new(),
    };
    assert!(matches!(
        world.ledger.safe_transfer_to_receiver(
            &world.registry,
            &ctx,
            addr(CONSUMER),
            &mut outsider,
            id,
            1,
            &[],
        ),
        Err(TokenError::Unauthorized(_))
    ));
    assert!(outsider.seen.is_empty());
    Ok(())
}

#[test]
fn test_batch_reverts_atomically() {
    let mut world = World::new();
    let first = world.create(TokenKind::AbsoluteForward, PERIOD);
    let second = world.create(TokenKind::AbsoluteForward, NEXT_PERIOD);
    world.mint_to(first, CONSUMER, 10);
    world.mint_to(second, CONSUMER, 10);
    let events_before = world.ledger.events().len();

    world.approve(OTHER, CONSUMER, first, 10);
    world.approve(OTHER, CONSUMER, second, 2);
    let events_after_approvals = world.ledger.events().len();
    assert_eq!(events_after_approvals, events_before + 2);

    let ctx = world.direct(CONSUMER, PERIOD);
    let result = world.ledger.safe_batch_transfer_from(
        &world.registry,
        &ctx,
        addr(CONSUMER),
        addr(OTHER),
        &[first, second],
        &[5, 5],
    );
    assert_eq!(
        result,
        Err(TokenError::InsufficientReceptionApproval { remaining: 2, need: 5 })
    );

    assert_eq!(world.ledger.balance_of(&addr(CONSUMER), &first), 10);
    assert_eq!(world.ledger.balance_of(&addr(OTHER), &first), 0);
    assert_eq!(
        world
            .ledger
            .reception_approval(&addr(OTHER), &addr(CONSUMER), &first)
            .unwrap()
            .remaining,
        10
    );
    assert_eq!(world.ledger.events().len(), events_after_approvals);
}

#[test]
fn test_batch_transfer_applies_cumulatively() -> Result<()> {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 10);
    world.approve(OTHER, CONSUMER, id, 8);

    let ctx = world.direct(CONSUMER, PERIOD);
    // Same id twice: the second leg sees the first leg's consumption
    assert_eq!(
        world.ledger.safe_batch_transfer_from(
            &world.registry,
            &ctx,
            addr(CONSUMER),
            addr(OTHER),
            &[id, id],
            &[5, 5],
        ),
        Err(TokenError::InsufficientReceptionApproval { remaining: 3, need: 5 })
    );
    world.ledger.safe_batch_transfer_from(
        &world.registry,
        &ctx,
        addr(CONSUMER),
        addr(OTHER),
        &[id, id],
        &[5, 3],
    )?;
    assert_eq!(world.ledger.balance_of(&addr(OTHER), &id), 8);
    assert!(matches!(
        world.ledger.events().last(),
        Some(LedgerEvent::TransferBatch { .. })
    ));
    Ok(())
}

// ============================================================================
// Energy documentation
// ============================================================================

#[test]
fn test_documentation_cap_and_overwrite() -> Result<()> {
    let mut world = World::new();
    world.create(TokenKind::AbsoluteForward, PERIOD);
    let meter = world.meter(PERIOD + 10);

    world
        .ledger
        .add_measured_energy_generation(&world.registry, &meter, addr(PLANT), CAP, PERIOD)?;
    assert_eq!(
        world
            .ledger
            .add_measured_energy_generation(&world.registry, &meter, addr(PLANT), CAP + 1, PERIOD),
        Err(TokenError::CapacityExceeded { value: CAP + 1, cap: CAP })
    );

    world
        .ledger
        .add_measured_energy_consumption(&world.registry, &meter, addr(CONSUMER), CAP, PERIOD)?;
    assert!(matches!(
        world.ledger.add_measured_energy_consumption(
            &world.registry,
            &meter,
            addr(CONSUMER),
            CAP + 1,
            PERIOD
        ),
        Err(TokenError::CapacityExceeded { .. })
    ));

    world
        .ledger
        .add_measured_energy_generation(&world.registry, &meter, addr(PLANT), 100, PERIOD)?;
    world
        .ledger
        .add_measured_energy_generation(&world.registry, &meter, addr(PLANT), 30, PERIOD)?;
    let doc = world
        .ledger
        .energy_documentation(&addr(PLANT), PERIOD, EnergyDirection::Generation)
        .unwrap();
    assert_eq!(doc.value, 30);
    assert_eq!(doc.authority, addr(METER));
    assert_eq!(doc.documented_at, PERIOD + 10);
    Ok(())
}

#[test]
fn test_documentation_requires_relayed_metering_authority() {
    let mut world = World::new();
    world.create(TokenKind::AbsoluteForward, PERIOD);

    // Signing key directly
    let key = world.direct(METER_KEY, PERIOD);
    // The authority identity without a relay
    let unrelayed = world.direct(METER, PERIOD);
    // Relayed through another identity of the same key
    let wrong_identity = world
        .registry
        .act_as(addr(METER_KEY), &[addr(ROGUE_METER)], PERIOD)
        .unwrap();

    for ctx in [key, unrelayed, wrong_identity] {
        assert!(matches!(
            world
                .ledger
                .add_measured_energy_generation(&world.registry, &ctx, addr(PLANT), 1, PERIOD),
            Err(TokenError::Unauthorized(_))
        ));
    }
    assert!(world
        .ledger
        .energy_documentation(&addr(PLANT), PERIOD, EnergyDirection::Generation)
        .is_none());
}

#[test]
fn test_generation_needs_forwards_consumption_does_not() -> Result<()> {
    let mut world = World::new();
    let meter = world.meter(PERIOD);

    assert_eq!(
        world
            .ledger
            .add_measured_energy_generation(&world.registry, &meter, addr(PLANT), 1, PERIOD),
        Err(TokenError::NoForwardsForPeriod {
            plant: addr(PLANT),
            period: PERIOD
        })
    );
    world
        .ledger
        .add_measured_energy_consumption(&world.registry, &meter, addr(CONSUMER), 1, PERIOD)?;
    Ok(())
}

#[test]
fn test_documentation_window() {
    let mut world = World::new();
    world.create(TokenKind::AbsoluteForward, NEXT_PERIOD);
    let window = world.ledger.config().documentation_window_secs;

    // Not started yet
    let early = world.meter(PERIOD);
    assert_eq!(
        world
            .ledger
            .add_measured_energy_generation(&world.registry, &early, addr(PLANT), 1, NEXT_PERIOD),
        Err(TokenError::InvalidBalancePeriod(NEXT_PERIOD))
    );

    let last = world.meter(NEXT_PERIOD + 900 + window - 1);
    assert!(world
        .ledger
        .add_measured_energy_generation(&world.registry, &last, addr(PLANT), 1, NEXT_PERIOD)
        .is_ok());

    let closed = world.meter(NEXT_PERIOD + 900 + window);
    assert_eq!(
        world
            .ledger
            .add_measured_energy_generation(&world.registry, &closed, addr(PLANT), 1, NEXT_PERIOD),
        Err(TokenError::DocumentationWindowClosed {
            period: NEXT_PERIOD,
            closed_at: NEXT_PERIOD + 900 + window
        })
    );
}

#[test]
fn test_missing_capacity_claim() {
    let mut world = World::new();
    let meter = world.meter(PERIOD);
    // OTHER has no METERING claim at all
    assert_eq!(
        world
            .ledger
            .add_measured_energy_consumption(&world.registry, &meter, addr(OTHER), 1, PERIOD),
        Err(TokenError::MissingClaim {
            subject: addr(OTHER),
            topic: ClaimTopic::METERING
        })
    );

    // PLANT has METERING but no MAX_POWER_CONSUMPTION
    assert_eq!(
        world
            .ledger
            .add_measured_energy_consumption(&world.registry, &meter, addr(PLANT), 1, PERIOD),
        Err(TokenError::MissingClaim {
            subject: addr(PLANT),
            topic: ClaimTopic::MAX_POWER_CONSUMPTION
        })
    );
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_forwards_settle_on_generation_documentation() -> Result<()> {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 10);
    world.approve(OTHER, CONSUMER, id, 10);

    let meter = world.meter(PERIOD);
    world
        .ledger
        .add_measured_energy_generation(&world.registry, &meter, addr(PLANT), 30, PERIOD)?;

    assert_eq!(
        world.transfer(CONSUMER, OTHER, id, 1),
        Err(TokenError::ForwardsSettled(id))
    );

    world.approve(OTHER, PLANT, id, 10);
    let plant = world.plant(PERIOD);
    assert_eq!(
        world.ledger.mint(&world.registry, &plant, id, &[addr(OTHER)], &[1]),
        Err(TokenError::ForwardsSettled(id))
    );
    Ok(())
}

#[test]
fn test_forward_creation_requires_issuer_claims() {
    let mut world = World::new();

    let unclaimed = world.direct(UNCLAIMED, PERIOD);
    assert_eq!(
        world.ledger.create_forwards(
            &world.registry,
            &unclaimed,
            PERIOD,
            TokenKind::AbsoluteForward,
            addr(DISTRIBUTOR)
        ),
        Err(TokenError::MissingClaim {
            subject: addr(UNCLAIMED),
            topic: ClaimTopic::EXISTENCE
        })
    );

    // OTHER exists but has no generation capacity
    let other = world.direct(OTHER, PERIOD);
    assert_eq!(
        world.ledger.create_property_forwards(
            &world.registry,
            &other,
            PERIOD,
            addr(DISTRIBUTOR),
            Vec::new()
        ),
        Err(TokenError::MissingClaim {
            subject: addr(OTHER),
            topic: ClaimTopic::MAX_POWER_GENERATION
        })
    );

    // Without a family there is nothing to mint
    let id = get_forward_token_id(TokenKind::AbsoluteForward, PERIOD, &addr(OTHER));
    world.approve(CONSUMER, OTHER, id, 50);
    assert_eq!(
        world.ledger.mint(&world.registry, &other, id, &[addr(CONSUMER)], &[50]),
        Err(TokenError::UnknownForwardFamily(id))
    );
    assert_eq!(world.ledger.total_supply(&id), 0);
    assert!(!world
        .ledger
        .events()
        .iter()
        .any(|event| matches!(event, LedgerEvent::ForwardsCreated { .. })));
}

#[test]
fn test_drain_events_hands_over_log() {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    world.mint_to(id, CONSUMER, 4);

    let drained = world.ledger.drain_events();
    assert!(matches!(
        drained.first(),
        Some(LedgerEvent::ForwardsCreated { token, .. }) if *token == id
    ));
    assert_eq!(
        drained.last(),
        Some(&LedgerEvent::TransferSingle {
            operator: addr(PLANT),
            from: Address::zero(),
            to: addr(CONSUMER),
            token: id,
            amount: 4,
        })
    );
    assert!(world.ledger.events().is_empty());
    assert!(world.ledger.drain_events().is_empty());

    // Logging resumes after a drain
    world.approve(OTHER, CONSUMER, id, 1);
    assert_eq!(world.transfer(CONSUMER, OTHER, id, 1), Ok(()));
    assert_eq!(world.ledger.events().len(), 2);
}

#[test]
fn test_property_families_by_criteria() -> Result<()> {
    let mut world = World::new();
    let plant = world.plant(PERIOD);
    let solar = vec![Criterion::new(
        ClaimTopic::GENERATION_TYPE,
        "type",
        CriterionOperator::Eq,
        "solar",
    )];
    let wind = vec![Criterion::new(
        ClaimTopic::GENERATION_TYPE,
        "type",
        CriterionOperator::Eq,
        "wind",
    )];

    let a = world
        .ledger
        .create_property_forwards(&world.registry, &plant, PERIOD, addr(DISTRIBUTOR), solar.clone())?;
    let b = world
        .ledger
        .create_property_forwards(&world.registry, &plant, PERIOD, addr(DISTRIBUTOR), wind)?;
    assert_ne!(a, b);
    assert_eq!(
        world
            .ledger
            .create_property_forwards(&world.registry, &plant, PERIOD, addr(DISTRIBUTOR), solar.clone()),
        Err(TokenError::ForwardsAlreadyCreated(a))
    );

    // A plain family for the same plant and period coexists with property families
    world.create(TokenKind::GenerationBasedForward, PERIOD);
    assert_eq!(world.ledger.forward_family(&a).unwrap().criteria, solar);
    Ok(())
}

#[test]
fn test_certificates_bounded_by_generation_and_redeemable() -> Result<()> {
    let mut world = World::new();
    let id = world.create(TokenKind::GenerationBasedForward, PERIOD);
    let meter = world.meter(PERIOD);
    world
        .ledger
        .add_measured_energy_generation(&world.registry, &meter, addr(PLANT), 30, PERIOD)?;

    let distributor = world.direct(DISTRIBUTOR, PERIOD);
    let certificate = world.ledger.mint_certificates(
        &world.registry,
        &distributor,
        id,
        addr(CONSUMER),
        20,
        false,
    )?;
    assert_eq!(certificate, get_certificate_token_id(PERIOD, &addr(PLANT)));
    assert_eq!(
        world
            .ledger
            .mint_certificates(&world.registry, &distributor, id, addr(CONSUMER), 11, false),
        Err(TokenError::CertificatesExceedGeneration {
            documented: 30,
            requested: 31
        })
    );
    let info = world.ledger.token_info(&certificate).unwrap();
    assert_eq!(info.kind, TokenKind::Certificate);
    assert_eq!(info.plant, addr(PLANT));

    // Redemption
    let holder = world.direct(CONSUMER, PERIOD);
    world.ledger.burn(&holder, addr(CONSUMER), certificate, 5)?;
    assert_eq!(world.ledger.balance_of(&addr(CONSUMER), &certificate), 15);
    assert_eq!(world.ledger.total_supply(&certificate), 15);
    assert_eq!(
        world.ledger.burn(&holder, addr(CONSUMER), id, 1),
        Err(TokenError::InvalidTokenKind(TokenKind::GenerationBasedForward))
    );
    Ok(())
}

#[test]
fn test_certificate_mint_with_reception() {
    let mut world = World::new();
    let id = world.create(TokenKind::AbsoluteForward, PERIOD);
    let meter = world.meter(PERIOD);
    world
        .ledger
        .add_measured_energy_generation(&world.registry, &meter, addr(PLANT), 30, PERIOD)
        .unwrap();

    let distributor = world.direct(DISTRIBUTOR, PERIOD);
    assert!(matches!(
        world
            .ledger
            .mint_certificates(&world.registry, &distributor, id, addr(CONSUMER), 5, true),
        Err(TokenError::ReceptionNotApproved { .. })
    ));

    let certificate = get_certificate_token_id(PERIOD, &addr(PLANT));
    world.approve(CONSUMER, DISTRIBUTOR, certificate, 5);
    world
        .ledger
        .mint_certificates(&world.registry, &distributor, id, addr(CONSUMER), 5, true)
        .unwrap();
    assert_eq!(world.ledger.balance_of(&addr(CONSUMER), &certificate), 5);
}
