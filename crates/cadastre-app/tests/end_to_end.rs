//! End-to-end protocol scenarios
//!
//! The full control flow: mint through the settlement ledger with fee
//! collection, criteria-driven validation, fractionalization with a
//! quorum unlock, and both withdrawal paths — driven through one wired
//! deployment.

use assert_matches::assert_matches;
use cadastre_app::{Protocol, ProtocolConfig};
use cadastre_core::{AccountId, AssetType, TokenBank, TokenId, TraitValue, UnitId};
use cadastre_registry::MintRequest;
use cadastre_settlement::SettlementError;
use cadastre_testkit::{ids, MemoryBank};
use cadastre_validator::{UnitRole, ValidationCriteria};
use std::collections::BTreeSet;

struct World {
    admin: AccountId,
    payer: AccountId,
    asserter: AccountId,
    acme_owner: AccountId,
    protocol_receiver: AccountId,
    usd: TokenId,
    unit: UnitId,
    protocol: Protocol,
    bank: MemoryBank,
}

fn world() -> World {
    cadastre_testkit::init_tracing();
    let admin = ids::account("admin");
    let payer = ids::account("payer");
    let asserter = ids::account("asserter");
    let acme_owner = ids::account("acme-owner");
    let protocol_receiver = ids::account("protocol-receiver");
    let usd = ids::token("usd");
    let unit = ids::unit("acme");

    let config = ProtocolConfig::from_toml_str(&format!(
        r#"
        contract_uri = "cadastre://records"
        commission_regular_bps = 1000

        [[tokens]]
        id = "{}"
        regular_fee = 100
        validator_fee = 40
        "#,
        usd.uuid()
    ))
    .unwrap();

    let mut protocol = Protocol::new(
        &config,
        admin,
        ids::account("escrow"),
        protocol_receiver,
        ids::account("vault"),
    )
    .unwrap();

    protocol
        .register_validator(
            admin,
            unit,
            "Acme Title",
            "title searches",
            acme_owner,
            ids::account("acme-treasury"),
            BTreeSet::from([AssetType::Land, AssetType::Estate]),
        )
        .unwrap();
    protocol
        .grant_unit_role(acme_owner, unit, UnitRole::Validator, asserter)
        .unwrap();
    protocol
        .grant_unit_role(acme_owner, unit, UnitRole::CriteriaManager, acme_owner)
        .unwrap();
    protocol
        .units
        .get_mut(unit)
        .unwrap()
        .set_criteria(
            acme_owner,
            AssetType::Land,
            ValidationCriteria {
                required_traits: vec!["country".into(), "state".into()],
                additional_criteria: "title search within 30 days".into(),
                require_operating_agreement: false,
                require_definition: false,
            },
        )
        .unwrap();

    let mut bank = MemoryBank::new();
    bank.fund(usd, payer, 1_000);
    bank.approve(usd, payer, protocol.settlement.escrow(), 1_000);

    World {
        admin,
        payer,
        asserter,
        acme_owner,
        protocol_receiver,
        usd,
        unit,
        protocol,
        bank,
    }
}

fn land_request(w: &World) -> MintRequest {
    MintRequest::new(w.payer, AssetType::Land)
        .with_validator(w.unit)
        .with_operating_agreement("agreement://standard")
        .with_definition("parcel 12, travis county")
}

#[test]
fn fee_bearing_mint_splits_ninety_ten_and_both_withdraw() {
    let mut w = world();

    let record = w
        .protocol
        .mint_deed(w.payer, land_request(&w), Some(w.usd), &mut w.bank)
        .unwrap();

    // 100-unit fee at 1000 bps: 90 to the pool, 10 to Acme's owner.
    assert_eq!(w.protocol.settlement.service_fee_balance(w.usd), 90);
    assert_eq!(
        w.protocol.settlement.commission_balance(w.acme_owner, w.usd),
        10
    );
    assert_eq!(w.protocol.registry.owner_of(record), Some(w.payer));

    let pool = w
        .protocol
        .settlement
        .withdraw_service_fees(w.admin, w.usd, &mut w.bank)
        .unwrap();
    let commission = w
        .protocol
        .settlement
        .withdraw_commission(w.acme_owner, w.usd, &mut w.bank)
        .unwrap();
    assert_eq!((pool, commission), (90, 10));
    assert_eq!(w.protocol.settlement.service_fee_balance(w.usd), 0);
    assert_eq!(
        w.protocol.settlement.commission_balance(w.acme_owner, w.usd),
        0
    );
    assert_eq!(w.bank.balance_of(w.usd, w.protocol_receiver), 90);
    assert_eq!(w.bank.balance_of(w.usd, w.acme_owner), 10);

    assert_matches!(
        w.protocol
            .settlement
            .withdraw_service_fees(w.admin, w.usd, &mut w.bank),
        Err(SettlementError::NothingToWithdraw(_))
    );
}

#[test]
fn criteria_validation_round_trip() {
    let mut w = world();
    let record = w
        .protocol
        .mint_deed(w.payer, land_request(&w), Some(w.usd), &mut w.bank)
        .unwrap();

    // Only `country` present: the missing `state` fails the evaluation.
    w.protocol
        .registry
        .set_trait(
            w.payer,
            record,
            "country",
            TraitValue::utf8("US"),
            &w.protocol.units,
        )
        .unwrap();
    assert!(!w.protocol.validate_deed(w.asserter, record).unwrap());

    w.protocol
        .registry
        .set_trait(
            w.payer,
            record,
            "state",
            TraitValue::utf8("TX"),
            &w.protocol.units,
        )
        .unwrap();
    assert!(w.protocol.validate_deed(w.asserter, record).unwrap());
    assert!(w.protocol.registry.record(record).unwrap().is_validated);

    // An owner metadata edit clears the flag; the validator re-asserts.
    w.protocol
        .registry
        .update_metadata(
            w.payer,
            record,
            "uri://v2",
            "agreement://standard",
            "parcel 12, travis county, resurveyed",
            "",
            &w.protocol.units,
        )
        .unwrap();
    assert!(!w.protocol.registry.record(record).unwrap().is_validated);
    assert!(w.protocol.validate_deed(w.asserter, record).unwrap());
}

#[test]
fn fractionalize_vote_unlock_round_trip() {
    let mut w = world();
    let minority = ids::account("minority");
    let record = w
        .protocol
        .mint_deed(w.payer, land_request(&w), Some(w.usd), &mut w.bank)
        .unwrap();

    w.protocol
        .registry
        .approve(w.payer, record, Some(w.protocol.vault.custodian()))
        .unwrap();
    let collection = w
        .protocol
        .fractionalize(
            w.payer,
            record,
            100,
            7_500,
            "Parcel 12 Shares",
            "P12",
            "cadastre://fractions/p12",
        )
        .unwrap();
    assert_eq!(
        w.protocol.registry.owner_of(record),
        Some(w.protocol.vault.custodian())
    );

    w.protocol
        .vault
        .transfer_shares(w.payer, collection, minority, 20)
        .unwrap();
    w.protocol.vault.approve_unlock(w.payer, collection).unwrap();
    w.protocol
        .vault
        .approve_unlock(minority, collection)
        .unwrap();
    assert!(w.protocol.vault.can_unlock(collection).unwrap());

    w.protocol.unlock(minority, collection).unwrap();
    assert_eq!(w.protocol.registry.owner_of(record), Some(minority));
    assert_eq!(w.protocol.vault.balance_of(collection, w.payer), 0);
    assert_eq!(w.protocol.vault.balance_of(collection, minority), 0);
}

#[test]
fn royalty_quote_and_unit_withdrawal_flow() {
    let mut w = world();
    let receiver = ids::account("royalty-receiver");
    let marketplace = ids::account("marketplace");
    let record = w
        .protocol
        .mint_deed(w.payer, land_request(&w), Some(w.usd), &mut w.bank)
        .unwrap();

    {
        let unit = w.protocol.units.get_mut(w.unit).unwrap();
        unit.grant_role(w.acme_owner, UnitRole::FeeManager, w.acme_owner)
            .unwrap();
        unit.add_whitelisted_token(w.acme_owner, w.usd).unwrap();
        unit.set_royalty_fee_percentage(w.acme_owner, 500).unwrap();
        unit.set_royalty_receiver(w.acme_owner, receiver).unwrap();
    }

    // 5% of 10_000 gross, net of the 1000 bps protocol commission.
    let quote = w.protocol.royalty_info(record, 10_000).unwrap();
    assert_eq!(quote, Some((receiver, 450)));

    // The marketplace settles the royalty into the unit, and the payout
    // applies the same split the quote promised.
    w.bank.fund(w.usd, marketplace, 500);
    w.protocol
        .units
        .get_mut(w.unit)
        .unwrap()
        .deposit_royalty(marketplace, w.usd, 500, &mut w.bank)
        .unwrap();
    let net = w
        .protocol
        .withdraw_unit_royalties(receiver, w.unit, w.usd, &mut w.bank)
        .unwrap();
    assert_eq!(net, 450);
    assert_eq!(w.bank.balance_of(w.usd, receiver), 450);
    assert_eq!(w.bank.balance_of(w.usd, w.protocol_receiver), 50);
}

#[test]
fn validator_self_mint_is_trusted_and_uses_validator_fee() {
    let mut w = world();
    w.bank.fund(w.usd, w.asserter, 100);
    w.bank
        .approve(w.usd, w.asserter, w.protocol.settlement.escrow(), 100);

    let record = w
        .protocol
        .mint_deed(
            w.asserter,
            MintRequest::new(w.asserter, AssetType::Land)
                .with_validator(w.unit)
                .with_operating_agreement("agreement://standard"),
            Some(w.usd),
            &mut w.bank,
        )
        .unwrap();

    assert!(w.protocol.registry.record(record).unwrap().is_validated);
    // Validator fee is 40; default validator commission is 300 bps -> 1.
    assert_eq!(w.bank.balance_of(w.usd, w.asserter), 60);
    assert_eq!(w.protocol.settlement.service_fee_balance(w.usd), 39);
    assert_eq!(
        w.protocol.settlement.commission_balance(w.acme_owner, w.usd),
        1
    );
}

#[test]
fn events_cover_the_whole_flow_for_indexing() {
    let mut w = world();
    let record = w
        .protocol
        .mint_deed(w.payer, land_request(&w), Some(w.usd), &mut w.bank)
        .unwrap();
    w.protocol
        .registry
        .set_trait(
            w.payer,
            record,
            "country",
            TraitValue::utf8("US"),
            &w.protocol.units,
        )
        .unwrap();
    w.protocol.validate_deed(w.asserter, record).unwrap();

    let registry_events = w.protocol.registry.take_events();
    assert!(registry_events
        .iter()
        .any(|e| matches!(e, cadastre_registry::RegistryEvent::Minted { .. })));
    assert!(registry_events
        .iter()
        .any(|e| matches!(e, cadastre_registry::RegistryEvent::ValidationChanged { .. })));

    let settlement_events = w.protocol.settlement.take_events();
    assert!(settlement_events
        .iter()
        .any(|e| matches!(e, cadastre_settlement::SettlementEvent::FeeCollected { fee: 100, .. })));
}
