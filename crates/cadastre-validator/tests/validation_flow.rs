//! Validator unit behavior against a live registry
//!
//! Criteria evaluation, the validation write path, royalty and fee
//! configuration bounds, and pull-based withdrawals with the commission
//! split.

use assert_matches::assert_matches;
use cadastre_core::{AccountId, AssetType, BasisPoints, RecordId, TokenBank, TraitValue};
use cadastre_directory::ValidatorDirectory;
use cadastre_registry::{AssetRegistry, MintRequest, RegistryRole};
use cadastre_testkit::{ids, MemoryBank, StaticCommission};
use cadastre_validator::{UnitError, UnitRole, ValidationCriteria, ValidatorUnit};
use std::collections::BTreeSet;

struct Fixture {
    minter: AccountId,
    asserter: AccountId,
    registry: AssetRegistry,
    unit: ValidatorUnit,
}

fn fixture() -> Fixture {
    cadastre_testkit::init_tracing();
    let admin = ids::account("admin");
    let minter = ids::account("minter");
    let asserter = ids::account("asserter");
    let unit_id = ids::unit("acme");

    let mut directory = ValidatorDirectory::new(admin);
    directory
        .register(
            admin,
            unit_id,
            "Acme Title",
            "",
            ids::account("acme-owner"),
            BTreeSet::from([AssetType::Land]),
        )
        .unwrap();

    let mut registry = AssetRegistry::new(admin, "cadastre://records");
    registry
        .grant_role(admin, RegistryRole::Minter, minter)
        .unwrap();

    let mut unit = ValidatorUnit::new(unit_id, admin, ids::account("acme-treasury"));
    unit.grant_role(admin, UnitRole::Validator, asserter).unwrap();
    unit.grant_role(admin, UnitRole::CriteriaManager, admin)
        .unwrap();
    unit.grant_role(admin, UnitRole::FeeManager, admin).unwrap();
    unit.set_criteria(
        admin,
        AssetType::Land,
        ValidationCriteria {
            required_traits: vec!["country".into(), "state".into()],
            additional_criteria: "title search within 30 days".into(),
            require_operating_agreement: false,
            require_definition: false,
        },
    )
    .unwrap();

    let record_request = MintRequest::new(minter, AssetType::Land).with_validator(unit_id);
    let mut f = Fixture {
        minter,
        asserter,
        registry,
        unit,
    };
    let id = f
        .registry
        .mint(minter, record_request, &directory, &f.unit)
        .unwrap();
    assert_eq!(id, RecordId::from_raw(1));
    f
}

fn record() -> RecordId {
    RecordId::from_raw(1)
}

fn admin() -> AccountId {
    ids::account("admin")
}

#[test]
fn missing_required_trait_fails_even_after_prior_validation() {
    let mut f = fixture();
    f.registry
        .set_trait(f.minter, record(), "country", TraitValue::utf8("US"), &f.unit)
        .unwrap();
    f.registry
        .set_trait(f.minter, record(), "state", TraitValue::utf8("TX"), &f.unit)
        .unwrap();

    assert!(f
        .unit
        .validate_deed(f.asserter, record(), &mut f.registry)
        .unwrap());
    assert!(f.registry.record(record()).unwrap().is_validated);

    // The state trait disappears; re-evaluation must flip the flag off.
    f.registry
        .remove_trait(f.minter, record(), "state", &f.unit)
        .unwrap();
    assert!(!f
        .unit
        .validate_deed(f.asserter, record(), &mut f.registry)
        .unwrap());
    assert!(!f.registry.record(record()).unwrap().is_validated);
}

#[test]
fn empty_required_trait_counts_as_missing() {
    let mut f = fixture();
    f.registry
        .set_trait(f.minter, record(), "country", TraitValue::utf8("US"), &f.unit)
        .unwrap();
    f.registry
        .set_trait(f.minter, record(), "state", TraitValue::utf8(""), &f.unit)
        .unwrap();

    assert!(!f
        .unit
        .validate_deed(f.asserter, record(), &mut f.registry)
        .unwrap());
}

#[test]
fn unsupported_asset_type_fails_validation() {
    let mut f = fixture();
    f.unit.clear_criteria(admin(), AssetType::Land).unwrap();
    assert!(!f
        .unit
        .validate_deed(f.asserter, record(), &mut f.registry)
        .unwrap());
}

#[test]
fn operating_agreement_must_resolve_when_required() {
    let mut f = fixture();
    f.unit
        .set_criteria(
            admin(),
            AssetType::Land,
            ValidationCriteria {
                require_operating_agreement: true,
                ..Default::default()
            },
        )
        .unwrap();

    // The minted record carries the default agreement URI, but no name is
    // registered for it yet.
    assert!(!f
        .unit
        .validate_deed(f.asserter, record(), &mut f.registry)
        .unwrap());

    f.unit
        .register_operating_agreement(admin(), "agreement://default", "Standard LLC Agreement")
        .unwrap();
    assert!(f
        .unit
        .validate_deed(f.asserter, record(), &mut f.registry)
        .unwrap());
}

#[test]
fn definition_must_be_non_empty_when_required() {
    let mut f = fixture();
    f.unit
        .set_criteria(
            admin(),
            AssetType::Land,
            ValidationCriteria {
                require_definition: true,
                ..Default::default()
            },
        )
        .unwrap();

    assert!(!f
        .unit
        .validate_deed(f.asserter, record(), &mut f.registry)
        .unwrap());

    f.registry
        .update_metadata(
            f.minter,
            record(),
            "",
            "agreement://default",
            "parcel 12, travis county",
            "",
            &f.unit,
        )
        .unwrap();
    assert!(f
        .unit
        .validate_deed(f.asserter, record(), &mut f.registry)
        .unwrap());
}

#[test]
fn non_validator_cannot_assert() {
    let mut f = fixture();
    let err = f
        .unit
        .validate_deed(ids::account("stranger"), record(), &mut f.registry)
        .unwrap_err();
    assert_matches!(err, UnitError::MissingRole("validator"));
}

#[test]
fn invalidate_is_an_explicit_negative_assertion() {
    let mut f = fixture();
    f.registry
        .set_trait(f.minter, record(), "country", TraitValue::utf8("US"), &f.unit)
        .unwrap();
    f.registry
        .set_trait(f.minter, record(), "state", TraitValue::utf8("TX"), &f.unit)
        .unwrap();
    f.unit
        .validate_deed(f.asserter, record(), &mut f.registry)
        .unwrap();

    f.unit
        .invalidate_deed(f.asserter, record(), &mut f.registry)
        .unwrap();
    assert!(!f.registry.record(record()).unwrap().is_validated);
}

#[test]
fn royalty_configuration_bounds() {
    let mut f = fixture();
    assert_matches!(
        f.unit.set_royalty_fee_percentage(admin(), 501),
        Err(UnitError::RoyaltyAboveCap { got: 501, cap: 500 })
    );
    f.unit.set_royalty_fee_percentage(admin(), 500).unwrap();
    assert_eq!(
        f.unit.royalty_fee_percentage(),
        BasisPoints::new(500).unwrap()
    );

    assert_matches!(
        f.unit.set_royalty_receiver(admin(), AccountId::nil()),
        Err(UnitError::NilRoyaltyReceiver)
    );
    f.unit
        .set_royalty_receiver(admin(), ids::account("receiver"))
        .unwrap();
}

#[test]
fn fee_schedule_requires_whitelisting() {
    let mut f = fixture();
    let usd = ids::token("usd");

    assert_matches!(
        f.unit.set_service_fee(admin(), usd, 100),
        Err(UnitError::TokenNotWhitelisted(_))
    );
    f.unit.add_whitelisted_token(admin(), usd).unwrap();
    assert_matches!(
        f.unit.add_whitelisted_token(admin(), usd),
        Err(UnitError::TokenAlreadyWhitelisted(_))
    );
    f.unit.set_service_fee(admin(), usd, 100).unwrap();
    assert_eq!(f.unit.service_fee(usd), Some(100));

    f.unit.remove_whitelisted_token(admin(), usd).unwrap();
    assert_eq!(f.unit.service_fee(usd), None);
}

#[test]
fn agreement_registry_rejects_duplicates_and_unknown_renames() {
    let mut f = fixture();
    f.unit
        .register_operating_agreement(admin(), "agreement://a", "A")
        .unwrap();
    assert_matches!(
        f.unit
            .register_operating_agreement(admin(), "agreement://a", "A2"),
        Err(UnitError::AgreementAlreadyRegistered(_))
    );
    f.unit
        .set_operating_agreement_name(admin(), "agreement://a", "A2")
        .unwrap();
    assert_eq!(f.unit.operating_agreement_name("agreement://a"), Some("A2"));

    assert_matches!(
        f.unit.set_operating_agreement_name(admin(), "agreement://b", "B"),
        Err(UnitError::AgreementNotRegistered(_))
    );
    f.unit
        .remove_operating_agreement_name(admin(), "agreement://a")
        .unwrap();
    assert!(!f.unit.validate_operating_agreement("agreement://a"));
}

#[test]
fn royalty_withdrawal_splits_commission_and_zeroes() {
    let mut f = fixture();
    let usd = ids::token("usd");
    let receiver = ids::account("receiver");
    let payer = ids::account("marketplace");
    let protocol = ids::account("protocol");
    let mut bank = MemoryBank::new();

    f.unit.add_whitelisted_token(admin(), usd).unwrap();
    f.unit.set_royalty_receiver(admin(), receiver).unwrap();
    bank.fund(usd, payer, 1_000);
    f.unit.deposit_royalty(payer, usd, 1_000, &mut bank).unwrap();
    assert_eq!(f.unit.royalty_balance(usd), 1_000);

    let commission = StaticCommission {
        bps: BasisPoints::new(1_000).unwrap(),
        receiver: protocol,
    };
    let net = f
        .unit
        .withdraw_royalties(receiver, usd, &mut bank, Some(&commission))
        .unwrap();
    assert_eq!(net, 900);
    assert_eq!(bank.balance_of(usd, receiver), 900);
    assert_eq!(bank.balance_of(usd, protocol), 100);
    assert_eq!(f.unit.royalty_balance(usd), 0);

    // Second consecutive withdrawal reverts.
    assert_matches!(
        f.unit
            .withdraw_royalties(receiver, usd, &mut bank, Some(&commission)),
        Err(UnitError::NothingToWithdraw(_))
    );
}

#[test]
fn service_fee_withdrawal_requires_fee_manager() {
    let mut f = fixture();
    let usd = ids::token("usd");
    let payer = ids::account("client");
    let mut bank = MemoryBank::new();

    f.unit.add_whitelisted_token(admin(), usd).unwrap();
    bank.fund(usd, payer, 250);
    f.unit
        .deposit_service_fee(payer, usd, 250, &mut bank)
        .unwrap();

    assert_matches!(
        f.unit.withdraw_service_fees(
            ids::account("stranger"),
            usd,
            &mut bank,
            None::<&StaticCommission>
        ),
        Err(UnitError::MissingRole("fee-manager"))
    );

    let net = f
        .unit
        .withdraw_service_fees(admin(), usd, &mut bank, None::<&StaticCommission>)
        .unwrap();
    assert_eq!(net, 250);
    assert_eq!(f.unit.service_fee_balance(usd), 0);
}
