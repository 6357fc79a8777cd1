use bson::oid::ObjectId;
use corral_db::models::RoleType;
use corral_services::invites::{Redemption, RejectReason};

use crate::fixtures::seed::{secs_ago, secs_ahead};
use crate::fixtures::test_db::TestDb;

#[tokio::test]
async fn unknown_code_is_rejected_as_not_found() {
    let app = TestDb::spawn().await;
    let invites = app.invites();

    let outcome = invites.redeem("NOPE42", ObjectId::new()).await.unwrap();
    match outcome {
        Redemption::Rejected(reason) => assert_eq!(reason, RejectReason::NotFound),
        Redemption::Redeemed(info) => panic!("unexpected redemption: {info:?}"),
    }
}

#[tokio::test]
async fn three_use_code_counts_down_and_deletes() {
    let app = TestDb::spawn().await;
    let invites = app.invites();
    let dao = app.invitations();

    let issuer = ObjectId::new();
    let created = invites
        .create_code(issuer, RoleType::Veterinario, 3, Some(30), 6)
        .await
        .unwrap();
    assert_eq!(created.uses_remaining, 3);
    assert!(created.active);

    // First two redemptions decrement and keep the record active.
    for expected_remaining in [2u32, 1] {
        let redeemer = ObjectId::new();
        let outcome = invites.redeem(&created.code, redeemer).await.unwrap();
        let info = match outcome {
            Redemption::Redeemed(info) => info,
            Redemption::Rejected(reason) => panic!("rejected: {reason:?}"),
        };
        assert_eq!(info.uses_remaining, expected_remaining);
        assert!(!info.exhausted);
        assert_eq!(info.issuer_id, issuer);
        assert_eq!(info.role_type, RoleType::Veterinario);

        let stored = dao
            .find_active_by_code(&created.code)
            .await
            .unwrap()
            .expect("record should still exist");
        assert_eq!(stored.uses_remaining, expected_remaining);
        assert_eq!(stored.used_by, Some(redeemer));
        assert!(stored.used_at.is_some());
        // Store invariants
        assert!(stored.uses_remaining <= stored.uses_total);
        assert_eq!(stored.active, stored.uses_remaining > 0);
    }

    // Third redemption succeeds and deletes the record.
    let outcome = invites
        .redeem(&created.code, ObjectId::new())
        .await
        .unwrap();
    match outcome {
        Redemption::Redeemed(info) => {
            assert_eq!(info.uses_remaining, 0);
            assert!(info.exhausted);
        }
        Redemption::Rejected(reason) => panic!("rejected: {reason:?}"),
    }

    assert!(dao.find_active_by_code(&created.code).await.unwrap().is_none());
    assert_eq!(dao.base.count(bson::doc! {}).await.unwrap(), 0);
}

#[tokio::test]
async fn expired_code_is_rejected_without_mutation() {
    let app = TestDb::spawn().await;
    let invites = app.invites();

    let seeded = app
        .seed_code(RoleType::Empleado, 2, Some(secs_ago(60)))
        .await;

    let outcome = invites.redeem(seeded.code(), ObjectId::new()).await.unwrap();
    match outcome {
        Redemption::Rejected(reason) => assert_eq!(reason, RejectReason::Expired),
        Redemption::Redeemed(info) => panic!("unexpected redemption: {info:?}"),
    }

    // Record left untouched: still active, uses intact, never marked used.
    let stored = app
        .invitations()
        .find_active_by_code(seeded.code())
        .await
        .unwrap()
        .expect("expired record is not deleted");
    assert!(stored.active);
    assert_eq!(stored.uses_remaining, 2);
    assert!(stored.used_at.is_none());
    assert!(stored.used_by.is_none());
}

#[tokio::test]
async fn check_code_never_mutates() {
    let app = TestDb::spawn().await;
    let invites = app.invites();

    let seeded = app
        .seed_code(RoleType::Supervisor, 1, Some(secs_ahead(3600)))
        .await;

    for _ in 0..3 {
        assert!(invites.check_code(seeded.code()).await.unwrap());
    }

    let stored = app
        .invitations()
        .find_active_by_code(seeded.code())
        .await
        .unwrap()
        .expect("record should be unchanged");
    assert_eq!(stored.uses_remaining, 1);
    assert!(stored.used_at.is_none());

    // A real redemption still works afterwards, and the advisory check
    // flips once the code is gone.
    let outcome = invites.redeem(seeded.code(), ObjectId::new()).await.unwrap();
    assert!(matches!(outcome, Redemption::Redeemed(_)));
    assert!(!invites.check_code(seeded.code()).await.unwrap());
}

#[tokio::test]
async fn lookup_is_case_insensitive() {
    let app = TestDb::spawn().await;
    let invites = app.invites();

    let created = invites
        .create_code(ObjectId::new(), RoleType::Empleado, 1, Some(30), 6)
        .await
        .unwrap();
    assert_eq!(created.code, created.code.to_ascii_uppercase());

    let lowered = created.code.to_ascii_lowercase();
    let outcome = invites.redeem(&lowered, ObjectId::new()).await.unwrap();
    assert!(matches!(outcome, Redemption::Redeemed(_)));
}

#[tokio::test]
async fn revoked_code_is_no_longer_redeemable() {
    let app = TestDb::spawn().await;
    let invites = app.invites();

    let issuer = ObjectId::new();
    let created = invites
        .create_code(issuer, RoleType::Empleado, 5, Some(30), 6)
        .await
        .unwrap();
    let id = created.id.unwrap();

    assert!(invites.revoke_code(issuer, id).await.unwrap());

    let outcome = invites
        .redeem(&created.code, ObjectId::new())
        .await
        .unwrap();
    match outcome {
        Redemption::Rejected(reason) => assert_eq!(reason, RejectReason::NotFound),
        Redemption::Redeemed(info) => panic!("unexpected redemption: {info:?}"),
    }

    // The tombstone remains in the issuer's list and upholds the
    // active == (uses_remaining > 0) invariant.
    let listed = invites.list_codes(issuer).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].active);
    assert_eq!(listed[0].uses_remaining, 0);
}
