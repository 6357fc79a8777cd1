use bson::oid::ObjectId;
use corral_db::models::RoleType;
use corral_services::invites::{Redemption, RejectReason};

use crate::fixtures::test_db::TestDb;

#[tokio::test]
async fn last_use_is_consumed_exactly_once() {
    let app = TestDb::spawn().await;
    let invites = app.invites();

    let seeded = app.seed_code(RoleType::Empleado, 1, None).await;
    let code = seeded.code().to_string();

    let (a, b) = tokio::join!(
        invites.redeem(&code, ObjectId::new()),
        invites.redeem(&code, ObjectId::new()),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let successes = outcomes
        .iter()
        .filter(|o| matches!(o, Redemption::Redeemed(_)))
        .count();
    assert_eq!(successes, 1, "exactly one redeemer may win: {outcomes:?}");

    // The loser learns the code was consumed out from under it.
    let rejection = outcomes
        .iter()
        .find_map(|o| match o {
            Redemption::Rejected(reason) => Some(*reason),
            Redemption::Redeemed(_) => None,
        })
        .expect("one outcome must be a rejection");
    assert!(
        matches!(
            rejection,
            RejectReason::Exhausted | RejectReason::Conflict | RejectReason::NotFound
        ),
        "got {rejection:?}"
    );

    assert!(app
        .invitations()
        .find_active_by_code(&code)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn contended_code_never_over_redeems() {
    let app = TestDb::spawn().await;
    let invites = app.invites();

    let seeded = app.seed_code(RoleType::Empleado, 3, None).await;
    let code = seeded.code().to_string();

    let outcomes = futures::future::join_all(
        (0..5).map(|_| invites.redeem(&code, ObjectId::new())),
    )
    .await;

    let mut successes = 0;
    let mut rejections = 0;
    for outcome in outcomes {
        match outcome.unwrap() {
            Redemption::Redeemed(info) => {
                successes += 1;
                assert!(info.uses_remaining < 3);
            }
            Redemption::Rejected(_) => rejections += 1,
        }
    }

    assert_eq!(successes, 3, "a 3-use code grants exactly 3 redemptions");
    assert_eq!(rejections, 2);

    // Fully consumed: the record is gone.
    assert!(app
        .invitations()
        .find_active_by_code(&code)
        .await
        .unwrap()
        .is_none());
}
