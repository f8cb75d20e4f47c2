//! Shared cart registry behaviour over the in-memory store.

mod common;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use common::{Fixture, line};
use tablefront_orderservice::{
    app_error::AppError,
    domain::{
        ItemLine, MAX_LINE_QUANTITY,
        shared_cart::SharedCart,
        user::{Country, Role, User},
    },
    services::SharedCartRegistry,
    store::{SharedCartStore, StoreError},
};
use uuid::Uuid;

fn quantities(cart: &SharedCart) -> Vec<(Uuid, i32)> {
    cart.items
        .iter()
        .map(|item| (item.menu_item.id, item.quantity))
        .collect()
}

// -----------------------------------------------------------------------
// Creation & lookup
// -----------------------------------------------------------------------

#[tokio::test]
async fn share_code_lookup_respects_country() {
    let fx = Fixture::new();
    let carts = &fx.state.shared_carts;

    let cart = carts
        .create(
            &fx.member_in,
            Country::India,
            vec![line(&fx.butter_chicken, 2), line(&fx.paneer_tikka, 1)],
        )
        .await
        .unwrap();
    assert_eq!(cart.share_code.len(), 12);
    assert_eq!(cart.created_by.id, fx.member_in.id);

    let found = carts
        .find_by_code(&cart.share_code, &fx.manager_in)
        .await
        .unwrap();
    assert_eq!(found.id, cart.id);
    assert_eq!(quantities(&found), quantities(&cart));

    let err = carts
        .find_by_code(&cart.share_code, &fx.member_us)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err:?}");
}

#[tokio::test]
async fn unknown_share_code_is_not_found() {
    let fx = Fixture::new();

    let err = fx
        .state
        .shared_carts
        .find_by_code("000000000000", &fx.member_in)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn creation_with_unknown_item_persists_nothing() {
    let fx = Fixture::new();

    let err = fx
        .state
        .shared_carts
        .create(
            &fx.member_in,
            Country::India,
            vec![line(&fx.butter_chicken, 1), ItemLine::new(Uuid::new_v4(), 1)],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
    assert_eq!(fx.store.shared_cart_count(), 0);
}

#[tokio::test]
async fn creation_merges_repeated_menu_items() {
    let fx = Fixture::new();

    let cart = fx
        .state
        .shared_carts
        .create(
            &fx.member_in,
            Country::India,
            vec![line(&fx.butter_chicken, 1), line(&fx.butter_chicken, 2)],
        )
        .await
        .unwrap();

    assert_eq!(quantities(&cart), vec![(fx.butter_chicken.id, 3)]);
}

#[tokio::test]
async fn listing_is_scoped_by_country_and_creator() {
    let fx = Fixture::new();
    let carts = &fx.state.shared_carts;

    let first = carts
        .create(&fx.member_in, Country::India, vec![line(&fx.butter_chicken, 1)])
        .await
        .unwrap();
    let second = carts
        .create(&fx.manager_in, Country::India, vec![line(&fx.paneer_tikka, 1)])
        .await
        .unwrap();
    let american = carts
        .create(&fx.member_us, Country::America, vec![line(&fx.cheeseburger, 1)])
        .await
        .unwrap();

    let ids: Vec<Uuid> = carts
        .find_by_country(&fx.other_member_in)
        .await
        .unwrap()
        .iter()
        .map(|cart| cart.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let ids: Vec<Uuid> = carts
        .find_by_country(&fx.manager_us)
        .await
        .unwrap()
        .iter()
        .map(|cart| cart.id)
        .collect();
    assert_eq!(ids, vec![american.id]);

    let mine = carts.find_mine(fx.member_in.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, first.id);
}

// -----------------------------------------------------------------------
// Share code allocation
// -----------------------------------------------------------------------

#[tokio::test]
async fn colliding_share_code_is_regenerated() {
    let fx = Fixture::new();

    let taken = SharedCartRegistry::new(fx.store.clone())
        .with_code_generator(Arc::new(|| "aaaaaaaaaaaa".to_string()))
        .create(&fx.member_in, Country::India, vec![line(&fx.butter_chicken, 1)])
        .await
        .unwrap();
    assert_eq!(taken.share_code, "aaaaaaaaaaaa");

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let registry = SharedCartRegistry::new(fx.store.clone()).with_code_generator(Arc::new(
        move || match counter.fetch_add(1, Ordering::SeqCst) {
            0 => "aaaaaaaaaaaa".to_string(),
            _ => "bbbbbbbbbbbb".to_string(),
        },
    ));

    let cart = registry
        .create(&fx.member_in, Country::India, vec![line(&fx.paneer_tikka, 1)])
        .await
        .unwrap();
    assert_eq!(cart.share_code, "bbbbbbbbbbbb");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn exhausted_share_code_attempts_conflict() {
    let fx = Fixture::new();
    let registry = SharedCartRegistry::new(fx.store.clone())
        .with_code_attempts(3)
        .with_code_generator(Arc::new(|| "cccccccccccc".to_string()));

    registry
        .create(&fx.member_in, Country::India, vec![line(&fx.butter_chicken, 1)])
        .await
        .unwrap();

    let err = registry
        .create(&fx.member_in, Country::India, vec![line(&fx.butter_chicken, 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "{err:?}");
    assert_eq!(fx.store.shared_cart_count(), 1);
}

// -----------------------------------------------------------------------
// Adding items
// -----------------------------------------------------------------------

#[tokio::test]
async fn adding_the_same_item_twice_sums_quantities() {
    let fx = Fixture::new();
    let carts = &fx.state.shared_carts;

    let cart = carts
        .create(&fx.member_in, Country::India, vec![line(&fx.paneer_tikka, 1)])
        .await
        .unwrap();

    carts
        .add_items(cart.id, vec![line(&fx.butter_chicken, 2)], &fx.member_in)
        .await
        .unwrap();
    let updated = carts
        .add_items(cart.id, vec![line(&fx.butter_chicken, 5)], &fx.other_member_in)
        .await
        .unwrap();

    let butter_rows: Vec<i32> = updated
        .items
        .iter()
        .filter(|item| item.menu_item.id == fx.butter_chicken.id)
        .map(|item| item.quantity)
        .collect();
    assert_eq!(butter_rows, vec![7]);
    assert_eq!(updated.items.len(), 2);
}

#[tokio::test]
async fn only_users_of_the_carts_country_may_add() {
    let fx = Fixture::new();
    let carts = &fx.state.shared_carts;

    let cart = carts
        .create(&fx.member_in, Country::India, vec![line(&fx.butter_chicken, 1)])
        .await
        .unwrap();

    let err = carts
        .add_items(cart.id, vec![line(&fx.butter_chicken, 1)], &fx.manager_us)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err:?}");

    let err = carts
        .add_items(Uuid::new_v4(), vec![line(&fx.butter_chicken, 1)], &fx.member_in)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn adding_an_unknown_item_leaves_the_cart_untouched() {
    let fx = Fixture::new();
    let carts = &fx.state.shared_carts;

    let cart = carts
        .create(&fx.member_in, Country::India, vec![line(&fx.butter_chicken, 1)])
        .await
        .unwrap();

    let err = carts
        .add_items(
            cart.id,
            vec![line(&fx.butter_chicken, 4), ItemLine::new(Uuid::new_v4(), 1)],
            &fx.member_in,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");

    let unchanged = carts
        .find_by_code(&cart.share_code, &fx.member_in)
        .await
        .unwrap();
    assert_eq!(quantities(&unchanged), vec![(fx.butter_chicken.id, 1)]);
}

#[tokio::test]
async fn additions_past_the_quantity_cap_change_nothing() {
    let fx = Fixture::new();
    let carts = &fx.state.shared_carts;

    let cart = carts
        .create(
            &fx.member_in,
            Country::India,
            vec![
                line(&fx.butter_chicken, 1),
                line(&fx.paneer_tikka, MAX_LINE_QUANTITY),
            ],
        )
        .await
        .unwrap();
    let before = quantities(&cart);

    let err = carts
        .add_items(
            cart.id,
            vec![line(&fx.butter_chicken, 1), line(&fx.paneer_tikka, 1)],
            &fx.member_in,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)), "{err:?}");

    // The store itself rejects the whole batch, not just the offending line.
    let err = fx
        .store
        .merge_shared_cart_items(
            cart.id,
            vec![line(&fx.butter_chicken, 1), line(&fx.paneer_tikka, 1)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)), "{err:?}");

    let after = carts
        .find_by_code(&cart.share_code, &fx.member_in)
        .await
        .unwrap();
    assert_eq!(quantities(&after), before);
}

#[tokio::test]
async fn unprovisioned_creator_is_unauthorized() {
    let fx = Fixture::new();
    let stranger = User::new(Uuid::new_v4(), "ghost@test.com", Role::Member, Country::India);

    let err = fx
        .state
        .shared_carts
        .create(&stranger, Country::India, vec![line(&fx.butter_chicken, 1)])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthorized(_)), "{err:?}");
    assert_eq!(fx.store.shared_cart_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_additions_never_lose_an_increment() {
    let fx = Fixture::new();
    let carts = fx.state.shared_carts.clone();

    let cart = carts
        .create(&fx.member_in, Country::India, vec![line(&fx.butter_chicken, 1)])
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..32 {
        let carts = carts.clone();
        let user = fx.other_member_in.clone();
        let item = line(&fx.butter_chicken, 1);
        handles.push(tokio::spawn(async move {
            carts.add_items(cart.id, vec![item], &user).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let cart = carts.find_by_code(&cart.share_code, &fx.member_in).await.unwrap();
    assert_eq!(quantities(&cart), vec![(fx.butter_chicken.id, 33)]);
}

// -----------------------------------------------------------------------
// Deletion
// -----------------------------------------------------------------------

#[tokio::test]
async fn only_the_creator_may_delete() {
    let fx = Fixture::new();
    let carts = &fx.state.shared_carts;

    let cart = carts
        .create(&fx.member_in, Country::India, vec![line(&fx.butter_chicken, 1)])
        .await
        .unwrap();

    for other in [&fx.other_member_in, &fx.admin_in] {
        let err = carts.delete(cart.id, other.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)), "{err:?}");
    }

    let deleted = carts.delete(cart.id, fx.member_in.id).await.unwrap();
    assert_eq!(deleted.id, cart.id);

    let err = carts
        .find_by_code(&cart.share_code, &fx.member_in)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");

    let err = carts.delete(cart.id, fx.member_in.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
}
