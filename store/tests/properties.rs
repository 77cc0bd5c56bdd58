//! Property-based tests for grant persistence.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use oauth2_kv_store::providers::{KeyValueStore, ReadConsistency};
use oauth2_kv_store::records::{id_key, BasicRecord, IndexRecord};
use oauth2_kv_store::GrantStore;
use oauth2_kv_store_testing::helpers::memory_token_store;
use oauth2_kv_store_testing::properties::{access_grant, code_grant, refresh_grant};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build")
}

proptest! {
    #[test]
    fn prop_code_grant_resolves_by_code(grant in code_grant()) {
        let (store, _backend) = memory_token_store();

        let found = runtime().block_on(async {
            store.create(&grant).await.unwrap();
            store.get_by_code(&grant.code).await.unwrap()
        });

        prop_assert_eq!(found, Some(grant));
    }

    #[test]
    fn prop_access_grant_resolves_by_access(grant in access_grant()) {
        let (store, _backend) = memory_token_store();

        let found = runtime().block_on(async {
            store.create(&grant).await.unwrap();
            store.get_by_access(&grant.access).await.unwrap()
        });

        prop_assert_eq!(found, Some(grant));
    }

    #[test]
    fn prop_refresh_grant_resolves_by_either_token(grant in refresh_grant()) {
        let (store, _backend) = memory_token_store();

        let (by_access, by_refresh) = runtime().block_on(async {
            store.create(&grant).await.unwrap();
            (
                store.get_by_access(&grant.access).await.unwrap(),
                store.get_by_refresh(&grant.refresh).await.unwrap(),
            )
        });

        prop_assert_eq!(by_access, Some(grant.clone()));
        prop_assert_eq!(by_refresh, Some(grant));
    }

    #[test]
    fn prop_revoked_token_stops_resolving(grant in refresh_grant()) {
        let (store, _backend) = memory_token_store();

        let (by_access, by_refresh) = runtime().block_on(async {
            store.create(&grant).await.unwrap();
            store.remove_by_refresh(&grant.refresh).await.unwrap();
            (
                store.get_by_access(&grant.access).await.unwrap(),
                store.get_by_refresh(&grant.refresh).await.unwrap(),
            )
        });

        prop_assert_eq!(by_access, Some(grant));
        prop_assert_eq!(by_refresh, None);
    }

    #[test]
    fn prop_stored_expiries_follow_grant(grant in refresh_grant()) {
        let (store, backend) = memory_token_store();

        let (basic, access, refresh) = runtime().block_on(async {
            store.create(&grant).await.unwrap();
            let read = |table: &'static str, id: String| {
                let backend = backend.clone();
                async move {
                    backend
                        .get_item(table, &id_key(&id), ReadConsistency::Eventual)
                        .await
                        .unwrap()
                        .unwrap()
                }
            };
            (
                read("oauth2_basic", "basic-1".to_string()).await,
                read("oauth2_access", grant.access.clone()).await,
                read("oauth2_refresh", grant.refresh.clone()).await,
            )
        });

        let basic = BasicRecord::from_item("oauth2_basic", &basic).unwrap();
        let access = IndexRecord::from_item("oauth2_access", &access).unwrap();
        let refresh = IndexRecord::from_item("oauth2_refresh", &refresh).unwrap();

        // No code: the basic record lives exactly as long as the refresh token.
        prop_assert_eq!(basic.expired_at, grant.refresh_expires_at());
        prop_assert_eq!(access.expired_at, grant.access_expires_at());
        prop_assert_eq!(refresh.expired_at, grant.refresh_expires_at());
    }

    #[test]
    fn prop_basic_expiry_is_never_later_than_code_or_refresh(
        grant in code_grant(),
        refresh in refresh_grant(),
    ) {
        let combined = grant.with_refresh(
            refresh.refresh.clone(),
            refresh.refresh_created_at,
            refresh.refresh_expires_in,
        );
        let expires = combined.basic_expires_at();

        prop_assert!(expires <= combined.code_expires_at());
        prop_assert!(expires <= combined.refresh_expires_at());
        prop_assert!(
            expires == combined.code_expires_at() || expires == combined.refresh_expires_at()
        );
    }
}
