use repo_fixtures::builder::{Cleanup, GroupCleanup};
use repo_fixtures::domain::model::EventKind;
use repo_fixtures::utils::logger;
use repo_fixtures::{FixtureConfig, FixtureHarness, GroupBuilder};

fn harness_with(config: FixtureConfig) -> FixtureHarness {
    logger::init_test_logger();
    FixtureHarness::in_memory(config)
}

#[tokio::test]
async fn test_group_cleanup_twice_is_noop() {
    let harness = harness_with(FixtureConfig::default());
    let ctx = harness.admin_context();

    let group = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("twice")
        .build()
        .await
        .unwrap();

    let hook = GroupCleanup::new(harness.services().clone(), group.clone());
    hook.cleanup().await.unwrap();
    assert!(!harness.services().store().contains(group.id).await);
    hook.cleanup().await.unwrap();

    assert!(harness.teardown().await.is_empty());
    assert!(harness.teardown().await.is_empty());
}

#[tokio::test]
async fn test_cleanup_tolerates_group_deleted_by_test() {
    let harness = harness_with(FixtureConfig::default());
    let ctx = harness.admin_context();

    let group = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("deleted in test body")
        .build()
        .await
        .unwrap();
    harness
        .services()
        .group_service()
        .delete(&ctx, &group)
        .await
        .unwrap();

    assert!(harness.teardown().await.is_empty());
}

#[tokio::test]
async fn test_builder_leaves_callers_session_open() {
    let harness = harness_with(FixtureConfig::default());
    let ctx = harness.admin_context();

    GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("pending")
        .build()
        .await
        .unwrap();

    // create and update events wait for the caller to complete its session
    assert_eq!(ctx.pending_events(), 2);
    assert!(harness.services().store().indexed_events().await.is_empty());

    ctx.complete().await.unwrap();
    assert_eq!(harness.services().store().indexed_events().await.len(), 2);
}

#[tokio::test]
async fn test_noindex_cleanup_does_not_index() {
    let harness = harness_with(FixtureConfig::default());
    let ctx = harness.admin_context();

    GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("quiet")
        .build()
        .await
        .unwrap();
    ctx.abort();

    assert!(harness.teardown().await.is_empty());
    assert!(harness.services().store().indexed_events().await.is_empty());
}

#[tokio::test]
async fn test_configured_dispatcher_indexes_cleanup() {
    let config = FixtureConfig::from_toml_str("[cleanup]\ndispatcher = \"default\"\n").unwrap();
    let harness = harness_with(config);
    let ctx = harness.admin_context();

    let group = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("loud")
        .build()
        .await
        .unwrap();
    ctx.abort();

    assert!(harness.teardown().await.is_empty());
    let indexed = harness.services().store().indexed_events().await;
    assert_eq!(indexed.len(), 1);
    assert_eq!(indexed[0].kind, EventKind::Delete);
    assert_eq!(indexed[0].subject_id, group.id);
}

#[test]
fn test_teardown_from_sync_code() {
    let harness = harness_with(FixtureConfig::default());

    let failures = tokio_test::block_on(async {
        let ctx = harness.admin_context();
        GroupBuilder::create_group(&harness, &ctx)
            .await
            .with_name("blocking")
            .build()
            .await
            .unwrap();
        harness.teardown().await
    });

    assert!(failures.is_empty());
    let remaining = tokio_test::block_on(harness.services().store().all::<repo_fixtures::Group>());
    assert_eq!(remaining.len(), 2);
}
