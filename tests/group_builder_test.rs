use repo_fixtures::utils::error::ErrorCategory;
use repo_fixtures::utils::logger;
use repo_fixtures::{
    CollectionBuilder, CommunityBuilder, DSpaceObject, EPersonBuilder, FixtureHarness, Group,
    GroupBuilder, ItemBuilder,
};

fn harness() -> FixtureHarness {
    logger::init_test_logger();
    FixtureHarness::default()
}

#[tokio::test]
async fn test_named_group_with_member_is_removed_on_teardown() {
    let harness = harness();
    let ctx = harness.admin_context();

    let alice = EPersonBuilder::create_eperson(&harness, &ctx)
        .await
        .with_email("alice@example.com")
        .build()
        .await
        .unwrap();

    let reviewers = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("reviewers")
        .add_member(&alice)
        .await
        .build()
        .await
        .unwrap();

    assert_eq!(reviewers.name(), Some("reviewers"));
    assert_eq!(reviewers.members.iter().copied().collect::<Vec<_>>(), vec![alice.id]);
    assert!(reviewers.member_groups.is_empty());
    assert!(!harness.errors().has_errors());

    assert!(harness.teardown().await.is_empty());
    assert!(!harness.services().store().contains(reviewers.id).await);
    assert!(!harness.services().store().contains(alice.id).await);
}

#[tokio::test]
async fn test_built_group_is_visible_from_fresh_session() {
    let harness = harness();
    let ctx = harness.admin_context();

    let group = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("librarians")
        .build()
        .await
        .unwrap();

    let fresh = harness.new_context();
    let found = harness
        .services()
        .group_service()
        .find(&fresh, group.id)
        .await
        .unwrap();
    assert_eq!(found, Some(group));
}

#[tokio::test]
async fn test_nested_group_is_direct_member_of_parent() {
    let harness = harness();
    let ctx = harness.admin_context();

    let mut parent = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("parent")
        .build()
        .await
        .unwrap();
    let nested = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_parent(&mut parent)
        .await
        .with_name("nested")
        .build()
        .await
        .unwrap();

    assert!(parent.has_direct_member_group(&nested));
    let stored: Group = harness.services().store().get(parent.id).await.unwrap();
    assert!(stored.has_direct_member_group(&nested));
    assert_eq!(nested.name(), Some("nested"));

    assert!(harness.teardown().await.is_empty());
    assert!(!harness.services().store().contains(parent.id).await);
    assert!(!harness.services().store().contains(nested.id).await);
}

#[tokio::test]
async fn test_parent_built_after_child_keeps_nested_membership() {
    let harness = harness();
    let ctx = harness.admin_context();

    let parent_builder = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("P");
    let mut parent = parent_builder.group().cloned().unwrap();

    let nested = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_parent(&mut parent)
        .await
        .with_name("nested")
        .build()
        .await
        .unwrap();

    let built = parent_builder.build().await.unwrap();
    assert_eq!(built.name(), Some("P"));
    assert!(built.has_direct_member_group(&nested));

    let stored: Group = harness.services().store().get(built.id).await.unwrap();
    assert!(stored.has_direct_member_group(&nested));
    assert!(!harness.errors().has_errors());

    assert!(harness.teardown().await.is_empty());
    assert!(!harness.services().store().contains(built.id).await);
    assert!(!harness.services().store().contains(nested.id).await);
}

#[tokio::test]
async fn test_membership_through_parent_is_transitive() {
    let harness = harness();
    let ctx = harness.admin_context();

    let bob = EPersonBuilder::create_eperson(&harness, &ctx)
        .await
        .build()
        .await
        .unwrap();
    let mut editors = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("editors")
        .build()
        .await
        .unwrap();
    GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("copy editors")
        .with_parent(&mut editors)
        .await
        .add_member(&bob)
        .await
        .build()
        .await
        .unwrap();

    let groups = harness.services().group_service();
    assert!(groups.is_member(&ctx, &editors, &bob).await.unwrap());
    assert!(!editors.members.contains(&bob.id));
}

#[tokio::test]
async fn test_delete_group_by_id() {
    let harness = harness();
    let ctx = harness.admin_context();

    let group = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("short lived")
        .build()
        .await
        .unwrap();

    GroupBuilder::delete_group(harness.services(), group.id)
        .await
        .unwrap();

    let fresh = harness.new_context();
    let found = harness
        .services()
        .group_service()
        .find(&fresh, group.id)
        .await
        .unwrap();
    assert!(found.is_none());

    // unknown ids are ignored, and teardown tolerates the missing group
    GroupBuilder::delete_group(harness.services(), group.id)
        .await
        .unwrap();
    assert!(harness.teardown().await.is_empty());
}

#[tokio::test]
async fn test_admin_group_for_non_container_is_recorded() {
    let harness = harness();
    let ctx = harness.admin_context();

    let community = CommunityBuilder::create_community(&harness, &ctx)
        .await
        .build()
        .await
        .unwrap();
    let collection = CollectionBuilder::create_collection(&harness, &ctx, &community)
        .await
        .build()
        .await
        .unwrap();
    let item = ItemBuilder::create_item(&harness, &ctx, &collection)
        .await
        .with_title("Not a container")
        .build()
        .await
        .unwrap();

    let built = GroupBuilder::create_admin_group(&harness, &ctx, &DSpaceObject::Item(item))
        .await
        .with_name("never")
        .add_member(&Default::default())
        .await
        .build()
        .await;

    assert!(built.is_none());
    assert_eq!(harness.errors().categories(), vec![ErrorCategory::Misuse]);
    assert!(harness.errors().messages()[0].contains("Type: ITEM"));
    assert!(harness.teardown().await.is_empty());
}

#[tokio::test]
async fn test_admin_group_dispatches_on_container_kind() {
    let harness = harness();
    let ctx = harness.admin_context();

    let community = CommunityBuilder::create_community(&harness, &ctx)
        .await
        .build()
        .await
        .unwrap();
    let group = GroupBuilder::create_admin_group(
        &harness,
        &ctx,
        &DSpaceObject::Community(community.clone()),
    )
    .await
    .build()
    .await
    .unwrap();

    let expected = format!("COMMUNITY_{}_ADMIN", community.id);
    assert_eq!(group.name(), Some(expected.as_str()));
}

#[tokio::test]
async fn test_failures_without_authorization_are_recorded_not_raised() {
    let harness = harness();
    let ctx = harness.new_context();

    let built = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("denied")
        .build()
        .await;

    assert!(built.is_none());
    assert_eq!(
        harness.errors().categories(),
        vec![ErrorCategory::Authorization]
    );
    assert!(harness.cleanups().is_empty());
}

#[tokio::test]
async fn test_duplicate_name_fails_on_build() {
    let harness = harness();
    let ctx = harness.admin_context();

    GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("curators")
        .build()
        .await
        .unwrap();
    let duplicate = GroupBuilder::create_group(&harness, &ctx)
        .await
        .with_name("curators")
        .build()
        .await;

    assert!(duplicate.is_none());
    assert_eq!(harness.errors().categories(), vec![ErrorCategory::Persistence]);

    // both allocated groups are still torn down
    assert_eq!(harness.cleanups().len(), 2);
    assert!(harness.teardown().await.is_empty());
    assert_eq!(harness.services().store().all::<Group>().await.len(), 2);
}
