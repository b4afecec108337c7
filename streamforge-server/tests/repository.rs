//! Store/repository integration tests against a fresh in-memory database
//! per test (spec.md §8 properties 10-12).

use streamforge_core::{
    AlertPatch, EventType, NewAlert, NewTemplate, NewVariation, TemplatePatch,
};
use streamforge_server::repository::ConfigRepository;
use streamforge_server::store::{Store, MIGRATIONS};

async fn repository() -> ConfigRepository {
    let store = Store::open_in_memory().await.expect("open in-memory store");
    ConfigRepository::new(store)
}

#[tokio::test]
async fn builtin_template_update_is_forbidden_and_does_not_mutate() {
    let repo = repository().await;
    let templates = repo.list_templates().await.unwrap();
    let builtin = templates.iter().find(|t| t.is_builtin).expect("seeded builtin template");
    let before = builtin.clone();

    let result = repo
        .update_template(
            builtin.id,
            TemplatePatch {
                name: Some("hijacked".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(streamforge_core::StreamForgeError::Forbidden(_))));

    let after = repo.get_template(builtin.id).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn builtin_template_delete_is_forbidden_and_does_not_mutate() {
    let repo = repository().await;
    let templates = repo.list_templates().await.unwrap();
    let builtin = templates.iter().find(|t| t.is_builtin).unwrap();

    let result = repo.delete_template(builtin.id).await;
    assert!(matches!(result, Err(streamforge_core::StreamForgeError::Forbidden(_))));
    assert!(repo.get_template(builtin.id).await.is_ok());
}

#[tokio::test]
async fn deleting_alert_removes_only_its_own_variations() {
    let repo = repository().await;

    let a1 = repo
        .create_alert(NewAlert {
            event_type: EventType::Follow,
            ..Default::default()
        })
        .await
        .unwrap();
    let a2 = repo
        .create_alert(NewAlert {
            event_type: EventType::Subscribe,
            ..Default::default()
        })
        .await
        .unwrap();

    let v1 = repo
        .create_variation(NewVariation {
            parent_alert_id: a1.id,
            name: "v1".into(),
            condition_type: streamforge_core::ConditionType::Tier,
            condition_value: "3".into(),
            priority: None,
            enabled: None,
            message_template: None,
            sound_path: None,
            sound_volume: None,
            image_path: None,
            animation_in: None,
            animation_out: None,
            custom_css: None,
        })
        .await
        .unwrap();
    let v2 = repo
        .create_variation(NewVariation {
            parent_alert_id: a2.id,
            name: "v2".into(),
            condition_type: streamforge_core::ConditionType::Tier,
            condition_value: "3".into(),
            priority: None,
            enabled: None,
            message_template: None,
            sound_path: None,
            sound_volume: None,
            image_path: None,
            animation_in: None,
            animation_out: None,
            custom_css: None,
        })
        .await
        .unwrap();

    repo.delete_alert(a1.id).await.unwrap();

    assert!(repo.get_variation(v1.id).await.is_err());
    assert!(repo.get_variation(v2.id).await.is_ok());
    assert!(repo.get_alert(a2.id).await.is_ok());
}

#[tokio::test]
async fn update_always_bumps_updated_at_even_with_no_fields_set() {
    let repo = repository().await;
    let alert = repo
        .create_alert(NewAlert {
            event_type: EventType::Follow,
            ..Default::default()
        })
        .await
        .unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let updated = repo.update_alert(alert.id, AlertPatch::default()).await.unwrap();
    assert!(updated.updated_at > alert.updated_at);
    assert_eq!(updated.name, alert.name);
}

#[tokio::test]
async fn migrations_apply_each_script_exactly_once() {
    let store = Store::open_in_memory().await.unwrap();
    // Re-running the runner against the same connection must be a no-op:
    // every migration's filename is already present in `_migrations`.
    for _ in 0..3 {
        store.run_migrations_for_test().await.unwrap();
    }

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(applied as usize, MIGRATIONS.len());
}

#[tokio::test]
async fn setting_get_returns_none_when_absent() {
    let repo = repository().await;
    assert!(repo.get_setting("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn setting_set_is_upsert() {
    let repo = repository().await;
    repo.set_setting("theme", "dark").await.unwrap();
    let updated = repo.set_setting("theme", "light").await.unwrap();
    assert_eq!(updated.value, "light");

    let settings = repo.list_settings().await.unwrap();
    assert_eq!(settings.iter().filter(|s| s.key == "theme").count(), 1);
}

#[tokio::test]
async fn event_log_prune_deletes_strictly_older_rows_and_returns_count() {
    let repo = repository().await;

    for i in 0..3 {
        repo.create_event_log(streamforge_core::NewEventLog {
            platform: "test".into(),
            event_type: EventType::Follow,
            username: format!("user{i}"),
            display_name: None,
            amount: None,
            message: None,
            metadata: None,
            alert_fired: false,
        })
        .await
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let all = repo
        .list_event_log(&streamforge_core::EventLogFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let cutoff = all[1].timestamp;
    let deleted = repo.delete_event_log_before(cutoff).await.unwrap();

    let remaining = repo
        .list_event_log(&streamforge_core::EventLogFilter::default())
        .await
        .unwrap();
    assert!(remaining.iter().all(|r| r.timestamp >= cutoff));
    assert_eq!(deleted as usize, 3 - remaining.len());
}
