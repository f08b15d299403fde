//! End-to-end progression through every phase of an assessment.

mod common;

use std::sync::Arc;

use common::{catalog, ids, open_memory, rules, sort_all, story};
use valueslens::adapters::FileBlobStore;
use valueslens::domain::models::{
    Category, CommitmentUpdate, DefinitionEdit, Phase, SelectionPlan, UndoOutcome,
};
use valueslens::domain::ports::BlobStore;
use valueslens::services::{DefinitionGateway, LoadOutcome, SessionManager, SESSION_KEY};
use valueslens::DomainError;

#[tokio::test]
async fn test_full_assessment_reaches_share() {
    let catalog = catalog();
    let (_, mut manager) = open_memory().await;
    assert_eq!(manager.resume_route(), Phase::Welcome);

    let very = sort_all(&mut manager, &catalog, 5).await;
    assert_eq!(manager.resume_route(), Phase::Select);
    assert_eq!(
        manager.selection_plan(),
        SelectionPlan::AutoSelected { values: very.clone() }
    );
    assert!(manager.auto_select().await.unwrap());

    let mut ranking = very.clone();
    ranking.reverse();
    manager.set_ranking(ranking.clone()).await.unwrap();
    assert!(!manager.is_in_progress());
    assert_eq!(manager.resume_route(), Phase::Story);

    manager.set_transcript(story()).await.unwrap();
    assert_eq!(manager.resume_route(), Phase::Goals);

    for id in &ranking[..3] {
        let commitment = manager
            .set_commitment(
                id,
                CommitmentUpdate::default()
                    .outcome("more patience")
                    .obstacle("I get tired")
                    .plan("take a walk"),
            )
            .await
            .unwrap();
        assert!(commitment.is_complete());
    }
    assert_eq!(manager.resume_route(), Phase::Share);

    let report = manager
        .generate_definitions(&DefinitionGateway::fallback_only(), &catalog, false)
        .await
        .unwrap();
    assert_eq!(report.applied.len(), 3);
    assert_eq!(report.fallback.len(), 3);

    let snapshot = manager.snapshot(&catalog).unwrap();
    assert_eq!(snapshot.ranked_values.len(), 5);
    assert_eq!(snapshot.top_values.len(), 3);
    assert_eq!(snapshot.top_values[0].id, ranking[0]);
    assert_eq!(snapshot.definitions.len(), 3);
    assert!(snapshot.commitments.values().all(|c| c.implementation_intention.is_some()));
}

#[tokio::test]
async fn test_phase_preconditions_leave_state_untouched() {
    let catalog = catalog();
    let (_, mut manager) = open_memory().await;
    assert!(matches!(
        manager.assign_current(Category::Very).await,
        Err(DomainError::SessionNotStarted)
    ));

    manager.start(&catalog).await.unwrap();
    let first = manager.assign_current(Category::Very).await.unwrap();
    let before = manager.session().clone();

    assert!(matches!(
        manager.select(ids(&[first.as_str()])).await,
        Err(DomainError::SortingIncomplete { cursor: 1, .. })
    ));
    assert!(matches!(manager.move_ranked(0, 1).await, Err(DomainError::NoRanking)));
    assert!(matches!(
        manager.assign(&first, Category::Less).await,
        Err(DomainError::OutOfOrder { .. })
    ));
    assert_eq!(manager.session(), &before);
}

#[tokio::test]
async fn test_three_very_important_values_skip_selection() {
    let catalog = catalog();
    let (_, mut manager) = open_memory().await;
    let very = sort_all(&mut manager, &catalog, 3).await;
    assert_eq!(manager.resume_route(), Phase::Select);
    assert_eq!(
        manager.selection_plan(),
        SelectionPlan::AutoSelected { values: very.clone() }
    );

    assert!(manager.auto_select().await.unwrap());
    assert_eq!(manager.session().selection(), very.as_slice());
    let ranking = vec![very[2].clone(), very[0].clone(), very[1].clone()];
    manager.set_ranking(ranking.clone()).await.unwrap();

    assert_eq!(manager.resume_route(), Phase::Story);
    assert_eq!(manager.session().top_values(manager.rules()), ranking.as_slice());
}

#[tokio::test]
async fn test_four_very_important_values_pick_the_top_three() {
    let catalog = catalog();
    let (_, mut manager) = open_memory().await;
    let very = sort_all(&mut manager, &catalog, 4).await;

    assert!(matches!(
        manager.selection_plan(),
        SelectionPlan::Choose { pick: 3, .. }
    ));
    assert!(!manager.auto_select().await.unwrap());
    assert!(matches!(
        manager.select(very.clone()).await,
        Err(DomainError::WrongSelectionSize { expected: 3, actual: 4 })
    ));
    manager.select(very[1..].to_vec()).await.unwrap();
    manager.set_ranking(very[1..].to_vec()).await.unwrap();
    assert_eq!(manager.resume_route(), Phase::Story);
}

#[tokio::test]
async fn test_too_few_very_important_values_cannot_select() {
    let catalog = catalog();
    let (_, mut manager) = open_memory().await;
    sort_all(&mut manager, &catalog, 2).await;
    assert_eq!(
        manager.selection_plan(),
        SelectionPlan::Insufficient { have: 2, need: 3 }
    );
    assert!(!manager.auto_select().await.unwrap());
}

#[tokio::test]
async fn test_selection_requires_choice_when_many_are_very_important() {
    let catalog = catalog();
    let (_, mut manager) = open_memory().await;
    let very = sort_all(&mut manager, &catalog, 8).await;

    assert!(matches!(
        manager.selection_plan(),
        SelectionPlan::Choose { pick: 5, .. }
    ));
    assert!(!manager.auto_select().await.unwrap());
    assert!(matches!(
        manager.select(very[..4].to_vec()).await,
        Err(DomainError::WrongSelectionSize { expected: 5, actual: 4 })
    ));

    manager.select(very[3..].to_vec()).await.unwrap();
    assert!(matches!(
        manager.set_ranking(very[..5].to_vec()).await,
        Err(DomainError::NotASelectionPermutation)
    ));
    manager.set_ranking(very[3..].to_vec()).await.unwrap();
    assert!(manager.move_ranked(4, 0).await.unwrap());
    assert_eq!(manager.session().ranking()[0], very[7]);
}

#[tokio::test]
async fn test_undo_after_ranking_drops_selection() {
    let catalog = catalog();
    let (_, mut manager) = open_memory().await;
    let order = catalog.ids();
    manager.init_session("s1".to_string(), order.clone()).await.unwrap();
    for i in 0..order.len() {
        // the last card is very important and ends up selected
        let category = if i < 4 || i == order.len() - 1 { Category::Very } else { Category::Less };
        manager.assign_current(category).await.unwrap();
    }
    manager.auto_select().await.unwrap();
    let selection = manager.session().selection().to_vec();
    manager.set_ranking(selection).await.unwrap();

    let outcome = manager.undo().await;
    assert_eq!(
        outcome,
        UndoOutcome::Reverted {
            value_id: order[order.len() - 1].clone(),
            category: Category::Very,
        }
    );
    assert!(manager.session().selection().is_empty());
    assert!(manager.session().ranking().is_empty());
    assert_eq!(manager.resume_route(), Phase::Sort);
}

#[tokio::test]
async fn test_custom_value_is_selectable_and_defined() {
    let catalog = catalog();
    let (_, mut manager) = open_memory().await;
    manager.start(&catalog).await.unwrap();
    let custom = manager.add_custom_value("Curiosity Of Mind").await.unwrap();
    assert_eq!(manager.session().ledger().cursor(), 0);
    assert!(matches!(
        manager.add_custom_value("Another").await,
        Err(DomainError::CustomValueExists(_))
    ));

    for i in 0..catalog.len() {
        let category = if i < 4 { Category::Very } else { Category::Somewhat };
        manager.assign_current(category).await.unwrap();
    }
    assert!(manager.auto_select().await.unwrap());
    let mut ranking = manager.session().selection().to_vec();
    ranking.retain(|id| id != &custom.id);
    ranking.insert(0, custom.id.clone());
    manager.set_ranking(ranking).await.unwrap();

    manager
        .generate_definitions(&DefinitionGateway::fallback_only(), &catalog, false)
        .await
        .unwrap();
    let snapshot = manager.snapshot(&catalog).unwrap();
    assert_eq!(snapshot.top_values[0].name, "Curiosity Of Mind");

    manager
        .edit_definition(
            &custom.id,
            DefinitionEdit {
                tagline: Some("Always asking why".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let report = manager
        .generate_definitions(&DefinitionGateway::fallback_only(), &catalog, false)
        .await
        .unwrap();
    assert_eq!(report.kept, vec![custom.id.clone()]);
    assert_eq!(
        manager.session().definition(&custom.id).unwrap().tagline,
        "Always asking why"
    );
}

#[tokio::test]
async fn test_file_store_resumes_where_user_left_off() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog();
    let store = Arc::new(FileBlobStore::new(dir.path()));

    let mut manager = SessionManager::open(store.clone(), rules()).await;
    manager.start(&catalog).await.unwrap();
    for _ in 0..10 {
        manager.assign_current(Category::Somewhat).await.unwrap();
    }
    let id = manager.session().id().to_string();
    drop(manager);

    let reopened = SessionManager::open(Arc::new(FileBlobStore::new(dir.path())), rules()).await;
    assert_eq!(reopened.load_outcome(), &LoadOutcome::Restored);
    assert_eq!(reopened.session().id(), id);
    assert_eq!(reopened.session().ledger().cursor(), 10);
    assert_eq!(reopened.resume_route(), Phase::Sort);
    assert!(reopened.is_in_progress());
}

#[tokio::test]
async fn test_file_store_upgrades_legacy_blob() {
    let dir = tempfile::tempdir().unwrap();
    let legacy = serde_json::json!({
        "id": "legacy-session",
        "ledger": {"order": ["honesty", "care"], "cursor": 2, "very": ["honesty", "care"]},
        "selection": ["honesty", "care"],
        "ranked_values": ["care", "honesty"],
        "story": "a short one"
    });
    std::fs::write(dir.path().join(format!("{SESSION_KEY}.json")), legacy.to_string()).unwrap();

    let store = Arc::new(FileBlobStore::new(dir.path()));
    let manager = SessionManager::open(store.clone(), rules()).await;
    assert_eq!(manager.load_outcome(), &LoadOutcome::Migrated { from: 1 });
    assert_eq!(manager.session().ranking(), ["care", "honesty"]);
    assert_eq!(manager.session().transcript(), "a short one");

    let written = store.get(SESSION_KEY).await.unwrap().unwrap();
    let written: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(written["version"], 2);
    assert_eq!(written["session"]["ranking"], serde_json::json!(["care", "honesty"]));
}

#[tokio::test]
async fn test_corrupt_file_starts_fresh_and_can_restart() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{SESSION_KEY}.json")), "{\"version\": 2, \"sess").unwrap();

    let store = Arc::new(FileBlobStore::new(dir.path()));
    let mut manager = SessionManager::open(store, rules()).await;
    assert!(matches!(manager.load_outcome(), LoadOutcome::Discarded { .. }));
    assert_eq!(manager.resume_route(), Phase::Welcome);

    manager.start(&catalog()).await.unwrap();
    assert!(manager.is_durable());
}

#[tokio::test]
async fn test_reset_removes_saved_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileBlobStore::new(dir.path()));
    let mut manager = SessionManager::open(store.clone(), rules()).await;
    manager.start(&catalog()).await.unwrap();
    assert!(store.get(SESSION_KEY).await.unwrap().is_some());

    manager.reset().await;
    assert!(store.get(SESSION_KEY).await.unwrap().is_none());
    assert_eq!(manager.resume_route(), Phase::Welcome);
}
