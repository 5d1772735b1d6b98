use dealflow_core::{
    ActivityPatch, ActivityType, ContactPatch, CoreConfig, Crm, DealPatch, EntityKind,
    ModelValidationError, NewActivity, NewContact, NewDeal, RepoError, Stage,
};
use uuid::Uuid;

fn empty_crm() -> Crm {
    Crm::new(&CoreConfig::immediate())
}

#[tokio::test]
async fn create_and_get_roundtrip_fills_defaults() {
    let crm = empty_crm();
    let created = crm
        .contacts()
        .create(NewContact::new("Ann Lee", "ann@x.com"))
        .await
        .unwrap();

    assert!(!created.id.is_nil());
    assert_eq!(created.phone, "");
    assert_eq!(created.company, "");
    assert!(created.tags.is_empty());
    assert_eq!(created.created_at, created.last_activity);

    let loaded = crm.contacts().get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[tokio::test]
async fn create_assigns_distinct_ids_and_appends_in_order() {
    let crm = empty_crm();
    let first = crm.deals().create(NewDeal::new("First", 10.0)).await.unwrap();
    let second = crm.deals().create(NewDeal::new("Second", 20.0)).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.stage, Stage::Discovery);
    assert_eq!(first.probability, 0);

    let all = crm.deals().get_all().await.unwrap();
    let ids: Vec<Uuid> = all.iter().map(|deal| deal.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
}

#[tokio::test]
async fn create_rejects_missing_and_invalid_fields() {
    let crm = empty_crm();

    let err = crm
        .contacts()
        .create(NewContact {
            name: Some("   ".to_string()),
            email: Some("a@b.c".to_string()),
            ..NewContact::default()
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RepoError::Validation(ModelValidationError::MissingField("name"))
    );

    let err = crm
        .deals()
        .create(NewDeal::new("Negative", -5.0))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RepoError::Validation(ModelValidationError::InvalidValue(-5.0))
    );

    let err = crm
        .activities()
        .create(NewActivity {
            description: Some("no type".to_string()),
            ..NewActivity::default()
        })
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RepoError::Validation(ModelValidationError::MissingField("type"))
    );

    assert!(crm.contacts().is_empty().unwrap());
    assert!(crm.deals().is_empty().unwrap());
    assert!(crm.activities().is_empty().unwrap());
}

#[tokio::test]
async fn update_merges_only_present_fields_and_keeps_position() {
    let crm = empty_crm();
    let a = crm
        .contacts()
        .create(NewContact::new("A", "a@x.com"))
        .await
        .unwrap();
    let b = crm
        .contacts()
        .create(NewContact::new("B", "b@x.com"))
        .await
        .unwrap();

    let updated = crm
        .contacts()
        .update(
            a.id,
            ContactPatch {
                company: Some("Acme".to_string()),
                ..ContactPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.id, a.id);
    assert_eq!(updated.name, "A");
    assert_eq!(updated.email, "a@x.com");
    assert_eq!(updated.company, "Acme");
    assert_eq!(updated.created_at, a.created_at);

    let order: Vec<Uuid> = crm
        .contacts()
        .get_all()
        .await
        .unwrap()
        .iter()
        .map(|contact| contact.id)
        .collect();
    assert_eq!(order, vec![a.id, b.id]);
}

#[tokio::test]
async fn update_with_invalid_value_leaves_record_untouched() {
    let crm = empty_crm();
    let deal = crm.deals().create(NewDeal::new("Deal", 100.0)).await.unwrap();

    let err = crm
        .deals()
        .update(
            deal.id,
            DealPatch {
                probability: Some(150),
                ..DealPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RepoError::Validation(ModelValidationError::InvalidProbability(150))
    );

    let reloaded = crm.deals().get_by_id(deal.id).await.unwrap().unwrap();
    assert_eq!(reloaded, deal);
}

#[tokio::test]
async fn update_and_delete_unknown_id_are_not_found() {
    let crm = empty_crm();
    let missing = Uuid::new_v4();

    let err = crm
        .deals()
        .update(missing, DealPatch::stage(Stage::Proposal))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RepoError::NotFound {
            kind: EntityKind::Deal,
            id: missing
        }
    );
    assert!(crm.contacts().delete(missing).await.unwrap_err().is_not_found());
    assert!(crm.deals().get_by_id(missing).await.unwrap().is_none());
}

#[tokio::test]
async fn second_delete_of_same_id_is_not_found() {
    let crm = empty_crm();
    let activity = crm
        .activities()
        .create(NewActivity::new(ActivityType::Task, "follow up"))
        .await
        .unwrap();

    crm.activities().delete(activity.id).await.unwrap();
    let err = crm.activities().delete(activity.id).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(crm.activities().get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn returned_records_are_copies() {
    let crm = empty_crm();
    let created = crm
        .contacts()
        .create(NewContact::new("Copy", "copy@x.com"))
        .await
        .unwrap();

    let mut snapshot = crm.contacts().get_all().await.unwrap();
    snapshot[0].name = "Mutated".to_string();

    let reloaded = crm.contacts().get_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(reloaded.name, "Copy");
}

#[tokio::test]
async fn delete_does_not_cascade_to_referencing_records() {
    let crm = empty_crm();
    let contact = crm
        .contacts()
        .create(NewContact::new("Gone", "gone@x.com"))
        .await
        .unwrap();
    let deal = crm
        .deals()
        .create(NewDeal {
            contact_id: Some(contact.id),
            ..NewDeal::new("Orphan", 500.0)
        })
        .await
        .unwrap();

    crm.contacts().delete(contact.id).await.unwrap();

    let reloaded = crm.deals().get_by_id(deal.id).await.unwrap().unwrap();
    assert_eq!(reloaded.contact_id, Some(contact.id));
    assert_eq!(crm.deals().get_by_contact_id(contact.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn activities_by_contact_are_newest_first() {
    let crm = Crm::from_seed(&CoreConfig::immediate()).unwrap();
    let contact_id: Uuid = "c0a80101-0000-4000-8000-000000000001".parse().unwrap();

    let activities = crm.activities().get_by_contact_id(contact_id).await.unwrap();
    assert_eq!(activities.len(), 2);
    assert!(activities[0].timestamp > activities[1].timestamp);
    assert!(activities
        .iter()
        .all(|activity| activity.contact_id == Some(contact_id)));
}

#[tokio::test]
async fn mark_completed_is_idempotent_and_completion_never_reverts() {
    let crm = empty_crm();
    let task = crm
        .activities()
        .create(NewActivity::new(ActivityType::Task, "send contract"))
        .await
        .unwrap();
    assert!(!task.completed);
    assert!(task.is_pending_task());

    let done = crm.activities().mark_completed(task.id).await.unwrap();
    assert!(done.completed);
    let again = crm.activities().mark_completed(task.id).await.unwrap();
    assert_eq!(again, done);

    let err = crm
        .activities()
        .update(
            task.id,
            ActivityPatch {
                completed: Some(false),
                ..ActivityPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::CompletionReverted(id)) if id == task.id
    ));
}

#[tokio::test]
async fn contact_search_matches_name_email_company_and_phone() {
    let crm = Crm::from_seed(&CoreConfig::immediate()).unwrap();
    let all = crm.contacts().search("   ").await.unwrap();
    assert_eq!(all.len(), 5);

    let first = &all[0];
    let by_email = crm.contacts().search(&first.email.to_uppercase()).await.unwrap();
    assert!(by_email.iter().any(|contact| contact.id == first.id));

    assert!(crm
        .contacts()
        .search("no-such-contact-anywhere")
        .await
        .unwrap()
        .is_empty());
}
