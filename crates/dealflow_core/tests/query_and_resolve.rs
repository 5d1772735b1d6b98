use chrono::Utc;
use dealflow_core::query::{
    filter_by_search, filter_by_stage, filter_by_type, sort_by, ActivityField, ContactField,
    DealField, SelectionSet, SortConfig, SortDirection,
};
use dealflow_core::resolve::{contact_name, denormalize_activities, denormalize_deals};
use dealflow_core::{
    load_seed, resolve, ActivityType, Contact, CoreConfig, Crm, Deal, NewActivity, NewContact,
    Record, Stage, UNKNOWN_CONTACT, UNKNOWN_DEAL,
};
use uuid::Uuid;

fn contact(name: &str, email: &str) -> Contact {
    Contact::from_draft(Uuid::new_v4(), NewContact::new(name, email), Utc::now()).unwrap()
}

#[test]
fn search_is_case_insensitive_substring() {
    let contacts = vec![contact("Ann Lee", "ann@lee.io"), contact("Bob Ray", "bob@ray.io")];

    let hits = filter_by_search(&contacts, "ann", &[ContactField::Name]);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Ann Lee");

    let hits = filter_by_search(&contacts, "LEE", &[ContactField::Name]);
    assert_eq!(hits.len(), 1);
}

#[test]
fn blank_search_returns_input_unchanged() {
    let contacts = vec![contact("Ann Lee", "ann@lee.io"), contact("Bob Ray", "bob@ray.io")];
    assert_eq!(filter_by_search(&contacts, "", &[ContactField::Name]), contacts);
    assert_eq!(filter_by_search(&contacts, "  \t", &[]), contacts);
    assert!(filter_by_search(&contacts, "ann", &[]).is_empty());
}

#[test]
fn sort_by_value_both_directions_is_stable() {
    let seed = load_seed().unwrap();
    let ascending = sort_by(seed.deals.clone(), DealField::Value, SortDirection::Asc);
    let values: Vec<f64> = ascending.iter().map(|deal| deal.value).collect();
    let mut expected = values.clone();
    expected.sort_by(f64::total_cmp);
    assert_eq!(values, expected);

    let descending = sort_by(seed.deals, DealField::Value, SortDirection::Desc);
    assert_eq!(descending.first().map(|deal| deal.value), values.last().copied());
}

#[test]
fn sort_by_stage_follows_pipeline_order() {
    let seed = load_seed().unwrap();
    let sorted = sort_by(seed.deals, DealField::Stage, SortDirection::Asc);
    let ranks: Vec<usize> = sorted.iter().map(|deal: &Deal| deal.stage.index()).collect();
    assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn sort_config_toggle_flips_active_field_and_resets_others() {
    let mut config = SortConfig::ascending(ContactField::Name);
    config.toggle(ContactField::Name);
    assert_eq!(config.direction, SortDirection::Desc);
    config.toggle(ContactField::Company);
    assert_eq!(config, SortConfig::ascending(ContactField::Company));
}

#[test]
fn type_and_stage_filters_accept_all() {
    let seed = load_seed().unwrap();
    assert_eq!(filter_by_type(&seed.activities, None).len(), 8);
    let tasks = filter_by_type(&seed.activities, Some(ActivityType::Task));
    assert_eq!(tasks.len(), 3);
    assert!(tasks.iter().all(|activity| activity.kind == ActivityType::Task));

    assert_eq!(filter_by_stage(&seed.deals, None).len(), 6);
    assert_eq!(filter_by_stage(&seed.deals, Some(Stage::ClosedWon)).len(), 1);
}

#[test]
fn activity_sort_by_timestamp_descending_is_newest_first() {
    let seed = load_seed().unwrap();
    let sorted = sort_by(seed.activities, ActivityField::Timestamp, SortDirection::Desc);
    assert!(sorted
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));
}

#[test]
fn selection_survives_stale_ids() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let mut selection = SelectionSet::new();
    selection.select_all([a, b, a]);
    assert_eq!(selection.len(), 2);
    assert!(selection.all_selected_of(&[a, b]));

    assert!(!selection.toggle(b));
    assert!(selection.partially_selected_of(&[a, b]));

    assert_eq!(selection.retain_existing(&[b]), 1);
    assert!(selection.is_empty());
}

#[test]
fn resolve_missing_references_to_placeholders() {
    let seed = load_seed().unwrap();

    let hit = resolve(&seed.contacts, seed.deals[0].contact_id);
    assert_eq!(hit.id, seed.contacts[0].id);

    let missing = Uuid::new_v4();
    let placeholder = resolve(&seed.contacts, Some(missing));
    assert_eq!(placeholder.name, UNKNOWN_CONTACT);
    assert_eq!(placeholder.id, missing);

    let absent = resolve(&seed.deals, None);
    assert_eq!(absent.title, UNKNOWN_DEAL);
    assert!(absent.id.is_nil());
}

#[test]
fn denormalized_views_fill_in_names() {
    let seed = load_seed().unwrap();

    let deal_views = denormalize_deals(&seed.deals, &seed.contacts);
    assert_eq!(deal_views.len(), seed.deals.len());
    assert!(deal_views
        .iter()
        .all(|view| view.contact_name != UNKNOWN_CONTACT));

    let activity_views = denormalize_activities(&seed.activities, &seed.contacts, &seed.deals);
    let unlinked = activity_views
        .iter()
        .find(|view| view.activity.deal_id.is_none())
        .unwrap();
    assert_eq!(unlinked.deal_title, None);
    assert!(activity_views
        .iter()
        .filter(|view| view.activity.deal_id.is_some())
        .all(|view| view.deal_title.is_some_and(|title| title != UNKNOWN_DEAL)));
}

#[tokio::test]
async fn deleted_contact_resolves_to_unknown_contact() {
    let crm = Crm::new(&CoreConfig::immediate());
    let gone = crm
        .contacts()
        .create(NewContact::new("Temp", "temp@x.com"))
        .await
        .unwrap();
    let activity = crm
        .log_activity(NewActivity::new(ActivityType::Call, "left a voicemail").for_contact(gone.id))
        .await
        .unwrap();

    crm.contacts().delete(gone.id).await.unwrap();

    let contacts = crm.contacts().get_all().await.unwrap();
    let activities = crm.activities().get_all().await.unwrap();
    assert_eq!(activities[0].id, activity.id);
    assert_eq!(contact_name(&contacts, activities[0].contact_id), UNKNOWN_CONTACT);
    assert_eq!(resolve(&contacts, activity.contact_id).name, UNKNOWN_CONTACT);
}
