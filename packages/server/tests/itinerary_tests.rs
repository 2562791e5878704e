//! Event and itinerary step tests.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::World;
use trip_core::common::DomainError;
use trip_core::domains::events::actions::{
    create_event, create_step, delete_event, delete_step, list_events, list_steps, update_step,
    CreateEventInput, CreateStepInput, UpdateStepInput,
};
use trip_core::domains::membership::actions::invite;

fn step_input(name: &str, scheduled_time: chrono::DateTime<Utc>) -> CreateStepInput {
    CreateStepInput {
        name: name.to_string(),
        description: None,
        location: None,
        scheduled_time,
        alert_before_minutes: None,
    }
}

#[tokio::test]
async fn step_must_fall_within_event_dates() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let start = Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2030, 6, 3, 18, 0, 0).unwrap();
    let event = world.dated_event(&ana, Some(start), Some(end)).await;

    let err = create_step(
        event.id,
        step_input("Too early", start - Duration::minutes(1)),
        ana.id,
        &world.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::StepOutOfBounds));

    let at_start = create_step(event.id, step_input("Breakfast", start), ana.id, &world.deps)
        .await
        .unwrap();
    assert_eq!(at_start.scheduled_time, start);

    create_step(event.id, step_input("Checkout", end), ana.id, &world.deps)
        .await
        .unwrap();

    let err = create_step(
        event.id,
        step_input("Too late", end + Duration::seconds(1)),
        ana.id,
        &world.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::StepOutOfBounds));

    let err = update_step(
        at_start.id,
        UpdateStepInput {
            scheduled_time: Some(end + Duration::hours(1)),
            ..Default::default()
        },
        ana.id,
        &world.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::StepOutOfBounds));
}

#[tokio::test]
async fn steps_are_listed_in_schedule_order() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let event = world.event(&ana).await;
    let now = Utc::now();
    world.step(&event, &ana, now + Duration::hours(5), None).await;
    let first = world.step(&event, &ana, now + Duration::hours(1), None).await;

    let steps = list_steps(event.id, ana.id, &world.deps).await.unwrap();

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].id, first.id);
}

#[tokio::test]
async fn step_updates_are_partial() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let event = world.event(&ana).await;
    let step = world.step(&event, &ana, Utc::now() + Duration::hours(1), Some(10)).await;

    let updated = update_step(
        step.id,
        UpdateStepInput {
            name: Some(" Sunset ".to_string()),
            ..Default::default()
        },
        ana.id,
        &world.deps,
    )
    .await
    .unwrap();

    assert_eq!(updated.name, "Sunset");
    assert_eq!(updated.location, step.location);
    assert_eq!(updated.alert_before_minutes, Some(10));
}

#[tokio::test]
async fn negative_alert_lead_time_is_rejected() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let event = world.event(&ana).await;
    let mut input = step_input("Ferry", Utc::now() + Duration::hours(1));
    input.alert_before_minutes = Some(-5);

    let err = create_step(event.id, input, ana.id, &world.deps).await.unwrap_err();

    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn only_organizers_manage_steps() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    world.member(&event, &bo).await;
    let step = world.step(&event, &ana, Utc::now() + Duration::hours(1), None).await;

    let err = create_step(
        event.id,
        step_input("Picnic", Utc::now() + Duration::hours(2)),
        bo.id,
        &world.deps,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let err = delete_step(step.id, bo.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    // Members can still read the itinerary
    assert_eq!(list_steps(event.id, bo.id, &world.deps).await.unwrap().len(), 1);

    delete_step(step.id, ana.id, &world.deps).await.unwrap();
    assert!(list_steps(event.id, bo.id, &world.deps).await.unwrap().is_empty());
}

#[tokio::test]
async fn event_end_before_start_is_rejected() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let start = Utc.with_ymd_and_hms(2030, 6, 3, 9, 0, 0).unwrap();

    let err = create_event(
        CreateEventInput {
            name: "Backwards".to_string(),
            description: None,
            start_date: Some(start),
            end_date: Some(start - Duration::days(1)),
        },
        ana.id,
        &world.deps,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn pending_invitations_do_not_list_the_event() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    invite(event.id, ana.id, "+351900000002", &world.deps).await.unwrap();

    assert_eq!(list_events(ana.id, &world.deps).await.unwrap().len(), 1);
    assert!(list_events(bo.id, &world.deps).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_event_removes_everything_under_it() {
    let world = World::new();
    let ana = world.user("+351900000001", "Ana");
    let bo = world.user("+351900000002", "Bo");
    let event = world.event(&ana).await;
    world.member(&event, &bo).await;
    world.step(&event, &ana, Utc::now() + Duration::hours(1), None).await;

    let err = delete_event(event.id, bo.id, &world.deps).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    delete_event(event.id, ana.id, &world.deps).await.unwrap();

    assert!(world.store.all_members().is_empty());
    assert!(list_events(ana.id, &world.deps).await.unwrap().is_empty());
}
