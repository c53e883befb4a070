use super::*;
use async_trait::async_trait;
use serde_json::Value;
use shared::{domain::REQUIRED_FIELDS, protocol::RATING_PROMPT};
use tokio::sync::Notify;

use crate::error::TransportError;

#[derive(Default)]
struct TestTransport {
    sent: Arc<Mutex<Vec<Value>>>,
    reject_with: Option<u16>,
    entered: Option<Arc<Notify>>,
    release: Option<Arc<Notify>>,
}

impl TestTransport {
    fn accepting() -> Self {
        Self::default()
    }

    fn rejecting(status: u16) -> Self {
        Self {
            reject_with: Some(status),
            ..Self::default()
        }
    }

    fn gated(entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        Self {
            entered: Some(entered),
            release: Some(release),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SubmissionTransport for TestTransport {
    async fn send(&self, payload: Value) -> Result<(), TransportError> {
        self.sent.lock().await.push(payload);
        if let Some(entered) = &self.entered {
            entered.notify_one();
        }
        if let Some(release) = &self.release {
            release.notified().await;
        }
        match self.reject_with {
            Some(status) => Err(TransportError::Rejected {
                status,
                message: Some("Failed to submit survey".to_string()),
            }),
            None => Ok(()),
        }
    }
}

fn controller_with(transport: TestTransport) -> (FormController, Arc<Mutex<Vec<Value>>>) {
    let sent = transport.sent.clone();
    (FormController::new(Arc::new(transport)), sent)
}

async fn fill_required(controller: &FormController) {
    for (field, value) in [
        ("name", "Asha"),
        ("nationality", "Indian"),
        ("ageGroup", "26-35"),
        ("hearAbout", "social-media"),
        ("planningMethod", "mix"),
        ("travelStyle", "cultural"),
        ("duration", "5-7"),
        ("mainChallenges", "Touts near the ghats"),
        ("missingInfo", "Boat prices"),
        ("bestExperience", "Sunrise boat ride"),
        ("wouldPayForService", "maybe"),
    ] {
        controller.update_field(field, value).await.expect("field");
    }
}

async fn next_event(rx: &mut broadcast::Receiver<FormEvent>) -> FormEvent {
    rx.recv().await.expect("event")
}

#[tokio::test]
async fn unrated_form_is_never_sent() {
    let (controller, sent) = controller_with(TestTransport::accepting());
    fill_required(&controller).await;

    let err = controller.submit().await.expect_err("rating is required");
    assert!(matches!(err, FormError::RatingRequired));
    assert!(err.is_validation());
    assert_eq!(err.to_string(), RATING_PROMPT);
    assert!(sent.lock().await.is_empty());
    assert_eq!(controller.status().await, SubmissionStatus::Idle);
}

#[tokio::test]
async fn missing_required_answers_are_reported_without_sending() {
    let (controller, sent) = controller_with(TestTransport::accepting());
    controller.set_rating(4).await.expect("rating");

    let err = controller.submit().await.expect_err("fields are required");
    match err {
        FormError::MissingRequiredFields(fields) => {
            let expected: Vec<&str> = REQUIRED_FIELDS
                .iter()
                .copied()
                .filter(|field| *field != "overallRating")
                .collect();
            assert_eq!(fields, expected);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(sent.lock().await.is_empty());
    assert_eq!(controller.status().await, SubmissionStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn valid_submission_sends_exactly_the_current_record() {
    let (controller, sent) = controller_with(TestTransport::accepting());
    fill_required(&controller).await;
    controller.set_rating(5).await.expect("rating");
    controller
        .toggle_service(ImportantService::SpiritualGuidance)
        .await
        .expect("service");
    let record = controller.record().await;
    let mut rx = controller.subscribe_events();

    let outcome = controller.submit().await.expect("submit");
    assert_eq!(outcome, SubmissionOutcome::Success);

    let sent = sent.lock().await;
    assert_eq!(sent.len(), 1);
    let decoded: AnswerRecord = serde_json::from_value(sent[0].clone()).expect("decode");
    assert_eq!(decoded, record);

    assert_eq!(
        next_event(&mut rx).await,
        FormEvent::StatusChanged(SubmissionStatus::Submitting)
    );
    assert_eq!(
        next_event(&mut rx).await,
        FormEvent::StatusChanged(SubmissionStatus::Submitted)
    );
    assert_eq!(controller.status().await, SubmissionStatus::Submitted);
}

#[tokio::test(start_paused = true)]
async fn confirmation_window_elapses_into_a_blank_idle_form() {
    let (controller, _sent) = controller_with(TestTransport::accepting());
    fill_required(&controller).await;
    controller.set_rating(3).await.expect("rating");
    let mut rx = controller.subscribe_events();

    controller.submit().await.expect("submit");
    assert_eq!(
        next_event(&mut rx).await,
        FormEvent::StatusChanged(SubmissionStatus::Submitting)
    );
    assert_eq!(
        next_event(&mut rx).await,
        FormEvent::StatusChanged(SubmissionStatus::Submitted)
    );

    tokio::time::sleep(CONFIRMATION_WINDOW - Duration::from_millis(10)).await;
    assert_eq!(controller.status().await, SubmissionStatus::Submitted);
    assert!(!controller.record().await.is_blank());

    assert_eq!(next_event(&mut rx).await, FormEvent::Reset);
    assert_eq!(
        next_event(&mut rx).await,
        FormEvent::StatusChanged(SubmissionStatus::Idle)
    );

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, SubmissionStatus::Idle);
    assert!(snapshot.record.is_blank());
    assert_eq!(snapshot.error, None);
}

#[tokio::test]
async fn failed_submission_keeps_answers_and_sets_error() {
    let (controller, sent) = controller_with(TestTransport::rejecting(500));
    fill_required(&controller).await;
    controller.set_rating(2).await.expect("rating");
    let before = controller.record().await;
    let mut rx = controller.subscribe_events();

    let outcome = controller.submit().await.expect("submit");
    assert_eq!(
        outcome,
        SubmissionOutcome::Failure {
            message: "Failed to submit. Please try again.".to_string()
        }
    );

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, SubmissionStatus::Idle);
    assert_eq!(snapshot.record, before);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Failed to submit. Please try again.")
    );
    assert_eq!(sent.lock().await.len(), 1);

    assert_eq!(
        next_event(&mut rx).await,
        FormEvent::StatusChanged(SubmissionStatus::Submitting)
    );
    assert_eq!(
        next_event(&mut rx).await,
        FormEvent::SubmissionFailed {
            message: "Failed to submit. Please try again.".to_string()
        }
    );
    assert_eq!(
        next_event(&mut rx).await,
        FormEvent::StatusChanged(SubmissionStatus::Idle)
    );
}

#[tokio::test]
async fn retry_after_failure_clears_the_error() {
    let transport = Arc::new(FlakyTransport::default());
    let controller = FormController::new(transport.clone());
    fill_required(&controller).await;
    controller.set_rating(5).await.expect("rating");

    let first = controller.submit().await.expect("submit");
    assert!(!first.is_success());
    assert!(controller.error().await.is_some());

    let second = controller.submit().await.expect("resubmit");
    assert!(second.is_success());
    assert_eq!(controller.error().await, None);
    assert_eq!(*transport.calls.lock().await, 2);
}

#[derive(Default)]
struct FlakyTransport {
    calls: Mutex<u32>,
}

#[async_trait]
impl SubmissionTransport for FlakyTransport {
    async fn send(&self, _payload: Value) -> Result<(), TransportError> {
        let mut calls = self.calls.lock().await;
        *calls += 1;
        if *calls == 1 {
            return Err(TransportError::Rejected {
                status: 500,
                message: None,
            });
        }
        Ok(())
    }
}

#[tokio::test]
async fn second_submit_is_rejected_while_one_is_in_flight() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let transport = TestTransport::gated(entered.clone(), release.clone());
    let sent = transport.sent.clone();
    let controller = Arc::new(FormController::new(Arc::new(transport)));
    fill_required(&controller).await;
    controller.set_rating(5).await.expect("rating");

    let in_flight = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    entered.notified().await;

    assert_eq!(controller.status().await, SubmissionStatus::Submitting);
    let err = controller.submit().await.expect_err("already submitting");
    assert!(matches!(
        err,
        FormError::SubmissionInProgress(SubmissionStatus::Submitting)
    ));
    assert_eq!(err.to_string(), "cannot submit while the form is submitting");

    release.notify_one();
    let outcome = in_flight.await.expect("join").expect("submit");
    assert!(outcome.is_success());
    assert_eq!(sent.lock().await.len(), 1);
    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn form_is_locked_while_confirmation_is_shown() {
    let (controller, _sent) = controller_with(TestTransport::accepting());
    fill_required(&controller).await;
    controller.set_rating(5).await.expect("rating");
    controller.submit().await.expect("submit");

    let err = controller
        .update_field("name", "Someone else")
        .await
        .expect_err("locked");
    assert!(matches!(err, FormError::ConfirmationShowing));
    let err = controller.submit().await.expect_err("locked");
    assert!(matches!(
        err,
        FormError::SubmissionInProgress(SubmissionStatus::Submitted)
    ));
    assert_eq!(
        err.to_string(),
        "cannot submit while the form is showing its confirmation"
    );
}

#[tokio::test(start_paused = true)]
async fn dropping_the_controller_cancels_the_pending_reset() {
    let (controller, _sent) = controller_with(TestTransport::accepting());
    fill_required(&controller).await;
    controller.set_rating(5).await.expect("rating");
    let mut rx = controller.subscribe_events();
    controller.submit().await.expect("submit");
    drop(controller);

    tokio::time::sleep(CONFIRMATION_WINDOW * 2).await;

    let mut seen = Vec::new();
    while let Ok(event) = rx.recv().await {
        seen.push(event);
    }
    assert!(!seen.contains(&FormEvent::Reset), "events: {seen:?}");
}

#[tokio::test(start_paused = true)]
async fn shutdown_leaves_the_confirmation_in_place() {
    let (controller, _sent) = controller_with(TestTransport::accepting());
    fill_required(&controller).await;
    controller.set_rating(5).await.expect("rating");
    controller.submit().await.expect("submit");

    controller.shutdown().await;
    tokio::time::sleep(CONFIRMATION_WINDOW * 2).await;

    assert_eq!(controller.status().await, SubmissionStatus::Submitted);
    assert!(!controller.record().await.is_blank());
}

#[tokio::test]
async fn service_toggle_pairs_restore_the_selection() {
    let (controller, _sent) = controller_with(TestTransport::accepting());
    controller
        .update_field("importantServices", "Local guide services")
        .await
        .expect("service");
    let before = controller.record().await.important_services;

    assert!(controller
        .toggle_service(ImportantService::ShoppingHelp)
        .await
        .expect("toggle"));
    assert!(!controller
        .toggle_service(ImportantService::ShoppingHelp)
        .await
        .expect("toggle"));
    controller
        .update_field("importantServices", "Local guide services")
        .await
        .expect("toggle off");
    controller
        .update_field("importantServices", "Local guide services")
        .await
        .expect("toggle on");

    assert_eq!(controller.record().await.important_services, before);
}

#[tokio::test]
async fn invalid_edits_surface_field_errors() {
    let (controller, _sent) = controller_with(TestTransport::accepting());
    let err = controller
        .update_field("ageGroup", "12-17")
        .await
        .expect_err("not an option");
    assert!(matches!(err, FormError::Field(_)));
    let err = controller.set_rating(9).await.expect_err("out of range");
    assert!(err.is_validation());
    assert!(controller.record().await.is_blank());
}
