use std::sync::Arc;
use std::time::Duration;

use spectra_client::domains::session::{
    ImageSelection, Message, Phase, SessionController, SessionOptions,
    SubmitRejection,
};
use spectra_client::infra::errors::{ProcessingError, ProcessingErrorKind};
use spectra_client::infra::testing::{TestProcessingService, sample_result};
use spectra_model::{ConfigPatch, FilterMode};

fn png(tag: u8) -> ImageSelection {
    ImageSelection::from_bytes(
        &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, tag],
        Some(format!("img-{tag}.png")),
    )
}

fn controller() -> (SessionController, TestProcessingService) {
    let stub = TestProcessingService::new();
    let controller = SessionController::with_options(
        Arc::new(stub.clone()),
        SessionOptions {
            process_timeout: Duration::from_secs(5),
        },
    );
    (controller, stub)
}

#[tokio::test]
async fn successful_submission_populates_result() -> anyhow::Result<()> {
    let (mut session, stub) = controller();
    stub.respond_with(Ok(sample_result("one")));

    session.select_image(png(1));
    assert_eq!(session.state().phase, Phase::Ready);
    session.submit()?;
    assert!(session.view().is_busy);
    assert!(!session.view().can_submit);

    session.run_until_idle().await;

    let view = session.view();
    assert!(!view.is_busy);
    assert!(view.can_submit);
    assert_eq!(view.error, None);
    assert_eq!(view.metrics, Some(sample_result("one").metrics));
    assert_eq!(
        view.processed_image,
        Some(&sample_result("one").processed_image)
    );
    assert_eq!(stub.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn double_submit_issues_one_request() -> anyhow::Result<()> {
    let (mut session, stub) = controller();
    let gate = stub.hold();

    session.select_image(png(1));
    session.submit()?;
    assert_eq!(session.submit().unwrap_err(), SubmitRejection::Busy);
    // A queued Submit message is equally ignored.
    session.dispatch(Message::Submit);

    assert!(gate.complete(Ok(sample_result("only"))));
    session.run_until_idle().await;

    assert_eq!(stub.call_count(), 1);
    assert_eq!(session.state().result, Some(sample_result("only")));
    Ok(())
}

#[tokio::test]
async fn new_selection_discards_in_flight_result() -> anyhow::Result<()> {
    let (mut session, stub) = controller();
    let gate = stub.hold();

    session.select_image(png(1));
    session.submit()?;
    session.select_image(png(2));

    // The held call observes its cancellation and resolves on its own.
    session.run_until_idle().await;
    assert!(!gate.complete(Ok(sample_result("stale"))));

    let state = session.state();
    assert_eq!(state.phase, Phase::Ready);
    assert!(state.result.is_none());
    assert!(state.error.is_none());
    assert_eq!(state.selection.as_ref().and_then(|s| s.name()), Some("img-2.png"));
    Ok(())
}

#[tokio::test]
async fn dropping_the_controller_cancels_in_flight_request() -> anyhow::Result<()> {
    let (mut session, stub) = controller();
    let mut gate = stub.hold();

    session.select_image(png(1));
    session.submit()?;
    drop(session);

    tokio::time::timeout(Duration::from_secs(1), gate.abandoned()).await?;
    assert!(!gate.complete(Ok(sample_result("late"))));
    assert_eq!(stub.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn stale_failure_is_not_reported() -> anyhow::Result<()> {
    let (mut session, stub) = controller();
    stub.respond_with(Err(ProcessingError::Network("reset".into())));

    session.select_image(png(1));
    session.submit()?;
    // Superseded before the completion is applied.
    session.select_image(png(2));
    session.run_until_idle().await;

    assert!(session.state().error.is_none());
    assert!(session.view().can_submit);
    Ok(())
}

#[tokio::test]
async fn failure_surfaces_error_and_allows_resubmit() -> anyhow::Result<()> {
    let (mut session, stub) = controller();
    stub.respond_with(Err(ProcessingError::Rejected {
        status: 400,
        message: "Invalid filter mode".into(),
    }));
    stub.respond_with(Ok(sample_result("retry")));

    session.select_image(png(1));
    session.submit()?;
    session.run_until_idle().await;

    let error = session.state().error.clone().unwrap();
    assert_eq!(error.kind, ProcessingErrorKind::Rejected);
    assert_eq!(session.view().error, Some("Invalid filter mode"));
    assert_eq!(session.state().phase, Phase::Ready);

    session.submit()?;
    assert!(session.state().error.is_none());
    session.run_until_idle().await;

    assert_eq!(stub.call_count(), 2);
    assert_eq!(session.state().result, Some(sample_result("retry")));
    Ok(())
}

#[tokio::test]
async fn selecting_clears_previous_result() -> anyhow::Result<()> {
    let (mut session, stub) = controller();
    stub.respond_with(Ok(sample_result("first")));

    session.select_image(png(1));
    session.submit()?;
    session.run_until_idle().await;
    assert!(session.state().result.is_some());

    session.select_image(png(2));
    assert!(session.state().result.is_none());
    assert!(session.view().metrics.is_none());
    Ok(())
}

#[tokio::test]
async fn invalid_config_never_reaches_the_service() -> anyhow::Result<()> {
    let (mut session, stub) = controller();
    session.select_image(png(1));
    session.update_config(ConfigPatch::new().order(0));

    assert!(matches!(
        session.submit(),
        Err(SubmitRejection::Invalid(_))
    ));
    assert_eq!(session.pending(), 0);
    assert_eq!(stub.call_count(), 0);
    assert_eq!(session.view().active_preset, "custom");
    Ok(())
}

#[tokio::test]
async fn submit_sends_current_band_reject_config() -> anyhow::Result<()> {
    let (mut session, stub) = controller();
    stub.respond_with(Ok(sample_result("band")));

    session.apply_preset("narrow_reject")?;
    session.select_image(png(3));
    session.submit()?;
    session.run_until_idle().await;

    let payloads = stub.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].field("filter_type"), Some("butterworth"));
    assert_eq!(payloads[0].field("order"), Some("4"));
    assert_eq!(payloads[0].field("center_freq"), Some("80"));
    assert_eq!(payloads[0].field("bandwidth"), Some("8"));

    session.update_config(ConfigPatch::new().filter_mode(FilterMode::Lowpass));
    assert_eq!(session.state().config().center_freq, None);
    assert_eq!(session.view().active_preset, "custom");
    Ok(())
}

#[tokio::test]
async fn unknown_preset_is_reported() -> anyhow::Result<()> {
    let (mut session, _stub) = controller();
    let err = session.apply_preset("vaporwave").unwrap_err();
    assert_eq!(err.to_string(), "unknown preset 'vaporwave'");
    assert_eq!(session.view().active_preset, "default");
    Ok(())
}

#[tokio::test]
async fn unhealthy_service_sets_warning_only() -> anyhow::Result<()> {
    let (mut session, stub) = controller();
    stub.set_healthy(false);

    session.check_health();
    session.run_until_idle().await;
    let warning = session.view().warning.map(str::to_string);
    assert!(warning.unwrap().contains("stub service is down"));
    assert!(session.view().error.is_none());

    stub.set_healthy(true);
    session.check_health();
    session.run_until_idle().await;
    assert!(session.view().warning.is_none());
    Ok(())
}
