use applitude::framework::mock::{MockLoad, RenderProbe};
use applitude::framework::LateJoin;
use applitude::{
    AppOptions, Applitude, ApplitudeError, Deferred, Descriptor, Environment, HostReady,
    Promise, Rejection, RenderPolicy,
};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(1);
const QUIET: Duration = Duration::from_millis(40);

/// Real application with scripted load capabilities and observed renders.
#[tokio::test]
async fn test_async_load_then_render() {
    let app = Applitude::init("mocked", Environment::default(), AppOptions::new());
    let loading = Deferred::new();
    let load = MockLoad::new().return_pending(loading.promise());
    let probe = RenderProbe::new();

    app.register(
        "library",
        Descriptor::new()
            .on_load(load.capability())
            .on_render(probe.capability()),
    );
    load.verify(1);

    // Gate is open, but the load has not finished.
    assert!(probe.expect_none_within(QUIET).await);

    loading.resolve(());
    assert_eq!(probe.next_within(WAIT).await, Some(Ok(())));
    assert_eq!(probe.count(), 1);
}

#[tokio::test]
async fn test_duplicate_never_loads() {
    let app = Applitude::init("mocked", Environment::default(), AppOptions::new());
    let first = MockLoad::new();
    let second = MockLoad::new();

    app.register("dup", Descriptor::new().on_load(first.capability()))
        .register("dup", Descriptor::new().on_load(second.capability()));

    first.verify(1);
    second.verify(0);
}

#[tokio::test]
async fn test_rejected_gate_still_renders_by_default() {
    let host = Deferred::<()>::new();
    let app = Applitude::init(
        "mocked",
        Environment::default(),
        AppOptions::new().before_render(host.promise()),
    );
    let probe = RenderProbe::new();
    app.register("view", Descriptor::new().on_render(probe.capability()));

    host.reject("offline");
    assert_eq!(
        probe.next_within(WAIT).await,
        Some(Err(Rejection::reason("offline")))
    );
}

#[tokio::test]
async fn test_fulfilled_only_policy_skips_render() {
    let app = Applitude::init(
        "mocked",
        Environment::default(),
        AppOptions::new()
            .render_policy(RenderPolicy::FulfilledOnly)
            .before_render(Promise::rejected("offline")),
    );
    let probe = RenderProbe::new();
    app.register("view", Descriptor::new().on_render(probe.capability()));

    assert!(probe.expect_none_within(QUIET).await);
    assert_eq!(probe.count(), 0);
}

#[tokio::test]
async fn test_late_preconditions_rejected_when_configured() {
    let app = Applitude::init(
        "mocked",
        Environment::default(),
        AppOptions::new().late_join(LateJoin::Reject),
    );
    tokio::time::timeout(WAIT, app.when_render_ready())
        .await
        .unwrap()
        .unwrap();

    let err = app
        .try_register(
            "late",
            Descriptor::new().before_render(Promise::resolved(())),
        )
        .unwrap_err();
    assert!(matches!(err, ApplitudeError::Barrier(_)));
    assert!(app.module("late").is_some());
}

#[tokio::test]
async fn test_late_preconditions_ignored_by_default() {
    let app = Applitude::init("mocked", Environment::default(), AppOptions::new());
    tokio::time::timeout(WAIT, app.when_render_ready())
        .await
        .unwrap()
        .unwrap();

    let never = Deferred::new();
    let probe = RenderProbe::new();
    app.register(
        "late",
        Descriptor::new()
            .before_render(never.promise())
            .on_render(probe.capability()),
    );

    // The gate already opened; the new precondition cannot hold it back.
    assert_eq!(probe.next_within(WAIT).await, Some(Ok(())));
}

#[tokio::test]
async fn test_shutdown_cuts_off_pending_loads() {
    let app = Applitude::init(
        "mocked",
        Environment::default(),
        AppOptions::new().host_ready(HostReady::Manual),
    );
    let loading = Deferred::new();
    let load = MockLoad::new().return_pending(loading.promise());
    let probe = RenderProbe::new();

    app.register(
        "slow",
        Descriptor::new()
            .on_load(load.capability())
            .on_render(probe.capability()),
    );

    assert_eq!(app.shutdown().await, 1);
    loading.resolve(());
    app.host_ready();
    assert!(probe.expect_none_within(QUIET).await);
}
