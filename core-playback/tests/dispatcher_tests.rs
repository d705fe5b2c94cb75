//! Dispatcher behaviour against the in-memory host.

use bridge_native::{BridgeCall, BridgeOp, InMemoryAudioHost, StaticEnvironment, StaticMediaProbe};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::AudioBridge;
use core_playback::{
    BackendKind, CapabilityValue, InterruptMode, PlayOptions, PlayState, PreloadHandle,
    SoundConfig, SoundContext, SoundError, SoundEvent, SoundInstance,
};
use core_runtime::config::CoreConfig;
use mockall::mock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn context_with(
    host: Arc<dyn AudioBridge>,
    probe: StaticMediaProbe,
    env: StaticEnvironment,
) -> SoundContext {
    let core = CoreConfig::builder()
        .audio_bridge(host)
        .media_probe(Arc::new(probe))
        .environment(Arc::new(env))
        .build()
        .unwrap();
    SoundContext::new(core, SoundConfig::default()).unwrap()
}

/// HTML backend that plays mp3 and wav but not ogg.
fn mp3_wav_context(host: Arc<InMemoryAudioHost>) -> SoundContext {
    let context = context_with(
        host,
        StaticMediaProbe::new().with_type("audio/mp3").with_type("audio/wav"),
        StaticEnvironment::plain(),
    );
    assert_eq!(context.register_backend(BackendKind::Html).unwrap(), BackendKind::Html);
    context
}

fn default_context(host: Arc<InMemoryAudioHost>) -> SoundContext {
    context_with(host, StaticMediaProbe::all_common(), StaticEnvironment::plain())
}

fn begins(host: &InMemoryAudioHost) -> usize {
    host.calls()
        .iter()
        .filter(|call| matches!(call, BridgeCall::Begin(_) | BridgeCall::BeginLooped(_)))
        .count()
}

// ============================================================================
// Source resolution
// ============================================================================

#[test]
fn first_supported_alternative_wins() {
    let host = Arc::new(InMemoryAudioHost::new());
    let context = mp3_wav_context(host.clone());

    let descriptor = context
        .register_for_preload("a.ogg|a.wav", None, Some("a"), None)
        .unwrap();

    assert_eq!(descriptor.src, "a.wav");
    assert_eq!(descriptor.name, "a");
    assert_eq!(descriptor.extension, "wav");
    assert_eq!(descriptor.kind, "sound");
    assert_eq!(host.calls(), vec![BridgeCall::Init("a.wav".into())]);

    for _ in 0..3 {
        let again = context
            .register_for_preload("a.ogg|a.wav", None, None, None)
            .unwrap();
        assert_eq!(again.src, "a.wav");
    }
}

#[test]
fn unplayable_list_is_unsupported_format() {
    let context = mp3_wav_context(Arc::new(InMemoryAudioHost::new()));

    let err = context
        .register_for_preload("a.ogg|a.aac", None, Some("a"), None)
        .unwrap_err();
    assert!(matches!(err, SoundError::UnsupportedFormat(_)));

    let err = context.register_for_preload("", None, None, None).unwrap_err();
    assert!(matches!(err, SoundError::InvalidSource(_)));
}

#[test]
fn play_by_id_matches_play_by_path() {
    let host = Arc::new(InMemoryAudioHost::new());
    let context = mp3_wav_context(host.clone());
    context
        .register_for_preload("theme.ogg|theme.mp3", None, Some("theme"), None)
        .unwrap();

    let by_id = context.play("theme", PlayOptions::default()).unwrap();
    let by_path = context.play("theme.mp3", PlayOptions::default()).unwrap();
    let by_list = context.play("theme.ogg|theme.mp3", PlayOptions::default()).unwrap();

    assert_eq!(by_id.src(), "theme.mp3");
    assert_eq!(by_path.src(), by_id.src());
    assert_eq!(by_list.src(), by_id.src());
    assert_eq!(context.resolve_id("theme"), "theme.mp3");
}

#[test]
fn unregistered_id_is_a_literal_path() {
    let host = Arc::new(InMemoryAudioHost::new());
    let context = default_context(host.clone());

    let instance = context.play("missingId", PlayOptions::default()).unwrap();

    assert_eq!(instance.src(), "missingId");
    assert_eq!(context.active_backend_kind(), Some(BackendKind::Default));
    assert_eq!(host.calls(), vec![BridgeCall::Begin("missingId".into())]);
}

// ============================================================================
// Backends and capabilities
// ============================================================================

#[test]
fn capabilities_are_stable() {
    let context = mp3_wav_context(Arc::new(InMemoryAudioHost::new()));

    let first = context.capabilities().unwrap();
    let second = context.capabilities().unwrap();

    assert_eq!(first, second);
    assert_eq!(context.capability("ogg").unwrap(), Some(CapabilityValue::Bool(false)));
    assert_eq!(context.capability("mp3").unwrap(), Some(CapabilityValue::Bool(true)));
    assert_eq!(context.capability("bogus").unwrap(), None);
}

#[test]
fn external_backend_on_air_android() {
    let host = Arc::new(InMemoryAudioHost::new());
    let context = context_with(
        host.clone(),
        StaticMediaProbe::all_common(),
        StaticEnvironment::air_on_android(),
    );

    assert_eq!(context.register_preferred_backends().unwrap(), BackendKind::External);
    context
        .register_for_preload("music.mp3", None, Some("music"), None)
        .unwrap();

    let handle = context.preload_handle("music").unwrap();
    assert_eq!(handle.preload_id(), Some("p0"));
    assert!(handle.is_loaded());
    assert!(host.calls().is_empty());

    let music = context
        .play("music", PlayOptions::new().with_pan(-0.25))
        .unwrap();
    assert_eq!(music.pan(), -0.25);
}

#[test]
fn html_refuses_pan_on_play() {
    let context = mp3_wav_context(Arc::new(InMemoryAudioHost::new()));
    let err = context
        .play("a.mp3", PlayOptions::new().with_pan(0.5))
        .unwrap_err();
    assert!(matches!(err, SoundError::Unsupported(_)));
    assert!(context.live_instances().is_empty());
}

#[test]
fn headless_context_has_no_backend() {
    let core = CoreConfig::builder().headless().build().unwrap();
    let context = SoundContext::new(core, SoundConfig::default()).unwrap();

    assert!(matches!(
        context.register_preferred_backends(),
        Err(SoundError::NoSupportedBackend(_))
    ));
    assert!(matches!(
        context.play("a.mp3", PlayOptions::default()),
        Err(SoundError::NoActiveBackend)
    ));
    assert!(matches!(
        context.register_for_preload("a.mp3", None, None, None),
        Err(SoundError::NoActiveBackend)
    ));
    assert!(matches!(context.stop(None), Err(SoundError::NoActiveBackend)));
}

// ============================================================================
// Preloading
// ============================================================================

#[test]
fn preload_failure_is_surfaced() {
    let host = Arc::new(InMemoryAudioHost::new());
    host.fail_on(BridgeOp::Init);
    let context = default_context(host);

    let err = context
        .register_for_preload("a.mp3", None, Some("a"), None)
        .unwrap_err();

    assert!(err.is_native_failure());
    assert!(context.preload_handle("a.mp3").is_none());
}

#[test]
fn strict_host_plays_only_registered_sources() {
    let host = Arc::new(InMemoryAudioHost::strict());
    let context = default_context(host);

    let err = context.play("a.mp3", PlayOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        SoundError::NativeCallFailed(BridgeError::NotAvailable(_))
    ));

    context.register_for_preload("a.mp3", None, None, None).unwrap();
    let instance = context.play("a.mp3", PlayOptions::default()).unwrap();
    assert_eq!(instance.play_state(), PlayState::Playing);
}

#[test]
fn preload_events_reach_the_handle() {
    let context = default_context(Arc::new(InMemoryAudioHost::new()));
    context
        .register_for_preload("sfx/boom.ogg", None, Some("boom"), None)
        .unwrap();

    let handle = context.preload_handle("boom").unwrap();
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = loads.clone();
    handle.set_on_load(Arc::new(move |_: &PreloadHandle| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    context
        .handle_sound_event("boom", SoundEvent::Progress { loaded: 1, total: 4 })
        .unwrap();
    assert_eq!(handle.progress(), 0.25);

    context.handle_sound_event("sfx/boom.ogg", SoundEvent::Ready).unwrap();
    context.handle_sound_event("boom", SoundEvent::Ready).unwrap();

    assert!(handle.is_loaded());
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[test]
fn preload_data_caps_channels() {
    let context = default_context(Arc::new(InMemoryAudioHost::new()));
    context
        .register_for_preload("shot.wav", None, Some("shot"), Some(serde_json::json!(1)))
        .unwrap();

    let first = context.play("shot", PlayOptions::default()).unwrap();
    let err = context.play("shot", PlayOptions::default()).unwrap_err();
    assert!(matches!(err, SoundError::ChannelsExhausted { limit: 1, .. }));

    let second = context
        .play("shot", PlayOptions::new().with_interrupt(InterruptMode::Any))
        .unwrap();

    assert_eq!(first.play_state(), PlayState::Interrupted);
    assert_eq!(second.play_state(), PlayState::Playing);
    assert_eq!(context.live_instances(), vec![second]);
}

// ============================================================================
// Bulk operations
// ============================================================================

#[test]
fn stopped_instance_leaves_bulk_operations() {
    let host = Arc::new(InMemoryAudioHost::new());
    let context = default_context(host.clone());

    let first = context.play("a.mp3", PlayOptions::default()).unwrap();
    let second = context.play("a.mp3", PlayOptions::default()).unwrap();
    first.stop().unwrap();

    assert_eq!(context.pause(Some("a.mp3")).unwrap(), 1);
    assert_eq!(context.resume(Some("a.mp3")).unwrap(), 1);
    assert_eq!(context.stop(Some("a.mp3")).unwrap(), 1);
    assert_eq!(context.stop(Some("a.mp3")).unwrap(), 0);

    assert_eq!(first.play_state(), PlayState::Finished);
    assert_eq!(second.play_state(), PlayState::Finished);
}

#[test]
fn bulk_filter_by_id() {
    let context = mp3_wav_context(Arc::new(InMemoryAudioHost::new()));
    context
        .register_for_preload("a.ogg|a.wav", None, Some("a"), None)
        .unwrap();

    let a = context.play("a", PlayOptions::default()).unwrap();
    let b = context.play("b.mp3", PlayOptions::default()).unwrap();

    assert_eq!(context.pause(Some("a")).unwrap(), 1);
    assert!(a.is_paused());
    assert!(!b.is_paused());

    assert_eq!(context.pause(None).unwrap(), 1);
    assert!(b.is_paused());
    assert_eq!(context.resume(None).unwrap(), 2);
    assert_eq!(context.stop(None).unwrap(), 2);
    assert!(context.live_instances().is_empty());
}

#[test]
fn bulk_counts_only_successes() {
    let host = Arc::new(InMemoryAudioHost::new());
    let context = default_context(host.clone());
    let a = context.play("a.mp3", PlayOptions::default()).unwrap();

    host.fail_on(BridgeOp::Pause);
    assert_eq!(context.pause(None).unwrap(), 0);
    assert_eq!(a.play_state(), PlayState::Playing);

    host.recover();
    assert_eq!(context.pause(None).unwrap(), 1);
}

#[test]
fn bulk_skips_instances_already_in_target_state() {
    let host = Arc::new(InMemoryAudioHost::new());
    let context = default_context(host.clone());
    let a = context.play("a.mp3", PlayOptions::default()).unwrap();

    assert_eq!(context.resume(None).unwrap(), 0);
    assert_eq!(context.pause(None).unwrap(), 1);
    assert_eq!(context.pause(None).unwrap(), 0);
    assert!(a.is_paused());

    assert_eq!(context.resume(None).unwrap(), 1);
    assert_eq!(context.resume(None).unwrap(), 0);
    assert_eq!(a.play_state(), PlayState::Playing);
    assert_eq!(
        host.calls()
            .iter()
            .filter(|call| matches!(call, BridgeCall::Pause(_)))
            .count(),
        1
    );
}

// ============================================================================
// Host events
// ============================================================================

#[test]
fn completion_and_loop_events() {
    let context = default_context(Arc::new(InMemoryAudioHost::new()));
    let completed = Arc::new(AtomicUsize::new(0));
    let looped = Arc::new(AtomicUsize::new(0));

    let instance = context
        .play("loop.ogg", PlayOptions::new().with_loops(1))
        .unwrap();
    let c = completed.clone();
    instance.set_on_complete(Arc::new(move |_: &SoundInstance| {
        c.fetch_add(1, Ordering::SeqCst);
    }));
    let l = looped.clone();
    instance.set_on_loop(Arc::new(move |_: &SoundInstance| {
        l.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(context.handle_sound_event("loop.ogg", SoundEvent::Loop).unwrap(), 1);
    assert_eq!(context.handle_sound_event("loop.ogg", SoundEvent::Loop).unwrap(), 0);
    assert_eq!(context.handle_sound_event("loop.ogg", SoundEvent::Finished).unwrap(), 1);
    assert_eq!(context.handle_sound_event("loop.ogg", SoundEvent::Finished).unwrap(), 0);

    assert_eq!(looped.load(Ordering::SeqCst), 1);
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert!(context.live_instances().is_empty());
}

#[test]
fn failure_event_marks_instances_failed() {
    let context = default_context(Arc::new(InMemoryAudioHost::new()));
    let instance = context.play("a.mp3", PlayOptions::default()).unwrap();

    assert_eq!(context.handle_sound_event("a.mp3", SoundEvent::Failed).unwrap(), 1);
    assert_eq!(instance.play_state(), PlayState::Failed);
    assert!(matches!(instance.pause(), Err(SoundError::InstanceFinished(_))));
}

// ============================================================================
// Failing bridge
// ============================================================================

mock! {
    Bridge {}

    impl AudioBridge for Bridge {
        fn init(&self, src: &str) -> BridgeResult<()>;
        fn begin(&self, src: &str) -> BridgeResult<()>;
        fn begin_looped(&self, src: &str) -> BridgeResult<()>;
        fn pause(&self, src: &str) -> BridgeResult<()>;
        fn resume(&self, src: &str) -> BridgeResult<()>;
        fn stop(&self, src: &str) -> BridgeResult<()>;
        fn current_time(&self, src: &str) -> BridgeResult<f64>;
        fn set_current_time(&self, src: &str, seconds: f64) -> BridgeResult<()>;
    }
}

#[test]
fn rejected_begin_fails_the_play() {
    let mut bridge = MockBridge::new();
    bridge
        .expect_begin_looped()
        .withf(|src| src == "a.mp3")
        .times(1)
        .returning(|_| Err(BridgeError::OperationFailed("device busy".into())));
    bridge.expect_stop().never();

    let context = context_with(
        Arc::new(bridge),
        StaticMediaProbe::all_common(),
        StaticEnvironment::plain(),
    );

    let err = context
        .play("a.mp3", PlayOptions::new().with_loops(-1))
        .unwrap_err();

    assert!(err.is_native_failure());
    assert!(context.live_instances().is_empty());
    assert_eq!(context.stop(None).unwrap(), 0);
}

#[test]
fn out_of_range_seek_is_reported() {
    let mut bridge = MockBridge::new();
    bridge.expect_begin().returning(|_| Ok(()));
    bridge
        .expect_set_current_time()
        .returning(|_, secs| Err(BridgeError::OutOfRange(format!("{secs}s"))));
    bridge.expect_current_time().returning(|_| Ok(f64::NAN));

    let context = context_with(
        Arc::new(bridge),
        StaticMediaProbe::all_common(),
        StaticEnvironment::plain(),
    );
    let instance = context.play("a.mp3", PlayOptions::default()).unwrap();

    let err = instance.set_position(Duration::from_secs(99)).unwrap_err();
    assert!(matches!(
        err,
        SoundError::NativeCallFailed(BridgeError::OutOfRange(_))
    ));
    assert_eq!(instance.position().unwrap(), Duration::ZERO);
    assert_eq!(instance.play_state(), PlayState::Playing);
}

// ============================================================================
// Delayed starts
// ============================================================================

#[tokio::test(start_paused = true)]
async fn stop_all_cancels_pending_delays() {
    let host = Arc::new(InMemoryAudioHost::new());
    let context = default_context(host.clone());
    let delayed = PlayOptions::new().with_delay(Duration::from_millis(1000));

    let first = context.play("first.mp3", delayed).unwrap();
    let second = context.play("second.ogg", delayed).unwrap();

    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(begins(&host), 0);

    assert_eq!(context.stop(None).unwrap(), 2);

    tokio::time::advance(Duration::from_millis(1000)).await;
    tokio::task::yield_now().await;

    assert_eq!(first.play_state(), PlayState::Finished);
    assert_eq!(second.play_state(), PlayState::Finished);
    assert!(!first.has_pending_start());
    assert_eq!(begins(&host), 0);
    assert!(host.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn delayed_start_applies_offset_at_start() {
    let host = Arc::new(InMemoryAudioHost::new());
    let context = default_context(host.clone());

    let instance = context
        .play(
            "intro.mp3",
            PlayOptions::new()
                .with_delay(Duration::from_millis(200))
                .with_offset(Duration::from_millis(2500)),
        )
        .unwrap();
    assert!(host.calls().is_empty());
    assert_eq!(context.live_instances().len(), 1);

    tokio::time::sleep(Duration::from_millis(250)).await;

    assert_eq!(instance.play_state(), PlayState::Playing);
    assert_eq!(
        host.calls(),
        vec![
            BridgeCall::SetCurrentTime("intro.mp3".into(), 2.5),
            BridgeCall::Begin("intro.mp3".into()),
        ]
    );
    assert_eq!(instance.position().unwrap(), Duration::from_millis(2500));
}

#[tokio::test(start_paused = true)]
async fn stop_one_delay_leaves_the_other() {
    let host = Arc::new(InMemoryAudioHost::new());
    let context = default_context(host.clone());
    let delayed = PlayOptions::new().with_delay(Duration::from_millis(1000));

    let a = context.play("a.mp3", delayed).unwrap();
    let b = context.play("b.mp3", delayed).unwrap();
    assert_eq!(context.stop(Some("a.mp3")).unwrap(), 1);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    assert_eq!(a.play_state(), PlayState::Finished);
    assert_eq!(b.play_state(), PlayState::Playing);
    assert_eq!(host.calls(), vec![BridgeCall::Begin("b.mp3".into())]);
}
