//! # Sound Dispatch Example
//!
//! Drives a [`SoundContext`] against the in-memory host and prints what the
//! host was asked to do.
//!
//! Run with: `cargo run --example dispatch_demo --package core-playback`

use bridge_native::{InMemoryAudioHost, StaticEnvironment, StaticMediaProbe};
use bridge_traits::log::LogLevel;
use core_playback::{InterruptMode, PlayOptions, SoundConfig, SoundContext, SoundEvent};
use core_runtime::config::CoreConfig;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main(flavor = "current_thread")]
async fn main() -> core_playback::Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let host = Arc::new(InMemoryAudioHost::new().with_duration("sfx/laser.wav", 1.5));
    let core = CoreConfig::builder()
        .audio_bridge(host.clone())
        .media_probe(Arc::new(
            StaticMediaProbe::new()
                .with_type("audio/mpeg")
                .with_type("audio/wav"),
        ))
        .environment(Arc::new(StaticEnvironment::plain()))
        .build()?;

    let context = SoundContext::new(core, SoundConfig::default())?;
    let backend = context.register_preferred_backends()?;
    println!("active backend: {}", backend);
    println!("capabilities:   {:?}", context.capabilities()?);

    let descriptor = context.register_for_preload(
        "sfx/laser.ogg|sfx/laser.wav",
        None,
        Some("laser"),
        Some(serde_json::json!(2)),
    )?;
    println!("laser resolved to {}", descriptor.src);

    let interrupt = PlayOptions::new().with_interrupt(InterruptMode::Early);
    let first = context.play("laser", interrupt)?;
    let second = context.play("laser", interrupt)?;
    let third = context.play("laser", interrupt.with_volume(0.5))?;
    println!(
        "states: {} {} {}",
        first.play_state().as_str(),
        second.play_state().as_str(),
        third.play_state().as_str()
    );

    let delayed = context.play(
        "music/theme.mp3",
        PlayOptions::new()
            .with_delay(Duration::from_millis(300))
            .with_loops(-1),
    )?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("stopped {} instance(s)", context.stop(None)?);
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("delayed start after stop: {}", delayed.play_state().as_str());

    context.handle_sound_event("laser", SoundEvent::Finished)?;

    println!("host calls:");
    for call in host.calls() {
        println!("  {:?}", call);
    }
    Ok(())
}
