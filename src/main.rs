use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use candy_audio::audio_system::{ChannelBackend, Clip, ClipLibrary, SoundEffect, VirtualBackend};
use candy_audio::messaging::{AudioCommand, AudioEvent};
use candy_audio::settings::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore};
use candy_audio::{AppResult, AudioEngine, EngineConfig};

const LOG_TARGET_STARTUP: &str = "candy_audio::startup";

/// 60 Hz
const FRAME: Duration = Duration::from_micros(16_667);

/// Initialize tracing with file rotation
///
/// Logs are written to `<config dir>/CandyPopBlast/logs/candy-audio.YYYY-MM-DD.log`.
/// Debug builds also log to the console.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("CandyPopBlast").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "candy-audio.log");

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn load_config() -> EngineConfig {
    match EngineConfig::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            EngineConfig::default()
        }
    }
}

fn open_store() -> Box<dyn PreferenceStore> {
    match JsonPreferenceStore::open_default() {
        Ok(store) => {
            tracing::info!(target: LOG_TARGET_STARTUP, "Preferences: {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            tracing::warn!("{}, settings will not persist", e);
            Box::new(MemoryPreferenceStore::new())
        }
    }
}

fn clip_base_dir() -> PathBuf {
    EngineConfig::config_path()
        .ok()
        .and_then(|path| path.parent().and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Register a silent stand-in for every listed clip that failed to load
///
/// Only used with the virtual backend, which never decodes.
fn fill_missing_clips(config: &EngineConfig, library: &mut ClipLibrary) {
    for entry in &config.clips {
        if library.contains(&entry.id) {
            continue;
        }
        let mut clip = Clip::new(entry.id.clone(), Arc::new(Vec::new()));
        if let Some(ms) = entry.length_ms {
            clip = clip.with_length(Duration::from_millis(ms));
        }
        if library.insert(clip).is_ok() {
            tracing::debug!("Using silent placeholder for {}", entry.id);
        }
    }
}

/// Commands issued at fixed frames of the demo run
fn script(config: &EngineConfig) -> Vec<(u32, AudioCommand)> {
    let alternate = config
        .clips
        .iter()
        .map(|entry| entry.id.clone())
        .find(|id| Some(id) != config.default_music.as_ref() && !config.effects.values().any(|e| e == id));

    let mut script = vec![
        (30, AudioCommand::PlayEffect { effect: SoundEffect::Swap }),
        (45, AudioCommand::PlayEffect { effect: SoundEffect::Pop }),
        (60, AudioCommand::SetSfxVolume { level: 0.6 }),
    ];

    // A cascade: more overlapping effects than the seeded pool holds
    for frame in 75..82 {
        script.push((frame, AudioCommand::PlayEffect { effect: SoundEffect::Blast }));
    }

    if let Some(track) = alternate {
        script.push((120, AudioCommand::PlayMusic { clip: Some(track), fade: true }));
        // Redirect halfway through the fade-out
        script.push((150, AudioCommand::PlayMusic { clip: config.default_music.clone(), fade: true }));
    }

    script.extend([
        (180, AudioCommand::SetMasterVolume { level: 0.5 }),
        (300, AudioCommand::ToggleMute { muted: true }),
        (310, AudioCommand::PlayEffect { effect: SoundEffect::Win }),
        (360, AudioCommand::ToggleMute { muted: false }),
        (370, AudioCommand::PlayEffect { effect: SoundEffect::Win }),
        (420, AudioCommand::SaveSettings),
    ]);
    script
}

fn run_demo<B: ChannelBackend>(
    backend: B,
    config: EngineConfig,
    clips: ClipLibrary,
    store: Box<dyn PreferenceStore>,
) {
    let script = script(&config);
    let last_frame = script.iter().map(|(frame, _)| *frame).max().unwrap_or(0) + 30;

    let mut engine = AudioEngine::new(backend, config, clips, store);
    let (events, _subscriber) = engine.events().subscribe();
    let sender = engine.command_sender();

    engine.initialize();

    for frame in 0..=last_frame {
        for (_, command) in script.iter().filter(|(at, _)| *at == frame) {
            sender.send(command.clone());
        }

        engine.tick(FRAME);

        for event in events.try_iter() {
            match event {
                AudioEvent::EffectPlayed { .. } => tracing::debug!("{}", event.description()),
                _ => tracing::info!("[frame {}] {}", frame, event.description()),
            }
        }

        if B::REAL_TIME {
            std::thread::sleep(FRAME);
        }
    }

    tracing::info!(
        "Demo finished: music {}, {} effect channels",
        engine.music_state().description(),
        engine.pool_size()
    );
    engine.shutdown();
}

#[cfg(feature = "rodio-output")]
fn run_on_device(config: EngineConfig, store: Box<dyn PreferenceStore>) -> AppResult<()> {
    use candy_audio::audio_system::RodioBackend;

    let backend = RodioBackend::new()?;
    let (clips, failures) = config.load_clips(&clip_base_dir());
    if !failures.is_empty() {
        tracing::warn!("{} clips failed to load", failures.len());
    }
    run_demo(backend, config, clips, store);
    Ok(())
}

#[cfg(not(feature = "rodio-output"))]
fn run_on_device(_config: EngineConfig, _store: Box<dyn PreferenceStore>) -> AppResult<()> {
    anyhow::bail!("--device requires building with the `rodio-output` feature")
}

fn main() -> AppResult<()> {
    initialize_tracing();

    let use_device = std::env::args().skip(1).any(|arg| arg == "--device");

    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting candy-audio v{} ({})",
        env!("CARGO_PKG_VERSION"),
        if use_device { "device output" } else { "virtual output" }
    );
    tracing::info!(target: LOG_TARGET_STARTUP, "Config: {}", EngineConfig::config_dir_display());

    let config = load_config();
    let store = open_store();

    if use_device {
        return run_on_device(config, store);
    }

    let (mut clips, _failures) = config.load_clips(&clip_base_dir());
    fill_missing_clips(&config, &mut clips);
    if let Some(id) = config.default_music.as_ref().filter(|id| !clips.contains(id)) {
        tracing::warn!("Default music {} is not in the clip list", id);
    }

    run_demo(VirtualBackend::new(), config, clips, store);
    Ok(())
}
