/// Messaging module for the audio engine's command/event surface
///
/// - **Commands**: requests from gameplay and UI (imperative, queued)
/// - **Events**: notifications of what the engine did (past tense, broadcast)
///
/// ## Architecture
///
/// ```text
/// ┌──────────┐  AudioCommand  ┌──────────────┐  AudioEvent  ┌─────────────┐
/// │ Gameplay │ ─────────────> │ AudioEngine  │ ───────────> │  Event Bus  │
/// │   / UI   │ CommandSender  │ (owner thread│              │             │
/// └──────────┘                │  drains/tick)│              └─────────────┘
///                             └──────────────┘                     │
///                                                                  ▼
///                                                            ┌──────────┐
///                                                            │ Settings │
///                                                            │ panel,   │
///                                                            │ metrics  │
///                                                            └──────────┘
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// let sender = engine.command_sender();
/// let (events, _id) = engine.events().subscribe();
///
/// // From a gameplay system, possibly on another thread
/// sender.play_effect(SoundEffect::Pop);
///
/// // Once per frame on the engine thread
/// engine.tick(frame_time);
///
/// while let Ok(event) = events.try_recv() {
///     if let AudioEvent::PoolGrew { size } = event {
///         tracing::warn!("effect pool now {} channels", size);
///     }
/// }
/// ```

pub mod bus;
pub mod commands;
pub mod events;

// Re-export commonly used types
pub use bus::{EventBus, SubscriberId};
pub use commands::{AudioCommand, CommandQueue, CommandSender};
pub use events::{AudioEvent, VolumeTarget};
