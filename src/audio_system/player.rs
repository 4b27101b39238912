/// Rodio output device
///
/// One rodio `Sink` per channel, all attached to a single output stream.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use super::channel::{ChannelBackend, PlaybackChannel};
use super::clip::{Clip, ClipId};
use crate::error::AudioError;

/// Backend playing through the default output device
pub struct RodioBackend {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    output_muted: Arc<AtomicBool>,
}

impl RodioBackend {
    /// Open the default output device
    pub fn new() -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::StreamInitFailed(Box::new(e)))?;
        tracing::info!("Opened default audio output stream");

        Ok(Self {
            _stream: stream,
            stream_handle,
            output_muted: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl ChannelBackend for RodioBackend {
    type Channel = RodioChannel;

    const REAL_TIME: bool = true;

    fn create_channel(&mut self) -> RodioChannel {
        RodioChannel {
            stream_handle: self.stream_handle.clone(),
            sink: None,
            clip: None,
            volume: 1.0,
            output_muted: Arc::clone(&self.output_muted),
        }
    }

    fn set_output_muted(&mut self, muted: bool) {
        self.output_muted.store(muted, Ordering::Relaxed);
    }

    fn is_output_muted(&self) -> bool {
        self.output_muted.load(Ordering::Relaxed)
    }
}

/// Channel of the [`RodioBackend`]
pub struct RodioChannel {
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    clip: Option<ClipId>,
    volume: f32,
    output_muted: Arc<AtomicBool>,
}

impl RodioChannel {
    fn sink_volume(&self) -> f32 {
        if self.output_muted.load(Ordering::Relaxed) {
            0.0
        } else {
            self.volume
        }
    }

    fn decode(clip: &Clip, looping: bool) -> Result<Box<dyn Source<Item = i16> + Send>, AudioError> {
        // Decoder needs owned 'static data, so the shared bytes are cloned
        let cursor = Cursor::new((**clip.data()).clone());
        let decode_failed = |e: rodio::decoder::DecoderError| AudioError::DecodeFailed {
            clip: clip.id().to_string(),
            source: Box::new(e),
        };

        let source: Box<dyn Source<Item = i16> + Send> = if looping {
            Box::new(Decoder::new_looped(cursor).map_err(decode_failed)?)
        } else {
            Box::new(Decoder::new(cursor).map_err(decode_failed)?)
        };
        Ok(source)
    }
}

impl PlaybackChannel for RodioChannel {
    fn play(&mut self, clip: &Clip, looping: bool) {
        self.stop();
        self.clip = Some(clip.id().clone());

        let source = match Self::decode(clip, looping) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Skipping playback: {}", e);
                return;
            }
        };

        // A stopped sink is replaced rather than reused
        let sink = match Sink::try_new(&self.stream_handle) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::warn!("Failed to create sink for {}: {}", clip.id(), e);
                return;
            }
        };

        sink.set_volume(self.sink_volume());
        sink.append(source);
        sink.play();
        self.sink = Some(sink);
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_busy(&self) -> bool {
        self.sink.as_ref().map(|s| !s.empty()).unwrap_or(false)
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        let sink_volume = self.sink_volume();
        if let Some(sink) = &self.sink {
            sink.set_volume(sink_volume);
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn clip_id(&self) -> Option<&ClipId> {
        self.clip.as_ref()
    }
}
