use crate::error::{PlayerError, Result};
use rodio::Source;
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
#[cfg(unix)]
use std::ffi::CString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const MAX_VOLUME: f32 = 2.5;

pub trait PlaybackBackend {
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn is_finished(&self) -> bool;
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    fn set_volume(&mut self, volume: f32);
}

/// Opens backends on the worker thread. Output streams are not `Send`, so
/// the factory travels to the worker instead of the backend.
pub trait BackendFactory: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PlaybackBackend>>;
    fn name(&self) -> &str;

    /// Fails when `open` could not decode `path`. Called on the caller's
    /// thread before a running session is replaced.
    fn check(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RodioFactory;

impl BackendFactory for RodioFactory {
    fn open(&self, path: &Path) -> Result<Box<dyn PlaybackBackend>> {
        Ok(Box::new(RodioBackend::open(path)?))
    }

    fn name(&self) -> &str {
        "rodio"
    }

    fn check(&self, path: &Path) -> Result<()> {
        let file = File::open(path).map_err(|source| PlayerError::io(path, source))?;
        Decoder::try_from(file)
            .map(drop)
            .map_err(|err| PlayerError::decode(path, err))
    }
}

pub struct RodioBackend {
    _stream: OutputStream,
    sink: Sink,
    track_duration: Option<Duration>,
    volume: f32,
}

impl RodioBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| PlayerError::io(path, source))?;
        let source = Decoder::try_from(file).map_err(|err| PlayerError::decode(path, err))?;
        let track_duration = source.total_duration().filter(|value| !value.is_zero());

        let stream = open_output_stream()?;
        let sink = Sink::connect_new(stream.mixer());
        sink.append(source);

        tracing::debug!(path = %path.display(), ?track_duration, "decoder opened");
        Ok(Self {
            _stream: stream,
            sink,
            track_duration,
            volume: 1.0,
        })
    }
}

impl PlaybackBackend for RodioBackend {
    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.stop();
    }

    fn is_finished(&self) -> bool {
        !self.sink.is_paused() && self.sink.empty()
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, MAX_VOLUME);
        self.sink.set_volume(self.volume);
    }
}

fn open_output_stream() -> Result<OutputStream> {
    let mut stream = with_silenced_stderr(|| {
        let host = rodio::cpal::default_host();
        match OutputStreamBuilder::from_default_device().and_then(|builder| {
            builder
                .with_error_callback(|err| tracing::warn!("audio stream error: {err}"))
                .open_stream_or_fallback()
        }) {
            Ok(stream) => Ok(stream),
            Err(default_err) => {
                let mut candidates: Vec<String> = host
                    .output_devices()
                    .ok()
                    .into_iter()
                    .flatten()
                    .filter_map(|device| device.name().ok())
                    .collect();
                candidates.sort_by_cached_key(|name| {
                    let lower = name.to_ascii_lowercase();
                    let rank = if lower.contains("pulse") {
                        0_u8
                    } else if lower.contains("pipewire") {
                        1_u8
                    } else if lower.contains("default") {
                        2_u8
                    } else {
                        3_u8
                    };
                    (rank, lower)
                });
                candidates.dedup();

                for candidate in candidates {
                    let Some(device) = host
                        .output_devices()
                        .ok()
                        .into_iter()
                        .flatten()
                        .find(|entry| entry.name().ok().as_deref() == Some(candidate.as_str()))
                    else {
                        continue;
                    };
                    let opened = OutputStreamBuilder::from_device(device).and_then(|builder| {
                        builder
                            .with_error_callback(|err| tracing::warn!("audio stream error: {err}"))
                            .open_stream_or_fallback()
                    });
                    match opened {
                        Ok(stream) => {
                            tracing::info!(device = %candidate, "using fallback output device");
                            return Ok(stream);
                        }
                        Err(err) => {
                            tracing::debug!(device = %candidate, "output device rejected: {err}")
                        }
                    }
                }

                Err(PlayerError::Output(format!(
                    "unable to start any audio output stream after default failed: {default_err}"
                )))
            }
        }
    })?;
    stream.log_on_drop(false);
    Ok(stream)
}

#[cfg(unix)]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    let saved = unsafe { libc::dup(libc::STDERR_FILENO) };
    if saved < 0 {
        return operation();
    }

    let devnull = CString::new("/dev/null")
        .ok()
        .map(|path| unsafe { libc::open(path.as_ptr(), libc::O_WRONLY) })
        .unwrap_or(-1);

    if devnull >= 0 {
        unsafe {
            libc::dup2(devnull, libc::STDERR_FILENO);
            libc::close(devnull);
        }
    }

    let result = operation();

    unsafe {
        libc::dup2(saved, libc::STDERR_FILENO);
        libc::close(saved);
    }

    result
}

#[cfg(not(unix))]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    operation()
}

#[derive(Debug, Default, Clone)]
pub struct NullFactory {
    duration: Option<Duration>,
}

impl NullFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
        }
    }
}

impl BackendFactory for NullFactory {
    fn open(&self, path: &Path) -> Result<Box<dyn PlaybackBackend>> {
        let duration = self.duration.or_else(|| NullBackend::estimate_duration(path));
        Ok(Box::new(NullBackend::new(path, duration)))
    }

    fn name(&self) -> &str {
        "null"
    }
}

pub struct NullBackend {
    path: PathBuf,
    paused: bool,
    stopped: bool,
    volume: f32,
    started_at: Option<Instant>,
    position_offset: Duration,
    track_duration: Option<Duration>,
}

impl NullBackend {
    pub fn new(path: &Path, track_duration: Option<Duration>) -> Self {
        Self {
            path: path.to_path_buf(),
            paused: false,
            stopped: false,
            volume: 1.0,
            started_at: Some(Instant::now()),
            position_offset: Duration::ZERO,
            track_duration,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn estimate_duration(path: &Path) -> Option<Duration> {
        let file = File::open(path).ok()?;
        let source = Decoder::try_from(file).ok()?;
        source
            .total_duration()
            .filter(|duration| !duration.is_zero())
    }

    fn current_position(&self) -> Duration {
        let mut position = self.position_offset;
        if !self.paused
            && !self.stopped
            && let Some(started_at) = self.started_at
        {
            position = position.saturating_add(started_at.elapsed());
        }
        if let Some(duration) = self.track_duration {
            return position.min(duration);
        }
        position
    }
}

impl PlaybackBackend for NullBackend {
    fn pause(&mut self) {
        self.position_offset = self.current_position();
        self.started_at = None;
        self.paused = true;
    }

    fn resume(&mut self) {
        if !self.stopped && self.paused {
            self.started_at = Some(Instant::now());
        }
        self.paused = false;
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.paused = false;
        self.started_at = None;
        self.position_offset = Duration::ZERO;
    }

    fn is_finished(&self) -> bool {
        let Some(duration) = self.track_duration else {
            return false;
        };
        !self.stopped && !self.paused && self.current_position() >= duration
    }

    fn position(&self) -> Duration {
        self.current_position()
    }

    fn duration(&self) -> Option<Duration> {
        self.track_duration
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, MAX_VOLUME);
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendFactory, NullBackend, NullFactory, PlaybackBackend, RodioFactory};
    use crate::error::PlayerError;
    use std::fs;
    use crate::metadata::tests::write_test_wav;
    use std::path::Path;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn null_backend_position_advances_when_playing() {
        let backend = NullBackend::new(Path::new("nonexistent-track.flac"), None);
        let before = backend.position();
        thread::sleep(Duration::from_millis(20));
        let after = backend.position();
        assert!(after > before, "position should advance while playing");
    }

    #[test]
    fn null_backend_pause_and_resume_control_position_progression() {
        let mut backend = NullBackend::new(Path::new("nonexistent-track.flac"), None);
        thread::sleep(Duration::from_millis(20));

        backend.pause();
        let paused = backend.position();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(backend.position(), paused, "position should freeze while paused");

        backend.resume();
        thread::sleep(Duration::from_millis(20));
        assert!(backend.position() > paused, "position should continue after resume");
    }

    #[test]
    fn null_backend_stop_resets_position_and_never_finishes() {
        let mut backend =
            NullBackend::new(Path::new("nonexistent-track.flac"), Some(Duration::ZERO));
        backend.stop();
        assert_eq!(backend.position(), Duration::ZERO);
        assert!(!backend.is_finished());
    }

    #[test]
    fn null_backend_volume_is_clamped() {
        let mut backend = NullBackend::new(Path::new("nonexistent-track.flac"), None);
        backend.set_volume(9.0);
        assert_eq!(backend.volume(), super::MAX_VOLUME);
        backend.set_volume(-1.0);
        assert_eq!(backend.volume(), 0.0);
    }

    #[test]
    fn null_factory_probes_duration_from_wav() {
        let dir = tempdir().expect("tempdir");
        let track = dir.path().join("fixture.wav");
        write_test_wav(&track, 80);

        let backend = NullFactory::new().open(&track).expect("open");
        let duration = backend.duration().expect("duration should be detected");
        assert!(duration >= Duration::from_millis(70));

        thread::sleep(Duration::from_millis(120));
        assert!(backend.is_finished(), "known-duration playback should finish");
    }

    #[test]
    fn null_factory_unknown_duration_does_not_auto_finish() {
        let backend = NullFactory::new()
            .open(Path::new("nonexistent-track.flac"))
            .expect("open");
        assert_eq!(backend.duration(), None);

        thread::sleep(Duration::from_millis(40));
        assert!(!backend.is_finished());
    }

    #[test]
    fn rodio_check_sorts_out_unplayable_files() {
        let dir = tempdir().expect("tempdir");
        let track = dir.path().join("fixture.wav");
        write_test_wav(&track, 40);
        RodioFactory.check(&track).expect("wav decodes");

        let missing = RodioFactory
            .check(&dir.path().join("missing.wav"))
            .expect_err("missing file");
        assert!(missing.is_io(), "unexpected error: {missing:#}");

        let text = dir.path().join("notes.wav");
        fs::write(&text, b"not a riff header").expect("write text");
        let garbage = RodioFactory.check(&text).expect_err("garbage");
        assert!(
            matches!(garbage, PlayerError::Decode { .. }),
            "unexpected error: {garbage:#}"
        );
    }
}
