use crate::audio::{BackendFactory, MAX_VOLUME, PlaybackBackend, RodioFactory};
use crate::error::{PlayerError, Result};
use crate::metadata::{self, LoadedTrack, TrackMetadata};
use crate::model::{PlaybackEvent, PlaybackState};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_THREAD_NAME: &str = "audio-player";
const WORKER_TICK: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy)]
enum Command {
    Pause,
    Resume,
    Stop,
    SetVolume(f32),
}

struct Request {
    command: Command,
    reply: Sender<()>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Progress {
    position: Duration,
    duration: Option<Duration>,
}

struct Shared {
    state: RwLock<PlaybackState>,
    progress: RwLock<Progress>,
    volume: Mutex<f32>,
    subscribers: Mutex<Vec<Sender<PlaybackEvent>>>,
}

impl Shared {
    fn set_state(&self, state: PlaybackState) {
        *self.state.write() = state;
    }

    fn emit(&self, event: PlaybackEvent) {
        info!(?event, "playback event");
        self.subscribers
            .lock()
            .retain(|subscriber| subscriber.send(event).is_ok());
    }
}

struct Session {
    id: u64,
    commands: Sender<Request>,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct Player {
    track: LoadedTrack,
    factory: Arc<dyn BackendFactory>,
    thread_name: String,
    shared: Arc<Shared>,
    session: Mutex<Option<Session>>,
    sessions_started: AtomicU64,
}

impl Player {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let track = metadata::load_track(path.as_ref())?;
        Ok(Self::from_loaded(track))
    }

    pub fn from_loaded(track: LoadedTrack) -> Self {
        Self {
            track,
            factory: Arc::new(RodioFactory),
            thread_name: String::from(DEFAULT_THREAD_NAME),
            shared: Arc::new(Shared {
                state: RwLock::new(PlaybackState::Idle),
                progress: RwLock::new(Progress::default()),
                volume: Mutex::new(1.0),
                subscribers: Mutex::new(Vec::new()),
            }),
            session: Mutex::new(None),
            sessions_started: AtomicU64::new(0),
        }
    }

    pub fn with_backend(mut self, factory: Arc<dyn BackendFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.track.path
    }

    pub fn track(&self) -> &LoadedTrack {
        &self.track
    }

    pub fn metadata(&self) -> &TrackMetadata {
        &self.track.metadata
    }

    pub fn title(&self) -> Option<&str> {
        self.track.metadata.title.as_deref()
    }

    pub fn artist(&self) -> Option<&str> {
        self.track.metadata.artist.as_deref()
    }

    pub fn album(&self) -> Option<&str> {
        self.track.metadata.album.as_deref()
    }

    pub fn track_number(&self) -> Option<&str> {
        self.track.metadata.track.as_deref()
    }

    pub fn tempo(&self) -> Option<&str> {
        self.track.metadata.tempo.as_deref()
    }

    pub fn backend_name(&self) -> &str {
        self.factory.name()
    }

    pub fn state(&self) -> PlaybackState {
        *self.shared.state.read()
    }

    pub fn position(&self) -> Duration {
        self.shared.progress.read().position
    }

    pub fn duration(&self) -> Option<Duration> {
        self.shared
            .progress
            .read()
            .duration
            .or(self.track.metadata.duration)
    }

    pub fn volume(&self) -> f32 {
        *self.shared.volume.lock()
    }

    /// Receives every event emitted from now on. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = unbounded();
        self.shared.subscribers.lock().push(tx);
        rx
    }

    /// Idle, Stopped, Complete and Playing start from the beginning on a new
    /// worker; Paused resumes. A running session is only replaced once the
    /// backend accepts the file, so a rejected restart keeps the old state.
    pub fn play(&self) -> Result<()> {
        let mut session = self.session.lock();

        if self.state() == PlaybackState::Paused
            && let Some(active) = &*session
            && !active.handle.is_finished()
        {
            return self.request(active, Command::Resume);
        }

        if session.is_some() {
            self.factory.check(&self.track.path)?;
            self.halt(&mut session);
        }

        *session = Some(self.spawn_session()?);
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        let session = self.session.lock();
        match &*session {
            Some(active) if self.state() == PlaybackState::Playing => {
                self.request(active, Command::Pause)
            }
            _ => Ok(()),
        }
    }

    pub fn resume(&self) -> Result<()> {
        let session = self.session.lock();
        match &*session {
            Some(active) if self.state() == PlaybackState::Paused => {
                self.request(active, Command::Resume)
            }
            _ => Ok(()),
        }
    }

    pub fn toggle(&self) -> Result<()> {
        let session = self.session.lock();
        let Some(active) = &*session else {
            return Ok(());
        };
        match self.state() {
            PlaybackState::Playing => self.request(active, Command::Pause),
            PlaybackState::Paused => self.request(active, Command::Resume),
            _ => Ok(()),
        }
    }

    pub fn stop(&self) -> Result<()> {
        let mut session = self.session.lock();
        self.halt(&mut session);
        Ok(())
    }

    pub fn set_volume(&self, volume: f32) -> Result<()> {
        let volume = volume.clamp(0.0, MAX_VOLUME);
        *self.shared.volume.lock() = volume;

        let session = self.session.lock();
        match &*session {
            Some(active) if self.state().is_active() => {
                self.request(active, Command::SetVolume(volume))
            }
            _ => Ok(()),
        }
    }

    fn halt(&self, session: &mut Option<Session>) {
        let was_active = self.state().is_active();
        if let Some(previous) = session.take() {
            self.retire(previous);
        }

        self.shared.set_state(PlaybackState::Stopped);
        *self.shared.progress.write() = Progress::default();
        if was_active {
            self.shared.emit(PlaybackEvent::Stopped);
        }
    }

    fn request(&self, session: &Session, command: Command) -> Result<()> {
        let (reply, acknowledged) = bounded(1);
        let delivered = session.commands.send(Request { command, reply }).is_ok()
            && acknowledged.recv().is_ok();
        if delivered {
            return Ok(());
        }

        // The worker left on its own after reaching the end of the track.
        if self.state() == PlaybackState::Complete {
            debug!(session = session.id, ?command, "command after completion ignored");
            return Ok(());
        }
        warn!(session = session.id, ?command, "playback worker is gone");
        Err(PlayerError::WorkerGone)
    }

    fn retire(&self, session: Session) {
        session.cancel.store(true, Ordering::SeqCst);
        let (reply, _acknowledged) = bounded(1);
        let _ = session.commands.send(Request {
            command: Command::Stop,
            reply,
        });
        if session.handle.join().is_err() {
            warn!(session = session.id, "playback worker panicked");
        }
        debug!(session = session.id, "playback worker retired");
    }

    fn spawn_session(&self) -> Result<Session> {
        let id = self.sessions_started.fetch_add(1, Ordering::SeqCst) + 1;

        let (commands, inbox) = unbounded::<Request>();
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);
        let cancel = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            id,
            path: self.track.path.clone(),
            factory: Arc::clone(&self.factory),
            shared: Arc::clone(&self.shared),
            cancel: Arc::clone(&cancel),
            inbox,
        };

        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || worker.run(ready_tx))
            .map_err(PlayerError::WorkerSpawn)?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Session {
                id,
                commands,
                cancel,
                handle,
            }),
            Ok(Err(err)) => {
                let _ = handle.join();
                Err(err)
            }
            Err(_) => {
                let _ = handle.join();
                Err(PlayerError::WorkerGone)
            }
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let Some(session) = self.session.get_mut().take() {
            self.retire(session);
        }
    }
}

struct Worker {
    id: u64,
    path: PathBuf,
    factory: Arc<dyn BackendFactory>,
    shared: Arc<Shared>,
    cancel: Arc<AtomicBool>,
    inbox: Receiver<Request>,
}

impl Worker {
    fn run(self, ready: Sender<Result<()>>) {
        let mut backend = match self.factory.open(&self.path) {
            Ok(backend) => backend,
            Err(err) => {
                warn!(session = self.id, path = %self.path.display(), "failed to start playback: {err}");
                let _ = ready.send(Err(err));
                return;
            }
        };

        backend.set_volume(*self.shared.volume.lock());
        self.shared.set_state(PlaybackState::Playing);
        self.publish_progress(backend.as_ref());
        info!(session = self.id, path = %self.path.display(), backend = self.factory.name(), "playback started");
        self.shared.emit(PlaybackEvent::Started);
        let _ = ready.send(Ok(()));

        loop {
            if self.cancel.load(Ordering::SeqCst) {
                backend.stop();
                break;
            }

            match self.inbox.recv_timeout(WORKER_TICK) {
                Ok(request) => {
                    let keep_running = self.apply(backend.as_mut(), request.command);
                    let _ = request.reply.send(());
                    if !keep_running {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    backend.stop();
                    break;
                }
            }

            self.publish_progress(backend.as_ref());

            if !self.cancel.load(Ordering::SeqCst) && backend.is_finished() {
                self.shared.set_state(PlaybackState::Complete);
                info!(session = self.id, "playback finished");
                self.shared.emit(PlaybackEvent::Finished);
                break;
            }
        }

        debug!(session = self.id, "playback worker exiting");
    }

    fn apply(&self, backend: &mut dyn PlaybackBackend, command: Command) -> bool {
        match command {
            Command::Pause => {
                backend.pause();
                self.shared.set_state(PlaybackState::Paused);
                self.shared.emit(PlaybackEvent::Paused);
            }
            Command::Resume => {
                backend.resume();
                self.shared.set_state(PlaybackState::Playing);
                self.shared.emit(PlaybackEvent::Resumed);
            }
            Command::SetVolume(volume) => backend.set_volume(volume),
            Command::Stop => {
                backend.stop();
                return false;
            }
        }
        true
    }

    fn publish_progress(&self, backend: &dyn PlaybackBackend) {
        *self.shared.progress.write() = Progress {
            position: backend.position(),
            duration: backend.duration(),
        };
    }
}
