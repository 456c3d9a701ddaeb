use crate::domain::model::{Notification, NotificationKind};
use crate::domain::ports::{ConfigProvider, Notifier};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Writes every notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        let event = &notification.event;
        match notification.kind {
            NotificationKind::PreReminder => tracing::info!(
                "⏰ {} is at {}",
                event.prayer(),
                event.time().format("%H:%M")
            ),
            NotificationKind::Arrival => tracing::info!("🕌 It is time for {}", event.prayer()),
        }
    }
}

/// Plays a sound file through an external player for each notification kind.
///
/// Playback runs on its own task and is never awaited by the caller. Only one
/// playback may own the output device at a time; requests arriving while one is
/// running are dropped.
#[derive(Debug, Clone)]
pub struct SoundNotifier {
    player: String,
    pre_reminder: Option<PathBuf>,
    arrival: Option<PathBuf>,
    device: Arc<Mutex<()>>,
}

impl SoundNotifier {
    pub fn new(
        player: impl Into<String>,
        pre_reminder: Option<PathBuf>,
        arrival: Option<PathBuf>,
    ) -> Self {
        Self {
            player: player.into(),
            pre_reminder,
            arrival,
            device: Arc::new(Mutex::new(())),
        }
    }

    /// `None` unless a player is configured.
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Option<Self> {
        let player = config.sound_player()?;
        Some(Self::new(
            player,
            config.pre_reminder_sound().map(PathBuf::from),
            config.arrival_sound().map(PathBuf::from),
        ))
    }

    fn sound_for(&self, kind: NotificationKind) -> Option<&PathBuf> {
        match kind {
            NotificationKind::PreReminder => self.pre_reminder.as_ref(),
            NotificationKind::Arrival => self.arrival.as_ref(),
        }
    }

    /// Spawns playback; returns `None` when there is nothing to play or the device is busy.
    pub fn play(&self, kind: NotificationKind) -> Option<tokio::task::JoinHandle<()>> {
        let sound = self.sound_for(kind)?.clone();

        let Ok(guard) = Arc::clone(&self.device).try_lock_owned() else {
            tracing::warn!("🔇 Sound device busy, dropping {:?}", kind);
            return None;
        };

        let player = self.player.clone();
        Some(tokio::spawn(async move {
            let _device = guard;
            match Command::new(&player).arg(&sound).status().await {
                Ok(status) if status.success() => {
                    tracing::debug!("Played {}", sound.display());
                }
                Ok(status) => {
                    tracing::warn!("Player '{}' exited with {} for {}", player, status, sound.display());
                }
                Err(e) => {
                    tracing::warn!("Could not run player '{}': {}", player, e);
                }
            }
        }))
    }
}

impl Notifier for SoundNotifier {
    fn notify(&self, notification: &Notification) {
        self.play(notification.kind);
    }
}

/// Fans a notification out to several sinks.
#[derive(Default)]
pub struct NotifierSet {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Notifier for NotifierSet {
    fn notify(&self, notification: &Notification) {
        for notifier in &self.notifiers {
            notifier.notify(notification);
        }
    }
}
