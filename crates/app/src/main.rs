use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tracing::info;
use tracing_subscriber::EnvFilter;

use progress_core::Clock;
use progress_core::model::{
    ImpactStyle, LessonKey, NotificationRequest, NotifyKind,
};
use services::{
    AppServices, AudioPlatform, HapticPlatform, NotificationPlatform, PermissionStatus,
    Platforms, PlatformError, SoundHandle,
};
use storage::repository::Storage;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

struct Args {
    db_url: String,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:progress.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PROGRESS_DB_URL");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("PROGRESS_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://progress.sqlite3".into(), normalize_sqlite_url);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = args
                        .next()
                        .ok_or(ArgsError::MissingValue { flag: "--db" })?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Notification "platform" that keeps schedules in memory and logs the
/// calls. Stands in for a real notification center on desktop.
#[derive(Default)]
struct ConsoleNotifications {
    scheduled: Mutex<Vec<NotificationRequest>>,
}

#[async_trait]
impl NotificationPlatform for ConsoleNotifications {
    async fn request_permissions(&self) -> Result<PermissionStatus, PlatformError> {
        Ok(PermissionStatus::Granted)
    }

    async fn configure_channel(&self, name: &str) -> Result<(), PlatformError> {
        info!(channel = name, "notification channel ready");
        Ok(())
    }

    async fn schedule(&self, request: NotificationRequest) -> Result<(), PlatformError> {
        info!(
            identifier = %request.identifier,
            title = %request.content.title,
            "scheduled notification"
        );
        let mut scheduled = self
            .scheduled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        scheduled.push(request);
        Ok(())
    }

    async fn cancel(&self, identifier: &str) -> Result<(), PlatformError> {
        let mut scheduled = self
            .scheduled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        scheduled.retain(|request| request.identifier != identifier);
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<NotificationRequest>, PlatformError> {
        let scheduled = self
            .scheduled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(scheduled.clone())
    }
}

/// No audio assets ship with the demo; every load fails so feedback runs
/// on the haptic fallback path.
struct NoAudio;

#[async_trait]
impl AudioPlatform for NoAudio {
    async fn load(&self, asset: &str) -> Result<Arc<dyn SoundHandle>, PlatformError> {
        Err(PlatformError::Call(format!("no audio backend for {asset}")))
    }
}

/// Haptics that just log.
struct ConsoleHaptics;

impl HapticPlatform for ConsoleHaptics {
    fn impact(&self, style: ImpactStyle) -> Result<(), PlatformError> {
        info!(?style, "haptic impact");
        Ok(())
    }

    fn notify(&self, kind: NotifyKind) -> Result<(), PlatformError> {
        info!(?kind, "haptic notify");
        Ok(())
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    let platforms = Platforms {
        notifications: Arc::new(ConsoleNotifications::default()),
        audio: Arc::new(NoAudio),
        haptics: Arc::new(ConsoleHaptics),
    };
    let services = AppServices::new(&storage, Clock::default_clock(), platforms);
    services.init().await;

    let granted = services.notifications().request_permissions().await;
    info!(granted, "notification permission");
    services.notifications().schedule_daily_reminder().await;

    // A short demo session: two lessons and a streak bump.
    let progress = services.progress();
    let outcome = progress
        .record_lesson_result(&LessonKey::new("hiragana-vowels"), 100, 240_000)
        .await;
    info!(xp = outcome.xp_awarded, "lesson recorded");
    let outcome = progress
        .record_lesson_result(&LessonKey::new("hiragana-k-row"), 80, 180_000)
        .await;
    info!(xp = outcome.xp_awarded, "lesson recorded");
    progress.update_streak(progress.snapshot().streak() + 1).await;

    let level = progress.level();
    let stats = progress.stats();
    println!(
        "Level {} ({} / {} XP), {} lessons done, {} studied",
        level.level,
        level.current_xp,
        level.next_level_xp,
        stats.lessons_completed,
        stats.time_display()
    );
    for status in progress.achievements() {
        let mark = if status.earned { "x" } else { " " };
        println!("  [{mark}] {} - {}", status.achievement.title, status.achievement.description);
    }

    services.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
