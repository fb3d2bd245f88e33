use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use signature_backend::config::{Config, StorageBackend};
use signature_backend::lifecycle::{InMemoryRepository, SignatureRepository, SqliteRepository};
use signature_backend::notifications::{start_notification_updater, NotificationsState};
use signature_backend::render::FontLibrary;
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = Config::from_env();

    let fonts = FontLibrary::load_dir(&config.fonts_dir).map_err(|e| {
        error!("Cannot load fonts from {}: {}", config.fonts_dir.display(), e);
        e
    })?;
    info!("Loaded font families: {}", fonts.families().join(", "));

    let repository: Arc<dyn SignatureRepository> = match config.storage {
        StorageBackend::Sqlite => Arc::new(
            SqliteRepository::open(&config.db_path)
                .map_err(|e| io::Error::other(e.to_string()))?,
        ),
        StorageBackend::Memory => {
            info!("Using in-memory storage, latency {:?}", config.latency);
            Arc::new(InMemoryRepository::with_latency(config.latency))
        }
    };

    // Notification feeds and their updater task
    let (notifications, rx) = NotificationsState::new();
    let updater_state = notifications.clone();
    tokio::spawn(async move {
        start_notification_updater(updater_state, rx).await;
    });

    let state = web::Data::new(signature_backend::build_state(
        &config,
        repository,
        Arc::new(fonts),
        notifications.notifier(),
    ));
    let notifications = web::Data::new(notifications);
    let json_limit = config.max_upload_bytes;

    let (host, port) = config.bind_address();
    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(state.clone())
            .app_data(notifications.clone())
            .configure(signature_backend::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
