mod api;
mod app;
mod application;
mod config;
mod domain;
mod telemetry;
mod ui;
mod utils;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::telemetry::Telemetry;

fn main() -> iced::Result {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env();

    // Telemetry gets its own small runtime so delivery never waits on the UI.
    let (mut telemetry, worker) = Telemetry::new(&config.telemetry);
    let _telemetry_runtime = worker.and_then(|worker| {
        match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("telemetry")
            .enable_all()
            .build()
        {
            Ok(runtime) => {
                runtime.spawn(worker.run());
                Some(runtime)
            }
            Err(e) => {
                warn!(error = %e, "telemetry disabled, could not start runtime");
                telemetry = Telemetry::disabled();
                None
            }
        }
    });

    info!(
        backend = %config.api.backend_url,
        download_dir = %config.download_dir.display(),
        telemetry = telemetry.configured(),
        "starting VideoPull"
    );

    iced::application(
        move || app::DownloadApp::new(config.clone(), telemetry.clone()),
        app::update,
        app::view,
    )
    .title("VideoPull")
    .window_size(iced::Size::new(560.0, 480.0))
    .run()
}
