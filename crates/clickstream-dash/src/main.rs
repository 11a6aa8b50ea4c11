mod bootstrap;

use anyhow::{Context, Result};
use dash_core::settings::Settings;
use dash_core::time_utils::TimezoneHandler;
use dash_data::analysis::{load_dataset, LoadedDataset, SnapshotConfig};
use dash_runtime::session::DashboardSession;
use dash_ui::app::App;
use dash_ui::report::render_report;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Clickstream Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Timezone: {}",
        settings.view,
        settings.theme,
        settings.timezone
    );

    let path = bootstrap::locate_dataset(&settings)?;
    let tz = TimezoneHandler::try_new(&settings.timezone)?;

    // Loading a large export can take a while; allow Ctrl+C to abort it.
    let load_path = path.clone();
    let loaded: LoadedDataset = tokio::select! {
        joined = tokio::task::spawn_blocking(move || load_dataset(&load_path, &tz)) => {
            joined.context("dataset loading task panicked")??
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received while loading {}; exiting", path.display());
            return Ok(());
        }
    };

    let config = SnapshotConfig {
        top_n: settings.top_n as usize,
        preview_rows: settings.preview_rows as usize,
    };
    let initial = settings.initial_selection();
    // One-shot views reject a year, month or day the data lacks.
    let session = if settings.view == "dashboard" {
        DashboardSession::new(loaded.table, &initial, config)
    } else {
        DashboardSession::try_new(loaded.table, &initial, config)?
    };
    let metadata = loaded.metadata;

    match settings.view.as_str() {
        "dashboard" => {
            let app = App::new(
                &settings.theme,
                session,
                metadata.source.clone(),
                metadata.timezone.clone(),
            );
            app.run().await?;
        }

        "report" => {
            print!("{}", render_report(session.snapshot(), &metadata));
        }

        "json" => {
            let document = serde_json::json!({
                "metadata": metadata,
                "snapshot": session.snapshot(),
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }

        unknown => {
            anyhow::bail!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
