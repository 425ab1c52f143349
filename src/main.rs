use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use laddstation_dashboard::client::{BackendApi, ConsolidatedApi, DashboardClient, LegacyApi};
use laddstation_dashboard::config::{BackendFlavor, Config};
use laddstation_dashboard::poll::PollScheduler;
use laddstation_dashboard::telemetry;
use laddstation_dashboard::ui::App;

/// The terminal owns the main thread; polling runs on a multi-threaded
/// runtime behind it. Cancelling the shutdown token (quit key, or a
/// render error unwinding) stops the scheduler and all network traffic.
fn main() -> Result<()> {
    telemetry::init_tracing();

    let config = Config::load().context("loading configuration")?;
    info!(?config, "starting dashboard");

    let api: Arc<dyn BackendApi> = match config.backend.flavor {
        BackendFlavor::Consolidated => Arc::new(ConsolidatedApi::new(
            &config.backend.base_url,
            config.backend.http_timeout(),
        )?),
        BackendFlavor::Legacy => Arc::new(LegacyApi::new(
            &config.backend.base_url,
            config.backend.http_timeout(),
        )?),
    };
    let client = DashboardClient::new(api);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let _guard = runtime.enter();

    let shutdown = CancellationToken::new();
    let (scheduler, feed) = PollScheduler::new(client, config.poll, shutdown.clone());
    let scheduler_handle = runtime.spawn(scheduler.run());

    let terminal = ratatui::init();
    let result = App::new(feed, shutdown.clone()).run(terminal);
    ratatui::restore();

    shutdown.cancel();
    runtime.block_on(scheduler_handle).ok();
    info!("dashboard stopped");
    result
}
