//! Single shared poll scheduler. One fast loop fetches every dashboard
//! resource once per second and publishes each through its own watch
//! channel; one slow loop refreshes the optimal charging window. Panels
//! subscribe via [`DashboardFeed`] instead of owning timers, so stopping
//! the scheduler (cancellation, or every subscriber gone) stops all
//! network traffic at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Notify};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::{DashboardClient, Sampled};
use crate::config::PollConfig;
use crate::domain::{
    BaseloadProfile, EvBatteryStatus, HomeBatteryStatus, OptimalChargingWindow, PriceInfo,
    SolarStatus, TimeOfDay,
};

/// Fire-and-forget backend mutations available from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartCharging,
    StopCharging,
    DischargeEvBattery,
    DischargeHomeBattery,
}

const COMMAND_QUEUE_DEPTH: usize = 8;

/// Subscriber handle: one watch receiver per resource plus the command
/// queue. Cloneable; dropping every clone stops the scheduler.
#[derive(Clone)]
pub struct DashboardFeed {
    pub time: watch::Receiver<Sampled<TimeOfDay>>,
    pub baseload: watch::Receiver<Sampled<BaseloadProfile>>,
    pub ev_battery: watch::Receiver<Sampled<EvBatteryStatus>>,
    pub home_battery: watch::Receiver<Sampled<HomeBatteryStatus>>,
    pub price: watch::Receiver<Sampled<PriceInfo>>,
    pub solar: watch::Receiver<Sampled<SolarStatus>>,
    pub window: watch::Receiver<Sampled<OptimalChargingWindow>>,
    /// Optimistic charging state: flipped on command success, corrected by
    /// the next battery poll.
    pub charging: watch::Receiver<bool>,
    commands: mpsc::Sender<Command>,
}

impl DashboardFeed {
    /// Queue a command. The queue is small and the scheduler drains it
    /// quickly; a full queue just drops the keypress.
    pub fn dispatch(&self, command: Command) {
        if self.commands.try_send(command).is_err() {
            debug!(?command, "command queue full, dropping");
        }
    }
}

struct Publisher {
    client: DashboardClient,
    time_tx: watch::Sender<Sampled<TimeOfDay>>,
    baseload_tx: watch::Sender<Sampled<BaseloadProfile>>,
    ev_battery_tx: watch::Sender<Sampled<EvBatteryStatus>>,
    home_battery_tx: watch::Sender<Sampled<HomeBatteryStatus>>,
    price_tx: watch::Sender<Sampled<PriceInfo>>,
    solar_tx: watch::Sender<Sampled<SolarStatus>>,
    window_tx: watch::Sender<Sampled<OptimalChargingWindow>>,
    charging_tx: watch::Sender<bool>,
    refresh: Arc<Notify>,
    refresh_delay: Duration,
}

impl Publisher {
    /// Fetch all fast-loop resources concurrently and publish each one
    /// independently; resources never block on one another.
    async fn poll_fast(&self) {
        let (time, baseload, ev_battery, home_battery, price, solar) = tokio::join!(
            self.client.time(),
            self.client.baseload(),
            self.client.ev_battery(),
            self.client.home_battery(),
            self.client.price(),
            self.client.solar(),
        );
        if ev_battery.fresh {
            self.charging_tx.send_replace(ev_battery.value.is_charging);
        }
        self.time_tx.send_replace(time);
        self.baseload_tx.send_replace(baseload);
        self.ev_battery_tx.send_replace(ev_battery);
        self.home_battery_tx.send_replace(home_battery);
        self.price_tx.send_replace(price);
        self.solar_tx.send_replace(solar);
    }

    async fn poll_window(&self) {
        let window = self.client.charging_window().await;
        self.window_tx.send_replace(window);
    }

    async fn dispatch(&self, command: Command) {
        match command {
            Command::StartCharging => {
                if self.client.start_charging().await {
                    info!("charging started");
                    self.charging_tx.send_replace(true);
                    self.schedule_refresh();
                }
            }
            Command::StopCharging => {
                if self.client.stop_charging().await {
                    info!("charging stopped");
                    self.charging_tx.send_replace(false);
                    self.schedule_refresh();
                }
            }
            Command::DischargeEvBattery => {
                if self.client.discharge_ev_battery().await {
                    info!("EV battery discharge requested");
                    self.schedule_refresh();
                }
            }
            Command::DischargeHomeBattery => {
                if self.client.discharge_home_battery().await {
                    info!("home battery discharge requested");
                    self.schedule_refresh();
                }
            }
        }
    }

    /// Re-poll shortly after a successful command so the authoritative
    /// backend state replaces the optimistic one.
    fn schedule_refresh(&self) {
        let notify = self.refresh.clone();
        let delay = self.refresh_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            notify.notify_one();
        });
    }
}

pub struct PollScheduler {
    publisher: Publisher,
    commands: mpsc::Receiver<Command>,
    shutdown: CancellationToken,
    cfg: PollConfig,
}

impl PollScheduler {
    pub fn new(
        client: DashboardClient,
        cfg: PollConfig,
        shutdown: CancellationToken,
    ) -> (Self, DashboardFeed) {
        let (time_tx, time) = watch::channel(Sampled::fallback(TimeOfDay::fallback()));
        let (baseload_tx, baseload) = watch::channel(Sampled::fallback(BaseloadProfile::fallback()));
        let (ev_battery_tx, ev_battery) =
            watch::channel(Sampled::fallback(EvBatteryStatus::fallback()));
        let (home_battery_tx, home_battery) =
            watch::channel(Sampled::fallback(HomeBatteryStatus::fallback()));
        let (price_tx, price) = watch::channel(Sampled::fallback(PriceInfo::fallback()));
        let (solar_tx, solar) = watch::channel(Sampled::fallback(SolarStatus::fallback()));
        let (window_tx, window) =
            watch::channel(Sampled::fallback(OptimalChargingWindow::fallback()));
        let (charging_tx, charging) = watch::channel(false);
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);

        let feed = DashboardFeed {
            time,
            baseload,
            ev_battery,
            home_battery,
            price,
            solar,
            window,
            charging,
            commands: commands_tx,
        };
        let publisher = Publisher {
            client,
            time_tx,
            baseload_tx,
            ev_battery_tx,
            home_battery_tx,
            price_tx,
            solar_tx,
            window_tx,
            charging_tx,
            refresh: Arc::new(Notify::new()),
            refresh_delay: Duration::from_millis(cfg.command_refresh_delay_ms),
        };
        let scheduler = Self {
            publisher,
            commands: commands_rx,
            shutdown,
            cfg,
        };
        (scheduler, feed)
    }

    pub async fn run(self) {
        let Self {
            publisher,
            mut commands,
            shutdown,
            cfg,
        } = self;
        let mut fast = interval(Duration::from_millis(cfg.interval_ms));
        let mut slow = interval(Duration::from_millis(cfg.window_interval_ms));

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = fast.tick() => publisher.poll_fast().await,
                _ = slow.tick() => publisher.poll_window().await,
                _ = publisher.refresh.notified() => publisher.poll_fast().await,
                command = commands.recv() => match command {
                    Some(command) => publisher.dispatch(command).await,
                    // Every feed clone has been dropped.
                    None => break,
                },
            }
        }
        debug!("poll scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiError, BackendApi, DashboardClient};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory backend: counts fetches, optionally fails everything.
    #[derive(Default)]
    struct StubBackend {
        fetches: AtomicUsize,
        commands: AtomicUsize,
        fail_commands: AtomicBool,
        charging: AtomicBool,
    }

    impl StubBackend {
        fn count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
        fn tick(&self) {
            self.fetches.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl BackendApi for StubBackend {
        async fn time(&self) -> Result<TimeOfDay, ApiError> {
            self.tick();
            Ok(TimeOfDay::new(14, 30))
        }
        async fn baseload(&self) -> Result<BaseloadProfile, ApiError> {
            self.tick();
            Ok(BaseloadProfile::new(vec![3.0; 24]))
        }
        async fn ev_battery(&self) -> Result<EvBatteryStatus, ApiError> {
            self.tick();
            Ok(EvBatteryStatus {
                percentage: 44.9,
                current_energy_kwh: 20.8,
                max_capacity_kwh: 46.3,
                is_charging: self.charging.load(Ordering::SeqCst),
            })
        }
        async fn home_battery(&self) -> Result<HomeBatteryStatus, ApiError> {
            self.tick();
            Ok(HomeBatteryStatus::fallback())
        }
        async fn price(&self) -> Result<PriceInfo, ApiError> {
            self.tick();
            Ok(PriceInfo::fallback())
        }
        async fn solar(&self) -> Result<SolarStatus, ApiError> {
            self.tick();
            Ok(SolarStatus::fallback())
        }
        async fn charging_window(&self) -> Result<OptimalChargingWindow, ApiError> {
            self.tick();
            Ok(OptimalChargingWindow::fallback())
        }
        async fn set_charging(&self, on: bool) -> Result<(), ApiError> {
            self.commands.fetch_add(1, Ordering::SeqCst);
            if self.fail_commands.load(Ordering::SeqCst) {
                return Err(ApiError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
            }
            self.charging.store(on, Ordering::SeqCst);
            Ok(())
        }
        async fn discharge_ev_battery(&self) -> Result<(), ApiError> {
            self.commands.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn discharge_home_battery(&self) -> Result<(), ApiError> {
            self.commands.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn start_scheduler(
        backend: Arc<StubBackend>,
    ) -> (DashboardFeed, CancellationToken, tokio::task::JoinHandle<()>) {
        let client = DashboardClient::new(backend);
        let token = CancellationToken::new();
        let (scheduler, feed) = PollScheduler::new(client, PollConfig::default(), token.clone());
        let handle = tokio::spawn(scheduler.run());
        (feed, token, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn publishes_fresh_samples_on_tick() {
        let backend = Arc::new(StubBackend::default());
        let (mut feed, token, handle) = start_scheduler(backend.clone());

        feed.time.changed().await.unwrap();
        let time = feed.time.borrow().clone();
        assert!(time.fresh);
        assert_eq!(time.value, TimeOfDay::new(14, 30));

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn polling_stops_after_cancellation() {
        let backend = Arc::new(StubBackend::default());
        let (_feed, token, handle) = start_scheduler(backend.clone());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(backend.count() > 0);

        token.cancel();
        handle.await.unwrap();

        let frozen = backend.count();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.count(), frozen, "fetches continued after stop");
    }

    #[tokio::test(start_paused = true)]
    async fn polling_stops_when_all_subscribers_drop() {
        let backend = Arc::new(StubBackend::default());
        let (feed, _token, handle) = start_scheduler(backend.clone());

        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(feed);
        handle.await.unwrap();

        let frozen = backend.count();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.count(), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn successful_start_charging_flips_state_optimistically() {
        let backend = Arc::new(StubBackend::default());
        let (feed, token, handle) = start_scheduler(backend.clone());

        assert!(!*feed.charging.borrow());
        feed.dispatch(Command::StartCharging);

        let mut charging = feed.charging.clone();
        charging.wait_for(|on| *on).await.unwrap();
        assert_eq!(backend.commands.load(Ordering::SeqCst), 1);

        token.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_command_leaves_state_unchanged() {
        let backend = Arc::new(StubBackend::default());
        backend.fail_commands.store(true, Ordering::SeqCst);
        let (feed, token, handle) = start_scheduler(backend.clone());

        feed.dispatch(Command::StartCharging);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!*feed.charging.borrow());
        assert_eq!(backend.commands.load(Ordering::SeqCst), 1);

        token.cancel();
        handle.await.unwrap();
    }
}
