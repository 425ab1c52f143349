use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tokio_util::sync::CancellationToken;

use super::panels;
use super::scene::SceneTarget;
use crate::client::Sampled;
use crate::domain::{
    BaseloadProfile, EvBatteryStatus, HomeBatteryStatus, OptimalChargingWindow, PriceInfo,
    SolarStatus, TimeOfDay,
};
use crate::poll::{Command, DashboardFeed};

/// How often the screen redraws between input events. The feed updates
/// once per second; redrawing faster only picks changes up sooner.
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Everything a single frame renders from: the latest sample of each
/// resource plus local UI state.
pub struct ViewState {
    pub time: Sampled<TimeOfDay>,
    pub baseload: Sampled<BaseloadProfile>,
    pub ev_battery: Sampled<EvBatteryStatus>,
    pub home_battery: Sampled<HomeBatteryStatus>,
    pub price: Sampled<PriceInfo>,
    pub solar: Sampled<SolarStatus>,
    pub window: Sampled<OptimalChargingWindow>,
    pub charging: bool,
    pub selected: Option<SceneTarget>,
}

pub struct App {
    feed: DashboardFeed,
    shutdown: CancellationToken,
    selected: Option<SceneTarget>,
    should_quit: bool,
}

impl App {
    pub fn new(feed: DashboardFeed, shutdown: CancellationToken) -> Self {
        Self {
            feed,
            shutdown,
            selected: None,
            should_quit: false,
        }
    }

    /// Blocking render/input loop. Runs on the main thread while the poll
    /// scheduler keeps the feed current from the runtime.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            let state = self.snapshot();
            terminal.draw(|frame| panels::render(frame, &state))?;

            if event::poll(FRAME_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.on_key(key.code, key.modifiers);
                    }
                }
            }
        }
        self.shutdown.cancel();
        Ok(())
    }

    fn snapshot(&self) -> ViewState {
        ViewState {
            time: self.feed.time.borrow().clone(),
            baseload: self.feed.baseload.borrow().clone(),
            ev_battery: self.feed.ev_battery.borrow().clone(),
            home_battery: self.feed.home_battery.borrow().clone(),
            price: self.feed.price.borrow().clone(),
            solar: self.feed.solar.borrow().clone(),
            window: self.feed.window.borrow().clone(),
            charging: *self.feed.charging.borrow(),
            selected: self.selected,
        }
    }

    fn on_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if self.selected.take().is_none() {
                    self.should_quit = true;
                }
            }
            KeyCode::Tab => {
                self.selected = Some(match self.selected {
                    Some(target) => target.next(),
                    None => SceneTarget::House,
                });
            }
            KeyCode::Char('1') => self.selected = Some(SceneTarget::House),
            KeyCode::Char('2') => self.selected = Some(SceneTarget::Car),
            KeyCode::Char('3') => self.selected = Some(SceneTarget::ChargingStation),
            KeyCode::Char('c') => {
                let command = if *self.feed.charging.borrow() {
                    Command::StopCharging
                } else {
                    Command::StartCharging
                };
                self.feed.dispatch(command);
            }
            KeyCode::Char('d') => self.feed.dispatch(Command::DischargeEvBattery),
            KeyCode::Char('h') => self.feed.dispatch(Command::DischargeHomeBattery),
            _ => {}
        }
    }
}
