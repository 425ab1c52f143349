//! Panel rendering: top status strip, interactive scene, bottom info
//! panels, and the single detail popup.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

use super::app::ViewState;
use super::scene::SceneTarget;
use crate::domain::analysis;
use crate::view::format;

pub fn render(frame: &mut Frame, state: &ViewState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(7),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_top_strip(frame, rows[0], state);
    render_scene(frame, rows[1], state);
    render_bottom_panels(frame, rows[2], state);
    render_footer(frame, rows[3]);

    if let Some(target) = state.selected {
        render_detail(frame, target, state);
    }
}

fn stale_suffix(fresh: bool) -> &'static str {
    if fresh {
        ""
    } else {
        " (offline)"
    }
}

fn render_top_strip(frame: &mut Frame, area: Rect, state: &ViewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let level = analysis::price_level(state.price.value.current_price, &state.price.value.hourly_prices);
    let price = Paragraph::new(vec![
        Line::from(format::price_per_kwh(state.price.value.current_price)),
        Line::styled(
            format::price_level_label(level),
            Style::default().fg(format::price_level_color(level)),
        ),
    ])
    .alignment(Alignment::Center)
    .block(titled_block(
        format!("💰 Price per kWh{}", stale_suffix(state.price.fresh)),
    ));
    frame.render_widget(price, columns[0]);

    let clock = Paragraph::new(Line::styled(
        format::clock(&state.time.value),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(titled_block(format!(
        "🕐 Simulated time{}",
        stale_suffix(state.time.fresh)
    )));
    frame.render_widget(clock, columns[1]);

    let window = Paragraph::new(vec![
        Line::from(state.window.value.time_range.clone()),
        Line::from(state.window.value.strategy.clone()),
    ])
    .alignment(Alignment::Center)
    .block(titled_block(format!(
        "⏰ Charging window{}",
        stale_suffix(state.window.fresh)
    )));
    frame.render_widget(window, columns[2]);
}

fn render_scene(frame: &mut Frame, area: Rect, state: &ViewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
        ])
        .split(area);

    for (target, column) in SceneTarget::ALL.into_iter().zip(columns.iter()) {
        let selected = state.selected == Some(target);
        let border_style = if selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        let mut lines = vec![Line::from("")];
        match target {
            SceneTarget::House => {
                lines.push(Line::from(format!(
                    "{} {}",
                    format::production_icon(state.solar.value.production_status),
                    format::production_label(state.solar.value.production_status)
                )));
            }
            SceneTarget::Car => {
                lines.push(Line::from(format::percent(state.ev_battery.value.percentage)));
                if state.charging {
                    lines.push(Line::styled("⚡ charging", Style::default().fg(Color::Green)));
                }
            }
            SceneTarget::ChargingStation => {
                let status = if state.charging { "● in use" } else { "○ available" };
                let color = if state.charging { Color::Green } else { Color::Gray };
                lines.push(Line::styled(status, Style::default().fg(color)));
            }
        }

        let panel = Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(target.title()),
        );
        frame.render_widget(panel, *column);
    }
}

fn render_bottom_panels(frame: &mut Frame, area: Rect, state: &ViewState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let profile = &state.baseload.value.hourly;
    let hour = f64::from(state.time.value.hour);
    let household = Paragraph::new(vec![
        Line::from(format!(
            "Current consumption: {}",
            format::consumption_kwh(analysis::current_consumption(profile, hour))
        )),
        Line::from(format!(
            "Daily total: {}",
            format::daily_total_kwh(analysis::total_daily_consumption(profile))
        )),
    ])
    .block(titled_block(format!(
        "🏠 Household{}",
        stale_suffix(state.baseload.fresh)
    )));
    frame.render_widget(household, columns[0]);

    let battery = &state.ev_battery.value;
    let tier = format::BatteryTier::from_percent(battery.percentage);
    let inner = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .margin(1)
        .split(columns[1]);

    frame.render_widget(
        Block::default().borders(Borders::ALL).title(format!(
            "🚗 EV battery{}",
            stale_suffix(state.ev_battery.fresh)
        )),
        columns[1],
    );
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(tier.color()))
        .ratio((battery.percentage / 100.0).clamp(0.0, 1.0))
        .label(format::percent(battery.percentage));
    frame.render_widget(gauge, inner[0]);
    frame.render_widget(
        Paragraph::new(format!(
            "Capacity: {}",
            format::capacity_pair(battery.current_energy_kwh, battery.max_capacity_kwh)
        )),
        inner[1],
    );
    let status = if state.charging {
        Line::styled("Charging", Style::default().fg(Color::Green))
    } else {
        Line::from("Ready to charge")
    };
    frame.render_widget(Paragraph::new(status), inner[2]);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let hints = Paragraph::new(Line::from(vec![
        Span::raw(" Tab/1-3 select  "),
        Span::raw("c charge on/off  "),
        Span::raw("d discharge EV  "),
        Span::raw("h discharge home  "),
        Span::raw("Esc close  q quit"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, area);
}

fn render_detail(frame: &mut Frame, target: SceneTarget, state: &ViewState) {
    let area = popup_area(frame.area(), 60, 60);
    frame.render_widget(Clear, area);

    let lines = match target {
        SceneTarget::House => house_detail(state),
        SceneTarget::Car => car_detail(state),
        SceneTarget::ChargingStation => station_detail(state),
    };
    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(target.title()),
    );
    frame.render_widget(panel, area);
}

fn house_detail(state: &ViewState) -> Vec<Line<'static>> {
    let profile = &state.baseload.value.hourly;
    let hour = f64::from(state.time.value.hour);
    let solar = &state.solar.value;

    let mut lines = vec![
        Line::from(format!(
            "Current consumption: {}",
            format::consumption_kwh(analysis::current_consumption(profile, hour))
        )),
        Line::from(format!(
            "Daily total: {}",
            format::daily_total_kwh(analysis::total_daily_consumption(profile))
        )),
        Line::from(""),
        Line::from(format!(
            "Solar: {} of {} ({})",
            format::consumption_kwh(solar.current_production_kwh),
            format::daily_total_kwh(solar.max_capacity_kwh),
            format::percent(solar.production_percent)
        )),
        Line::from(format!(
            "{} {}",
            format::production_icon(solar.production_status),
            format::production_label(solar.production_status)
        )),
        Line::from(format!(
            "Surplus: {}",
            format::consumption_kwh(solar.energy_surplus)
        )),
        Line::from(format!(
            "Est. daily production: {}",
            format::daily_total_kwh(solar.daily_production_estimate)
        )),
    ];
    for tip in &solar.optimization_tips {
        lines.push(Line::styled(
            format!("💡 {tip}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let home = &state.home_battery.value;
    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "Home battery: {} ({}), {}",
        format::percent(home.capacity_percent),
        format::capacity_pair(home.current_capacity_kwh, home.max_capacity_kwh),
        home.mode
    )));
    lines
}

fn car_detail(state: &ViewState) -> Vec<Line<'static>> {
    let battery = &state.ev_battery.value;
    let status = if state.charging {
        "Charging"
    } else {
        "Ready to charge"
    };
    vec![
        Line::from(format!(
            "Battery: {}",
            format::percent(battery.percentage)
        )),
        Line::from(format!(
            "Capacity: {}",
            format::capacity_pair(battery.current_energy_kwh, battery.max_capacity_kwh)
        )),
        Line::from(format!("Status: {status}")),
        Line::from(""),
        Line::from("d  discharge to 20% (V2H)"),
    ]
}

fn station_detail(state: &ViewState) -> Vec<Line<'static>> {
    let price = &state.price.value;
    let level = analysis::price_level(price.current_price, &price.hourly_prices);
    let window = &state.window.value;
    let status = if state.charging {
        "Charging in progress"
    } else {
        "Available"
    };
    vec![
        Line::from(format!(
            "Price: {} ({})",
            format::price_per_kwh(price.current_price),
            format::price_level_label(level)
        )),
        Line::from(format!(
            "Best window: {} ({})",
            window.time_range, window.strategy
        )),
        Line::from(format!("Status: {status}")),
        Line::from(""),
        Line::from("c  start/stop charging"),
    ]
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

fn titled_block(title: String) -> Block<'static> {
    Block::default().borders(Borders::ALL).title(title)
}
