//! Text rendering of the dashboard.

use chrono::{DateTime, TimeZone, Utc};
use owo_colors::{OwoColorize, Style};
use std::fmt::{Display, Write};

use weather_core::{
    Dashboard, Notice, NoticeLevel, Theme, WeatherSnapshot,
    display::{
        ConditionCategory, format_celsius, format_clock_time, format_long_date, format_percent,
        format_pressure, format_visibility, format_wall_clock, format_wind,
    },
};

/// Colours for one theme. Plain text when colour is off.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    colored: bool,
    title: Style,
    accent: Style,
    label: Style,
    value: Style,
    muted: Style,
}

impl Palette {
    pub fn new(theme: Theme, colored: bool) -> Self {
        match theme {
            Theme::Dark => Self {
                colored,
                title: Style::new().bright_white().bold(),
                accent: Style::new().bright_cyan().bold(),
                label: Style::new().bright_black(),
                value: Style::new().white(),
                muted: Style::new().bright_black().italic(),
            },
            Theme::Light => Self {
                colored,
                title: Style::new().black().bold(),
                accent: Style::new().blue().bold(),
                label: Style::new().bright_black(),
                value: Style::new().black(),
                muted: Style::new().bright_black().italic(),
            },
        }
    }

    fn paint(&self, text: impl Display, style: Style) -> String {
        if self.colored { text.style(style).to_string() } else { text.to_string() }
    }

    fn notice(&self, notice: &Notice) -> String {
        let (badge, style) = match notice.level {
            NoticeLevel::Success => ("✔", Style::new().green()),
            NoticeLevel::Warning => ("!", Style::new().yellow()),
            NoticeLevel::Error => ("✖", Style::new().red()),
        };
        self.paint(format!("{badge} {}", notice.message), style)
    }
}

/// Full screen: header, search line, weather card (when there is one), notices, help.
pub fn render_dashboard<'a, Tz>(
    dashboard: &Dashboard,
    notices: impl Iterator<Item = &'a Notice>,
    tz: &Tz,
    colored: bool,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let palette = Palette::new(dashboard.theme(), colored);
    let now = dashboard.now().with_timezone(tz);
    let mut out = String::new();

    let mode = match dashboard.theme() {
        Theme::Dark => "☾ dark",
        Theme::Light => "☀ light",
    };
    let _ = writeln!(
        out,
        "{}  {}",
        palette.paint("Weather Dashboard", palette.title),
        palette.paint(mode, palette.muted)
    );
    let _ = writeln!(
        out,
        "{}  {}",
        palette.paint(format_long_date(&now), palette.label),
        palette.paint(format_wall_clock(&now), palette.value)
    );
    let _ = writeln!(out);

    let status = if dashboard.can_submit() { "⌕" } else { "… searching" };
    let input = if dashboard.input().is_empty() {
        palette.paint("Search for a city...", palette.muted)
    } else {
        format!("{}▏", dashboard.input())
    };
    let _ = writeln!(out, "{} {}", palette.paint(status, palette.accent), input);
    let _ = writeln!(out);

    if let Some(snapshot) = dashboard.snapshot() {
        out.push_str(&render_card(snapshot, tz, &palette));
        let _ = writeln!(out);
    }

    for notice in notices {
        let _ = writeln!(out, "{}", palette.notice(notice));
    }

    let _ = writeln!(
        out,
        "{}",
        palette.paint(
            "Type a city and press Enter · Tab toggles dark/light · Esc exits",
            palette.muted
        )
    );

    out
}

/// The weather card for one snapshot.
pub fn render_card<Tz>(snapshot: &WeatherSnapshot, tz: &Tz, palette: &Palette) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    let category = ConditionCategory::from_code(snapshot.sky.condition_code);

    let place = if snapshot.location.country_code.is_empty() {
        snapshot.location.name.clone()
    } else {
        format!("{}, {}", snapshot.location.name, snapshot.location.country_code)
    };
    let _ = writeln!(out, "📍 {}", palette.paint(place, palette.title));
    let _ = writeln!(
        out,
        "   {}   {} {}",
        palette.paint(format_celsius(snapshot.instant.temperature_c), palette.accent),
        category.icon(),
        palette.paint(&snapshot.sky.description, palette.value)
    );
    let _ = writeln!(
        out,
        "   {}",
        palette.paint(
            format!("Feels like: {}", format_celsius(snapshot.instant.feels_like_c)),
            palette.label
        )
    );
    let _ = writeln!(out);

    let rows = [
        ("Max Temp", format_celsius(snapshot.instant.temp_max_c)),
        ("Min Temp", format_celsius(snapshot.instant.temp_min_c)),
        ("Humidity", format_percent(snapshot.atmosphere.humidity_pct)),
        ("Wind Speed", format_wind(snapshot.wind.speed_mps)),
        ("Pressure", format_pressure(snapshot.atmosphere.pressure_hpa)),
        ("Visibility", format_visibility(snapshot.atmosphere.visibility_meters)),
        ("Cloudiness", format_percent(snapshot.atmosphere.cloudiness_pct)),
        ("Sunrise", format_clock_time(snapshot.sun.sunrise_epoch, tz)),
        ("Sunset", format_clock_time(snapshot.sun.sunset_epoch, tz)),
    ];

    for pair in rows.chunks(2) {
        let mut line = String::new();
        for (label, value) in pair {
            let _ = write!(
                line,
                "   {} {}",
                palette.paint(format!("{label:<11}"), palette.label),
                palette.paint(format!("{value:<10}"), palette.value)
            );
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }

    out
}

/// Card with a date line, for one-shot output.
pub fn render_report<Tz>(
    snapshot: &WeatherSnapshot,
    now: DateTime<Utc>,
    tz: &Tz,
    colored: bool,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let palette = Palette::new(Theme::Dark, colored);
    let local = now.with_timezone(tz);
    format!(
        "{}  {}\n{}",
        palette.paint(format_long_date(&local), palette.label),
        palette.paint(format_wall_clock(&local), palette.value),
        render_card(snapshot, tz, &palette)
    )
}
