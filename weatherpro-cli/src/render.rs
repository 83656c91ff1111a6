use chrono::{DateTime, Local};
use weatherpro_core::WeatherSnapshot;

/// Whole-degree rendering, e.g. `17.9` → `18`.
fn round(value: f64) -> String {
    let rounded = format!("{value:.0}");
    // "-0" reads oddly next to a degree sign.
    if rounded == "-0" { "0".to_string() } else { rounded }
}

/// Multi-line weather card for the terminal.
pub fn card(snapshot: &WeatherSnapshot) -> String {
    let updated: DateTime<Local> = snapshot.fetched_at.with_timezone(&Local);

    let lines = [
        format!(
            "{}  {} {} ({})",
            snapshot.location_name,
            snapshot.condition_kind().symbol(),
            snapshot.condition,
            snapshot.description,
        ),
        format!(
            "  {}°C  feels like {}°C",
            round(snapshot.temperature),
            round(snapshot.feels_like),
        ),
        format!(
            "  Min {}°  Max {}°",
            round(snapshot.temp_min),
            round(snapshot.temp_max),
        ),
        format!(
            "  Wind {} m/s {}  Humidity {}%  Pressure {} hPa",
            round(snapshot.wind_speed),
            snapshot.wind_compass(),
            round(snapshot.humidity),
            round(snapshot.pressure),
        ),
        format!("  Updated {}", updated.format("%H:%M")),
    ];

    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}
