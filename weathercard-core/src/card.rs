//! HTML fragments for the weather card and its loading/error placeholders.
//!
//! Fragments are self-contained: styling is inline so a viewer can embed the
//! markup without shipping a stylesheet.

use chrono::SecondsFormat;

use crate::model::{Place, WeatherPayload};

pub fn render_weather_card(payload: &WeatherPayload) -> String {
    let condition = payload.condition();
    let units = payload.units;

    let wind = match payload.wind_direction_deg {
        Some(deg) => format!(
            "{:.0} {} {}",
            payload.wind_speed,
            units.wind_speed_label(),
            compass_point(deg)
        ),
        None => format!("{:.0} {}", payload.wind_speed, units.wind_speed_label()),
    };

    format!(
        r#"<div class="weather-card" style="font-family: system-ui, sans-serif; max-width: 360px; margin: 0 auto; padding: 24px; border-radius: 16px; background: linear-gradient(135deg, #3b82f6, #8b5cf6); color: #ffffff;">
    <div style="display: flex; justify-content: space-between; align-items: center;">
        <h2 style="margin: 0; font-size: 20px;">{location}</h2>
        <span style="font-size: 32px;">{icon}</span>
    </div>
    <p style="margin: 4px 0 16px; opacity: 0.85;">{description}</p>
    <div style="font-size: 56px; font-weight: 700; line-height: 1;">{temperature:.0}{symbol}</div>
    <p style="margin: 8px 0 16px; opacity: 0.85;">Feels like {feels_like:.0}{symbol}</p>
    <div style="display: flex; gap: 16px;">
        <div><div style="font-size: 12px; opacity: 0.75;">Humidity</div><div>{humidity}%</div></div>
        <div><div style="font-size: 12px; opacity: 0.75;">Wind</div><div>{wind}</div></div>
    </div>
    <p style="margin: 16px 0 0; font-size: 11px; opacity: 0.7;">Observed {observed} via {provider}</p>
</div>"#,
        location = escape_html(&payload.location_name),
        icon = condition.icon(payload.is_day),
        description = condition.description(),
        temperature = payload.temperature,
        feels_like = payload.feels_like,
        symbol = units.temperature_symbol(),
        humidity = payload.humidity_pct,
        wind = wind,
        observed = payload
            .observation_time
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        provider = escape_html(&payload.provider),
    )
}

pub fn render_loading(place: &Place) -> String {
    format!(
        r#"<div class="p-5 text-center font-sans text-gray-600 bg-gray-50 rounded-lg border border-gray-200">
    <p>Loading weather data for {}...</p>
</div>"#,
        escape_html(place.as_str())
    )
}

pub fn render_error(message: &str) -> String {
    format!(
        r#"<div class="p-5 text-center font-sans text-red-500 bg-red-50 rounded-lg border border-red-200">
    <p>Error: {}</p>
</div>"#,
        escape_html(message)
    )
}

/// 16-point compass name for a bearing in degrees.
fn compass_point(deg: u16) -> &'static str {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let idx = ((f64::from(deg % 360) / 22.5).round() as usize) % POINTS.len();
    POINTS[idx]
}

pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnitSystem;
    use chrono::{TimeZone, Utc};

    fn payload(units: UnitSystem) -> WeatherPayload {
        WeatherPayload {
            provider: "open-meteo".into(),
            location_name: "Denver, United States".into(),
            temperature: 72.4,
            feels_like: 70.6,
            humidity_pct: 40,
            wind_speed: 5.2,
            wind_direction_deg: Some(270),
            weather_code: 2,
            is_day: true,
            units,
            observation_time: Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
        }
    }

    #[test]
    fn card_shows_rounded_fields_with_units() {
        let html = render_weather_card(&payload(UnitSystem::Imperial));

        assert!(html.contains("Denver, United States"));
        assert!(html.contains("72°F"));
        assert!(html.contains("Feels like 71°F"));
        assert!(html.contains("40%"));
        assert!(html.contains("5 mph W"));
        assert!(html.contains("Partly cloudy"));
        assert!(html.contains("2025-06-01T18:00:00Z"));
    }

    #[test]
    fn metric_card_uses_metric_labels() {
        let mut p = payload(UnitSystem::Metric);
        p.wind_direction_deg = None;
        let html = render_weather_card(&p);

        assert!(html.contains("°C"));
        assert!(html.contains("5 km/h<"));
        assert!(!html.contains("mph"));
    }

    #[test]
    fn placeholders_escape_interpolated_text() {
        let place = Place::new("<script>").unwrap();
        assert!(render_loading(&place).contains("Loading weather data for &lt;script&gt;..."));

        let html = render_error("bad \"quote\" & more");
        assert!(html.contains("Error: bad &quot;quote&quot; &amp; more"));
        assert!(html.contains("text-red-500"));
    }

    #[test]
    fn compass_points_wrap_around() {
        assert_eq!(compass_point(0), "N");
        assert_eq!(compass_point(90), "E");
        assert_eq!(compass_point(350), "N");
        assert_eq!(compass_point(360), "N");
        assert_eq!(compass_point(202), "SSW");
    }
}
