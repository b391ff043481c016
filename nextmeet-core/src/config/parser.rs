//! Settings parser
//!
//! Handles only the TOML subset used by `settings.toml`:
//!
//! - `[section]` headers
//! - `key = value` pairs (string, integer, float, boolean)
//! - Comments (`# ...`), including after a value
//!
//! Unknown keys are ignored so older firmware accepts newer files.

use heapless::String;

use super::types::*;

/// Settings parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// A required key is absent
    MissingValue,
    /// A string exceeds its fixed capacity
    TooLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Network,
    Location,
    Endpoints,
    Display,
    Sync,
}

/// Parse `settings.toml`
pub fn parse_settings(input: &str) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header
                .split('#')
                .next()
                .unwrap_or("")
                .trim()
                .strip_suffix(']')
                .ok_or(ConfigError::InvalidSection)?;
            section = parse_section_header(header.trim())?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(&mut settings, section, key, value)?;
        }
    }

    if settings.network.ssid.is_empty()
        || settings.endpoints.time_url.is_empty()
        || settings.endpoints.event_url.is_empty()
    {
        return Err(ConfigError::MissingValue);
    }
    if settings.display.frame_period_ms == 0 || settings.display.moon_pulse_frames == 0 {
        return Err(ConfigError::InvalidValue);
    }

    Ok(settings)
}

fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    match header {
        "network" => Ok(Section::Network),
        "location" => Ok(Section::Location),
        "endpoints" => Ok(Section::Endpoints),
        "display" => Ok(Section::Display),
        "sync" => Ok(Section::Sync),
        _ => Err(ConfigError::InvalidSection),
    }
}

fn apply_value(
    settings: &mut Settings,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match (section, key) {
        (Section::Network, "ssid") => settings.network.ssid = parse_text(value)?,
        (Section::Network, "password") => settings.network.password = parse_text(value)?,

        (Section::Location, "latitude") => settings.location.latitude = parse_num(value)?,
        (Section::Location, "longitude") => settings.location.longitude = parse_num(value)?,
        (Section::Location, "timezone") => settings.location.timezone = parse_text(value)?,

        (Section::Endpoints, "time_url") => settings.endpoints.time_url = parse_text(value)?,
        (Section::Endpoints, "event_url") => settings.endpoints.event_url = parse_text(value)?,

        (Section::Display, "twelve_hour") => settings.display.twelve_hour = parse_bool(value)?,
        (Section::Display, "frame_period_ms") => {
            settings.display.frame_period_ms = parse_num(value)?
        }
        (Section::Display, "moon_pulse_frames") => {
            settings.display.moon_pulse_frames = parse_num(value)?
        }

        (Section::Sync, "time_interval_s") => settings.sync.time_interval_s = parse_num(value)?,
        (Section::Sync, "time_backoff_s") => settings.sync.time_backoff_s = parse_num(value)?,
        (Section::Sync, "event_interval_s") => settings.sync.event_interval_s = parse_num(value)?,
        (Section::Sync, "time_attempts") => settings.sync.time_attempts = parse_num(value)?,

        _ => {}
    }
    Ok(())
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Strip a trailing comment unless the # sits inside a string
    let value = match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_text<const N: usize>(value: &str) -> Result<String<N>, ConfigError> {
    let mut out = String::new();
    out.push_str(parse_string(value))
        .map_err(|_| ConfigError::TooLong)?;
    Ok(out)
}

fn parse_num<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[network]
ssid = "office"

[endpoints]
time_url = "http://192.168.1.242:8099/time.php"
event_url = "http://192.168.1.242:8099/nextEvent.txt"
"#;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("a = 1"), Some(("a", "1")));
        assert_eq!(
            parse_key_value(r#"ssid = "net#1""#),
            Some(("ssid", r#""net#1""#))
        );
        assert_eq!(parse_key_value("b = 2 # two"), Some(("b", "2")));
        assert_eq!(parse_key_value("novalue ="), None);
        assert_eq!(parse_key_value("no equals"), None);
    }

    #[test]
    fn test_parse_section_header() {
        assert_eq!(parse_section_header("network"), Ok(Section::Network));
        assert_eq!(parse_section_header("sync"), Ok(Section::Sync));
        assert_eq!(
            parse_section_header("stepper spin"),
            Err(ConfigError::InvalidSection)
        );
    }

    #[test]
    fn test_parse_minimal_uses_defaults() {
        let settings = parse_settings(MINIMAL).unwrap();
        assert_eq!(settings.network.ssid.as_str(), "office");
        assert_eq!(settings.network.password.as_str(), "");
        assert_eq!(
            settings.endpoints.event_url.as_str(),
            "http://192.168.1.242:8099/nextEvent.txt"
        );
        assert_eq!(settings.display, DisplaySettings::default());
        assert!(settings.display.twelve_hour);
        assert_eq!(settings.sync.time_attempts, 5);
        assert_eq!(settings.sync.time_timer().interval_s, 12 * 3600);
        assert_eq!(settings.sync.time_timer().backoff_s, 30 * 60);
        assert_eq!(settings.sync.event_timer().interval_s, 15 * 60);
        assert_eq!(settings.sync.event_timer().backoff_s, 15 * 60);
    }

    #[test]
    fn test_parse_full() {
        let input = r#"
# NextMeet settings
[network]
ssid = "office"
password = "hunter22"  # not really

[location]
latitude = 40.7128
longitude = -74.006
timezone = "America/New_York"

[endpoints]
time_url = "http://10.0.0.2/time.php?tz={timezone}"
event_url = "http://10.0.0.2/nextEvent.txt"

[display]
twelve_hour = false
frame_period_ms = 40
moon_pulse_frames = 8
unknown_key = 3

[sync]
time_interval_s = 3600
time_backoff_s = 600
event_interval_s = 300
time_attempts = 3
"#;
        let settings = parse_settings(input).unwrap();
        assert_eq!(settings.network.password.as_str(), "hunter22");
        assert_eq!(settings.location.timezone.as_str(), "America/New_York");
        assert!((settings.location.longitude + 74.006).abs() < 1e-4);
        assert!(!settings.display.twelve_hour);
        assert_eq!(settings.display.frame_period_ms, 40);
        assert_eq!(settings.display.moon_pulse_frames, 8);
        assert_eq!(settings.sync.time_interval_s, 3600);
        assert_eq!(settings.sync.time_backoff_s, 600);
        assert_eq!(settings.sync.event_interval_s, 300);
        assert_eq!(settings.sync.time_attempts, 3);
    }

    #[test]
    fn test_missing_urls_rejected() {
        let input = "[network]\nssid = \"office\"\n";
        assert_eq!(parse_settings(input), Err(ConfigError::MissingValue));
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut input = std::string::String::from(MINIMAL);
        input.push_str("[display]\ntwelve_hour = yes\n");
        assert_eq!(parse_settings(&input), Err(ConfigError::InvalidValue));

        let mut input = std::string::String::from(MINIMAL);
        input.push_str("[display]\nframe_period_ms = 0\n");
        assert_eq!(parse_settings(&input), Err(ConfigError::InvalidValue));

        let mut input = std::string::String::from(MINIMAL);
        input.push_str("[heater]\n");
        assert_eq!(parse_settings(&input), Err(ConfigError::InvalidSection));
    }

    #[test]
    fn test_overlong_string_rejected() {
        let mut input = std::string::String::from("[network]\nssid = \"");
        input.push_str(&"s".repeat(MAX_SSID_LEN + 1));
        input.push_str("\"\n");
        assert_eq!(parse_settings(&input), Err(ConfigError::TooLong));
    }
}
