use chrono::{DateTime, Local, Utc};

pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Two decimals, the precision the backend rounds summaries to.
pub fn format_metric(value: f64) -> String {
    format!("{:.2}", value)
}

pub fn format_optional_metric(value: Option<f64>) -> String {
    value.map(format_metric).unwrap_or_else(|| "-".to_string())
}

/// Upload time as local wall-clock `HH:MM:SS`.
pub fn format_upload_time(uploaded_at: &DateTime<Utc>) -> String {
    uploaded_at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
