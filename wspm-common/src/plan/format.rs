//! Read-view formatting of the selected services
//!
//! `居宅介護` with frequency `3` and duration `2` renders as `居宅介護 週3 2時間`;
//! several services are joined with `、`. Unset metrics are left out entirely.

use super::Services;

/// Render one service fragment from its label and raw metric values
pub fn format_service(label: &str, frequency: &str, duration: &str) -> String {
    let frequency = digits_only(frequency);
    let duration = digits_only(duration);

    let mut parts = vec![label.to_string()];
    if !frequency.is_empty() {
        parts.push(format!("週{}", frequency));
    }
    if !duration.is_empty() {
        parts.push(format!("{}時間", duration));
    }
    parts.retain(|p| !p.is_empty());
    parts.join(" ")
}

/// Render every selected service in selection order
pub fn format_services(services: &Services) -> String {
    services
        .service_type
        .iter()
        .map(|label| {
            let frequency = services.frequency_map.get(label).map(String::as_str).unwrap_or("");
            let duration = services.duration_map.get(label).map(String::as_str).unwrap_or("");
            format_service(label, frequency, duration)
        })
        .collect::<Vec<_>>()
        .join("、")
}

fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}
