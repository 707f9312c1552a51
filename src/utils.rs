// Text helpers for showing session and itinerary numbers.

// "HH:MM:SS", hours are not capped at 24.
pub fn format_elapsed(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hrs, mins, secs)
}

pub fn format_distance_km(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.)
}

// "Xh Ym", seconds are dropped.
pub fn format_duration_short(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    format!("{}h {}m", hrs, mins)
}
