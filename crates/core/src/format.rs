use crate::types::FlagList;

/// Render flags as the single-line JSON array printed on stdout
pub fn format_flags_json(flags: &FlagList) -> String {
    serde_json::to_string(flags).unwrap_or_else(|_| "[]".to_string())
}

/// Format seconds as MM:SS timestamp
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    format!("{:02}:{:02}", mins, secs)
}
