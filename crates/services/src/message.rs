//! Reason defaulting and the text shown to a disconnected player.

use chrono::{DateTime, Utc};
use configs::BanSettings;

/// `MM/dd/yyyy HH:mm:ss`, rendered in UTC.
pub const END_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Returns `message` unless it is missing or blank, in which case the
/// configured default for the issuing mode is used.
pub fn resolve_reason(message: Option<&str>, admin: bool, settings: &BanSettings) -> String {
    match message {
        Some(m) if !m.trim().is_empty() => m.to_string(),
        _ if admin => settings.admin_reason.clone(),
        _ => settings.automatic_reason.clone(),
    }
}

/// `"<reason>. Ends <end time>"` for timed bans, the bare reason otherwise.
pub fn kick_message(reason: &str, ends_at: Option<DateTime<Utc>>) -> String {
    match ends_at {
        Some(end) => format!("{reason}. Ends {}", end.format(END_TIME_FORMAT)),
        None => reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn blank_messages_fall_back_per_mode() {
        let settings = BanSettings::default();
        assert_eq!(resolve_reason(None, true, &settings), "Administrative Ban");
        assert_eq!(resolve_reason(Some("   "), false, &settings), "Automatic Ban");
        assert_eq!(resolve_reason(Some(""), true, &settings), "Administrative Ban");
        assert_eq!(resolve_reason(Some("xray"), false, &settings), "xray");
    }

    #[test]
    fn timed_ban_appends_end_time() {
        let end = Utc.with_ymd_and_hms(2027, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            kick_message("griefing", Some(end)),
            "griefing. Ends 03/04/2027 05:06:07"
        );
        assert_eq!(kick_message("griefing", None), "griefing");
    }
}
