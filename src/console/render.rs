//! Operator-facing rendering of [`Status`].

use std::time::Duration;

use crate::core::Status;

/// Formats a duration as `hh:mm:ss`, prefixed with whole days when non-zero.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let (days, rem) = (total / 86_400, total % 86_400);
    let (h, m, s) = (rem / 3600, (rem % 3600) / 60, rem % 60);
    if days > 0 {
        format!("{days}d {h:02}:{m:02}:{s:02}")
    } else {
        format!("{h:02}:{m:02}:{s:02}")
    }
}

/// Lines printed by the `status` command.
pub fn status_lines(status: &Status) -> Vec<String> {
    match status {
        Status::Offline {
            crash_count,
            restart_pending_in,
        } => {
            let mut lines = vec!["SERVER OFFLINE".to_owned(), format!("Crashes: {crash_count}")];
            if let Some(left) = restart_pending_in {
                lines.push(format!("Crash restart in: {}", format_duration(*left)));
            }
            lines
        }
        Status::Online {
            pid,
            uptime,
            crash_count,
            restart_hours,
            next_restart_in,
            ..
        } => {
            let mut lines = vec![
                "SERVER ONLINE".to_owned(),
                format!(
                    "Up-time: {} | Crashes: {crash_count} | Pid: {pid}",
                    format_duration(*uptime)
                ),
            ];
            if let Some(hours) = restart_hours {
                lines.push(format!("Auto-restart set to: {hours} hours"));
            }
            if let Some(left) = next_restart_in {
                lines.push(format!("Restarting in: {}", format_duration(*left)));
            }
            lines
        }
    }
}
