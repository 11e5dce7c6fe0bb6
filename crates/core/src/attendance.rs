//! Attendance-rate computation for the per-concert statistics endpoint.

/// Format the attendance rate as `attended / sold * 100` rounded to one
/// decimal place with a trailing `%`, or exactly `"0%"` when nothing has
/// been sold.
pub fn format_attendance_rate(total_sold: i64, total_attended: i64) -> String {
    if total_sold <= 0 {
        return "0%".to_string();
    }
    let rate = total_attended as f64 / total_sold as f64 * 100.0;
    format!("{rate:.1}%")
}
