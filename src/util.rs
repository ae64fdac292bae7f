//! Small utility helpers used across modules.

use chrono::TimeDelta;

/// Escape text for interpolation into HTML element content or quoted attributes.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

/// Compact French countdown such as "2j 3h 05min". Negative spans render as "0min".
pub fn format_countdown(span: TimeDelta) -> String {
  let total_minutes = span.num_minutes().max(0);
  let days = total_minutes / (24 * 60);
  let hours = (total_minutes / 60) % 24;
  let minutes = total_minutes % 60;
  match (days, hours) {
    (0, 0) => format!("{}min", minutes),
    (0, _) => format!("{}h {:02}min", hours, minutes),
    _ => format!("{}j {}h {:02}min", days, hours, minutes),
  }
}
