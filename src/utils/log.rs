// src/utils/log.rs

//! Console report helpers.
//!
//! Headers, indented items and summaries rendered through the `log` facade,
//! so they share the timestamps and filtering of ordinary log lines.

/// Width of header rules.
const RULE_WIDTH: usize = 60;

/// Log a header
pub fn header(title: &str) {
    let border = "═".repeat(RULE_WIDTH);
    log::info!("{}", border);
    log::info!("  {}", title);
    log::info!("{}", border);
}

/// Log a sub-item (indented)
pub fn sub_item(message: &str) {
    log::info!("    {}", message);
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    log::info!("{}", format_summary_title(title));
    for (key, value) in items {
        sub_item(&format_item(key, value));
    }
}

fn format_summary_title(title: &str) -> String {
    format!("[SUMMARY] {}", title)
}

fn format_item(key: &str, value: &str) -> String {
    format!("{}: {}", key, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_formatting() {
        assert_eq!(format_summary_title("Cycle complete"), "[SUMMARY] Cycle complete");
        assert_eq!(format_item("New", "2"), "New: 2");
    }
}
