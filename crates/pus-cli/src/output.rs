//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use anyhow::Result;
use colored::Colorize;

use pus_core::Entry;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - short hashes only
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print entries, one per line
    pub fn print_entries(&self, entries: &[Entry]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for entry in entries {
                    println!("{}", entry_line(entry));
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(entries)?);
            }
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.short_hash());
                }
            }
        }
        Ok(())
    }

    /// Print a single entry
    pub fn print_entry(&self, entry: &Entry) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(entry)?);
                Ok(())
            }
            _ => self.print_entries(std::slice::from_ref(entry)),
        }
    }

    /// Report a hash that matched nothing
    pub fn not_found(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "not_found", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// `<hash> <date> | <text>` with the hash in yellow
fn entry_line(entry: &Entry) -> String {
    format!(
        "{} {} | {}",
        entry.short_hash().yellow(),
        entry.date.format("%Y-%m-%d"),
        entry.text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pus_core::Flag;

    fn entry() -> Entry {
        let created_at = "2024-03-01T08:30:00Z".parse().unwrap();
        let date = "2024-03-01".parse().unwrap();
        Entry::new(Flag::Task, "Buy milk", date, created_at)
    }

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_entry_line() {
        colored::control::set_override(false);
        let entry = entry();
        assert_eq!(
            entry_line(&entry),
            format!("{} 2024-03-01 | . Buy milk", entry.short_hash())
        );
    }

    #[test]
    fn test_json_output_uses_camel_case() {
        let json = serde_json::to_value(entry()).unwrap();
        assert!(json.get("contentHash").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("id").is_none());
    }
}
