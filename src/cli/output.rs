//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the Signal CLI.

use crate::pipeline::{StageEvent, Status};
use owo_colors::OwoColorize;

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    pub fn banner(&self) {
        let title = format!("Signal news pipeline v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!("\n   {}", "((( SIGNAL )))".bright_cyan().bold());
            println!("   {}\n", title.dimmed());
        } else {
            println!("\n   ((( SIGNAL )))\n   {}\n", title);
        }
    }

    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a file creation message
    pub fn created(&self, file_type: &str, path: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "✓".green().bold(),
                file_type.dimmed(),
                path.bright_white()
            );
        } else {
            println!("  [CREATED] {} {}", file_type, path);
        }
    }

    pub fn header(&self, title: &str) {
        if self.colored {
            println!("\n  {}", title.bright_white().bold().underline());
        } else {
            println!("\n  === {} ===", title);
        }
    }

    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            println!("    {}: {}", key.dimmed(), value.bright_white());
        } else {
            println!("    {}: {}", key, value);
        }
    }

    pub fn hint(&self, message: &str) {
        if self.colored {
            println!("\n  {}", message.dimmed().italic());
        } else {
            println!("\n  [TIP] {}", message);
        }
    }

    pub fn command(&self, cmd: &str) {
        if self.colored {
            println!("     {}", format!("$ {}", cmd).bright_cyan());
        } else {
            println!("     $ {}", cmd);
        }
    }

    /// One line per progress event.
    pub fn event(&self, event: &StageEvent) {
        let step = format!("{:<10}", event.step.label());
        let detail = match (&event.message, &event.data) {
            (Some(message), _) => message.clone(),
            (None, Some(serde_json::Value::Array(items))) => format!("{} item(s)", items.len()),
            (None, Some(serde_json::Value::String(text))) => format!("{} chars", text.len()),
            _ => String::new(),
        };
        let detail = match &event.refined_topic {
            Some(topic) => format!("{} (query: {})", detail, topic),
            None => detail,
        };

        if self.colored {
            match event.status {
                Status::Running => println!("  {} {} {}", "…".blue(), step.bright_white(), detail.dimmed()),
                Status::Completed => println!("  {} {} {}", "✓".green().bold(), step.bright_white(), detail),
                Status::Error => eprintln!("  {} {} {}", "✗".red().bold(), step.bright_white(), detail.red()),
            }
        } else {
            let tag = match event.status {
                Status::Running => "RUNNING",
                Status::Completed => "DONE",
                Status::Error => "ERROR",
            };
            println!("  [{}] {} {}", tag, step, detail);
        }
    }

    pub fn newline(&self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Step;
    use serde_json::json;

    #[test]
    fn test_output_modes() {
        assert!(Output::new().colored);
        assert!(!Output::no_color().colored);
        assert!(Output::default().colored);
    }

    #[test]
    fn test_event_rendering_no_panic() {
        for output in [Output::new(), Output::no_color()] {
            output.event(&StageEvent::running("j", Step::Search, "Refining search query..."));
            output.event(
                &StageEvent::completed("j", Step::Search, json!([{"id": "a"}]))
                    .with_refined_topic("ai"),
            );
            output.event(&StageEvent::completed("j", Step::Editing, json!("report")));
            output.event(&StageEvent::failed("j", Step::Profiling, "Profiling failed"));
        }
    }

    #[test]
    fn test_output_methods_no_panic() {
        let output = Output::no_color();
        output.banner();
        output.success("ok");
        output.info("info");
        output.warning("warn");
        output.error("err");
        output.created("config", "signal.toml");
        output.header("Header");
        output.kv("key", "value");
        output.hint("hint");
        output.command("signal-server");
        output.newline();
    }
}
