//! Colored output helpers for CLI
//!
//! Every helper has a plain-text twin used with `--no-color` or when stdout
//! is piped into tests.

use owo_colors::OwoColorize;

/// Terminal printer for the hatch-server CLI
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

    /// Pick a printer from the `--no-color` flag and the `NO_COLOR` convention
    pub fn from_flags(no_color: bool) -> Self {
        if no_color || std::env::var_os("NO_COLOR").is_some() {
            Self::no_color()
        } else {
            Self::new()
        }
    }

    pub fn banner(&self) {
        let title = format!("S-HATCH site backend v{}", env!("CARGO_PKG_VERSION"));
        if self.colored {
            println!(
                "\n   {}  {}\n",
                "▲ hatch".bright_magenta().bold(),
                title.bright_white()
            );
        } else {
            println!("\n   hatch  {}\n", title);
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
            println!("  {} {}", "•".cyan(), message);
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

    /// Errors go to stderr
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    pub fn created(&self, path: &str) {
        if self.colored {
            println!("  {} {}", "+".green().bold(), path.bright_white());
        } else {
            println!("  [CREATED] {}", path);
        }
    }

    pub fn skipped(&self, path: &str, reason: &str) {
        if self.colored {
            println!(
                "  {} {} {}",
                "○".yellow(),
                path.dimmed(),
                format!("({})", reason).yellow()
            );
        } else {
            println!("  [SKIPPED] {} ({})", path, reason);
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

    /// One numbered FAQ rule: pattern on the first line, answer indented below
    pub fn rule(&self, index: usize, pattern: &str, answer: &str) {
        if self.colored {
            println!(
                "    {} {}",
                format!("{:>2}.", index).dimmed(),
                format!("/{}/i", pattern).bright_cyan()
            );
            println!("        {}", answer);
        } else {
            println!("    {:>2}. /{}/i", index, pattern);
            println!("        {}", answer);
        }
    }

    /// A chat reply, printed without decoration so it can be piped
    pub fn reply(&self, text: &str) {
        println!("{}", text);
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
}
