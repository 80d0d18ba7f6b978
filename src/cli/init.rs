//! Init command implementation
//!
//! Scaffolds `hatch.toml`, `.env.example` and `.gitignore` in a directory.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    Success,
    /// hatch.toml exists and `--force` was not given
    AlreadyExists,
    Error(String),
}

/// Options for the init command
pub struct InitConfig {
    pub path: PathBuf,
    pub force: bool,
    pub host: String,
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing hatch-server");

    let base_path = &config.path;
    if let Err(e) = fs::create_dir_all(base_path) {
        output.error(&format!("Failed to create {}: {}", base_path.display(), e));
        return InitResult::Error(e.to_string());
    }

    let config_path = base_path.join("hatch.toml");
    if config_path.exists() && !config.force {
        output.warning("hatch.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    let files = [
        ("hatch.toml", generate_hatch_toml(&config.host, config.port), true),
        (".env.example", generate_env_example(), true),
        (".gitignore", generate_gitignore(), false),
    ];

    for (name, content, overwrite) in files {
        let path = base_path.join(name);
        if path.exists() && !(overwrite && config.force) {
            output.skipped(name, "already exists");
            continue;
        }
        if let Err(e) = fs::write(&path, content) {
            output.error(&format!("Failed to create {}: {}", name, e));
            return InitResult::Error(e.to_string());
        }
        output.created(name);
    }

    output.success("Project initialized");
    output.header("Next Steps");
    output.info("1. Provide SMTP credentials for the contact form:");
    output.command("cp .env.example .env");
    output.info("2. Start the server:");
    output.command("hatch-server");
    output.hint(&format!(
        "Server will be available at http://{}:{}",
        config.host, config.port
    ));

    InitResult::Success
}

/// Starter configuration with every section spelled out
pub fn generate_hatch_toml(host: &str, port: u16) -> String {
    format!(
        r#"# hatch-server configuration
# Changes are picked up automatically while the server runs.

[server]
host = "{host}"
port = {port}
log_level = "info"
# "pretty" or "json"
log_format = "pretty"
# Allowed browser origins; leave empty to allow any
cors_origins = []
body_limit_bytes = 65536

[mail]
smtp_host = "smtp.gmail.com"
smtp_port = 465
# "implicit" (port 465) or "starttls" (port 587)
tls = "implicit"
# Names of the environment variables holding the SMTP credentials
username_env = "EMAIL_USER"
password_env = "EMAIL_PASS"
# Where contact submissions go; defaults to the SMTP user
# recipient = "team@example.com"
from_name = "S-HATCH Contact Form"
brand = "S-HATCH AI Solutions"
tagline = "Transform your business with cutting-edge AI technology"

[faq]
# Keep the built-in services/technology/contact/custom answers
include_builtin = true
# fallback = "I can help with services, technology, and contact info."

# Extra rules are checked before the built-in ones, top to bottom.
# Patterns are case-insensitive regular expressions.
# [[faq.rules]]
# pattern = "pric(e|ing)|cost"
# answer = "Pricing depends on scope. Use the Contact form for a quote."
"#
    )
}

fn generate_env_example() -> String {
    r#"# SMTP account used by the contact form (for Gmail, use an app password)
EMAIL_USER=you@example.com
EMAIL_PASS=change-me

# Optional log filter override, e.g. hatch=debug,tower_http=debug
# RUST_LOG=hatch=info
"#
    .to_string()
}

fn generate_gitignore() -> String {
    "/target\n.env\n".to_string()
}

/// Whether `path` already holds a hatch project
pub fn is_initialized(path: &Path) -> bool {
    path.join("hatch.toml").exists()
}
