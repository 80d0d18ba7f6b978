//! `config` and `faq` command implementations

use super::output::Output;
use crate::faq::FaqResponder;
use crate::utils::toml_config::{ConfigError, ConfigWarning, HatchConfig};
use std::path::Path;

/// Show a summary of the configuration, or the whole file with `full`
pub fn show_config(path: &Path, full: bool, output: &Output) -> Result<(), ConfigError> {
    let config = HatchConfig::load(path)?;

    if full {
        let rendered = toml::to_string_pretty(&config)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        output.reply(&rendered);
        return Ok(());
    }

    output.header(&format!("Configuration ({})", path.display()));
    output.kv("Listen", &config.bind_address());
    output.kv("Log level", &config.server.log_level);
    output.kv("Log format", &format!("{:?}", config.server.log_format).to_lowercase());
    output.kv(
        "CORS origins",
        &if config.server.cors_origins.is_empty() {
            "any".to_string()
        } else {
            config.server.cors_origins.join(", ")
        },
    );
    output.kv("Body limit", &format!("{} bytes", config.server.body_limit_bytes));

    output.header("Mail");
    output.kv(
        "SMTP",
        &format!(
            "{}:{} ({:?})",
            config.mail.smtp_host, config.mail.smtp_port, config.mail.tls
        ),
    );
    output.kv(
        "Credentials",
        &format!(
            "{} / {}",
            env_status(&config, &config.mail.username_env),
            env_status(&config, &config.mail.password_env)
        ),
    );
    output.kv(
        "Recipient",
        config
            .mail
            .recipient
            .as_deref()
            .unwrap_or("(same as SMTP user)"),
    );

    let faq = FaqResponder::from_config(&config.faq)?;
    output.header("FAQ");
    output.kv("Rules", &faq.rules().len().to_string());
    output.kv("Configured rules", &config.faq.rules.len().to_string());
    output.kv("Built-in rules", if config.faq.include_builtin { "on" } else { "off" });

    Ok(())
}

fn env_status(config: &HatchConfig, name: &str) -> String {
    match config.resolve_env(name) {
        Some(_) => format!("{} (set)", name),
        None => format!("{} (not set)", name),
    }
}

/// Validate the configuration and print any warnings.
///
/// Warnings never fail validation; they are returned after being printed.
pub fn validate_config(path: &Path, output: &Output) -> Result<Vec<ConfigWarning>, ConfigError> {
    let config = HatchConfig::load(path)?;
    let warnings = config.validate_with_warnings()?;

    output.success(&format!("{} is valid", path.display()));
    for warning in &warnings {
        output.warning(&warning.message);
    }

    Ok(warnings)
}

/// Load the responder for FAQ commands.
///
/// Without a configuration file the built-in table is used.
pub fn load_responder(path: &Path, output: &Output) -> Result<FaqResponder, ConfigError> {
    if path.exists() {
        let config = HatchConfig::load(path)?;
        return Ok(FaqResponder::from_config(&config.faq)?);
    }

    output.info(&format!(
        "{} not found, using the built-in FAQ table",
        path.display()
    ));
    FaqResponder::builtin().map_err(ConfigError::from)
}

/// Print every effective rule in priority order, then the fallback
pub fn list_rules(faq: &FaqResponder, output: &Output) {
    output.header(&format!("FAQ rules ({})", faq.rules().len()));
    for (index, rule) in faq.rules().iter().enumerate() {
        output.rule(index + 1, rule.pattern(), rule.answer());
    }

    output.header("Fallback");
    output.reply(&format!("    {}", faq.fallback()));
}

/// Answer `words` joined by spaces, as the chat endpoint would
pub fn ask(faq: &FaqResponder, words: &[String], verbose: bool, output: &Output) {
    let question = words.join(" ");

    if verbose {
        match faq.find_rule(&question) {
            Some(rule) => output.info(&format!("Matched /{}/i", rule.pattern())),
            None => output.info("No rule matched, using the fallback"),
        }
    }

    output.reply(faq.answer_query(&question));
}
