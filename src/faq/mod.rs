//! Scripted FAQ responder
//!
//! Answers the site chat widget from an ordered table of case-insensitive
//! regex rules. The first rule whose pattern matches the latest user message
//! wins; when nothing matches the caller gets a fallback that lists the topics
//! we can talk about.
//!
//! A [`FaqResponder`] is immutable once built. The server keeps the current one
//! behind an `ArcSwap` so a config reload can replace the whole table at once.

use crate::types::{ChatMessage, MessageRole};
use crate::utils::toml_config::FaqConfig;
use regex::{Regex, RegexBuilder};

/// Reply used when no rule matches, including the empty-query case.
pub const DEFAULT_FALLBACK: &str = "I can help with services, technology, and contact info. Try asking things like: ‘What services do you offer?’ or ‘How can I contact you?’";

/// Built-in rules, highest priority first.
pub const BUILTIN_RULES: &[(&str, &str)] = &[
    (
        "services|offer|provide",
        "We provide intelligent automation, data intelligence, AI security, process optimization, custom AI development, and business intelligence. Explore the Services section for details.",
    ),
    (
        "technology|stack|tech",
        "Our stack includes modern AI/ML techniques and interactive 3D visualizations. You’ll find highlights like machine learning, neural networks, computer vision, NLP, robotics, and even quantum computing in the Technology section.",
    ),
    (
        "contact|reach|email|phone",
        "Use the Contact section’s form to send us a message. You can also reach us via email at contact@neuraspace.ai or phone +1 (555) 123-4567.",
    ),
    (
        "custom|bespoke|tailor|development",
        "Yes, we offer custom AI development—covering model design, API integration, deployment, and continuous learning.",
    ),
];

/// Errors raised while building a rule table
#[derive(Debug, thiserror::Error)]
pub enum FaqError {
    #[error("Invalid FAQ pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("FAQ rule '{0}' has an empty answer")]
    EmptyAnswer(String),

    #[error("FAQ table has no rules")]
    NoRules,
}

/// A single (pattern, canned answer) pair.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    answer: String,
}

impl Rule {
    /// Compile a rule. Matching is always case-insensitive.
    pub fn new(pattern: &str, answer: impl Into<String>) -> Result<Self, FaqError> {
        let answer = answer.into();
        if answer.trim().is_empty() {
            return Err(FaqError::EmptyAnswer(pattern.to_string()));
        }

        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| FaqError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self { pattern, answer })
    }

    /// Pattern source as written in the table.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Regex search anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered rule table plus the fallback reply.
#[derive(Debug, Clone)]
pub struct FaqResponder {
    rules: Vec<Rule>,
    fallback: String,
}

impl FaqResponder {
    pub fn new(rules: Vec<Rule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// The built-in table with the default fallback.
    pub fn builtin() -> Result<Self, FaqError> {
        Ok(Self::new(builtin_rules()?, DEFAULT_FALLBACK))
    }

    /// Build the effective table from configuration.
    ///
    /// Configured rules come first, followed by the built-in ones unless
    /// `include_builtin` is off.
    pub fn from_config(config: &FaqConfig) -> Result<Self, FaqError> {
        let mut rules = config
            .rules
            .iter()
            .map(|rule| Rule::new(&rule.pattern, rule.answer.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        if config.include_builtin {
            rules.extend(builtin_rules()?);
        }

        if rules.is_empty() {
            return Err(FaqError::NoRules);
        }

        let fallback = match config.fallback.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => DEFAULT_FALLBACK.to_string(),
        };

        Ok(Self::new(rules, fallback))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// First rule matching the trimmed query, if any.
    pub fn find_rule(&self, query: &str) -> Option<&Rule> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.rules.iter().find(|rule| rule.matches(query))
    }

    /// Answer a raw query string.
    pub fn answer_query(&self, query: &str) -> &str {
        self.find_rule(query)
            .map(Rule::answer)
            .unwrap_or(self.fallback.as_str())
    }

    /// Answer a conversation using only its latest user turn.
    pub fn answer(&self, conversation: &[ChatMessage]) -> &str {
        self.answer_query(latest_user_query(conversation))
    }
}

/// Content of the most recent user message, or `""` if there is none.
///
/// Earlier user turns are never consulted, even when the latest one is empty.
pub fn latest_user_query(conversation: &[ChatMessage]) -> &str {
    conversation
        .iter()
        .rev()
        .find(|message| message.role == MessageRole::User)
        .map(|message| message.content.trim())
        .unwrap_or("")
}

fn builtin_rules() -> Result<Vec<Rule>, FaqError> {
    BUILTIN_RULES
        .iter()
        .map(|(pattern, answer)| Rule::new(pattern, *answer))
        .collect()
}
