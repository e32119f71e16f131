//! Prompt construction for facts.
//!
//! Questions come from an ordered table of (keywords, template) rules.
//! The first rule with any keyword contained in the lower-cased event
//! text wins; otherwise the fallback template is used. Templates may
//! contain `{event}`, which is replaced with the raw event text.

use serde::{Deserialize, Serialize};

use crate::domain::Fact;

/// Placeholder substituted with the event text
pub const EVENT_PLACEHOLDER: &str = "{event}";

/// Template used when no rule matches
pub const DEFAULT_FALLBACK: &str = "When did this event occur: {event}?";

/// Preamble used by the context prompt style
pub const DEFAULT_CONTEXT: &str = "On what date did the following event occur?";

/// One keyword-to-question rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRule {
    /// Lower-case keywords; any one matching selects the rule
    pub keywords: Vec<String>,

    /// Question template
    pub template: String,
}

impl QuestionRule {
    pub fn new(keywords: &[&str], template: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            template: template.to_string(),
        }
    }

    fn matches(&self, event_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && event_lower.contains(&k.to_lowercase()))
    }
}

/// Built-in rules for the curated sample facts
pub fn builtin_rules() -> Vec<QuestionRule> {
    vec![
        QuestionRule::new(&["assassinated"], "When was JFK assassinated?"),
        QuestionRule::new(
            &["moon landing", "apollo"],
            "When did the first moon landing occur?",
        ),
        QuestionRule::new(
            &["world war ii", "germany's surrender"],
            "When did World War II end in Europe?",
        ),
        QuestionRule::new(&["titanic"], "When did the Titanic sink?"),
        QuestionRule::new(
            &["declaration of independence"],
            "When was the Declaration of Independence adopted?",
        ),
        QuestionRule::new(&["berlin wall"], "When did the Berlin Wall fall?"),
        QuestionRule::new(
            &["wright brothers", "first flight"],
            "When did the Wright brothers make their first powered flight?",
        ),
        QuestionRule::new(
            &["hiroshima", "atomic bomb"],
            "When was the atomic bomb dropped on Hiroshima?",
        ),
        QuestionRule::new(
            &["great depression", "stock market crash"],
            "When did the Great Depression begin?",
        ),
        QuestionRule::new(&["iphone"], "When was the first iPhone released?"),
    ]
}

/// Ordered rule table with a mandatory fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionGenerator {
    rules: Vec<QuestionRule>,
    fallback: String,
}

impl Default for QuestionGenerator {
    fn default() -> Self {
        Self::new(builtin_rules(), DEFAULT_FALLBACK)
    }
}

impl QuestionGenerator {
    pub fn new(rules: Vec<QuestionRule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Put extra rules ahead of the existing ones
    pub fn with_leading_rules(mut self, mut extra: Vec<QuestionRule>) -> Self {
        extra.append(&mut self.rules);
        self.rules = extra;
        self
    }

    pub fn rules(&self) -> &[QuestionRule] {
        &self.rules
    }

    /// The question to ask for a fact
    pub fn question_for(&self, fact: &Fact) -> String {
        let event_lower = fact.event.to_lowercase();
        let template = self
            .rules
            .iter()
            .find(|rule| rule.matches(&event_lower))
            .map(|rule| rule.template.as_str())
            .unwrap_or(&self.fallback);

        template.replace(EVENT_PLACEHOLDER, &fact.event)
    }
}

/// How facts are turned into prompts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum PromptStyle {
    /// A rule-generated question plus the system instruction
    #[default]
    Question,
    /// `"{preamble}\n {event}"` with no system instruction
    Context { preamble: String },
}

impl PromptStyle {
    /// Build the prompt for a fact
    pub fn prompt_for(&self, generator: &QuestionGenerator, fact: &Fact) -> String {
        match self {
            PromptStyle::Question => generator.question_for(fact),
            PromptStyle::Context { preamble } => format!("{}\n {}", preamble, fact.event),
        }
    }

    /// Whether the system instruction accompanies the prompt
    pub fn uses_system_prompt(&self) -> bool {
        matches!(self, PromptStyle::Question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CanonicalDate;

    fn fact(event: &str) -> Fact {
        Fact::new(event, CanonicalDate::new(1900, 1, 1).unwrap(), "general")
    }

    #[test]
    fn test_builtin_rules() {
        let generator = QuestionGenerator::default();
        assert_eq!(
            generator.question_for(&fact("The first moon landing occurred with Apollo 11")),
            "When did the first moon landing occur?"
        );
        assert_eq!(
            generator.question_for(&fact("The Titanic sank after hitting an iceberg")),
            "When did the Titanic sink?"
        );
        assert_eq!(
            generator.question_for(&fact("The first iPhone was released by Apple")),
            "When was the first iPhone released?"
        );
    }

    #[test]
    fn test_first_rule_wins() {
        // "assassinated" precedes "berlin wall" in the table
        let generator = QuestionGenerator::default();
        assert_eq!(
            generator.question_for(&fact("A guard was assassinated at the Berlin Wall")),
            "When was JFK assassinated?"
        );
    }

    #[test]
    fn test_fallback_embeds_event() {
        let generator = QuestionGenerator::default();
        assert_eq!(
            generator.question_for(&fact("The Treaty of Westphalia is signed")),
            "When did this event occur: The Treaty of Westphalia is signed?"
        );
    }

    #[test]
    fn test_leading_rules_take_priority() {
        let generator = QuestionGenerator::default().with_leading_rules(vec![QuestionRule::new(
            &["Titanic"],
            "In which year did {event}?",
        )]);
        assert_eq!(generator.rules().len(), 11);
        assert_eq!(
            generator.question_for(&fact("the Titanic sink")),
            "In which year did the Titanic sink?"
        );
    }

    #[test]
    fn test_empty_keyword_never_matches() {
        let generator = QuestionGenerator::new(vec![QuestionRule::new(&[""], "never")], "fallback");
        assert_eq!(generator.question_for(&fact("anything")), "fallback");
    }

    #[test]
    fn test_context_style() {
        let style = PromptStyle::Context {
            preamble: DEFAULT_CONTEXT.to_string(),
        };
        let prompt = style.prompt_for(&QuestionGenerator::default(), &fact("Rome is founded"));
        assert_eq!(
            prompt,
            "On what date did the following event occur?\n Rome is founded"
        );
        assert!(!style.uses_system_prompt());
        assert!(PromptStyle::Question.uses_system_prompt());
    }
}
