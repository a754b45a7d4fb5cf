//! Content policy filter — a synchronous keyword classifier that runs
//! before any model or tool invocation.
//!
//! Classification is two lists deep: anything matching the cessation
//! allow-list passes; otherwise the off-topic deny-list can refuse;
//! otherwise ambiguous messages pass through and the model's own system
//! policy is the second line of defense. A separate advisory post-check
//! re-scans the original question against known bypass pattern pairs
//! after the response is produced; it only logs.

use qc_domain::error::{Error, Result};
use regex::{Regex, RegexSet};

/// Classification of one inbound user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Allowed,
    Refused,
}

/// Smoking-cessation vocabulary. Any match wins outright.
const ALLOW_PATTERNS: &[&str] = &[
    r"(?i)\bsmok",       // smoke, smoking, smoker, smoke-free
    r"(?i)\bquit",       // quit, quitting
    r"(?i)\bcrav",       // craving, cravings, crave
    r"(?i)\bcigar",      // cigarette(s), cigar
    r"(?i)\bnicotine\b",
    r"(?i)\brelapse",
    r"(?i)\bwithdrawal\b",
    r"(?i)\btobacco\b",
    r"(?i)\bvap(e|ing|er)\b",
    r"(?i)\blungs?\b",
    r"(?i)\burge to\b",
    r"(?i)\bmilestone",
    r"(?i)\bcold turkey\b",
];

/// Off-topic signatures: geography, general knowledge, entertainment,
/// unrelated health, personal advice, technology.
const DENY_PATTERNS: &[&str] = &[
    r"(?i)\bcapital of\b",
    r"(?i)\bpopulation of\b",
    r"(?i)\bwho (won|is|was|invented)\b",
    r"(?i)\bweather\b",
    r"(?i)\btranslate\b",
    r"(?i)\b(movie|film|song|album|celebrity|tv show)\b",
    r"(?i)\brecipe\b",
    r"(?i)\b(football|soccer|basketball|tennis) (match|game|score)\b",
    r"(?i)\b(stocks?|bitcoin|crypto(currency)?)\b",
    r"(?i)\b(diabetes|blood pressure medication|migraine)\b",
    r"(?i)\b(girlfriend|boyfriend|marriage|divorce)\b",
    r"(?i)\b(python|javascript|rust code|write (me )?code|programming)\b",
];

/// Question/response pattern pairs for the advisory post-check: if the
/// original question matches the first and the answer matches the second,
/// the system policy was likely bypassed.
const POST_CHECK_PAIRS: &[(&str, &str, &str)] = &[
    ("geography", r"(?i)\bcapital of\b", r"(?i)\b(city|country|capital)\b"),
    ("general-knowledge", r"(?i)\bwho (won|is|was)\b", r"(?i)\b(winner|champion|president)\b"),
    ("weather", r"(?i)\bweather\b", r"(?i)\b(degrees|sunny|rain|forecast)\b"),
];

/// Precompiled filter, built once at startup and shared via `AppState`.
pub struct PolicyFilter {
    allow: RegexSet,
    deny: RegexSet,
    post_check: Vec<(&'static str, Regex, Regex)>,
}

impl PolicyFilter {
    pub fn new() -> Result<Self> {
        let compile = |patterns: &[&str]| {
            RegexSet::new(patterns).map_err(|e| Error::Config(format!("policy pattern: {e}")))
        };
        let post_check = POST_CHECK_PAIRS
            .iter()
            .map(|(label, q, a)| {
                Ok((
                    *label,
                    Regex::new(q).map_err(|e| Error::Config(format!("policy pattern: {e}")))?,
                    Regex::new(a).map_err(|e| Error::Config(format!("policy pattern: {e}")))?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            allow: compile(ALLOW_PATTERNS)?,
            deny: compile(DENY_PATTERNS)?,
            post_check,
        })
    }

    /// Classify one raw user message. Pure and synchronous; no I/O.
    pub fn classify(&self, text: &str) -> Scope {
        if self.allow.is_match(text) {
            return Scope::Allowed;
        }
        if self.deny.is_match(text) {
            return Scope::Refused;
        }
        Scope::Allowed
    }

    /// Advisory post-check: re-scan the ORIGINAL question against known
    /// bypass pairs. Returns the matched label; the caller only logs it —
    /// an already-streamed response is never retracted.
    pub fn post_check(&self, question: &str, answer: &str) -> Option<&'static str> {
        self.post_check
            .iter()
            .find(|(_, q, a)| q.is_match(question) && a.is_match(answer))
            .map(|(label, _, _)| *label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> PolicyFilter {
        PolicyFilter::new().unwrap()
    }

    #[test]
    fn cessation_vocabulary_is_allowed() {
        let f = filter();
        assert_eq!(f.classify("How do I deal with a craving right now?"), Scope::Allowed);
        assert_eq!(f.classify("I want to quit smoking"), Scope::Allowed);
        assert_eq!(f.classify("nicotine patches?"), Scope::Allowed);
        assert_eq!(f.classify("I'm afraid of a relapse tonight"), Scope::Allowed);
    }

    #[test]
    fn off_topic_questions_are_refused() {
        let f = filter();
        assert_eq!(f.classify("What is the capital of France?"), Scope::Refused);
        assert_eq!(f.classify("What's the weather tomorrow?"), Scope::Refused);
        assert_eq!(f.classify("Who won the world cup?"), Scope::Refused);
        assert_eq!(f.classify("Write me code in Python"), Scope::Refused);
    }

    #[test]
    fn allow_list_wins_over_deny_list() {
        // "capital of" would match the deny list, but the cessation term wins.
        let f = filter();
        assert_eq!(
            f.classify("What is the capital of France? Also, I quit smoking today."),
            Scope::Allowed
        );
    }

    #[test]
    fn ambiguous_messages_pass_through() {
        let f = filter();
        assert_eq!(f.classify("Hi, how are you?"), Scope::Allowed);
        assert_eq!(f.classify("I had a rough day"), Scope::Allowed);
    }

    #[test]
    fn post_check_flags_bypass_pairs() {
        let f = filter();
        assert_eq!(
            f.post_check("what is the capital of France?", "The capital city is Paris."),
            Some("geography")
        );
        assert_eq!(
            f.post_check("how do I handle a craving?", "Breathe slowly and drink water."),
            None
        );
    }
}
