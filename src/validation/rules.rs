// Rule interpreter - one pure check per rule kind

use lru::LruCache;
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::schema::{FieldValue, RuleKind, RuleParam, ValidationRule};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"));

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+]?[0-9]{10,15}$").expect("phone regex compiles"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s").expect("whitespace regex compiles"));

const DEFAULT_PATTERN_CACHE_CAPACITY: usize = 128;

static PATTERN_CACHE: OnceCell<PatternCache> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    Pass,
    Fail,
}

impl RuleOutcome {
    fn fail_if(condition: bool) -> Self {
        if condition {
            RuleOutcome::Fail
        } else {
            RuleOutcome::Pass
        }
    }
}

/// Bounded cache of compiled `pattern` sources. Sources that fail to compile
/// are cached as `None` so the warning is logged once per source.
pub struct PatternCache {
    inner: Mutex<LruCache<String, Option<Regex>>>,
}

impl PatternCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_PATTERN_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Does `source` match `text`? `None` when the source is not a valid regex.
    pub fn is_match(&self, source: &str, text: &str) -> Option<bool> {
        let mut cache = match self.inner.lock() {
            Ok(cache) => cache,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(compiled) = cache.get(source) {
            return compiled.as_ref().map(|regex| regex.is_match(text));
        }

        let compiled = match Regex::new(source) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!("Ignoring invalid validation pattern '{}': {}", source, err);
                None
            }
        };
        let outcome = compiled.as_ref().map(|regex| regex.is_match(text));
        cache.put(source.to_string(), compiled);
        outcome
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Size the process-wide pattern cache. Only the first call has an effect.
pub fn init_pattern_cache(capacity: usize) {
    if PATTERN_CACHE.set(PatternCache::new(capacity)).is_err() {
        debug!("Pattern cache already initialized");
    }
}

pub fn pattern_cache() -> &'static PatternCache {
    PATTERN_CACHE.get_or_init(|| PatternCache::new(DEFAULT_PATTERN_CACHE_CAPACITY))
}

pub fn is_valid_email(text: &str) -> bool {
    EMAIL_REGEX.is_match(text)
}

/// Digits with an optional leading `+`, 10 to 15 digits, whitespace ignored
pub fn is_valid_phone(text: &str) -> bool {
    PHONE_REGEX.is_match(&WHITESPACE.replace_all(text, ""))
}

fn bound(rule: &ValidationRule) -> Option<f64> {
    rule.value.as_ref().and_then(RuleParam::as_f64)
}

/// Evaluate one rule against a value.
///
/// Format and length rules only judge non-blank text; `min`/`max` only judge
/// values with a numeric reading. A rule missing its parameter passes.
pub fn evaluate(rule: &ValidationRule, value: Option<&FieldValue>) -> RuleOutcome {
    let text = value
        .map(FieldValue::to_display_string)
        .unwrap_or_default();
    let trimmed = text.trim();

    match rule.kind {
        RuleKind::Required => {
            RuleOutcome::fail_if(value.map(FieldValue::is_blank).unwrap_or(true))
        }
        RuleKind::Email => RuleOutcome::fail_if(!trimmed.is_empty() && !is_valid_email(trimmed)),
        RuleKind::Phone => RuleOutcome::fail_if(!trimmed.is_empty() && !is_valid_phone(trimmed)),
        RuleKind::MinLength => match bound(rule) {
            Some(min) => RuleOutcome::fail_if(
                !trimmed.is_empty() && (trimmed.chars().count() as f64) < min,
            ),
            None => RuleOutcome::Pass,
        },
        RuleKind::MaxLength => match bound(rule) {
            Some(max) => RuleOutcome::fail_if(
                !trimmed.is_empty() && (trimmed.chars().count() as f64) > max,
            ),
            None => RuleOutcome::Pass,
        },
        RuleKind::Pattern => {
            let source = match rule.value.as_ref() {
                Some(param) => param.as_source(),
                None => return RuleOutcome::Pass,
            };
            if trimmed.is_empty() {
                return RuleOutcome::Pass;
            }
            match pattern_cache().is_match(&source, trimmed) {
                Some(matched) => RuleOutcome::fail_if(!matched),
                None => RuleOutcome::Pass,
            }
        }
        RuleKind::Min => match (value.and_then(FieldValue::as_number), bound(rule)) {
            (Some(number), Some(min)) => RuleOutcome::fail_if(number < min),
            _ => RuleOutcome::Pass,
        },
        RuleKind::Max => match (value.and_then(FieldValue::as_number), bound(rule)) {
            (Some(number), Some(max)) => RuleOutcome::fail_if(number > max),
            _ => RuleOutcome::Pass,
        },
        RuleKind::Other(_) => RuleOutcome::Pass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::text(s)
    }

    #[test]
    fn test_phone_rule() {
        let rule = ValidationRule::phone("Invalid phone");
        assert_eq!(evaluate(&rule, Some(&text("+91 98765 43210"))), RuleOutcome::Pass);
        assert_eq!(evaluate(&rule, Some(&text("12345"))), RuleOutcome::Fail);
        assert_eq!(evaluate(&rule, Some(&text("98765-43210"))), RuleOutcome::Fail);
    }

    #[test]
    fn test_email_rule() {
        let rule = ValidationRule::email("Invalid email");
        assert_eq!(evaluate(&rule, Some(&text("a.b@example.com"))), RuleOutcome::Pass);
        assert_eq!(evaluate(&rule, Some(&text("a.b@example"))), RuleOutcome::Fail);
        assert_eq!(evaluate(&rule, Some(&text("  "))), RuleOutcome::Pass);
    }

    #[test]
    fn test_length_rules_use_trimmed_chars() {
        let min = ValidationRule::min_length(2, "short");
        let max = ValidationRule::max_length(3, "long");
        assert_eq!(evaluate(&min, Some(&text(" a "))), RuleOutcome::Fail);
        assert_eq!(evaluate(&min, Some(&text("äö"))), RuleOutcome::Pass);
        assert_eq!(evaluate(&max, Some(&text(" abc "))), RuleOutcome::Pass);
        assert_eq!(evaluate(&max, Some(&text("abcd"))), RuleOutcome::Fail);
    }

    #[test]
    fn test_numeric_bounds_skip_non_numeric() {
        let min = ValidationRule::min(18.0, "too young");
        assert_eq!(evaluate(&min, Some(&FieldValue::Number(17.0))), RuleOutcome::Fail);
        assert_eq!(evaluate(&min, Some(&text("21"))), RuleOutcome::Pass);
        assert_eq!(evaluate(&min, Some(&text("12"))), RuleOutcome::Fail);
        assert_eq!(evaluate(&min, Some(&text("twelve"))), RuleOutcome::Pass);
    }

    #[test]
    fn test_invalid_pattern_passes_and_is_cached() {
        let cache = PatternCache::new(4);
        assert_eq!(cache.is_match("([a-z", "abc"), None);
        assert_eq!(cache.is_match("^[a-z]+$", "abc"), Some(true));
        assert_eq!(cache.len(), 2);

        let rule = ValidationRule::pattern("([a-z", "bad pattern");
        assert_eq!(evaluate(&rule, Some(&text("abc"))), RuleOutcome::Pass);
    }

    #[test]
    fn test_pattern_cache_is_bounded() {
        let cache = PatternCache::new(2);
        cache.is_match("a", "a");
        cache.is_match("b", "b");
        cache.is_match("c", "c");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_required_rule() {
        let rule = ValidationRule::required("needed");
        assert_eq!(evaluate(&rule, None), RuleOutcome::Fail);
        assert_eq!(evaluate(&rule, Some(&FieldValue::Bool(false))), RuleOutcome::Fail);
        assert_eq!(evaluate(&rule, Some(&text("x"))), RuleOutcome::Pass);
    }

    #[test]
    fn test_unknown_rule_kind_passes() {
        let rule = ValidationRule::new(RuleKind::Other("luhn".to_string()), None, "Bad checksum");
        assert_eq!(evaluate(&rule, Some(&text("1234"))), RuleOutcome::Pass);
        assert_eq!(evaluate(&rule, None), RuleOutcome::Pass);
    }
}
