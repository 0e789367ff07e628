//! Ordered classification rules.
//!
//! Rules are evaluated top-to-bottom and the first match wins, so narrow
//! patterns sit above broad ones:
//! - steps (digit run + step/walk keyword) → before meals, so
//!   "20000 steps after lunch" is a step log
//! - workouts, alcohol → before meals
//! - meals → before ingredients/groceries
//! - finance, wardrobe, travel
//! - anything else → journal
//!
//! Classification never fails; it is a pure function of the text, the
//! clock and the configured timezone.

use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use tracing::debug;

use crate::pipeline::render::{render_html, render_title};
use crate::pipeline::types::{Category, RoutedMessage};

/// Name reported by [`Classifier::explain`] when no rule matched.
pub const FALLBACK_RULE: &str = "journal-fallback";

/// A run of 3–6 ASCII digits, optionally with one thousands separator.
const MAGNITUDE: &str = r"([0-9]{1,3},[0-9]{3}|[0-9]{3,6})";

/// How a matched rule derives the page payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Extract a step count adjacent to the keyword; `"0"` if none.
    StepCount,
    /// Use the original text.
    Text,
}

/// A single classification rule with a compiled regex.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    /// Rule name, for logs and the dry-run API.
    pub name: &'static str,
    /// Compiled, case-insensitive matcher.
    pub regex: Regex,
    /// Category assigned on match.
    pub category: Category,
    /// Payload builder.
    pub payload: PayloadKind,
}

impl ClassificationRule {
    fn new(name: &'static str, pattern: &str, category: Category, payload: PayloadKind) -> Self {
        Self {
            name,
            regex: compile(name, pattern),
            category,
            payload,
        }
    }
}

/// Compile a built-in pattern. Built-in patterns are covered by tests.
fn compile(name: &str, pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(e) => panic!("built-in pattern {name} failed to compile: {e}"),
    }
}

/// Step-count extraction around the step keywords.
#[derive(Debug, Clone)]
struct StepExtractor {
    /// `12,345 steps`
    before_keyword: Regex,
    /// `walked 12345`, `steps: 8000`
    after_keyword: Regex,
}

impl StepExtractor {
    fn new() -> Self {
        Self {
            before_keyword: compile(
                "steps-before",
                &format!(r"(?i)(?:^|[^0-9,.]){MAGNITUDE}\s*steps?\b"),
            ),
            after_keyword: compile(
                "steps-after",
                &format!(r"(?i)\b(?:steps?|walk(?:ed|ing)?)\s*[:=]?\s*{MAGNITUDE}(?:$|[^0-9,])"),
            ),
        }
    }

    /// First magnitude adjacent to a step keyword, separators stripped.
    fn extract(&self, text: &str) -> String {
        [&self.before_keyword, &self.after_keyword]
            .iter()
            .filter_map(|re| re.captures(text).and_then(|c| c.get(1)))
            .min_by_key(|m| m.start())
            .map(|m| m.as_str().replace(',', ""))
            .unwrap_or_else(|| "0".to_string())
    }
}

/// Deterministic text → [`RoutedMessage`] classifier.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
    steps: StepExtractor,
    timezone: FixedOffset,
}

impl Classifier {
    /// Create a classifier with the built-in rule table.
    pub fn new(timezone: FixedOffset) -> Self {
        Self {
            rules: default_rules(),
            steps: StepExtractor::new(),
            timezone,
        }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Classify using the current time.
    pub fn classify(&self, text: &str) -> RoutedMessage {
        self.classify_at(text, Utc::now())
    }

    /// Classify with an explicit clock.
    pub fn classify_at(&self, text: &str, now: DateTime<Utc>) -> RoutedMessage {
        let at = now.with_timezone(&self.timezone);
        let trimmed = text.trim();

        let (category, payload_kind) = match self.matching_rule(trimmed) {
            Some(rule) => (rule.category, rule.payload),
            None => (Category::Journal, PayloadKind::Text),
        };

        let (payload, magnitude) = match payload_kind {
            PayloadKind::StepCount => {
                let count = self.steps.extract(trimmed);
                (count.clone(), Some(count))
            }
            PayloadKind::Text => (trimmed.to_string(), None),
        };

        RoutedMessage {
            category,
            title_prefix: category.prefix().to_string(),
            title: render_title(category, &payload, &at),
            html: render_html(category, trimmed, magnitude.as_deref()),
            section: category.section_name().to_string(),
            payload,
            classified_at: at.to_rfc3339(),
        }
    }

    /// Name of the rule that decides `text`.
    pub fn explain(&self, text: &str) -> &'static str {
        self.matching_rule(text.trim())
            .map(|rule| rule.name)
            .unwrap_or(FALLBACK_RULE)
    }

    fn matching_rule(&self, text: &str) -> Option<&ClassificationRule> {
        let rule = self.rules.iter().find(|rule| rule.regex.is_match(text));
        match rule {
            Some(rule) => debug!(rule = rule.name, category = %rule.category, "Message matched rule"),
            None => debug!("No rule matched, falling back to journal"),
        }
        rule
    }
}

/// The canonical rule table, in priority order.
pub fn default_rules() -> Vec<ClassificationRule> {
    vec![
        ClassificationRule::new(
            "steps",
            r"(?i)\b(?:steps?|walk(?:ed|ing)?)\b",
            Category::Steps,
            PayloadKind::StepCount,
        ),
        ClassificationRule::new(
            "workout",
            r"(?i)\b(?:work(?:ed)?\s?out|workouts?|gym|running|jog(?:ged|ging)?|(?:ran|run)\s+\d+(?:\.\d+)?\s*(?:k|km|mi|miles?)?|yoga|pilates|swim(?:ming)?|swam|cycl(?:ed|ing)|lift(?:ed|ing)|squats?|deadlifts?|bench press|push-?ups?|pull-?ups?|planks?|cardio|hiit)\b",
            Category::Workout,
            PayloadKind::Text,
        ),
        ClassificationRule::new(
            "alcohol",
            r"(?i)\b(?:beers?|wine|whisk(?:e)?y|bourbon|scotch|sake|shochu|cocktails?|vodka|gin|rum|tequila|highballs?|ipa|lager|champagne|prosecco|hangover|drank|drinks)\b",
            Category::Alcohol,
            PayloadKind::Text,
        ),
        ClassificationRule::new(
            "meal",
            r"(?i)\b(?:breakfast|brunch|lunch|dinner|supper|snacks?|meals?|ate|eat(?:ing)?|food|restaurant|ramen|sushi|pizza|burgers?|salad|sandwich|curry|pasta|coffee|latte)\b",
            Category::Meal,
            PayloadKind::Text,
        ),
        ClassificationRule::new(
            "ingredients",
            r"(?i)\b(?:groceries|grocery|ingredients?|supermarket|pantry|fridge|recipe|shopping list)\b",
            Category::Ingredients,
            PayloadKind::Text,
        ),
        ClassificationRule::new(
            "finance",
            r"(?i)(?:[$€£¥]\s?\d|\d\s?(?:usd|eur|gbp|jpy|yen|dollars?|bucks)\b|\b(?:paid|spent|expenses?|invoice|salary|budget|rent|bills?|refund(?:ed)?|transfer(?:red)?|savings|invest(?:ed|ment)?)\b)",
            Category::Finance,
            PayloadKind::Text,
        ),
        ClassificationRule::new(
            "wardrobe",
            r"(?i)\b(?:shirts?|t-shirts?|pants|jeans|jackets?|coats?|shoes|sneakers|boots|dress|skirt|outfit|wardrobe|wore|wearing|hoodie|sweater|socks|scarf)\b",
            Category::Wardrobe,
            PayloadKind::Text,
        ),
        ClassificationRule::new(
            "travel",
            r"(?i)\b(?:flights?|airport|hotel|trains?|trip|travel(?:ing|led|ling)?|boarding|itinerary|passport|station|airbnb|check-?in|vacation|holiday)\b",
            Category::Travel,
            PayloadKind::Text,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(FixedOffset::east_opt(9 * 3600).unwrap())
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    fn category_of(text: &str) -> Category {
        classifier().classify_at(text, fixed_now()).category
    }

    #[test]
    fn built_in_rules_compile_in_priority_order() {
        let c = classifier();
        let order: Vec<Category> = c.rules().iter().map(|r| r.category).collect();
        assert_eq!(order, Category::ALL[..Category::ALL.len() - 1].to_vec());
    }

    #[test]
    fn steps_with_thousands_separator() {
        let routed = classifier().classify_at("walked 12,345 steps today", fixed_now());
        assert_eq!(routed.category, Category::Steps);
        assert_eq!(routed.payload, "12345");
        assert!(routed.html.contains("<b>12345</b>"));
    }

    #[test]
    fn steps_number_after_keyword() {
        let routed = classifier().classify_at("Steps: 8000", fixed_now());
        assert_eq!(routed.category, Category::Steps);
        assert_eq!(routed.payload, "8000");
    }

    #[test]
    fn steps_keyword_without_number_defaults_to_zero() {
        let routed = classifier().classify_at("walked to the station", fixed_now());
        assert_eq!(routed.category, Category::Steps);
        assert_eq!(routed.payload, "0");
        assert!(routed.title.starts_with("[STEPS] 0 ("));
    }

    #[test]
    fn seven_digit_run_is_not_a_step_count() {
        let routed = classifier().classify_at("1234567 steps", fixed_now());
        assert_eq!(routed.category, Category::Steps);
        assert_eq!(routed.payload, "0");
    }

    #[test]
    fn non_ascii_digits_are_not_a_step_count() {
        // Arabic-Indic 12345
        let text = "walked \u{0661}\u{0662}\u{0663}\u{0664}\u{0665} steps";
        let routed = classifier().classify_at(text, fixed_now());
        assert_eq!(routed.category, Category::Steps);
        assert_eq!(routed.payload, "0");
        assert!(routed.title.starts_with("[STEPS] 0 ("));
    }

    #[test]
    fn steps_checked_before_meals() {
        // Both patterns match; steps is higher in the table.
        assert_eq!(category_of("20000 steps after lunch"), Category::Steps);
        let routed = classifier().classify_at("ate lunch then walked 5000 steps", fixed_now());
        assert_eq!(routed.category, Category::Steps);
        assert_eq!(routed.payload, "5000");
    }

    #[test]
    fn first_adjacent_magnitude_wins() {
        let routed = classifier().classify_at("9,000 steps yesterday, 11000 steps today", fixed_now());
        assert_eq!(routed.payload, "9000");
    }

    #[test]
    fn whisky_is_alcohol() {
        let routed = classifier().classify_at("whisky tasting with friends", fixed_now());
        assert_eq!(routed.category, Category::Alcohol);
        assert_eq!(routed.title_prefix, "ALCOHOL");
        assert!(routed.title.starts_with("[ALCOHOL] whisky tasting with friends ("));
    }

    #[test]
    fn alcohol_checked_before_meals() {
        assert_eq!(category_of("wine with dinner"), Category::Alcohol);
    }

    #[test]
    fn no_keywords_falls_through_to_journal() {
        let routed = classifier().classify_at("just thinking about nothing", fixed_now());
        assert_eq!(routed.category, Category::Journal);
        assert_eq!(routed.title_prefix, "JOURNAL");
        assert_eq!(routed.section, "Journal - Inbox");
    }

    #[test]
    fn empty_input_is_journal() {
        let routed = classifier().classify_at("", fixed_now());
        assert_eq!(routed.category, Category::Journal);
        assert!(routed.title.starts_with("[JOURNAL] (empty) ("));
    }

    #[test]
    fn representative_categories() {
        assert_eq!(category_of("30 min yoga"), Category::Workout);
        assert_eq!(category_of("gym: bench press 60kg"), Category::Workout);
        assert_eq!(category_of("ramen for dinner"), Category::Meal);
        assert_eq!(category_of("need groceries: eggs, milk"), Category::Ingredients);
        assert_eq!(category_of("paid rent"), Category::Finance);
        assert_eq!(category_of("$45 parking"), Category::Finance);
        assert_eq!(category_of("new sneakers arrived"), Category::Wardrobe);
        assert_eq!(category_of("flight to Osaka at 9"), Category::Travel);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(category_of("WHISKY NIGHT"), Category::Alcohol);
        assert_eq!(category_of("Walked 4,200 STEPS"), Category::Steps);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // "gin" inside "beginning", "rum" inside "drum"
        assert_eq!(category_of("beginning drum practice"), Category::Journal);
    }

    #[test]
    fn title_uses_configured_timezone() {
        // 03:04:05 UTC is 12:04:05 at +09:00
        let routed = classifier().classify_at("paid rent", fixed_now());
        assert_eq!(routed.title, "[FINANCE] paid rent (2026-01-02 12:04:05)");
        assert_eq!(routed.classified_at, "2026-01-02T12:04:05+09:00");
    }

    #[test]
    fn title_and_html_carry_escaped_text() {
        let routed = classifier().classify_at("dinner at <Tom & Jerry's>", fixed_now());
        let escaped = "dinner at &lt;Tom &amp; Jerry&#39;s&gt;";
        assert_eq!(routed.category, Category::Meal);
        assert!(routed.title.contains(escaped));
        assert!(routed.html.contains(escaped));
        assert!(!routed.title.contains('<'));
        assert!(!routed.html.contains("<Tom"));
    }

    #[test]
    fn explain_reports_rule_name() {
        let c = classifier();
        assert_eq!(c.explain("whisky tasting"), "alcohol");
        assert_eq!(c.explain("hmm"), FALLBACK_RULE);
    }

    #[test]
    fn classification_is_deterministic() {
        let c = classifier();
        let a = c.classify_at("bought a jacket for $80", fixed_now());
        let b = c.classify_at("bought a jacket for $80", fixed_now());
        assert_eq!(a, b);
        // finance sits above wardrobe
        assert_eq!(a.category, Category::Finance);
    }
}
