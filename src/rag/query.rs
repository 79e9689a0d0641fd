//! Query preprocessing: classification, follow-up rewriting and expansion
//!
//! Every heuristic here is an ordered rule table so a new pattern is a data
//! change. Nothing in this module performs I/O.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::models::ConversationTurn;
use crate::models::Role;

/// Queries longer than this are never treated as small talk
const MAX_CONVERSATIONAL_TOKENS: usize = 10;
/// Bare-pronoun queries up to this length are meta queries
const MAX_PRONOUN_META_TOKENS: usize = 3;
/// Queries shorter than this are assumed to lean on earlier turns
const SHORT_QUERY_TOKENS: usize = 5;
const MAX_CONTEXT_TERMS: usize = 3;
const CONTEXT_USER_TURNS: usize = 3;
const SYNONYMS_PER_GROUP: usize = 2;
const MAX_EXPANSION_TERMS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    ApiUsage,
    ApiDetails,
    Flow,
    Example,
    Troubleshooting,
    Parameters,
    General,
}

impl QueryIntent {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ApiUsage => "api_usage",
            Self::ApiDetails => "api_details",
            Self::Flow => "flow",
            Self::Example => "example",
            Self::Troubleshooting => "troubleshooting",
            Self::Parameters => "parameters",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    ApiEndpoint,
    ApiName,
    HttpMethod,
    StatusCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationType {
    Greeting,
    Gratitude,
    Farewell,
    Affirmation,
}

impl ConversationType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Gratitude => "gratitude",
            Self::Farewell => "farewell",
            Self::Affirmation => "affirmation",
        }
    }
}

/// Result of [`QueryPreprocessor::preprocess`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedQuery {
    /// The query exactly as the user sent it
    pub original_query: String,
    /// Query after follow-up rewriting, before expansion
    pub rewritten_query: String,
    /// Rewritten and expanded; this is what semantic search sees
    pub processed_query: String,
    pub intent: QueryIntent,
    /// Entity type to distinct matches in order of appearance; absent types are omitted
    pub entities: BTreeMap<EntityType, Vec<String>>,
    pub is_meta_query: bool,
    pub is_conversational: bool,
    pub conversation_type: Option<ConversationType>,
}

fn build(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex")
}

fn alternation(phrases: &[&str]) -> String {
    phrases
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|")
}

/// `\b`-anchored alternation over literal phrases
fn phrase_regex(phrases: &[&str]) -> Regex {
    build(&format!(r"(?i)\b(?:{})\b", alternation(phrases)))
}

/// Leading boundary only, so inflections ("errors", "cancelled") still match
fn prefix_regex(phrases: &[&str]) -> Regex {
    build(&format!(r"(?i)\b(?:{})", alternation(phrases)))
}

/// First match wins; order is priority
static INTENT_RULES: Lazy<Vec<(QueryIntent, Regex)>> = Lazy::new(|| {
    [
        (
            QueryIntent::ApiUsage,
            &["how to", "how do i", "how can i", "steps to", "way to"][..],
        ),
        (
            QueryIntent::ApiDetails,
            &["what is", "explain", "describe", "tell me about", "details of"][..],
        ),
        (
            QueryIntent::Flow,
            &["flow", "workflow", "process", "sequence", "lifecycle", "journey"][..],
        ),
        (
            QueryIntent::Example,
            &["example", "sample", "format", "structure", "template"][..],
        ),
        (
            QueryIntent::Troubleshooting,
            &["error", "issue", "problem", "not working", "fail"][..],
        ),
        (
            QueryIntent::Parameters,
            &["parameters", "fields", "attributes", "what to send"][..],
        ),
    ]
    .into_iter()
    .map(|(intent, keywords)| (intent, prefix_regex(keywords)))
    .collect()
});

struct ConversationRule {
    kind: ConversationType,
    pattern: Regex,
    /// Gratitude and farewells phrased as a question are real questions
    reject_questions: bool,
}

static CONVERSATION_RULES: Lazy<Vec<ConversationRule>> = Lazy::new(|| {
    vec![
        ConversationRule {
            kind: ConversationType::Greeting,
            pattern: build(
                r"(?i)^(?:hi+|hello+|hey+|hiya|howdy|greetings|namaste|good (?:morning|afternoon|evening|day))(?: there| team| all| everyone| bot)?[\s!.,:)]*$",
            ),
            reject_questions: false,
        },
        ConversationRule {
            kind: ConversationType::Gratitude,
            pattern: build(
                r"(?i)\b(?:thanks|thank you|thank u|thx|ty|many thanks|much appreciated|appreciate it|cheers)\b",
            ),
            reject_questions: true,
        },
        ConversationRule {
            kind: ConversationType::Farewell,
            pattern: build(
                r"(?i)\b(?:bye|goodbye|good bye|see you|see ya|take care|good night|that's all|that is all|talk later)\b",
            ),
            reject_questions: true,
        },
        ConversationRule {
            kind: ConversationType::Affirmation,
            pattern: build(
                r"(?i)^(?:ok(?:ay)?|k|sure|great|cool|nice|awesome|perfect|alright|all right|got it|understood|noted|makes sense|sounds good|yes|yep|yeah|fine)(?: then| thanks| thank you)?[\s!.,:)]*$",
            ),
            reject_questions: false,
        },
    ]
});

static META_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bsummari[sz]e\b",
        r"(?i)\belaborate\b",
        r"(?i)\btell me more\b",
        r"(?i)\bgive (?:me )?(?:an? )?example\b",
        r"(?i)\bbreak (?:it|this|that) down\b",
    ]
    .into_iter()
    .map(build)
    .collect()
});

static META_PRONOUN: Lazy<Regex> = Lazy::new(|| build(r"(?i)\b(?:it|this|that)\b"));

static FOLLOWUP_PRONOUN: Lazy<Regex> = Lazy::new(|| build(r"(?i)\b(?:it|this|that|they|them|its)\b"));

static FOLLOWUP_INDICATORS: Lazy<Regex> = Lazy::new(|| {
    phrase_regex(&[
        "what about",
        "how about",
        "and",
        "also",
        "that",
        "it",
        "this",
        "can you explain",
        "tell me more",
        "more details",
        "elaborate",
        "example",
        "show me",
    ])
});

/// Canonical action names; matching is case-insensitive
const API_NAMES: &[&str] = &[
    "Search", "Block", "Paid", "Cancel", "Assign", "Reassign", "Start", "Arrived", "Pickup",
    "Alight", "Detach", "Update",
];

static API_NAME: Lazy<Regex> = Lazy::new(|| phrase_regex(API_NAMES));

static API_NAME_OR_BOOKING: Lazy<Regex> = Lazy::new(|| {
    let mut names = API_NAMES.to_vec();
    names.push("Booking");
    phrase_regex(&names)
});

static ENDPOINT: Lazy<Regex> = Lazy::new(|| build(r"/\w+(?:/\w+)*"));

static HTTP_METHOD: Lazy<Regex> = Lazy::new(|| build(r"\b(?:GET|POST|PUT|DELETE|PATCH)\b"));

static STATUS_CODE: Lazy<Regex> = Lazy::new(|| build(r"\b(?:200|201|400|401|403|404|500)\b"));

static TOPIC_PHRASES: Lazy<Regex> = Lazy::new(|| {
    phrase_regex(&[
        "booking process",
        "booking flow",
        "payment flow",
        "payment process",
        "cancellation flow",
        "cancellation policy",
        "trip lifecycle",
        "driver assignment",
        "chauffeur assignment",
        "live tracking",
        "error handling",
        "authentication",
    ])
});

/// "what is X" / "how to X" question subjects, up to three words
static QUESTION_SUBJECT: Lazy<Regex> = Lazy::new(|| {
    build(
        r"(?i)\b(?:what is|what are|how to|how do i|how can i|explain)\s+(?:the\s+|a\s+|an\s+)?([a-z0-9_/]+(?:\s+[a-z0-9_/]+){0,2})",
    )
});

const SUBJECT_CONNECTIVES: &[&str] = &[
    "for", "with", "in", "of", "to", "on", "from", "and", "or", "when", "after", "before", "is",
    "are", "does", "do", "if",
];

/// Any member triggers the group; the first two are added
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["search", "find", "lookup", "query", "get fare", "check availability"],
    &["block", "hold", "reserve", "lock"],
    &["booking", "book", "reserve", "make reservation"],
    &["cancel", "cancellation", "remove", "delete booking"],
    &["payment", "pay", "paid", "transaction", "charge"],
    &["assign", "allocate", "attach", "map"],
    &["chauffeur", "driver", "cab driver", "vehicle driver"],
    &["tracking", "track", "location", "gps", "position"],
    &["start", "begin", "initiate", "commence"],
    &["pickup", "boarded", "passenger on board", "customer pickup"],
    &["drop", "alight", "dropoff", "destination reached"],
    &["flow", "workflow", "process", "sequence", "steps"],
    &["authentication", "auth", "api key", "credentials"],
    &["request", "payload", "input", "body"],
    &["response", "output", "result", "return"],
    &["endpoint", "api", "url", "path"],
    &["parameter", "param", "field", "attribute"],
];

static SYNONYM_MATCHERS: Lazy<Vec<Regex>> =
    Lazy::new(|| SYNONYM_GROUPS.iter().map(|group| prefix_regex(group)).collect());

fn intent_boost_terms(intent: QueryIntent) -> &'static [&'static str] {
    match intent {
        QueryIntent::Flow => &["steps", "sequence", "process"],
        QueryIntent::Example => &["request format", "response format", "sample"],
        QueryIntent::ApiUsage => &["implementation", "integration"],
        QueryIntent::Parameters => &["fields", "required", "optional"],
        _ => &[],
    }
}

fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Push `value` unless an equal entry (ignoring case) is already present
fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.iter().any(|v| v.eq_ignore_ascii_case(&value)) {
        values.push(value);
    }
}

/// Subject words up to the first connective: "payment flow for x" -> "payment flow"
fn question_subject(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .take_while(|w| !SUBJECT_CONNECTIVES.contains(&w.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn canonical_api_name(matched: &str) -> String {
    API_NAMES
        .iter()
        .find(|name| name.eq_ignore_ascii_case(matched))
        .map_or_else(|| matched.to_string(), |name| (*name).to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPreprocessor;

impl QueryPreprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Classify and rewrite `query`. `history` is the conversation so far,
    /// oldest first, not including `query` itself.
    pub fn preprocess(&self, query: &str, history: &[ConversationTurn]) -> ProcessedQuery {
        let conversation_type = self.detect_conversation(query);
        let is_conversational = conversation_type.is_some();
        let is_meta_query = !is_conversational && self.is_meta_query(query);

        let intent = self.detect_intent(query);
        let entities = self.extract_entities(query);

        let rewritten_query = self.rewrite_followup(query, history);
        let processed_query = self.expand_query(&rewritten_query, intent);

        info!(
            intent = intent.as_str(),
            is_meta_query,
            is_conversational,
            "Query preprocessing: entities={:?}",
            entities
        );

        ProcessedQuery {
            original_query: query.to_string(),
            rewritten_query,
            processed_query,
            intent,
            entities,
            is_meta_query,
            is_conversational,
            conversation_type,
        }
    }

    pub fn detect_conversation(&self, query: &str) -> Option<ConversationType> {
        let trimmed = query.trim();
        if trimmed.is_empty() || token_count(trimmed) > MAX_CONVERSATIONAL_TOKENS {
            return None;
        }

        let is_question = trimmed.contains('?');
        CONVERSATION_RULES
            .iter()
            .find(|rule| !(rule.reject_questions && is_question) && rule.pattern.is_match(trimmed))
            .map(|rule| rule.kind)
    }

    pub fn is_meta_query(&self, query: &str) -> bool {
        if META_PATTERNS.iter().any(|p| p.is_match(query)) {
            return true;
        }
        token_count(query) <= MAX_PRONOUN_META_TOKENS && META_PRONOUN.is_match(query)
    }

    pub fn detect_intent(&self, query: &str) -> QueryIntent {
        INTENT_RULES
            .iter()
            .find(|(_, pattern)| pattern.is_match(query))
            .map_or(QueryIntent::General, |(intent, _)| *intent)
    }

    pub fn extract_entities(&self, query: &str) -> BTreeMap<EntityType, Vec<String>> {
        let mut entities = BTreeMap::new();

        let mut collect = |entity_type: EntityType, values: Vec<String>| {
            let mut unique = Vec::new();
            for value in values {
                if !unique.contains(&value) {
                    unique.push(value);
                }
            }
            if !unique.is_empty() {
                entities.insert(entity_type, unique);
            }
        };

        collect(
            EntityType::ApiEndpoint,
            ENDPOINT.find_iter(query).map(|m| m.as_str().to_string()).collect(),
        );
        collect(
            EntityType::ApiName,
            API_NAME
                .find_iter(query)
                .map(|m| canonical_api_name(m.as_str()))
                .collect(),
        );
        collect(
            EntityType::HttpMethod,
            HTTP_METHOD.find_iter(query).map(|m| m.as_str().to_string()).collect(),
        );
        collect(
            EntityType::StatusCode,
            STATUS_CODE.find_iter(query).map(|m| m.as_str().to_string()).collect(),
        );

        entities
    }

    /// Append `" (context: ...)"` drawn from recent user turns when the
    /// query looks like a follow-up
    pub fn rewrite_followup(&self, query: &str, history: &[ConversationTurn]) -> String {
        if history.is_empty() {
            return query.to_string();
        }

        let looks_like_followup = FOLLOWUP_INDICATORS.is_match(query)
            || FOLLOWUP_PRONOUN.is_match(query)
            || token_count(query) < SHORT_QUERY_TOKENS;
        if !looks_like_followup {
            return query.to_string();
        }

        let recent_user_turns = history
            .iter()
            .rev()
            .filter(|turn| turn.role == Role::User)
            .take(CONTEXT_USER_TURNS);

        let mut phrases = Vec::new();
        let mut terms = Vec::new();
        for turn in recent_user_turns {
            let text = turn.content.as_str();
            for m in TOPIC_PHRASES.find_iter(text) {
                push_unique(&mut phrases, m.as_str().to_lowercase());
            }
            for caps in QUESTION_SUBJECT.captures_iter(text) {
                let subject = question_subject(&caps[1]);
                if token_count(&subject) > 1 {
                    push_unique(&mut phrases, subject);
                }
            }
            for m in API_NAME_OR_BOOKING.find_iter(text) {
                push_unique(&mut terms, m.as_str().to_lowercase());
            }
            for m in ENDPOINT.find_iter(text) {
                push_unique(&mut terms, m.as_str().to_string());
            }
        }

        let mut context_terms: Vec<String> = Vec::new();
        for phrase in phrases {
            push_unique(&mut context_terms, phrase);
        }
        for term in terms {
            let covered = context_terms
                .iter()
                .any(|c| c.split_whitespace().any(|w| w.eq_ignore_ascii_case(&term)));
            if !covered {
                push_unique(&mut context_terms, term);
            }
        }
        context_terms.truncate(MAX_CONTEXT_TERMS);

        if context_terms.is_empty() {
            return query.to_string();
        }

        let rewritten = format!("{query} (context: {})", context_terms.join(" "));
        info!("Rewrote follow-up query: '{}' -> '{}'", query, rewritten);
        rewritten
    }

    /// Append up to four synonym and intent terms to widen semantic recall
    pub fn expand_query(&self, query: &str, intent: QueryIntent) -> String {
        let mut expansion: Vec<String> = Vec::new();

        for (group, matcher) in SYNONYM_GROUPS.iter().zip(SYNONYM_MATCHERS.iter()) {
            if matcher.is_match(query) {
                for synonym in group.iter().take(SYNONYMS_PER_GROUP) {
                    push_unique(&mut expansion, (*synonym).to_string());
                }
            }
        }
        for term in intent_boost_terms(intent) {
            push_unique(&mut expansion, (*term).to_string());
        }
        expansion.truncate(MAX_EXPANSION_TERMS);

        if expansion.is_empty() {
            return query.to_string();
        }

        debug!("Expansion terms: {:?}", expansion);
        format!("{query} {}", expansion.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pre() -> QueryPreprocessor {
        QueryPreprocessor::new()
    }

    fn history(user_turns: &[&str]) -> Vec<ConversationTurn> {
        user_turns
            .iter()
            .flat_map(|q| {
                [
                    ConversationTurn::user(*q),
                    ConversationTurn::assistant("Here is what the guide says."),
                ]
            })
            .collect()
    }

    // ====== Conversational Detection ======

    #[test]
    fn test_conversational_families() {
        let p = pre();
        assert_eq!(p.detect_conversation("Hello!"), Some(ConversationType::Greeting));
        assert_eq!(p.detect_conversation("good morning team"), Some(ConversationType::Greeting));
        assert_eq!(
            p.detect_conversation("Thanks a lot, that helped"),
            Some(ConversationType::Gratitude)
        );
        assert_eq!(p.detect_conversation("ok bye"), Some(ConversationType::Farewell));
        assert_eq!(p.detect_conversation("got it"), Some(ConversationType::Affirmation));
    }

    #[test]
    fn test_questions_are_not_small_talk() {
        let p = pre();
        assert_eq!(p.detect_conversation("Hi, how do I call the search API?"), None);
        assert_eq!(p.detect_conversation("thanks, but what about cancel?"), None);
        assert_eq!(
            p.detect_conversation(
                "thanks for that, now please walk me through every single step of the booking flow"
            ),
            None
        );
    }

    #[test]
    fn test_conversational_short_circuits_meta() {
        let processed = pre().preprocess("got it", &[]);
        assert!(processed.is_conversational);
        assert_eq!(processed.conversation_type, Some(ConversationType::Affirmation));
        assert!(!processed.is_meta_query);
    }

    // ====== Meta Queries ======

    #[test]
    fn test_meta_queries() {
        let p = pre();
        assert!(p.is_meta_query("summarize that"));
        assert!(p.is_meta_query("tell me more"));
        assert!(p.is_meta_query("it"));
        assert!(p.is_meta_query("Can you give me an example?"));
        assert!(p.is_meta_query("please break it down"));
        assert!(p.is_meta_query("what is that"));
        assert!(!p.is_meta_query("How do I call the search API?"));
        assert!(!p.is_meta_query("what does it return for a one way trip"));
    }

    // ====== Intent ======

    #[test]
    fn test_intent_priority_order() {
        let p = pre();
        assert_eq!(p.detect_intent("What is the Block API?"), QueryIntent::ApiDetails);
        assert_eq!(p.detect_intent("How do I cancel a booking?"), QueryIntent::ApiUsage);
        // api_usage is checked before flow
        assert_eq!(p.detect_intent("how to follow the booking flow"), QueryIntent::ApiUsage);
        assert_eq!(p.detect_intent("booking lifecycle"), QueryIntent::Flow);
        assert_eq!(p.detect_intent("sample search response"), QueryIntent::Example);
        assert_eq!(p.detect_intent("getting errors on block"), QueryIntent::Troubleshooting);
        assert_eq!(p.detect_intent("mandatory fields for paid"), QueryIntent::Parameters);
        assert_eq!(p.detect_intent("partner onboarding"), QueryIntent::General);
    }

    #[test]
    fn test_intent_needs_word_start() {
        // "format" inside "information" is not an example request
        assert_eq!(pre().detect_intent("driver information"), QueryIntent::General);
    }

    // ====== Entities ======

    #[test]
    fn test_extract_entities() {
        let entities =
            pre().extract_entities("POST to /partnerblock after search; block returns 200 or 400, block again");

        assert_eq!(entities[&EntityType::ApiEndpoint], vec!["/partnerblock"]);
        assert_eq!(entities[&EntityType::ApiName], vec!["Search", "Block"]);
        assert_eq!(entities[&EntityType::HttpMethod], vec!["POST"]);
        assert_eq!(entities[&EntityType::StatusCode], vec!["200", "400"]);
    }

    #[test]
    fn test_absent_entity_types_omitted() {
        let entities = pre().extract_entities("how does the traveller get notified");
        assert!(entities.is_empty());
    }

    // ====== Follow-up Rewriting ======

    #[test]
    fn test_followup_rewrite_uses_recent_user_turns() {
        let history = history(&["What is the Block API?"]);
        let rewritten = pre().rewrite_followup("what about its response?", &history);
        assert_eq!(rewritten, "what about its response? (context: block api)");
    }

    #[test]
    fn test_followup_phrases_before_terms_and_capped() {
        let history = history(&[
            "Explain the payment flow for /partnerpaid",
            "How does Cancel work with Reassign",
        ]);
        let rewritten = pre().rewrite_followup("and refunds?", &history);
        assert_eq!(
            rewritten,
            "and refunds? (context: payment flow cancel reassign)"
        );
    }

    #[test]
    fn test_followup_passthrough() {
        let p = pre();
        assert_eq!(p.rewrite_followup("and then?", &[]), "and then?");

        let block_history = history(&["What is the Block API?"]);
        let standalone = "Which fields are mandatory in the search request payload";
        assert_eq!(p.rewrite_followup(standalone, &block_history), standalone);

        let no_terms = history(&["hello there"]);
        assert_eq!(p.rewrite_followup("what next", &no_terms), "what next");
    }

    // ====== Expansion ======

    #[test]
    fn test_expand_query_caps_and_dedups() {
        let expanded = pre().expand_query("block booking flow", QueryIntent::Flow);
        // block -> block hold, booking -> booking book, flow group cut by cap
        assert_eq!(expanded, "block booking flow block hold booking book");
    }

    #[test]
    fn test_expand_query_matches_inflected_terms() {
        let p = pre();
        assert_eq!(
            p.expand_query("cancelled bookings", QueryIntent::General),
            "cancelled bookings booking book cancel cancellation"
        );
        assert_eq!(
            p.expand_query("refund for payments", QueryIntent::General),
            "refund for payments payment pay"
        );
        // Word start is still required
        assert_eq!(p.expand_query("unblocked", QueryIntent::General), "unblocked");
    }

    #[test]
    fn test_rule_tables_compile() {
        assert_eq!(INTENT_RULES.len(), 6);
        assert_eq!(SYNONYM_MATCHERS.len(), SYNONYM_GROUPS.len());
        assert_eq!(CONVERSATION_RULES.len(), 4);
        assert!(!META_PATTERNS.is_empty());
        assert!(API_NAME.is_match("block"));
        assert!(ENDPOINT.is_match("/partnerblock"));
    }

    #[test]
    fn test_expand_query_intent_boost_only() {
        assert_eq!(
            pre().expand_query("vendor onboarding", QueryIntent::ApiUsage),
            "vendor onboarding implementation integration"
        );
        assert_eq!(
            pre().expand_query("vendor onboarding", QueryIntent::General),
            "vendor onboarding"
        );
    }

    #[test]
    fn test_preprocess_end_to_end() {
        let processed = pre().preprocess("What is the Block API?", &[]);
        assert_eq!(processed.original_query, "What is the Block API?");
        assert_eq!(processed.rewritten_query, "What is the Block API?");
        assert_eq!(processed.intent, QueryIntent::ApiDetails);
        assert!(!processed.is_meta_query);
        assert!(!processed.is_conversational);
        assert!(processed.processed_query.starts_with("What is the Block API? "));
        assert_eq!(processed.entities[&EntityType::ApiName], vec!["Block"]);
    }
}
