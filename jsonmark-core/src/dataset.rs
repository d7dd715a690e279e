// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Deterministic synthetic dataset generation.
//!
//! A [`FieldSource`] owns two ChaCha8 streams derived from one seed: stream 0
//! feeds integer fields only, stream 1 feeds everything else. Because the
//! checksum is a sum over integer fields, it depends on nothing but the seed
//! and the record count, whatever the text generators draw.
//!
//! [`Dataset`] yields records lazily so the corpus can be streamed to disk
//! without materializing it in memory.

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Inclusive bounds for integer fields.
pub const INTEGER_MIN: i64 = -1000;
pub const INTEGER_MAX: i64 = 1000;

/// Half-open bounds for float fields.
const FLOAT_MIN: f64 = -1000.0;
const FLOAT_MAX: f64 = 1000.0;

/// 2000-01-01T00:00:00Z
const DATETIME_MIN: i64 = 946_684_800;
/// 2030-12-31T23:59:59Z
const DATETIME_MAX: i64 = 1_924_991_999;

/// Layout of the `datetime` field.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S %Z";

const WORDS_PER_LIST: usize = 5;
const SENTENCE_MIN_WORDS: usize = 6;
const SENTENCE_MAX_WORDS: usize = 12;

const WORD_LIST: &[&str] = &[
    "able", "account", "across", "action", "active", "actually", "address", "admit", "adult",
    "affect", "agency", "agent", "agree", "ahead", "allow", "almost", "already", "amount",
    "analysis", "animal", "answer", "anyone", "appear", "apply", "approach", "argue", "around",
    "arrive", "article", "artist", "assume", "attack", "author", "avoid", "beautiful", "become",
    "before", "begin", "behavior", "believe", "benefit", "better", "beyond", "billion", "board",
    "bring", "budget", "build", "business", "camera", "campaign", "cancer", "capital", "career",
    "carry", "catch", "center", "central", "century", "certain", "chair", "challenge", "chance",
    "change", "character", "choice", "citizen", "civil", "claim", "class", "clear", "close",
    "coach", "collection", "college", "common", "community", "company", "compare", "computer",
    "concern", "condition", "conference", "consider", "consumer", "contain", "continue",
    "control", "country", "couple", "course", "court", "cover", "create", "crime", "cultural",
    "culture", "current", "customer", "daughter", "debate", "decade", "decide", "decision",
    "defense", "degree", "democrat", "describe", "design", "detail", "determine", "develop",
    "difference", "difficult", "dinner", "direction", "director", "discover", "discuss",
    "disease", "doctor", "dream", "during", "early", "economic", "economy", "edge", "education",
    "effect", "effort", "eight", "either", "election", "employee", "energy", "enjoy", "enough",
    "enter", "entire", "environment", "especially", "establish", "evening", "event", "evidence",
    "exactly", "example", "executive", "expect", "experience", "expert", "explain", "factor",
    "family", "father", "feeling", "field", "figure", "final", "finally", "financial", "finger",
    "finish", "first", "floor", "focus", "follow", "force", "foreign", "forget", "former",
    "forward", "friend", "front", "future", "garden", "general", "generation", "glass",
    "government",
    "great", "green", "ground", "group", "growth", "guess", "happen", "health", "heart", "heavy",
    "history", "hospital", "hotel", "however", "huge", "human", "hundred", "husband", "idea",
    "image", "imagine", "impact", "important", "improve", "include", "increase", "indeed",
    "indicate", "individual", "industry", "information", "inside", "instead", "interest",
    "interview", "investment", "issue", "itself", "journey", "judge", "kitchen", "knowledge",
    "language", "large", "later", "laugh", "lawyer", "leader", "learn", "least", "leave", "legal",
    "letter", "level", "light", "likely", "listen", "little", "local", "machine", "magazine",
    "maintain", "major", "manage", "market", "material", "matter", "maybe", "measure", "media",
    "medical", "meeting", "member", "memory", "mention", "message", "method", "middle", "military",
    "million", "minute", "mission", "model", "modern", "moment", "money", "morning", "mother",
    "movement", "music", "myself", "nation", "natural", "nature", "network", "never", "newspaper",
    "night", "north", "nothing", "notice", "number", "occur", "office", "officer", "official",
    "often", "operation", "opportunity", "option", "order", "organization", "others", "owner",
    "painting", "paper", "parent", "particular", "partner", "patient", "pattern", "peace",
    "people", "perform", "perhaps", "period", "person", "physical", "picture", "piece", "place",
    "planet", "player", "point", "police", "policy", "political", "popular", "population",
    "position", "positive", "possible", "power", "practice", "prepare", "present", "president",
    "pressure", "pretty", "prevent", "price", "private", "probably", "problem", "process",
    "produce", "product", "professor", "program", "project", "property", "protect", "provide",
    "public", "purpose", "quality", "question", "quickly", "quite", "radio", "raise", "range",
    "rather", "reach", "ready", "reality", "realize", "reason", "receive", "recent", "record",
    "reduce", "reflect", "region", "relate", "remain", "remember", "report", "represent",
    "require", "research", "resource", "respond", "result", "return", "reveal", "right", "river",
    "science", "scientist", "season", "second", "section", "security", "senior", "sense",
    "series", "serious", "service", "several", "shake", "share", "short", "shoulder", "significant",
    "similar", "simple", "simply", "single", "sister", "situation", "skill", "small", "social",
    "society", "soldier", "somebody", "source", "south", "space", "speak", "special", "specific",
    "spend", "sport", "spring", "staff", "stage", "standard", "start", "state", "station", "still",
    "stock", "story", "strategy", "street", "strong", "student", "study", "stuff", "style",
    "subject", "success", "suddenly", "suggest", "summer", "support", "surface", "system",
    "table", "tennis", "technology", "television", "tend", "theory", "thing", "third", "thought",
    "thousand", "threat", "through", "throughout", "today", "together", "tonight", "total",
    "tough", "toward", "trade", "traditional", "training", "travel", "treatment", "trial",
    "trouble", "truth", "under", "understand", "until", "upon", "usually", "value", "various",
    "victim", "violence", "visit", "voice", "watch", "water", "weapon", "weight", "western",
    "whatever", "whether", "window", "within", "without", "woman", "wonder", "worker", "world",
    "worry", "write", "writer", "wrong", "yard", "yeah", "year", "young", "yourself",
];

/// A geographic coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

/// One generated record. Field declaration order is the serialized order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub integer_1: i64,
    pub integer_2: i64,
    pub float_1: f64,
    pub float_2: f64,
    #[serde(rename = "bool")]
    pub flag: bool,
    pub words: Vec<String>,
    #[serde(rename = "str")]
    pub sentence: String,
    pub datetime: String,
    pub coordinates: Coordinates,
    pub null: (),
}

impl Record {
    /// The checksum contribution of this record.
    pub fn checksum_term(&self) -> i64 {
        self.integer_1.wrapping_add(self.integer_2)
    }
}

/// Produces one record per call from a field source.
pub type Schema = fn(&mut FieldSource) -> Record;

/// Seeded field generators.
#[derive(Debug, Clone)]
pub struct FieldSource {
    integers: ChaCha8Rng,
    text: ChaCha8Rng,
}

impl FieldSource {
    /// Create a field source from a seed.
    pub fn new(seed: u64) -> Self {
        let integers = ChaCha8Rng::seed_from_u64(seed);
        let mut text = ChaCha8Rng::seed_from_u64(seed);
        text.set_stream(1);
        Self { integers, text }
    }

    pub fn integer_number(&mut self) -> i64 {
        self.integers.gen_range(INTEGER_MIN..=INTEGER_MAX)
    }

    pub fn float_number(&mut self) -> f64 {
        self.text.gen_range(FLOAT_MIN..FLOAT_MAX)
    }

    pub fn boolean(&mut self) -> bool {
        self.text.gen_bool(0.5)
    }

    fn word(&mut self) -> &'static str {
        WORD_LIST[self.text.gen_range(0..WORD_LIST.len())]
    }

    /// A fixed-size list of random words.
    pub fn words(&mut self) -> Vec<String> {
        (0..WORDS_PER_LIST).map(|_| self.word().to_string()).collect()
    }

    /// A capitalized sentence terminated by a period.
    pub fn sentence(&mut self) -> String {
        let count = self.text.gen_range(SENTENCE_MIN_WORDS..=SENTENCE_MAX_WORDS);
        let mut sentence = String::new();
        for i in 0..count {
            let word = self.word();
            if i == 0 {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    sentence.push(first.to_ascii_uppercase());
                    sentence.push_str(chars.as_str());
                }
            } else {
                sentence.push(' ');
                sentence.push_str(word);
            }
        }
        sentence.push('.');
        sentence
    }

    pub fn formatted_datetime(&mut self) -> String {
        let secs = self.text.gen_range(DATETIME_MIN..=DATETIME_MAX);
        let timestamp: DateTime<Utc> = DateTime::from_timestamp(secs, 0).unwrap_or_default();
        timestamp.format(DATETIME_FORMAT).to_string()
    }

    pub fn coordinates(&mut self) -> Coordinates {
        Coordinates {
            longitude: self.text.gen_range(-180.0..180.0),
            latitude: self.text.gen_range(-90.0..90.0),
        }
    }
}

/// The record layout shared by the built-in benchmarks.
pub fn simple_schema(source: &mut FieldSource) -> Record {
    Record {
        integer_1: source.integer_number(),
        integer_2: source.integer_number(),
        float_1: source.float_number(),
        float_2: source.float_number(),
        flag: source.boolean(),
        words: source.words(),
        sentence: source.sentence(),
        datetime: source.formatted_datetime(),
        coordinates: source.coordinates(),
        null: (),
    }
}

/// Lazy, non-restartable sequence of generated records.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: Schema,
    source: FieldSource,
    remaining: u64,
}

impl Iterator for Dataset {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some((self.schema)(&mut self.source))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Dataset {}

/// Generate `iterations` records from `schema`, seeded with `seed`.
pub fn generate(schema: Schema, iterations: u64, seed: u64) -> Dataset {
    Dataset {
        schema,
        source: FieldSource::new(seed),
        remaining: iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_deterministic() {
        let first: Vec<Record> = generate(simple_schema, 100, 42).collect();
        let second: Vec<Record> = generate(simple_schema, 100, 42).collect();
        assert_eq!(first.len(), 100);
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a: Vec<Record> = generate(simple_schema, 10, 1).collect();
        let b: Vec<Record> = generate(simple_schema, 10, 2).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_prefix_is_stable_across_lengths() {
        let short: Vec<Record> = generate(simple_schema, 5, 42).collect();
        let long: Vec<Record> = generate(simple_schema, 50, 42).take(5).collect();
        assert_eq!(short, long);
    }

    #[test]
    fn test_first_record_integers_pinned() {
        let record = generate(simple_schema, 1, 42).next().unwrap();
        assert_eq!((record.integer_1, record.integer_2), (364, 901));
    }

    #[test]
    fn test_ten_record_checksum_pinned() {
        let total: i64 = generate(simple_schema, 10, 42)
            .map(|r| r.checksum_term())
            .sum();
        assert_eq!(total, 764);
    }

    #[test]
    fn test_field_ranges() {
        for record in generate(simple_schema, 500, 7) {
            assert!((INTEGER_MIN..=INTEGER_MAX).contains(&record.integer_1));
            assert!((INTEGER_MIN..=INTEGER_MAX).contains(&record.integer_2));
            assert!((-1000.0..1000.0).contains(&record.float_1));
            assert!((-180.0..180.0).contains(&record.coordinates.longitude));
            assert!((-90.0..90.0).contains(&record.coordinates.latitude));
            assert_eq!(record.words.len(), WORDS_PER_LIST);
            assert!(record.sentence.ends_with('.'));
            assert!(record.sentence.starts_with(|c: char| c.is_ascii_uppercase()));
            assert!(record.datetime.ends_with(" UTC"));
            assert_eq!(record.datetime.len(), "2000-01-01T00:00:00 UTC".len());
        }
    }

    #[test]
    fn test_exact_size() {
        let mut dataset = generate(simple_schema, 3, 42);
        assert_eq!(dataset.len(), 3);
        dataset.next();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_zero_iterations() {
        assert_eq!(generate(simple_schema, 0, 42).count(), 0);
    }
}
