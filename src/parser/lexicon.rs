use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;

use crate::{
    ir::{AggKind, JoinKind, Op},
    parser::Clause,
};

/// Grammar meaning of a lexicon phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme {
    Clause(Clause),
    Aggregate(AggKind),
    Comparator(Op),
    Alias,
}

pub const CLAUSE_WORDS: &[(&str, Clause)] = &[
    ("get", Clause::Select),
    ("show", Clause::Select),
    ("display", Clause::Select),
    ("find", Clause::Select),
    ("list", Clause::Select),
    ("select", Clause::Select),
    ("fetch", Clause::Select),
    ("give me", Clause::Select),
    ("from", Clause::From),
    ("in", Clause::From),
    ("where", Clause::Where),
    ("with", Clause::Where),
    ("which", Clause::Where),
    ("whose", Clause::Where),
    ("that", Clause::Where),
    ("group by", Clause::GroupBy),
    ("grouped by", Clause::GroupBy),
    ("by", Clause::GroupBy),
    ("for each", Clause::GroupBy),
    ("per", Clause::GroupBy),
    ("order by", Clause::OrderBy),
    ("ordered by", Clause::OrderBy),
    ("sort by", Clause::OrderBy),
    ("sorted by", Clause::OrderBy),
    ("having", Clause::Having),
    ("limit", Clause::Limit),
    ("offset", Clause::Offset),
    ("skip", Clause::Offset),
    ("join", Clause::Join(JoinKind::Plain)),
    ("joined with", Clause::Join(JoinKind::Plain)),
    ("combined with", Clause::Join(JoinKind::Plain)),
    ("inner join", Clause::Join(JoinKind::Inner)),
    ("left join", Clause::Join(JoinKind::Left)),
    ("left outer join", Clause::Join(JoinKind::Left)),
    ("right join", Clause::Join(JoinKind::Right)),
    ("right outer join", Clause::Join(JoinKind::Right)),
    ("on", Clause::On),
];

pub const AGGREGATE_WORDS: &[(&str, AggKind)] = &[
    ("average", AggKind::Avg),
    ("mean", AggKind::Avg),
    ("avg", AggKind::Avg),
    ("sum", AggKind::Sum),
    ("total", AggKind::Sum),
    ("count", AggKind::Count),
    ("number of", AggKind::Count),
    ("how many", AggKind::Count),
    ("max", AggKind::Max),
    ("maximum", AggKind::Max),
    ("highest", AggKind::Max),
    ("min", AggKind::Min),
    ("minimum", AggKind::Min),
    ("lowest", AggKind::Min),
    ("distinct", AggKind::Distinct),
    ("unique", AggKind::Distinct),
];

pub const COMPARISON_WORDS: &[(&str, Op)] = &[
    ("is", Op::Eq),
    ("equals", Op::Eq),
    ("=", Op::Eq),
    ("equal to", Op::Eq),
    ("are", Op::Eq),
    ("greater than", Op::Gt),
    ("more than", Op::Gt),
    ("above", Op::Gt),
    ("exceeds", Op::Gt),
    ("less than", Op::Lt),
    ("fewer than", Op::Lt),
    ("below", Op::Lt),
    ("under", Op::Lt),
    ("not", Op::NotEq),
    ("isn't", Op::NotEq),
    ("isnt", Op::NotEq),
    ("is not", Op::NotEq),
    ("does not equal", Op::NotEq),
    ("not equal to", Op::NotEq),
    ("at least", Op::GtEq),
    ("no less than", Op::GtEq),
    ("greater than or equal to", Op::GtEq),
    ("minimum of", Op::GtEq),
    ("at most", Op::LtEq),
    ("no more than", Op::LtEq),
    ("less than or equal to", Op::LtEq),
    ("maximum of", Op::LtEq),
];

pub const ALIAS_WORDS: &[&str] = &["as", "named", "called"];

/// Dropped unless a longer phrase claims them first.
pub const STOP_WORDS: &[&str] = &["and", "or", "but", "the", "a", "an", "of", "for", "all", "everything", "me", "*"];

pub const WORD_NUMBERS: &[(&str, i64)] = &[
    ("zero", 0),
    ("one", 1),
    ("two", 2),
    ("three", 3),
    ("four", 4),
    ("five", 5),
    ("six", 6),
    ("seven", 7),
    ("eight", 8),
    ("nine", 9),
    ("ten", 10),
    ("eleven", 11),
    ("twelve", 12),
];

/// Words introducing a row-count shorthand ("top 5", "first ten").
pub const LIMIT_SHORTHAND_WORDS: &[&str] = &["top", "first"];

/// Sort-direction words; `true` means descending.
pub const DIRECTION_WORDS: &[(&str, bool)] = &[
    ("desc", true),
    ("descending", true),
    ("asc", false),
    ("ascending", false),
];

/// Lower-cased phrase table with longest-match lookup support.
///
/// When the same phrase appears in more than one table the clause keyword
/// wins, then the comparator, then the aggregate.
#[derive(Debug)]
pub struct Lexicon {
    phrases: IndexMap<&'static str, Lexeme>,
    stop_words: IndexSet<&'static str>,
    word_numbers: IndexMap<&'static str, i64>,
    max_phrase_words: usize,
}

static LEXICON: Lazy<Lexicon> = Lazy::new(Lexicon::build);

impl Lexicon {
    pub fn global() -> &'static Lexicon {
        &LEXICON
    }

    fn build() -> Self {
        let mut phrases: IndexMap<&'static str, Lexeme> = IndexMap::new();
        for (phrase, clause) in CLAUSE_WORDS {
            phrases.entry(*phrase).or_insert(Lexeme::Clause(*clause));
        }
        for (phrase, op) in COMPARISON_WORDS {
            phrases.entry(*phrase).or_insert(Lexeme::Comparator(*op));
        }
        for (phrase, func) in AGGREGATE_WORDS {
            phrases.entry(*phrase).or_insert(Lexeme::Aggregate(*func));
        }
        for phrase in ALIAS_WORDS {
            phrases.entry(*phrase).or_insert(Lexeme::Alias);
        }

        let max_phrase_words = phrases
            .keys()
            .map(|p| p.split_whitespace().count())
            .max()
            .unwrap_or(1)
            .max(4);

        Self {
            phrases,
            stop_words: STOP_WORDS.iter().copied().collect(),
            word_numbers: WORD_NUMBERS.iter().copied().collect(),
            max_phrase_words,
        }
    }

    /// Look up an already lower-cased, single-space separated phrase.
    pub fn lookup(&self, phrase: &str) -> Option<Lexeme> {
        self.phrases.get(phrase).copied()
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    pub fn word_number(&self, word: &str) -> Option<i64> {
        self.word_numbers.get(word).copied()
    }

    /// Widest lookup window the lexer has to try.
    pub fn max_phrase_words(&self) -> usize {
        self.max_phrase_words
    }

    pub fn phrases(&self) -> impl Iterator<Item = (&'static str, Lexeme)> + '_ {
        self.phrases.iter().map(|(p, l)| (*p, *l))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ir::{AggKind, JoinKind, Op},
        parser::{Clause, Lexeme, Lexicon},
    };

    #[test]
    pub fn test_window_covers_longest_phrase() {
        let lexicon = Lexicon::global();
        assert!(lexicon.max_phrase_words() >= 5);
        for (phrase, _) in lexicon.phrases() {
            assert!(phrase.split_whitespace().count() <= lexicon.max_phrase_words());
        }
    }

    #[test]
    pub fn test_lookup_tables() {
        let lexicon = Lexicon::global();
        assert_eq!(lexicon.lookup("group by"), Some(Lexeme::Clause(Clause::GroupBy)));
        assert_eq!(lexicon.lookup("inner join"), Some(Lexeme::Clause(Clause::Join(JoinKind::Inner))));
        assert_eq!(lexicon.lookup("number of"), Some(Lexeme::Aggregate(AggKind::Count)));
        assert_eq!(lexicon.lookup("greater than or equal to"), Some(Lexeme::Comparator(Op::GtEq)));
        assert_eq!(lexicon.lookup("as"), Some(Lexeme::Alias));
        assert_eq!(lexicon.lookup("Group By"), None);
    }

    #[test]
    pub fn test_keyword_beats_stop_word() {
        let lexicon = Lexicon::global();
        assert_eq!(lexicon.lookup("with"), Some(Lexeme::Clause(Clause::Where)));
        assert!(!lexicon.is_stop_word("from"));
        assert!(lexicon.is_stop_word("the"));
    }

    #[test]
    pub fn test_word_numbers() {
        let lexicon = Lexicon::global();
        assert_eq!(lexicon.word_number("one"), Some(1));
        assert_eq!(lexicon.word_number("ten"), Some(10));
        assert_eq!(lexicon.word_number("eleventy"), None);
    }
}
