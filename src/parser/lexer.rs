use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    ir::{AggKind, Number, Op},
    parser::{Clause, Lexeme, Lexicon, Token, DIRECTION_WORDS, LIMIT_SHORTHAND_WORDS},
};

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)"|'([^']*)'|(\S+)"#).expect("word pattern"));

#[derive(Debug, Clone, PartialEq)]
enum Word {
    Quoted(String),
    Bare { raw: String, folded: String },
}

impl Word {
    fn folded(&self) -> Option<&str> {
        match self {
            Word::Bare { folded, .. } => Some(folded.as_str()),
            Word::Quoted(_) => None,
        }
    }
}

/// Splits text into words. Quoted runs (single or double quotes) become one
/// word with the quotes stripped; bare words lose surrounding punctuation.
fn split_words(text: &str) -> Vec<Word> {
    WORD_RE
        .captures_iter(text)
        .filter_map(|caps| {
            if let Some(quoted) = caps.get(1).or_else(|| caps.get(2)) {
                return Some(Word::Quoted(quoted.as_str().to_string()));
            }

            let raw = caps.get(3)?.as_str();
            let raw = raw
                .trim_matches(|c: char| matches!(c, ',' | ';' | '?' | '!' | '(' | ')'))
                .trim_end_matches('.');
            if raw.is_empty() {
                return None;
            }

            Some(Word::Bare { raw: raw.to_string(), folded: raw.to_lowercase() })
        })
        .collect()
}

/// Longest-match lexer over the phrase lexicon.
///
/// At each word the dedicated shorthand rules run first ("top N",
/// "having more than N", sort direction), then lexicon phrases from the
/// widest window down to one word, then the single-word fallbacks.
pub struct Lexer<'a> {
    words: Vec<Word>,
    position: usize,
    lexicon: &'a Lexicon,
    tokens: Vec<Token>,
}

impl Lexer<'static> {
    pub fn new(text: &str) -> Self {
        Lexer::with_lexicon(text, Lexicon::global())
    }
}

impl<'a> Lexer<'a> {
    pub fn with_lexicon(text: &str, lexicon: &'a Lexicon) -> Self {
        Self { words: split_words(text), position: 0, lexicon, tokens: vec![] }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        while !self.eof() {
            self.lex_current();
        }

        tracing::debug!(words = self.words.len(), tokens = self.tokens.len(), "tokenized input");
        self.tokens
    }

    fn eof(&self) -> bool {
        self.position >= self.words.len()
    }

    fn peek(&self, ahead: usize) -> Option<&Word> {
        self.words.get(self.position + ahead)
    }

    fn folded(&self, ahead: usize) -> Option<&str> {
        self.peek(ahead).and_then(Word::folded)
    }

    fn jump(&mut self, ahead: usize) {
        self.position += ahead;
    }

    fn lex_current(&mut self) {
        let raw = match self.peek(0) {
            Some(Word::Quoted(text)) => {
                let token = Token::Literal(text.clone());
                self.tokens.push(token);
                self.jump(1);
                return;
            }
            Some(Word::Bare { raw, .. }) => raw.clone(),
            None => return,
        };

        if self.lex_limit_shorthand() || self.lex_having_shorthand() || self.lex_direction() {
            return;
        }

        if let Some((lexeme, width)) = self.match_phrase(0) {
            self.tokens.push(match lexeme {
                Lexeme::Clause(Clause::From) if width == 1 && self.in_comparator_slot() => {
                    tracing::trace!(word = %raw, "reading as equality inside a condition");
                    Token::Comparator(Op::Eq)
                }
                Lexeme::Clause(clause) => Token::Keyword(clause),
                Lexeme::Aggregate(func) => Token::Aggregate(func),
                Lexeme::Comparator(op) => Token::Comparator(op),
                Lexeme::Alias => Token::Alias,
            });
            self.jump(width);
            return;
        }

        let folded = raw.to_lowercase();
        if self.lexicon.is_stop_word(&folded) {
            tracing::trace!(word = %raw, "dropping stop-word");
        } else if let Some(op) = Op::from_symbol(&folded) {
            self.tokens.push(Token::Comparator(op));
        } else if let Some(number) = Number::parse(&folded) {
            self.tokens.push(Token::Number(number));
        } else {
            self.tokens.push(Token::Identifier(raw));
        }
        self.jump(1);
    }

    /// "in" right after a condition's column ("where city in 'Porto'").
    fn in_comparator_slot(&self) -> bool {
        if self.folded(0) != Some("in") {
            return false;
        }

        let clause = self.tokens.iter().rev().find_map(|token| match token {
            Token::Keyword(clause) => Some(*clause),
            _ => None,
        });
        if !matches!(clause, Some(Clause::Where | Clause::Having)) {
            return false;
        }

        let mut recent = self.tokens.iter().rev();
        match (recent.next(), recent.next()) {
            (Some(Token::Identifier(_) | Token::Literal(_)), Some(Token::Comparator(_))) => false,
            (Some(Token::Identifier(_) | Token::Literal(_)), _) => true,
            _ => false,
        }
    }

    /// Longest lexicon phrase starting `ahead` words from the cursor.
    fn match_phrase(&self, ahead: usize) -> Option<(Lexeme, usize)> {
        for width in (1..=self.lexicon.max_phrase_words()).rev() {
            let words: Option<Vec<&str>> = (0..width).map(|i| self.folded(ahead + i)).collect();
            let Some(words) = words else {
                continue;
            };

            if let Some(lexeme) = self.lexicon.lookup(&words.join(" ")) {
                return Some((lexeme, width));
            }
        }

        None
    }

    /// Digits or a number word ("one", "ten").
    fn number_at(&self, ahead: usize) -> Option<Number> {
        let word = self.folded(ahead)?;
        Number::parse(word).or_else(|| self.lexicon.word_number(word).map(Number::Int))
    }

    /// "top 5" / "first ten" -> LIMIT 5
    fn lex_limit_shorthand(&mut self) -> bool {
        let Some(word) = self.folded(0) else {
            return false;
        };
        if !LIMIT_SHORTHAND_WORDS.contains(&word) {
            return false;
        }

        let Some(number) = self.number_at(1) else {
            return false;
        };

        self.tokens.push(Token::Keyword(Clause::Limit));
        self.tokens.push(Token::Number(number));
        self.jump(2);
        true
    }

    /// "having more than 10" -> HAVING COUNT > 10
    fn lex_having_shorthand(&mut self) -> bool {
        if self.folded(0) != Some("having") {
            return false;
        }

        let Some((Lexeme::Comparator(op), width)) = self.match_phrase(1) else {
            return false;
        };

        let Some(number) = self.number_at(1 + width) else {
            return false;
        };

        self.tokens.extend([
            Token::Keyword(Clause::Having),
            Token::Aggregate(AggKind::Count),
            Token::Comparator(op),
            Token::Number(number),
        ]);
        self.jump(2 + width);
        true
    }

    /// "desc", "descending", "in descending order", "ascending"...
    ///
    /// Ascending is the default, so it is consumed without a token.
    fn lex_direction(&mut self) -> bool {
        let start = usize::from(self.folded(0) == Some("in"));
        let Some(word) = self.folded(start) else {
            return false;
        };
        let Some((_, descending)) = DIRECTION_WORDS.iter().find(|(w, _)| *w == word) else {
            return false;
        };

        let mut width = start + 1;
        if self.folded(width) == Some("order") {
            width += 1;
        }

        if *descending {
            self.tokens.push(Token::Descending);
        }
        self.jump(width);
        true
    }
}

/// Tokenize `text` with the built-in lexicon.
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text).tokenize()
}
