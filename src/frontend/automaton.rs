//! Finite-state matcher tables for the lexer.
//!
//! Each lexical category is a small state graph. A state says whether a
//! token may start in it, which characters lead into it, where it may go
//! next and, if it is accepting, which token kind it produces. The graphs
//! are assembled once and shared for the life of the process.

use std::sync::OnceLock;

use crate::frontend::token::{TokenKind, KEYWORDS};

const OPERATOR_CHARS: &str = "-+/*<>";
const SEPARATOR_CHARS: &str = ";,(){}[]";
const ASSIGNMENT_CHARS: &str = "=";

/// Predicate guarding the transition into a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Exact(char),
    OneOf(&'static str),
    Digit,
    Any,
    /// Anything an identifier may begin with
    IdentStart,
    /// Anything an identifier may continue with
    IdentContinue,
}

impl CharClass {
    pub fn matches(self, c: char) -> bool {
        match self {
            CharClass::Exact(expected) => c == expected,
            CharClass::OneOf(set) => set.contains(c),
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Any => true,
            CharClass::IdentStart => !c.is_ascii_digit() && is_identifier_char(c),
            CharClass::IdentContinue => is_identifier_char(c),
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    !OPERATOR_CHARS.contains(c)
        && !SEPARATOR_CHARS.contains(c)
        && !ASSIGNMENT_CHARS.contains(c)
        && !c.is_whitespace()
        && !c.is_control()
        && !NON_GRAPHIC.iter().any(|&(lo, hi)| lo <= c && c <= hi)
}

/// Format (Cf) and private-use (Co) code points, plus the BMP noncharacters.
/// None of these print, so none may appear in a name.
const NON_GRAPHIC: &[(char, char)] = &[
    ('\u{00AD}', '\u{00AD}'),
    ('\u{0600}', '\u{0605}'),
    ('\u{061C}', '\u{061C}'),
    ('\u{06DD}', '\u{06DD}'),
    ('\u{070F}', '\u{070F}'),
    ('\u{0890}', '\u{0891}'),
    ('\u{08E2}', '\u{08E2}'),
    ('\u{180E}', '\u{180E}'),
    ('\u{200B}', '\u{200F}'),
    ('\u{202A}', '\u{202E}'),
    ('\u{2060}', '\u{2064}'),
    ('\u{2066}', '\u{206F}'),
    ('\u{E000}', '\u{F8FF}'),
    ('\u{FEFF}', '\u{FEFF}'),
    ('\u{FFF9}', '\u{FFFB}'),
    ('\u{FFFE}', '\u{FFFF}'),
    ('\u{110BD}', '\u{110BD}'),
    ('\u{110CD}', '\u{110CD}'),
    ('\u{13430}', '\u{1343F}'),
    ('\u{1BCA0}', '\u{1BCA3}'),
    ('\u{1D173}', '\u{1D17A}'),
    ('\u{E0001}', '\u{E0001}'),
    ('\u{E0020}', '\u{E007F}'),
    ('\u{F0000}', '\u{FFFFD}'),
    ('\u{100000}', '\u{10FFFD}'),
];

/// Compile-time description of a state; `next` indexes into the same graph
#[derive(Debug, Clone, Copy)]
struct Template {
    starter: bool,
    class: CharClass,
    next: &'static [usize],
    accepts: Option<TokenKind>,
}

impl Template {
    const fn start(class: CharClass, next: &'static [usize], accepts: Option<TokenKind>) -> Self {
        Self { starter: true, class, next, accepts }
    }

    const fn inner(class: CharClass, next: &'static [usize], accepts: Option<TokenKind>) -> Self {
        Self { starter: false, class, next, accepts }
    }
}

const STRING_LITERAL: &[Template] = &[
    Template::start(CharClass::Exact('"'), &[1, 3, 2], None),
    // escape: an escaped quote re-enters the body through state 0
    Template::inner(CharClass::Exact('\\'), &[0, 2], None),
    Template::inner(CharClass::Any, &[1, 3, 2], None),
    Template::inner(CharClass::Exact('"'), &[], Some(TokenKind::StringLiteral)),
];

const NUMBER_LITERAL: &[Template] = &[
    Template::start(CharClass::Digit, &[0, 1, 3], Some(TokenKind::IntLiteral)),
    Template::inner(CharClass::OneOf("eE"), &[2], None),
    Template::inner(CharClass::Digit, &[2], Some(TokenKind::IntLiteral)),
    Template::inner(CharClass::Exact('.'), &[4], None),
    Template::inner(CharClass::Digit, &[4, 5], Some(TokenKind::FloatLiteral)),
    Template::inner(CharClass::OneOf("eE"), &[6], None),
    Template::inner(CharClass::Digit, &[6], Some(TokenKind::FloatLiteral)),
];

const OPERATORS: &[Template] = &[
    Template::start(CharClass::Exact('+'), &[1], Some(TokenKind::Add)),
    Template::inner(CharClass::Exact('+'), &[], Some(TokenKind::Increment)),
    Template::start(CharClass::Exact('-'), &[3], Some(TokenKind::Subtract)),
    Template::inner(CharClass::Exact('-'), &[], Some(TokenKind::Decrement)),
    Template::start(CharClass::Exact('*'), &[], Some(TokenKind::Multiply)),
    Template::start(CharClass::Exact('/'), &[], Some(TokenKind::Divide)),
    Template::start(CharClass::Exact('<'), &[], Some(TokenKind::LessThan)),
    Template::start(CharClass::Exact('>'), &[], Some(TokenKind::GreaterThan)),
    Template::start(CharClass::Exact('='), &[9], Some(TokenKind::Assignment)),
    Template::inner(CharClass::Exact('='), &[], Some(TokenKind::EqualTo)),
];

const SEPARATORS: &[Template] = &[
    Template::start(CharClass::Exact(';'), &[], Some(TokenKind::Semicolon)),
    Template::start(CharClass::Exact(','), &[], Some(TokenKind::Comma)),
    Template::start(CharClass::Exact('('), &[], Some(TokenKind::OpenBracket)),
    Template::start(CharClass::Exact(')'), &[], Some(TokenKind::CloseBracket)),
    Template::start(CharClass::Exact('{'), &[], Some(TokenKind::OpenCurlyBracket)),
    Template::start(CharClass::Exact('}'), &[], Some(TokenKind::CloseCurlyBracket)),
    Template::start(CharClass::Exact('['), &[], Some(TokenKind::OpenSquareBracket)),
    Template::start(CharClass::Exact(']'), &[], Some(TokenKind::CloseSquareBracket)),
];

#[derive(Debug, Clone)]
pub struct State {
    pub starter: bool,
    pub class: CharClass,
    pub next: Vec<usize>,
    pub accepts: Option<TokenKind>,
}

#[derive(Debug, Clone)]
pub struct Graph {
    pub states: Vec<State>,
}

impl Graph {
    fn from_templates(templates: &[Template]) -> Self {
        let states = templates
            .iter()
            .map(|t| State {
                starter: t.starter,
                class: t.class,
                next: t.next.to_vec(),
                accepts: t.accepts,
            })
            .collect();
        Self { states }
    }

    /// One chain of states per keyword, every link of which can fall back
    /// to the generic identifier states once the input stops spelling it.
    fn keywords_and_identifiers(keywords: &[(&str, TokenKind)]) -> Self {
        let mut states: Vec<State> = Vec::new();

        for (word, kind) in keywords {
            let count = word.chars().count();
            for (i, c) in word.chars().enumerate() {
                let last = i + 1 == count;
                states.push(State {
                    starter: i == 0,
                    class: CharClass::Exact(c),
                    next: if last { Vec::new() } else { vec![states.len() + 1] },
                    accepts: Some(if last { *kind } else { TokenKind::Identifier }),
                });
            }
        }

        let ident_start = states.len();
        let ident_continue = ident_start + 1;
        for state in &mut states {
            state.next.push(ident_continue);
        }

        states.push(State {
            starter: true,
            class: CharClass::IdentStart,
            next: vec![ident_continue],
            accepts: Some(TokenKind::Identifier),
        });
        states.push(State {
            starter: false,
            class: CharClass::IdentContinue,
            next: vec![ident_continue],
            accepts: Some(TokenKind::Identifier),
        });

        Self { states }
    }
}

/// All category graphs, searched in order for a start state
#[derive(Debug, Clone)]
pub struct Automaton {
    graphs: Vec<Graph>,
}

/// Position inside the automaton: (graph, state)
pub type StateId = (usize, usize);

impl Automaton {
    fn new() -> Self {
        let graphs = vec![
            Graph::from_templates(STRING_LITERAL),
            Graph::from_templates(NUMBER_LITERAL),
            Graph::from_templates(OPERATORS),
            Graph::from_templates(SEPARATORS),
            Graph::keywords_and_identifiers(&KEYWORDS),
        ];
        Self { graphs }
    }

    /// First start state, across all graphs, that accepts `c`
    pub fn start(&self, c: char) -> Option<StateId> {
        self.graphs.iter().enumerate().find_map(|(g, graph)| {
            graph
                .states
                .iter()
                .position(|s| s.starter && s.class.matches(c))
                .map(|s| (g, s))
        })
    }

    /// First outgoing transition from `id` that accepts `c`
    pub fn step(&self, (g, s): StateId, c: char) -> Option<StateId> {
        let graph = &self.graphs[g];
        graph.states[s]
            .next
            .iter()
            .copied()
            .find(|&n| graph.states[n].class.matches(c))
            .map(|n| (g, n))
    }

    pub fn accepts(&self, (g, s): StateId) -> Option<TokenKind> {
        self.graphs[g].states[s].accepts
    }
}

/// The shared automaton, built on first use
pub fn automaton() -> &'static Automaton {
    static AUTOMATON: OnceLock<Automaton> = OnceLock::new();
    AUTOMATON.get_or_init(Automaton::new)
}
