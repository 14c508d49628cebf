//! Line grammar for declaration feeds.
//!
//! A feed is header-like text with one declaration per line. Only a small,
//! deliberate subset of C is recognized: single-line function prototypes and
//! `#define NAME` constants. Everything else classifies as unrecognized and is
//! left for the parser to skip.

use std::sync::LazyLock;

use regex::Regex;

/// Annotation token that marks a hand-written export wrapper.
pub const CODE_MARKER: &str = "CODE";

// const? ret-word markers? name ( args ) trailing
static PROTOTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<const>const\s+)?(?:(?P<ret>[A-Za-z_]\w*)(?:\s*(?P<ptr>\*+)\s*|\s+))?(?P<name>[A-Za-z_]\w*)\s*\((?P<args>[^()]*)\)(?P<rest>.*)$",
    )
    .expect("prototype pattern is valid")
});

static CONSTANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#\s*define\s+(?P<name>[A-Za-z_]\w*)(?:\s.*)?$")
        .expect("constant pattern is valid")
});

static ARGUMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<const>const\s+)?(?P<base>[A-Za-z_]\w*)\s*(?P<ptr>[*&]*)\s*(?P<name>[A-Za-z_]\w*)?$",
    )
    .expect("argument pattern is valid")
});

static CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b{}\b", CODE_MARKER)).expect("marker pattern is valid")
});

/// Classification of a single feed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    Comment,
    Blank,
    Prototype(Prototype<'a>),
    Constant(&'a str),
    Unrecognized,
}

/// The pieces of a matched function prototype, borrowed from the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prototype<'a> {
    /// `const` before the return type
    pub is_const: bool,

    /// Return type base word (absent = no return value)
    pub return_base: Option<&'a str>,

    /// Pointer markers after the return type
    pub return_indirection: &'a str,

    pub name: &'a str,

    /// Raw text between the parentheses
    pub args: &'a str,

    /// Raw text after the closing parenthesis
    pub annotation: &'a str,
}

impl Prototype<'_> {
    /// Whether the annotation asks for a hand-written wrapper.
    pub fn has_code_marker(&self) -> bool {
        has_code_marker(self.annotation)
    }
}

/// One entry of a prototype's argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument<'a> {
    pub is_const: bool,
    pub base: &'a str,
    pub indirection: &'a str,
    pub name: Option<&'a str>,
}

/// Classify a line. Surrounding whitespace is ignored.
pub fn classify(line: &str) -> LineKind<'_> {
    let line = line.trim();

    if line.is_empty() {
        return LineKind::Blank;
    }

    if line.starts_with("/*") || line.starts_with("//") {
        return LineKind::Comment;
    }

    if let Some(cap) = CONSTANT.captures(line) {
        if let Some(name) = cap.name("name") {
            return LineKind::Constant(name.as_str());
        }
    }

    if let Some(cap) = PROTOTYPE.captures(line) {
        let name = cap.name("name").map_or("", |m| m.as_str());
        let rest = cap.name("rest").map_or("", |m| m.as_str());
        // `int (*cb)(int);` would otherwise match with `int` as the name
        if !name.is_empty() && !rest.trim_start().starts_with('(') {
            return LineKind::Prototype(Prototype {
                is_const: cap.name("const").is_some(),
                return_base: cap.name("ret").map(|m| m.as_str()),
                return_indirection: cap.name("ptr").map_or("", |m| m.as_str()),
                name,
                args: cap.name("args").map_or("", |m| m.as_str()),
                annotation: rest,
            });
        }
    }

    LineKind::Unrecognized
}

/// Split a raw argument list into entries.
///
/// Returns the 1-based position of the first entry the argument grammar
/// rejects. An empty list yields no entries.
pub fn split_arguments(args: &str) -> Result<Vec<Argument<'_>>, usize> {
    if args.trim().is_empty() {
        return Ok(Vec::new());
    }

    args.split(',')
        .enumerate()
        .map(|(idx, entry)| parse_argument(entry.trim()).ok_or(idx + 1))
        .collect()
}

fn parse_argument(entry: &str) -> Option<Argument<'_>> {
    let cap = ARGUMENT.captures(entry)?;

    Some(Argument {
        is_const: cap.name("const").is_some(),
        base: cap.name("base")?.as_str(),
        indirection: cap.name("ptr").map_or("", |m| m.as_str()),
        name: cap.name("name").map(|m| m.as_str()),
    })
}

/// Whether an annotation contains the `CODE` marker as a whole word.
pub fn has_code_marker(annotation: &str) -> bool {
    CODE.is_match(annotation)
}
