//! Type definitions for parsed declaration feeds.
//!
//! Holds the declarations extracted from a feed and the type model that maps
//! native type spellings onto the value categories the script runtime
//! understands.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Spelling of the "no value" sentinel type.
pub const VOID: &str = "void";

/// Category a native value crosses the script boundary as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptCategory {
    Boolean,
    Integer,
    Float,
    Double,
    String,
    /// Passed by identity as a tagged handle; carries the stripped base type name
    Opaque(String),
}

impl ScriptCategory {
    /// Suffix of the runtime's `is*`/`to*` primitives for value categories.
    ///
    /// Opaque values have no such suffix; they go through the handle calls.
    pub fn runtime_kind(&self) -> Option<&'static str> {
        match self {
            ScriptCategory::Boolean => Some("boolean"),
            ScriptCategory::Integer | ScriptCategory::Float | ScriptCategory::Double => {
                Some("number")
            }
            ScriptCategory::String => Some("string"),
            ScriptCategory::Opaque(_) => None,
        }
    }

    /// Whether a slot of this category produces any generated text.
    ///
    /// An opaque type whose base name stripped down to nothing cannot be tagged,
    /// so its slot is left out.
    pub fn is_emittable(&self) -> bool {
        !matches!(self, ScriptCategory::Opaque(base) if base.is_empty())
    }
}

impl fmt::Display for ScriptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptCategory::Boolean => write!(f, "boolean"),
            ScriptCategory::Integer => write!(f, "integer"),
            ScriptCategory::Float => write!(f, "float"),
            ScriptCategory::Double => write!(f, "double"),
            ScriptCategory::String => write!(f, "string"),
            ScriptCategory::Opaque(base) => write!(f, "handle<{}>", base),
        }
    }
}

/// How a classification rule inspects a spelling.
enum Pattern {
    Prefix(&'static str),
    Contains(&'static str),
}

impl Pattern {
    fn matches(&self, spelling: &str) -> bool {
        match self {
            Pattern::Prefix(p) => spelling.starts_with(p),
            Pattern::Contains(p) => spelling.contains(p),
        }
    }
}

/// Classification rules, tried in order. First match wins; no match is opaque.
const RULES: [(Pattern, ScriptCategory); 5] = [
    (Pattern::Prefix("bool"), ScriptCategory::Boolean),
    (Pattern::Prefix("int"), ScriptCategory::Integer),
    (Pattern::Prefix("float"), ScriptCategory::Float),
    (Pattern::Prefix("double"), ScriptCategory::Double),
    (Pattern::Contains("char *"), ScriptCategory::String),
];

/// Normalize a native type spelling.
///
/// Whitespace runs collapse to one space and pointer/reference markers are
/// grouped after the base with a single separating space, so `char*`,
/// `char  *` and `char *` all become `char *`.
pub fn normalize_spelling(spelling: &str) -> String {
    let split = spelling
        .find(['*', '&'])
        .unwrap_or(spelling.len());
    let (base, rest) = spelling.split_at(split);

    let base = base.split_whitespace().collect::<Vec<_>>().join(" ");
    let markers: String = rest.chars().filter(|c| matches!(c, '*' | '&')).collect();

    match (base.is_empty(), markers.is_empty()) {
        (_, true) => base,
        (true, false) => markers,
        (false, false) => format!("{} {}", base, markers),
    }
}

/// Strip a leading `const` qualifier from a normalized spelling.
fn strip_const(spelling: &str) -> &str {
    match spelling.strip_prefix("const") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim_start(),
        _ => spelling,
    }
}

/// Base name of an opaque spelling: whitespace and pointer markers removed.
pub fn opaque_base(spelling: &str) -> String {
    strip_const(&normalize_spelling(spelling))
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '*' | '&'))
        .collect()
}

/// Map a native type spelling to its script category.
pub fn classify(spelling: &str) -> ScriptCategory {
    let normalized = normalize_spelling(spelling);
    let spelling = strip_const(&normalized);

    RULES
        .iter()
        .find(|(pattern, _)| pattern.matches(spelling))
        .map(|(_, category)| category.clone())
        .unwrap_or_else(|| ScriptCategory::Opaque(opaque_base(spelling)))
}

/// Native declaration fragment for a local of the given spelling.
///
/// The fragment is ready to have a variable name appended directly.
pub fn native_cast(spelling: &str) -> String {
    match classify(spelling) {
        ScriptCategory::Boolean => "bool ".to_string(),
        ScriptCategory::Integer => "int ".to_string(),
        ScriptCategory::Float => "float ".to_string(),
        ScriptCategory::Double => "double ".to_string(),
        ScriptCategory::String => "const char *".to_string(),
        ScriptCategory::Opaque(_) => declarator_prefix(&normalize_spelling(spelling)),
    }
}

/// Append a space unless the spelling already ends in a pointer marker.
fn declarator_prefix(spelling: &str) -> String {
    if spelling.ends_with(['*', '&']) {
        spelling.to_string()
    } else {
        format!("{} ", spelling)
    }
}

/// A native type as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Leading `const` qualifier
    pub is_const: bool,

    /// Base type word
    pub base: String,

    /// Pointer/reference markers, e.g. `*` or `**`
    pub indirection: String,
}

impl TypeSpec {
    /// Create a type from its base word and markers.
    pub fn new(base: impl Into<String>, indirection: impl Into<String>) -> Self {
        TypeSpec {
            is_const: false,
            base: base.into(),
            indirection: indirection.into(),
        }
    }

    /// Set the `const` qualifier.
    pub fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }

    /// Parse a free-form spelling such as `const char *`.
    pub fn parse(s: &str) -> Self {
        let normalized = normalize_spelling(s);
        let unqualified = strip_const(&normalized);
        let is_const = unqualified.len() != normalized.len();

        let (base, indirection) = match unqualified.find(['*', '&']) {
            Some(idx) => (unqualified[..idx].trim(), &unqualified[idx..]),
            None => (unqualified, ""),
        };

        TypeSpec::new(base, indirection).with_const(is_const)
    }

    /// The `void` return/parameter sentinel.
    pub fn void() -> Self {
        TypeSpec::new(VOID, "")
    }

    /// Unqualified spelling used for classification, e.g. `char *`.
    pub fn spelling(&self) -> String {
        if self.indirection.is_empty() {
            self.base.clone()
        } else if self.base.is_empty() {
            self.indirection.clone()
        } else {
            format!("{} {}", self.base, self.indirection)
        }
    }

    /// Full spelling including qualifiers, as it appears in a signature.
    pub fn declaration(&self) -> String {
        if self.is_const {
            format!("const {}", self.spelling())
        } else {
            self.spelling()
        }
    }

    /// Declare `name` with this exact type, e.g. `const char *name`.
    pub fn declare(&self, name: &str) -> String {
        format!("{}{}", declarator_prefix(&self.declaration()), name)
    }

    /// Check if this is the `void` sentinel.
    pub fn is_void(&self) -> bool {
        self.base == VOID && self.indirection.is_empty()
    }

    /// Script category of this type.
    pub fn category(&self) -> ScriptCategory {
        classify(&self.spelling())
    }

    /// Native fragment for a local holding a value of this type.
    pub fn native_cast(&self) -> String {
        native_cast(&self.spelling())
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.declaration())
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter type
    pub ty: TypeSpec,

    /// Parameter name (absent for sentinels like `void`)
    pub name: Option<String>,
}

impl Param {
    /// Create a named parameter.
    pub fn new(ty: TypeSpec, name: impl Into<String>) -> Self {
        Param {
            ty,
            name: Some(name.into()),
        }
    }

    /// Create an unnamed parameter.
    pub fn unnamed(ty: TypeSpec) -> Self {
        Param { ty, name: None }
    }
}

/// A value-carrying parameter slot with its resolved name and category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<'a> {
    /// Zero-based position among emitted slots
    pub position: usize,

    /// Variable name (synthesized as `argN` when the declaration omits it)
    pub name: String,

    pub ty: &'a TypeSpec,

    pub category: ScriptCategory,
}

/// A function prototype from a declaration feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Function name
    pub name: String,

    /// Return type (`None` = no return value)
    pub return_type: Option<TypeSpec>,

    /// Parameters in declaration order
    pub params: Vec<Param>,

    /// Raw text after the closing parenthesis
    pub annotation: String,

    /// 1-based line number in the feed
    pub line: usize,
}

impl FunctionDecl {
    /// Create a function with no parameters and no return value.
    pub fn new(name: impl Into<String>) -> Self {
        FunctionDecl {
            name: name.into(),
            return_type: None,
            params: Vec::new(),
            annotation: String::new(),
            line: 0,
        }
    }

    /// Set the return type. `void` is stored as "no return value".
    pub fn with_return(mut self, ty: TypeSpec) -> Self {
        self.return_type = if ty.is_void() { None } else { Some(ty) };
        self
    }

    /// Add a parameter.
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Set the trailing annotation.
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = annotation.into();
        self
    }

    /// Category of the return value, if any.
    pub fn return_category(&self) -> Option<ScriptCategory> {
        self.return_type.as_ref().map(TypeSpec::category)
    }

    /// Parameter slots that generate code, in declaration order.
    ///
    /// `void` sentinels and opaque types with an empty base are left out.
    pub fn slots(&self) -> Vec<Slot<'_>> {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.ty.is_void())
            .map(|(idx, p)| {
                let name = p.name.clone().unwrap_or_else(|| format!("arg{}", idx + 1));
                (p, name)
            })
            .filter_map(|(p, name)| {
                let category = p.ty.category();
                category.is_emittable().then_some((p, name, category))
            })
            .enumerate()
            .map(|(position, (p, name, category))| Slot {
                position,
                name,
                ty: &p.ty,
                category,
            })
            .collect()
    }
}

/// A `#define NAME` constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDecl {
    /// Constant name
    pub name: String,

    /// 1-based line number in the feed
    pub line: usize,
}

impl ConstantDecl {
    /// Create a new constant.
    pub fn new(name: impl Into<String>) -> Self {
        ConstantDecl {
            name: name.into(),
            line: 0,
        }
    }
}

/// Any declaration a feed can contribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Declaration {
    Function(FunctionDecl),
    Constant(ConstantDecl),
}

impl Declaration {
    /// Declared name.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function(f) => &f.name,
            Declaration::Constant(c) => &c.name,
        }
    }
}
