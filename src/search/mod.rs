//! Search requests and the matching machinery behind them.

mod glob;
mod searcher;

use std::ops::BitOr;
use std::ops::BitOrAssign;

use crate::provider::SymTag;
use crate::Addr;

pub use glob::Glob;
pub(crate) use searcher::search;


/// Options forwarded to the provider's native name search and consulted
/// locally by the glob strategy.
///
/// Options compose via `|`. The empty set, [`SearchOpts::NONE`], leaves
/// all choices to the provider's defaults.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SearchOpts(u32);

impl SearchOpts {
    /// No options.
    pub const NONE: Self = Self(0x0);
    /// Apply a case-sensitive name match.
    pub const CASE_SENSITIVE: Self = Self(0x1);
    /// Apply a case-insensitive name match.
    pub const CASE_INSENSITIVE: Self = Self(0x2);
    /// Treat names as paths and apply a filename-extension match.
    pub const FNAME_EXT: Self = Self(0x4);
    /// Treat the pattern as a provider-native regular expression.
    pub const REGULAR_EXPRESSION: Self = Self(0x8);
    /// Match against undecorated names; without this option the glob
    /// strategy matches against the raw (mangled) names instead.
    pub const UNDECORATED_NAME: Self = Self(0x10);

    /// Check whether all options in `other` are present in this set.
    #[inline]
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Retrieve the raw bit representation of the option set.
    #[inline]
    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl BitOr for SearchOpts {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SearchOpts {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}


/// A name pattern, dispatched once per search to one of the two
/// matching strategies.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Pattern {
    /// A literal (or provider-native) pattern, filtered by the
    /// provider's own name search.
    Literal(String),
    /// A glob pattern (`*` matches any run of characters, `?` a single
    /// character), matched client-side after unfiltered enumeration.
    Glob(String),
}

impl Pattern {
    /// Classify a raw search mask: masks containing a glob
    /// metacharacter become [`Pattern::Glob`], all others
    /// [`Pattern::Literal`].
    ///
    /// Note that decorated MSVC names themselves contain `?`. Callers
    /// searching for an already-mangled name should construct
    /// [`Pattern::Literal`] directly instead of classifying.
    pub fn classify(mask: impl Into<String>) -> Self {
        let mask = mask.into();
        if mask.contains(['*', '?']) {
            Self::Glob(mask)
        } else {
            Self::Literal(mask)
        }
    }

    /// Retrieve the raw pattern text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(mask) | Self::Glob(mask) => mask,
        }
    }
}


/// An immutable description of one symbol search.
#[derive(Clone, Debug)]
pub struct SearchRequest {
    /// The name pattern candidates are matched against.
    pub pattern: Pattern,
    /// The symbol kind to enumerate; [`SymTag::Null`] enumerates all
    /// kinds.
    pub tag: SymTag,
    /// The search options.
    pub opts: SearchOpts,
}

impl SearchRequest {
    /// Create a new `SearchRequest`.
    pub fn new(pattern: Pattern, tag: SymTag, opts: SearchOpts) -> Self {
        Self { pattern, tag, opts }
    }
}


/// A single reported symbol match.
///
/// Matches are handed to the visitor one at a time and are not retained
/// by the engine.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SymbolMatch {
    /// The symbol's undecorated display name.
    pub name: String,
    /// The symbol's virtual address, as an offset from the session's
    /// base load address.
    pub addr: Addr,
}
