use std::fmt;

use regex::Regex;
use regex::RegexBuilder;

use crate::Error;
use crate::ErrorExt as _;
use crate::ErrorKind;
use crate::Result;


/// A compiled glob pattern.
///
/// `*` matches any run of characters (including the empty one), `?`
/// exactly one character; everything else matches itself. The pattern
/// is anchored at both ends.
#[derive(Clone)]
pub struct Glob {
    /// The original glob text.
    pattern: String,
    re: Regex,
}

impl Glob {
    /// Compile a glob pattern.
    pub fn new(pattern: &str, case_insensitive: bool) -> Result<Self> {
        let mut re = String::with_capacity(pattern.len() + 2);
        re.push('^');
        for c in pattern.chars() {
            match c {
                '*' => re.push_str(".*"),
                '?' => re.push('.'),
                c => re.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
            }
        }
        re.push('$');

        let re = RegexBuilder::new(&re)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|err| {
                Error::new(ErrorKind::InvalidInput, err.to_string())
            })
            .with_context(|| format!("failed to compile glob pattern `{pattern}`"))?;

        Ok(Self {
            pattern: pattern.to_string(),
            re,
        })
    }

    /// Check whether `text` matches the glob in its entirety.
    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    /// Retrieve the original glob text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Debug for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Glob").field(&self.pattern).finish()
    }
}
