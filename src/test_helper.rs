//! Test support infrastructure: an in-memory provider double that
//! accounts for every handle acquisition and release.

use std::cell::Cell;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::provider::DebugInfoProvider;
use crate::provider::ProcessHandle;
use crate::provider::StringFree;
use crate::provider::SymTag;
use crate::search::SearchOpts;
use crate::Addr;
use crate::Error;
use crate::ErrorKind;
use crate::Result;


/// A provider status code standing in for a generic failure HRESULT.
pub(crate) const E_FAIL: i32 = 0x8000_4005u32 as i32;


/// One symbol known to a [`FakeProvider`].
#[derive(Clone, Debug)]
pub(crate) struct FakeSymbol {
    pub mangled: Option<String>,
    pub undecorated: Option<String>,
    pub addr: Addr,
    pub tag: SymTag,
}

impl FakeSymbol {
    pub fn new(mangled: &str, undecorated: &str, addr: Addr, tag: SymTag) -> Self {
        Self {
            mangled: Some(mangled.to_string()),
            undecorated: Some(undecorated.to_string()),
            addr,
            tag,
        }
    }

    /// A symbol for which the provider reports no name at all.
    pub fn unnamed(addr: Addr, tag: SymTag) -> Self {
        Self {
            mangled: None,
            undecorated: None,
            addr,
            tag,
        }
    }
}


/// Counts of handle and string traffic through a [`FakeProvider`].
#[derive(Clone, Debug, Default)]
pub(crate) struct Counters {
    pub sessions_opened: usize,
    pub sessions_released: usize,
    pub scopes_acquired: usize,
    pub scopes_released: usize,
    pub enumerators_opened: usize,
    pub enumerators_released: usize,
    pub candidates_acquired: usize,
    pub candidates_released: usize,
    pub strings_allocated: usize,
    pub strings_freed_provider: usize,
    pub strings_freed_local: usize,
}

impl Counters {
    /// Check that every acquired resource has been released.
    pub fn balanced(&self) -> bool {
        self.sessions_opened == self.sessions_released
            && self.scopes_acquired == self.scopes_released
            && self.enumerators_opened == self.enumerators_released
            && self.candidates_acquired == self.candidates_released
            && self.strings_allocated == self.strings_freed_provider + self.strings_freed_local
    }
}


#[derive(Debug, Default)]
struct State {
    symbols: Vec<FakeSymbol>,
    counters: RefCell<Counters>,
    /// Report no active session on attach.
    not_attachable: Cell<bool>,
    /// Fail to parse any PDB file.
    unloadable: Cell<bool>,
    /// Fail to construct a session from loaded data.
    unopenable: Cell<bool>,
    /// Report no global scope (a success, per the provider contract).
    no_global_scope: Cell<bool>,
    /// Fail the global scope query outright.
    fail_global_scope: Cell<bool>,
    /// Fail to open child enumerators.
    fail_find_children: Cell<bool>,
    /// Fail the enumerator step that would fetch the n-th candidate
    /// (zero based).
    fail_next_at: Cell<Option<usize>>,
}


/// An in-memory stand-in for a debug-information provider.
///
/// Clones share their state, so tests can hold on to a clone for
/// inspecting [`Counters`] after a [`Session`][crate::Session] consumed
/// the provider.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeProvider {
    state: Rc<State>,
}

/// An open fake session.
#[derive(Debug)]
pub(crate) struct FakeSession;

/// The fake global scope.
#[derive(Debug)]
pub(crate) struct FakeScope;

/// An enumerator over fake symbol table indices.
#[derive(Debug)]
pub(crate) struct FakeEnumerator {
    items: Vec<usize>,
    pos: usize,
}

/// A fetched candidate, identified by its symbol table index.
#[derive(Debug)]
pub(crate) struct FakeCandidate {
    index: usize,
}

/// Provider-owned text.
#[derive(Debug)]
pub(crate) struct FakeText(String);

impl AsRef<str> for FakeText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FakeProvider {
    pub fn with_symbols(symbols: Vec<FakeSymbol>) -> Self {
        Self {
            state: Rc::new(State {
                symbols,
                ..State::default()
            }),
        }
    }

    pub fn counters(&self) -> Counters {
        self.state.counters.borrow().clone()
    }

    pub fn set_not_attachable(&self) {
        self.state.not_attachable.set(true)
    }

    pub fn set_unloadable(&self) {
        self.state.unloadable.set(true)
    }

    pub fn set_unopenable(&self) {
        self.state.unopenable.set(true)
    }

    pub fn set_no_global_scope(&self) {
        self.state.no_global_scope.set(true)
    }

    pub fn set_fail_global_scope(&self) {
        self.state.fail_global_scope.set(true)
    }

    pub fn set_fail_find_children(&self) {
        self.state.fail_find_children.set(true)
    }

    pub fn set_fail_next_at(&self, step: usize) {
        self.state.fail_next_at.set(Some(step))
    }

    /// The provider's native name filter, applied by `find_children`
    /// when a pattern is present.
    fn native_matches(&self, symbol: &FakeSymbol, pattern: &str, opts: SearchOpts) -> bool {
        let name = if opts.contains(SearchOpts::UNDECORATED_NAME) {
            symbol.undecorated.as_deref()
        } else {
            symbol.mangled.as_deref()
        };
        let Some(name) = name else { return false };

        if opts.contains(SearchOpts::CASE_SENSITIVE) {
            name == pattern
        } else {
            name.eq_ignore_ascii_case(pattern)
        }
    }
}

impl DebugInfoProvider for FakeProvider {
    type Session = FakeSession;
    type Scope = FakeScope;
    type Enumerator = FakeEnumerator;
    type Candidate = FakeCandidate;
    type Text = FakeText;

    fn attach_session(&self, _process: ProcessHandle, base_addr: Addr) -> Result<Self::Session> {
        if self.state.not_attachable.get() {
            return Err(Error::new(
                ErrorKind::SessionUnavailable,
                format!("no active session at {base_addr:#x}"),
            ))
        }
        self.state.counters.borrow_mut().sessions_opened += 1;
        Ok(FakeSession)
    }

    fn open_session_from_file(&self, path: &Path, _base_addr: Addr) -> Result<Self::Session> {
        if self.state.unloadable.get() {
            return Err(Error::new(
                ErrorKind::LoadFailed,
                format!("failed to parse `{}`", path.display()),
            ))
        }
        if self.state.unopenable.get() {
            return Err(Error::new(
                ErrorKind::SessionOpenFailed,
                "no session could be constructed from loaded data",
            ))
        }
        self.state.counters.borrow_mut().sessions_opened += 1;
        Ok(FakeSession)
    }

    fn release_session(&self, _session: Self::Session) {
        self.state.counters.borrow_mut().sessions_released += 1;
    }

    fn global_scope(&self, _session: &Self::Session) -> Result<Option<Self::Scope>> {
        if self.state.fail_global_scope.get() {
            return Err(Error::with_status(
                ErrorKind::ProviderFailure,
                E_FAIL,
                "global scope query failed",
            ))
        }
        if self.state.no_global_scope.get() {
            return Ok(None)
        }
        self.state.counters.borrow_mut().scopes_acquired += 1;
        Ok(Some(FakeScope))
    }

    fn find_children(
        &self,
        _session: &Self::Session,
        _scope: &Self::Scope,
        tag: SymTag,
        pattern: Option<&str>,
        opts: SearchOpts,
    ) -> Result<Self::Enumerator> {
        if self.state.fail_find_children.get() {
            return Err(Error::with_status(
                ErrorKind::EnumeratorOpenFailed,
                E_FAIL,
                "child enumeration rejected",
            ))
        }

        let items = self
            .state
            .symbols
            .iter()
            .enumerate()
            .filter(|(_idx, symbol)| tag == SymTag::Null || symbol.tag == tag)
            .filter(|(_idx, symbol)| match pattern {
                Some(pattern) => self.native_matches(symbol, pattern, opts),
                None => true,
            })
            .map(|(idx, _symbol)| idx)
            .collect();

        self.state.counters.borrow_mut().enumerators_opened += 1;
        Ok(FakeEnumerator { items, pos: 0 })
    }

    fn next(&self, enumerator: &mut Self::Enumerator) -> Result<Option<Self::Candidate>> {
        if self.state.fail_next_at.get() == Some(enumerator.pos) {
            return Err(Error::with_status(
                ErrorKind::ProviderFailure,
                E_FAIL,
                "enumerator step failed",
            ))
        }

        let Some(&index) = enumerator.items.get(enumerator.pos) else {
            return Ok(None)
        };
        enumerator.pos += 1;
        self.state.counters.borrow_mut().candidates_acquired += 1;
        Ok(Some(FakeCandidate { index }))
    }

    fn candidate_name(
        &self,
        candidate: &Self::Candidate,
        decorated: bool,
        _max_len_hint: u32,
    ) -> Result<Option<Self::Text>> {
        let symbol = &self.state.symbols[candidate.index];
        let name = if decorated {
            symbol.mangled.as_ref()
        } else {
            symbol.undecorated.as_ref()
        };

        match name {
            Some(name) => {
                self.state.counters.borrow_mut().strings_allocated += 1;
                Ok(Some(FakeText(name.clone())))
            }
            None => Ok(None),
        }
    }

    fn candidate_virtual_address(&self, candidate: &Self::Candidate) -> Addr {
        self.state.symbols[candidate.index].addr
    }

    fn release_scope(&self, _scope: Self::Scope) {
        self.state.counters.borrow_mut().scopes_released += 1;
    }

    fn release_enumerator(&self, _enumerator: Self::Enumerator) {
        self.state.counters.borrow_mut().enumerators_released += 1;
    }

    fn release_candidate(&self, _candidate: Self::Candidate) {
        self.state.counters.borrow_mut().candidates_released += 1;
    }

    fn free_string(&self, _text: Self::Text, how: StringFree) {
        let mut counters = self.state.counters.borrow_mut();
        match how {
            StringFree::Provider => counters.strings_freed_provider += 1,
            StringFree::Local => counters.strings_freed_local += 1,
        }
    }
}


/// Create a provider with a small mixed symbol table shared by several
/// tests.
pub(crate) fn provider_with_functions() -> FakeProvider {
    FakeProvider::with_symbols(vec![
        FakeSymbol::new("?foo@@YAXXZ", "foo", 0x1000, SymTag::Function),
        FakeSymbol::new("?foobar@@YAHXZ", "foobar", 0x1100, SymTag::Function),
        FakeSymbol::new("?barfoo@@YAHXZ", "barfoo", 0x1200, SymTag::Function),
        FakeSymbol::new("?gData@@3HA", "gData", 0x2000, SymTag::Data),
    ])
}
