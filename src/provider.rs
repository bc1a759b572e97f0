//! The interface to the underlying debug-information provider.
//!
//! The provider owns everything this crate does not: PDB parsing, the
//! symbol tables of an open session, name undecoration, and the native
//! handles standing for sessions, scopes, enumerators, and symbol
//! candidates. The search engine drives a provider exclusively through
//! the [`DebugInfoProvider`] trait, which keeps it testable against an
//! in-memory double.

use std::path::Path;

use crate::search::SearchOpts;
use crate::Addr;
use crate::Result;


/// The richest undecoration detail a provider supports, passed as the
/// maximum-length hint when an undecorated name is requested.
pub const UNDNAME_MAX: u32 = 0x1000;


/// An opaque value identifying an operating-system process under
/// examination by the provider.
pub type ProcessHandle = usize;


/// The routine through which a provider-allocated string must be freed.
///
/// Which routine is correct depends on how the owning session was
/// created: a session attached to a live debugging target frees strings
/// through the provider's own entry point, while a session opened
/// directly from a PDB file frees them through the local allocator. The
/// choice is captured per session, never globally.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StringFree {
    /// Free through the provider's string-free entry point.
    Provider,
    /// Free through the local allocator.
    Local,
}


/// The tag identifying the kind of a symbol.
///
/// [`SymTag::Null`] acts as a wildcard: child enumeration scoped to it
/// yields symbols of every kind.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(u32)]
#[non_exhaustive]
pub enum SymTag {
    /// No kind restriction.
    #[default]
    Null = 0,
    /// The executable itself.
    Exe = 1,
    /// A compilation unit.
    Compiland = 2,
    /// Extended compilation unit attributes.
    CompilandDetails = 3,
    /// Compilation unit environment strings.
    CompilandEnv = 4,
    /// A function.
    Function = 5,
    /// A nested block scope.
    Block = 6,
    /// A data symbol, such as a variable.
    Data = 7,
    /// A code annotation.
    Annotation = 8,
    /// A label.
    Label = 9,
    /// A public symbol; for stripped symbol stores often the only kind
    /// present.
    PublicSymbol = 10,
    /// A user defined type.
    Udt = 11,
    /// An enumeration type.
    Enum = 12,
    /// A function signature type.
    FunctionType = 13,
    /// A pointer type.
    PointerType = 14,
    /// An array type.
    ArrayType = 15,
    /// A base type, such as an integer.
    BaseType = 16,
    /// A typedef.
    Typedef = 17,
    /// A base class of a user defined type.
    BaseClass = 18,
    /// A friend declaration.
    Friend = 19,
    /// A function argument type.
    FunctionArgType = 20,
    /// The end of the function prologue.
    FuncDebugStart = 21,
    /// The start of the function epilogue.
    FuncDebugEnd = 22,
    /// A namespace import.
    UsingNamespace = 23,
    /// A virtual table shape.
    VTableShape = 24,
    /// A virtual table.
    VTable = 25,
    /// A custom symbol.
    Custom = 26,
    /// A thunk.
    Thunk = 27,
    /// A custom compiler type.
    CustomType = 28,
    /// A managed (CLR) type.
    ManagedType = 29,
    /// A FORTRAN array dimension.
    Dimension = 30,
}


/// The interface through which the search engine drives a
/// debug-information provider.
///
/// All handle types are exclusively owned tokens: the engine releases
/// each acquired handle exactly once through the corresponding
/// `release_*` operation, on every control-flow path. Strings returned
/// by [`candidate_name`][Self::candidate_name] remain provider-owned and
/// must be passed back through [`free_string`][Self::free_string] after
/// their contents have been copied out.
///
/// All operations block the calling thread; the trait assumes no
/// internal parallelism and implementations need not be thread-safe.
pub trait DebugInfoProvider {
    /// An open debug-information session bound to a base load address.
    type Session;
    /// The root symbol container of a session.
    type Scope;
    /// A one-at-a-time enumerator over child symbols of a scope.
    type Enumerator;
    /// A transient symbol candidate, scoped to one enumeration step.
    type Candidate;
    /// Provider-owned text.
    type Text: AsRef<str>;

    /// Bind to an existing debugging session for a process already under
    /// examination by the provider.
    ///
    /// Fails with [`ErrorKind::SessionUnavailable`][crate::ErrorKind] if
    /// the provider reports no active session at the given base address.
    fn attach_session(&self, process: ProcessHandle, base_addr: Addr) -> Result<Self::Session>;

    /// Load symbol data from a PDB file and open a fresh session at the
    /// given base address.
    ///
    /// Fails with [`ErrorKind::LoadFailed`][crate::ErrorKind] if the
    /// file cannot be parsed and
    /// [`ErrorKind::SessionOpenFailed`][crate::ErrorKind] if no session
    /// can be constructed from the loaded data.
    fn open_session_from_file(&self, path: &Path, base_addr: Addr) -> Result<Self::Session>;

    /// Release a session handle.
    fn release_session(&self, session: Self::Session);

    /// Obtain the global scope of a session.
    ///
    /// `Ok(None)` means the session has no global scope; searches treat
    /// that as "no symbols", not as an error.
    fn global_scope(&self, session: &Self::Session) -> Result<Option<Self::Scope>>;

    /// Open an enumerator over the children of `scope`, restricted to
    /// symbols tagged `tag` and, if `pattern` is given, filtered by the
    /// provider's native name search honoring `opts`.
    fn find_children(
        &self,
        session: &Self::Session,
        scope: &Self::Scope,
        tag: SymTag,
        pattern: Option<&str>,
        opts: SearchOpts,
    ) -> Result<Self::Enumerator>;

    /// Fetch the next candidate from an enumerator, or `Ok(None)` at the
    /// end of the sequence.
    fn next(&self, enumerator: &mut Self::Enumerator) -> Result<Option<Self::Candidate>>;

    /// Retrieve a candidate's name.
    ///
    /// With `decorated` set the raw (mangled) name is returned,
    /// otherwise the undecorated name with up to `max_len_hint` bytes of
    /// undecoration detail. `Ok(None)` means the provider has no name
    /// for the candidate.
    fn candidate_name(
        &self,
        candidate: &Self::Candidate,
        decorated: bool,
        max_len_hint: u32,
    ) -> Result<Option<Self::Text>>;

    /// Retrieve a candidate's virtual address, as an offset from the
    /// session's base load address.
    fn candidate_virtual_address(&self, candidate: &Self::Candidate) -> Addr;

    /// Release a scope handle.
    fn release_scope(&self, scope: Self::Scope);

    /// Release an enumerator handle.
    fn release_enumerator(&self, enumerator: Self::Enumerator);

    /// Release a candidate handle.
    fn release_candidate(&self, candidate: Self::Candidate);

    /// Free provider-owned text through the given deallocation routine.
    fn free_string(&self, text: Self::Text, how: StringFree);
}
