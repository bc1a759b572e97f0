//! Ownership of an open debug-information session.

use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::path::Path;

use crate::log::debug;
use crate::provider::DebugInfoProvider;
use crate::provider::ProcessHandle;
use crate::provider::StringFree;
use crate::search;
use crate::search::SearchRequest;
use crate::search::SymbolMatch;
use crate::Addr;
use crate::Error;
use crate::ErrorExt as _;
use crate::ErrorKind;
use crate::Result;


/// An exclusively owned handle to an open debug-information session,
/// anchored at a base load address.
///
/// A `Session` pins a native provider resource outside normal memory
/// management. It guarantees exactly-once release of that resource:
/// [`release`][Self::release] may be called any number of times (and is
/// called implicitly on drop), but the underlying handle is returned to
/// the provider only once.
///
/// The session also captures which string-deallocation routine the
/// provider requires for it, as that depends on how the session was
/// created (see [`StringFree`]).
///
/// A `Session` is owned by a single logical caller at a time; it is
/// deliberately not thread-safe.
pub struct Session<P>
where
    P: DebugInfoProvider,
{
    provider: P,
    handle: Option<P::Session>,
    strings: StringFree,
    base_addr: Addr,
}

impl<P> Session<P>
where
    P: DebugInfoProvider,
{
    /// Bind to an existing debugging session for a process already
    /// under examination by the provider.
    ///
    /// Strings produced on behalf of such a session are freed through
    /// the provider's own entry point.
    pub fn attach(provider: P, process: ProcessHandle, base_addr: Addr) -> Result<Self> {
        let handle = provider
            .attach_session(process, base_addr)
            .with_context(|| format!("failed to attach to session at {base_addr:#x}"))?;

        Ok(Self {
            provider,
            handle: Some(handle),
            strings: StringFree::Provider,
            base_addr,
        })
    }

    /// Load symbol data from a PDB file and open a fresh session at the
    /// given base address.
    ///
    /// Strings produced on behalf of such a session are freed through
    /// the local allocator.
    pub fn from_file(provider: P, path: &Path, base_addr: Addr) -> Result<Self> {
        let handle = provider
            .open_session_from_file(path, base_addr)
            .with_context(|| format!("failed to open session from `{}`", path.display()))?;

        Ok(Self {
            provider,
            handle: Some(handle),
            strings: StringFree::Local,
            base_addr,
        })
    }

    /// Retrieve the base load address the session is anchored at.
    #[inline]
    pub fn base_addr(&self) -> Addr {
        self.base_addr
    }

    /// Check whether the session's native handle has been released.
    #[inline]
    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    /// Release the session's native handle.
    ///
    /// Idempotent: releasing an already released session is a no-op.
    /// Dropping the session releases implicitly.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("releasing session at {:#x}", self.base_addr);
            let () = self.provider.release_session(handle);
        }
    }

    /// Search the session's symbols, invoking `visitor` once per match
    /// with the symbol's undecorated display name and virtual address.
    ///
    /// Matches are reported in provider enumeration order. On complete
    /// enumeration the number of matches visited is returned; a
    /// provider failure mid-enumeration is reported as an error, with
    /// matches already handed to the visitor standing either way. A
    /// session without symbols (no global scope) completes successfully
    /// with zero matches.
    pub fn search<F>(&self, request: &SearchRequest, visitor: F) -> Result<usize>
    where
        F: FnMut(SymbolMatch),
    {
        let Some(handle) = &self.handle else {
            return Err(Error::new(
                ErrorKind::SessionUnavailable,
                "cannot search a released session",
            ))
        };
        search::search(&self.provider, handle, self.strings, request, visitor)
    }
}

impl<P> Debug for Session<P>
where
    P: DebugInfoProvider,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_addr", &format_args!("{:#x}", self.base_addr))
            .field("strings", &self.strings)
            .field("released", &self.handle.is_none())
            .finish()
    }
}

impl<P> Drop for Session<P>
where
    P: DebugInfoProvider,
{
    fn drop(&mut self) {
        let () = self.release();
    }
}
