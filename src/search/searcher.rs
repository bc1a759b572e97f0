//! The match engine and the enumeration driver behind
//! [`Session::search`][crate::Session::search].

use crate::log::debug;
use crate::log::trace;
use crate::log::warn;
use crate::provider::DebugInfoProvider;
use crate::provider::StringFree;
use crate::provider::UNDNAME_MAX;
use crate::Error;
use crate::ErrorExt as _;
use crate::ErrorKind;
use crate::Result;

use super::Glob;
use super::Pattern;
use super::SearchOpts;
use super::SearchRequest;
use super::SymbolMatch;


/// Scoped ownership of a global scope handle.
struct ScopeGuard<'prov, P>
where
    P: DebugInfoProvider,
{
    provider: &'prov P,
    scope: Option<P::Scope>,
}

impl<'prov, P> ScopeGuard<'prov, P>
where
    P: DebugInfoProvider,
{
    fn new(provider: &'prov P, scope: P::Scope) -> Self {
        Self {
            provider,
            scope: Some(scope),
        }
    }

    fn get(&self) -> &P::Scope {
        // The handle is only ever taken out by `Drop`.
        self.scope.as_ref().unwrap()
    }
}

impl<P> Drop for ScopeGuard<'_, P>
where
    P: DebugInfoProvider,
{
    fn drop(&mut self) {
        if let Some(scope) = self.scope.take() {
            let () = self.provider.release_scope(scope);
        }
    }
}


/// Scoped ownership of an enumerator handle.
struct EnumeratorGuard<'prov, P>
where
    P: DebugInfoProvider,
{
    provider: &'prov P,
    enumerator: Option<P::Enumerator>,
}

impl<'prov, P> EnumeratorGuard<'prov, P>
where
    P: DebugInfoProvider,
{
    fn new(provider: &'prov P, enumerator: P::Enumerator) -> Self {
        Self {
            provider,
            enumerator: Some(enumerator),
        }
    }

    fn get_mut(&mut self) -> &mut P::Enumerator {
        // The handle is only ever taken out by `Drop`.
        self.enumerator.as_mut().unwrap()
    }
}

impl<P> Drop for EnumeratorGuard<'_, P>
where
    P: DebugInfoProvider,
{
    fn drop(&mut self) {
        if let Some(enumerator) = self.enumerator.take() {
            let () = self.provider.release_enumerator(enumerator);
        }
    }
}


/// Scoped ownership of a symbol candidate, released at the end of its
/// enumeration step no matter how the step ends.
struct CandidateGuard<'prov, P>
where
    P: DebugInfoProvider,
{
    provider: &'prov P,
    candidate: Option<P::Candidate>,
}

impl<'prov, P> CandidateGuard<'prov, P>
where
    P: DebugInfoProvider,
{
    fn new(provider: &'prov P, candidate: P::Candidate) -> Self {
        Self {
            provider,
            candidate: Some(candidate),
        }
    }

    fn get(&self) -> &P::Candidate {
        // The handle is only ever taken out by `Drop`.
        self.candidate.as_ref().unwrap()
    }
}

impl<P> Drop for CandidateGuard<'_, P>
where
    P: DebugInfoProvider,
{
    fn drop(&mut self) {
        if let Some(candidate) = self.candidate.take() {
            let () = self.provider.release_candidate(candidate);
        }
    }
}


/// Resolve a candidate's name, copying the provider-owned text into the
/// caller's memory and freeing it through the session's deallocation
/// routine.
fn resolve_name<P>(
    provider: &P,
    strings: StringFree,
    candidate: &P::Candidate,
    want_mangled: bool,
) -> Result<String>
where
    P: DebugInfoProvider,
{
    let max_len_hint = if want_mangled { 0 } else { UNDNAME_MAX };
    let text = provider.candidate_name(candidate, want_mangled, max_len_hint)?;
    let Some(text) = text else {
        return Err(Error::new(
            ErrorKind::NameUnavailable,
            "provider reported no name for symbol candidate",
        ))
    };

    let name = text.as_ref().to_string();
    let () = provider.free_string(text, strings);
    Ok(name)
}


/// Decide inclusion of a candidate enumerated through the provider's
/// native filter.
///
/// The provider has already done the matching; what is left is
/// resolving the undecorated display name and the address.
fn match_literal<P>(
    provider: &P,
    strings: StringFree,
    candidate: &P::Candidate,
) -> Result<Option<SymbolMatch>>
where
    P: DebugInfoProvider,
{
    let name = resolve_name(provider, strings, candidate, false)?;
    let addr = provider.candidate_virtual_address(candidate);
    Ok(Some(SymbolMatch { name, addr }))
}


/// Decide inclusion of a candidate against a client-side glob.
fn match_glob<P>(
    provider: &P,
    strings: StringFree,
    candidate: &P::Candidate,
    glob: &Glob,
    opts: SearchOpts,
) -> Result<Option<SymbolMatch>>
where
    P: DebugInfoProvider,
{
    // The option flag controls which name variant is *matched*, not
    // merely display formatting: absent `UNDECORATED_NAME`, the glob
    // runs against the raw mangled names.
    let is_mangled_search = !opts.contains(SearchOpts::UNDECORATED_NAME);
    let name = resolve_name(provider, strings, candidate, is_mangled_search)?;
    if !glob.is_match(&name) {
        return Ok(None)
    }

    // Reporting always uses the undecorated form, so a match against
    // the mangled name needs a second resolution.
    let name = if is_mangled_search {
        resolve_name(provider, strings, candidate, false)?
    } else {
        name
    };
    let addr = provider.candidate_virtual_address(candidate);
    Ok(Some(SymbolMatch { name, addr }))
}


/// Run a search over the global scope of `session`, invoking `visitor`
/// once per match in provider enumeration order.
///
/// Returns the number of matches visited on complete enumeration. A
/// provider failure while opening or stepping the enumerator is
/// reported as an error carrying the provider's status, but matches
/// already handed to the visitor stand.
pub(crate) fn search<P, F>(
    provider: &P,
    session: &P::Session,
    strings: StringFree,
    request: &SearchRequest,
    mut visitor: F,
) -> Result<usize>
where
    P: DebugInfoProvider,
    F: FnMut(SymbolMatch),
{
    // Compile the glob up front so that an invalid pattern fails before
    // any native resources are acquired.
    let glob = match &request.pattern {
        Pattern::Glob(mask) => {
            let case_insensitive = !request.opts.contains(SearchOpts::CASE_SENSITIVE);
            Some(Glob::new(mask, case_insensitive)?)
        }
        Pattern::Literal(..) => None,
    };

    let scope = match provider.global_scope(session) {
        Ok(Some(scope)) => ScopeGuard::new(provider, scope),
        Ok(None) => {
            debug!("session has no global scope; reporting zero matches");
            return Ok(0)
        }
        Err(err) => {
            // An unavailable global scope means "no symbols", not a
            // failed search.
            warn!("failed to obtain global scope: {err}; reporting zero matches");
            return Ok(0)
        }
    };

    // The provider's native filter has no notion of glob syntax; glob
    // searches enumerate unfiltered, scoped by tag only.
    let pattern = match &request.pattern {
        Pattern::Literal(mask) => Some(mask.as_str()),
        Pattern::Glob(..) => None,
    };
    let enumerator = provider
        .find_children(session, scope.get(), request.tag, pattern, request.opts)
        .context("failed to open child-symbol enumerator")?;
    let mut enumerator = EnumeratorGuard::new(provider, enumerator);

    let mut matched = 0;
    loop {
        let candidate = provider
            .next(enumerator.get_mut())
            .context("failed to step symbol enumerator")?;
        let Some(candidate) = candidate else { break };
        let candidate = CandidateGuard::new(provider, candidate);

        let result = match &glob {
            Some(glob) => match_glob(provider, strings, candidate.get(), glob, request.opts),
            None => match_literal(provider, strings, candidate.get()),
        };
        match result {
            Ok(Some(sym)) => {
                trace!("reporting {} @ {:#x}", sym.name, sym.addr);
                let () = visitor(sym);
                matched += 1;
            }
            Ok(None) => (),
            Err(err) => {
                // A single bad symbol must never abort the search;
                // candidates whose name cannot be resolved are skipped.
                debug!("skipping symbol candidate: {err}");
            }
        }
    }
    Ok(matched)
}
