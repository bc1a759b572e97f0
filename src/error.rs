use std::borrow::Cow;
use std::error;
use std::fmt;
use std::io;
use std::result;


/// A result type using our [`Error`] by default.
pub type Result<T, E = Error> = result::Result<T, E>;


/// An enum providing a rough classification of errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The session's native handle has been released or was never
    /// established.
    SessionUnavailable,
    /// Symbol data could not be loaded from a PDB file.
    LoadFailed,
    /// A session could not be constructed from loaded symbol data.
    SessionOpenFailed,
    /// The provider failed to open a child-symbol enumerator.
    EnumeratorOpenFailed,
    /// The provider reported no name for a symbol candidate.
    NameUnavailable,
    /// The provider reported a failure status.
    ProviderFailure,
    /// An input, such as a search pattern, was invalid.
    InvalidInput,
    /// An I/O error occurred.
    Io,
    /// Any other error.
    Other,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::SessionUnavailable => "session unavailable",
            Self::LoadFailed => "failed to load symbol data",
            Self::SessionOpenFailed => "failed to open session",
            Self::EnumeratorOpenFailed => "failed to open symbol enumerator",
            Self::NameUnavailable => "symbol name unavailable",
            Self::ProviderFailure => "provider failure",
            Self::InvalidInput => "invalid input",
            Self::Io => "I/O error",
            Self::Other => "error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// The error type used by the crate.
///
/// Errors carry a [`kind`][Error::kind] for programmatic inspection, an
/// optional provider status code, and a chain of context messages added
/// via [`ErrorExt`].
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    status: Option<i32>,
    msg: Option<Cow<'static, str>>,
    /// Context messages, innermost first.
    context: Vec<Cow<'static, str>>,
    source: Option<Box<dyn error::Error + Send + Sync + 'static>>,
}

impl Error {
    /// Create a new error of the given kind with a message.
    pub fn new(kind: ErrorKind, msg: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            status: None,
            msg: Some(msg.into()),
            context: Vec::new(),
            source: None,
        }
    }

    /// Create an error representing a provider failure status.
    pub fn with_status(kind: ErrorKind, status: i32, msg: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            status: Some(status),
            msg: Some(msg.into()),
            context: Vec::new(),
            source: None,
        }
    }

    /// Retrieve a rough classification of the error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Retrieve the provider status code associated with the error, if
    /// any.
    ///
    /// The status is the last non-zero result the provider reported
    /// before the operation was abandoned.
    #[inline]
    pub fn status(&self) -> Option<i32> {
        self.status
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for context in self.context.iter().rev() {
            write!(f, "{context}: ")?;
        }
        match &self.msg {
            Some(msg) => write!(f, "{msg}")?,
            None => write!(f, "{}", self.kind)?,
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status:#x})")?;
        }

        let mut source = self.source.as_deref().map(|err| err as &dyn error::Error);
        while let Some(err) = source {
            write!(f, ": {err}")?;
            source = err.source();
        }
        Ok(())
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn error::Error + 'static))
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self {
            kind: ErrorKind::Io,
            status: None,
            msg: None,
            context: Vec::new(),
            source: Some(Box::new(err)),
        }
    }
}


/// A trait providing ergonomic context chaining capabilities to [`Error`]
/// and `Result`s containing one.
pub trait ErrorExt: private::Sealed {
    /// The output type produced by [`context`](Self::context) and
    /// [`with_context`](Self::with_context).
    type Output;

    /// Add context to this error.
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self::Output;

    /// Add context to this error, lazily evaluated.
    fn with_context<C, F>(self, f: F) -> Self::Output
    where
        C: Into<Cow<'static, str>>,
        F: FnOnce() -> C;
}

impl ErrorExt for Error {
    type Output = Error;

    fn context(mut self, context: impl Into<Cow<'static, str>>) -> Self::Output {
        self.context.push(context.into());
        self
    }

    fn with_context<C, F>(mut self, f: F) -> Self::Output
    where
        C: Into<Cow<'static, str>>,
        F: FnOnce() -> C,
    {
        self.context.push(f().into());
        self
    }
}

impl<T, E> ErrorExt for Result<T, E>
where
    E: Into<Error>,
{
    type Output = Result<T, Error>;

    fn context(self, context: impl Into<Cow<'static, str>>) -> Self::Output {
        self.map_err(|err| err.into().context(context))
    }

    fn with_context<C, F>(self, f: F) -> Self::Output
    where
        C: Into<Cow<'static, str>>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.into().with_context(f))
    }
}

mod private {
    use super::Error;
    use super::Result;

    pub trait Sealed {}

    impl Sealed for Error {}
    impl<T, E> Sealed for Result<T, E> where E: Into<Error> {}
}
