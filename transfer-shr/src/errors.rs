//! Defines commonly used functions and structs relating to error handling.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FResult};

/// The formatter returned by [`ErrorTrace::trace`].
#[derive(Debug)]
pub struct ErrorTraceFormatter<'e> {
    err: &'e dyn Error,
}
impl Display for ErrorTraceFormatter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult {
        write!(f, "{}", self.err)?;
        if let Some(source) = self.err.source() {
            write!(f, "\n\nCaused by:")?;
            let mut i: usize = 1;
            let mut source: Option<&dyn Error> = Some(source);
            while let Some(err) = source {
                write!(f, "\n  {i}) {err}")?;
                source = err.source();
                i += 1;
            }
        }
        Ok(())
    }
}

/// Prints an error together with its full [`Error::source`] chain.
///
/// Every component-level error enum in this workspace implements
/// `std::error::Error` by hand rather than via a derive macro, chaining
/// into its cause through `source()`; this trait is the one place that
/// chain gets walked and printed, so a top-level `error!(\"{}\", err.trace())`
/// shows every link instead of only the outermost message.
pub trait ErrorTrace: Error {
    fn trace(&self) -> ErrorTraceFormatter<'_>;
}
impl<T: Error> ErrorTrace for T {
    #[inline]
    fn trace(&self) -> ErrorTraceFormatter<'_> { ErrorTraceFormatter { err: self } }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Inner;
    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "inner failure") }
    }
    impl Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);
    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "outer failure") }
    }
    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> { Some(&self.0) }
    }

    #[test]
    fn trace_includes_full_chain() {
        let err = Outer(Inner);
        let traced = err.trace().to_string();
        assert!(traced.contains("outer failure"));
        assert!(traced.contains("Caused by:"));
        assert!(traced.contains("1) inner failure"));
    }

    #[test]
    fn trace_of_leaf_error_has_no_caused_by() {
        let traced = Inner.trace().to_string();
        assert_eq!(traced, "inner failure");
    }
}
