use std::error::Error;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;

pub type CoreRsResult<T> = Result<T, Exception>;

pub struct Exception {
    pub severity: Severity,
    pub message: String,
    pub location: Option<String>,
    pub source: Option<Box<Exception>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warn => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

impl Debug for Exception {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

// prints the whole source chain, one cause per line
impl Display for Exception {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut current = Some(self);
        let mut index = 0;
        while let Some(exception) = current {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{index}: {} {}", exception.severity, exception.message)?;
            if let Some(ref location) = exception.location {
                write!(f, " at {location}")?;
            }
            index += 1;
            current = exception.source.as_deref();
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! exception {
    ($(severity = $severity:expr,)? message = $message:expr $(,source = $source:expr)?) => {{
        #[allow(unused_variables)]
        let severity = $crate::exception::Severity::Error;
        $(
            let severity = $severity;
        )?
        #[allow(unused_variables)]
        let source: Option<Box<$crate::exception::Exception>> = None;
        $(
            let source = Some(Box::new($source.into()));
        )?
        $crate::exception::Exception {
            severity,
            message: $message.to_string(),
            location: Some(format!("{}:{}:{}", file!(), line!(), column!())),
            source,
        }
    }};
}

fn source_chain(error: Option<&(dyn Error + 'static)>) -> Option<Box<Exception>> {
    let mut causes = Vec::new();
    let mut current = error;
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }

    causes.into_iter().rev().fold(None, |source, message| {
        Some(Box::new(Exception {
            severity: Severity::Error,
            message,
            location: None,
            source,
        }))
    })
}

impl<T> From<T> for Exception
where
    T: Error + 'static,
{
    fn from(error: T) -> Self {
        Exception {
            severity: Severity::Error,
            message: error.to_string(),
            location: None,
            source: source_chain(error.source()),
        }
    }
}
