//! Error adapter for converting HfCanvasError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI. Import errors are
//! shown against the document they were raised for.

use std::{error::Error, fmt, ops::Range};

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use hfcanvas::{HfCanvasError, host::import::ImportError};

/// Adapter for an import error and its document.
pub struct ImportAdapter<'a> {
    err: &'a ImportError,
    src: &'a str,
}

impl<'a> ImportAdapter<'a> {
    /// Create a new import adapter.
    pub fn new(err: &'a ImportError, src: &'a str) -> Self {
        Self { err, src }
    }

    fn label(&self) -> &'static str {
        match self.err {
            ImportError::Xml { .. } => "here",
            ImportError::DuplicateId { .. } => "id already used",
            ImportError::InvalidAttribute { .. } => "invalid attribute",
            ImportError::NotDefinitions
            | ImportError::NoRootContainer
            | ImportError::Modeling(_) => "",
        }
    }
}

impl fmt::Debug for ImportAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportAdapter")
            .field("err", &self.err)
            .finish()
    }
}

impl fmt::Display for ImportAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.err, f)
    }
}

impl Error for ImportAdapter<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.err {
            ImportError::Modeling(err) => Some(err),
            _ => None,
        }
    }
}

impl MietteDiagnostic for ImportAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("hfcanvas::import"))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.err {
            ImportError::NotDefinitions => "the document root must be a bpmn:definitions element",
            ImportError::NoRootContainer => "add a bpmn:process or a bpmn:collaboration",
            ImportError::DuplicateId { .. } => "every element needs a unique id",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.err.span()?;
        let label = LabeledSpan::new_primary_with_span(
            Some(self.label().to_string()),
            span_to_miette(span),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Adapter for the [`HfCanvasError`] variants without a document.
pub struct ErrorAdapter<'a>(pub &'a HfCanvasError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            HfCanvasError::Io(_) => "hfcanvas::io",
            HfCanvasError::Import { .. } => "hfcanvas::import",
            HfCanvasError::Modeling(_) => "hfcanvas::modeling",
            HfCanvasError::Palette(_) => "hfcanvas::palette",
            HfCanvasError::Config(_) => "hfcanvas::config",
        };
        Some(Box::new(code))
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// An import error shown against its document.
    Import(ImportAdapter<'a>),
    /// A simple error without source location.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Import(i) => fmt::Display::fmt(i, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Reportable::Import(i) => i.source(),
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Import(i) => i.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Import(i) => i.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Import(i) => i.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Import(i) => i.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a byte range of the document to a miette [`SourceSpan`].
fn span_to_miette(span: Range<usize>) -> SourceSpan {
    SourceSpan::new(span.start.into(), span.len())
}

/// Convert an [`HfCanvasError`] into a list of reportable errors.
pub fn to_reportables(err: &HfCanvasError) -> Vec<Reportable<'_>> {
    match err {
        HfCanvasError::Import { err, src } => {
            vec![Reportable::Import(ImportAdapter::new(err, src))]
        }
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_is_labelled() {
        let src = r#"<definitions><process id="A" /><task id="A" /></definitions>"#;
        let err = HfCanvasError::new_import_error(
            ImportError::DuplicateId {
                id: "A".to_string(),
                span: 31..46,
            },
            src,
        );

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);
        assert_eq!(reportables[0].to_string(), "duplicate element id `A`");

        let labels: Vec<_> = reportables[0].labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 31);
        assert_eq!(labels[0].len(), 15);
        assert!(labels[0].primary());
        assert!(reportables[0].help().is_some());
    }

    #[test]
    fn test_import_error_without_span() {
        let err = HfCanvasError::new_import_error(ImportError::NoRootContainer, "<definitions />");
        let reportables = to_reportables(&err);

        match &reportables[0] {
            Reportable::Import(i) => {
                assert!(i.labels().is_none());
                assert_eq!(i.code().unwrap().to_string(), "hfcanvas::import");
            }
            Reportable::Error(_) => panic!("Expected Import"),
        }
    }

    #[test]
    fn test_non_import_error() {
        let err = HfCanvasError::Config("bad colour".to_string());
        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(e.to_string(), "Configuration error: bad colour");
                assert_eq!(e.code().unwrap().to_string(), "hfcanvas::config");
            }
            Reportable::Import(_) => panic!("Expected Error"),
        }
    }
}
