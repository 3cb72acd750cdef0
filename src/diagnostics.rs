use crate::language::errors::SyntaxError;
use crate::runtime::error::RuntimeError;
use crate::sem::{deadlock::DeadlockWarning, race::RaceWarning};
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SyntaxDiagnostic {
    #[source_code]
    src: NamedSource,
    #[label("here")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
    message: String,
}

impl SyntaxDiagnostic {
    pub fn from_error(src: NamedSource, err: SyntaxError) -> Self {
        Self {
            src,
            span: err.span.into(),
            help: err.help.clone(),
            message: err.message,
        }
    }
}

pub fn emit_syntax_errors(path: &str, source: &str, errors: &[SyntaxError]) {
    for err in errors {
        let src = NamedSource::new(path, source.to_string());
        let diagnostic = SyntaxDiagnostic::from_error(src, err.clone());
        eprintln!("{:?}", Report::new(diagnostic));
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("possible race: write to shared `{name}` outside lock/atomic")]
pub struct RaceDiagnostic {
    #[source_code]
    src: NamedSource,
    #[label("unsynchronized write")]
    span: SourceSpan,
    name: String,
}

pub fn emit_race_warnings(path: &str, source: &str, warnings: &[RaceWarning]) {
    for warning in warnings {
        let diagnostic = RaceDiagnostic {
            src: NamedSource::new(path, source.to_string()),
            span: warning.span.into(),
            name: warning.name.clone(),
        };
        eprintln!("{:?}", Report::new(diagnostic));
    }
}

pub fn emit_deadlock_warnings(warnings: &[DeadlockWarning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
        for (held, acquired) in &warning.graph {
            for next in acquired {
                eprintln!("  acquisition order: {held} -> {next}");
            }
        }
    }
}

pub fn report_runtime_error(error: &RuntimeError) {
    eprintln!("Runtime error: {}", error);
}

pub fn report_io_error(path: &Path, error: &std::io::Error) {
    eprintln!("Failed to access {}: {}", path.display(), error);
}
