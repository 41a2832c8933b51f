//! Diagnostics: lint AppMap text → LSP diagnostics.
//!
//! Parsing never fails, so every diagnostic comes from the linter: lines
//! that parse, but not into what the author probably meant.

use am_core::grammar::lines;
use am_core::lint::{LintDiagnostic, LintSeverity, lint_document};
use tower_lsp::lsp_types::*;

pub const SOURCE: &str = "am-lsp";

/// Lint the document and convert each finding to a whole-line diagnostic.
pub fn compute_diagnostics(text: &str) -> Vec<Diagnostic> {
    lint_document(text)
        .iter()
        .map(|diag| to_lsp(text, diag))
        .collect()
}

fn to_lsp(text: &str, diag: &LintDiagnostic) -> Diagnostic {
    Diagnostic {
        range: line_range(text, diag.line),
        severity: Some(match diag.severity {
            LintSeverity::Warning => DiagnosticSeverity::WARNING,
            LintSeverity::Info => DiagnosticSeverity::INFORMATION,
        }),
        code: Some(NumberOrString::String(diag.rule.to_string())),
        source: Some(SOURCE.to_string()),
        message: diag.message.clone(),
        ..Default::default()
    }
}

/// Range covering a whole line, excluding any trailing `\r`.
///
/// Columns are UTF-16 code units, as LSP expects.
pub fn line_range(text: &str, line: usize) -> Range {
    let width = lines(text)
        .nth(line)
        .map_or(0, |l| l.raw.trim_end_matches('\r').encode_utf16().count());
    Range {
        start: Position::new(line as u32, 0),
        end: Position::new(line as u32, width as u32),
    }
}
