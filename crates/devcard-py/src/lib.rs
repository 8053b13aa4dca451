//! Python bindings for the devcard parser and validator.

use devcard_core::{
    error::{ParseWarning as CoreParseWarning, ValidationError as CoreValidationError},
    span::Span as CoreSpan,
    Map, Node, ParseResult as CoreParseResult, Parser as CoreParser, Validator,
};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use pyo3::IntoPyObjectExt;

// ============================================================================
// Span
// ============================================================================

/// Source location in the input text (byte offsets, 1-based line).
#[pyclass(frozen, get_all, name = "Span")]
#[derive(Clone)]
pub struct PySpan {
    pub start: u32,
    pub end: u32,
    pub line: u32,
}

#[pymethods]
impl PySpan {
    fn __repr__(&self) -> String {
        format!("Span({}, {}, line={})", self.start, self.end, self.line)
    }

    #[getter]
    fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

impl From<CoreSpan> for PySpan {
    fn from(s: CoreSpan) -> Self {
        PySpan {
            start: s.start,
            end: s.end,
            line: s.line,
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// A line the parser skipped or an entry it dropped.
#[pyclass(frozen, get_all, name = "ParseWarning")]
#[derive(Clone)]
pub struct PyParseWarning {
    pub message: String,
    /// Snake-case kind, e.g. `"dangerous_key"`.
    pub kind: String,
    pub line: u32,
    pub span: PySpan,
}

#[pymethods]
impl PyParseWarning {
    fn __repr__(&self) -> String {
        format!("ParseWarning({:?}, line={})", self.kind, self.line)
    }

    fn __str__(&self) -> String {
        format!("{} at line {}", self.message, self.line)
    }
}

impl From<CoreParseWarning> for PyParseWarning {
    fn from(w: CoreParseWarning) -> Self {
        PyParseWarning {
            kind: w.kind.as_str().to_string(),
            line: w.line(),
            span: w.span.into(),
            message: w.message,
        }
    }
}

/// One violated validation rule.
#[pyclass(frozen, get_all, name = "ValidationError")]
#[derive(Clone)]
pub struct PyValidationError {
    pub code: String,
    pub message: String,
}

#[pymethods]
impl PyValidationError {
    fn __repr__(&self) -> String {
        format!("ValidationError({:?}, {:?})", self.code, self.message)
    }

    fn __str__(&self) -> String {
        self.message.clone()
    }
}

impl From<CoreValidationError> for PyValidationError {
    fn from(e: CoreValidationError) -> Self {
        PyValidationError {
            code: e.code.as_str().to_string(),
            message: e.message,
        }
    }
}

// ============================================================================
// Document conversion
// ============================================================================

fn convert_node(py: Python<'_>, node: &Node<'_>) -> PyResult<PyObject> {
    match node {
        Node::Scalar(s) => (&**s).into_py_any(py),
        Node::List(items) => {
            let list = PyList::empty(py);
            for item in items {
                list.append(convert_node(py, item)?)?;
            }
            Ok(list.into_any().unbind())
        }
        Node::Map(map) => convert_map(py, map),
    }
}

/// Python dicts keep insertion order, so the result matches document order.
fn convert_map(py: Python<'_>, map: &Map<'_>) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    for (key, value) in map.iter() {
        dict.set_item(key, convert_node(py, value)?)?;
    }
    Ok(dict.into_any().unbind())
}

// ============================================================================
// ParseResult
// ============================================================================

/// A parsed document (as a dict) and the parser's warnings.
#[pyclass(frozen, name = "ParseResult")]
pub struct PyParseResult {
    #[pyo3(get)]
    pub document: PyObject,
    #[pyo3(get)]
    pub warnings: Vec<PyParseWarning>,
}

#[pymethods]
impl PyParseResult {
    /// True when every line was understood.
    #[getter]
    fn clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn __repr__(&self, py: Python<'_>) -> PyResult<String> {
        let fields = self.document.bind(py).len()?;
        Ok(format!(
            "ParseResult(fields={}, warnings={})",
            fields,
            self.warnings.len()
        ))
    }
}

fn convert_result(py: Python<'_>, result: CoreParseResult<'_>) -> PyResult<PyParseResult> {
    let CoreParseResult { document, warnings } = result;
    Ok(PyParseResult {
        document: convert_map(py, &document.root)?,
        warnings: warnings.into_iter().map(PyParseWarning::from).collect(),
    })
}

// ============================================================================
// ValidationReport
// ============================================================================

/// Outcome of validating one card.
#[pyclass(frozen, get_all, name = "ValidationReport")]
pub struct PyValidationReport {
    pub valid: bool,
    pub errors: Vec<PyValidationError>,
}

#[pymethods]
impl PyValidationReport {
    fn __repr__(&self) -> String {
        format!(
            "ValidationReport(valid={}, errors={})",
            self.valid,
            self.errors.len()
        )
    }

    fn __bool__(&self) -> bool {
        self.valid
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Profile document parser.
///
/// Args:
///     blocked_keys: extra keys to drop, on top of the built-in
///         `__proto__`, `constructor` and `prototype`
#[pyclass(name = "Parser")]
pub struct PyParser {
    blocked_keys: Vec<String>,
}

impl PyParser {
    fn core(&self) -> CoreParser {
        self.blocked_keys
            .iter()
            .fold(CoreParser::new(), |parser, key| parser.with_blocked_key(key.clone()))
    }
}

#[pymethods]
impl PyParser {
    #[new]
    #[pyo3(signature = (blocked_keys=None), text_signature = "(blocked_keys=None)")]
    fn new(blocked_keys: Option<Vec<String>>) -> Self {
        PyParser {
            blocked_keys: blocked_keys.unwrap_or_default(),
        }
    }

    /// Parse a card. Never raises on malformed input; see `warnings`.
    #[pyo3(text_signature = "(self, input)")]
    fn parse(&self, py: Python<'_>, input: &str) -> PyResult<PyParseResult> {
        let result = self.core().parse_with_warnings(input);
        convert_result(py, result)
    }

    fn __repr__(&self) -> String {
        format!("Parser(blocked_keys={:?})", self.blocked_keys)
    }
}

// ============================================================================
// Module functions
// ============================================================================

/// Parse a card.
///
/// Args:
///     input: Card text
///
/// Returns:
///     ParseResult: document dict and parse warnings
#[pyfunction]
#[pyo3(text_signature = "(input)")]
fn parse(py: Python<'_>, input: &str) -> PyResult<PyParseResult> {
    PyParser::new(None).parse(py, input)
}

/// Parse and validate a card.
///
/// Args:
///     input: Card text
///     origin: File the card came from, e.g. "cards/@alice.yaml"; used for
///         the username cross-check
///
/// Returns:
///     ValidationReport: validity and every violated rule
#[pyfunction]
#[pyo3(signature = (input, origin=""), text_signature = "(input, origin='')")]
fn validate(input: &str, origin: &str) -> PyValidationReport {
    let document = CoreParser::new().parse(input);
    let errors = Validator::default().validate(&document, origin);
    PyValidationReport {
        valid: errors.is_empty(),
        errors: errors.into_iter().map(PyValidationError::from).collect(),
    }
}

// ============================================================================
// Module
// ============================================================================

/// devcard - profile card parser and validator.
#[pymodule]
fn pydevcard(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySpan>()?;
    m.add_class::<PyParseWarning>()?;
    m.add_class::<PyValidationError>()?;
    m.add_class::<PyParseResult>()?;
    m.add_class::<PyValidationReport>()?;
    m.add_class::<PyParser>()?;
    m.add_function(wrap_pyfunction!(parse, m)?)?;
    m.add_function(wrap_pyfunction!(validate, m)?)?;
    Ok(())
}
