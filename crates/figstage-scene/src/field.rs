//! Lenient readers for producer documents.
//!
//! The producer's encoder collapses one-element arrays into scalars and
//! one-element object lists into bare objects, so every list-valued reader
//! accepts the collapsed form too. `null` inside numeric arrays decodes as NaN.

use serde_json::{Map, Value};

use crate::colormap::Rgb;
use crate::error::DecodeError;

/// One node document.
pub(crate) type Document = Map<String, Value>;

const VECTOR: &str = "a number or a single row of numbers";
const SCALAR: &str = "a single number";
const TEXT: &str = "a string or an array of strings";
const MATRIX: &str = "an array of numbers or an array of numeric rows";

/// A field that may arrive either as one vector or as a matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixOrVec<T> {
    /// Flat sequence, read as a single row.
    Vector(Vec<T>),
    /// Nested sequence, one inner sequence per row.
    Matrix(Vec<Vec<T>>),
}

impl<T> MatrixOrVec<T> {
    /// Iterates the rows; a vector yields itself once.
    pub fn rows(&self) -> Box<dyn Iterator<Item = &[T]> + '_> {
        match self {
            Self::Vector(values) if values.is_empty() => Box::new(std::iter::empty()),
            Self::Vector(values) => Box::new(std::iter::once(values.as_slice())),
            Self::Matrix(rows) => Box::new(rows.iter().map(Vec::as_slice)),
        }
    }

    /// The single row of a vector-shaped value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FieldShape`] when the value has several rows.
    pub fn as_vector(&self, field: &'static str) -> Result<&[T], DecodeError> {
        match self {
            Self::Vector(values) => Ok(values),
            Self::Matrix(rows) => match rows.as_slice() {
                [] => Ok(&[]),
                [row] => Ok(row),
                _ => Err(DecodeError::field_shape(field, VECTOR)),
            },
        }
    }
}

/// Colour given either as an RGB triple or as a symbolic keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpec {
    /// Literal colour.
    Rgb(Rgb),
    /// Keyword such as `none`, `flat` or `interp`.
    Symbolic(String),
}

impl ColorSpec {
    /// Returns `true` for the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Self::Symbolic(value) if value == keyword)
    }
}

fn present<'a>(doc: &'a Document, field: &str) -> Option<&'a Value> {
    doc.get(field).filter(|value| !value.is_null())
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Null => Some(f64::NAN),
        _ => None,
    }
}

fn number_row(values: &[Value]) -> Option<Vec<f64>> {
    values.iter().map(number).collect()
}

/// Numeric vector. Absent fields read as `None`; a one-row matrix is
/// accepted as its row.
pub(crate) fn numbers(
    doc: &Document,
    field: &'static str,
) -> Result<Option<Vec<f64>>, DecodeError> {
    let Some(matrix) = matrix_or_vec(doc, field)? else {
        return Ok(None);
    };
    matrix.as_vector(field).map(|row| Some(row.to_vec()))
}

/// Numeric vector of exactly `N` elements, or `None` when absent or empty.
pub(crate) fn fixed<const N: usize>(
    doc: &Document,
    field: &'static str,
    expected: &'static str,
) -> Result<Option<[f64; N]>, DecodeError> {
    match numbers(doc, field)? {
        None => Ok(None),
        Some(values) if values.is_empty() => Ok(None),
        Some(values) => <[f64; N]>::try_from(values)
            .map(Some)
            .map_err(|_| DecodeError::field_shape(field, expected)),
    }
}

/// A single number, or `None` when absent or empty.
pub(crate) fn scalar(doc: &Document, field: &'static str) -> Result<Option<f64>, DecodeError> {
    match numbers(doc, field)?.as_deref() {
        None | Some([]) => Ok(None),
        Some([value]) => Ok(Some(*value)),
        Some(_) => Err(DecodeError::field_shape(field, SCALAR)),
    }
}

/// Vector-or-matrix numeric field.
pub(crate) fn matrix_or_vec(
    doc: &Document,
    field: &'static str,
) -> Result<Option<MatrixOrVec<f64>>, DecodeError> {
    let Some(value) = present(doc, field) else {
        return Ok(None);
    };
    let shape = || DecodeError::field_shape(field, MATRIX);
    let Value::Array(items) = value else {
        return number(value)
            .map(|n| Some(MatrixOrVec::Vector(vec![n])))
            .ok_or_else(shape);
    };
    if items.iter().all(|item| !item.is_array()) {
        return number_row(items)
            .map(|row| Some(MatrixOrVec::Vector(row)))
            .ok_or_else(shape);
    }
    items
        .iter()
        .map(|item| match item {
            Value::Array(row) => number_row(row),
            other => number(other).map(|n| vec![n]),
        })
        .collect::<Option<Vec<_>>>()
        .map(|rows| Some(MatrixOrVec::Matrix(rows)))
        .ok_or_else(shape)
}

/// Rows of exactly three numbers. Absent fields read as an empty list.
pub(crate) fn triples(
    doc: &Document,
    field: &'static str,
    expected: &'static str,
) -> Result<Vec<[f64; 3]>, DecodeError> {
    let Some(matrix) = matrix_or_vec(doc, field)? else {
        return Ok(Vec::new());
    };
    matrix
        .rows()
        .map(|row| <[f64; 3]>::try_from(row).map_err(|_| DecodeError::field_shape(field, expected)))
        .collect()
}

/// Text field; arrays of strings are joined with newlines.
pub(crate) fn text(doc: &Document, field: &'static str) -> Result<Option<String>, DecodeError> {
    match present(doc, field) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(Value::Array(_)) => strings(doc, field).map(|lines| Some(lines.join("\n"))),
        Some(_) => Err(DecodeError::field_shape(field, TEXT)),
    }
}

/// List of strings. Nested string lists contribute their first element.
pub(crate) fn strings(doc: &Document, field: &'static str) -> Result<Vec<String>, DecodeError> {
    let item = |value: &Value| -> Option<String> {
        match value {
            Value::String(text) => Some(text.clone()),
            Value::Array(inner) => match inner.first() {
                Some(Value::String(text)) => Some(text.clone()),
                None => Some(String::new()),
                Some(_) => None,
            },
            Value::Null => Some(String::new()),
            _ => None,
        }
    };
    match present(doc, field) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(item)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| DecodeError::field_shape(field, TEXT)),
        Some(other) => item(other)
            .map(|text| vec![text])
            .ok_or_else(|| DecodeError::field_shape(field, TEXT)),
    }
}

/// Colour field holding an RGB triple or a keyword.
pub(crate) fn color_spec(
    doc: &Document,
    field: &'static str,
) -> Result<Option<ColorSpec>, DecodeError> {
    const EXPECTED: &str = "an RGB triple or a colour keyword";
    match present(doc, field) {
        None => Ok(None),
        Some(Value::String(keyword)) => Ok(Some(ColorSpec::Symbolic(keyword.clone()))),
        Some(Value::Array(_)) => fixed::<3>(doc, field, EXPECTED)?
            .map(ColorSpec::Rgb)
            .map(Some)
            .ok_or_else(|| DecodeError::field_shape(field, EXPECTED)),
        Some(_) => Err(DecodeError::field_shape(field, EXPECTED)),
    }
}

/// Nested node documents; a bare object counts as a one-element list.
pub(crate) fn nodes<'a>(doc: &'a Document, field: &str) -> Vec<&'a Value> {
    match present(doc, field) {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .flat_map(|item| match item {
                Value::Array(inner) => inner.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
            .collect(),
        Some(other) => vec![other],
    }
}
