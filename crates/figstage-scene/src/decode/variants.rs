//! Field readers for each node variant.

use glam::DVec3;
use tracing::warn;

use super::DECODE_TARGET;
use crate::colormap::{Colormap, Rgb};
use crate::error::DecodeError;
use crate::field::{self, ColorSpec, Document, MatrixOrVec};
use crate::mesh::Mesh;
use crate::node::{
    Axes, AxesLabels, Figure, HorizontalAlignment, Line, Patch, Scatter, Text, Ticks,
    VerticalAlignment,
};

const DEFAULT_MARKER_SIZE: f64 = 36.0;
const DEFAULT_FONT_SIZE: f64 = 10.0;
const LIMITS: &str = "a pair of numbers";
const COLOR_ROWS: &str = "RGB rows or one scalar per element";

/// Largest magnitude at which every integer is exactly representable.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

#[expect(
    clippy::cast_possible_truncation,
    reason = "the value is integral and within the exactly representable range"
)]
fn integral(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() <= EXACT_INTEGER_LIMIT)
        .then_some(value as i64)
}

pub(super) fn figure(doc: &Document) -> Result<Figure, DecodeError> {
    Ok(Figure {
        name: field::text(doc, "Name")?.unwrap_or_default(),
        number: field::scalar(doc, "Number")?.and_then(integral),
        colormap: Colormap::new(field::triples(doc, "Colormap", "rows of three numbers")?),
    })
}

pub(super) fn axes(doc: &Document) -> Result<Axes, DecodeError> {
    let limits = |name: &'static str| -> Result<[f64; 2], DecodeError> {
        field::fixed::<2>(doc, name, LIMITS)?.ok_or_else(|| DecodeError::field_shape(name, LIMITS))
    };
    let [x0, x1] = limits("XLim")?;
    let [y0, y1] = limits("YLim")?;
    let [z0, z1] = limits("ZLim")?;

    let ticks = |values: &'static str, labels: &'static str| -> Result<Ticks, DecodeError> {
        Ok(Ticks {
            values: field::numbers(doc, values)?.unwrap_or_default(),
            labels: field::strings(doc, labels)?,
        })
    };

    // Zero ratios would collapse an axis; treat them as unit ratios.
    let aspect = field::fixed::<3>(doc, "DataAspectRatio", "three numbers")?.map_or(
        DVec3::ONE,
        |ratio| {
            let raw = DVec3::from_array(ratio);
            DVec3::select(raw.cmpeq(DVec3::ZERO), DVec3::ONE, raw)
        },
    );

    Ok(Axes {
        lower: DVec3::new(x0, y0, z0),
        upper: DVec3::new(x1, y1, z1),
        ticks: [
            ticks("XTick", "XTickLabel")?,
            ticks("YTick", "YTickLabel")?,
            ticks("ZTick", "ZTickLabel")?,
        ],
        aspect,
        labels: AxesLabels::default(),
    })
}

/// Reads `XData`/`YData` and an optional `ZData` of matching length.
///
/// With `strict_z`, a non-empty `ZData` of the wrong length is an error;
/// otherwise it is ignored.
fn coordinates(doc: &Document, strict_z: bool) -> Result<Vec<DVec3>, DecodeError> {
    let xs = field::numbers(doc, "XData")?.unwrap_or_default();
    let ys = field::numbers(doc, "YData")?.unwrap_or_default();
    if xs.len() != ys.len() {
        return Err(DecodeError::field_shape("YData", "as many values as XData"));
    }
    let zs = match field::numbers(doc, "ZData")? {
        Some(zs) if zs.len() == xs.len() => zs,
        Some(zs) if strict_z && !zs.is_empty() => {
            return Err(DecodeError::field_shape("ZData", "as many values as XData"));
        }
        _ => vec![0.0; xs.len()],
    };
    Ok(xs
        .into_iter()
        .zip(ys)
        .zip(zs)
        .map(|((x, y), z)| DVec3::new(x, y, z))
        .collect())
}

pub(super) fn line(doc: &Document) -> Result<Line, DecodeError> {
    Ok(Line {
        points: coordinates(doc, false)?,
    })
}

pub(super) fn scatter(
    doc: &Document,
    colormap: &Colormap,
    node_color: Rgb,
) -> Result<Scatter, DecodeError> {
    let points = coordinates(doc, true)?;
    let count = points.len();

    let declared = field::numbers(doc, "SizeData")?.unwrap_or_default();
    let sizes = if let [size] = declared.as_slice() {
        vec![*size; count]
    } else if declared.is_empty() {
        vec![DEFAULT_MARKER_SIZE; count]
    } else if declared.len() == count {
        declared
    } else {
        return Err(DecodeError::field_shape("SizeData", "one size or one per point"));
    };

    let colors = match field::matrix_or_vec(doc, "CData")? {
        None => vec![node_color; count],
        Some(matrix) => broadcast(color_rows(matrix, "CData", colormap)?, count, "CData")?,
    };

    let marker = field::text(doc, "Marker")?.unwrap_or_else(|| "o".to_owned());
    if marker != "o" {
        warn!(
            target: DECODE_TARGET,
            marker = %marker,
            "only circular markers are supported; keeping marker as given"
        );
    }
    let filled =
        optional_color(doc, "MarkerFaceColor").is_some_and(|face| face.is_keyword("flat"));

    Ok(Scatter {
        points,
        sizes,
        colors,
        marker,
        edge_color: optional_color(doc, "MarkerEdgeColor"),
        filled,
    })
}

/// Reads colour rows, mapping scalars through the colormap.
///
/// A flat sequence of exactly three numbers is one RGB row; any other flat
/// sequence holds one scalar per element.
fn color_rows(
    matrix: MatrixOrVec<f64>,
    field_name: &'static str,
    colormap: &Colormap,
) -> Result<Vec<Rgb>, DecodeError> {
    match matrix {
        MatrixOrVec::Vector(values) if values.is_empty() => Ok(Vec::new()),
        MatrixOrVec::Vector(values) => Rgb::try_from(values.as_slice())
            .map_or_else(|_| colormap.map_scalars(&values), |rgb| Ok(vec![rgb])),
        MatrixOrVec::Matrix(rows) => rows
            .iter()
            .map(|row| Rgb::try_from(row.as_slice()).ok())
            .collect::<Option<Vec<_>>>()
            .map_or_else(
                || {
                    let scalars = rows
                        .iter()
                        .map(|row| match row.as_slice() {
                            [value] => Some(*value),
                            _ => None,
                        })
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| DecodeError::field_shape(field_name, COLOR_ROWS))?;
                    colormap.map_scalars(&scalars)
                },
                Ok,
            ),
    }
}

/// Repeats a single colour `count` times or checks a per-element list.
fn broadcast(
    colors: Vec<Rgb>,
    count: usize,
    field_name: &'static str,
) -> Result<Vec<Rgb>, DecodeError> {
    if let [single] = colors.as_slice() {
        return Ok(vec![*single; count]);
    }
    if colors.len() == count {
        return Ok(colors);
    }
    Err(DecodeError::ColorCount {
        field: field_name,
        rows: colors.len(),
        elements: count,
    })
}

pub(super) fn patch(doc: &Document, colormap: &Colormap) -> Result<Patch, DecodeError> {
    const COLOR_FIELD: &str = "FaceVertexCData";

    let vertices: Vec<DVec3> = field::triples(doc, "Vertices", "rows of three coordinates")?
        .into_iter()
        .map(DVec3::from_array)
        .collect();
    let faces = faces(doc, vertices.len())?;

    let colors = match field::matrix_or_vec(doc, COLOR_FIELD)? {
        None => Vec::new(),
        Some(matrix) => color_rows(matrix, COLOR_FIELD, colormap)?,
    };
    let mesh = if colors.is_empty() {
        Mesh::new(vertices, faces, None)
    } else if colors.len() == faces.len() && colors.len() != vertices.len() && colors.len() > 1 {
        unshare(&vertices, &faces, &colors)?
    } else {
        let per_vertex = broadcast(colors, vertices.len(), COLOR_FIELD)?;
        Mesh::new(vertices, faces, Some(per_vertex))
    };

    let edge_color = optional_color(doc, "EdgeColor");
    if let Some(ColorSpec::Symbolic(keyword)) = &edge_color
        && keyword != "none"
    {
        warn!(
            target: DECODE_TARGET,
            edge_color = %keyword,
            "symbolic edge colours other than 'none' are not supported"
        );
    }

    Ok(Patch {
        mesh: mesh.double_sided(),
        face_color: optional_color(doc, "FaceColor"),
        edge_color,
    })
}

fn faces(doc: &Document, vertex_count: usize) -> Result<Vec<[u32; 3]>, DecodeError> {
    let Some(matrix) = field::matrix_or_vec(doc, "Faces")? else {
        return Ok(Vec::new());
    };
    matrix
        .rows()
        .enumerate()
        .map(|(face, row)| {
            let [a, b, c] = <[f64; 3]>::try_from(row).map_err(|_| DecodeError::FaceArity {
                face,
                arity: row.len(),
            })?;
            Ok([
                vertex_index(face, a, vertex_count)?,
                vertex_index(face, b, vertex_count)?,
                vertex_index(face, c, vertex_count)?,
            ])
        })
        .collect()
}

/// Converts a one-based face entry into a zero-based vertex index.
fn vertex_index(face: usize, value: f64, vertices: usize) -> Result<u32, DecodeError> {
    let index = integral(value)
        .ok_or_else(|| DecodeError::field_shape("Faces", "integral vertex indices"))?;
    let out_of_range = || DecodeError::FaceIndex {
        face,
        index,
        vertices,
    };
    let zero_based = usize::try_from(index - 1).map_err(|_| out_of_range())?;
    if zero_based >= vertices {
        return Err(out_of_range());
    }
    u32::try_from(zero_based).map_err(|_| out_of_range())
}

/// Gives every face its own three vertices so each face carries one colour.
fn unshare(vertices: &[DVec3], faces: &[[u32; 3]], colors: &[Rgb]) -> Result<Mesh, DecodeError> {
    let mut flat_vertices = Vec::with_capacity(faces.len() * 3);
    let mut flat_colors = Vec::with_capacity(faces.len() * 3);
    let mut flat_faces = Vec::with_capacity(faces.len());
    for (face, color) in faces.iter().zip(colors) {
        let base = u32::try_from(flat_vertices.len()).map_err(|_| {
            DecodeError::field_shape("Faces", "fewer than 2^32 flat-shaded vertices")
        })?;
        flat_vertices.extend(face.iter().filter_map(|&corner| vertices.get(corner as usize)));
        flat_colors.extend([*color; 3]);
        flat_faces.push([base, base + 1, base + 2]);
    }
    Ok(Mesh::new(flat_vertices, flat_faces, Some(flat_colors)))
}

pub(super) fn text(doc: &Document) -> Result<Text, DecodeError> {
    let horizontal = match field::text(doc, "HorizontalAlignment")?.as_deref() {
        None | Some("left") => HorizontalAlignment::Left,
        Some("center") => HorizontalAlignment::Center,
        Some("right") => HorizontalAlignment::Right,
        Some(other) => {
            warn!(target: DECODE_TARGET, alignment = other, "unknown horizontal alignment");
            HorizontalAlignment::default()
        }
    };
    let vertical = match field::text(doc, "VerticalAlignment")?.as_deref() {
        None | Some("middle") => VerticalAlignment::Middle,
        Some("top") => VerticalAlignment::Top,
        Some("bottom") => VerticalAlignment::Bottom,
        Some(other) => {
            warn!(
                target: DECODE_TARGET,
                alignment = other,
                "vertical alignment not supported; using middle"
            );
            VerticalAlignment::default()
        }
    };
    Ok(Text {
        content: field::text(doc, "String")?.unwrap_or_default(),
        horizontal,
        vertical,
        rotation: field::scalar(doc, "Rotation")?.unwrap_or_default(),
        font_size: field::scalar(doc, "FontSize")?.unwrap_or(DEFAULT_FONT_SIZE),
    })
}

/// Reads a colour field, logging and discarding malformed values.
fn optional_color(doc: &Document, field_name: &'static str) -> Option<ColorSpec> {
    field::color_spec(doc, field_name).unwrap_or_else(|error| {
        warn!(
            target: DECODE_TARGET,
            field = field_name,
            error = %error,
            "ignoring malformed colour"
        );
        None
    })
}
