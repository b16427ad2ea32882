/// Wavefront OBJ parser for positions, normals and polygonal faces
use std::path::Path;

use nom::{
    bytes::complete::take_till1,
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, opt},
    multi::{many0, separated_list1},
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geometry::{CornerRef, Polygon, Triangle};

/// Raw attribute arrays and faces of a parsed OBJ file
#[derive(Debug, Clone, Default)]
pub struct ObjModel {
    /// `v` records in file order
    pub positions: Vec<Vec<f32>>,
    /// `vn` records in file order
    pub normals: Vec<Vec<f32>>,
    /// `f` records in file order
    pub polygons: Vec<Polygon>,
}

impl ObjModel {
    /// Component count of the first position, if any was parsed
    pub fn position_dim(&self) -> Option<usize> {
        self.positions.first().map(Vec::len)
    }

    /// Component count of the first normal, if any was parsed
    pub fn normal_dim(&self) -> Option<usize> {
        self.normals.first().map(Vec::len)
    }

    pub fn triangle_count(&self) -> usize {
        self.polygons.iter().map(Polygon::triangle_count).sum()
    }

    /// Fan-triangulate every polygon, preserving face order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.polygons.iter().flat_map(|polygon| polygon.triangulate())
    }
}

/// A classified line
enum Record {
    Position(Vec<f32>),
    Normal(Vec<f32>),
    Face(Polygon),
    Ignored,
}

/// Read and parse an OBJ file from disk
pub fn load_obj_file(path: impl AsRef<Path>) -> Result<ObjModel> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let model = parse_obj(&text)?;
    info!(
        path = %path.display(),
        positions = model.positions.len(),
        normals = model.normals.len(),
        faces = model.polygons.len(),
        "Loaded OBJ model"
    );
    Ok(model)
}

/// Parse the text of an OBJ file.
///
/// Only `v`, `vn` and `f` lines are interpreted. Everything else, including
/// `vt`, comments, groups and material directives, is skipped.
pub fn parse_obj(input: &str) -> Result<ObjModel> {
    let mut model = ObjModel::default();

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        match parse_record(raw.trim_end(), line)? {
            Record::Position(components) => {
                check_dim(&model.positions, &components, "position", line);
                model.positions.push(components);
            }
            Record::Normal(components) => {
                check_dim(&model.normals, &components, "normal", line);
                model.normals.push(components);
            }
            Record::Face(polygon) => model.polygons.push(polygon),
            Record::Ignored => {}
        }
    }

    debug!(
        positions = model.positions.len(),
        normals = model.normals.len(),
        faces = model.polygons.len(),
        triangles = model.triangle_count(),
        "Parsed OBJ text"
    );
    Ok(model)
}

fn check_dim(existing: &[Vec<f32>], components: &[f32], kind: &str, line: usize) {
    if let Some(first) = existing.first() {
        if first.len() != components.len() {
            warn!(
                line,
                expected = first.len(),
                found = components.len(),
                "Ragged {kind} record"
            );
        }
    }
}

fn parse_record(text: &str, line: usize) -> Result<Record> {
    let (rest, keyword) = match keyword(text) {
        Ok(parsed) => parsed,
        // Blank line
        Err(_) => return Ok(Record::Ignored),
    };

    match keyword {
        "v" => parse_components(rest, line, "position").map(Record::Position),
        "vn" => parse_components(rest, line, "normal").map(Record::Normal),
        "f" => parse_face(rest, line).map(Record::Face),
        _ => Ok(Record::Ignored),
    }
}

fn keyword(input: &str) -> IResult<&str, &str> {
    preceded(space0, take_till1(|c: char| c.is_whitespace()))(input)
}

fn components(input: &str) -> IResult<&str, Vec<f32>> {
    all_consuming(terminated(
        preceded(space1, separated_list1(space1, float)),
        space0,
    ))(input)
}

fn parse_components(rest: &str, line: usize, kind: &str) -> Result<Vec<f32>> {
    components(rest)
        .map(|(_, values)| values)
        .map_err(|_| Error::parse(line, format!("invalid {kind} record `{}`", rest.trim())))
}

fn tokens(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(preceded(
        space0,
        many0(terminated(take_till1(|c: char| c.is_whitespace()), space0)),
    ))(input)
}

fn corner_slots(input: &str) -> IResult<&str, Vec<Option<&str>>> {
    all_consuming(separated_list1(char('/'), opt(digit1)))(input)
}

fn parse_face(rest: &str, line: usize) -> Result<Polygon> {
    let (_, tokens) =
        tokens(rest).map_err(|_| Error::parse(line, "invalid face record"))?;

    let corners = tokens
        .into_iter()
        .map(|token| parse_corner(token, line))
        .collect::<Result<Vec<_>>>()?;

    Polygon::new(corners, line)
}

fn parse_corner(token: &str, line: usize) -> Result<CornerRef> {
    let invalid = |reason: &str| Error::parse(line, format!("invalid face corner `{token}`: {reason}"));

    let (_, slots) = corner_slots(token).map_err(|_| invalid("expected pos[/tex][/norm]"))?;
    if slots.len() > 3 {
        return Err(invalid("more than three slots"));
    }

    let mut values = [0u32; 3];
    for (value, slot) in values.iter_mut().zip(&slots) {
        if let Some(digits) = slot {
            *value = digits.parse().map_err(|_| invalid("index too large"))?;
            if *value == 0 {
                return Err(invalid("indices are 1-based"));
            }
        }
    }

    Ok(CornerRef::from_slots(values[0], values[1], values[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
";

    #[test]
    fn test_parse_quad() {
        let model = parse_obj(QUAD).unwrap();
        assert_eq!(model.positions.len(), 4);
        assert_eq!(model.normals, vec![vec![0.0, 0.0, 1.0]]);
        assert_eq!(model.polygons.len(), 1);
        assert_eq!(model.triangle_count(), 2);

        let corner = model.polygons[0].corners()[1];
        assert_eq!(corner, CornerRef::from_slots(2, 0, 1));
    }

    #[test]
    fn test_ignores_other_records() {
        let text = "mtllib a.mtl\no thing\nvt 0.5 0.5\ng group\ns off\nusemtl red\n\n   \nv 1 2 3\n";
        let model = parse_obj(text).unwrap();
        assert_eq!(model.positions, vec![vec![1.0, 2.0, 3.0]]);
        assert!(model.normals.is_empty());
    }

    #[test]
    fn test_texture_slot_is_kept_but_optional() {
        let model = parse_obj("f 1/2/3 4/5/6 7//8\nf 1 2 3\nf 1/1 2/2 3/3\n").unwrap();
        assert_eq!(
            model.polygons[0].corners()[0],
            CornerRef::from_slots(1, 2, 3)
        );
        assert_eq!(
            model.polygons[0].corners()[2],
            CornerRef::from_slots(7, 0, 8)
        );
        assert_eq!(model.polygons[1].corners()[0].normal, None);
        assert_eq!(model.polygons[2].corners()[0].normal, None);
    }

    #[test]
    fn test_whitespace_and_crlf() {
        let model = parse_obj("v  1.5\t-2e1   3 \r\nvn 0 1 0\r\nf 1//1  1//1 1//1 \r\n").unwrap();
        assert_eq!(model.positions, vec![vec![1.5, -20.0, 3.0]]);
        assert_eq!(model.polygons[0].corners().len(), 3);
    }

    #[test]
    fn test_extra_components_are_kept() {
        let model = parse_obj("v 1 2 3 1\n").unwrap();
        assert_eq!(model.position_dim(), Some(4));
    }

    #[test]
    fn test_two_corner_face_is_malformed() {
        let err = parse_obj("v 0 0 0\nf 1//1 2//1\n").unwrap_err();
        assert!(matches!(err, Error::MalformedFace { line: 2, corners: 2 }));
    }

    #[test]
    fn test_bad_records_report_line() {
        let err = parse_obj("v 0 0 0\nv 1 x 0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));

        let err = parse_obj("vn\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_rejects_bad_corners() {
        for text in ["f 0//1 2//1 3//1", "f -1//1 2//1 3//1", "f 1/2/3/4 2 3", "f a b c"] {
            let err = parse_obj(text).unwrap_err();
            assert!(matches!(err, Error::Parse { line: 1, .. }), "{text}");
        }
    }
}
