// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Toolpath parser using pest
//!
//! Each line is one comma-separated record whose first field is a command
//! code. Recognized codes set absolute coordinates for the axes they list;
//! the remaining axes keep their current value. Any other code, and blank
//! lines, are skipped without a diagnostic.

use crate::error::ToolpathError;
use crate::toolpath::{MotionType, Path, Waypoint};
use nalgebra::Point3;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "io/toolpath.pest"]
struct RecordParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// Recognized command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Code {
    J2,
    J3,
    JX,
    JY,
    JZ,
    M2,
    M3,
}

impl Code {
    fn from_text(text: &str) -> Option<Self> {
        match text {
            "J2" => Some(Self::J2),
            "J3" => Some(Self::J3),
            "JX" => Some(Self::JX),
            "JY" => Some(Self::JY),
            "JZ" => Some(Self::JZ),
            "M2" => Some(Self::M2),
            "M3" => Some(Self::M3),
            _ => None,
        }
    }

    fn axes(self) -> &'static [Axis] {
        match self {
            Self::J2 | Self::M2 => &[Axis::X, Axis::Y],
            Self::J3 | Self::M3 => &[Axis::X, Axis::Y, Axis::Z],
            Self::JX => &[Axis::X],
            Self::JY => &[Axis::Y],
            Self::JZ => &[Axis::Z],
        }
    }

    fn motion(self) -> MotionType {
        match self {
            Self::M2 | Self::M3 => MotionType::Move,
            _ => MotionType::Jog,
        }
    }
}

/// Parse toolpath text into a path starting at the origin
///
/// A recognized line with a missing or non-numeric coordinate rejects the
/// whole input with a line-numbered diagnostic.
pub fn parse_toolpath(source: &str) -> Result<Path, ToolpathError> {
    let mut path = Path::new();
    let mut cursor = Point3::origin();
    let mut skipped = 0usize;

    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        let Some((code, fields)) = split_record(line) else {
            skipped += 1;
            continue;
        };

        let Some(code) = Code::from_text(code.trim()) else {
            skipped += 1;
            continue;
        };

        let axes = code.axes();
        if fields.len() < axes.len() {
            return Err(ToolpathError::MissingField {
                line: line_no,
                code: format!("{:?}", code),
                expected: axes.len(),
                found: fields.len(),
            });
        }

        for (field_index, (axis, text)) in axes.iter().zip(&fields).enumerate() {
            cursor[*axis as usize] = parse_coordinate(text, line_no, field_index + 1)?;
        }

        path.push(Waypoint::new(cursor, code.motion()));
    }

    tracing::debug!(
        waypoints = path.len(),
        skipped,
        "parsed toolpath"
    );

    Ok(path)
}

/// Split one line into its command code and the fields after it
fn split_record(line: &str) -> Option<(&str, Vec<&str>)> {
    let record = RecordParser::parse(Rule::record, line).ok()?.next()?;

    let mut code = None;
    let mut fields = Vec::new();
    for pair in record.into_inner() {
        match pair.as_rule() {
            Rule::code => code = Some(pair.as_str()),
            Rule::field => fields.push(pair.as_str()),
            _ => {}
        }
    }

    code.map(|code| (code, fields))
}

fn parse_coordinate(text: &str, line: usize, field: usize) -> Result<f64, ToolpathError> {
    let trimmed = text.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ToolpathError::MalformedNumber {
            line,
            field,
            text: trimmed.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_source() {
        let path = parse_toolpath("").unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_parse_unrecognized_code() {
        let path = parse_toolpath("G2,10,20").unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_parse_jog_from_origin() {
        let path = parse_toolpath("J2,10,20").unwrap();
        assert_eq!(path.len(), 2);
        let wp = path.waypoints()[1];
        assert_eq!(wp.position, Point3::new(10.0, 20.0, 0.0));
        assert_eq!(wp.motion, MotionType::Jog);
    }

    #[test]
    fn test_parse_move3() {
        let path = parse_toolpath("M3,5,5,5").unwrap();
        let wp = path.waypoints()[1];
        assert_eq!(wp.position, Point3::new(5.0, 5.0, 5.0));
        assert_eq!(wp.motion, MotionType::Move);
    }

    #[test]
    fn test_single_axis_codes_inherit_cursor() {
        let path = parse_toolpath("J3,1,2,3\nJX,7\nJY,8\nJZ,-1\nM2,4,5").unwrap();
        let positions: Vec<_> = path.waypoints().iter().map(|w| w.position).collect();

        assert_eq!(positions[2], Point3::new(7.0, 2.0, 3.0));
        assert_eq!(positions[3], Point3::new(7.0, 8.0, 3.0));
        assert_eq!(positions[4], Point3::new(7.0, 8.0, -1.0));
        assert_eq!(positions[5], Point3::new(4.0, 5.0, -1.0));
    }

    #[test]
    fn test_codes_are_case_sensitive() {
        let path = parse_toolpath("j2,10,20\nm3,1,1,1").unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_crlf_and_padding() {
        let path = parse_toolpath("M2, 10.5 , 2\r\n\r\nJZ,3\r\n").unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.waypoints()[1].position, Point3::new(10.5, 2.0, 0.0));
        assert_eq!(path.waypoints()[2].position, Point3::new(10.5, 2.0, 3.0));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let path = parse_toolpath("M3,1,2,3,99").unwrap();
        assert_eq!(path.waypoints()[1].position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_malformed_number_rejected() {
        let err = parse_toolpath("J2,1,1\nM2,abc,4").unwrap_err();
        assert_eq!(
            err,
            ToolpathError::MalformedNumber {
                line: 2,
                field: 1,
                text: "abc".into()
            }
        );
    }

    #[test]
    fn test_missing_field_rejected() {
        let err = parse_toolpath("M3,1,2").unwrap_err();
        assert!(matches!(
            err,
            ToolpathError::MissingField {
                line: 1,
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(parse_toolpath("JZ,inf").is_err());
        assert!(parse_toolpath("JZ,NaN").is_err());
    }

    #[test]
    fn test_malformed_unrecognized_line_is_skipped() {
        let path = parse_toolpath("SA\nMS,abc,def\n'comment, with, commas").unwrap();
        assert_eq!(path.len(), 1);
    }
}
