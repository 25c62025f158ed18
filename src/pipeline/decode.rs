//! Region decoding: highlight record text → [`RegionDescriptor`].
//!
//! A record is any list-like datum with at least three positional fields.
//! Field 0 is the record tag, field 1 its format version, and field 2 the
//! region payload `(PAGE (X1 Y1 X2 Y2 ...))`. Only field 2 is interpreted;
//! the other fields belong to the notes tooling that wrote the record.

use crate::error::RecordError;
use crate::pipeline::reader::{self, Value};
use crate::region::RegionDescriptor;

/// Index of the region payload within a record.
pub const REGION_FIELD: usize = 2;

/// Decode one highlight record.
///
/// Fails with a [`RecordError`] when the text does not read as a structured
/// literal, has fewer than three fields, or its region field is not shaped
/// `(PAGE (COORDS...))` with a coordinate count divisible by four. There is no
/// fallback region.
pub fn decode(raw: &str) -> Result<RegionDescriptor, RecordError> {
    let datum = reader::read(raw)?;
    let fields = record_fields(&datum)?;
    if fields.len() <= REGION_FIELD {
        return Err(RecordError::TooFewFields {
            found: fields.len(),
        });
    }
    decode_region(&fields[REGION_FIELD])
}

fn record_fields(datum: &Value) -> Result<&[Value], RecordError> {
    match datum {
        Value::List(items) | Value::Vector(items) | Value::Record(items) => Ok(items),
        other => Err(RecordError::NotARecord {
            found: other.kind().to_string(),
        }),
    }
}

fn decode_region(field: &Value) -> Result<RegionDescriptor, RecordError> {
    let bad_region = || RecordError::BadRegion {
        found: field.to_string(),
    };

    let parts = match field {
        Value::List(parts) if parts.len() == 2 => parts,
        _ => return Err(bad_region()),
    };

    let page = match &parts[0] {
        Value::Int(p) if *p >= 1 => u32::try_from(*p).map_err(|_| RecordError::BadPage {
            found: p.to_string(),
        })?,
        other => {
            return Err(RecordError::BadPage {
                found: other.to_string(),
            })
        }
    };

    let raw_coords = parts[1].as_list().ok_or_else(bad_region)?;
    let coordinates = raw_coords
        .iter()
        .enumerate()
        .map(|(index, v)| match v.as_f64() {
            Some(c) if c.is_finite() => Ok(c),
            Some(_) => Err(RecordError::NonFiniteCoordinate {
                index,
                found: v.to_string(),
            }),
            None => Err(RecordError::NonNumericCoordinate {
                index,
                found: v.to_string(),
            }),
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let count = coordinates.len();
    RegionDescriptor::new(page, coordinates).ok_or(RecordError::CoordinateCount { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::reader::ReadError;

    #[test]
    fn decodes_basic_record() {
        let r = decode("(tag 1 (2 (0.1 0.2 0.3 0.4)))").unwrap();
        assert_eq!(r.page(), 2);
        assert_eq!(r.coordinates(), &[0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn decodes_struct_record_with_extra_fields() {
        let r = decode("#s(org-noter--hl 2 (14 (0.1 0.2 0.3 0.4 0.1 0.5 0.9 0.6)) extra)").unwrap();
        assert_eq!(r.page(), 14);
        assert_eq!(r.quad_count(), 2);
    }

    #[test]
    fn tolerates_spacing_and_integer_coordinates() {
        let r = decode("( tag\n  1\n  ( 3 ( 0 .25 1 0.75 ) ) )").unwrap();
        assert_eq!(r.page(), 3);
        assert_eq!(r.coordinates(), &[0.0, 0.25, 1.0, 0.75]);
    }

    #[test]
    fn dotted_payload_spelling() {
        let r = decode("(tag 1 (2 . ((0.1 0.2 0.3 0.4))))").unwrap();
        assert_eq!(r.page(), 2);
    }

    #[test]
    fn empty_coordinates_are_legal() {
        assert!(decode("(tag 1 (5 ()))").unwrap().is_empty());
        assert!(decode("(tag 1 (5 nil))").unwrap().is_empty());
    }

    #[test]
    fn unreadable_text() {
        assert!(matches!(
            decode("(tag 1 (2 (0.1"),
            Err(RecordError::Unreadable(ReadError::UnexpectedEof(_)))
        ));
        assert!(matches!(
            decode(""),
            Err(RecordError::Unreadable(ReadError::Empty))
        ));
    }

    #[test]
    fn atom_is_not_a_record() {
        assert!(matches!(decode("42"), Err(RecordError::NotARecord { .. })));
        assert!(matches!(decode("(a b . c)"), Err(RecordError::NotARecord { .. })));
    }

    #[test]
    fn too_few_fields() {
        assert_eq!(
            decode("(tag 1)"),
            Err(RecordError::TooFewFields { found: 2 })
        );
    }

    #[test]
    fn wrong_region_shapes() {
        for raw in [
            "(tag 1 2)",
            "(tag 1 (2))",
            "(tag 1 (2 (0.1 0.2 0.3 0.4) extra))",
            "(tag 1 (2 0.1 0.2 0.3 0.4))",
            "(tag 1 (2 [0.1 0.2 0.3 0.4]))",
        ] {
            assert!(
                matches!(decode(raw), Err(RecordError::BadRegion { .. })),
                "accepted {raw}"
            );
        }
    }

    #[test]
    fn bad_pages() {
        for raw in [
            "(tag 1 (0 (0.1 0.2 0.3 0.4)))",
            "(tag 1 (-1 (0.1 0.2 0.3 0.4)))",
            "(tag 1 (2.0 (0.1 0.2 0.3 0.4)))",
            "(tag 1 (p (0.1 0.2 0.3 0.4)))",
            "(tag 1 (99999999999 (0.1 0.2 0.3 0.4)))",
        ] {
            assert!(
                matches!(decode(raw), Err(RecordError::BadPage { .. })),
                "accepted {raw}"
            );
        }
    }

    #[test]
    fn non_numeric_coordinate() {
        assert_eq!(
            decode("(tag 1 (2 (0.1 x 0.3 0.4)))"),
            Err(RecordError::NonNumericCoordinate {
                index: 1,
                found: "x".into()
            })
        );
    }

    #[test]
    fn overflowing_coordinate_is_rejected() {
        assert!(matches!(
            decode("(tag 1 (2 (0.1 1e999 0.3 0.4)))"),
            Err(RecordError::NonFiniteCoordinate { index: 1, .. })
        ));
    }

    #[test]
    fn deeply_nested_record_is_unreadable() {
        let raw = format!("(t 1 {}{})", "(".repeat(20_000), ")".repeat(20_000));
        assert!(matches!(
            decode(&raw),
            Err(RecordError::Unreadable(ReadError::TooDeep(_)))
        ));
    }

    #[test]
    fn coordinate_count_not_multiple_of_four() {
        assert_eq!(
            decode("(tag 1 (2 (0.1 0.2 0.3 0.4 0.5)))"),
            Err(RecordError::CoordinateCount { count: 5 })
        );
    }
}
