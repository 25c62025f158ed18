//! Record encoding: [`RegionDescriptor`] → highlight record text.
//!
//! The inverse of [`crate::pipeline::decode`]. Used to seed notes documents
//! (CLI `--encode`) and to check that decoding accepts what the printer writes.

use crate::pipeline::reader::Value;
use crate::region::RegionDescriptor;

/// Tag written into field 0 of encoded records.
pub const DEFAULT_TAG: &str = "org-noter-highlight";

/// Format version written into field 1 of encoded records.
pub const FORMAT_VERSION: i64 = 1;

/// Print `region` as `(TAG VERSION (PAGE (COORDS...)))`.
pub fn encode_record(tag: &str, version: i64, region: &RegionDescriptor) -> String {
    let coords = region
        .coordinates()
        .iter()
        .map(|&c| Value::Float(c))
        .collect();
    Value::List(vec![
        Value::Symbol(tag.to_string()),
        Value::Int(version),
        Value::List(vec![
            Value::Int(i64::from(region.page())),
            Value::List(coords),
        ]),
    ])
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::decode::decode;

    #[test]
    fn encodes_expected_shape() {
        let region = RegionDescriptor::new(2, vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(
            encode_record("tag", 1, &region),
            "(tag 1 (2 (0.1 0.2 0.3 0.4)))"
        );
    }

    #[test]
    fn whole_numbers_stay_floats() {
        let region = RegionDescriptor::new(1, vec![0.0, 0.5, 1.0, 1.0]).unwrap();
        assert_eq!(
            encode_record(DEFAULT_TAG, FORMAT_VERSION, &region),
            "(org-noter-highlight 1 (1 (0.0 0.5 1.0 1.0)))"
        );
    }

    #[test]
    fn decode_accepts_encoded_records() {
        let regions = [
            RegionDescriptor::new(1, vec![]).unwrap(),
            RegionDescriptor::new(9, vec![0.123456789012345, 0.2, 1e-7, 0.999]).unwrap(),
            RegionDescriptor::new(
                400,
                vec![0.05, 0.1, 0.95, 0.12, 0.05, 0.13, 0.6, 0.15],
            )
            .unwrap(),
        ];
        for region in regions {
            let text = encode_record(DEFAULT_TAG, FORMAT_VERSION, &region);
            assert_eq!(decode(&text).unwrap(), region, "text: {text}");
        }
    }
}
