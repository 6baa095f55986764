// SPDX-License-Identifier: MIT
//! End-to-end runs against files on disk

use std::fs::File;
use std::io::BufReader;

use merfish_bbox::descriptor::read_descriptor;
use merfish_bbox::layout::RECORD_FIELDS;
use merfish_bbox::{
    decode_header, pipeline, report, AggregationError, Config, Error, FormatError, NanPolicy,
    RecordStream,
};

use test_fixtures::{descriptor_text, file_bytes, merfish_file, write_temp, HeaderSpec};

fn config_for(file: &tempfile::NamedTempFile) -> Config {
    Config {
        input: file.path().to_path_buf(),
        ..Config::default()
    }
}

#[test]
fn test_three_record_file() {
    let file = merfish_file(&[(1.0, 5.0), (-2.0, 3.0), (4.0, 0.0)]);
    let summary = pipeline::run(&config_for(&file)).unwrap();

    assert_eq!(summary.num_entries(), 3);
    assert_eq!(summary.header.data_offset, 439);
    let bbox = summary.bounding_box;
    assert_eq!((bbox.min_x, bbox.max_x), (-2.0, 4.0));
    assert_eq!((bbox.min_y, bbox.max_y), (0.0, 5.0));
    assert!(!bbox.nan_seen);

    assert_eq!(
        report::render_text(&summary),
        "num_entries = 3\nx = [-2.000, 4.000]\ny = [0.000, 5.000]\n"
    );
}

#[test]
fn test_empty_file_is_empty_input() {
    let file = merfish_file(&[]);
    let result = pipeline::run(&config_for(&file));
    assert!(matches!(
        result,
        Err(Error::Aggregation(AggregationError::EmptyInput))
    ));
}

#[test]
fn test_header_failures_surface_in_order() {
    let cases = [
        (
            HeaderSpec {
                version: 2,
                is_corrupt: 1,
                num_entries: 1,
                reserved_length: 12,
            },
            "version",
        ),
        (
            HeaderSpec {
                version: 1,
                is_corrupt: 1,
                num_entries: 1,
                reserved_length: 12,
            },
            "corrupt",
        ),
        (
            HeaderSpec {
                version: 1,
                is_corrupt: 0,
                num_entries: 1,
                reserved_length: 12,
            },
            "length",
        ),
    ];

    for (spec, step) in cases {
        let file = write_temp(&file_bytes(spec, &[(0.0, 0.0)]));
        let err = pipeline::run(&config_for(&file)).unwrap_err();
        match (step, err) {
            ("version", Error::Format(FormatError::UnsupportedVersion(2))) => {}
            ("corrupt", Error::Format(FormatError::CorruptFile(1))) => {}
            ("length", Error::Format(FormatError::UnexpectedHeaderLength(12))) => {}
            (step, other) => panic!("step {}: unexpected error {:?}", step, other),
        }
    }
}

#[test]
fn test_truncated_records() {
    let mut bytes = file_bytes(HeaderSpec::valid(3), &[(1.0, 1.0), (2.0, 2.0)]);
    bytes.truncate(bytes.len() - 10);
    let file = write_temp(&bytes);

    assert!(matches!(
        pipeline::run(&config_for(&file)),
        Err(Error::Format(FormatError::TruncatedRead { .. }))
    ));
}

#[test]
fn test_check_file_size() {
    let mut bytes = file_bytes(HeaderSpec::valid(1), &[(1.0, 1.0)]);
    bytes.extend_from_slice(&[0u8; 7]);
    let file = write_temp(&bytes);

    // Trailing bytes are tolerated by default.
    assert!(pipeline::run(&config_for(&file)).is_ok());

    let config = Config {
        check_file_size: true,
        ..config_for(&file)
    };
    assert!(matches!(
        pipeline::run(&config),
        Err(Error::Format(FormatError::FileSizeMismatch {
            expected: 633,
            actual: 640
        }))
    ));
}

#[test]
fn test_parallel_matches_sequential() {
    let positions: Vec<(f32, f32)> = (0..257)
        .map(|i| {
            let t = i as f32;
            ((t * 1.7).sin() * 1000.0, (t * 0.3).cos() * 250.0 - t)
        })
        .collect();
    let file = merfish_file(&positions);

    let sequential = pipeline::run(&config_for(&file)).unwrap();
    for threads in [0, 2, 3, 8] {
        let config = Config {
            threads,
            ..config_for(&file)
        };
        let parallel = pipeline::run(&config).unwrap();
        assert_eq!(parallel.bounding_box, sequential.bounding_box, "threads = {}", threads);
        assert_eq!(parallel.num_entries(), 257);
    }
}

#[test]
fn test_parallel_empty_file() {
    let file = merfish_file(&[]);
    let config = Config {
        threads: 4,
        ..config_for(&file)
    };
    assert!(matches!(
        pipeline::run(&config),
        Err(Error::Aggregation(AggregationError::EmptyInput))
    ));
}

#[test]
fn test_nan_policies() {
    let file = merfish_file(&[(1.0, 1.0), (f32::NAN, 2.0), (3.0, -1.0)]);

    let summary = pipeline::run(&config_for(&file)).unwrap();
    assert!(summary.bounding_box.nan_seen);
    assert!(report::render_text(&summary).contains(report::NAN_WARNING));

    for threads in [1, 2] {
        let config = Config {
            nan_policy: NanPolicy::Reject,
            threads,
            ..config_for(&file)
        };
        assert!(matches!(
            pipeline::run(&config),
            Err(Error::Aggregation(AggregationError::NanPosition { index: 1 }))
        ));
    }
}

#[test]
fn test_parallel_reports_first_failure_in_file_order() {
    // NaNs land in the first and a late partition; the header claims one
    // more record than the file holds, so the last partition also fails.
    let mut positions: Vec<(f32, f32)> = (0..3999).map(|i| (i as f32, -(i as f32))).collect();
    positions[0].0 = f32::NAN;
    positions[3000].1 = f32::NAN;
    let file = write_temp(&file_bytes(HeaderSpec::valid(4000), &positions));

    for threads in [1, 2, 4, 8, 0] {
        for _ in 0..4 {
            let config = Config {
                nan_policy: NanPolicy::Reject,
                threads,
                ..config_for(&file)
            };
            assert!(
                matches!(
                    pipeline::run(&config),
                    Err(Error::Aggregation(AggregationError::NanPosition { index: 0 }))
                ),
                "threads = {}",
                threads
            );
        }
    }
}

#[test]
fn test_stream_decodes_opaque_fields() {
    let file = merfish_file(&[(1.0, 5.0), (-2.0, 3.0)]);
    let mut reader = BufReader::new(File::open(file.path()).unwrap());
    let header = decode_header(&mut reader).unwrap();
    let records: Vec<_> = RecordStream::open(reader, &header)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].cell_id, 1);
    assert_eq!(records[1].barcode_id, 1);
    assert_eq!(records[1].total_magnitude, 0.5);
    assert_eq!(records[1].dist_periphery, 1.0);
    assert_eq!(records[1].abs_position, [-2.0, 3.0]);
}

#[test]
fn test_descriptor_in_reserved_region() {
    let header = HeaderSpec::valid(1);
    let mut bytes = header.to_bytes_with_region(descriptor_text().as_bytes());
    bytes.extend_from_slice(&test_fixtures::record_bytes(7.0, 8.0, 0));
    let file = write_temp(&bytes);

    let mut reader = BufReader::new(File::open(file.path()).unwrap());
    let header = decode_header(&mut reader).unwrap();
    let descriptor = read_descriptor(&mut reader, &header).unwrap();
    assert!(descriptor.matches_layout(RECORD_FIELDS));
    assert_eq!(descriptor.record_size(), 194);

    // The descriptor never affects the bounding box.
    let summary = pipeline::run(&config_for(&file)).unwrap();
    assert_eq!(summary.bounding_box.min_x, 7.0);
    assert_eq!(summary.bounding_box.max_y, 8.0);
}
