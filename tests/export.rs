//! Export path tests: single writes, batch reports, format mapping.

mod common;

use common::SyntheticSource;
use frameshift::{ExportFormat, FrameRecord, FrameshiftError, export};

fn record_at(timestamp: f64) -> FrameRecord {
    FrameRecord::from_image(timestamp, 100.0, SyntheticSource::frame_for(timestamp))
        .expect("record creation")
}

#[test]
fn formats_map_to_conventional_extensions() {
    assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
    assert_eq!(ExportFormat::Png.extension(), "png");
    assert_eq!(ExportFormat::Tiff.extension(), "tiff");
}

#[test]
fn write_frame_round_trips_through_png() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let mut record = record_at(3.2);

    let destination = scratch.path().join("still.png");
    export::write_frame(&mut record, &destination, ExportFormat::Png).expect("write");

    let reloaded = image::open(&destination).expect("written file should decode");
    assert_eq!((reloaded.width(), reloaded.height()), (64, 36));
}

#[test]
fn write_failure_is_scoped_to_the_destination() {
    let mut record = record_at(1.0);
    let result = export::write_frame(
        &mut record,
        std::path::Path::new("/nonexistent-dir/still.png"),
        ExportFormat::Png,
    );
    match result {
        Err(FrameshiftError::WriteFailed { path, .. }) => {
            assert!(path.ends_with("still.png"));
        }
        other => panic!("expected WriteFailed, got {other:?}"),
    }
    // The record is untouched and can still be exported elsewhere.
    let scratch = tempfile::tempdir().expect("temp dir");
    export::write_frame(
        &mut record,
        &scratch.path().join("retry.png"),
        ExportFormat::Png,
    )
    .expect("retry succeeds");
}

#[test]
fn batch_export_counts_failures_without_aborting() {
    let scratch = tempfile::tempdir().expect("temp dir");

    let mut records = vec![record_at(0.0), record_at(1.0), record_at(2.0)];

    // Sabotage the middle record: drop its cached decode and remove the
    // backing file so its load fails at export time.
    records[1].release_full();
    std::fs::remove_file(records[1].full_image_path().unwrap()).expect("remove backing file");

    let (report, written) =
        export::write_frames(&mut records, scratch.path(), ExportFormat::Jpeg)
            .expect("batch itself succeeds");

    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(written.len(), 2);
    for path in &written {
        assert!(path.exists());
    }
    assert!(scratch.path().join("frameshift-0.0s.jpg").exists());
    assert!(scratch.path().join("frameshift-2.0s.jpg").exists());
    assert!(!scratch.path().join("frameshift-1.0s.jpg").exists());
}

#[test]
fn batch_export_creates_the_target_directory() {
    let scratch = tempfile::tempdir().expect("temp dir");
    let nested = scratch.path().join("a/b/stills");

    let mut records = vec![record_at(4.0)];
    let (report, _) =
        export::write_frames(&mut records, &nested, ExportFormat::Tiff).expect("batch");
    assert_eq!(report.written, 1);
    assert!(nested.join("frameshift-4.0s.tiff").exists());
}
