use super::*;

fn builder(tstart: f64, tend: f64, dt: f64) -> ManifestBuilder {
    let window = TimeWindow::new(tstart, tend).unwrap();
    let grid = ResampleGrid::new(tstart, dt).unwrap();
    ManifestBuilder::new(window, grid)
}

fn row(local_index: u32, end_time: f64) -> TimingRow {
    TimingRow {
        local_index,
        end_time,
    }
}

#[test]
fn first_row_only_seeds_the_chain() {
    let mut builder = builder(0.0, 10.0, 0.01);
    builder.push_row("a.txt", row(0, 1.0));
    assert!(builder.records().is_empty());

    builder.push_row("a.txt", row(1, 2.0));
    let records = builder.into_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].start_time, 1.0);
    assert_eq!(records[0].end_time, 2.0);
    assert_eq!(records[0].local_index, 1);
}

#[test]
fn consecutive_records_chain_start_to_end() {
    let mut builder = builder(0.0, 10.0, 0.01);
    for i in 0..5 {
        builder.push_row("a.txt", row(i, f64::from(i) * 0.5));
    }
    let records = builder.into_records();
    assert_eq!(records.len(), 4);
    for pair in records.windows(2) {
        assert_eq!(pair[1].start_time, pair[0].end_time);
    }
    for (g, record) in records.iter().enumerate() {
        assert_eq!(record.index, g);
        assert!(record.start_time < record.end_time);
    }
}

#[test]
fn window_filtering_keeps_partial_edge_intervals() {
    // Frames of 1 s; the window starts strictly between two end times.
    let mut builder = builder(2.5, 4.5, 0.5);
    for i in 0..7 {
        builder.push_row("a.txt", row(i, f64::from(i)));
    }
    let records = builder.into_records();
    // [2, 3) straddles tstart; [4, 5) straddles tend.
    assert_eq!(records.len(), 3);
    assert!(records[0].start_time < 2.5 && records[0].end_time > 2.5);
    assert_eq!(records[0].grid_start, -1.0);
    assert_eq!(records[0].grid_end, 1.0);
    assert!(records[2].start_time < 4.5 && records[2].end_time > 4.5);
}

#[test]
fn grid_coordinates_invert_to_absolute_times() {
    let tstart = 1709295000.0;
    let dt = 0.01;
    let mut builder = builder(tstart, tstart + 1.0, dt);
    builder.push_row("a.txt", row(0, tstart - 0.005));
    builder.push_row("a.txt", row(1, tstart + 0.005));
    builder.push_row("a.txt", row(2, tstart + 0.015));
    let records = builder.into_records();
    assert_eq!(records.len(), 2);
    for record in &records {
        assert!((record.grid_start * dt + tstart - record.start_time).abs() < 1e-6);
        assert!((record.grid_end * dt + tstart - record.end_time).abs() < 1e-6);
    }
}

#[test]
fn chain_carries_across_file_boundaries() {
    let mut builder = builder(0.0, 10.0, 0.01);
    builder.push_row("a.txt", row(0, 1.0));
    builder.push_row("a.txt", row(1, 2.0));
    builder.push_row("b.txt", row(0, 3.0));
    let records = builder.into_records();
    assert_eq!(records.len(), 2);
    // The boundary-spanning record carries the file its end time came from.
    assert_eq!(records[1].source, "b.txt");
    assert_eq!(records[1].start_time, 2.0);
    assert_eq!(records[1].end_time, 3.0);
    assert_eq!(records[1].local_index, 0);
}

#[test]
fn broken_chain_swallows_the_next_row() {
    let mut builder = builder(0.0, 10.0, 0.01);
    builder.push_row("a.txt", row(0, 1.0));
    builder.push_row("a.txt", row(1, 2.0));
    builder.break_chain();
    builder.push_row("c.txt", row(0, 4.0));
    builder.push_row("c.txt", row(1, 5.0));
    let records = builder.into_records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].start_time, 4.0);
    assert_eq!(records[1].end_time, 5.0);
}

#[test]
fn non_advancing_end_times_are_not_emitted() {
    let mut builder = builder(0.0, 10.0, 0.01);
    builder.push_row("a.txt", row(0, 2.0));
    builder.push_row("a.txt", row(1, 2.0));
    builder.push_row("a.txt", row(2, 1.5));
    builder.push_row("a.txt", row(3, 3.0));
    let records = builder.into_records();
    // Only [1.5, 3.0) survives; the stalled and reversed rows still moved
    // the chain.
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].start_time, 1.5);
    assert_eq!(records[0].end_time, 3.0);
}

#[test]
fn record_row_roundtrip() {
    let line = "7 1709294999.995000 1709295000.005000 cam2_12:09:59.900.txt 42 -0.500000 0.500000";
    let record = FrameRecord::try_from(line).unwrap();
    assert_eq!(record.index, 7);
    assert_eq!(record.source, "cam2_12:09:59.900.txt");
    assert_eq!(record.local_index, 42);
    assert_eq!(record.grid_start, -0.5);
    assert_eq!(record.grid_end, 0.5);
}

#[test]
fn manifest_parsing_skips_comments_and_blanks() {
    let contents = "\
# produced by tests
# g fs fe src index rs re

0 1.0 2.0 a.txt 1 0.0 1.0
1 2.0 3.0 a.txt 2 1.0 2.0
";
    let records = parse_manifest(contents).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].index, 1);
}

#[test]
fn manifest_rejects_malformed_rows() {
    assert!(matches!(
        parse_manifest("0 1.0 2.0 a.txt 1 0.0"),
        Err(ParseManifestError::Row { number: 1, .. })
    ));
    assert!(matches!(
        parse_manifest("zero 1.0 2.0 a.txt 1 0.0 1.0"),
        Err(ParseManifestError::Row { number: 1, .. })
    ));
}

#[test]
fn manifest_rejects_index_gaps() {
    let contents = "0 1.0 2.0 a.txt 1 0.0 1.0\n2 2.0 3.0 a.txt 2 1.0 2.0\n";
    assert!(matches!(
        parse_manifest(contents),
        Err(ParseManifestError::IndexMismatch {
            number: 2,
            expected: 1,
            found: 2,
        })
    ));
}

#[test]
fn manifest_rejects_ordering_regressions() {
    let contents = "0 2.0 3.0 a.txt 1 1.0 2.0\n1 1.0 2.0 a.txt 2 0.0 1.0\n";
    assert!(matches!(
        parse_manifest(contents),
        Err(ParseManifestError::OrderViolation { number: 2 })
    ));
}

#[test]
fn manifest_rejects_empty_intervals() {
    assert!(matches!(
        parse_manifest("0 2.0 2.0 a.txt 1 1.0 1.0"),
        Err(ParseManifestError::EmptyInterval { number: 1 })
    ));
}
