use super::*;

#[test]
fn relative_tend_is_an_offset_from_tstart() {
    let window = resolve_window(TimeSpec::Epoch(1000.0), TimeSpec::Offset(120.5)).unwrap();
    assert_eq!(window.tstart, 1000.0);
    assert_eq!(window.tend, 1120.5);
}

#[test]
fn relative_tstart_is_rejected() {
    assert!(resolve_window(TimeSpec::Offset(10.0), TimeSpec::Epoch(1000.0)).is_err());
}

#[test]
fn reversed_window_is_rejected() {
    assert!(resolve_window(TimeSpec::Epoch(1000.0), TimeSpec::Epoch(900.0)).is_err());
}

#[test]
fn scan_skips_comments_and_malformed_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cam2_00:00:00.000.txt");
    std::fs::write(
        &path,
        "# header\n0 0 0 0 10.0\nbogus line\n1 0 0 0 10.5\n\n2 0 0 0 11.0\n",
    )
    .unwrap();

    let window = TimeWindow::new(0.0, 100.0).unwrap();
    let grid = ResampleGrid::new(0.0, 0.5).unwrap();
    let mut builder = ManifestBuilder::new(window, grid);
    scan_file(&mut builder, &path, "cam2_00:00:00.000.txt");

    let records = builder.into_records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].start_time, 10.0);
    assert_eq!(records[0].end_time, 10.5);
    assert_eq!(records[1].end_time, 11.0);
}

#[test]
fn unopenable_file_breaks_the_chain() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("cam2_00:00:00.000.txt");
    std::fs::write(&good, "0 0 0 0 10.0\n1 0 0 0 10.5\n").unwrap();
    let missing = dir.path().join("cam2_00:00:20.000.txt");
    let later = dir.path().join("cam2_00:00:40.000.txt");
    std::fs::write(&later, "0 0 0 0 40.0\n1 0 0 0 40.5\n").unwrap();

    let window = TimeWindow::new(0.0, 100.0).unwrap();
    let grid = ResampleGrid::new(0.0, 0.5).unwrap();
    let mut builder = ManifestBuilder::new(window, grid);
    scan_file(&mut builder, &good, "cam2_00:00:00.000.txt");
    scan_file(&mut builder, &missing, "cam2_00:00:20.000.txt");
    scan_file(&mut builder, &later, "cam2_00:00:40.000.txt");

    let records = builder.into_records();
    // The first row after the broken chain only reseeds it.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].end_time, 10.5);
    assert_eq!(records[1].start_time, 40.0);
    assert_eq!(records[1].end_time, 40.5);
}

#[test]
fn sampling_interval_validation() {
    assert_eq!(valid_sampling_interval("0.01").unwrap(), 0.01);
    assert!(valid_sampling_interval("0").is_err());
    assert!(valid_sampling_interval("-1").is_err());
    assert!(valid_sampling_interval("inf").is_err());
    assert!(valid_sampling_interval("ten").is_err());
}
