use super::*;

// 2024-03-01 00:00:00 UTC
const MARCH_FIRST: f64 = 1709251200.0;

#[test]
fn epoch_seconds_grammar() {
    assert_eq!(
        "1709251200.25".parse::<TimeSpec>().unwrap(),
        TimeSpec::Epoch(1709251200.25)
    );
    assert_eq!("0".parse::<TimeSpec>().unwrap(), TimeSpec::Epoch(0.0));
}

#[test]
fn calendar_grammar_full() {
    let TimeSpec::Epoch(t) = "UT20240301T12:10:00.5".parse().unwrap() else {
        panic!("not an absolute instant");
    };
    assert_eq!(t, MARCH_FIRST + 12.0 * 3600.0 + 10.0 * 60.0 + 0.5);
}

#[test]
fn calendar_grammar_trailing_fields_default_to_zero() {
    let TimeSpec::Epoch(t) = "UT20240301T12".parse().unwrap() else {
        panic!("not an absolute instant");
    };
    assert_eq!(t, MARCH_FIRST + 12.0 * 3600.0);

    let TimeSpec::Epoch(t) = "UT20240301T12:10".parse().unwrap() else {
        panic!("not an absolute instant");
    };
    assert_eq!(t, MARCH_FIRST + 12.0 * 3600.0 + 600.0);
}

#[test]
fn offset_grammars() {
    assert_eq!("+90.5".parse::<TimeSpec>().unwrap(), TimeSpec::Offset(90.5));
    assert_eq!(
        "+02:30.5".parse::<TimeSpec>().unwrap(),
        TimeSpec::Offset(150.5)
    );
    assert_eq!(
        "+01:02:03.5".parse::<TimeSpec>().unwrap(),
        TimeSpec::Offset(3723.5)
    );
}

#[test]
fn bad_time_specs() {
    assert!("".parse::<TimeSpec>().is_err());
    assert!("UT2024".parse::<TimeSpec>().is_err());
    // No `T` separator.
    assert!("UT20240301x12".parse::<TimeSpec>().is_err());
    // 2023 was not a leap year.
    assert!("UT20230229T00".parse::<TimeSpec>().is_err());
    assert!("UT20240301T25".parse::<TimeSpec>().is_err());
    assert!("UT20240301T12:60".parse::<TimeSpec>().is_err());
    assert!("UT20240301T12:00:00:00".parse::<TimeSpec>().is_err());
    assert!("+1:2:3:4".parse::<TimeSpec>().is_err());
    assert!("+-5".parse::<TimeSpec>().is_err());
    assert!("inf".parse::<TimeSpec>().is_err());
    assert!("not a time".parse::<TimeSpec>().is_err());
}

#[test]
fn window_rejects_reversed_bounds() {
    assert!(TimeWindow::new(1.0, 1.0).is_err());
    assert!(TimeWindow::new(2.0, 1.0).is_err());
    assert!(TimeWindow::new(1.0, 2.0).is_ok());
}

#[test]
fn window_overlap_is_half_open() {
    let window = TimeWindow::new(10.0, 20.0).unwrap();
    assert!(window.overlaps(9.0, 10.5));
    assert!(window.overlaps(19.5, 25.0));
    assert!(window.overlaps(0.0, 100.0));
    // Touching intervals do not overlap.
    assert!(!window.overlaps(5.0, 10.0));
    assert!(!window.overlaps(20.0, 30.0));
}

#[test]
fn day_directory_name() {
    assert_eq!(day_directory(MARCH_FIRST).unwrap(), "20240301");
    assert_eq!(day_directory(MARCH_FIRST - 0.001).unwrap(), "20240229");
    assert_eq!(day_directory(MARCH_FIRST + 86399.999).unwrap(), "20240301");
    assert!(day_directory(f64::NAN).is_none());
    assert!(day_directory(1e30).is_none());
}

#[test]
fn day_iteration_covers_the_interval() {
    let days = utc_days(MARCH_FIRST - SECONDS_PER_DAY, MARCH_FIRST + 600.0);
    let names: Vec<String> = days
        .iter()
        .map(|day| day.format("%Y%m%d").to_string())
        .collect();
    assert_eq!(names, ["20240229", "20240301"]);

    // An endpoint exactly at midnight still includes that day.
    let days = utc_days(MARCH_FIRST, MARCH_FIRST);
    assert_eq!(days.len(), 1);
    assert_eq!(day_start(days[0]), MARCH_FIRST);
}

#[test]
fn utc_rendering() {
    assert_eq!(
        format_utc(MARCH_FIRST + 43800.25),
        "2024-03-01 12:10:00.250 UTC"
    );
}
