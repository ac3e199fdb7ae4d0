//! Policy selection fixtures
//!
//! Reference scenarios for the minimum-version engine: per-package windows,
//! the default window, and date-bypassing overrides, each evaluated against a
//! realistic release history.

use chrono::{NaiveDate, TimeZone, Utc};
use indexmap::IndexMap;
use rstest::rstest;

use minimum_versions::policy::Policy;
use minimum_versions::release::Release;

fn release(version: &str, date: (i32, u32, u32)) -> Release {
    let (year, month, day) = date;
    Release {
        version: version.parse().unwrap(),
        build_number: 0,
        timestamp: Some(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()),
    }
}

fn releases(package: &str) -> Vec<Release> {
    match package {
        "numpy" => vec![
            release("1.22.0", (2022, 12, 1)),
            release("1.22.1", (2023, 2, 5)),
            release("1.23.0", (2023, 6, 9)),
            release("1.23.1", (2023, 8, 12)),
            release("1.23.2", (2023, 12, 5)),
        ],
        "scipy" => vec![
            release("1.0.0", (2022, 11, 10)),
            release("1.0.1", (2023, 1, 13)),
            release("1.1.0", (2023, 9, 21)),
            release("1.1.1", (2023, 12, 1)),
            release("1.2.0", (2024, 1, 3)),
            release("1.2.1", (2024, 2, 5)),
        ],
        other => panic!("no fixture releases for {other}"),
    }
}

fn base_policy(default_months: u32) -> Policy {
    Policy::new(IndexMap::from([("numpy".to_string(), 6)]), default_months)
}

#[rstest]
#[case::per_package_window(
    "numpy",
    base_policy(12),
    (2023, 12, 12),
    release("1.23.0", (2023, 6, 9))
)]
#[case::default_window(
    "scipy",
    base_policy(8),
    (2024, 9, 5),
    release("1.2.0", (2024, 1, 3))
)]
fn minimum_version_selects_the_windowed_release(
    #[case] package: &str,
    #[case] policy: Policy,
    #[case] today: (i32, u32, u32),
    #[case] expected: Release,
) {
    let (year, month, day) = today;
    let today = NaiveDate::from_ymd_opt(year, month, day).unwrap();

    let actual = policy
        .minimum_version(today, package, &releases(package))
        .unwrap();

    assert_eq!(actual, expected);
    assert_eq!(actual.timestamp, expected.timestamp);
}

#[test]
fn override_wins_regardless_of_the_reference_date() {
    let mut policy = base_policy(8);
    policy
        .overrides
        .insert("scipy".to_string(), "1.1.1".parse().unwrap());
    let today = NaiveDate::from_ymd_opt(2024, 9, 5).unwrap();

    let actual = policy
        .minimum_version(today, "scipy", &releases("scipy"))
        .unwrap();

    assert_eq!(actual, release("1.1.1", (2023, 12, 1)));
    assert_eq!(
        actual.timestamp,
        Some(Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap())
    );
}
