use u_timetable::config::EngineConfig;
use u_timetable::export::TimePreferenceEncoder;
use u_timetable::models::{ClockTime, PreferenceLevel, Teacher, TimePreference, WeekDay, WEEK_SLOTS};
use u_timetable::store::{ExternalScheduler, MemoryStore, SqliteScheduler, EXTERNAL_PREF_LEVEL_ID};
use u_timetable::Error;

fn scheduler() -> SqliteScheduler {
    let scheduler = SqliteScheduler::open_memory().unwrap();
    scheduler.migrate().unwrap();
    scheduler
}

fn preferences() -> MemoryStore {
    MemoryStore::new()
        .with_preference(
            TimePreference::new(
                "novak",
                "2024-winter",
                WeekDay::Mon,
                ClockTime::hour(8).unwrap(),
                2,
                PreferenceLevel::Cannot,
            )
            .with_weight(2.0, 1.0),
        )
        .with_preference(TimePreference::new(
            "novak",
            "2024-winter",
            WeekDay::Thu,
            ClockTime::new(13, 30).unwrap(),
            1,
            PreferenceLevel::Love,
        ))
}

#[test]
fn test_publish_writes_single_row() {
    let mut scheduler = scheduler();
    let owner = scheduler.add_instructor("1001", "Novak").unwrap();
    let encoder = TimePreferenceEncoder::from_config(&EngineConfig::default());
    let teacher = Teacher::new("novak").with_external_uid("1001");

    let encoded = encoder.encode(&preferences(), "novak", "2024-winter").unwrap();
    encoder.publish(&mut scheduler, &teacher, &encoded).unwrap();
    let again = encoder.publish(&mut scheduler, &teacher, &encoded).unwrap();
    assert_eq!(again.replaced, 1);

    let rows = scheduler.owner_rows(owner).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].preference.chars().count(), WEEK_SLOTS);
    assert_eq!(rows[0].pref_level_id, EXTERNAL_PREF_LEVEL_ID);
    assert_eq!(rows[0].time_pattern_id, None);
    assert_eq!(rows[0].unique_id, again.unique_id);
    assert_eq!(&rows[0].preference[16..20], "PPPP");
    assert_eq!(scheduler.time_pref_count().unwrap(), 1);
}

#[test]
fn test_unique_ids_come_from_sequence() {
    let mut scheduler = scheduler();
    let first = scheduler.add_instructor("a", "A").unwrap();
    let second = scheduler.add_instructor("b", "B").unwrap();
    assert_eq!(second, first + 1);

    let encoder = TimePreferenceEncoder::default();
    let neutral = "2".repeat(WEEK_SLOTS);
    let published = encoder
        .publish(&mut scheduler, &Teacher::new("a"), &neutral)
        .unwrap();
    assert_eq!(published.unique_id, second + 1);
}

#[test]
fn test_lookup_failures_leave_tables_untouched() {
    let mut scheduler = scheduler();
    scheduler.add_instructor("dup", "One").unwrap();
    scheduler.add_instructor("dup", "Two").unwrap();
    let encoder = TimePreferenceEncoder::default();
    let neutral = "2".repeat(WEEK_SLOTS);

    let err = encoder
        .publish(&mut scheduler, &Teacher::new("dup"), &neutral)
        .unwrap_err();
    assert!(matches!(err, Error::AmbiguousExternalTeacher { matches: 2, .. }));

    let err = encoder
        .publish(&mut scheduler, &Teacher::new("nobody"), &neutral)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownExternalTeacher { .. }));

    assert_eq!(scheduler.time_pref_count().unwrap(), 0);
}

#[test]
fn test_rolled_back_transaction() {
    let mut scheduler = scheduler();
    let owner = scheduler.add_instructor("x", "X").unwrap();
    let encoder = TimePreferenceEncoder::default();
    encoder
        .publish(&mut scheduler, &Teacher::new("x"), &"1".repeat(WEEK_SLOTS))
        .unwrap();

    let result: u_timetable::Result<()> = scheduler.with_transaction(|writer| {
        writer.delete_owner_rows(owner)?;
        Err(Error::Storage("aborted".into()))
    });
    assert!(result.is_err());
    assert_eq!(scheduler.owner_rows(owner).unwrap().len(), 1);
}

#[test]
fn test_publish_all_to_database() {
    let dir = tempfile::tempdir().unwrap();
    let mut scheduler = SqliteScheduler::open(dir.path().join("scheduler.db")).unwrap();
    scheduler.migrate().unwrap();
    scheduler.add_instructor("1001", "Novak").unwrap();

    let teachers = vec![
        Teacher::new("novak").with_external_uid("1001"),
        Teacher::new("kranjc").with_external_uid("2002"),
    ];
    let report = TimePreferenceEncoder::default().publish_all(
        &preferences(),
        &mut scheduler,
        &teachers,
        "2024-winter",
    );

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed_entities(), vec!["kranjc"]);
    assert_eq!(scheduler.time_pref_count().unwrap(), 1);
}
