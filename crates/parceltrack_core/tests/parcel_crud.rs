use parceltrack_core::db::migrations::latest_version;
use parceltrack_core::db::open_db_in_memory;
use parceltrack_core::{
    NewParcel, ParcelRepository, RepoError, SqliteParcelRepository, STATUS_DELIVERED, STATUS_SENT,
};
use rusqlite::Connection;

#[test]
fn add_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();
    let draft = test_parcel();

    let number = repo.add(&draft).unwrap();
    assert!(number > 0);

    let stored = repo.get(number).unwrap();
    assert_eq!(stored.number, number);
    assert_eq!(stored.client, draft.client);
    assert_eq!(stored.status, draft.status);
    assert_eq!(stored.address, draft.address);
    assert_eq!(stored.created_at, draft.created_at);
}

#[test]
fn get_missing_parcel_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let err = repo.get(12_345).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(12_345)));
}

#[test]
fn delete_removes_registered_parcel() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let number = repo.add(&test_parcel()).unwrap();
    repo.delete(number).unwrap();

    let err = repo.get(number).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(n) if n == number));
}

#[test]
fn deleted_numbers_are_never_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let first = repo.add(&test_parcel()).unwrap();
    repo.delete(first).unwrap();

    let second = repo.add(&test_parcel()).unwrap();
    assert!(second > first);
}

#[test]
fn set_address_updates_registered_parcel() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let number = repo.add(&test_parcel()).unwrap();
    repo.set_address(number, "new test address").unwrap();

    let stored = repo.get(number).unwrap();
    assert_eq!(stored.address, "new test address");
}

#[test]
fn set_address_fails_once_parcel_left_registered() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let number = repo.add(&test_parcel()).unwrap();
    repo.set_status(number, STATUS_SENT).unwrap();

    let err = repo.set_address(number, "moved away").unwrap_err();
    assert!(matches!(err, RepoError::AddressLocked(n) if n == number));

    let stored = repo.get(number).unwrap();
    assert_eq!(stored.address, "test");
}

#[test]
fn set_address_on_missing_parcel_reports_locked() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    // Missing parcel and wrong status are one outcome: the gate and the
    // mutation share a statement, so zero affected rows is all we see.
    let err = repo.set_address(777, "nowhere").unwrap_err();
    assert!(matches!(err, RepoError::AddressLocked(777)));
}

#[test]
fn delete_fails_once_parcel_left_registered() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let number = repo.add(&test_parcel()).unwrap();
    repo.set_status(number, STATUS_DELIVERED).unwrap();

    let err = repo.delete(number).unwrap_err();
    assert!(matches!(err, RepoError::DeleteLocked(n) if n == number));

    let stored = repo.get(number).unwrap();
    assert_eq!(stored.status, STATUS_DELIVERED);
}

#[test]
fn delete_on_missing_parcel_reports_locked() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let err = repo.delete(777).unwrap_err();
    assert!(matches!(err, RepoError::DeleteLocked(777)));
}

#[test]
fn set_status_applies_regardless_of_current_status() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let number = repo.add(&test_parcel()).unwrap();
    repo.set_status(number, STATUS_SENT).unwrap();
    repo.set_status(number, STATUS_DELIVERED).unwrap();
    assert_eq!(repo.get(number).unwrap().status, STATUS_DELIVERED);

    // No transition graph is enforced; the gate is state-based, so going
    // back to `registered` re-enables address changes and deletion.
    repo.set_status(number, "registered").unwrap();
    repo.set_address(number, "back home").unwrap();
    assert_eq!(repo.get(number).unwrap().address, "back home");
    repo.delete(number).unwrap();
}

#[test]
fn set_status_on_missing_parcel_is_reported_as_success() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    // Zero matched rows is still Ok for the unconditional status write.
    repo.set_status(424_242, STATUS_SENT).unwrap();
}

#[test]
fn tracked_parcel_lifecycle_scenario() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteParcelRepository::try_new(&conn).unwrap();

    let number = repo
        .add(&NewParcel::registered(
            1000,
            "test",
            "2024-01-01T00:00:00Z",
        ))
        .unwrap();
    assert!(number > 0);

    let stored = repo.get(number).unwrap();
    assert_eq!(stored.client, 1000);
    assert!(stored.is_registered());

    repo.set_address(number, "new address").unwrap();
    assert_eq!(repo.get(number).unwrap().address, "new address");

    repo.set_status(number, STATUS_DELIVERED).unwrap();

    let err = repo.set_address(number, "another").unwrap_err();
    assert!(matches!(err, RepoError::AddressLocked(n) if n == number));
    assert_eq!(repo.get(number).unwrap().address, "new address");

    let err = repo.delete(number).unwrap_err();
    assert!(matches!(err, RepoError::DeleteLocked(n) if n == number));
    assert!(repo.get(number).is_ok());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteParcelRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_parcel_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteParcelRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("parcel"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE parcel (
            number  INTEGER PRIMARY KEY AUTOINCREMENT,
            client  INTEGER NOT NULL,
            status  TEXT NOT NULL,
            address TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteParcelRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "parcel",
            column: "created_at"
        })
    ));
}

fn test_parcel() -> NewParcel {
    NewParcel::registered(1000, "test", "2024-01-01T00:00:00Z")
}
