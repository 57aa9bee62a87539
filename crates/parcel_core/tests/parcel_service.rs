use parcel_core::db::open_db_in_memory;
use parcel_core::{
    ParcelNumber, ParcelRepository, ParcelService, ParcelStatus, RepoError, ServiceError,
    SqliteParcelRepository,
};
use std::error::Error;

#[test]
fn register_stores_registered_parcel_with_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    let parcel = service.register(1000, "Pushkin st. 10").unwrap();
    assert_ne!(parcel.number, ParcelNumber::UNASSIGNED);
    assert_eq!(parcel.client, 1000);
    assert_eq!(parcel.status, ParcelStatus::Registered);
    assert_eq!(parcel.address, "Pushkin st. 10");
    assert!(chrono::DateTime::parse_from_rfc3339(&parcel.created_at).is_ok());
}

#[test]
fn next_status_walks_lifecycle_and_stops_at_delivered() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());
    let number = service.register(1, "somewhere").unwrap().number;

    assert_eq!(service.next_status(number).unwrap(), ParcelStatus::Sent);
    assert_eq!(service.next_status(number).unwrap(), ParcelStatus::Delivered);
    assert_eq!(service.next_status(number).unwrap(), ParcelStatus::Delivered);
}

#[test]
fn next_status_on_missing_parcel_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    let err = service.next_status(ParcelNumber(12)).unwrap_err();
    assert!(matches!(err, ServiceError::ParcelNotFound(ParcelNumber(12))));
}

#[test]
fn change_address_and_cancel_are_rejected_after_dispatch() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());
    let number = service.register(1, "old address").unwrap().number;

    service.change_address(number, "new address").unwrap();
    service.next_status(number).unwrap();

    let err = service.change_address(number, "late address").unwrap_err();
    assert!(matches!(err, ServiceError::NotRegistered(rejected) if rejected == number));
    let err = service.cancel(number).unwrap_err();
    assert!(matches!(err, ServiceError::NotRegistered(_)));

    let repo = SqliteParcelRepository::new(&conn);
    assert_eq!(repo.get(number).unwrap().address, "new address");
}

#[test]
fn cancel_removes_registered_parcel() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());
    let parcel = service.register(77, "somewhere").unwrap();

    service.cancel(parcel.number).unwrap();
    assert!(service.client_parcels(77).unwrap().is_empty());

    let err = service.cancel(parcel.number).unwrap_err();
    assert!(matches!(err, ServiceError::ParcelNotFound(_)));
}

#[test]
fn client_parcels_lists_every_registration_of_client() {
    let conn = open_db_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn).unwrap());

    let first = service.register(5, "a").unwrap();
    service.register(6, "b").unwrap();
    let second = service.register(5, "c").unwrap();

    let parcels = service.client_parcels(5).unwrap();
    assert_eq!(parcels, vec![first, second]);
}

#[test]
fn store_failure_reaches_caller_with_source_chain() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let service = ParcelService::new(SqliteParcelRepository::new(&conn));

    let err = service.client_parcels(1).unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::Db(_))));

    let repo_err = err.source().expect("service error should expose repo cause");
    let store_err = repo_err.source().expect("repo error should expose store cause");
    assert!(store_err.to_string().contains("no such table"));
}
