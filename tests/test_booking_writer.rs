mod helpers;

use chrono::{NaiveDate, NaiveDateTime};
use findnkeep::application::services::{AvailabilityService, CapacityPolicy};
use findnkeep::domain::entities::{
    AvailabilityTarget, CreateBookingRequest, MeetingType, NewBooking, Priority, Profile, Room,
    UserRole,
};
use findnkeep::domain::errors::DomainError;
use findnkeep::domain::ports::booking_repository::BookingRepository;
use findnkeep::domain::ports::profile_repository::ProfileRepository;
use findnkeep::domain::ports::room_repository::RoomRepository;
use helpers::*;
use std::sync::Arc;

fn at(date: &str, time: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M").unwrap()
}

#[tokio::test]
async fn books_a_free_slot_and_shows_it_as_booked() {
    let db = setup_test_db().await;
    let room = create_test_room(&db, "Board Room", 8).await;
    create_test_profile(&db, "user-a", "Ada", "Lovelace", UserRole::Organizer).await;
    let service = booking_service(&db);

    let confirmation = service
        .create_booking(booking_request(
            &room.id, "user-a", MONDAY, "09:00", "10:00", "Sync",
        ))
        .await
        .expect("booking should succeed");

    assert_eq!(confirmation.room_name, "Board Room");
    assert_eq!(confirmation.date, MONDAY);
    assert_eq!(confirmation.start_time, "09:00");
    assert_eq!(confirmation.end_time, "10:00");
    assert_eq!(confirmation.priority, Priority::Medium);
    assert_eq!(confirmation.meeting_type, MeetingType::Internal);
    assert!(confirmation.warnings.is_empty());

    let availability = AvailabilityService::new(Arc::new(db.database()), Arc::new(db.database()));
    let days = availability
        .get_availability(
            &AvailabilityTarget::Room(room.id.clone()),
            NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(days.len(), 1);
    let booked = &days[0].booked;
    assert_eq!(booked.len(), 1);
    assert_eq!(booked[0].event_name.as_deref(), Some("Sync"));
    assert_eq!(booked[0].booked_by.as_deref(), Some("Ada Lovelace"));
    assert_eq!(booked[0].booking_id.as_deref(), Some(confirmation.booking_id.as_str()));
}

#[tokio::test]
async fn rows_with_empty_optional_columns_read_back() {
    let db = setup_test_db().await;
    let bare = Room::new("Phone Booth".to_string(), None, 1, None, Vec::new());
    db.create_room(&bare).await.unwrap();
    db.upsert_profile(&Profile::new(
        "user-n".to_string(),
        "nameless@example.com".to_string(),
        None,
        None,
        UserRole::Organizer,
    ))
    .await
    .unwrap();

    let stored = db.get_room(&bare.id).await.unwrap().expect("room exists");
    assert_eq!(stored.description, None);
    assert_eq!(stored.location, None);
    assert!(stored.amenities.is_empty());

    let service = booking_service(&db);
    let mut request = booking_request(&bare.id, "user-n", MONDAY, "09:00", "09:30", "Call");
    request.attendees = None;
    let confirmation = service.create_booking(request).await.unwrap();
    let unprofiled = service
        .create_booking(booking_request(
            &bare.id, "user-x", MONDAY, "10:00", "10:30", "Call",
        ))
        .await
        .unwrap();

    let booking = db
        .get_booking(&confirmation.booking_id)
        .await
        .unwrap()
        .expect("booking exists");
    assert_eq!(booking.attendees, None);
    assert_eq!(booking.owner_name.as_deref(), Some("nameless@example.com"));

    let orphan = db.list_bookings_for_owner("user-x").await.unwrap();
    assert_eq!(orphan.len(), 1);
    assert_eq!(orphan[0].id, unprofiled.booking_id);
    assert_eq!(orphan[0].owner_name, None);

    let profile = db.get_profile("user-n").await.unwrap().expect("profile exists");
    assert_eq!(profile.first_name, None);
    assert_eq!(profile.last_name, None);
}

#[tokio::test]
async fn overlapping_booking_names_the_existing_one() {
    let db = setup_test_db().await;
    let room = create_test_room(&db, "Board Room", 8).await;
    create_test_profile(&db, "user-a", "Ada", "Lovelace", UserRole::Organizer).await;
    let service = booking_service(&db);

    service
        .create_booking(booking_request(
            &room.id, "user-a", MONDAY, "09:00", "10:00", "Sync",
        ))
        .await
        .unwrap();

    let err = service
        .create_booking(booking_request(
            &room.id, "user-b", MONDAY, "09:30", "10:30", "Retro",
        ))
        .await
        .unwrap_err();

    match &err {
        DomainError::SlotConflict {
            title,
            owner,
            start,
            end,
        } => {
            assert_eq!(title, "Sync");
            assert_eq!(owner.as_deref(), Some("Ada Lovelace"));
            assert_eq!(start, "09:00");
            assert_eq!(end, "10:00");
        }
        other => panic!("expected SlotConflict, got {:?}", other),
    }
    assert!(err.to_string().contains("\"Sync\""));
}

#[tokio::test]
async fn adjacent_bookings_are_allowed() {
    let db = setup_test_db().await;
    let room = create_test_room(&db, "Board Room", 8).await;
    let service = booking_service(&db);

    service
        .create_booking(booking_request(
            &room.id, "user-a", MONDAY, "09:00", "10:00", "Sync",
        ))
        .await
        .unwrap();
    service
        .create_booking(booking_request(
            &room.id, "user-b", MONDAY, "10:00", "11:00", "Planning",
        ))
        .await
        .expect("touching intervals do not overlap");
    service
        .create_booking(booking_request(
            &room.id, "user-b", MONDAY, "08:00", "09:00", "Standup",
        ))
        .await
        .expect("touching intervals do not overlap");

    let mine = service.list_bookings_for_owner("user-b").await.unwrap();
    let titles: Vec<&str> = mine.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Standup", "Planning"]);
}

#[tokio::test]
async fn same_slot_in_another_room_is_allowed() {
    let db = setup_test_db().await;
    let board = create_test_room(&db, "Board Room", 8).await;
    let huddle = create_test_room(&db, "Huddle", 4).await;
    let service = booking_service(&db);

    for room in [&board, &huddle] {
        service
            .create_booking(booking_request(
                &room.id, "user-a", MONDAY, "09:00", "10:00", "Sync",
            ))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn rejects_empty_and_inverted_ranges() {
    let db = setup_test_db().await;
    let room = create_test_room(&db, "Board Room", 8).await;
    let service = booking_service(&db);

    for (start, end) in [("10:00", "10:00"), ("11:00", "10:00")] {
        let err = service
            .create_booking(booking_request(&room.id, "user-a", MONDAY, start, end, "Sync"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, DomainError::InvalidRange { .. }),
            "{}-{} gave {:?}",
            start,
            end,
            err
        );
    }
}

#[tokio::test]
async fn capacity_is_enforced_or_warned() {
    let db = setup_test_db().await;
    let room = create_test_room(&db, "Huddle", 4).await;

    let mut request = booking_request(&room.id, "user-a", MONDAY, "09:00", "10:00", "Sync");
    request.attendees = Some(6);

    let err = booking_service(&db)
        .create_booking(request.clone())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::CapacityExceeded {
            attendees: 6,
            capacity: 4
        }
    );

    let confirmation = booking_service_with(&db, CapacityPolicy::Warn)
        .create_booking(request)
        .await
        .expect("warn policy lets the booking through");
    assert_eq!(confirmation.attendees, Some(6));
    assert_eq!(confirmation.warnings.len(), 1);
}

#[tokio::test]
async fn missing_and_malformed_fields_are_reported() {
    let db = setup_test_db().await;
    let room = create_test_room(&db, "Board Room", 8).await;
    let service = booking_service(&db);

    let mut request = booking_request(&room.id, "user-a", MONDAY, "09:00", "10:00", "Sync");
    request.title = Some("   ".to_string());
    assert_eq!(
        service.create_booking(request).await.unwrap_err(),
        DomainError::MissingField("title".to_string())
    );

    let err = service
        .create_booking(CreateBookingRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::MissingField(_)));

    let err = service
        .create_booking(booking_request(
            &room.id, "user-a", MONDAY, "9am", "10:00", "Sync",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidFormat { ref field, .. } if field == "start_time"));

    let mut request = booking_request(&room.id, "user-a", MONDAY, "09:00", "10:00", "Sync");
    request.priority = Some("urgent".to_string());
    let err = service.create_booking(request).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidFormat { ref field, .. } if field == "priority"));
}

#[tokio::test]
async fn unknown_or_inactive_room_is_not_found() {
    let db = setup_test_db().await;
    let inactive = create_inactive_room(&db, "Old Lab", 10).await;
    let service = booking_service(&db);

    let err = service
        .create_booking(booking_request(
            &inactive.id, "user-a", MONDAY, "09:00", "10:00", "Sync",
        ))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::RoomNotFound(inactive.id.clone()));

    let err = service
        .create_booking(booking_request(
            "no-such-room",
            "user-a",
            MONDAY,
            "09:00",
            "10:00",
            "Sync",
        ))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Room \"no-such-room\" not found.");
}

#[tokio::test]
async fn concurrent_overlapping_requests_admit_exactly_one() {
    let db = setup_test_db().await;
    let room = create_test_room(&db, "Board Room", 8).await;
    let first = booking_service(&db);
    let second = booking_service(&db);

    let (a, b) = tokio::join!(
        first.create_booking(booking_request(
            &room.id, "user-a", MONDAY, "09:00", "10:00", "Sync",
        )),
        second.create_booking(booking_request(
            &room.id, "user-b", MONDAY, "09:30", "10:30", "Retro",
        )),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "a={:?} b={:?}", a, b);
    let failure = a.err().or(b.err()).unwrap();
    assert!(matches!(failure, DomainError::SlotConflict { .. }));

    let stored = db
        .list_bookings_in_window(Some(&room.id), at(MONDAY, "00:00"), at("2025-03-04", "00:00"))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn store_rejects_overlap_written_around_the_writer() {
    let db = setup_test_db().await;
    let room = create_test_room(&db, "Board Room", 8).await;
    booking_service(&db)
        .create_booking(booking_request(
            &room.id, "user-a", MONDAY, "09:00", "10:00", "Sync",
        ))
        .await
        .unwrap();

    let sneaky = NewBooking {
        id: uuid::Uuid::new_v4().to_string(),
        room_id: room.id.clone(),
        user_id: "user-b".to_string(),
        title: "Sneaky".to_string(),
        start_time: at(MONDAY, "09:59"),
        end_time: at(MONDAY, "10:30"),
        priority: Priority::High,
        attendees: None,
        zoom_required: false,
        meeting_type: MeetingType::External,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    let err = db.insert_booking(&sneaky).await.unwrap_err();
    match err {
        DomainError::SlotConflict { title, .. } => assert_eq!(title, "Sync"),
        other => panic!("expected SlotConflict, got {:?}", other),
    }
}

#[tokio::test]
async fn only_the_owner_or_a_superadmin_can_cancel() {
    let db = setup_test_db().await;
    let room = create_test_room(&db, "Board Room", 8).await;
    let owner = create_test_profile(&db, "user-a", "Ada", "Lovelace", UserRole::Organizer).await;
    let other = create_test_profile(&db, "user-b", "Alan", "Turing", UserRole::Organizer).await;
    let admin = create_test_profile(&db, "admin", "Grace", "Hopper", UserRole::Superadmin).await;
    let service = booking_service(&db);

    let first = service
        .create_booking(booking_request(
            &room.id, "user-a", MONDAY, "09:00", "10:00", "Sync",
        ))
        .await
        .unwrap();
    let second = service
        .create_booking(booking_request(
            &room.id, "user-a", MONDAY, "11:00", "12:00", "Review",
        ))
        .await
        .unwrap();

    assert!(matches!(
        service.cancel_booking(&other, &first.booking_id).await,
        Err(DomainError::Forbidden(_))
    ));
    service.cancel_booking(&owner, &first.booking_id).await.unwrap();
    service.cancel_booking(&admin, &second.booking_id).await.unwrap();
    assert!(matches!(
        service.cancel_booking(&owner, &first.booking_id).await,
        Err(DomainError::NotFound(_))
    ));

    // the freed slot can be booked again
    service
        .create_booking(booking_request(
            &room.id, "user-b", MONDAY, "09:00", "10:00", "Rebooked",
        ))
        .await
        .unwrap();
}
