mod common;

use chrono::Utc;
use stayops::Migrator;
use stayops::StayError;
use stayops::db::bookings::StayEmail;
use stayops::db::email_templates::NewEmailTemplate;
use stayops::db::guests::{NewGuest, NewStay};
use stayops::db::lock_pins::NewLockPin;
use stayops::db::models::{ContactType, ReviewPlatform, TemplateType, UserRole};
use stayops::db::properties::{NewCleaner, NewContact, SettingsInput};
use stayops::db::reviews::{NewReview, SubScores};
use stayops::db::{
    BookingStore, EmailTemplateStore, GuestStore, LockPinStore, PropertyStore, ReviewStore,
};
use stayops::service::PinRotation;
use stayops::types::AvailableVariables;

fn pin(pin: &str, order_index: Option<i64>) -> NewLockPin {
    NewLockPin {
        pin: pin.to_string(),
        label: None,
        order_index,
    }
}

fn review(property_id: i64, booking_id: Option<i64>, overall: i64) -> NewReview {
    NewReview {
        property_id,
        booking_id,
        guest_id: None,
        reviewer_name: Some("Ada".to_string()),
        overall_rating: overall,
        scores: SubScores::default(),
        review_text: None,
        platform: ReviewPlatform::Airbnb,
        external_review_id: None,
        is_verified: false,
        review_date: None,
    }
}

fn template(property_id: i64, name: &str, template_type: TemplateType) -> NewEmailTemplate {
    NewEmailTemplate {
        property_id,
        name: name.to_string(),
        template_type,
        subject: "Your stay at {{propertyName}}".to_string(),
        html_body: "<p>Hi {{guestName}}</p>".to_string(),
        text_body: None,
        days_before_check_in: Some(3),
        days_after_check_out: None,
        include_lock_pin: false,
        available_variables: None,
    }
}

#[tokio::test]
async fn cleaner_role_exists_only_after_its_step() {
    let pool = common::empty_pool("store-role").await;
    let migrator = Migrator::new(pool.clone());
    migrator
        .up(Some("20250301090400_create_property_contacts"))
        .await
        .expect("apply up to contacts");

    let store = PropertyStore::new(pool.clone());
    let err = store
        .create_user("sam@cleaning.test", "Sam", UserRole::Cleaner)
        .await
        .expect_err("cleaner is not a role yet");
    assert!(matches!(err, StayError::DatabaseError(_)));

    migrator.up(None).await.expect("apply rest");
    let id = store
        .create_user("sam@cleaning.test", "Sam", UserRole::Cleaner)
        .await
        .expect("cleaner role accepted");
    assert_eq!(store.get_user(id).await.expect("user").role, UserRole::Cleaner);
    assert_eq!(
        store.role_values().await.expect("roles"),
        vec!["admin", "cleaner", "manager", "owner"]
    );
}

#[tokio::test]
async fn lock_pin_order_is_unique_per_property() {
    let pool = common::migrated_pool("store-pins").await;
    let (_, property_id) = common::seed_property(&pool, "Pin House").await;
    let (_, other_property) = common::seed_property(&pool, "Other House").await;
    let pins = LockPinStore::new(pool.clone());

    pins.add(property_id, pin("1111", Some(0))).await.expect("first");
    let auto = pins.add(property_id, pin("2222", None)).await.expect("appended");
    assert_eq!(pins.get(auto).await.expect("pin").order_index, 1);

    let err = pins
        .add(property_id, pin("3333", Some(1)))
        .await
        .expect_err("index 1 taken");
    assert!(err.is_unique_violation());

    pins.add(other_property, pin("3333", Some(1)))
        .await
        .expect("same index on another property");

    let err = pins.add(property_id, pin("12", None)).await.expect_err("too short");
    assert!(matches!(err, StayError::Validation { field: "pin", .. }));

    pins.set_active(auto, false).await.expect("deactivate");
    assert_eq!(pins.list(property_id, true).await.expect("list").len(), 1);
    assert_eq!(pins.list(property_id, false).await.expect("list").len(), 2);
}

#[tokio::test]
async fn deleting_a_pin_keeps_the_booking_pin_text() {
    let pool = common::migrated_pool("store-pin-delete").await;
    let (_, property_id) = common::seed_property(&pool, "Keypad Flat").await;
    let booking_id = common::seed_booking(
        &pool,
        property_id,
        common::date(2025, 7, 1),
        common::date(2025, 7, 3),
    )
    .await;
    let pins = LockPinStore::new(pool.clone());
    let pin_id = pins.add(property_id, pin("482913", None)).await.expect("pin");

    PinRotation::new(pool.clone())
        .assign_to_booking(booking_id)
        .await
        .expect("assign");
    pins.delete(pin_id).await.expect("delete pin");

    let booking = BookingStore::new(pool.clone()).get(booking_id).await.expect("booking");
    assert_eq!(booking.lock_pin_id, None);
    assert_eq!(booking.assigned_lock_pin.as_deref(), Some("482913"));
}

#[tokio::test]
async fn settings_are_one_per_property() {
    let pool = common::migrated_pool("store-settings").await;
    let (_, property_id) = common::seed_property(&pool, "Settings Barn").await;
    let store = PropertyStore::new(pool.clone());

    let created = store
        .create_settings(
            property_id,
            SettingsInput {
                wifi_name: Some(Some("barn-guest".to_string())),
                ..SettingsInput::default()
            },
        )
        .await
        .expect("settings");
    assert_eq!(created.pre_stay_email_days, 3);
    assert_eq!(created.post_stay_email_days, 1);
    assert!(!created.pin_rotation_enabled);
    assert_eq!(created.wifi_name.as_deref(), Some("barn-guest"));

    let err = store
        .create_settings(property_id, SettingsInput::default())
        .await
        .expect_err("second settings row");
    assert!(err.is_unique_violation());

    let updated = store
        .update_settings(
            property_id,
            SettingsInput {
                pin_rotation_enabled: Some(true),
                pre_stay_email_days: Some(5),
                ..SettingsInput::default()
            },
        )
        .await
        .expect("update");
    assert!(updated.pin_rotation_enabled);
    assert_eq!(updated.pre_stay_email_days, 5);
    assert_eq!(updated.wifi_name.as_deref(), Some("barn-guest"));

    let err = store
        .update_settings(9999, SettingsInput::default())
        .await
        .expect_err("no settings row");
    assert!(matches!(err, StayError::NotFound { .. }));
}

#[tokio::test]
async fn settings_text_can_be_cleared_and_offsets_stay_non_negative() {
    let pool = common::migrated_pool("store-settings-clear").await;
    let (_, property_id) = common::seed_property(&pool, "Clearing House").await;
    let store = PropertyStore::new(pool.clone());

    store
        .create_settings(
            property_id,
            SettingsInput {
                wifi_name: Some(Some("house-guest".to_string())),
                house_rules: Some(Some("Shoes off".to_string())),
                ..SettingsInput::default()
            },
        )
        .await
        .expect("settings");

    let cleared = store
        .update_settings(
            property_id,
            SettingsInput {
                wifi_name: Some(None),
                ..SettingsInput::default()
            },
        )
        .await
        .expect("clear wifi name");
    assert_eq!(cleared.wifi_name, None);
    assert_eq!(cleared.house_rules.as_deref(), Some("Shoes off"));

    let err = store
        .update_settings(
            property_id,
            SettingsInput {
                pre_stay_email_days: Some(-1),
                ..SettingsInput::default()
            },
        )
        .await
        .expect_err("negative offset");
    assert!(matches!(
        err,
        StayError::Validation {
            field: "pre_stay_email_days",
            ..
        }
    ));

    let (_, fresh_property) = common::seed_property(&pool, "Fresh House").await;
    let err = store
        .create_settings(
            fresh_property,
            SettingsInput {
                post_stay_email_days: Some(-2),
                ..SettingsInput::default()
            },
        )
        .await
        .expect_err("negative offset");
    assert!(matches!(
        err,
        StayError::Validation {
            field: "post_stay_email_days",
            ..
        }
    ));
    assert!(store.get_settings(fresh_property).await.expect("query").is_none());

    let unchanged = store.get_settings(property_id).await.expect("query").expect("settings");
    assert_eq!(unchanged.pre_stay_email_days, 3);
}

#[tokio::test]
async fn cleaner_assignment_is_unique_and_toggleable() {
    let pool = common::migrated_pool("store-cleaners").await;
    let (_, property_id) = common::seed_property(&pool, "Clean Villa").await;
    let store = PropertyStore::new(pool.clone());

    let cleaner_id = store
        .create_cleaner(NewCleaner {
            name: "Sam Sparkle".to_string(),
            ..NewCleaner::default()
        })
        .await
        .expect("cleaner");
    store.assign_cleaner(property_id, cleaner_id).await.expect("assign");

    let err = store
        .assign_cleaner(property_id, cleaner_id)
        .await
        .expect_err("duplicate pair");
    assert!(err.is_unique_violation());

    assert_eq!(store.active_cleaners(property_id).await.expect("list").len(), 1);
    store
        .set_cleaner_active(property_id, cleaner_id, false)
        .await
        .expect("deactivate");
    assert!(store.active_cleaners(property_id).await.expect("list").is_empty());
    assert_eq!(store.list_assignments(property_id).await.expect("list").len(), 1);

    store
        .unassign_cleaner(property_id, cleaner_id)
        .await
        .expect("unassign");
    assert!(store.list_assignments(property_id).await.expect("list").is_empty());
    store
        .assign_cleaner(property_id, cleaner_id)
        .await
        .expect("pair is free again");

    store.delete_cleaner(cleaner_id).await.expect("delete cleaner");
    assert!(store.list_assignments(property_id).await.expect("list").is_empty());

    let err = store.delete_cleaner(cleaner_id).await.expect_err("already gone");
    assert!(matches!(err, StayError::NotFound { entity: "cleaner", id } if id == cleaner_id));
}

#[tokio::test]
async fn new_primary_contact_demotes_the_old_one() {
    let pool = common::migrated_pool("store-contacts").await;
    let (_, property_id) = common::seed_property(&pool, "Contact Cabin").await;
    let store = PropertyStore::new(pool.clone());

    let contact = |name: &str, contact_type: ContactType, is_primary: bool| NewContact {
        contact_type,
        name: name.to_string(),
        email: Some(format!("{}@contacts.test", name.to_lowercase())),
        phone: None,
        is_primary,
        receive_notifications: true,
    };

    store
        .add_contact(property_id, contact("First", ContactType::Owner, true))
        .await
        .expect("first");
    store
        .add_contact(property_id, contact("Guestline", ContactType::Guest, true))
        .await
        .expect("guest contact");
    store
        .add_contact(property_id, contact("Second", ContactType::Owner, true))
        .await
        .expect("second");

    let primary = store
        .primary_contact(property_id, ContactType::Owner)
        .await
        .expect("query")
        .expect("primary owner contact");
    assert_eq!(primary.name, "Second");

    let owners = store
        .list_contacts(property_id, Some(ContactType::Owner))
        .await
        .expect("owners");
    assert_eq!(owners.iter().filter(|c| c.is_primary).count(), 1);

    let guest_primary = store
        .primary_contact(property_id, ContactType::Guest)
        .await
        .expect("query")
        .expect("guest contact");
    assert!(guest_primary.is_primary);
    assert_eq!(store.list_contacts(property_id, None).await.expect("all").len(), 3);
}

#[tokio::test]
async fn deleting_a_property_removes_everything_it_owns() {
    let pool = common::migrated_pool("store-cascade").await;
    let (_, property_id) = common::seed_property(&pool, "Doomed Chalet").await;
    let booking_id = common::seed_booking(
        &pool,
        property_id,
        common::date(2025, 8, 1),
        common::date(2025, 8, 5),
    )
    .await;

    let properties = PropertyStore::new(pool.clone());
    let guests = GuestStore::new(pool.clone());
    LockPinStore::new(pool.clone())
        .add(property_id, pin("1234", None))
        .await
        .expect("pin");
    properties
        .create_settings(property_id, SettingsInput::default())
        .await
        .expect("settings");
    properties
        .add_contact(
            property_id,
            NewContact {
                contact_type: ContactType::Owner,
                name: "Olive".to_string(),
                email: None,
                phone: None,
                is_primary: true,
                receive_notifications: true,
            },
        )
        .await
        .expect("contact");
    let cleaner_id = properties
        .create_cleaner(NewCleaner {
            name: "Sam".to_string(),
            ..NewCleaner::default()
        })
        .await
        .expect("cleaner");
    properties
        .assign_cleaner(property_id, cleaner_id)
        .await
        .expect("assign");
    EmailTemplateStore::new(pool.clone())
        .create(template(property_id, "Welcome", TemplateType::PreStay))
        .await
        .expect("template");
    ReviewStore::new(pool.clone())
        .create(review(property_id, Some(booking_id), 5))
        .await
        .expect("review");
    let guest_id = guests
        .upsert_by_email(NewGuest {
            email: "ada@guests.test".to_string(),
            name: "Ada".to_string(),
            ..NewGuest::default()
        })
        .await
        .expect("guest");
    guests
        .record_stay(NewStay {
            guest_id,
            booking_id,
            ..NewStay::default()
        })
        .await
        .expect("stay");

    properties.delete_property(property_id).await.expect("delete");

    for table in [
        "bookings",
        "property_lock_pins",
        "property_settings",
        "property_contacts",
        "property_cleaners",
        "email_templates",
        "reviews",
        "guest_stays",
    ] {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(count, 0, "{table} should be emptied by the cascade");
    }

    // Guests and cleaners are not owned by the property.
    guests.get(guest_id).await.expect("guest survives");
    let (cleaners,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cleaners")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(cleaners, 1);
}

#[tokio::test]
async fn deleting_an_owner_orphans_the_property() {
    let pool = common::migrated_pool("store-owner-delete").await;
    let (owner_id, property_id) = common::seed_property(&pool, "Orphan Cottage").await;
    let store = PropertyStore::new(pool.clone());

    store.delete_user(owner_id).await.expect("delete owner");

    let property = store.get_property(property_id).await.expect("property survives");
    assert_eq!(property.owner_id, None);
    assert!(matches!(
        store.get_user(owner_id).await,
        Err(StayError::NotFound { entity: "user", .. })
    ));
}

#[tokio::test]
async fn reviews_outlive_their_booking() {
    let pool = common::migrated_pool("store-reviews").await;
    let (_, property_id) = common::seed_property(&pool, "Review Lodge").await;
    let booking_id = common::seed_booking(
        &pool,
        property_id,
        common::date(2025, 4, 1),
        common::date(2025, 4, 3),
    )
    .await;
    let reviews = ReviewStore::new(pool.clone());

    let kept = reviews
        .create(review(property_id, Some(booking_id), 4))
        .await
        .expect("review");
    BookingStore::new(pool.clone())
        .delete(booking_id)
        .await
        .expect("delete booking");

    let review_row = reviews.get(kept).await.expect("review survives");
    assert_eq!(review_row.booking_id, None);
    assert_eq!(review_row.platform, ReviewPlatform::Airbnb);
    assert!(review_row.is_published);

    let err = reviews
        .create(review(property_id, None, 6))
        .await
        .expect_err("rating out of range");
    assert!(matches!(err, StayError::Validation { field: "overall_rating", .. }));
}

#[tokio::test]
async fn rating_summary_counts_published_reviews_only() {
    let pool = common::migrated_pool("store-summary").await;
    let (_, property_id) = common::seed_property(&pool, "Summary Suites").await;
    let reviews = ReviewStore::new(pool.clone());

    let mut scored = review(property_id, None, 5);
    scored.scores.cleanliness = Some(4);
    reviews.create(scored).await.expect("review");
    reviews.create(review(property_id, None, 3)).await.expect("review");
    let hidden = reviews.create(review(property_id, None, 1)).await.expect("review");
    reviews.set_published(hidden, false).await.expect("unpublish");
    reviews.respond(hidden, "Sorry to hear that").await.expect("respond");

    let summary = reviews.summary(property_id).await.expect("summary");
    assert_eq!(summary.review_count, 2);
    assert_eq!(summary.overall, Some(4.0));
    assert_eq!(summary.cleanliness, Some(4.0));
    assert_eq!(summary.location, None);

    assert_eq!(reviews.list_for_property(property_id, true).await.expect("list").len(), 2);
    let all = reviews.list_for_property(property_id, false).await.expect("list");
    assert_eq!(all.len(), 3);
    let responded = reviews.get(hidden).await.expect("review");
    assert!(responded.owner_responded_at.is_some());
}

#[tokio::test]
async fn email_templates_get_default_variables() {
    let pool = common::migrated_pool("store-templates").await;
    let (_, property_id) = common::seed_property(&pool, "Template Inn").await;
    let templates = EmailTemplateStore::new(pool.clone());

    let first = templates
        .create(template(property_id, "Welcome", TemplateType::PreStay))
        .await
        .expect("template");
    let stored = templates.get(first).await.expect("template");
    assert_eq!(stored.available_variables, AvailableVariables::default());
    assert!(stored.is_active);
    assert!(!stored.include_lock_pin);

    let custom_vars = AvailableVariables {
        pin: vec![],
        ..AvailableVariables::default()
    };
    let mut custom = template(property_id, "Welcome v2", TemplateType::PreStay);
    custom.available_variables = Some(custom_vars.clone());
    let second = templates.create(custom).await.expect("template");
    templates
        .create(template(property_id, "Thanks", TemplateType::PostStay))
        .await
        .expect("template");

    let active = templates
        .find_active(property_id, TemplateType::PreStay)
        .await
        .expect("query")
        .expect("active pre-stay");
    assert_eq!(active.id, second);
    assert_eq!(active.available_variables, custom_vars);

    templates.set_active(second, false).await.expect("deactivate");
    let active = templates
        .find_active(property_id, TemplateType::PreStay)
        .await
        .expect("query")
        .expect("older template");
    assert_eq!(active.id, first);

    assert_eq!(templates.list_for_property(property_id).await.expect("list").len(), 3);
    assert!(templates
        .find_active(property_id, TemplateType::Custom)
        .await
        .expect("query")
        .is_none());
}

#[tokio::test]
async fn recorded_stays_roll_up_into_the_guest() {
    let pool = common::migrated_pool("store-guests").await;
    let (_, property_id) = common::seed_property(&pool, "Guest House").await;
    let guests = GuestStore::new(pool.clone());

    let guest_id = guests
        .upsert_by_email(NewGuest {
            email: "Ada@Guests.Test".to_string(),
            name: "Ada".to_string(),
            phone: Some("+44 20 7946 0000".to_string()),
            marketing_opt_in: None,
        })
        .await
        .expect("guest");
    let same = guests
        .upsert_by_email(NewGuest {
            email: "ada@guests.test ".to_string(),
            name: "Ada Lovelace".to_string(),
            ..NewGuest::default()
        })
        .await
        .expect("upsert");
    assert_eq!(same, guest_id);

    let later = common::seed_booking(
        &pool,
        property_id,
        common::date(2025, 9, 10),
        common::date(2025, 9, 12),
    )
    .await;
    let earlier = common::seed_booking(
        &pool,
        property_id,
        common::date(2025, 6, 1),
        common::date(2025, 6, 5),
    )
    .await;

    let stay = guests
        .record_stay(NewStay {
            guest_id,
            booking_id: later,
            rating: Some(5),
            review: None,
        })
        .await
        .expect("stay");
    assert_eq!(stay.nights, 2);
    guests
        .record_stay(NewStay {
            guest_id,
            booking_id: earlier,
            ..NewStay::default()
        })
        .await
        .expect("stay");

    let err = guests
        .record_stay(NewStay {
            guest_id,
            booking_id: later,
            ..NewStay::default()
        })
        .await
        .expect_err("one stay per booking");
    assert!(err.is_unique_violation());

    let guest = guests.get(guest_id).await.expect("guest");
    assert_eq!(guest.name, "Ada Lovelace");
    assert_eq!(guest.phone.as_deref(), Some("+44 20 7946 0000"));
    assert_eq!(guest.total_stays, 2);
    assert_eq!(guest.total_spent, 600.0);
    assert_eq!(
        guest.first_stay_at.map(|t| t.date_naive()),
        Some(common::date(2025, 6, 1))
    );
    assert_eq!(
        guest.last_stay_at.map(|t| t.date_naive()),
        Some(common::date(2025, 9, 10))
    );
    assert_eq!(guests.list_stays(guest_id).await.expect("stays").len(), 2);

    guests
        .set_blacklist(guest_id, Some("party"))
        .await
        .expect("blacklist");
    let tags = ["vip".to_string()].into_iter().collect();
    guests.set_tags(guest_id, &tags).await.expect("tags");
    let guest = guests
        .get_by_email("ADA@guests.test")
        .await
        .expect("query")
        .expect("guest");
    assert!(guest.is_blacklisted);
    assert_eq!(guest.blacklist_reason.as_deref(), Some("party"));
    assert!(guest.tags.contains("vip"));
}

#[tokio::test]
async fn due_emails_follow_property_settings() {
    let pool = common::migrated_pool("store-due").await;
    let (_, defaults_property) = common::seed_property(&pool, "Default Place").await;
    let (_, tuned_property) = common::seed_property(&pool, "Tuned Place").await;
    PropertyStore::new(pool.clone())
        .create_settings(
            tuned_property,
            SettingsInput {
                pre_stay_email_days: Some(7),
                post_stay_email_enabled: Some(false),
                ..SettingsInput::default()
            },
        )
        .await
        .expect("settings");

    let today = common::date(2025, 6, 10);
    // Three days out: due under the default window.
    let soon = common::seed_booking(
        &pool,
        defaults_property,
        common::date(2025, 6, 13),
        common::date(2025, 6, 15),
    )
    .await;
    // Six days out: only due where the window was widened.
    let _far_default = common::seed_booking(
        &pool,
        defaults_property,
        common::date(2025, 6, 16),
        common::date(2025, 6, 18),
    )
    .await;
    let far_tuned = common::seed_booking(
        &pool,
        tuned_property,
        common::date(2025, 6, 16),
        common::date(2025, 6, 18),
    )
    .await;
    // Checked out two days ago.
    let departed = common::seed_booking(
        &pool,
        defaults_property,
        common::date(2025, 6, 5),
        common::date(2025, 6, 8),
    )
    .await;
    let _departed_tuned = common::seed_booking(
        &pool,
        tuned_property,
        common::date(2025, 6, 5),
        common::date(2025, 6, 8),
    )
    .await;

    let bookings = BookingStore::new(pool.clone());
    let pre: Vec<_> = bookings
        .due_for_email(StayEmail::PreStay, today)
        .await
        .expect("pre-stay")
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(pre, vec![soon, far_tuned]);

    let post: Vec<_> = bookings
        .due_for_email(StayEmail::PostStay, today)
        .await
        .expect("post-stay")
        .into_iter()
        .map(|b| b.id)
        .collect();
    assert_eq!(post, vec![departed]);

    bookings
        .mark_email_sent(soon, StayEmail::PreStay, Utc::now())
        .await
        .expect("mark sent");
    let pre = bookings
        .due_for_email(StayEmail::PreStay, today)
        .await
        .expect("pre-stay");
    assert_eq!(pre.len(), 1);
    assert!(bookings.get(soon).await.expect("booking").pre_stay_email_sent_at.is_some());
}
