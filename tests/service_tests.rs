mod common;

use stayops::StayError;
use stayops::db::email_templates::NewEmailTemplate;
use stayops::db::lock_pins::NewLockPin;
use stayops::db::models::{ContactType, TemplateType};
use stayops::db::properties::{NewContact, SettingsInput};
use stayops::db::{BookingStore, EmailTemplateStore, LockPinStore, PropertyStore};
use stayops::service::{EmailComposer, PinRotation};

async fn add_pins(pool: &stayops::db::SqlitePool, property_id: i64, pins: &[&str]) -> Vec<i64> {
    let store = LockPinStore::new(pool.clone());
    let mut ids = Vec::new();
    for pin in pins {
        let id = store
            .add(
                property_id,
                NewLockPin {
                    pin: pin.to_string(),
                    label: None,
                    order_index: None,
                },
            )
            .await
            .expect("pin");
        ids.push(id);
    }
    ids
}

fn composer(pool: &stayops::db::SqlitePool) -> EmailComposer {
    EmailComposer::new(
        BookingStore::new(pool.clone()),
        PropertyStore::new(pool.clone()),
        EmailTemplateStore::new(pool.clone()),
    )
}

#[tokio::test]
async fn fixed_mode_reuses_the_first_pin() {
    let pool = common::migrated_pool("svc-pin-fixed").await;
    let (_, property_id) = common::seed_property(&pool, "Fixed Flat").await;
    let pin_ids = add_pins(&pool, property_id, &["1111", "2222"]).await;
    let rotation = PinRotation::new(pool.clone());

    for day in [1, 5] {
        let booking_id = common::seed_booking(
            &pool,
            property_id,
            common::date(2025, 3, day),
            common::date(2025, 3, day + 2),
        )
        .await;
        let assigned = rotation.assign_to_booking(booking_id).await.expect("assign");
        assert_eq!(assigned.lock_pin_id, pin_ids[0]);
        assert_eq!(assigned.next_pin_index, None);
    }

    let first = LockPinStore::new(pool.clone()).get(pin_ids[0]).await.expect("pin");
    assert_eq!(first.usage_count, 2);
    assert!(first.last_used_at.is_some());
}

#[tokio::test]
async fn rotation_cycles_and_skips_inactive_pins() {
    let pool = common::migrated_pool("svc-pin-rotate").await;
    let (_, property_id) = common::seed_property(&pool, "Rotating Loft").await;
    let pin_ids = add_pins(&pool, property_id, &["1111", "2222", "3333"]).await;
    PropertyStore::new(pool.clone())
        .create_settings(
            property_id,
            SettingsInput {
                pin_rotation_enabled: Some(true),
                ..SettingsInput::default()
            },
        )
        .await
        .expect("settings");
    LockPinStore::new(pool.clone())
        .set_active(pin_ids[1], false)
        .await
        .expect("deactivate middle pin");

    let rotation = PinRotation::new(pool.clone());
    let mut handed_out = Vec::new();
    for day in [1, 4, 7] {
        let booking_id = common::seed_booking(
            &pool,
            property_id,
            common::date(2025, 10, day),
            common::date(2025, 10, day + 2),
        )
        .await;
        let assigned = rotation.assign_to_booking(booking_id).await.expect("assign");
        let booking = BookingStore::new(pool.clone()).get(booking_id).await.expect("booking");
        assert_eq!(booking.assigned_lock_pin.as_deref(), Some(assigned.pin.as_str()));
        assert_eq!(booking.lock_pin_id, Some(assigned.lock_pin_id));
        handed_out.push(assigned.pin);
    }
    assert_eq!(handed_out, vec!["1111", "3333", "1111"]);

    let settings = PropertyStore::new(pool.clone())
        .get_settings(property_id)
        .await
        .expect("query")
        .expect("settings");
    assert_eq!(settings.current_pin_index, 1);
}

#[tokio::test]
async fn assigning_without_pins_fails() {
    let pool = common::migrated_pool("svc-pin-none").await;
    let (_, property_id) = common::seed_property(&pool, "Pinless Pad").await;
    let booking_id = common::seed_booking(
        &pool,
        property_id,
        common::date(2025, 2, 1),
        common::date(2025, 2, 2),
    )
    .await;

    let err = PinRotation::new(pool.clone())
        .assign_to_booking(booking_id)
        .await
        .expect_err("no pins");
    assert!(matches!(err, StayError::NoActivePin { property_id: p } if p == property_id));

    let err = PinRotation::new(pool)
        .assign_to_booking(424242)
        .await
        .expect_err("no booking");
    assert!(matches!(err, StayError::NotFound { entity: "booking", .. }));
}

#[tokio::test]
async fn composes_pre_stay_email_with_booking_details() {
    let pool = common::migrated_pool("svc-compose").await;
    let (_, property_id) = common::seed_property(&pool, "Harbor Loft").await;
    let properties = PropertyStore::new(pool.clone());
    properties
        .create_settings(
            property_id,
            SettingsInput {
                wifi_name: Some(Some("loft-guest".to_string())),
                house_rules: Some(Some("No <parties> & quiet after 22:00".to_string())),
                ..SettingsInput::default()
            },
        )
        .await
        .expect("settings");
    properties
        .add_contact(
            property_id,
            NewContact {
                contact_type: ContactType::Owner,
                name: "Harbor Hosts".to_string(),
                email: Some("hello@harbor.test".to_string()),
                phone: Some("+1 555 0100".to_string()),
                is_primary: true,
                receive_notifications: true,
            },
        )
        .await
        .expect("contact");
    add_pins(&pool, property_id, &["482913"]).await;

    let booking_id = common::seed_booking(
        &pool,
        property_id,
        common::date(2025, 6, 28),
        common::date(2025, 7, 2),
    )
    .await;
    PinRotation::new(pool.clone())
        .assign_to_booking(booking_id)
        .await
        .expect("assign");

    let templates = EmailTemplateStore::new(pool.clone());
    let template_id = templates
        .create(NewEmailTemplate {
            property_id,
            name: "Arrival".to_string(),
            template_type: TemplateType::PreStay,
            subject: "{{guestName}}, see you on {{checkInDate}}".to_string(),
            html_body: concat!(
                "<p>{{numberOfNights}} nights. Wifi {{wifiName}}. {{houseRules}}. ",
                "Code {{lockPin}}. {{loyaltyTier}}</p>"
            )
            .to_string(),
            text_body: Some("Questions? {{ownerName}} at {{ownerEmail}}".to_string()),
            days_before_check_in: Some(3),
            days_after_check_out: None,
            include_lock_pin: true,
            available_variables: None,
        })
        .await
        .expect("template");

    let email = composer(&pool)
        .compose(booking_id, TemplateType::PreStay)
        .await
        .expect("compose");

    assert_eq!(email.template_id, template_id);
    assert_eq!(email.to.as_deref(), Some("ada@guests.test"));
    assert_eq!(email.subject, "Ada Guest, see you on 2025-06-28");
    assert_eq!(
        email.html_body,
        concat!(
            "<p>4 nights. Wifi loft-guest. No &lt;parties&gt; &amp; quiet after 22:00. ",
            "Code 482913. {{loyaltyTier}}</p>"
        )
    );
    assert_eq!(
        email.text_body.as_deref(),
        Some("Questions? Harbor Hosts at hello@harbor.test")
    );
}

#[tokio::test]
async fn pin_is_withheld_unless_template_allows_it() {
    let pool = common::migrated_pool("svc-compose-nopin").await;
    let (_, property_id) = common::seed_property(&pool, "Quiet Cabin").await;
    add_pins(&pool, property_id, &["7777"]).await;
    let booking_id = common::seed_booking(
        &pool,
        property_id,
        common::date(2025, 6, 28),
        common::date(2025, 6, 30),
    )
    .await;
    PinRotation::new(pool.clone())
        .assign_to_booking(booking_id)
        .await
        .expect("assign");

    EmailTemplateStore::new(pool.clone())
        .create(NewEmailTemplate {
            property_id,
            name: "Thanks".to_string(),
            template_type: TemplateType::PostStay,
            subject: "Thanks from {{ownerName}}".to_string(),
            html_body: "Code was {{lockPin}}".to_string(),
            text_body: None,
            days_before_check_in: None,
            days_after_check_out: Some(1),
            include_lock_pin: false,
            available_variables: None,
        })
        .await
        .expect("template");

    let composer = composer(&pool);
    let email = composer
        .compose(booking_id, TemplateType::PostStay)
        .await
        .expect("compose");
    assert_eq!(email.html_body, "Code was {{lockPin}}");
    // No owner contact: falls back to the owning user.
    assert_eq!(email.subject, "Thanks from Olive Owner");
    assert_eq!(email.text_body, None);

    let vars = composer
        .variables_for_booking(booking_id)
        .await
        .expect("variables");
    assert_eq!(vars.get("lockPin").map(String::as_str), Some("7777"));

    let err = composer
        .compose(booking_id, TemplateType::BookingConfirmation)
        .await
        .expect_err("no confirmation template");
    assert!(matches!(err, StayError::NoActiveTemplate { .. }));
}
