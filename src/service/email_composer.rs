use crate::db::models::{Booking, ContactType, Property, PropertySettings, TemplateType};
use crate::db::{BookingStore, EmailTemplateStore, PropertyStore};
use crate::error::StayError;
use crate::service::template_render::{self, Escape};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// A template rendered for one booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedEmail {
    pub template_id: i64,
    pub booking_id: i64,
    pub template_type: TemplateType,
    pub to: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
}

/// Fills a property's active email templates with booking data.
#[derive(Clone)]
pub struct EmailComposer {
    bookings: BookingStore,
    properties: PropertyStore,
    templates: EmailTemplateStore,
}

impl EmailComposer {
    pub fn new(
        bookings: BookingStore,
        properties: PropertyStore,
        templates: EmailTemplateStore,
    ) -> Self {
        Self {
            bookings,
            properties,
            templates,
        }
    }

    /// Every variable the booking can supply; empty values are omitted so
    /// their placeholders stay visible.
    pub async fn variables_for_booking(
        &self,
        booking_id: i64,
    ) -> Result<HashMap<String, String>, StayError> {
        let booking = self.bookings.get(booking_id).await?;
        self.variables_for(&booking).await
    }

    /// Render the newest active template of `template_type` for the booking's property.
    pub async fn compose(
        &self,
        booking_id: i64,
        template_type: TemplateType,
    ) -> Result<RenderedEmail, StayError> {
        let booking = self.bookings.get(booking_id).await?;
        let template = self
            .templates
            .find_active(booking.property_id, template_type)
            .await?
            .ok_or_else(|| StayError::NoActiveTemplate {
                property_id: booking.property_id,
                template_type: template_type.to_string(),
            })?;

        let mut values = self.variables_for(&booking).await?;
        if !template.include_lock_pin {
            values.remove("lockPin");
        }

        let declared = &template.available_variables;
        let unresolved: Vec<&str> = template_render::placeholders(&template.html_body)
            .into_iter()
            .filter(|name| !values.contains_key(*name) || !declared.contains(name))
            .collect();
        if !unresolved.is_empty() {
            debug!(booking_id, template_id = template.id, ?unresolved, "placeholders left as-is");
        }

        let rendered = RenderedEmail {
            template_id: template.id,
            booking_id,
            template_type,
            to: booking.guest_email.clone(),
            subject: template_render::render(&template.subject, &values, declared, Escape::None),
            html_body: template_render::render(
                &template.html_body,
                &values,
                declared,
                Escape::Html,
            ),
            text_body: template
                .text_body
                .as_deref()
                .map(|body| template_render::render(body, &values, declared, Escape::None)),
        };

        debug!(
            booking_id,
            template_id = template.id,
            template_type = %template_type,
            "composed guest email"
        );
        Ok(rendered)
    }

    async fn variables_for(&self, booking: &Booking) -> Result<HashMap<String, String>, StayError> {
        let property = self.properties.get_property(booking.property_id).await?;
        let settings = self.properties.get_settings(property.id).await?;
        let owner = self.owner_details(&property).await?;
        Ok(collect_variables(booking, &property, settings.as_ref(), owner))
    }

    /// Primary owner contact, else the owning user.
    async fn owner_details(&self, property: &Property) -> Result<OwnerDetails, StayError> {
        if let Some(contact) = self
            .properties
            .primary_contact(property.id, ContactType::Owner)
            .await?
        {
            return Ok(OwnerDetails {
                name: Some(contact.name),
                email: contact.email,
                phone: contact.phone,
            });
        }
        match property.owner_id {
            Some(user_id) => {
                let user = self.properties.get_user(user_id).await?;
                Ok(OwnerDetails {
                    name: Some(user.name),
                    email: Some(user.email),
                    phone: None,
                })
            }
            None => Ok(OwnerDetails::default()),
        }
    }
}

#[derive(Debug, Default)]
struct OwnerDetails {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

fn collect_variables(
    booking: &Booking,
    property: &Property,
    settings: Option<&PropertySettings>,
    owner: OwnerDetails,
) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let mut put = |name: &str, value: Option<String>| {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            values.insert(name.to_string(), v);
        }
    };

    put("guestName", Some(booking.guest_name.clone()));
    put("guestEmail", booking.guest_email.clone());
    put("guestPhone", booking.guest_phone.clone());

    put("checkInDate", Some(booking.check_in_date.to_string()));
    put("checkOutDate", Some(booking.check_out_date.to_string()));
    put("numberOfGuests", Some(booking.guest_count.to_string()));
    put("numberOfNights", Some(booking.nights().to_string()));
    put("totalAmount", booking.total_amount.map(|a| format!("{a:.2}")));

    put("propertyName", Some(property.name.clone()));
    put("propertyAddress", property.address.clone());
    if let Some(s) = settings {
        put("wifiName", s.wifi_name.clone());
        put("wifiPassword", s.wifi_password.clone());
        put("houseRules", s.house_rules.clone());
        put("checkInInstructions", s.check_in_instructions.clone());
        put("checkOutInstructions", s.check_out_instructions.clone());
    }

    put("lockPin", booking.assigned_lock_pin.clone());

    put("ownerName", owner.name);
    put("ownerEmail", owner.email);
    put("ownerPhone", owner.phone);

    values
}
