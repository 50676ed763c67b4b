use serde::{Deserialize, Serialize};

/// Placeholder names a template may use, grouped by where the value comes from.
///
/// The default matches the column default of `email_templates.available_variables`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailableVariables {
    #[serde(default)]
    pub guest: Vec<String>,
    #[serde(default)]
    pub booking: Vec<String>,
    #[serde(default)]
    pub property: Vec<String>,
    #[serde(default)]
    pub pin: Vec<String>,
    #[serde(default)]
    pub owner: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for AvailableVariables {
    fn default() -> Self {
        Self {
            guest: names(&["guestName", "guestEmail", "guestPhone"]),
            booking: names(&[
                "checkInDate",
                "checkOutDate",
                "numberOfGuests",
                "numberOfNights",
                "totalAmount",
            ]),
            property: names(&[
                "propertyName",
                "propertyAddress",
                "wifiName",
                "wifiPassword",
                "houseRules",
                "checkInInstructions",
                "checkOutInstructions",
            ]),
            pin: names(&["lockPin"]),
            owner: names(&["ownerName", "ownerEmail", "ownerPhone"]),
        }
    }
}

impl AvailableVariables {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.guest
            .iter()
            .chain(&self.booking)
            .chain(&self.property)
            .chain(&self.pin)
            .chain(&self.owner)
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|v| v == name)
    }
}
