//! Form state: the seven user-entered fields that feed a card.
//!
//! Fields are independent string cells. The only rule enforced here is
//! presence, and only when a card is generated.

use std::fmt;
use std::sync::Arc;

type OnChangeHandler = Arc<dyn Fn(Field, &str) + Send + Sync>;

/// Identifies one input of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    DateOfBirth,
    IdentifierSeed,
    City,
    Region,
    PostalCode,
    ContactNumber,
}

impl Field {
    /// Every field, in the order the form presents them.
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::IdentifierSeed,
        Field::DateOfBirth,
        Field::ContactNumber,
        Field::City,
        Field::Region,
        Field::PostalCode,
    ];

    /// Human label shown next to the input
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Full Name",
            Field::DateOfBirth => "Date of Birth",
            Field::IdentifierSeed => "Aadhar Number",
            Field::City => "City",
            Field::Region => "State",
            Field::PostalCode => "Pincode",
            Field::ContactNumber => "WhatsApp Number",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User-entered values.
///
/// Every `set` bumps [`FormFields::revision`] and notifies the observer
/// registered with [`FormFields::on_change`], which is how a front end knows
/// to redraw.
#[derive(Default, Clone)]
pub struct FormFields {
    name: String,
    date_of_birth: String,
    identifier_seed: String,
    city: String,
    region: String,
    postal_code: String,
    contact_number: String,
    revision: u64,
    on_change: Option<OnChangeHandler>,
}

impl fmt::Debug for FormFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFields")
            .field("name", &self.name)
            .field("date_of_birth", &self.date_of_birth)
            .field("identifier_seed", &self.identifier_seed)
            .field("city", &self.city)
            .field("region", &self.region)
            .field("postal_code", &self.postal_code)
            .field("contact_number", &self.contact_number)
            .field("revision", &self.revision)
            .finish()
    }
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::DateOfBirth => &self.date_of_birth,
            Field::IdentifierSeed => &self.identifier_seed,
            Field::City => &self.city,
            Field::Region => &self.region,
            Field::PostalCode => &self.postal_code,
            Field::ContactNumber => &self.contact_number,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        let slot = match field {
            Field::Name => &mut self.name,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::IdentifierSeed => &mut self.identifier_seed,
            Field::City => &mut self.city,
            Field::Region => &mut self.region,
            Field::PostalCode => &mut self.postal_code,
            Field::ContactNumber => &mut self.contact_number,
        };
        *slot = value;
        self.revision += 1;
        if let Some(cb) = &self.on_change {
            cb(field, self.get(field));
        }
    }

    /// Builder-style setter used by the CLI and tests
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Number of edits applied so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Register a callback invoked after every edit.
    pub fn on_change<F>(&mut self, cb: F)
    where
        F: Fn(Field, &str) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(cb));
    }

    /// Remove previously registered on_change callback if any
    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    /// Fields that are still empty, in form order.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn complete() -> FormFields {
        FormFields::new()
            .with(Field::Name, "Asha Rao")
            .with(Field::DateOfBirth, "1994-03-07")
            .with(Field::IdentifierSeed, "123456789012")
            .with(Field::City, "Mysuru")
            .with(Field::Region, "Karnataka")
            .with(Field::PostalCode, "570001")
            .with(Field::ContactNumber, "9876543210")
    }

    #[test]
    fn empty_form_reports_every_field() {
        let form = FormFields::new();
        assert_eq!(form.missing().len(), 7);
        assert!(!form.is_complete());
    }

    #[test]
    fn set_then_get_round_trips_per_field() {
        let form = complete();
        assert_eq!(form.get(Field::City), "Mysuru");
        assert_eq!(form.get(Field::Region), "Karnataka");
        assert!(form.is_complete());
        assert_eq!(form.revision(), 7);
    }

    #[test]
    fn clearing_a_field_makes_it_missing() {
        let mut form = complete();
        form.set(Field::PostalCode, "");
        assert_eq!(form.missing(), vec![Field::PostalCode]);
    }

    #[test]
    fn whitespace_counts_as_present() {
        let mut form = complete();
        form.set(Field::City, " ");
        assert!(form.is_complete());
    }

    #[test]
    fn on_change_fires_for_every_edit() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut form = FormFields::new();
        form.on_change(move |field, value| {
            sink.lock().unwrap().push((field, value.to_string()));
        });
        form.set(Field::Name, "A");
        form.set(Field::Name, "Ab");
        form.clear_on_change();
        form.set(Field::City, "X");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], (Field::Name, "Ab".to_string()));
        assert_eq!(form.revision(), 3);
    }
}
