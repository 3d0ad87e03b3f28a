use serde::{Deserialize, Serialize};

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Redirect to the hosted payment page.
    #[default]
    HostedPayment,
    /// Manual/offline settlement (cash on delivery, transfer).
    Offline,
}

impl PaymentMethod {
    /// Stable wire string, as persisted in the draft format.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::HostedPayment => "hosted_payment",
            PaymentMethod::Offline => "offline",
        }
    }
}

/// A single editable field of the order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    CustomerName,
    CustomerPhone,
    CustomerEmail,
    DeliveryAddress,
    SpecialInstructions,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::CustomerName => "customer_name",
            FormField::CustomerPhone => "customer_phone",
            FormField::CustomerEmail => "customer_email",
            FormField::DeliveryAddress => "delivery_address",
            FormField::SpecialInstructions => "special_instructions",
        }
    }
}

impl core::fmt::Display for FormField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer-entered order form.
///
/// Fields hold raw user input; trimming and shape checks happen in the
/// validation stage, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderForm {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub delivery_address: String,
    pub special_instructions: String,
    pub payment_method: PaymentMethod,
}

impl OrderForm {
    /// Merge a single field into the form record.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::CustomerName => self.customer_name = value,
            FormField::CustomerPhone => self.customer_phone = value,
            FormField::CustomerEmail => self.customer_email = value,
            FormField::DeliveryAddress => self.delivery_address = value,
            FormField::SpecialInstructions => self.special_instructions = value,
        }
    }

    /// Email is optional; blank input counts as "not provided".
    pub fn email(&self) -> Option<&str> {
        let trimmed = self.customer_email.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Special instructions are optional; blank input counts as "not provided".
    pub fn special_instructions(&self) -> Option<&str> {
        let trimmed = self.special_instructions.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_field_merges_a_single_field() {
        let mut form = OrderForm::default();
        form.set_field(FormField::CustomerName, "Ana");
        form.set_field(FormField::DeliveryAddress, "Calle 5 #10");
        assert_eq!(form.customer_name, "Ana");
        assert_eq!(form.delivery_address, "Calle 5 #10");
        assert_eq!(form.customer_phone, "");
    }

    #[test]
    fn blank_email_is_not_provided() {
        let mut form = OrderForm::default();
        assert_eq!(form.email(), None);
        form.set_field(FormField::CustomerEmail, "   ");
        assert_eq!(form.email(), None);
        form.set_field(FormField::CustomerEmail, "ana@example.com");
        assert_eq!(form.email(), Some("ana@example.com"));
    }

    #[test]
    fn payment_method_wire_strings_are_stable() {
        assert_eq!(PaymentMethod::HostedPayment.as_str(), "hosted_payment");
        assert_eq!(PaymentMethod::Offline.as_str(), "offline");
    }
}
