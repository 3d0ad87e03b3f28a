//! Localized user-facing copy.
//!
//! Which locale applies is a per-store business decision resolved outside
//! this crate; callers pass the flag in through `CheckoutSettings`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    pub fn empty_cart(&self) -> &'static str {
        match self {
            Locale::Es => "Tu carrito está vacío",
            Locale::En => "Your cart is empty",
        }
    }

    pub fn unavailable_items(&self) -> &'static str {
        match self {
            Locale::Es => "Algunos productos ya no están disponibles",
            Locale::En => "Some items are no longer available",
        }
    }

    pub fn name_required(&self) -> &'static str {
        match self {
            Locale::Es => "Ingresa tu nombre",
            Locale::En => "Enter your name",
        }
    }

    pub fn phone_invalid(&self) -> &'static str {
        match self {
            Locale::Es => "Ingresa un teléfono válido",
            Locale::En => "Enter a valid phone number",
        }
    }

    pub fn address_required(&self) -> &'static str {
        match self {
            Locale::Es => "Ingresa tu dirección de entrega",
            Locale::En => "Enter your delivery address",
        }
    }

    pub fn email_invalid(&self) -> &'static str {
        match self {
            Locale::Es => "Ingresa un correo válido",
            Locale::En => "Enter a valid email address",
        }
    }

    pub fn payment_failed(&self) -> &'static str {
        match self {
            Locale::Es => "No pudimos iniciar el pago. Intenta de nuevo.",
            Locale::En => "We could not start the payment. Please try again.",
        }
    }

    pub fn payment_timed_out(&self) -> &'static str {
        match self {
            Locale::Es => "El pago tardó demasiado en responder. Intenta de nuevo.",
            Locale::En => "The payment request took too long. Please try again.",
        }
    }

    pub fn order_save_failed(&self) -> &'static str {
        match self {
            Locale::Es => "No pudimos guardar tu pedido. Intenta de nuevo.",
            Locale::En => "We could not save your order. Please try again.",
        }
    }

    pub fn order_unavailable(&self) -> &'static str {
        match self {
            Locale::Es => "No encontramos la información de tu pedido. Vuelve a intentarlo.",
            Locale::En => "We could not find your order information. Please retry.",
        }
    }
}
