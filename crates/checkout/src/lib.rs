//! Checkout: validation, orchestration, and post-redirect recovery.
//!
//! The checkout orchestrator sequences the network-dependent steps of
//! placing an order: validate, persist the draft, create the external
//! payment session, hand off the redirect. The recovery stage reconstructs
//! the draft after the redirect and fires the notification side effect
//! exactly once.
//!
//! External collaborators (payment processor, messaging API, store
//! directory) sit behind dependency-injected async traits; HTTP-backed
//! implementations are provided, tests use in-memory fakes.

pub mod directory;
pub mod error;
pub mod gateway;
pub mod locale;
pub mod notify;
pub mod orchestrator;
pub mod phone;
pub mod recovery;
pub mod settings;
pub mod validate;

pub use directory::{DirectoryError, InMemoryStoreDirectory, StoreDirectory, StoreProfile};
pub use error::{CheckoutError, PaymentError, PaymentErrorCode};
pub use gateway::{
    CustomerInfo, HttpPaymentGateway, PaymentGateway, PaymentSession, RedirectTarget,
    SessionRequest,
};
pub use locale::Locale;
pub use notify::{
    HttpOrderNotifier, NotificationError, NotificationPayload, NotificationReceipt,
    NotificationStatus, OrderNotifier,
};
pub use orchestrator::{cancel_pair, CancelHandle, CancelToken, CheckoutOrchestrator, CheckoutOutcome, CheckoutPhase};
pub use recovery::{RecoveryOutcome, RecoveryStage};
pub use settings::CheckoutSettings;
pub use validate::{validate, FieldErrors, ValidationError};
