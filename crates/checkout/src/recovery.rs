//! Post-redirect recovery.
//!
//! On return from the hosted payment page the draft is reconstructed from
//! whichever storage substrate survived, the notification side effect
//! fires exactly once, and every persisted copy is destroyed.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use ordena_storage::{FallbackStore, PersistedDraft};

use crate::directory::{StoreDirectory, StoreProfile};
use crate::notify::{NotificationPayload, NotificationStatus, OrderNotifier};
use crate::phone::normalize_phone;
use crate::settings::CheckoutSettings;

/// Result of a recovery pass.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryOutcome {
    /// No valid draft in any substrate: the user navigated here directly
    /// or the draft expired. A retry path, not a fault.
    DraftMissing,
    /// Draft reconstructed; the notification ran to the given status.
    Recovered {
        order: PersistedDraft,
        notification: NotificationStatus,
    },
    /// This order already went through recovery on this page; the
    /// notification was not re-fired.
    AlreadyRecovered { order_id: String },
}

impl RecoveryOutcome {
    /// The terminal-state message for a missing draft; other outcomes
    /// render from their own data.
    pub fn user_message(&self, locale: crate::locale::Locale) -> Option<&'static str> {
        match self {
            RecoveryOutcome::DraftMissing => Some(locale.order_unavailable()),
            _ => None,
        }
    }
}

/// One-shot recovery runner.
pub struct RecoveryStage<N, D> {
    store: Arc<FallbackStore>,
    notifier: Arc<N>,
    directory: Arc<D>,
    settings: CheckoutSettings,
    status: Mutex<NotificationStatus>,
    notified_orders: Mutex<HashSet<String>>,
}

impl<N: OrderNotifier, D: StoreDirectory> RecoveryStage<N, D> {
    pub fn new(
        store: Arc<FallbackStore>,
        notifier: Arc<N>,
        directory: Arc<D>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            directory,
            settings,
            status: Mutex::new(NotificationStatus::Idle),
            notified_orders: Mutex::new(HashSet::new()),
        }
    }

    pub fn notification_status(&self) -> NotificationStatus {
        self.status
            .lock()
            .map(|status| *status)
            .unwrap_or(NotificationStatus::Idle)
    }

    fn set_status(&self, next: NotificationStatus) {
        if let Ok(mut status) = self.status.lock() {
            *status = next;
        }
    }

    /// Whether this order id already fired its notification. Inserting
    /// before the send guards a remount racing the in-flight dispatch.
    fn mark_notified(&self, order_id: &str) -> bool {
        match self.notified_orders.lock() {
            Ok(mut seen) => seen.insert(order_id.to_string()),
            Err(_) => false,
        }
    }

    /// Reconstruct the draft and run the one-time side effect.
    ///
    /// Storage is cleared regardless of the notification outcome; a second
    /// load on the same page after a remount finds nothing and, thanks to
    /// the idempotency set, would not re-fire the notification either.
    #[tracing::instrument(skip_all)]
    pub async fn recover(&self) -> RecoveryOutcome {
        let Some(order) = self.store.load() else {
            tracing::info!("no recoverable draft found");
            return RecoveryOutcome::DraftMissing;
        };

        if !self.mark_notified(&order.order_id) {
            tracing::debug!(order_id = %order.order_id, "order already recovered; skipping notification");
            self.store.clear();
            return RecoveryOutcome::AlreadyRecovered {
                order_id: order.order_id,
            };
        }

        let notification = self.dispatch_notification(&order).await;
        self.store.clear();

        RecoveryOutcome::Recovered {
            order,
            notification,
        }
    }

    /// Manual retry affordance for a failed notification.
    ///
    /// The payment is already complete; retrying only re-runs the
    /// messaging side effect.
    pub async fn retry_notification(&self, order: &PersistedDraft) -> NotificationStatus {
        self.dispatch_notification(order).await
    }

    async fn dispatch_notification(&self, order: &PersistedDraft) -> NotificationStatus {
        self.set_status(NotificationStatus::Sending);

        let store_profile = match self
            .directory
            .resolve(&ordena_core::StoreId::new(order.store_id.clone()))
            .await
        {
            Ok(profile) => profile,
            Err(err) => {
                tracing::error!(
                    order_id = %order.order_id,
                    error = %err,
                    "store lookup failed; notification not sent"
                );
                self.set_status(NotificationStatus::Error);
                return NotificationStatus::Error;
            }
        };

        let payload = self.build_payload(order, store_profile);
        match self.notifier.send_order_notification(&payload).await {
            Ok(receipt) => {
                tracing::info!(
                    order_id = %order.order_id,
                    message_id = receipt.message_id.as_deref(),
                    "order notification sent"
                );
                self.set_status(NotificationStatus::Sent);
                NotificationStatus::Sent
            }
            Err(err) => {
                // The order is placed either way; this is reported apart
                // from the payment outcome.
                tracing::error!(order_id = %order.order_id, error = %err, "order notification failed");
                self.set_status(NotificationStatus::Error);
                NotificationStatus::Error
            }
        }
    }

    fn build_payload(&self, order: &PersistedDraft, store: StoreProfile) -> NotificationPayload {
        let mut order = order.clone();
        order.customer_phone = normalize_phone(
            &order.customer_phone,
            self.settings.default_country_code.as_deref(),
        );
        NotificationPayload { order, store }
    }
}
