//! Checkout orchestration.
//!
//! Sequences validation, draft persistence, external payment-session
//! creation, and the redirect hand-off, with bounded latency and safe
//! failure handling. The draft is persisted *before* any network call so
//! an in-flight order survives a hung or failed request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::timeout;

use ordena_cart::{CartDraft, PaymentMethod};
use ordena_catalog::CatalogItem;
use ordena_core::{OrderId, StoreId};
use ordena_storage::{FallbackStore, PersistedDraft, PersistedItem};

use crate::error::{CheckoutError, PaymentError, PaymentErrorCode};
use crate::gateway::{CustomerInfo, PaymentGateway, RedirectTarget, SessionRequest};
use crate::settings::CheckoutSettings;
use crate::validate::validate;

/// Abort handle owned by whatever lifecycle wrapper hosts the checkout
/// view; cancelling tears down the in-flight network step.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: Some(self.tx.subscribe()),
        }
    }
}

/// Cancellation token passed into `submit`.
#[derive(Clone, Default)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token that never fires, for hosts without teardown semantics.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once cancelled; pends forever on a `never` token or once
    /// the handle is gone (an abandoned handle cannot cancel anymore).
    pub async fn cancelled(&mut self) {
        let Some(rx) = &mut self.rx else {
            return std::future::pending().await;
        };
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

/// Create a linked cancel handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx: Some(rx) })
}

/// Observable submission phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Validating,
    Persisting,
    AwaitingSession,
    Redirecting,
}

/// What a successful `submit` resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// A submission was already in flight; this one was dropped.
    AlreadyInFlight,
    /// Offline/manual payment: confirmed locally, nothing persisted.
    /// The caller resets the cart; only the draft manager mutates it.
    CompletedOffline { order_id: OrderId },
    /// Hosted payment: draft persisted, session created, hand-off ready.
    RedirectStarted {
        order_id: OrderId,
        session_id: String,
        redirect: RedirectTarget,
    },
}

/// Sequences the network-dependent steps of checkout.
pub struct CheckoutOrchestrator<G> {
    gateway: Arc<G>,
    store: Arc<FallbackStore>,
    settings: CheckoutSettings,
    in_flight: AtomicBool,
    phase: Mutex<CheckoutPhase>,
}

/// Releases the re-entrancy flag and parks the phase on every exit path.
struct InFlightGuard<'a> {
    in_flight: &'a AtomicBool,
    phase: &'a Mutex<CheckoutPhase>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut phase) = self.phase.lock() {
            *phase = CheckoutPhase::Idle;
        }
        self.in_flight.store(false, Ordering::Release);
    }
}

impl<G: PaymentGateway> CheckoutOrchestrator<G> {
    pub fn new(gateway: Arc<G>, store: Arc<FallbackStore>, settings: CheckoutSettings) -> Self {
        Self {
            gateway,
            store,
            settings,
            in_flight: AtomicBool::new(false),
            phase: Mutex::new(CheckoutPhase::Idle),
        }
    }

    pub fn settings(&self) -> &CheckoutSettings {
        &self.settings
    }

    pub fn phase(&self) -> CheckoutPhase {
        self.phase
            .lock()
            .map(|phase| *phase)
            .unwrap_or(CheckoutPhase::Idle)
    }

    fn set_phase(&self, next: CheckoutPhase) {
        if let Ok(mut phase) = self.phase.lock() {
            *phase = next;
        }
    }

    /// Submit the current cart.
    ///
    /// Re-entrant calls while a submission is in flight are coalesced into
    /// `CheckoutOutcome::AlreadyInFlight` with no side effects. The flag is
    /// checked-and-set atomically before any asynchronous work begins, so
    /// rapid repeated calls cannot race past it.
    #[tracing::instrument(skip_all, fields(store_id = %store_id))]
    pub async fn submit(
        &self,
        cart: &CartDraft,
        catalog: &[CatalogItem],
        store_id: &StoreId,
        mut cancel: CancelToken,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("submission already in flight; dropping duplicate");
            return Ok(CheckoutOutcome::AlreadyInFlight);
        }
        let _guard = InFlightGuard {
            in_flight: &self.in_flight,
            phase: &self.phase,
        };

        let result = self.run(cart, catalog, store_id, &mut cancel).await;
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    /// Boundary conversion: one structured diagnostic record per failure.
    /// Callers surface `CheckoutError::user_message` and nothing else.
    fn report(&self, err: &CheckoutError) {
        match err {
            CheckoutError::Validation(err) => tracing::warn!(
                kind = "validation",
                field = err.first_field().map(|f| f.as_str()),
                message = err.first_message(),
                "checkout blocked"
            ),
            CheckoutError::Payment(err) => tracing::error!(
                kind = "payment",
                code = %err.code,
                message = %err.message,
                "checkout failed"
            ),
            CheckoutError::Storage(err) => {
                tracing::error!(kind = "storage", error = %err, "checkout failed")
            }
            CheckoutError::Cancelled => tracing::debug!(kind = "cancelled", "checkout cancelled"),
        }
    }

    async fn run(
        &self,
        cart: &CartDraft,
        catalog: &[CatalogItem],
        store_id: &StoreId,
        cancel: &mut CancelToken,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        self.set_phase(CheckoutPhase::Validating);
        validate(cart, catalog, self.settings.locale)?;

        let order_id = OrderId::new();

        // Manual/offline settlement has no redirect to survive, so nothing
        // is persisted for recovery.
        if cart.form().payment_method == PaymentMethod::Offline {
            tracing::info!(%order_id, "offline order confirmed");
            return Ok(CheckoutOutcome::CompletedOffline { order_id });
        }

        self.set_phase(CheckoutPhase::Persisting);
        let mut draft = build_draft(order_id, cart, store_id);
        self.store.save(&draft)?;

        self.set_phase(CheckoutPhase::AwaitingSession);
        let request = SessionRequest {
            items: draft.items.clone(),
            customer: CustomerInfo {
                name: draft.customer_name.clone(),
                phone: draft.customer_phone.clone(),
                email: cart.form().email().map(str::to_string),
            },
            store_id: store_id.clone(),
            currency: self.settings.currency.clone(),
            locale: self.settings.locale,
        };

        let session = tokio::select! {
            _ = cancel.cancelled() => {
                self.store.clear();
                return Err(CheckoutError::Cancelled);
            }
            settled = timeout(self.settings.session_timeout, self.gateway.create_session(&request)) => {
                match settled {
                    Err(_) => {
                        self.store.clear();
                        return Err(PaymentError::timeout(format!(
                            "no payment session after {:?}",
                            self.settings.session_timeout
                        ))
                        .into());
                    }
                    Ok(Err(err)) => {
                        self.store.clear();
                        return Err(err.into());
                    }
                    Ok(Ok(session)) => session,
                }
            }
        };

        // A late success for a view that already tore down is not applied.
        if cancel.is_cancelled() {
            self.store.clear();
            return Err(CheckoutError::Cancelled);
        }

        if session.id.is_empty() {
            self.store.clear();
            return Err(PaymentError::new(
                PaymentErrorCode::MissingSessionId,
                "session response carried no id",
            )
            .into());
        }

        // Second save: same record, now with the session id. The first
        // copy is still recoverable if this one misses.
        draft.session_id = Some(session.id.clone());
        if let Err(err) = self.store.save(&draft) {
            tracing::warn!(%order_id, error = %err, "session id save failed");
        }

        self.set_phase(CheckoutPhase::Redirecting);
        let redirect = match self.gateway.redirect_to_session(&session.id) {
            Ok(target) => target,
            Err(err) => {
                self.store.clear();
                return Err(err.into());
            }
        };

        tracing::info!(%order_id, session_id = %session.id, "redirecting to hosted payment");
        Ok(CheckoutOutcome::RedirectStarted {
            order_id,
            session_id: session.id,
            redirect,
        })
    }
}

/// Freeze the cart into the persisted wire shape.
///
/// `total_amount` is computed from the frozen items so the amount sent to
/// the processor always equals the sum of the persisted lines.
fn build_draft(order_id: OrderId, cart: &CartDraft, store_id: &StoreId) -> PersistedDraft {
    let items: Vec<PersistedItem> = cart
        .lines()
        .iter()
        .map(|line| PersistedItem {
            id: line.item_id.to_string(),
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.unit_price,
        })
        .collect();
    let total_amount = items
        .iter()
        .map(|item| item.price * f64::from(item.quantity))
        .sum();

    let form = cart.form();
    PersistedDraft {
        order_id: order_id.to_string(),
        customer_name: form.customer_name.trim().to_string(),
        customer_phone: form.customer_phone.trim().to_string(),
        store_id: store_id.to_string(),
        items,
        total_amount,
        payment_method: form.payment_method.as_str().to_string(),
        timestamp: Utc::now().timestamp_millis(),
        session_id: None,
        delivery_address: Some(form.delivery_address.trim().to_string()),
        special_instructions: form.special_instructions().map(str::to_string),
    }
}
