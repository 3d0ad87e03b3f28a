//! End-to-end checkout and recovery scenarios against in-memory fakes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use ordena_cart::{CartDraft, FormField, PaymentMethod};
use ordena_catalog::CatalogItem;
use ordena_checkout::{
    cancel_pair, CancelToken, CheckoutError, CheckoutOrchestrator, CheckoutOutcome,
    CheckoutSettings, InMemoryStoreDirectory, Locale, NotificationError, NotificationPayload,
    NotificationReceipt, NotificationStatus, OrderNotifier, PaymentError, PaymentErrorCode,
    PaymentGateway, PaymentSession, RecoveryOutcome, RecoveryStage, RedirectTarget,
    SessionRequest, StoreProfile, ValidationError,
};
use ordena_core::{ItemId, StoreId};
use ordena_storage::{
    FallbackStore, FragmentStore, PersistedDraft, PersistedItem, SessionStore,
};

#[derive(Clone, Copy)]
enum GatewayBehavior {
    Succeed,
    SucceedSlowly,
    Hang,
    Status(u16),
    EmptySessionId,
    RedirectError,
}

struct FakeGateway {
    behavior: GatewayBehavior,
    session_calls: AtomicUsize,
    redirects: Mutex<Vec<String>>,
}

impl FakeGateway {
    fn new(behavior: GatewayBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            session_calls: AtomicUsize::new(0),
            redirects: Mutex::new(Vec::new()),
        })
    }

    fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_session(
        &self,
        _request: &SessionRequest,
    ) -> Result<PaymentSession, PaymentError> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            GatewayBehavior::Succeed | GatewayBehavior::RedirectError => Ok(PaymentSession {
                id: "sess_1".into(),
            }),
            GatewayBehavior::SucceedSlowly => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(PaymentSession { id: "sess_1".into() })
            }
            GatewayBehavior::Hang => std::future::pending().await,
            GatewayBehavior::Status(status) => Err(PaymentError::status(status, "upstream error")),
            GatewayBehavior::EmptySessionId => Ok(PaymentSession { id: String::new() }),
        }
    }

    fn redirect_to_session(&self, session_id: &str) -> Result<RedirectTarget, PaymentError> {
        if matches!(self.behavior, GatewayBehavior::RedirectError) {
            return Err(PaymentError::new(
                PaymentErrorCode::RedirectFailed,
                "sdk reported an error",
            ));
        }
        if let Ok(mut redirects) = self.redirects.lock() {
            redirects.push(session_id.to_string());
        }
        Ok(RedirectTarget {
            url: format!("https://pay.example/s/{session_id}"),
        })
    }
}

struct FakeNotifier {
    fail: bool,
    calls: AtomicUsize,
    last_payload: Mutex<Option<NotificationPayload>>,
}

impl FakeNotifier {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            calls: AtomicUsize::new(0),
            last_payload: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderNotifier for FakeNotifier {
    async fn send_order_notification(
        &self,
        payload: &NotificationPayload,
    ) -> Result<NotificationReceipt, NotificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        if self.fail {
            return Err(NotificationError::Status(502));
        }
        Ok(NotificationReceipt {
            message_id: Some("msg_1".into()),
        })
    }
}

fn init_tracing() {
    ordena_observability::init_with_filter("debug");
}

fn memory_store() -> Arc<FallbackStore> {
    init_tracing();
    Arc::new(FallbackStore::with_substrates(
        vec![
            Box::new(SessionStore::new()),
            Box::new(FragmentStore::new("pending_order", 8 * 1024)),
        ],
        chrono::Duration::hours(24),
    ))
}

fn settings() -> CheckoutSettings {
    CheckoutSettings {
        session_timeout: Duration::from_secs(15),
        locale: Locale::En,
        currency: "MXN".into(),
        default_country_code: Some("52".into()),
    }
}

fn catalog() -> Vec<CatalogItem> {
    vec![CatalogItem {
        id: ItemId::new("p1"),
        name: "Pizza".into(),
        description: None,
        category: Some("Mains".into()),
        price: 10.0,
        available: true,
    }]
}

fn filled_cart(catalog: &[CatalogItem]) -> CartDraft {
    let mut cart = CartDraft::new();
    cart.add_item(&catalog[0]).unwrap();
    cart.add_item(&catalog[0]).unwrap();
    cart.set_form_field(FormField::CustomerName, "Ana");
    cart.set_form_field(FormField::CustomerPhone, "+5215512345678");
    cart.set_form_field(FormField::DeliveryAddress, "Calle 5 #10");
    cart
}

fn store_id() -> StoreId {
    StoreId::new("store-1")
}

fn directory_with_store() -> Arc<InMemoryStoreDirectory> {
    let directory = Arc::new(InMemoryStoreDirectory::new());
    directory.insert(StoreProfile {
        id: store_id(),
        name: "Taquería La Esquina".into(),
        notification_phone: Some("+5215598765432".into()),
        locale: Locale::Es,
    });
    directory
}

fn recovered_draft() -> PersistedDraft {
    PersistedDraft {
        order_id: "0192d3a0-0000-7000-8000-000000000001".into(),
        customer_name: "Ana".into(),
        customer_phone: "55 1234 5678".into(),
        store_id: "store-1".into(),
        items: vec![PersistedItem {
            id: "p1".into(),
            name: "Pizza".into(),
            quantity: 2,
            price: 10.0,
        }],
        total_amount: 20.0,
        payment_method: "hosted_payment".into(),
        timestamp: Utc::now().timestamp_millis(),
        session_id: Some("sess_1".into()),
        delivery_address: Some("Calle 5 #10".into()),
        special_instructions: None,
    }
}

#[tokio::test]
async fn empty_cart_submit_is_rejected_without_any_network_call() {
    let gateway = FakeGateway::new(GatewayBehavior::Succeed);
    let store = memory_store();
    let orchestrator = CheckoutOrchestrator::new(gateway.clone(), store.clone(), settings());

    let err = orchestrator
        .submit(&CartDraft::new(), &catalog(), &store_id(), CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Validation(ValidationError::EmptyCart { .. })
    ));
    assert_eq!(gateway.session_calls(), 0);
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn happy_path_persists_totals_session_id_and_redirects() {
    let gateway = FakeGateway::new(GatewayBehavior::Succeed);
    let store = memory_store();
    let orchestrator = CheckoutOrchestrator::new(gateway.clone(), store.clone(), settings());
    let catalog = catalog();
    let cart = filled_cart(&catalog);

    let outcome = orchestrator
        .submit(&cart, &catalog, &store_id(), CancelToken::never())
        .await
        .unwrap();

    let CheckoutOutcome::RedirectStarted {
        session_id,
        redirect,
        ..
    } = outcome
    else {
        panic!("expected RedirectStarted");
    };
    assert_eq!(session_id, "sess_1");
    assert_eq!(redirect.url, "https://pay.example/s/sess_1");
    assert_eq!(gateway.redirects.lock().unwrap().as_slice(), ["sess_1"]);

    let persisted = store.load().expect("draft persisted");
    assert_eq!(persisted.total_amount, 20.0);
    assert_eq!(persisted.session_id.as_deref(), Some("sess_1"));
    assert_eq!(persisted.items.len(), 1);
    assert_eq!(persisted.items[0].quantity, 2);
}

#[tokio::test(start_paused = true)]
async fn payment_timeout_surfaces_a_payment_error_and_clears_the_draft() {
    let gateway = FakeGateway::new(GatewayBehavior::Hang);
    let store = memory_store();
    let orchestrator = CheckoutOrchestrator::new(gateway, store.clone(), settings());
    let catalog = catalog();
    let cart = filled_cart(&catalog);

    let err = orchestrator
        .submit(&cart, &catalog, &store_id(), CancelToken::never())
        .await
        .unwrap_err();

    assert_eq!(
        err.user_message(Locale::En),
        "The payment request took too long. Please try again."
    );
    let CheckoutError::Payment(err) = err else {
        panic!("expected PaymentError");
    };
    assert_eq!(err.code, PaymentErrorCode::Timeout);
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn non_success_status_clears_the_draft() {
    let gateway = FakeGateway::new(GatewayBehavior::Status(500));
    let store = memory_store();
    let orchestrator = CheckoutOrchestrator::new(gateway, store.clone(), settings());
    let catalog = catalog();
    let cart = filled_cart(&catalog);

    let err = orchestrator
        .submit(&cart, &catalog, &store_id(), CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Payment(PaymentError {
            code: PaymentErrorCode::Status(500),
            ..
        })
    ));
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn missing_session_id_is_a_typed_payment_error() {
    let gateway = FakeGateway::new(GatewayBehavior::EmptySessionId);
    let store = memory_store();
    let orchestrator = CheckoutOrchestrator::new(gateway, store.clone(), settings());
    let catalog = catalog();
    let cart = filled_cart(&catalog);

    let err = orchestrator
        .submit(&cart, &catalog, &store_id(), CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Payment(PaymentError {
            code: PaymentErrorCode::MissingSessionId,
            ..
        })
    ));
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn redirect_failure_is_treated_like_a_request_failure() {
    let gateway = FakeGateway::new(GatewayBehavior::RedirectError);
    let store = memory_store();
    let orchestrator = CheckoutOrchestrator::new(gateway, store.clone(), settings());
    let catalog = catalog();
    let cart = filled_cart(&catalog);

    let err = orchestrator
        .submit(&cart, &catalog, &store_id(), CancelToken::never())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Payment(PaymentError {
            code: PaymentErrorCode::RedirectFailed,
            ..
        })
    ));
    assert_eq!(store.load(), None);
}

#[tokio::test(start_paused = true)]
async fn rapid_double_submit_creates_exactly_one_session() {
    let gateway = FakeGateway::new(GatewayBehavior::SucceedSlowly);
    let store = memory_store();
    let orchestrator =
        Arc::new(CheckoutOrchestrator::new(gateway.clone(), store, settings()));
    let catalog = catalog();
    let cart = filled_cart(&catalog);

    let id = store_id();
    let (first, second) = tokio::join!(
        orchestrator.submit(&cart, &catalog, &id, CancelToken::never()),
        orchestrator.submit(&cart, &catalog, &id, CancelToken::never()),
    );

    let outcomes = [first.unwrap(), second.unwrap()];
    assert_eq!(gateway.session_calls(), 1);
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, CheckoutOutcome::AlreadyInFlight))
            .count(),
        1
    );
    assert_eq!(
        outcomes
            .iter()
            .filter(|o| matches!(o, CheckoutOutcome::RedirectStarted { .. }))
            .count(),
        1
    );
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_the_session_request_and_clears_the_draft() {
    let gateway = FakeGateway::new(GatewayBehavior::Hang);
    let store = memory_store();
    let orchestrator = CheckoutOrchestrator::new(gateway, store.clone(), settings());
    let catalog = catalog();
    let cart = filled_cart(&catalog);

    let (handle, token) = cancel_pair();
    let id = store_id();
    let submit = orchestrator.submit(&cart, &catalog, &id, token);
    tokio::pin!(submit);

    // Let the submission reach the gateway call, then tear the view down.
    tokio::select! {
        biased;
        _ = &mut submit => panic!("submit should still be in flight"),
        _ = tokio::time::sleep(Duration::from_millis(10)) => handle.cancel(),
    }

    let err = submit.await.unwrap_err();
    assert!(matches!(err, CheckoutError::Cancelled));
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn offline_payment_skips_gateway_and_persistence() {
    let gateway = FakeGateway::new(GatewayBehavior::Succeed);
    let store = memory_store();
    let orchestrator = CheckoutOrchestrator::new(gateway.clone(), store.clone(), settings());
    let catalog = catalog();
    let mut cart = filled_cart(&catalog);
    cart.set_payment_method(PaymentMethod::Offline);

    let outcome = orchestrator
        .submit(&cart, &catalog, &store_id(), CancelToken::never())
        .await
        .unwrap();

    assert!(matches!(outcome, CheckoutOutcome::CompletedOffline { .. }));
    assert_eq!(gateway.session_calls(), 0);
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn recovery_notifies_once_with_normalized_phone_and_empties_storage() {
    let store = memory_store();
    store.save(&recovered_draft()).unwrap();
    let notifier = FakeNotifier::new(false);
    let recovery = RecoveryStage::new(
        store.clone(),
        notifier.clone(),
        directory_with_store(),
        settings(),
    );

    let outcome = recovery.recover().await;
    let RecoveryOutcome::Recovered { notification, .. } = outcome else {
        panic!("expected Recovered");
    };
    assert_eq!(notification, NotificationStatus::Sent);
    assert_eq!(recovery.notification_status(), NotificationStatus::Sent);
    assert_eq!(notifier.calls(), 1);

    let payload = notifier.last_payload.lock().unwrap().clone().unwrap();
    assert_eq!(payload.order.customer_phone, "+525512345678");
    assert_eq!(payload.store.name, "Taquería La Esquina");

    // Storage is empty afterward, so a remount finds nothing.
    assert_eq!(store.load(), None);
    assert_eq!(recovery.recover().await, RecoveryOutcome::DraftMissing);
    assert_eq!(notifier.calls(), 1);
}

#[tokio::test]
async fn recovery_does_not_refire_for_an_already_recovered_order() {
    let store = memory_store();
    store.save(&recovered_draft()).unwrap();
    let notifier = FakeNotifier::new(false);
    let recovery = RecoveryStage::new(
        store.clone(),
        notifier.clone(),
        directory_with_store(),
        settings(),
    );

    assert!(matches!(
        recovery.recover().await,
        RecoveryOutcome::Recovered { .. }
    ));

    // A substrate the clear missed resurfaces the same order.
    store.save(&recovered_draft()).unwrap();
    let outcome = recovery.recover().await;
    assert!(matches!(outcome, RecoveryOutcome::AlreadyRecovered { .. }));
    assert_eq!(notifier.calls(), 1);
    assert_eq!(store.load(), None);
}

#[tokio::test]
async fn notification_failure_does_not_invalidate_the_recovered_order() {
    let store = memory_store();
    store.save(&recovered_draft()).unwrap();
    let notifier = FakeNotifier::new(true);
    let recovery = RecoveryStage::new(
        store.clone(),
        notifier.clone(),
        directory_with_store(),
        settings(),
    );

    let outcome = recovery.recover().await;
    let RecoveryOutcome::Recovered { order, notification } = outcome else {
        panic!("expected Recovered");
    };
    assert_eq!(notification, NotificationStatus::Error);
    assert_eq!(order.total_amount, 20.0);
    // Cleared even though the notification failed.
    assert_eq!(store.load(), None);

    // Manual retry is available to the user.
    let retried = recovery.retry_notification(&order).await;
    assert_eq!(retried, NotificationStatus::Error);
    assert_eq!(notifier.calls(), 2);
}

#[tokio::test]
async fn stale_draft_recovers_as_missing() {
    let store = memory_store();
    let mut stale = recovered_draft();
    stale.timestamp = Utc::now().timestamp_millis() - chrono::Duration::hours(25).num_milliseconds();
    store.save(&stale).unwrap();

    let notifier = FakeNotifier::new(false);
    let recovery = RecoveryStage::new(
        store.clone(),
        notifier.clone(),
        directory_with_store(),
        settings(),
    );

    let outcome = recovery.recover().await;
    assert_eq!(outcome, RecoveryOutcome::DraftMissing);
    assert_eq!(
        outcome.user_message(Locale::En),
        Some("We could not find your order information. Please retry.")
    );
    assert_eq!(notifier.calls(), 0);
}
