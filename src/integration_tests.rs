//! End-to-end scenarios against a fully wired [`OrderSystem`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use crate::access::{AccessError, Caller, DenyReason};
use crate::app_system::{AppConfig, OrderSystem};
use crate::domain::{
    CartLine, Order, OrderFilter, OrderStatus, PaymentMode, PlaceOrderRequest, Product, ProductCreate, Promotion,
    Role, StatusUpdateRequest, UserCreate, ORDER_CREATED, ORDER_STATUS_CHANGED,
};
use crate::mailer::MailJob;
use crate::mock_framework::{FailingMailer, RecordingMailer};
use crate::order_actor::{OrderError, OrderNumberGenerator};

struct Shop {
    system: OrderSystem,
    mailer: Arc<RecordingMailer>,
    admin: Caller,
    baker: Caller,
    client: Caller,
    neighbour: Caller,
}

async fn shop_with(numbers: OrderNumberGenerator) -> Shop {
    let mailer = Arc::new(RecordingMailer::default());
    let system = OrderSystem::build(&AppConfig::default(), mailer.clone(), numbers).unwrap();

    let users = &system.user_client;
    let admin = users.create_user(UserCreate::new("Marie", "Durand", "admin@shop.test", Role::Admin)).await.unwrap();
    let baker = users.create_user(UserCreate::new("Luc", "Martin", "luc@shop.test", Role::Employee)).await.unwrap();
    let client = users.create_user(UserCreate::new("Ana", "Lopez", "ana@example.com", Role::Client)).await.unwrap();
    let neighbour = users.create_user(UserCreate::new("Tom", "Petit", "tom@example.com", Role::Client)).await.unwrap();

    Shop {
        system,
        mailer,
        admin: Caller::admin(admin.id),
        baker: Caller::employee(baker.id),
        client: Caller::client(client.id),
        neighbour: Caller::client(neighbour.id),
    }
}

async fn shop() -> Shop {
    shop_with(OrderNumberGenerator::new("CMD-")).await
}

impl Shop {
    async fn product(&self, name: &str, price: i64, stock: u32) -> Product {
        self.system
            .product_client
            .create_product(Some(&self.admin), ProductCreate::new(name, Decimal::from(price), stock))
            .await
            .unwrap()
    }

    async fn stock(&self, product: &Product) -> u32 {
        self.system.product_client.stock_level(product.id).await.unwrap()
    }

    async fn place(&self, caller: &Caller, lines: &[(&Product, u32)]) -> Result<Order, OrderError> {
        self.system.order_client.place_order(Some(caller), cart(lines)).await
    }

    async fn advance(&self, order: &Order, to: OrderStatus) -> Result<OrderStatus, OrderError> {
        self.system
            .order_client
            .update_status(Some(&self.baker), order.id, StatusUpdateRequest::to(to))
            .await
            .map(|outcome| outcome.new_status)
    }
}

fn cart(lines: &[(&Product, u32)]) -> PlaceOrderRequest {
    PlaceOrderRequest {
        articles: lines
            .iter()
            .map(|(product, quantite)| CartLine { product_id: product.id, quantite: *quantite })
            .collect(),
        mode_paiement: PaymentMode::Online,
        adresse_livraison: "12 rue du Four".to_string(),
        telephone_livraison: "0600000000".to_string(),
        notes: None,
    }
}

#[tokio::test]
async fn order_within_stock_decrements_and_totals() {
    let shop = shop().await;
    let cake = shop.product("Fraisier", 500, 5).await;

    let order = shop.place(&shop.client, &[(&cake, 2)]).await.unwrap();

    assert_eq!(order.total, Decimal::from(1000));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].line_total, Decimal::from(1000));
    assert_eq!(order.lines[0].product_name, "Fraisier");
    assert!(order.number.starts_with(&format!("CMD-{}-", Utc::now().format("%Y%m%d"))));
    assert_eq!(shop.stock(&cake).await, 3);

    let notifications = shop
        .system
        .notification_client
        .list_for(Some(&shop.client), shop.client.user_id, false)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, ORDER_CREATED);

    let mails = shop.mailer.wait_for(1).await;
    assert!(matches!(&mails[0], MailJob::Invoice(invoice) if invoice.order.id == order.id && invoice.recipient_email == "ana@example.com"));
}

#[tokio::test]
async fn multi_line_total_is_sum_of_lines() {
    let shop = shop().await;
    let bread = shop.product("Pain de campagne", 3, 10).await;
    let tart = shop.product("Tarte citron", 18, 4).await;

    let order = shop.place(&shop.client, &[(&bread, 3), (&tart, 1)]).await.unwrap();
    assert_eq!(order.total, Decimal::from(27));
    assert_eq!(order.lines_total(), Some(order.total));
    assert_eq!(shop.stock(&bread).await, 7);
    assert_eq!(shop.stock(&tart).await, 3);
}

#[tokio::test]
async fn any_line_over_stock_changes_nothing() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let eclair = shop.product("Eclair", 3, 1).await;

    let err = shop.place(&shop.client, &[(&bread, 2), (&eclair, 2)]).await.unwrap_err();
    assert_eq!(err, OrderError::OutOfStock { product: "Eclair".into(), requested: 2, available: 1 });

    assert_eq!(shop.stock(&bread).await, 5);
    assert_eq!(shop.stock(&eclair).await, 1);
    assert!(shop.system.order_client.my_orders(Some(&shop.client)).await.unwrap().is_empty());
}

#[tokio::test]
async fn lines_use_base_price_while_promotion_is_listed() {
    let shop = shop().await;
    let today = Utc::now().date_naive();
    let mut params = ProductCreate::new("Chouquettes", Decimal::from(5), 10);
    params.promotion = Some(Promotion {
        start_date: today - Duration::days(1),
        end_date: today + Duration::days(1),
        price: Decimal::new(350, 2),
    });
    let product = shop.system.product_client.create_product(Some(&shop.admin), params).await.unwrap();

    let order = shop.place(&shop.client, &[(&product, 2)]).await.unwrap();
    assert_eq!(order.lines[0].unit_price, Decimal::from(5));
    assert_eq!(order.total, Decimal::from(10));

    let promos = shop.system.product_client.promotions(Some(&shop.client)).await.unwrap();
    assert_eq!(promos.len(), 1);
    assert_eq!(promos[0].promotion_info.current_price, Decimal::new(350, 2));
    assert_eq!(promos[0].promotion_info.discount_percentage, Decimal::from(30));
    let catalogue = shop.system.product_client.catalogue(Some(&shop.client), None).await.unwrap();
    assert!(catalogue.is_empty());
}

#[tokio::test]
async fn overflowing_total_leaves_stock_untouched() {
    let shop = shop().await;
    let showpiece = shop
        .system
        .product_client
        .create_product(Some(&shop.admin), ProductCreate::new("Pièce montée", Decimal::MAX, 5))
        .await
        .unwrap();

    let err = shop.place(&shop.client, &[(&showpiece, 2)]).await.unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)));
    assert_eq!(shop.stock(&showpiece).await, 5);
    assert!(shop.system.order_client.my_orders(Some(&shop.client)).await.unwrap().is_empty());
}

#[tokio::test]
async fn cancel_restores_stock_once() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 3)]).await.unwrap();

    let cancelled = shop.system.order_client.cancel_order(Some(&shop.client), order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.total, order.total);
    assert_eq!(cancelled.history.len(), 1);
    assert_eq!(shop.stock(&bread).await, 5);

    let err = shop.system.order_client.cancel_order(Some(&shop.client), order.id).await.unwrap_err();
    assert_eq!(err, OrderError::NotCancellable(OrderStatus::Cancelled));
    assert_eq!(shop.stock(&bread).await, 5);
}

#[tokio::test]
async fn confirmed_orders_can_still_be_cancelled() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();
    shop.advance(&order, OrderStatus::Confirmed).await.unwrap();

    shop.system.order_client.cancel_order(Some(&shop.client), order.id).await.unwrap();
    assert_eq!(shop.stock(&bread).await, 5);
}

#[tokio::test]
async fn delivered_orders_cannot_be_cancelled() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();
    for to in [OrderStatus::InPreparation, OrderStatus::Ready, OrderStatus::Delivered] {
        shop.advance(&order, to).await.unwrap();
    }

    let err = shop.system.order_client.cancel_order(Some(&shop.client), order.id).await.unwrap_err();
    assert_eq!(err, OrderError::NotCancellable(OrderStatus::Delivered));
    assert_eq!(shop.stock(&bread).await, 4);
}

#[tokio::test]
async fn only_the_owner_cancels() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();

    let err = shop.system.order_client.cancel_order(Some(&shop.neighbour), order.id).await.unwrap_err();
    assert_eq!(err, OrderError::Access(AccessError::Forbidden { reason: DenyReason::NotOwner }));
    let err = shop.system.order_client.my_order(Some(&shop.neighbour), order.id).await.unwrap_err();
    assert!(matches!(err, OrderError::Access(_)));
    assert_eq!(shop.stock(&bread).await, 4);
}

#[tokio::test]
async fn fulfillment_path_records_history() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();

    let err = shop.advance(&order, OrderStatus::Delivered).await.unwrap_err();
    assert_eq!(err, OrderError::InvalidTransition { from: OrderStatus::Pending, to: OrderStatus::Delivered });

    let path = [
        OrderStatus::Confirmed,
        OrderStatus::InPreparation,
        OrderStatus::Ready,
        OrderStatus::InDelivery,
        OrderStatus::Delivered,
    ];
    for to in path {
        let outcome = shop
            .system
            .order_client
            .update_status(Some(&shop.baker), order.id, StatusUpdateRequest::to(to))
            .await
            .unwrap();
        assert_eq!(outcome.new_status, to);
        assert!(outcome.notification_sent);
        assert_eq!(outcome.order.employee_id, Some(shop.baker.user_id));
    }

    let history = shop.system.order_client.history(Some(&shop.baker), order.id).await.unwrap();
    assert_eq!(history.len(), 5);
    let pairs: Vec<_> = history.iter().map(|h| (h.previous_status, h.new_status)).collect();
    assert_eq!(pairs[0], (OrderStatus::Pending, OrderStatus::Confirmed));
    assert_eq!(pairs[4], (OrderStatus::InDelivery, OrderStatus::Delivered));
    assert!(history.iter().all(|h| h.actor_id == shop.baker.user_id));

    let notifications = shop
        .system
        .notification_client
        .list_for(Some(&shop.client), shop.client.user_id, true)
        .await
        .unwrap();
    assert_eq!(notifications.iter().filter(|n| n.kind == ORDER_STATUS_CHANGED).count(), 5);

    let mails = shop.mailer.wait_for(6).await;
    assert_eq!(mails.iter().filter(|m| matches!(m, MailJob::StatusChanged(_))).count(), 5);
}

#[tokio::test]
async fn stale_observed_status_is_rejected() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();
    shop.advance(&order, OrderStatus::Confirmed).await.unwrap();

    let request = StatusUpdateRequest {
        nouveau_statut: OrderStatus::InPreparation,
        commentaire_employe: None,
        statut_attendu: Some(OrderStatus::Pending),
    };
    let err = shop
        .system
        .order_client
        .update_status(Some(&shop.baker), order.id, request)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidTransition { from: OrderStatus::Confirmed, .. }));
}

#[tokio::test]
async fn clients_cannot_drive_the_state_machine() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();

    let err = shop
        .system
        .order_client
        .update_status(Some(&shop.client), order.id, StatusUpdateRequest::to(OrderStatus::Confirmed))
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::Access(AccessError::Forbidden { reason: DenyReason::RoleNotAllowed }));

    let err = shop
        .system
        .order_client
        .update_status(None, order.id, StatusUpdateRequest::to(OrderStatus::Confirmed))
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::Access(AccessError::Unauthenticated));
}

#[tokio::test]
async fn staff_cancellation_releases_stock() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 2)]).await.unwrap();
    shop.advance(&order, OrderStatus::InPreparation).await.unwrap();

    shop.advance(&order, OrderStatus::Cancelled).await.unwrap();
    assert_eq!(shop.stock(&bread).await, 5);
}

#[tokio::test]
async fn concurrent_orders_for_last_unit() {
    let shop = shop().await;
    let cake = shop.product("Paris-Brest", 25, 1).await;

    let lines = [(&cake, 1)];
    let (first, second) = tokio::join!(shop.place(&shop.client, &lines), shop.place(&shop.neighbour, &lines));

    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(OrderError::OutOfStock { available: 0, .. }))));
    assert_eq!(shop.stock(&cake).await, 0);
}

#[tokio::test]
async fn racing_cancellations_release_once() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 2)]).await.unwrap();

    let orders = &shop.system.order_client;
    let (a, b) = tokio::join!(
        orders.cancel_order(Some(&shop.client), order.id),
        orders.cancel_order(Some(&shop.client), order.id),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(shop.stock(&bread).await, 5);
}

#[tokio::test]
async fn dispatch_failure_keeps_the_transition() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();

    shop.system.user_client.delete_user(Some(&shop.admin), shop.client.user_id).await.unwrap();

    let outcome = shop
        .system
        .order_client
        .update_status(Some(&shop.baker), order.id, StatusUpdateRequest::to(OrderStatus::Confirmed))
        .await
        .unwrap();
    assert!(!outcome.notification_sent);
    assert_eq!(outcome.order.status, OrderStatus::Confirmed);

    let view = shop.system.order_client.staff_order(Some(&shop.baker), order.id).await.unwrap();
    assert_eq!(view.order.status, OrderStatus::Confirmed);
    assert!(view.owner.is_none());
    assert_eq!(view.order.history.len(), 1);
}

#[tokio::test]
async fn failing_mail_transport_does_not_block_orders() {
    let system =
        OrderSystem::build(&AppConfig::default(), Arc::new(FailingMailer), OrderNumberGenerator::new("CMD-")).unwrap();
    let admin = system
        .user_client
        .create_user(UserCreate::new("Marie", "Durand", "admin@shop.test", Role::Admin))
        .await
        .unwrap();
    let client = system
        .user_client
        .create_user(UserCreate::new("Ana", "Lopez", "ana@example.com", Role::Client))
        .await
        .unwrap();
    let bread = system
        .product_client
        .create_product(Some(&Caller::admin(admin.id)), ProductCreate::new("Pain", Decimal::from(2), 3))
        .await
        .unwrap();

    let order = system
        .order_client
        .place_order(Some(&Caller::client(client.id)), cart(&[(&bread, 1)]))
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn order_number_collisions_are_retried() {
    let suffixes = [7u16, 7, 8];
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let numbers = OrderNumberGenerator::with_suffix("CMD-", move || {
        suffixes[counter.fetch_add(1, Ordering::SeqCst).min(suffixes.len() - 1)]
    });
    let shop = shop_with(numbers).await;
    let bread = shop.product("Pain", 2, 5).await;

    let first = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();
    let second = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();

    assert!(first.number.ends_with("-0007"));
    assert!(second.number.ends_with("-0008"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(shop.stock(&bread).await, 3);
}

#[tokio::test]
async fn staff_listing_filters_and_counts() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 20).await;
    let first = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();
    let second = shop.place(&shop.neighbour, &[(&bread, 1)]).await.unwrap();
    shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();
    shop.advance(&first, OrderStatus::Confirmed).await.unwrap();
    shop.system.order_client.cancel_order(Some(&shop.neighbour), second.id).await.unwrap();

    let orders = &shop.system.order_client;
    let all = orders.staff_orders(Some(&shop.baker), &OrderFilter::default()).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.orders.len(), 3);
    assert_eq!(all.counts[&OrderStatus::Pending], 1);
    assert_eq!(all.counts[&OrderStatus::Confirmed], 1);
    assert_eq!(all.counts[&OrderStatus::Cancelled], 1);
    assert_eq!(all.counts[&OrderStatus::Delivered], 0);

    let filter = OrderFilter { statut: Some("confirmee".into()), ..Default::default() };
    let confirmed = orders.staff_orders(Some(&shop.baker), &filter).await.unwrap();
    assert_eq!(confirmed.orders.len(), 1);
    let view = &confirmed.orders[0];
    assert_eq!(view.order.id, first.id);
    assert_eq!(view.owner.as_ref().map(|o| o.id), Some(shop.client.user_id));
    assert_eq!(view.assignee.as_ref().map(|a| a.id), Some(shop.baker.user_id));

    let tomorrow = Utc::now().date_naive() + Duration::days(1);
    let filter = OrderFilter { date_debut: Some(tomorrow), ..Default::default() };
    assert!(orders.staff_orders(Some(&shop.baker), &filter).await.unwrap().orders.is_empty());

    let filter = OrderFilter { statut: Some("shipped".into()), ..Default::default() };
    assert!(matches!(
        orders.staff_orders(Some(&shop.baker), &filter).await,
        Err(OrderError::Validation(_))
    ));

    assert!(orders.staff_orders(Some(&shop.client), &OrderFilter::default()).await.is_err());
    assert_eq!(orders.my_orders(Some(&shop.client)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn assignment_requires_a_staff_account() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 1)]).await.unwrap();
    let orders = &shop.system.order_client;

    let err = orders
        .assign_order(Some(&shop.admin), order.id, Some(shop.neighbour.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)));

    let assigned = orders.assign_order(Some(&shop.admin), order.id, Some(shop.baker.user_id)).await.unwrap();
    assert_eq!(assigned.employee_id, Some(shop.baker.user_id));

    let cleared = orders.assign_order(Some(&shop.baker), order.id, None).await.unwrap();
    assert_eq!(cleared.employee_id, None);
    assert_eq!(cleared.status, OrderStatus::Pending);
}

#[tokio::test]
async fn deleted_products_keep_line_snapshots() {
    let shop = shop().await;
    let bread = shop.product("Pain", 2, 5).await;
    let order = shop.place(&shop.client, &[(&bread, 2)]).await.unwrap();

    shop.system.product_client.delete_product(Some(&shop.admin), bread.id).await.unwrap();

    let kept = shop.system.order_client.my_order(Some(&shop.client), order.id).await.unwrap();
    assert_eq!(kept.lines[0].product_name, "Pain");

    // Releasing stock for a product that is gone is not an error.
    let cancelled = shop.system.order_client.cancel_order(Some(&shop.client), order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn shutdown_drains_every_actor() {
    let shop = shop().await;
    shop.product("Pain", 2, 5).await;
    shop.system.shutdown().await.unwrap();
}
