use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

use bakery_orders::access::Caller;
use bakery_orders::app_system::{setup_tracing, AppConfig, OrderSystem};
use bakery_orders::domain::{
    CartLine, OrderStatus, PaymentMode, PlaceOrderRequest, ProductCreate, Role, StatusUpdateRequest, UserCreate,
};
use bakery_orders::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    setup_tracing(&config.logging.level);

    info!("Starting bakery order system");
    let system = OrderSystem::new(&config)?;

    let admin = system
        .user_client
        .create_user(UserCreate::new("Marie", "Durand", "admin@boulangerie.test", Role::Admin))
        .await?;
    let baker = system
        .user_client
        .create_user(UserCreate::new("Luc", "Martin", "luc@boulangerie.test", Role::Employee))
        .await?;
    let client = system
        .user_client
        .create_user(UserCreate::new("Ana", "Lopez", "ana@example.com", Role::Client))
        .await?;
    let (admin, baker, client) = (Caller::admin(admin.id), Caller::employee(baker.id), Caller::client(client.id));

    let baguette = system
        .product_client
        .create_product(Some(&admin), ProductCreate::new("Baguette tradition", Decimal::new(120, 2), 40))
        .await?;
    let croissant = system
        .product_client
        .create_product(Some(&admin), ProductCreate::new("Croissant", Decimal::new(110, 2), 25))
        .await?;

    let request = PlaceOrderRequest {
        articles: vec![
            CartLine { product_id: baguette.id, quantite: 2 },
            CartLine { product_id: croissant.id, quantite: 6 },
        ],
        mode_paiement: PaymentMode::Cash,
        adresse_livraison: "3 place du Marché".to_string(),
        telephone_livraison: "0612345678".to_string(),
        notes: Some("Sonner deux fois".to_string()),
    };

    let span = tracing::info_span!("order_processing");
    let order = async {
        info!("Placing order");
        system.order_client.place_order(Some(&client), request).await
    }
    .instrument(span)
    .await?;
    info!(number = %order.number, total = %order.total, "Order placed");

    for next in [OrderStatus::Confirmed, OrderStatus::InPreparation, OrderStatus::Ready, OrderStatus::Delivered] {
        match system
            .order_client
            .update_status(Some(&baker), order.id, StatusUpdateRequest::to(next))
            .await
        {
            Ok(outcome) => info!(
                from = %outcome.old_status,
                to = %outcome.new_status,
                notified = outcome.notification_sent,
                "Order advanced"
            ),
            Err(e) => error!(error = %e, "Status update failed"),
        }
    }

    let unread = system.notification_client.unread_count(Some(&client), client.user_id).await?;
    info!(unread, "Client notifications waiting");

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
