use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use crate::access::{authorize, Action, Caller, Resource};
use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductId, ProductUpdate, PromotedProduct, ReservedItem};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};

/// Client for the product actor: admin catalog management, storefront
/// browsing and the inventory ledger.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

fn unexpected(result: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("unexpected action result: {result:?}"))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl ProductClient {
    // --- Catalog (admin) ---

    #[instrument(skip(self, params), fields(name = %params.name))]
    pub async fn create_product(&self, caller: Option<&Caller>, params: ProductCreate) -> Result<Product, ProductError> {
        authorize(caller, Action::ManageCatalog, Resource::Any)?;
        let product = self.inner.create(params).await?;
        info!(product_id = product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, update))]
    pub async fn update_product(
        &self,
        caller: Option<&Caller>,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, ProductError> {
        authorize(caller, Action::ManageCatalog, Resource::Any)?;
        let product = self.inner.update(id, update).await?;
        info!(stock = product.stock, "Product updated");
        Ok(product)
    }

    /// Existing order lines keep their snapshot of the deleted product.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, caller: Option<&Caller>, id: ProductId) -> Result<(), ProductError> {
        authorize(caller, Action::ManageCatalog, Resource::Any)?;
        self.inner.delete(id).await?;
        info!("Product deleted");
        Ok(())
    }

    // --- Storefront ---

    /// In-stock products without a promotion, sorted by name. `search` matches
    /// the product name, case-insensitively.
    #[instrument(skip(self))]
    pub async fn catalogue(&self, caller: Option<&Caller>, search: Option<&str>) -> Result<Vec<Product>, ProductError> {
        authorize(caller, Action::BrowseCatalog, Resource::Any)?;
        let needle = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);
        let mut products: Vec<Product> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|p| p.stock > 0 && !p.is_promotion)
            .filter(|p| needle.as_ref().map_or(true, |n| p.name.to_lowercase().contains(n)))
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = products.len(), "Catalogue listed");
        Ok(products)
    }

    /// In-stock products whose promotion window covers today, sorted by name,
    /// each with its discount summary.
    #[instrument(skip(self))]
    pub async fn promotions(&self, caller: Option<&Caller>) -> Result<Vec<PromotedProduct>, ProductError> {
        authorize(caller, Action::BrowseCatalog, Resource::Any)?;
        let today = today();
        let mut promoted: Vec<PromotedProduct> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|p| p.stock > 0 && p.is_on_promotion_at(today))
            .filter_map(|product| {
                let promotion_info = product.promotion_info(today)?;
                Some(PromotedProduct { product, promotion_info })
            })
            .collect();
        promoted.sort_by(|a, b| a.product.name.cmp(&b.product.name));
        Ok(promoted)
    }

    #[instrument(skip(self))]
    pub async fn show_product(&self, caller: Option<&Caller>, id: ProductId) -> Result<Product, ProductError> {
        authorize(caller, Action::BrowseCatalog, Resource::Any)?;
        self.require_product(id).await
    }

    // --- Inventory ledger ---

    /// Decrements stock if enough is available and returns the snapshot priced
    /// at the product's base price.
    #[instrument(skip(self))]
    pub async fn check_and_reserve(&self, id: ProductId, quantity: u32) -> Result<ReservedItem, ProductError> {
        match self.inner.perform_action(id, ProductAction::Reserve { quantity }).await? {
            ProductActionResult::Reserved(item) => {
                debug!(unit_price = %item.unit_price, "Stock reserved");
                Ok(item)
            }
            other => Err(unexpected(other)),
        }
    }

    /// Puts stock back. A product that no longer exists is logged and skipped.
    #[instrument(skip(self))]
    pub async fn release(&self, id: ProductId, quantity: u32) -> Result<(), ProductError> {
        match self.inner.perform_action(id, ProductAction::Release(quantity)).await {
            Ok(ProductActionResult::Released { stock }) => {
                debug!(stock, "Stock released");
                Ok(())
            }
            Ok(other) => Err(unexpected(other)),
            Err(e) => match ProductError::from(e) {
                ProductError::NotFound(_) => {
                    warn!("Cannot release stock, product no longer exists");
                    Ok(())
                }
                other => Err(other),
            },
        }
    }

    #[instrument(skip(self))]
    pub async fn stock_level(&self, id: ProductId) -> Result<u32, ProductError> {
        match self.inner.perform_action(id, ProductAction::StockLevel).await? {
            ProductActionResult::StockLevel(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessError;
    use crate::actor_framework::FrameworkError;
    use crate::mock_framework::{create_mock_client, expect_action};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn release_of_missing_product_succeeds() {
        let (inner, mut rx) = create_mock_client::<Product>(4);
        let client = ProductClient::new(inner);
        let task = tokio::spawn(async move { client.release(99, 2).await });

        let (id, action, responder) = expect_action(&mut rx).await.expect("Expected release action");
        assert_eq!(id, 99);
        assert!(matches!(action, ProductAction::Release(2)));
        responder
            .send(Err(FrameworkError::NotFound { kind: "product", id: "99".into() }))
            .unwrap();

        assert_eq!(task.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn reserve_surfaces_out_of_stock() {
        let (inner, mut rx) = create_mock_client::<Product>(4);
        let client = ProductClient::new(inner);
        let task = tokio::spawn(async move { client.check_and_reserve(1, 3).await });

        let (_, action, responder) = expect_action(&mut rx).await.expect("Expected reserve action");
        assert!(matches!(action, ProductAction::Reserve { quantity: 3, .. }));
        let err = ProductError::OutOfStock { product: "Baguette".into(), requested: 3, available: 1 };
        responder.send(Err(FrameworkError::Entity(err.clone()))).unwrap();

        assert_eq!(task.await.unwrap(), Err(err));
    }

    #[tokio::test]
    async fn catalog_mutation_requires_admin() {
        let (inner, _rx) = create_mock_client::<Product>(4);
        let client = ProductClient::new(inner);
        let err = client
            .create_product(Some(&Caller::employee(2)), ProductCreate::new("Brioche", Decimal::from(4), 3))
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::Access(AccessError::Forbidden { .. })));
    }
}
