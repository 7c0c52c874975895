use chrono::Utc;

use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductId, ProductUpdate, ReservedItem};

impl Entity for Product {
    type Id = ProductId;
    type CreateParams = ProductCreate;
    type UpdateParams = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    const KIND: &'static str = "product";

    fn id(&self) -> &ProductId {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// # Errors
    /// Rejects blank names, negative prices and incomplete or inverted promotions.
    fn from_create_params(id: ProductId, params: ProductCreate) -> Result<Self, ProductError> {
        let now = Utc::now();
        let mut product = Self {
            id,
            name: params.name,
            description: params.description,
            price: params.price,
            stock: params.stock,
            is_promotion: false,
            promotion_start_date: None,
            promotion_end_date: None,
            promotion_price: None,
            created_at: now,
            updated_at: now,
        };
        product.apply_promotion(params.promotion);
        product.check_invariants().map_err(ProductError::ValidationError)?;
        Ok(product)
    }

    /// Applies an admin catalog edit. Invariants are re-checked on the result;
    /// a failure discards the whole edit.
    fn on_update(&mut self, params: ProductUpdate) -> Result<(), ProductError> {
        if let Some(name) = params.name {
            self.name = name;
        }
        if let Some(description) = params.description {
            self.description = Some(description);
        }
        if let Some(price) = params.price {
            self.price = price;
        }
        if let Some(stock) = params.stock {
            self.stock = stock;
        }
        if let Some(promotion) = params.promotion {
            self.apply_promotion(promotion);
        }
        self.check_invariants().map_err(ProductError::ValidationError)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Handles the inventory ledger actions.
    ///
    /// # Errors
    /// `Reserve` fails with `OutOfStock` when fewer than `quantity` units remain,
    /// and both `Reserve` and `Release` reject a zero quantity.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::StockLevel => Ok(ProductActionResult::StockLevel(self.stock)),
            ProductAction::Reserve { quantity } => {
                if quantity == 0 {
                    return Err(ProductError::InvalidQuantity(quantity));
                }
                if self.stock < quantity {
                    return Err(ProductError::OutOfStock {
                        product: self.name.clone(),
                        requested: quantity,
                        available: self.stock,
                    });
                }
                self.stock -= quantity;
                Ok(ProductActionResult::Reserved(ReservedItem {
                    product_id: self.id,
                    name: self.name.clone(),
                    unit_price: self.price,
                    quantity,
                }))
            }
            ProductAction::Release(quantity) => {
                if quantity == 0 {
                    return Err(ProductError::InvalidQuantity(quantity));
                }
                self.stock = self.stock.saturating_add(quantity);
                Ok(ProductActionResult::Released { stock: self.stock })
            }
        }
    }
}
