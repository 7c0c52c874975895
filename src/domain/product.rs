//! Catalog products with time-bounded promotions.
//!
//! # Actor Framework
//! This struct implements the [`Entity`](crate::actor_framework::Entity) trait,
//! allowing it to be managed by a [`ResourceActor`](crate::actor_framework::ResourceActor).
//!
//! See `product_actor` for:
//! - Creation parameters ([`ProductCreate`])
//! - Update parameters ([`ProductUpdate`])
//! - Stock actions (`ProductAction`)
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ProductId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: u32,
    pub is_promotion: bool,
    pub promotion_start_date: Option<NaiveDate>,
    pub promotion_end_date: Option<NaiveDate>,
    pub promotion_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when the promotion flag is set and `today` falls inside the window (inclusive).
    pub fn is_on_promotion_at(&self, today: NaiveDate) -> bool {
        match (self.is_promotion, self.promotion_start_date, self.promotion_end_date) {
            (true, Some(start), Some(end)) => start <= today && today <= end,
            _ => false,
        }
    }

    /// Promotion price while the window covers `today`, base price otherwise.
    /// Display only; order lines are priced at [`Product::price`].
    pub fn effective_price_at(&self, today: NaiveDate) -> Decimal {
        match self.promotion_price {
            Some(promo) if self.is_on_promotion_at(today) => promo,
            _ => self.price,
        }
    }

    pub fn promotion_info(&self, today: NaiveDate) -> Option<PromotionInfo> {
        if !self.is_promotion {
            return None;
        }
        let (start_date, end_date, promotion_price) =
            (self.promotion_start_date?, self.promotion_end_date?, self.promotion_price?);
        let savings = self.price - promotion_price;
        let discount_percentage = savings
            .checked_div(self.price)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map_or(Decimal::ZERO, |pct| pct.round_dp(2));
        Some(PromotionInfo {
            is_active: self.is_on_promotion_at(today),
            current_price: self.effective_price_at(today),
            savings,
            start_date,
            end_date,
            original_price: self.price,
            promotion_price,
            discount_percentage,
        })
    }

    /// Checks the catalog invariants: non-negative prices and a complete,
    /// ordered promotion window whenever the promotion flag is set.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("product name is required".to_string());
        }
        if self.price.is_sign_negative() {
            return Err(format!("price must not be negative, got {}", self.price));
        }
        if !self.is_promotion {
            return Ok(());
        }
        match (self.promotion_start_date, self.promotion_end_date, self.promotion_price) {
            (Some(start), Some(end), Some(price)) => {
                if start > end {
                    Err(format!("promotion ends ({end}) before it starts ({start})"))
                } else if price.is_sign_negative() {
                    Err(format!("promotion price must not be negative, got {price}"))
                } else {
                    Ok(())
                }
            }
            _ => Err("an active promotion needs a start date, an end date and a promotion price".to_string()),
        }
    }

    pub(crate) fn apply_promotion(&mut self, promotion: Option<Promotion>) {
        match promotion {
            Some(p) => {
                self.is_promotion = true;
                self.promotion_start_date = Some(p.start_date);
                self.promotion_end_date = Some(p.end_date);
                self.promotion_price = Some(p.price);
            }
            None => {
                self.is_promotion = false;
                self.promotion_start_date = None;
                self.promotion_end_date = None;
                self.promotion_price = None;
            }
        }
    }
}

/// Promotion window as entered by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: Decimal,
}

/// Read-only promotion summary shown in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionInfo {
    pub is_active: bool,
    pub current_price: Decimal,
    pub savings: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub original_price: Decimal,
    pub promotion_price: Decimal,
    pub discount_percentage: Decimal,
}

/// Promotions listing entry: the product plus its discount summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub promotion_info: PromotionInfo,
}

/// Payload for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: u32,
    #[serde(default)]
    pub promotion: Option<Promotion>,
}

impl ProductCreate {
    pub fn new(name: impl Into<String>, price: Decimal, stock: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            stock,
            promotion: None,
        }
    }
}

/// Partial update. `promotion: Some(None)` clears the promotion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
    #[serde(default)]
    pub promotion: Option<Option<Promotion>>,
}

/// Snapshot captured when stock is reserved for an order line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservedItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl ReservedItem {
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}
