use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::{ProductId, ReservedItem};
use super::user::{UserId, UserSummary};

pub type OrderId = u64;

/// Lifecycle status of an order. Serialized with the storefront's wire codes.
///
/// The legal transitions between statuses are defined in
/// `order_actor::state_machine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "en_attente")]
    Pending,
    #[serde(rename = "confirmee")]
    Confirmed,
    #[serde(rename = "en_preparation")]
    InPreparation,
    #[serde(rename = "prete")]
    Ready,
    #[serde(rename = "en_livraison")]
    InDelivery,
    #[serde(rename = "livree")]
    Delivered,
    #[serde(rename = "annulee")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "especes")]
    Cash,
    #[serde(rename = "en_ligne")]
    Online,
}

/// One product/quantity pair with the name and price captured at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// 1-based position within the owning order.
    pub id: u32,
    pub order_id: OrderId,
    pub product_id: ProductId,
    #[serde(rename = "nom_produit")]
    pub product_name: String,
    #[serde(rename = "prix_produit")]
    pub unit_price: Decimal,
    #[serde(rename = "quantite")]
    pub quantity: u32,
    #[serde(rename = "prix_total")]
    pub line_total: Decimal,
}

impl OrderLine {
    /// The line total is derived here and nowhere else. `None` when it does
    /// not fit in a `Decimal`.
    pub fn new(id: u32, order_id: OrderId, item: &ReservedItem) -> Option<Self> {
        Some(Self {
            id,
            order_id,
            product_id: item.product_id,
            product_name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            line_total: item.line_total()?,
        })
    }

    pub fn is_consistent(&self) -> bool {
        self.quantity > 0
            && !self.unit_price.is_sign_negative()
            && self.unit_price.checked_mul(Decimal::from(self.quantity)) == Some(self.line_total)
    }
}

/// Immutable audit record of one status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub order_id: OrderId,
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
    /// Staff member who moved the order, or the owning client for a cancellation.
    pub actor_id: UserId,
    pub comment: Option<String>,
    pub at: DateTime<Utc>,
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(rename = "numero_commande")]
    pub number: String,
    #[serde(rename = "user_id")]
    pub client_id: UserId,
    #[serde(rename = "statut")]
    pub status: OrderStatus,
    #[serde(rename = "montant_total")]
    pub total: Decimal,
    #[serde(rename = "mode_paiement")]
    pub payment_mode: PaymentMode,
    #[serde(rename = "adresse_livraison")]
    pub delivery_address: String,
    #[serde(rename = "telephone_livraison")]
    pub delivery_phone: String,
    pub notes: Option<String>,
    #[serde(rename = "commentaire_employe")]
    pub staff_comment: Option<String>,
    #[serde(rename = "employe_id")]
    pub employee_id: Option<UserId>,
    #[serde(rename = "articles")]
    pub lines: Vec<OrderLine>,
    #[serde(rename = "historique", default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn lines_total(&self) -> Option<Decimal> {
        checked_sum(self.lines.iter().map(|line| Some(line.line_total)))
    }
}

/// Sum of the reserved lines, or `None` on overflow.
pub fn reserved_total(items: &[ReservedItem]) -> Option<Decimal> {
    checked_sum(items.iter().map(ReservedItem::line_total))
}

fn checked_sum(amounts: impl Iterator<Item = Option<Decimal>>) -> Option<Decimal> {
    amounts.fold(Some(Decimal::ZERO), |acc, amount| acc?.checked_add(amount?))
}

/// Payload for persisting a new order; built by the order client once every
/// line has been reserved.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub number: String,
    pub client_id: UserId,
    pub payment_mode: PaymentMode,
    pub delivery_address: String,
    pub delivery_phone: String,
    pub notes: Option<String>,
    pub items: Vec<ReservedItem>,
    pub total: Decimal,
}

/// Staff-facing order with owner and assignee identity attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    #[serde(rename = "user")]
    pub owner: Option<UserSummary>,
    #[serde(rename = "employe")]
    pub assignee: Option<UserSummary>,
}

/// Result of a successful status change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionOutcome {
    #[serde(rename = "data")]
    pub order: Order,
    #[serde(rename = "ancien_statut")]
    pub old_status: OrderStatus,
    #[serde(rename = "nouveau_statut")]
    pub new_status: OrderStatus,
    #[serde(rename = "notification_envoyee")]
    pub notification_sent: bool,
}
