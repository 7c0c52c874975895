//! Request DTOs accepted by the order core, validated with `validator`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::order::{OrderStatus, PaymentMode};
use super::product::ProductId;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartLine {
    pub product_id: ProductId,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantite: u32,
}

/// Cart submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    #[validate(length(min = 1, message = "the cart is empty"))]
    pub articles: Vec<CartLine>,
    pub mode_paiement: PaymentMode,
    #[validate(length(min = 1, max = 500))]
    pub adresse_livraison: String,
    #[validate(length(min = 1, max = 20))]
    pub telephone_livraison: String,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl PlaceOrderRequest {
    /// Validates the request and every cart line, joining all messages.
    pub fn check(&self) -> Result<(), String> {
        let mut problems = Vec::new();
        if let Err(e) = self.validate() {
            problems.push(e.to_string());
        }
        for (idx, line) in self.articles.iter().enumerate() {
            if let Err(e) = line.validate() {
                problems.push(format!("articles[{idx}]: {e}"));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

/// Staff request to move an order to a new status.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StatusUpdateRequest {
    pub nouveau_statut: OrderStatus,
    #[validate(length(max = 500))]
    pub commentaire_employe: Option<String>,
    /// Status the caller last saw; a stale value turns the request into an invalid transition.
    #[serde(default)]
    pub statut_attendu: Option<OrderStatus>,
}

impl StatusUpdateRequest {
    pub fn to(status: OrderStatus) -> Self {
        Self {
            nouveau_statut: status,
            commentaire_employe: None,
            statut_attendu: None,
        }
    }
}

/// Filters for the staff order listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    /// Wire status code, or `tous` for every status.
    pub statut: Option<String>,
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(articles: Vec<CartLine>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            articles,
            mode_paiement: PaymentMode::Cash,
            adresse_livraison: "12 rue du Four".into(),
            telephone_livraison: "0600000000".into(),
            notes: None,
        }
    }

    #[test]
    fn parses_storefront_payload() {
        let json = r#"{
            "articles": [{"product_id": 1, "quantite": 2}],
            "mode_paiement": "en_ligne",
            "adresse_livraison": "12 rue du Four",
            "telephone_livraison": "0600000000"
        }"#;
        let req: PlaceOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.mode_paiement, PaymentMode::Online);
        assert_eq!(req.articles[0].quantite, 2);
        assert!(req.check().is_ok());
    }

    #[test]
    fn rejects_empty_cart_and_zero_quantity() {
        assert!(request(vec![]).check().unwrap_err().contains("the cart is empty"));

        let err = request(vec![CartLine { product_id: 1, quantite: 0 }]).check().unwrap_err();
        assert!(err.contains("articles[0]"));
    }

    #[test]
    fn rejects_overlong_phone() {
        let mut req = request(vec![CartLine { product_id: 1, quantite: 1 }]);
        req.telephone_livraison = "0".repeat(21);
        assert!(req.check().is_err());
    }

    #[test]
    fn status_update_uses_wire_codes() {
        let req: StatusUpdateRequest =
            serde_json::from_str(r#"{"nouveau_statut": "en_preparation", "commentaire_employe": "au four"}"#).unwrap();
        assert_eq!(req.nouveau_statut, OrderStatus::InPreparation);
        assert!(req.statut_attendu.is_none());
    }
}
