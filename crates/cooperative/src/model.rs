use penury::Quantum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Buyer placing purchases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u64);

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DeliveryId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u-{}", self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pd-{}", self.0)
    }
}

/// A product is only valid for one delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,

    #[serde(default)]
    pub unit: Option<String>,

    pub price: Decimal,

    /// Total quantity which can be granted over all purchases, `None` if unlimited
    #[serde(default)]
    pub quantity_limit: Option<Decimal>,

    /// Step in which the product is sold
    #[serde(default)]
    pub quantum: Quantum,
}

/// Intent of a user to acquire some quantity of a product. If the product is limited the stored
/// quantity is the granted one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub user: UserId,
    pub product: ProductId,
    pub quantity: Decimal,
}

/// Snapshot of a delivery with all its products and purchases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub name: String,

    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default)]
    pub purchases: Vec<Purchase>,
}

impl Delivery {
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|pd| pd.id == id)
    }

    /// Ordered quantity of a product compared to its limit
    pub fn totals(&self, id: ProductId) -> Option<ProductTotals> {
        let product = self.product(id)?;
        let ordered = self
            .purchases
            .iter()
            .filter(|pc| pc.product == id)
            .map(|pc| pc.quantity)
            .sum();
        Some(ProductTotals {
            ordered,
            limit: product.quantity_limit,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductTotals {
    pub ordered: Decimal,
    pub limit: Option<Decimal>,
}

impl ProductTotals {
    /// More was ordered than the limit allows
    pub fn is_scarce(&self) -> bool {
        self.limit.is_some_and(|limit| self.ordered > limit)
    }

    /// Quantity which was ordered beyond the limit
    pub fn shortage(&self) -> Decimal {
        match self.limit {
            Some(limit) if self.ordered > limit => self.ordered - limit,
            _ => Decimal::ZERO,
        }
    }
}

/// Change of a stored purchase required to honor a product limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    pub user: UserId,

    /// Quantity stored before the adjustment
    pub ordered: Decimal,

    pub granted: Decimal,

    pub action: AdjustmentAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentAction {
    /// Store the granted quantity
    Update,

    /// Nothing was granted, remove the purchase
    Delete,
}

#[cfg(test)]
mod test {
    use super::*;
    use rust_decimal_macros::dec;

    fn delivery() -> Delivery {
        Delivery {
            id: DeliveryId(1),
            name: "week 12".to_string(),
            products: vec![Product {
                id: ProductId(7),
                name: "eggs".to_string(),
                unit: Some("box".to_string()),
                price: dec!(2.40),
                quantity_limit: Some(dec!(10)),
                quantum: Quantum::default(),
            }],
            purchases: vec![
                Purchase {
                    user: UserId(1),
                    product: ProductId(7),
                    quantity: dec!(6),
                },
                Purchase {
                    user: UserId(2),
                    product: ProductId(7),
                    quantity: dec!(7),
                },
            ],
        }
    }

    #[test]
    fn test_totals() {
        let dv = delivery();
        let totals = dv.totals(ProductId(7)).unwrap();
        assert_eq!(totals.ordered, dec!(13));
        assert!(totals.is_scarce());
        assert_eq!(totals.shortage(), dec!(3));
        assert!(dv.totals(ProductId(8)).is_none());
    }

    #[test]
    fn test_unlimited_never_scarce() {
        let totals = ProductTotals {
            ordered: dec!(1000),
            limit: None,
        };
        assert!(!totals.is_scarce());
        assert_eq!(totals.shortage(), Decimal::ZERO);
    }

    #[test]
    fn test_delivery_json() {
        let json = r#"{
            "id": 3,
            "name": "spring",
            "products": [
                { "id": 1, "name": "honey", "price": "8.5", "quantity_limit": "4", "quantum": "0.5" }
            ],
            "purchases": [
                { "user": 11, "product": 1, "quantity": "2.5" }
            ]
        }"#;
        let dv: Delivery = serde_json::from_str(json).unwrap();
        assert_eq!(dv.products[0].quantum.step(), dec!(0.5));
        assert_eq!(dv.products[0].unit, None);
        assert_eq!(dv.purchases[0].quantity, dec!(2.5));
    }
}
