use crate::{
    Adjustment, AdjustmentAction, Delivery, DeliveryId, Product, ProductId, Purchase, UserId,
};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),

    #[error("no purchase of product {product} by user {user}")]
    UnknownPurchase { product: ProductId, user: UserId },

    #[error("user {user} already has a purchase of product {product}")]
    DuplicatePurchase { product: ProductId, user: UserId },
}

/// Persistence of products and purchases.
///
/// Callers must hold exclusive access for the whole read-modify-write cycle of one product, so
/// that the purchases read are still current when adjustments are applied.
pub trait PurchaseStore {
    fn product(&self, id: ProductId) -> Result<Product, StoreError>;

    /// All purchases of a product
    fn purchases(&self, product: ProductId) -> Result<Vec<Purchase>, StoreError>;

    /// Applies all adjustments of a product, or none of them if one is invalid
    fn apply(&mut self, product: ProductId, adjustments: &[Adjustment]) -> Result<(), StoreError>;
}

/// Store keeping a single delivery in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    delivery: DeliveryId,
    name: String,
    products: BTreeMap<ProductId, Product>,
    purchases: BTreeMap<(ProductId, UserId), Purchase>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_delivery(delivery: Delivery) -> Result<Self, StoreError> {
        let mut store = Self {
            delivery: delivery.id,
            name: delivery.name,
            ..Default::default()
        };
        for product in delivery.products {
            store.insert_product(product);
        }
        for purchase in delivery.purchases {
            store.insert_purchase(purchase)?;
        }
        Ok(store)
    }

    pub fn to_delivery(&self) -> Delivery {
        Delivery {
            id: self.delivery,
            name: self.name.clone(),
            products: self.products.values().cloned().collect(),
            purchases: self.purchases.values().cloned().collect(),
        }
    }

    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    /// Adds a purchase. There is at most one purchase per user and product.
    pub fn insert_purchase(&mut self, purchase: Purchase) -> Result<(), StoreError> {
        if !self.products.contains_key(&purchase.product) {
            return Err(StoreError::UnknownProduct(purchase.product));
        }
        let key = (purchase.product, purchase.user);
        if self.purchases.contains_key(&key) {
            return Err(StoreError::DuplicatePurchase {
                product: purchase.product,
                user: purchase.user,
            });
        }
        self.purchases.insert(key, purchase);
        Ok(())
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.products.keys().copied().collect()
    }

    pub fn purchase(&self, product: ProductId, user: UserId) -> Option<&Purchase> {
        self.purchases.get(&(product, user))
    }
}

impl PurchaseStore for MemoryStore {
    fn product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.products
            .get(&id)
            .cloned()
            .ok_or(StoreError::UnknownProduct(id))
    }

    fn purchases(&self, product: ProductId) -> Result<Vec<Purchase>, StoreError> {
        if !self.products.contains_key(&product) {
            return Err(StoreError::UnknownProduct(product));
        }
        Ok(self
            .purchases
            .range((product, UserId(u64::MIN))..=(product, UserId(u64::MAX)))
            .map(|(_, pc)| pc.clone())
            .collect())
    }

    fn apply(&mut self, product: ProductId, adjustments: &[Adjustment]) -> Result<(), StoreError> {
        if !self.products.contains_key(&product) {
            return Err(StoreError::UnknownProduct(product));
        }

        // Validate everything before touching anything
        for adj in adjustments {
            if !self.purchases.contains_key(&(product, adj.user)) {
                return Err(StoreError::UnknownPurchase {
                    product,
                    user: adj.user,
                });
            }
        }

        for adj in adjustments {
            let key = (product, adj.user);
            match adj.action {
                AdjustmentAction::Update => {
                    if let Some(pc) = self.purchases.get_mut(&key) {
                        pc.quantity = adj.granted;
                    }
                }
                AdjustmentAction::Delete => {
                    self.purchases.remove(&key);
                }
            }
        }

        Ok(())
    }
}
