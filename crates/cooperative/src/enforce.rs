use crate::{
    Adjustment, AdjustmentAction, EnforceConfig, Journal, JournalEntry, Product, ProductId,
    Purchase, PurchaseStore, StoreError, UserId, ZeroGrantPolicy,
};
use penury::{AllocError, Allocator, UnitsError};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnforceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Units(#[from] UnitsError),

    #[error(transparent)]
    Alloc(#[from] AllocError),

    #[error("purchase of user {user} is for product {found}, not {expected}")]
    ForeignPurchase {
        expected: ProductId,
        found: ProductId,
        user: UserId,
    },

    #[error("user {user} has more than one purchase of product {product}")]
    DuplicatePurchase { product: ProductId, user: UserId },
}

/// Computes how the purchases of a product must change so that the granted total does not exceed
/// the product limit. Only purchases whose quantity changes are listed.
///
/// Nothing changes while the stored total is within the limit. Otherwise every purchase is
/// granted a whole number of quanta, so fractions of a quantum are cut as well.
pub fn plan_adjustments(
    product: &Product,
    purchases: &[Purchase],
    config: &EnforceConfig,
) -> Result<Vec<Adjustment>, EnforceError> {
    // Unlimited: granted == ordered for everyone
    let Some(limit) = product.quantity_limit else {
        return Ok(Vec::new());
    };

    let quantum = product.quantum;

    let mut wishes = BTreeMap::new();
    for pc in purchases {
        if pc.product != product.id {
            return Err(EnforceError::ForeignPurchase {
                expected: product.id,
                found: pc.product,
                user: pc.user,
            });
        }
        if wishes.insert(pc.user, quantum.to_units(pc.quantity)?).is_some() {
            return Err(EnforceError::DuplicatePurchase {
                product: product.id,
                user: pc.user,
            });
        }
    }

    let limit_units = quantum.to_units(limit)?;

    let ordered = purchases
        .iter()
        .try_fold(Decimal::ZERO, |acc, pc| acc.checked_add(pc.quantity))
        .ok_or(UnitsError::OutOfRange)?;
    if ordered <= limit {
        return Ok(Vec::new());
    }

    let allocation = Allocator::default()
        .with_limit(limit_units)
        .allocate(&wishes)?;

    log::warn!(
        "penury on {} ({}): {} ordered for a limit of {}, ceiling {:?} units",
        product.name,
        product.id,
        ordered,
        limit,
        allocation.ceiling()
    );

    let mut adjustments = Vec::new();
    for pc in purchases {
        let units = allocation.grants().get(&pc.user).copied().unwrap_or(0);
        let granted = quantum.from_units(units)?;
        if granted == pc.quantity {
            continue;
        }

        let action = match (units, config.zero_grant) {
            (0, ZeroGrantPolicy::Delete) => AdjustmentAction::Delete,
            _ => AdjustmentAction::Update,
        };

        adjustments.push(Adjustment {
            user: pc.user,
            ordered: pc.quantity,
            granted,
            action,
        });
    }

    Ok(adjustments)
}

/// Makes sure a product has not been granted in larger amount than its limit.
///
/// Reads the current purchases, cuts them back if needed, persists the changes and records them
/// in the journal. Returns the applied adjustments.
pub fn enforce_limit<S: PurchaseStore + ?Sized>(
    store: &mut S,
    journal: &mut Journal,
    product: ProductId,
    config: &EnforceConfig,
) -> Result<Vec<Adjustment>, EnforceError> {
    let product = store.product(product)?;
    let purchases = store.purchases(product.id)?;

    let adjustments = plan_adjustments(&product, &purchases, config)?;
    if adjustments.is_empty() {
        log::debug!("{} ({}): no adjustment needed", product.name, product.id);
        return Ok(adjustments);
    }

    store.apply(product.id, &adjustments)?;

    for adj in &adjustments {
        journal.record(JournalEntry {
            product: product.id,
            product_name: product.name.clone(),
            user: adj.user,
            ordered: adj.ordered,
            granted: adj.granted,
            deleted: adj.action == AdjustmentAction::Delete,
        });
    }

    Ok(adjustments)
}

/// Enforces the limit of every given product, e.g. after the products of a delivery were edited.
/// Returns the adjustments of the products which changed. Stops at the first failure.
pub fn enforce_delivery<S: PurchaseStore + ?Sized>(
    store: &mut S,
    journal: &mut Journal,
    products: &[ProductId],
    config: &EnforceConfig,
) -> Result<BTreeMap<ProductId, Vec<Adjustment>>, EnforceError> {
    let mut out = BTreeMap::new();
    for &product in products {
        let adjustments = enforce_limit(store, journal, product, config)?;
        if !adjustments.is_empty() {
            out.insert(product, adjustments);
        }
    }
    Ok(out)
}
