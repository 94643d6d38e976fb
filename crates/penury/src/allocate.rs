use crate::AllocError;
use num_traits::{NumCast, PrimInt};
use std::{collections::BTreeMap, fmt::Debug};

/// Allocates an integral quantity among consumers in case of penury.
///
/// If the total wish does not exceed the limit everybody gets what they asked for. Otherwise a
/// ceiling is searched such that granting `min(wish, ceiling)` to every consumer leaves less than
/// one unit per unsatisfied consumer. These last units go one by one to the consumers with the
/// largest shortfall. Ties are broken by ascending consumer key.
#[derive(Debug, Clone, Copy)]
pub struct Allocator<Q> {
    limit: Q,
}

impl<Q: PrimInt> Default for Allocator<Q> {
    fn default() -> Self {
        Self { limit: Q::zero() }
    }
}

/// Outcome of an allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation<K, Q> {
    grants: BTreeMap<K, Q>,
    ceiling: Option<Q>,
}

impl<K, Q: Copy> Allocation<K, Q> {
    /// Granted quantity per consumer. Covers exactly the keys of the wishes.
    pub fn grants(&self) -> &BTreeMap<K, Q> {
        &self.grants
    }

    pub fn into_grants(self) -> BTreeMap<K, Q> {
        self.grants
    }

    /// Per-consumer cap found by the ceiling search, `None` if there was no scarcity.
    pub fn ceiling(&self) -> Option<Q> {
        self.ceiling
    }

    pub fn is_scarce(&self) -> bool {
        self.ceiling.is_some()
    }
}

impl<Q: PrimInt + Debug> Allocator<Q> {
    /// Total quantity which can be allocated
    pub fn with_limit(mut self, limit: Q) -> Self {
        self.set_limit(limit);
        self
    }

    pub fn set_limit(&mut self, limit: Q) {
        self.limit = limit;
    }

    pub fn allocate<K: Ord + Clone + Debug>(
        &self,
        wishes: &BTreeMap<K, Q>,
    ) -> Result<Allocation<K, Q>, AllocError> {
        let limit = self.limit;
        if limit < Q::zero() {
            return Err(AllocError::NegativeLimit);
        }

        let mut total = Q::zero();
        for &wish in wishes.values() {
            if wish < Q::zero() {
                return Err(AllocError::NegativeWish);
            }
            total = total.checked_add(&wish).ok_or(AllocError::Overflow)?;
        }

        if total <= limit {
            return Ok(Allocation {
                grants: wishes.clone(),
                ceiling: None,
            });
        }

        log::debug!("penury: {total:?} wished for a limit of {limit:?}");

        let mut unallocated = limit;
        let mut granted: BTreeMap<K, Q> = wishes.keys().map(|k| (k.clone(), Q::zero())).collect();
        let wishing = wishes.values().filter(|&&w| w > Q::zero()).count();
        let mut n_unsatisfied = <Q as NumCast>::from(wishing).ok_or(AllocError::Overflow)?;
        let mut ceiling = Q::zero();

        // Stage A: raise the ceiling lot by lot until less than one unit per unsatisfied
        // consumer remains. Both maps iterate in key order.
        while n_unsatisfied > Q::zero() && unallocated >= n_unsatisfied {
            let lot = unallocated / n_unsatisfied;
            ceiling = ceiling + lot;

            log::debug!(
                "{unallocated:?} units left, granting up to {lot:?} to {n_unsatisfied:?} consumers"
            );

            for (&wish, grant) in wishes.values().zip(granted.values_mut()) {
                let wish_more = wish - *grant;
                if wish_more > Q::zero() {
                    let lot_k = wish_more.min(lot);
                    *grant = *grant + lot_k;
                    unallocated = unallocated - lot_k;
                    if *grant == wish {
                        n_unsatisfied = n_unsatisfied - Q::one();
                    }
                }
            }
        }

        // Stage B: remaining units go to the largest shortfalls, ties by ascending key
        let remainder = unallocated.to_usize().ok_or(AllocError::Overflow)?;
        let mut shortfalls: Vec<(Q, &K)> = wishes
            .iter()
            .zip(granted.values())
            .filter(|((_, wish), grant)| *grant < *wish)
            .map(|((k, &wish), &grant)| (wish - grant, k))
            .collect();
        shortfalls.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        let lucky: Vec<K> = shortfalls
            .into_iter()
            .take(remainder)
            .map(|(_, k)| k.clone())
            .collect();
        log::debug!("{remainder} leftover units go to {lucky:?}");

        for k in lucky {
            if let Some(grant) = granted.get_mut(&k) {
                *grant = *grant + Q::one();
                unallocated = unallocated - Q::one();
            }
        }

        let sum = granted.values().fold(Q::zero(), |acc, &g| acc + g);
        assert!(unallocated == Q::zero(), "penury: {unallocated:?} units left over");
        assert!(sum == limit, "penury: granted {sum:?} instead of {limit:?}");
        for ((k, &wish), &grant) in wishes.iter().zip(granted.values()) {
            assert!(grant <= wish, "penury: {k:?} granted {grant:?} > wished {wish:?}");
            assert!(
                grant <= ceiling + Q::one(),
                "penury: {k:?} granted {grant:?} above ceiling {ceiling:?}"
            );
        }

        Ok(Allocation {
            grants: granted,
            ceiling: Some(ceiling),
        })
    }
}

/// Grants per consumer for `limit` available units. See [`Allocator`].
pub fn allocate<K: Ord + Clone + Debug, Q: PrimInt + Debug>(
    limit: Q,
    wishes: &BTreeMap<K, Q>,
) -> Result<BTreeMap<K, Q>, AllocError> {
    Ok(Allocator::default()
        .with_limit(limit)
        .allocate(wishes)?
        .into_grants())
}
