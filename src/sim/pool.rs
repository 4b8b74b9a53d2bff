//! Fixed-capacity entity pools
//!
//! Transient entities (projectiles, particles, asteroids, trails) live in
//! preallocated arrays and are reused in place. There is no compaction and no
//! generational id: a slot is free exactly when its activity predicate says
//! so, and nothing outside the owning subsystem holds a slot index across
//! ticks.

/// Activity predicate for pool slots.
///
/// A slot is free iff `is_active()` is false; "release" is implicit in the
/// owning subsystem resetting the slot to its inactive sentinel (type tag
/// `None`, alpha/life <= 0).
pub trait PoolSlot: Default {
    fn is_active(&self) -> bool;
}

/// An owned, fixed-capacity slot array for one entity kind.
///
/// No two subsystems share one pool.
#[derive(Debug, Clone)]
pub struct Pool<T: PoolSlot> {
    slots: Box<[T]>,
}

impl<T: PoolSlot> Pool<T> {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, T::default);
        Self {
            slots: slots.into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// First-inactive linear scan. Returns `None` when the pool is saturated;
    /// the caller silently drops the spawn (a deliberate soft-cap, not an
    /// error). The returned borrow must not outlive the spawning call.
    pub fn try_acquire(&mut self) -> Option<&mut T> {
        self.slots.iter_mut().find(|slot| !slot.is_active())
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter(|slot| slot.is_active())
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter(|slot| slot.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    /// Raw slot access for index-pair iteration
    pub fn slots(&self) -> &[T] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [T] {
        &mut self.slots
    }

    /// Disjoint mutable borrows of two slots, for pairwise resolution
    pub fn pair_mut(&mut self, i: usize, j: usize) -> (&mut T, &mut T) {
        debug_assert!(i < j);
        let (left, right) = self.slots.split_at_mut(j);
        (&mut left[i], &mut right[0])
    }

    /// Reset every slot to the inactive default
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = T::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Default, Clone)]
    struct Dummy {
        live: bool,
        tag: u32,
    }

    impl PoolSlot for Dummy {
        fn is_active(&self) -> bool {
            self.live
        }
    }

    #[test]
    fn test_acquire_and_release() {
        let mut pool: Pool<Dummy> = Pool::new(4);

        for tag in 0..4 {
            let slot = pool.try_acquire().expect("pool has room");
            slot.live = true;
            slot.tag = tag;
        }
        assert_eq!(pool.active_count(), 4);
        assert!(pool.try_acquire().is_none());

        // Freeing one slot makes exactly that slot reusable
        pool.slots_mut()[2].live = false;
        let slot = pool.try_acquire().expect("freed slot is reusable");
        assert_eq!(slot.tag, 2);
    }

    #[test]
    fn test_pair_mut_disjoint() {
        let mut pool: Pool<Dummy> = Pool::new(3);
        let (a, b) = pool.pair_mut(0, 2);
        a.tag = 1;
        b.tag = 2;
        assert_eq!(pool.slots()[0].tag, 1);
        assert_eq!(pool.slots()[2].tag, 2);
    }

    proptest! {
        /// Acquiring more than capacity leaves exactly `capacity` active
        /// slots and signals `None` for every excess request; no slot is
        /// double-allocated.
        #[test]
        fn prop_saturation(capacity in 1usize..64, requests in 0usize..128) {
            let mut pool: Pool<Dummy> = Pool::new(capacity);
            let mut granted = Vec::new();

            for tag in 0..requests {
                match pool.try_acquire() {
                    Some(slot) => {
                        prop_assert!(!slot.live, "acquired an already-active slot");
                        slot.live = true;
                        slot.tag = tag as u32;
                        granted.push(tag as u32);
                    }
                    None => prop_assert!(pool.active_count() == capacity),
                }
            }

            prop_assert_eq!(pool.active_count(), requests.min(capacity));
            // Every granted tag is present exactly once
            let mut seen: Vec<u32> = pool.iter_active().map(|d| d.tag).collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, granted);
        }
    }
}
