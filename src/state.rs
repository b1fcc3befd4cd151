//! The shared body table.
//!
//! The table is one flat buffer of `f64` values:
//!
//! | index                  | content                                  |
//! |------------------------|------------------------------------------|
//! | `0`                    | number of active bodies                  |
//! | `1 + 7k .. 1 + 7k + 7` | body `k` as `[x, y, z, vx, vy, vz, mass]` |
//!
//! Every element is an [`AtomicU64`] holding the bits of an `f64`, so the
//! memory layout is identical to a plain `[f64]` while reads and writes from
//! different threads stay well defined.
//!
//! Field accesses are relaxed. The count is published with release ordering
//! after a new body's fields are written and read with acquire ordering, so
//! a reader never sees a count covering a slot whose fields are not written
//! yet. Updates to an existing slot may be observed partially by a
//! concurrent snapshot; at most one frame shows such a torn body.
//!
//! Each slot also has an epoch. It is even while the slot is idle and odd
//! while either `append` or the engine writes to it. `append` leaves it two
//! higher than before. The engine only writes back if the epoch is still the
//! even value it read at the start of its tick, so a body appended mid-tick
//! is never overwritten with stale results.

use std::{
    hint,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

use tracing::debug;

use crate::{
    body::{Body, FLOATS_PER_BODY},
    Error, Result,
};

/// Number of scalars in front of the first body.
pub const HEADER_FLOATS: usize = 1;

/// Index of the first field of `slot` in the flat buffer.
#[must_use]
pub const fn slot_offset(slot: usize) -> usize {
    HEADER_FLOATS + slot * FLOATS_PER_BODY
}

/// A fixed-capacity table of bodies shared between the integration engine
/// and the presentation layer.
///
/// `append` is meant to be called from a single producer. Calling it from
/// several threads at once is memory safe but may publish a slot before its
/// fields are complete.
#[derive(Debug)]
pub struct SimulationState {
    capacity: usize,
    buffer: Box<[AtomicU64]>,
    /// See the module documentation.
    epochs: Box<[AtomicU64]>,
    write_index: AtomicUsize,
}

impl SimulationState {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        let buffer = (0..slot_offset(capacity))
            .map(|_| AtomicU64::new(0f64.to_bits()))
            .collect();
        let epochs = (0..capacity).map(|_| AtomicU64::new(0)).collect();

        Ok(Self {
            capacity,
            buffer,
            epochs,
            write_index: AtomicUsize::new(0),
        })
    }

    /// Rebuild a table from its flat representation, see [`SimulationState::to_raw`].
    pub fn from_raw(raw: &[f64]) -> Result<Self> {
        let len = raw.len();
        if len <= HEADER_FLOATS || (len - HEADER_FLOATS) % FLOATS_PER_BODY != 0 {
            return Err(Error::RawLength { len });
        }
        let capacity = (len - HEADER_FLOATS) / FLOATS_PER_BODY;

        let count = raw[0];
        if !(count >= 0. && count <= capacity as f64 && count.fract() == 0.) {
            return Err(Error::CountOutOfRange { count, capacity });
        }
        let count = count as usize;

        for slot in 0..count {
            let mut fields = [0.; FLOATS_PER_BODY];
            fields.copy_from_slice(&raw[slot_offset(slot)..slot_offset(slot + 1)]);
            Body::try_from_fields(fields)?;
        }

        let state = Self::new(capacity)?;
        for (cell, value) in state.buffer.iter().zip(raw) {
            cell.store(value.to_bits(), Ordering::Relaxed);
        }
        state.write_index.store(count, Ordering::Relaxed);

        Ok(state)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of active bodies.
    #[must_use]
    pub fn len(&self) -> usize {
        f64::from_bits(self.buffer[0].load(Ordering::Acquire)) as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write `body` into the next slot and publish it.
    ///
    /// Slots are used in ring order: once the table is full, the next body
    /// replaces slot 0, then slot 1, and so on. Returns the slot written.
    pub fn append(&self, body: &Body) -> usize {
        let slot = self.write_index.fetch_add(1, Ordering::Relaxed) % self.capacity;

        let epoch = self.claim_for_append(slot);
        self.write_fields(slot, body);
        self.release_after_append(slot, epoch);

        let capacity = self.capacity as f64;
        let previous = self.buffer[0].fetch_update(Ordering::Release, Ordering::Relaxed, |bits| {
            let count = f64::from_bits(bits);
            if count < capacity {
                Some((count + 1.).to_bits())
            } else {
                // store the same count anyway so the release covers overwrites too
                Some(bits)
            }
        });

        if previous.is_ok_and(|bits| f64::from_bits(bits) >= capacity) {
            debug!(slot, "table full, overwrote slot");
        } else {
            debug!(slot, "appended body");
        }

        slot
    }

    /// Copy the active bodies into a new vector.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Body> {
        let mut bodies = Vec::with_capacity(self.len());
        self.snapshot_into(&mut bodies);
        bodies
    }

    /// Like [`SimulationState::snapshot`], reusing the allocation of `bodies`.
    pub fn snapshot_into(&self, bodies: &mut Vec<Body>) {
        let count = self.len();
        bodies.clear();
        bodies.extend((0..count).map(|slot| self.load_body(slot)));
    }

    /// The whole table in its flat layout, inactive slots included.
    #[must_use]
    pub fn to_raw(&self) -> Vec<f64> {
        let count = self.buffer[0].load(Ordering::Acquire);
        std::iter::once(f64::from_bits(count))
            .chain(
                self.buffer[HEADER_FLOATS..]
                    .iter()
                    .map(|cell| f64::from_bits(cell.load(Ordering::Relaxed))),
            )
            .collect()
    }

    /// Read the active bodies together with the epoch of each slot.
    pub(crate) fn read_with_epochs(&self, bodies: &mut Vec<Body>, epochs: &mut Vec<u64>) {
        let count = self.len();
        bodies.clear();
        epochs.clear();
        for slot in 0..count {
            epochs.push(self.epochs[slot].load(Ordering::Acquire));
            bodies.push(self.load_body(slot));
        }
    }

    /// Write back position and velocity of `slot`, unless `append` rewrote
    /// the slot since `epoch` was read. Returns whether the write happened.
    pub(crate) fn store_motion(&self, slot: usize, epoch: u64, body: &Body) -> bool {
        let epochs = &self.epochs[slot];
        if epoch % 2 == 1
            || epochs
                .compare_exchange(epoch, epoch + 1, Ordering::Acquire, Ordering::Relaxed)
                .is_err()
        {
            return false;
        }

        let fields = body.to_fields();
        for (cell, value) in self.slot(slot)[..6].iter().zip(&fields[..6]) {
            cell.store(value.to_bits(), Ordering::Relaxed);
        }
        epochs.store(epoch, Ordering::Release);
        true
    }

    /// Mark `slot` as being rewritten by moving its epoch to the next odd
    /// value, waiting out a write-back of the engine that is in progress.
    /// Returns the epoch the slot had before.
    fn claim_for_append(&self, slot: usize) -> u64 {
        let epochs = &self.epochs[slot];
        let mut current = epochs.load(Ordering::Relaxed);
        loop {
            if current % 2 == 1 {
                hint::spin_loop();
                current = epochs.load(Ordering::Relaxed);
                continue;
            }
            match epochs.compare_exchange_weak(
                current,
                current + 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return current,
                Err(actual) => current = actual,
            }
        }
    }

    fn write_fields(&self, slot: usize, body: &Body) {
        for (cell, value) in self.slot(slot).iter().zip(body.to_fields()) {
            cell.store(value.to_bits(), Ordering::Relaxed);
        }
    }

    /// Finish a rewrite started with `claim_for_append`.
    fn release_after_append(&self, slot: usize, epoch: u64) {
        self.epochs[slot].store(epoch + 2, Ordering::Release);
    }

    fn slot(&self, slot: usize) -> &[AtomicU64] {
        &self.buffer[slot_offset(slot)..slot_offset(slot + 1)]
    }

    fn load_body(&self, slot: usize) -> Body {
        let mut fields = [0.; FLOATS_PER_BODY];
        for (field, cell) in fields.iter_mut().zip(self.slot(slot)) {
            *field = f64::from_bits(cell.load(Ordering::Relaxed));
        }
        Body::from_fields(fields)
    }
}
