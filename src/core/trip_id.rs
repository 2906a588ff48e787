use crate::utils::error::{EtlError, Result};
use rand::{prelude::StdRng, Rng, SeedableRng as _};
use std::collections::HashSet;

pub const DEFAULT_TRIP_ID_LENGTH: usize = 6;

/// Generates unique random IDs made of uppercase ASCII letters.
#[derive(Debug, Clone)]
pub struct TripIdGenerator {
    rng: StdRng,
    length: usize,
}

impl TripIdGenerator {
    /// A seeded generator always yields the same sequence; otherwise the
    /// seed comes from the OS.
    pub fn new(length: usize, seed: Option<u64>) -> Result<Self> {
        if length == 0 {
            return Err(EtlError::InvalidConfigValueError {
                field: "format.trip_id_length".to_string(),
                value: length.to_string(),
                reason: "Trip IDs need at least one letter".to_string(),
            });
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self { rng, length })
    }

    /// Number of distinct IDs of this length, saturating at `u128::MAX`.
    pub fn capacity(&self) -> u128 {
        26u128.checked_pow(self.length as u32).unwrap_or(u128::MAX)
    }

    fn next_id(&mut self) -> String {
        (0..self.length)
            .map(|_| char::from(b'A' + self.rng.random_range(0..26u8)))
            .collect()
    }

    /// Returns `count` pairwise-distinct IDs in generation order.
    pub fn generate(&mut self, count: usize) -> Result<Vec<String>> {
        if count as u128 > self.capacity() {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "Cannot generate {} unique IDs of length {} (only {} exist)",
                    count,
                    self.length,
                    self.capacity()
                ),
            });
        }

        let mut used = HashSet::with_capacity(count);
        let mut ids = Vec::with_capacity(count);
        while ids.len() < count {
            let id = self.next_id();
            if used.insert(id.clone()) {
                ids.push(id);
            }
        }

        Ok(ids)
    }
}

pub fn is_valid_trip_id(id: &str, length: usize) -> bool {
    id.len() == length && id.bytes().all(|b| b.is_ascii_uppercase())
}
