//! Seeded registry workloads and a reference model to check them against.

use pmarray_registry::{ArrayRegistry, RegistryError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Names drawn by generated workloads. Small, so ops collide often.
pub const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

/// One registry request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Allocate { name: String, size: u64 },
    Resize { name: String, size: u64 },
    Delete { name: String },
    Print { name: String },
}

impl Op {
    /// Apply to a real registry. User errors are swallowed, the way the
    /// command line reports and moves on; pool errors are returned.
    pub fn apply(&self, registry: &mut ArrayRegistry) -> Result<(), RegistryError> {
        let result = match self {
            Op::Allocate { name, size } => registry.allocate(name, *size),
            Op::Resize { name, size } => registry.resize(name, *size),
            Op::Delete { name } => registry.delete(name),
            Op::Print { name } => registry.render(name).map(|_| ()),
        };
        match result {
            Err(e) if e.is_user_error() => Ok(()),
            other => other,
        }
    }
}

/// Generate `len` ops from `seed`.
///
/// Sizes are in `0..=max_size`, so some requests are rejected for size 0.
pub fn workload(seed: u64, len: usize, max_size: u64) -> Vec<Op> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let name = NAMES[rng.random_range(0..NAMES.len())].to_string();
            match rng.random_range(0..10u32) {
                0..=3 => Op::Allocate {
                    name,
                    size: rng.random_range(0..=max_size),
                },
                4..=6 => Op::Resize {
                    name,
                    size: rng.random_range(0..=max_size),
                },
                7..=8 => Op::Delete { name },
                _ => Op::Print { name },
            }
        })
        .collect()
}

/// Plain in-memory registry with the same observable behavior.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelRegistry {
    entries: Vec<(String, Vec<i32>)>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `op`; returns whether it was accepted.
    pub fn apply(&mut self, op: &Op) -> bool {
        match op {
            Op::Allocate { name, size } => {
                if self.position(name).is_some() || *size == 0 {
                    return false;
                }
                let values = (0..*size).map(|i| (i % (i32::MAX as u64 + 1)) as i32).collect();
                self.entries.push((name.clone(), values));
                true
            }
            Op::Resize { name, size } => {
                let Some(pos) = self.position(name) else {
                    return false;
                };
                if *size == 0 {
                    return false;
                }
                self.entries[pos].1.resize(*size as usize, 0);
                true
            }
            Op::Delete { name } => match self.position(name) {
                Some(pos) => {
                    self.entries.remove(pos);
                    true
                }
                None => false,
            },
            Op::Print { name } => self.position(name).is_some(),
        }
    }

    /// Every entry in list order.
    pub fn entries(&self) -> &[(String, Vec<i32>)] {
        &self.entries
    }

    /// Values of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&[i32]> {
        self.position(name).map(|pos| self.entries[pos].1.as_slice())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}
