//! Constant pool for compiled programs.
//!
//! The constant pool stores the integer and string literals referenced by
//! `CONSTANT` instructions. Identical literals share one entry.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    /// Integer literal.
    Int(i64),
    /// String literal (escapes already decoded).
    String(String),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(value) => write!(f, "{value}"),
            Constant::String(value) => write!(f, "{value:?}"),
        }
    }
}

/// Program-level constant pool with deduplication.
///
/// Serializes as the ordered constant list; the index is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Constant>", into = "Vec<Constant>")]
pub struct ConstantPool {
    /// The actual constants.
    constants: Vec<Constant>,
    /// Deduplication index: maps constant to its index.
    index: FxHashMap<Constant, u32>,
}

impl ConstantPool {
    /// Create a new empty constant pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a pool from an ordered list of constants.
    pub fn from_constants(constants: Vec<Constant>) -> Self {
        let mut pool = Self::new();
        for constant in constants {
            pool.add(constant);
        }
        pool
    }

    /// Add or get existing constant, returns index.
    ///
    /// Deduplicates identical constants.
    pub fn add(&mut self, constant: Constant) -> u32 {
        if let Some(&idx) = self.index.get(&constant) {
            return idx;
        }

        let idx = self.constants.len() as u32;
        self.constants.push(constant.clone());
        self.index.insert(constant, idx);
        idx
    }

    /// Add an integer constant.
    pub fn add_int(&mut self, value: i64) -> u32 {
        self.add(Constant::Int(value))
    }

    /// Add a string constant.
    pub fn add_string(&mut self, value: &str) -> u32 {
        self.add(Constant::String(value.to_string()))
    }

    /// Get constant by index.
    pub fn get(&self, index: u32) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    /// Get all constants (for serialization).
    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    /// Number of constants.
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

impl PartialEq for ConstantPool {
    fn eq(&self, other: &Self) -> bool {
        self.constants == other.constants
    }
}

impl Eq for ConstantPool {}

impl From<Vec<Constant>> for ConstantPool {
    fn from(constants: Vec<Constant>) -> Self {
        Self::from_constants(constants)
    }
}

impl From<ConstantPool> for Vec<Constant> {
    fn from(pool: ConstantPool) -> Self {
        pool.constants
    }
}
