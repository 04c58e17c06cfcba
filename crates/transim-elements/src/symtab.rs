use std::collections::HashMap;

use crate::error::{Error, Result};

/// Assigns dense integer indices to electrical nodes and, in a second pass,
/// to the auxiliary branch-current unknowns MNA augmentation introduces.
/// Ground (`"0"`) is pre-bound to index 0.
pub struct SymbolTable {
    names: Vec<String>,
    index: HashMap<String, usize>,
    capacity: usize,
    nn: usize,
    currents_finalized: bool,
}

impl SymbolTable {
    pub fn new(capacity: usize) -> Self {
        let mut names = Vec::with_capacity(capacity.max(1));
        let mut index = HashMap::new();
        names.push("0".to_string());
        index.insert("0".to_string(), 0);
        Self {
            names,
            index,
            capacity,
            nn: 0,
            currents_finalized: false,
        }
    }

    fn intern(&mut self, name: &str) -> Result<usize> {
        if let Some(&i) = self.index.get(name) {
            return Ok(i);
        }
        let idx = self.names.len();
        if idx >= self.capacity {
            return Err(Error::CapacityExceeded(format!(
                "symbol table capacity {} exhausted interning '{name}'",
                self.capacity
            )));
        }
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        Ok(idx)
    }

    /// First-pass node interning. Must not be called after `finalize_nodes`.
    pub fn intern_node(&mut self, name: &str) -> Result<usize> {
        debug_assert!(self.nn == 0, "nodes must be interned before finalize_nodes");
        self.intern(name)
    }

    /// Closes the node-index range; everything interned after this call is an
    /// auxiliary branch current, per the spec's node-then-current ordering.
    pub fn finalize_nodes(&mut self) {
        self.nn = self.names.len() - 1;
    }

    /// Second-pass auxiliary-current interning (`j<elem>`, `jx<elem>`, `jy<elem>`).
    pub fn intern_current(&mut self, name: &str) -> Result<usize> {
        debug_assert!(self.nn > 0 || self.names.len() == 1, "finalize_nodes must run first");
        self.intern(name)
    }

    pub fn finalize_currents(&mut self) {
        self.currents_finalized = true;
    }

    pub fn nn(&self) -> usize {
        self.nn
    }

    pub fn nv(&self) -> usize {
        self.names.len() - 1
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn is_finalized(&self) -> bool {
        self.currents_finalized
    }
}
