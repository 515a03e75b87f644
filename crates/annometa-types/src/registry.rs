//! Registry of annotation contracts
//!
//! Populated once by the discovery collaborator and shared read-only
//! afterwards (typically behind an `Arc`).

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::coerce::coerce;
use crate::contract::AnnotationContract;
use crate::error::ContractError;
use crate::identity::AnnotationName;

/// Contracts indexed by annotation name
#[derive(Debug, Default)]
pub struct ContractRegistry {
    contracts: FxHashMap<AnnotationName, Arc<AnnotationContract>>,
}

impl ContractRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contract, replacing any previous contract of the same name
    ///
    /// Defaults are normalized to their declared types, so `default = 1` on a
    /// `double` attribute is stored as `1.0`.
    pub fn register(&mut self, mut contract: AnnotationContract) -> Result<(), ContractError> {
        for (i, spec) in contract.attributes.iter().enumerate() {
            if contract.attributes[..i].iter().any(|a| a.name == spec.name) {
                return Err(ContractError::DuplicateAttribute {
                    annotation: contract.name.to_string(),
                    attribute: spec.name.clone(),
                });
            }
        }

        let annotation = contract.name.to_string();
        for spec in &mut contract.attributes {
            if let Some(default) = &spec.default {
                let normalized =
                    coerce(default, &spec.ty).map_err(|source| ContractError::InvalidDefault {
                        annotation: annotation.clone(),
                        attribute: spec.name.clone(),
                        source,
                    })?;
                spec.default = Some(normalized);
            }
        }

        self.contracts.insert(contract.name.clone(), Arc::new(contract));
        Ok(())
    }

    /// Builder-style registration
    pub fn with(mut self, contract: AnnotationContract) -> Result<Self, ContractError> {
        self.register(contract)?;
        Ok(self)
    }

    /// Load a registry from a JSON array of contract descriptors
    pub fn from_json(json: &str) -> Result<Self, ContractError> {
        let contracts: Vec<AnnotationContract> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for contract in contracts {
            registry.register(contract)?;
        }
        Ok(registry)
    }

    /// Get the contract for an annotation
    pub fn get(&self, name: &str) -> Option<&Arc<AnnotationContract>> {
        self.contracts.get(name)
    }

    /// Check if a contract is registered
    pub fn contains(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    /// Registered annotation names, sorted
    pub fn names(&self) -> Vec<AnnotationName> {
        let mut names: Vec<_> = self.contracts.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get number of registered contracts
    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
