// registry.rs - Model registry for managing available substitution models

use std::collections::HashMap;

use super::traits::{ModelKind, SubstitutionModel};
use super::{Blosum62Model, IdentityModel, KimuraModel};

/// Registry for available substitution models
#[derive(Debug)]
pub struct ModelRegistry {
    models: HashMap<String, Box<dyn SubstitutionModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            models: HashMap::new(),
        };

        // Register built-in models
        registry.register_model(Box::new(IdentityModel));
        registry.register_model(Box::new(KimuraModel));
        registry.register_model(Box::new(Blosum62Model));

        registry
    }

    /// Register a model under its kind's key, replacing any previous one
    pub fn register_model(&mut self, model: Box<dyn SubstitutionModel>) {
        self.models.insert(model.kind().key().to_string(), model);
    }

    /// Get a model by name or alias
    pub fn get_model(&self, name: &str) -> Option<&dyn SubstitutionModel> {
        let kind: ModelKind = name.parse().ok()?;
        self.get(kind)
    }

    /// Get the model registered for a kind
    pub fn get(&self, kind: ModelKind) -> Option<&dyn SubstitutionModel> {
        self.models.get(kind.key()).map(|m| m.as_ref())
    }

    /// Check if a model exists
    pub fn has_model(&self, name: &str) -> bool {
        self.get_model(name).is_some()
    }

    /// List all available models, sorted by key
    pub fn list_models(&self) -> Vec<(&str, &str)> {
        let mut models: Vec<_> = self
            .models
            .iter()
            .map(|(key, m)| (key.as_str(), m.description()))
            .collect();
        models.sort_unstable();
        models
    }

    /// Get all model names, sorted
    pub fn get_model_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.models.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
