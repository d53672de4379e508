use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{RelayError, Result};
use crate::router::TaskClass;

/// A hosted backend model the router may dispatch to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeModel {
    pub id: String,
    pub strengths: Vec<TaskClass>,
    /// Lower is tried first
    pub priority: u32,
}

impl FreeModel {
    pub fn new(id: impl Into<String>, strengths: &[TaskClass], priority: u32) -> Self {
        Self {
            id: id.into(),
            strengths: strengths.to_vec(),
            priority,
        }
    }

    pub fn supports(&self, task_class: TaskClass) -> bool {
        self.strengths.contains(&task_class)
    }
}

/// Immutable catalog of backend models, built once at startup.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<FreeModel>,
}

impl ModelRegistry {
    /// Build a registry, rejecting duplicate ids and models without strengths.
    pub fn new(models: Vec<FreeModel>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for model in &models {
            if model.id.trim().is_empty() {
                return Err(RelayError::InvalidModel("model id must not be empty".to_string()));
            }
            if model.strengths.is_empty() {
                return Err(RelayError::InvalidModel(format!(
                    "model '{}' declares no strengths",
                    model.id
                )));
            }
            if !seen.insert(model.id.as_str()) {
                return Err(RelayError::InvalidModel(format!(
                    "duplicate model id '{}'",
                    model.id
                )));
            }
        }

        Ok(Self { models })
    }

    pub fn models(&self) -> &[FreeModel] {
        &self.models
    }

    pub fn get(&self, id: &str) -> Option<&FreeModel> {
        self.models.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        use TaskClass::{Coding, General, Summary};

        Self {
            models: vec![
                FreeModel::new("deepseek/deepseek-chat-v3-0324:free", &[Coding, General], 1),
                FreeModel::new("qwen/qwen-2.5-coder-32b-instruct:free", &[Coding], 2),
                FreeModel::new("meta-llama/llama-3.3-70b-instruct:free", &[General, Summary], 3),
                FreeModel::new("google/gemini-2.0-flash-exp:free", &[Summary, General, Coding], 4),
                FreeModel::new("mistralai/mistral-7b-instruct:free", &[Summary, General], 5),
                FreeModel::new("microsoft/phi-3-mini-128k-instruct:free", &[Summary], 6),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_is_valid() {
        let registry = ModelRegistry::default();
        assert!(ModelRegistry::new(registry.models().to_vec()).is_ok());
        for class in [TaskClass::Coding, TaskClass::Summary, TaskClass::General] {
            assert!(
                registry.models().iter().any(|m| m.supports(class)),
                "no default model for {:?}",
                class
            );
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = ModelRegistry::new(vec![
            FreeModel::new("a", &[TaskClass::Coding], 1),
            FreeModel::new("a", &[TaskClass::General], 2),
        ]);
        assert!(matches!(result, Err(RelayError::InvalidModel(_))));
    }

    #[test]
    fn test_model_without_strengths_rejected() {
        let result = ModelRegistry::new(vec![FreeModel::new("a", &[], 1)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_lookup_by_id() {
        let registry = ModelRegistry::new(vec![
            FreeModel::new("a", &[TaskClass::Coding], 1),
            FreeModel::new("b", &[TaskClass::Summary], 2),
        ])
        .unwrap();
        assert_eq!(registry.get("b").map(|m| m.priority), Some(2));
        assert!(registry.get("c").is_none());
        assert_eq!(registry.len(), 2);
    }
}
