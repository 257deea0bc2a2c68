use super::DISCRIMINATOR_FIELD;
use crate::errors::{DataError, DataResult, ErrorKind};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

type Decoder<T> = Arc<dyn Fn(Value) -> DataResult<T> + Send + Sync>;

/// Decodes documents of several concrete types into one sum type.
///
/// Each document carries a discriminator field; its value selects the
/// decoder registered for that alias.
///
/// # Examples
///
/// ```rust,ignore
/// enum Animal {
///     Dog(Dog),
///     Cat(Cat),
/// }
///
/// let registry = TypeRegistry::new("Animal")
///     .register::<Dog, _>("dog", Animal::Dog)
///     .register::<Cat, _>("cat", Animal::Cat);
///
/// let page = template.search_polymorphic(None, &registry, &definition, &chunk)?;
/// ```
pub struct TypeRegistry<T> {
    collection: String,
    discriminator: String,
    decoders: HashMap<String, Decoder<T>>,
}

impl<T> TypeRegistry<T> {
    /// Creates a registry for documents tagged with `collection`.
    pub fn new(collection: &str) -> Self {
        TypeRegistry {
            collection: collection.to_string(),
            discriminator: DISCRIMINATOR_FIELD.to_string(),
            decoders: HashMap::new(),
        }
    }

    /// Reads the alias from `field` instead of the default discriminator.
    pub fn with_discriminator(mut self, field: &str) -> Self {
        self.discriminator = field.to_string();
        self
    }

    /// Registers `S` under `alias`; decoded values are lifted into `T` by
    /// `wrap`.
    pub fn register<S, F>(mut self, alias: &str, wrap: F) -> Self
    where
        S: DeserializeOwned,
        F: Fn(S) -> T + Send + Sync + 'static,
    {
        let decoder: Decoder<T> = Arc::new(move |content: Value| -> DataResult<T> {
            let value: S = serde_json::from_value(content)?;
            Ok(wrap(value))
        });
        self.decoders.insert(alias.to_string(), decoder);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    pub fn decode(&self, content: Value) -> DataResult<T> {
        let alias = match content.get(&self.discriminator) {
            Some(Value::String(alias)) => alias.clone(),
            Some(other) => {
                log::error!("Discriminator {} is not a string: {}", self.discriminator, other);
                return Err(DataError::new(
                    &format!("Discriminator field {} must be a string", self.discriminator),
                    ErrorKind::ObjectMapping,
                ));
            }
            None => {
                log::error!("Document has no discriminator field {}", self.discriminator);
                return Err(DataError::new(
                    &format!("Missing discriminator field {}", self.discriminator),
                    ErrorKind::ObjectMapping,
                ));
            }
        };

        match self.decoders.get(&alias) {
            Some(decoder) => decoder(content),
            None => {
                log::error!("No type registered for alias {}", alias);
                Err(DataError::new(
                    &format!("Unknown type alias {}", alias),
                    ErrorKind::ObjectMapping,
                ))
            }
        }
    }
}
