use super::DISCRIMINATOR_FIELD;
use crate::errors::{DataError, DataResult, ErrorKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A type stored as one JSON document per instance.
///
/// Only [`id`](Entity::id) and [`set_id`](Entity::set_id) must be provided;
/// every other method has a default derived from the type name and serde.
///
/// # Examples
///
/// ```rust,ignore
/// use marklogic_data::convert::Entity;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Car {
///     id: Option<String>,
///     make: String,
/// }
///
/// impl Entity for Car {
///     fn id(&self) -> Option<String> {
///         self.id.clone()
///     }
///
///     fn set_id(&mut self, id: String) {
///         self.id = Some(id);
///     }
/// }
///
/// assert_eq!(Car::uri_for("42"), "/Car/42.json");
/// ```
pub trait Entity: Serialize + DeserializeOwned {
    fn id(&self) -> Option<String>;

    fn set_id(&mut self, id: String);

    /// Logical type name; also the default collection.
    fn entity_name() -> String {
        let full = std::any::type_name::<Self>();
        let name = full.split('<').next().unwrap_or(full);
        name.rsplit("::").next().unwrap_or(name).to_string()
    }

    /// Collections every document of this type is tagged with.
    fn collections() -> Vec<String> {
        vec![Self::entity_name()]
    }

    /// Discriminator written into the content so the document can be decoded
    /// through a [`TypeRegistry`](super::TypeRegistry).
    fn type_alias() -> Option<String> {
        None
    }

    fn uri_for(id: &str) -> String {
        format!("/{}/{}.json", Self::entity_name(), id)
    }

    fn to_content(&self) -> DataResult<Value> {
        let mut content = serde_json::to_value(self)?;
        if let Some(alias) = Self::type_alias() {
            match content.as_object_mut() {
                Some(object) => {
                    object.insert(DISCRIMINATOR_FIELD.to_string(), Value::String(alias));
                }
                None => {
                    log::error!("Entity {} does not serialize to an object", Self::entity_name());
                    return Err(DataError::new(
                        "A typed entity must serialize to a JSON object",
                        ErrorKind::ObjectMapping,
                    ));
                }
            }
        }
        Ok(content)
    }

    fn from_content(content: Value) -> DataResult<Self> {
        Ok(serde_json::from_value(content)?)
    }
}
