use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Category assigned when the language model gives no usable answer.
pub const FALLBACK_CATEGORY: &str = "Иное";

/// Result of the structured-extraction step for a single document.
///
/// On the wire an unstructured result is the object `{"raw": "<text>"}`; any other
/// object is treated as the structured field map.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedFields {
    Structured(Map<String, Value>),
    Unstructured { raw: String },
}

impl ExtractedFields {
    pub fn unstructured(raw: impl Into<String>) -> Self {
        Self::Unstructured { raw: raw.into() }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Structured(fields) => fields.get(key),
            Self::Unstructured { .. } => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Structured(fields) => Value::Object(fields.clone()),
            Self::Unstructured { raw } => {
                let mut wrapper = Map::new();
                wrapper.insert("raw".to_string(), Value::String(raw.clone()));
                Value::Object(wrapper)
            }
        }
    }

    fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut fields) => match fields.remove("raw") {
                Some(Value::String(raw)) => Self::Unstructured { raw },
                Some(other) => Self::Unstructured {
                    raw: other.to_string(),
                },
                None => Self::Structured(fields),
            },
            Value::Null => Self::default(),
            Value::String(raw) => Self::Unstructured { raw },
            other => Self::Unstructured {
                raw: other.to_string(),
            },
        }
    }
}

impl Default for ExtractedFields {
    fn default() -> Self {
        Self::Structured(Map::new())
    }
}

impl Serialize for ExtractedFields {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ExtractedFields {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

/// Fully resolved per-document record consumed by the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentClassification {
    pub filename: String,
    pub detected_category: String,
    #[serde(default)]
    pub claimed_category: String,
    #[serde(default)]
    pub extracted_fields: ExtractedFields,
    #[serde(default)]
    pub full_text: String,
}
