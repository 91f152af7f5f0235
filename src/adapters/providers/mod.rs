//! Course catalog adapters.
//!
//! Each adapter maps one provider's payload onto [`CourseRecord`]. Records
//! without an id or a title are dropped; every other missing field gets a
//! provider-specific default.
//!
//! [`CourseRecord`]: crate::domain::model::CourseRecord

pub mod catalog;
pub mod edx;
pub mod mit_ocw;
pub mod openstax;

pub use catalog::CatalogStore;
pub use edx::EdxProvider;
pub use mit_ocw::MitOcwProvider;
pub use openstax::OpenStaxProvider;

use crate::domain::model::Provider;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Provider ids show up as strings or numbers.
pub(crate) fn id_from_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Strings as-is, numbers and booleans stringified, anything else `None`.
pub(crate) fn text_from_value(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    non_empty(Some(text))
}

/// 評分可能是數字或數字字串，其他型別視為缺值
pub(crate) fn rating_from_value(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decodes each entry on its own so one odd record never costs the whole page.
pub(crate) fn decode_each<T: DeserializeOwned>(provider: Provider, items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if decoded.len() < total {
        tracing::debug!("{}: skipped {} undecodable records", provider, total - decoded.len());
    }
    decoded
}
