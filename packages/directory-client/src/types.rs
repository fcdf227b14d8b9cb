//! Borrowed views over the raw participant directory JSON.
//!
//! The directory is an external, uncontrolled API whose schema drifts, so
//! participants are kept as raw `serde_json::Value` and read through these
//! views. Missing (or `null`) fields read as empty; a field present with the
//! wrong JSON type is a [`ShapeError`] carrying the path that failed.

use serde_json::{Map, Value};
use thiserror::Error;

pub const ORGANISATION_ID: &str = "OrganisationId";
pub const ORGANISATION_NAME: &str = "OrganisationName";
pub const AUTHORISATION_SERVERS: &str = "AuthorisationServers";
pub const CUSTOMER_FRIENDLY_NAME: &str = "CustomerFriendlyName";
pub const API_RESOURCES: &str = "ApiResources";
pub const API_FAMILY_TYPE: &str = "ApiFamilyType";
pub const API_DISCOVERY_ENDPOINTS: &str = "ApiDiscoveryEndpoints";
pub const API_ENDPOINT: &str = "ApiEndpoint";

/// A directory field had an unexpected JSON type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: expected {expected}, found {found}")]
pub struct ShapeError {
    pub path: String,
    pub expected: &'static str,
    pub found: &'static str,
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ShapeError> {
    value.as_object().ok_or_else(|| ShapeError {
        path: path.to_string(),
        expected: "object",
        found: kind(value),
    })
}

fn array_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a [Value], ShapeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(ShapeError {
            path: format!("{}.{}", path, key),
            expected: "array",
            found: kind(other),
        }),
    }
}

fn str_field<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<&'a str>, ShapeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(ShapeError {
            path: format!("{}.{}", path, key),
            expected: "string",
            found: kind(other),
        }),
    }
}

/// An institution registered in the directory.
#[derive(Debug, Clone)]
pub struct Participant<'a> {
    obj: &'a Map<String, Value>,
    path: String,
}

impl<'a> Participant<'a> {
    /// View the `index`-th element of the participants array.
    pub fn from_value(value: &'a Value, index: usize) -> Result<Self, ShapeError> {
        let path = format!("participants[{}]", index);
        let obj = as_object(value, &path)?;
        Ok(Self { obj, path })
    }

    pub fn organisation_id(&self) -> Result<Option<&'a str>, ShapeError> {
        str_field(self.obj, ORGANISATION_ID, &self.path)
    }

    pub fn organisation_name(&self) -> Result<Option<&'a str>, ShapeError> {
        str_field(self.obj, ORGANISATION_NAME, &self.path)
    }

    pub fn authorisation_servers(&self) -> Result<Vec<AuthorisationServer<'a>>, ShapeError> {
        array_field(self.obj, AUTHORISATION_SERVERS, &self.path)?
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let path = format!("{}.{}[{}]", self.path, AUTHORISATION_SERVERS, i);
                let obj = as_object(value, &path)?;
                Ok(AuthorisationServer { obj, path })
            })
            .collect()
    }
}

/// Authorisation server nested under a participant. Only traversed.
#[derive(Debug, Clone)]
pub struct AuthorisationServer<'a> {
    obj: &'a Map<String, Value>,
    path: String,
}

impl<'a> AuthorisationServer<'a> {
    /// Brand shown to customers for this server.
    pub fn customer_friendly_name(&self) -> Result<Option<&'a str>, ShapeError> {
        str_field(self.obj, CUSTOMER_FRIENDLY_NAME, &self.path)
    }

    pub fn api_resources(&self) -> Result<Vec<ApiResource<'a>>, ShapeError> {
        array_field(self.obj, API_RESOURCES, &self.path)?
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let path = format!("{}.{}[{}]", self.path, API_RESOURCES, i);
                let obj = as_object(raw, &path)?;
                Ok(ApiResource { raw, obj, path })
            })
            .collect()
    }
}

/// One exposed API family. The raw value is what gets persisted.
#[derive(Debug, Clone)]
pub struct ApiResource<'a> {
    raw: &'a Value,
    obj: &'a Map<String, Value>,
    path: String,
}

impl<'a> ApiResource<'a> {
    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn family_type(&self) -> Result<Option<&'a str>, ShapeError> {
        str_field(self.obj, API_FAMILY_TYPE, &self.path)
    }

    /// URL of the first discovery endpoint.
    ///
    /// Later endpoints are neither read nor validated. Returns `None` when the
    /// list is empty or the first entry has no `ApiEndpoint`.
    pub fn first_endpoint_url(&self) -> Result<Option<&'a str>, ShapeError> {
        let endpoints = array_field(self.obj, API_DISCOVERY_ENDPOINTS, &self.path)?;
        let Some(first) = endpoints.first() else {
            return Ok(None);
        };
        let path = format!("{}.{}[0]", self.path, API_DISCOVERY_ENDPOINTS);
        let obj = as_object(first, &path)?;
        str_field(obj, API_ENDPOINT, &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null_fields_read_as_empty() {
        let value = json!({ "OrganisationId": "org-1", "AuthorisationServers": null });
        let participant = Participant::from_value(&value, 0).unwrap();

        assert_eq!(participant.organisation_id().unwrap(), Some("org-1"));
        assert_eq!(participant.organisation_name().unwrap(), None);
        assert!(participant.authorisation_servers().unwrap().is_empty());
    }

    #[test]
    fn test_wrong_type_reports_path() {
        let value = json!({ "AuthorisationServers": [ { "ApiResources": "nope" } ] });
        let participant = Participant::from_value(&value, 4).unwrap();
        let servers = participant.authorisation_servers().unwrap();

        let err = servers[0].api_resources().unwrap_err();
        assert_eq!(err.path, "participants[4].AuthorisationServers[0].ApiResources");
        assert_eq!(err.expected, "array");
        assert_eq!(err.found, "string");
    }

    #[test]
    fn test_participant_must_be_object() {
        let value = json!("not a participant");
        let err = Participant::from_value(&value, 2).unwrap_err();
        assert_eq!(err.path, "participants[2]");
        assert_eq!(err.found, "string");
    }

    #[test]
    fn test_first_endpoint_only() {
        let value = json!({
            "AuthorisationServers": [{
                "ApiResources": [{
                    "ApiDiscoveryEndpoints": [
                        { "ApiEndpoint": "https://a.example/first" },
                        { "ApiEndpoint": 42 }
                    ]
                }]
            }]
        });
        let participant = Participant::from_value(&value, 0).unwrap();
        let servers = participant.authorisation_servers().unwrap();
        let resources = servers[0].api_resources().unwrap();

        assert_eq!(
            resources[0].first_endpoint_url().unwrap(),
            Some("https://a.example/first")
        );
    }

    #[test]
    fn test_first_endpoint_without_url() {
        let value = json!({
            "AuthorisationServers": [{ "ApiResources": [{ "ApiDiscoveryEndpoints": [{}] }] }]
        });
        let participant = Participant::from_value(&value, 0).unwrap();
        let servers = participant.authorisation_servers().unwrap();
        let resources = servers[0].api_resources().unwrap();

        assert_eq!(resources[0].first_endpoint_url().unwrap(), None);
    }
}
