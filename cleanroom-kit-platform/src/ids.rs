//! Validated identifier newtypes for platform resources.
//!
//! Every identifier is checked once at construction; the rest of the
//! workspace passes these types around instead of raw strings. `Display`
//! renders the platform's canonical spelling (dotted paths for warehouse
//! objects, `projects/{p}/locations/{l}/...` resource names for catalog
//! objects), which is also what the state file and log lines show.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected identifier, reported with the rule that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} `{value}`: {reason}")]
pub struct InvalidId {
    kind: &'static str,
    value: String,
    reason: &'static str,
}

impl InvalidId {
    fn new(kind: &'static str, value: &str, reason: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            reason,
        }
    }
}

fn check_object_name(kind: &'static str, value: &str) -> Result<(), InvalidId> {
    if value.is_empty() {
        return Err(InvalidId::new(kind, value, "must not be empty"));
    }
    if value.len() > 1024 {
        return Err(InvalidId::new(kind, value, "must be at most 1024 characters"));
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(InvalidId::new(
            kind,
            value,
            "may only contain letters, digits, and underscores",
        ));
    }
    Ok(())
}

fn check_catalog_id(kind: &'static str, value: &str) -> Result<(), InvalidId> {
    if value.is_empty() {
        return Err(InvalidId::new(kind, value, "must not be empty"));
    }
    if value.len() > 100 {
        return Err(InvalidId::new(kind, value, "must be at most 100 characters"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(InvalidId::new(
            kind,
            value,
            "may only contain lowercase letters, digits, and underscores",
        ));
    }
    if !value.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(InvalidId::new(kind, value, "must start with a letter"));
    }
    Ok(())
}

/// Owning project of warehouse datasets and catalog exchanges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidId> {
        let value = value.into();
        if value.is_empty() {
            return Err(InvalidId::new("project id", &value, "must not be empty"));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(InvalidId::new(
                "project id",
                &value,
                "may only contain lowercase letters, digits, and hyphens",
            ));
        }
        if !value.starts_with(|c: char| c.is_ascii_lowercase()) {
            return Err(InvalidId::new("project id", &value, "must start with a letter"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog region such as `US` or `eu-west1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location(String);

impl Location {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidId> {
        let value = value.into();
        if value.is_empty() {
            return Err(InvalidId::new("location", &value, "must not be empty"));
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(InvalidId::new(
                "location",
                &value,
                "may only contain letters, digits, and hyphens",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named collection of tables within one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetId {
    project: ProjectId,
    name: String,
}

impl DatasetId {
    pub fn new(project: ProjectId, name: impl Into<String>) -> Result<Self, InvalidId> {
        let name = name.into();
        check_object_name("dataset name", &name)?;
        Ok(Self { project, name })
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified id of a table inside this dataset.
    pub fn table(&self, name: impl Into<String>) -> Result<TableId, InvalidId> {
        TableId::new(self.clone(), name)
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.project, self.name)
    }
}

/// A table or view, qualified down to the owning project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableId {
    dataset: DatasetId,
    name: String,
}

impl TableId {
    pub fn new(dataset: DatasetId, name: impl Into<String>) -> Result<Self, InvalidId> {
        let name = name.into();
        check_object_name("table name", &name)?;
        Ok(Self { dataset, name })
    }

    pub fn dataset(&self) -> &DatasetId {
        &self.dataset
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.name)
    }
}

/// Project and location pair under which catalog resources live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareScope {
    project: ProjectId,
    location: Location,
}

impl ShareScope {
    pub fn new(project: ProjectId, location: Location) -> Self {
        Self { project, location }
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn exchange(&self, id: impl Into<String>) -> Result<ExchangeName, InvalidId> {
        ExchangeName::new(self.clone(), id)
    }
}

impl fmt::Display for ShareScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projects/{}/locations/{}", self.project, self.location)
    }
}

/// Full resource name of a data exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeName {
    scope: ShareScope,
    id: String,
}

impl ExchangeName {
    pub fn new(scope: ShareScope, id: impl Into<String>) -> Result<Self, InvalidId> {
        let id = id.into();
        check_catalog_id("exchange id", &id)?;
        Ok(Self { scope, id })
    }

    pub fn scope(&self) -> &ShareScope {
        &self.scope
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn listing(&self, id: impl Into<String>) -> Result<ListingName, InvalidId> {
        ListingName::new(self.clone(), id)
    }
}

impl fmt::Display for ExchangeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/dataExchanges/{}", self.scope, self.id)
    }
}

/// Full resource name of a listing within an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingName {
    exchange: ExchangeName,
    id: String,
}

impl ListingName {
    pub fn new(exchange: ExchangeName, id: impl Into<String>) -> Result<Self, InvalidId> {
        let id = id.into();
        check_catalog_id("listing id", &id)?;
        Ok(Self { exchange, id })
    }

    pub fn exchange(&self) -> &ExchangeName {
        &self.exchange
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ListingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/listings/{}", self.exchange, self.id)
    }
}

/// Identity a grant is issued to, e.g. `analyst@merchant.example.com`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Principal(String);

impl Principal {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidId> {
        let value = value.into();
        if value.is_empty() {
            return Err(InvalidId::new("principal", &value, "must not be empty"));
        }
        if !value.contains('@') {
            return Err(InvalidId::new(
                "principal",
                &value,
                "must be an email-style identity",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
