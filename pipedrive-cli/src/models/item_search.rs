//! Search across deals, persons, organizations, products, leads and files

use futures::StreamExt;
use serde_json::Value as JsonValue;

use crate::api::{ApiVersion, Params, PipedriveClient};
use crate::error::{Error, Result};
use crate::orm::fields::{ElementKind, FieldDescriptor};
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE};
use crate::orm::types::{SearchResult, StructKind};

pub const ITEM_TYPES: &[&str] = &[
    "deal",
    "person",
    "organization",
    "product",
    "lead",
    "file",
    "mail_attachment",
    "project",
];

pub struct ItemSearch;

static ITEM_SEARCH: EntitySchema = EntitySchema::new(
    "ItemSearch",
    "itemSearch",
    &[FieldDescriptor::list("items", ElementKind::Struct(StructKind::SearchResult)).readonly()],
    Endpoints::uniform(NONE),
);

impl Entity for ItemSearch {
    fn schema() -> &'static EntitySchema {
        &ITEM_SEARCH
    }
}

impl ItemSearch {
    /// Search every item type, or only `item_types` when not empty
    pub async fn search(
        client: &PipedriveClient,
        term: &str,
        item_types: &[&str],
        params: &Params,
    ) -> Result<Vec<SearchResult>> {
        if let Some(unknown) = item_types.iter().find(|t| !ITEM_TYPES.contains(t)) {
            return Err(Error::InvalidArgument(format!(
                "unknown item type '{}', expected one of {}",
                unknown,
                ITEM_TYPES.join(", ")
            )));
        }
        let mut params = params.clone();
        if !item_types.is_empty() {
            params.insert("item_types", item_types.join(","));
        }
        search_at(client, ITEM_SEARCH.entity_name, term, params).await
    }
}

/// Minimum term length, one character is enough for exact matches
fn check_term(term: &str, params: &Params) -> Result<()> {
    let exact = params.get("exact_match") == Some("true");
    let min = if exact { 1 } else { 2 };
    if term.trim().chars().count() < min {
        return Err(Error::InvalidArgument(format!(
            "search term must be at least {} characters",
            min
        )));
    }
    Ok(())
}

/// Run a v2 search endpoint and collect `data.items` across pages
pub(crate) async fn search_at(
    client: &PipedriveClient,
    uri: &str,
    term: &str,
    params: Params,
) -> Result<Vec<SearchResult>> {
    check_term(term, &params)?;
    let params = params.with("term", term.trim());

    let mut results = Vec::new();
    let mut pages = Box::pin(client.pages(ApiVersion::V2, uri, params));
    while let Some(page) = pages.next().await {
        let page = page?;
        let items = page
            .data
            .as_ref()
            .and_then(|data| data.get("items"))
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default();
        for item in items {
            results.push(serde_json::from_value(item)?);
        }
    }
    log::debug!("{} results for '{}' in {}", results.len(), term, uri);
    Ok(results)
}
