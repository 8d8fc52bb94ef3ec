//! Pipedrive resource models
//!
//! One marker type per entity, bound to its static [`EntitySchema`], plus a
//! `Model` alias for a single record (`Deal = Model<Deals>`). Routes that do
//! not fit the generic CRUD operations live on the marker type (collection
//! routes) or on the alias (member routes).

use serde_json::{Value as JsonValue, json};

use crate::api::{ApiVersion, PipedriveClient};
use crate::error::Result;
use crate::orm::{Entity, EntitySchema};

pub mod activities;
pub mod activity_fields;
pub mod activity_types;
pub mod billing;
pub mod call_logs;
pub mod currencies;
pub mod deal_fields;
pub mod deals;
pub mod files;
pub mod filters;
pub mod goals;
pub mod item_search;
pub mod lead_fields;
pub mod lead_labels;
pub mod lead_sources;
pub mod leads;
pub mod mail_threads;
pub mod organization_relationships;
pub mod organizations;
pub mod person_fields;
pub mod persons;
pub mod pipelines;
pub mod products;
pub mod stages;
pub mod subscriptions;

pub use activities::{Activities, Activity};
pub use activity_fields::{ActivityField, ActivityFields};
pub use activity_types::{ActivityType, ActivityTypes};
pub use billing::{Billing, BillingAddon};
pub use call_logs::{CallLog, CallLogs};
pub use currencies::{Currencies, Currency};
pub use deal_fields::{DealField, DealFields};
pub use deals::{Deal, Deals};
pub use files::{File, Files};
pub use filters::{Filter, Filters};
pub use goals::{Goal, Goals};
pub use item_search::ItemSearch;
pub use lead_fields::{LeadField, LeadFields};
pub use lead_labels::{LeadLabel, LeadLabels};
pub use lead_sources::{LeadSource, LeadSources};
pub use leads::{Lead, Leads};
pub use mail_threads::{MailThread, MailThreads};
pub use organization_relationships::{OrganizationRelationship, OrganizationRelationships};
pub use organizations::{Organization, Organizations};
pub use person_fields::{PersonField, PersonFields};
pub use persons::{Person, Persons};
pub use pipelines::{Pipeline, Pipelines};
pub use products::{Product, Products};
pub use stages::{Stage, Stages};
pub use subscriptions::{Subscription, Subscriptions};

/// Every entity schema, in resource path order
pub fn all_schemas() -> Vec<&'static EntitySchema> {
    let mut schemas = vec![
        Activities::schema(),
        ActivityFields::schema(),
        ActivityTypes::schema(),
        Billing::schema(),
        CallLogs::schema(),
        Currencies::schema(),
        DealFields::schema(),
        Deals::schema(),
        Files::schema(),
        Filters::schema(),
        Goals::schema(),
        ItemSearch::schema(),
        LeadFields::schema(),
        LeadLabels::schema(),
        LeadSources::schema(),
        Leads::schema(),
        MailThreads::schema(),
        OrganizationRelationships::schema(),
        Organizations::schema(),
        PersonFields::schema(),
        Persons::schema(),
        Pipelines::schema(),
        Products::schema(),
        Stages::schema(),
        Subscriptions::schema(),
    ];
    schemas.sort_by_key(|schema| schema.entity_name.to_ascii_lowercase());
    schemas
}

/// Schema by resource path (`deals`, `leadLabels`) or display name, ignoring
/// case
pub fn find_schema(name: &str) -> Option<&'static EntitySchema> {
    all_schemas().into_iter().find(|schema| {
        schema.entity_name.eq_ignore_ascii_case(name) || schema.name.eq_ignore_ascii_case(name)
    })
}

/// `PUT {entity}/{id}/merge` on v1, shared by deals, persons and organizations
pub(crate) async fn merge_records(client: &PipedriveClient, uri: &str, merge_with_id: i64) -> Result<JsonValue> {
    let response = client
        .put(ApiVersion::V1, uri, json!({ "merge_with_id": merge_with_id }))
        .await?;
    Ok(response.into_value())
}
