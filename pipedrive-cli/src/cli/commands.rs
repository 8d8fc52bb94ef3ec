//! Command handlers
//!
//! Entity names are resolved to their schema and dispatched to generic
//! handlers over `Model<E>`.

use anyhow::{Context, Result, anyhow, bail};
use colored::*;
use serde_json::Value as JsonValue;

use super::Commands;
use super::output;
use crate::api::{Params, PipedriveClient};
use crate::models::{self, *};
use crate::orm::{BatchDelete, Entity, EntitySchema, FieldKind, Model, RecordId, SaveResult, Value};

/// Run `$handler::<Entity>(args..)` for the entity behind `$schema`
macro_rules! dispatch {
    ($schema:expr, $handler:ident ( $($arg:expr),* $(,)? )) => {
        match $schema.entity_name {
            "activities" => $handler::<Activities>($($arg),*).await,
            "activityFields" => $handler::<ActivityFields>($($arg),*).await,
            "activityTypes" => $handler::<ActivityTypes>($($arg),*).await,
            "billing/subscriptions/addons" => $handler::<Billing>($($arg),*).await,
            "callLogs" => $handler::<CallLogs>($($arg),*).await,
            "currencies" => $handler::<Currencies>($($arg),*).await,
            "dealFields" => $handler::<DealFields>($($arg),*).await,
            "deals" => $handler::<Deals>($($arg),*).await,
            "files" => $handler::<Files>($($arg),*).await,
            "filters" => $handler::<Filters>($($arg),*).await,
            "goals" => $handler::<Goals>($($arg),*).await,
            "itemSearch" => $handler::<ItemSearch>($($arg),*).await,
            "leadFields" => $handler::<LeadFields>($($arg),*).await,
            "leadLabels" => $handler::<LeadLabels>($($arg),*).await,
            "leadSources" => $handler::<LeadSources>($($arg),*).await,
            "leads" => $handler::<Leads>($($arg),*).await,
            "mailbox/mailThreads" => $handler::<MailThreads>($($arg),*).await,
            "organizationRelationships" => $handler::<OrganizationRelationships>($($arg),*).await,
            "organizations" => $handler::<Organizations>($($arg),*).await,
            "personFields" => $handler::<PersonFields>($($arg),*).await,
            "persons" => $handler::<Persons>($($arg),*).await,
            "pipelines" => $handler::<Pipelines>($($arg),*).await,
            "products" => $handler::<Products>($($arg),*).await,
            "stages" => $handler::<Stages>($($arg),*).await,
            "subscriptions" => $handler::<Subscriptions>($($arg),*).await,
            other => Err(anyhow!("No handler for entity '{}'", other)),
        }
    };
}

pub fn schema(name: &str) -> Result<&'static EntitySchema> {
    models::find_schema(name).ok_or_else(|| {
        let known: Vec<_> = models::all_schemas().iter().map(|s| s.entity_name).collect();
        anyhow!("Unknown entity '{}'. Known entities: {}", name, known.join(", "))
    })
}

pub async fn execute(client: &PipedriveClient, command: Commands) -> Result<()> {
    match command {
        Commands::Entities | Commands::Fields { .. } => Ok(()),
        Commands::Get { entity, id } => {
            let record = dispatch!(schema(&entity)?, get_record(client, &id))?;
            output::print_json(&record)
        }
        Commands::List { entity, params, limit } => {
            let params: Params = params.into_iter().collect();
            let mut records = dispatch!(schema(&entity)?, list_records(client, &params))?;
            let total = records.len();
            if let Some(limit) = limit {
                records.truncate(limit);
            }
            output::print_json(&JsonValue::Array(records))?;
            eprintln!("{} {} of {} records", "Listed".green(), limit.map_or(total, |l| l.min(total)), total);
            Ok(())
        }
        Commands::Create { entity, values } => {
            let result = dispatch!(schema(&entity)?, create_record(client, &values))?;
            output::print_save_result(&result);
            Ok(())
        }
        Commands::Update { entity, id, values, force } => {
            let result = dispatch!(schema(&entity)?, update_record(client, &id, &values, force))?;
            output::print_save_result(&result);
            Ok(())
        }
        Commands::Delete { entity, ids } => {
            let deleted = dispatch!(schema(&entity)?, delete_records(client, &ids))?;
            println!("{} {} record(s) from {}", "Deleted".red().bold(), deleted, entity.cyan());
            Ok(())
        }
        Commands::Search { term, item_types, exact } => {
            let item_types: Vec<&str> = item_types.iter().map(String::as_str).collect();
            let params = if exact {
                Params::new().with("exact_match", true)
            } else {
                Params::new()
            };
            let results = ItemSearch::search(client, &term, &item_types, &params)
                .await
                .context("Search failed")?;
            output::print_search_results(&results);
            Ok(())
        }
        Commands::Summary { status, pipeline_id } => {
            let params = Params::new()
                .with_opt("status", status)
                .with_opt("pipeline_id", pipeline_id);
            let summary = Deals::summary(client, &params).await?;
            output::print_json(&summary)
        }
    }
}

pub async fn get_record<E: Entity>(client: &PipedriveClient, id: &str) -> Result<JsonValue> {
    let model = Model::<E>::get(client, RecordId::from(id))
        .await
        .with_context(|| format!("Failed to fetch {} {}", E::schema().name, id))?;
    Ok(model.to_record(false))
}

pub async fn list_records<E: Entity>(client: &PipedriveClient, params: &Params) -> Result<Vec<JsonValue>> {
    let models = Model::<E>::all(client, params)
        .await
        .with_context(|| format!("Failed to list {}", E::schema().name))?;
    Ok(models.iter().map(|m| m.to_record(false)).collect())
}

pub async fn create_record<E: Entity>(client: &PipedriveClient, values: &[String]) -> Result<SaveResult> {
    let mut model = Model::<E>::new();
    assign::<E>(&mut model, values)?;
    Ok(model.save(client, false).await?)
}

pub async fn update_record<E: Entity>(
    client: &PipedriveClient,
    id: &str,
    values: &[String],
    force: bool,
) -> Result<SaveResult> {
    let mut model = Model::<E>::get(client, RecordId::from(id)).await?;
    assign::<E>(&mut model, values)?;
    Ok(model.save(client, force).await?)
}

/// One id deletes a single record, several go through a batch delete
pub async fn delete_records<E: Entity>(client: &PipedriveClient, ids: &[String]) -> Result<usize> {
    match ids {
        [] => bail!("No ids given"),
        [id] => {
            let mut model = Model::<E>::with_id(id.as_str());
            model.delete(client).await?;
            Ok(1)
        }
        ids => {
            let deleted = Model::<E>::batch_delete(client, BatchDelete::ids(ids.iter().map(String::as_str))).await?;
            Ok(deleted.len())
        }
    }
}

/// Apply `attribute=value` assignments. Values are read the way the API
/// would send them: JSON where it parses, plain text otherwise.
fn assign<E: Entity>(model: &mut Model<E>, assignments: &[String]) -> Result<()> {
    for assignment in assignments {
        let (attribute, raw) = super::parse_key_val(assignment).map_err(|e| anyhow!(e))?;
        let value = parse_value::<E>(&attribute, &raw)?;
        model
            .set(&attribute, value)
            .with_context(|| format!("Cannot set '{}'", attribute))?;
    }
    Ok(())
}

pub fn parse_value<E: Entity>(attribute: &str, raw: &str) -> Result<Value> {
    let descriptor = E::schema()
        .descriptor(attribute)
        .ok_or_else(|| anyhow!("{} has no attribute '{}'", E::schema().name, attribute))?;
    if raw.is_empty() || raw == "null" {
        return Ok(Value::Null);
    }
    Ok(match descriptor.kind {
        FieldKind::Text => Value::Text(raw.to_string()),
        _ => match serde_json::from_str::<JsonValue>(raw) {
            Ok(json) => Value::Json(json),
            Err(_) => Value::Text(raw.to_string()),
        },
    })
}
