//! Terminal output

use anyhow::Result;
use colored::*;
use serde_json::Value as JsonValue;

use crate::api::ApiVersion;
use crate::models;
use crate::orm::{EntitySchema, Operation, SaveResult};
use crate::orm::types::SearchResult;

const OPERATIONS: [Operation; 6] = [
    Operation::Get,
    Operation::All,
    Operation::Save,
    Operation::Update,
    Operation::Delete,
    Operation::BatchDelete,
];

pub fn print_json(value: &JsonValue) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `v1,v2` or `-` when the operation is not available
pub fn versions_label(versions: &[ApiVersion]) -> String {
    if versions.is_empty() {
        return "-".to_string();
    }
    versions
        .iter()
        .map(ApiVersion::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn print_entities() {
    print!("{:<16}", "ENTITY".bold());
    for operation in OPERATIONS {
        print!("{:<14}", operation.operation_type().to_uppercase().bold());
    }
    println!();

    for schema in models::all_schemas() {
        print!("{:<16}", schema.entity_name.cyan());
        for operation in OPERATIONS {
            let label = versions_label(schema.endpoints.versions(operation));
            if label == "-" {
                print!("{:<14}", label.dimmed());
            } else {
                print!("{:<14}", label);
            }
        }
        println!();
    }
}

pub fn print_fields(schema: &EntitySchema) {
    println!(
        "{} ({}), id field: {}",
        schema.name.bright_green().bold(),
        schema.entity_name,
        schema.id_field.yellow()
    );
    for field in schema.fields {
        let mut flags = Vec::new();
        if field.readonly {
            flags.push("readonly");
        }
        if field.custom {
            flags.push("custom");
        }
        if !field.validate_type {
            flags.push("unchecked");
        }
        let name = if field.attribute == field.field_name {
            field.attribute.to_string()
        } else {
            format!("{} ({})", field.attribute, field.field_name)
        };
        println!(
            "  {:<32} {:<28} {}",
            name.cyan(),
            field.kind.descriptor_name(),
            flags.join(", ").dimmed()
        );
    }
}

pub fn print_save_result(result: &SaveResult) {
    let action = match (result.created, result.updated) {
        (true, _) => "Created".green().bold(),
        (false, true) => "Updated".yellow().bold(),
        (false, false) => "Unchanged".dimmed(),
    };
    let fields: Vec<&str> = result.field_names.iter().map(String::as_str).collect();
    println!("{} {} [{}]", action, result.id, fields.join(", "));
}

pub fn print_search_results(results: &[SearchResult]) {
    if results.is_empty() {
        println!("{}", "No results".dimmed());
        return;
    }
    for result in results {
        let Some(item) = &result.item else { continue };
        let label = item
            .title
            .as_deref()
            .or(item.name.as_deref())
            .unwrap_or("(untitled)");
        let id = item.id.as_ref().map(ToString::to_string).unwrap_or_default();
        println!(
            "{:<14} {:<10} {} {}",
            item.item_type.as_deref().unwrap_or("?").cyan(),
            id,
            label,
            result
                .result_score
                .map(|s| format!("({:.2})", s))
                .unwrap_or_default()
                .dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_label() {
        assert_eq!(versions_label(&[ApiVersion::V1, ApiVersion::V2]), "v1,v2");
        assert_eq!(versions_label(&[]), "-");
    }
}
