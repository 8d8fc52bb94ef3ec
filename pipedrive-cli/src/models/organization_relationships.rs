//! Organization relationships: parent/child or lateral links between two
//! organizations

use serde_json::json;

use crate::api::{ApiVersion, Params, PipedriveClient};
use crate::error::{Error, Result};
use crate::orm::fields::FieldDescriptor as F;
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, V1_ONLY};
use crate::orm::validators;

pub struct OrganizationRelationships;

pub type OrganizationRelationship = Model<OrganizationRelationships>;

static ORGANIZATION_RELATIONSHIPS: EntitySchema = EntitySchema::new(
    "OrganizationRelationships",
    "organizationRelationships",
    &[
        F::text("type")
            .named("relationship_type")
            .with_validators(&[validators::relationship_type]),
        F::integer("rel_owner_org_id"),
        F::integer("rel_linked_org_id"),
        F::text("related_organization_name").readonly(),
        F::text("calculated_type").readonly(),
        F::integer("calculated_related_org_id").readonly(),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::boolean("active_flag").readonly(),
    ],
    Endpoints::uniform(V1_ONLY).without_batch_delete(),
);

impl Entity for OrganizationRelationships {
    fn schema() -> &'static EntitySchema {
        &ORGANIZATION_RELATIONSHIPS
    }
}

impl OrganizationRelationships {
    /// Every relationship of one organization
    pub async fn for_organization(client: &PipedriveClient, org_id: i64) -> Result<Vec<OrganizationRelationship>> {
        OrganizationRelationship::all(client, &Params::new().with("org_id", org_id)).await
    }

    /// One relationship, with the calculated fields seen from `org_id`
    pub async fn get_from(client: &PipedriveClient, id: i64, org_id: i64) -> Result<OrganizationRelationship> {
        let uri = format!("{}/{}", ORGANIZATION_RELATIONSHIPS.entity_name, id);
        let response = client
            .get(ApiVersion::V1, &uri, &Params::new().with("org_id", org_id))
            .await?;
        let record = response
            .data
            .ok_or_else(|| Error::UnexpectedResponse(format!("{} returned no record", uri)))?;
        OrganizationRelationship::from_record(&record)
    }

    /// Link two organizations; with `parent` the owner is the parent
    pub async fn link(
        client: &PipedriveClient,
        relationship_type: &str,
        owner_org_id: i64,
        linked_org_id: i64,
    ) -> Result<OrganizationRelationship> {
        let mut relationship = OrganizationRelationship::with_values([
            ("relationship_type", json!(relationship_type)),
            ("rel_owner_org_id", json!(owner_org_id)),
            ("rel_linked_org_id", json!(linked_org_id)),
        ])?;
        relationship.save(client, false).await?;
        Ok(relationship)
    }
}
