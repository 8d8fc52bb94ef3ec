//! Lead sources (list only)

use crate::orm::fields::FieldDescriptor as F;
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, V1_ONLY};

pub struct LeadSources;

pub type LeadSource = Model<LeadSources>;

static LEAD_SOURCES: EntitySchema = EntitySchema::new(
    "LeadSources",
    "leadSources",
    &[F::text("name").readonly()],
    Endpoints {
        all: V1_ONLY,
        ..Endpoints::uniform(NONE)
    },
);

impl Entity for LeadSources {
    fn schema() -> &'static EntitySchema {
        &LEAD_SOURCES
    }
}
