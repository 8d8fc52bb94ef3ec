//! Billing add-ons of the company (read only)

use crate::orm::fields::FieldDescriptor as F;
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, V1_ONLY};

pub struct Billing;

pub type BillingAddon = Model<Billing>;

static BILLING: EntitySchema = EntitySchema::new(
    "Billing",
    "billing/subscriptions/addons",
    &[
        // leadbooster_v2, prospector, smart_docs_v2, ...
        F::text("code").readonly(),
    ],
    Endpoints {
        all: V1_ONLY,
        ..Endpoints::uniform(NONE)
    },
);

impl Entity for Billing {
    fn schema() -> &'static EntitySchema {
        &BILLING
    }
}
