//! Products

use super::item_search::search_at;
use crate::api::{Params, PipedriveClient};
use crate::error::Result;
use crate::orm::fields::{ElementKind, FieldDescriptor as F};
use crate::orm::model::Model;
use crate::orm::schema::{BOTH, Endpoints, Entity, EntitySchema};
use crate::orm::types::{SearchResult, StructKind};
use crate::orm::validators;

pub struct Products;

pub type Product = Model<Products>;

static PRODUCTS: EntitySchema = EntitySchema::new(
    "Products",
    "products",
    &[
        F::text("name").with_validators(&[validators::non_empty_text]),
        F::text("code"),
        F::text("description"),
        F::text("unit"),
        F::number("tax"),
        F::text("category"),
        F::boolean("is_linkable"),
        F::boolean("is_deleted").readonly(),
        F::integer("visible_to").with_validators(&[validators::visible_to]),
        F::integer("owner_id").readonly(),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::text("billing_frequency"),
        F::integer("billing_frequency_cycles"),
        F::list("prices", ElementKind::Struct(StructKind::Price)),
        F::json("custom_fields"),
    ],
    Endpoints::uniform(BOTH).without_batch_delete(),
);

impl Entity for Products {
    fn schema() -> &'static EntitySchema {
        &PRODUCTS
    }
}

impl Products {
    /// Search products by name, code and custom fields
    pub async fn search(client: &PipedriveClient, term: &str, params: &Params) -> Result<Vec<SearchResult>> {
        search_at(client, "products/search", term, params.clone()).await
    }
}
