//! Currencies (read only)

use crate::api::{Params, PipedriveClient};
use crate::error::Result;
use crate::orm::fields::FieldDescriptor as F;
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, V1_ONLY};

pub struct Currencies;

pub type Currency = Model<Currencies>;

static CURRENCIES: EntitySchema = EntitySchema::new(
    "Currencies",
    "currencies",
    &[
        F::text("code").readonly(),
        F::text("name").readonly(),
        F::integer("decimal_points").readonly(),
        F::text("symbol").readonly(),
        F::boolean("active_flag").readonly(),
        F::boolean("is_custom_flag").readonly(),
    ],
    Endpoints {
        all: V1_ONLY,
        ..Endpoints::uniform(NONE)
    },
);

impl Entity for Currencies {
    fn schema() -> &'static EntitySchema {
        &CURRENCIES
    }
}

impl Currencies {
    /// Currencies of the account, optionally filtered by a name or code term
    pub async fn list(client: &PipedriveClient, term: Option<&str>) -> Result<Vec<Currency>> {
        let term = term.map(str::trim).filter(|t| !t.is_empty());
        Currency::all(client, &Params::new().with_opt("term", term)).await
    }
}
