//! Typed nested records
//!
//! Pipedrive embeds small JSON objects inside records: addresses, monetary
//! amounts, phone/email entries, participants and so on. Each has a serde
//! struct here with every field optional, so partial payloads still parse and
//! unknown keys are ignored. [`Struct`] is the tagged union the ORM stores.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::value::{RecordId, Value};

/// Phone number or email entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelValue {
    pub label: Option<String>,
    pub value: Option<String>,
    pub primary: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub value: Option<String>,
    pub street_number: Option<String>,
    pub route: Option<String>,
    pub sublocality: Option<String>,
    pub locality: Option<String>,
    pub admin_area_level_1: Option<String>,
    pub admin_area_level_2: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Monetary {
    pub amount: Option<f64>,
    pub currency: Option<String>,
}

/// Product price in one currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub product_id: Option<i64>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub cost: Option<f64>,
    pub direct_cost: Option<f64>,
    pub notes: Option<String>,
}

/// Activity participant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub person_id: Option<i64>,
    pub primary: Option<bool>,
}

/// Activity attendee
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub is_organizer: Option<bool>,
    pub person_id: Option<i64>,
    pub user_id: Option<i64>,
}

/// Product custom field definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCustomField {
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    pub description: Option<String>,
    pub additional_properties: Option<Map<String, JsonValue>>,
}

/// Reference to another record as embedded in search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRef {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Owner of a search result: either an embedded reference or a bare id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemOwner {
    Ref(ItemRef),
    Id(RecordId),
}

/// Item returned by the search endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: Option<RecordId>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub code: Option<JsonValue>,
    pub address: Option<String>,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub visible_to: Option<i64>,
    pub owner: Option<ItemOwner>,
    pub stage: Option<ItemRef>,
    pub person: Option<ItemRef>,
    pub organization: Option<ItemRef>,
    #[serde(default)]
    pub phones: Vec<JsonValue>,
    #[serde(default)]
    pub emails: Vec<JsonValue>,
    #[serde(default)]
    pub custom_fields: Vec<JsonValue>,
    #[serde(default)]
    pub notes: Vec<JsonValue>,
    pub is_archived: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub item: Option<SearchItem>,
    pub result_score: Option<f64>,
}

/// Option of an enum or set field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: Option<RecordId>,
    pub label: Option<String>,
    pub color: Option<String>,
}

/// Sub-field of a composite field (e.g. the parts of an address)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subfield {
    pub field_code: Option<String>,
    pub field_name: Option<String>,
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalAssignee {
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub assignee_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalType {
    pub name: Option<String>,
    pub params: Option<Map<String, JsonValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalDuration {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityInterval {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub target: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub currency_id: Option<i64>,
    pub intervals: Option<Vec<SeasonalityInterval>>,
    pub tracking_metric: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedOutcome {
    pub target: Option<f64>,
    pub tracking_metric: Option<String>,
    pub currency_id: Option<i64>,
}

/// Sender or recipient of a mail message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MailParty {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email_address: Option<String>,
    pub message_time: Option<i64>,
    pub linked_person_id: Option<i64>,
    pub linked_person_name: Option<String>,
    pub linked_organization_id: Option<i64>,
    pub mail_message_party_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MailParties {
    pub to: Option<Vec<MailParty>>,
    pub cc: Option<Vec<MailParty>>,
    pub bcc: Option<Vec<MailParty>>,
    pub from: Option<Vec<MailParty>>,
}

/// One entry of a record's change log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub field_key: Option<String>,
    pub old_value: Option<JsonValue>,
    pub new_value: Option<JsonValue>,
    pub actor_user_id: Option<i64>,
    pub time: Option<String>,
    pub change_source: Option<String>,
    pub change_source_user_agent: Option<String>,
    pub is_bulk_update_flag: Option<bool>,
}

macro_rules! typed_structs {
    ($($variant:ident),* $(,)?) => {
        /// Which nested record a struct-typed field holds
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StructKind {
            $($variant),*
        }

        /// A nested record value
        #[derive(Debug, Clone, PartialEq)]
        pub enum Struct {
            $($variant($variant)),*
        }

        impl StructKind {
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            /// The all-`None` record of this kind
            pub fn empty(&self) -> Struct {
                match self {
                    $(Self::$variant => Struct::$variant($variant::default())),*
                }
            }

            /// Deserialize a JSON object into this kind
            pub fn parse(&self, json: &JsonValue) -> Result<Struct, serde_json::Error> {
                if !json.is_object() {
                    return Err(<serde_json::Error as serde::de::Error>::custom(format!(
                        "expected a JSON object for {}",
                        self.name()
                    )));
                }
                match self {
                    $(Self::$variant => {
                        serde_json::from_value::<$variant>(json.clone()).map(Struct::$variant)
                    }),*
                }
            }
        }

        impl Struct {
            pub fn kind(&self) -> StructKind {
                match self {
                    $(Self::$variant(_) => StructKind::$variant),*
                }
            }

            /// Serialize with absent (`None`) sub-fields omitted
            pub fn to_json(&self) -> JsonValue {
                let json = match self {
                    $(Self::$variant(v) => serde_json::to_value(v)),*
                };
                json.map(strip_nulls).unwrap_or(JsonValue::Null)
            }
        }

        $(
            impl From<$variant> for Struct {
                fn from(v: $variant) -> Self {
                    Struct::$variant(v)
                }
            }

            impl From<$variant> for Value {
                fn from(v: $variant) -> Self {
                    Value::Struct(Struct::$variant(v))
                }
            }
        )*
    };
}

typed_structs! {
    LabelValue,
    Address,
    Monetary,
    Price,
    Participant,
    Attendee,
    ProductCustomField,
    ItemRef,
    SearchItem,
    SearchResult,
    FieldOption,
    Subfield,
    GoalAssignee,
    GoalType,
    GoalDuration,
    Seasonality,
    ExpectedOutcome,
    MailParties,
    ChangeLogEntry,
}

fn strip_nulls(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}
