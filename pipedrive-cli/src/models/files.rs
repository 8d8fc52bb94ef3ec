//! Files attached to deals, persons, organizations, activities, products
//! and leads
//!
//! Uploads are multipart and property updates are form-encoded, so neither
//! goes through [`Model::save`].

use std::collections::BTreeSet;

use crate::api::{ApiRequest, ApiVersion, FilePart, Method, Params, PipedriveClient};
use crate::error::{Error, Result};
use crate::orm::fields::FieldDescriptor as F;
use crate::orm::model::{Model, SaveResult};
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, Operation, V1_ONLY};

pub struct Files;

pub type File = Model<Files>;

/// Form fields an upload may carry to link the file to a record
pub const UPLOAD_LINKS: &[&str] = &["deal_id", "person_id", "org_id", "product_id", "activity_id", "lead_id"];

static FILES: EntitySchema = EntitySchema::new(
    "Files",
    "files",
    &[
        F::integer("user_id").readonly(),
        F::integer("deal_id").readonly(),
        F::integer("person_id").readonly(),
        F::integer("org_id").readonly(),
        F::integer("product_id").readonly(),
        F::integer("activity_id").readonly(),
        F::text("lead_id").readonly(),
        F::integer("log_id").readonly(),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::text("file_name").readonly(),
        F::text("file_type").readonly(),
        F::integer("file_size").readonly(),
        F::boolean("active_flag").readonly(),
        F::boolean("inline_flag").readonly(),
        F::text("remote_location").readonly(),
        F::text("remote_id").readonly(),
        F::text("cid").readonly(),
        F::text("s3_bucket").readonly(),
        F::text("mail_message_id").readonly(),
        F::text("mail_template_id").readonly(),
        F::text("deal_name").readonly(),
        F::text("person_name").readonly(),
        F::text("lead_name").readonly(),
        F::text("org_name").readonly(),
        F::text("product_name").readonly(),
        F::text("url").readonly(),
        F::text("name"),
        F::text("description"),
    ],
    Endpoints {
        get: V1_ONLY,
        all: V1_ONLY,
        delete: V1_ONLY,
        ..Endpoints::uniform(NONE)
    },
);

impl Entity for Files {
    fn schema() -> &'static EntitySchema {
        &FILES
    }
}

impl Files {
    /// Upload `file` and link it to the records named in `links`
    /// (`deal_id`, `person_id`, ...)
    pub async fn upload(client: &PipedriveClient, file: FilePart, links: &Params) -> Result<File> {
        let mut request = ApiRequest::new(Method::Post, ApiVersion::V1, FILES.entity_name);
        for (key, value) in links.iter() {
            if !UPLOAD_LINKS.contains(&key.as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "cannot link a file through '{}', expected one of {}",
                    key,
                    UPLOAD_LINKS.join(", ")
                )));
            }
            request = request.form_field(key.as_str(), value);
        }
        let file_name = file.file_name.clone();
        let response = client.send(request.file(file)).await?;
        let record = response
            .data
            .ok_or_else(|| Error::UnexpectedResponse(format!("upload of {} returned no record", file_name)))?;

        let uploaded = File::from_record(&record)?;
        log::info!("Uploaded {} as file {:?}", file_name, uploaded.id());
        Ok(uploaded)
    }
}

impl Model<Files> {
    /// Send the visible name and description, the only mutable properties
    pub async fn update_details(&mut self, client: &PipedriveClient) -> Result<SaveResult> {
        let id = self.require_id(Operation::Update)?.clone();
        let uri = format!("{}/{}", FILES.entity_name, id.path_segment());

        let mut request = ApiRequest::new(Method::Put, ApiVersion::V1, uri);
        let mut field_names = BTreeSet::new();
        for attribute in ["name", "description"] {
            if let Some(value) = self.text(attribute) {
                request = request.form_field(attribute, value);
                field_names.insert(attribute.to_string());
            }
        }
        client.send(request).await?;
        self.mark_clean();

        Ok(SaveResult {
            id,
            created: false,
            updated: true,
            forced: false,
            field_names,
        })
    }

    /// File contents
    pub async fn download(&self, client: &PipedriveClient) -> Result<Vec<u8>> {
        let uri = self.member_uri("download")?;
        client.download(ApiVersion::V1, &uri).await
    }
}
