//! `tenablesc_auditfile`
//!
//! The audit file body comes from a local `path` or inline `content`. It is uploaded
//! first; the audit file record then references the server-side upload. The content
//! digest is tracked in `sha256_sum` so an edited file on disk forces a new upload.

use async_trait::async_trait;
use tenablesc_client::{AuditFile, BaseInfo, ScClient};
use tenablesc_common::crypto::{read_and_hash, sha256_file, sha256_hex};
use tenablesc_core::data::string_of;
use tenablesc_core::{AttrMap, AttrValue, Diagnostic, Diagnostics, Error, ResourceData, Result};
use tracing::{debug, error, trace};

use super::{description_attribute, name_attribute};
use crate::descriptions;
use crate::recovery::recover_not_found;
use crate::resource::Resource;
use crate::schema::{Attribute, AttributeChange, Plan, Schema};

const TYPE_NAME: &str = "tenablesc_auditfile";

const MISSING_SOURCE: &str = "Audit file must either specify path or content.";
const BOTH_SOURCES: &str = "Audit file must specify only one of path or content.";

pub struct AuditFileResource {
    schema: Schema,
}

impl AuditFileResource {
    pub fn new() -> Self {
        let schema = Schema::new(descriptions::RESOURCE_AUDIT_FILE)
            .attr("name", name_attribute(descriptions::AUDIT_FILE_NAME))
            .attr(
                "description",
                description_attribute(descriptions::AUDIT_FILE_DESCRIPTION),
            )
            .attr(
                "path",
                Attribute::string()
                    .force_new()
                    .description(descriptions::AUDIT_FILE_PATH),
            )
            .attr(
                "content",
                Attribute::string()
                    .force_new()
                    .description(descriptions::AUDIT_FILE_CONTENT),
            )
            .attr(
                "sc_filename",
                Attribute::string()
                    .computed()
                    .description(descriptions::AUDIT_FILE_SC_FILENAME),
            )
            .attr(
                "sha256_sum",
                Attribute::string()
                    .computed()
                    .force_new()
                    .description(descriptions::AUDIT_FILE_SHA256_SUM),
            );
        Self { schema }
    }
}

impl Default for AuditFileResource {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the audit file body comes from
enum Source {
    Path(String),
    Content(String),
}

impl Source {
    fn from_values(values: &AttrMap) -> Result<Option<Source>> {
        let path = string_of("path", values.get("path"))?;
        let content = string_of("content", values.get("content"))?;
        Ok(match (path.is_empty(), content.is_empty()) {
            (false, true) => Some(Source::Path(path)),
            (true, false) => Some(Source::Content(content)),
            _ => None,
        })
    }

    /// File bytes and their hex digest
    fn load(&self) -> Result<(Vec<u8>, String)> {
        match self {
            Source::Path(path) => read_and_hash(path),
            Source::Content(content) => {
                let bytes = content.as_bytes().to_vec();
                let digest = sha256_hex(&bytes);
                Ok((bytes, digest))
            }
        }
    }

    fn digest(&self) -> Result<String> {
        match self {
            Source::Path(path) => sha256_file(path),
            Source::Content(content) => Ok(sha256_hex(content.as_bytes())),
        }
    }
}

fn build_input(d: &ResourceData) -> Result<AuditFile> {
    let name = d.get_string("name")?;
    Ok(AuditFile {
        base: BaseInfo::named(d.id(), name.as_str(), d.get_string("description")?),
        filename: d.get_string("sc_filename")?,
        original_filename: name,
        version: String::new(),
    })
}

#[async_trait]
impl Resource for AuditFileResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn validate(&self, config: &AttrMap) -> Diagnostics {
        let set = |key: &str| config.get(key).is_some_and(|v| !v.is_zero());
        match (set("path"), set("content")) {
            (false, false) => Diagnostic::error(MISSING_SOURCE).into(),
            (true, true) => Diagnostic::error(BOTH_SOURCES).into(),
            _ => Diagnostics::new(),
        }
    }

    /// A changed file behind an unchanged `path` still needs a new upload
    fn customize_plan(&self, prior: &AttrMap, plan: &mut Plan) -> Result<()> {
        let Some(AttrValue::String(old_sum)) = prior.get("sha256_sum") else {
            return Ok(());
        };
        let Some(source) = Source::from_values(&plan.planned)? else {
            return Ok(());
        };
        let new_sum = source.digest()?;
        if &new_sum != old_sum {
            debug!(old = %old_sum, new = %new_sum, "audit file content changed");
            plan.planned.insert("sha256_sum".into(), new_sum.clone().into());
            plan.changes.push(AttributeChange {
                attribute: "sha256_sum".into(),
                old: old_sum.clone().into(),
                new: new_sum.into(),
                requires_replace: true,
            });
        }
        Ok(())
    }

    async fn create(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, "start of create");
        let source = Source::from_values(d.values())?
            .ok_or_else(|| Error::validation("content", MISSING_SOURCE))?;
        let (content, sum) = source.load()?;

        let name = d.get_string("name")?;
        let upload = match client.upload_file(&name, content).await {
            Ok(upload) => upload,
            Err(e) => {
                error!(error = %e, "audit file upload failed");
                return Err(e.into());
            }
        };
        d.set("sc_filename", upload.filename);
        d.set("sha256_sum", sum);

        let created = client.create(&build_input(d)?).await?;
        debug!(response = ?created, "created audit file");
        d.set_id(created.base.id.as_str());
        self.read(client, d).await
    }

    async fn read(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of read");
        if let Some(source) = Source::from_values(d.values())? {
            let sum = source.digest()?;
            d.set("sha256_sum", sum);
        }

        let result = client.get::<AuditFile>(d.id()).await;
        let Some(audit_file) = recover_not_found(d, result)? else {
            return Ok(Diagnostics::new());
        };
        debug!(response = ?audit_file, "read audit file");

        d.set("name", audit_file.base.name);
        d.set("description", audit_file.base.description);
        d.set("sc_filename", audit_file.filename);
        d.set_id(audit_file.base.id.as_str());
        Ok(Diagnostics::new())
    }

    async fn update(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of update");
        let updated = client.update(&build_input(d)?).await?;
        debug!(response = ?updated, "updated audit file");
        self.read(client, d).await
    }

    async fn delete(&self, client: &dyn ScClient, d: &mut ResourceData) -> Result<Diagnostics> {
        trace!(resource = TYPE_NAME, id = d.id(), "start of delete");
        let result = client.delete::<AuditFile>(d.id()).await;
        recover_not_found(d, result)?;
        Ok(Diagnostics::new())
    }
}
