//! View creation through a single `CREATE OR REPLACE VIEW` statement.
//!
//! Views are the one object type created with raw SQL instead of the
//! structured collection API, which mishandles views without a column list.
//! Identifiers and the comment are rendered through [`crate::sql`].

use crate::error::{ObjectError, ObjectResult};
use crate::objects::manager::ObjectManager;
use crate::objects::request::{CreateRequest, OperationOutcome};
use crate::sql;

/// Builds the statement; every part is validated or escaped.
pub fn create_statement(
    database: &str,
    schema: &str,
    name: &str,
    sql_text: &str,
    secure: bool,
    comment: Option<&str>,
) -> Result<String, String> {
    let target = sql::qualified_name(&[database, schema, name]).map_err(|e| e.to_string())?;
    let body = sql::statement_body(sql_text).map_err(|e| e.to_string())?;

    let mut statement = String::from("CREATE OR REPLACE ");
    if secure {
        statement.push_str("SECURE ");
    }
    statement.push_str("VIEW ");
    statement.push_str(&target);
    if let Some(comment) = comment.filter(|c| !c.is_empty()) {
        statement.push_str(" COMMENT = ");
        statement.push_str(&sql::string_literal(comment));
    }
    statement.push_str(" AS ");
    statement.push_str(body);
    Ok(statement)
}

pub(crate) async fn create(manager: &ObjectManager, request: &CreateRequest) -> ObjectResult<OperationOutcome> {
    let object_type = manager.object_type();
    let sql_text = request
        .str_param("sql_text")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ObjectError::invalid_argument(object_type, "'sql_text' is required for creating view"))?;

    let prefix = manager.descriptor().validation.sql_must_start_with.unwrap_or("SELECT");
    let starts_with_prefix = sql_text
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
    if !starts_with_prefix {
        return Err(ObjectError::invalid_argument(
            object_type,
            format!("View sql_text must be a {} statement", prefix),
        ));
    }

    let secure = request.bool_param("secure").unwrap_or(false);
    let comment = request.str_param("comment");

    // Resolve first so a missing parent reports as such.
    manager.collection(&request.parents)?;
    let database = request.parents.get("database").unwrap_or_default();
    let schema = request.parents.get("schema").unwrap_or_default();

    let statement = create_statement(database, schema, &request.name, sql_text, secure, comment)
        .map_err(|message| ObjectError::invalid_argument(object_type, message))?;

    let client = manager.client()?;
    client
        .execute(&statement)
        .await
        .map_err(|e| manager.failure("create", &request.name, &e))?;

    Ok(manager
        .created(&request.name)
        .attributes(request.parents.to_attributes())
        .attribute("sql_text", sql_text)
        .attribute("secure", secure)
        .attribute("comment", comment))
}
