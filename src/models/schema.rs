//! Database schema inspection: locating the tag column and its options.
//!
//! The schema is read loosely from JSON so that drift in the remote
//! database (renamed, missing or retyped tag column) can be reported with a
//! useful hint instead of a bare deserialization error.

use serde_json::{Map, Value};

use crate::error::{NBudgetError, Result};

/// Property type of a multiple-choice column.
pub const MULTI_SELECT: &str = "multi_select";

/// Property keys that describe a column rather than its kind.
const DESCRIPTIVE_KEYS: [&str; 2] = ["id", "name"];

/// Extracts the option names of the multi-select column `tags_column`
/// from a database object.
///
/// # Errors
///
/// Returns [`NBudgetError::ApiParsing`] when the response has no
/// `properties` object, when the column is missing (with a hint naming the
/// multi-select columns that do exist), when the column is of another kind,
/// or when its options cannot be read.
#[inline]
pub fn tag_options(database: &Value, tags_column: &str) -> Result<Vec<String>> {
    let Some(properties) = database.get("properties").and_then(Value::as_object) else {
        return Err(NBudgetError::ApiParsing(format!(
            "Did not understand API response: {database}"
        )));
    };

    let Some(column) = properties.get(tags_column) else {
        return Err(missing_column(properties, tags_column));
    };

    let kind = column_kind(column);
    if kind != Some(MULTI_SELECT) {
        return Err(NBudgetError::ApiParsing(format!(
            "Type of the {tags_column} column is: \"{}\". Must be \"{MULTI_SELECT}\"",
            kind.unwrap_or("unknown")
        )));
    }

    let options = column
        .get(MULTI_SELECT)
        .and_then(|select| select.get("options"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            NBudgetError::ApiParsing(format!(
                "Did not understand the options of the {tags_column} column: {column}"
            ))
        })?;

    options
        .iter()
        .map(|option| {
            option
                .get("name")
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
                .ok_or_else(|| {
                    NBudgetError::ApiParsing(format!(
                        "Option of the {tags_column} column has no name: {option}"
                    ))
                })
        })
        .collect()
}

/// Returns the kind of a column definition.
///
/// Uses the `type` field when present; otherwise the first key that does
/// not merely describe the column.
fn column_kind(column: &Value) -> Option<&str> {
    let definition = column.as_object()?;
    if let Some(kind) = definition.get("type").and_then(Value::as_str) {
        return Some(kind);
    }
    definition
        .keys()
        .map(String::as_str)
        .find(|key| !DESCRIPTIVE_KEYS.contains(key))
}

/// Returns `true` if a column definition is a multi-select column.
fn is_multi_select(column: &Value) -> bool {
    column_kind(column) == Some(MULTI_SELECT)
        || column.get(MULTI_SELECT).is_some_and(Value::is_object)
}

/// Names of all multi-select columns, sorted.
#[inline]
#[must_use]
pub fn multi_select_columns(properties: &Map<String, Value>) -> Vec<&str> {
    let mut names: Vec<&str> = properties
        .iter()
        .filter(|&(_, column)| is_multi_select(column))
        .map(|(name, _)| name.as_str())
        .collect();
    names.sort_unstable();
    names
}

/// Builds the drift report for a tag column that does not exist.
fn missing_column(properties: &Map<String, Value>, tags_column: &str) -> NBudgetError {
    let candidates = multi_select_columns(properties);
    let message = match candidates.as_slice() {
        [] => format!("No {MULTI_SELECT} type column found in the database."),
        [single] => format!(
            "Column with name \"{tags_column}\" does not exist in the database. \
             Could it be \"{single}\"? If so, change \"tags_name\" in the settings file to it."
        ),
        several => format!(
            "Column with name \"{tags_column}\" does not exist in the database. \
             Could it be one of these: {}? If one is, change \"tags_name\" in the settings \
             file to it.",
            several.join(", ")
        ),
    };
    NBudgetError::ApiParsing(message)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parsing_message(result: Result<Vec<String>>) -> String {
        match result {
            Err(NBudgetError::ApiParsing(message)) => message,
            other => panic!("expected ApiParsing, got {other:?}"),
        }
    }

    #[test]
    fn reads_options() {
        let database = json!({"properties": {"Tags": {"multi_select": {"options": [
            {"name": "a"}, {"name": "b"}
        ]}}}});
        assert_eq!(tag_options(&database, "Tags").unwrap(), ["a", "b"]);
    }

    #[test]
    fn reads_options_of_full_api_shape() {
        let database = json!({
            "object": "database",
            "id": "db-1",
            "properties": {
                "Tags": {
                    "id": "abc",
                    "name": "Tags",
                    "type": "multi_select",
                    "multi_select": {"options": [
                        {"id": "1", "name": "Food", "color": "red"},
                        {"id": "2", "name": "Rent", "color": "blue"}
                    ]}
                },
                "Amount": {"id": "def", "name": "Amount", "type": "number", "number": {}}
            }
        });
        assert_eq!(tag_options(&database, "Tags").unwrap(), ["Food", "Rent"]);
    }

    #[test]
    fn reads_options_of_renamed_column() {
        let database = json!({"properties": {"Changed Tag Name": {"multi_select": {"options": [
            {"name": "a"}, {"name": "b"}
        ]}}}});
        assert_eq!(
            tag_options(&database, "Changed Tag Name").unwrap(),
            ["a", "b"]
        );
    }

    #[test]
    fn empty_options() {
        let database = json!({"properties": {"Tags": {"multi_select": {"options": []}}}});
        assert!(tag_options(&database, "Tags").unwrap().is_empty());
    }

    #[test]
    fn missing_properties_echoes_response() {
        let database = json!({"abd": {"ee": {"ff": {"ag32": [{"name": "a"}]}}}});
        let message = parsing_message(tag_options(&database, "Tags"));
        assert!(message.starts_with("Did not understand API response"));
        assert!(message.contains("ag32"));
    }

    #[test]
    fn missing_column_with_one_candidate() {
        let database = json!({"properties": {
            "Other name": {"multi_select": {"options": [{"name": "a"}]}},
            "Kind": {"select": {"options": []}}
        }});
        let message = parsing_message(tag_options(&database, "Tags"));
        assert!(message.contains("Could it be \"Other name\"?"), "{message}");
    }

    #[test]
    fn missing_column_with_several_candidates() {
        let database = json!({"properties": {
            "Other name": {"multi_select": {"options": []}},
            "Another name": {"multi_select": {"options": []}}
        }});
        let message = parsing_message(tag_options(&database, "Tags"));
        assert!(
            message.contains("one of these: Another name, Other name?"),
            "{message}"
        );
    }

    #[test]
    fn missing_column_without_candidates() {
        let database = json!({"properties": {"Other name": {"select": {"options": []}}}});
        let message = parsing_message(tag_options(&database, "Tags"));
        assert_eq!(message, "No multi_select type column found in the database.");
    }

    #[test]
    fn wrong_column_kind() {
        let database = json!({"properties": {"Tags": {"select": {"options": [{"name": "a"}]}}}});
        let message = parsing_message(tag_options(&database, "Tags"));
        assert_eq!(
            message,
            "Type of the Tags column is: \"select\". Must be \"multi_select\""
        );
    }

    #[test]
    fn wrong_column_kind_from_type_field() {
        let database = json!({"properties": {"Tags": {
            "id": "x", "name": "Tags", "type": "rich_text", "rich_text": {}
        }}});
        let message = parsing_message(tag_options(&database, "Tags"));
        assert!(message.contains("\"rich_text\""), "{message}");
    }

    #[test]
    fn unreadable_options() {
        let database = json!({"properties": {"Tags": {"multi_select": {"choices": []}}}});
        let message = parsing_message(tag_options(&database, "Tags"));
        assert!(message.contains("options of the Tags column"), "{message}");
    }

    #[test]
    fn option_without_name() {
        let database = json!({"properties": {"Tags": {"multi_select": {"options": [{"id": "1"}]}}}});
        assert!(matches!(
            tag_options(&database, "Tags"),
            Err(NBudgetError::ApiParsing(_))
        ));
    }

    #[test]
    fn multi_select_columns_are_sorted() {
        let database = json!({
            "zeta": {"type": "multi_select", "multi_select": {}},
            "alpha": {"multi_select": {"options": []}},
            "beta": {"type": "number", "number": {}}
        });
        let names = multi_select_columns(database.as_object().unwrap());
        assert_eq!(names, ["alpha", "zeta"]);
    }
}
