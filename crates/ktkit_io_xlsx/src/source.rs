//! Schema sources feeding the workbook builder.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::spec::{FieldDescription, SourceError, SpecTableHeader, TableDescription};

/// Pull-based producer of table descriptions.
pub trait SchemaSource {
    /// Next table header in catalog order, or `None` once exhausted.
    fn next_table(&mut self) -> Result<Option<SpecTableHeader>, SourceError>;

    /// Ordered columns of a table returned by [`Self::next_table`].
    fn fields_of(&mut self, table: &SpecTableHeader) -> Result<Vec<FieldDescription>, SourceError>;

    /// Fetch the next header together with all of its fields.
    fn next_description(&mut self) -> Result<Option<TableDescription>, SourceError> {
        let Some(header) = self.next_table()? else {
            return Ok(None);
        };
        let fields = self.fields_of(&header)?;
        Ok(Some(TableDescription::from_header(header, fields)))
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region JsonDump

#[derive(Debug, Deserialize)]
struct SchemaDump {
    #[serde(default)]
    schema: Option<String>,
    #[serde(default)]
    tables: Vec<TableDump>,
}

#[derive(Debug, Deserialize)]
struct TableDump {
    name: String,
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    fields: Vec<FieldDump>,
}

#[derive(Debug, Deserialize)]
struct FieldDump {
    name: String,
    #[serde(default, rename = "type", alias = "field_type")]
    field_type: Option<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    nullable: Option<Value>,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    comment: Option<String>,
}

impl From<FieldDump> for FieldDescription {
    fn from(dump: FieldDump) -> Self {
        Self {
            name: dump.name,
            field_type: dump.field_type.unwrap_or_default(),
            key: dump.key.unwrap_or_default(),
            nullable: derive_nullable_text(dump.nullable.as_ref()),
            default: derive_text_from_json(dump.default.as_ref()),
            comment: dump.comment.unwrap_or_default(),
        }
    }
}

/// Schema source over a JSON schema dump.
///
/// ```json
/// {"schema": "shop", "tables": [{"name": "users", "comment": "", "fields": [
///   {"name": "id", "type": "int", "key": "PRI", "nullable": "NO", "default": null}
/// ]}]}
/// ```
///
/// Missing or `null` attributes become empty strings.
#[derive(Debug)]
pub struct JsonSchemaSource {
    schema: Option<String>,
    l_tables: VecDeque<TableDump>,
    table_pending: Option<TableDump>,
}

impl JsonSchemaSource {
    /// Parse a dump from any reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SourceError> {
        let dump: SchemaDump = serde_json::from_reader(reader)?;
        Ok(Self::from_dump(dump))
    }

    /// Parse a dump from a string.
    pub fn from_json_str(text: &str) -> Result<Self, SourceError> {
        let dump: SchemaDump = serde_json::from_str(text)?;
        Ok(Self::from_dump(dump))
    }

    /// Open and parse a dump file.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Schema name recorded in the dump.
    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Number of tables not yet handed out.
    pub fn n_tables_remaining(&self) -> usize {
        self.l_tables.len() + usize::from(self.table_pending.is_some())
    }

    fn from_dump(dump: SchemaDump) -> Self {
        Self {
            schema: dump.schema.filter(|s| !s.is_empty()),
            l_tables: dump.tables.into(),
            table_pending: None,
        }
    }
}

impl SchemaSource for JsonSchemaSource {
    fn next_table(&mut self) -> Result<Option<SpecTableHeader>, SourceError> {
        self.table_pending = self.l_tables.pop_front();
        Ok(self.table_pending.as_ref().map(|t| SpecTableHeader {
            name: t.name.clone(),
            comment: t.comment.clone().unwrap_or_default(),
        }))
    }

    fn fields_of(&mut self, table: &SpecTableHeader) -> Result<Vec<FieldDescription>, SourceError> {
        match self.table_pending.take() {
            Some(dump) if dump.name == table.name => {
                Ok(dump.fields.into_iter().map(FieldDescription::from).collect())
            }
            Some(dump) => {
                let c_expected = dump.name.clone();
                self.table_pending = Some(dump);
                Err(SourceError::Introspection(format!(
                    "fields requested for `{}` but current table is `{c_expected}`",
                    table.name
                )))
            }
            None => Err(SourceError::Introspection(format!(
                "fields requested for `{}` with no current table",
                table.name
            ))),
        }
    }
}

fn derive_text_from_json(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn derive_nullable_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::Bool(true)) => "YES".to_string(),
        Some(Value::Bool(false)) => "NO".to_string(),
        other => derive_text_from_json(other),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region InMemory

/// Schema source over an iterator of already-complete descriptions.
#[derive(Debug)]
pub struct IterSchemaSource<I> {
    iter: I,
    fields_pending: Option<(String, Vec<FieldDescription>)>,
}

impl<I> IterSchemaSource<I>
where
    I: Iterator<Item = Result<TableDescription, SourceError>>,
{
    /// Wrap a fallible iterator; an `Err` item surfaces from `next_table`.
    pub fn new(iter: I) -> Self {
        Self {
            iter,
            fields_pending: None,
        }
    }
}

/// Iterator behind [`IterSchemaSource::from_tables`].
pub type TablesIntoIter = std::iter::Map<
    std::vec::IntoIter<TableDescription>,
    fn(TableDescription) -> Result<TableDescription, SourceError>,
>;

impl IterSchemaSource<TablesIntoIter> {
    /// Wrap an owned list of tables.
    pub fn from_tables(tables: Vec<TableDescription>) -> Self {
        let f_ok: fn(TableDescription) -> Result<TableDescription, SourceError> = Ok;
        Self::new(tables.into_iter().map(f_ok))
    }
}

impl<I> SchemaSource for IterSchemaSource<I>
where
    I: Iterator<Item = Result<TableDescription, SourceError>>,
{
    fn next_table(&mut self) -> Result<Option<SpecTableHeader>, SourceError> {
        self.fields_pending = None;
        let Some(table) = self.iter.next().transpose()? else {
            return Ok(None);
        };
        let header = SpecTableHeader {
            name: table.name.clone(),
            comment: table.comment,
        };
        self.fields_pending = Some((table.name, table.fields));
        Ok(Some(header))
    }

    fn fields_of(&mut self, table: &SpecTableHeader) -> Result<Vec<FieldDescription>, SourceError> {
        match self.fields_pending.take() {
            Some((name, fields)) if name == table.name => Ok(fields),
            _ => Err(SourceError::Introspection(format!(
                "fields requested for `{}` out of order",
                table.name
            ))),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
