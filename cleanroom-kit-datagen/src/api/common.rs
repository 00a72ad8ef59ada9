use serde::de::DeserializeOwned;
use serde::Serialize;

use cleanroom_kit_platform::ids::{DatasetId, TableId};
use cleanroom_kit_platform::schema::TableSchema;
use cleanroom_kit_platform::{PlatformError, Warehouse};

use crate::error::{GenerateError, GenerateResult};
use crate::tables::{from_rows, to_rows};

pub(crate) fn qualified(dataset: &DatasetId, name: &str) -> GenerateResult<TableId> {
    dataset
        .table(name)
        .map_err(|e| GenerateError::InvalidConfig(e.to_string()))
}

/// Reads and decodes a whole table. A missing dataset or table is a
/// source-availability problem, not a platform fault.
pub(crate) async fn read_table<T: DeserializeOwned>(
    warehouse: &dyn Warehouse,
    dataset: &DatasetId,
    name: &str,
) -> GenerateResult<Vec<T>> {
    let table = qualified(dataset, name)?;
    let rows = warehouse.read_rows(&table).await.map_err(|e| match e {
        PlatformError::NotFound { .. } => {
            GenerateError::SourceUnavailable(format!("{table} does not exist"))
        }
        other => GenerateError::Platform(other),
    })?;
    from_rows(&table, rows)
}

pub(crate) async fn write_table<T: Serialize>(
    warehouse: &dyn Warehouse,
    dataset: &DatasetId,
    name: &str,
    schema: &TableSchema,
    values: &[T],
) -> GenerateResult<()> {
    let table = qualified(dataset, name)?;
    warehouse
        .replace_table(&table, schema, to_rows(values)?)
        .await?;
    Ok(())
}
