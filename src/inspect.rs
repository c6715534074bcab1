//! Extraction of the driver's row iterator and its column metadata.
//!
//! [`Row`] and [`Rows`] only hand out column names. The iterator they wrap
//! is reached through their runtime shape: the wrapper fields are looked up
//! by name once and read by index afterwards. The column definitions inside
//! the iterator are read through a layout adapter once the probe in
//! [`crate::layout`] has confirmed the iterator's layout.

use std::any::Any;

use once_cell::sync::Lazy;
use tracing::trace;

use crate::column::{Column, ColumnInfo};
use crate::config::InspectConfig;
use crate::cursor::{
    DriverRows, Row, Rows, DRIVER_ROWS_INTERFACE, ERROR_INTERFACE, ROWS_SHAPE, ROW_SHAPE,
};
use crate::error::{Error, Result};
use crate::layout::{LayoutVersion, Verdict, VerdictCache, EMPTY_ROWS};
use crate::mirror::{ShapeKind, TypeShape};
use crate::reflect::Reflect;

/// Indices of the wrapper fields, verified by name and kind.
#[derive(Debug, Clone, Copy)]
struct WrapperFields {
    row_err: usize,
    row_rows: usize,
    rows_rowsi: usize,
}

impl WrapperFields {
    fn resolve() -> Result<Self> {
        Ok(Self {
            row_err: find_field(&ROW_SHAPE, "err", |kind| {
                matches!(kind, ShapeKind::Interface(name) if *name == ERROR_INTERFACE)
            })?,
            row_rows: find_field(&ROW_SHAPE, "rows", |kind| {
                matches!(kind, ShapeKind::Pointer(_))
                    && kind.record().map(|r| r.name) == Some(ROWS_SHAPE.name)
            })?,
            rows_rowsi: find_field(&ROWS_SHAPE, "rowsi", |kind| {
                matches!(kind, ShapeKind::Interface(name) if *name == DRIVER_ROWS_INTERFACE)
            })?,
        })
    }
}

fn find_field(
    shape: &'static TypeShape,
    field: &'static str,
    accepts: impl Fn(&ShapeKind) -> bool,
) -> Result<usize> {
    shape
        .field(field)
        .filter(|(_, f)| accepts(&f.kind))
        .map(|(index, _)| index)
        .ok_or(Error::UnexpectedStructure {
            type_name: shape.name,
            field,
        })
}

static WRAPPER_FIELDS: Lazy<Result<WrapperFields>> = Lazy::new(WrapperFields::resolve);

fn wrapper_fields() -> Result<WrapperFields> {
    match &*WRAPPER_FIELDS {
        Ok(fields) => Ok(*fields),
        Err(err) => Err(err.clone()),
    }
}

/// Field `index` of `value`, which must have type `T`.
fn read_field<'a, T: Any>(
    value: &'a dyn Reflect,
    index: usize,
    field: &'static str,
) -> Result<&'a T> {
    value
        .field(index)
        .and_then(|f| f.downcast_ref::<T>())
        .ok_or(Error::UnexpectedStructure {
            type_name: value.shape().name,
            field,
        })
}

/// Reads column metadata from [`Row`] and [`Rows`].
///
/// Each inspector keeps its own probe verdict. [`Inspector::global`] is
/// shared by the whole process and backs the free functions of this crate.
pub struct Inspector {
    config: InspectConfig,
    cache: VerdictCache,
}

static GLOBAL: Lazy<Inspector> = Lazy::new(|| Inspector::new(InspectConfig::from_env()));

impl Inspector {
    pub fn new(config: InspectConfig) -> Self {
        Self {
            config,
            cache: VerdictCache::new(),
        }
    }

    /// The process-wide inspector, configured from the environment.
    pub fn global() -> &'static Inspector {
        &GLOBAL
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    /// Probe verdict of this inspector.
    pub fn cache(&self) -> &VerdictCache {
        &self.cache
    }

    /// The driver's row iterator behind a [`Row`] or [`Rows`].
    pub fn inspect<'a, C: Any>(&self, cursor: Option<&'a C>) -> Result<&'a dyn DriverRows> {
        let cursor: &'a dyn Any = cursor.ok_or(Error::NilArgument)?;
        if let Some(row) = cursor.downcast_ref::<Row>() {
            return unwrap_row(row);
        }
        if let Some(rows) = cursor.downcast_ref::<Rows>() {
            return unwrap_rows(rows);
        }
        Err(Error::WrongType)
    }

    /// Column metadata of a [`Row`] or [`Rows`].
    pub fn columns<C: Any>(&self, cursor: Option<&C>) -> Result<Vec<Column>> {
        const OPERATION: &str = "columns";

        let Some((handle, version)) = self.resolve(cursor, OPERATION)? else {
            return Ok(Vec::new());
        };
        // SAFETY: the handle's shape was verified for `version`.
        let descriptors = unsafe { version.adapter().columns(handle) };
        trace!(columns = descriptors.len(), layout = %version, "column metadata read");
        Ok(descriptors.into_iter().map(Column::new).collect())
    }

    /// Column metadata of a [`Row`] or [`Rows`] as a [`ColumnInfo`].
    pub fn column_info<C: Any>(&self, cursor: Option<&C>) -> Result<ColumnInfo> {
        self.columns(cursor).map(ColumnInfo::new)
    }

    /// Whether the rows were read with the binary protocol, i.e. come from
    /// a prepared statement rather than a plain query.
    pub fn is_binary<C: Any>(&self, cursor: Option<&C>) -> Result<bool> {
        const OPERATION: &str = "is_binary";

        let Some((handle, version)) = self.resolve(cursor, OPERATION)? else {
            return Ok(false);
        };
        // SAFETY: the handle's shape was verified for `version`.
        Ok(unsafe { version.adapter().is_binary(handle) })
    }

    /// The iterator's shape and its confirmed layout, or `None` for an
    /// empty result.
    fn resolve<'a, C: Any>(
        &self,
        cursor: Option<&'a C>,
        operation: &'static str,
    ) -> Result<Option<(&'a dyn Reflect, LayoutVersion)>> {
        if self.cache.verdict() == Verdict::Unavailable {
            return Err(Error::Unavailable { operation });
        }
        let handle = self
            .inspect(cursor)?
            .as_reflect()
            .ok_or(Error::Unavailable { operation })?;
        if handle.shape().name == EMPTY_ROWS {
            return Ok(None);
        }
        let version = self
            .cache
            .resolve(handle, self.config.layout.versions(), operation)?;
        Ok(Some((handle, version)))
    }
}

fn unwrap_row(row: &Row) -> Result<&dyn DriverRows> {
    let fields = wrapper_fields()?;
    if let Some(rows) = read_field::<Option<Box<Rows>>>(row, fields.row_rows, "rows")? {
        return unwrap_rows(rows);
    }
    match read_field::<Option<Error>>(row, fields.row_err, "err")? {
        Some(err) => Err(err.clone()),
        None => Err(Error::RowStateInconsistent),
    }
}

fn unwrap_rows(rows: &Rows) -> Result<&dyn DriverRows> {
    let fields = wrapper_fields()?;
    read_field::<Option<Box<dyn DriverRows>>>(rows, fields.rows_rowsi, "rowsi")?
        .as_deref()
        .ok_or(Error::Unavailable {
            operation: "inspect",
        })
}

/// [`Inspector::inspect`] on the global inspector.
pub fn inspect<C: Any>(cursor: Option<&C>) -> Result<&dyn DriverRows> {
    Inspector::global().inspect(cursor)
}

/// [`Inspector::columns`] on the global inspector.
pub fn columns<C: Any>(cursor: Option<&C>) -> Result<Vec<Column>> {
    Inspector::global().columns(cursor)
}

/// [`Inspector::column_info`] on the global inspector.
pub fn column_info<C: Any>(cursor: Option<&C>) -> Result<ColumnInfo> {
    Inspector::global().column_info(cursor)
}

/// [`Inspector::is_binary`] on the global inspector.
pub fn is_binary<C: Any>(cursor: Option<&C>) -> Result<bool> {
    Inspector::global().is_binary(cursor)
}
