//! Known internal layouts of the driver's row iterator and the probe that
//! confirms which one a handle has.
//!
//! Every supported driver version gets one adapter holding `#[repr(C)]`
//! mirrors of the driver's private types. An adapter only reads through a
//! handle after its runtime shape was verified against the mirror shapes,
//! level by level down to the column definition. The outcome is kept in a
//! [`VerdictCache`] for the lifetime of the process.

mod embedded;
mod flat;
mod result_set;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, trace, warn};

use crate::column::ColumnDescriptor;
use crate::error::{Error, Result};
use crate::mirror::{check_compatible, Mismatch, ShapeKind, TypeShape};
use crate::reflect::Reflect;

/// Type name of the iterator a driver returns for statements without a
/// result set.
pub(crate) const EMPTY_ROWS: &str = "EmptyRows";

/// Shape of the driver connection. Only its name is ever compared.
pub(crate) static MYSQL_CONN_SHAPE: TypeShape = TypeShape {
    name: "MysqlConn",
    size: 0,
    fields: &[],
};

pub(crate) static MYSQL_CONN_RECORD: ShapeKind = ShapeKind::Record(&MYSQL_CONN_SHAPE);

/// Internal layout version of the driver's row iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutVersion {
    /// One `MysqlRows` record holding the columns and a binary flag.
    Flat,
    /// `TextRows`/`BinaryRows` embedding `MysqlRows`, columns with decimals.
    Embedded,
    /// Like `Embedded`, with the columns moved into a result set record and
    /// carrying their table name.
    ResultSet,
}

impl LayoutVersion {
    /// All versions, newest first.
    pub const ALL: [LayoutVersion; 3] = [
        LayoutVersion::ResultSet,
        LayoutVersion::Embedded,
        LayoutVersion::Flat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutVersion::Flat => "flat",
            LayoutVersion::Embedded => "embedded",
            LayoutVersion::ResultSet => "result-set",
        }
    }

    pub(crate) fn adapter(self) -> &'static dyn LayoutAdapter {
        match self {
            LayoutVersion::Flat => &flat::FlatLayout,
            LayoutVersion::Embedded => &embedded::EmbeddedLayout,
            LayoutVersion::ResultSet => &result_set::ResultSetLayout,
        }
    }

    fn code(self) -> u8 {
        match self {
            LayoutVersion::Flat => 0,
            LayoutVersion::Embedded => 1,
            LayoutVersion::ResultSet => 2,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(LayoutVersion::Flat),
            1 => Some(LayoutVersion::Embedded),
            2 => Some(LayoutVersion::ResultSet),
            _ => None,
        }
    }
}

impl fmt::Display for LayoutVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LayoutVersion::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidConfig {
                message: format!("unknown layout version '{}'", s),
            })
    }
}

/// Reader for one layout version.
pub(crate) trait LayoutAdapter: Sync {
    fn version(&self) -> LayoutVersion;

    /// Expected shapes of the handle types this layout knows.
    fn roots(&self) -> &'static [&'static TypeShape];

    /// Fields leading from the handle to the column definition.
    fn path(&self) -> &'static [&'static str];

    fn root(&self, type_name: &str) -> Option<&'static TypeShape> {
        self.roots().iter().copied().find(|s| s.name == type_name)
    }

    /// Check a handle shape level by level against the mirrors.
    fn verify(&self, found: &'static TypeShape) -> std::result::Result<(), Mismatch> {
        let expected = self.root(found.name).ok_or(Mismatch::Name {
            expected: self.roots().first().map_or("", |s| s.name),
            found: found.name,
        })?;
        verify_path(found, expected, self.path())
    }

    /// Copy the column definitions out of the handle.
    ///
    /// # Safety
    ///
    /// `handle.shape()` must have passed [`LayoutAdapter::verify`].
    unsafe fn columns(&self, handle: &dyn Reflect) -> Vec<ColumnDescriptor>;

    /// Whether the handle reads the binary protocol.
    ///
    /// # Safety
    ///
    /// `handle.shape()` must have passed [`LayoutAdapter::verify`].
    unsafe fn is_binary(&self, handle: &dyn Reflect) -> bool;
}

/// Record reachable from a field kind through pointers, slices and arrays.
pub(crate) fn element(kind: &ShapeKind) -> Option<&'static TypeShape> {
    match kind {
        ShapeKind::Record(shape) => Some(*shape),
        ShapeKind::Pointer(inner) | ShapeKind::Slice(inner) | ShapeKind::Array(_, inner) => {
            element(inner)
        }
        _ => None,
    }
}

/// The record behind field `field` of `shape`.
pub(crate) fn nested(
    shape: &'static TypeShape,
    field: &'static str,
) -> std::result::Result<&'static TypeShape, Mismatch> {
    shape
        .field(field)
        .and_then(|(_, f)| element(&f.kind))
        .ok_or(Mismatch::MissingField {
            type_name: shape.name,
            field,
        })
}

/// Compare two shapes at every level of `path`, one level at a time.
fn verify_path(
    mut found: &'static TypeShape,
    mut expected: &'static TypeShape,
    path: &[&'static str],
) -> std::result::Result<(), Mismatch> {
    for &step in path {
        check_compatible(found, expected, 0)?;
        debug!(type_name = expected.name, "layout level verified");
        found = nested(found, step)?;
        expected = nested(expected, step)?;
    }
    check_compatible(found, expected, 0)?;
    debug!(type_name = expected.name, "column definition verified");
    Ok(())
}

/// Current state of a [`VerdictCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No handle has been probed yet.
    NotAttempted,
    /// Handles of this layout can be read.
    Confirmed(LayoutVersion),
    /// A known type had an unexpected structure; extraction is disabled.
    Unavailable,
}

const NOT_ATTEMPTED: u8 = 0;
const UNAVAILABLE: u8 = 1;
const CONFIRMED: u8 = 2;

/// Memo of the layout probe.
///
/// Once a verdict is published it never changes. Reads of the published
/// verdict take no lock; probing is serialized.
pub struct VerdictCache {
    state: AtomicU8,
    probe_lock: Mutex<()>,
    confirmed: RwLock<Vec<&'static TypeShape>>,
    probes: AtomicUsize,
}

impl Default for VerdictCache {
    fn default() -> Self {
        Self::new()
    }
}

impl VerdictCache {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(NOT_ATTEMPTED),
            probe_lock: Mutex::new(()),
            confirmed: RwLock::new(Vec::new()),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self.state.load(Ordering::Acquire) {
            NOT_ATTEMPTED => Verdict::NotAttempted,
            UNAVAILABLE => Verdict::Unavailable,
            code => LayoutVersion::from_code(code - CONFIRMED)
                .map_or(Verdict::Unavailable, Verdict::Confirmed),
        }
    }

    /// Number of structural verifications run so far.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::Relaxed)
    }

    fn is_confirmed_shape(&self, shape: &'static TypeShape) -> bool {
        self.confirmed
            .read()
            .iter()
            .any(|known| std::ptr::eq(*known, shape))
    }

    /// Layout to read `handle` with.
    ///
    /// `candidates` are tried in order when nothing has been confirmed yet.
    /// A handle whose type name no candidate knows is rejected without
    /// touching the cache.
    pub(crate) fn resolve(
        &self,
        handle: &dyn Reflect,
        candidates: &[LayoutVersion],
        operation: &'static str,
    ) -> Result<LayoutVersion> {
        let shape = handle.shape();
        match self.verdict() {
            Verdict::Unavailable => Err(Error::Unavailable { operation }),
            Verdict::Confirmed(version) => self.resolve_confirmed(shape, version, operation),
            Verdict::NotAttempted => {
                let guard = self.probe_lock.lock();
                if self.verdict() != Verdict::NotAttempted {
                    drop(guard);
                    return self.resolve(handle, candidates, operation);
                }
                self.probe(shape, candidates, operation)
            }
        }
    }

    fn resolve_confirmed(
        &self,
        shape: &'static TypeShape,
        version: LayoutVersion,
        operation: &'static str,
    ) -> Result<LayoutVersion> {
        if self.is_confirmed_shape(shape) {
            trace!(type_name = shape.name, layout = %version, "layout cache hit");
            return Ok(version);
        }
        let adapter = version.adapter();
        if adapter.root(shape.name).is_none() {
            debug!(type_name = shape.name, layout = %version, "handle is not a known row type");
            return Err(Error::Unavailable { operation });
        }

        let _guard = self.probe_lock.lock();
        if self.is_confirmed_shape(shape) {
            return Ok(version);
        }
        self.probes.fetch_add(1, Ordering::Relaxed);
        debug!(type_name = shape.name, layout = %version, "verifying additional row type");
        adapter.verify(shape).map_err(|mismatch| {
            warn!(type_name = shape.name, layout = %version, %mismatch, "row type does not match confirmed layout");
            Error::StructuralMismatch {
                layout: version,
                mismatch,
            }
        })?;
        self.confirmed.write().push(shape);
        Ok(version)
    }

    /// Run the probe. Called with the probe lock held.
    fn probe(
        &self,
        shape: &'static TypeShape,
        candidates: &[LayoutVersion],
        operation: &'static str,
    ) -> Result<LayoutVersion> {
        let matching: Vec<&'static dyn LayoutAdapter> = candidates
            .iter()
            .map(|v| v.adapter())
            .filter(|adapter| adapter.root(shape.name).is_some())
            .collect();
        if matching.is_empty() {
            debug!(type_name = shape.name, "handle is not a known row type");
            return Err(Error::Unavailable { operation });
        }

        self.probes.fetch_add(1, Ordering::Relaxed);
        debug!(type_name = shape.name, candidates = matching.len(), "probing row layout");
        let mut last_mismatch = None;
        for adapter in matching {
            let version = adapter.version();
            match adapter.verify(shape) {
                Ok(()) => {
                    self.confirmed.write().push(shape);
                    self.state
                        .store(CONFIRMED + version.code(), Ordering::Release);
                    info!(type_name = shape.name, layout = %version, "row layout confirmed");
                    return Ok(version);
                }
                Err(mismatch) => {
                    debug!(layout = %version, %mismatch, "layout does not match");
                    last_mismatch = Some((version, mismatch));
                }
            }
        }

        self.state.store(UNAVAILABLE, Ordering::Release);
        let Some((layout, mismatch)) = last_mismatch else {
            return Err(Error::Unavailable { operation });
        };
        warn!(type_name = shape.name, %layout, %mismatch, "unexpected row layout, column metadata disabled");
        Err(Error::StructuralMismatch { layout, mismatch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{FieldFlags, FieldType};
    use crate::cursor::{DriverRows, Rows};
    use crate::driver::{self, Value};
    use crate::mirror::{FieldShape, Primitive};
    use std::any::Any;

    fn handle_of(rows: &Rows) -> &dyn Reflect {
        let field = rows.field(0).unwrap();
        let rowsi = field.downcast_ref::<Option<Box<dyn DriverRows>>>().unwrap();
        rowsi.as_ref().unwrap().as_reflect().unwrap()
    }

    fn sample_columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("id", FieldType::LONG)
                .with_flags(FieldFlags::NOT_NULL | FieldFlags::PRIMARY_KEY)
                .with_table_name("t"),
            ColumnDescriptor::new("price", FieldType::NEWDECIMAL).with_decimals(2),
        ]
    }

    #[test]
    fn test_layout_version_names() {
        for version in LayoutVersion::ALL {
            assert_eq!(version.as_str().parse::<LayoutVersion>(), Ok(version));
            assert_eq!(version.adapter().version(), version);
            assert_eq!(LayoutVersion::from_code(version.code()), Some(version));
        }
        assert_eq!("Result-Set".parse::<LayoutVersion>(), Ok(LayoutVersion::ResultSet));
        assert!("v9".parse::<LayoutVersion>().is_err());
    }

    #[test]
    fn test_probe_confirms_driver_layout() {
        let cache = VerdictCache::new();
        let rows = driver::text_rows(sample_columns(), vec![]);
        let handle = handle_of(&rows);

        assert_eq!(cache.verdict(), Verdict::NotAttempted);
        let version = cache.resolve(handle, &LayoutVersion::ALL, "columns").unwrap();
        assert_eq!(version, LayoutVersion::ResultSet);
        assert_eq!(cache.verdict(), Verdict::Confirmed(LayoutVersion::ResultSet));
        assert_eq!(cache.probe_count(), 1);

        // cache hit
        cache.resolve(handle, &LayoutVersion::ALL, "columns").unwrap();
        assert_eq!(cache.probe_count(), 1);

        let columns = unsafe { version.adapter().columns(handle) };
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].table_name.as_deref(), Some("t"));
        assert_eq!(columns[0].flags, FieldFlags::NOT_NULL | FieldFlags::PRIMARY_KEY);
        assert_eq!(columns[1].field_type, FieldType::NEWDECIMAL);
        assert_eq!(columns[1].table_name, None);
        assert_eq!(columns[1].decimals, Some(2));
        assert!(!unsafe { version.adapter().is_binary(handle) });
    }

    #[test]
    fn test_second_row_type_verified_once() {
        let cache = VerdictCache::new();
        let text = driver::text_rows(sample_columns(), vec![]);
        let binary = driver::binary_rows(sample_columns(), vec![vec![Value::Int(1), Value::Null]]);

        cache.resolve(handle_of(&text), &LayoutVersion::ALL, "columns").unwrap();
        cache.resolve(handle_of(&binary), &LayoutVersion::ALL, "columns").unwrap();
        cache.resolve(handle_of(&binary), &LayoutVersion::ALL, "columns").unwrap();
        assert_eq!(cache.probe_count(), 2);
        assert!(unsafe { LayoutVersion::ResultSet.adapter().is_binary(handle_of(&binary)) });
    }

    #[test]
    fn test_unknown_type_leaves_cache_untouched() {
        let cache = VerdictCache::new();
        let rows = driver::empty_rows();
        let err = cache.resolve(handle_of(&rows), &LayoutVersion::ALL, "columns");
        assert_eq!(err, Err(Error::Unavailable { operation: "columns" }));
        assert_eq!(cache.verdict(), Verdict::NotAttempted);
        assert_eq!(cache.probe_count(), 0);
    }

    #[test]
    fn test_pinned_version_mismatch_poisons() {
        let cache = VerdictCache::new();
        let rows = driver::text_rows(sample_columns(), vec![]);
        let handle = handle_of(&rows);

        let err = cache
            .resolve(handle, &[LayoutVersion::Embedded], "columns")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::StructuralMismatch {
                layout: LayoutVersion::Embedded,
                ..
            }
        ));
        assert_eq!(cache.verdict(), Verdict::Unavailable);

        // no further probing, even with the right candidates
        let err = cache.resolve(handle, &LayoutVersion::ALL, "columns");
        assert_eq!(err, Err(Error::Unavailable { operation: "columns" }));
        assert_eq!(cache.probe_count(), 1);
    }

    #[test]
    fn test_concurrent_first_use_converges() {
        let cache = VerdictCache::new();
        let barrier = std::sync::Barrier::new(8);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let cache = &cache;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        let rows = if i % 2 == 0 {
                            driver::text_rows(sample_columns(), vec![])
                        } else {
                            driver::binary_rows(sample_columns(), vec![])
                        };
                        barrier.wait();
                        cache.resolve(handle_of(&rows), &LayoutVersion::ALL, "columns")
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), Ok(LayoutVersion::ResultSet));
            }
        });

        assert_eq!(cache.verdict(), Verdict::Confirmed(LayoutVersion::ResultSet));
        // one probe per row type at most
        assert!(cache.probe_count() <= 2);
        assert!(cache.probe_count() >= 1);
    }

    struct Opaque;

    static OPAQUE_SHAPE: TypeShape = TypeShape {
        name: "TextRows",
        size: 8,
        fields: &[FieldShape {
            name: "mysql_rows",
            offset: 0,
            kind: ShapeKind::Scalar(Primitive::U64),
        }],
    };

    unsafe impl Reflect for Opaque {
        fn shape(&self) -> &'static TypeShape {
            &OPAQUE_SHAPE
        }

        fn field(&self, _index: usize) -> Option<&dyn Any> {
            None
        }

        fn as_ptr(&self) -> *const () {
            self as *const Self as *const ()
        }
    }

    #[test]
    fn test_all_candidates_fail() {
        let cache = VerdictCache::new();
        let err = cache
            .resolve(&Opaque, &LayoutVersion::ALL, "columns")
            .unwrap_err();
        // the last candidate tried is reported
        assert!(matches!(
            err,
            Error::StructuralMismatch {
                layout: LayoutVersion::Embedded,
                mismatch: Mismatch::Size { .. },
            }
        ));
        assert!(err.is_unavailable());
        assert_eq!(cache.verdict(), Verdict::Unavailable);
    }

    #[test]
    fn test_nested_follows_pointers_and_slices() {
        static LIST: TypeShape = TypeShape {
            name: "List",
            size: 24,
            fields: &[FieldShape {
                name: "items",
                offset: 0,
                kind: ShapeKind::Slice(&MYSQL_CONN_RECORD),
            }],
        };
        assert_eq!(nested(&LIST, "items").map(|s| s.name), Ok("MysqlConn"));
        assert_eq!(
            nested(&LIST, "other").map(|s| s.name),
            Err(Mismatch::MissingField {
                type_name: "List",
                field: "other",
            })
        );
    }
}
