//! A driver whose row type has a known name but an unknown structure
//! disables extraction for the rest of the process.
//!
//! Runs in its own test binary because it poisons the global inspector.

use std::any::Any;
use std::mem::{offset_of, size_of};

use mysql_internals_rs::{
    columns, driver, is_binary, ColumnDescriptor, DriverRows, Error, FieldShape, FieldType,
    Inspector, Primitive, Reflect, Result, Row, Rows, ShapeKind, TypeShape, Value, Verdict,
};

/// Row type of an unsupported driver release, sharing the current name.
#[repr(C)]
struct TextRows {
    buffer: Vec<u8>,
    done: bool,
}

static U8_KIND: ShapeKind = ShapeKind::Scalar(Primitive::U8);

static TEXT_ROWS_SHAPE: TypeShape = TypeShape {
    name: "TextRows",
    size: size_of::<TextRows>(),
    fields: &[
        FieldShape {
            name: "buffer",
            offset: offset_of!(TextRows, buffer),
            kind: ShapeKind::Slice(&U8_KIND),
        },
        FieldShape {
            name: "done",
            offset: offset_of!(TextRows, done),
            kind: ShapeKind::Scalar(Primitive::Bool),
        },
    ],
};

impl DriverRows for TextRows {
    fn columns(&self) -> Vec<String> {
        vec!["payload".to_string()]
    }

    fn next(&mut self, dest: &mut [Value]) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        self.done = true;
        dest[0] = Value::Bytes(self.buffer.clone().into());
        Ok(true)
    }

    fn close(&mut self) -> Result<()> {
        self.done = true;
        Ok(())
    }

    fn as_reflect(&self) -> Option<&dyn Reflect> {
        Some(self)
    }
}

unsafe impl Reflect for TextRows {
    fn shape(&self) -> &'static TypeShape {
        &TEXT_ROWS_SHAPE
    }

    fn field(&self, index: usize) -> Option<&dyn Any> {
        match index {
            0 => Some(&self.buffer as &dyn Any),
            1 => Some(&self.done as &dyn Any),
            _ => None,
        }
    }

    fn as_ptr(&self) -> *const () {
        self as *const Self as *const ()
    }
}

#[test]
fn test_structural_mismatch_disables_extraction() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let cache = Inspector::global().cache();
    let mut foreign = Rows::new(Box::new(TextRows {
        buffer: b"hello".to_vec(),
        done: false,
    }));

    let err = columns(Some(&foreign)).unwrap_err();
    assert!(matches!(err, Error::StructuralMismatch { .. }), "{err}");
    assert!(err.is_unavailable());
    assert_eq!(cache.verdict(), Verdict::Unavailable);
    assert_eq!(cache.probe_count(), 1);

    // the cursor itself still works
    let fetched = foreign.fetch_all().unwrap();
    assert_eq!(fetched[0][0].as_str(), Some("hello"));

    // every later call short-circuits, also for supported rows
    let supported = driver::text_rows(
        vec![ColumnDescriptor::new("id", FieldType::LONG)],
        vec![],
    );
    assert_eq!(
        columns(Some(&supported)).err(),
        Some(Error::Unavailable { operation: "columns" })
    );
    assert_eq!(
        is_binary(Some(&Row::from_rows(supported))).err(),
        Some(Error::Unavailable { operation: "is_binary" })
    );
    assert_eq!(columns::<Rows>(None).err(), Some(Error::Unavailable { operation: "columns" }));
    assert_eq!(cache.probe_count(), 1);
}
