//! Paper-record normalisation and text safety.
//!
//! A stored row goes through [`coercion`] and [`text`] inside the
//! [`RecordAssembler`], producing a [`PaperRecord`] with a fixed key set.
//! Records are then either wrapped in a [`PaperPage`] for the API or embedded
//! in a static page through [`payload`].
//!
//! Everything here is synchronous and free of I/O.

pub mod assembler;
pub mod coercion;
pub mod columns;
pub mod pagination;
pub mod payload;
pub mod record;
pub mod row;
pub mod text;

pub use assembler::{FailurePolicy, RecordAssembler};
pub use coercion::Numeric;
pub use columns::{Topic, PAPER_COLUMNS, TABLE_PAPERS};
pub use pagination::{validate_date, PageRequest, PageWindow, PaperPage};
pub use payload::{render_page, PagePayload, DATA_PLACEHOLDER};
pub use record::{AuthorHIndex, PaperRecord};
pub use row::{RawRow, RowAccessor, Scalar};
pub use text::{MathSymbolTable, TextPipeline};
