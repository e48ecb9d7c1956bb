//! In-memory SpreadsheetML editing helpers.
//!
//! The centerpiece is schema-ordered child insertion: [`insert_worksheet_child`] places a new
//! `<cols>`, `<pageSetup>`, `<extLst>`, ... element where the SpreadsheetML schema requires it,
//! using the table-driven rules in [`order`]. The same algorithm ([`insert_child`]) works on any
//! tree that implements [`ChildTree`], with any [`OrderTable`].
//!
//! The crate also carries the small helpers that usually surround that kind of editing:
//!
//! - [`XmlElement`]: an owned element tree for worksheet parts (parse + serialize).
//! - [`cells`]: cell `t`/`r` attributes and reference-relative cell/row insertion.
//! - [`tables`]: table part lookup by name and workbook-unique table id allocation.

pub mod a1;
pub mod cells;
mod error;
pub mod order;
pub mod tables;
mod worksheet;
pub mod xml;

pub use a1::{A1ParseError, CellRef};
pub use cells::{
    cell_data_type, insert_after_cell, insert_after_row, insert_before_cell, insert_before_row,
    set_cell_data_type, set_cell_reference, CellDataType,
};
pub use error::EditError;
pub use order::{
    insert_child, worksheet_order, AnchorKind, AnchorRule, ChildTree, OrderError, OrderTable,
    Placement, Relation, WorksheetChild,
};
pub use tables::{find_table, next_table_id, parse_table_definition, TableDefinition};
pub use worksheet::insert_worksheet_child;
pub use xml::{QName, XmlDomError, XmlElement, XmlNode};
