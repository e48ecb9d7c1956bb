//! Cell and row helpers for `<sheetData>` content.
//!
//! Reference cells are identified by their `r` attribute (`"B3"`), reference rows by their
//! 1-based `r` row index. Passing `None` as the reference uses the same convention as the
//! worksheet child inserter: "before nothing" prepends and "after nothing" appends.

use serde::{Deserialize, Serialize};

use crate::a1::CellRef;
use crate::error::{expect_element, EditError};
use crate::order::Relation;
use crate::xml::{XmlElement, XmlNode};

/// Value type recorded in a cell's `t` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellDataType {
    #[serde(rename = "b")]
    Boolean,
    #[serde(rename = "n")]
    Number,
    #[serde(rename = "e")]
    Error,
    #[serde(rename = "s")]
    SharedString,
    #[serde(rename = "str")]
    String,
    #[serde(rename = "inlineStr")]
    InlineString,
    #[serde(rename = "d")]
    Date,
}

impl CellDataType {
    pub fn as_attr(self) -> &'static str {
        match self {
            CellDataType::Boolean => "b",
            CellDataType::Number => "n",
            CellDataType::Error => "e",
            CellDataType::SharedString => "s",
            CellDataType::String => "str",
            CellDataType::InlineString => "inlineStr",
            CellDataType::Date => "d",
        }
    }

    pub fn from_attr(value: &str) -> Option<Self> {
        Some(match value {
            "b" => CellDataType::Boolean,
            "n" => CellDataType::Number,
            "e" => CellDataType::Error,
            "s" => CellDataType::SharedString,
            "str" => CellDataType::String,
            "inlineStr" => CellDataType::InlineString,
            "d" => CellDataType::Date,
            _ => return None,
        })
    }
}

/// Set (or with `None`, clear) the `t` attribute of a `<c>` element.
pub fn set_cell_data_type(
    cell: &mut XmlElement,
    data_type: Option<CellDataType>,
) -> Result<(), EditError> {
    expect_element("c", &cell.name.local)?;
    match data_type {
        Some(data_type) => cell.set_attr("t", data_type.as_attr()),
        None => {
            cell.remove_attr("t");
        }
    }
    Ok(())
}

/// The cell's explicit data type. `None` when `t` is absent or not a known value.
pub fn cell_data_type(cell: &XmlElement) -> Option<CellDataType> {
    cell.attr("t").and_then(CellDataType::from_attr)
}

/// Validate `a1` and store it as the cell's `r` attribute.
pub fn set_cell_reference(cell: &mut XmlElement, a1: &str) -> Result<CellRef, EditError> {
    expect_element("c", &cell.name.local)?;
    let cell_ref = CellRef::from_a1(a1).map_err(|source| EditError::InvalidCellReference {
        reference: a1.to_string(),
        source,
    })?;
    cell.set_attr("r", cell_ref.to_a1());
    Ok(cell_ref)
}

pub fn insert_before_cell(
    row: &mut XmlElement,
    reference: Option<&str>,
    cell: XmlElement,
) -> Result<(), EditError> {
    insert_cell(row, reference, cell, Relation::Before)
}

pub fn insert_after_cell(
    row: &mut XmlElement,
    reference: Option<&str>,
    cell: XmlElement,
) -> Result<(), EditError> {
    insert_cell(row, reference, cell, Relation::After)
}

pub fn insert_before_row(
    sheet_data: &mut XmlElement,
    reference: Option<u32>,
    row: XmlElement,
) -> Result<(), EditError> {
    insert_row(sheet_data, reference, row, Relation::Before)
}

pub fn insert_after_row(
    sheet_data: &mut XmlElement,
    reference: Option<u32>,
    row: XmlElement,
) -> Result<(), EditError> {
    insert_row(sheet_data, reference, row, Relation::After)
}

fn insert_cell(
    row: &mut XmlElement,
    reference: Option<&str>,
    cell: XmlElement,
    relation: Relation,
) -> Result<(), EditError> {
    expect_element("row", &row.name.local)?;
    expect_element("c", &cell.name.local)?;
    let position = match reference {
        Some(r) => Some(
            row.position_of(|el| el.name.local == "c" && el.attr("r") == Some(r))
                .ok_or_else(|| EditError::MissingReference(format!("cell {r}")))?,
        ),
        None => None,
    };
    insert_relative(row, position, relation, cell);
    Ok(())
}

fn insert_row(
    sheet_data: &mut XmlElement,
    reference: Option<u32>,
    row: XmlElement,
    relation: Relation,
) -> Result<(), EditError> {
    expect_element("sheetData", &sheet_data.name.local)?;
    expect_element("row", &row.name.local)?;
    let position = match reference {
        Some(index) => {
            let index_attr = index.to_string();
            Some(
                sheet_data
                    .position_of(|el| {
                        el.name.local == "row" && el.attr("r") == Some(index_attr.as_str())
                    })
                    .ok_or_else(|| EditError::MissingReference(format!("row {index}")))?,
            )
        }
        None => None,
    };
    insert_relative(sheet_data, position, relation, row);
    Ok(())
}

fn insert_relative(
    container: &mut XmlElement,
    position: Option<usize>,
    relation: Relation,
    node: XmlElement,
) {
    let idx = match (relation, position) {
        (Relation::Before, Some(idx)) => idx,
        (Relation::Before, None) => 0,
        (Relation::After, Some(idx)) => idx + 1,
        (Relation::After, None) => container.children.len(),
    };
    container.children.insert(idx, XmlNode::Element(node));
}
