//! Schema-ordered insertion of container children.
//!
//! SpreadsheetML requires the children of `<worksheet>` to appear in a fixed order
//! (`<sheetViews>` before `<sheetFormatPr>`, `<pageMargins>` before `<pageSetup>`, `<extLst>`
//! last, ...). Appending a new section at the end of the element therefore produces files Excel
//! refuses to open.
//!
//! The placement policy lives in an [`OrderTable`]: for every child tag, a priority chain of
//! "before/after the first existing child of kind X" rules, or the append-only rule. The
//! [`insert_child`] algorithm walks that chain against any tree that implements [`ChildTree`].

mod insert;
mod table;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use insert::{insert_child, ChildTree};
pub use table::{worksheet_order, AnchorKind, AnchorRule, OrderTable, Placement, Relation};

/// Local name of the worksheet's row-data element, the data anchor most rules fall back to.
pub const SHEET_DATA: &str = "sheetData";

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("unknown child tag: {0}")]
    UnknownTag(String),
    #[error("child does not match tag: expected <{expected}>, found <{found}>")]
    TagMismatch { expected: String, found: String },
    #[error("placement for {0} has an empty anchor chain")]
    EmptyRuleChain(String),
    #[error("tag {0} appears more than once in the order table")]
    DuplicateTag(String),
    #[error("invalid order table config: {0}")]
    Config(#[from] serde_json::Error),
}

/// A worksheet child element that can be inserted with schema ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorksheetChild {
    #[serde(rename = "cols")]
    Columns,
    #[serde(rename = "sheetViews")]
    SheetViews,
    #[serde(rename = "sheetFormatPr")]
    SheetFormatPr,
    #[serde(rename = "pageMargins")]
    PageMargins,
    #[serde(rename = "pageSetup")]
    PageSetup,
    #[serde(rename = "headerFooter")]
    HeaderFooter,
    #[serde(rename = "conditionalFormatting")]
    ConditionalFormatting,
    #[serde(rename = "dataValidations")]
    DataValidations,
    #[serde(rename = "mergeCells")]
    MergeCells,
    #[serde(rename = "hyperlinks")]
    Hyperlinks,
    #[serde(rename = "drawing")]
    Drawing,
    #[serde(rename = "extLst")]
    ExtLst,
}

impl WorksheetChild {
    pub const ALL: [WorksheetChild; 12] = [
        WorksheetChild::Columns,
        WorksheetChild::SheetViews,
        WorksheetChild::SheetFormatPr,
        WorksheetChild::PageMargins,
        WorksheetChild::PageSetup,
        WorksheetChild::HeaderFooter,
        WorksheetChild::ConditionalFormatting,
        WorksheetChild::DataValidations,
        WorksheetChild::MergeCells,
        WorksheetChild::Hyperlinks,
        WorksheetChild::Drawing,
        WorksheetChild::ExtLst,
    ];

    /// SpreadsheetML local element name for this child.
    pub fn local_name(self) -> &'static str {
        match self {
            WorksheetChild::Columns => "cols",
            WorksheetChild::SheetViews => "sheetViews",
            WorksheetChild::SheetFormatPr => "sheetFormatPr",
            WorksheetChild::PageMargins => "pageMargins",
            WorksheetChild::PageSetup => "pageSetup",
            WorksheetChild::HeaderFooter => "headerFooter",
            WorksheetChild::ConditionalFormatting => "conditionalFormatting",
            WorksheetChild::DataValidations => "dataValidations",
            WorksheetChild::MergeCells => "mergeCells",
            WorksheetChild::Hyperlinks => "hyperlinks",
            WorksheetChild::Drawing => "drawing",
            WorksheetChild::ExtLst => "extLst",
        }
    }

    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.local_name() == name)
    }
}

impl fmt::Display for WorksheetChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.local_name())
    }
}

impl FromStr for WorksheetChild {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_local_name(s).ok_or_else(|| OrderError::UnknownTag(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_names_round_trip_through_from_str() {
        for tag in WorksheetChild::ALL {
            assert_eq!(tag.local_name().parse::<WorksheetChild>().unwrap(), tag);
        }
    }

    #[test]
    fn unknown_local_name_is_rejected() {
        let err = "sheetData".parse::<WorksheetChild>().unwrap_err();
        assert!(matches!(err, OrderError::UnknownTag(ref name) if name == "sheetData"));
    }

    #[test]
    fn serde_names_match_element_names() {
        let json = serde_json::to_string(&WorksheetChild::Columns).unwrap();
        assert_eq!(json, r#""cols""#);
        let tag: WorksheetChild = serde_json::from_str(r#""extLst""#).unwrap();
        assert_eq!(tag, WorksheetChild::ExtLst);
    }
}
