use thiserror::Error;

use crate::a1::A1ParseError;
use crate::order::OrderError;
use crate::xml::XmlDomError;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("expected <{expected}> element, found <{found}>")]
    UnexpectedElement {
        expected: &'static str,
        found: String,
    },
    #[error("reference child not found: {0}")]
    MissingReference(String),
    #[error("invalid cell reference {reference:?}: {source}")]
    InvalidCellReference {
        reference: String,
        #[source]
        source: A1ParseError,
    },
    #[error("no table id left after {0}")]
    TableIdOverflow(u32),
    #[error("invalid table definition: {0}")]
    Table(#[from] quick_xml::DeError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Xml(#[from] XmlDomError),
}

/// Fail with [`EditError::UnexpectedElement`] unless `found` is `expected`.
pub(crate) fn expect_element(expected: &'static str, found: &str) -> Result<(), EditError> {
    if found == expected {
        Ok(())
    } else {
        Err(EditError::UnexpectedElement {
            expected,
            found: found.to_string(),
        })
    }
}
