use crate::error::{expect_element, EditError};
use crate::order::{
    insert_child, worksheet_order, AnchorKind, ChildTree, OrderError, WorksheetChild, SHEET_DATA,
};
use crate::xml::{XmlElement, XmlNode};

impl ChildTree<WorksheetChild> for XmlElement {
    type Node = XmlElement;

    fn first_child_of(&self, kind: AnchorKind<WorksheetChild>) -> Option<usize> {
        let local = match kind {
            AnchorKind::Data => SHEET_DATA,
            AnchorKind::Child(tag) => tag.local_name(),
        };
        self.position_of_local(local)
    }

    fn insert_before(&mut self, node: XmlElement, reference: Option<usize>) {
        self.children
            .insert(reference.unwrap_or(0), XmlNode::Element(node));
    }

    fn insert_after(&mut self, node: XmlElement, reference: Option<usize>) {
        match reference {
            Some(idx) => self.children.insert(idx + 1, XmlNode::Element(node)),
            None => self.children.push(XmlNode::Element(node)),
        }
    }

    fn append(&mut self, node: XmlElement) {
        self.children.push(XmlNode::Element(node));
    }

    fn check_node(tag: WorksheetChild, node: &XmlElement) -> Result<(), OrderError> {
        if node.name.local == tag.local_name() {
            Ok(())
        } else {
            Err(OrderError::TagMismatch {
                expected: tag.local_name().to_string(),
                found: node.name.local.clone(),
            })
        }
    }
}

/// Insert `child` into a `<worksheet>` element at its schema position.
///
/// `child` must be the element named by `tag` (e.g. `<pageSetup>` for
/// [`WorksheetChild::PageSetup`]).
///
/// ```
/// use formula_xlsx_edit::{insert_worksheet_child, WorksheetChild, XmlElement};
///
/// let mut sheet = XmlElement::new("worksheet")
///     .with_child(XmlElement::new("sheetData"))
///     .with_child(XmlElement::new("pageMargins"));
/// insert_worksheet_child(&mut sheet, WorksheetChild::PageSetup, XmlElement::new("pageSetup"))?;
///
/// let names: Vec<_> = sheet.element_children().map(|el| el.name.local.as_str()).collect();
/// assert_eq!(names, ["sheetData", "pageMargins", "pageSetup"]);
/// # Ok::<(), formula_xlsx_edit::EditError>(())
/// ```
pub fn insert_worksheet_child(
    worksheet: &mut XmlElement,
    tag: WorksheetChild,
    child: XmlElement,
) -> Result<(), EditError> {
    expect_element("worksheet", &worksheet.name.local)?;
    insert_child(worksheet_order(), worksheet, tag, child)?;
    Ok(())
}
