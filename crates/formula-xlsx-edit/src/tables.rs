use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::EditError;

/// Identity of a table part (`xl/tables/tableN.xml`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename = "table")]
pub struct TableDefinition {
    #[serde(rename = "@id")]
    pub id: u32,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@displayName")]
    pub display_name: String,
    #[serde(rename = "@ref")]
    pub reference: String,
}

pub fn parse_table_definition(xml: &str) -> Result<TableDefinition, EditError> {
    Ok(from_str(xml)?)
}

/// Look up a table among one worksheet's table parts.
///
/// With no name (or an empty one) the first table is returned. Otherwise names are compared
/// case-insensitively, as Excel does.
pub fn find_table<'a>(
    tables: &'a [TableDefinition],
    name: Option<&str>,
) -> Option<&'a TableDefinition> {
    match name {
        None | Some("") => tables.first(),
        Some(name) => tables
            .iter()
            .find(|table| eq_ignore_case(&table.name, name)),
    }
}

/// Next free table id: one past the largest id used by any table in the workbook.
///
/// Table ids are unique across every worksheet, so `tables` should cover all of them.
pub fn next_table_id<'a>(
    tables: impl IntoIterator<Item = &'a TableDefinition>,
) -> Result<u32, EditError> {
    match tables.into_iter().map(|table| table.id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(EditError::TableIdOverflow(max)),
    }
}

/// Per-char comparison under simple (one-to-one) uppercase mapping. Characters whose uppercase
/// form expands to several chars (`ß`) only match themselves.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().map(simple_upper).eq(b.chars().map(simple_upper))
}

fn simple_upper(c: char) -> char {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: u32, name: &str) -> TableDefinition {
        TableDefinition {
            id,
            name: name.to_string(),
            display_name: name.to_string(),
            reference: "A1:B3".to_string(),
        }
    }

    #[test]
    fn parses_table_part_header() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="3" name="Sales" displayName="Sales_Table" ref="A1:C4" totalsRowShown="0">
  <autoFilter ref="A1:C4"/>
  <tableColumns count="3">
    <tableColumn id="1" name="Region"/>
    <tableColumn id="2" name="Q1"/>
    <tableColumn id="3" name="Q2"/>
  </tableColumns>
  <tableStyleInfo name="TableStyleMedium2" showFirstColumn="0" showLastColumn="0" showRowStripes="1" showColumnStripes="0"/>
</table>"#;
        let table = parse_table_definition(xml).unwrap();
        assert_eq!(
            table,
            TableDefinition {
                id: 3,
                name: "Sales".to_string(),
                display_name: "Sales_Table".to_string(),
                reference: "A1:C4".to_string(),
            }
        );
    }

    #[test]
    fn table_without_id_is_rejected() {
        let xml = r#"<table name="T" displayName="T" ref="A1:A2"/>"#;
        assert!(matches!(
            parse_table_definition(xml),
            Err(EditError::Table(_))
        ));
    }

    #[test]
    fn find_table_on_empty_list() {
        assert_eq!(find_table(&[], Some("MyTable")), None);
        assert_eq!(find_table(&[], None), None);
    }

    #[test]
    fn find_table_without_name_returns_first() {
        let tables = [table(1, "Table1"), table(2, "Table2")];
        assert_eq!(find_table(&tables, None).unwrap().name, "Table1");
        assert_eq!(find_table(&tables, Some("")).unwrap().name, "Table1");
    }

    #[test]
    fn find_table_matches_name_case_insensitively() {
        let tables = [table(1, "TableA"), table(2, "TableB")];
        assert_eq!(find_table(&tables, Some("TableB")).unwrap().id, 2);
        assert_eq!(find_table(&tables, Some("tableb")).unwrap().id, 2);
        assert_eq!(find_table(&tables, Some("TableC")), None);
    }

    #[test]
    fn find_table_uses_one_to_one_case_mapping() {
        let tables = [table(1, "Ärger"), table(2, "Straße")];
        assert_eq!(find_table(&tables, Some("äRGER")).unwrap().id, 1);
        assert_eq!(find_table(&tables, Some("STRAßE")).unwrap().id, 2);
        assert_eq!(find_table(&tables, Some("STRASSE")), None);
        assert_eq!(find_table(&[table(3, "İ")], Some("i")), None);
    }

    #[test]
    fn next_table_id_starts_at_one() {
        assert_eq!(next_table_id(&[]).unwrap(), 1);
    }

    #[test]
    fn next_table_id_spans_all_sheets() {
        let sheet1 = vec![table(1, "A"), table(7, "B")];
        let sheet2 = vec![table(3, "C")];
        let id = next_table_id(sheet1.iter().chain(sheet2.iter())).unwrap();
        assert_eq!(id, 8);
    }

    #[test]
    fn next_table_id_overflow() {
        let tables = [table(u32::MAX, "Last")];
        assert!(matches!(
            next_table_id(&tables),
            Err(EditError::TableIdOverflow(u32::MAX))
        ));
    }
}
