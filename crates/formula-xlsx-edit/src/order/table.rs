use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::{OrderError, WorksheetChild};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    Before,
    After,
}

/// The kind of existing child an [`AnchorRule`] looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorKind<K> {
    /// The container's data-bearing child (`<sheetData>` for worksheets).
    Data,
    Child(K),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorRule<K> {
    pub relation: Relation,
    pub anchor: AnchorKind<K>,
}

impl<K> AnchorRule<K> {
    pub fn before(anchor: AnchorKind<K>) -> Self {
        Self {
            relation: Relation::Before,
            anchor,
        }
    }

    pub fn after(anchor: AnchorKind<K>) -> Self {
        Self {
            relation: Relation::After,
            anchor,
        }
    }
}

/// Where a new child of a given tag goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement<K> {
    /// Rules tried in priority order. The last rule is the final fallback and is applied even
    /// when its anchor is absent.
    Anchored(Vec<AnchorRule<K>>),
    /// Always becomes the last child; no anchor lookup.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TableEntry<K> {
    tag: K,
    placement: Placement<K>,
}

/// Immutable mapping from child tag to its [`Placement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTable<K> {
    entries: Vec<TableEntry<K>>,
}

impl<K> Default for OrderTable<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq + fmt::Debug> OrderTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a placement for `tag`.
    pub fn with(mut self, tag: K, placement: Placement<K>) -> Result<Self, OrderError> {
        self.insert(tag, placement)?;
        Ok(self)
    }

    pub fn insert(&mut self, tag: K, placement: Placement<K>) -> Result<(), OrderError> {
        if self.entries.iter().any(|entry| entry.tag == tag) {
            return Err(OrderError::DuplicateTag(format!("{tag:?}")));
        }
        if matches!(&placement, Placement::Anchored(rules) if rules.is_empty()) {
            return Err(OrderError::EmptyRuleChain(format!("{tag:?}")));
        }
        self.entries.push(TableEntry { tag, placement });
        Ok(())
    }

    /// Placement rules for `tag`, or [`OrderError::UnknownTag`] when the table has none.
    pub fn rules_for(&self, tag: K) -> Result<&Placement<K>, OrderError> {
        self.entries
            .iter()
            .find(|entry| entry.tag == tag)
            .map(|entry| &entry.placement)
            .ok_or_else(|| OrderError::UnknownTag(format!("{tag:?}")))
    }

    pub fn tags(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|entry| entry.tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K> OrderTable<K>
where
    K: Copy + PartialEq + fmt::Debug + for<'de> Deserialize<'de>,
{
    /// Load a table from its JSON form, applying the same checks as [`OrderTable::insert`].
    pub fn from_json(json: &str) -> Result<Self, OrderError> {
        let raw: OrderTable<K> = serde_json::from_str(json)?;
        let mut table = OrderTable::new();
        for entry in raw.entries {
            table.insert(entry.tag, entry.placement)?;
        }
        Ok(table)
    }
}

/// The SpreadsheetML `<worksheet>` child ordering.
///
/// Built once; shared by every caller.
pub fn worksheet_order() -> &'static OrderTable<WorksheetChild> {
    static TABLE: OnceLock<OrderTable<WorksheetChild>> = OnceLock::new();
    TABLE.get_or_init(build_worksheet_order)
}

fn build_worksheet_order() -> OrderTable<WorksheetChild> {
    use AnchorKind::{Child, Data};
    use WorksheetChild::*;

    let before = AnchorRule::before;
    let after = AnchorRule::after;

    let entries = vec![
        (Columns, Placement::Anchored(vec![before(Data)])),
        (
            SheetViews,
            Placement::Anchored(vec![before(Child(SheetFormatPr)), before(Data)]),
        ),
        (
            SheetFormatPr,
            Placement::Anchored(vec![before(Child(Columns)), before(Data)]),
        ),
        (PageMargins, Placement::Anchored(vec![after(Data)])),
        (
            PageSetup,
            Placement::Anchored(vec![after(Child(PageMargins)), after(Data)]),
        ),
        (
            HeaderFooter,
            Placement::Anchored(vec![after(Child(PageSetup)), after(Data)]),
        ),
        (ConditionalFormatting, Placement::Anchored(vec![after(Data)])),
        (
            DataValidations,
            Placement::Anchored(vec![after(Child(ConditionalFormatting)), after(Data)]),
        ),
        (MergeCells, Placement::Anchored(vec![after(Data)])),
        (
            Hyperlinks,
            Placement::Anchored(vec![after(Child(DataValidations)), after(Data)]),
        ),
        (
            Drawing,
            Placement::Anchored(vec![
                after(Child(HeaderFooter)),
                after(Child(PageSetup)),
                after(Data),
            ]),
        ),
        (ExtLst, Placement::Append),
    ];

    OrderTable {
        entries: entries
            .into_iter()
            .map(|(tag, placement)| TableEntry { tag, placement })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worksheet_table_covers_every_tag_once() {
        let table = worksheet_order();
        assert_eq!(table.len(), WorksheetChild::ALL.len());
        for tag in WorksheetChild::ALL {
            assert!(table.rules_for(tag).is_ok(), "missing rules for {tag}");
        }
    }

    #[test]
    fn only_ext_lst_is_append_only() {
        let table = worksheet_order();
        for tag in WorksheetChild::ALL {
            let append = matches!(table.rules_for(tag).unwrap(), Placement::Append);
            assert_eq!(append, tag == WorksheetChild::ExtLst, "{tag}");
        }
    }

    #[test]
    fn every_anchored_chain_ends_at_the_data_anchor() {
        let table = worksheet_order();
        for tag in WorksheetChild::ALL {
            if let Placement::Anchored(rules) = table.rules_for(tag).unwrap() {
                assert_eq!(rules.last().unwrap().anchor, AnchorKind::Data, "{tag}");
            }
        }
    }

    #[test]
    fn drawing_chain_prefers_header_footer_then_page_setup() {
        let Placement::Anchored(rules) = worksheet_order()
            .rules_for(WorksheetChild::Drawing)
            .unwrap()
            .clone()
        else {
            panic!("drawing should be anchored");
        };
        assert_eq!(
            rules,
            vec![
                AnchorRule::after(AnchorKind::Child(WorksheetChild::HeaderFooter)),
                AnchorRule::after(AnchorKind::Child(WorksheetChild::PageSetup)),
                AnchorRule::after(AnchorKind::Data),
            ]
        );
    }

    #[test]
    fn insert_rejects_duplicates_and_empty_chains() {
        let mut table = OrderTable::new();
        table
            .insert(WorksheetChild::Columns, Placement::Append)
            .unwrap();
        assert!(matches!(
            table.insert(WorksheetChild::Columns, Placement::Append),
            Err(OrderError::DuplicateTag(_))
        ));
        assert!(matches!(
            table.insert(WorksheetChild::Drawing, Placement::Anchored(Vec::new())),
            Err(OrderError::EmptyRuleChain(_))
        ));
    }

    #[test]
    fn unknown_tag_in_custom_table() {
        let table = OrderTable::new()
            .with(WorksheetChild::MergeCells, Placement::Append)
            .unwrap();
        assert!(matches!(
            table.rules_for(WorksheetChild::Hyperlinks),
            Err(OrderError::UnknownTag(_))
        ));
    }

    #[test]
    fn loads_table_from_json() {
        let json = r#"{
            "entries": [
                { "tag": "pageSetup",
                  "placement": { "anchored": [
                      { "relation": "after", "anchor": { "child": "pageMargins" } },
                      { "relation": "after", "anchor": "data" } ] } },
                { "tag": "extLst", "placement": "append" }
            ]
        }"#;
        let table = OrderTable::<WorksheetChild>::from_json(json).unwrap();
        assert_eq!(
            table.rules_for(WorksheetChild::PageSetup).unwrap(),
            worksheet_order()
                .rules_for(WorksheetChild::PageSetup)
                .unwrap()
        );
        assert_eq!(
            table.rules_for(WorksheetChild::ExtLst).unwrap(),
            &Placement::Append
        );
    }

    #[test]
    fn json_with_duplicate_tag_is_rejected() {
        let json = r#"{ "entries": [
            { "tag": "extLst", "placement": "append" },
            { "tag": "extLst", "placement": "append" } ] }"#;
        assert!(matches!(
            OrderTable::<WorksheetChild>::from_json(json),
            Err(OrderError::DuplicateTag(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            OrderTable::<WorksheetChild>::from_json(r#"{ "entries": [ { "tag": "nope" } ] }"#),
            Err(OrderError::Config(_))
        ));
    }
}
