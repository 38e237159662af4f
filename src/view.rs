//! Client-side table view: search, sort and pagination over a normalized
//! result, shared by the text and TUI renderers.
//!
//! A view is always rebuilt from fresh data; rebuilding discards all prior
//! filter/sort/page state so nothing leaks from a previous result into its
//! replacement.

use crate::model::NormalizedResult;
use serde_json::Value;
use std::cmp::Ordering;

/// Selectable page sizes, smallest first.
pub const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

pub const EMPTY_NOTICE: &str = "No data to display";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

#[derive(Debug)]
pub struct TableView {
    data: NormalizedResult,
    search: String,
    sort: Option<(usize, SortOrder)>,
    page: usize,
    page_size: usize,
}

impl TableView {
    pub fn new(data: NormalizedResult) -> Self {
        Self {
            data,
            search: String::new(),
            sort: None,
            page: 0,
            page_size: PAGE_SIZES[0],
        }
    }

    /// True when no columns could be derived; the renderer shows
    /// [`EMPTY_NOTICE`] instead of a table.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.data.columns
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> Option<(usize, SortOrder)> {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_rows(&self) -> usize {
        self.data.records.len()
    }

    pub fn filtered_rows(&self) -> usize {
        self.filtered().len()
    }

    /// Replace the search text; the page resets so results are visible.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 0;
    }

    /// Sort by the given column, toggling direction when it is already the
    /// sort key. Out-of-range columns are ignored.
    pub fn sort_by(&mut self, column: usize) {
        if column >= self.data.columns.len() {
            return;
        }
        self.sort = match self.sort {
            Some((current, order)) if current == column => Some((column, order.toggled())),
            _ => Some((column, SortOrder::Ascending)),
        };
        self.page = 0;
    }

    pub fn set_page_size(&mut self, size: usize) {
        if PAGE_SIZES.contains(&size) {
            self.page_size = size;
            self.page = 0;
        }
    }

    /// Advance to the next selectable page size, wrapping around.
    pub fn cycle_page_size(&mut self) {
        let at = PAGE_SIZES
            .iter()
            .position(|&s| s == self.page_size)
            .unwrap_or(0);
        self.page_size = PAGE_SIZES[(at + 1) % PAGE_SIZES.len()];
        self.page = 0;
    }

    pub fn page_count(&self) -> usize {
        let rows = self.filtered_rows();
        if rows == 0 {
            1
        } else {
            rows.div_ceil(self.page_size)
        }
    }

    pub fn next_page(&mut self) {
        if self.page + 1 < self.page_count() {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Cells of the current page, after search and sort, read through the
    /// column list.
    pub fn visible_rows(&self) -> Vec<Vec<String>> {
        let filtered = self.filtered();
        let start = (self.page * self.page_size).min(filtered.len());
        let end = (start + self.page_size).min(filtered.len());
        filtered[start..end]
            .iter()
            .map(|&i| self.row_cells(i))
            .collect()
    }

    /// Every filtered row, unpaged, for the plain-text renderer.
    pub fn all_rows(&self) -> Vec<Vec<String>> {
        self.filtered().iter().map(|&i| self.row_cells(i)).collect()
    }

    /// Pagination summary in the renderer's display language.
    pub fn info_line(&self) -> String {
        let filtered = self.filtered_rows();
        if filtered == 0 {
            return "No records available".into();
        }
        let start = (self.page * self.page_size).min(filtered - 1) + 1;
        let end = (self.page * self.page_size + self.page_size).min(filtered);
        let mut line = format!("Showing {start} to {end} of {filtered} entries");
        if filtered != self.total_rows() {
            line.push_str(&format!(
                " (filtered from {} total entries)",
                self.total_rows()
            ));
        }
        line
    }

    /// CSV of the full normalized data, independent of search/sort/page.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_csv_row(&mut out, self.data.columns.iter().map(String::as_str));
        for record in &self.data.records {
            let cells: Vec<String> = self
                .data
                .columns
                .iter()
                .map(|col| cell_text(record.get(col)))
                .collect();
            push_csv_row(&mut out, cells.iter().map(String::as_str));
        }
        out
    }

    fn row_cells(&self, index: usize) -> Vec<String> {
        let record = &self.data.records[index];
        self.data
            .columns
            .iter()
            .map(|col| cell_text(record.get(col)))
            .collect()
    }

    /// Record indices after search and sort are applied.
    fn filtered(&self) -> Vec<usize> {
        let needle = self.search.trim().to_lowercase();
        let mut indices: Vec<usize> = (0..self.data.records.len())
            .filter(|&i| {
                if needle.is_empty() {
                    return true;
                }
                let record = &self.data.records[i];
                self.data
                    .columns
                    .iter()
                    .any(|col| cell_text(record.get(col)).to_lowercase().contains(&needle))
            })
            .collect();

        if let Some((column, order)) = self.sort {
            if let Some(name) = self.data.columns.get(column) {
                indices.sort_by(|&a, &b| {
                    let va = cell_text(self.data.records[a].get(name));
                    let vb = cell_text(self.data.records[b].get(name));
                    let ord = compare_cells(&va, &vb);
                    match order {
                        SortOrder::Ascending => ord,
                        SortOrder::Descending => ord.reverse(),
                    }
                });
            }
        }
        indices
    }
}

/// Numeric comparison when both sides parse as numbers, lexicographic
/// otherwise.
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// Display text for one cell. Strings render bare, everything else as its
/// JSON form, absent fields as empty.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => sanitize(s),
        Some(other) => sanitize(&other.to_string()),
    }
}

/// Strip terminal control characters so backend-supplied text cannot corrupt
/// the display.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn push_csv_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&csv_field(cell));
    }
    out.push('\n');
}

fn csv_field(cell: &str) -> String {
    if cell.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use serde_json::json;

    fn view_from(v: serde_json::Value) -> TableView {
        let payload = serde_json::from_value(v).unwrap();
        TableView::new(normalize(&payload))
    }

    fn numbered(n: usize) -> TableView {
        let records: Vec<_> = (0..n).map(|i| json!({"id": i, "name": format!("row{i}")})).collect();
        view_from(json!({ "records": records }))
    }

    #[test]
    fn empty_result_is_the_empty_state() {
        let view = view_from(json!({}));
        assert!(view.is_empty());
        assert_eq!(view.info_line(), "No records available");
    }

    #[test]
    fn pagination_clamps_at_both_ends() {
        let mut view = numbered(25);
        assert_eq!(view.page_count(), 3);
        assert_eq!(view.visible_rows().len(), 10);

        view.prev_page();
        assert_eq!(view.page(), 0);

        view.next_page();
        view.next_page();
        assert_eq!(view.page(), 2);
        assert_eq!(view.visible_rows().len(), 5);

        view.next_page();
        assert_eq!(view.page(), 2);
    }

    #[test]
    fn page_size_cycles_through_the_menu() {
        let mut view = numbered(120);
        assert_eq!(view.page_size(), 10);
        view.next_page();
        view.cycle_page_size();
        assert_eq!(view.page_size(), 25);
        assert_eq!(view.page(), 0);
        view.cycle_page_size();
        view.cycle_page_size();
        view.cycle_page_size();
        assert_eq!(view.page_size(), 10);
    }

    #[test]
    fn search_filters_across_all_cells() {
        let mut view = view_from(json!({
            "records": [
                {"epitope": "SIINFEKL", "protein": "OVA"},
                {"epitope": "GILGFVFTL", "protein": "Flu-M1"}
            ]
        }));
        view.set_search("flu");
        assert_eq!(view.filtered_rows(), 1);
        assert_eq!(view.visible_rows()[0][0], "GILGFVFTL");
        assert_eq!(
            view.info_line(),
            "Showing 1 to 1 of 1 entries (filtered from 2 total entries)"
        );

        view.set_search("");
        assert_eq!(view.filtered_rows(), 2);
    }

    #[test]
    fn sort_is_numeric_when_cells_parse_and_toggles() {
        let mut view = view_from(json!({
            "records": [
                {"name": "b", "count": 10},
                {"name": "a", "count": 2},
                {"name": "c", "count": 1}
            ]
        }));
        // Numeric: 1, 2, 10 rather than "1", "10", "2".
        view.sort_by(1);
        let rows = view.visible_rows();
        assert_eq!(rows[0][1], "1");
        assert_eq!(rows[1][1], "2");
        assert_eq!(rows[2][1], "10");

        view.sort_by(1);
        assert_eq!(view.visible_rows()[0][1], "10");

        view.sort_by(0);
        assert_eq!(view.sort(), Some((0, SortOrder::Ascending)));
        assert_eq!(view.visible_rows()[0][0], "a");
    }

    #[test]
    fn missing_fields_render_as_empty_cells() {
        let view = view_from(json!({
            "columns": ["a", "b"],
            "records": [{"a": 1}]
        }));
        assert_eq!(view.visible_rows()[0], vec!["1".to_string(), String::new()]);
    }

    #[test]
    fn rebuild_discards_prior_state() {
        let mut view = numbered(50);
        view.set_search("row4");
        view.sort_by(0);
        view.cycle_page_size();

        let view = TableView::new(NormalizedResult::default());
        assert!(view.search().is_empty());
        assert!(view.sort().is_none());
        assert_eq!(view.page_size(), 10);
    }

    #[test]
    fn csv_quotes_only_where_needed() {
        let view = view_from(json!({
            "records": [{"name": "a,b", "note": "say \"hi\"", "plain": "x"}]
        }));
        let csv = view.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("name,note,plain"));
        assert_eq!(lines.next(), Some("\"a,b\",\"say \"\"hi\"\"\",x"));
    }

    #[test]
    fn csv_exports_all_rows_regardless_of_page() {
        let mut view = numbered(35);
        view.set_search("row1");
        let csv = view.to_csv();
        // Header plus every record, not just the filtered page.
        assert_eq!(csv.lines().count(), 36);
    }

    #[test]
    fn sanitize_replaces_control_characters() {
        assert_eq!(sanitize("ok\x1b[31mred"), "ok [31mred");
        assert_eq!(sanitize("a\tb\nc"), "a b c");
        assert_eq!(sanitize("plain"), "plain");
    }
}
