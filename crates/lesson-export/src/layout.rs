//! Page layout for the exported lesson plan.
//!
//! Layout runs top-down with a running vertical offset, measured in
//! millimetres from the top edge of an A4 page. Content that would run past
//! the bottom threshold starts a new page and resets the offset. The result
//! is a renderer-independent list of pages and drawing operations; the PDF
//! backend only converts coordinates and emits them.

use crate::{ResolvedLessonPlan, ACTIVITY_HEADINGS};

/// A4 page width in millimetres.
pub const PAGE_WIDTH_MM: f32 = 210.0;

/// A4 page height in millimetres.
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Left margin for body text.
const LEFT_MARGIN: f32 = 10.0;

const TITLE_X: f32 = 90.0;
const TITLE_Y: f32 = 15.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;

const TABLE_START_Y: f32 = 120.0;
const TABLE_MARGIN: f32 = 14.0;
const TABLE_ROW_HEIGHT: f32 = 8.0;
const TABLE_CELL_PADDING: f32 = 2.0;
const TABLE_TEXT_SIZE: f32 = 10.0;

/// Generated text is wrapped to this many columns before placement.
pub const WRAP_COLUMNS: usize = 85;

/// Content lines are drawn this far below the running offset.
const CONTENT_OFFSET: f32 = 20.0;
const LINE_ADVANCE: f32 = 7.0;

/// Offset past which a content line starts a new page.
const PAGE_BREAK_THRESHOLD: f32 = 270.0;

/// Offset past which the notes footer moves to a fresh page.
const FOOTER_THRESHOLD: f32 = 250.0;

/// Offset a new page starts from.
const PAGE_TOP: f32 = 20.0;

/// Font weight of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    /// Regular Helvetica.
    Regular,
    /// Bold Helvetica.
    Bold,
}

/// A single drawing operation. Coordinates are millimetres from the top-left.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A text run whose baseline starts at `(x, y)`.
    Text {
        /// Horizontal position.
        x: f32,
        /// Baseline position.
        y: f32,
        /// Font size in points.
        size: f32,
        /// Font weight.
        weight: FontWeight,
        /// The text.
        text: String,
    },
    /// A straight line, used for the table grid.
    Rule {
        /// Start point.
        from: (f32, f32),
        /// End point.
        to: (f32, f32),
    },
}

/// One page of the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Drawing operations in paint order.
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// Iterates over the text runs on this page.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rule { .. } => None,
        })
    }

    /// Returns `true` if a text run on this page equals `needle`.
    #[must_use]
    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|text| text == needle)
    }
}

/// A laid-out document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    /// Page width in millimetres.
    pub page_width: f32,
    /// Page height in millimetres.
    pub page_height: f32,
    /// Pages in order. Never empty.
    pub pages: Vec<Page>,
}

impl DocumentLayout {
    fn new() -> Self {
        Self {
            page_width: PAGE_WIDTH_MM,
            page_height: PAGE_HEIGHT_MM,
            pages: vec![Page::default()],
        }
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Returns `true` if any page carries a text run equal to `needle`.
    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages.iter().any(|page| page.has_text(needle))
    }

    fn current(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn add_page(&mut self) {
        self.pages.push(Page::default());
    }

    fn text(&mut self, x: f32, y: f32, size: f32, weight: FontWeight, text: impl Into<String>) {
        self.current().ops.push(DrawOp::Text {
            x,
            y,
            size,
            weight,
            text: text.into(),
        });
    }

    fn rule(&mut self, from: (f32, f32), to: (f32, f32)) {
        self.current().ops.push(DrawOp::Rule { from, to });
    }
}

/// Lays out a resolved lesson plan.
#[must_use]
pub fn layout_document(plan: &ResolvedLessonPlan) -> DocumentLayout {
    let mut doc = DocumentLayout::new();

    doc.text(TITLE_X, TITLE_Y, TITLE_SIZE, FontWeight::Bold, &plan.title);

    write_details(&mut doc, plan);
    let table_bottom = write_activity_table(&mut doc, plan);

    let mut y = table_bottom + 10.0;
    doc.text(
        LEFT_MARGIN,
        y + 10.0,
        BODY_SIZE,
        FontWeight::Bold,
        "AI-Generated Lesson Plan:",
    );

    for line in wrap_text(&plan.content, WRAP_COLUMNS) {
        if y > PAGE_BREAK_THRESHOLD {
            doc.add_page();
            y = PAGE_TOP;
        }
        doc.text(LEFT_MARGIN, y + CONTENT_OFFSET, BODY_SIZE, FontWeight::Regular, line);
        y += LINE_ADVANCE;
    }

    if y > FOOTER_THRESHOLD {
        doc.add_page();
    }

    let height = doc.page_height;
    doc.text(LEFT_MARGIN, height - 40.0, BODY_SIZE, FontWeight::Bold, "Notes:");
    doc.text(
        LEFT_MARGIN,
        height - 30.0,
        BODY_SIZE,
        FontWeight::Regular,
        plan.notes.as_str(),
    );

    doc
}

/// Writes the form fields at their fixed offsets on the first page.
///
/// Each field has a single 10 mm slot above the activity table, so values
/// are collapsed onto one line and cut to [`WRAP_COLUMNS`] characters. The
/// Markdown and JSON exports carry the full text.
fn write_details(doc: &mut DocumentLayout, plan: &ResolvedLessonPlan) {
    let regular = FontWeight::Regular;
    let bold = FontWeight::Bold;

    let fields = [
        (30.0, regular, format!("Topic: {}", plan.topic)),
        (40.0, regular, format!("Grade Level: {}", plan.grade_level)),
        (50.0, regular, format!("Main Concept: {}", plan.main_concept)),
        (60.0, regular, "Materials Needed:".to_string()),
        (70.0, regular, plan.materials.clone()),
        (80.0, bold, "Learning Objectives:".to_string()),
        (90.0, regular, plan.objectives.clone()),
        (100.0, bold, "Lesson Outline:".to_string()),
        (110.0, regular, plan.lesson_outline.clone()),
    ];
    for (y, weight, text) in fields {
        doc.text(LEFT_MARGIN, y, BODY_SIZE, weight, fit_line(&text));
    }
}

/// Draws the grid table and returns the offset of its bottom edge.
fn write_activity_table(doc: &mut DocumentLayout, plan: &ResolvedLessonPlan) -> f32 {
    let width = doc.page_width - 2.0 * TABLE_MARGIN;
    let column_width = width / 3.0;
    let rows: Vec<[&str; 3]> = std::iter::once(ACTIVITY_HEADINGS)
        .chain(
            plan.activities
                .iter()
                .map(|row| [row.duration, row.guide, row.remarks]),
        )
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let bottom = TABLE_START_Y + rows.len() as f32 * TABLE_ROW_HEIGHT;

    for (index, cells) in rows.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let top = TABLE_START_Y + index as f32 * TABLE_ROW_HEIGHT;
        let weight = if index == 0 {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        };
        for (column, cell) in cells.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let x = TABLE_MARGIN + column as f32 * column_width + TABLE_CELL_PADDING;
            doc.text(x, top + TABLE_ROW_HEIGHT - 2.5, TABLE_TEXT_SIZE, weight, *cell);
        }
    }

    for index in 0..=rows.len() {
        #[allow(clippy::cast_precision_loss)]
        let y = TABLE_START_Y + index as f32 * TABLE_ROW_HEIGHT;
        doc.rule((TABLE_MARGIN, y), (TABLE_MARGIN + width, y));
    }
    for column in 0..=3 {
        #[allow(clippy::cast_precision_loss)]
        let x = TABLE_MARGIN + column as f32 * column_width;
        doc.rule((x, TABLE_START_Y), (x, bottom));
    }

    bottom
}

/// Collapses a field value onto one line of at most [`WRAP_COLUMNS`]
/// characters, ending in `...` when cut.
fn fit_line(value: &str) -> String {
    let line = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= WRAP_COLUMNS {
        return line;
    }
    let mut cut: String = line.chars().take(WRAP_COLUMNS - 3).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str("...");
    cut
}

/// Wraps text to at most `width` characters per line.
///
/// Existing line breaks are kept, blank lines survive as empty lines, and
/// words longer than `width` are split.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{LessonPlanDocument, NOTES_TEXT, NOT_PROVIDED, NO_CONTENT_PLACEHOLDER};

    fn layout_with_content(content: &str) -> DocumentLayout {
        let document = LessonPlanDocument {
            topic: "Water Cycle".to_string(),
            content: content.to_string(),
            ..Default::default()
        };
        layout_document(&document.resolve())
    }

    fn numbered_lines(count: usize) -> String {
        (1..=count)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ------------------------------------------------------------------------
    // wrap_text
    // ------------------------------------------------------------------------

    #[test]
    fn test_wrap_short_text_is_unchanged() {
        assert_eq!(wrap_text("Hello world", 85), vec!["Hello world"]);
    }

    #[test]
    fn test_wrap_breaks_at_word_boundary() {
        let lines = wrap_text("aaa bbb ccc", 7);
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
    }

    #[test]
    fn test_wrap_keeps_line_breaks_and_blank_lines() {
        let lines = wrap_text("# Title\n\nBody text", 85);
        assert_eq!(lines, vec!["# Title", "", "Body text"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap_text("ab abcdefghij", 4);
        assert_eq!(lines, vec!["ab", "abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_counts_characters_not_bytes() {
        let lines = wrap_text("éé éé", 5);
        assert_eq!(lines, vec!["éé éé"]);
    }

    #[test]
    fn test_wrap_never_exceeds_width() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        for line in wrap_text(&text, WRAP_COLUMNS) {
            assert!(line.chars().count() <= WRAP_COLUMNS, "too long: {line}");
        }
    }

    // ------------------------------------------------------------------------
    // layout_document
    // ------------------------------------------------------------------------

    #[test]
    fn test_empty_document_lays_out_on_one_page() {
        let layout = layout_document(&LessonPlanDocument::default().resolve());

        assert_eq!(layout.page_count(), 1);
        assert!(layout.contains_text("LESSON PLAN"));
        assert!(layout.contains_text("Topic: Not provided"));
        assert!(layout.contains_text("Grade Level: Not provided"));
        assert!(layout.contains_text("Main Concept: Not provided"));
        assert!(layout.contains_text(NO_CONTENT_PLACEHOLDER));
        assert!(layout.contains_text("Notes:"));
        assert!(layout.contains_text(NOTES_TEXT));

        let not_provided = layout.pages[0]
            .texts()
            .filter(|text| text.contains(NOT_PROVIDED))
            .count();
        assert_eq!(not_provided, 6);
    }

    #[test]
    fn test_activity_table_is_drawn() {
        let layout = layout_with_content("Short plan");
        let first = &layout.pages[0];

        for heading in ACTIVITY_HEADINGS {
            assert!(first.has_text(heading));
        }
        assert!(first.has_text("Introduction & Warm-Up"));
        assert!(first.has_text("Summary & Homework"));

        let rules = first
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Rule { .. }))
            .count();
        // 7 horizontal lines for 6 rows, 4 vertical lines for 3 columns
        assert_eq!(rules, 11);
    }

    #[test]
    fn test_content_starts_below_table() {
        let layout = layout_with_content("First line");
        let first_line_y = layout.pages[0]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { y, text, .. } if text == "First line" => Some(*y),
                _ => None,
            })
            .unwrap();

        assert!((first_line_y - 198.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ten_lines_fit_with_footer_on_first_page() {
        let layout = layout_with_content(&numbered_lines(10));
        assert_eq!(layout.page_count(), 1);
        assert!(layout.pages[0].has_text("Notes:"));
    }

    #[test]
    fn test_footer_moves_to_new_page_near_bottom() {
        let layout = layout_with_content(&numbered_lines(11));

        assert_eq!(layout.page_count(), 2);
        assert!(layout.pages[0].has_text("line 11"));
        assert!(!layout.pages[0].has_text("Notes:"));
        assert!(layout.pages[1].has_text("Notes:"));
        assert!(layout.pages[1].has_text(NOTES_TEXT));
    }

    #[test]
    fn test_long_content_paginates() {
        let layout = layout_with_content(&numbered_lines(100));

        // 14 lines fit on the first page, 36 on each following page
        assert!(layout.pages[0].has_text("line 14"));
        assert!(!layout.pages[0].has_text("line 15"));
        assert!(layout.pages[1].has_text("line 15"));
        assert!(layout.pages[1].has_text("line 50"));
        assert!(layout.pages[2].has_text("line 51"));
        assert!(layout.pages[2].has_text("line 86"));
        assert!(layout.pages[3].has_text("line 87"));
        assert_eq!(layout.page_count(), 4);
        assert!(layout.pages[3].has_text("Notes:"));
        assert!(!layout.pages[2].has_text("Notes:"));
    }

    #[test]
    fn test_new_page_resets_offset() {
        let layout = layout_with_content(&numbered_lines(15));
        let second_page_first_y = layout.pages[1]
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { y, text, .. } if text == "line 15" => Some(*y),
                _ => None,
            })
            .unwrap();

        assert!((second_page_first_y - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_all_text_stays_on_page() {
        let layout = layout_with_content(&numbered_lines(300));
        for page in &layout.pages {
            for op in &page.ops {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y > 0.0 && *y < PAGE_HEIGHT_MM);
                }
            }
        }
    }

    #[test]
    fn test_multiline_field_collapses_to_one_line() {
        let document = LessonPlanDocument {
            materials: "Paper\nScissors\n  Glue".to_string(),
            ..Default::default()
        };
        let layout = layout_document(&document.resolve());
        assert!(layout.contains_text("Paper Scissors Glue"));
    }

    #[test]
    fn test_long_field_is_cut_to_page_width() {
        let document = LessonPlanDocument {
            topic: "Volcanoes ".repeat(20),
            objectives: "Explain eruptions. ".repeat(10),
            ..Default::default()
        };
        let layout = layout_document(&document.resolve());

        let fields: Vec<&str> = layout.pages[0]
            .texts()
            .filter(|text| text.starts_with("Topic:") || text.starts_with("Explain"))
            .collect();
        assert_eq!(fields.len(), 2);
        for text in fields {
            assert!(text.chars().count() <= WRAP_COLUMNS);
            assert!(text.ends_with("..."));
        }
    }

    #[test]
    fn test_field_at_width_is_not_cut() {
        let value = "x".repeat(WRAP_COLUMNS - "Topic: ".len());
        let document = LessonPlanDocument {
            topic: value.clone(),
            ..Default::default()
        };
        let layout = layout_document(&document.resolve());
        assert!(layout.contains_text(&format!("Topic: {value}")));
    }
}
