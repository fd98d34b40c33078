//! In-memory document tree
//!
//! Builders produce a [`Document`]; the `.docx` writer serialises it. Tests
//! read it back through [`Document::all_text`] without unpacking any XML.

/// Colour as written into WordprocessingML (`RRGGBB`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GREY: Rgb = Rgb(128, 128, 128);
    pub const RED: Rgb = Rgb(255, 0, 0);
    /// Titles, option rows, information frame
    pub const ACCENT: Rgb = Rgb(2, 136, 190);
    pub const MAIL: Rgb = Rgb(0, 112, 192);
    /// Header cells of every table
    pub const HEADER_FILL: Rgb = Rgb(0xB8, 0xCC, 0xE4);

    pub fn hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Computed field, resolved by the word processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Page,
    NumPages,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunContent {
    /// `\n` becomes a line break inside the paragraph
    Text(String),
    Field(Field),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub content: RunContent,
    pub bold: bool,
    pub underline: bool,
    /// Font size in points
    pub size: Option<u32>,
    pub color: Option<Rgb>,
}

impl Run {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: RunContent::Text(text.into()),
            bold: false,
            underline: false,
            size: None,
            color: None,
        }
    }

    pub fn field(field: Field) -> Self {
        Self {
            content: RunContent::Field(field),
            ..Self::text("")
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn size(mut self, points: u32) -> Self {
        self.size = Some(points);
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }

    /// Text content; fields render as `X` (page) and `Y` (page count)
    pub fn plain_text(&self) -> &str {
        match &self.content {
            RunContent::Text(t) => t,
            RunContent::Field(Field::Page) => "X",
            RunContent::Field(Field::NumPages) => "Y",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub align: Align,
    /// Spacing in points
    pub space_before: u32,
    pub space_after: u32,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new().run(Run::text(text))
    }

    pub fn run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn spacing(mut self, before: u32, after: u32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(Run::plain_text).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
    pub fill: Option<Rgb>,
}

impl Cell {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            fill: None,
        }
    }

    pub fn paragraph(paragraph: Paragraph) -> Self {
        Self::new(vec![paragraph])
    }

    pub fn fill(mut self, color: Rgb) -> Self {
        self.fill = Some(color);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
    /// Minimum height in twips
    pub height: Option<u32>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            height: None,
        }
    }

    pub fn height(mut self, twips: u32) -> Self {
        self.height = Some(twips);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    /// Column widths in twips
    pub columns: Vec<u32>,
    pub rows: Vec<Row>,
    /// Single-line border on all edges and inner lines; `None` draws nothing
    pub border: Option<Rgb>,
}

impl Table {
    pub fn header_texts(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|c| {
                        c.paragraphs
                            .iter()
                            .map(Paragraph::plain_text)
                            .collect::<Vec<_>>()
                            .join("\n")
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub body: Vec<Block>,
    /// Repeated at the bottom of every page
    pub footer: Vec<Paragraph>,
}

impl Document {
    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    pub fn push_table(&mut self, table: Table) {
        self.body.push(Block::Table(table));
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// Every paragraph in reading order, table cells included, footer last
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        for block in &self.body {
            match block {
                Block::Paragraph(p) => out.push(p),
                Block::Table(t) => {
                    for row in &t.rows {
                        for cell in &row.cells {
                            out.extend(cell.paragraphs.iter());
                        }
                    }
                }
            }
        }
        out.extend(self.footer.iter());
        out
    }

    pub fn all_text(&self) -> Vec<String> {
        self.paragraphs().into_iter().map(Paragraph::plain_text).collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.all_text().iter().any(|t| t.contains(needle))
    }
}
