//! WordprocessingML serialisation of a [`Document`]
//!
//! Only the parts Word needs to open the file are produced: content types,
//! package relationships, the main document, styles and one footer.

use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::layout::{PAGE_HEIGHT, PAGE_MARGIN, PAGE_WIDTH};
use super::model::{Align, Block, Document, Field, Paragraph, Run, RunContent, Table};
use crate::domain::DomainError;

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const FOOTER_REL_ID: &str = "rId2";

type XmlResult = Result<(), quick_xml::Error>;

fn xml_err(e: quick_xml::Error) -> DomainError {
    DomainError::Internal(format!("Failed to write document XML: {}", e))
}

fn zip_err(e: zip::result::ZipError) -> DomainError {
    DomainError::Internal(format!("Failed to pack document: {}", e))
}

/// Serialise `doc` as the bytes of a `.docx` file
pub fn render_docx(doc: &Document) -> Result<Vec<u8>, DomainError> {
    let document_xml = document_part(doc).map_err(xml_err)?;
    let footer_xml = footer_part(&doc.footer).map_err(xml_err)?;
    let styles_xml = styles_part().map_err(xml_err)?;
    let document_rels = document_rels_part().map_err(xml_err)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let parts: [(&str, &[u8]); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("word/document.xml", &document_xml),
        ("word/_rels/document.xml.rels", &document_rels),
        ("word/styles.xml", &styles_xml),
        ("word/footer1.xml", &footer_xml),
    ];

    for (name, bytes) in parts {
        zip.start_file(name, options).map_err(zip_err)?;
        zip.write_all(bytes)?;
    }

    let cursor = zip.finish().map_err(zip_err)?;
    Ok(cursor.into_inner())
}

struct Xml {
    writer: Writer<Vec<u8>>,
}

impl Xml {
    fn new() -> Result<Self, quick_xml::Error> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(Self { writer })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> XmlResult {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(elem))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> XmlResult {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(elem))
    }

    fn end(&mut self, name: &str) -> XmlResult {
        self.writer.write_event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> XmlResult {
        self.writer.write_event(Event::Text(BytesText::new(text)))
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn document_part(doc: &Document) -> Result<Vec<u8>, quick_xml::Error> {
    let mut xml = Xml::new()?;
    xml.start("w:document", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)])?;
    xml.start("w:body", &[])?;

    for block in &doc.body {
        match block {
            Block::Paragraph(p) => paragraph(&mut xml, p)?,
            Block::Table(t) => table(&mut xml, t)?,
        }
    }

    let width = PAGE_WIDTH.to_string();
    let height = PAGE_HEIGHT.to_string();
    let margin = PAGE_MARGIN.to_string();
    xml.start("w:sectPr", &[])?;
    if !doc.footer.is_empty() {
        xml.empty(
            "w:footerReference",
            &[("w:type", "default"), ("r:id", FOOTER_REL_ID)],
        )?;
    }
    xml.empty("w:pgSz", &[("w:w", &width), ("w:h", &height)])?;
    xml.empty(
        "w:pgMar",
        &[
            ("w:top", &margin),
            ("w:right", &margin),
            ("w:bottom", &margin),
            ("w:left", &margin),
            ("w:header", &margin),
            ("w:footer", &margin),
            ("w:gutter", "0"),
        ],
    )?;
    xml.end("w:sectPr")?;

    xml.end("w:body")?;
    xml.end("w:document")?;
    Ok(xml.finish())
}

fn footer_part(footer: &[Paragraph]) -> Result<Vec<u8>, quick_xml::Error> {
    let mut xml = Xml::new()?;
    xml.start("w:ftr", &[("xmlns:w", NS_W), ("xmlns:r", NS_R)])?;
    if footer.is_empty() {
        xml.empty("w:p", &[])?;
    }
    for p in footer {
        paragraph(&mut xml, p)?;
    }
    xml.end("w:ftr")?;
    Ok(xml.finish())
}

fn styles_part() -> Result<Vec<u8>, quick_xml::Error> {
    let mut xml = Xml::new()?;
    xml.start("w:styles", &[("xmlns:w", NS_W)])?;
    xml.start("w:docDefaults", &[])?;

    xml.start("w:rPrDefault", &[])?;
    xml.start("w:rPr", &[])?;
    xml.empty(
        "w:rFonts",
        &[
            ("w:ascii", "Arial"),
            ("w:hAnsi", "Arial"),
            ("w:cs", "Arial"),
            ("w:eastAsia", "Arial"),
        ],
    )?;
    xml.empty("w:sz", &[("w:val", "20")])?;
    xml.empty("w:szCs", &[("w:val", "20")])?;
    xml.end("w:rPr")?;
    xml.end("w:rPrDefault")?;

    xml.start("w:pPrDefault", &[])?;
    xml.start("w:pPr", &[])?;
    xml.empty("w:spacing", &[("w:after", "0"), ("w:line", "240"), ("w:lineRule", "auto")])?;
    xml.end("w:pPr")?;
    xml.end("w:pPrDefault")?;

    xml.end("w:docDefaults")?;

    xml.start(
        "w:style",
        &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
    )?;
    xml.empty("w:name", &[("w:val", "Normal")])?;
    xml.end("w:style")?;

    xml.end("w:styles")?;
    Ok(xml.finish())
}

fn document_rels_part() -> Result<Vec<u8>, quick_xml::Error> {
    let styles = format!("{}/styles", REL_BASE);
    let footer = format!("{}/footer", REL_BASE);

    let mut xml = Xml::new()?;
    xml.start(
        "Relationships",
        &[("xmlns", "http://schemas.openxmlformats.org/package/2006/relationships")],
    )?;
    xml.empty(
        "Relationship",
        &[("Id", "rId1"), ("Type", &styles), ("Target", "styles.xml")],
    )?;
    xml.empty(
        "Relationship",
        &[("Id", FOOTER_REL_ID), ("Type", &footer), ("Target", "footer1.xml")],
    )?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn paragraph(xml: &mut Xml, p: &Paragraph) -> XmlResult {
    let before = (p.space_before * 20).to_string();
    let after = (p.space_after * 20).to_string();
    let jc = match p.align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
    };

    xml.start("w:p", &[])?;
    xml.start("w:pPr", &[])?;
    xml.empty("w:spacing", &[("w:before", &before), ("w:after", &after)])?;
    xml.empty("w:jc", &[("w:val", jc)])?;
    xml.end("w:pPr")?;

    for r in &p.runs {
        run(xml, r)?;
    }

    xml.end("w:p")
}

fn run_properties(xml: &mut Xml, r: &Run) -> XmlResult {
    if !r.bold && !r.underline && r.size.is_none() && r.color.is_none() {
        return Ok(());
    }

    // Child order is fixed by the schema: b, color, sz, u
    xml.start("w:rPr", &[])?;
    if r.bold {
        xml.empty("w:b", &[])?;
    }
    if let Some(color) = r.color {
        xml.empty("w:color", &[("w:val", &color.hex())])?;
    }
    if let Some(size) = r.size {
        let half_points = (size * 2).to_string();
        xml.empty("w:sz", &[("w:val", &half_points)])?;
        xml.empty("w:szCs", &[("w:val", &half_points)])?;
    }
    if r.underline {
        xml.empty("w:u", &[("w:val", "single")])?;
    }
    xml.end("w:rPr")
}

fn run(xml: &mut Xml, r: &Run) -> XmlResult {
    match &r.content {
        RunContent::Text(text) => {
            xml.start("w:r", &[])?;
            run_properties(xml, r)?;
            for (idx, line) in text.split('\n').enumerate() {
                if idx > 0 {
                    xml.empty("w:br", &[])?;
                }
                xml.start("w:t", &[("xml:space", "preserve")])?;
                xml.text(line)?;
                xml.end("w:t")?;
            }
            xml.end("w:r")
        }
        RunContent::Field(field) => {
            let instruction = match field {
                Field::Page => " PAGE ",
                Field::NumPages => " NUMPAGES ",
            };

            xml.start("w:r", &[])?;
            run_properties(xml, r)?;
            xml.empty("w:fldChar", &[("w:fldCharType", "begin")])?;
            xml.end("w:r")?;

            xml.start("w:r", &[])?;
            run_properties(xml, r)?;
            xml.start("w:instrText", &[("xml:space", "preserve")])?;
            xml.text(instruction)?;
            xml.end("w:instrText")?;
            xml.end("w:r")?;

            xml.start("w:r", &[])?;
            xml.empty("w:fldChar", &[("w:fldCharType", "separate")])?;
            xml.end("w:r")?;

            // Placeholder until the word processor updates the field
            xml.start("w:r", &[])?;
            run_properties(xml, r)?;
            xml.start("w:t", &[])?;
            xml.text("1")?;
            xml.end("w:t")?;
            xml.end("w:r")?;

            xml.start("w:r", &[])?;
            xml.empty("w:fldChar", &[("w:fldCharType", "end")])?;
            xml.end("w:r")
        }
    }
}

fn table(xml: &mut Xml, t: &Table) -> XmlResult {
    let total: u32 = t.columns.iter().sum();
    let total = total.to_string();

    xml.start("w:tbl", &[])?;
    xml.start("w:tblPr", &[])?;
    xml.empty("w:tblW", &[("w:w", &total), ("w:type", "dxa")])?;
    if let Some(color) = t.border {
        let hex = color.hex();
        xml.start("w:tblBorders", &[])?;
        for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
            xml.empty(
                edge,
                &[
                    ("w:val", "single"),
                    ("w:sz", "8"),
                    ("w:space", "0"),
                    ("w:color", &hex),
                ],
            )?;
        }
        xml.end("w:tblBorders")?;
    }
    xml.empty("w:tblLayout", &[("w:type", "fixed")])?;
    xml.end("w:tblPr")?;

    xml.start("w:tblGrid", &[])?;
    for width in &t.columns {
        xml.empty("w:gridCol", &[("w:w", &width.to_string())])?;
    }
    xml.end("w:tblGrid")?;

    for row in &t.rows {
        xml.start("w:tr", &[])?;
        if let Some(height) = row.height {
            xml.start("w:trPr", &[])?;
            xml.empty("w:trHeight", &[("w:val", &height.to_string())])?;
            xml.end("w:trPr")?;
        }

        for (idx, cell) in row.cells.iter().enumerate() {
            let width = t
                .columns
                .get(idx)
                .or(t.columns.last())
                .copied()
                .unwrap_or_default()
                .to_string();

            xml.start("w:tc", &[])?;
            xml.start("w:tcPr", &[])?;
            xml.empty("w:tcW", &[("w:w", &width), ("w:type", "dxa")])?;
            if let Some(fill) = cell.fill {
                xml.empty(
                    "w:shd",
                    &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", &fill.hex())],
                )?;
            }
            xml.empty("w:vAlign", &[("w:val", "center")])?;
            xml.end("w:tcPr")?;

            // A cell must hold at least one paragraph
            if cell.paragraphs.is_empty() {
                xml.empty("w:p", &[])?;
            }
            for p in &cell.paragraphs {
                paragraph(xml, p)?;
            }
            xml.end("w:tc")?;
        }

        xml.end("w:tr")?;
    }

    xml.end("w:tbl")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut out = String::new();
        part.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn package_contains_all_parts() {
        let mut doc = Document::default();
        doc.push_paragraph(Paragraph::text("Bonjour"));

        let bytes = render_docx(&doc).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();

        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/_rels/document.xml.rels",
            "word/styles.xml",
            "word/footer1.xml",
        ] {
            assert!(names.contains(&part), "missing {}", part);
        }
    }

    #[test]
    fn text_is_escaped_and_breaks_become_br() {
        let mut doc = Document::default();
        doc.push_paragraph(Paragraph::new().run(Run::text("NMG&CO <EI>\nligne 2").bold()));

        let bytes = render_docx(&doc).unwrap();
        let xml = read_part(&bytes, "word/document.xml");

        assert!(xml.contains("NMG&amp;CO &lt;EI&gt;"));
        assert!(xml.contains("<w:br/>"));
        assert!(xml.contains("<w:b/>"));
        assert!(xml.contains(r#"<w:pgSz w:w="11906" w:h="16838"/>"#));
    }
}
