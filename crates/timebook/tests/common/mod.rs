//! Fixture workbooks for the integration tests
//!
//! Builds small macro-enabled packages in memory: shared strings, a styles
//! part with date formats, merged employee headers and a fake VBA project.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveTime};
use timebook_core::CellAddress;
use timebook_xlsx::numfmt::datetime_to_serial;
use zip::write::SimpleFileOptions;

pub const VBA: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1timebook-test-vba-project";

/// Style index of `dd.mm.yyyy` dates in the fixture styles part
pub const DATE_STYLE: u32 = 1;
/// Style index of builtin short dates
pub const SHORT_DATE_STYLE: u32 = 2;
/// Style index of a bordered hours cell
pub const HOURS_STYLE: u32 = 3;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="dd\.mm\.yyyy"/></numFmts><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="1"><fill><patternFill patternType="none"/></fill></fills><borders count="2"><border/><border><left style="thin"/><right style="thin"/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="4"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/><xf numFmtId="2" fontId="0" fillId="0" borderId="1" xfId="0" applyBorder="1"/></cellXfs></styleSheet>"#;

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Styled,
}

/// One worksheet of a fixture workbook
#[derive(Debug, Clone)]
pub struct SheetFixture {
    name: String,
    cells: BTreeMap<(u32, u16), (Value, u32)>,
    merges: Vec<String>,
}

impl SheetFixture {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: BTreeMap::new(),
            merges: Vec::new(),
        }
    }

    fn put(mut self, reference: &str, value: Value, style: u32) -> Self {
        let addr = CellAddress::parse(reference).unwrap();
        self.cells.insert((addr.row, addr.col), (value, style));
        self
    }

    pub fn text(self, reference: &str, text: &str) -> Self {
        self.put(reference, Value::Text(text.to_string()), 0)
    }

    pub fn number(self, reference: &str, n: f64) -> Self {
        self.put(reference, Value::Number(n), 0)
    }

    pub fn date(self, reference: &str, date: NaiveDate, style: u32) -> Self {
        self.put(reference, Value::Date(date), style)
    }

    /// An empty cell that only carries a style
    pub fn styled(self, reference: &str, style: u32) -> Self {
        self.put(reference, Value::Styled, style)
    }

    pub fn merge(mut self, range: &str) -> Self {
        self.merges.push(range.to_string());
        self
    }

    /// Fill column C from row 5 with every day of `year`/`month`
    pub fn month_dates(mut self, year: i32, month: u32, style: u32) -> Self {
        let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        for (i, date) in first
            .iter_days()
            .take_while(|d| d.month() == month)
            .enumerate()
        {
            self = self.date(&format!("C{}", 5 + i), date, style);
        }
        self
    }

    fn to_xml(&self, strings: &mut SharedStrings) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheetViews><sheetView workbookViewId="0"/></sheetViews><sheetData>"#,
        );

        let mut current_row = None;
        for (&(row, col), (value, style)) in &self.cells {
            if current_row != Some(row) {
                if current_row.is_some() {
                    xml.push_str("</row>");
                }
                xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
                current_row = Some(row);
            }

            let reference = CellAddress::new(row, col).to_a1_string();
            let style_attr = if *style == 0 {
                String::new()
            } else {
                format!(r#" s="{}""#, style)
            };
            match value {
                Value::Text(text) => xml.push_str(&format!(
                    r#"<c r="{}"{} t="s"><v>{}</v></c>"#,
                    reference,
                    style_attr,
                    strings.index(text)
                )),
                Value::Number(n) => xml.push_str(&format!(
                    r#"<c r="{}"{}><v>{}</v></c>"#,
                    reference, style_attr, n
                )),
                Value::Date(date) => xml.push_str(&format!(
                    r#"<c r="{}"{}><v>{}</v></c>"#,
                    reference,
                    style_attr,
                    datetime_to_serial(date.and_time(NaiveTime::MIN), false)
                )),
                Value::Styled => {
                    xml.push_str(&format!(r#"<c r="{}"{}/>"#, reference, style_attr))
                }
            }
        }
        if current_row.is_some() {
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData>");

        if !self.merges.is_empty() {
            xml.push_str(&format!(r#"<mergeCells count="{}">"#, self.merges.len()));
            for range in &self.merges {
                xml.push_str(&format!(r#"<mergeCell ref="{}"/>"#, range));
            }
            xml.push_str("</mergeCells>");
        }
        xml.push_str(r#"<pageMargins left="0.7" right="0.7" top="0.78" bottom="0.78" header="0.3" footer="0.3"/></worksheet>"#);
        xml
    }
}

#[derive(Default)]
struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    fn index(&mut self, text: &str) -> usize {
        match self.strings.iter().position(|s| s == text) {
            Some(i) => i,
            None => {
                self.strings.push(text.to_string());
                self.strings.len() - 1
            }
        }
    }

    fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
            self.strings.len()
        );
        for s in &self.strings {
            xml.push_str(&format!(
                r#"<si><t xml:space="preserve">{}</t></si>"#,
                escape(s)
            ));
        }
        xml.push_str("</sst>");
        xml
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A macro-enabled fixture workbook
#[derive(Debug, Clone, Default)]
pub struct WorkbookFixture {
    sheets: Vec<SheetFixture>,
}

impl WorkbookFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, sheet: SheetFixture) -> Self {
        self.sheets.push(sheet);
        self
    }

    /// Serialize the workbook as an `.xlsm` package
    pub fn build(&self) -> Vec<u8> {
        let mut strings = SharedStrings::default();
        let sheet_parts: Vec<String> = self.sheets.iter().map(|s| s.to_xml(&mut strings)).collect();

        let mut content_types = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="bin" ContentType="application/vnd.ms-office.vbaProject"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.ms-excel.sheet.macroEnabled.main+xml"/>"#,
        );
        let mut workbook = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr codeName="DieseArbeitsmappe"/><sheets>"#,
        );
        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for (i, sheet) in self.sheets.iter().enumerate() {
            let n = i + 1;
            content_types.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                n
            ));
            workbook.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape(&sheet.name),
                n,
                n
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                n, n
            ));
        }

        let next = self.sheets.len() + 1;
        content_types.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/><Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/></Types>"#);
        workbook.push_str("</sheets></workbook>");
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/><Relationship Id="rId{}" Type="http://schemas.microsoft.com/office/2006/relationships/vbaProject" Target="vbaProject.bin"/></Relationships>"#,
            next,
            next + 1,
            next + 2
        ));

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let options = SimpleFileOptions::default();
            let mut add = |name: &str, data: &[u8]| {
                zip.start_file(name, options).unwrap();
                zip.write_all(data).unwrap();
            };
            add("[Content_Types].xml", content_types.as_bytes());
            add("_rels/.rels", br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#);
            add("xl/workbook.xml", workbook.as_bytes());
            add("xl/_rels/workbook.xml.rels", rels.as_bytes());
            for (i, xml) in sheet_parts.iter().enumerate() {
                add(&format!("xl/worksheets/sheet{}.xml", i + 1), xml.as_bytes());
            }
            add("xl/styles.xml", STYLES.as_bytes());
            add("xl/sharedStrings.xml", strings.to_xml().as_bytes());
            add("xl/vbaProject.bin", VBA);
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    /// Write the workbook to `dir/Zeiterfassung.xlsm`
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("Zeiterfassung.xlsm");
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

/// Settings sheet with duplicated and padded entries
pub fn settings_sheet() -> SheetFixture {
    SheetFixture::new("Anpassung")
        .text("M3", "Mitarbeiter")
        .text("N3", "Projekte")
        .text("P3", "Abwesenheit")
        .text("M4", "Max")
        .text("M5", "Erika")
        .text("M6", " Max ")
        .text("M7", "Jan")
        .text("N4", "MOIA")
        .text("N5", "DiE")
        .text("N6", "MOIA")
        .text("P4", "Urlaub")
        .text("P5", "Krank")
        .text("P6", "Schule")
}

/// A month sheet with Max (MOIA, DiE, absence) in F..H and Erika
/// (MOIA, absence) in I..J
pub fn month_sheet(name: &str, year: i32, month: u32, date_style: u32) -> SheetFixture {
    SheetFixture::new(name)
        .text("C3", "Datum")
        .text("F3", "Max")
        .merge("F3:H3")
        .text("F4", "MOIA")
        .text("G4", "DiE")
        .text("H4", "Abwesenheit")
        .text("I3", "  erika ")
        .merge("I3:J3")
        .text("I4", "MOIA")
        .text("J4", "Abwesenheit")
        .month_dates(year, month, date_style)
}

/// Settings, Januar 2025 and a `Maerz` sheet for March 2025
pub fn standard_workbook() -> WorkbookFixture {
    WorkbookFixture::new()
        .sheet(settings_sheet())
        .sheet(month_sheet("Januar", 2025, 1, DATE_STYLE))
        .sheet(month_sheet("Maerz", 2025, 3, SHORT_DATE_STYLE))
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
