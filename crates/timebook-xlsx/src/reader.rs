//! XLSX reader

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::numfmt::serial_to_datetime;
use crate::package::Package;
use crate::styles::{read_styles_xml, DateStyles};
use timebook_core::{CellAddress, CellError, CellRange, CellValue, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.get(6..7) == Some("_"))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    result.push_str(rest);

    result
}

/// A worksheet's name and the package part holding its XML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    /// Tab name as shown in the workbook
    pub name: String,
    /// Part path inside the package (e.g. `xl/worksheets/sheet1.xml`)
    pub part: String,
    /// `sheetId` from workbook.xml; `xl/calcChain.xml` refers to sheets by it
    pub sheet_id: u32,
}

/// Everything the reader needs to turn raw `<c>` data into a [`CellValue`]
struct CellContext<'a> {
    shared_strings: &'a [String],
    date_styles: &'a DateStyles,
    date1904: bool,
}

/// Raw attributes and children of one `<c>` element
#[derive(Default)]
struct RawCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
    inline_text: Option<String>,
}

impl RawCell {
    fn from_start(e: &BytesStart<'_>) -> Self {
        let mut cell = RawCell::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => cell.reference = attr.unescape_value().ok().map(|s| s.to_string()),
                b"t" => cell.cell_type = attr.unescape_value().ok().map(|s| s.to_string()),
                b"s" => {
                    cell.style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok())
                }
                _ => {}
            }
        }
        cell
    }
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a loaded package.
    ///
    /// Returns the workbook together with each worksheet's part path, in tab
    /// order. The workbook comes back without recorded edits.
    pub fn read_package(package: &Package) -> XlsxResult<(Workbook, Vec<SheetEntry>)> {
        let shared_strings = Self::read_shared_strings(package)?;
        let date_styles = match package.part("xl/styles.xml") {
            Some(bytes) => read_styles_xml(bytes)?,
            None => DateStyles::default(),
        };

        let (sheet_info, date1904) = Self::read_workbook_xml(package)?;
        let sheet_paths = Self::read_workbook_rels(package)?;

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = date1904;

        let ctx = CellContext {
            shared_strings: &shared_strings,
            date_styles: &date_styles,
            date1904,
        };

        let mut entries = Vec::with_capacity(sheet_info.len());
        for (name, r_id, sheet_id) in sheet_info {
            let Some(path) = sheet_paths.get(&r_id) else {
                // Chartsheets and dialog sheets have no worksheet relationship
                debug!("skipping sheet '{}' without a worksheet part", name);
                continue;
            };

            let mut worksheet = Worksheet::new(name.as_str());
            Self::read_worksheet(package.require_part(path)?, &mut worksheet, &ctx)?;
            worksheet.clear_edits();
            workbook.add_existing_worksheet(worksheet)?;

            entries.push(SheetEntry {
                name,
                part: path.clone(),
                sheet_id,
            });
        }

        Ok((workbook, entries))
    }

    /// Read the shared strings table
    fn read_shared_strings(package: &Package) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let Some(bytes) = package.part("xl/sharedStrings.xml") else {
            return Ok(strings); // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(bytes);
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs (<rPh>) carry their own <t> that is not part of the text
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names, rIds, sheet ids and the date system
    fn read_workbook_xml(package: &Package) -> XlsxResult<(Vec<(String, String, u32)>, bool)> {
        let bytes = package.require_part("xl/workbook.xml")?;

        let mut xml_reader = Reader::from_reader(bytes);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut date1904 = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"sheet" => {
                        let mut name = None;
                        let mut r_id = None;
                        let mut sheet_id = 0;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => {
                                    name = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"r:id" => {
                                    r_id = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"sheetId" => {
                                    sheet_id = attr
                                        .unescape_value()
                                        .ok()
                                        .and_then(|s| s.parse().ok())
                                        .unwrap_or(0);
                                }
                                _ => {}
                            }
                        }

                        if let (Some(name), Some(r_id)) = (name, r_id) {
                            sheets.push((name, r_id, sheet_id));
                        }
                    }
                    b"workbookPr" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"date1904" {
                                date1904 = attr
                                    .unescape_value()
                                    .ok()
                                    .map_or(false, |s| s.as_ref() == "1" || s.as_ref() == "true");
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, date1904))
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels(package: &Package) -> XlsxResult<HashMap<String, String>> {
        let bytes = package.require_part("xl/_rels/workbook.xml.rels")?;

        let mut xml_reader = Reader::from_reader(bytes);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = attr.unescape_value().ok().map(|s| s.to_string()),
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            rels.insert(id, resolve_target(&target));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet's cells and merged regions
    fn read_worksheet(
        bytes: &[u8],
        worksheet: &mut Worksheet,
        ctx: &CellContext<'_>,
    ) -> XlsxResult<()> {
        let mut xml_reader = Reader::from_reader(bytes);
        xml_reader.trim_text(false);

        let mut buf = Vec::new();

        let mut current: Option<RawCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"c" => current = Some(RawCell::from_start(&e)),
                    b"v" if current.is_some() => in_value = true,
                    b"f" if current.is_some() => in_formula = true,
                    b"is" if current.is_some() => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(cell) = current.take() {
                            Self::process_cell(worksheet, cell, ctx)?;
                        }
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"is" => in_inline_str = false,
                    b"t" if in_inline_str => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if let Some(cell) = current.as_mut() {
                        if in_value || in_formula || in_inline_text {
                            let text = e.unescape()?.into_owned();
                            if in_value {
                                cell.value.get_or_insert_with(String::new).push_str(&text);
                            } else if in_formula {
                                cell.formula.get_or_insert_with(String::new).push_str(&text);
                            } else {
                                cell.inline_text
                                    .get_or_insert_with(String::new)
                                    .push_str(&text);
                            }
                        }
                    }
                }
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    // Empty cell element (may still carry a style)
                    b"c" => Self::process_cell(worksheet, RawCell::from_start(&e), ctx)?,
                    b"mergeCell" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"ref" {
                                let ref_str = String::from_utf8_lossy(&attr.value);
                                match CellRange::parse(&ref_str) {
                                    Ok(range) => {
                                        if let Err(err) = worksheet.merge_cells(&range) {
                                            warn!(
                                                "sheet '{}': ignoring merge {}: {}",
                                                worksheet.name(),
                                                ref_str,
                                                err
                                            );
                                        }
                                    }
                                    Err(err) => warn!(
                                        "sheet '{}': unreadable merge ref {}: {}",
                                        worksheet.name(),
                                        ref_str,
                                        err
                                    ),
                                }
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Process a cell and add it to the worksheet
    fn process_cell(
        worksheet: &mut Worksheet,
        cell: RawCell,
        ctx: &CellContext<'_>,
    ) -> XlsxResult<()> {
        let Some(cell_ref) = cell.reference.as_deref() else {
            // Cells without `r` are legal but never produced by Excel; they
            // cannot be placed without tracking the column cursor.
            debug!("sheet '{}': skipping cell without reference", worksheet.name());
            return Ok(());
        };
        let addr = CellAddress::parse(cell_ref).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
        })?;
        worksheet.note_extent(addr.row, addr.col);

        let style = cell.style.unwrap_or(0);
        if style != 0 {
            worksheet.set_cell_style_at(addr.row, addr.col, style)?;
        }

        let is_date_style = ctx.date_styles.is_date(style);
        let cell_type = cell.cell_type.as_deref();

        let value = match (cell.formula, cell_type) {
            (Some(f), _) => {
                let cached = cell
                    .value
                    .as_deref()
                    .map(|v| Self::decode_value(v, cell_type, is_date_style, ctx))
                    .transpose()?
                    .filter(|v| !v.is_empty());
                let text = if f.starts_with('=') {
                    f
                } else {
                    format!("={}", f)
                };
                CellValue::Formula {
                    text,
                    cached_value: cached.map(Box::new),
                }
            }
            (None, Some("inlineStr")) => match cell.inline_text {
                Some(text) => CellValue::String(decode_excel_escapes(&text)),
                None => CellValue::Empty,
            },
            (None, _) => match cell.value.as_deref() {
                Some(v) => Self::decode_value(v, cell_type, is_date_style, ctx)?,
                None => CellValue::Empty,
            },
        };

        if !value.is_empty() {
            worksheet.set_cell_value_at(addr.row, addr.col, value)?;
        }

        Ok(())
    }

    /// Decode the text of a `<v>` element according to the cell type
    fn decode_value(
        value: &str,
        cell_type: Option<&str>,
        is_date_style: bool,
        ctx: &CellContext<'_>,
    ) -> XlsxResult<CellValue> {
        let decoded = match cell_type {
            // Shared string
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = ctx.shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }

            // Boolean
            Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),

            // Error
            Some("e") => CellError::parse(value)
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::String(value.to_string())),

            // ISO 8601 date
            Some("d") => match parse_iso_datetime(value) {
                Some(dt) => CellValue::DateTime(dt),
                None => CellValue::String(value.to_string()),
            },

            // String (formula result or inline string stored in <v>)
            Some("str") | Some("inlineStr") => CellValue::String(decode_excel_escapes(value)),

            // Number (default type or explicit "n")
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) if is_date_style => serial_to_datetime(n, ctx.date1904)
                    .map(CellValue::DateTime)
                    .unwrap_or(CellValue::Number(n)),
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(value.to_string()),
            },

            // Unknown type - treat as string
            Some(_) => CellValue::String(value.to_string()),
        };
        Ok(decoded)
    }
}

/// Resolve a relationship target (relative to `xl/`) to a package part path
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = vec!["xl"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("line1_x000D__x000A_line2"), "line1\r\nline2");
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("a_xyz_"), "a_xyz_");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(resolve_target("./worksheets/../worksheets/s.xml"), "xl/worksheets/s.xml");
    }

    #[test]
    fn test_parse_iso_datetime() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(parse_iso_datetime("2026-03-02"), d.and_hms_opt(0, 0, 0));
        assert_eq!(
            parse_iso_datetime("2026-03-02T08:30:00Z"),
            d.and_hms_opt(8, 30, 0)
        );
        assert_eq!(parse_iso_datetime("02.03.2026"), None);
    }

    fn build_package(sheet_xml: &str, workbook_pr: &str) -> Package {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            let mut add = |name: &str, data: &str| {
                zip.start_file(name, options).unwrap();
                zip.write_all(data.as_bytes()).unwrap();
            };

            add("[Content_Types].xml", r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#);
            add("xl/workbook.xml", &format!(
                r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">{}<sheets><sheet name="Januar" sheetId="1" r:id="rId1"/><sheet name="Diagramm" sheetId="2" r:id="rId2"/></sheets></workbook>"#,
                workbook_pr
            ));
            add("xl/_rels/workbook.xml.rels", r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/chartsheet" Target="chartsheets/sheet1.xml"/></Relationships>"#);
            add("xl/sharedStrings.xml", r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><si><t>Max</t></si><si><r><t>MO</t></r><r><t>IA</t></r></si><si><t xml:space="preserve"> Urlaub </t></si></sst>"#);
            add("xl/styles.xml", r#"<?xml version="1.0"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14"/></cellXfs></styleSheet>"#);
            add("xl/worksheets/sheet1.xml", sheet_xml);
            zip.finish().unwrap();
        }
        Package::from_bytes(&cursor.into_inner()).unwrap()
    }

    const SHEET: &str = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="3"><c r="F3" t="s"><v>0</v></c><c r="G3" s="1"/></row>
    <row r="4"><c r="F4" t="s"><v>1</v></c><c r="G4" t="inlineStr"><is><t>Krank</t></is></c><c r="H4" t="s"><v>2</v></c></row>
    <row r="5"><c r="C5" s="1"><v>46027</v></c><c r="F5"><v>3.5</v></c><c r="G5" t="b"><v>0</v></c></row>
    <row r="6"><c r="C6" s="1"><f>C5+1</f><v>46028</v></c><c r="F6" t="d"><v>2026-01-06</v></c><c r="G6" t="e"><v>#N/A</v></c></row>
    <row r="40"><c r="B40"/></row>
  </sheetData>
  <mergeCells count="1"><mergeCell ref="F3:H3"/></mergeCells>
</worksheet>"#;

    #[test]
    fn test_read_package_values() {
        let package = build_package(SHEET, "");
        let (workbook, entries) = XlsxReader::read_package(&package).unwrap();

        assert_eq!(
            entries,
            vec![SheetEntry {
                name: "Januar".into(),
                part: "xl/worksheets/sheet1.xml".into(),
                sheet_id: 1,
            }]
        );
        assert_eq!(workbook.sheet_count(), 1);

        let ws = workbook.worksheet_by_name("Januar").unwrap();
        assert!(!ws.has_edits());
        assert_eq!(ws.get_value("F3").unwrap().as_string(), Some("Max"));
        assert_eq!(ws.get_value("F4").unwrap().as_string(), Some("MOIA"));
        assert_eq!(ws.get_value("G4").unwrap().as_string(), Some("Krank"));
        assert_eq!(ws.get_value("H4").unwrap().as_string(), Some(" Urlaub "));
        assert_eq!(ws.get_value("F5").unwrap().as_number(), Some(3.5));
        assert_eq!(ws.get_value("G5").unwrap(), CellValue::Boolean(false));
        assert_eq!(ws.get_value("G6").unwrap(), CellValue::Error(CellError::Na));

        let jan5 = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(
            ws.get_value("C5").unwrap().as_datetime().map(|d| d.date()),
            Some(jan5)
        );
        let c6 = ws.get_value("C6").unwrap();
        assert!(c6.is_formula());
        assert_eq!(c6.as_datetime().map(|d| d.date()), jan5.succ_opt());
        assert_eq!(
            ws.get_value("F6").unwrap().as_datetime().map(|d| d.date()),
            jan5.succ_opt()
        );

        // style-only and bare cells still count towards the extent
        assert_eq!(ws.cell_style_index_at(2, 6), 1);
        assert_eq!(ws.last_row(), 39);
        assert_eq!(ws.last_col(), 7);

        assert_eq!(ws.merged_regions().len(), 1);
        assert_eq!(ws.merged_region_at(2, 7).map(|r| r.col_count()), Some(3));
    }

    #[test]
    fn test_read_package_date1904() {
        let sheet = r#"<worksheet><sheetData><row r="5"><c r="C5" s="1"><v>44196</v></c></row></sheetData></worksheet>"#;
        let package = build_package(sheet, r#"<workbookPr date1904="1"/>"#);
        let (workbook, _) = XlsxReader::read_package(&package).unwrap();

        assert!(workbook.settings().date_1904);
        let ws = workbook.worksheet(0).unwrap();
        assert_eq!(
            ws.get_value("C5").unwrap().as_datetime().map(|d| d.date()),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
    }

    #[test]
    fn test_missing_worksheet_part() {
        let mut package = build_package(SHEET, "");
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            for name in package.part_names().collect::<Vec<_>>() {
                if name == "xl/worksheets/sheet1.xml" {
                    continue;
                }
                zip.start_file(name, options).unwrap();
                zip.write_all(package.part(name).unwrap()).unwrap();
            }
            zip.finish().unwrap();
        }
        package = Package::from_bytes(&cursor.into_inner()).unwrap();

        assert!(matches!(
            XlsxReader::read_package(&package),
            Err(XlsxError::MissingPart(part)) if part == "xl/worksheets/sheet1.xml"
        ));
    }
}
