//! Part-preserving worksheet patching
//!
//! Instead of regenerating a worksheet, the original sheet XML is streamed
//! through unchanged except for the `<c>` elements of edited cells, which
//! are replaced (or inserted at their row-major position). Row attributes,
//! column widths, conditional formats and everything else survive as-is.

use std::collections::BTreeMap;
use std::io::BufRead;

use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::Writer;

use crate::error::{XlsxError, XlsxResult};
use crate::numfmt::datetime_to_serial;
use timebook_core::{CellAddress, CellData, CellValue, Worksheet};

/// Edited cells of one row: (0-based column, new cell data or `None` when
/// the cell no longer exists)
type RowPatch<'a> = Vec<(u16, Option<&'a CellData>)>;

/// Collect the worksheet's edits keyed by 1-based row number
fn collect_patches(worksheet: &Worksheet) -> BTreeMap<u32, RowPatch<'_>> {
    let mut rows: BTreeMap<u32, RowPatch<'_>> = BTreeMap::new();
    for (row, col) in worksheet.edited_cells() {
        rows.entry(row + 1)
            .or_default()
            .push((col, worksheet.cell_at(row, col)));
    }
    rows
}

/// Rewrite a worksheet part so it reflects the worksheet's edited cells.
///
/// Returns the original bytes untouched when nothing was edited.
pub fn patch_worksheet_xml(
    original: &[u8],
    worksheet: &Worksheet,
    date1904: bool,
) -> XlsxResult<Vec<u8>> {
    let row_patches = collect_patches(worksheet);
    if row_patches.is_empty() {
        return Ok(original.to_vec());
    }

    let mut patcher = SheetPatcher {
        pending_rows: row_patches.keys().copied().collect(),
        next_row: 0,
        row_patches,
        date1904,
    };

    let mut reader = Reader::from_reader(original);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(original.len() + 1024));

    let mut buf = Vec::new();
    let mut saw_sheet_data = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"sheetData" => {
                saw_sheet_data = true;
                writer.write_event(Event::Start(e.into_owned()))?;
                patcher.patch_sheet_data(&mut reader, &mut writer)?;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                saw_sheet_data = true;
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                writer.write_event(Event::Start(e.into_owned()))?;
                patcher.write_remaining_rows(&mut writer)?;
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            Event::End(e) if e.local_name().as_ref() == b"worksheet" => {
                if !saw_sheet_data {
                    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
                    patcher.write_remaining_rows(&mut writer)?;
                    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
                }
                writer.write_event(Event::End(e.into_owned()))?;
            }
            Event::Eof => break,
            ev => writer.write_event(ev.into_owned())?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

struct SheetPatcher<'a> {
    row_patches: BTreeMap<u32, RowPatch<'a>>,
    /// Patched row numbers in ascending order
    pending_rows: Vec<u32>,
    /// Index of the first row in `pending_rows` not yet written
    next_row: usize,
    date1904: bool,
}

impl SheetPatcher<'_> {
    fn patch_sheet_data<R: BufRead>(
        &mut self,
        reader: &mut Reader<R>,
        writer: &mut Writer<Vec<u8>>,
    ) -> XlsxResult<()> {
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"row" => {
                    let row_start = e.into_owned();
                    let Some(row_num) = parse_row_number(&row_start) else {
                        writer.write_event(Event::Start(row_start))?;
                        buf.clear();
                        continue;
                    };

                    self.write_rows_before(writer, row_num)?;
                    writer.write_event(Event::Start(row_start))?;
                    if self.take_row(row_num) {
                        self.patch_row(reader, writer, row_num)?;
                    }
                }
                Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                    let row_empty = e.into_owned();
                    let Some(row_num) = parse_row_number(&row_empty) else {
                        writer.write_event(Event::Empty(row_empty))?;
                        buf.clear();
                        continue;
                    };

                    self.write_rows_before(writer, row_num)?;
                    if self.take_row(row_num) {
                        // `<row/>` becomes `<row>...</row>`
                        let name = String::from_utf8_lossy(row_empty.name().as_ref()).into_owned();
                        writer.write_event(Event::Start(row_empty))?;
                        self.write_row_cells(writer, row_num)?;
                        writer.write_event(Event::End(BytesEnd::new(name)))?;
                    } else {
                        writer.write_event(Event::Empty(row_empty))?;
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"sheetData" => {
                    self.write_remaining_rows(writer)?;
                    writer.write_event(Event::End(e.into_owned()))?;
                    break;
                }
                Event::Eof => {
                    return Err(XlsxError::Parse(
                        "unexpected end of worksheet inside sheetData".into(),
                    ))
                }
                ev => writer.write_event(ev.into_owned())?,
            }
            buf.clear();
        }

        Ok(())
    }

    /// Stream one existing row, replacing and inserting edited cells.
    /// Consumes everything up to and including `</row>`.
    fn patch_row<R: BufRead>(
        &self,
        reader: &mut Reader<R>,
        writer: &mut Writer<Vec<u8>>,
        row_num: u32,
    ) -> XlsxResult<()> {
        let patches = self.row_patches.get(&row_num).map(Vec::as_slice).unwrap_or_default();
        let mut patch_idx = 0usize;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"c" => {
                    let cell_start = e.into_owned();
                    let Some(col) = parse_cell_column(&cell_start, row_num) else {
                        writer.write_event(Event::Start(cell_start))?;
                        buf.clear();
                        continue;
                    };

                    while patch_idx < patches.len() && patches[patch_idx].0 < col {
                        self.write_cell(writer, row_num, patches[patch_idx])?;
                        patch_idx += 1;
                    }

                    if patch_idx < patches.len() && patches[patch_idx].0 == col {
                        skip_element(reader, &mut buf)?;
                        self.write_cell(writer, row_num, patches[patch_idx])?;
                        patch_idx += 1;
                    } else {
                        writer.write_event(Event::Start(cell_start))?;
                    }
                }
                Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                    let cell_empty = e.into_owned();
                    let Some(col) = parse_cell_column(&cell_empty, row_num) else {
                        writer.write_event(Event::Empty(cell_empty))?;
                        buf.clear();
                        continue;
                    };

                    while patch_idx < patches.len() && patches[patch_idx].0 < col {
                        self.write_cell(writer, row_num, patches[patch_idx])?;
                        patch_idx += 1;
                    }

                    if patch_idx < patches.len() && patches[patch_idx].0 == col {
                        self.write_cell(writer, row_num, patches[patch_idx])?;
                        patch_idx += 1;
                    } else {
                        writer.write_event(Event::Empty(cell_empty))?;
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"row" => {
                    for patch in &patches[patch_idx..] {
                        self.write_cell(writer, row_num, *patch)?;
                    }
                    writer.write_event(Event::End(e.into_owned()))?;
                    break;
                }
                Event::Eof => {
                    return Err(XlsxError::Parse(format!(
                        "unexpected end of worksheet inside row {}",
                        row_num
                    )))
                }
                ev => writer.write_event(ev.into_owned())?,
            }
            buf.clear();
        }

        Ok(())
    }

    /// Mark `row_num` as written; true if it has patches
    fn take_row(&mut self, row_num: u32) -> bool {
        if self.pending_rows.get(self.next_row) == Some(&row_num) {
            self.next_row += 1;
            true
        } else {
            false
        }
    }

    /// Write new rows for every patched row number below `row_num`
    fn write_rows_before(&mut self, writer: &mut Writer<Vec<u8>>, row_num: u32) -> XlsxResult<()> {
        while let Some(&row) = self.pending_rows.get(self.next_row) {
            if row >= row_num {
                break;
            }
            self.write_new_row(writer, row)?;
            self.next_row += 1;
        }
        Ok(())
    }

    fn write_remaining_rows(&mut self, writer: &mut Writer<Vec<u8>>) -> XlsxResult<()> {
        while let Some(&row) = self.pending_rows.get(self.next_row) {
            self.write_new_row(writer, row)?;
            self.next_row += 1;
        }
        Ok(())
    }

    fn write_new_row(&self, writer: &mut Writer<Vec<u8>>, row_num: u32) -> XlsxResult<()> {
        let mut row = BytesStart::new("row");
        row.push_attribute(("r", row_num.to_string().as_str()));
        writer.write_event(Event::Start(row))?;
        self.write_row_cells(writer, row_num)?;
        writer.write_event(Event::End(BytesEnd::new("row")))?;
        Ok(())
    }

    fn write_row_cells(&self, writer: &mut Writer<Vec<u8>>, row_num: u32) -> XlsxResult<()> {
        if let Some(patches) = self.row_patches.get(&row_num) {
            for patch in patches {
                self.write_cell(writer, row_num, *patch)?;
            }
        }
        Ok(())
    }

    /// Write the `<c>` element for one edited cell. A cell with neither
    /// value nor style is dropped.
    fn write_cell(
        &self,
        writer: &mut Writer<Vec<u8>>,
        row_num: u32,
        (col, data): (u16, Option<&CellData>),
    ) -> XlsxResult<()> {
        let Some(data) = data else {
            return Ok(());
        };
        let xml = cell_xml(
            &CellAddress::new(row_num - 1, col).to_a1_string(),
            data,
            self.date1904,
        );
        writer.get_mut().extend_from_slice(xml.as_bytes());
        Ok(())
    }
}

/// Serialize one cell as a `<c>` element. Strings are written inline so the
/// shared string table never needs rewriting.
pub(crate) fn cell_xml(reference: &str, data: &CellData, date1904: bool) -> String {
    const EMPTY: &CellValue = &CellValue::Empty;

    let mut cell = format!(r#"<c r="{}""#, reference);
    if data.style_index != 0 {
        cell.push_str(&format!(r#" s="{}""#, data.style_index));
    }

    let (formula, value) = match &data.value {
        CellValue::Formula { text, cached_value } => (
            Some(text.strip_prefix('=').unwrap_or(text)),
            cached_value.as_deref().unwrap_or(EMPTY),
        ),
        other => (None, other),
    };

    let mut ty: Option<&str> = None;
    let mut body = String::new();
    if let Some(f) = formula {
        body.push_str("<f>");
        body.push_str(&escape(f));
        body.push_str("</f>");
    }

    match value {
        CellValue::Empty | CellValue::Formula { .. } => {}
        CellValue::Number(n) => body.push_str(&format!("<v>{}</v>", n)),
        CellValue::DateTime(dt) => {
            body.push_str(&format!("<v>{}</v>", datetime_to_serial(*dt, date1904)));
        }
        CellValue::Boolean(b) => {
            ty = Some("b");
            body.push_str(if *b { "<v>1</v>" } else { "<v>0</v>" });
        }
        CellValue::Error(e) => {
            ty = Some("e");
            body.push_str(&format!("<v>{}</v>", escape(e.as_str())));
        }
        CellValue::String(s) if formula.is_some() => {
            ty = Some("str");
            body.push_str(&format!("<v>{}</v>", escape(s.as_str())));
        }
        CellValue::String(s) => {
            ty = Some("inlineStr");
            let preserve = s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace);
            body.push_str(if preserve {
                r#"<is><t xml:space="preserve">"#
            } else {
                "<is><t>"
            });
            body.push_str(&escape(s.as_str()));
            body.push_str("</t></is>");
        }
    }

    if let Some(t) = ty {
        cell.push_str(&format!(r#" t="{}""#, t));
    }
    if body.is_empty() {
        cell.push_str("/>");
    } else {
        cell.push('>');
        cell.push_str(&body);
        cell.push_str("</c>");
    }
    cell
}

/// Skip the rest of an element whose start tag was just read
pub(crate) fn skip_element<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>) -> XlsxResult<()> {
    let mut depth = 1usize;
    loop {
        buf.clear();
        match reader.read_event_into(buf)? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XlsxError::Parse(
                    "unexpected end of part inside an element".into(),
                ))
            }
            _ => {}
        }
    }
}

fn parse_row_number(e: &BytesStart<'_>) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"r")
        .and_then(|a| a.unescape_value().ok().and_then(|s| s.parse().ok()))
}

/// Column of a `<c>` element, if its `r` attribute names a cell in `row_num`
fn parse_cell_column(e: &BytesStart<'_>, row_num: u32) -> Option<u16> {
    let reference = e
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"r")
        .and_then(|a| a.unescape_value().ok().map(|s| s.to_string()))?;
    let addr = CellAddress::parse(&reference).ok()?;
    (addr.row + 1 == row_num).then_some(addr.col)
}
