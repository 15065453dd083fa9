//! `xl/calcChain.xml` upkeep
//!
//! The calculation chain lists formula cells by sheet id and reference.
//! A listed cell that now holds a plain value makes Excel offer to repair
//! the file, so the chain is dropped together with its relationship and
//! content type. Excel rebuilds a missing chain on the next recalculation.

use std::collections::HashSet;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::Writer;

use crate::error::XlsxResult;
use crate::package::Package;
use crate::patch::skip_element;
use timebook_core::CellAddress;

pub const CALC_CHAIN_PART: &str = "xl/calcChain.xml";

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";

/// Cells listed in a calc chain, as (sheet id, cell)
pub(crate) fn chain_cells(xml: &[u8]) -> XlsxResult<HashSet<(u32, CellAddress)>> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut cells = HashSet::new();
    let mut sheet_id = 0;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                let mut cell = None;
                for attr in e.attributes().flatten() {
                    let Ok(value) = attr.unescape_value() else {
                        continue;
                    };
                    match attr.key.as_ref() {
                        b"r" => cell = CellAddress::parse(&value).ok(),
                        // Without `i` an entry stays on the previous entry's sheet
                        b"i" => sheet_id = value.parse().unwrap_or(sheet_id),
                        _ => {}
                    }
                }
                if let Some(cell) = cell {
                    cells.insert((sheet_id, cell));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(cells)
}

/// Remove the calc chain when it lists any of the `written` cells.
///
/// Returns whether the chain was removed.
pub(crate) fn drop_stale_calc_chain(
    package: &mut Package,
    written: &[(u32, CellAddress)],
) -> XlsxResult<bool> {
    let Some(chain) = package.part(CALC_CHAIN_PART) else {
        return Ok(false);
    };
    let listed = chain_cells(chain)?;
    if !written.iter().any(|cell| listed.contains(cell)) {
        return Ok(false);
    }

    package.remove_part(CALC_CHAIN_PART);
    if let Some(rels) = package.part(WORKBOOK_RELS_PART) {
        let rels = without_elements(rels, b"Relationship", |e| {
            attr_value(e, b"Target").map_or(false, |t| t.ends_with("calcChain.xml"))
        })?;
        package.set_part(WORKBOOK_RELS_PART, rels);
    }
    if let Some(types) = package.part(CONTENT_TYPES_PART) {
        let types = without_elements(types, b"Override", |e| {
            attr_value(e, b"PartName").as_deref() == Some("/xl/calcChain.xml")
        })?;
        package.set_part(CONTENT_TYPES_PART, types);
    }
    Ok(true)
}

fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Copy `xml`, leaving out every `name` element matching `unwanted`
fn without_elements<F>(xml: &[u8], name: &[u8], unwanted: F) -> XlsxResult<Vec<u8>>
where
    F: Fn(&BytesStart<'_>) -> bool,
{
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)?.into_owned() {
            Event::Empty(e) if e.local_name().as_ref() == name && unwanted(&e) => {}
            Event::Start(e) if e.local_name().as_ref() == name && unwanted(&e) => {
                skip_element(&mut reader, &mut buf)?;
            }
            Event::Eof => break,
            ev => writer.write_event(ev)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}
