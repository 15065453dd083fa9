//! styles.xml parsing
//!
//! Only the parts needed to classify cell values are read: custom number
//! formats and the number format of every `cellXfs` entry.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::numfmt::is_date_format_id;

/// Per-`cellXfs` index: does the style render its number as a date?
#[derive(Debug, Clone, Default)]
pub(crate) struct DateStyles {
    flags: Vec<bool>,
}

impl DateStyles {
    /// Check whether the style at `index` is a date style
    pub(crate) fn is_date(&self, index: u32) -> bool {
        self.flags.get(index as usize).copied().unwrap_or(false)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.flags.len()
    }
}

fn parse_u32_attr(e: &BytesStart<'_>, name: &[u8]) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok().and_then(|s| s.parse().ok()))
}

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<DateStyles> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut xf_numfmt_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"cellXfs" => {
                in_cell_xfs = true;
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    let id = parse_u32_attr(&e, b"numFmtId");
                    let code = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"formatCode")
                        .and_then(|a| a.unescape_value().ok().map(|s| s.to_string()));
                    if let (Some(id), Some(code)) = (id, code) {
                        numfmts.insert(id, code);
                    }
                }
                b"xf" if in_cell_xfs => {
                    xf_numfmt_ids.push(parse_u32_attr(&e, b"numFmtId").unwrap_or(0));
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let flags = xf_numfmt_ids
        .iter()
        .map(|id| is_date_format_id(*id, numfmts.get(id).map(String::as_str)))
        .collect();

    Ok(DateStyles { flags })
}
