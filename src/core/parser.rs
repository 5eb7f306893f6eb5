//! Catalog response parsing.
//!
//! The DUR product list service answers with
//! `<response><header/><body><items><item>...</item></items></body></response>`.
//! Only the first `<item>` is used; any later records are ignored.

use crate::domain::model::CatalogItem;
use crate::utils::error::{RelayError, Result, Upstream};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

const ITEM_TAG: &[u8] = b"item";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    DocId,
    InsertFile,
    ItemName,
    EntpName,
}

impl Field {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"NB_DOC_ID" => Some(Field::DocId),
            b"INSERT_FILE" => Some(Field::InsertFile),
            b"ITEM_NAME" => Some(Field::ItemName),
            b"ENTP_NAME" => Some(Field::EntpName),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Values of the first record. A slot is `seen` once its first occurrence closes,
/// so a repeated child never overwrites it.
#[derive(Default)]
struct RecordFields {
    values: [Option<String>; 4],
    seen: [bool; 4],
}

impl RecordFields {
    fn is_seen(&self, field: Field) -> bool {
        self.seen[field.index()]
    }

    fn set(&mut self, field: Field, text: &str) {
        let i = field.index();
        if self.seen[i] {
            return;
        }
        self.seen[i] = true;
        let text = text.trim();
        if !text.is_empty() {
            self.values[i] = Some(text.to_string());
        }
    }

    fn take(&mut self, field: Field) -> Option<String> {
        self.values[field.index()].take()
    }
}

/// Text capture for a known child of the first item. Text after a nested
/// element opens is not part of the value.
struct Capture {
    field: Field,
    depth: usize,
    text: String,
    sealed: bool,
}

fn malformed(message: impl Into<String>) -> RelayError {
    RelayError::MalformedResponse {
        service: Upstream::Catalog,
        message: message.into(),
    }
}

/// 解析 catalog XML，回傳第一筆 item
pub fn parse_catalog_response(xml: &[u8]) -> Result<CatalogItem> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut root_seen = false;
    let mut items_seen: usize = 0;
    let mut item_depth: Option<usize> = None;
    let mut item_done = false;
    let mut capture: Option<Capture> = None;
    let mut fields = RecordFields::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if depth == 0 {
                    if root_seen {
                        return Err(malformed("junk after document element"));
                    }
                    root_seen = true;
                }
                depth += 1;

                if let Some(c) = capture.as_mut() {
                    c.sealed = true;
                }

                let name = e.name();
                if name.as_ref() == ITEM_TAG {
                    items_seen += 1;
                    if item_depth.is_none() && !item_done {
                        item_depth = Some(depth);
                    }
                } else if capture.is_none() && item_depth == Some(depth - 1) {
                    if let Some(field) = Field::from_tag(name.as_ref()) {
                        if !fields.is_seen(field) {
                            capture = Some(Capture {
                                field,
                                depth,
                                text: String::new(),
                                sealed: false,
                            });
                        }
                    }
                }
            }
            Ok(Event::Empty(ref e)) => {
                if depth == 0 {
                    if root_seen {
                        return Err(malformed("junk after document element"));
                    }
                    root_seen = true;
                }

                if let Some(c) = capture.as_mut() {
                    c.sealed = true;
                }

                let name = e.name();
                if name.as_ref() == ITEM_TAG {
                    items_seen += 1;
                    if item_depth.is_none() && !item_done {
                        // <item/> 沒有任何欄位
                        item_done = true;
                    }
                } else if capture.is_none() && item_depth == Some(depth) {
                    if let Some(field) = Field::from_tag(name.as_ref()) {
                        fields.set(field, "");
                    }
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return Err(malformed("unexpected closing tag outside root element"));
                }
                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    if let Some(c) = capture.take() {
                        fields.set(c.field, &c.text);
                    }
                }
                if item_depth == Some(depth) {
                    item_depth = None;
                    item_done = true;
                }
                depth -= 1;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|err| malformed(err.to_string()))?;
                if depth == 0 {
                    if !text.trim().is_empty() {
                        return Err(malformed("text outside root element"));
                    }
                } else if let Some(c) = capture.as_mut() {
                    if c.depth == depth && !c.sealed {
                        c.text.push_str(&text);
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if depth == 0 {
                    return Err(malformed("CDATA outside root element"));
                }
                if let Some(c) = capture.as_mut() {
                    if c.depth == depth && !c.sealed {
                        let text = std::str::from_utf8(&e)
                            .map_err(|err| malformed(format!("invalid UTF-8 in CDATA: {}", err)))?;
                        c.text.push_str(text);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(malformed(format!(
                    "{} (at byte {})",
                    e,
                    reader.buffer_position()
                )));
            }
        }
        buf.clear();
    }

    if !root_seen {
        return Err(malformed("no element found"));
    }
    if depth != 0 {
        return Err(malformed(format!(
            "unexpected end of document: {} unclosed element(s)",
            depth
        )));
    }

    if items_seen == 0 {
        return Err(RelayError::NotFound("No items found".to_string()));
    }
    if items_seen > 1 {
        debug!(
            ignored = items_seen - 1,
            "Using first catalog item, ignoring the rest"
        );
    }

    let item = CatalogItem {
        viewer_reference: fields.take(Field::DocId),
        download_reference: fields.take(Field::InsertFile),
        item_name: fields.take(Field::ItemName),
        company_name: fields.take(Field::EntpName),
    };

    if item.viewer_reference.is_none() && item.download_reference.is_none() {
        return Err(RelayError::NotFound("PDF URLs not found".to_string()));
    }

    debug!(
        item_name = ?item.item_name,
        company_name = ?item.company_name,
        "Parsed catalog item"
    );

    Ok(item)
}
