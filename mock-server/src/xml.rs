//! Renders JSON envelopes as XML documents for `.xml` requests.

use std::error::Error;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;

type XmlResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

pub fn to_xml(value: &Value) -> XmlResult<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, "jotform", value)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> XmlResult<()> {
    // Question IDs and list indexes are not valid element names.
    let name = if is_valid_name(name) { name } else { "item" };
    if value.is_null() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new(name)))?;
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                write_element(writer, key, child)?;
            }
        }
        Value::Array(items) => {
            for child in items {
                write_element(writer, "item", child)?;
            }
        }
        Value::String(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(escape(text.as_str()))))?;
        }
        other => {
            writer.write_event(Event::Text(BytesText::from_escaped(other.to_string())))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        }
        _ => false,
    }
}
