//! XML-RPC wire codec
//!
//! Encodes `<methodCall>` documents and decodes `<methodResponse>` documents,
//! including `<fault>` responses. Only the subset of XML-RPC needed by the
//! Loopia API surface is emitted, but every standard value type is accepted
//! on the way in.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::Value;
use crate::error::{LoopiaError, Result};

// ============ Encoding ============

/// Serializes a method call with positional parameters.
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::with_capacity(256);
    out.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    out.push_str("<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        encode_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn encode_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(i) => {
            if i32::try_from(*i).is_ok() {
                let _ = write!(out, "<int>{i}</int>");
            } else {
                let _ = write!(out, "<i8>{i}</i8>");
            }
        }
        Value::Bool(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
        }
        Value::String(s) => {
            let _ = write!(out, "<string>{}</string>", escape(s.as_str()));
        }
        Value::Double(d) => {
            let _ = write!(out, "<double>{d}</double>");
        }
        Value::DateTime(s) => {
            let _ = write!(
                out,
                "<dateTime.iso8601>{}</dateTime.iso8601>",
                escape(s.as_str())
            );
        }
        Value::Base64(bytes) => {
            let _ = write!(out, "<base64>{}</base64>", BASE64.encode(bytes));
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                let _ = write!(out, "<member><name>{}</name>", escape(name.as_str()));
                encode_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                encode_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

// ============ Decoding ============

/// Parses a `<methodResponse>` document.
///
/// Returns the single response parameter, or [`LoopiaError::Fault`] when the
/// server answered with a `<fault>`.
pub fn decode_response(xml: &str) -> Result<Value> {
    let mut parser = Parser::new(xml);

    parser.expect_start(b"methodResponse")?;
    match parser.next_tag()? {
        Event::Start(tag) if tag.name().as_ref() == b"params" => {
            parser.expect_start(b"param")?;
            parser.expect_start(b"value")?;
            let value = parser.value()?;
            parser.expect_end(b"param")?;
            parser.expect_end(b"params")?;
            parser.expect_end(b"methodResponse")?;
            Ok(value)
        }
        Event::Start(tag) if tag.name().as_ref() == b"fault" => {
            parser.expect_start(b"value")?;
            let fault = parser.value()?;
            Err(fault_error(&fault))
        }
        other => Err(unexpected("<params> or <fault>", &other)),
    }
}

fn fault_error(fault: &Value) -> LoopiaError {
    let code = fault.get("faultCode").and_then(Value::as_i64);
    let message = fault.get("faultString").and_then(Value::as_str);
    match (code, message) {
        (Some(code), Some(message)) => LoopiaError::Fault {
            code,
            message: message.to_string(),
        },
        _ => LoopiaError::parse("malformed <fault> struct"),
    }
}

fn unexpected(wanted: &str, got: &Event<'_>) -> LoopiaError {
    let got = match got {
        Event::Start(tag) => format!("<{}>", String::from_utf8_lossy(tag.name().as_ref())),
        Event::End(tag) => format!("</{}>", String::from_utf8_lossy(tag.name().as_ref())),
        Event::Empty(tag) => format!("<{}/>", String::from_utf8_lossy(tag.name().as_ref())),
        Event::Text(_) | Event::CData(_) => "text".to_string(),
        Event::Eof => "end of document".to_string(),
        _ => "markup".to_string(),
    };
    LoopiaError::parse(format!("expected {wanted}, found {got}"))
}

struct Parser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Parser<'a> {
    /// Text is never trimmed: `<string>` and `<value>` content is kept
    /// byte for byte.
    fn new(xml: &'a str) -> Self {
        Self {
            reader: Reader::from_str(xml),
        }
    }

    /// Next significant event (declarations, comments and PIs skipped).
    fn next(&mut self) -> Result<Event<'a>> {
        loop {
            let event = self
                .reader
                .read_event()
                .map_err(|e| LoopiaError::parse(format!("invalid XML: {e}")))?;
            match event {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                other => return Ok(other),
            }
        }
    }

    /// Like [`next`](Self::next), but also skips whitespace-only text.
    /// Only valid between structural tags.
    fn next_tag(&mut self) -> Result<Event<'a>> {
        loop {
            match self.next()? {
                Event::Text(text) if is_blank(&text) => {}
                other => return Ok(other),
            }
        }
    }

    fn expect_start(&mut self, name: &[u8]) -> Result<()> {
        match self.next_tag()? {
            Event::Start(tag) if tag.name().as_ref() == name => Ok(()),
            other => Err(unexpected(
                &format!("<{}>", String::from_utf8_lossy(name)),
                &other,
            )),
        }
    }

    fn expect_end(&mut self, name: &[u8]) -> Result<()> {
        match self.next_tag()? {
            Event::End(tag) if tag.name().as_ref() == name => Ok(()),
            other => Err(unexpected(
                &format!("</{}>", String::from_utf8_lossy(name)),
                &other,
            )),
        }
    }

    /// Text content up to the closing `name` tag. Empty elements yield `""`.
    fn text(&mut self, name: &[u8]) -> Result<String> {
        let text = match self.next()? {
            Event::Text(text) => text
                .unescape()
                .map_err(|e| LoopiaError::parse(format!("invalid text: {e}")))?
                .into_owned(),
            Event::CData(data) => String::from_utf8_lossy(&data.into_inner()).into_owned(),
            Event::End(tag) if tag.name().as_ref() == name => return Ok(String::new()),
            other => return Err(unexpected("text", &other)),
        };
        self.expect_end(name)?;
        Ok(text)
    }

    /// Parses the body of a `<value>` whose start tag was already consumed,
    /// including its closing tag.
    ///
    /// Untyped content is a string. Whitespace in front of a type tag is
    /// indentation; whitespace alone up to `</value>` is the string itself.
    fn value(&mut self) -> Result<Value> {
        let mut event = self.next()?;
        if let Event::Text(text) = event {
            let content = text
                .unescape()
                .map_err(|e| LoopiaError::parse(format!("invalid text: {e}")))?
                .into_owned();
            event = self.next()?;
            match &event {
                Event::End(tag) if tag.name().as_ref() == b"value" => {
                    return Ok(Value::String(content));
                }
                Event::Start(_) | Event::Empty(_) if is_blank(content.as_bytes()) => {}
                other => return Err(unexpected("</value>", other)),
            }
        }

        let value = match event {
            Event::Start(tag) => {
                let name = tag.name().as_ref().to_vec();
                self.typed(&name)?
            }
            Event::Empty(tag) => empty_typed(tag.name().as_ref())?,
            Event::End(tag) if tag.name().as_ref() == b"value" => return Ok(Value::String(String::new())),
            other => return Err(unexpected("a value", &other)),
        };
        self.expect_end(b"value")?;
        Ok(value)
    }

    fn typed(&mut self, name: &[u8]) -> Result<Value> {
        match name {
            b"int" | b"i4" | b"i8" => {
                let text = self.text(name)?;
                text.trim()
                    .parse()
                    .map(Value::Int)
                    .map_err(|_| LoopiaError::parse(format!("invalid integer '{text}'")))
            }
            b"boolean" => match self.text(name)?.trim() {
                "1" => Ok(Value::Bool(true)),
                "0" => Ok(Value::Bool(false)),
                other => Err(LoopiaError::parse(format!("invalid boolean '{other}'"))),
            },
            b"string" => self.text(name).map(Value::String),
            b"double" => {
                let text = self.text(name)?;
                text.trim()
                    .parse()
                    .map(Value::Double)
                    .map_err(|_| LoopiaError::parse(format!("invalid double '{text}'")))
            }
            b"dateTime.iso8601" => self.text(name).map(Value::DateTime),
            b"base64" => {
                let text = self.text(name)?;
                let compact: String = text.split_whitespace().collect();
                BASE64
                    .decode(compact)
                    .map(Value::Base64)
                    .map_err(|e| LoopiaError::parse(format!("invalid base64: {e}")))
            }
            b"struct" => self.members(),
            b"array" => self.items(),
            b"nil" => {
                self.expect_end(b"nil")?;
                Ok(Value::Nil)
            }
            other => Err(LoopiaError::parse(format!(
                "unknown value type <{}>",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn members(&mut self) -> Result<Value> {
        let mut members = BTreeMap::new();
        loop {
            match self.next_tag()? {
                Event::Start(tag) if tag.name().as_ref() == b"member" => {
                    self.expect_start(b"name")?;
                    let name = self.text(b"name")?;
                    self.expect_start(b"value")?;
                    let value = self.value()?;
                    self.expect_end(b"member")?;
                    members.insert(name, value);
                }
                Event::End(tag) if tag.name().as_ref() == b"struct" => {
                    return Ok(Value::Struct(members));
                }
                other => return Err(unexpected("<member> or </struct>", &other)),
            }
        }
    }

    fn items(&mut self) -> Result<Value> {
        let mut items = Vec::new();
        match self.next_tag()? {
            Event::Empty(tag) if tag.name().as_ref() == b"data" => {}
            Event::Start(tag) if tag.name().as_ref() == b"data" => loop {
                match self.next_tag()? {
                    Event::Start(tag) if tag.name().as_ref() == b"value" => {
                        items.push(self.value()?);
                    }
                    Event::Empty(tag) if tag.name().as_ref() == b"value" => {
                        items.push(Value::String(String::new()));
                    }
                    Event::End(tag) if tag.name().as_ref() == b"data" => break,
                    other => return Err(unexpected("<value> or </data>", &other)),
                }
            },
            other => return Err(unexpected("<data>", &other)),
        }
        self.expect_end(b"array")?;
        Ok(Value::Array(items))
    }
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

/// Self-closing type tags such as `<string/>` or `<nil/>`.
fn empty_typed(name: &[u8]) -> Result<Value> {
    match name {
        b"string" => Ok(Value::String(String::new())),
        b"struct" => Ok(Value::Struct(BTreeMap::new())),
        b"array" => Ok(Value::Array(Vec::new())),
        b"base64" => Ok(Value::Base64(Vec::new())),
        b"nil" => Ok(Value::Nil),
        other => Err(LoopiaError::parse(format!(
            "empty <{}> has no value",
            String::from_utf8_lossy(other)
        ))),
    }
}
