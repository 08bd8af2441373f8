//! Minimal namespace-aware element tree over quick-xml's `NsReader`.
//!
//! Elements are matched by resolved namespace uri and local name, never by prefix,
//! so `<arxiv:doi>` and `<meta:doi>` bound to the same uri are the same element.

use std::borrow::Cow;

use quick_xml::{
    events::{BytesStart, Event},
    name::ResolveResult,
    NsReader
};

use crate::error::{Result, ScrapeError};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Element {
    pub namespace: Option<String>,
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>
}

impl Element {
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.name == name
    }

    /// First direct child with the given namespace and local name.
    pub fn find(&self, namespace: &str, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.is(namespace, name))
    }

    /// All direct children with the given namespace and local name, in document order.
    pub fn find_all<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.is(namespace, name))
    }

    pub fn find_text(&self, namespace: &str, name: &str) -> Option<&str> {
        self.find(namespace, name).map(Element::text)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Parses a whole document and returns its root element.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_resolved_event()? {
            (ns, Event::Start(start)) => stack.push(open_element(ns, &start)?),
            (ns, Event::Empty(start)) => {
                let element = open_element(ns, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ScrapeError::Parse("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            (_, Event::Text(text)) => {
                let text = text.unescape()?;
                push_text(&mut stack, text)?;
            }
            (_, Event::CData(data)) => {
                let data = data.into_inner();
                push_text(&mut stack, String::from_utf8_lossy(&data))?;
            }
            (_, Event::Eof) => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ScrapeError::Parse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| ScrapeError::Parse("document has no root element".to_string()))
}

fn open_element(ns: ResolveResult, start: &BytesStart) -> Result<Element> {
    let namespace = match ns {
        ResolveResult::Bound(namespace) => {
            Some(String::from_utf8_lossy(namespace.as_ref()).into_owned())
        }
        _ => None
    };
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ScrapeError::Parse(e.to_string()))?;
        let key = attr.key;
        // namespace declarations are already resolved by the reader.
        if key.as_ref() == b"xmlns" || key.as_ref().starts_with(b"xmlns:") {
            continue;
        }
        let name = String::from_utf8_lossy(key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((name, value));
    }
    Ok(Element {
        namespace,
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        ..Element::default()
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ScrapeError::Parse("multiple root elements".to_string()))
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: Cow<'_, str>) -> Result<()> {
    match stack.last_mut() {
        Some(current) => current.text.push_str(&text),
        None if text.trim().is_empty() => {}
        None => return Err(ScrapeError::Parse("text outside of the root element".to_string()))
    }
    Ok(())
}
