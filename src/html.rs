// src/html.rs
//
// Tag lookup over parsed pages. Matching mirrors "find the first <tag> with
// these attributes": name must match, every attribute constraint must hold,
// and `class` matches any single class of the element.

use regex::Regex;
use scraper::{ElementRef, Html};
use std::fmt;

use crate::error::{ParserError, Result};

#[derive(Debug, Clone)]
pub enum AttrValue<'q> {
    Exact(&'q str),
    Pattern(&'q Regex),
}

/// Tag name plus attribute constraints; an empty list matches any attributes.
#[derive(Debug, Clone)]
pub struct TagQuery<'q> {
    name: &'q str,
    attrs: Vec<(&'q str, AttrValue<'q>)>,
}

impl<'q> TagQuery<'q> {
    pub fn new(name: &'q str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
        }
    }

    pub fn attr(mut self, key: &'q str, value: &'q str) -> Self {
        self.attrs.push((key, AttrValue::Exact(value)));
        self
    }

    pub fn attr_matching(mut self, key: &'q str, pattern: &'q Regex) -> Self {
        self.attrs.push((key, AttrValue::Pattern(pattern)));
        self
    }

    pub fn matches(&self, el: &ElementRef<'_>) -> bool {
        let element = el.value();
        if !element.name().eq_ignore_ascii_case(self.name) {
            return false;
        }
        self.attrs.iter().all(|(key, want)| {
            let Some(have) = element.attr(key) else {
                return false;
            };
            match want {
                AttrValue::Exact(v) if *key == "class" => {
                    have == *v || have.split_whitespace().any(|c| c == *v)
                }
                AttrValue::Exact(v) => have == *v,
                AttrValue::Pattern(re) => re.is_match(have),
            }
        })
    }

    fn not_found(&self) -> ParserError {
        ParserError::TagNotFound {
            tag: self.name.to_string(),
            attrs: self.attrs_display(),
        }
    }

    fn attrs_display(&self) -> String {
        let parts: Vec<String> = self
            .attrs
            .iter()
            .map(|(k, v)| match v {
                AttrValue::Exact(s) => format!("{k}={s:?}"),
                AttrValue::Pattern(re) => format!("{k}~/{}/", re.as_str()),
            })
            .collect();
        format!("{{{}}}", parts.join(", "))
    }
}

impl fmt::Display for TagQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.attrs_display())
    }
}

/// Every descendant of `root` matching `query`, in document order.
/// `root` itself is not considered.
pub fn find_all<'a>(root: ElementRef<'a>, query: &TagQuery<'_>) -> Vec<ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|el| query.matches(el))
        .collect()
}

/// First descendant of `root` matching `query`, or `TagNotFound`.
pub fn find_tag<'a>(root: ElementRef<'a>, query: &TagQuery<'_>) -> Result<ElementRef<'a>> {
    root.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|el| query.matches(el))
        .ok_or_else(|| query.not_found())
}

/// `find_tag` starting from the document itself, so `<html>` is a candidate too.
pub fn find_in_document<'a>(doc: &'a Html, query: &TagQuery<'_>) -> Result<ElementRef<'a>> {
    let root = doc.root_element();
    if query.matches(&root) {
        return Ok(root);
    }
    find_tag(root, query)
}

/// Concatenated text of every text node under `el`.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Value of `key` on `el`, or `TagNotFound` naming the attribute.
pub fn required_attr<'a>(el: ElementRef<'a>, key: &str) -> Result<&'a str> {
    el.value()
        .attr(key)
        .ok_or_else(|| ParserError::TagNotFound {
            tag: el.value().name().to_string(),
            attrs: format!("{{{key}}}"),
        })
}
