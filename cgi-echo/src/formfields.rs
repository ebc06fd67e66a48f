// -*- coding: utf-8 -*-
//
// CGI echo diagnostic
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT

use anyhow::{self as ah, Context as _};
use multer::{parse_boundary, Constraints, Multipart, SizeLimit};

const LIMIT_WHOLE_STREAM: u64 = 1024 * 1024;
const LIMIT_PER_FIELD: u64 = 1024 * 128;

/// One submitted value of a form field.
///
/// A value that carries a filename is a file upload.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FieldValue {
    Text(String),
    File { filename: String },
}

/// Parsed request parameters, keyed by field name.
///
/// Query string and request body fields land in the same collection,
/// so a lookup does not distinguish GET from POST origin.
/// Entries keep their insertion order.
/// A field submitted more than once keeps all values on one entry.
pub struct FormFields {
    items: Vec<(String, Vec<FieldValue>)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub(crate) fn insert(&mut self, name: String, value: FieldValue) {
        if let Some((_, values)) = self.items.iter_mut().find(|(n, _)| *n == name) {
            values.push(value);
        } else {
            self.items.push((name, vec![value]));
        }
    }

    /// Parse an application/x-www-form-urlencoded string.
    ///
    /// Used for both the query string and urlencoded POST bodies.
    /// Pairs without a '=' become fields with an empty value.
    /// Pairs with an empty name are dropped.
    pub fn parse_urlencoded(&mut self, data: &str) {
        for pair in data.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let name = decode_component(name);
            let value = decode_component(value);
            if name.is_empty() {
                continue;
            }
            self.insert(name, FieldValue::Text(value));
        }
    }

    /// Parse a multipart/form-data body.
    pub async fn parse_multipart(&mut self, body: &[u8], body_mime: &str) -> ah::Result<()> {
        let boundary = parse_boundary(body_mime).context("Parse form-data boundary")?;
        let sizelim = SizeLimit::new()
            .whole_stream(LIMIT_WHOLE_STREAM)
            .per_field(LIMIT_PER_FIELD);
        let constr = Constraints::new().size_limit(sizelim);
        let mut multipart = Multipart::with_reader_with_constraints(body, boundary, constr);
        while let Some(field) = multipart.next_field().await.context("Multipart field")? {
            let Some(name) = field.name() else {
                continue;
            };
            let name = name.to_string();
            if let Some(filename) = field.file_name() {
                let filename = filename.to_string();
                self.insert(name, FieldValue::File { filename });
                continue;
            }
            let Ok(text) = field.text().await else {
                continue;
            };
            self.insert(name, FieldValue::Text(text));
        }
        Ok(())
    }

    /// Get the first submitted value of a field.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.items
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, values)| values.first())
    }

    /// Iterate field names with their first values, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.items
            .iter()
            .filter_map(|(name, values)| values.first().map(|v| (name.as_str(), v)))
    }
}

fn decode_component(s: &str) -> String {
    // In form encoding '+' stands for a space.
    let s = s.replace('+', " ");
    url_escape::decode(&s).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime;

    fn block_on<F: std::future::Future>(f: F) -> F::Output {
        runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(f)
    }

    #[test]
    fn test_parse_urlencoded() {
        let mut f = FormFields::new();
        f.parse_urlencoded("name=Alice&age=30");
        let items: Vec<_> = f.iter().collect();
        assert_eq!(
            items,
            vec![
                ("name", &FieldValue::Text("Alice".to_string())),
                ("age", &FieldValue::Text("30".to_string())),
            ]
        );
    }

    #[test]
    fn test_parse_urlencoded_escapes() {
        let mut f = FormFields::new();
        f.parse_urlencoded("a=hello%20world&b=x%2By&c=1+2");
        assert_eq!(f.get("a"), Some(&FieldValue::Text("hello world".to_string())));
        assert_eq!(f.get("b"), Some(&FieldValue::Text("x+y".to_string())));
        assert_eq!(f.get("c"), Some(&FieldValue::Text("1 2".to_string())));
    }

    #[test]
    fn test_parse_urlencoded_degenerate() {
        let mut f = FormFields::new();
        f.parse_urlencoded("");
        assert_eq!(f.iter().count(), 0);

        let mut f = FormFields::new();
        f.parse_urlencoded("&&flag&=dropped&x=");
        let items: Vec<_> = f.iter().collect();
        assert_eq!(
            items,
            vec![
                ("flag", &FieldValue::Text("".to_string())),
                ("x", &FieldValue::Text("".to_string())),
            ]
        );
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let mut f = FormFields::new();
        f.parse_urlencoded("a=1&b=2&a=3");
        assert_eq!(f.get("a"), Some(&FieldValue::Text("1".to_string())));
        let items: Vec<_> = f.iter().map(|(n, _)| n).collect();
        assert_eq!(items, vec!["a", "b"]);
    }

    #[test]
    fn test_merge_query_and_body() {
        let mut f = FormFields::new();
        f.parse_urlencoded("q=from-query");
        f.parse_urlencoded("p=from-body");
        let items: Vec<_> = f.iter().map(|(n, _)| n).collect();
        assert_eq!(items, vec!["q", "p"]);
    }

    #[test]
    fn test_parse_multipart() {
        let body = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"greeting\"\r\n",
            "\r\n",
            "hi there\r\n",
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"upload\"; filename=\"x.txt\"\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "file payload\r\n",
            "--XBOUNDARY--\r\n",
        );
        let mut f = FormFields::new();
        block_on(f.parse_multipart(body.as_bytes(), "multipart/form-data; boundary=XBOUNDARY"))
            .unwrap();
        assert_eq!(
            f.get("greeting"),
            Some(&FieldValue::Text("hi there".to_string()))
        );
        assert_eq!(
            f.get("upload"),
            Some(&FieldValue::File {
                filename: "x.txt".to_string()
            })
        );
    }

    #[test]
    fn test_multipart_follows_query_fields() {
        let body = concat!(
            "--XBOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"extra\"\r\n",
            "\r\n",
            "from body\r\n",
            "--XBOUNDARY--\r\n",
        );
        let mut f = FormFields::new();
        f.parse_urlencoded("first=1&second=2");
        block_on(f.parse_multipart(body.as_bytes(), "multipart/form-data; boundary=XBOUNDARY"))
            .unwrap();
        let names: Vec<_> = f.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["first", "second", "extra"]);
    }

    #[test]
    fn test_parse_multipart_bad_mime() {
        let mut f = FormFields::new();
        let res = block_on(f.parse_multipart(b"x", "text/plain"));
        assert!(res.is_err());
    }
}

// vim: ts=4 sw=4 expandtab
