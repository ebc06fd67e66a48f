// -*- coding: utf-8 -*-
//
// CGI echo diagnostic
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    envdump::EnvSnapshot,
    formfields::{FieldValue, FormFields},
};
use anyhow as ah;

// The field collection does not distinguish GET from POST origin,
// so the POST section is a fixed note instead of a second dump.
const POST_NOTE_1: &str =
    "Note: Both GET and POST data are accessible through the same form field collection.";
const POST_NOTE_2: &str = "The data shown above includes both GET and POST parameters.";

/// Render the three-section diagnostic report.
///
/// Names and values are emitted verbatim, without HTML escaping.
/// This tool echoes raw request data on purpose and must never be
/// exposed to untrusted clients.
pub fn render_report(env: &EnvSnapshot, fields: &FormFields) -> String {
    let mut b = String::with_capacity(256 + env.len() * 64);

    b.push_str("<html><body>\n");
    b.push_str("<h1>CGI Test</h1>\n");

    b.push_str("<h2>Server Variables:</h2>\n");
    b.push_str("<pre>\n");
    for (name, value) in env.iter() {
        b.push_str(&format!("{name}: {value}\n"));
    }
    b.push_str("</pre>\n");

    b.push_str("<h2>GET Data:</h2>\n");
    b.push_str("<pre>\n");
    for (name, value) in fields.iter() {
        // Fields that carry a filename are uploads. Skip them.
        if let FieldValue::Text(value) = value {
            b.push_str(&format!("{name}: {value}\n"));
        }
    }
    b.push_str("</pre>\n");

    b.push_str("<h2>POST Data:</h2>\n");
    b.push_str("<pre>\n");
    b.push_str(POST_NOTE_1);
    b.push('\n');
    b.push_str(POST_NOTE_2);
    b.push('\n');
    b.push_str("</pre>\n");

    b.push_str("</body></html>\n");
    b
}

/// Render the debug-only error page with the full error chain.
pub fn render_debug_error(error: &ah::Error) -> String {
    let mut b = String::new();
    b.push_str("<html><body>\n");
    b.push_str("<h1>CGI Test: request failed (debug output)</h1>\n");
    b.push_str("<pre>\n");
    b.push_str(&format!("{error:?}\n"));
    b.push_str("</pre>\n");
    b.push_str("</body></html>\n");
    b
}


// vim: ts=4 sw=4 expandtab
