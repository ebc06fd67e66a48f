// -*- coding: utf-8 -*-
//
// CGI echo diagnostic
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{envdump::EnvSnapshot, formfields::FormFields, page};
use anyhow::{self as ah, format_err as err, Context as _};
use std::{
    env,
    ffi::OsString,
    io::{self, Read, Write},
};

const MAX_CGIENV_LEN: usize = 1024 * 4;
const MAX_CGIENV_U32_LEN: usize = 10;
const MAX_POST_BODY_LEN: u32 = 1024 * 1024;

fn get_cgienv(name: &str) -> ah::Result<OsString> {
    let value = env::var_os(name).unwrap_or_default();
    if value.len() <= MAX_CGIENV_LEN {
        Ok(value)
    } else {
        Err(err!("Environment variable '{name}' is too long."))
    }
}

fn get_cgienv_str(name: &str) -> ah::Result<String> {
    if let Ok(s) = get_cgienv(name)?.into_string() {
        Ok(s)
    } else {
        Err(err!("Environment variable '{name}' is not valid UTF-8."))
    }
}

fn get_cgienv_u32(name: &str) -> ah::Result<u32> {
    let value = get_cgienv_str(name)?;
    let value = value.trim();
    if value.len() <= MAX_CGIENV_U32_LEN {
        Ok(value.parse::<u32>()?)
    } else {
        Err(err!("Environment variable '{name}' is too long (u32)."))
    }
}

fn read_body(f: &mut impl Read, body_len: u32) -> ah::Result<Vec<u8>> {
    if body_len > MAX_POST_BODY_LEN {
        return Err(err!("POST: CONTENT_LENGTH is too large."));
    }
    let mut body = vec![0; body_len.try_into()?];
    f.read_exact(&mut body).context("CGI stdin read")?;
    Ok(body)
}

fn out(f: &mut impl Write, data: &[u8]) {
    f.write_all(data).unwrap();
}

fn outstr(f: &mut impl Write, data: &str) {
    out(f, data.as_bytes());
}

fn response_200_ok(f: &mut impl Write, body: &[u8]) {
    outstr(f, "Content-Type: text/html; charset=UTF-8\n");
    outstr(f, "\n");
    out(f, body);
}

fn response_500_internal_error(f: &mut impl Write, error: &ah::Error, debug: bool) {
    if debug {
        outstr(f, "Content-Type: text/html; charset=UTF-8\n");
        outstr(f, "Status: 500 Internal Server Error\n");
        outstr(f, "\n");
        outstr(f, &page::render_debug_error(error));
    } else {
        outstr(f, "Content-type: text/plain\n");
        outstr(f, "Status: 500 Internal Server Error\n");
        outstr(f, "\n");
        outstr(f, "Internal error.\n");
    }
}

/// Write an error response to stdout.
///
/// Without the debug flag the client only sees a terse message.
pub fn respond_error(error: &ah::Error, debug: bool) {
    response_500_internal_error(&mut io::stdout(), error, debug);
}

pub struct Cgi {
    query: String,
    meth: String,
    body_len: u32,
    body_type: String,
    debug: bool,
}

impl Cgi {
    pub fn new(debug: bool) -> ah::Result<Self> {
        let query = get_cgienv_str("QUERY_STRING").unwrap_or_default();
        let meth = get_cgienv_str("REQUEST_METHOD")?.trim().to_string();
        let body_len = get_cgienv_u32("CONTENT_LENGTH").unwrap_or_default();
        let body_type = get_cgienv_str("CONTENT_TYPE").unwrap_or_default();

        Ok(Self {
            query,
            meth,
            body_len,
            body_type,
            debug,
        })
    }

    pub async fn run(&self) {
        if let Err(e) = self.run_request().await {
            // The host web server collects stderr in its error log.
            eprintln!("cgi-echo: {e:?}");
            respond_error(&e, self.debug);
        }
    }

    async fn run_request(&self) -> ah::Result<()> {
        let env = EnvSnapshot::capture();

        let mut fields = FormFields::new();
        fields.parse_urlencoded(&self.query);

        if self.meth == "POST" && self.body_len > 0 {
            let body = read_body(&mut io::stdin(), self.body_len)?;

            let body_type = self.body_type.trim();
            if body_type.starts_with("multipart/form-data") {
                fields
                    .parse_multipart(&body, body_type)
                    .await
                    .context("Parse multipart form data")?;
            } else if body_type.starts_with("application/x-www-form-urlencoded") {
                let body = std::str::from_utf8(&body).context("POST body is not valid UTF-8")?;
                fields.parse_urlencoded(body);
            }
            // Other body types carry no form fields.
            // The body has been drained, which is all CGI requires.
        }

        let body = page::render_report(&env, &fields);
        response_200_ok(&mut io::stdout(), body.as_bytes());
        Ok(())
    }
}


// vim: ts=4 sw=4 expandtab
