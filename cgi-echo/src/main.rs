// -*- coding: utf-8 -*-
//
// CGI echo diagnostic
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![forbid(unsafe_code)]

mod cgi;
mod envdump;
mod formfields;
mod page;

use crate::cgi::Cgi;
use anyhow::{self as ah, Context as _};
use clap::Parser;
use tokio::runtime;

#[derive(Parser, Debug, Clone)]
struct Opts {
    /// Render the full error chain into the HTTP response on failure.
    ///
    /// This exposes internal state to the client.
    /// Only enable it on deployments that are not reachable by untrusted
    /// clients.
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> ah::Result<()> {
    let opts = Opts::parse();

    let runtime = runtime::Builder::new_current_thread()
        .build()
        .context("Tokio runtime builder")?;

    let cgi = match Cgi::new(opts.debug) {
        Ok(cgi) => cgi,
        Err(e) => {
            cgi::respond_error(&e, opts.debug);
            return Err(e);
        }
    };
    runtime.block_on(cgi.run());
    Ok(())
}

// vim: ts=4 sw=4 expandtab
