// -*- coding: utf-8 -*-
//
// CGI echo diagnostic
//
// Licensed under the Apache License version 2.0
// or the MIT license, at your option.
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::env;

/// Snapshot of the process environment at request start.
///
/// The order of the entries is whatever order the host exposes.
/// Names or values that are not valid UTF-8 are converted lossily.
pub struct EnvSnapshot {
    vars: Vec<(String, String)>,
}

impl EnvSnapshot {
    pub fn capture() -> Self {
        let vars = env::vars_os()
            .map(|(name, value)| {
                (
                    name.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            })
            .collect();
        Self { vars }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
impl EnvSnapshot {
    pub fn from_pairs(vars: Vec<(String, String)>) -> Self {
        Self { vars }
    }
}


// vim: ts=4 sw=4 expandtab
