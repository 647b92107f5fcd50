// Copyright 2023 Marsh J. Ray
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::Write;

use anyhow::*;

use genyaml::counter::print_counter;
use genyaml::keyed_yaml::{run_demo, TEAMS_YAML};

const COUNTER_BOUND: i64 = 5;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    log::info!("counter demo, bound {COUNTER_BOUND}");
    print_counter(COUNTER_BOUND, &mut out).context("writing counter output")?;

    writeln!(out, "--------------------------")?;

    log::info!("keyed sequence YAML demo");
    let opt_document = run_demo(TEAMS_YAML, &mut out, &mut err).context("writing YAML demo output")?;

    if let Some(document) = opt_document {
        writeln!(out, "--------------------------")?;
        let json = serde_json::to_string_pretty(&document.to_json())?;
        writeln!(out, "{json}")?;
    }

    out.flush()?;
    Ok(())
}
