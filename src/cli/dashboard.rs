//! eventops dashboard: the full-screen calendar view.

use std::io::IsTerminal;

use crate::error::{Error, Result};
use crate::ui::dashboard;

use super::Globals;

pub fn run(globals: &Globals) -> Result<()> {
    if globals.output.json {
        return Err(Error::InvalidArgument(
            "dashboard is interactive and has no JSON output; use `eventops calendar --json`"
                .to_string(),
        ));
    }
    if !std::io::stdout().is_terminal() {
        return Err(Error::InvalidArgument(
            "dashboard needs an interactive terminal".to_string(),
        ));
    }
    let ctx = globals.context()?;
    dashboard::run(ctx)
}
