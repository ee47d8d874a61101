//! `vunit mark-compiled`: records content hashes after a successful compile.

use crate::pipeline::{load_project, render_diagnostics, resolve_targets};
use crate::{GlobalArgs, MarkCompiledArgs};

/// Marks the given files, or every file needing recompilation, as compiled.
///
/// Files are marked in compile order so that each is recorded after the
/// files it depends on.
pub fn run(args: &MarkCompiledArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let stale = project.get_files_in_compile_order(true)?;
    let ids = if args.files.is_empty() {
        stale
    } else {
        let selected = resolve_targets(&project, &args.files)?;
        let order = project.get_files_in_compile_order(false)?;
        order
            .into_iter()
            .filter(|id| selected.contains(id))
            .collect()
    };
    render_diagnostics(&project, global);

    for &id in &ids {
        project.update(id)?;
        tracing::debug!(file = %id, "marked compiled");
    }
    if !global.quiet {
        eprintln!("   Marked {} file(s) compiled", ids.len());
    }
    Ok(0)
}
