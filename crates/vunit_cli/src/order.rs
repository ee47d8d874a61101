//! `vunit compile-order` and `vunit minimal`.

use crate::pipeline::{load_project, print_files, render_diagnostics, resolve_targets};
use crate::{CompileOrderArgs, GlobalArgs, MinimalArgs};

/// Prints the compile order. Without `--full` only files needing
/// recompilation are listed, unless targets are given.
pub fn run_compile_order(
    args: &CompileOrderArgs,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let targets = resolve_targets(&project, &args.target)?;

    let order = if !targets.is_empty() || args.implementation {
        let targets = (!targets.is_empty()).then_some(targets.as_slice());
        project.get_dependencies_in_compile_order(targets, args.implementation)
    } else {
        project.get_files_in_compile_order(!args.full)
    };
    render_diagnostics(&project, global);
    print_files(&project, &order?, args.format);
    Ok(exit_code(&project))
}

/// Prints the files that need recompiling to bring the targets up to date.
pub fn run_minimal(
    args: &MinimalArgs,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let targets = resolve_targets(&project, &args.target)?;
    let targets = (!targets.is_empty()).then_some(targets.as_slice());

    let order = project.get_minimal_file_set_in_compile_order(targets);
    render_diagnostics(&project, global);
    print_files(&project, &order?, args.format);
    Ok(exit_code(&project))
}

/// 1 if any file failed to scan.
fn exit_code(project: &vunit_project::Project) -> i32 {
    if project.diagnostics().has_errors() {
        1
    } else {
        0
    }
}
