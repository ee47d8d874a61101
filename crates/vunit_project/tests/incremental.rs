//! Staleness tracking across `update` calls and file edits.

mod common;

use std::fs;

use common::TestProject;
use vunit_project::SourceFileOptions;

const FILE1: &str = "package pkg1 is end package;";
const FILE2: &str = "use work.pkg1.all;\npackage pkg2 is end package;";
const FILE3: &str = "use work.pkg2.all;\nentity ent3 is end entity;";

fn chain() -> (TestProject, [vunit_project::SourceFileId; 3]) {
    let mut t = TestProject::new();
    let f1 = t.add("lib", "file1.vhd", FILE1);
    let f2 = t.add("lib", "file2.vhd", FILE2);
    let f3 = t.add("lib", "file3.vhd", FILE3);
    (t, [f1, f2, f3])
}

#[test]
fn everything_is_stale_before_first_update() {
    let (t, _) = chain();
    assert_eq!(t.stale(), vec!["file1.vhd", "file2.vhd", "file3.vhd"]);
}

#[test]
fn nothing_is_stale_after_updating_in_order() {
    let (t, ids) = chain();
    t.update_in_order(&ids);
    assert!(t.stale().is_empty());
    assert_eq!(t.compile_order().len(), 3);
}

#[test]
fn editing_upstream_file_recompiles_dependents() {
    let (mut t, [f1, f2, f3]) = chain();
    t.update_in_order(&[f1, f2, f3]);

    let again = t.add("lib", "file1.vhd", "package pkg1 is\n constant c : integer := 1;\nend package;");
    assert_eq!(again, f1);
    assert_eq!(t.stale(), vec!["file1.vhd", "file2.vhd", "file3.vhd"]);

    // file1 compiled after its dependents were: they must follow.
    t.project.update(f1).unwrap();
    assert_eq!(t.stale(), vec!["file2.vhd", "file3.vhd"]);

    t.update_in_order(&[f1, f2, f3]);
    assert!(t.stale().is_empty());
}

#[test]
fn editing_downstream_file_leaves_upstream_alone() {
    let (mut t, ids) = chain();
    t.update_in_order(&ids);
    t.add("lib", "file3.vhd", "use work.pkg2.all;\nentity ent3 is end entity ent3;");
    assert_eq!(t.stale(), vec!["file3.vhd"]);
}

#[test]
fn identical_readd_keeps_state() {
    let (mut t, ids) = chain();
    t.update_in_order(&ids);
    let again = t.add("lib", "file2.vhd", FILE2);
    assert_eq!(again, ids[1]);
    assert!(t.stale().is_empty());
}

#[test]
fn missing_or_corrupt_hash_file_is_stale() {
    let (t, ids) = chain();
    t.update_in_order(&ids);

    fs::write(t.project.hash_file_path(ids[2]).unwrap(), "not a hash").unwrap();
    assert_eq!(t.stale(), vec!["file3.vhd"]);

    fs::remove_file(t.project.hash_file_path(ids[1]).unwrap()).unwrap();
    assert_eq!(t.stale(), vec!["file2.vhd", "file3.vhd"]);
}

#[test]
fn minimal_set_is_limited_to_target_closure() {
    let mut t = TestProject::new();
    let f1 = t.add("lib", "file1.vhd", FILE1);
    let f2 = t.add("lib", "file2.vhd", FILE2);
    let other = t.add("lib", "other.vhd", "package other is end package;");
    t.update_in_order(&[f1, f2, other]);

    t.add("lib", "file1.vhd", "package pkg1 is end package pkg1;");
    t.add("lib", "other.vhd", "package other is end package other;");

    let minimal = t
        .project
        .get_minimal_file_set_in_compile_order(Some(&[f2]))
        .unwrap();
    assert_eq!(t.names(&minimal), vec!["file1.vhd", "file2.vhd"]);

    let all = t.project.get_minimal_file_set_in_compile_order(None).unwrap();
    assert_eq!(t.names(&all), vec!["file1.vhd", "file2.vhd", "other.vhd"]);
}

#[test]
fn vhdl_standard_change_makes_file_stale() {
    let (mut t, ids) = chain();
    t.update_in_order(&ids);
    t.add_with(
        "lib",
        "file3.vhd",
        FILE3,
        SourceFileOptions {
            vhdl_standard: Some(vunit_common::VhdlStandard::Vhdl1993),
            ..SourceFileOptions::default()
        },
    );
    assert_eq!(t.stale(), vec!["file3.vhd"]);
}
