mod support;

use predicates::str::contains;

#[test]
fn todos_help_works() {
    support::todos_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("a local task list"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["add", "list", "toggle", "delete", "stats", "board"];

    for cmd in subcommands {
        support::todos_cmd()
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn aliases_resolve() {
    let store = support::TestStore::new();
    store.cmd().arg("ls").assert().success();
    store.cmd().args(["rm", "1", "--yes"]).assert().success();
}
