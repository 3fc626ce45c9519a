//! Tests for the migration runner: ordering, idempotence, atomicity and
//! per-kind filtering.

use super::*;
use crate::change::Change;
use crate::kind::DatabaseKind::{Customer, Diagram, NetworkModel};

// ── Helpers ────────────────────────────────────────────────────────────

fn catalog(changesets: Vec<ChangeSet>) -> ChangeSetCatalog {
    ChangeSetCatalog::new(changesets).unwrap()
}

/// A ChangeSet that logs its own id into `applied`, so tests can see the
/// order ChangeSets ran in.
fn logging(id: u32) -> ChangeSet {
    ChangeSet::new(
        id,
        vec![Change::new([format!(
            "INSERT INTO applied (changeset) VALUES ({id})"
        )])],
    )
}

fn applied_log_table() -> ChangeSet {
    ChangeSet::new(
        1,
        vec![Change::new([
            "CREATE TABLE applied (seq INTEGER PRIMARY KEY AUTOINCREMENT, changeset INTEGER NOT NULL)",
            "INSERT INTO applied (changeset) VALUES (1)",
        ])],
    )
}

fn applied(conn: &Connection) -> Vec<u32> {
    let mut stmt = conn
        .prepare("SELECT changeset FROM applied ORDER BY seq")
        .unwrap();
    let ids = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<u32>, _>>()
        .unwrap();
    ids
}

fn stored_version(conn: &Connection) -> u32 {
    conn.query_row("SELECT version FROM version", [], |row| row.get(0))
        .unwrap()
}

fn table_exists(conn: &Connection, name: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        > 0
}

fn memory() -> Connection {
    Connection::open_in_memory().unwrap()
}

// ── Ordering ───────────────────────────────────────────────────────────

#[test]
fn fresh_database_applies_every_changeset() {
    let catalog = catalog(vec![applied_log_table(), logging(2), logging(3)]);
    let mut conn = memory();

    let run = MigrationRunner::new(&catalog).run(&mut conn, NetworkModel);

    assert!(run.is_success());
    assert_eq!(run.starting_version, Some(0));
    assert_eq!(run.attempted, vec![1, 2, 3]);
    assert_eq!(run.committed, vec![1, 2, 3]);
    assert_eq!(run.state, RunState::Done(3));
    assert_eq!(run.final_version(), Some(3));
    assert_eq!(stored_version(&conn), 3);
    assert_eq!(applied(&conn), vec![1, 2, 3]);
}

#[test]
fn changesets_apply_in_id_order_regardless_of_registration() {
    // ChangeSet 3 depends on the table created in 2, which depends on 1.
    let catalog = catalog(vec![
        ChangeSet::new(
            3,
            vec![Change::new([
                "INSERT INTO totals (total) SELECT SUM(amount) FROM amounts",
                "INSERT INTO applied (changeset) VALUES (3)",
            ])],
        ),
        applied_log_table(),
        ChangeSet::new(
            2,
            vec![Change::new([
                "CREATE TABLE amounts (amount INTEGER NOT NULL)",
                "CREATE TABLE totals (total INTEGER NOT NULL)",
                "INSERT INTO amounts VALUES (2), (3)",
                "INSERT INTO applied (changeset) VALUES (2)",
            ])],
        ),
    ]);
    let mut conn = memory();

    assert_eq!(
        MigrationRunner::new(&catalog)
            .migrate(&mut conn, Customer)
            .unwrap(),
        3
    );
    assert_eq!(applied(&conn), vec![1, 2, 3]);
    let total: i64 = conn
        .query_row("SELECT total FROM totals", [], |row| row.get(0))
        .unwrap();
    assert_eq!(total, 5);
}

#[test]
fn later_changes_in_a_changeset_see_earlier_ones() {
    let catalog = catalog(vec![ChangeSet::new(
        1,
        vec![
            Change::new(["CREATE TABLE a (x INTEGER)"]),
            Change::new(["INSERT INTO a VALUES (1)"]),
            Change::new(["CREATE TABLE b AS SELECT x FROM a"]),
        ],
    )]);
    let mut conn = memory();

    MigrationRunner::new(&catalog)
        .migrate(&mut conn, Diagram)
        .unwrap();
    let x: i64 = conn
        .query_row("SELECT x FROM b", [], |row| row.get(0))
        .unwrap();
    assert_eq!(x, 1);
}

// ── Idempotence ────────────────────────────────────────────────────────

#[test]
fn second_run_executes_nothing() {
    let catalog = catalog(vec![applied_log_table(), logging(2)]);
    let mut conn = memory();
    let runner = MigrationRunner::new(&catalog);

    assert_eq!(runner.migrate(&mut conn, NetworkModel).unwrap(), 2);

    let second = runner.run(&mut conn, NetworkModel);
    assert!(second.is_success());
    assert!(second.attempted.is_empty());
    assert_eq!(second.state, RunState::Done(2));
    assert_eq!(second.final_version(), Some(2));

    // The inserts are not idempotent, so a re-run would show up here.
    assert_eq!(applied(&conn), vec![1, 2]);
    assert_eq!(stored_version(&conn), 2);
}

#[test]
fn empty_catalog_leaves_fresh_database_at_zero() {
    let catalog = catalog(vec![]);
    let mut conn = memory();
    assert_eq!(
        MigrationRunner::new(&catalog)
            .migrate(&mut conn, Customer)
            .unwrap(),
        0
    );
    assert_eq!(stored_version(&conn), 0);
}

// ── Atomicity ──────────────────────────────────────────────────────────

#[test]
fn failing_statement_rolls_back_its_changeset_and_stops() {
    let catalog = catalog(vec![
        applied_log_table(),
        ChangeSet::new(
            2,
            vec![
                Change::new([
                    "CREATE TABLE half_done (x INTEGER)",
                    "INSERT INTO half_done VALUES (1)",
                ]),
                Change::new([
                    "INSERT INTO applied (changeset) VALUES (2)",
                    "INSERT INTO no_such_table VALUES (1)",
                ]),
            ],
        ),
        logging(3),
    ]);
    let mut conn = memory();

    let run = MigrationRunner::new(&catalog).run(&mut conn, NetworkModel);

    assert!(!run.is_success());
    assert_eq!(run.attempted, vec![1, 2]);
    assert_eq!(run.committed, vec![1]);
    assert_eq!(run.state, RunState::Failed(2));
    assert_eq!(run.final_version(), Some(1));

    match run.into_result() {
        Err(MigrationError::StatementFailed {
            changeset,
            change,
            statement,
            sql,
            ..
        }) => {
            assert_eq!((changeset, change, statement), (2, 1, 1));
            assert_eq!(sql, "INSERT INTO no_such_table VALUES (1)");
        }
        other => panic!("expected StatementFailed, got {other:?}"),
    }

    assert_eq!(stored_version(&conn), 1);
    assert!(!table_exists(&conn, "half_done"));
    assert_eq!(applied(&conn), vec![1]);
}

#[test]
fn statement_cannot_commit_the_changeset_early() {
    let catalog = catalog(vec![ChangeSet::new(
        1,
        vec![Change::new([
            "CREATE TABLE a (x INTEGER); COMMIT",
            "CREATE TABLE a (x INTEGER)",
        ])],
    )]);
    let mut conn = memory();

    let err = MigrationRunner::new(&catalog)
        .migrate(&mut conn, NetworkModel)
        .unwrap_err();

    assert!(
        matches!(
            err,
            MigrationError::StatementFailed {
                changeset: 1,
                change: 0,
                statement: 0,
                ..
            }
        ),
        "{err}"
    );
    assert!(!table_exists(&conn, "a"));
    assert_eq!(stored_version(&conn), 0);

    // The connection is left usable and later runs commit normally.
    let fixed = catalog_with_table_a();
    assert_eq!(
        MigrationRunner::new(&fixed)
            .migrate(&mut conn, NetworkModel)
            .unwrap(),
        1
    );
    assert!(table_exists(&conn, "a"));
}

fn catalog_with_table_a() -> ChangeSetCatalog {
    catalog(vec![ChangeSet::new(
        1,
        vec![Change::new(["CREATE TABLE a (x INTEGER)"])],
    )])
}

#[test]
fn transaction_control_statements_are_rejected() {
    for control in ["COMMIT", "END", "ROLLBACK", "BEGIN"] {
        let catalog = catalog(vec![ChangeSet::new(
            1,
            vec![Change::new(["CREATE TABLE t (x INTEGER)", control])],
        )]);
        let mut conn = memory();

        let run = MigrationRunner::new(&catalog).run(&mut conn, Diagram);

        assert_eq!(run.state, RunState::Failed(1), "{control}");
        let failure = run.report().failure.unwrap();
        assert_eq!((failure.change, failure.statement), (Some(0), Some(1)));
        assert!(!table_exists(&conn, "t"), "{control}");
        assert_eq!(stored_version(&conn), 0, "{control}");
    }
}

#[test]
fn savepoints_inside_a_changeset_are_allowed() {
    let catalog = catalog(vec![ChangeSet::new(
        1,
        vec![Change::new([
            "SAVEPOINT step; CREATE TABLE b (x INTEGER); RELEASE step",
        ])],
    )]);
    let mut conn = memory();

    assert_eq!(
        MigrationRunner::new(&catalog)
            .migrate(&mut conn, Customer)
            .unwrap(),
        1
    );
    assert!(table_exists(&conn, "b"));
}

#[test]
fn failed_version_write_rolls_back_the_statements() {
    let catalog = catalog(vec![
        applied_log_table(),
        ChangeSet::new(
            2,
            vec![Change::new([
                "CREATE TABLE should_vanish (x INTEGER)",
                // Leaves the version row missing so the bump updates nothing.
                "DELETE FROM version",
            ])],
        ),
    ]);
    let mut conn = memory();

    let err = MigrationRunner::new(&catalog)
        .migrate(&mut conn, Customer)
        .unwrap_err();

    assert!(
        matches!(err, MigrationError::VersionRecord { changeset: 2, .. }),
        "{err}"
    );
    assert!(!table_exists(&conn, "should_vanish"));
    assert_eq!(stored_version(&conn), 1);
}

#[test]
fn rerun_after_fixing_the_history_resumes_at_the_boundary() {
    let broken = catalog(vec![
        applied_log_table(),
        ChangeSet::new(2, vec![Change::new(["INSERT INTO missing VALUES (1)"])]),
    ]);
    let fixed = catalog(vec![applied_log_table(), logging(2)]);
    let mut conn = memory();

    assert!(MigrationRunner::new(&broken)
        .migrate(&mut conn, Diagram)
        .is_err());
    assert_eq!(stored_version(&conn), 1);

    let run = MigrationRunner::new(&fixed).run(&mut conn, Diagram);
    assert_eq!(run.attempted, vec![2]);
    assert_eq!(run.into_result().unwrap(), 2);
    assert_eq!(applied(&conn), vec![1, 2]);
}

// ── Partial applicability ──────────────────────────────────────────────

#[test]
fn changes_for_other_kinds_are_skipped_but_version_advances() {
    let catalog = catalog(vec![ChangeSet::new(
        1,
        vec![
            Change::new(["CREATE TABLE shared (x INTEGER)"]),
            Change::new(["CREATE TABLE network_only (x INTEGER)"]).only(&[NetworkModel]),
        ],
    )]);

    let mut customer = memory();
    MigrationRunner::new(&catalog)
        .migrate(&mut customer, Customer)
        .unwrap();
    assert!(table_exists(&customer, "shared"));
    assert!(!table_exists(&customer, "network_only"));
    assert_eq!(stored_version(&customer), 1);

    let mut network = memory();
    MigrationRunner::new(&catalog)
        .migrate(&mut network, NetworkModel)
        .unwrap();
    assert!(table_exists(&network, "network_only"));
}

#[test]
fn changeset_with_nothing_applicable_still_records_its_version() {
    let catalog = catalog(vec![
        ChangeSet::new(1, vec![Change::new(["CREATE TABLE d (x INTEGER)"]).only(&[Diagram])]),
        ChangeSet::new(2, vec![]),
    ]);
    let mut conn = memory();

    let run = MigrationRunner::new(&catalog).run(&mut conn, Customer);
    assert_eq!(run.committed, vec![1, 2]);
    assert_eq!(stored_version(&conn), 2);
    assert!(!table_exists(&conn, "d"));
}

#[test]
fn statements_for_missing_tables_are_never_sent_to_other_kinds() {
    // Would fail on a network database, which has no `diagrams` table.
    let catalog = catalog(vec![
        ChangeSet::new(1, vec![Change::new(["CREATE TABLE diagrams (x INTEGER)"]).only(&[Diagram])]),
        ChangeSet::new(
            2,
            vec![Change::new(["ALTER TABLE diagrams ADD COLUMN y INTEGER NULL"]).only(&[Diagram])],
        ),
    ]);

    for kind in DatabaseKind::ALL {
        let mut conn = memory();
        assert_eq!(
            MigrationRunner::new(&catalog).migrate(&mut conn, kind).unwrap(),
            2,
            "{kind}"
        );
    }
}

// ── Targets and version guards ─────────────────────────────────────────

#[test]
fn stop_at_applies_a_prefix_of_the_history() {
    let catalog = catalog(vec![applied_log_table(), logging(2), logging(3)]);
    let mut conn = memory();

    assert_eq!(
        MigrationRunner::new(&catalog)
            .stop_at(2)
            .migrate(&mut conn, NetworkModel)
            .unwrap(),
        2
    );
    assert_eq!(applied(&conn), vec![1, 2]);

    // A target below the current version is a no-op.
    assert_eq!(
        MigrationRunner::new(&catalog)
            .stop_at(1)
            .migrate(&mut conn, NetworkModel)
            .unwrap(),
        2
    );

    assert_eq!(
        MigrationRunner::new(&catalog)
            .migrate(&mut conn, NetworkModel)
            .unwrap(),
        3
    );
    assert_eq!(applied(&conn), vec![1, 2, 3]);
}

#[test]
fn database_newer_than_catalog_is_refused() {
    let catalog = catalog(vec![applied_log_table(), logging(2)]);
    let mut conn = memory();
    conn.execute_batch(
        "CREATE TABLE version (version INTEGER NOT NULL);
         INSERT INTO version VALUES (7);",
    )
    .unwrap();

    let run = MigrationRunner::new(&catalog).run(&mut conn, Customer);
    assert!(run.attempted.is_empty());
    assert_eq!(run.state, RunState::Failed(0));
    assert!(matches!(
        run.into_result(),
        Err(MigrationError::SchemaTooNew {
            found: 7,
            supported: 2
        })
    ));
    assert!(!table_exists(&conn, "applied"));
    assert_eq!(stored_version(&conn), 7);
}

#[test]
fn corrupt_version_table_fails_before_any_changeset() {
    let catalog = catalog(vec![applied_log_table()]);
    let mut conn = memory();
    conn.execute_batch(
        "CREATE TABLE version (version INTEGER NOT NULL);
         INSERT INTO version VALUES (0), (0);",
    )
    .unwrap();

    let run = MigrationRunner::new(&catalog).run(&mut conn, Diagram);
    assert_eq!(run.starting_version, None);
    assert_eq!(run.final_version(), None);
    assert!(matches!(
        run.into_result(),
        Err(MigrationError::CorruptVersion(_))
    ));
    assert!(!table_exists(&conn, "applied"));
}

// ── Reports and plans ──────────────────────────────────────────────────

#[test]
fn report_describes_the_failure_point() {
    let catalog = catalog(vec![
        applied_log_table(),
        ChangeSet::new(
            2,
            vec![
                Change::new(["DELETE FROM applied WHERE 0"]).only(&[Diagram]),
                Change::new(["DELETE FROM applied WHERE 0", "NOT VALID SQL"]),
            ],
        ),
    ]);
    let mut conn = memory();

    let report = MigrationRunner::new(&catalog)
        .run(&mut conn, NetworkModel)
        .report();

    assert_eq!(report.starting_version, Some(0));
    assert_eq!(report.final_version, Some(1));
    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.changeset, Some(2));
    // Indices refer to the declared position, not the filtered one.
    assert_eq!(failure.change, Some(1));
    assert_eq!(failure.statement, Some(1));
    assert!(failure.cause.starts_with("[M003]"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["kind"], "network_model");
    assert_eq!(json["state"]["state"], "failed");
    assert_eq!(json["state"]["version"], 2);
}

#[test]
fn plan_is_read_only_and_counts_applicable_statements() {
    let catalog = catalog(vec![
        ChangeSet::new(
            1,
            vec![
                Change::new(["CREATE TABLE a (x INTEGER)", "CREATE TABLE b (x INTEGER)"]),
                Change::new(["CREATE TABLE c (x INTEGER)"]).only(&[Customer]),
            ],
        ),
        ChangeSet::new(2, vec![Change::new(["CREATE TABLE d (x INTEGER)"]).only(&[Customer])]),
    ]);
    let mut conn = memory();
    let runner = MigrationRunner::new(&catalog);

    let plan = runner.plan(&conn, NetworkModel).unwrap();
    assert_eq!(plan.current_version, None);
    assert_eq!(plan.target_version, 2);
    let counts: Vec<(u32, usize, usize)> = plan
        .pending
        .iter()
        .map(|p| (p.id, p.changes, p.statements))
        .collect();
    assert_eq!(counts, vec![(1, 1, 2), (2, 0, 0)]);
    assert!(!table_exists(&conn, "version"));

    runner.migrate(&mut conn, NetworkModel).unwrap();
    let plan = runner.plan(&conn, NetworkModel).unwrap();
    assert_eq!(plan.current_version, Some(2));
    assert!(plan.is_up_to_date());
}

#[test]
fn version_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.sqlite");
    let catalog = catalog(vec![applied_log_table(), logging(2)]);

    {
        let mut conn = Connection::open(&path).unwrap();
        MigrationRunner::new(&catalog)
            .stop_at(1)
            .migrate(&mut conn, NetworkModel)
            .unwrap();
    }

    let mut conn = Connection::open(&path).unwrap();
    assert_eq!(VersionStore::read_version(&conn).unwrap(), Some(1));
    let run = MigrationRunner::new(&catalog).run(&mut conn, NetworkModel);
    assert_eq!(run.attempted, vec![2]);
    assert_eq!(applied(&conn), vec![1, 2]);
}
