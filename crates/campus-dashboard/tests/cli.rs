//! Runs the `campus` binary against the sample data.

use std::process::Command;

fn campus(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_campus"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn overdue_transactions_as_csv() {
    let out = campus(&[
        "finance",
        "--records",
        "data/transactions.json",
        "--filter",
        "status=overdue",
        "--format",
        "csv",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "id,student,description,category,status,amount,date\n\
         11,Lucas White,Transport Fee,transport,overdue,8000,2024-02-10\n\
         6,Olivia Martinez,Hostel Fee,hostel,overdue,25000,2024-01-25\n\
         3,Michael Brown,Library Fine,fines,overdue,5000,2024-01-18\n"
    );
}

#[test]
fn sorted_course_table() {
    let out = campus(&[
        "courses",
        "-r",
        "data/courses.json",
        "--sort",
        "enrolled:desc",
        "--min",
        "credits=4",
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let rows: Vec<&str> = stdout.lines().skip(2).take(2).collect();
    assert!(rows[0].starts_with(" 1  CS101"), "{stdout}");
    assert!(rows[1].starts_with(" 2  CS201"), "{stdout}");
    assert!(stdout.contains("Showing 1 to 6 of 6 entries (page 1 of 1)"));
}

#[test]
fn invalid_sort_field_fails() {
    let out = campus(&[
        "departments",
        "-r",
        "data/departments.json",
        "--sort",
        "rank",
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("showing the departments screen"), "{stderr}");
    assert!(stderr.contains("rank"), "{stderr}");
}

#[test]
fn missing_records_file_fails() {
    let out = campus(&["finance", "-r", "data/nope.json"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("data/nope.json"));
}

#[test]
fn select_on_amount_fails_alongside_a_range() {
    let out = campus(&[
        "finance",
        "-r",
        "data/transactions.json",
        "--filter",
        "amount=5",
        "--min",
        "amount=1",
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("one_of predicate is not supported on number field 'amount'"),
        "{stderr}"
    );
}
