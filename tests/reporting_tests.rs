mod common;

use std::fs;

use chrono::{Duration, NaiveDate};

use common::TestDesk;
use library_desk::{
    models::{LoanStatus, NewUser, Role},
    services::stats::StatEntry,
    AppConfig, Library,
};

const A: &str = "alice@library.org";
const B: &str = "bob@library.org";

fn busy_desk() -> TestDesk {
    let desk = TestDesk::new();
    desk.add_member(A, "Alice", "Liddell");
    desk.add_member(B, "Bob", "Cratchit");
    desk.services()
        .auth
        .create_user(NewUser {
            email: "admin@library.org".to_string(),
            first_name: "Head".to_string(),
            last_name: "Librarian".to_string(),
            password: "secret".to_string(),
            role: Role::Admin,
        })
        .unwrap();
    desk.add_book(1, "The Hobbit", "J.R.R. Tolkien", 2);
    desk.add_book(2, "Dune", "Frank Herbert", 1);
    desk.add_book(3, "Emma", "Jane Austen", 1);

    let loans = &desk.services().loans;
    loans.borrow(A, 1).unwrap();
    loans.borrow(B, 1).unwrap();
    loans.mark_collected(B, 1).unwrap();
    desk.advance(Duration::days(1));
    loans.borrow(A, 2).unwrap();
    loans.mark_returned(A, 2).unwrap();
    desk
}

#[test]
fn test_overview_and_counts() {
    let desk = busy_desk();
    let stats = &desk.services().stats;

    let overview = stats.overview();
    assert_eq!(overview.total_books, 3);
    assert_eq!(overview.total_members, 2);
    assert_eq!(overview.loans.total, 3);
    assert_eq!(overview.loans.active, 2);

    let users = stats.user_stats();
    assert_eq!((users.total, users.admins, users.users), (3, 1, 2));
    assert_eq!(stats.book_stats().with_images, 0);
}

#[test]
fn test_most_borrowed_ranking() {
    let desk = busy_desk();
    let ranked = desk.services().stats.most_borrowed(10);

    let order: Vec<(i64, usize)> = ranked.iter().map(|r| (r.book_id, r.borrow_count)).collect();
    assert_eq!(order, vec![(1, 2), (2, 1), (3, 0)]);
    assert_eq!(desk.services().stats.most_borrowed(1).len(), 1);
}

#[test]
fn test_status_distribution_skips_empty_slices() {
    let desk = TestDesk::new();
    desk.add_book(1, "Dune", "Frank Herbert", 1);
    assert!(desk.services().stats.status_distribution().is_empty());

    desk.services().loans.borrow(A, 1).unwrap();
    assert_eq!(
        desk.services().stats.status_distribution(),
        vec![StatEntry { label: "Pending Collection".to_string(), value: 1 }]
    );

    let busy = busy_desk();
    let labels: Vec<String> = busy
        .services()
        .stats
        .status_distribution()
        .into_iter()
        .map(|e| format!("{}={}", e.label, e.value))
        .collect();
    assert_eq!(labels, vec!["Pending Collection=1", "Collected=1", "Returned=1"]);
}

#[test]
fn test_member_directory() {
    let desk = busy_desk();
    let members = &desk.services().members;

    let all = members.list_members("");
    assert_eq!(all.len(), 2);
    let alice = all.iter().find(|m| m.email == A).unwrap();
    assert_eq!((alice.active_loans, alice.total_loans), (1, 2));
    assert_eq!(alice.name, "Alice Liddell");

    // by name, by email and by a borrowed book
    assert_eq!(members.list_members("cratchit")[0].email, B);
    assert_eq!(members.list_members("ALICE@")[0].email, A);
    let dune_readers: Vec<String> = members.list_members("dune").into_iter().map(|m| m.email).collect();
    assert_eq!(dune_readers, vec![A.to_string()]);
    assert!(members.list_members("librarian").is_empty());

    let history = members.member_history(A);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].book_name.as_deref(), Some("Dune"));
    assert_eq!(history[0].record.status, LoanStatus::Returned);
}

#[test]
fn test_reads_tables_written_by_older_desks() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("users.csv"),
        "email,first_name,last_name,password,role\n\
         alice@library.org,Alice,Liddell,pw,user\n\
         boss@library.org,Head,Librarian,pw,admin\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("books.csv"),
        "id,name,author,image_path,count\n\
         1,The Hobbit,J.R.R. Tolkien,,1.0\n\
         2,Dune,Frank Herbert,nan,0.0\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("borrowed_books.csv"),
        "user_email,book_id,issue_date,collection_deadline,return_deadline,status,collected,collection_date,return_date\n\
         alice@library.org,2,2025-08-01 10:00:00.250000,2025-08-04 10:00:00.250000,2025-09-15 10:00:00.250000,borrowed,True,2025-08-02 09:30:00,\n\
         alice@library.org,1,2025-07-01 10:00:00,2025-07-04 10:00:00,2025-08-15 10:00:00,returned,False,,2025-07-20 16:00:00\n",
    )
    .unwrap();

    let library = Library::open(AppConfig::with_data_dir(dir.path())).unwrap();
    let services = &library.services;

    let users = services.stats.user_stats();
    assert_eq!((users.total, users.admins), (2, 1));
    assert!(!dir.path().join("users.csv.corrupt").exists());

    let dune = services.catalog.get_book(2).unwrap();
    assert_eq!(dune.count, 0);
    assert_eq!(dune.image_path, None);
    assert_eq!(dune.stock, None);

    let history = services.loans.user_borrow_history(A);
    assert_eq!(history.len(), 2);
    let active = &history[0].record;
    assert_eq!(active.book_id, 2);
    assert!(active.collected);
    assert_eq!(
        active.collection_date,
        NaiveDate::from_ymd_opt(2025, 8, 2).unwrap().and_hms_opt(9, 30, 0)
    );
    assert_eq!(history[1].record.status, LoanStatus::Returned);
    assert!(services.loans.has_active_borrow(A, 2));

    // returning into a legacy row has no ceiling to respect
    assert!(services.loans.mark_returned(A, 2).unwrap());
    assert_eq!(services.catalog.get_book(2).unwrap().count, 1);
}

#[test]
fn test_unreadable_table_is_set_aside() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("books.csv"),
        "id,name,author,image_path,count\nnot-a-number,Dune,Frank Herbert,,1\n",
    )
    .unwrap();

    let library = Library::open(AppConfig::with_data_dir(dir.path())).unwrap();
    assert!(library.services.catalog.get_all_books().is_empty());
    assert!(dir.path().join("books.csv.corrupt").exists());

    // the reinitialized table takes new rows
    library
        .services
        .catalog
        .create_book_auto_id("Emma", "Jane Austen", None, 1)
        .unwrap();
    assert_eq!(library.services.catalog.get_book(1).unwrap().name, "Emma");
}

#[test]
fn test_written_rows_use_canonical_formats() {
    let desk = TestDesk::new();
    desk.add_book(1, "Dune", "Frank Herbert", 1);
    desk.services().loans.borrow(A, 1).unwrap();
    desk.services().loans.mark_collected(A, 1).unwrap();

    let raw = fs::read_to_string(desk.dir.path().join("borrowed_books.csv")).unwrap();
    let mut lines = raw.lines();
    assert_eq!(
        lines.next(),
        Some("user_email,book_id,issue_date,collection_deadline,return_deadline,status,collected,collection_date,return_date")
    );
    assert_eq!(
        lines.next(),
        Some("alice@library.org,1,2025-09-01 11:15:00.000000,2025-09-04 11:15:00.000000,2025-10-16 11:15:00.000000,borrowed,True,2025-09-01 11:15:00.000000,")
    );
}
