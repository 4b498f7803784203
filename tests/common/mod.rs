//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use mockall::mock;
use tempfile::TempDir;

use library_desk::{
    models::{NewBook, NewUser, Role},
    services::{clock::Clock, Services},
    AppConfig, Library,
};

mock! {
    pub DeskClock {}

    impl Clock for DeskClock {
        fn now(&self) -> NaiveDateTime;
    }
}

/// A library over a throwaway data directory with a hand-driven clock
pub struct TestDesk {
    pub dir: TempDir,
    pub library: Library,
    now: Arc<Mutex<NaiveDateTime>>,
}

impl TestDesk {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut config = AppConfig::with_data_dir(dir.path());
        tweak(&mut config);

        let now = Arc::new(Mutex::new(start()));
        let shared = now.clone();
        let mut clock = MockDeskClock::new();
        clock.expect_now().returning(move || *shared.lock().unwrap());

        let library = Library::with_clock(config, Arc::new(clock)).expect("open library");
        Self { dir, library, now }
    }

    /// Reopen the same data directory, as a restarted desk would
    pub fn reopen(&self) -> Library {
        Library::open(AppConfig::with_data_dir(self.dir.path())).expect("reopen library")
    }

    pub fn services(&self) -> &Services {
        &self.library.services
    }

    pub fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn add_book(&self, id: i64, name: &str, author: &str, count: u32) {
        self.services()
            .catalog
            .create_book(NewBook::new(id, name, author).with_count(count))
            .expect("create book");
    }

    pub fn add_member(&self, email: &str, first: &str, last: &str) {
        self.services()
            .auth
            .create_user(NewUser {
                email: email.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                password: "password".to_string(),
                role: Role::User,
            })
            .expect("create member");
    }

    pub fn count_of(&self, book_id: i64) -> u32 {
        self.services().catalog.get_book(book_id).expect("book exists").count
    }
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 1)
        .unwrap()
        .and_hms_opt(11, 15, 0)
        .unwrap()
}
