//! Repository layer over flat CSV tables.
//!
//! Every table is read whole, changed in memory and written back whole. There
//! is no index and no locking: one interactive user per data directory.

pub mod books;
pub mod cart;
pub mod loans;
pub mod users;

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;

use crate::error::AppResult;

/// A row type persisted in its own CSV file
pub trait Record: Serialize + DeserializeOwned {
    /// Table name used in log lines
    const TABLE: &'static str;
    const FILE: &'static str;
    /// Header row, in struct field order
    const COLUMNS: &'static [&'static str];
}

/// Whole-file CSV table
pub struct CsvTable<R> {
    path: PathBuf,
    _row: PhantomData<fn() -> R>,
}

impl<R> Clone for CsvTable<R> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            _row: PhantomData,
        }
    }
}

impl<R: Record> CsvTable<R> {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(R::FILE),
            _row: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file with just its header row if it does not exist yet
    pub fn init(&self) -> AppResult<()> {
        if !self.path.exists() {
            tracing::info!("Initializing empty {} table at {}", R::TABLE, self.path.display());
            self.save(&[])?;
        }
        Ok(())
    }

    /// Load every row in file order.
    ///
    /// Never fails: a missing table is created empty, and an unreadable one
    /// is moved aside to `<file>.corrupt` and replaced by an empty table.
    pub fn load(&self) -> Vec<R> {
        match self.read_rows() {
            Ok(rows) => {
                tracing::debug!("Loaded {} rows from {}", rows.len(), R::TABLE);
                rows
            }
            Err(e) if is_not_found(&e) => {
                if let Err(e) = self.init() {
                    tracing::warn!("Could not initialize {} table: {}", R::TABLE, e);
                }
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Table {} is unreadable, starting empty: {}", R::TABLE, e);
                self.quarantine();
                Vec::new()
            }
        }
    }

    fn read_rows(&self) -> Result<Vec<R>, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_path(&self.path)?;
        reader.deserialize().collect()
    }

    fn quarantine(&self) {
        let aside = self.free_aside_path();
        match fs::rename(&self.path, &aside) {
            Ok(()) => {
                tracing::warn!("Moved unreadable {} table to {:?}", R::TABLE, aside);
                if let Err(e) = self.save(&[]) {
                    tracing::warn!("Could not reinitialize {} table: {}", R::TABLE, e);
                }
            }
            // Leave the original in place rather than overwrite what we could not move
            Err(e) => tracing::warn!("Could not move unreadable {} table aside: {}", R::TABLE, e),
        }
    }

    /// `<file>.corrupt`, or `<file>.corrupt.N` with the first free N, so an
    /// earlier quarantined copy is never overwritten
    fn free_aside_path(&self) -> PathBuf {
        let mut base = self.path.clone().into_os_string();
        base.push(".corrupt");
        let base = PathBuf::from(base);
        if !base.exists() {
            return base;
        }
        (1u32..)
            .map(|n| {
                let mut candidate = base.clone().into_os_string();
                candidate.push(format!(".{}", n));
                PathBuf::from(candidate)
            })
            .find(|p| !p.exists())
            .unwrap_or(base)
    }

    /// Replace the whole file with `rows`.
    ///
    /// Rows go to a temporary file next to the table which is then renamed
    /// over it, so readers see either the old table or the new one.
    pub fn save(&self, rows: &[R]) -> AppResult<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file_mut());
            writer.write_record(R::COLUMNS)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        tracing::debug!("Wrote {} rows to {}", rows.len(), R::TABLE);
        Ok(())
    }
}

fn is_not_found(e: &csv::Error) -> bool {
    matches!(e.kind(), csv::ErrorKind::Io(err) if err.kind() == io::ErrorKind::NotFound)
}

/// Main repository struct holding one handle per table
#[derive(Clone)]
pub struct Repository {
    pub users: users::UsersRepository,
    pub books: books::BooksRepository,
    pub cart: cart::CartRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Open (and create if needed) the tables under `dir`
    pub fn open(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let repository = Self {
            users: users::UsersRepository::new(dir),
            books: books::BooksRepository::new(dir),
            cart: cart::CartRepository::new(dir),
            loans: loans::LoansRepository::new(dir),
        };
        repository.users.table.init()?;
        repository.books.table.init()?;
        repository.cart.table.init()?;
        repository.loans.table.init()?;

        tracing::info!("Opened data directory {}", dir.display());
        Ok(repository)
    }
}
