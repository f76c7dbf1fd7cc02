use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::backend::{Backend, BackendError};
use crate::models::{Note, Priority, Task, TaskList, User};
use crate::tags::TagSet;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Failed to encode tags: {0}")]
    TagEncoding(#[from] serde_json::Error),
    #[error("No {kind} with id {id}")]
    NotFound { kind: &'static str, id: String },
}

impl From<DatabaseError> for BackendError {
    fn from(err: DatabaseError) -> Self {
        BackendError::new(err.to_string())
    }
}

/// A stored profile together with its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub user: User,
    pub password_hash: String,
    pub salt: String,
}

pub struct Database {
    conn: Connection,
}

const TASK_COLUMNS: &str = "id, user_id, title, description, completed, due_date, priority, list_id, tags, starred, created_at, updated_at";
const NOTE_COLUMNS: &str = "id, user_id, title, content, excerpt, tags, folder, created_at, updated_at";

impl Database {
    /// Open (or create) the database file and initialize the schema
    pub fn new(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.initialize_schema()?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// A throwaway database, used by tests and `--dev` dry runs.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profiles (
                id              TEXT PRIMARY KEY,
                full_name       TEXT NOT NULL,
                email           TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                salt            TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL,
                title           TEXT NOT NULL,
                description     TEXT,
                completed       INTEGER NOT NULL DEFAULT 0,
                due_date        TEXT,
                priority        TEXT NOT NULL DEFAULT 'none',
                list_id         TEXT NOT NULL DEFAULT 'inbox',
                tags            TEXT NOT NULL DEFAULT '[]',
                starred         INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS notes (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL,
                title           TEXT NOT NULL,
                content         TEXT NOT NULL DEFAULT '',
                excerpt         TEXT NOT NULL DEFAULT '',
                tags            TEXT NOT NULL DEFAULT '[]',
                folder          TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS lists (
                id              TEXT NOT NULL,
                user_id         TEXT NOT NULL,
                name            TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                PRIMARY KEY (user_id, id)
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks(due_date);
            CREATE INDEX IF NOT EXISTS idx_notes_user ON notes(user_id);",
        )?;
        Ok(())
    }

    fn row_to_task(row: &Row) -> Result<Task, rusqlite::Error> {
        Ok(Task {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            completed: row.get::<_, i64>(4)? != 0,
            due_date: decode_date(5, row.get(5)?)?,
            priority: row
                .get::<_, String>(6)?
                .parse::<Priority>()
                .map_err(|e| conversion_error(6, e))?,
            list_id: row.get(7)?,
            tags: decode_tags(8, &row.get::<_, String>(8)?)?,
            starred: row.get::<_, i64>(9)? != 0,
            created_at: decode_timestamp(10, &row.get::<_, String>(10)?)?,
            updated_at: decode_timestamp(11, &row.get::<_, String>(11)?)?,
        })
    }

    fn row_to_note(row: &Row) -> Result<Note, rusqlite::Error> {
        Ok(Note {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            excerpt: row.get(4)?,
            tags: decode_tags(5, &row.get::<_, String>(5)?)?,
            folder: row.get(6)?,
            created_at: decode_timestamp(7, &row.get::<_, String>(7)?)?,
            updated_at: decode_timestamp(8, &row.get::<_, String>(8)?)?,
        })
    }

    fn row_to_profile(row: &Row) -> Result<ProfileRecord, rusqlite::Error> {
        Ok(ProfileRecord {
            user: User {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                created_at: decode_timestamp(5, &row.get::<_, String>(5)?)?,
            },
            password_hash: row.get(3)?,
            salt: row.get(4)?,
        })
    }

    /// All tasks of a user, oldest first
    pub fn get_tasks(&self, user_id: &str) -> Result<Vec<Task>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE user_id = ?1 ORDER BY created_at ASC",
            TASK_COLUMNS
        ))?;
        let tasks = stmt
            .query_map(rusqlite::params![user_id], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn get_task(&self, user_id: &str, id: &str) -> Result<Task, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks WHERE user_id = ?1 AND id = ?2",
            TASK_COLUMNS
        ))?;
        stmt.query_row(rusqlite::params![user_id, id], Self::row_to_task)
            .optional()?
            .ok_or_else(|| DatabaseError::NotFound {
                kind: "task",
                id: id.to_string(),
            })
    }

    pub fn insert_task(&self, task: &Task) -> Result<(), DatabaseError> {
        self.conn.execute(
            &format!(
                "INSERT INTO tasks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                TASK_COLUMNS
            ),
            rusqlite::params![
                task.id,
                task.user_id,
                task.title,
                task.description,
                task.completed as i64,
                encode_date(task.due_date),
                task.priority.as_str(),
                task.list_id,
                serde_json::to_string(&task.tags)?,
                task.starred as i64,
                task.created_at.to_rfc3339(),
                task.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn update_task(&self, task: &Task) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, completed = ?3, due_date = ?4,
             priority = ?5, list_id = ?6, tags = ?7, starred = ?8, updated_at = ?9
             WHERE id = ?10 AND user_id = ?11",
            rusqlite::params![
                task.title,
                task.description,
                task.completed as i64,
                encode_date(task.due_date),
                task.priority.as_str(),
                task.list_id,
                serde_json::to_string(&task.tags)?,
                task.starred as i64,
                task.updated_at.to_rfc3339(),
                task.id,
                task.user_id,
            ],
        )?;
        tx.commit()?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                kind: "task",
                id: task.id.clone(),
            });
        }
        Ok(())
    }

    pub fn delete_task(&self, user_id: &str, id: &str) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![id, user_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// All notes of a user, most recently updated first
    pub fn get_notes(&self, user_id: &str) -> Result<Vec<Note>, DatabaseError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM notes WHERE user_id = ?1 ORDER BY updated_at DESC",
            NOTE_COLUMNS
        ))?;
        let notes = stmt
            .query_map(rusqlite::params![user_id], Self::row_to_note)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    pub fn insert_note(&self, note: &Note) -> Result<(), DatabaseError> {
        self.conn.execute(
            &format!(
                "INSERT INTO notes ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                NOTE_COLUMNS
            ),
            rusqlite::params![
                note.id,
                note.user_id,
                note.title,
                note.content,
                note.excerpt,
                serde_json::to_string(&note.tags)?,
                note.folder,
                note.created_at.to_rfc3339(),
                note.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn update_note(&self, note: &Note) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE notes SET title = ?1, content = ?2, excerpt = ?3, tags = ?4, folder = ?5,
             updated_at = ?6 WHERE id = ?7 AND user_id = ?8",
            rusqlite::params![
                note.title,
                note.content,
                note.excerpt,
                serde_json::to_string(&note.tags)?,
                note.folder,
                note.updated_at.to_rfc3339(),
                note.id,
                note.user_id,
            ],
        )?;
        tx.commit()?;
        if changed == 0 {
            return Err(DatabaseError::NotFound {
                kind: "note",
                id: note.id.clone(),
            });
        }
        Ok(())
    }

    pub fn delete_note(&self, user_id: &str, id: &str) -> Result<(), DatabaseError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
            rusqlite::params![id, user_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Custom lists of a user in creation order
    pub fn get_lists(&self, user_id: &str) -> Result<Vec<TaskList>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, created_at FROM lists WHERE user_id = ?1 ORDER BY created_at ASC",
        )?;
        let lists = stmt
            .query_map(rusqlite::params![user_id], |row| {
                Ok(TaskList {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    created_at: decode_timestamp(3, &row.get::<_, String>(3)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    pub fn insert_list(&self, list: &TaskList) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO lists (id, user_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![list.id, list.user_id, list.name, list.created_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn insert_profile(&self, record: &ProfileRecord) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO profiles (id, full_name, email, password_hash, salt, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                record.user.id,
                record.user.name,
                record.user.email,
                record.password_hash,
                record.salt,
                record.user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn find_profile_by_email(&self, email: &str) -> Result<Option<ProfileRecord>, DatabaseError> {
        let record = self
            .conn
            .query_row(
                "SELECT id, full_name, email, password_hash, salt, created_at
                 FROM profiles WHERE email = ?1 COLLATE NOCASE",
                rusqlite::params![email],
                Self::row_to_profile,
            )
            .optional()?;
        Ok(record)
    }

    pub fn get_profile(&self, id: &str) -> Result<Option<ProfileRecord>, DatabaseError> {
        let record = self
            .conn
            .query_row(
                "SELECT id, full_name, email, password_hash, salt, created_at
                 FROM profiles WHERE id = ?1",
                rusqlite::params![id],
                Self::row_to_profile,
            )
            .optional()?;
        Ok(record)
    }
}

impl Backend for Database {
    fn select_tasks(&self, user_id: &str) -> Result<Vec<Task>, BackendError> {
        Ok(self.get_tasks(user_id)?)
    }

    fn insert_task(&self, task: &Task) -> Result<(), BackendError> {
        Ok(Database::insert_task(self, task)?)
    }

    fn update_task(&self, task: &Task) -> Result<(), BackendError> {
        Ok(Database::update_task(self, task)?)
    }

    fn delete_task(&self, user_id: &str, id: &str) -> Result<(), BackendError> {
        Ok(Database::delete_task(self, user_id, id)?)
    }

    fn select_notes(&self, user_id: &str) -> Result<Vec<Note>, BackendError> {
        Ok(self.get_notes(user_id)?)
    }

    fn insert_note(&self, note: &Note) -> Result<(), BackendError> {
        Ok(Database::insert_note(self, note)?)
    }

    fn update_note(&self, note: &Note) -> Result<(), BackendError> {
        Ok(Database::update_note(self, note)?)
    }

    fn delete_note(&self, user_id: &str, id: &str) -> Result<(), BackendError> {
        Ok(Database::delete_note(self, user_id, id)?)
    }

    fn select_lists(&self, user_id: &str) -> Result<Vec<TaskList>, BackendError> {
        Ok(self.get_lists(user_id)?)
    }

    fn insert_list(&self, list: &TaskList) -> Result<(), BackendError> {
        Ok(Database::insert_list(self, list)?)
    }
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn encode_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

fn decode_date(idx: usize, raw: Option<String>) -> Result<Option<NaiveDate>, rusqlite::Error> {
    raw.map(|s| crate::utils::parse_date(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

fn decode_timestamp(idx: usize, raw: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn decode_tags(idx: usize, raw: &str) -> Result<TagSet, rusqlite::Error> {
    serde_json::from_str(raw).map_err(|e| conversion_error(idx, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(user: &str, title: &str) -> Task {
        let mut task = Task::new(user, title.to_string());
        task.due_date = NaiveDate::from_ymd_opt(2025, 4, 10);
        task.priority = Priority::Medium;
        task.tags = TagSet::parse("home, errands");
        task
    }

    #[test]
    fn task_round_trips_through_sqlite() {
        let db = Database::open_in_memory().unwrap();
        let task = sample_task("u1", "Groceries");
        db.insert_task(&task).unwrap();
        let loaded = db.get_task("u1", &task.id).unwrap();
        assert_eq!(loaded.title, "Groceries");
        assert_eq!(loaded.due_date, task.due_date);
        assert_eq!(loaded.priority, Priority::Medium);
        assert_eq!(loaded.tags, task.tags);
        assert_eq!(loaded.created_at, task.created_at);
    }

    #[test]
    fn rows_are_scoped_to_their_user() {
        let db = Database::open_in_memory().unwrap();
        db.insert_task(&sample_task("u1", "mine")).unwrap();
        db.insert_task(&sample_task("u2", "theirs")).unwrap();
        let mine = db.get_tasks("u1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "mine");
    }

    #[test]
    fn duplicate_id_insert_fails() {
        let db = Database::open_in_memory().unwrap();
        let task = sample_task("u1", "once");
        db.insert_task(&task).unwrap();
        assert!(db.insert_task(&task).is_err());
    }

    #[test]
    fn updating_missing_task_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = db.update_task(&sample_task("u1", "ghost")).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { kind: "task", .. }));
    }

    #[test]
    fn note_update_and_delete() {
        let db = Database::open_in_memory().unwrap();
        let mut note = Note::new("u1", "Draft".into(), "# Draft\n\nhello".into());
        db.insert_note(&note).unwrap();
        note.set_content("changed".into());
        note.folder = Some("Work".into());
        db.update_note(&note).unwrap();
        let notes = db.get_notes("u1").unwrap();
        assert_eq!(notes[0].excerpt, "changed");
        assert_eq!(notes[0].folder.as_deref(), Some("Work"));
        db.delete_note("u1", &note.id).unwrap();
        assert!(db.get_notes("u1").unwrap().is_empty());
    }

    #[test]
    fn profile_lookup_ignores_email_case() {
        let db = Database::open_in_memory().unwrap();
        let record = ProfileRecord {
            user: User {
                id: "u1".into(),
                name: "Sam".into(),
                email: "sam@example.com".into(),
                created_at: Utc::now(),
            },
            password_hash: "h".into(),
            salt: "s".into(),
        };
        db.insert_profile(&record).unwrap();
        let found = db.find_profile_by_email("SAM@example.com").unwrap().unwrap();
        assert_eq!(found.user.id, "u1");
        assert!(db.get_profile("nobody").unwrap().is_none());
    }

    #[test]
    fn file_database_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("app.db");
        let db = Database::new(&path).unwrap();
        db.insert_list(&TaskList::new("u1", "Work")).unwrap();
        assert!(path.exists());
        assert_eq!(db.get_lists("u1").unwrap()[0].id, "work");
    }
}
