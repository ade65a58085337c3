use crate::types::{AppError, Result, Task, TaskStatus, User};
use chrono::{DateTime, Utc};
use libsql::{params_from_iter, Builder, Connection, Database, Row, Value};
use uuid::Uuid;

/// Persistence layer for users and tasks, backed by libsql.
///
/// Accepts a `libsql://` remote URL or a local file path / `:memory:`.
/// Every task query is constrained by `(id, user_id)` together, so a task
/// owned by another user is indistinguishable from a missing one.
pub struct Store {
    db: Database,
}

impl Store {
    pub async fn new(url: &str, auth_token: Option<&str>) -> Result<Self> {
        let db = if url.starts_with("libsql://") || url.starts_with("http") {
            Builder::new_remote(url.to_string(), auth_token.unwrap_or_default().to_string())
                .build()
                .await
        } else {
            Builder::new_local(url).build().await
        }
        .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;

        let store = Self { db };
        store.initialize_schema().await?;

        Ok(store)
    }

    pub fn connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {e}")))
    }

    async fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create users table: {e}")))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'todo',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create tasks table: {e}")))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_user_status ON tasks(user_id, status)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create task index: {e}")))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tasks_user_title ON tasks(user_id, title)",
            (),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create task index: {e}")))?;

        Ok(())
    }

    // ============= User operations =============

    pub async fn create_user(&self, name: &str, email: &str, password_hash: &str) -> Result<User> {
        let conn = self.connection()?;
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.clone(),
                name,
                email,
                password_hash,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )
        .await
        .map_err(|e| {
            // Backstop for a register race: the handler pre-checks, but the
            // UNIQUE column is the source of truth.
            if e.to_string().contains("UNIQUE") {
                AppError::Conflict("email already exists".to_string())
            } else {
                AppError::Database(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, name, email, password_hash, created_at, updated_at
                 FROM users WHERE email = ?",
                [email.to_lowercase()],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, name, email, password_hash, created_at, updated_at
                 FROM users WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    // ============= Task operations =============

    pub async fn create_task(
        &self,
        user_id: &str,
        title: &str,
        description: &str,
        status: TaskStatus,
    ) -> Result<Task> {
        let conn = self.connection()?;
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO tasks (id, user_id, title, description, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.clone(),
                user_id,
                title,
                description,
                status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )
        .await
        .map_err(|e| AppError::Database(format!("Failed to create task: {e}")))?;

        Ok(Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            status,
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_task(&self, id: &str, user_id: &str) -> Result<Option<Task>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, user_id, title, description, status, created_at, updated_at
                 FROM tasks WHERE id = ? AND user_id = ?",
                [id, user_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query task: {e}")))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(task_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_tasks(
        &self,
        user_id: &str,
        status: Option<TaskStatus>,
        search: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Task>> {
        let conn = self.connection()?;

        let (filter_sql, mut params) = task_filter(user_id, status, search);
        let sql = format!(
            "SELECT id, user_id, title, description, status, created_at, updated_at
             FROM tasks WHERE {filter_sql}
             ORDER BY created_at DESC LIMIT ? OFFSET ?"
        );
        params.push(Value::Integer(i64::from(limit)));
        params.push(Value::Integer(i64::from(offset)));

        let mut rows = conn
            .query(&sql, params_from_iter(params))
            .await
            .map_err(|e| AppError::Database(format!("Failed to list tasks: {e}")))?;

        let mut tasks = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            tasks.push(task_from_row(&row)?);
        }

        Ok(tasks)
    }

    pub async fn count_tasks(
        &self,
        user_id: &str,
        status: Option<TaskStatus>,
        search: Option<&str>,
    ) -> Result<u64> {
        let conn = self.connection()?;

        let (filter_sql, params) = task_filter(user_id, status, search);
        let sql = format!("SELECT COUNT(*) FROM tasks WHERE {filter_sql}");

        let mut rows = conn
            .query(&sql, params_from_iter(params))
            .await
            .map_err(|e| AppError::Database(format!("Failed to count tasks: {e}")))?;

        let row = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Database("COUNT returned no rows".to_string()))?;

        let count: i64 = row.get(0).map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count as u64)
    }

    /// Applies a partial update through one `(id, user_id)`-filtered
    /// statement. Returns the updated task, or `None` when it does not
    /// exist or belongs to someone else.
    pub async fn update_task(
        &self,
        id: &str,
        user_id: &str,
        title: Option<&str>,
        description: Option<&str>,
        status: Option<TaskStatus>,
    ) -> Result<Option<Task>> {
        let conn = self.connection()?;

        let mut assignments = vec!["updated_at = ?".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(Utc::now().to_rfc3339())];

        if let Some(title) = title {
            assignments.push("title = ?".to_string());
            params.push(Value::Text(title.to_string()));
        }
        if let Some(description) = description {
            assignments.push("description = ?".to_string());
            params.push(Value::Text(description.to_string()));
        }
        if let Some(status) = status {
            assignments.push("status = ?".to_string());
            params.push(Value::Text(status.as_str().to_string()));
        }

        let sql = format!(
            "UPDATE tasks SET {} WHERE id = ? AND user_id = ?",
            assignments.join(", ")
        );
        params.push(Value::Text(id.to_string()));
        params.push(Value::Text(user_id.to_string()));

        let affected = conn
            .execute(&sql, params_from_iter(params))
            .await
            .map_err(|e| AppError::Database(format!("Failed to update task: {e}")))?;

        if affected == 0 {
            return Ok(None);
        }

        self.get_task(id, user_id).await
    }

    /// Deletes a task owned by the given user. Returns false when it does
    /// not exist or belongs to someone else.
    pub async fn delete_task(&self, id: &str, user_id: &str) -> Result<bool> {
        let conn = self.connection()?;

        let affected = conn
            .execute(
                "DELETE FROM tasks WHERE id = ? AND user_id = ?",
                [id, user_id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete task: {e}")))?;

        Ok(affected > 0)
    }
}

/// Builds the shared WHERE clause for list/count so both always agree.
/// SQLite's LIKE is case-insensitive for ASCII, which matches the search
/// contract; wildcard characters in the needle are escaped.
fn task_filter(
    user_id: &str,
    status: Option<TaskStatus>,
    search: Option<&str>,
) -> (String, Vec<Value>) {
    let mut sql = "user_id = ?".to_string();
    let mut params = vec![Value::Text(user_id.to_string())];

    if let Some(status) = status {
        sql.push_str(" AND status = ?");
        params.push(Value::Text(status.as_str().to_string()));
    }

    if let Some(search) = search {
        let escaped = search
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        sql.push_str(" AND title LIKE ? ESCAPE '\\'");
        params.push(Value::Text(format!("%{escaped}%")));
    }

    (sql, params)
}

fn user_from_row(row: &Row) -> Result<User> {
    Ok(User {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        name: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        email: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        password_hash: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        created_at: parse_timestamp(&row.get::<String>(4).map_err(|e| AppError::Database(e.to_string()))?)?,
        updated_at: parse_timestamp(&row.get::<String>(5).map_err(|e| AppError::Database(e.to_string()))?)?,
    })
}

fn task_from_row(row: &Row) -> Result<Task> {
    let status: String = row.get(4).map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Task {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        user_id: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        title: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
        description: row.get(3).map_err(|e| AppError::Database(e.to_string()))?,
        status: TaskStatus::parse(&status)
            .ok_or_else(|| AppError::Database(format!("Unknown task status: {status}")))?,
        created_at: parse_timestamp(&row.get::<String>(5).map_err(|e| AppError::Database(e.to_string()))?)?,
        updated_at: parse_timestamp(&row.get::<String>(6).map_err(|e| AppError::Database(e.to_string()))?)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Database(format!("Malformed timestamp {raw:?}: {e}")))
}
