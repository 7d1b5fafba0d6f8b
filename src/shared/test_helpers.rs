//! In-memory repositories, storage and an HTTP test harness.
//!
//! The repositories honour the same ownership predicates and foreign-key
//! rules as the Postgres schema (category delete nulls `category_id`, task
//! delete removes its attachments).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::Fake;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::{build_router, Repositories, Services};
use crate::core::config::AuthTokenConfig;
use crate::core::error::{AppError, Result};
use crate::features::attachments::models::{AttachmentData, TaskAttachment};
use crate::features::attachments::AttachmentRepository;
use crate::features::categories::models::{Category, CategoryData};
use crate::features::categories::CategoryRepository;
use crate::features::tasks::models::{
    Task, TaskData, TaskFilter, TaskPriority, TaskStats, TaskStatus,
};
use crate::features::tasks::TaskRepository;
use crate::features::users::models::{NewUser, User};
use crate::features::users::repositories::USERNAME_TAKEN;
use crate::features::users::UserRepository;
use crate::modules::storage::ObjectStorage;
use crate::shared::validation::search_terms;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn test_token_config() -> AuthTokenConfig {
    AuthTokenConfig {
        secret: "test-secret-key-for-signing".to_string(),
        access_token_ttl_secs: 300,
        refresh_token_ttl_secs: 86_400,
        leeway_secs: 0,
    }
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<CategoryRow>,
    tasks: Vec<TaskRow>,
    attachments: Vec<TaskAttachment>,
    last_timestamp: Option<DateTime<Utc>>,
}

#[derive(Clone)]
struct CategoryRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    color: String,
    created_at: DateTime<Utc>,
}

#[derive(Clone)]
struct TaskRow {
    id: Uuid,
    user_id: Uuid,
    data: TaskData,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Tables {
    /// Strictly increasing clock so creation order is always observable
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(now);
        now
    }

    fn category(&self, row: &CategoryRow) -> Category {
        Category {
            id: row.id,
            user_id: row.user_id,
            name: row.name.clone(),
            color: row.color.clone(),
            created_at: row.created_at,
            task_count: self
                .tasks
                .iter()
                .filter(|t| t.data.category_id == Some(row.id))
                .count() as i64,
        }
    }

    fn task(&self, row: &TaskRow) -> Task {
        let category_name = row.data.category_id.and_then(|id| {
            self.categories
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
        });

        Task {
            id: row.id,
            user_id: row.user_id,
            title: row.data.title.clone(),
            description: row.data.description.clone(),
            category_id: row.data.category_id,
            category_name,
            priority: row.data.priority,
            status: row.data.status,
            due_date: row.data.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    fn owns_task(&self, owner_id: Uuid, task_id: Uuid) -> bool {
        self.tasks
            .iter()
            .any(|t| t.id == task_id && t.user_id == owner_id)
    }
}

/// Shared backing store for every in-memory repository
#[derive(Clone, Default)]
pub struct InMemoryDb {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryDb {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("in-memory db poisoned")
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            categories: Arc::new(self.clone()),
            tasks: Arc::new(self.clone()),
            attachments: Arc::new(self.clone()),
        }
    }

    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    pub fn task_count(&self) -> usize {
        self.lock().tasks.len()
    }

    pub fn attachment_count(&self) -> usize {
        self.lock().attachments.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryDb {
    async fn create(&self, user: &NewUser) -> Result<User> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::field("username", USERNAME_TAKEN));
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            is_active: true,
            date_joined: tables.now(),
            last_login: None,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn touch_last_login(&self, id: Uuid) -> Result<()> {
        let mut tables = self.lock();
        let now = tables.now();
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.last_login = Some(now);
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryDb {
    async fn list(&self, owner_id: Uuid, search: Option<&str>) -> Result<Vec<Category>> {
        let tables = self.lock();
        let terms = search
            .map(|s| search_terms(&s.to_lowercase()))
            .unwrap_or_default();

        let mut categories: Vec<Category> = tables
            .categories
            .iter()
            .filter(|c| c.user_id == owner_id)
            .filter(|c| {
                let name = c.name.to_lowercase();
                terms.iter().all(|t| name.contains(t.as_str()))
            })
            .map(|c| tables.category(c))
            .collect();

        categories.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Category>> {
        let tables = self.lock();
        Ok(tables
            .categories
            .iter()
            .find(|c| c.id == id && c.user_id == owner_id)
            .map(|c| tables.category(c)))
    }

    async fn create(&self, owner_id: Uuid, data: &CategoryData) -> Result<Category> {
        let mut tables = self.lock();
        let row = CategoryRow {
            id: Uuid::new_v4(),
            user_id: owner_id,
            name: data.name.clone(),
            color: data.color.clone(),
            created_at: tables.now(),
        };
        tables.categories.push(row.clone());
        Ok(tables.category(&row))
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        data: &CategoryData,
    ) -> Result<Option<Category>> {
        let mut tables = self.lock();
        let Some(row) = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id && c.user_id == owner_id)
        else {
            return Ok(None);
        };

        row.name = data.name.clone();
        row.color = data.color.clone();
        let row = row.clone();
        Ok(Some(tables.category(&row)))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let mut tables = self.lock();
        let before = tables.categories.len();
        tables
            .categories
            .retain(|c| !(c.id == id && c.user_id == owner_id));
        if tables.categories.len() == before {
            return Ok(false);
        }

        // ON DELETE SET NULL
        for task in tables.tasks.iter_mut() {
            if task.data.category_id == Some(id) {
                task.data.category_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl TaskRepository for InMemoryDb {
    async fn list(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>> {
        let tables = self.lock();
        let mut tasks: Vec<Task> = tables
            .tasks
            .iter()
            .filter(|t| t.user_id == owner_id)
            .map(|t| tables.task(t))
            .filter(|t| filter.matches(t))
            .collect();

        tasks.sort_by(|a, b| filter.ordering.compare(a, b));
        Ok(tasks)
    }

    async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Task>> {
        let tables = self.lock();
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.id == id && t.user_id == owner_id)
            .map(|t| tables.task(t)))
    }

    async fn create(&self, owner_id: Uuid, data: &TaskData) -> Result<Task> {
        let mut tables = self.lock();
        let now = tables.now();
        let row = TaskRow {
            id: Uuid::new_v4(),
            user_id: owner_id,
            data: data.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(row.clone());
        Ok(tables.task(&row))
    }

    async fn update(&self, owner_id: Uuid, id: Uuid, data: &TaskData) -> Result<Option<Task>> {
        let mut tables = self.lock();
        let now = tables.now();
        let Some(row) = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner_id)
        else {
            return Ok(None);
        };

        row.data = data.clone();
        row.updated_at = now;
        let row = row.clone();
        Ok(Some(tables.task(&row)))
    }

    async fn set_status(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Task>> {
        let mut tables = self.lock();
        let now = tables.now();
        let Some(row) = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner_id)
        else {
            return Ok(None);
        };

        row.data.status = status;
        row.updated_at = now;
        let row = row.clone();
        Ok(Some(tables.task(&row)))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        let mut tables = self.lock();
        if !tables.owns_task(owner_id, id) {
            return Ok(false);
        }

        tables.tasks.retain(|t| t.id != id);
        // ON DELETE CASCADE
        tables.attachments.retain(|a| a.task_id != id);
        Ok(true)
    }

    async fn stats(&self, owner_id: Uuid) -> Result<TaskStats> {
        let tables = self.lock();
        let owned: Vec<&TaskData> = tables
            .tasks
            .iter()
            .filter(|t| t.user_id == owner_id)
            .map(|t| &t.data)
            .collect();
        let count = |pred: fn(&TaskData) -> bool| owned.iter().filter(|d| pred(d)).count() as i64;

        Ok(TaskStats {
            total_tasks: owned.len() as i64,
            completed_tasks: count(|d| d.status == TaskStatus::Completed),
            pending_tasks: count(|d| d.status == TaskStatus::Pending),
            high_priority_tasks: count(|d| d.priority == TaskPriority::High),
        })
    }
}

#[async_trait]
impl AttachmentRepository for InMemoryDb {
    async fn list(&self, owner_id: Uuid) -> Result<Vec<TaskAttachment>> {
        let tables = self.lock();
        let mut attachments: Vec<TaskAttachment> = tables
            .attachments
            .iter()
            .filter(|a| tables.owns_task(owner_id, a.task_id))
            .cloned()
            .collect();

        attachments.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(a.id.cmp(&b.id)));
        Ok(attachments)
    }

    async fn list_for_task(&self, owner_id: Uuid, task_id: Uuid) -> Result<Vec<TaskAttachment>> {
        let tables = self.lock();
        if !tables.owns_task(owner_id, task_id) {
            return Ok(Vec::new());
        }

        Ok(tables
            .attachments
            .iter()
            .filter(|a| a.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn find(&self, owner_id: Uuid, id: Uuid) -> Result<Option<TaskAttachment>> {
        let tables = self.lock();
        Ok(tables
            .attachments
            .iter()
            .find(|a| a.id == id && tables.owns_task(owner_id, a.task_id))
            .cloned())
    }

    async fn create(
        &self,
        owner_id: Uuid,
        data: &AttachmentData,
    ) -> Result<Option<TaskAttachment>> {
        let mut tables = self.lock();
        if !tables.owns_task(owner_id, data.task_id) {
            return Ok(None);
        }

        let attachment = TaskAttachment {
            id: Uuid::new_v4(),
            task_id: data.task_id,
            file_key: data.file_key.clone(),
            filename: data.filename.clone(),
            content_type: data.content_type.clone(),
            file_size: data.file_size,
            uploaded_at: tables.now(),
        };
        tables.attachments.push(attachment.clone());
        Ok(Some(attachment))
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        data: &AttachmentData,
    ) -> Result<Option<TaskAttachment>> {
        let mut tables = self.lock();
        let Some(task_id) = tables
            .attachments
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.task_id)
        else {
            return Ok(None);
        };
        if !tables.owns_task(owner_id, task_id) {
            return Ok(None);
        }

        let Some(attachment) = tables.attachments.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        attachment.file_key = data.file_key.clone();
        attachment.filename = data.filename.clone();
        attachment.content_type = data.content_type.clone();
        attachment.file_size = data.file_size;
        Ok(Some(attachment.clone()))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<Option<TaskAttachment>> {
        let mut tables = self.lock();
        let Some(index) = tables
            .attachments
            .iter()
            .position(|a| a.id == id && tables.owns_task(owner_id, a.task_id))
        else {
            return Ok(None);
        };
        Ok(Some(tables.attachments.remove(index)))
    }
}

/// Object storage backed by a map of key to bytes
#[derive(Default)]
pub struct InMemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.objects.lock().expect("in-memory storage poisoned")
    }

    pub fn object_count(&self) -> usize {
        self.lock().len()
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    fn key_prefix(&self) -> &str {
        "attachments"
    }

    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> std::result::Result<(), AppError> {
        self.lock().insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), AppError> {
        self.lock().remove(key);
        Ok(())
    }

    async fn presigned_url(&self, key: &str) -> std::result::Result<String, AppError> {
        Ok(format!("http://storage.test/{}?X-Amz-Signature=test", key))
    }
}

/// Registered account with live tokens
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub access: String,
    pub refresh: String,
}

/// The real router over in-memory backends
pub struct TestApp {
    pub server: TestServer,
    pub db: InMemoryDb,
    pub storage: Arc<InMemoryStorage>,
}

impl TestApp {
    pub fn new() -> Self {
        let db = InMemoryDb::default();
        let storage = Arc::new(InMemoryStorage::default());
        let services = Services::new(
            db.repositories(),
            Arc::clone(&storage) as Arc<dyn ObjectStorage>,
            test_token_config(),
        );

        let server = TestServer::new(build_router(&services)).expect("test server");
        Self {
            server,
            db,
            storage,
        }
    }

    /// Register a fresh user and log them in
    pub async fn user(&self) -> TestUser {
        let base: String = Username().fake();
        let base: String = base
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .take(40)
            .collect();
        let username = format!("{}_{}", base, &Uuid::new_v4().simple().to_string()[..8]);
        let email: String = SafeEmail().fake();

        let registered = self
            .server
            .post("/api/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": TEST_PASSWORD,
                "password_confirm": TEST_PASSWORD,
            }))
            .await;
        registered.assert_status(axum::http::StatusCode::CREATED);
        let id = registered.json::<Value>()["data"]["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("registered user id");

        let login = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "username": username, "password": TEST_PASSWORD }))
            .await;
        login.assert_status_ok();
        let tokens = login.json::<Value>();

        TestUser {
            id,
            username,
            access: tokens["data"]["access"].as_str().unwrap_or_default().to_string(),
            refresh: tokens["data"]["refresh"].as_str().unwrap_or_default().to_string(),
        }
    }

    /// Create a task for `user` and return its JSON payload
    pub async fn create_task(&self, user: &TestUser, body: Value) -> Value {
        let response = self
            .server
            .post("/api/tasks")
            .authorization_bearer(&user.access)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }

    /// Create a category for `user` and return its JSON payload
    pub async fn create_category(&self, user: &TestUser, name: &str) -> Value {
        let response = self
            .server
            .post("/api/categories")
            .authorization_bearer(&user.access)
            .json(&json!({ "name": name }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }
}

/// String id field of a JSON payload
pub fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap_or_default().to_string()
}
