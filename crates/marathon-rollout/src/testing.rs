//! In-memory `ClusterApi` fake for driving the rollout state machine in
//! tests without a scheduler.
//!
//! Deployments and tasks are scripted as "visible for N list calls":
//! `u32::MAX` means the entry never resolves. Every call is recorded so
//! tests can assert which operations were (not) attempted.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use marathon_client::{
    App, AppSpec, ClientError, ClientResult, ClusterApi, Deployment, DeploymentRef, Task,
};

pub const FOREVER: u32 = u32::MAX;

#[derive(Default)]
struct FakeState {
    app: Option<App>,
    get_error: Option<String>,
    submit: Option<DeploymentRef>,
    set_version: Option<DeploymentRef>,
    cancel_error: Option<String>,
    list_error: Option<String>,
    tasks_error: Option<String>,
    /// deployment id → list calls it remains visible for.
    active: HashMap<String, u32>,
    /// (task, list calls it remains visible for).
    tasks: Vec<(Task, u32)>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<FakeState>,
}

pub fn handle(id: &str, version: &str) -> DeploymentRef {
    DeploymentRef {
        id: id.to_string(),
        version: version.to_string(),
    }
}

fn api_error(body: &str) -> ClientError {
    ClientError::Api {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        body: body.to_string(),
    }
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server-side record returned by `get_application`.
    pub fn with_app(self, id: &str, version: &str) -> Self {
        self.state.lock().unwrap().app = Some(App {
            id: id.to_string(),
            version: Some(version.to_string()),
            extra: Default::default(),
        });
        self
    }

    /// Handle returned by both submit paths (create and update).
    pub fn with_submit(self, submitted: DeploymentRef) -> Self {
        self.state.lock().unwrap().submit = Some(submitted);
        self
    }

    /// Handle returned by `set_application_version`.
    pub fn with_set_version(self, revert: DeploymentRef) -> Self {
        self.state.lock().unwrap().set_version = Some(revert);
        self
    }

    /// Make a deployment show up in the active list for `polls` calls.
    pub fn activate(self, deployment_id: &str, polls: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .active
            .insert(deployment_id.to_string(), polls);
        self
    }

    /// Make a task show up in the task list for `polls` calls.
    pub fn with_task(self, task_id: &str, app_id: &str, version: &str, polls: u32) -> Self {
        self.state.lock().unwrap().tasks.push((
            Task {
                id: task_id.to_string(),
                app_id: app_id.to_string(),
                version: version.to_string(),
            },
            polls,
        ));
        self
    }

    pub fn fail_gets(self, message: &str) -> Self {
        self.state.lock().unwrap().get_error = Some(message.to_string());
        self
    }

    pub fn fail_lists(self, message: &str) -> Self {
        self.state.lock().unwrap().list_error = Some(message.to_string());
        self
    }

    pub fn fail_task_lists(self, message: &str) -> Self {
        self.state.lock().unwrap().tasks_error = Some(message.to_string());
        self
    }

    pub fn fail_cancels(self, message: &str) -> Self {
        self.state.lock().unwrap().cancel_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|c| c.starts_with(prefix))
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn get_application(&self, app_id: &str) -> ClientResult<App> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("get {app_id}"));
        if let Some(message) = &state.get_error {
            return Err(api_error(message));
        }
        match &state.app {
            Some(app) => Ok(app.clone()),
            None => Err(ClientError::NotFound {
                app_id: app_id.to_string(),
            }),
        }
    }

    async fn create_application(&self, spec: &AppSpec) -> ClientResult<DeploymentRef> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create {}", spec.id));
        state
            .submit
            .clone()
            .ok_or_else(|| api_error("create not scripted"))
    }

    async fn update_application(&self, spec: &AppSpec, force: bool) -> ClientResult<DeploymentRef> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("update {} force={force}", spec.id));
        state
            .submit
            .clone()
            .ok_or_else(|| api_error("update not scripted"))
    }

    async fn list_deployments(&self) -> ClientResult<Vec<Deployment>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("list_deployments".to_string());
        if let Some(message) = &state.list_error {
            return Err(api_error(message));
        }
        let visible = state
            .active
            .iter()
            .filter(|(_, polls)| **polls > 0)
            .map(|(id, _)| Deployment {
                id: id.clone(),
                affected_apps: Vec::new(),
                version: None,
            })
            .collect();
        for polls in state.active.values_mut() {
            if *polls > 0 && *polls != FOREVER {
                *polls -= 1;
            }
        }
        Ok(visible)
    }

    async fn cancel_deployment(
        &self,
        deployment_id: &str,
        force: bool,
    ) -> ClientResult<Option<DeploymentRef>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("cancel {deployment_id} force={force}"));
        if let Some(message) = &state.cancel_error {
            return Err(api_error(message));
        }
        state.active.remove(deployment_id);
        if force {
            Ok(None)
        } else {
            Ok(Some(handle(&format!("{deployment_id}-revert"), "cancelled")))
        }
    }

    async fn set_application_version(
        &self,
        app_id: &str,
        version: &str,
    ) -> ClientResult<DeploymentRef> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("set_version {app_id} {version}"));
        state
            .set_version
            .clone()
            .ok_or_else(|| api_error("set_version not scripted"))
    }

    async fn list_tasks(&self, app_id: &str) -> ClientResult<Vec<Task>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("list_tasks {app_id}"));
        if let Some(message) = &state.tasks_error {
            return Err(api_error(message));
        }
        let visible = state
            .tasks
            .iter()
            .filter(|(_, polls)| *polls > 0)
            .map(|(task, _)| task.clone())
            .collect();
        for (_, polls) in &mut state.tasks {
            if *polls > 0 && *polls != FOREVER {
                *polls -= 1;
            }
        }
        Ok(visible)
    }
}
