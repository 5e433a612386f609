// Copyright (c) 2026 The ensemble authors
// SPDX-License-Identifier: MIT

//! Application lifecycle.
//!
//! [`App`] is the declaration surface: name the application, declare agents
//! and tasks, then open a [`RunScope`] to execute. Each scope gets its own
//! engine, cancellation token, and node cache, so consecutive scopes are
//! fully independent. Teardown runs exactly once per scope, whether invoked
//! explicitly or via `Drop`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::collaborators::{HumanInput, LlmClient, Notifier};
use crate::config::params::RequestParams;
use crate::config::Settings;
use crate::errors::{ConfigError, Error, ExecutionError};
use crate::executor::{EngineFactory, ExecutionEngine};
use crate::observability::messages::workflow::{ScopeInitialized, ScopeTornDown};
use crate::registry::{
    AgentConfig, AgentRegistry, ExecutionMetadata, TaskFn, TaskRegistry,
};
use crate::workflows::{WorkflowBuilder, WorkflowNode};

pub struct App {
    name: String,
    settings: Settings,
    cli_params: RequestParams,
    llm: Arc<dyn LlmClient>,
    human_input: Option<Arc<dyn HumanInput>>,
    notifier: Option<Arc<dyn Notifier>>,
    declarations: AgentRegistry,
    tasks: TaskRegistry,
}

impl App {
    pub fn new(name: impl Into<String>, settings: Settings, llm: Arc<dyn LlmClient>) -> Self {
        let strict = settings.strict_declarations;
        App {
            name: name.into(),
            settings,
            cli_params: RequestParams::default(),
            llm,
            human_input: None,
            notifier: None,
            declarations: AgentRegistry::new().strict(strict),
            tasks: TaskRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Command-line tier of parameter resolution, above the settings file
    /// and below per-declaration overrides.
    pub fn with_cli_overrides(mut self, params: RequestParams) -> Self {
        self.cli_params = params;
        self
    }

    pub fn with_human_input(mut self, human_input: Arc<dyn HumanInput>) -> Self {
        self.human_input = Some(human_input);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn human_input(&self) -> Option<&Arc<dyn HumanInput>> {
        self.human_input.as_ref()
    }

    pub fn notifier(&self) -> Option<&Arc<dyn Notifier>> {
        self.notifier.as_ref()
    }

    /// Declare a workflow node of any kind. The kind-specific helpers below
    /// cover the common cases; build an [`AgentConfig`] directly for servers,
    /// model overrides, or request parameters.
    pub fn declare(&mut self, config: AgentConfig) -> Result<&mut Self, ConfigError> {
        self.declarations.register(config)?;
        Ok(self)
    }

    pub fn declare_basic(
        &mut self,
        name: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Result<&mut Self, ConfigError> {
        self.declare(AgentConfig::basic(name, instruction))
    }

    pub fn declare_orchestrator(
        &mut self,
        name: impl Into<String>,
        instruction: impl Into<String>,
        children: Vec<String>,
    ) -> Result<&mut Self, ConfigError> {
        self.declare(AgentConfig::orchestrator(name, instruction, children))
    }

    pub fn declare_parallel(
        &mut self,
        name: impl Into<String>,
        fan_in: impl Into<String>,
        fan_out: Vec<String>,
    ) -> Result<&mut Self, ConfigError> {
        self.declare(AgentConfig::parallel(name, fan_in, fan_out))
    }

    pub fn declare_evaluator_optimizer(
        &mut self,
        name: impl Into<String>,
        optimizer: impl Into<String>,
        evaluator: impl Into<String>,
        min_rating: crate::workflows::QualityRating,
        max_refinements: u32,
    ) -> Result<&mut Self, ConfigError> {
        self.declare(AgentConfig::evaluator_optimizer(
            name,
            optimizer,
            evaluator,
            min_rating,
            max_refinements,
        ))
    }

    /// Register a callable unit with its scheduling metadata.
    pub fn register_task(
        &mut self,
        metadata: ExecutionMetadata,
        call: TaskFn,
    ) -> Result<&mut Self, ConfigError> {
        self.tasks.register(metadata, call)?;
        Ok(self)
    }

    pub fn declarations(&self) -> &AgentRegistry {
        &self.declarations
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Open an execution scope over a snapshot of the current declarations.
    /// Later declarations on the app do not affect an open scope.
    pub fn run_scope(&self) -> RunScope {
        let cancel = CancellationToken::new();
        let engine = EngineFactory::from_settings(&self.settings, cancel.clone());
        let builder = WorkflowBuilder::new(
            engine.clone(),
            self.llm.clone(),
            self.settings.file_request_params(),
            self.cli_params.clone(),
            cancel.clone(),
        );
        for name in self.declarations.names() {
            engine.on_workflow_registered(name);
            engine.on_entry_point_registered(name, "send");
        }
        tracing::info!("{}", ScopeInitialized { app: &self.name });
        RunScope {
            app_name: self.name.clone(),
            registry: Mutex::new(self.declarations.clone()),
            tasks: Mutex::new(self.tasks.clone()),
            engine,
            builder,
            nodes: Mutex::new(BTreeMap::new()),
            cancel,
            torn_down: AtomicBool::new(false),
        }
    }
}

/// One execution scope: fixed engine, fixed declaration snapshot, its own
/// cancellation token and built-node cache.
pub struct RunScope {
    app_name: String,
    registry: Mutex<AgentRegistry>,
    tasks: Mutex<TaskRegistry>,
    engine: Arc<dyn ExecutionEngine>,
    builder: WorkflowBuilder,
    nodes: Mutex<BTreeMap<String, Arc<dyn WorkflowNode>>>,
    cancel: CancellationToken,
    torn_down: AtomicBool,
}

impl RunScope {
    pub fn engine(&self) -> &Arc<dyn ExecutionEngine> {
        &self.engine
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Build the named workflows (and their dependency closures) into the
    /// scope's node cache. Idempotent for already-built names.
    pub fn build(&self, requested: &[String]) -> Result<(), Error> {
        let registry = lock(&self.registry).clone();
        let built = self.builder.build(&registry, requested).map_err(|err| {
            tracing::error!("{err}");
            err
        })?;
        let mut nodes = lock(&self.nodes);
        for (name, node) in built {
            nodes.entry(name).or_insert(node);
        }
        Ok(())
    }

    /// A built node by name, if present in the cache.
    pub fn node(&self, name: &str) -> Option<Arc<dyn WorkflowNode>> {
        lock(&self.nodes).get(name).cloned()
    }

    /// Send a message to a named workflow, building it on first use.
    pub async fn invoke(&self, name: &str, message: &str) -> Result<String, Error> {
        if self.torn_down.load(Ordering::SeqCst) {
            return Err(ExecutionError::Cancelled {
                name: name.to_string(),
            }
            .into());
        }
        let node = match self.node(name) {
            Some(node) => node,
            None => {
                self.build(&[name.to_string()])?;
                match self.node(name) {
                    Some(node) => node,
                    None => {
                        return Err(Error::Execution(ExecutionError::UnknownWorkflow {
                            name: name.to_string(),
                        }))
                    }
                }
            }
        };
        node.send(message).await.map_err(|err| {
            tracing::error!("{err}");
            Error::from(err)
        })
    }

    /// Run a registered task through the scope's engine.
    pub async fn run_task(&self, activity_name: &str, input: String) -> Result<String, Error> {
        let task = lock(&self.tasks).get(activity_name).cloned().ok_or_else(|| {
            Error::Execution(ExecutionError::TaskFailed {
                name: activity_name.to_string(),
                message: "no task registered under this name".to_string(),
            })
        })?;
        Ok(self
            .engine
            .run(&task.metadata, task.call.clone(), input)
            .await?)
    }

    /// Tear the scope down: cancel in-flight work and drop cached state.
    /// Safe to call more than once; only the first call acts.
    pub fn shutdown(&self) {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();
        lock(&self.nodes).clear();
        lock(&self.registry).clear();
        lock(&self.tasks).clear();
        tracing::info!("{}", ScopeTornDown { app: &self.app_name });
    }
}

impl Drop for RunScope {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::ScriptedLlm;

    fn app() -> App {
        App::new(
            "test-app",
            Settings::default(),
            Arc::new(ScriptedLlm::new("reply")),
        )
    }

    #[tokio::test]
    async fn invoke_builds_on_first_use() {
        let mut app = app();
        app.declare_basic("writer", "You write.").unwrap();
        let scope = app.run_scope();

        assert!(scope.node("writer").is_none());
        let out = scope.invoke("writer", "hello").await.unwrap();
        assert_eq!(out, "reply");
        assert!(scope.node("writer").is_some());
    }

    #[tokio::test]
    async fn invoke_unknown_name_is_an_error() {
        let app = app();
        let scope = app.run_scope();
        let err = scope.invoke("ghost", "hello").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn shutdown_is_exactly_once_and_cancels() {
        let mut app = app();
        app.declare(AgentConfig::basic("writer", "")).unwrap();
        let scope = app.run_scope();
        scope.build(&["writer".to_string()]).unwrap();

        scope.shutdown();
        scope.shutdown();

        assert!(scope.cancellation_token().is_cancelled());
        assert!(scope.node("writer").is_none());
        let err = scope.invoke("writer", "hello").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Execution(ExecutionError::Cancelled { .. })
        ));
    }

    #[tokio::test]
    async fn scopes_are_independent() {
        let mut app = app();
        app.declare_basic("writer", "").unwrap();

        let first = app.run_scope();
        first.shutdown();

        // A fresh scope is unaffected by the previous teardown.
        let second = app.run_scope();
        let out = second.invoke("writer", "hello").await.unwrap();
        assert_eq!(out, "reply");
    }

    #[tokio::test]
    async fn later_declarations_do_not_leak_into_open_scopes() {
        let mut app = app();
        app.declare(AgentConfig::basic("writer", "")).unwrap();
        let scope = app.run_scope();

        app.declare(AgentConfig::basic("editor", "")).unwrap();
        let err = scope.invoke("editor", "hello").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn tasks_route_through_the_engine() {
        let mut app = app();
        app.register_task(
            ExecutionMetadata::new("shout"),
            Arc::new(|input: String| Box::pin(async move { Ok(input.to_uppercase()) })),
        )
        .unwrap();

        let scope = app.run_scope();
        let out = scope.run_task("shout", "hey".to_string()).await.unwrap();
        assert_eq!(out, "HEY");
    }
}
