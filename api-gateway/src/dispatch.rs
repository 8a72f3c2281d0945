//! Routing of proxy requests to operations.
//!
//! A request is resolved to an [`Action`] from its method and `action`
//! query parameter, the action's configuration is checked, and only then
//! is the body parsed and Notion contacted.

use std::collections::HashMap;

use chrono::NaiveDate;
use lambda_http::{Body, Request, RequestExt, Response};
use serde::Deserialize;
use shared::http::{error_response, json_response, parse_json_body, preflight_response};
use shared::{Config, Error, NotionApi, Result, Setting};
use tracing::{error, info};

use crate::models::TodoFields;
use crate::operations::{listing, milestones, parts, projects, schema, todos, workflows, Reply};

/// Query parameters any action reads.
const QUERY_PARAMS: [&str; 5] = ["action", "status", "includeDone", "database", "id"];

/// The parts of an HTTP request the proxy looks at.
#[derive(Debug, Clone, Default)]
pub struct ProxyRequest {
    pub method: String,
    pub query: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl ProxyRequest {
    pub fn from_lambda(event: &Request) -> Self {
        let params = event.query_string_parameters();
        let query = QUERY_PARAMS
            .iter()
            .filter_map(|name| params.first(name).map(|v| (name.to_string(), v.to_string())))
            .collect();

        Self {
            method: event.method().as_str().to_ascii_uppercase(),
            query,
            body: event.body().to_vec(),
        }
    }

    /// A query parameter, ignoring blank values.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListWork,
    ListWorkflows,
    ListTodos,
    DescribeSchema,
    CreateProject,
    CreateMilestones,
    SaveProgress,
    SaveMilestones,
    SaveParts,
    CreateWorkflow,
    CreateTodo,
    UpdateProject,
    UpdateMilestone,
    UpdateWorkflow,
    UpdateTodo,
    DeleteWorkflow,
}

impl Action {
    /// Look up the action for a method and `action` parameter.
    pub fn resolve(method: &str, action: Option<&str>) -> Result<Self> {
        if !matches!(method, "GET" | "POST" | "PUT" | "DELETE") {
            return Err(Error::MethodNotAllowed(method.to_string()));
        }

        let resolved = match (method, action) {
            ("GET", None) => Action::ListWork,
            ("GET", Some("workflows")) => Action::ListWorkflows,
            ("GET", Some("todos")) => Action::ListTodos,
            ("GET", Some("schema")) => Action::DescribeSchema,
            ("POST", Some("createProject")) => Action::CreateProject,
            ("POST", Some("createMilestones")) => Action::CreateMilestones,
            ("POST", Some("saveProgress")) => Action::SaveProgress,
            ("POST", Some("saveMilestones")) => Action::SaveMilestones,
            ("POST", Some("saveParts")) => Action::SaveParts,
            ("POST", Some("createWorkflow")) => Action::CreateWorkflow,
            ("POST", Some("createTodo")) => Action::CreateTodo,
            ("PUT", Some("updateProject")) => Action::UpdateProject,
            ("PUT", Some("updateMilestone")) => Action::UpdateMilestone,
            ("PUT", Some("updateWorkflow")) => Action::UpdateWorkflow,
            ("PUT", Some("updateTodo")) => Action::UpdateTodo,
            ("DELETE", Some("deleteWorkflow")) => Action::DeleteWorkflow,
            (_, action) => {
                return Err(Error::UnknownAction(format!(
                    "{} {}",
                    method,
                    action.unwrap_or("(none)")
                )))
            }
        };
        Ok(resolved)
    }

    /// Settings that must be present before the action runs.
    pub fn requirements(self) -> Vec<Setting> {
        let mut settings = vec![Setting::Token, Setting::Projects, Setting::Milestones];
        match self {
            Action::SaveParts => settings.push(Setting::Parts),
            Action::ListWorkflows
            | Action::CreateWorkflow
            | Action::UpdateWorkflow
            | Action::DeleteWorkflow => settings.push(Setting::Workflows),
            Action::ListTodos | Action::CreateTodo | Action::UpdateTodo => {
                settings.push(Setting::Inbox)
            }
            _ => {}
        }
        settings
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IdBody {
    id: Option<String>,
}

/// Run the operation a request asks for.
pub async fn dispatch<A>(
    api: &A,
    config: &Config,
    request: &ProxyRequest,
    today: NaiveDate,
) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    let action = Action::resolve(&request.method, request.param("action"))?;
    info!(method = %request.method, action = ?action, "Dispatching request");
    config.require(&action.requirements())?;

    let body = request.body.as_slice();
    match action {
        Action::ListWork => listing::list_work(api, config, request.param("status")).await,
        Action::ListWorkflows => workflows::list_workflows(api, config).await,
        Action::ListTodos => {
            let include_done = todos::include_done(request.param("includeDone"));
            todos::list_todos(api, config, include_done).await
        }
        Action::DescribeSchema => {
            let setting = schema::database_setting(request.param("database"))?;
            schema::describe_database(api, config, setting).await
        }
        Action::CreateProject => projects::create_project(api, config, parse_json_body(body)?).await,
        Action::CreateMilestones => {
            milestones::create_milestones(api, config, parse_json_body(body)?).await
        }
        Action::SaveProgress => milestones::save_progress(api, parse_json_body(body)?, today).await,
        Action::SaveMilestones => {
            milestones::save_milestones(api, config, parse_json_body(body)?).await
        }
        Action::SaveParts => parts::save_parts(api, config, parse_json_body(body)?).await,
        Action::CreateWorkflow => {
            workflows::create_workflow(api, config, parse_json_body(body)?).await
        }
        Action::CreateTodo => todos::create_todo(api, config, parse_json_body(body)?).await,
        Action::UpdateProject => projects::update_project(api, parse_json_body(body)?, today).await,
        Action::UpdateMilestone => milestones::update_milestone(api, parse_json_body(body)?).await,
        Action::UpdateWorkflow => workflows::update_workflow(api, parse_json_body(body)?).await,
        Action::UpdateTodo => todos::update_todo(api, parse_json_body(body)?).await,
        Action::DeleteWorkflow => {
            let id = match request.param("id") {
                Some(id) => Some(id.to_string()),
                None => parse_json_body::<IdBody>(body)?.id,
            };
            workflows::delete_workflow(api, id.as_deref()).await
        }
    }
}

/// Single-purpose inbox endpoint: `POST { note }` files one note.
pub async fn add_inbox_note<A>(api: &A, config: &Config, request: &ProxyRequest) -> Result<Reply>
where
    A: NotionApi + ?Sized,
{
    if request.method != "POST" {
        return Err(Error::MethodNotAllowed(request.method.clone()));
    }
    config.require(&[Setting::Token, Setting::Inbox])?;

    let note: TodoFields = parse_json_body(&request.body)?;
    let reply = todos::create_todo(api, config, note).await?;
    // Existing inbox clients expect 200 on success.
    Ok(Reply { status: 200, ..reply })
}

/// Turn an operation result into the HTTP response, logging failures.
pub fn into_response(result: Result<Reply>) -> std::result::Result<Response<Body>, lambda_http::Error> {
    match result {
        Ok(reply) => json_response(reply.status, &reply.body),
        Err(e) => {
            if e.status_code() >= 500 {
                error!(error = %e, "Request failed");
            } else {
                info!(error = %e, "Request rejected");
            }
            error_response(&e)
        }
    }
}

/// Full handling of one proxy request, CORS preflight included.
pub async fn respond<A>(
    api: &A,
    config: &Config,
    request: &ProxyRequest,
    today: NaiveDate,
) -> std::result::Result<Response<Body>, lambda_http::Error>
where
    A: NotionApi + ?Sized,
{
    if request.method == "OPTIONS" {
        return preflight_response();
    }
    into_response(dispatch(api, config, request, today).await)
}

/// Full handling of one inbox request, CORS preflight included.
pub async fn respond_inbox<A>(
    api: &A,
    config: &Config,
    request: &ProxyRequest,
) -> std::result::Result<Response<Body>, lambda_http::Error>
where
    A: NotionApi + ?Sized,
{
    if request.method == "OPTIONS" {
        return preflight_response();
    }
    into_response(add_inbox_note(api, config, request).await)
}
