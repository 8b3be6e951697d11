//! The closed tool catalogue offered to the language model.
//!
//! The model names tools by string; [`ToolInvocation::from_request`] turns a
//! [`ToolCallRequest`] into one of a fixed set of typed variants so dispatch is
//! an exhaustive `match`. Adding a tool means adding a [`ToolName`] variant, a
//! [`ToolInvocation`] variant, and a [`ToolSignature`], and the compiler points
//! at every dispatcher that must learn about it.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{BranchName, PullRequestSpec, RepositoryRef, ToolCallRequest, ToolError};

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Every tool the assistant can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// Open a pull request.
    CreatePullRequest,
    /// List a repository's branches.
    ListBranches,
}

impl ToolName {
    /// All tools, in the order they are advertised.
    pub const ALL: [ToolName; 2] = [ToolName::CreatePullRequest, ToolName::ListBranches];

    /// Wire name used by the model.
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::CreatePullRequest => "create_pull_request",
            ToolName::ListBranches => "list_branches",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool {
                name: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// Scalar type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// JSON string.
    String,
    /// JSON boolean.
    Boolean,
}

/// One named parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolParameter {
    /// Argument name.
    pub name: &'static str,
    /// Scalar type.
    pub kind: ParameterKind,
    /// Description shown to the model.
    pub description: &'static str,
    /// Whether the model must supply it.
    pub required: bool,
    /// Value used when an optional parameter is omitted.
    pub default: Option<Value>,
}

/// The contract of one tool as advertised to the language model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSignature {
    /// Tool name.
    pub name: ToolName,
    /// Description shown to the model.
    pub description: &'static str,
    /// Parameters in declaration order.
    pub parameters: Vec<ToolParameter>,
}

impl ToolSignature {
    /// Renders the parameters as a JSON Schema `object`.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut schema = json!({
                "type": match param.kind {
                    ParameterKind::String => "string",
                    ParameterKind::Boolean => "boolean",
                },
                "description": param.description,
            });
            if let (Some(default), Value::Object(obj)) = (&param.default, &mut schema) {
                obj.insert("default".to_string(), default.clone());
            }
            properties.insert(param.name.to_string(), schema);
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

fn string_param(name: &'static str, description: &'static str) -> ToolParameter {
    ToolParameter {
        name,
        kind: ParameterKind::String,
        description,
        required: true,
        default: None,
    }
}

/// Signatures of every tool in [`ToolName::ALL`].
pub fn tool_signatures() -> Vec<ToolSignature> {
    ToolName::ALL.into_iter().map(signature_of).collect()
}

fn signature_of(name: ToolName) -> ToolSignature {
    let owner = string_param("repo_owner", "GitHub username or organization name");
    let repo = string_param("repo_name", "Repository name");
    match name {
        ToolName::CreatePullRequest => ToolSignature {
            name,
            description: "Create a pull request in a GitHub repository.",
            parameters: vec![
                owner,
                repo,
                string_param("title", "Pull request title"),
                string_param("body", "Pull request description"),
                string_param(
                    "head_branch",
                    "Source branch (the branch to merge FROM)",
                ),
                ToolParameter {
                    default: Some(Value::String(crate::DEFAULT_BASE_BRANCH.to_string())),
                    required: false,
                    ..string_param(
                        "base_branch",
                        "Target branch (the branch to merge INTO)",
                    )
                },
            ],
        },
        ToolName::ListBranches => ToolSignature {
            name,
            description: "List branches in a GitHub repository.",
            parameters: vec![
                owner,
                repo,
                ToolParameter {
                    name: "open_only",
                    kind: ParameterKind::Boolean,
                    description: "Only return branches that have an open pull request",
                    required: false,
                    default: Some(Value::Bool(false)),
                },
            ],
        },
    }
}

// ---------------------------------------------------------------------------
// Invocations
// ---------------------------------------------------------------------------

/// A tool call with its arguments parsed and validated.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    /// Open a pull request.
    CreatePullRequest(PullRequestSpec),
    /// List branches, optionally only those with an open pull request.
    ListBranches {
        /// Repository to query.
        repo: RepositoryRef,
        /// Narrow to branches referenced by open pull requests.
        open_only: bool,
    },
}

impl ToolInvocation {
    /// Parses a model-issued request.
    ///
    /// # Errors
    ///
    /// [`ToolError::UnknownTool`] for an unrecognised name;
    /// [`ToolError::InvalidArguments`] for argument text that was not a JSON
    /// object, or a missing, empty, or ill-typed argument.
    pub fn from_request(request: &ToolCallRequest) -> Result<Self, ToolError> {
        let name: ToolName = request.name.parse()?;
        if let Some(raw) = &request.unparsed_arguments {
            return Err(ToolError::InvalidArguments {
                tool: name.to_string(),
                message: format!("arguments are not a JSON object: {raw}"),
            });
        }
        let args = Arguments {
            tool: name,
            values: &request.arguments,
        };
        let repo = RepositoryRef {
            owner: args.non_empty("repo_owner", crate::RepositoryOwner::new)?,
            name: args.non_empty("repo_name", crate::RepositoryName::new)?,
        };

        match name {
            ToolName::ListBranches => Ok(ToolInvocation::ListBranches {
                repo,
                open_only: args.optional_bool("open_only")?.unwrap_or(false),
            }),
            ToolName::CreatePullRequest => {
                let base = match args.optional_string("base_branch")? {
                    Some(value) => Some(BranchName::new(value).ok_or_else(|| {
                        args.invalid("'base_branch' must not be empty".to_string())
                    })?),
                    None => None,
                };
                Ok(ToolInvocation::CreatePullRequest(PullRequestSpec::new(
                    repo,
                    args.string("title")?,
                    args.string("body")?,
                    args.non_empty("head_branch", BranchName::new)?,
                    base,
                )))
            }
        }
    }
}

struct Arguments<'a> {
    tool: ToolName,
    values: &'a Map<String, Value>,
}

impl Arguments<'_> {
    fn invalid(&self, message: String) -> ToolError {
        ToolError::InvalidArguments {
            tool: self.tool.to_string(),
            message,
        }
    }

    fn optional_string(&self, key: &str) -> Result<Option<String>, ToolError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.invalid(format!("'{key}' must be a string, got {other}"))),
        }
    }

    fn string(&self, key: &str) -> Result<String, ToolError> {
        self.optional_string(key)?
            .ok_or_else(|| self.invalid(format!("missing required argument '{key}'")))
    }

    fn non_empty<T>(&self, key: &str, build: fn(String) -> Option<T>) -> Result<T, ToolError> {
        build(self.string(key)?).ok_or_else(|| self.invalid(format!("'{key}' must not be empty")))
    }

    fn optional_bool(&self, key: &str) -> Result<Option<bool>, ToolError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(other) => Err(self.invalid(format!("'{key}' must be a boolean, got {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ToolCallId;

    fn request(name: &str, arguments: Value) -> ToolCallRequest {
        let Value::Object(arguments) = arguments else {
            panic!("arguments must be an object");
        };
        ToolCallRequest {
            id: ToolCallId::new("call_1").unwrap(),
            name: name.to_string(),
            arguments,
            unparsed_arguments: None,
        }
    }

    #[test]
    fn tool_names_round_trip_through_wire_form() {
        for name in ToolName::ALL {
            assert_eq!(name.as_str().parse::<ToolName>().unwrap(), name);
        }
        assert!(matches!(
            "delete_repo".parse::<ToolName>(),
            Err(ToolError::UnknownTool { name }) if name == "delete_repo"
        ));
    }

    #[test]
    fn list_branches_defaults_open_only_to_false() {
        let invocation = ToolInvocation::from_request(&request(
            "list_branches",
            json!({"repo_owner": "acme", "repo_name": "widgets"}),
        ))
        .unwrap();
        assert_eq!(
            invocation,
            ToolInvocation::ListBranches {
                repo: RepositoryRef::new("acme", "widgets").unwrap(),
                open_only: false,
            }
        );
    }

    #[test]
    fn list_branches_accepts_string_booleans() {
        let invocation = ToolInvocation::from_request(&request(
            "list_branches",
            json!({"repo_owner": "acme", "repo_name": "widgets", "open_only": "True"}),
        ))
        .unwrap();
        assert!(matches!(
            invocation,
            ToolInvocation::ListBranches { open_only: true, .. }
        ));
    }

    #[test]
    fn create_pull_request_defaults_base_to_main() {
        let invocation = ToolInvocation::from_request(&request(
            "create_pull_request",
            json!({
                "repo_owner": "acme",
                "repo_name": "widgets",
                "title": "Add auth",
                "body": "Adds login",
                "head_branch": "feature-x",
            }),
        ))
        .unwrap();
        let ToolInvocation::CreatePullRequest(spec) = invocation else {
            panic!("expected a pull request invocation");
        };
        assert_eq!(spec.base.as_str(), "main");
        assert_eq!(spec.head.as_str(), "feature-x");
        assert_eq!(spec.title, "Add auth");
    }

    #[test]
    fn missing_required_argument_is_rejected() {
        let err = ToolInvocation::from_request(&request(
            "create_pull_request",
            json!({"repo_owner": "acme", "repo_name": "widgets", "title": "t", "body": "b"}),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("head_branch"));
    }

    #[test]
    fn empty_repository_owner_is_rejected() {
        let err = ToolInvocation::from_request(&request(
            "list_branches",
            json!({"repo_owner": "", "repo_name": "widgets"}),
        ))
        .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn ill_typed_argument_is_rejected() {
        let err = ToolInvocation::from_request(&request(
            "list_branches",
            json!({"repo_owner": "acme", "repo_name": "widgets", "open_only": 3}),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("open_only"));
    }

    #[test]
    fn unparsed_argument_text_is_rejected() {
        let mut garbled = request("list_branches", json!({}));
        garbled.unparsed_arguments = Some("{oops".to_string());

        let err = ToolInvocation::from_request(&garbled).unwrap_err();

        assert!(matches!(
            &err,
            ToolError::InvalidArguments { tool, .. } if tool == "list_branches"
        ));
        assert!(err.to_string().contains("{oops"));
    }

    #[test]
    fn signatures_cover_every_tool() {
        let names: Vec<ToolName> = tool_signatures().iter().map(|s| s.name).collect();
        assert_eq!(names, ToolName::ALL);
    }

    #[test]
    fn schema_lists_required_parameters_and_defaults() {
        let signatures = tool_signatures();
        let create = signatures
            .iter()
            .find(|s| s.name == ToolName::CreatePullRequest)
            .unwrap();
        let schema = create.parameters_schema();

        assert_eq!(
            schema["required"],
            json!(["repo_owner", "repo_name", "title", "body", "head_branch"])
        );
        assert_eq!(schema["properties"]["base_branch"]["default"], json!("main"));
        assert_eq!(schema["properties"]["title"]["type"], json!("string"));
    }
}
