//! Method + arity based action resolution.
//!
//! One template such as `/users/{id}` serves both the collection and the item;
//! how many declared parameters were captured tells them apart.
//!
//! | method  | full arity | partial arity |
//! |---------|------------|---------------|
//! | GET     | Read       | List          |
//! | POST    | Reject     | Create        |
//! | PATCH   | Update     | Reject        |
//! | DELETE  | Delete     | Reject        |
//! | OPTIONS | Preflight  | Preflight     |
//! | other   | Reject     | Reject        |

use axum::http::Method;
use std::fmt;

/// Named action a resource may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Read,
    Create,
    Update,
    Delete,
    Preflight,
    Reject,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Preflight => "preflight",
            Action::Reject => "reject",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether every declared path parameter was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Full,
    Partial,
}

impl Arity {
    pub fn of(captured: usize, declared: usize) -> Self {
        if captured >= declared {
            Arity::Full
        } else {
            Arity::Partial
        }
    }
}

/// Look up the action for a method and arity.
pub fn resolve_action(method: &Method, arity: Arity) -> Action {
    match (method.as_str(), arity) {
        ("GET", Arity::Full) => Action::Read,
        ("GET", Arity::Partial) => Action::List,
        ("POST", Arity::Partial) => Action::Create,
        ("PATCH", Arity::Full) => Action::Update,
        ("DELETE", Arity::Full) => Action::Delete,
        ("OPTIONS", _) => Action::Preflight,
        _ => Action::Reject,
    }
}
