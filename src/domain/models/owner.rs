use serde::{Deserialize, Serialize};
use std::fmt;

/// The account whose repositories are scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Organization(String),
    User(String),
}

impl Owner {
    pub fn login(&self) -> &str {
        match self {
            Owner::Organization(login) | Owner::User(login) => login,
        }
    }

    /// Path segment of the "list repositories" endpoint for this owner.
    pub fn repositories_path(&self) -> String {
        match self {
            Owner::Organization(login) => format!("orgs/{login}/repos"),
            Owner::User(login) => format!("users/{login}/repos"),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Organization(login) => write!(f, "org:{login}"),
            Owner::User(login) => write!(f, "user:{login}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repositories_path_depends_on_owner_kind() {
        assert_eq!(
            Owner::Organization("acme".to_string()).repositories_path(),
            "orgs/acme/repos"
        );
        assert_eq!(
            Owner::User("octocat".to_string()).repositories_path(),
            "users/octocat/repos"
        );
    }

    #[test]
    fn test_login() {
        assert_eq!(Owner::User("octocat".to_string()).login(), "octocat");
        assert_eq!(Owner::Organization("acme".to_string()).login(), "acme");
    }
}
