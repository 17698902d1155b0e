//! Argument vectors for the two Liquibase operations schemavault uses.

use crate::runner::RunOptions;
use std::path::Path;

/// Environment variable Liquibase reads the connection password from.
///
/// Keeps the password out of argv, where it would show up in process listings.
pub const PASSWORD_ENV: &str = "LIQUIBASE_COMMAND_PASSWORD";

/// A fully prepared tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub options: RunOptions,
}

/// Builds Liquibase invocations against one database URL.
#[derive(Clone)]
pub struct LiquibaseCommand {
    url: String,
    username: String,
    password: Option<String>,
}

impl LiquibaseCommand {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password,
        }
    }

    /// Captures the live schema into `changelog_path`, replacing any existing file.
    pub fn generate_changelog(&self, changelog_path: &Path) -> Invocation {
        let mut args = vec!["generate-changelog".to_string()];
        args.extend(self.connection_args());
        args.push(format!("--changelog-file={}", changelog_path.display()));
        args.push("--overwrite-output-file=true".to_string());
        Invocation {
            args,
            options: self.options(None),
        }
    }

    /// Applies `changelog_file`, resolved relative to `working_dir`.
    pub fn update(&self, changelog_file: &str, working_dir: &Path) -> Invocation {
        let mut args = vec!["update".to_string()];
        args.extend(self.connection_args());
        args.push(format!("--changelog-file={}", changelog_file));
        Invocation {
            args,
            options: self.options(Some(working_dir)),
        }
    }

    fn connection_args(&self) -> [String; 2] {
        [
            format!("--url={}", self.url),
            format!("--username={}", self.username),
        ]
    }

    fn options(&self, cwd: Option<&Path>) -> RunOptions {
        RunOptions {
            cwd: cwd.map(Path::to_path_buf),
            env: self
                .password
                .iter()
                .map(|p| (PASSWORD_ENV.to_string(), p.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn command() -> LiquibaseCommand {
        LiquibaseCommand::new(
            "jdbc:mysql://db:3306/orders",
            "backup",
            Some("s3cret".to_string()),
        )
    }

    #[test]
    fn generate_writes_to_absolute_path_with_overwrite() {
        let path = PathBuf::from("/tmp/schemavault/dump-orders-x.yaml");
        let invocation = command().generate_changelog(&path);
        assert_eq!(
            invocation.args,
            vec![
                "generate-changelog",
                "--url=jdbc:mysql://db:3306/orders",
                "--username=backup",
                "--changelog-file=/tmp/schemavault/dump-orders-x.yaml",
                "--overwrite-output-file=true",
            ]
        );
        assert_eq!(invocation.options.cwd, None);
    }

    #[test]
    fn update_runs_inside_working_directory() {
        let dir = PathBuf::from("/tmp/schemavault");
        let invocation = command().update("restore-orders-x.yaml", &dir);
        assert_eq!(invocation.args[0], "update");
        assert_eq!(
            invocation.args.last().map(String::as_str),
            Some("--changelog-file=restore-orders-x.yaml")
        );
        assert_eq!(invocation.options.cwd, Some(dir));
    }

    #[test]
    fn password_travels_in_environment_only() {
        let invocation = command().generate_changelog(Path::new("/tmp/a.yaml"));
        assert!(invocation.args.iter().all(|a| !a.contains("s3cret")));
        assert_eq!(
            invocation.options.env,
            vec![(PASSWORD_ENV.to_string(), "s3cret".to_string())]
        );

        let anonymous = LiquibaseCommand::new("jdbc:mysql://db:3306/orders", "backup", None);
        assert!(anonymous
            .update("a.yaml", Path::new("/tmp"))
            .options
            .env
            .is_empty());
    }
}
