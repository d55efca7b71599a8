// ABOUTME: Renders create-env/delete-env shell scripts from an argument list.
// ABOUTME: Output is byte-for-byte deterministic for identical inputs.

use std::fmt;

/// The two actions a generated script performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateEnv,
    DeleteEnv,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateEnv => "create-env",
            Action::DeleteEnv => "delete-env",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a `/bin/sh` script invoking `bosh_path action args...`.
///
/// Each argument goes on its own continuation line, except that a flag
/// (leading `-`) shares its line with the value that follows it. Flag and
/// value are separated by a single space and no line ends in whitespace:
///
/// ```text
/// #!/bin/sh
/// bosh create-env \
///   ${BBL_STATE_DIR}/deployment/jumpbox.yml \
///   --state ${BBL_STATE_DIR}/vars/jumpbox-state.json \
///   -o ${BBL_STATE_DIR}/deployment/cpi.yml
/// ```
pub fn generate(action: Action, bosh_path: &str, args: &[String]) -> String {
    let mut lines = Vec::with_capacity(args.len());
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        match iter.peek() {
            Some(value) if arg.starts_with('-') => {
                lines.push(format!("  {arg} {value}"));
                iter.next();
            }
            _ => lines.push(format!("  {arg}")),
        }
    }

    if lines.is_empty() {
        return format!("#!/bin/sh\n{bosh_path} {action}\n");
    }

    format!(
        "#!/bin/sh\n{bosh_path} {action} \\\n{}\n",
        lines.join(" \\\n")
    )
}
