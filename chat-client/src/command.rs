//! Parsing of `\command args` lines from the interactive shell.

/// One user command: a name and its raw argument string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The lowercased command name, without the leading backslash.
    pub name: String,
    /// Everything after the first space, verbatim. Empty if absent.
    pub arguments: String,
}

/// Parse one input line into a command.
///
/// Only lines starting with a backslash are commands; anything else is
/// ignored. The name is lowercased; the argument string is split off at the
/// first space and kept verbatim.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let rest = line.strip_prefix('\\')?;
    let (name, arguments) = match rest.split_once(' ') {
        Some((name, arguments)) => (name, arguments),
        None => (rest, ""),
    };
    if name.is_empty() {
        return None;
    }
    Some(Command {
        name: name.to_lowercase(),
        arguments: arguments.to_string(),
    })
}

/// The help screen listing every recognized command.
pub fn help_text() -> &'static str {
    "Available commands:\n\
     \\me - Shows information about current account\n\
     \\contacts - Shows contacts list\n\
     \\umsg <id> <message> - Sends message to user with <id>\n\
     \\cmsg <id> <message> - Sends message to chat with <id>\n\
     \\help - Shows this message\n\
     \\quit - Quit"
}
