use std::path::PathBuf;

/// One line of terminal input, decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Assess,
    Image(PathBuf),
    Problem(String),
    /// Code follows on the next lines, ended by a lone `.`
    Revise,
    More,
    Hint,
    Show,
    State,
    Reset,
    Help,
    Quit,
    Ask(String),
    Empty,
}

pub const HELP: &str = "\
Commands:
  /assess          assess the current code image
  /image PATH      load a new code image (PNG or JPEG)
  /problem TEXT    set the problem statement
  /revise          submit revised code as text (end with a line containing only '.')
  /more            get a more specific hint
  /hint            show the current hint
  /show            show the latest code assessment
  /state           print the session view as JSON
  /reset           start over
  /help            show this help
  /quit            exit
Anything else is sent to the coach as a question.";

/// Line terminating a multi-line `/revise` block
pub const END_OF_CODE: &str = ".";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::Empty);
    }
    if !line.starts_with('/') {
        return Ok(Command::Ask(line.to_string()));
    }

    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    let command = match name {
        "/assess" => Command::Assess,
        "/image" if arg.is_empty() => return Err("usage: /image PATH".to_string()),
        "/image" => Command::Image(PathBuf::from(arg)),
        "/problem" => Command::Problem(arg.to_string()),
        "/revise" => Command::Revise,
        "/more" => Command::More,
        "/hint" => Command::Hint,
        "/show" => Command::Show,
        "/state" => Command::State,
        "/reset" => Command::Reset,
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => return Err(format!("unknown command {} (try /help)", other)),
    };
    Ok(command)
}
