//! Operator command parsing.
//!
//! One line is one command: a case-insensitive verb followed by
//! whitespace-separated arguments. Extra trailing arguments are ignored.

use thiserror::Error;

/// Setting targeted by `edit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditTarget {
    /// The server executable path (`serverEXE`).
    ServerPath,
    /// The extra launch parameters (`serverParams`).
    ServerParams,
}

/// A parsed operator command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperatorCommand {
    /// `help [topic]`
    Help(Option<String>),
    /// `start`
    Start,
    /// `stop`
    Stop,
    /// `restart` (manual restart) or `restart <hours>` (set the interval).
    Restart(Option<u64>),
    /// `status`
    Status,
    /// `clear`
    Clear,
    /// `edit serverpath|serverparams`
    Edit(EditTarget),
}

/// Why a line could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line.
    #[error("please enter a command, use \"help\" to see a list of commands")]
    Empty,

    /// Unrecognised verb.
    #[error("sorry, \"{0}\" is not recognized, please try again (or try using \"help\")")]
    Unknown(String),

    /// `edit` without a setting name.
    #[error("please specify which setting you would like to edit (serverpath or serverparams)")]
    MissingSetting,

    /// `edit` with an unknown setting name.
    #[error("sorry, \"{0}\" is not a setting, use serverpath or serverparams")]
    UnknownSetting(String),

    /// `restart` with an argument that is not a non-negative integer.
    #[error("\"{0}\" is not a whole number of hours (use 0 to disable automatic restarts)")]
    InvalidHours(String),
}

impl OperatorCommand {
    /// Parses one input line.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let lowered = line.to_lowercase();
        let mut words = lowered.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(ParseError::Empty);
        };
        let arg = words.next();

        match verb {
            "help" => Ok(OperatorCommand::Help(arg.map(str::to_owned))),
            "start" => Ok(OperatorCommand::Start),
            "stop" => Ok(OperatorCommand::Stop),
            "status" => Ok(OperatorCommand::Status),
            "clear" => Ok(OperatorCommand::Clear),
            "restart" => match arg {
                None => Ok(OperatorCommand::Restart(None)),
                Some(raw) => raw
                    .parse::<u64>()
                    .map(|h| OperatorCommand::Restart(Some(h)))
                    .map_err(|_| ParseError::InvalidHours(raw.to_owned())),
            },
            "edit" => match arg {
                None => Err(ParseError::MissingSetting),
                Some("serverpath") => Ok(OperatorCommand::Edit(EditTarget::ServerPath)),
                Some("serverparams") => Ok(OperatorCommand::Edit(EditTarget::ServerParams)),
                Some(other) => Err(ParseError::UnknownSetting(other.to_owned())),
            },
            other => Err(ParseError::Unknown(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbs_are_case_insensitive() {
        assert_eq!(OperatorCommand::parse("START"), Ok(OperatorCommand::Start));
        assert_eq!(OperatorCommand::parse("  Stop  "), Ok(OperatorCommand::Stop));
        assert_eq!(OperatorCommand::parse("status"), Ok(OperatorCommand::Status));
        assert_eq!(OperatorCommand::parse("Clear"), Ok(OperatorCommand::Clear));
    }

    #[test]
    fn test_restart_forms() {
        assert_eq!(OperatorCommand::parse("restart"), Ok(OperatorCommand::Restart(None)));
        assert_eq!(OperatorCommand::parse("restart 6"), Ok(OperatorCommand::Restart(Some(6))));
        assert_eq!(OperatorCommand::parse("restart 0"), Ok(OperatorCommand::Restart(Some(0))));
        assert_eq!(
            OperatorCommand::parse("restart soon"),
            Err(ParseError::InvalidHours("soon".into()))
        );
        assert_eq!(
            OperatorCommand::parse("restart -1"),
            Err(ParseError::InvalidHours("-1".into()))
        );
    }

    #[test]
    fn test_edit_targets() {
        assert_eq!(
            OperatorCommand::parse("edit ServerPath"),
            Ok(OperatorCommand::Edit(EditTarget::ServerPath))
        );
        assert_eq!(
            OperatorCommand::parse("edit serverparams"),
            Ok(OperatorCommand::Edit(EditTarget::ServerParams))
        );
        assert_eq!(OperatorCommand::parse("edit"), Err(ParseError::MissingSetting));
        assert_eq!(
            OperatorCommand::parse("edit port"),
            Err(ParseError::UnknownSetting("port".into()))
        );
    }

    #[test]
    fn test_help_topic_is_optional() {
        assert_eq!(OperatorCommand::parse("help"), Ok(OperatorCommand::Help(None)));
        assert_eq!(
            OperatorCommand::parse("help Restart"),
            Ok(OperatorCommand::Help(Some("restart".into())))
        );
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(OperatorCommand::parse(""), Err(ParseError::Empty));
        assert_eq!(OperatorCommand::parse("   \t"), Err(ParseError::Empty));
        assert_eq!(
            OperatorCommand::parse("launch now"),
            Err(ParseError::Unknown("launch".into()))
        );
    }
}
