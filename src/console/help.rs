//! Help text.

/// Overview printed by `help`.
pub(crate) const OVERVIEW: &[&str] = &[
    "Enter commands separated by a space.",
    "Key: \"<>\" is an argument, \"()\" is optional.",
    "  help (<command>)                 more info on a command",
    "  start                            starts the dedicated server",
    "  stop                             stops the dedicated server",
    "  restart (<hours>)                restarts the server, or sets the auto-restart interval",
    "  status                           shows the state of the server",
    "  edit <serverpath|serverparams>   edits the saved server settings",
    "  clear                            clears the console window",
];

/// Details for one command, or `None` for an unknown topic.
pub(crate) fn topic(name: &str) -> Option<&'static [&'static str]> {
    let lines: &'static [&'static str] = match name {
        "help" => &["Lists the commands, or details for one command."],
        "start" => &[
            "Starts the dedicated server.",
            "Returns once the process is spawned; crashes are restarted automatically.",
        ],
        "stop" => &[
            "Stops the dedicated server and waits until it has exited.",
            "A stop is never counted as a crash.",
        ],
        "restart" => &[
            "Restarts the dedicated server.",
            "<hours> - automatically restart the server every <hours> hours (0 disables).",
            "Changing the interval restarts a running server to apply it.",
        ],
        "status" => &["Shows online/offline, up-time, crashes and the next automatic restart."],
        "edit" => &[
            "Edits the saved server settings; changes apply on the next start.",
            "<serverpath> - the server executable location.",
            "<serverparams> - the extra launch parameters.",
        ],
        "clear" => &["Clears the console window."],
        _ => return None,
    };
    Some(lines)
}
