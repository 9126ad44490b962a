use crate::domain::events::Event;
use crate::journal::EntryPatch;
use crate::map::LayerId;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Sender;
use tracing::{info, instrument, warn};

/// Reads commands from stdin until `quit` or end of input, then unmounts the view.
#[instrument(skip_all)]
pub async fn read_commands(tx: Sender<Event>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("⚠️ Unable to read input: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Ok(Some(Event::Unmount)) => break,
            Ok(Some(event)) => {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("⚠️ {}", e),
        }
    }

    info!("👋 Closing the map");
    tx.send(Event::Unmount).await.unwrap_or_default();
}

/// Parses one line of input. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Event>, CommandError> {
    let line = line.trim();
    let (command, rest) = line.split_once(char::is_whitespace).map_or((line, ""), |(command, rest)| (command, rest.trim()));

    let event = match command {
        "" => return Ok(None),
        "reload" => Event::Reload,
        "search" => Event::SearchChanged(rest.to_string()),
        "click" => Event::MarkerClicked(parse_marker("click", rest)?),
        "hover" => Event::MarkerHovered(parse_marker("hover", rest)?),
        "leave" => Event::MarkerLeft,
        "preview" => match rest {
            "enter" => Event::PreviewEntered,
            "leave" => Event::PreviewLeft,
            _ => return Err(CommandError::MissingArgument { command: "preview", argument: "enter|leave" }),
        },
        "open" => Event::OpenEntry(required("open", rest, "entry")?.to_string()),
        "delete" => Event::DeleteEntry(required("delete", rest, "entry")?.to_string()),
        "rename" => {
            let (id, title) = rest.split_once(char::is_whitespace).ok_or(CommandError::MissingArgument { command: "rename", argument: "title" })?;
            let patch = EntryPatch {
                title: Some(title.trim().to_string()),
                ..Default::default()
            };
            Event::UpdateEntry { id: id.to_string(), patch }
        }
        "move" => {
            let mut arguments = rest.split_whitespace();
            let id = arguments.next().ok_or(CommandError::MissingArgument { command: "move", argument: "entry" })?;
            let lat = parse_number(arguments.next(), "lat")?;
            let lng = parse_number(arguments.next(), "lng")?;
            let patch = EntryPatch {
                latitude: Some(lat),
                longitude: Some(lng),
                ..Default::default()
            };
            Event::UpdateEntry { id: id.to_string(), patch }
        }
        "close" => Event::CloseDetail,
        "retry" => Event::RetryMap,
        "quit" | "exit" => Event::Unmount,
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };

    Ok(Some(event))
}

fn required<'a>(command: &'static str, rest: &'a str, argument: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument { command, argument });
    }
    Ok(rest)
}

fn parse_marker(command: &'static str, rest: &str) -> Result<LayerId, CommandError> {
    let value = required(command, rest, "marker")?;
    value.parse::<u64>().map(LayerId).map_err(|_| CommandError::InvalidNumber(value.to_string()))
}

fn parse_number(value: Option<&str>, argument: &'static str) -> Result<f64, CommandError> {
    let value = value.ok_or(CommandError::MissingArgument { command: "move", argument })?;
    value.parse::<f64>().map_err(|_| CommandError::InvalidNumber(value.to_string()))
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("'{command}' needs an argument: {argument}")]
    MissingArgument { command: &'static str, argument: &'static str },
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}
