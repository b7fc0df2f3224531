use anyhow::Result;
use hookchat::renderer::RenderedMessage;

pub mod cliclack;

pub trait Prompt {
    fn render(&mut self, message: &RenderedMessage);
    /// Ask for the next line; `pending` names the attached file, if any
    fn get_input(&mut self, pending: Option<&str>, recording: bool) -> Result<Input>;
    /// Tell the user something went wrong locally, before anything was sent
    fn alert(&mut self, text: &str);
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn greet(&self);
    fn close(&self);
    // Used for testing. Allows us to downcast to any type.
    #[cfg(test)]
    fn as_any(&self) -> &dyn std::any::Any;
}

#[derive(Debug, PartialEq, Eq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Message text or attachment path
}

#[derive(Debug, PartialEq, Eq)]
pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Attach,   // Select a file to send with the next message
    Detach,   // Drop the selected file
    Record,   // Start or stop a voice recording
    Help,
    Exit,     // User wants to exit the session
}

impl Input {
    fn command(input_type: InputType) -> Self {
        Input {
            input_type,
            content: None,
        }
    }
}

pub enum Theme {
    Light,
    Dark,
}

/// Interpret one line typed by the user
pub fn parse_input(line: &str) -> Input {
    let trimmed = line.trim();
    let (command, argument) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "exit" | "/exit" | "/quit" if argument.is_empty() => Input::command(InputType::Exit),
        "/attach" if argument.is_empty() => Input::command(InputType::AskAgain),
        "/attach" => Input {
            input_type: InputType::Attach,
            content: Some(argument.to_string()),
        },
        "/detach" => Input::command(InputType::Detach),
        "/record" => Input::command(InputType::Record),
        "/?" | "/help" => Input::command(InputType::Help),
        _ => Input {
            input_type: InputType::Message,
            content: Some(line.to_string()),
        },
    }
}

pub const HELP: &str = "Commands:
/attach <path> - Attach a JPG, PNG, PDF, MP3 or WAV file (max 5MB) to the next message
/detach - Drop the attached file
/record - Start recording a voice message, run again to stop and attach it
/t - Toggle Light/Dark theme
/exit - Exit the session
/? - Display this help message";
