use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::{input, spinner};
use console::style;
use hookchat::composer::ACCEPTED_EXTENSIONS;
use hookchat::models::message::Role;
use hookchat::renderer::{Body, RenderedMessage, EMPTY_CONVERSATION};

use super::{parse_input, Input, InputType, Prompt, Theme, HELP};

pub struct CliclackPrompt {
    spinner: cliclack::ProgressBar,
    theme: Theme,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: spinner(),
            theme: Theme::Dark,
        }
    }

    fn theme_name(&self) -> &'static str {
        match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }
}

fn print_markdown(content: &str, theme: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();

    if printed.is_err() {
        println!("{}", content);
    }
}

fn print_body(body: &Body, role: Role, theme: &str) {
    match body {
        Body::Text(text) if role == Role::Bot => print_markdown(text, theme),
        Body::Text(text) => println!("{}", text),
        Body::Image { label, src, alt } => {
            println!("{} {} {}", style(label).magenta(), src, style(alt).dim());
        }
        Body::Audio { label, src, mime } => {
            println!("{} {} {}", style(label).magenta(), src, style(mime).dim());
        }
        Body::File {
            label,
            href,
            download_name,
        } => {
            println!("{} {}", style(label).magenta().underlined(), href);
            if let Some(name) = download_name {
                println!("{}", style(format!("saves as {}", name)).dim());
            }
        }
    }
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, message: &RenderedMessage) {
        let author = match message.role {
            Role::User => style("You").cyan().bold(),
            Role::Bot => style("Bot").green().bold(),
        };
        println!("{} {}", author, style(&message.time).dim());
        print_body(&message.body, message.role, self.theme_name());
        println!();
        // A failed flush only delays output
        let _ = io::stdout().flush();
    }

    fn get_input(&mut self, pending: Option<&str>, recording: bool) -> Result<Input> {
        if let Some(name) = pending {
            cliclack::log::info(format!("Selected file: {}", name))?;
        }
        if recording {
            cliclack::log::warning("Recording... run /record again to stop")?;
        }

        let line: String = input("Message:")
            .placeholder("Type a message...")
            .required(false)
            .interact()?;

        if line.trim().eq_ignore_ascii_case("/t") {
            self.theme = match self.theme {
                Theme::Light => Theme::Dark,
                Theme::Dark => Theme::Light,
            };
            return Ok(Input {
                input_type: InputType::AskAgain,
                content: None,
            });
        }

        let input = parse_input(&line);
        if input.input_type == InputType::Help {
            println!("{}", HELP);
            println!("Accepted files: {}", ACCEPTED_EXTENSIONS);
        }
        Ok(input)
    }

    fn alert(&mut self, text: &str) {
        if cliclack::log::error(text).is_err() {
            eprintln!("{}", text);
        }
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner.start("awaiting reply");
    }

    fn hide_busy(&mut self) {
        self.spinner.stop("");
    }

    fn greet(&self) {
        println!(
            "{} {}",
            style("Chat Assistant").blue().bold(),
            style("- type \"/?\" for help, \"exit\" to end the session").dim()
        );
        println!("{}", style(EMPTY_CONVERSATION).dim());
        println!();
    }

    fn close(&self) {
        // No cleanup required
    }

    #[cfg(test)]
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
