use std::path::PathBuf;

use anyhow::Result;
use hookchat::composer::Composer;
use hookchat::conversation::Conversation;
use hookchat::renderer::render;
use hookchat::transport::WebhookClient;

use crate::prompt::{InputType, Prompt};

pub struct Session<'a> {
    client: WebhookClient,
    composer: Composer,
    conversation: Conversation,
    prompt: Box<dyn Prompt + 'a>,
    rendered: usize,
}

impl<'a> Session<'a> {
    pub fn new(client: WebhookClient, composer: Composer, prompt: Box<impl Prompt + 'a>) -> Self {
        Session {
            client,
            composer,
            conversation: Conversation::new(),
            prompt,
            rendered: 0,
        }
    }

    #[cfg(test)]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub async fn start(&mut self) -> Result<()> {
        self.prompt.greet();

        loop {
            let pending = self.composer.attachment().map(|a| a.name.clone());
            let input = self
                .prompt
                .get_input(pending.as_deref(), self.composer.is_recording())?;

            match input.input_type {
                InputType::Exit => break,
                InputType::AskAgain | InputType::Help => continue,
                InputType::Attach => {
                    if let Some(path) = input.content {
                        self.attach(expand_home(&path));
                    }
                }
                InputType::Detach => self.composer.clear_attachment(),
                InputType::Record => self.toggle_recording().await,
                InputType::Message => {
                    self.composer.set_draft(input.content.unwrap_or_default());
                    self.send().await;
                }
            }
        }

        if self.composer.is_recording() {
            // Stopping releases the microphone; the clip is discarded with the session.
            if let Err(e) = self.composer.stop_recording().await {
                tracing::warn!("Failed to stop recording: {}", e);
            }
        }
        self.prompt.close();
        Ok(())
    }

    fn attach(&mut self, path: PathBuf) {
        if let Err(e) = self.composer.select_file(&path) {
            self.prompt.alert(&e.to_string());
        }
    }

    async fn toggle_recording(&mut self) {
        let result = if self.composer.is_recording() {
            self.composer.stop_recording().await
        } else {
            self.composer.start_recording().await
        };

        if let Err(e) = result {
            self.prompt.alert(&e.to_string());
        }
    }

    async fn send(&mut self) {
        let Some(submission) = self.composer.submit() else {
            return;
        };

        let send = self.client.send(&self.conversation, submission);
        tokio::pin!(send);

        // The user message is appended on the first poll, before the request goes out.
        let finished = tokio::select! {
            biased;
            _ = &mut send => true,
            _ = std::future::ready(()) => false,
        };

        if !finished {
            Self::render_new(&self.conversation, &mut self.rendered, self.prompt.as_mut());
            self.prompt.show_busy();
            send.await;
            self.prompt.hide_busy();
        }

        Self::render_new(&self.conversation, &mut self.rendered, self.prompt.as_mut());
    }

    fn render_new(conversation: &Conversation, rendered: &mut usize, prompt: &mut (dyn Prompt + 'a)) {
        for message in conversation.since(*rendered) {
            prompt.render(&render(&message));
            *rendered += 1;
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
