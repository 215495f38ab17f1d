use crate::completion::{ChatModel, CompletionService};
use crate::config::Config;
use crate::controller::{Banner, InputMode, TurnController, TurnState, TurnTicket, View};
use crate::event::AppEvent;
use crate::markdown;
use crate::session::Role;
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tokio::runtime::Handle;

pub struct ChatApp {
    rx: Receiver<AppEvent>,
    tx: Sender<AppEvent>,
    service: Arc<dyn CompletionService>,
    runtime_handle: Handle,
    controller: TurnController,
    theme: Theme,
    dark_mode: bool,
    theme_applied: bool,
    scroll_to_bottom: bool,
    composer_focus: ComposerFocus,
}

/// Puts the cursor back into the chat input once it is enabled again.
/// The input is disabled while a request is in flight, so a focus request
/// made on Enter would otherwise be lost.
#[derive(Debug, Default)]
struct ComposerFocus {
    pending: bool,
}

impl ComposerFocus {
    fn request(&mut self) {
        self.pending = true;
    }

    fn take(&mut self, in_flight: bool) -> bool {
        if self.pending && !in_flight {
            self.pending = false;
            true
        } else {
            false
        }
    }
}

impl ChatApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        tx: Sender<AppEvent>,
        service: Arc<dyn CompletionService>,
        runtime_handle: Handle,
        config: &Config,
    ) -> Self {
        Self {
            rx,
            tx,
            service,
            runtime_handle,
            controller: TurnController::new(config.mode, config.settings.clone()),
            theme: Theme::for_mode(config.dark_mode),
            dark_mode: config.dark_mode,
            theme_applied: false,
            scroll_to_bottom: false,
            composer_focus: ComposerFocus::default(),
        }
    }

    pub fn window_title(mode: InputMode) -> &'static str {
        match mode {
            InputMode::Batch => "Chat with Groq API",
            InputMode::Stream => "ChatGPT Style Chat",
        }
    }

    /// Runs the completion call off the UI thread; the result comes back
    /// through the event channel tagged with the ticket's generation.
    fn dispatch(&self, ticket: TurnTicket, ctx: &egui::Context) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let ctx = ctx.clone();

        self.runtime_handle.spawn(async move {
            let result = service.complete(&ticket.request).await;
            let event = AppEvent::CompletionFinished {
                generation: ticket.generation,
                result,
            };
            if tx.send(event).is_err() {
                tracing::warn!("event channel closed before completion was delivered");
            }
            ctx.request_repaint();
        });
    }

    fn submit(&mut self, ctx: &egui::Context) {
        if let Some(ticket) = self.controller.submit() {
            self.scroll_to_bottom = true;
            self.dispatch(ticket, ctx);
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CompletionFinished { generation, result } => {
                if self.controller.complete(generation, result) {
                    self.scroll_to_bottom = true;
                }
            }
        }
    }

    fn sync_theme(&mut self, ctx: &egui::Context) {
        if self.theme_applied && self.theme.dark == self.dark_mode {
            return;
        }
        self.theme = Theme::for_mode(self.dark_mode);
        self.theme.apply_visuals(ctx);
        self.theme_applied = true;
    }

    fn render_sidebar(&mut self, ctx: &egui::Context, view: &View) {
        let mut clear = false;
        let mut selected: Option<usize> = None;

        egui::SidePanel::left("settings_panel")
            .resizable(true)
            .default_width(280.0)
            .frame(self.theme.sidebar_frame())
            .show(ctx, |ui| {
                ui.heading("⚙️ Personalization");
                egui::CollapsingHeader::new("Settings")
                    .default_open(true)
                    .show(ui, |ui| {
                        let settings = self.controller.settings_mut();
                        ui.label("System Prompt");
                        ui.add(
                            egui::TextEdit::multiline(&mut settings.system_prompt)
                                .desired_rows(3)
                                .desired_width(f32::INFINITY),
                        );

                        ui.label("Choose a model");
                        egui::ComboBox::from_id_salt("model_select")
                            .selected_text(settings.model.api_name())
                            .width(ui.available_width())
                            .show_ui(ui, |ui| {
                                for model in ChatModel::ALL {
                                    ui.selectable_value(&mut settings.model, model, model.api_name());
                                }
                            })
                            .response
                            .on_hover_text("Select the model to use for generating responses.");

                        clear = ui.button("🧹 Clear Chat History").clicked();
                    });

                ui.checkbox(&mut self.dark_mode, "🌗 Dark Mode");
                ui.separator();

                ui.heading("📜 Chat History");
                ScrollArea::vertical()
                    .id_salt("chat_history")
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        if view.history.is_empty() {
                            ui.label(RichText::new("No questions yet").color(self.theme.text_muted));
                        }
                        for (index, entry) in view.history.iter().enumerate() {
                            if ui.button(entry.label(index)).clicked() {
                                selected = Some(index);
                            }
                        }
                    });
            });

        if clear {
            self.controller.reset();
        }
        if let Some(index) = selected {
            self.controller.select_replay(index);
        }
    }

    /// Read-only replay of a past exchange picked from the sidebar.
    fn render_replay(&mut self, ui: &mut egui::Ui, view: &View) {
        let Some(entry) = &view.replay else {
            return;
        };

        let mut close = false;
        self.theme.banner_frame(self.theme.info).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.strong("From history");
                close = ui.small_button("✖").clicked();
            });
            ui.add(egui::Label::new(markdown::layout_job(&entry.summary(), &self.theme.markdown_style())).wrap());
        });
        ui.add_space(self.theme.spacing_8);

        if close {
            self.controller.clear_replay_selection();
        }
    }

    fn render_single_shot(&mut self, ctx: &egui::Context, view: &View) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Chat 💭 with Groq API");
            ui.separator();
            self.render_replay(ui, view);

            ui.label("👤 Your message:");
            ui.add_enabled(
                !view.in_flight,
                egui::TextEdit::multiline(self.controller.draft_mut())
                    .desired_rows(5)
                    .desired_width(f32::INFINITY),
            );

            let send = ui
                .add_enabled(!view.in_flight, egui::Button::new("📤 Send"))
                .clicked();
            if send {
                self.submit(ctx);
            }

            if view.in_flight {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("Waiting for response...").color(self.theme.text_muted));
                });
            }

            match &view.banner {
                Some(Banner::Success(text)) => {
                    self.theme.banner_frame(self.theme.success).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new("🤖 Assistant:").strong().color(self.theme.success));
                        ScrollArea::vertical().id_salt("single_shot_answer").show(ui, |ui| {
                            ui.add(
                                egui::Label::new(markdown::layout_job(text, &self.theme.markdown_style())).wrap(),
                            );
                        });
                    });
                }
                Some(Banner::Error(message)) => {
                    self.theme.banner_frame(self.theme.danger).show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(message).color(self.theme.danger));
                    });
                }
                None => {}
            }
        });
    }

    fn render_chat(&mut self, ctx: &egui::Context, view: &View) {
        let hint = match self.controller.state() {
            TurnState::RequestInFlight => "Waiting for response...",
            _ => "Type your message...",
        };

        let mut send_now = false;
        egui::TopBottomPanel::bottom("composer")
            .frame(egui::Frame::new().inner_margin(egui::Margin::same(self.theme.spacing_12 as i8)))
            .show(ctx, |ui| {
                self.theme.input_frame().show(ui, |ui| {
                    let response = ui.add_enabled(
                        !view.in_flight,
                        egui::TextEdit::singleline(self.controller.draft_mut())
                            .frame(false)
                            .hint_text(hint)
                            .desired_width(f32::INFINITY),
                    );
                    // Checked before Enter: `view` predates this frame's submit.
                    if self.composer_focus.take(view.in_flight) {
                        response.request_focus();
                    }
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        send_now = true;
                        self.composer_focus.request();
                    }
                });
            });

        if send_now {
            self.submit(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_replay(ui, view);

            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for turn in &view.turns {
                        Self::render_bubble(ui, &self.theme, turn.role(), turn.content());
                    }

                    if let Some(query) = &view.pending_query {
                        Self::render_bubble(ui, &self.theme, Role::User, query);
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(RichText::new("Thinking...").color(self.theme.text_muted));
                        });
                    }

                    if self.scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
            self.scroll_to_bottom = false;
        });
    }

    fn render_bubble(ui: &mut egui::Ui, theme: &Theme, role: Role, content: &str) {
        let max_width = ui.available_width() * Theme::BUBBLE_WIDTH_RATIO;
        let layout = match role {
            Role::User => egui::Layout::right_to_left(egui::Align::TOP),
            Role::Assistant | Role::System => egui::Layout::left_to_right(egui::Align::TOP),
        };

        ui.with_layout(layout, |ui| {
            theme.bubble_frame(role).show(ui, |ui| {
                ui.set_max_width(max_width);
                ui.add(egui::Label::new(markdown::layout_job(content, &theme.bubble_markdown(role))).wrap());
            });
        });
        ui.add_space(theme.spacing_8);
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.sync_theme(ctx);

        let view = self.controller.render();
        self.render_sidebar(ctx, &view);
        match self.controller.mode() {
            InputMode::Batch => self.render_single_shot(ctx, &view),
            InputMode::Stream => self.render_chat(ctx, &view),
        }
    }
}
