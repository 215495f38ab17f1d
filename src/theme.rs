use crate::markdown::MarkdownStyle;
use crate::session::Role;
use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub dark: bool,
    pub app_background: Color32,
    pub sidebar_background: Color32,
    pub input_background: Color32,
    pub input_border: Color32,
    pub user_bubble: Color32,
    pub assistant_bubble: Color32,
    pub text_primary: Color32,
    pub text_strong: Color32,
    pub text_on_user_bubble: Color32,
    pub strong_on_user_bubble: Color32,
    pub code_background: Color32,
    pub text_muted: Color32,
    pub button_fill: Color32,
    pub button_hover: Color32,
    pub success: Color32,
    pub danger: Color32,
    pub info: Color32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub radius_8: u8,
    pub radius_16: u8,
}

impl Theme {
    pub const P8: f32 = 8.0;
    pub const P12: f32 = 12.0;
    pub const R8: u8 = 8;
    pub const R16: u8 = 16;
    pub const BODY_SIZE: f32 = 14.0;
    pub const MONO_SIZE: f32 = 13.0;

    /// Widest a chat bubble may grow, as a share of the transcript width.
    pub const BUBBLE_WIDTH_RATIO: f32 = 0.65;

    pub fn dark() -> Self {
        Self {
            dark: true,
            app_background: Color32::from_rgb(0x1E, 0x1E, 0x2F),
            sidebar_background: Color32::from_rgb(0x2C, 0x2C, 0x3E),
            input_background: Color32::from_rgb(0x2B, 0x2B, 0x3B),
            input_border: Color32::from_rgb(0x44, 0x44, 0x44),
            user_bubble: Color32::from_rgb(0x0E, 0x92, 0x7C),
            assistant_bubble: Color32::from_rgb(0x2B, 0x2B, 0x3B),
            text_primary: Color32::from_rgb(0xDC, 0xDC, 0xE4),
            text_strong: Color32::WHITE,
            text_on_user_bubble: Color32::from_rgb(0xE2, 0xF3, 0xEF),
            strong_on_user_bubble: Color32::WHITE,
            code_background: Color32::from_rgb(0x16, 0x16, 0x24),
            text_muted: Color32::from_rgb(0x9A, 0x9A, 0xAE),
            button_fill: Color32::from_rgb(0x3A, 0x3A, 0x4D),
            button_hover: Color32::from_rgb(0x50, 0x50, 0x6E),
            success: Color32::from_rgb(0x22, 0xC5, 0x5E),
            danger: Color32::from_rgb(0xEF, 0x44, 0x44),
            info: Color32::from_rgb(0x3B, 0x82, 0xF6),
            spacing_8: Self::P8,
            spacing_12: Self::P12,
            radius_8: Self::R8,
            radius_16: Self::R16,
        }
    }

    pub fn light() -> Self {
        Self {
            dark: false,
            app_background: Color32::from_rgb(0xF7, 0xF7, 0xF8),
            sidebar_background: Color32::from_rgb(0xE0, 0xE0, 0xE7),
            input_background: Color32::WHITE,
            input_border: Color32::from_rgb(0xCC, 0xCC, 0xCC),
            user_bubble: Color32::from_rgb(0x10, 0xA3, 0x7F),
            assistant_bubble: Color32::from_rgb(0xF1, 0xF1, 0xF4),
            text_primary: Color32::from_rgb(0x2A, 0x2A, 0x33),
            text_strong: Color32::BLACK,
            text_on_user_bubble: Color32::from_rgb(0xE6, 0xF6, 0xF1),
            strong_on_user_bubble: Color32::WHITE,
            code_background: Color32::from_rgb(0xE4, 0xE4, 0xEA),
            text_muted: Color32::from_rgb(0x55, 0x55, 0x66),
            button_fill: Color32::from_rgb(0xD0, 0xD0, 0xDC),
            button_hover: Color32::from_rgb(0xBF, 0xBF, 0xCC),
            success: Color32::from_rgb(0x15, 0x80, 0x3D),
            danger: Color32::from_rgb(0xB9, 0x1C, 0x1C),
            info: Color32::from_rgb(0x1D, 0x4E, 0xD8),
            spacing_8: Self::P8,
            spacing_12: Self::P12,
            radius_8: Self::R8,
            radius_16: Self::R16,
        }
    }

    pub fn for_mode(dark: bool) -> Self {
        if dark {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = if self.dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        visuals.panel_fill = self.app_background;
        visuals.window_fill = self.app_background;
        visuals.extreme_bg_color = self.input_background;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.noninteractive.fg_stroke.color = self.text_primary;
        visuals.widgets.inactive.bg_fill = self.button_fill;
        visuals.widgets.inactive.weak_bg_fill = self.button_fill;
        visuals.widgets.inactive.fg_stroke.color = self.text_primary;
        visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, self.input_border);
        visuals.widgets.inactive.corner_radius = CornerRadius::same(self.radius_8);
        visuals.widgets.hovered.bg_fill = self.button_hover;
        visuals.widgets.hovered.weak_bg_fill = self.button_hover;
        visuals.widgets.hovered.fg_stroke.color = self.text_primary;
        visuals.widgets.hovered.corner_radius = CornerRadius::same(self.radius_8);
        visuals.widgets.active.bg_fill = self.button_hover;
        visuals.widgets.active.weak_bg_fill = self.button_hover;
        visuals.widgets.active.corner_radius = CornerRadius::same(self.radius_8);
        visuals.selection.bg_fill = self.user_bubble;

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(10.0, 10.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(20.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(Self::BODY_SIZE));
        style.text_styles.insert(TextStyle::Monospace, FontId::monospace(Self::MONO_SIZE));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(12.0));
        ctx.set_style(style);
    }

    pub fn sidebar_frame(&self) -> Frame {
        Frame::new()
            .fill(self.sidebar_background)
            .inner_margin(Margin::same(self.spacing_12 as i8))
    }

    pub fn bubble_fill(&self, role: Role) -> Color32 {
        match role {
            Role::User => self.user_bubble,
            Role::Assistant | Role::System => self.assistant_bubble,
        }
    }

    pub fn bubble_text(&self, role: Role) -> Color32 {
        match role {
            Role::User => self.text_on_user_bubble,
            Role::Assistant | Role::System => self.text_primary,
        }
    }

    /// Markdown colours for text drawn on the panel background.
    pub fn markdown_style(&self) -> MarkdownStyle {
        self.markdown_with(self.text_primary, self.text_strong, self.code_background)
    }

    pub fn bubble_markdown(&self, role: Role) -> MarkdownStyle {
        let text = self.bubble_text(role);
        match role {
            Role::User => self.markdown_with(text, self.strong_on_user_bubble, Color32::from_black_alpha(48)),
            Role::Assistant | Role::System => self.markdown_with(text, self.text_strong, self.code_background),
        }
    }

    fn markdown_with(&self, text: Color32, strong: Color32, code_background: Color32) -> MarkdownStyle {
        MarkdownStyle {
            body: FontId::proportional(Self::BODY_SIZE),
            code: FontId::monospace(Self::MONO_SIZE),
            text,
            strong,
            code_background,
        }
    }

    pub fn bubble_frame(&self, role: Role) -> Frame {
        Frame::new()
            .fill(self.bubble_fill(role))
            .inner_margin(Margin::symmetric(16, 12))
            .corner_radius(CornerRadius::same(self.radius_16))
    }

    /// Tinted card used for the single-shot banner and the history replay.
    pub fn banner_frame(&self, accent: Color32) -> Frame {
        Frame::new()
            .fill(accent.gamma_multiply(0.18))
            .stroke(Stroke::new(1.0, accent))
            .inner_margin(Margin::same(self.spacing_12 as i8))
            .corner_radius(CornerRadius::same(self.radius_8))
    }

    pub fn input_frame(&self) -> Frame {
        Frame::new()
            .fill(self.input_background)
            .stroke(Stroke::new(1.0, self.input_border))
            .inner_margin(Margin::symmetric(self.spacing_12 as i8, 10))
            .corner_radius(CornerRadius::same(self.radius_8))
    }
}
