//! Demo view: a text box with intellisense popups.
//!
//! Keystrokes are translated to DOM key codes and fed to the controller.
//! The box applies its own default edit (insert, backspace, caret movement)
//! only when the controller did not prevent it, the way a browser textarea
//! behaves under script.

use gpui::{
    App, Context, FocusHandle, Focusable, KeyDownEvent, KeyUpEvent, Keystroke, Render, Window,
    actions, div, prelude::*, px, rgb,
};
use textbox_intellisense::keys::code;
use textbox_intellisense::{
    ComputedStyle, ControlKind, Declaration, DeclarationsPopup, IntellisenseController,
    IntellisenseOptions, KeyEvent, MethodsPopup, Popup, StyleProperty, TextControl, TextField,
    Trigger,
};

use crate::text_metrics;

actions!(editor, [Quit]);

const FONT_FAMILY: &str = "monospace";
const FONT_SIZE: f32 = 14.0;
const LINE_HEIGHT: f32 = 20.0;
const PADDING: f32 = 8.0;
const BORDER: f32 = 1.0;
const MULTI_LINE_HEIGHT: f32 = 240.0;

/// Where the text box sits inside the window.
const BOX_LEFT: f32 = 24.0;
const BOX_TOP: f32 = 56.0;

/// Settings taken from the command line.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub kind: ControlKind,
    pub width: f32,
    pub options: IntellisenseOptions,
}

pub struct IntellisenseEditor {
    intellisense: IntellisenseController<TextField>,
    config: EditorConfig,
    focus_handle: FocusHandle,
}

impl IntellisenseEditor {
    pub fn new(config: EditorConfig, cx: &mut Context<Self>) -> Self {
        let control = TextField::new(config.kind, box_style(&config))
            .with_offset(BOX_LEFT, BOX_TOP);
        let mut intellisense: IntellisenseController<TextField> =
            IntellisenseController::new(control).with_options(config.options.clone());

        intellisense.add_declaration_trigger(Trigger::new(code::PERIOD).named("member"));
        intellisense.add_declaration_trigger(
            Trigger::new(code::SPACE)
                .with_ctrl()
                .on_key_down()
                .preventing_default()
                .named("complete"),
        );
        intellisense.add_methods_trigger(Trigger::new(code::NINE).with_shift().named("call"));

        intellisense.on_declaration(|trigger, popups| {
            tracing::debug!(target: "intellisense", name = ?trigger.name, "showing members");
            popups.decls.set_declarations(member_catalog());
            popups.decls.set_visible(true);
        });
        intellisense.on_method(|_, popups| {
            popups.meths.set_methods(vec![
                "log(message: string)".to_string(),
                "log(message: string, ...params: any[])".to_string(),
            ]);
            popups.meths.set_visible(true);
        });

        Self {
            intellisense,
            config,
            focus_handle: cx.focus_handle(),
        }
    }

    fn handle_quit(&mut self, _: &Quit, _: &mut Window, cx: &mut Context<Self>) {
        cx.quit();
    }

    fn handle_key_down(
        &mut self,
        keystroke: &Keystroke,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let mut event = key_event(keystroke);
        let mut host = text_metrics::mirror_host(window);
        self.intellisense.handle_key_down(&mut event, &mut host);
        if !event.default_prevented() {
            self.apply_default(keystroke, event.key_code);
        }
        cx.notify();
    }

    fn handle_key_up(
        &mut self,
        keystroke: &Keystroke,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let mut event = key_event(keystroke);
        let mut host = text_metrics::mirror_host(window);
        self.intellisense.handle_key_up(&mut event, &mut host);
        cx.notify();
    }

    /// The edit the text box performs on its own for `keystroke`.
    fn apply_default(&mut self, keystroke: &Keystroke, key_code: u32) {
        let field = self.intellisense.control_mut();
        match key_code {
            code::BACKSPACE => field.delete_backward(),
            code::LEFT => field.move_left(),
            code::RIGHT => field.move_right(),
            code::ENTER if field.kind() == ControlKind::MultiLine => field.insert_str("\n"),
            code::ENTER => {}
            _ => {
                let modifiers = &keystroke.modifiers;
                if modifiers.control || modifiers.alt || modifiers.platform {
                    return;
                }
                let Some(key_char) = &keystroke.key_char else {
                    return;
                };
                if let Some(c) = key_char.chars().next() {
                    if key_char.len() == 1 && (c.is_ascii_graphic() || c == ' ') {
                        field.insert_str(key_char);
                    }
                }
            }
        }
    }

    fn render_declarations(&self) -> impl IntoElement {
        let decls = self.intellisense.decls();
        let (x, y) = decls.position();
        div()
            .absolute()
            .left(px(x))
            .top(px(y))
            .w(px(320.0))
            .bg(rgb(0x2d2d2d))
            .border_1()
            .border_color(rgb(0x454545))
            .rounded_md()
            .shadow_lg()
            .flex()
            .flex_col()
            .overflow_hidden()
            .children(decls.visible_items().into_iter().map(|(is_selected, decl)| {
                div()
                    .p_2()
                    .pl_3()
                    .bg(item_bg_color(is_selected))
                    .flex()
                    .flex_row()
                    .justify_between()
                    .child(
                        div()
                            .text_sm()
                            .font_family(FONT_FAMILY)
                            .text_color(item_text_color(is_selected))
                            .child(decl.name.clone()),
                    )
                    .child(
                        div()
                            .text_xs()
                            .text_color(rgb(0x808080))
                            .child(decl.documentation.clone().unwrap_or_default()),
                    )
            }))
    }

    fn render_methods(&self) -> impl IntoElement {
        let meths = self.intellisense.meths();
        let (x, y) = meths.position();
        let label = match meths.current() {
            Some((index, signature)) => format!("{index} of {}  {signature}", meths.len()),
            None => String::new(),
        };
        div()
            .absolute()
            .left(px(x))
            .top(px(y))
            .p_2()
            .bg(rgb(0x2d2d2d))
            .border_1()
            .border_color(rgb(0x454545))
            .rounded_md()
            .shadow_lg()
            .text_sm()
            .font_family(FONT_FAMILY)
            .text_color(rgb(0xd4d4d4))
            .child(label)
    }
}

impl Focusable for IntellisenseEditor {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for IntellisenseEditor {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        // The caret is drawn where the mirror says it is, so the demo shows
        // the measurement directly.
        let mut host = text_metrics::mirror_host(window);
        let caret = match self.intellisense.caret_coordinates(&mut host) {
            Ok(caret) => Some(caret),
            Err(err) => {
                tracing::warn!(target: "intellisense", %err, "could not place caret");
                None
            }
        };

        let mut text_box = div()
            .absolute()
            .left(px(BOX_LEFT))
            .top(px(BOX_TOP))
            .w(px(self.config.width))
            .h(px(box_height(self.config.kind)))
            .p(px(PADDING))
            .border_1()
            .border_color(rgb(0x454545))
            .bg(rgb(0x1e1e1e))
            .overflow_hidden()
            .child(self.intellisense.control().value().to_string());
        if self.config.kind == ControlKind::SingleLine {
            text_box = text_box.whitespace_nowrap();
        }

        let mut root = div()
            .track_focus(&self.focus_handle(cx))
            .on_action(cx.listener(Self::handle_quit))
            .on_key_down(cx.listener(|editor, event: &KeyDownEvent, window, cx| {
                editor.handle_key_down(&event.keystroke, window, cx);
            }))
            .on_key_up(cx.listener(|editor, event: &KeyUpEvent, window, cx| {
                editor.handle_key_up(&event.keystroke, window, cx);
            }))
            .size_full()
            .relative()
            .bg(rgb(0x252526))
            .text_color(rgb(0xd4d4d4))
            .font_family(FONT_FAMILY)
            .text_size(px(FONT_SIZE))
            .line_height(px(LINE_HEIGHT))
            .child(div().p_4().text_xs().text_color(rgb(0x808080)).child(
                "Type `.` for members, Ctrl+Space to complete, `(` for signatures | Ctrl+Q: quit",
            ))
            .child(text_box);

        if let Some(caret) = caret {
            root = root.child(
                div()
                    .absolute()
                    .left(px(BOX_LEFT + caret.left))
                    .top(px(BOX_TOP + caret.top))
                    .w(px(2.0))
                    .h(px(LINE_HEIGHT))
                    .bg(rgb(0xcccccc)),
            );
        }
        if self.intellisense.decls().is_visible() {
            root = root.child(self.render_declarations());
        }
        if self.intellisense.meths().is_visible() {
            root = root.child(self.render_methods());
        }
        root
    }
}

/// Style the text box is rendered with, in the form the mirror copies.
fn box_style(config: &EditorConfig) -> ComputedStyle {
    let border = format!("{BORDER}px");
    let padding = format!("{PADDING}px");
    ComputedStyle::new()
        .with(StyleProperty::BoxSizing, "border-box")
        .with(StyleProperty::Width, format!("{}px", config.width))
        .with(StyleProperty::Height, format!("{}px", box_height(config.kind)))
        .with(StyleProperty::FontFamily, FONT_FAMILY)
        .with(StyleProperty::FontSize, format!("{FONT_SIZE}px"))
        .with(StyleProperty::LineHeight, format!("{LINE_HEIGHT}px"))
        .with(StyleProperty::PaddingTop, padding.clone())
        .with(StyleProperty::PaddingRight, padding.clone())
        .with(StyleProperty::PaddingBottom, padding.clone())
        .with(StyleProperty::PaddingLeft, padding)
        .with(StyleProperty::BorderTopWidth, border.clone())
        .with(StyleProperty::BorderRightWidth, border.clone())
        .with(StyleProperty::BorderBottomWidth, border.clone())
        .with(StyleProperty::BorderLeftWidth, border)
}

fn box_height(kind: ControlKind) -> f32 {
    match kind {
        ControlKind::SingleLine => LINE_HEIGHT + 2.0 * (PADDING + BORDER),
        ControlKind::MultiLine => MULTI_LINE_HEIGHT,
    }
}

fn member_catalog() -> Vec<Declaration> {
    vec![
        Declaration::new("assert").with_documentation("Writes an error when false"),
        Declaration::new("clear").with_value("clear()"),
        Declaration::new("count").with_documentation("Counts calls per label"),
        Declaration::new("debug"),
        Declaration::new("error"),
        Declaration::new("group").with_documentation("Starts an indented group"),
        Declaration::new("info"),
        Declaration::new("log").with_documentation("Writes a message"),
        Declaration::new("table"),
        Declaration::new("time"),
        Declaration::new("trace"),
        Declaration::new("warn"),
    ]
}

/// Maps a gpui keystroke to the DOM `keyCode` triggers are written against.
fn key_event(keystroke: &Keystroke) -> KeyEvent {
    let key_code = match keystroke.key.as_str() {
        "backspace" => code::BACKSPACE,
        "tab" => code::TAB,
        "enter" => code::ENTER,
        "escape" => code::ESCAPE,
        "space" | " " => code::SPACE,
        "left" => code::LEFT,
        "up" => code::UP,
        "right" => code::RIGHT,
        "down" => code::DOWN,
        "." => code::PERIOD,
        "(" => code::NINE,
        key => match key.chars().next() {
            Some(c) if key.len() == 1 && c.is_ascii_alphanumeric() => {
                c.to_ascii_uppercase() as u32
            }
            _ => 0,
        },
    };

    let modifiers = &keystroke.modifiers;
    let mut event = KeyEvent::new(key_code);
    // Some platforms report the shifted character instead of the key.
    if modifiers.shift || keystroke.key == "(" {
        event = event.with_shift();
    }
    if modifiers.control {
        event = event.with_ctrl();
    }
    event
}

fn item_bg_color(is_selected: bool) -> gpui::Rgba {
    if is_selected {
        rgb(0x094771)
    } else {
        rgb(0x2d2d2d)
    }
}

fn item_text_color(is_selected: bool) -> gpui::Rgba {
    if is_selected {
        rgb(0xffffff)
    } else {
        rgb(0xd4d4d4)
    }
}
