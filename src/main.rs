mod editor;
mod text_metrics;

use clap::Parser;
use editor::{EditorConfig, IntellisenseEditor, Quit};
use gpui::{
    App, AppContext, Application, Bounds, Focusable, KeyBinding, WindowBounds, WindowOptions, px,
    size,
};
use textbox_intellisense::{ControlKind, Engine, IntellisenseOptions};
use tracing_subscriber::EnvFilter;

/// Text box with member completion and signature help.
#[derive(Debug, Parser)]
#[command(name = "intellisense-demo", version)]
struct Args {
    /// Behave like a single-line input instead of a textarea.
    #[arg(long)]
    single_line: bool,

    /// Measure the caret with the Gecko layout corrections.
    #[arg(long)]
    gecko: bool,

    /// Width of the text box in pixels.
    #[arg(long, default_value_t = 560.0)]
    width: f32,

    /// Distance between the caret's line and an opened popup, in pixels.
    #[arg(long)]
    popup_offset: Option<f32>,
}

impl Args {
    fn editor_config(&self) -> EditorConfig {
        let mut options = IntellisenseOptions::default();
        if self.gecko {
            options.engine_override = Some(Engine::Gecko);
        }
        if let Some(offset) = self.popup_offset {
            options.popup_line_offset = offset;
        }
        EditorConfig {
            kind: if self.single_line {
                ControlKind::SingleLine
            } else {
                ControlKind::MultiLine
            },
            width: self.width,
            options,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    let args = Args::parse();
    anyhow::ensure!(
        args.width.is_finite() && args.width > 0.0,
        "--width must be a positive number of pixels, got {}",
        args.width
    );
    let config = args.editor_config();
    tracing::info!(?config, "starting intellisense demo");

    Application::new().run(move |cx: &mut App| {
        cx.bind_keys([KeyBinding::new("ctrl-q", Quit, None)]);

        let bounds = Bounds::centered(None, size(px(800.0), px(600.0)), cx);
        let opened = cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                ..Default::default()
            },
            |window, cx| {
                let view = cx.new(|cx| IntellisenseEditor::new(config, cx));
                window.focus(&view.read(cx).focus_handle(cx));
                view
            },
        );
        if let Err(err) = opened {
            tracing::error!(%err, "failed to open window");
            cx.quit();
        }
    });

    Ok(())
}
