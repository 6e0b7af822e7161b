//! Application Runner Module
//!
//! Shared entry point used by the `logpage` binary: logging setup, then load a
//! page, replay clicks against it and report what happened.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;
use crate::dispatch::{Controller, Effect, Interaction};
use crate::document::Document;
use crate::trace::{DebugSink, MemorySink, PageAudit, TracingSink};

/// Shared application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Enable debug logging
    pub debug: bool,
    /// Enable verbose (trace-level) logging
    pub verbose: bool,
    /// Filter from settings, used when neither flag is set
    pub log_filter: Option<String>,
}

impl AppConfig {
    fn default_filter(&self) -> &str {
        if self.verbose {
            "trace"
        } else if self.debug {
            "debug"
        } else {
            self.log_filter.as_deref().unwrap_or("warn")
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over everything else.
pub fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter()));
    // A second init (tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// What to do with one page.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub page: PathBuf,
    /// Debug ids to click, in order
    pub clicks: Vec<String>,
    /// Print tracer output
    pub trace: bool,
    /// Print the final document
    pub dump: bool,
    /// Print the page audit
    pub audit: bool,
}

/// Load the page, replay the clicks and write the report to `out`.
pub fn run_page(options: &RunOptions, settings: &Settings, out: &mut impl Write) -> anyhow::Result<()> {
    let document = Document::load(&options.page)
        .with_context(|| format!("Failed to load page {}", options.page.display()))?;

    let memory = options.trace.then(|| Arc::new(MemorySink::new()));
    let mut builder = Controller::builder().max_walk_depth(settings.max_walk_depth);
    if let Some(sink) = &memory {
        builder = builder.sink(sink.clone() as Arc<dyn DebugSink>);
    } else if settings.debug_trace {
        builder = builder.sink(Arc::new(TracingSink));
    }
    let mut controller = builder.build(document);
    controller.page_ready();

    for id in &options.clicks {
        let interaction = controller
            .click_debug_id(id)
            .with_context(|| format!("Click on '{id}' failed"))?;
        writeln!(out, "{id}: {}", describe(&interaction))?;
    }

    if let Some(sink) = &memory {
        for line in sink.take() {
            writeln!(out, "{line}")?;
        }
    }

    if options.audit {
        let audit = PageAudit::collect(controller.document(), controller.styles());
        writeln!(out, "{}", serde_json::to_string_pretty(&audit)?)?;
    }

    if options.dump {
        let spec = controller.into_document().to_spec();
        writeln!(out, "{}", serde_json::to_string_pretty(&spec)?)?;
    }
    Ok(())
}

/// One-line summary of a click.
pub fn describe(interaction: &Interaction) -> String {
    match interaction {
        Interaction::Ignored => "ignored".to_string(),
        Interaction::Handled { effect, .. } => match effect {
            Effect::ToolCall { expanded: Some(e), .. } => format!("tool call expanded={e}"),
            Effect::ToolCall { expanded: None, .. } => "tool call (no container)".to_string(),
            Effect::Panel { kind, state: Some(s) } => {
                format!("{} panel visible={}", kind.as_str(), s.visible)
            }
            Effect::Panel { kind, state: None } => format!("{} panel (incomplete)", kind.as_str()),
            Effect::TokenDetails { expanded } => format!("token details expanded={expanded}"),
        },
    }
}
