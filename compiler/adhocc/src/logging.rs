//! Tracing subscriber setup.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Does nothing unless `RUST_LOG` is set, e.g. `RUST_LOG=adhoc_codegen=debug`.
/// With `tree`, spans print as an indented tree instead of flat lines.
/// Safe to call multiple times.
pub fn init_tracing(tree: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if tree {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            // stdout carries generated code
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
