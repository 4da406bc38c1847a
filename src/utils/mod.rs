pub mod build_info;
pub mod paths;

use std::{fs, io, path::Path, sync::Once};

pub use paths::PathResolver;

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "spendwise_core=info";

/// Installs the global tracing subscriber once. `RUST_LOG` directives are
/// honoured on top of the crate default.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = DEFAULT_DIRECTIVE.parse() {
            filter = filter.add_directive(directive);
        }

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
    });
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
