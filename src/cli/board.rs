//! todos board command

use crate::error::Result;
use crate::ui;

use super::task::load_context;
use super::GlobalOptions;

pub struct BoardOptions {
    pub filter: Option<String>,
    pub sort: Option<String>,
}

pub fn run(options: BoardOptions, globals: &GlobalOptions) -> Result<()> {
    let (controller, config) = load_context(
        globals,
        options.filter.as_deref(),
        options.sort.as_deref(),
    )?;
    std::fs::create_dir_all(controller.repository().store().root())?;
    tracing::info!(
        filter = controller.state().filter.as_str(),
        sort = controller.state().sort.as_str(),
        "opening board"
    );
    ui::board::run(controller, config.ui)
}
