//! PiP Tool - live picture-in-picture overlay of any window

mod cli;
mod logging;

use anyhow::Context;
use clap::Parser;
use cli::Cli;

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use geometry::SessionEnd;
    use overlay::PipWindow;
    use tracing::info;
    use windows::Win32::UI::HiDpi::{
        SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    };

    // Thumbnail and window rects are in physical pixels
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }

    let cli = Cli::parse();
    logging::init(cli.debug);
    let config = cli.to_config().context("invalid configuration")?;

    let mut source = initial_source(&cli)?;
    let mut region = cli.region;

    loop {
        info!(title = %source.info().title, "mirroring window");
        let selection = source
            .selection(region)
            .with_context(|| format!("cannot mirror {:?}", source.info().title))?;

        match PipWindow::run(selection, config.clone()).context("overlay session failed")? {
            SessionEnd::Closed => break,
            SessionEnd::SourceChangeRequested => {
                info!("focus the next window to mirror");
                source = wait_for_foreground(source.info().hwnd);
                // The sub-region belonged to the previous source
                region = None;
            }
        }
    }

    Ok(())
}

#[cfg(windows)]
fn initial_source(cli: &Cli) -> anyhow::Result<overlay::SourceWindow> {
    use overlay::SourceWindow;
    use tracing::info;

    if let Some(title) = cli.title.as_deref() {
        return SourceWindow::by_title(title).context("source lookup failed");
    }

    info!(
        seconds = cli.countdown,
        "focus the window to mirror; using the foreground window after the countdown"
    );
    std::thread::sleep(cli.countdown());
    SourceWindow::foreground(&[]).context("no usable foreground window")
}

/// Block until a different window comes to the foreground.
#[cfg(windows)]
fn wait_for_foreground(previous: isize) -> overlay::SourceWindow {
    use std::time::Duration;

    const POLL: Duration = Duration::from_millis(250);

    loop {
        if let Some(source) = overlay::SourceWindow::foreground(&[previous]) {
            return source;
        }
        std::thread::sleep(POLL);
    }
}

#[cfg(not(windows))]
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);
    cli.to_config().context("invalid configuration")?;
    anyhow::bail!("pip-tool needs the Windows desktop window manager")
}
