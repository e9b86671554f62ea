//! Terminal host surface: owns the page text and opens URLs in a browser.

use crate::page::Page;
use flightdeck_core::{Error, Navigator, Result, SelectionSource, Url};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// System opener used when no browser is configured.
fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}

/// Split a configured browser command into program and leading arguments.
fn browser_command(browser: Option<&str>) -> (String, Vec<String>) {
    let mut parts = browser
        .map(str::split_whitespace)
        .into_iter()
        .flatten()
        .map(str::to_string);
    match parts.next() {
        Some(program) => (program, parts.collect()),
        None => (default_opener().to_string(), Vec::new()),
    }
}

/// Wait for a launched opener on a detached thread so it never lingers as a zombie.
fn reap_in_background(program: String, mut child: Child) -> JoinHandle<()> {
    std::thread::spawn(move || match child.wait() {
        Ok(status) if status.success() => debug!("{program} exited"),
        Ok(status) => warn!("{program} exited with {status}"),
        Err(e) => warn!("Failed to wait for {program}: {e}"),
    })
}

pub struct TuiHost {
    pub page: Page,
    browser: Option<String>,
    /// Most recent successful launch, shown in the status line
    pub last_opened: Option<Url>,
}

impl TuiHost {
    pub fn new(page: Page, browser: Option<String>) -> Self {
        Self {
            page,
            browser,
            last_opened: None,
        }
    }
}

impl SelectionSource for TuiHost {
    fn selection(&self) -> String {
        self.page.selected_text()
    }
}

impl Navigator for TuiHost {
    fn open(&mut self, url: &Url) -> Result<()> {
        let (program, args) = browser_command(self.browser.as_deref());
        debug!("Opening {url} with {program}");

        let child = Command::new(&program)
            .args(&args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::NavigationFailed(format!("{program}: {e}")))?;
        reap_in_background(program, child);

        self.last_opened = Some(url.clone());
        Ok(())
    }
}
